//! Facility capacity accounting.
//!
//! A stay covers every UTC calendar day from the date of its start to the
//! date of its end, inclusive. Occupancy of a day is the number of active
//! stays covering it.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::facility::DayAvailability;

/// How the booking guard measures load against capacity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityMode {
    /// Highest per-day occupancy across the requested days.
    #[default]
    PeakDaily,
    /// Count of active stays overlapping the requested interval at all.
    Overlap,
}

/// Interval of an active booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stay {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Stay {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn first_day(&self) -> NaiveDate {
        self.start.date_naive()
    }

    pub fn last_day(&self) -> NaiveDate {
        self.end.date_naive()
    }

    pub fn covers(&self, day: NaiveDate) -> bool {
        self.first_day() <= day && day <= self.last_day()
    }

    /// Inclusive interval overlap.
    pub fn overlaps(&self, other: &Stay) -> bool {
        self.start <= other.end && self.end >= other.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Facility is at capacity for the requested dates ({load} of {capacity} places taken)")]
pub struct CapacityExceeded {
    pub load: i64,
    pub capacity: i64,
}

/// Every calendar day from `from` to `to`, inclusive.
pub fn days(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    from.iter_days().take_while(move |day| *day <= to)
}

/// Timestamp window `[from 00:00, to + 1 day 00:00)` holding every stay that
/// covers a day in `from..=to`, plus the end-exclusive bound.
pub fn day_window(from: NaiveDate, to: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let after = to.succ_opt().unwrap_or(NaiveDate::MAX);
    (
        from.and_time(NaiveTime::MIN).and_utc(),
        after.and_time(NaiveTime::MIN).and_utc(),
    )
}

pub fn occupancy(stays: &[Stay], day: NaiveDate) -> i64 {
    stays.iter().filter(|s| s.covers(day)).count() as i64
}

/// Highest occupancy over the days `request` covers.
///
/// Sweeps the arrival and departure days of each stay clipped to the
/// request, so the cost depends on the number of stays and not on how many
/// days the request spans.
pub fn peak_occupancy(stays: &[Stay], request: &Stay) -> i64 {
    let (from, to) = (request.first_day(), request.last_day());

    let mut events: Vec<(NaiveDate, i64)> = Vec::with_capacity(stays.len() * 2);
    for stay in stays {
        let first = stay.first_day().max(from);
        let last = stay.last_day().min(to);
        if first > last {
            continue;
        }
        events.push((first, 1));
        if let Some(after) = last.succ_opt() {
            events.push((after, -1));
        }
    }
    // Departures (-1) order before arrivals on the same day.
    events.sort_unstable();

    let mut load = 0;
    let mut peak = 0;
    for (_, delta) in events {
        load += delta;
        peak = peak.max(load);
    }
    peak
}

pub fn overlap_count(stays: &[Stay], request: &Stay) -> i64 {
    stays.iter().filter(|s| s.overlaps(request)).count() as i64
}

/// Rejects `request` when the measured load already fills `capacity`.
pub fn check_capacity(
    mode: CapacityMode,
    capacity: i32,
    existing: &[Stay],
    request: &Stay,
) -> Result<(), CapacityExceeded> {
    let load = match mode {
        CapacityMode::PeakDaily => peak_occupancy(existing, request),
        CapacityMode::Overlap => overlap_count(existing, request),
    };
    let capacity = i64::from(capacity);

    if load >= capacity {
        return Err(CapacityExceeded { load, capacity });
    }
    Ok(())
}

pub fn availability(
    capacity: i32,
    stays: &[Stay],
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<DayAvailability> {
    let total = i64::from(capacity);
    days(from, to)
        .map(|date| DayAvailability {
            date,
            available: total - occupancy(stays, date),
            total,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(month: u32, day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2031, month, day, hour, 0, 0).unwrap()
    }

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2031, month, day).unwrap()
    }

    #[test]
    fn test_stay_covers_start_and_end_days() {
        let stay = Stay::new(at(1, 1, 15), at(1, 3, 9));
        assert!(!stay.covers(NaiveDate::from_ymd_opt(2030, 12, 31).unwrap()));
        assert!(stay.covers(date(1, 1)));
        assert!(stay.covers(date(1, 2)));
        assert!(stay.covers(date(1, 3)));
        assert!(!stay.covers(date(1, 4)));
    }

    #[test]
    fn test_days_inclusive() {
        let all: Vec<_> = days(date(1, 30), date(2, 2)).collect();
        assert_eq!(all, vec![date(1, 30), date(1, 31), date(2, 1), date(2, 2)]);
        assert_eq!(days(date(1, 2), date(1, 1)).count(), 0);
    }

    #[test]
    fn test_day_window() {
        let (start, end) = day_window(date(1, 1), date(1, 3));
        assert_eq!(start, at(1, 1, 0));
        assert_eq!(end, at(1, 4, 0));
    }

    #[test]
    fn test_fixed_scenario_rejects_third_booking() {
        let a = Stay::new(at(1, 1, 0), at(1, 5, 0));
        let b = Stay::new(at(1, 3, 0), at(1, 10, 0));
        let c = Stay::new(at(1, 4, 10), at(1, 4, 18));

        for mode in [CapacityMode::PeakDaily, CapacityMode::Overlap] {
            assert!(check_capacity(mode, 2, &[], &a).is_ok());
            assert!(check_capacity(mode, 2, &[a], &b).is_ok());
            assert_eq!(
                check_capacity(mode, 2, &[a, b], &c),
                Err(CapacityExceeded {
                    load: 2,
                    capacity: 2
                })
            );
        }
    }

    #[test]
    fn test_peak_allows_sequential_stays_that_overlap_mode_rejects() {
        // Two stays that never share a day, both inside the request window.
        let early = Stay::new(at(2, 1, 0), at(2, 2, 12));
        let late = Stay::new(at(2, 5, 0), at(2, 6, 12));
        let request = Stay::new(at(2, 1, 0), at(2, 7, 0));

        assert_eq!(peak_occupancy(&[early, late], &request), 1);
        assert_eq!(overlap_count(&[early, late], &request), 2);
        assert!(check_capacity(CapacityMode::PeakDaily, 2, &[early, late], &request).is_ok());
        assert!(check_capacity(CapacityMode::Overlap, 2, &[early, late], &request).is_err());
    }

    #[test]
    fn test_touching_boundary_counts_as_overlap() {
        let existing = Stay::new(at(3, 1, 0), at(3, 2, 0));
        let request = Stay::new(at(3, 2, 0), at(3, 3, 0));
        assert!(existing.overlaps(&request));
        assert_eq!(peak_occupancy(&[existing], &request), 1);
    }

    #[test]
    fn test_peak_matches_per_day_count() {
        let stays = [
            Stay::new(at(7, 1, 8), at(7, 4, 20)),
            Stay::new(at(7, 3, 0), at(7, 3, 1)),
            Stay::new(at(7, 4, 23), at(7, 9, 0)),
            Stay::new(at(7, 5, 0), at(7, 6, 0)),
            Stay::new(at(6, 20, 0), at(7, 2, 0)),
            Stay::new(at(8, 1, 0), at(8, 2, 0)),
        ];

        for (first, last) in [(1, 3), (3, 5), (5, 9), (2, 2), (9, 20)] {
            let request = Stay::new(at(7, first, 12), at(7, last, 13));
            let expected = days(date(7, first), date(7, last))
                .map(|day| occupancy(&stays, day))
                .max()
                .unwrap_or(0);
            assert_eq!(peak_occupancy(&stays, &request), expected, "{}..{}", first, last);
        }
    }

    #[test]
    fn test_peak_over_multi_millennium_request() {
        // 200 three-day stays starting on consecutive days: at most three
        // share any calendar day.
        let stays: Vec<Stay> = (0..200)
            .map(|i| {
                let start = at(1, 1, 10) + chrono::Duration::days(i);
                Stay::new(start, start + chrono::Duration::days(2))
            })
            .collect();
        let request = Stay::new(
            Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap(),
        );

        assert_eq!(peak_occupancy(&stays, &request), 3);
        assert_eq!(
            check_capacity(CapacityMode::PeakDaily, 3, &stays, &request),
            Err(CapacityExceeded {
                load: 3,
                capacity: 3
            })
        );
        assert!(check_capacity(CapacityMode::PeakDaily, 4, &stays, &request).is_ok());
    }

    #[test]
    fn test_peak_ignores_stays_outside_request() {
        let before = Stay::new(at(9, 1, 0), at(9, 2, 0));
        let after = Stay::new(at(9, 10, 0), at(9, 12, 0));
        let request = Stay::new(at(9, 3, 0), at(9, 9, 23));
        assert_eq!(peak_occupancy(&[before, after], &request), 0);
    }

    #[test]
    fn test_capacity_one_empty_facility() {
        let request = Stay::new(at(4, 1, 0), at(4, 2, 0));
        assert!(check_capacity(CapacityMode::PeakDaily, 1, &[], &request).is_ok());
        assert!(check_capacity(CapacityMode::PeakDaily, 1, &[request], &request).is_err());
    }

    #[test]
    fn test_availability_middle_day_booking() {
        let middle = Stay::new(at(5, 2, 10), at(5, 2, 18));
        let result = availability(5, &[middle], date(5, 1), date(5, 3));

        let available: Vec<i64> = result.iter().map(|d| d.available).collect();
        assert_eq!(available, vec![5, 4, 5]);
        assert!(result.iter().all(|d| d.total == 5));
        assert_eq!(result[0].date, date(5, 1));
    }

    #[test]
    fn test_availability_can_go_negative() {
        let stay = Stay::new(at(6, 1, 0), at(6, 1, 12));
        let result = availability(1, &[stay, stay], date(6, 1), date(6, 1));
        assert_eq!(result[0].available, -1);
    }

    #[test]
    fn test_capacity_mode_serde() {
        let mode: CapacityMode = serde_json::from_str("\"peak_daily\"").unwrap();
        assert_eq!(mode, CapacityMode::PeakDaily);
        assert_eq!(CapacityMode::default(), CapacityMode::PeakDaily);
    }
}
