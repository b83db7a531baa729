//! Facility configuration and per-day availability.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_CAPACITY: i32 = 10;

/// Default nightly price, 50.00.
pub fn default_pricing() -> Decimal {
    Decimal::new(5000, 2)
}

/// The singleton facility row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    pub id: Uuid,
    /// Pets boarded concurrently on any one day.
    pub capacity: i32,
    /// Price per started day.
    pub pricing: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFacilityRequest {
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: Option<i32>,

    pub pricing: Option<Decimal>,
}

impl UpdateFacilityRequest {
    /// Pricing must be non-negative with at most two decimal places.
    pub fn pricing_error(&self) -> Option<&'static str> {
        match self.pricing {
            Some(p) if p.is_sign_negative() && !p.is_zero() => Some("Pricing must be non-negative"),
            Some(p) if p.normalize().scale() > 2 => {
                Some("Pricing must have at most two decimal places")
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Capacity left on one calendar day. `available` goes negative when
/// capacity was lowered below the existing load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub available: i64,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_default_pricing() {
        assert_eq!(default_pricing().to_string(), "50.00");
    }

    #[test]
    fn test_update_accepts_string_pricing() {
        let req: UpdateFacilityRequest =
            serde_json::from_value(serde_json::json!({ "pricing": "42.50" })).unwrap();
        assert_eq!(req.pricing, Some(Decimal::from_str("42.50").unwrap()));
        assert!(req.capacity.is_none());
        assert!(req.pricing_error().is_none());
    }

    #[test]
    fn test_update_rejects_zero_capacity() {
        let req = UpdateFacilityRequest {
            capacity: Some(0),
            pricing: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_pricing_rules() {
        let negative = UpdateFacilityRequest {
            capacity: None,
            pricing: Some(Decimal::new(-1, 0)),
        };
        assert_eq!(negative.pricing_error(), Some("Pricing must be non-negative"));

        let fine_grained = UpdateFacilityRequest {
            capacity: None,
            pricing: Some(Decimal::from_str("10.125").unwrap()),
        };
        assert!(fine_grained.pricing_error().is_some());

        let free = UpdateFacilityRequest {
            capacity: None,
            pricing: Some(Decimal::ZERO),
        };
        assert!(free.pricing_error().is_none());
    }

    #[test]
    fn test_availability_query_parses_dates() {
        let q: AvailabilityQuery = serde_json::from_value(serde_json::json!({
            "startDate": "2030-01-01",
            "endDate": "2030-01-03"
        }))
        .unwrap();
        assert_eq!(q.start_date, NaiveDate::from_ymd_opt(2030, 1, 1).unwrap());
    }
}
