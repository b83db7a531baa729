//! Stay pricing.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Started days between `start` and `end`, never less than one.
pub fn billable_days(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let millis = (end - start).num_milliseconds();
    let days = millis.div_euclid(MILLIS_PER_DAY) + i64::from(millis.rem_euclid(MILLIS_PER_DAY) > 0);
    days.max(1)
}

/// `pricing × billable_days`.
pub fn quote(pricing: Decimal, start: DateTime<Utc>, end: DateTime<Utc>) -> Decimal {
    pricing * Decimal::from(billable_days(start, end))
}

/// Amount in minor currency units, half away from zero.
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}
