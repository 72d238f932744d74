//! Age arithmetic: day of life, day post admission and corrected age.
//!
//! Day counts use a ceiling policy: the absolute difference in milliseconds is divided by
//! 86,400,000 and rounded up. Two identical instants give 0; any positive fraction of a day
//! counts as a whole day. Calendar dates are anchored at UTC midnight before the comparison.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Term-equivalent gestation used for corrected age.
pub const TERM_WEEKS: u32 = 40;

/// Whole days elapsed between two instants, rounded up. Order does not matter.
pub fn day_count(reference: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (now - reference).num_milliseconds().abs();
    (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    DateTime::<Utc>::from_naive_utc_and_offset(date.and_time(NaiveTime::MIN), Utc)
}

/// Day of life (DOL).
pub fn day_of_life(date_of_birth: NaiveDate, now: DateTime<Utc>) -> i64 {
    day_count(midnight_utc(date_of_birth), now)
}

/// Day post admission (DPA).
pub fn day_post_admission(admission_date: NaiveDate, now: DateTime<Utc>) -> i64 {
    day_count(midnight_utc(admission_date), now)
}

/// Chronological and corrected age for a baby born before term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectedAge {
    pub chronological_days: i64,
    /// Chronological age minus the correction, never below zero.
    pub corrected_days: i64,
    /// `(40 - GA weeks) * 7`; negative for post-term babies.
    pub correction_days: i64,
}

/// Corrected age from birth date and completed gestational weeks.
pub fn corrected_age(date_of_birth: NaiveDate, ga_weeks: u32, now: DateTime<Utc>) -> CorrectedAge {
    let chronological_days = day_of_life(date_of_birth, now);
    let correction_days = (i64::from(TERM_WEEKS) - i64::from(ga_weeks)) * 7;
    CorrectedAge {
        chronological_days,
        corrected_days: (chronological_days - correction_days).max(0),
        correction_days,
    }
}

/// Gestational age at birth, as completed weeks plus days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestationalAge {
    pub weeks: u8,
    pub days: u8,
}

impl GestationalAge {
    pub fn new(weeks: u8, days: u8) -> Self {
        Self { weeks, days }
    }

    pub fn total_days(&self) -> u32 {
        u32::from(self.weeks) * 7 + u32::from(self.days)
    }
}

impl fmt::Display for GestationalAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.weeks, self.days)
    }
}
