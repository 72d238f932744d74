//! Maintenance fluid requirements by day of life.

use crate::round_to;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceFluids {
    pub ml_per_kg_per_day: u32,
    /// Whole millilitres.
    pub daily_total_ml: f64,
    /// mL/h, 1 dp.
    pub hourly_rate_ml: f64,
}

/// mL/kg/day for a given age in days. Day 0, the day of birth, takes the first-day rate.
pub fn ml_per_kg_per_day(age_days: i64) -> u32 {
    match age_days {
        i64::MIN..=1 => 60,
        2 => 80,
        3 => 100,
        4..=7 => 120,
        8..=30 => 150,
        _ => 100,
    }
}

/// Daily maintenance volume and hourly rate. The hourly rate is computed from the unrounded
/// daily total.
pub fn calculate_maintenance_fluids(weight_kg: f64, age_days: i64) -> MaintenanceFluids {
    let rate = ml_per_kg_per_day(age_days);
    let total = weight_kg * f64::from(rate);
    MaintenanceFluids {
        ml_per_kg_per_day: rate,
        daily_total_ml: round_to(total, 0),
        hourly_rate_ml: round_to(total / 24.0, 1),
    }
}
