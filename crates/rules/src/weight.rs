//! Weight trend against birth weight.

use crate::round_to;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Daily gain below which growth is flagged.
pub const MIN_DAILY_GAIN_GRAMS: f64 = 10.0;

pub fn kg_to_grams(kg: f64) -> f64 {
    kg * 1000.0
}

pub fn grams_to_kg(grams: f64) -> f64 {
    grams / 1000.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightTrend {
    Gain,
    Loss,
}

/// Change from birth weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightChange {
    /// Kilograms, 2 dp.
    pub absolute_kg: f64,
    /// Percent of birth weight, 1 dp.
    pub percent: f64,
    pub status: WeightTrend,
}

impl WeightChange {
    pub fn grams(&self) -> f64 {
        kg_to_grams(self.absolute_kg)
    }
}

impl fmt::Display for WeightChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = match self.status {
            WeightTrend::Gain => "+",
            WeightTrend::Loss => "",
        };
        write!(
            f,
            "{sign}{:.2} kg ({:.1}%)",
            self.absolute_kg, self.percent
        )
    }
}

/// Weight change of `current_kg` relative to `birth_kg`.
///
/// `None` when the birth weight is not positive.
pub fn calculate_weight_change(current_kg: f64, birth_kg: f64) -> Option<WeightChange> {
    if birth_kg.is_nan() || birth_kg <= 0.0 || !current_kg.is_finite() {
        return None;
    }
    let change = current_kg - birth_kg;
    Some(WeightChange {
        absolute_kg: round_to(change, 2),
        percent: round_to(change / birth_kg * 100.0, 1),
        status: if change >= 0.0 {
            WeightTrend::Gain
        } else {
            WeightTrend::Loss
        },
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GainStatus {
    Good,
    Concern,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyGain {
    /// Grams per day, whole grams.
    pub grams_per_day: f64,
    pub status: GainStatus,
}

/// Average daily gain over the days of life so far. `None` on day 0.
pub fn calculate_average_daily_gain(change_grams: f64, day_of_life: i64) -> Option<DailyGain> {
    if day_of_life <= 0 {
        return None;
    }
    let grams_per_day = round_to(change_grams / day_of_life as f64, 0);
    let status = if grams_per_day < MIN_DAILY_GAIN_GRAMS {
        GainStatus::Concern
    } else {
        GainStatus::Good
    };
    Some(DailyGain {
        grams_per_day,
        status,
    })
}
