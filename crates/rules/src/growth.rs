//! Growth classification: maturity, birth-weight category and weight for gestational age.
//!
//! Weight-for-GA uses an abridged Fenton preterm growth reference: percentile weights (kg) at
//! even gestational weeks 24 to 42 for boys and girls. Odd weeks are rounded to the nearest
//! even week (halves round up, so 25 uses the 26-week row).

use crate::RulesError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Sex recorded at admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Sex {
    pub fn code(self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Sex {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" | "male" => Ok(Sex::Male),
            "f" | "female" => Ok(Sex::Female),
            _ => Err(RulesError::InvalidSex(s.to_string())),
        }
    }
}

/// Maturity category from completed gestational weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaturityCategory {
    ExtremelyPreterm,
    VeryPreterm,
    LatePreterm,
    Term,
    PostTerm,
}

impl MaturityCategory {
    pub fn key(self) -> &'static str {
        match self {
            MaturityCategory::ExtremelyPreterm => "extremely_preterm",
            MaturityCategory::VeryPreterm => "very_preterm",
            MaturityCategory::LatePreterm => "late_preterm",
            MaturityCategory::Term => "term",
            MaturityCategory::PostTerm => "post_term",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MaturityCategory::ExtremelyPreterm => "Extremely Preterm",
            MaturityCategory::VeryPreterm => "Very Preterm",
            MaturityCategory::LatePreterm => "Moderate/Late Preterm",
            MaturityCategory::Term => "Term",
            MaturityCategory::PostTerm => "Post-term",
        }
    }

    pub fn is_preterm(self) -> bool {
        matches!(
            self,
            MaturityCategory::ExtremelyPreterm
                | MaturityCategory::VeryPreterm
                | MaturityCategory::LatePreterm
        )
    }
}

/// `<28` extremely preterm, `28-31` very preterm, `32-36` late preterm, `37-42` term,
/// `>42` post-term. `None` when gestational age is unknown.
pub fn classify_maturity(gestational_weeks: Option<u32>) -> Option<MaturityCategory> {
    let weeks = gestational_weeks?;
    let category = match weeks {
        0..=27 => MaturityCategory::ExtremelyPreterm,
        28..=31 => MaturityCategory::VeryPreterm,
        32..=36 => MaturityCategory::LatePreterm,
        37..=42 => MaturityCategory::Term,
        _ => MaturityCategory::PostTerm,
    };
    Some(category)
}

/// Birth-weight category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BirthWeightCategory {
    /// Extremely low birth weight, under 1000 g.
    Elbw,
    /// Very low birth weight, 1000-1499 g.
    Vlbw,
    /// Low birth weight, 1500-2499 g.
    Lbw,
    Normal,
}

impl BirthWeightCategory {
    pub fn label(self) -> &'static str {
        match self {
            BirthWeightCategory::Elbw => "ELBW",
            BirthWeightCategory::Vlbw => "VLBW",
            BirthWeightCategory::Lbw => "LBW",
            BirthWeightCategory::Normal => "Normal birth weight",
        }
    }

    pub fn risk_description(self) -> Option<&'static str> {
        match self {
            BirthWeightCategory::Elbw => Some(
                "Extremely low birth weight: highest risk of hypothermia, hypoglycaemia, \
                 infection, intraventricular haemorrhage and mortality",
            ),
            BirthWeightCategory::Vlbw => Some(
                "Very low birth weight: high risk of hypothermia, feeding intolerance, \
                 apnoea and infection",
            ),
            BirthWeightCategory::Lbw => Some(
                "Low birth weight: increased risk of hypothermia, hypoglycaemia and \
                 feeding difficulties",
            ),
            BirthWeightCategory::Normal => None,
        }
    }
}

/// Classifies a birth weight given in kilograms.
///
/// The weight is resolved to whole grams first, so 0.999 kg is 999 g (ELBW) and 1.0 kg is
/// 1000 g (VLBW) regardless of floating-point noise.
pub fn classify_birth_weight(weight_kg: f64) -> BirthWeightCategory {
    let grams = (weight_kg * 1000.0).round();
    if grams < 1000.0 {
        BirthWeightCategory::Elbw
    } else if grams < 1500.0 {
        BirthWeightCategory::Vlbw
    } else if grams < 2500.0 {
        BirthWeightCategory::Lbw
    } else {
        BirthWeightCategory::Normal
    }
}

/// Size for gestational age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GrowthCategory {
    /// Small for gestational age, below the 10th percentile.
    Sga,
    /// Appropriate for gestational age, 10th to 90th percentile inclusive.
    Aga,
    /// Large for gestational age, above the 90th percentile.
    Lga,
}

impl GrowthCategory {
    pub fn label(self) -> &'static str {
        match self {
            GrowthCategory::Sga => "SGA",
            GrowthCategory::Aga => "AGA",
            GrowthCategory::Lga => "LGA",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            GrowthCategory::Sga => "Small for gestational age (<10th percentile)",
            GrowthCategory::Aga => "Appropriate for gestational age (10th-90th percentile)",
            GrowthCategory::Lga => "Large for gestational age (>90th percentile)",
        }
    }
}

/// Percentile weights in kilograms for one (sex, week) cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentileRow {
    pub p3: f64,
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
    pub p97: f64,
}

const fn row(p3: f64, p10: f64, p50: f64, p90: f64, p97: f64) -> PercentileRow {
    PercentileRow {
        p3,
        p10,
        p50,
        p90,
        p97,
    }
}

/// Lowest and highest gestational week covered by the reference.
pub const MIN_REFERENCE_WEEK: u32 = 24;
pub const MAX_REFERENCE_WEEK: u32 = 42;

// Index 0 is week 24, index 9 is week 42.
const BOYS: [PercentileRow; 10] = [
    row(0.48, 0.55, 0.68, 0.82, 0.90),
    row(0.62, 0.71, 0.89, 1.08, 1.19),
    row(0.78, 0.90, 1.14, 1.38, 1.52),
    row(0.98, 1.13, 1.44, 1.75, 1.92),
    row(1.22, 1.40, 1.79, 2.17, 2.38),
    row(1.52, 1.74, 2.21, 2.67, 2.91),
    row(1.88, 2.14, 2.65, 3.17, 3.44),
    row(2.30, 2.57, 3.08, 3.62, 3.91),
    row(2.68, 2.94, 3.48, 4.03, 4.33),
    row(2.98, 3.25, 3.82, 4.40, 4.72),
];

const GIRLS: [PercentileRow; 10] = [
    row(0.45, 0.52, 0.64, 0.78, 0.86),
    row(0.58, 0.67, 0.84, 1.03, 1.14),
    row(0.73, 0.85, 1.08, 1.31, 1.45),
    row(0.93, 1.07, 1.36, 1.67, 1.84),
    row(1.16, 1.33, 1.70, 2.07, 2.28),
    row(1.45, 1.66, 2.11, 2.56, 2.80),
    row(1.80, 2.05, 2.55, 3.05, 3.32),
    row(2.20, 2.46, 2.96, 3.49, 3.78),
    row(2.56, 2.82, 3.35, 3.89, 4.19),
    row(2.85, 3.12, 3.67, 4.25, 4.56),
];

/// Static growth reference lookups.
pub struct GrowthReferenceTable;

impl GrowthReferenceTable {
    /// Row for an exact even week in `24..=42`; `None` for any other week.
    pub fn lookup(sex: Sex, week: u32) -> Option<&'static PercentileRow> {
        if !(MIN_REFERENCE_WEEK..=MAX_REFERENCE_WEEK).contains(&week) || week % 2 != 0 {
            return None;
        }
        let index = ((week - MIN_REFERENCE_WEEK) / 2) as usize;
        let rows = match sex {
            Sex::Male => &BOYS,
            Sex::Female => &GIRLS,
        };
        rows.get(index)
    }

    /// Nearest even week, halves rounding up.
    pub fn reference_week(gestational_weeks: u32) -> u32 {
        (gestational_weeks + 1) / 2 * 2
    }
}

/// SGA / AGA / LGA against the reference row for the baby's sex and gestation.
///
/// `None` when gestational weeks or sex are missing, or weeks fall outside 24-42.
pub fn classify_weight_for_ga(
    weight_kg: f64,
    gestational_weeks: Option<u32>,
    sex: Option<Sex>,
) -> Option<GrowthCategory> {
    let weeks = gestational_weeks?;
    let sex = sex?;
    if !(MIN_REFERENCE_WEEK..=MAX_REFERENCE_WEEK).contains(&weeks) {
        return None;
    }
    let row = GrowthReferenceTable::lookup(sex, GrowthReferenceTable::reference_week(weeks))?;

    let category = if weight_kg < row.p10 {
        GrowthCategory::Sga
    } else if weight_kg <= row.p90 {
        GrowthCategory::Aga
    } else {
        GrowthCategory::Lga
    };
    Some(category)
}
