//! Neonatal jaundice decision support.
//!
//! Implements the Tanzania National Guideline for Neonatal Care (2019) jaundice pathway:
//! high-risk screening, Kramer visual grading with estimated bilirubin ranges and actions, and
//! the investigation panel to request.
//!
//! Investigations are only ever recommended for Kramer grade 3 and above or for a baby already
//! flagged as high risk; for everyone else [`recommend_investigations`] returns an empty list.

use crate::RulesError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Gestational weeks below which a baby is preterm.
pub const PRETERM_WEEKS: u32 = 37;

pub const GUIDELINE_SOURCE: &str = "Tanzania National Guideline for Neonatal Care 2019";

/// Actions required for every high-risk baby, in order.
pub const HIGH_RISK_ACTIONS: [&str; 3] = [
    "Basic investigations: FBC, blood group and cross match, mother's blood group, \
     total AND direct bilirubin",
    "Additional assessment: check for rash or microcephaly (TORCHES?), signs of sepsis \
     (add CRP, cultures), jaundice >14 days (add thyroid panel)",
    "Consider phototherapy based on bilirubin results and age",
];

/// Visual jaundice extent by Kramer zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum KramerGrade {
    None = 0,
    HeadAndNeck = 1,
    ToUmbilicus = 2,
    BelowUmbilicusToKnees = 3,
    ArmsAndLowerLegs = 4,
    PalmsAndSoles = 5,
}

impl KramerGrade {
    pub const ALL: [KramerGrade; 6] = [
        KramerGrade::None,
        KramerGrade::HeadAndNeck,
        KramerGrade::ToUmbilicus,
        KramerGrade::BelowUmbilicusToKnees,
        KramerGrade::ArmsAndLowerLegs,
        KramerGrade::PalmsAndSoles,
    ];

    pub fn value(self) -> u8 {
        self as u8
    }

    /// Body zone reached by the jaundice, as taught for bedside assessment.
    pub fn zone(self) -> &'static str {
        KRAMER_ZONES[usize::from(self.value())]
    }
}

/// Body zone for each Kramer grade, indexed by grade.
pub const KRAMER_ZONES: [&str; 6] = [
    "No visible jaundice",
    "Head and neck only",
    "Extends to trunk above umbilicus",
    "Extends to lower trunk below umbilicus to knees",
    "Extends to forearms and lower legs below knees",
    "Extends to palms and soles",
];

impl TryFrom<u8> for KramerGrade {
    type Error = RulesError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        KramerGrade::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(RulesError::InvalidKramerGrade(value))
    }
}

impl From<KramerGrade> for u8 {
    fn from(grade: KramerGrade) -> Self {
        grade.value()
    }
}

impl fmt::Display for KramerGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grade {}", self.value())
    }
}

/// ABO group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AboGroup {
    A,
    B,
    Ab,
    O,
}

/// Rhesus factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RhFactor {
    Positive,
    Negative,
}

/// A blood group such as `O+` or `AB-`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BloodGroup {
    pub abo: AboGroup,
    pub rh: RhFactor,
}

impl BloodGroup {
    pub fn new(abo: AboGroup, rh: RhFactor) -> Self {
        Self { abo, rh }
    }

    pub fn is_rh_negative(&self) -> bool {
        self.rh == RhFactor::Negative
    }
}

impl FromStr for BloodGroup {
    type Err = RulesError;

    /// Accepts `O+`, `ab-`, `A pos`, `B negative` and similar spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();

        const SUFFIXES: [(&str, RhFactor); 6] = [
            ("POSITIVE", RhFactor::Positive),
            ("NEGATIVE", RhFactor::Negative),
            ("POS", RhFactor::Positive),
            ("NEG", RhFactor::Negative),
            ("+", RhFactor::Positive),
            ("-", RhFactor::Negative),
        ];

        let (group, rh) = SUFFIXES
            .iter()
            .find_map(|(suffix, rh)| compact.strip_suffix(*suffix).map(|g| (g, *rh)))
            .ok_or_else(|| RulesError::InvalidBloodGroup(s.to_string()))?;

        let abo = match group {
            "A" => AboGroup::A,
            "B" => AboGroup::B,
            "AB" => AboGroup::Ab,
            "O" | "0" => AboGroup::O,
            _ => return Err(RulesError::InvalidBloodGroup(s.to_string())),
        };

        Ok(Self { abo, rh })
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abo = match self.abo {
            AboGroup::A => "A",
            AboGroup::B => "B",
            AboGroup::Ab => "AB",
            AboGroup::O => "O",
        };
        let rh = match self.rh {
            RhFactor::Positive => "+",
            RhFactor::Negative => "-",
        };
        write!(f, "{abo}{rh}")
    }
}

impl Serialize for BloodGroup {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BloodGroup {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Why a baby is on the high-risk jaundice pathway.
///
/// Records written by the browser version of the tool stored the full description; those
/// strings are accepted when reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskReason {
    #[serde(rename = "preterm", alias = "Preterm baby (GA <37 weeks)")]
    Preterm,
    #[serde(rename = "onset<24h", alias = "Jaundice onset before 24 hours of life")]
    EarlyOnset,
}

impl RiskReason {
    pub fn description(self) -> &'static str {
        match self {
            RiskReason::Preterm => "Preterm baby (GA <37 weeks)",
            RiskReason::EarlyOnset => "Jaundice onset before 24 hours of life",
        }
    }
}

impl fmt::Display for RiskReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JaundiceRisk {
    pub is_high_risk: bool,
    pub reasons: Vec<RiskReason>,
}

/// `true` when gestational age is known and under 37 weeks.
pub fn is_preterm(gestational_weeks: Option<u32>) -> bool {
    gestational_weeks.is_some_and(|w| w < PRETERM_WEEKS)
}

/// High-risk screen. Reasons accumulate: preterm first, then onset before 24 hours.
pub fn assess_jaundice_risk(gestational_weeks: Option<u32>, day_of_life: i64) -> JaundiceRisk {
    let mut reasons = Vec::new();
    if is_preterm(gestational_weeks) {
        reasons.push(RiskReason::Preterm);
    }
    if day_of_life < 1 {
        reasons.push(RiskReason::EarlyOnset);
    }
    JaundiceRisk {
        is_high_risk: !reasons.is_empty(),
        reasons,
    }
}

/// How prominently a recommendation should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Monitor,
    Urgent,
}

/// Guideline recommendation for one Kramer grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KramerRecommendation {
    pub grade: KramerGrade,
    pub title: &'static str,
    pub estimated_bilirubin: &'static str,
    /// Action text; numbered steps are separated by newlines.
    pub action: &'static str,
    pub source: &'static str,
    pub urgency: Urgency,
}

const PRETERM_PATHWAY: &str = "Preterm baby - already in HIGH RISK pathway";

fn grade_two_action(day_of_life: i64, is_preterm: bool) -> &'static str {
    if is_preterm {
        return PRETERM_PATHWAY;
    }
    if day_of_life < 3 {
        return "START PHOTOTHERAPY\nReason: age <3 days\n\
                Also do basic investigations (FBC, blood groups, bilirubin)";
    }
    "Monitor closely. Check for anaemia; if anaemia present, start phototherapy.\n\
     Advise frequent breastfeeding. Reassess daily."
}

/// Fixed recommendation table by Kramer grade.
///
/// Grades 1 and 2 defer to the high-risk pathway for preterm babies. A term baby at grade 2
/// under 3 days old starts phototherapy; older babies are monitored.
pub fn recommend_for_kramer_grade(
    grade: KramerGrade,
    day_of_life: i64,
    is_preterm: bool,
) -> KramerRecommendation {
    let (title, estimated_bilirubin, action, source) = match grade {
        KramerGrade::None => (
            "No Visible Jaundice",
            "Bilirubin likely <4 mg/dL",
            "Continue normal care. Monitor for development of jaundice.",
            "Clinical assessment",
        ),
        KramerGrade::HeadAndNeck => (
            "Grade 1: Head and Neck Only",
            "Estimated: 4-8 mg/dL (68-133 μmol/L)",
            if is_preterm {
                PRETERM_PATHWAY
            } else {
                "Check for red flags (anaemia, lethargy). Advise frequent breastfeeding. \
                 Follow-up in daily rounds."
            },
            "Tanzania National Guideline 2019, Kramer's Rule",
        ),
        KramerGrade::ToUmbilicus => (
            "Grade 2: To Umbilicus",
            "Estimated: 5-12 mg/dL (85-204 μmol/L)",
            grade_two_action(day_of_life, is_preterm),
            "Tanzania National Guideline 2019 - \"Treat if: Age <3 days OR Anaemia\"",
        ),
        KramerGrade::BelowUmbilicusToKnees => (
            "Grade 3: Below Umbilicus to Knees",
            "Estimated: 8-16 mg/dL (136-272 μmol/L)",
            "Action required:\n1. Get Total AND Direct bilirubin levels\n\
             2. Basic investigations (FBC, blood groups)\n\
             3. Phototherapy likely needed (after confirming unconjugated)",
            "Tanzania National Guideline 2019 - \"Always treat Grade 3+\"",
        ),
        KramerGrade::ArmsAndLowerLegs => (
            "Grade 4: Arms and Lower Legs",
            "Estimated: 11-18 mg/dL (187-306 μmol/L)",
            "URGENT action:\n1. URGENT Total AND Direct bilirubin\n2. Full investigations\n\
             3. Intensive phototherapy likely needed\n\
             4. Monitor for exchange transfusion threshold",
            "Tanzania National Guideline 2019",
        ),
        KramerGrade::PalmsAndSoles => (
            "Grade 5: Palms and Soles",
            "Estimated: >18 mg/dL (>306 μmol/L)",
            "CRITICAL - IMMEDIATE ACTION:\n1. STAT Total AND Direct bilirubin\n\
             2. Prepare for intensive phototherapy\n3. Consider exchange transfusion\n\
             4. May need transfer to higher facility",
            "Tanzania National Guideline 2019 - Danger signs",
        ),
    };

    let urgency = if grade >= KramerGrade::BelowUmbilicusToKnees {
        Urgency::Urgent
    } else {
        Urgency::Monitor
    };

    KramerRecommendation {
        grade,
        title,
        estimated_bilirubin,
        action,
        source,
        urgency,
    }
}

/// Clinical findings that extend the investigation panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RiskFlags {
    pub rash: bool,
    pub microcephaly: bool,
    pub sepsis: bool,
    /// Jaundice persisting beyond 14 days.
    pub prolonged_jaundice: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestigationCategory {
    Baseline,
    StronglyRecommended,
    Optional,
    Additional,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investigation {
    pub name: String,
    pub reason: String,
    pub category: InvestigationCategory,
}

impl Investigation {
    fn new(name: &str, reason: &str, category: InvestigationCategory) -> Self {
        Self {
            name: name.to_string(),
            reason: reason.to_string(),
            category,
        }
    }
}

pub const RASH_REASON: &str = "Rash present (TORCHES?)";
pub const MICROCEPHALY_REASON: &str = "Microcephaly present (TORCHES?)";
pub const SEPSIS_REASON: &str = "Signs of sepsis";
pub const PROLONGED_REASON: &str = "Jaundice >14 days";

const BASELINE_PANEL: [(&str, &str); 5] = [
    (
        "Total bilirubin",
        "Confirm severity and guide phototherapy thresholds",
    ),
    (
        "Direct bilirubin",
        "Exclude conjugated hyperbilirubinaemia before phototherapy",
    ),
    (
        "Full blood count (FBC)",
        "Check for anaemia, haemolysis or infection",
    ),
    ("Blood group", "Baby's ABO and Rh group for incompatibility"),
    ("Cross match", "Prepare for possible exchange transfusion"),
];

/// Coombs test recommendation from the mother's blood group, if any.
fn coombs_test(maternal_blood_group: Option<&BloodGroup>) -> Option<Investigation> {
    const NAME: &str = "Direct Coombs test";
    match maternal_blood_group {
        None => Some(Investigation::new(
            NAME,
            "Maternal blood group unavailable: Rh/ABO incompatibility cannot be excluded",
            InvestigationCategory::StronglyRecommended,
        )),
        Some(group) if group.is_rh_negative() => Some(Investigation::new(
            NAME,
            "Mother is Rh-negative: risk of Rh haemolytic disease",
            InvestigationCategory::StronglyRecommended,
        )),
        Some(group) if group.abo == AboGroup::O => Some(Investigation::new(
            NAME,
            "Mother is blood group O: ABO incompatibility possible",
            InvestigationCategory::Optional,
        )),
        Some(_) => None,
    }
}

/// Investigations to request for a jaundiced baby.
///
/// Empty unless `grade >= 3` or `is_high_risk`. Otherwise: the five-test baseline panel, a
/// Coombs test depending on maternal blood group, then tests triggered by `flags`.
pub fn recommend_investigations(
    grade: KramerGrade,
    maternal_blood_group: Option<&BloodGroup>,
    is_high_risk: bool,
    flags: RiskFlags,
) -> Vec<Investigation> {
    if grade < KramerGrade::BelowUmbilicusToKnees && !is_high_risk {
        return Vec::new();
    }

    let mut investigations: Vec<Investigation> = BASELINE_PANEL
        .iter()
        .map(|(name, reason)| Investigation::new(name, reason, InvestigationCategory::Baseline))
        .collect();

    investigations.extend(coombs_test(maternal_blood_group));

    let torches_reason = match (flags.rash, flags.microcephaly) {
        (true, true) => Some(format!("{RASH_REASON}; {MICROCEPHALY_REASON}")),
        (true, false) => Some(RASH_REASON.to_string()),
        (false, true) => Some(MICROCEPHALY_REASON.to_string()),
        (false, false) => None,
    };
    if let Some(reason) = torches_reason {
        investigations.push(Investigation {
            name: "TORCHES screen".to_string(),
            reason,
            category: InvestigationCategory::Additional,
        });
    }

    if flags.sepsis {
        for name in ["C-reactive protein (CRP)", "Blood culture"] {
            investigations.push(Investigation::new(
                name,
                SEPSIS_REASON,
                InvestigationCategory::Additional,
            ));
        }
    }

    if flags.prolonged_jaundice {
        for name in ["TSH", "Free T4"] {
            investigations.push(Investigation::new(
                name,
                PROLONGED_REASON,
                InvestigationCategory::Additional,
            ));
        }
    }

    investigations
}

/// Jaundice assessment as stored on a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JaundiceAssessment {
    #[serde(rename = "kramerScore")]
    pub kramer_grade: KramerGrade,
    pub is_high_risk: bool,
    pub risk_reasons: Vec<RiskReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maternal_blood_group: Option<BloodGroup>,
    #[serde(default)]
    pub risk_flags: RiskFlags,
    #[serde(default)]
    pub investigations: Vec<Investigation>,
    #[serde(rename = "assessmentDate")]
    pub assessed_at: DateTime<Utc>,
}

impl JaundiceAssessment {
    /// Derives risk and investigations for a grade observed at `assessed_at`.
    pub fn assess(
        kramer_grade: KramerGrade,
        gestational_weeks: Option<u32>,
        day_of_life: i64,
        maternal_blood_group: Option<BloodGroup>,
        risk_flags: RiskFlags,
        assessed_at: DateTime<Utc>,
    ) -> Self {
        let risk = assess_jaundice_risk(gestational_weeks, day_of_life);
        let investigations = recommend_investigations(
            kramer_grade,
            maternal_blood_group.as_ref(),
            risk.is_high_risk,
            risk_flags,
        );
        Self {
            kramer_grade,
            is_high_risk: risk.is_high_risk,
            risk_reasons: risk.reasons,
            maternal_blood_group,
            risk_flags,
            investigations,
            assessed_at,
        }
    }
}
