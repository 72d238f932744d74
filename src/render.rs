//! Plain-text rendering for terminal output.

use nicu_core::{Patient, PatientSummary, Round};
use nicu_rules::{
    GainStatus, Investigation, InvestigationCategory, JaundiceRisk, KramerRecommendation,
    MaintenanceFluids, MedicationDose, Urgency, VitalStatus,
};
use std::fmt::Write;

fn status_marker(status: Option<VitalStatus>) -> &'static str {
    match status {
        Some(VitalStatus::Low) => " (LOW)",
        Some(VitalStatus::High) => " (HIGH)",
        _ => "",
    }
}

fn category_label(category: InvestigationCategory) -> &'static str {
    match category {
        InvestigationCategory::Baseline => "baseline",
        InvestigationCategory::StronglyRecommended => "strongly recommended",
        InvestigationCategory::Optional => "optional",
        InvestigationCategory::Additional => "additional",
    }
}

pub fn patient_line(patient: &Patient) -> String {
    format!(
        "{}  {:<24} {}  born {}  {}",
        patient.id,
        patient.name.as_str(),
        patient.sex.code(),
        patient.date_of_birth,
        patient.status
    )
}

pub fn patient_detail(patient: &Patient, summary: &PatientSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", patient.name, patient.id);
    let _ = writeln!(out, "  Status:         {}", patient.status);
    if let Some(reason) = &patient.archive_reason {
        let _ = writeln!(out, "  Archive reason: {reason}");
    }
    let _ = writeln!(out, "  Sex:            {}", patient.sex.label());
    let _ = writeln!(
        out,
        "  Born:           {} (DOL {})",
        patient.date_of_birth, summary.day_of_life
    );
    let _ = writeln!(
        out,
        "  Admitted:       {} from {} (DPA {})",
        patient.admission_date, patient.admission_source, summary.day_post_admission
    );

    if let Some(ga) = summary.gestational_age {
        let maturity = summary.maturity.map_or("", |m| m.label());
        let _ = writeln!(out, "  GA:             {ga} weeks, {maturity}");
    }
    if let Some(corrected) = summary.corrected_age {
        let _ = writeln!(
            out,
            "  Corrected age:  {} days ({} chronological)",
            corrected.corrected_days, corrected.chronological_days
        );
    }

    let _ = writeln!(
        out,
        "  Birth weight:   {} ({})",
        patient.birth_weight_kg,
        summary.birth_weight_category.label()
    );
    if let Some(risk) = summary.birth_weight_category.risk_description() {
        let _ = writeln!(out, "                  {risk}");
    }
    if let Some(growth) = summary.weight_for_ga {
        let _ = writeln!(
            out,
            "  Weight for GA:  {} ({})",
            growth.label(),
            growth.description()
        );
    }
    if let Some(current) = patient.current_weight_kg {
        let _ = write!(out, "  Current weight: {current}");
        if let Some(change) = summary.weight_change {
            let _ = write!(out, ", {change} from birth");
        }
        let _ = writeln!(out);
    }
    if let Some(gain) = summary.daily_gain {
        let flag = match gain.status {
            GainStatus::Good => "",
            GainStatus::Concern => " (poor gain)",
        };
        let _ = writeln!(out, "  Average gain:   {} g/day{flag}", gain.grams_per_day);
    }

    let _ = writeln!(out, "  Fluids:         {}", fluids_line(&summary.fluids));

    if !summary.apgar.is_empty() {
        let scores: Vec<String> = summary
            .apgar
            .iter()
            .map(|a| format!("{}' {} ({})", a.minute, a.score, a.interpretation.label()))
            .collect();
        let _ = writeln!(out, "  APGAR:          {}", scores.join(", "));
    }

    let normal = &summary.normal_vitals;
    let _ = writeln!(
        out,
        "  Normal vitals:  HR {} bpm, RR {} /min, T {} °C, SpO2 {} %",
        normal.heart_rate, normal.resp_rate, normal.temperature, normal.spo2
    );

    if let Some(round) = patient.latest_round() {
        let _ = writeln!(out);
        out.push_str(&round_detail(round, summary));
    }

    if let Some(jaundice) = &summary.latest_jaundice {
        let _ = writeln!(
            out,
            "  Last jaundice:  Kramer {} on {}{}",
            jaundice.kramer_grade.value(),
            jaundice.assessed_at.format("%Y-%m-%d"),
            if jaundice.is_high_risk { " (HIGH RISK)" } else { "" }
        );
    }

    let _ = writeln!(out, "  Rounds:         {}", patient.rounds.len());
    out
}

fn round_detail(round: &Round, summary: &PatientSummary) -> String {
    let mut out = String::new();
    let statuses = summary.latest_vitals.unwrap_or_default();
    let vitals = &round.vitals;
    let _ = writeln!(
        out,
        "  Latest round {}",
        round.timestamp.format("%Y-%m-%d %H:%M UTC")
    );
    if let Some(hr) = vitals.heart_rate {
        let _ = writeln!(out, "    HR   {hr} bpm{}", status_marker(statuses.heart_rate));
    }
    if let Some(rr) = vitals.resp_rate {
        let _ = writeln!(out, "    RR   {rr} /min{}", status_marker(statuses.resp_rate));
    }
    if let Some(t) = vitals.temperature_c {
        let _ = writeln!(out, "    T    {t} °C{}", status_marker(statuses.temperature));
    }
    if let Some(spo2) = vitals.spo2 {
        let _ = writeln!(out, "    SpO2 {spo2} %{}", status_marker(statuses.spo2));
    }
    let _ = writeln!(out, "    O2   {}", vitals.oxygen_support.label());
    if !round.plan.is_empty() {
        let _ = writeln!(out, "    Plan {}", round.plan);
    }
    out
}

pub fn fluids_line(fluids: &MaintenanceFluids) -> String {
    format!(
        "{} mL/kg/day = {} mL/day ({} mL/h)",
        fluids.ml_per_kg_per_day, fluids.daily_total_ml, fluids.hourly_rate_ml
    )
}

pub fn dose_line(dose: &MedicationDose) -> String {
    let mut line = format!(
        "{:<28} {} mg/kg {}: {} mg per dose, {} mg/day",
        dose.medication.name(),
        dose.regimen.mg_per_kg,
        dose.regimen.schedule,
        dose.dose.single_dose,
        dose.dose.daily_dose
    );
    if let Some(warning) = dose.regimen.warning {
        let _ = write!(line, "  [{warning}]");
    }
    line
}

pub fn jaundice_guidance(
    risk: &JaundiceRisk,
    recommendation: &KramerRecommendation,
    investigations: &[Investigation],
) -> String {
    let mut out = String::new();
    if risk.is_high_risk {
        let _ = writeln!(out, "HIGH RISK ({}):", nicu_rules::jaundice::GUIDELINE_SOURCE);
        for reason in &risk.reasons {
            let _ = writeln!(out, "  - {reason}");
        }
        for (i, action) in nicu_rules::jaundice::HIGH_RISK_ACTIONS.iter().enumerate() {
            let _ = writeln!(out, "  {}. {action}", i + 1);
        }
        let _ = writeln!(out);
    }

    let marker = match recommendation.urgency {
        Urgency::Urgent => "!! ",
        Urgency::Monitor => "",
    };
    let _ = writeln!(out, "{marker}{}", recommendation.title);
    let _ = writeln!(out, "  {}", recommendation.grade.zone());
    let _ = writeln!(out, "  {}", recommendation.estimated_bilirubin);
    for line in recommendation.action.lines() {
        let _ = writeln!(out, "  {line}");
    }
    let _ = writeln!(out, "  Source: {}", recommendation.source);

    if !investigations.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Investigations:");
        for investigation in investigations {
            let _ = writeln!(
                out,
                "  [{}] {}: {}",
                category_label(investigation.category),
                investigation.name,
                investigation.reason
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use nicu_rules::{
        assess_jaundice_risk, calculate_maintenance_fluids, recommend_for_kramer_grade,
        recommend_investigations, KramerGrade, Medication, RiskFlags,
    };

    #[test]
    fn fluids_line_shows_rates() {
        let fluids = calculate_maintenance_fluids(2.0, 1);
        assert_eq!(fluids_line(&fluids), "60 mL/kg/day = 120 mL/day (5 mL/h)");
    }

    #[test]
    fn dose_line_includes_warning() {
        let line = dose_line(&Medication::Ceftriaxone.dose(2.0, 3));
        assert!(line.contains("100 mg per dose"));
        assert!(line.contains("CONTRAINDICATED"));
    }

    #[test]
    fn guidance_lists_risk_and_investigations() {
        let risk = assess_jaundice_risk(Some(33), 0);
        let grade = KramerGrade::BelowUmbilicusToKnees;
        let rec = recommend_for_kramer_grade(grade, 0, true);
        let investigations = recommend_investigations(grade, None, true, RiskFlags::default());
        let text = jaundice_guidance(&risk, &rec, &investigations);
        assert!(text.starts_with("HIGH RISK (Tanzania National Guideline for Neonatal Care 2019):"));
        assert!(text.contains("Preterm baby (GA <37 weeks)"));
        assert!(text.contains("!! Grade 3"));
        assert!(text.contains("[strongly recommended] Direct Coombs test"));
    }
}
