use anyhow::{Context, bail};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nicu_core::constants::DEFAULT_DATA_DIR;
use nicu_core::{
    ApgarScores, CoreConfig, JaundiceInput, Kilograms, Language, NewPatient,
    NonEmptyText, Patient, PatientId, PatientUpsert, RecordStore, RoundInput, RoundService,
    Vitals,
};
use nicu_rules::{
    BloodGroup, GestationalAge, KramerGrade, Medication, RiskFlags, Sex, calculate_maintenance_fluids,
    calculate_weight_based_dose, day_of_life,
};

mod input;
mod render;

use input::{ActivityArg, ArchiveArg, FeedingArg, FilterArg, OxygenArg, SkinArg};

#[derive(Parser)]
#[command(name = "nicu")]
#[command(about = "NICU rounds charting and decision support")]
struct Cli {
    /// Directory holding the patient, settings and language files
    #[arg(long, global = true, env = "NICU_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List patients
    List {
        #[arg(long, value_enum, default_value = "active")]
        filter: FilterArg,
    },
    /// Admit a new patient
    Add(PatientArgs),
    /// Edit an existing patient's admission details
    Edit {
        id: PatientId,
        #[command(flatten)]
        details: PatientArgs,
    },
    /// Show a patient with computed figures
    Show {
        id: PatientId,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record a daily round
    Round(RoundArgs),
    /// Discharge, transfer or record the death of a patient
    Archive {
        id: PatientId,
        #[arg(long, value_enum)]
        status: ArchiveArg,
        #[arg(long, default_value = "")]
        reason: String,
    },
    /// Delete a patient and all of their rounds
    Delete { id: PatientId },
    /// Jaundice guidance for a patient at a given Kramer grade (not recorded)
    Jaundice {
        id: PatientId,
        #[arg(long, value_parser = input::kramer_grade)]
        kramer: KramerGrade,
        #[command(flatten)]
        risk: JaundiceArgs,
    },
    /// Weight-based medication doses
    Dose {
        #[command(flatten)]
        subject: CalculatorArgs,
        /// One medication from the table; all are listed when omitted
        #[arg(long)]
        medication: Option<Medication>,
        /// Custom dose in mg/kg, used with --frequency
        #[arg(long, requires = "frequency", conflicts_with = "medication")]
        mg_per_kg: Option<f64>,
        /// Doses per day for a custom dose
        #[arg(long, requires = "mg_per_kg")]
        frequency: Option<u32>,
    },
    /// Maintenance fluid requirements
    Fluids {
        #[command(flatten)]
        subject: CalculatorArgs,
    },
    /// Write all patients and settings as JSON
    Export {
        /// Output file; stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replace patients and/or settings from an exported JSON file
    Import { file: PathBuf },
    /// Show or set the interface language
    Language { language: Option<Language> },
}

#[derive(Args)]
struct PatientArgs {
    #[arg(long)]
    name: NonEmptyText,
    #[arg(long)]
    sex: Sex,
    /// Date of birth (YYYY-MM-DD)
    #[arg(long)]
    dob: NaiveDate,
    /// Admission date (YYYY-MM-DD); today when omitted
    #[arg(long)]
    admitted: Option<NaiveDate>,
    /// Where the baby was admitted from
    #[arg(long)]
    source: Option<String>,
    /// Birth weight in kg
    #[arg(long, value_parser = input::birth_weight)]
    birth_weight: Kilograms,
    /// Completed weeks of gestation
    #[arg(long, value_parser = clap::value_parser!(u8).range(20..=45))]
    ga_weeks: Option<u8>,
    /// Additional days of gestation
    #[arg(long, requires = "ga_weeks", value_parser = clap::value_parser!(u8).range(0..=6))]
    ga_days: Option<u8>,
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=10))]
    apgar1: Option<u8>,
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=10))]
    apgar5: Option<u8>,
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=10))]
    apgar10: Option<u8>,
}

impl PatientArgs {
    fn into_new_patient(self) -> NewPatient {
        NewPatient {
            name: self.name,
            sex: self.sex,
            date_of_birth: self.dob,
            admission_date: self.admitted.unwrap_or_else(|| Utc::now().date_naive()),
            admission_source: self.source,
            birth_weight_kg: self.birth_weight,
            gestational_age: self
                .ga_weeks
                .map(|weeks| GestationalAge::new(weeks, self.ga_days.unwrap_or(0))),
            apgar_scores: ApgarScores {
                one_min: self.apgar1,
                five_min: self.apgar5,
                ten_min: self.apgar10,
            },
        }
    }

    /// Applies these details to a copy of `stored` for an edit.
    ///
    /// Optional details left out keep their stored values.
    fn apply_to(self, stored: &Patient) -> Patient {
        let mut edited = stored.clone();
        edited.name = self.name;
        edited.sex = self.sex;
        edited.date_of_birth = self.dob;
        if let Some(admitted) = self.admitted {
            edited.admission_date = admitted;
        }
        if let Some(source) = self.source {
            edited.admission_source = source;
        }
        edited.birth_weight_kg = self.birth_weight;
        if let Some(weeks) = self.ga_weeks {
            edited.ga_weeks = Some(weeks);
            edited.ga_days = self.ga_days.unwrap_or(0);
        }
        let stored_apgar = stored.apgar_scores;
        edited.apgar_scores = ApgarScores {
            one_min: self.apgar1.or(stored_apgar.one_min),
            five_min: self.apgar5.or(stored_apgar.five_min),
            ten_min: self.apgar10.or(stored_apgar.ten_min),
        };
        edited
    }
}

#[derive(Args)]
struct RoundArgs {
    id: PatientId,
    /// Heart rate (bpm)
    #[arg(long, value_parser = clap::value_parser!(u16).range(60..=200))]
    hr: Option<u16>,
    /// Respiratory rate (/min)
    #[arg(long, value_parser = clap::value_parser!(u16).range(20..=80))]
    rr: Option<u16>,
    /// Temperature (°C)
    #[arg(long, value_parser = input::temperature)]
    temp: Option<f64>,
    /// Oxygen saturation (%)
    #[arg(long, value_parser = clap::value_parser!(u8).range(50..=100))]
    spo2: Option<u8>,
    #[arg(long, value_enum, default_value = "room-air")]
    oxygen: OxygenArg,
    /// Weight today (kg)
    #[arg(long, value_parser = input::round_weight)]
    weight: Option<Kilograms>,
    #[arg(long, value_enum, default_value = "normal")]
    skin: SkinArg,
    /// Describe the skin when --skin other
    #[arg(long)]
    skin_description: Option<String>,
    /// Kramer grade, recorded when --skin jaundiced
    #[arg(long, value_parser = input::kramer_grade)]
    kramer: Option<KramerGrade>,
    #[command(flatten)]
    risk: JaundiceArgs,
    #[arg(long, value_enum, default_value = "active")]
    activity: ActivityArg,
    #[arg(long, value_enum, default_value = "breastfeeding")]
    feeding: FeedingArg,
    #[arg(long, default_value = "")]
    notes: String,
    #[arg(long, default_value = "")]
    plan: String,
}

#[derive(Args)]
struct JaundiceArgs {
    /// Mother's blood group, e.g. O+ or A-
    #[arg(long)]
    maternal_blood_group: Option<BloodGroup>,
    /// Rash present
    #[arg(long)]
    rash: bool,
    /// Microcephaly present
    #[arg(long)]
    microcephaly: bool,
    /// Signs of sepsis
    #[arg(long)]
    sepsis: bool,
    /// Jaundice for more than 14 days
    #[arg(long)]
    prolonged: bool,
}

impl JaundiceArgs {
    fn flags(&self) -> RiskFlags {
        RiskFlags {
            rash: self.rash,
            microcephaly: self.microcephaly,
            sepsis: self.sepsis,
            prolonged_jaundice: self.prolonged,
        }
    }
}

#[derive(Args)]
struct CalculatorArgs {
    /// Take weight and age from this patient
    #[arg(long)]
    patient: Option<PatientId>,
    /// Weight in kg
    #[arg(long, value_parser = input::weight)]
    weight: Option<Kilograms>,
    /// Age in days
    #[arg(long)]
    age_days: Option<i64>,
}

impl CalculatorArgs {
    /// Resolves weight and age, falling back to the patient's record.
    fn resolve(&self, store: &RecordStore) -> anyhow::Result<(Kilograms, i64)> {
        let patient = match &self.patient {
            Some(id) => Some(
                store
                    .get_patient(id)?
                    .with_context(|| format!("patient {id} not found"))?,
            ),
            None => None,
        };
        let weight = match (self.weight, &patient) {
            (Some(weight), _) => weight,
            (None, Some(p)) => p.latest_weight(),
            (None, None) => bail!("either --weight or --patient is required"),
        };
        let age_days = match (self.age_days, &patient) {
            (Some(days), _) => days,
            (None, Some(p)) => day_of_life(p.date_of_birth, Utc::now()),
            (None, None) => bail!("either --age-days or --patient is required"),
        };
        Ok((weight, age_days))
    }
}

/// Entry point for the `nicu` command-line tool.
///
/// # Environment Variables
/// - `NICU_DATA_DIR`: data directory (default: "nicu_data"); `--data-dir` takes precedence
/// - `RUST_LOG`: log filter, added to the default `nicu=info`
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("nicu=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let cfg = CoreConfig::new(cli.data_dir.clone())
        .with_context(|| format!("invalid data directory {}", cli.data_dir.display()))?;
    tracing::debug!(data_dir = %cfg.data_dir().display(), "using data directory");
    let store = RecordStore::new(Arc::new(cfg));
    let rounds = RoundService::new(store.clone());

    run(cli.command, &store, &rounds)
}

fn run(command: Commands, store: &RecordStore, rounds: &RoundService) -> anyhow::Result<()> {
    match command {
        Commands::List { filter } => {
            let patients = store.list_patients(filter.into())?;
            if patients.is_empty() {
                println!("No patients found.");
            }
            for patient in &patients {
                println!("{}", render::patient_line(patient));
            }
        }
        Commands::Add(details) => {
            let patient = store.upsert_patient(PatientUpsert::New(details.into_new_patient()))?;
            println!("Admitted {} ({})", patient.name, patient.id);
        }
        Commands::Edit { id, details } => {
            let stored = store
                .get_patient(&id)?
                .with_context(|| format!("patient {id} not found"))?;
            let patient = store.upsert_patient(PatientUpsert::Existing(details.apply_to(&stored)))?;
            println!("Updated {} ({})", patient.name, patient.id);
        }
        Commands::Show { id, json } => {
            let now = Utc::now();
            let patient = store
                .get_patient(&id)?
                .with_context(|| format!("patient {id} not found"))?;
            let summary = nicu_core::summarise(&patient, now);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", render::patient_detail(&patient, &summary));
            }
        }
        Commands::Round(args) => {
            let jaundice = args.kramer.map(|grade| JaundiceInput {
                grade,
                maternal_blood_group: args.risk.maternal_blood_group,
                flags: args.risk.flags(),
            });
            let input = RoundInput {
                vitals: Vitals {
                    heart_rate: args.hr,
                    resp_rate: args.rr,
                    temperature_c: args.temp,
                    spo2: args.spo2,
                    oxygen_support: args.oxygen.into(),
                },
                weight_kg: args.weight,
                skin_color: args.skin.into(),
                skin_description: args.skin_description,
                jaundice,
                activity: args.activity.into(),
                feeding: args.feeding.into(),
                notes: args.notes,
                plan: args.plan,
            };
            let round = rounds
                .record_round(&args.id, input, Utc::now())?
                .with_context(|| format!("patient {} not found", args.id))?;
            println!("Round recorded at {}", round.timestamp.to_rfc3339());
            if let Some(assessment) = &round.clinical.jaundice {
                for investigation in &assessment.investigations {
                    println!("  investigate: {} ({})", investigation.name, investigation.reason);
                }
            }
        }
        Commands::Archive { id, status, reason } => {
            let patient = store
                .archive_patient(&id, status.into(), &reason)?
                .with_context(|| format!("patient {id} not found"))?;
            println!("{} is now {}", patient.name, patient.status);
        }
        Commands::Delete { id } => {
            if !store.delete_patient(&id)? {
                bail!("patient {id} not found");
            }
            println!("Deleted {id}");
        }
        Commands::Jaundice { id, kramer, risk } => {
            let guidance = rounds
                .jaundice_guidance(
                    &id,
                    kramer,
                    risk.maternal_blood_group,
                    risk.flags(),
                    Utc::now(),
                )?
                .with_context(|| format!("patient {id} not found"))?;
            println!("Day of life {}", guidance.day_of_life);
            print!(
                "{}",
                render::jaundice_guidance(
                    &guidance.risk,
                    &guidance.recommendation,
                    &guidance.investigations
                )
            );
        }
        Commands::Dose {
            subject,
            medication,
            mg_per_kg,
            frequency,
        } => {
            let (weight, age_days) = subject.resolve(store)?;
            if let (Some(mg_per_kg), Some(frequency)) = (mg_per_kg, frequency) {
                let dose = calculate_weight_based_dose(weight.get(), mg_per_kg, frequency);
                println!(
                    "{mg_per_kg} mg/kg x {frequency}/day for {weight}: {} mg per dose, {} mg/day",
                    dose.single_dose, dose.daily_dose
                );
                return Ok(());
            }
            let medications = match medication {
                Some(m) => vec![m],
                None => Medication::ALL.to_vec(),
            };
            println!("Doses for {weight}, day {age_days}:");
            for medication in medications {
                println!("  {}", render::dose_line(&medication.dose(weight.get(), age_days)));
            }
        }
        Commands::Fluids { subject } => {
            let (weight, age_days) = subject.resolve(store)?;
            let fluids = calculate_maintenance_fluids(weight.get(), age_days);
            println!("{weight}, day {age_days}: {}", render::fluids_line(&fluids));
        }
        Commands::Export { output } => {
            let bundle = store.export()?;
            let json = serde_json::to_string_pretty(&bundle)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!(
                        "Exported {} patients to {}",
                        bundle.patients.len(),
                        path.display()
                    );
                }
                None => println!("{json}"),
            }
        }
        Commands::Import { file } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let summary = store.import_json(&json)?;
            match summary.patients {
                Some(count) => println!("Imported {count} patients"),
                None => println!("No patient section; patients unchanged"),
            }
            if summary.settings {
                println!("Settings replaced");
            }
        }
        Commands::Language { language } => match language {
            Some(language) => {
                store.set_language(language)?;
                println!("Language set to {language}");
            }
            None => println!("{}", store.language()?),
        },
    }
    Ok(())
}
