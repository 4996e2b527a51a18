use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fih_advisory::{AdvisoryConfig, AdvisoryService, GeminiClient};
use fih_core::auth::authenticate;
use fih_core::coordinator::{DirectRegistrationForm, PayrollForm, ReceptionForm};
use fih_core::export::export_file_name;
use fih_core::model::{ActivityType, Gender, Patient, PatientStatus, UserRole, Vitals};
use fih_core::search::{PatientQuery, SortDirection, SortKey};
use fih_core::store::{spawn_store, FileSlot, RecordStore};
use fih_core::{Coordinator, CoreConfig};

#[derive(Parser)]
#[command(name = "fih")]
#[command(about = "Freetown International Hospital management CLI")]
struct Cli {
    /// Desk role to act as
    #[arg(long, global = true, default_value = "ADMIN")]
    role: UserRole,
    /// Passphrase for the role, required by commands that change records
    #[arg(long, global = true)]
    passphrase: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Name,
    LastVisit,
    Status,
}

impl From<SortArg> for SortKey {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Name => SortKey::Name,
            SortArg::LastVisit => SortKey::LastVisit,
            SortArg::Status => SortKey::Status,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Check a role passphrase
    Login,
    /// List patients with optional filters
    List {
        /// Free text over name, id, MRN, status, clinic, blood type, contact and email
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        status: Option<PatientStatus>,
        #[arg(long)]
        clinic: Option<String>,
        #[arg(long)]
        blood_type: Option<String>,
        #[arg(long)]
        min_age: Option<u32>,
        #[arg(long)]
        max_age: Option<u32>,
        #[arg(long, value_enum, default_value = "last-visit")]
        sort: SortArg,
        /// Sort ascending instead of descending
        #[arg(long)]
        asc: bool,
    },
    /// Search the archive by name, id, MRN, UPI or national id
    Search { term: String },
    /// Register a patient at the cashier desk and collect the registration fee
    Register {
        name: String,
        age: u32,
        gender: Gender,
        national_id: String,
        clinic: String,
        /// Manual patient id (drafted when omitted)
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        mrn: Option<String>,
        #[arg(long)]
        upi: Option<String>,
        #[arg(long, default_value = "")]
        contact: String,
        #[arg(long)]
        email: Option<String>,
    },
    /// Administrative registration with generated identifiers
    Admit {
        name: String,
        age: u32,
        gender: Gender,
        national_id: String,
        contact: String,
        clinic: String,
        #[arg(long)]
        blood_type: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Open a consultation for a patient awaiting the doctor
    Consult { id: String },
    /// Order catalog tests for a patient
    OrderLabs {
        id: String,
        #[arg(required = true)]
        tests: Vec<String>,
    },
    /// Record clinical findings and close the consultation
    Finalize {
        id: String,
        description: String,
        #[arg(long, default_value = "")]
        bp: String,
        #[arg(long, default_value = "")]
        hr: String,
        #[arg(long, default_value = "")]
        temp: String,
        #[arg(long, default_value = "")]
        spo2: String,
    },
    /// Commit lab results given as TEST_ID=RESULT pairs
    CompleteLab { id: String, results: Vec<String> },
    /// Override the status of one or more patients
    SetStatus {
        status: PatientStatus,
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Export patients as CSV
    Export {
        #[arg(required = true)]
        ids: Vec<String>,
        /// Output directory (defaults to the data directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show the audit trail
    Logs {
        #[arg(long)]
        kind: Option<ActivityType>,
        #[arg(long)]
        by: Option<UserRole>,
    },
    /// Clear the audit trail
    ClearLogs,
    /// Generate a payroll record for a staff member
    Payroll {
        staff_id: String,
        month: String,
        year: String,
        #[arg(long, default_value_t = 0.0)]
        allowances: f64,
        #[arg(long, default_value_t = 0.0)]
        deductions: f64,
    },
    /// Adjust stock by a signed delta
    AdjustStock {
        id: String,
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
    /// Run an advisory safety scan on a patient
    ScanRisk { id: String },
    /// Ask the advisory service for differential findings
    CheckSymptoms { symptoms: String },
    /// Summarise a patient's visit history
    Summarize { id: String },
    /// Ask for diagnostic advice, optionally using a patient's history
    Advise {
        symptoms: String,
        #[arg(long)]
        patient: Option<String>,
    },
}

impl Commands {
    fn mutates(&self) -> bool {
        !matches!(
            self,
            Commands::List { .. }
                | Commands::Search { .. }
                | Commands::Logs { .. }
                | Commands::CheckSymptoms { .. }
                | Commands::Summarize { .. }
                | Commands::Advise { .. }
        )
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn print_patient(p: &Patient) {
    println!(
        "{}  {:<24} {:>3}  {:<16} {:<18} {}  {}",
        p.id,
        p.name,
        p.age,
        p.status,
        p.clinic_label(),
        p.last_visit,
        p.medical_record_number
    );
}

fn parse_results(pairs: &[String]) -> anyhow::Result<BTreeMap<String, String>> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.trim().to_owned(), v.trim().to_owned()))
                .with_context(|| format!("expected TEST_ID=RESULT, got '{}'", pair))
        })
        .collect()
}

/// Entry point for the hospital management CLI
///
/// # Environment Variables
/// - `FIH_DATA_DIR`: directory holding the snapshot (default: "hospital_data")
/// - `FIH_SNAPSHOT_FILE`: snapshot file name (default: "FIH_HMS_DB_V2.json")
/// - `API_KEY`: advisory service key; advisory commands fall back to placeholders without it
/// - `FIH_ADVISORY_BASE_URL`, `FIH_REASONING_MODEL`, `FIH_FAST_MODEL`: advisory overrides
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("fih=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = CoreConfig::resolve(
        env_var("FIH_DATA_DIR").map(PathBuf::from),
        env_var("FIH_SNAPSHOT_FILE"),
    )?;
    let advisory_config = AdvisoryConfig::from_parts(
        env_var("API_KEY"),
        env_var("FIH_ADVISORY_BASE_URL"),
        env_var("FIH_REASONING_MODEL"),
        env_var("FIH_FAST_MODEL"),
    );

    let role = if cli.command.mutates() {
        let passphrase = cli
            .passphrase
            .as_deref()
            .context("this command requires --passphrase")?;
        authenticate(cli.role, passphrase)?
    } else {
        cli.role
    };

    tracing::info!("++ Opening records at {}", config.snapshot_path().display());
    let today = chrono::Utc::now().date_naive();
    let store = RecordStore::open(FileSlot::new(config.snapshot_path()), today)?;
    let (handle, store_task) = spawn_store(store);
    let mut coordinator = Coordinator::load(handle, role).await?;
    let advisory = AdvisoryService::new(GeminiClient::new(&advisory_config)?, &advisory_config);

    run(cli.command, &mut coordinator, &advisory, &config).await?;

    drop(coordinator);
    store_task.await?;
    Ok(())
}

async fn run(
    command: Commands,
    c: &mut Coordinator,
    advisory: &AdvisoryService<GeminiClient>,
    config: &CoreConfig,
) -> anyhow::Result<()> {
    match command {
        Commands::Login => {
            println!("Signed in as {}", c.role().display_name());
        }
        Commands::List {
            text,
            status,
            clinic,
            blood_type,
            min_age,
            max_age,
            sort,
            asc,
        } => {
            let query = PatientQuery {
                text,
                status,
                clinic,
                blood_type,
                min_age,
                max_age,
                sort_by: sort.into(),
                direction: if asc {
                    SortDirection::Asc
                } else {
                    SortDirection::Desc
                },
                ..PatientQuery::default()
            };
            let patients = c.query_patients(&query);
            if patients.is_empty() {
                println!("No patients found.");
            }
            for p in patients {
                print_patient(p);
            }
        }
        Commands::Search { term } => {
            for p in c.search_archive(&term) {
                print_patient(p);
            }
        }
        Commands::Register {
            name,
            age,
            gender,
            national_id,
            clinic,
            id,
            mrn,
            upi,
            contact,
            email,
        } => {
            let draft = c.draft_identifiers();
            let patient = c
                .register_at_reception(ReceptionForm {
                    id: id.unwrap_or(draft.id),
                    upi: upi.or(Some(draft.upi)),
                    medical_record_number: mrn.unwrap_or(draft.medical_record_number),
                    national_id,
                    name,
                    age: Some(age),
                    gender,
                    contact,
                    email,
                    clinic_type: clinic,
                })
                .await?;
            println!(
                "Registered {} ({}), UPI {}",
                patient.name, patient.id, patient.upi
            );
        }
        Commands::Admit {
            name,
            age,
            gender,
            national_id,
            contact,
            clinic,
            blood_type,
            email,
        } => {
            let patient = c
                .register_direct(DirectRegistrationForm {
                    name,
                    age: Some(age),
                    gender,
                    blood_type,
                    national_id,
                    contact,
                    email,
                    clinic_type: clinic,
                })
                .await?;
            println!("Initialised {} ({})", patient.name, patient.id);
        }
        Commands::Consult { id } => {
            let p = c.start_consultation(&id).await?;
            println!("{} is {}", p.name, p.status);
        }
        Commands::OrderLabs { id, tests } => {
            let p = c.commit_lab_order(&id, &tests).await?;
            println!(
                "{} ordered, lab bill {:.0} SLL",
                p.requested_tests().len(),
                p.total_lab_bill.unwrap_or_default()
            );
        }
        Commands::Finalize {
            id,
            description,
            bp,
            hr,
            temp,
            spo2,
        } => {
            let vitals = Vitals { bp, hr, temp, spo2 };
            let p = c.finalize_consultation(&id, &description, vitals).await?;
            println!("{} is {}", p.name, p.status);
        }
        Commands::CompleteLab { id, results } => {
            let p = c.complete_lab(&id, &parse_results(&results)?).await?;
            println!("{} is {}", p.name, p.status);
        }
        Commands::SetStatus { status, ids } => {
            if let [id] = ids.as_slice() {
                c.set_status(id, status).await?;
            } else {
                c.bulk_set_status(&ids, status).await?;
            }
            println!("{} record(s) set to {}", ids.len(), status);
        }
        Commands::Export { ids, out } => {
            let csv = c.export_patients(&ids).await?;
            let dir = out.unwrap_or_else(|| config.data_dir().to_path_buf());
            let path = dir.join(export_file_name(chrono::Utc::now().date_naive()));
            std::fs::write(&path, csv)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Exported {} record(s) to {}", ids.len(), path.display());
        }
        Commands::Logs { kind, by } => {
            for log in c.activity_logs(kind, by) {
                println!(
                    "{}  {:<16} {:<8} {}",
                    log.timestamp.format("%Y-%m-%d %H:%M"),
                    log.kind,
                    log.user_role,
                    log.details
                );
            }
        }
        Commands::ClearLogs => {
            c.clear_activity_logs().await?;
            println!("Audit trail cleared");
        }
        Commands::Payroll {
            staff_id,
            month,
            year,
            allowances,
            deductions,
        } => {
            let record = c
                .generate_payroll(PayrollForm {
                    staff_id,
                    month,
                    year,
                    allowances,
                    deductions,
                })
                .await?;
            println!(
                "{} paid {:.0} SLL for {} {}",
                record.staff_name, record.net_pay, record.month, record.year
            );
        }
        Commands::AdjustStock { id, delta } => {
            let item = c.adjust_stock(&id, delta).await?;
            println!(
                "{}: {} {} ({})",
                item.name,
                item.quantity,
                item.unit,
                item.stock_level()
            );
        }
        Commands::ScanRisk { id } => {
            let alerts = c.run_safety_scan(&id, advisory).await?;
            if alerts.is_empty() {
                println!("No risks detected.");
            }
            for alert in alerts {
                println!("[{:?}] {}: {}", alert.severity, alert.title, alert.description);
            }
        }
        Commands::CheckSymptoms { symptoms } => {
            let analysis = advisory.check_symptoms(&symptoms).await;
            for finding in &analysis.findings {
                println!(
                    "{} ({:?}, {:?}): {}",
                    finding.condition, finding.probability, finding.urgency, finding.reasoning
                );
            }
            println!("{}", analysis.disclaimer);
        }
        Commands::Summarize { id } => {
            let lines = c.history_lines(&id)?;
            println!("{}", advisory.summarize_records(&lines).await);
        }
        Commands::Advise { symptoms, patient } => {
            let history = match patient {
                Some(id) => c.history_lines(&id)?.join("\n"),
                None => String::new(),
            };
            println!("{}", advisory.diagnostic_advice(&symptoms, &history).await);
        }
    }
    Ok(())
}
