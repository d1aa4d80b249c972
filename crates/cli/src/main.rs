use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hms_core::ambulances::AmbulanceSchedule;
use hms_core::clock::{Clock, SystemClock};
use hms_core::constants::{CASE_ID_BASE_ENV, DATA_DIR_ENV};
use hms_core::emergency::{CaseStatus, EmergencyCase};
use hms_core::repositories::{
    AdmissionRepository, AmbulanceRepository, CaseRepository, CsvRepository, PatientRepository,
    ShiftHistoryRepository, SupplyRepository, UsageLogRepository,
};
use hms_core::shift_history::StatsPeriod;
use hms_core::workflows::{AdmissionClerk, AmbulanceDispatcher, EmergencyOfficer, SupplyManager};
use hms_core::CoreConfig;

#[derive(Parser)]
#[command(name = "hms")]
#[command(about = "Hospital management system CLI")]
struct Cli {
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Emergency cases
    #[command(subcommand)]
    Cases(CaseCommand),
    /// Medical supply inventory
    #[command(subcommand)]
    Supplies(SupplyCommand),
    /// Ambulance schedule
    #[command(subcommand)]
    Ambulances(AmbulanceCommand),
    /// Patient admissions
    #[command(subcommand)]
    Admissions(AdmissionCommand),
}

#[derive(Subcommand)]
enum CaseCommand {
    /// List cases in display order
    List(CaseFilter),
    /// Show the next pending case without processing it
    Next,
    /// Show the id the next new case would get
    NextId,
}

#[derive(Args)]
struct CaseFilter {
    /// Only cases with this status
    #[arg(long, value_enum, ignore_case = true)]
    status: Option<StatusArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Pending,
    Processing,
    Completed,
}

impl From<StatusArg> for CaseStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Pending => CaseStatus::Pending,
            StatusArg::Processing => CaseStatus::Processing,
            StatusArg::Completed => CaseStatus::Completed,
        }
    }
}

#[derive(Subcommand)]
enum SupplyCommand {
    /// List batches, newest first
    List,
    /// Deduct logged usage from stock
    Reconcile,
}

#[derive(Subcommand)]
enum AmbulanceCommand {
    /// List the ambulance schedule
    List,
    /// Cases handled per ambulance over a trailing period
    Stats {
        #[arg(long, value_enum, default_value = "day")]
        period: PeriodArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PeriodArg {
    Day,
    Week,
    Year,
}

impl From<PeriodArg> for StatsPeriod {
    fn from(arg: PeriodArg) -> Self {
        match arg {
            PeriodArg::Day => StatsPeriod::Day,
            PeriodArg::Week => StatsPeriod::Week,
            PeriodArg::Year => StatsPeriod::Year,
        }
    }
}

#[derive(Subcommand)]
enum AdmissionCommand {
    /// Show the admission queue
    Queue,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("hms=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Use 'hms --help' for commands");
        return Ok(());
    };

    let cfg = Arc::new(CoreConfig::resolve(
        std::env::var(DATA_DIR_ENV).ok(),
        std::env::var(CASE_ID_BASE_ENV).ok(),
        &std::env::current_dir()?,
    )?);
    let repo = Arc::new(CsvRepository::new(Arc::clone(&cfg)));

    print!("{}", execute(command, cli.json, repo, cfg, Arc::new(SystemClock))?);
    Ok(())
}

/// Run one command and return what it prints.
fn execute<R>(
    command: Commands,
    json: bool,
    repo: Arc<R>,
    cfg: Arc<CoreConfig>,
    clock: Arc<dyn Clock>,
) -> anyhow::Result<String>
where
    R: CaseRepository
        + PatientRepository
        + AdmissionRepository
        + SupplyRepository
        + UsageLogRepository
        + AmbulanceRepository
        + ShiftHistoryRepository,
{
    match command {
        Commands::Cases(action) => {
            let officer = EmergencyOfficer::open(repo, cfg, clock)?;
            let store = officer.store();
            match action {
                CaseCommand::List(filter) => {
                    let status_filter: Option<CaseStatus> = filter.status.map(Into::into);
                    let cases: Vec<&EmergencyCase> = match &status_filter {
                        Some(status) => store.iter_by_status(status).collect(),
                        None => store.display_order(),
                    };
                    output(json, &cases, || lines(cases.iter().map(|c| case_line(c))))
                }
                CaseCommand::Next => {
                    let next = officer.peek_next_pending();
                    output(json, &next, || match next {
                        Some(case) => format!("{}\n", case_line(case)),
                        None => "No pending cases.\n".to_string(),
                    })
                }
                CaseCommand::NextId => {
                    let id = store.next_case_id();
                    output(json, &id, || format!("{id}\n"))
                }
            }
        }
        Commands::Supplies(SupplyCommand::List) => {
            let manager = SupplyManager::open(repo, clock)?;
            let batches: Vec<_> = manager.inventory().collect();
            output(json, &batches, || {
                lines(batches.iter().map(|b| {
                    format!(
                        "{} | {} | {} | qty {} | {} | expires {}",
                        b.supply_batch_id, b.name, b.supply_type, b.quantity, b.status, b.expiry_date
                    )
                }))
            })
        }
        Commands::Supplies(SupplyCommand::Reconcile) => {
            let mut manager = SupplyManager::open(repo, clock)?;
            let report = manager.reconcile()?;
            output(json, &report, || {
                format!(
                    "Deducted {} usage entries ({} insufficient, {} missing).\n",
                    report.deducted,
                    report.insufficient.len(),
                    report.missing.len()
                )
            })
        }
        Commands::Ambulances(AmbulanceCommand::List) => {
            let schedule = AmbulanceSchedule::from_ambulances(repo.load_ambulances()?);
            output(json, &schedule.as_slice(), || {
                lines(schedule.as_slice().iter().map(|a| {
                    format!(
                        "{} | {} ({}) | {}-{} | {} | case {}",
                        a.ambulance_id,
                        a.driver_name,
                        a.driver_status,
                        a.shift_start,
                        a.shift_end,
                        a.ambulance_status,
                        a.assigned_case_id.as_deref().unwrap_or("-")
                    )
                }))
            })
        }
        Commands::Ambulances(AmbulanceCommand::Stats { period }) => {
            let dispatcher = AmbulanceDispatcher::open(repo, clock)?;
            let period = StatsPeriod::from(period);
            let counts = dispatcher.cases_handled(period)?;
            output(json, &counts, || {
                lines(counts.iter().map(|c| {
                    format!("{} | {} cases in the last {period}", c.ambulance_id, c.cases)
                }))
            })
        }
        Commands::Admissions(AdmissionCommand::Queue) => {
            let clerk = AdmissionClerk::open(repo, clock)?;
            let queue = clerk.queue();
            output(json, &queue, || {
                lines(queue.iter().map(|q| {
                    format!(
                        "{}. {} | {} | {} | {}",
                        q.position, q.patient_id, q.name, q.condition, q.admission_time
                    )
                }))
            })
        }
    }
}

fn output<T: Serialize + ?Sized>(
    json: bool,
    value: &T,
    text: impl FnOnce() -> String,
) -> anyhow::Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(value)? + "\n")
    } else {
        Ok(text())
    }
}

fn lines(rows: impl Iterator<Item = String>) -> String {
    rows.map(|row| row + "\n").collect()
}

fn case_line(case: &EmergencyCase) -> String {
    format!(
        "{} | {} | {} | {} | P{} | {} | {}",
        case.case_id,
        case.patient_id,
        case.patient_name,
        case.emergency_type,
        case.priority,
        case.status,
        case.ambulance_id.as_deref().unwrap_or("-")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use hms_core::clock::FixedClock;
    use hms_core::ambulances::{Ambulance, DriverStatus};
    use hms_core::repositories::MemoryRepository;
    use hms_core::shift_history::ShiftRecord;
    use hms_core::supplies::{SupplyUsageLogEntry, UsageStatus};
    use hms_core::PriorityLevel;
    use tempfile::TempDir;

    fn case(id: &str, priority: u8, status: CaseStatus) -> EmergencyCase {
        EmergencyCase {
            case_id: id.into(),
            patient_id: "PAT-0001".into(),
            patient_name: String::new(),
            emergency_type: "TRAUMA".into(),
            priority: PriorityLevel::new(priority).unwrap(),
            status,
            timestamp_logged: "2025-03-09 08:00:00".into(),
            timestamp_processed: None,
            ambulance_id: None,
        }
    }

    fn run(args: &[&str], repo: MemoryRepository) -> (String, Arc<MemoryRepository>) {
        let temp = TempDir::new().unwrap();
        let cfg = Arc::new(CoreConfig::new(temp.path().join("data"), 3350).unwrap());
        let at = NaiveDate::from_ymd_opt(2025, 3, 9)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let repo = Arc::new(repo);
        let cli = Cli::try_parse_from(args).unwrap();
        let out = execute(
            cli.command.unwrap(),
            cli.json,
            Arc::clone(&repo),
            cfg,
            Arc::new(FixedClock(at)),
        )
        .unwrap();
        (out, repo)
    }

    #[test]
    fn cases_filtered_by_status() {
        let repo = MemoryRepository::new().with_cases(vec![
            case("CASE-3351", 2, CaseStatus::Pending),
            case("CASE-3352", 1, CaseStatus::Completed),
        ]);
        let (out, _) = run(&["hms", "cases", "list", "--status", "Completed"], repo);
        assert_eq!(out.lines().count(), 1);
        assert!(out.starts_with("CASE-3352 | PAT-0001 | Unknown | TRAUMA | P1 | Completed"));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let parsed = Cli::try_parse_from(["hms", "cases", "list", "--status", "Done"]);
        assert!(parsed.is_err());

        let repo = MemoryRepository::new().with_cases(vec![
            case("CASE-3351", 2, CaseStatus::Pending),
            case("CASE-3352", 1, CaseStatus::Completed),
        ]);
        let (out, _) = run(&["hms", "cases", "list", "--status", "pending"], repo);
        assert!(out.starts_with("CASE-3351"));
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn ambulance_stats_for_period() {
        let ambulance = Ambulance {
            ambulance_id: "AMB-01".into(),
            driver_name: "Ana".into(),
            driver_status: DriverStatus::Available,
            shift_start: "00:00".into(),
            shift_end: "08:00".into(),
            shift_duration: 8,
            assigned_case_id: None,
            ambulance_status: "Available".into(),
            location: "Base".into(),
        };
        let repo = || {
            MemoryRepository::new()
                .with_ambulances(vec![ambulance.clone()])
                .with_shift_history(vec![ShiftRecord {
                    ambulance_id: "AMB-01".into(),
                    case_id: "CASE-3351".into(),
                    handled_on: NaiveDate::from_ymd_opt(2025, 3, 6).unwrap(),
                }])
        };

        let (out, _) = run(&["hms", "ambulances", "stats"], repo());
        assert_eq!(out, "AMB-01 | 0 cases in the last day\n");

        let (out, _) = run(&["hms", "ambulances", "stats", "--period", "week"], repo());
        assert_eq!(out, "AMB-01 | 1 cases in the last week\n");

        assert!(Cli::try_parse_from(["hms", "ambulances", "stats", "--period", "month"]).is_err());
    }

    #[test]
    fn next_case_as_json() {
        let repo = || {
            MemoryRepository::new().with_cases(vec![
                case("CASE-3360", 3, CaseStatus::Pending),
                case("CASE-3358", 1, CaseStatus::Processing),
            ])
        };
        let (out, _) = run(&["hms", "--json", "cases", "next"], repo());
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["case_id"], "CASE-3360");

        let (out, _) = run(&["hms", "cases", "next-id"], repo());
        assert_eq!(out, "CASE-3361\n");
    }

    #[test]
    fn reconcile_reports_and_saves() {
        let repo = MemoryRepository::new().with_usage_log(vec![SupplyUsageLogEntry {
            case_id: "CASE-3351".into(),
            patient_id: "PAT-0001".into(),
            supply_batch_id: "MED-PAR-0001".into(),
            supply_name: "Paracetamol".into(),
            quantity_used: 4,
            status: UsageStatus::NotDeducted,
        }]);
        let (out, repo) = run(&["hms", "supplies", "reconcile"], repo);
        assert_eq!(out, "Deducted 0 usage entries (0 insufficient, 1 missing).\n");
        assert_eq!(
            repo.load_usage_log().unwrap()[0].status,
            UsageStatus::NotDeducted
        );
    }

    #[test]
    fn empty_queue_prints_nothing() {
        let (out, _) = run(&["hms", "admissions", "queue"], MemoryRepository::new());
        assert!(out.is_empty());
    }
}
