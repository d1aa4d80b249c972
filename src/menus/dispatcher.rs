use super::{render_table, report, HmsStore, Session};
use crate::console::Console;
use hms_core::ambulances::DriverStatus;
use hms_core::shift_history::StatsPeriod;
use hms_core::validation::parse_positive;
use hms_core::workflows::AmbulanceDispatcher;
use hms_core::{HmsError, HmsResult, NonEmptyText};
use std::io::{BufRead, Write};
use std::sync::Arc;

const OPTIONS: [&str; 5] = [
    "View ambulance schedule",
    "Register driver",
    "Edit shift hours (all ambulances)",
    "Update driver availability",
    "View emergency statistics",
];

pub fn run<S, R, W>(console: &mut Console<R, W>, session: &Session<S>) -> HmsResult<()>
where
    S: HmsStore,
    R: BufRead,
    W: Write,
{
    let mut dispatcher =
        AmbulanceDispatcher::open(Arc::clone(&session.repo), Arc::clone(&session.clock))?;

    loop {
        match console.menu("Ambulance Dispatcher", &OPTIONS, "Back")? {
            0 => return Ok(()),
            1 => {
                let rows: Vec<Vec<String>> = dispatcher
                    .schedule()
                    .as_slice()
                    .iter()
                    .map(|a| {
                        vec![
                            a.ambulance_id.clone(),
                            a.driver_name.clone(),
                            a.driver_status.to_string(),
                            a.shift_start.clone(),
                            a.shift_end.clone(),
                            a.shift_duration.to_string(),
                            a.assigned_case_id.clone().unwrap_or_else(|| "-".into()),
                            a.ambulance_status.clone(),
                        ]
                    })
                    .collect();
                console.say(render_table(
                    &["ID", "Driver", "Driver Status", "Start", "End", "Hours", "Case", "Status"],
                    &rows,
                ))?;
            }
            2 => {
                let ambulance_id = console.read_line("Ambulance ID: ")?;
                let driver =
                    console.prompt_validated("Driver name: ", |raw| Ok(NonEmptyText::new(raw)?))?;
                if report(console, dispatcher.register_driver(&ambulance_id, driver))?.is_some() {
                    console.say("Driver assigned.")?;
                }
            }
            3 => {
                let hours = console.prompt_validated("Shift duration in hours (1-24): ", |raw| {
                    match parse_positive(raw, "shift duration")? {
                        h @ 1..=24 => Ok(h),
                        _ => Err(HmsError::InvalidInput(
                            "shift duration must be between 1 and 24 hours".into(),
                        )),
                    }
                })?;
                if report(console, dispatcher.edit_shift_hours(hours))?.is_some() {
                    console.say("Shift rotation recalculated.")?;
                }
            }
            4 => {
                let driver = console.read_line("Driver name: ")?;
                let status = console.prompt_validated(
                    "New status (Available/Unavailable/OnDuty): ",
                    |raw| match DriverStatus::parse(raw) {
                        DriverStatus::Unrecognised(_) => Err(HmsError::InvalidInput(
                            "status must be Available, Unavailable or OnDuty".into(),
                        )),
                        status => Ok(status),
                    },
                )?;
                if report(console, dispatcher.update_driver_availability(&driver, status))?.is_some() {
                    console.say("Status updated.")?;
                }
            }
            _ => {
                let period =
                    console.prompt_validated("Period (day/week/year): ", StatsPeriod::parse)?;
                if let Some(counts) = report(console, dispatcher.cases_handled(period))? {
                    console.say(format!("Cases handled in the last {period}:"))?;
                    for tally in counts {
                        console.say(format!(
                            "- {} handled {} cases.",
                            tally.ambulance_id, tally.cases
                        ))?;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::menus::tests::{drive, session};
    use chrono::NaiveDate;
    use hms_core::ambulances::{Ambulance, DriverStatus};
    use hms_core::repositories::{AmbulanceRepository, MemoryRepository};
    use hms_core::shift_history::ShiftRecord;
    use tempfile::TempDir;

    fn ambulance(id: &str, driver: &str) -> Ambulance {
        Ambulance {
            ambulance_id: id.into(),
            driver_name: driver.into(),
            driver_status: DriverStatus::Available,
            shift_start: "00:00".into(),
            shift_end: "12:00".into(),
            shift_duration: 12,
            assigned_case_id: None,
            ambulance_status: "Available".into(),
            location: "Base".into(),
        }
    }

    #[test]
    fn edit_shifts_and_availability() {
        let temp = TempDir::new().unwrap();
        let repo = MemoryRepository::new()
            .with_ambulances(vec![ambulance("AMB-01", "Ana"), ambulance("AMB-02", "Ben")]);
        let session = session(&temp, repo);

        let input = [
            "4", "3", "30", "6", "4", "Zed", "Available", "4", "Ben", "busy", "Unavailable", "1",
            "0", "0",
        ]
        .join("\n")
            + "\n";

        let (result, out) = drive(&session, &input);
        assert!(result.is_ok(), "{out}");
        assert!(out.contains("Shift rotation recalculated."));
        assert!(out.contains("driver not found: Zed"));
        assert!(out.contains("Status updated."));

        let saved = session.repo.load_ambulances().unwrap();
        assert_eq!(saved[1].shift_start, "06:00");
        assert_eq!(saved[1].shift_end, "12:00");
        assert_eq!(saved[1].driver_status, DriverStatus::Unavailable);
        assert_eq!(saved[1].ambulance_status, "Inactive");
    }

    #[test]
    fn statistics_by_period() {
        let temp = TempDir::new().unwrap();
        let record = |case_id: &str, day: u32| ShiftRecord {
            ambulance_id: "AMB-01".into(),
            case_id: case_id.into(),
            handled_on: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
        };
        let repo = MemoryRepository::new()
            .with_ambulances(vec![ambulance("AMB-01", "Ana"), ambulance("AMB-02", "Ben")])
            .with_shift_history(vec![record("CASE-3351", 9), record("CASE-3352", 5)]);
        let session = session(&temp, repo);

        let input = ["4", "5", "month", "week", "5", "day", "0", "0"].join("\n") + "\n";

        let (result, out) = drive(&session, &input);
        assert!(result.is_ok(), "{out}");
        assert!(out.contains("period must be day, week or year"));
        assert!(out.contains("Cases handled in the last week:"));
        assert!(out.contains("- AMB-01 handled 2 cases."));
        assert!(out.contains("- AMB-01 handled 1 cases."));
        assert!(out.contains("- AMB-02 handled 0 cases."));
    }
}
