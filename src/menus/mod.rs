//! Interactive role menus.

mod clerk;
mod dispatcher;
mod officer;
mod supplies;

use crate::console::Console;
use hms_core::clock::Clock;
use hms_core::repositories::{
    AdmissionRepository, AmbulanceRepository, CaseRepository, PatientRepository,
    ShiftHistoryRepository, SupplyRepository, UsageLogRepository,
};
use hms_core::{CoreConfig, HmsError, HmsResult};
use std::io::{BufRead, Write};
use std::sync::Arc;

/// Everything a role needs to open its workflow.
pub struct Session<S> {
    pub repo: Arc<S>,
    pub cfg: Arc<CoreConfig>,
    pub clock: Arc<dyn Clock>,
}

/// A repository serving every role.
pub trait HmsStore:
    CaseRepository
    + PatientRepository
    + AdmissionRepository
    + SupplyRepository
    + UsageLogRepository
    + AmbulanceRepository
    + ShiftHistoryRepository
{
}

impl<T> HmsStore for T where
    T: CaseRepository
        + PatientRepository
        + AdmissionRepository
        + SupplyRepository
        + UsageLogRepository
        + AmbulanceRepository
        + ShiftHistoryRepository
{
}

const ROLES: [&str; 4] = [
    "Emergency Department Officer",
    "Patient Admission Clerk",
    "Medical Supply Manager",
    "Ambulance Dispatcher",
];

/// Role selection loop. Returns when the operator exits.
pub fn run<S, R, W>(console: &mut Console<R, W>, session: &Session<S>) -> HmsResult<()>
where
    S: HmsStore,
    R: BufRead,
    W: Write,
{
    loop {
        match console.menu("Hospital Management System", &ROLES, "Exit")? {
            0 => return Ok(()),
            1 => officer::run(console, session)?,
            2 => clerk::run(console, session)?,
            3 => supplies::run(console, session)?,
            _ => dispatcher::run(console, session)?,
        }
    }
}

/// Show a failed operation and carry on; only console failures end the menu.
fn report<T, R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    result: HmsResult<T>,
) -> HmsResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e @ (HmsError::InputClosed | HmsError::Console(_))) => Err(e),
        Err(e) => {
            console.say(format!("Error: {e}"))?;
            Ok(None)
        }
    }
}

/// Left-aligned text table with a dashed rule under the header.
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = padded_line(headers.iter().copied(), &widths);
    out.push('\n');
    out.push_str(&"-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));
    for row in rows {
        out.push('\n');
        out.push_str(&padded_line(row.iter().map(String::as_str), &widths));
    }
    out
}

fn padded_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use hms_core::clock::FixedClock;
    use hms_core::constants::DEFAULT_CASE_ID_BASE;
    use hms_core::repositories::MemoryRepository;
    use std::io::Cursor;
    use tempfile::TempDir;

    pub(super) fn session(temp: &TempDir, repo: MemoryRepository) -> Session<MemoryRepository> {
        let at = NaiveDate::from_ymd_opt(2025, 3, 9)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        Session {
            repo: Arc::new(repo),
            cfg: Arc::new(CoreConfig::new(temp.path().join("data"), DEFAULT_CASE_ID_BASE).unwrap()),
            clock: Arc::new(FixedClock(at)),
        }
    }

    pub(super) fn drive(
        session: &Session<MemoryRepository>,
        input: &str,
    ) -> (HmsResult<()>, String) {
        let mut console = Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        let result = run(&mut console, session);
        let out = String::from_utf8(console.into_output()).unwrap();
        (result, out)
    }

    #[test]
    fn table_pads_columns() {
        let table = render_table(
            &["ID", "Name"],
            &[
                vec!["1".into(), "Ada".into()],
                vec!["100".into(), "Bo".into()],
            ],
        );
        assert_eq!(table, "ID   Name\n---------\n1    Ada\n100  Bo");
    }

    #[test]
    fn exit_and_closed_input() {
        let temp = TempDir::new().unwrap();
        let session = session(&temp, MemoryRepository::new());

        let (result, out) = drive(&session, "0\n");
        assert!(result.is_ok());
        assert!(out.contains("1. Emergency Department Officer"));

        let (result, _) = drive(&session, "1\n");
        assert!(matches!(result, Err(HmsError::InputClosed)));
    }
}
