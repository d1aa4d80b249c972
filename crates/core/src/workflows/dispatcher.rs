//! Ambulance dispatcher: drivers, availability, shift rotation and the
//! cases each ambulance has handled.

use crate::ambulances::{AmbulanceSchedule, DriverStatus};
use crate::clock::Clock;
use crate::repositories::{AmbulanceRepository, ShiftHistoryRepository};
use crate::shift_history::{self, CasesHandled, StatsPeriod};
use crate::HmsResult;
use hms_types::NonEmptyText;
use std::sync::Arc;

pub struct AmbulanceDispatcher<R> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
    schedule: AmbulanceSchedule,
}

impl<R> AmbulanceDispatcher<R>
where
    R: AmbulanceRepository + ShiftHistoryRepository,
{
    pub fn open(repo: Arc<R>, clock: Arc<dyn Clock>) -> HmsResult<Self> {
        let schedule = AmbulanceSchedule::from_ambulances(repo.load_ambulances()?);
        Ok(Self {
            repo,
            clock,
            schedule,
        })
    }

    pub fn schedule(&self) -> &AmbulanceSchedule {
        &self.schedule
    }

    pub fn register_driver(&mut self, ambulance_id: &str, driver: NonEmptyText) -> HmsResult<()> {
        self.schedule.register_driver(ambulance_id, driver)?;
        self.save()?;
        tracing::info!("driver registered on ambulance {}", ambulance_id.trim());
        Ok(())
    }

    pub fn edit_shift_hours(&mut self, hours: u32) -> HmsResult<()> {
        self.schedule.recalculate_shifts(hours)?;
        self.save()?;
        tracing::info!("shift rotation recalculated for {hours}h shifts");
        Ok(())
    }

    pub fn update_driver_availability(
        &mut self,
        driver_name: &str,
        status: DriverStatus,
    ) -> HmsResult<()> {
        self.schedule
            .update_driver_availability(driver_name, status)?;
        self.save()
    }

    /// Cases completed per scheduled ambulance over `period`, ending today.
    ///
    /// The history is read fresh so cases completed by the officer since this
    /// dispatcher was opened are counted.
    pub fn cases_handled(&self, period: StatsPeriod) -> HmsResult<Vec<CasesHandled>> {
        let history = self.repo.load_shift_history()?;
        Ok(shift_history::cases_handled(
            self.schedule.as_slice(),
            &history,
            period,
            self.clock.today(),
        ))
    }

    fn save(&self) -> HmsResult<()> {
        self.repo.save_ambulances(self.schedule.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ambulances::{Ambulance, INACTIVE_STATUS};
    use crate::clock::FixedClock;
    use crate::repositories::MemoryRepository;
    use crate::shift_history::ShiftRecord;
    use crate::HmsError;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock(date(2025, 3, 9).and_hms_opt(18, 0, 0).unwrap()))
    }

    fn ambulance(id: &str, driver: &str) -> Ambulance {
        Ambulance {
            ambulance_id: id.into(),
            driver_name: driver.into(),
            driver_status: DriverStatus::OnDuty,
            shift_start: "06:00".into(),
            shift_end: "18:00".into(),
            shift_duration: 12,
            assigned_case_id: None,
            ambulance_status: "On Duty".into(),
            location: "North".into(),
        }
    }

    fn dispatcher() -> (Arc<MemoryRepository>, AmbulanceDispatcher<MemoryRepository>) {
        let repo = Arc::new(MemoryRepository::new().with_ambulances(vec![
            ambulance("AMB-01", "Ana"),
            ambulance("AMB-02", "Ben"),
        ]));
        let dispatcher = AmbulanceDispatcher::open(Arc::clone(&repo), clock()).unwrap();
        (repo, dispatcher)
    }

    #[test]
    fn edits_are_written_back() {
        let (repo, mut dispatcher) = dispatcher();

        dispatcher.edit_shift_hours(12).unwrap();
        dispatcher
            .update_driver_availability("Ben", DriverStatus::Unavailable)
            .unwrap();
        dispatcher
            .register_driver("AMB-01", NonEmptyText::new("Cai").unwrap())
            .unwrap();

        let saved = repo.load_ambulances().unwrap();
        assert_eq!(saved[1].shift_start, "12:00");
        assert_eq!(saved[1].shift_end, "00:00");
        assert_eq!(saved[1].ambulance_status, INACTIVE_STATUS);
        assert_eq!(saved[0].driver_name, "Cai");
        assert_eq!(saved[0].driver_status, DriverStatus::Available);
    }

    #[test]
    fn failed_edits_leave_file_alone() {
        let (repo, mut dispatcher) = dispatcher();

        assert!(dispatcher.edit_shift_hours(30).is_err());
        assert!(matches!(
            dispatcher.register_driver("AMB-09", NonEmptyText::new("Cai").unwrap()),
            Err(HmsError::AmbulanceNotFound(_))
        ));

        let saved = repo.load_ambulances().unwrap();
        assert_eq!(saved[0].shift_duration, 12);
        assert_eq!(saved[0].driver_name, "Ana");
    }

    #[test]
    fn cases_handled_counts_up_to_today() {
        let (repo, dispatcher) = dispatcher();
        for (case_id, handled_on) in [
            ("CASE-3351", date(2025, 3, 9)),
            ("CASE-3352", date(2025, 3, 4)),
            ("CASE-3353", date(2024, 12, 1)),
        ] {
            repo.append_shift_record(&ShiftRecord {
                ambulance_id: "AMB-02".into(),
                case_id: case_id.into(),
                handled_on,
            })
            .unwrap();
        }

        let counts = |period| -> Vec<usize> {
            dispatcher
                .cases_handled(period)
                .unwrap()
                .iter()
                .map(|c| c.cases)
                .collect()
        };
        assert_eq!(counts(StatsPeriod::Day), vec![0, 1]);
        assert_eq!(counts(StatsPeriod::Week), vec![0, 2]);
        assert_eq!(counts(StatsPeriod::Year), vec![0, 3]);
        assert_eq!(dispatcher.cases_handled(StatsPeriod::Day).unwrap()[1].ambulance_id, "AMB-02");
    }
}
