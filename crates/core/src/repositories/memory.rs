//! In-process repositories, used by tests and dry runs.

use super::{
    AdmissionRepository, AmbulanceRepository, CaseRepository, PatientRepository,
    ShiftHistoryRepository, SupplyRepository, UsageLogRepository,
};
use crate::ambulances::Ambulance;
use crate::emergency::EmergencyCase;
use crate::patients::{AdmissionEntry, Patient};
use crate::shift_history::ShiftRecord;
use crate::supplies::{SupplyBatch, SupplyUsageLogEntry};
use crate::{HmsError, HmsResult};
use hms_files::FilesError;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Every data set held in memory. Saves replace the stored copy.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    cases: Mutex<Vec<EmergencyCase>>,
    patients: Mutex<Vec<Patient>>,
    admissions: Mutex<Vec<AdmissionEntry>>,
    supplies: Mutex<Vec<SupplyBatch>>,
    removed: Mutex<Vec<(SupplyBatch, String)>>,
    usage: Mutex<Vec<SupplyUsageLogEntry>>,
    ambulances: Mutex<Vec<Ambulance>>,
    shifts: Mutex<Vec<ShiftRecord>>,
    writes: AtomicUsize,
    failing_write: Option<usize>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cases(self, cases: Vec<EmergencyCase>) -> Self {
        *lock(&self.cases) = cases;
        self
    }

    pub fn with_patients(self, patients: Vec<Patient>) -> Self {
        *lock(&self.patients) = patients;
        self
    }

    pub fn with_supplies(self, supplies: Vec<SupplyBatch>) -> Self {
        *lock(&self.supplies) = supplies;
        self
    }

    pub fn with_usage_log(self, usage: Vec<SupplyUsageLogEntry>) -> Self {
        *lock(&self.usage) = usage;
        self
    }

    pub fn with_ambulances(self, ambulances: Vec<Ambulance>) -> Self {
        *lock(&self.ambulances) = ambulances;
        self
    }

    pub fn with_shift_history(self, shifts: Vec<ShiftRecord>) -> Self {
        *lock(&self.shifts) = shifts;
        self
    }

    /// Make the `n`th write (counted from 1 across every data set) fail with
    /// an I/O error, leaving the stored data untouched. Later writes succeed.
    pub fn failing_on_write(mut self, n: usize) -> Self {
        self.failing_write = Some(n);
        self
    }

    /// Batches archived by [`SupplyRepository::archive_removed`], with their
    /// removal dates.
    pub fn removed_supplies(&self) -> Vec<(SupplyBatch, String)> {
        lock(&self.removed).clone()
    }

    fn write(&self) -> HmsResult<()> {
        let n = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing_write == Some(n) {
            return Err(HmsError::Files(FilesError::Io(io::Error::other(format!(
                "write {n} refused"
            )))));
        }
        Ok(())
    }
}

impl CaseRepository for MemoryRepository {
    fn load_cases(&self) -> HmsResult<Vec<EmergencyCase>> {
        Ok(lock(&self.cases).clone())
    }

    fn save_cases(&self, cases: &[EmergencyCase]) -> HmsResult<()> {
        self.write()?;
        *lock(&self.cases) = cases.to_vec();
        Ok(())
    }
}

impl PatientRepository for MemoryRepository {
    fn load_patients(&self) -> HmsResult<Vec<Patient>> {
        Ok(lock(&self.patients).clone())
    }

    fn save_patients(&self, patients: &[Patient]) -> HmsResult<()> {
        self.write()?;
        *lock(&self.patients) = patients.to_vec();
        Ok(())
    }
}

impl AdmissionRepository for MemoryRepository {
    fn load_admissions(&self) -> HmsResult<Vec<AdmissionEntry>> {
        Ok(lock(&self.admissions).clone())
    }

    fn save_admissions(&self, entries: &[AdmissionEntry]) -> HmsResult<()> {
        self.write()?;
        *lock(&self.admissions) = entries.to_vec();
        Ok(())
    }
}

impl SupplyRepository for MemoryRepository {
    fn load_supplies(&self) -> HmsResult<Vec<SupplyBatch>> {
        Ok(lock(&self.supplies).clone())
    }

    fn save_supplies(&self, batches: &[SupplyBatch]) -> HmsResult<()> {
        self.write()?;
        *lock(&self.supplies) = batches.to_vec();
        Ok(())
    }

    fn archive_removed(&self, batch: &SupplyBatch, removed_on: &str) -> HmsResult<()> {
        self.write()?;
        lock(&self.removed).push((batch.clone(), removed_on.to_string()));
        Ok(())
    }
}

impl UsageLogRepository for MemoryRepository {
    fn load_usage_log(&self) -> HmsResult<Vec<SupplyUsageLogEntry>> {
        Ok(lock(&self.usage).clone())
    }

    fn save_usage_log(&self, entries: &[SupplyUsageLogEntry]) -> HmsResult<()> {
        self.write()?;
        *lock(&self.usage) = entries.to_vec();
        Ok(())
    }

    fn append_usage(&self, entries: &[SupplyUsageLogEntry]) -> HmsResult<()> {
        self.write()?;
        lock(&self.usage).extend_from_slice(entries);
        Ok(())
    }
}

impl AmbulanceRepository for MemoryRepository {
    fn load_ambulances(&self) -> HmsResult<Vec<Ambulance>> {
        Ok(lock(&self.ambulances).clone())
    }

    fn save_ambulances(&self, ambulances: &[Ambulance]) -> HmsResult<()> {
        self.write()?;
        *lock(&self.ambulances) = ambulances.to_vec();
        Ok(())
    }
}

impl ShiftHistoryRepository for MemoryRepository {
    fn load_shift_history(&self) -> HmsResult<Vec<ShiftRecord>> {
        Ok(lock(&self.shifts).clone())
    }

    fn append_shift_record(&self, record: &ShiftRecord) -> HmsResult<()> {
        self.write()?;
        lock(&self.shifts).push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_chosen_write_fails() {
        let repo = MemoryRepository::new().failing_on_write(2);
        repo.save_ambulances(&[]).unwrap();

        let err = repo.save_cases(&[]).unwrap_err();
        assert!(matches!(err, HmsError::Files(FilesError::Io(_))));

        repo.save_cases(&[]).unwrap();
        assert!(repo.load_cases().unwrap().is_empty());
    }
}
