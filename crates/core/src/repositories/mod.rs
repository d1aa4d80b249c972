//! Persistence for each role's data.
//!
//! Every data set is read whole and written whole. The traits here are what
//! the workflows depend on; [`CsvRepository`] backs them with the CSV files in
//! the data directory and [`MemoryRepository`] keeps everything in process.
//!
//! Method names are distinct across traits so one type can implement all of
//! them without call-site disambiguation.

mod csv_repository;
mod memory;

pub use self::csv_repository::CsvRepository;
pub use self::memory::MemoryRepository;

use crate::ambulances::Ambulance;
use crate::emergency::EmergencyCase;
use crate::patients::{AdmissionEntry, Patient, PatientDirectory};
use crate::shift_history::ShiftRecord;
use crate::supplies::{SupplyBatch, SupplyUsageLogEntry};
use crate::HmsResult;

pub trait CaseRepository {
    fn load_cases(&self) -> HmsResult<Vec<EmergencyCase>>;
    fn save_cases(&self, cases: &[EmergencyCase]) -> HmsResult<()>;
}

pub trait PatientRepository {
    fn load_patients(&self) -> HmsResult<Vec<Patient>>;
    fn save_patients(&self, patients: &[Patient]) -> HmsResult<()>;

    /// Id to name lookup over the registered patients.
    fn load_directory(&self) -> HmsResult<PatientDirectory> {
        let patients = self.load_patients()?;
        Ok(PatientDirectory::from_records(
            patients.iter().map(Patient::record),
        ))
    }
}

pub trait AdmissionRepository {
    fn load_admissions(&self) -> HmsResult<Vec<AdmissionEntry>>;
    fn save_admissions(&self, entries: &[AdmissionEntry]) -> HmsResult<()>;
}

pub trait SupplyRepository {
    fn load_supplies(&self) -> HmsResult<Vec<SupplyBatch>>;
    fn save_supplies(&self, batches: &[SupplyBatch]) -> HmsResult<()>;
    /// Record a batch taken out of the inventory on `removed_on`.
    fn archive_removed(&self, batch: &SupplyBatch, removed_on: &str) -> HmsResult<()>;
}

pub trait UsageLogRepository {
    fn load_usage_log(&self) -> HmsResult<Vec<SupplyUsageLogEntry>>;
    fn save_usage_log(&self, entries: &[SupplyUsageLogEntry]) -> HmsResult<()>;
    /// Add `entries` to the end of the log in a single write.
    fn append_usage(&self, entries: &[SupplyUsageLogEntry]) -> HmsResult<()>;
}

pub trait AmbulanceRepository {
    fn load_ambulances(&self) -> HmsResult<Vec<Ambulance>>;
    fn save_ambulances(&self, ambulances: &[Ambulance]) -> HmsResult<()>;
}

pub trait ShiftHistoryRepository {
    fn load_shift_history(&self) -> HmsResult<Vec<ShiftRecord>>;
    fn append_shift_record(&self, record: &ShiftRecord) -> HmsResult<()>;
}
