//! Patient records.
//!
//! - [`PatientDirectory`]: read-only id to name lookup used by the emergency desk
//! - [`PatientRegistry`]: full admission records with vitals
//! - [`AdmissionLedger`]: admission history, whose admitted entries form the queue

mod admission;
mod directory;
mod registry;

pub use admission::{AdmissionEntry, AdmissionLedger, AdmissionStatus};
pub use directory::{PatientDirectory, PatientRecord};
pub use registry::{body_mass_index, Patient, PatientForm, PatientRegistry};
