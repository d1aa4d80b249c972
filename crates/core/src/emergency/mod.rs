//! Emergency case records and the priority-ordered case store.

mod case;
mod store;

pub use case::{case_number, CaseStatus, EmergencyCase};
pub use store::{CaseStore, UpdateOutcome};
