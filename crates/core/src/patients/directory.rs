use crate::constants::UNKNOWN_PATIENT_NAME;
use std::collections::HashMap;

/// A patient id and the name shown next to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientRecord {
    pub patient_id: String,
    pub patient_name: String,
}

/// Load-once lookup from patient id to name.
///
/// When the source lists an id twice, the later row wins.
#[derive(Clone, Debug, Default)]
pub struct PatientDirectory {
    names: HashMap<String, String>,
}

impl PatientDirectory {
    pub fn from_records(records: impl IntoIterator<Item = PatientRecord>) -> Self {
        let names = records
            .into_iter()
            .filter(|r| !r.patient_id.is_empty())
            .map(|r| (r.patient_id, r.patient_name))
            .collect();
        Self { names }
    }

    /// Name for `patient_id`, or `"Unknown"`.
    pub fn name_of(&self, patient_id: &str) -> &str {
        self.names
            .get(patient_id.trim())
            .map(String::as_str)
            .unwrap_or(UNKNOWN_PATIENT_NAME)
    }

    pub fn contains(&self, patient_id: &str) -> bool {
        self.names.contains_key(patient_id.trim())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
