use crate::constants::NOT_DISCHARGED;
use serde::Serialize;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdmissionStatus {
    Admitted,
    Discharged,
    Unrecognised(String),
}

impl AdmissionStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "ADMITTED" => Self::Admitted,
            "DISCHARGED" => Self::Discharged,
            other => Self::Unrecognised(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Admitted => "ADMITTED",
            Self::Discharged => "DISCHARGED",
            Self::Unrecognised(raw) => raw,
        }
    }
}

impl fmt::Display for AdmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AdmissionStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// One admission of one patient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AdmissionEntry {
    pub patient_id: String,
    pub condition: String,
    pub admission_time: String,
    pub status: AdmissionStatus,
    /// `None` until discharged; stored as `NOT_DISCHARGED`.
    pub discharge_time: Option<String>,
}

impl AdmissionEntry {
    pub fn discharge_field(&self) -> &str {
        self.discharge_time.as_deref().unwrap_or(NOT_DISCHARGED)
    }
}

/// Admission history in file order. Entries still `ADMITTED` form the FIFO
/// queue; discharged entries stay in the ledger as history.
#[derive(Clone, Debug, Default)]
pub struct AdmissionLedger {
    entries: Vec<AdmissionEntry>,
}

impl AdmissionLedger {
    pub fn from_entries(entries: Vec<AdmissionEntry>) -> Self {
        Self { entries }
    }

    /// Admitted entries, front of the queue first.
    pub fn queue(&self) -> impl Iterator<Item = &AdmissionEntry> {
        self.entries
            .iter()
            .filter(|e| e.status == AdmissionStatus::Admitted)
    }

    pub fn is_admitted(&self, patient_id: &str) -> bool {
        self.queue().any(|e| e.patient_id == patient_id)
    }

    /// 1-based queue position of `patient_id`.
    pub fn position_of(&self, patient_id: &str) -> Option<usize> {
        self.queue()
            .position(|e| e.patient_id == patient_id)
            .map(|i| i + 1)
    }

    /// Append an admitted entry at the back of the queue.
    pub fn enqueue(
        &mut self,
        patient_id: String,
        condition: String,
        admission_time: String,
    ) -> &AdmissionEntry {
        let at = self.entries.len();
        self.entries.push(AdmissionEntry {
            patient_id,
            condition,
            admission_time,
            status: AdmissionStatus::Admitted,
            discharge_time: None,
        });
        &self.entries[at]
    }

    /// Discharge the front of the queue, returning the updated entry.
    pub fn discharge_next(&mut self, discharge_time: String) -> Option<AdmissionEntry> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.status == AdmissionStatus::Admitted)?;
        entry.status = AdmissionStatus::Discharged;
        entry.discharge_time = Some(discharge_time);
        Some(entry.clone())
    }

    pub fn as_slice(&self) -> &[AdmissionEntry] {
        &self.entries
    }
}
