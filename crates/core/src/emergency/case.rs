use crate::constants::{CASE_ID_PREFIX, LEGACY_CASE_ID_PREFIX};
use hms_types::PriorityLevel;
use serde::Serialize;
use std::fmt;

/// Lifecycle state of an emergency case.
///
/// Stored as the exact words `Pending`, `Processing` and `Completed`. Anything
/// else read from disk (including an empty field) is kept verbatim in
/// [`CaseStatus::Unrecognised`] so it can be reported instead of silently
/// dropping out of every status view.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CaseStatus {
    Pending,
    Processing,
    Completed,
    Unrecognised(String),
}

impl CaseStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "Pending" => Self::Pending,
            "Processing" => Self::Processing,
            "Completed" => Self::Completed,
            other => Self::Unrecognised(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Unrecognised(raw) => raw,
        }
    }

    pub fn is_recognised(&self) -> bool {
        !matches!(self, Self::Unrecognised(_))
    }

    /// Display rank inside a priority band.
    pub(crate) fn display_rank(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Processing => 1,
            Self::Completed => 2,
            Self::Unrecognised(_) => 3,
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrecognised(raw) if raw.is_empty() => f.write_str("<empty>"),
            other => f.write_str(other.as_str()),
        }
    }
}

impl Serialize for CaseStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// One emergency incident.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EmergencyCase {
    /// `CASE-<n>`; older files may use `C<n>`.
    pub case_id: String,
    pub patient_id: String,
    /// Cached from the patient directory when the case is loaded or created.
    pub patient_name: String,
    pub emergency_type: String,
    pub priority: PriorityLevel,
    pub status: CaseStatus,
    pub timestamp_logged: String,
    pub timestamp_processed: Option<String>,
    pub ambulance_id: Option<String>,
}

impl EmergencyCase {
    /// A new pending case with nothing processed or assigned yet.
    pub fn pending(
        case_id: impl Into<String>,
        patient_id: impl Into<String>,
        emergency_type: impl Into<String>,
        priority: PriorityLevel,
        timestamp_logged: impl Into<String>,
    ) -> Self {
        Self {
            case_id: case_id.into(),
            patient_id: patient_id.into(),
            patient_name: String::new(),
            emergency_type: emergency_type.into(),
            priority,
            status: CaseStatus::Pending,
            timestamp_logged: timestamp_logged.into(),
            timestamp_processed: None,
            ambulance_id: None,
        }
    }

    pub fn number(&self) -> Option<u32> {
        case_number(&self.case_id)
    }
}

/// Numeric suffix of a case id, accepting both `CASE-<n>` and `C<n>`.
pub fn case_number(case_id: &str) -> Option<u32> {
    let digits = case_id
        .strip_prefix(CASE_ID_PREFIX)
        .or_else(|| case_id.strip_prefix(LEGACY_CASE_ID_PREFIX))?;
    digits.parse().ok()
}
