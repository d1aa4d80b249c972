use crate::emergency::CaseStatus;

#[derive(Debug, thiserror::Error)]
pub enum HmsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid text: {0}")]
    Text(#[from] hms_types::TextError),
    #[error("data file error: {0}")]
    Files(#[from] hms_files::FilesError),
    #[error("console I/O failed: {0}")]
    Console(#[from] std::io::Error),
    #[error("could not resolve data directory: {0}")]
    DataDir(String),

    /// Standard input reached end-of-file while a prompt was waiting.
    #[error("input stream closed")]
    InputClosed,

    #[error("emergency case not found: {0}")]
    CaseNotFound(String),
    #[error("case {case_id} is {from}, cannot move it to {to}")]
    InvalidTransition {
        case_id: String,
        from: CaseStatus,
        to: CaseStatus,
    },

    #[error("patient not found: {0}")]
    PatientNotFound(String),
    #[error("patient {0} is already in the admission queue")]
    AlreadyAdmitted(String),

    #[error("supply batch not found: {0}")]
    SupplyBatchNotFound(String),
    #[error("supply batch {0} has no stock left")]
    SupplyBatchEmpty(String),
    #[error("duplicate supply in the same batch: {0}")]
    DuplicateSupply(String),

    #[error("ambulance not found: {0}")]
    AmbulanceNotFound(String),
    #[error("driver not found: {0}")]
    DriverNotFound(String),
}

pub type HmsResult<T> = std::result::Result<T, HmsError>;
