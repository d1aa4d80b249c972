//! Constants used throughout the HMS core crate.
//!
//! File names, column layouts and identifier formats live here so the CSV
//! repositories and the workflows agree on them.

use hms_files::Schema;

/// File whose presence marks the project root when resolving the data directory.
pub const PROJECT_ROOT_MARKER: &str = "Cargo.lock";

/// Data directory name, relative to the project root.
pub const DATA_DIR_NAME: &str = "data";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "HMS_DATA_DIR";

/// Environment variable overriding the case-number floor.
pub const CASE_ID_BASE_ENV: &str = "HMS_CASE_ID_BASE";

/// Case numbers are allocated above this floor when no higher case exists.
pub const DEFAULT_CASE_ID_BASE: u32 = 3350;

/// Prefix of every case id written by this system.
pub const CASE_ID_PREFIX: &str = "CASE-";

/// Prefix used by older case files (`C101`).
pub const LEGACY_CASE_ID_PREFIX: &str = "C";

/// Prefix of admission-registry patient ids (`PAT-0001`).
pub const PATIENT_ID_PREFIX: &str = "PAT-";

/// Name reported for patient ids missing from the directory.
pub const UNKNOWN_PATIENT_NAME: &str = "Unknown";

/// Placeholder stored in the discharge column until a patient is discharged.
pub const NOT_DISCHARGED: &str = "NOT_DISCHARGED";

pub const EMERGENCY_CASES_FILE: &str = "emergency_cases.csv";
pub const PATIENT_DATA_FILE: &str = "patient_data.csv";
pub const ADMISSION_QUEUE_FILE: &str = "queue.csv";
pub const MEDICAL_SUPPLY_FILE: &str = "medical_supply.csv";
pub const REMOVED_SUPPLY_FILE: &str = "removed_supplies.csv";
pub const SUPPLY_USAGE_LOG_FILE: &str = "supply_usage_log.csv";
pub const AMBULANCE_SCHEDULE_FILE: &str = "ambulance_schedule.csv";
pub const SHIFT_HISTORY_FILE: &str = "shift_history.csv";

pub const EMERGENCY_CASES_SCHEMA: Schema = Schema::new(&[
    "Case_ID",
    "Patient_ID",
    "Emergency_Type",
    "Priority_Level",
    "Status",
    "Timestamp_Logged",
    "Timestamp_Processed",
    "Ambulance_ID",
]);

pub const PATIENT_DATA_SCHEMA: Schema = Schema::new(&[
    "Patient_ID",
    "Name",
    "Age",
    "Gender",
    "Blood_Type",
    "Height",
    "Weight",
    "BMI",
    "Temperature",
    "Heart_Rate",
    "Blood_Pressure",
    "Condition",
]);

pub const ADMISSION_QUEUE_SCHEMA: Schema = Schema::new(&[
    "Patient_ID",
    "Condition",
    "Admission_Time",
    "Status",
    "Discharge_Time",
]);

pub const MEDICAL_SUPPLY_SCHEMA: Schema = Schema::new(&[
    "Supply_Batch_ID",
    "Name",
    "Supply_Type",
    "Quantity",
    "Status",
    "Supplier_Name",
    "Timestamp_Added",
    "Expiry_Date",
]);

pub const REMOVED_SUPPLY_SCHEMA: Schema = Schema::new(&[
    "Supply_Batch_ID",
    "Name",
    "Supply_Type",
    "Quantity",
    "Status",
    "Supplier_Name",
    "Timestamp_Added",
    "Expiry_Date",
    "Removed_On",
]);

pub const SUPPLY_USAGE_LOG_SCHEMA: Schema = Schema::new(&[
    "Case_ID",
    "Patient_ID",
    "Supply_Batch_ID",
    "Supply_Name",
    "Quantity_Used",
    "Status",
]);

pub const AMBULANCE_SCHEDULE_SCHEMA: Schema = Schema::new(&[
    "Ambulance_ID",
    "Driver_Name",
    "Driver_Status",
    "Shift_Start",
    "Shift_End",
    "Shift_Duration",
    "Assigned_Case_ID",
    "Ambulance_Status",
    "Location",
]);

/// One row per case an ambulance carried to completion.
pub const SHIFT_HISTORY_SCHEMA: Schema = Schema::new(&["Ambulance_ID", "Case_ID", "Date_Handled"]);

/// `strftime` layout for logged and processed timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `strftime` layout for calendar dates (received, expiry, removed-on).
pub const DATE_FORMAT: &str = "%Y-%m-%d";
