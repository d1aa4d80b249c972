//! CSV-file repositories under the configured data directory.

use super::{
    AdmissionRepository, AmbulanceRepository, CaseRepository, PatientRepository,
    ShiftHistoryRepository, SupplyRepository, UsageLogRepository,
};
use crate::ambulances::{Ambulance, DriverStatus};
use crate::config::CoreConfig;
use crate::constants::{
    ADMISSION_QUEUE_SCHEMA, AMBULANCE_SCHEDULE_SCHEMA, EMERGENCY_CASES_SCHEMA,
    DATE_FORMAT, MEDICAL_SUPPLY_SCHEMA, NOT_DISCHARGED, PATIENT_DATA_SCHEMA,
    REMOVED_SUPPLY_SCHEMA, SHIFT_HISTORY_SCHEMA, SUPPLY_USAGE_LOG_SCHEMA,
};
use crate::emergency::{CaseStatus, EmergencyCase};
use crate::patients::{AdmissionEntry, AdmissionStatus, Patient};
use crate::shift_history::ShiftRecord;
use crate::supplies::{SupplyBatch, SupplyType, SupplyUsageLogEntry, UsageStatus};
use crate::HmsResult;
use chrono::NaiveDate;
use hms_files::{CsvTable, Row, Schema};
use hms_types::PriorityLevel;
use std::path::PathBuf;
use std::sync::Arc;

/// Older case files carried the patient name in the case row.
const LEGACY_PATIENT_NAME_COLUMN: &str = "patient_name";

/// Repositories backed by the CSV files in [`CoreConfig::data_dir`].
#[derive(Clone, Debug)]
pub struct CsvRepository {
    cfg: Arc<CoreConfig>,
}

impl CsvRepository {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }
}

/// Rows of `path`, or none (with a warning) when the file does not exist yet.
fn read_rows(path: PathBuf, schema: Schema, what: &str) -> HmsResult<Vec<Row>> {
    let table = CsvTable::new(path, schema);
    match table.read()? {
        Some(rows) => {
            tracing::info!("loaded {} {what} from {}", rows.len(), table.path().display());
            Ok(rows)
        }
        None => {
            tracing::warn!(
                "{what} file {} not found, starting empty",
                table.path().display()
            );
            Ok(Vec::new())
        }
    }
}

fn write_rows(path: PathBuf, schema: Schema, rows: &[Vec<String>], what: &str) -> HmsResult<()> {
    let table = CsvTable::new(path, schema);
    table.write_all(rows)?;
    tracing::info!("saved {} {what} to {}", rows.len(), table.path().display());
    Ok(())
}

fn optional(raw: &str) -> Option<String> {
    (!raw.is_empty()).then(|| raw.to_string())
}

fn line_of(row: &Row) -> String {
    row.line()
        .map(|line| format!("line {line}"))
        .unwrap_or_else(|| "unknown line".into())
}

fn case_from_row(row: &Row) -> Option<EmergencyCase> {
    let case_id = row.get("Case_ID");
    if case_id.is_empty() {
        tracing::warn!("skipping case row without Case_ID at {}", line_of(row));
        return None;
    }

    let raw_priority = row.get("Priority_Level");
    if raw_priority.parse::<PriorityLevel>().is_err() {
        tracing::warn!("case {case_id} has priority '{raw_priority}', treating it as 5");
    }

    let status = CaseStatus::parse(row.get("Status"));
    if !status.is_recognised() {
        tracing::warn!("case {case_id} has unrecognised status '{status}'");
    }

    Some(EmergencyCase {
        case_id: case_id.to_string(),
        patient_id: row.get("Patient_ID").to_string(),
        patient_name: row.get(LEGACY_PATIENT_NAME_COLUMN).to_string(),
        emergency_type: row.get("Emergency_Type").to_string(),
        priority: PriorityLevel::from_stored(raw_priority),
        status,
        timestamp_logged: row.get("Timestamp_Logged").to_string(),
        timestamp_processed: optional(row.get("Timestamp_Processed")),
        ambulance_id: optional(row.get("Ambulance_ID")),
    })
}

fn case_to_row(case: &EmergencyCase) -> Vec<String> {
    vec![
        case.case_id.clone(),
        case.patient_id.clone(),
        case.emergency_type.clone(),
        case.priority.to_string(),
        case.status.as_str().to_string(),
        case.timestamp_logged.clone(),
        case.timestamp_processed.clone().unwrap_or_default(),
        case.ambulance_id.clone().unwrap_or_default(),
    ]
}

fn patient_from_row(row: &Row) -> Option<Patient> {
    let patient_id = row.get("Patient_ID");
    if patient_id.is_empty() {
        tracing::warn!("skipping patient row without Patient_ID at {}", line_of(row));
        return None;
    }
    let name = if row.has_column("Name") {
        row.get("Name")
    } else {
        row.get(LEGACY_PATIENT_NAME_COLUMN)
    };

    Some(Patient {
        patient_id: patient_id.to_string(),
        name: name.to_string(),
        age: row.get("Age").to_string(),
        gender: row.get("Gender").to_string(),
        blood_type: row.get("Blood_Type").to_string(),
        height_cm: row.get("Height").to_string(),
        weight_kg: row.get("Weight").to_string(),
        bmi: row.get("BMI").to_string(),
        temperature_c: row.get("Temperature").to_string(),
        heart_rate_bpm: row.get("Heart_Rate").to_string(),
        blood_pressure: row.get("Blood_Pressure").to_string(),
        condition: row.get("Condition").to_string(),
    })
}

fn patient_to_row(p: &Patient) -> Vec<String> {
    vec![
        p.patient_id.clone(),
        p.name.clone(),
        p.age.clone(),
        p.gender.clone(),
        p.blood_type.clone(),
        p.height_cm.clone(),
        p.weight_kg.clone(),
        p.bmi.clone(),
        p.temperature_c.clone(),
        p.heart_rate_bpm.clone(),
        p.blood_pressure.clone(),
        p.condition.clone(),
    ]
}

fn admission_from_row(row: &Row) -> Option<AdmissionEntry> {
    let patient_id = row.get("Patient_ID");
    if patient_id.is_empty() {
        tracing::warn!("skipping queue row without Patient_ID at {}", line_of(row));
        return None;
    }
    let status = AdmissionStatus::parse(row.get("Status"));
    if let AdmissionStatus::Unrecognised(raw) = &status {
        tracing::warn!("admission of {patient_id} has unrecognised status '{raw}'");
    }
    let discharge = row.get("Discharge_Time");

    Some(AdmissionEntry {
        patient_id: patient_id.to_string(),
        condition: row.get("Condition").to_string(),
        admission_time: row.get("Admission_Time").to_string(),
        status,
        discharge_time: (discharge != NOT_DISCHARGED)
            .then(|| optional(discharge))
            .flatten(),
    })
}

fn admission_to_row(e: &AdmissionEntry) -> Vec<String> {
    vec![
        e.patient_id.clone(),
        e.condition.clone(),
        e.admission_time.clone(),
        e.status.as_str().to_string(),
        e.discharge_field().to_string(),
    ]
}

fn supply_from_row(row: &Row) -> Option<SupplyBatch> {
    let batch_id = row.get("Supply_Batch_ID");
    if batch_id.is_empty() {
        tracing::warn!("skipping supply row without Supply_Batch_ID at {}", line_of(row));
        return None;
    }

    let raw_quantity = row.get("Quantity");
    let quantity = raw_quantity.parse::<u32>().unwrap_or_else(|_| {
        tracing::warn!("batch {batch_id} has quantity '{raw_quantity}', treating it as 0");
        0
    });
    let supply_type = SupplyType::parse(row.get("Supply_Type"));
    if !supply_type.is_recognised() {
        tracing::warn!("batch {batch_id} has unrecognised supply type '{supply_type}'");
    }

    Some(SupplyBatch {
        supply_batch_id: batch_id.to_string(),
        name: row.get("Name").to_string(),
        supply_type,
        quantity,
        status: row.get("Status").to_string(),
        supplier_name: row.get("Supplier_Name").to_string(),
        timestamp_added: row.get("Timestamp_Added").to_string(),
        expiry_date: row.get("Expiry_Date").to_string(),
    })
}

fn supply_to_row(b: &SupplyBatch) -> Vec<String> {
    vec![
        b.supply_batch_id.clone(),
        b.name.clone(),
        b.supply_type.as_str().to_string(),
        b.quantity.to_string(),
        b.status.clone(),
        b.supplier_name.clone(),
        b.timestamp_added.clone(),
        b.expiry_date.clone(),
    ]
}

fn usage_from_row(row: &Row) -> Option<SupplyUsageLogEntry> {
    let case_id = row.get("Case_ID");
    let raw_quantity = row.get("Quantity_Used");
    let Ok(quantity_used) = raw_quantity.parse::<u32>() else {
        tracing::warn!(
            "skipping usage row for case '{case_id}' with quantity '{raw_quantity}' at {}",
            line_of(row)
        );
        return None;
    };

    Some(SupplyUsageLogEntry {
        case_id: case_id.to_string(),
        patient_id: row.get("Patient_ID").to_string(),
        supply_batch_id: row.get("Supply_Batch_ID").to_string(),
        supply_name: row.get("Supply_Name").to_string(),
        quantity_used,
        status: UsageStatus::parse(row.get("Status")),
    })
}

fn usage_to_row(e: &SupplyUsageLogEntry) -> Vec<String> {
    vec![
        e.case_id.clone(),
        e.patient_id.clone(),
        e.supply_batch_id.clone(),
        e.supply_name.clone(),
        e.quantity_used.to_string(),
        e.status.as_str().to_string(),
    ]
}

fn ambulance_from_row(row: &Row) -> Option<Ambulance> {
    let ambulance_id = row.get("Ambulance_ID");
    if ambulance_id.is_empty() {
        tracing::warn!("skipping schedule row without Ambulance_ID at {}", line_of(row));
        return None;
    }

    let raw_duration = row.get("Shift_Duration");
    let shift_duration = raw_duration.parse::<u32>().unwrap_or_else(|_| {
        tracing::warn!("ambulance {ambulance_id} has shift duration '{raw_duration}', treating it as 0");
        0
    });

    Some(Ambulance {
        ambulance_id: ambulance_id.to_string(),
        driver_name: row.get("Driver_Name").to_string(),
        driver_status: DriverStatus::parse(row.get("Driver_Status")),
        shift_start: row.get("Shift_Start").to_string(),
        shift_end: row.get("Shift_End").to_string(),
        shift_duration,
        assigned_case_id: optional(row.get("Assigned_Case_ID")),
        ambulance_status: row.get("Ambulance_Status").to_string(),
        location: row.get("Location").to_string(),
    })
}

fn ambulance_to_row(a: &Ambulance) -> Vec<String> {
    vec![
        a.ambulance_id.clone(),
        a.driver_name.clone(),
        a.driver_status.as_str().to_string(),
        a.shift_start.clone(),
        a.shift_end.clone(),
        a.shift_duration.to_string(),
        a.assigned_case_id.clone().unwrap_or_default(),
        a.ambulance_status.clone(),
        a.location.clone(),
    ]
}

fn shift_from_row(row: &Row) -> Option<ShiftRecord> {
    let ambulance_id = row.get("Ambulance_ID");
    let raw_date = row.get("Date_Handled");
    let Ok(handled_on) = NaiveDate::parse_from_str(raw_date, DATE_FORMAT) else {
        tracing::warn!(
            "skipping shift record with date '{raw_date}' at {}",
            line_of(row)
        );
        return None;
    };
    if ambulance_id.is_empty() {
        tracing::warn!("skipping shift record without Ambulance_ID at {}", line_of(row));
        return None;
    }
    Some(ShiftRecord {
        ambulance_id: ambulance_id.to_string(),
        case_id: row.get("Case_ID").to_string(),
        handled_on,
    })
}

fn shift_to_row(record: &ShiftRecord) -> Vec<String> {
    vec![
        record.ambulance_id.clone(),
        record.case_id.clone(),
        record.handled_on.format(DATE_FORMAT).to_string(),
    ]
}

impl CaseRepository for CsvRepository {
    fn load_cases(&self) -> HmsResult<Vec<EmergencyCase>> {
        let rows = read_rows(
            self.cfg.emergency_cases_file(),
            EMERGENCY_CASES_SCHEMA,
            "emergency cases",
        )?;
        Ok(rows.iter().filter_map(case_from_row).collect())
    }

    fn save_cases(&self, cases: &[EmergencyCase]) -> HmsResult<()> {
        let rows: Vec<Vec<String>> = cases.iter().map(case_to_row).collect();
        write_rows(
            self.cfg.emergency_cases_file(),
            EMERGENCY_CASES_SCHEMA,
            &rows,
            "emergency cases",
        )
    }
}

impl PatientRepository for CsvRepository {
    fn load_patients(&self) -> HmsResult<Vec<Patient>> {
        let rows = read_rows(self.cfg.patient_data_file(), PATIENT_DATA_SCHEMA, "patients")?;
        Ok(rows.iter().filter_map(patient_from_row).collect())
    }

    fn save_patients(&self, patients: &[Patient]) -> HmsResult<()> {
        let rows: Vec<Vec<String>> = patients.iter().map(patient_to_row).collect();
        write_rows(self.cfg.patient_data_file(), PATIENT_DATA_SCHEMA, &rows, "patients")
    }
}

impl AdmissionRepository for CsvRepository {
    fn load_admissions(&self) -> HmsResult<Vec<AdmissionEntry>> {
        let rows = read_rows(
            self.cfg.admission_queue_file(),
            ADMISSION_QUEUE_SCHEMA,
            "admissions",
        )?;
        Ok(rows.iter().filter_map(admission_from_row).collect())
    }

    fn save_admissions(&self, entries: &[AdmissionEntry]) -> HmsResult<()> {
        let rows: Vec<Vec<String>> = entries.iter().map(admission_to_row).collect();
        write_rows(
            self.cfg.admission_queue_file(),
            ADMISSION_QUEUE_SCHEMA,
            &rows,
            "admissions",
        )
    }
}

impl SupplyRepository for CsvRepository {
    fn load_supplies(&self) -> HmsResult<Vec<SupplyBatch>> {
        let rows = read_rows(
            self.cfg.medical_supply_file(),
            MEDICAL_SUPPLY_SCHEMA,
            "supply batches",
        )?;
        Ok(rows.iter().filter_map(supply_from_row).collect())
    }

    fn save_supplies(&self, batches: &[SupplyBatch]) -> HmsResult<()> {
        let rows: Vec<Vec<String>> = batches.iter().map(supply_to_row).collect();
        write_rows(
            self.cfg.medical_supply_file(),
            MEDICAL_SUPPLY_SCHEMA,
            &rows,
            "supply batches",
        )
    }

    fn archive_removed(&self, batch: &SupplyBatch, removed_on: &str) -> HmsResult<()> {
        let mut row = supply_to_row(batch);
        row.push(removed_on.to_string());
        CsvTable::new(self.cfg.removed_supply_file(), REMOVED_SUPPLY_SCHEMA).append(&row)?;
        tracing::info!("archived removed batch {}", batch.supply_batch_id);
        Ok(())
    }
}

impl UsageLogRepository for CsvRepository {
    fn load_usage_log(&self) -> HmsResult<Vec<SupplyUsageLogEntry>> {
        let rows = read_rows(
            self.cfg.supply_usage_log_file(),
            SUPPLY_USAGE_LOG_SCHEMA,
            "usage log entries",
        )?;
        Ok(rows.iter().filter_map(usage_from_row).collect())
    }

    fn save_usage_log(&self, entries: &[SupplyUsageLogEntry]) -> HmsResult<()> {
        let rows: Vec<Vec<String>> = entries.iter().map(usage_to_row).collect();
        write_rows(
            self.cfg.supply_usage_log_file(),
            SUPPLY_USAGE_LOG_SCHEMA,
            &rows,
            "usage log entries",
        )
    }

    fn append_usage(&self, entries: &[SupplyUsageLogEntry]) -> HmsResult<()> {
        let rows: Vec<Vec<String>> = entries.iter().map(usage_to_row).collect();
        CsvTable::new(self.cfg.supply_usage_log_file(), SUPPLY_USAGE_LOG_SCHEMA)
            .append_all(&rows)?;
        Ok(())
    }
}

impl AmbulanceRepository for CsvRepository {
    fn load_ambulances(&self) -> HmsResult<Vec<Ambulance>> {
        let rows = read_rows(
            self.cfg.ambulance_schedule_file(),
            AMBULANCE_SCHEDULE_SCHEMA,
            "ambulances",
        )?;
        Ok(rows.iter().filter_map(ambulance_from_row).collect())
    }

    fn save_ambulances(&self, ambulances: &[Ambulance]) -> HmsResult<()> {
        let rows: Vec<Vec<String>> = ambulances.iter().map(ambulance_to_row).collect();
        write_rows(
            self.cfg.ambulance_schedule_file(),
            AMBULANCE_SCHEDULE_SCHEMA,
            &rows,
            "ambulances",
        )
    }
}

impl ShiftHistoryRepository for CsvRepository {
    fn load_shift_history(&self) -> HmsResult<Vec<ShiftRecord>> {
        let rows = read_rows(
            self.cfg.shift_history_file(),
            SHIFT_HISTORY_SCHEMA,
            "shift records",
        )?;
        Ok(rows.iter().filter_map(shift_from_row).collect())
    }

    fn append_shift_record(&self, record: &ShiftRecord) -> HmsResult<()> {
        CsvTable::new(self.cfg.shift_history_file(), SHIFT_HISTORY_SCHEMA)
            .append(&shift_to_row(record))?;
        tracing::info!(
            "recorded case {} for ambulance {}",
            record.case_id,
            record.ambulance_id
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_CASE_ID_BASE;
    use std::fs;
    use tempfile::TempDir;

    fn repo(temp: &TempDir) -> CsvRepository {
        let cfg = CoreConfig::new(temp.path().join("data"), DEFAULT_CASE_ID_BASE).unwrap();
        CsvRepository::new(Arc::new(cfg))
    }

    fn case(id: &str, priority: u8, status: CaseStatus) -> EmergencyCase {
        let mut case = EmergencyCase::pending(
            id,
            "PAT-0001",
            "TRAUMA",
            PriorityLevel::new(priority).unwrap(),
            "2025-03-09 07:05:00",
        );
        case.status = status;
        case
    }

    #[test]
    fn cases_survive_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let repo = repo(&temp);

        let mut processing = case("CASE-3352", 1, CaseStatus::Processing);
        processing.timestamp_processed = Some("2025-03-09 07:10:00".into());
        processing.ambulance_id = Some("AMB-02".into());
        let cases = vec![
            processing,
            case("CASE-3351", 3, CaseStatus::Pending),
            case("CASE-3353", 5, CaseStatus::Completed),
        ];

        repo.save_cases(&cases).unwrap();
        let loaded = repo.load_cases().unwrap();

        assert_eq!(loaded, cases);
    }

    #[test]
    fn missing_files_load_empty() {
        let temp = TempDir::new().unwrap();
        let repo = repo(&temp);

        assert!(repo.load_cases().unwrap().is_empty());
        assert!(repo.load_supplies().unwrap().is_empty());
        assert!(repo.load_directory().unwrap().is_empty());
    }

    #[test]
    fn lenient_case_rows() {
        let temp = TempDir::new().unwrap();
        let repo = repo(&temp);
        fs::write(
            repo.config().emergency_cases_file(),
            "Case_ID,patient_id,patient_name,Emergency_Type,Priority_Level,Status\n\
             C101,PAT-0001,Ada,FIRE,9,Pending\n\
             ,PAT-0002,Bob,FALL,1,Pending\n\
             C102,PAT-0003,Cy,FALL,2,\n",
        )
        .unwrap();

        let loaded = repo.load_cases().unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].priority, PriorityLevel::LEAST_URGENT);
        assert_eq!(loaded[0].patient_name, "Ada");
        assert!(loaded[0].timestamp_processed.is_none());
        assert_eq!(loaded[1].status, CaseStatus::Unrecognised(String::new()));
    }

    #[test]
    fn usage_append_then_rewrite() {
        let temp = TempDir::new().unwrap();
        let repo = repo(&temp);
        let mut entry = SupplyUsageLogEntry {
            case_id: "CASE-3351".into(),
            patient_id: "PAT-0001".into(),
            supply_batch_id: "MED-PAR-0001".into(),
            supply_name: "Paracetamol".into(),
            quantity_used: 4,
            status: UsageStatus::NotDeducted,
        };

        repo.append_usage(std::slice::from_ref(&entry)).unwrap();
        repo.append_usage(&[entry.clone(), entry.clone()]).unwrap();
        repo.append_usage(&[]).unwrap();
        assert_eq!(repo.load_usage_log().unwrap().len(), 3);

        entry.status = UsageStatus::Deducted;
        repo.save_usage_log(std::slice::from_ref(&entry)).unwrap();
        assert_eq!(repo.load_usage_log().unwrap(), vec![entry]);
    }

    #[test]
    fn removed_batches_are_archived_with_date() {
        let temp = TempDir::new().unwrap();
        let repo = repo(&temp);
        let batch = SupplyBatch {
            supply_batch_id: "PPE-GLO-0001".into(),
            name: "Gloves".into(),
            supply_type: SupplyType::Ppe,
            quantity: 50,
            status: "Available".into(),
            supplier_name: "Acme".into(),
            timestamp_added: "2025-01-01".into(),
            expiry_date: "2027-01-01".into(),
        };

        repo.archive_removed(&batch, "2025-03-09").unwrap();

        let text = fs::read_to_string(repo.config().removed_supply_file()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Supply_Batch_ID,Name,Supply_Type,Quantity,Status,Supplier_Name,Timestamp_Added,Expiry_Date,Removed_On")
        );
        assert_eq!(
            lines.next(),
            Some("PPE-GLO-0001,Gloves,PPE,50,Available,Acme,2025-01-01,2027-01-01,2025-03-09")
        );
    }

    #[test]
    fn admissions_keep_not_discharged_placeholder() {
        let temp = TempDir::new().unwrap();
        let repo = repo(&temp);
        let entries = vec![AdmissionEntry {
            patient_id: "PAT-0001".into(),
            condition: "Fever".into(),
            admission_time: "2025-03-09 07:05:00".into(),
            status: AdmissionStatus::Admitted,
            discharge_time: None,
        }];

        repo.save_admissions(&entries).unwrap();
        let text = fs::read_to_string(repo.config().admission_queue_file()).unwrap();
        assert!(text.contains(NOT_DISCHARGED));
        assert_eq!(repo.load_admissions().unwrap(), entries);
    }

    #[test]
    fn shift_history_appends_and_skips_bad_dates() {
        let temp = TempDir::new().unwrap();
        let repo = repo(&temp);
        assert!(repo.load_shift_history().unwrap().is_empty());

        let record = ShiftRecord {
            ambulance_id: "AMB-02".into(),
            case_id: "CASE-3351".into(),
            handled_on: NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
        };
        repo.append_shift_record(&record).unwrap();

        let path = repo.config().shift_history_file();
        let mut text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "Ambulance_ID,Case_ID,Date_Handled\nAMB-02,CASE-3351,2025-03-09\n"
        );

        text.push_str("AMB-03,CASE-3352,yesterday\n");
        fs::write(&path, text).unwrap();
        assert_eq!(repo.load_shift_history().unwrap(), vec![record]);
    }
}
