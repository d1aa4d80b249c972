use super::catalog::SupplyCatalog;
use serde::Serialize;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UsageStatus {
    NotDeducted,
    Deducted,
    Unrecognised(String),
}

impl UsageStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "Not Deducted" => Self::NotDeducted,
            "Deducted" => Self::Deducted,
            other => Self::Unrecognised(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::NotDeducted => "Not Deducted",
            Self::Deducted => "Deducted",
            Self::Unrecognised(raw) => raw,
        }
    }
}

impl fmt::Display for UsageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for UsageStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Supplies drawn for one case from one batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SupplyUsageLogEntry {
    pub case_id: String,
    pub patient_id: String,
    pub supply_batch_id: String,
    pub supply_name: String,
    pub quantity_used: u32,
    pub status: UsageStatus,
}

/// Append-only usage log. Only the status column ever changes.
#[derive(Clone, Debug, Default)]
pub struct SupplyUsageLog {
    entries: Vec<SupplyUsageLogEntry>,
}

impl SupplyUsageLog {
    pub fn from_entries(entries: Vec<SupplyUsageLogEntry>) -> Self {
        Self { entries }
    }

    pub fn append(&mut self, entry: SupplyUsageLogEntry) {
        self.entries.push(entry);
    }

    pub fn pending(&self) -> impl Iterator<Item = &SupplyUsageLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.status == UsageStatus::NotDeducted)
    }

    pub fn as_slice(&self) -> &[SupplyUsageLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of one reconciliation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Entries applied to stock in this pass.
    pub deducted: usize,
    /// Batch ids whose stock was below the logged quantity.
    pub insufficient: Vec<String>,
    /// Batch ids named in the log but absent from the inventory.
    pub missing: Vec<String>,
}

impl ReconcileReport {
    pub fn changed(&self) -> bool {
        self.deducted > 0
    }
}

/// Apply every `Not Deducted` entry to its batch.
///
/// An entry is deducted only when its batch exists and holds at least the
/// logged quantity; otherwise it stays `Not Deducted` for a later pass and no
/// partial deduction happens. Running this twice deducts nothing the second
/// time.
pub fn reconcile(log: &mut SupplyUsageLog, catalog: &mut SupplyCatalog) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    for entry in log
        .entries
        .iter_mut()
        .filter(|e| e.status == UsageStatus::NotDeducted)
    {
        let Some(batch) = catalog.find_mut(&entry.supply_batch_id) else {
            tracing::warn!(
                "usage for case {} names unknown batch {}",
                entry.case_id,
                entry.supply_batch_id
            );
            report.missing.push(entry.supply_batch_id.clone());
            continue;
        };

        if batch.quantity < entry.quantity_used {
            tracing::warn!(
                "insufficient stock in {}: have {}, need {} for case {}",
                batch.supply_batch_id,
                batch.quantity,
                entry.quantity_used,
                entry.case_id
            );
            report.insufficient.push(entry.supply_batch_id.clone());
            continue;
        }

        batch.quantity -= entry.quantity_used;
        entry.status = UsageStatus::Deducted;
        report.deducted += 1;
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supplies::{SupplyBatch, SupplyType};

    fn batch(id: &str, quantity: u32) -> SupplyBatch {
        SupplyBatch {
            supply_batch_id: id.into(),
            name: "Paracetamol".into(),
            supply_type: SupplyType::Med,
            quantity,
            status: "Available".into(),
            supplier_name: "Acme".into(),
            timestamp_added: "2025-01-01".into(),
            expiry_date: "2027-01-01".into(),
        }
    }

    fn entry(case_id: &str, batch_id: &str, quantity: u32) -> SupplyUsageLogEntry {
        SupplyUsageLogEntry {
            case_id: case_id.into(),
            patient_id: "PAT-0001".into(),
            supply_batch_id: batch_id.into(),
            supply_name: "Paracetamol".into(),
            quantity_used: quantity,
            status: UsageStatus::NotDeducted,
        }
    }

    #[test]
    fn reconcile_deducts_once() {
        let mut catalog = SupplyCatalog::from_batches(vec![batch("MED-PAR-0001", 10)]);
        let mut log = SupplyUsageLog::from_entries(vec![entry("CASE-3351", "MED-PAR-0001", 4)]);

        let first = reconcile(&mut log, &mut catalog);
        assert_eq!(first.deducted, 1);
        assert_eq!(catalog.find("MED-PAR-0001").unwrap().quantity, 6);
        assert_eq!(log.as_slice()[0].status, UsageStatus::Deducted);

        let second = reconcile(&mut log, &mut catalog);
        assert!(!second.changed());
        assert_eq!(catalog.find("MED-PAR-0001").unwrap().quantity, 6);
    }

    #[test]
    fn insufficient_and_missing_batches_are_left_pending() {
        let mut catalog = SupplyCatalog::from_batches(vec![batch("MED-PAR-0001", 3)]);
        let mut log = SupplyUsageLog::from_entries(vec![
            entry("CASE-3351", "MED-PAR-0001", 4),
            entry("CASE-3352", "MED-GONE-0001", 1),
            entry("CASE-3353", "MED-PAR-0001", 3),
        ]);

        let report = reconcile(&mut log, &mut catalog);

        assert_eq!(report.deducted, 1);
        assert_eq!(report.insufficient, vec!["MED-PAR-0001".to_string()]);
        assert_eq!(report.missing, vec!["MED-GONE-0001".to_string()]);
        assert_eq!(catalog.find("MED-PAR-0001").unwrap().quantity, 0);
        assert_eq!(log.pending().count(), 2);
    }

    #[test]
    fn status_words_match_file_format() {
        assert_eq!(UsageStatus::parse("Not Deducted"), UsageStatus::NotDeducted);
        assert_eq!(UsageStatus::Deducted.as_str(), "Deducted");
        assert_eq!(
            UsageStatus::parse("deducted"),
            UsageStatus::Unrecognised("deducted".into())
        );
    }
}
