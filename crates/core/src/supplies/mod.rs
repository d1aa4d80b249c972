//! Medical supply inventory and the usage log that draws it down.
//!
//! Recording usage and changing stock are separate steps: completing a case
//! appends `Not Deducted` entries to the usage log, and [`reconcile`] later
//! applies them to the batches.

mod batch;
mod catalog;
mod usage;

pub use batch::{batch_id, SupplyBatch, SupplyType};
pub use catalog::SupplyCatalog;
pub use usage::{reconcile, ReconcileReport, SupplyUsageLog, SupplyUsageLogEntry, UsageStatus};
