//! Role workflows.
//!
//! Each role loads the data it needs when it is opened, works on the in-memory
//! structures and writes the affected data sets back after every mutation.
//!
//! - [`EmergencyOfficer`]: case intake, promotion and completion
//! - [`AdmissionClerk`]: patient registry and admission queue
//! - [`AmbulanceDispatcher`]: drivers, shift rotation and cases handled
//! - [`SupplyManager`]: inventory and usage reconciliation

mod clerk;
mod dispatcher;
mod officer;
mod supply_manager;

pub use clerk::{AdmissionClerk, QueuedPatient};
pub use dispatcher::AmbulanceDispatcher;
pub use officer::{Completion, EmergencyOfficer, NewCase, Promotion, UsageRequest};
pub use supply_manager::{NewSupply, SupplyManager};

use crate::repositories::{SupplyRepository, UsageLogRepository};
use crate::supplies::{reconcile, ReconcileReport, SupplyCatalog, SupplyUsageLog};
use crate::HmsResult;

/// Apply pending usage to `catalog` and persist both data sets when anything
/// was deducted.
pub(crate) fn reconcile_and_save<R>(repo: &R, catalog: &mut SupplyCatalog) -> HmsResult<ReconcileReport>
where
    R: SupplyRepository + UsageLogRepository,
{
    let mut log = SupplyUsageLog::from_entries(repo.load_usage_log()?);
    let report = reconcile(&mut log, catalog);

    if report.changed() {
        repo.save_supplies(catalog.as_slice())?;
        repo.save_usage_log(log.as_slice())?;
    }
    tracing::info!(
        "reconciliation deducted {} entries ({} insufficient, {} missing)",
        report.deducted,
        report.insufficient.len(),
        report.missing.len()
    );
    Ok(report)
}
