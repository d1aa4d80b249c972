//! Medical supply manager.
//!
//! New batches go on top of the inventory and removal always takes the most
//! recent one, which is archived with the date it was removed. The held
//! catalog only keeps a change once the inventory file has it.

use super::reconcile_and_save;
use crate::clock::Clock;
use crate::constants::DATE_FORMAT;
use crate::repositories::{SupplyRepository, UsageLogRepository};
use crate::supplies::{batch_id, ReconcileReport, SupplyBatch, SupplyCatalog, SupplyType};
use crate::validation::validate_batch_number;
use crate::{HmsError, HmsResult};
use chrono::NaiveDate;
use hms_types::NonEmptyText;
use std::sync::Arc;

const AVAILABLE: &str = "Available";

/// Operator input for a received batch.
#[derive(Clone, Debug)]
pub struct NewSupply {
    pub supply_type: SupplyType,
    pub name: NonEmptyText,
    /// Four digits.
    pub batch_number: String,
    pub quantity: u32,
    pub supplier: NonEmptyText,
    pub received: NaiveDate,
    pub expiry: NaiveDate,
}

pub struct SupplyManager<R> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
    catalog: SupplyCatalog,
}

impl<R> SupplyManager<R>
where
    R: SupplyRepository + UsageLogRepository,
{
    pub fn open(repo: Arc<R>, clock: Arc<dyn Clock>) -> HmsResult<Self> {
        let catalog = SupplyCatalog::from_batches(repo.load_supplies()?);
        Ok(Self {
            repo,
            clock,
            catalog,
        })
    }

    pub fn catalog(&self) -> &SupplyCatalog {
        &self.catalog
    }

    pub fn add_supply(&mut self, new: NewSupply) -> HmsResult<SupplyBatch> {
        if !new.supply_type.is_recognised() {
            return Err(HmsError::InvalidInput(
                "supply type must be MED, EQP or PPE".into(),
            ));
        }
        let batch_number = validate_batch_number(&new.batch_number)?;
        if new.quantity == 0 {
            return Err(HmsError::InvalidInput(
                "quantity must be a positive number".into(),
            ));
        }
        if new.expiry <= self.clock.today() {
            return Err(HmsError::InvalidInput(
                "expiry date must be in the future".into(),
            ));
        }

        let batch = SupplyBatch {
            supply_batch_id: batch_id(&new.supply_type, new.name.as_str(), batch_number),
            name: new.name.into_string(),
            supply_type: new.supply_type,
            quantity: new.quantity,
            status: AVAILABLE.to_string(),
            supplier_name: new.supplier.into_string(),
            timestamp_added: new.received.format(DATE_FORMAT).to_string(),
            expiry_date: new.expiry.format(DATE_FORMAT).to_string(),
        };

        self.catalog.push(batch.clone())?;
        if let Err(e) = self.repo.save_supplies(self.catalog.as_slice()) {
            self.catalog.pop_last();
            return Err(e);
        }
        tracing::info!("added supply batch {}", batch.supply_batch_id);
        Ok(batch)
    }

    /// Take the most recently added batch out of the inventory.
    pub fn remove_last(&mut self) -> HmsResult<Option<SupplyBatch>> {
        let Some(batch) = self.catalog.pop_last() else {
            return Ok(None);
        };
        if let Err(e) = self.repo.save_supplies(self.catalog.as_slice()) {
            self.catalog.put_back(batch);
            return Err(e);
        }
        if let Err(e) = self.repo.archive_removed(&batch, &self.clock.date_stamp()) {
            self.catalog.put_back(batch);
            if let Err(restore) = self.repo.save_supplies(self.catalog.as_slice()) {
                tracing::warn!("inventory could not be restored on disk: {restore}");
            }
            return Err(e);
        }
        tracing::info!("removed supply batch {}", batch.supply_batch_id);
        Ok(Some(batch))
    }

    pub fn inventory(&self) -> impl Iterator<Item = &SupplyBatch> {
        self.catalog.newest_first()
    }

    pub fn reconcile(&mut self) -> HmsResult<ReconcileReport> {
        reconcile_and_save(self.repo.as_ref(), &mut self.catalog)
    }
}
