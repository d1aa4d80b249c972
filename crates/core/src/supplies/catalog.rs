use super::batch::{SupplyBatch, SupplyType};
use crate::{HmsError, HmsResult};

/// Supply batches in the order they were received.
///
/// The last batch is the most recently added one; the supply manager removes
/// from that end. The type and name views are derived from the flat list on
/// every call.
#[derive(Clone, Debug, Default)]
pub struct SupplyCatalog {
    batches: Vec<SupplyBatch>,
}

impl SupplyCatalog {
    pub fn from_batches(batches: Vec<SupplyBatch>) -> Self {
        Self { batches }
    }

    /// Distinct supply types, sorted.
    pub fn types(&self) -> Vec<SupplyType> {
        let mut types: Vec<SupplyType> =
            self.batches.iter().map(|b| b.supply_type.clone()).collect();
        types.sort();
        types.dedup();
        types
    }

    /// Distinct names carried under `supply_type`, sorted.
    pub fn names_for(&self, supply_type: &SupplyType) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .batches
            .iter()
            .filter(|b| &b.supply_type == supply_type)
            .map(|b| b.name.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Batches of `name` under `supply_type` that still have stock, oldest first.
    pub fn batches_for(&self, name: &str, supply_type: &SupplyType) -> Vec<&SupplyBatch> {
        self.batches
            .iter()
            .filter(|b| b.name == name && &b.supply_type == supply_type && b.quantity > 0)
            .collect()
    }

    pub fn find(&self, batch_id: &str) -> Option<&SupplyBatch> {
        self.batches.iter().find(|b| b.supply_batch_id == batch_id)
    }

    pub fn find_mut(&mut self, batch_id: &str) -> Option<&mut SupplyBatch> {
        self.batches.iter_mut().find(|b| b.supply_batch_id == batch_id)
    }

    /// Whether a batch with this id and name is already stocked.
    pub fn contains(&self, batch_id: &str, name: &str) -> bool {
        self.batches
            .iter()
            .any(|b| b.supply_batch_id == batch_id && b.name == name)
    }

    /// Add a newly received batch on top.
    pub fn push(&mut self, batch: SupplyBatch) -> HmsResult<()> {
        if self.contains(&batch.supply_batch_id, &batch.name) {
            return Err(HmsError::DuplicateSupply(batch.supply_batch_id));
        }
        self.batches.push(batch);
        Ok(())
    }

    /// Remove the most recently added batch.
    pub fn pop_last(&mut self) -> Option<SupplyBatch> {
        self.batches.pop()
    }

    /// Undo [`pop_last`](Self::pop_last).
    pub(crate) fn put_back(&mut self, batch: SupplyBatch) {
        self.batches.push(batch);
    }

    pub fn newest_first(&self) -> impl Iterator<Item = &SupplyBatch> {
        self.batches.iter().rev()
    }

    pub fn as_slice(&self) -> &[SupplyBatch] {
        &self.batches
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}
