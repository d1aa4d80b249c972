//! Emergency department officer.
//!
//! Owns the case store for the session. Cases move Pending -> Processing ->
//! Completed and never back; promotion may attach an ambulance, completion
//! records the supplies used and frees the ambulance again.
//!
//! The case file is written first in both transitions. When a later write
//! fails the case is put back as it was, in memory and on disk, so the case
//! file never claims an ambulance or usage that was not recorded.

use super::reconcile_and_save;
use crate::ambulances::AmbulanceSchedule;
use crate::catalog::TypeCatalog;
use crate::clock::Clock;
use crate::config::CoreConfig;
use crate::emergency::{CaseStatus, CaseStore, EmergencyCase};
use crate::patients::PatientDirectory;
use crate::repositories::{
    AmbulanceRepository, CaseRepository, PatientRepository, ShiftHistoryRepository,
    SupplyRepository, UsageLogRepository,
};
use crate::shift_history::ShiftRecord;
use crate::supplies::{ReconcileReport, SupplyCatalog, SupplyUsageLogEntry, UsageStatus};
use crate::{HmsError, HmsResult};
use hms_types::{NonEmptyText, PriorityLevel};
use std::sync::Arc;

/// Operator input for a new case.
#[derive(Clone, Debug)]
pub struct NewCase {
    pub patient_id: NonEmptyText,
    pub emergency_type: NonEmptyText,
    pub priority: PriorityLevel,
}

/// A case moved to Processing.
#[derive(Clone, Debug)]
pub struct Promotion {
    pub case: EmergencyCase,
    /// Set when assignment was requested but no ambulance could be sent.
    pub no_ambulance_available: bool,
}

/// Supplies drawn from one batch while handling a case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UsageRequest {
    pub supply_batch_id: String,
    pub quantity: u32,
}

#[derive(Clone, Debug)]
pub struct Completion {
    pub case: EmergencyCase,
    /// Usage entries appended to the log, with quantities as recorded.
    pub logged: Vec<SupplyUsageLogEntry>,
    /// Ambulance released from the case, if one was assigned.
    pub released_ambulance: Option<String>,
}

pub struct EmergencyOfficer<R> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
    store: CaseStore,
    directory: PatientDirectory,
    types: TypeCatalog,
}

impl<R> EmergencyOfficer<R>
where
    R: CaseRepository
        + PatientRepository
        + SupplyRepository
        + UsageLogRepository
        + AmbulanceRepository
        + ShiftHistoryRepository,
{
    /// Load cases and the patient directory, fill in patient names and seed
    /// the type catalog from the loaded cases.
    pub fn open(repo: Arc<R>, cfg: Arc<CoreConfig>, clock: Arc<dyn Clock>) -> HmsResult<Self> {
        let directory = repo.load_directory()?;
        let cases = repo.load_cases()?.into_iter().map(|mut case| {
            if directory.contains(&case.patient_id) || case.patient_name.is_empty() {
                case.patient_name = directory.name_of(&case.patient_id).to_string();
            }
            case
        });
        let store = CaseStore::from_cases(cfg.case_id_base(), cases);
        let types = TypeCatalog::from_labels(store.iter().map(|c| c.emergency_type.as_str()));

        let unrecognised = store.unrecognised().count();
        if unrecognised > 0 {
            tracing::warn!("{unrecognised} case(s) have an unrecognised status");
        }

        Ok(Self {
            repo,
            clock,
            store,
            directory,
            types,
        })
    }

    pub fn store(&self) -> &CaseStore {
        &self.store
    }

    pub fn types(&self) -> &TypeCatalog {
        &self.types
    }

    pub fn directory(&self) -> &PatientDirectory {
        &self.directory
    }

    /// Log a new pending case under the next free case id.
    pub fn add_case(&mut self, new: NewCase) -> HmsResult<EmergencyCase> {
        let emergency_type = TypeCatalog::normalise(new.emergency_type.as_str());
        self.types.add(&emergency_type);

        let patient_id = new.patient_id.into_string();
        if !self.directory.contains(&patient_id) {
            tracing::warn!("patient {patient_id} is not in the patient directory");
        }

        let mut case = EmergencyCase::pending(
            self.store.next_case_id(),
            patient_id,
            emergency_type,
            new.priority,
            self.clock.timestamp(),
        );
        case.patient_name = self.directory.name_of(&case.patient_id).to_string();

        self.store.insert(case.clone());
        self.save()?;
        tracing::info!("logged case {} (priority {})", case.case_id, case.priority);
        Ok(case)
    }

    pub fn peek_next_pending(&self) -> Option<&EmergencyCase> {
        self.store.peek_highest_pending()
    }

    /// Move the most urgent pending case to Processing.
    ///
    /// With `assign_ambulance`, the first dispatchable ambulance not already
    /// attached to a processing case is assigned; the case is promoted either
    /// way. Returns `None` when nothing is pending.
    pub fn promote_next(&mut self, assign_ambulance: bool) -> HmsResult<Option<Promotion>> {
        let Some(pending) = self.store.peek_highest_pending().cloned() else {
            return Ok(None);
        };
        let mut case = pending.clone();
        case.status = CaseStatus::Processing;
        case.timestamp_processed = Some(self.clock.timestamp());

        let mut no_ambulance_available = false;
        let mut dispatch = None;
        if assign_ambulance {
            let mut schedule = AmbulanceSchedule::from_ambulances(self.repo.load_ambulances()?);
            let chosen = schedule
                .select_for_dispatch(|id| self.store.ambulance_in_use(id))
                .map(|a| a.ambulance_id.clone());
            match chosen {
                Some(ambulance_id) => {
                    schedule.assign(&ambulance_id, &case.case_id)?;
                    case.ambulance_id = Some(ambulance_id);
                    dispatch = Some(schedule);
                }
                None => {
                    tracing::warn!("no ambulance available for case {}", case.case_id);
                    no_ambulance_available = true;
                }
            }
        }

        self.commit(case.clone(), &pending)?;
        if let Some(schedule) = dispatch {
            if let Err(e) = self.repo.save_ambulances(schedule.as_slice()) {
                self.revert(pending);
                return Err(e);
            }
            if let Some(ambulance_id) = &case.ambulance_id {
                tracing::info!("ambulance {ambulance_id} assigned to case {}", case.case_id);
            }
        }
        tracing::info!("case {} is now processing", case.case_id);
        Ok(Some(Promotion {
            case,
            no_ambulance_available,
        }))
    }

    pub fn processing_cases(&self) -> Vec<&EmergencyCase> {
        self.store.iter_by_status(&CaseStatus::Processing).collect()
    }

    /// Fresh view of the supply inventory for choosing batches.
    pub fn supply_catalog(&self) -> HmsResult<SupplyCatalog> {
        Ok(SupplyCatalog::from_batches(self.repo.load_supplies()?))
    }

    /// Mark a processing case completed and log the supplies it used.
    ///
    /// Every request is checked before anything is written. Quantities are
    /// clamped to the batch stock (equipment always counts one). Stock itself
    /// is left alone until reconciliation.
    pub fn complete_case(&mut self, case_id: &str, usage: &[UsageRequest]) -> HmsResult<Completion> {
        let case_id = case_id.trim();
        let mut case = self
            .store
            .get(case_id)
            .cloned()
            .ok_or_else(|| HmsError::CaseNotFound(case_id.to_string()))?;
        if case.status != CaseStatus::Processing {
            return Err(HmsError::InvalidTransition {
                case_id: case.case_id,
                from: case.status,
                to: CaseStatus::Completed,
            });
        }

        let catalog = self.supply_catalog()?;
        let mut logged = Vec::with_capacity(usage.len());
        for request in usage {
            let batch = catalog
                .find(&request.supply_batch_id)
                .ok_or_else(|| HmsError::SupplyBatchNotFound(request.supply_batch_id.clone()))?;
            if batch.quantity == 0 {
                return Err(HmsError::SupplyBatchEmpty(batch.supply_batch_id.clone()));
            }
            logged.push(SupplyUsageLogEntry {
                case_id: case.case_id.clone(),
                patient_id: case.patient_id.clone(),
                supply_batch_id: batch.supply_batch_id.clone(),
                supply_name: batch.name.clone(),
                quantity_used: batch.clamp_usage(request.quantity),
                status: UsageStatus::NotDeducted,
            });
        }

        let processing = case.clone();
        case.status = CaseStatus::Completed;
        self.commit(case.clone(), &processing)?;
        if let Err(e) = self.repo.append_usage(&logged) {
            self.revert(processing);
            return Err(e);
        }

        let released_ambulance = self.release_ambulance(&case.case_id)?;
        if let Some(ambulance_id) = &released_ambulance {
            self.repo.append_shift_record(&ShiftRecord {
                ambulance_id: ambulance_id.clone(),
                case_id: case.case_id.clone(),
                handled_on: self.clock.today(),
            })?;
        }
        tracing::info!(
            "case {} completed with {} supply entries",
            case.case_id,
            logged.len()
        );
        Ok(Completion {
            case,
            logged,
            released_ambulance,
        })
    }

    pub fn reconcile_supplies(&self) -> HmsResult<ReconcileReport> {
        let mut catalog = self.supply_catalog()?;
        reconcile_and_save(self.repo.as_ref(), &mut catalog)
    }

    fn release_ambulance(&self, case_id: &str) -> HmsResult<Option<String>> {
        let mut schedule = AmbulanceSchedule::from_ambulances(self.repo.load_ambulances()?);
        let released = schedule.release(case_id);
        if released.is_some() {
            self.repo.save_ambulances(schedule.as_slice())?;
        }
        Ok(released)
    }

    /// Store `case` and save, putting `previous` back if the save fails.
    fn commit(&mut self, case: EmergencyCase, previous: &EmergencyCase) -> HmsResult<()> {
        self.store.update_by_id(case);
        if let Err(e) = self.save() {
            self.store.update_by_id(previous.clone());
            return Err(e);
        }
        Ok(())
    }

    /// Undo a committed case after a later write failed.
    fn revert(&mut self, previous: EmergencyCase) {
        let case_id = previous.case_id.clone();
        self.store.update_by_id(previous);
        if let Err(e) = self.save() {
            tracing::warn!("case {case_id} could not be restored on disk: {e}");
        }
    }

    fn save(&self) -> HmsResult<()> {
        self.repo.save_cases(self.store.as_slice())
    }
}
