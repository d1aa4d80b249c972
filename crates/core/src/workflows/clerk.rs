//! Patient admission clerk.

use crate::clock::Clock;
use crate::constants::UNKNOWN_PATIENT_NAME;
use crate::patients::{AdmissionEntry, AdmissionLedger, Patient, PatientForm, PatientRegistry};
use crate::repositories::{AdmissionRepository, PatientRepository};
use crate::{HmsError, HmsResult};
use hms_types::NonEmptyText;
use serde::Serialize;
use std::sync::Arc;

/// One row of the admission queue as shown to the clerk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QueuedPatient {
    pub position: usize,
    pub patient_id: String,
    pub name: String,
    pub condition: String,
    pub admission_time: String,
}

pub struct AdmissionClerk<R> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
    registry: PatientRegistry,
    ledger: AdmissionLedger,
}

impl<R> AdmissionClerk<R>
where
    R: PatientRepository + AdmissionRepository,
{
    pub fn open(repo: Arc<R>, clock: Arc<dyn Clock>) -> HmsResult<Self> {
        let registry = PatientRegistry::from_patients(repo.load_patients()?);
        let ledger = AdmissionLedger::from_entries(repo.load_admissions()?);
        Ok(Self {
            repo,
            clock,
            registry,
            ledger,
        })
    }

    /// Register a new patient and put them at the back of the queue.
    pub fn admit_new(&mut self, form: PatientForm) -> HmsResult<Patient> {
        let patient = form.into_patient(self.registry.next_patient_id());
        self.ledger.enqueue(
            patient.patient_id.clone(),
            patient.condition.clone(),
            self.clock.timestamp(),
        );
        self.registry.push(patient.clone());
        self.save()?;
        tracing::info!("admitted new patient {}", patient.patient_id);
        Ok(patient)
    }

    /// Queue a registered patient again with their current condition.
    pub fn admit_existing(
        &mut self,
        patient_id: &str,
        condition: NonEmptyText,
    ) -> HmsResult<AdmissionEntry> {
        let patient_id = patient_id.trim();
        if self.ledger.is_admitted(patient_id) {
            return Err(HmsError::AlreadyAdmitted(patient_id.to_string()));
        }
        let patient = self
            .registry
            .find_mut(patient_id)
            .ok_or_else(|| HmsError::PatientNotFound(patient_id.to_string()))?;
        patient.condition = condition.into_string();
        let condition = patient.condition.clone();

        let entry = self
            .ledger
            .enqueue(patient_id.to_string(), condition, self.clock.timestamp())
            .clone();
        self.save()?;
        tracing::info!("re-admitted patient {patient_id}");
        Ok(entry)
    }

    pub fn queue(&self) -> Vec<QueuedPatient> {
        self.ledger
            .queue()
            .enumerate()
            .map(|(i, entry)| QueuedPatient {
                position: i + 1,
                patient_id: entry.patient_id.clone(),
                name: self
                    .registry
                    .find(&entry.patient_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| UNKNOWN_PATIENT_NAME.to_string()),
                condition: entry.condition.clone(),
                admission_time: entry.admission_time.clone(),
            })
            .collect()
    }

    pub fn find_patient(&self, patient_id: &str) -> Option<&Patient> {
        self.registry.find(patient_id.trim())
    }

    /// Queue position of an admitted patient, counted from 1.
    pub fn queue_position(&self, patient_id: &str) -> Option<usize> {
        self.ledger.position_of(patient_id.trim())
    }

    /// Discharge whoever is at the front of the queue.
    pub fn discharge_next(&mut self) -> HmsResult<Option<AdmissionEntry>> {
        let Some(entry) = self.ledger.discharge_next(self.clock.timestamp()) else {
            return Ok(None);
        };
        self.repo.save_admissions(self.ledger.as_slice())?;
        tracing::info!("discharged patient {}", entry.patient_id);
        Ok(Some(entry))
    }

    pub fn registry(&self) -> &PatientRegistry {
        &self.registry
    }

    fn save(&self) -> HmsResult<()> {
        self.repo.save_patients(self.registry.as_slice())?;
        self.repo.save_admissions(self.ledger.as_slice())
    }
}
