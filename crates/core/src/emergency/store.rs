//! Priority-ordered emergency case store.
//!
//! Cases are kept in a `Vec` sorted by priority level (1 first). Equal
//! priorities keep insertion order: a new case always lands after every
//! existing case with the same or a more urgent priority. Every operation is a
//! linear scan, which is plenty for a ward-sized list.

use super::case::{case_number, CaseStatus, EmergencyCase};
use crate::constants::CASE_ID_PREFIX;

/// What [`CaseStore::update_by_id`] did with the case it was given.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// A case with the same id existed and was replaced.
    Replaced,
    /// No case had that id, so it was inserted as a new one.
    Inserted,
}

#[derive(Clone, Debug, Default)]
pub struct CaseStore {
    cases: Vec<EmergencyCase>,
    case_id_base: u32,
}

impl CaseStore {
    /// An empty store allocating case numbers above `case_id_base`.
    pub fn new(case_id_base: u32) -> Self {
        Self {
            cases: Vec::new(),
            case_id_base,
        }
    }

    /// Build a store by inserting `cases` one by one, so unsorted input ends up
    /// priority-ordered with file order preserved among equals.
    pub fn from_cases(case_id_base: u32, cases: impl IntoIterator<Item = EmergencyCase>) -> Self {
        let mut store = Self::new(case_id_base);
        for case in cases {
            store.insert(case);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Insert in priority order, after all cases of equal or higher urgency.
    pub fn insert(&mut self, case: EmergencyCase) {
        let at = self
            .cases
            .partition_point(|existing| existing.priority <= case.priority);
        self.cases.insert(at, case);
    }

    /// The most urgent pending case. Because the list is priority-sorted the
    /// first pending case in list order is also the global best.
    pub fn peek_highest_pending(&self) -> Option<&EmergencyCase> {
        self.cases
            .iter()
            .find(|case| case.status == CaseStatus::Pending)
    }

    /// Remove and return the most urgent pending case.
    pub fn pop_highest_pending(&mut self) -> Option<EmergencyCase> {
        let at = self
            .cases
            .iter()
            .position(|case| case.status == CaseStatus::Pending)?;
        Some(self.cases.remove(at))
    }

    /// Replace the case with the same id, or insert it when the id is unknown.
    ///
    /// A replacement whose priority differs from the stored one is moved to its
    /// new priority position; otherwise it stays exactly where it was.
    pub fn update_by_id(&mut self, case: EmergencyCase) -> UpdateOutcome {
        let Some(at) = self.cases.iter().position(|c| c.case_id == case.case_id) else {
            self.insert(case);
            return UpdateOutcome::Inserted;
        };

        if self.cases[at].priority == case.priority {
            self.cases[at] = case;
        } else {
            self.cases.remove(at);
            self.insert(case);
        }
        UpdateOutcome::Replaced
    }

    pub fn get(&self, case_id: &str) -> Option<&EmergencyCase> {
        self.cases.iter().find(|case| case.case_id == case_id)
    }

    /// All cases in list order (priority-major, insertion-minor).
    pub fn iter(&self) -> impl Iterator<Item = &EmergencyCase> {
        self.cases.iter()
    }

    /// Cases with exactly `status`, in list order.
    pub fn iter_by_status<'a>(
        &'a self,
        status: &'a CaseStatus,
    ) -> impl Iterator<Item = &'a EmergencyCase> + 'a {
        self.cases.iter().filter(move |case| &case.status == status)
    }

    /// Cases whose stored status is not one of the three known words.
    pub fn unrecognised(&self) -> impl Iterator<Item = &EmergencyCase> {
        self.cases.iter().filter(|case| !case.status.is_recognised())
    }

    /// Presentation order: inside each priority band, pending cases first, then
    /// processing, then completed, then anything unrecognised. The store itself
    /// is left untouched.
    pub fn display_order(&self) -> Vec<&EmergencyCase> {
        let mut view: Vec<&EmergencyCase> = self.cases.iter().collect();
        view.sort_by_key(|case| (case.priority, case.status.display_rank()));
        view
    }

    /// Whether `ambulance_id` is attached to a case currently being processed.
    pub fn ambulance_in_use(&self, ambulance_id: &str) -> bool {
        self.iter_by_status(&CaseStatus::Processing)
            .any(|case| case.ambulance_id.as_deref() == Some(ambulance_id))
    }

    /// Next free case id: one above the highest existing case number, never
    /// below the configured floor.
    pub fn next_case_id(&self) -> String {
        let max = self
            .cases
            .iter()
            .filter_map(|case| case_number(&case.case_id))
            .fold(self.case_id_base, u32::max);
        format!("{CASE_ID_PREFIX}{}", max.saturating_add(1))
    }

    pub fn as_slice(&self) -> &[EmergencyCase] {
        &self.cases
    }
}
