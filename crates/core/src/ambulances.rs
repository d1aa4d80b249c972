//! Ambulance schedule.
//!
//! One row per ambulance, in file order. The dispatcher edits drivers and
//! shifts; the emergency officer reads it to pick an ambulance for a case and
//! writes the assignment back.

use crate::{HmsError, HmsResult};
use hms_types::NonEmptyText;
use serde::Serialize;
use std::fmt;

/// Ambulance status written when its driver is unavailable.
pub const INACTIVE_STATUS: &str = "Inactive";

/// Ambulance status written when its driver can take calls.
pub const AVAILABLE_STATUS: &str = "Available";

const DISPATCHABLE_MARKERS: [&str; 2] = ["On Duty", "Available"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DriverStatus {
    Available,
    Unavailable,
    OnDuty,
    Unrecognised(String),
}

impl DriverStatus {
    /// Case-insensitive; `OnDuty` and `On Duty` are the same status.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let folded: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        match folded.as_str() {
            "available" => Self::Available,
            "unavailable" => Self::Unavailable,
            "onduty" => Self::OnDuty,
            _ => Self::Unrecognised(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Available => "Available",
            Self::Unavailable => "Unavailable",
            Self::OnDuty => "On Duty",
            Self::Unrecognised(raw) => raw,
        }
    }
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DriverStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Ambulance {
    pub ambulance_id: String,
    pub driver_name: String,
    pub driver_status: DriverStatus,
    pub shift_start: String,
    pub shift_end: String,
    /// Hours.
    pub shift_duration: u32,
    pub assigned_case_id: Option<String>,
    pub ambulance_status: String,
    pub location: String,
}

impl Ambulance {
    /// Whether the status column allows sending this ambulance out.
    pub fn is_dispatchable(&self) -> bool {
        DISPATCHABLE_MARKERS
            .iter()
            .any(|marker| self.ambulance_status.contains(marker))
    }
}

#[derive(Clone, Debug, Default)]
pub struct AmbulanceSchedule {
    ambulances: Vec<Ambulance>,
}

impl AmbulanceSchedule {
    pub fn from_ambulances(ambulances: Vec<Ambulance>) -> Self {
        Self { ambulances }
    }

    pub fn find(&self, ambulance_id: &str) -> Option<&Ambulance> {
        self.ambulances
            .iter()
            .find(|a| a.ambulance_id == ambulance_id)
    }

    /// First dispatchable ambulance that `in_use` does not claim.
    ///
    /// `in_use` answers whether an ambulance id is already attached to a case
    /// in progress; the schedule's own status column is not trusted for that.
    pub fn select_for_dispatch(&self, in_use: impl Fn(&str) -> bool) -> Option<&Ambulance> {
        self.ambulances
            .iter()
            .find(|a| a.is_dispatchable() && !in_use(&a.ambulance_id))
    }

    pub fn assign(&mut self, ambulance_id: &str, case_id: &str) -> HmsResult<()> {
        let ambulance = self.find_mut(ambulance_id)?;
        ambulance.assigned_case_id = Some(case_id.to_string());
        Ok(())
    }

    /// Clear the assignment held for `case_id`, returning the ambulance id.
    pub fn release(&mut self, case_id: &str) -> Option<String> {
        let ambulance = self
            .ambulances
            .iter_mut()
            .find(|a| a.assigned_case_id.as_deref() == Some(case_id))?;
        ambulance.assigned_case_id = None;
        Some(ambulance.ambulance_id.clone())
    }

    pub fn register_driver(&mut self, ambulance_id: &str, driver: NonEmptyText) -> HmsResult<()> {
        let ambulance = self.find_mut(ambulance_id)?;
        ambulance.driver_name = driver.into_string();
        ambulance.driver_status = DriverStatus::Available;
        Ok(())
    }

    /// Lay shifts of `hours` end to end around the clock, in schedule order.
    pub fn recalculate_shifts(&mut self, hours: u32) -> HmsResult<()> {
        if !(1..=24).contains(&hours) {
            return Err(HmsError::InvalidInput(
                "shift duration must be between 1 and 24 hours".into(),
            ));
        }
        for (i, ambulance) in self.ambulances.iter_mut().enumerate() {
            let start = (i as u32 * hours) % 24;
            let end = (start + hours) % 24;
            ambulance.shift_start = format!("{start:02}:00");
            ambulance.shift_end = format!("{end:02}:00");
            ambulance.shift_duration = hours;
        }
        Ok(())
    }

    /// Set the status of the first ambulance driven by `driver_name`.
    pub fn update_driver_availability(
        &mut self,
        driver_name: &str,
        status: DriverStatus,
    ) -> HmsResult<()> {
        let driver_name = driver_name.trim();
        let ambulance = self
            .ambulances
            .iter_mut()
            .find(|a| a.driver_name == driver_name)
            .ok_or_else(|| HmsError::DriverNotFound(driver_name.to_string()))?;
        ambulance.ambulance_status = match status {
            DriverStatus::Unavailable => INACTIVE_STATUS,
            _ => AVAILABLE_STATUS,
        }
        .to_string();
        ambulance.driver_status = status;
        Ok(())
    }

    pub fn as_slice(&self) -> &[Ambulance] {
        &self.ambulances
    }

    pub fn len(&self) -> usize {
        self.ambulances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ambulances.is_empty()
    }

    fn find_mut(&mut self, ambulance_id: &str) -> HmsResult<&mut Ambulance> {
        let ambulance_id = ambulance_id.trim();
        self.ambulances
            .iter_mut()
            .find(|a| a.ambulance_id == ambulance_id)
            .ok_or_else(|| HmsError::AmbulanceNotFound(ambulance_id.to_string()))
    }
}
