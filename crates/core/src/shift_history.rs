//! Cases handled per ambulance.
//!
//! Every completed case that had an ambulance attached leaves one record in
//! the shift history. The dispatcher counts those records over a trailing
//! window ending today.

use crate::ambulances::Ambulance;
use crate::{HmsError, HmsResult};
use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ShiftRecord {
    pub ambulance_id: String,
    pub case_id: String,
    pub handled_on: NaiveDate,
}

/// Reporting window, counted back from today inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatsPeriod {
    Day,
    Week,
    Year,
}

impl StatsPeriod {
    pub fn parse(raw: &str) -> HmsResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "year" => Ok(Self::Year),
            other => Err(HmsError::InvalidInput(format!(
                "period must be day, week or year, not {other:?}"
            ))),
        }
    }

    pub fn days(self) -> u64 {
        match self {
            Self::Day => 1,
            Self::Week => 7,
            Self::Year => 365,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Year => "year",
        }
    }

    /// Whether `date` falls inside the window ending on `today`.
    pub fn covers(self, date: NaiveDate, today: NaiveDate) -> bool {
        let first = today
            .checked_sub_days(Days::new(self.days() - 1))
            .unwrap_or(NaiveDate::MIN);
        (first..=today).contains(&date)
    }
}

impl fmt::Display for StatsPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CasesHandled {
    pub ambulance_id: String,
    pub cases: usize,
}

/// One tally per scheduled ambulance, in schedule order.
///
/// Records for ambulances no longer on the schedule are not reported.
pub fn cases_handled(
    ambulances: &[Ambulance],
    history: &[ShiftRecord],
    period: StatsPeriod,
    today: NaiveDate,
) -> Vec<CasesHandled> {
    ambulances
        .iter()
        .map(|ambulance| CasesHandled {
            ambulance_id: ambulance.ambulance_id.clone(),
            cases: history
                .iter()
                .filter(|r| r.ambulance_id == ambulance.ambulance_id)
                .filter(|r| period.covers(r.handled_on, today))
                .count(),
        })
        .collect()
}
