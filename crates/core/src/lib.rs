//! # HMS Core
//!
//! Core logic for the hospital management simulation.
//!
//! This crate holds the data model and the role workflows:
//! - Priority-ordered emergency cases and their Pending -> Processing -> Completed lifecycle
//! - Patient registry, id lookup and the FIFO admission queue
//! - Medical supply inventory and the usage log reconciled against it
//! - The ambulance schedule used for dispatch, and the per-ambulance shift history
//!
//! Persistence goes through the traits in [`repositories`]; the CSV
//! implementation reads and writes the files under [`CoreConfig::data_dir`].
//!
//! **No console concerns**: prompts, menus and table rendering belong in the binaries.

pub mod ambulances;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod constants;
pub mod emergency;
pub mod error;
pub mod patients;
pub mod repositories;
pub mod shift_history;
pub mod supplies;
pub mod validation;
pub mod workflows;

pub use config::CoreConfig;
pub use error::{HmsError, HmsResult};
pub use hms_types::{NonEmptyText, PriorityLevel, TextError};
