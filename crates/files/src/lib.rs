//! HMS File Storage
//!
//! Every HMS role module keeps its state in a flat CSV "table": one header row
//! followed by comma-delimited records, read wholesale into memory and rewritten
//! wholesale after a mutation.
//!
//! ## Format
//!
//! - The first row is a header and is always present in files written here
//! - Fields are separated by `,` and never quoted; callers must not store commas
//! - Columns are addressed by header name (case-insensitive), so files carrying
//!   extra or reordered columns still load
//! - Missing trailing fields read as empty strings
//!
//! ## Example Usage
//!
//! ```no_run
//! use hms_files::{CsvTable, Schema};
//!
//! # fn main() -> Result<(), hms_files::FilesError> {
//! const LOG: Schema = Schema::new(&["Case_ID", "Quantity_Used"]);
//! let table = CsvTable::new("data/supply_usage_log.csv", LOG);
//! table.append(&["CASE-3351".to_string(), "2".to_string()])?;
//! if let Some(rows) = table.read()? {
//!     for row in rows {
//!         println!("{}", row.get("case_id"));
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod table;

pub use table::{CsvTable, Row, Schema};

/// Errors that can occur during table operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Path exists but is not usable as a data file or directory
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A row handed to the writer does not match the table schema
    #[error("Row has {found} fields but schema has {expected} columns")]
    RowWidth { expected: usize, found: usize },

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader or writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Type alias for Results that can fail with a [`FilesError`].
pub type FilesResult<T> = Result<T, FilesError>;

/// Create `dir` (and parents) if it does not exist yet.
///
/// # Errors
///
/// Returns [`FilesError::InvalidPath`] if `dir` exists but is not a directory.
pub fn ensure_dir(dir: &std::path::Path) -> FilesResult<()> {
    if dir.exists() {
        if dir.is_dir() {
            return Ok(());
        }
        return Err(FilesError::InvalidPath(format!(
            "path exists but is not a directory: {}",
            dir.display()
        )));
    }
    std::fs::create_dir_all(dir)?;
    Ok(())
}
