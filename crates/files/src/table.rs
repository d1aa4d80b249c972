//! CSV table implementation.
//!
//! A [`CsvTable`] binds a file path to a [`Schema`]. Reads are lenient (columns
//! are looked up by header name, short rows are padded with empty strings);
//! writes are strict (every row must match the schema width).

use crate::{FilesError, FilesResult};
use csv::{QuoteStyle, ReaderBuilder, StringRecord, Trim, WriterBuilder};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Ordered column names written as the header row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Schema {
    columns: &'static [&'static str],
}

impl Schema {
    pub const fn new(columns: &'static [&'static str]) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// One data row, addressable by header name.
#[derive(Clone, Debug)]
pub struct Row {
    header: Arc<HashMap<String, usize>>,
    record: StringRecord,
}

impl Row {
    /// Field value for `column`, or `""` when the column or the field is absent.
    ///
    /// Column lookup ignores ASCII case, so `"case_id"` finds `Case_ID`.
    pub fn get(&self, column: &str) -> &str {
        self.header
            .get(&column.to_ascii_lowercase())
            .and_then(|&index| self.record.get(index))
            .unwrap_or("")
    }

    /// Whether the file header declared `column` at all.
    pub fn has_column(&self, column: &str) -> bool {
        self.header.contains_key(&column.to_ascii_lowercase())
    }

    /// 1-based line number in the source file, when known.
    pub fn line(&self) -> Option<u64> {
        self.record.position().map(|p| p.line())
    }

    pub fn is_blank(&self) -> bool {
        self.record.iter().all(str::is_empty)
    }
}

/// A CSV file with a fixed output schema.
#[derive(Clone, Debug)]
pub struct CsvTable {
    path: PathBuf,
    schema: Schema,
}

impl CsvTable {
    pub fn new(path: impl Into<PathBuf>, schema: Schema) -> Self {
        Self {
            path: path.into(),
            schema,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    /// Read every data row.
    ///
    /// Returns `Ok(None)` when the file does not exist, so callers can decide
    /// whether a missing table is an empty table. Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError`] if the file exists but cannot be opened or parsed.
    pub fn read(&self) -> FilesResult<Option<Vec<Row>>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(FilesError::Io(e)),
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(file);

        let header: HashMap<String, usize> = reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(index, name)| (name.to_ascii_lowercase(), index))
            .collect();
        let header = Arc::new(header);

        let mut rows = Vec::new();
        for record in reader.records() {
            let row = Row {
                header: Arc::clone(&header),
                record: record?,
            };
            if !row.is_blank() {
                rows.push(row);
            }
        }
        Ok(Some(rows))
    }

    /// Replace the file contents with the header followed by `rows`.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::RowWidth`] before touching the file if any row does
    /// not match the schema, or an I/O/CSV error if writing fails.
    pub fn write_all<R>(&self, rows: &[R]) -> FilesResult<()>
    where
        R: AsRef<[String]>,
    {
        for row in rows {
            self.check_width(row.as_ref())?;
        }
        self.ensure_parent()?;

        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Never)
            .from_path(&self.path)?;
        writer.write_record(self.schema.columns())?;
        for row in rows {
            writer.write_record(row.as_ref())?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Append one row, writing the header first when the file is new or empty.
    pub fn append(&self, row: &[String]) -> FilesResult<()> {
        self.append_all(&[row])
    }

    /// Append `rows` through one open file handle.
    ///
    /// Every row is width-checked before the file is touched, so a bad row
    /// appends nothing. An empty slice is a no-op.
    pub fn append_all<R: AsRef<[String]>>(&self, rows: &[R]) -> FilesResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        for row in rows {
            self.check_width(row.as_ref())?;
        }
        self.ensure_parent()?;

        let needs_header = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == ErrorKind::NotFound => true,
            Err(e) => return Err(FilesError::Io(e)),
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Never)
            .from_writer(file);
        if needs_header {
            writer.write_record(self.schema.columns())?;
        }
        for row in rows {
            writer.write_record(row.as_ref())?;
        }
        writer.flush()?;
        Ok(())
    }

    fn check_width(&self, row: &[String]) -> FilesResult<()> {
        if row.len() != self.schema.len() {
            return Err(FilesError::RowWidth {
                expected: self.schema.len(),
                found: row.len(),
            });
        }
        Ok(())
    }

    fn ensure_parent(&self) -> FilesResult<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => crate::ensure_dir(parent),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SCHEMA: Schema = Schema::new(&["Case_ID", "Priority_Level", "Status"]);

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn missing_file_reads_as_none() {
        let temp = TempDir::new().unwrap();
        let table = CsvTable::new(temp.path().join("absent.csv"), SCHEMA);

        assert!(table.read().unwrap().is_none());
    }

    #[test]
    fn write_all_then_read_preserves_rows() {
        let temp = TempDir::new().unwrap();
        let table = CsvTable::new(temp.path().join("cases.csv"), SCHEMA);

        table
            .write_all(&[row(&["CASE-1", "2", "Pending"]), row(&["CASE-2", "1", ""])])
            .unwrap();

        let content = fs::read_to_string(table.path()).unwrap();
        assert!(content.starts_with("Case_ID,Priority_Level,Status\n"));

        let rows = table.read().unwrap().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("case_id"), "CASE-1");
        assert_eq!(rows[1].get("STATUS"), "");
        assert_eq!(rows[1].get("priority_level"), "1");
    }

    #[test]
    fn read_tolerates_short_rows_extra_columns_and_blank_lines() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("legacy.csv");
        fs::write(
            &path,
            "case_id,patient_name,priority_level,status\nC7, Ada ,3,Pending\n\nC8,Bob\n",
        )
        .unwrap();

        let rows = CsvTable::new(&path, SCHEMA).read().unwrap().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("patient_name"), "Ada");
        assert!(rows[0].has_column("patient_name"));
        assert_eq!(rows[1].get("status"), "");
        assert!(!rows[1].has_column("ambulance_id"));
    }

    #[test]
    fn append_writes_header_once() {
        let temp = TempDir::new().unwrap();
        let table = CsvTable::new(temp.path().join("nested/log.csv"), SCHEMA);

        table.append(&row(&["CASE-1", "1", "Pending"])).unwrap();
        table.append(&row(&["CASE-2", "4", "Completed"])).unwrap();

        let content = fs::read_to_string(table.path()).unwrap();
        assert_eq!(
            content,
            "Case_ID,Priority_Level,Status\nCASE-1,1,Pending\nCASE-2,4,Completed\n"
        );
    }

    #[test]
    fn append_all_checks_every_row_first() {
        let temp = TempDir::new().unwrap();
        let table = CsvTable::new(temp.path().join("log.csv"), SCHEMA);

        let err = table
            .append_all(&[row(&["CASE-1", "1", "Pending"]), row(&["CASE-2"])])
            .unwrap_err();
        assert!(matches!(err, FilesError::RowWidth { found: 1, .. }));
        assert!(!table.path().exists());

        table
            .append_all(&[row(&["CASE-1", "1", "Pending"]), row(&["CASE-2", "2", "Pending"])])
            .unwrap();
        table.append_all::<Vec<String>>(&[]).unwrap();
        let content = fs::read_to_string(table.path()).unwrap();
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn rejects_rows_of_wrong_width() {
        let temp = TempDir::new().unwrap();
        let table = CsvTable::new(temp.path().join("cases.csv"), SCHEMA);

        let err = table.write_all(&[row(&["CASE-1", "1"])]).unwrap_err();
        assert!(matches!(
            err,
            FilesError::RowWidth {
                expected: 3,
                found: 2
            }
        ));
        assert!(!table.path().exists());
    }

    #[test]
    fn ensure_dir_rejects_regular_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("data");
        fs::write(&file, "not a directory").unwrap();

        assert!(matches!(
            crate::ensure_dir(&file),
            Err(FilesError::InvalidPath(_))
        ));
    }
}
