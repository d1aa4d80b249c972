//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the
//! role workflows. Environment variables are read by the binaries and handed in
//! as plain values, so tests can build a `CoreConfig` against a temporary
//! directory without touching the process environment.

use crate::constants::{
    ADMISSION_QUEUE_FILE, AMBULANCE_SCHEDULE_FILE, DATA_DIR_NAME, DEFAULT_CASE_ID_BASE,
    EMERGENCY_CASES_FILE, MEDICAL_SUPPLY_FILE, PATIENT_DATA_FILE, PROJECT_ROOT_MARKER,
    REMOVED_SUPPLY_FILE, SHIFT_HISTORY_FILE, SUPPLY_USAGE_LOG_FILE,
};
use crate::{HmsError, HmsResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    case_id_base: u32,
}

impl CoreConfig {
    /// Create a new `CoreConfig`, creating `data_dir` if it does not exist.
    pub fn new(data_dir: PathBuf, case_id_base: u32) -> HmsResult<Self> {
        hms_files::ensure_dir(&data_dir)?;
        Ok(Self {
            data_dir,
            case_id_base,
        })
    }

    /// Resolve configuration from raw environment values.
    ///
    /// * `data_dir_override` - value of `HMS_DATA_DIR`, if set
    /// * `case_id_base` - value of `HMS_CASE_ID_BASE`, if set
    /// * `start_dir` - directory the project-root search starts from
    pub fn resolve(
        data_dir_override: Option<String>,
        case_id_base: Option<String>,
        start_dir: &Path,
    ) -> HmsResult<Self> {
        let override_dir = data_dir_override
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let data_dir = resolve_data_dir(override_dir, start_dir)?;
        let base = case_id_base_from_env_value(case_id_base)?;
        Self::new(data_dir, base)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn case_id_base(&self) -> u32 {
        self.case_id_base
    }

    pub fn emergency_cases_file(&self) -> PathBuf {
        self.data_dir.join(EMERGENCY_CASES_FILE)
    }

    pub fn patient_data_file(&self) -> PathBuf {
        self.data_dir.join(PATIENT_DATA_FILE)
    }

    pub fn admission_queue_file(&self) -> PathBuf {
        self.data_dir.join(ADMISSION_QUEUE_FILE)
    }

    pub fn medical_supply_file(&self) -> PathBuf {
        self.data_dir.join(MEDICAL_SUPPLY_FILE)
    }

    pub fn removed_supply_file(&self) -> PathBuf {
        self.data_dir.join(REMOVED_SUPPLY_FILE)
    }

    pub fn supply_usage_log_file(&self) -> PathBuf {
        self.data_dir.join(SUPPLY_USAGE_LOG_FILE)
    }

    pub fn ambulance_schedule_file(&self) -> PathBuf {
        self.data_dir.join(AMBULANCE_SCHEDULE_FILE)
    }

    pub fn shift_history_file(&self) -> PathBuf {
        self.data_dir.join(SHIFT_HISTORY_FILE)
    }
}

/// Resolve the data directory without reading environment variables.
///
/// If `override_dir` is provided it is used as-is. Otherwise this walks up from
/// `start_dir` to the first ancestor containing `Cargo.lock` and returns its
/// `data/` child.
pub fn resolve_data_dir(override_dir: Option<PathBuf>, start_dir: &Path) -> HmsResult<PathBuf> {
    if let Some(dir) = override_dir {
        if dir.exists() && !dir.is_dir() {
            return Err(HmsError::DataDir(format!(
                "HMS_DATA_DIR is not a directory: {}",
                dir.display()
            )));
        }
        return Ok(dir);
    }

    start_dir
        .ancestors()
        .find(|ancestor| ancestor.join(PROJECT_ROOT_MARKER).is_file())
        .map(|root| root.join(DATA_DIR_NAME))
        .ok_or_else(|| {
            HmsError::DataDir(format!(
                "could not find project root ({PROJECT_ROOT_MARKER} not found above {})",
                start_dir.display()
            ))
        })
}

/// Parse the case-number floor from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default floor.
pub fn case_id_base_from_env_value(value: Option<String>) -> HmsResult<u32> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    match value {
        None => Ok(DEFAULT_CASE_ID_BASE),
        Some(v) => v.parse::<u32>().map_err(|_| {
            HmsError::InvalidInput(format!("HMS_CASE_ID_BASE must be a number, got '{v}'"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn walks_up_to_project_root_marker() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(PROJECT_ROOT_MARKER), "").unwrap();
        let nested = temp.path().join("crates/core/src");
        fs::create_dir_all(&nested).unwrap();

        let dir = resolve_data_dir(None, &nested).unwrap();
        assert_eq!(dir, temp.path().join(DATA_DIR_NAME));
    }

    #[test]
    fn override_wins_over_marker_search() {
        let temp = TempDir::new().unwrap();
        let custom = temp.path().join("elsewhere");

        let dir = resolve_data_dir(Some(custom.clone()), temp.path()).unwrap();
        assert_eq!(dir, custom);
    }

    #[test]
    fn override_pointing_at_file_is_rejected() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("data.csv");
        fs::write(&file, "x").unwrap();

        let err = resolve_data_dir(Some(file), temp.path()).unwrap_err();
        assert!(matches!(err, HmsError::DataDir(_)));
    }

    #[test]
    fn resolve_creates_data_dir_and_parses_base() {
        let temp = TempDir::new().unwrap();
        let data = temp.path().join("hms-data");

        let cfg = CoreConfig::resolve(
            Some(data.to_string_lossy().into_owned()),
            Some(" 9000 ".into()),
            temp.path(),
        )
        .unwrap();

        assert!(data.is_dir());
        assert_eq!(cfg.case_id_base(), 9000);
        assert_eq!(cfg.emergency_cases_file(), data.join(EMERGENCY_CASES_FILE));
    }

    #[test]
    fn case_id_base_defaults_and_rejects_garbage() {
        assert_eq!(case_id_base_from_env_value(None).unwrap(), DEFAULT_CASE_ID_BASE);
        assert_eq!(
            case_id_base_from_env_value(Some("  ".into())).unwrap(),
            DEFAULT_CASE_ID_BASE
        );
        assert!(case_id_base_from_env_value(Some("abc".into())).is_err());
    }
}
