//! Environment variable utilities
//!
//! `SCEUA_DIR` points to the project root; generated files such as run
//! records are written below `$SCEUA_DIR/data_generated`.

use crate::constants::{DATA_GENERATED, RECORDS, SCEUA_DIR_ENV};
use std::env;
use std::path::{Path, PathBuf};

/// Error type for environment variable issues
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error(
        "SCEUA_DIR environment variable is not set. Please set it to the project root directory (e.g., export SCEUA_DIR=/path/to/sceua)"
    )]
    SceuaDirNotSet,

    #[error("SCEUA_DIR points to a non-existent directory: {0}")]
    SceuaDirNotFound(PathBuf),

    #[error("Failed to create directory {0}: {1}")]
    DirectoryCreationFailed(PathBuf, std::io::Error),
}

/// Get the SCEUA_DIR environment variable and validate it exists
///
/// # Example
///
/// ```no_run
/// use sceua_env::env_utils::get_sceua_dir;
///
/// let root = get_sceua_dir()?;
/// println!("SCE-UA directory: {}", root.display());
/// # Ok::<(), sceua_env::env_utils::EnvError>(())
/// ```
pub fn get_sceua_dir() -> Result<PathBuf, EnvError> {
    resolve_root(env::var(SCEUA_DIR_ENV).ok().as_deref())
}

fn resolve_root(value: Option<&str>) -> Result<PathBuf, EnvError> {
    let path = PathBuf::from(value.ok_or(EnvError::SceuaDirNotSet)?);
    if !path.exists() {
        return Err(EnvError::SceuaDirNotFound(path));
    }
    Ok(path)
}

fn ensure_dir(path: PathBuf) -> Result<PathBuf, EnvError> {
    if !path.exists() {
        std::fs::create_dir_all(&path).map_err(|e| EnvError::DirectoryCreationFailed(path.clone(), e))?;
    }
    Ok(path)
}

/// Records directory below `root`, created if necessary
pub fn records_dir_in(root: &Path) -> Result<PathBuf, EnvError> {
    ensure_dir(root.join(DATA_GENERATED))?;
    ensure_dir(root.join(DATA_GENERATED).join(RECORDS))
}

/// Get the path to the records subdirectory within data_generated
///
/// # Errors
///
/// Returns an error if:
/// - SCEUA_DIR is not set or invalid
/// - Cannot create the directories
pub fn get_records_dir() -> Result<PathBuf, EnvError> {
    records_dir_in(&get_sceua_dir()?)
}

/// Check if SCEUA_DIR is properly configured and print helpful information
pub fn check_sceua_env() -> Result<(), EnvError> {
    check_root(&get_sceua_dir()?).map(|_| ())
}

fn check_root(root: &Path) -> Result<PathBuf, EnvError> {
    let records = records_dir_in(root)?;

    println!("✓ SCEUA_DIR: {}", root.display());
    println!("✓ Records directory: {}", records.display());

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sceua_dir_not_set() {
        assert!(matches!(resolve_root(None), Err(EnvError::SceuaDirNotSet)));
    }

    #[test]
    fn test_sceua_dir_nonexistent() {
        let result = resolve_root(Some("/this/path/should/not/exist"));
        assert!(matches!(result, Err(EnvError::SceuaDirNotFound(_))));
    }

    #[test]
    fn test_records_dir_is_created() {
        let tmp = tempfile::tempdir().unwrap();
        let root = resolve_root(tmp.path().to_str()).unwrap();
        let records = records_dir_in(&root).unwrap();
        assert!(records.is_dir());
        assert!(records.ends_with("data_generated/records"));
        // second call finds the existing directory
        assert_eq!(records_dir_in(&root).unwrap(), records);
    }

    #[test]
    fn test_check_root_prepares_records_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let records = check_root(tmp.path()).unwrap();
        assert!(records.is_dir());
        assert!(records.starts_with(tmp.path()));
    }
}
