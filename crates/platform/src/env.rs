//! Process search-path (`PATH`) manipulation

use pyembed_errors::PlatformError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

const SEARCH_PATH_VAR: &str = "PATH";

/// Compute a new search path with `entry` first.
///
/// Returns `Ok(None)` when `entry` is already present, so repeated calls
/// leave the value unchanged.
///
/// # Errors
///
/// Returns an error if `entry` contains the platform's path separator.
pub fn prepend_entry(
    current: Option<&OsString>,
    entry: &Path,
) -> Result<Option<OsString>, PlatformError> {
    let existing: Vec<PathBuf> = current
        .map(|value| std::env::split_paths(value).collect())
        .unwrap_or_default();

    if existing.iter().any(|p| p == entry) {
        return Ok(None);
    }

    let joined = std::env::join_paths(std::iter::once(entry.to_path_buf()).chain(existing))
        .map_err(|e| PlatformError::InvalidSearchPath {
            entry: entry.display().to_string(),
            message: e.to_string(),
        })?;
    Ok(Some(joined))
}

/// Prepend `entry` to this process's `PATH` unless it is already there.
///
/// Returns whether the variable was changed. Child processes spawned
/// afterwards inherit the new value.
///
/// # Errors
///
/// Returns an error if `entry` cannot be joined into a search path.
pub fn prepend_to_search_path(entry: &Path) -> Result<bool, PlatformError> {
    let current = std::env::var_os(SEARCH_PATH_VAR);
    match prepend_entry(current.as_ref(), entry)? {
        Some(updated) => {
            std::env::set_var(SEARCH_PATH_VAR, updated);
            Ok(true)
        }
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_prepend_is_idempotent() {
        let current = OsString::from("/usr/bin:/bin");
        let entry = Path::new("/opt/pyembed/python-3.7.3-embed-amd64");

        let updated = prepend_entry(Some(&current), entry).unwrap().unwrap();
        assert_eq!(
            updated,
            OsString::from("/opt/pyembed/python-3.7.3-embed-amd64:/usr/bin:/bin")
        );
        assert!(prepend_entry(Some(&updated), entry).unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_prepend_to_empty() {
        let updated = prepend_entry(None, Path::new("/opt/py")).unwrap().unwrap();
        assert_eq!(updated, OsString::from("/opt/py"));
    }

    #[cfg(unix)]
    #[test]
    fn test_separator_in_entry_is_rejected() {
        let err = prepend_entry(None, Path::new("/opt/a:b")).unwrap_err();
        assert!(matches!(err, PlatformError::InvalidSearchPath { .. }));
    }
}
