//! Zip extraction
//!
//! Extraction is skipped when every entry in the archive already exists at
//! the destination. Only existence is checked, not content.

use pyembed_errors::{Error, InstallError};
use std::fs::File;
use std::path::{Path, PathBuf};
use tokio::task;

/// What an extraction did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractReport {
    /// Number of entries in the archive
    pub entries: usize,
    /// Whether nothing was written because everything was already present
    pub skipped: bool,
}

fn extraction_error(message: String) -> Error {
    InstallError::ExtractionFailed { message }.into()
}

/// Extract the zip archive at `archive_path` into `dest_dir`.
///
/// With `skip_if_present`, nothing is written when every entry's target
/// path already exists. Otherwise every entry is (re)written.
///
/// # Errors
///
/// Returns an error if the archive cannot be opened or read, or an entry
/// cannot be written.
pub async fn extract_zip(
    archive_path: &Path,
    dest_dir: &Path,
    skip_if_present: bool,
) -> Result<ExtractReport, Error> {
    tokio::fs::create_dir_all(dest_dir)
        .await
        .map_err(|e| InstallError::FilesystemError {
            operation: "create_extract_dir".to_string(),
            path: dest_dir.display().to_string(),
            message: e.to_string(),
        })?;

    let archive_path = archive_path.to_path_buf();
    let dest_dir = dest_dir.to_path_buf();

    task::spawn_blocking(move || extract_blocking(&archive_path, &dest_dir, skip_if_present))
        .await
        .map_err(|e| extraction_error(format!("Task join error: {e}")))?
}

fn extract_blocking(
    archive_path: &Path,
    dest_dir: &Path,
    skip_if_present: bool,
) -> Result<ExtractReport, Error> {
    let file = File::open(archive_path)
        .map_err(|e| extraction_error(format!("Failed to open archive: {e}")))?;

    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| extraction_error(format!("Failed to read zip archive: {e}")))?;

    let targets: Vec<Option<PathBuf>> = (0..archive.len())
        .map(|i| {
            archive
                .by_index(i)
                .map(|entry| entry.enclosed_name().map(|path| dest_dir.join(path)))
                .map_err(|e| extraction_error(format!("Failed to read zip entry: {e}")))
        })
        .collect::<Result<_, _>>()?;

    if skip_if_present && targets.iter().flatten().all(|path| path.exists()) {
        return Ok(ExtractReport {
            entries: archive.len(),
            skipped: true,
        });
    }

    for (i, target) in targets.iter().enumerate() {
        // Entries escaping the destination are ignored
        let Some(outpath) = target else {
            continue;
        };

        let mut entry = archive
            .by_index(i)
            .map_err(|e| extraction_error(format!("Failed to read zip entry: {e}")))?;

        if entry.is_dir() {
            std::fs::create_dir_all(outpath)
                .map_err(|e| extraction_error(format!("Failed to create directory: {e}")))?;
        } else {
            if let Some(p) = outpath.parent() {
                if !p.exists() {
                    std::fs::create_dir_all(p).map_err(|e| {
                        extraction_error(format!("Failed to create parent directory: {e}"))
                    })?;
                }
            }
            let mut outfile = File::create(outpath)
                .map_err(|e| extraction_error(format!("Failed to create file: {e}")))?;
            std::io::copy(&mut entry, &mut outfile)
                .map_err(|e| extraction_error(format!("Failed to extract file: {e}")))?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(outpath, std::fs::Permissions::from_mode(mode)).ok();
            }
        }
    }

    Ok(ExtractReport {
        entries: archive.len(),
        skipped: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, files: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (name, body) in files {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(body).unwrap();
        }
        zip.finish().unwrap();
    }

    #[tokio::test]
    async fn test_extracts_nested_entries() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("pkg.zip");
        write_zip(
            &archive,
            &[("pkg/__init__.py", b"x = 1\n"), ("pkg/sub/mod.py", b"y = 2\n")],
        );

        let dest = dir.path().join("out");
        let report = extract_zip(&archive, &dest, true).await.unwrap();

        assert_eq!(report, ExtractReport { entries: 2, skipped: false });
        assert_eq!(
            std::fs::read_to_string(dest.join("pkg/sub/mod.py")).unwrap(),
            "y = 2\n"
        );
    }

    #[tokio::test]
    async fn test_skips_when_everything_exists() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("pkg.zip");
        write_zip(&archive, &[("a.txt", b"archive")]);

        let dest = dir.path().join("out");
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(dest.join("a.txt"), "local edit").unwrap();

        let report = extract_zip(&archive, &dest, true).await.unwrap();
        assert!(report.skipped);
        assert_eq!(std::fs::read_to_string(dest.join("a.txt")).unwrap(), "local edit");

        let report = extract_zip(&archive, &dest, false).await.unwrap();
        assert!(!report.skipped);
        assert_eq!(std::fs::read_to_string(dest.join("a.txt")).unwrap(), "archive");
    }

    #[tokio::test]
    async fn test_partial_presence_extracts() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("pkg.zip");
        write_zip(&archive, &[("a.txt", b"a"), ("b.txt", b"b")]);

        let dest = dir.path().join("out");
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(dest.join("a.txt"), "a").unwrap();

        let report = extract_zip(&archive, &dest, true).await.unwrap();
        assert!(!report.skipped);
        assert!(dest.join("b.txt").exists());
    }

    #[tokio::test]
    async fn test_corrupt_archive_is_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("broken.zip");
        std::fs::write(&archive, b"definitely not a zip").unwrap();

        let err = extract_zip(&archive, &dir.path().join("out"), true)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Install(InstallError::ExtractionFailed { .. })
        ));
    }
}
