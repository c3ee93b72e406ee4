//! Source directory scanning.
//!
//! Listing is non-recursive and sorted by file name so that two scans of the
//! same directory always yield the same upload order.

use crate::models::DiscoveredFile;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;
use std::fs;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Source directory not found or unreadable: {path}")]
    DirectoryNotFound {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// List the regular files directly inside `dir`, sorted by name.
///
/// Entries whose names are not valid UTF-8 are skipped with a warning.
pub fn list_files(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>, DiscoveryError> {
    let entries = fs::read_dir(dir).map_err(|source| DiscoveryError::DirectoryNotFound {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in {}: {}", dir, e);
                continue;
            }
        };

        let path = match Utf8PathBuf::from_path_buf(entry.path()) {
            Ok(path) => path,
            Err(path) => {
                tracing::warn!("Skipping non UTF-8 file name: {}", path.display());
                continue;
            }
        };

        if path.is_file() {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Find media files in `dir` whose extension is in `allowed_extensions`.
///
/// Extensions compare without regard to case and with or without a leading
/// dot. The result is sorted by file name and truncated to `batch_limit`
/// entries; a limit of zero yields an empty list. No matching files is not an
/// error.
pub fn discover<I, S>(
    dir: &Utf8Path,
    allowed_extensions: I,
    batch_limit: usize,
) -> Result<Vec<DiscoveredFile>, DiscoveryError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let allowed: HashSet<String> = allowed_extensions
        .into_iter()
        .map(|ext| {
            let ext = ext.as_ref().trim();
            ext.strip_prefix('.').unwrap_or(ext).to_lowercase()
        })
        .filter(|ext| !ext.is_empty())
        .collect();

    let files = list_files(dir)?;
    let total = files.len();

    let discovered: Vec<DiscoveredFile> = files
        .into_iter()
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| allowed.contains(&ext.to_lowercase()))
        })
        .filter_map(DiscoveredFile::from_path)
        .take(batch_limit)
        .collect();

    tracing::debug!(
        "Discovered {} media files in {} ({} entries, batch limit {})",
        discovered.len(),
        dir,
        total,
        batch_limit
    );

    Ok(discovered)
}
