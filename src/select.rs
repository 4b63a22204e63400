//! Firmware candidate discovery and latest-artifact selection.
//!
//! Each product names a directory under the source root and a file name
//! pattern. Every regular file directly inside that directory whose name
//! matches the pattern is a candidate; the published one is the first in
//! **descending lexicographic** file name order.
//!
//! ## Version Ordering
//!
//! Selection compares file names as strings, not as parsed versions. That is
//! only "the highest version" when versions are fixed-width and zero-padded:
//!
//! ```text
//! oxocard_mini_artwork_v010.bin   ← selected
//! oxocard_mini_artwork_v009.bin
//! oxocard_mini_artwork_v002.bin
//! ```
//!
//! With unpadded versions `v9` sorts after `v10` and wins. The firmware build
//! pads its version numbers, and the page keeps plain string ordering so that
//! what gets published is exactly what `ls | sort -r` shows.

use crate::config::Product;
use crate::naming::firmware_version;
use crate::types::Artifact;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum SelectError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Firmware directory not found: {0}")]
    MissingDirectory(PathBuf),
    #[error("Invalid file pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: glob::PatternError,
    },
    #[error("No firmware matching '{pattern}' found in {}", .directory.display())]
    NoArtifact { directory: PathBuf, pattern: String },
    #[error("Firmware file name is not valid UTF-8: {0}")]
    NonUtf8Name(PathBuf),
}

fn name_matches(matcher: &glob::Pattern, path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| matcher.matches(&name.to_string_lossy()))
}

/// List the candidate files for `pattern` in `directory`, latest first.
///
/// Only regular files directly inside `directory` are considered (symlinks are
/// followed). Entries that cannot be read, such as dangling links, are skipped
/// unless their name matches the pattern. The result is sorted by file name,
/// descending.
pub fn find_candidates(directory: &Path, pattern: &str) -> Result<Vec<PathBuf>, SelectError> {
    if !directory.is_dir() {
        return Err(SelectError::MissingDirectory(directory.to_path_buf()));
    }
    let matcher = glob::Pattern::new(pattern).map_err(|source| SelectError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut candidates = Vec::new();
    for entry in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() > 0 && !e.path().is_some_and(|p| name_matches(&matcher, p)) => {
                debug!("Skipping unreadable entry: {e}");
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        if entry.file_type().is_file() && name_matches(&matcher, entry.path()) {
            candidates.push(entry.into_path());
        }
    }

    candidates.sort_by(|a, b| b.file_name().cmp(&a.file_name()));
    Ok(candidates)
}

/// Select the latest firmware for `pattern` in `directory`.
///
/// Fails with [`SelectError::NoArtifact`] when nothing matches.
pub fn select_latest(directory: &Path, pattern: &str) -> Result<Artifact, SelectError> {
    let candidates = find_candidates(directory, pattern)?;
    let listed: Vec<_> = candidates.iter().filter_map(|p| p.file_name()).collect();
    debug!(
        directory = %directory.display(),
        pattern,
        candidates = ?listed,
        "firmware candidates"
    );

    let path = candidates
        .into_iter()
        .next()
        .ok_or_else(|| SelectError::NoArtifact {
            directory: directory.to_path_buf(),
            pattern: pattern.to_string(),
        })?;

    let Some(file_name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
        return Err(SelectError::NonUtf8Name(path));
    };
    let version = firmware_version(&file_name);

    Ok(Artifact {
        path,
        file_name,
        version,
    })
}

/// Select the firmware to publish for `product` under `source_root`.
pub fn select_product(source_root: &Path, product: &Product) -> Result<Artifact, SelectError> {
    let artifact = select_latest(&source_root.join(&product.directory), &product.pattern)?;
    info!(
        "Using firmware {} for card {}",
        artifact.path.display(),
        product.name
    );
    Ok(artifact)
}
