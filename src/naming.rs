//! Version parsing for the `<product>_<version>.bin` firmware convention.
//!
//! Firmware binaries are published by the firmware build as
//! `oxocard_mini_artwork_v012.bin`: an underscore-separated product prefix and
//! a version as the last segment of the stem. This module extracts that last
//! segment so selection, manifests and CLI output all agree on what a file's
//! version is.
//!
//! ## Examples
//!
//! - `oxocard_mini_artwork_v012.bin` → `"v012"`
//! - `oxocard_mini_science_plus_v3.bin` → `"v3"`
//! - `x_v1.2.bin` → `"v1.2"` (only the final extension is stripped)
//! - `firmware.bin` → `"firmware"` (no underscore: the whole stem)

use std::path::Path;

/// Derive the version string from a firmware file name.
///
/// The stem is the file name without its final extension; the version is the
/// part of the stem after the last `_`.
pub fn firmware_version(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match stem.rsplit_once('_') {
        Some((_, version)) => version.to_string(),
        None => stem,
    }
}
