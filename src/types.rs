//! Shared types passed between selection, rendering and output.
//!
//! [`ProductEntry`] is serialized straight into the index template context, so
//! its field names are part of the template contract: `name`, `stem`,
//! `version`.

use serde::Serialize;
use std::path::PathBuf;

/// One product as listed on the index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductEntry {
    /// Display name, e.g. "Oxocard Mini Artwork"
    pub name: String,
    /// Manifest slug; the page links to `manifest_{stem}.json`
    pub stem: String,
    /// Version of the published firmware, e.g. "v012"
    pub version: String,
}

/// The firmware file chosen for a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Full path of the source file
    pub path: PathBuf,
    /// File name, kept unchanged in the output tree
    pub file_name: String,
    /// Version derived from the file name
    pub version: String,
}
