//! Webpage publishing.
//!
//! Copies the shared boot artifacts, selects and copies each product's latest
//! firmware, and renders the install manifests and the index page.
//!
//! ## Output Structure
//!
//! ```text
//! webpage/
//! ├── index.html                          # All products, config order
//! ├── manifest_artwork.json               # One manifest per product slug
//! ├── manifest_galaxy.json
//! └── firmware/
//!     ├── common/
//!     │   ├── bootloader.bin              # Copied from <source>/common/
//!     │   └── partition-table.bin
//!     ├── oxocard_mini_artwork_v012.bin   # Selected binaries, names kept
//!     └── oxocard_mini_galaxy_v004.bin
//! ```
//!
//! ## Index Snapshots
//!
//! Products are processed in configuration order as a fold: each step takes
//! the releases published so far, publishes one more product, rewrites
//! `index.html` with the extended list and hands the list on. After a full run
//! the index lists every product. When a step fails the run stops there, and
//! `index.html` lists the products published before the failure.

use crate::config::Product;
use crate::render::{RenderError, Templates};
use crate::select::{self, SelectError};
use crate::types::{Artifact, ProductEntry};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

/// Subdirectory of both the source root and the output firmware directory.
pub const COMMON_DIR: &str = "common";
/// Output subdirectory holding all binaries.
pub const FIRMWARE_DIR: &str = "firmware";
/// Artifacts shared by every product, copied from `<source>/common/`.
pub const COMMON_ARTIFACTS: &[&str] = &["bootloader.bin", "partition-table.bin"];

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Shared artifact not found: {0}")]
    MissingCommonArtifact(PathBuf),
    #[error(transparent)]
    Select(#[from] SelectError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Source and output locations of a build.
#[derive(Debug, Clone)]
pub struct Layout {
    pub source_root: PathBuf,
    pub output_root: PathBuf,
}

impl Layout {
    pub fn new(source_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            output_root: output_root.into(),
        }
    }

    pub fn common_source(&self) -> PathBuf {
        self.source_root.join(COMMON_DIR)
    }

    pub fn firmware_dir(&self) -> PathBuf {
        self.output_root.join(FIRMWARE_DIR)
    }

    pub fn common_output(&self) -> PathBuf {
        self.firmware_dir().join(COMMON_DIR)
    }

    pub fn manifest_path(&self, slug: &str) -> PathBuf {
        self.output_root.join(format!("manifest_{slug}.json"))
    }

    pub fn index_path(&self) -> PathBuf {
        self.output_root.join("index.html")
    }
}

/// One product's release: the selected firmware and where its manifest goes.
#[derive(Debug, Clone)]
pub struct Release {
    pub entry: ProductEntry,
    pub artifact: Artifact,
    pub manifest: PathBuf,
}

/// Everything a full build wrote.
#[derive(Debug)]
pub struct PublishReport {
    /// Copied shared artifacts, output paths
    pub common: Vec<PathBuf>,
    /// Published products in index order
    pub releases: Vec<Release>,
    pub index: PathBuf,
}

/// What a build would publish, computed without writing anything.
#[derive(Debug)]
pub struct CheckReport {
    /// Shared artifacts found, source paths
    pub common: Vec<PathBuf>,
    pub releases: Vec<Release>,
}

/// Run the full pipeline: shared artifacts, then every product in order.
pub fn publish(
    layout: &Layout,
    templates: &Templates,
    products: &[Product],
) -> Result<PublishReport, PublishError> {
    let common = copy_common(layout)?;

    let releases = products.iter().try_fold(Vec::new(), |releases, product| {
        publish_product(layout, templates, product, releases)
    })?;

    Ok(PublishReport {
        common,
        releases,
        index: layout.index_path(),
    })
}

/// Copy `bootloader.bin` and `partition-table.bin` into `firmware/common/`.
///
/// Creates the output directory tree. Returns the output paths.
pub fn copy_common(layout: &Layout) -> Result<Vec<PathBuf>, PublishError> {
    let sources = common_sources(layout)?;
    let out_dir = layout.common_output();
    fs::create_dir_all(&out_dir)?;

    let mut copied = Vec::with_capacity(sources.len());
    for (source, name) in sources.iter().zip(COMMON_ARTIFACTS) {
        let dest = out_dir.join(name);
        fs::copy(source, &dest)?;
        debug!("Copied {} → {}", source.display(), dest.display());
        copied.push(dest);
    }
    Ok(copied)
}

/// Publish one product and rewrite the index with `releases` plus this one.
///
/// Selection happens first, so a product without firmware writes nothing.
pub fn publish_product(
    layout: &Layout,
    templates: &Templates,
    product: &Product,
    mut releases: Vec<Release>,
) -> Result<Vec<Release>, PublishError> {
    let release = plan_release(layout, product)?;

    let firmware_dir = layout.firmware_dir();
    fs::create_dir_all(&firmware_dir)?;
    let firmware_dest = firmware_dir.join(&release.artifact.file_name);
    fs::copy(&release.artifact.path, &firmware_dest)?;
    debug!("Copied firmware to {}", firmware_dest.display());

    let manifest = templates.render_manifest(product, &release.artifact)?;
    fs::write(&release.manifest, manifest)?;
    debug!("Wrote {}", release.manifest.display());

    info!(
        "Published {} {} as {}",
        product.name,
        release.entry.version,
        release.manifest.display()
    );
    releases.push(release);

    let entries: Vec<&ProductEntry> = releases.iter().map(|r| &r.entry).collect();
    fs::write(layout.index_path(), templates.render_index(&entries)?)?;

    Ok(releases)
}

/// Select a product's firmware and compute its outputs without writing.
pub fn plan_release(layout: &Layout, product: &Product) -> Result<Release, PublishError> {
    let artifact = select::select_product(&layout.source_root, product)?;
    Ok(Release {
        entry: ProductEntry {
            name: product.name.clone(),
            stem: product.slug.clone(),
            version: artifact.version.clone(),
        },
        artifact,
        manifest: layout.manifest_path(&product.slug),
    })
}

/// Verify the sources of a build without writing anything.
///
/// Fails on the same missing shared artifacts and selection errors a build
/// would hit; template problems are caught when the caller loads them.
pub fn check(layout: &Layout, products: &[Product]) -> Result<CheckReport, PublishError> {
    let common = common_sources(layout)?;
    let releases = products
        .iter()
        .map(|product| plan_release(layout, product))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CheckReport { common, releases })
}

fn common_sources(layout: &Layout) -> Result<Vec<PathBuf>, PublishError> {
    let dir = layout.common_source();
    COMMON_ARTIFACTS
        .iter()
        .map(|name| {
            let path = dir.join(name);
            if path.is_file() {
                Ok(path)
            } else {
                Err(PublishError::MissingCommonArtifact(path))
            }
        })
        .collect()
}
