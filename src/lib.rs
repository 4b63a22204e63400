//! # Firmware Page
//!
//! Builds the static firmware download page for the Oxocard Mini product line.
//! For every configured product it picks the latest firmware binary from the
//! firmware source tree, copies it next to the shared bootloader and partition
//! table, and renders an install manifest per product plus an `index.html`
//! listing them all.
//!
//! # Pipeline
//!
//! ```text
//! config.toml ─> SiteConfig ─> copy common/ ─> for each product:
//!                                                select latest binary
//!                                                copy to firmware/
//!                                                render manifest_<slug>.json
//!                                                render index.html
//! ```
//!
//! The run is a single forward pass. The first error stops it; files written
//! before that stay on disk.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | Stock product list, `config.toml` loading, merging and validation |
//! | [`select`] | Candidate discovery and latest-firmware selection |
//! | [`naming`] | Version string from a firmware file name |
//! | [`render`] | Manifest and index templates (Tera) |
//! | [`publish`] | Output layout, copies, per-product fold, dry-run check |
//! | [`types`] | Records shared between stages (`ProductEntry`, `Artifact`) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## "Latest" Means Lexicographically Greatest
//!
//! Firmware versions are zero-padded (`v009`, `v010`), so the greatest file
//! name is the newest build. Selection compares names as strings and does not
//! parse versions; see [`select`].
//!
//! ## Templates Stay Outside the Binary
//!
//! Manifests feed an external web installer whose format changes
//! independently of this tool, and the page design belongs to whoever hosts
//! it. Both are plain text templates in `templates/`, edited without a
//! rebuild.

pub mod config;
pub mod naming;
pub mod output;
pub mod publish;
pub mod render;
pub mod select;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
