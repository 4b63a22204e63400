//! CLI output formatting for `build` and `check`.
//!
//! Output is product-centric: each product leads with its page position,
//! display name and version, with the source binary and manifest shown as
//! indented context lines. Paths are shown relative to the source root and
//! output root, so the listing reads the same wherever the tree lives.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Shared
//!     firmware/common/bootloader.bin
//!     firmware/common/partition-table.bin
//!
//! Products
//! 001 Oxocard Mini Artwork v012
//!     Source: artwork/oxocard_mini_artwork_v012.bin
//!     Manifest: manifest_artwork.json
//!
//! Published 1 product → index.html
//! ```
//!
//! ## Check
//!
//! Same layout; shared artifacts are listed by source path and the summary
//! says nothing was written.
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::publish::{CheckReport, Layout, PublishReport, Release};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Display `path` relative to `root` when it lies under it.
fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "product" } else { "products" }
}

fn release_lines(releases: &[Release], layout: &Layout) -> Vec<String> {
    let mut lines = vec!["Products".to_string()];
    for (i, release) in releases.iter().enumerate() {
        lines.push(format!(
            "{} {} {}",
            format_index(i + 1),
            release.entry.name,
            release.entry.version
        ));
        lines.push(format!(
            "    Source: {}",
            relative(&release.artifact.path, &layout.source_root)
        ));
        lines.push(format!(
            "    Manifest: {}",
            relative(&release.manifest, &layout.output_root)
        ));
    }
    lines
}

/// Format the result of a full build.
pub fn format_publish_output(report: &PublishReport, layout: &Layout) -> Vec<String> {
    let mut lines = vec!["Shared".to_string()];
    for path in &report.common {
        lines.push(format!("    {}", relative(path, &layout.output_root)));
    }

    lines.push(String::new());
    lines.extend(release_lines(&report.releases, layout));

    lines.push(String::new());
    lines.push(format!(
        "Published {} {} → {}",
        report.releases.len(),
        plural(report.releases.len()),
        relative(&report.index, &layout.output_root)
    ));
    lines
}

/// Format the result of a dry run.
pub fn format_check_output(report: &CheckReport, layout: &Layout) -> Vec<String> {
    let mut lines = vec!["Shared".to_string()];
    for path in &report.common {
        lines.push(format!("    {}", relative(path, &layout.source_root)));
    }

    lines.push(String::new());
    lines.extend(release_lines(&report.releases, layout));

    lines.push(String::new());
    lines.push(format!(
        "{} {} ready, nothing written",
        report.releases.len(),
        plural(report.releases.len())
    ));
    lines
}

/// Print build output to stdout.
pub fn print_publish_output(report: &PublishReport, layout: &Layout) {
    for line in format_publish_output(report, layout) {
        println!("{}", line);
    }
}

/// Print check output to stdout.
pub fn print_check_output(report: &CheckReport, layout: &Layout) {
    for line in format_check_output(report, layout) {
        println!("{}", line);
    }
}
