//! Shared test utilities for the firmware-page test suite.
//!
//! Builds throwaway firmware source trees and small line-based templates so
//! tests can assert on rendered output without parsing HTML.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! source_tree(tmp.path(), &[("artwork", &["oxocard_mini_artwork_v001.bin"])]);
//!
//! let layout = Layout::new(tmp.path(), tmp.path().join("out"));
//! publish(&layout, &test_templates(), &products).unwrap();
//! assert_eq!(index_lines(&layout.index_path()), vec!["Artwork|artwork|v001"]);
//! ```

use std::fs;
use std::path::Path;

use crate::render::Templates;

/// Bootloader bytes written by [`source_tree`]; not valid UTF-8 on purpose.
pub const BOOTLOADER_BYTES: &[u8] = &[0xe9, 0x03, 0x02, 0x20, 0x00, 0xff, 0xfe, 0x80];
pub const PARTITION_TABLE_BYTES: &[u8] = &[0xaa, 0x50, 0x01, 0x02, 0x00, 0x90, 0x00, 0x00];

/// Manifest template rendering a flat JSON object.
pub const TEST_MANIFEST_TEMPLATE: &str =
    r#"{"name": "{{ name }}", "version": "{{ version }}", "file_name": "{{ file_name }}"}"#;
/// Index template rendering one `name|stem|version` line per product.
pub const TEST_INDEX_TEMPLATE: &str =
    "{% for p in products %}{{ p.name }}|{{ p.stem }}|{{ p.version }}\n{% endfor %}";

// =========================================================================
// Fixture setup
// =========================================================================

/// Create `names` in `dir`, each containing its own name plus a binary tail.
pub fn touch_all(dir: &Path, names: &[&str]) {
    fs::create_dir_all(dir).unwrap();
    for name in names {
        let mut contents = name.as_bytes().to_vec();
        contents.extend_from_slice(&[0x00, 0xff, 0x7f]);
        fs::write(dir.join(name), contents).unwrap();
    }
}

/// Lay out a firmware source tree under `root`.
///
/// Writes `common/bootloader.bin` and `common/partition-table.bin`, plus one
/// directory per `(directory, files)` entry.
pub fn source_tree(root: &Path, products: &[(&str, &[&str])]) {
    let common = root.join("common");
    fs::create_dir_all(&common).unwrap();
    fs::write(common.join("bootloader.bin"), BOOTLOADER_BYTES).unwrap();
    fs::write(common.join("partition-table.bin"), PARTITION_TABLE_BYTES).unwrap();

    for (directory, files) in products {
        touch_all(&root.join(directory), files);
    }
}

pub fn test_templates() -> Templates {
    Templates::from_sources(TEST_MANIFEST_TEMPLATE, TEST_INDEX_TEMPLATE).unwrap()
}

// =========================================================================
// Output readers
// =========================================================================

/// Parse a rendered manifest. Panics with the file content on invalid JSON.
pub fn read_json(path: &Path) -> serde_json::Value {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("{} is not JSON ({e}):\n{content}", path.display()))
}

/// Entries of an index rendered with [`TEST_INDEX_TEMPLATE`].
pub fn index_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
        .lines()
        .map(str::to_string)
        .collect()
}
