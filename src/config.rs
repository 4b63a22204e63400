//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. The stock defaults
//! describe the Oxocard product line; a user file only needs the keys it wants
//! to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! source_root = "oxocard_binaries"  # Firmware source tree
//! output_root = "webpage"           # Generated page
//! templates_dir = "templates"       # manifest.json + index.html templates
//!
//! [[products]]
//! name = "Oxocard Mini Artwork"     # Display name on the page
//! slug = "artwork"                  # manifest_<slug>.json
//! directory = "artwork"             # Subdirectory of source_root
//! pattern = "oxocard_mini_artwork_v*.bin"
//!
//! [products.variables]              # Extra manifest template values
//! chip_family = "ESP32"
//! ```
//!
//! ## Products Replace, Not Merge
//!
//! Scalars and tables are merged key by key onto the stock defaults. Arrays
//! replace the stock value entirely, so a `[[products]]` list in a user file
//! is the complete product list for that build.
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Manifest template keys filled in by the publisher itself.
pub const RESERVED_VARIABLES: &[&str] = &["name", "version", "file_name"];

/// Site configuration loaded from `config.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Firmware source tree (`common/` plus one directory per product).
    pub source_root: PathBuf,
    /// Directory the webpage is generated into.
    pub output_root: PathBuf,
    /// Directory holding the `manifest.json` and `index.html` templates.
    pub templates_dir: PathBuf,
    /// Products in display order.
    pub products: Vec<Product>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("oxocard_binaries"),
            output_root: PathBuf::from("webpage"),
            templates_dir: PathBuf::from("templates"),
            products: stock_products(),
        }
    }
}

/// One firmware variant published on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Product {
    /// Display name.
    pub name: String,
    /// Identifier used in `manifest_<slug>.json` and as the index `stem`.
    pub slug: String,
    /// Subdirectory of the source root holding this product's binaries.
    pub directory: String,
    /// File name pattern of candidate binaries (`*`, `?`, `[...]`).
    #[serde(default = "default_pattern")]
    pub pattern: String,
    /// Extra values merged into the manifest template context.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, serde_json::Value>,
}

fn default_pattern() -> String {
    "*.bin".to_string()
}

impl Product {
    pub fn new(name: &str, slug: &str, directory: &str, pattern: &str) -> Self {
        Self {
            name: name.to_string(),
            slug: slug.to_string(),
            directory: directory.to_string(),
            pattern: pattern.to_string(),
            variables: BTreeMap::new(),
        }
    }
}

/// The Oxocard Mini product line, in page order.
pub fn stock_products() -> Vec<Product> {
    vec![
        Product::new(
            "Oxocard Mini Artwork",
            "artwork",
            "artwork",
            "oxocard_mini_artwork_v*.bin",
        ),
        Product::new(
            "Oxocard Mini Galaxy",
            "galaxy",
            "galaxy",
            "oxocard_mini_galaxy_v*.bin",
        ),
        Product::new(
            "Oxocard Mini Science",
            "science",
            "science",
            "oxocard_mini_science_v*.bin",
        ),
        Product::new(
            "Oxocard Mini Science + (PLUS)",
            "scienceplus",
            "scienceplus",
            "oxocard_mini_science_plus_v*.bin",
        ),
        Product::new(
            "Oxocard Mini Connect",
            "connect",
            "connect",
            "oxocard_mini_connect_v*.bin",
        ),
        Product::new(
            "Oxocard Mini Connect (Makey Edition)",
            "connect-makey",
            "connect",
            "oxocard_mini_connect_make_v*.bin",
        ),
    ]
}

impl SiteConfig {
    /// Validate the product list.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.products.is_empty() {
            return Err(ConfigError::Validation(
                "products must not be empty".into(),
            ));
        }
        let mut slugs = HashSet::new();
        for product in &self.products {
            product.validate()?;
            if !slugs.insert(product.slug.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate product slug '{}'",
                    product.slug
                )));
            }
        }
        Ok(())
    }
}

impl Product {
    fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("name", &self.name),
            ("slug", &self.slug),
            ("directory", &self.directory),
            ("pattern", &self.pattern),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "products.{key} must not be empty (product '{}')",
                    self.name
                )));
            }
        }
        if self.slug.contains(['/', '\\']) {
            return Err(ConfigError::Validation(format!(
                "products.slug '{}' must not contain a path separator",
                self.slug
            )));
        }
        if let Err(e) = glob::Pattern::new(&self.pattern) {
            return Err(ConfigError::Validation(format!(
                "products.pattern '{}' is invalid: {e}",
                self.pattern
            )));
        }
        if let Some(key) = self
            .variables
            .keys()
            .find(|k| RESERVED_VARIABLES.contains(&k.as_str()))
        {
            return Err(ConfigError::Validation(format!(
                "products.variables.{key} is reserved (product '{}')",
                self.name
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay, arrays included, replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(config_path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given `config.toml` path.
///
/// A missing file yields the stock defaults. User values are merged on top of
/// the defaults, unknown keys are rejected and the result is validated.
pub fn load_config(config_path: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(config_path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Firmware Page Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# Firmware source tree. Must contain common/bootloader.bin,
# common/partition-table.bin and one directory per product.
source_root = "oxocard_binaries"

# Directory the page is generated into.
output_root = "webpage"

# Directory holding the manifest.json and index.html templates.
templates_dir = "templates"

# ---------------------------------------------------------------------------
# Products
# ---------------------------------------------------------------------------
# Listed on the page in this order. A [[products]] list in your config
# replaces this whole list.
#
#   name       Display name
#   slug       Output name: manifest_<slug>.json
#   directory  Subdirectory of source_root with this product's binaries
#   pattern    Candidate file names (*, ?, [...]), default "*.bin".
#              The lexicographically greatest match is published, so
#              versions must be zero-padded (v010 sorts after v009).
#
# Extra manifest template values go in a [products.variables] table
# right after the product. name, version and file_name are reserved.

[[products]]
name = "Oxocard Mini Artwork"
slug = "artwork"
directory = "artwork"
pattern = "oxocard_mini_artwork_v*.bin"

[[products]]
name = "Oxocard Mini Galaxy"
slug = "galaxy"
directory = "galaxy"
pattern = "oxocard_mini_galaxy_v*.bin"

[[products]]
name = "Oxocard Mini Science"
slug = "science"
directory = "science"
pattern = "oxocard_mini_science_v*.bin"

[[products]]
name = "Oxocard Mini Science + (PLUS)"
slug = "scienceplus"
directory = "scienceplus"
pattern = "oxocard_mini_science_plus_v*.bin"

[[products]]
name = "Oxocard Mini Connect"
slug = "connect"
directory = "connect"
pattern = "oxocard_mini_connect_v*.bin"

[[products]]
name = "Oxocard Mini Connect (Makey Edition)"
slug = "connect-makey"
directory = "connect"
pattern = "oxocard_mini_connect_make_v*.bin"
"##
}
