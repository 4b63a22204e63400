//! Template rendering for manifests and the index page.
//!
//! Both outputs come from text templates in the templates directory, rendered
//! with [Tera](https://keats.github.io/tera/) (Jinja-style syntax):
//!
//! | Template | Context |
//! |----------|---------|
//! | `manifest.json` | `name`, `version`, `file_name`, plus the product's `variables` |
//! | `index.html` | `products`: list of `{ name, stem, version }` |
//!
//! Autoescaping is off for every template. Manifests are JSON, not HTML, and
//! the index template decides for itself where `| escape` is needed.
//!
//! Undefined variables are render errors, so a template that references a
//! variable a product does not define fails the build instead of publishing an
//! empty field.

use crate::config::Product;
use crate::types::Artifact;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};
use thiserror::Error;

pub const MANIFEST_TEMPLATE: &str = "manifest.json";
pub const INDEX_TEMPLATE: &str = "index.html";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Template not found: {0}")]
    MissingTemplate(PathBuf),
    #[error("Template error: {0}")]
    Tera(#[from] tera::Error),
}

/// The parsed manifest and index templates.
#[derive(Debug)]
pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// Load `manifest.json` and `index.html` from `dir`.
    pub fn load(dir: &Path) -> Result<Self, RenderError> {
        let mut files = Vec::new();
        for name in [MANIFEST_TEMPLATE, INDEX_TEMPLATE] {
            let path = dir.join(name);
            if !path.is_file() {
                return Err(RenderError::MissingTemplate(path));
            }
            files.push((path, Some(name)));
        }

        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_template_files(files)?;
        Ok(Self { tera })
    }

    /// Build templates from in-memory sources.
    pub fn from_sources(manifest: &str, index: &str) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_templates(vec![(MANIFEST_TEMPLATE, manifest), (INDEX_TEMPLATE, index)])?;
        Ok(Self { tera })
    }

    /// Render the install manifest for `product` publishing `artifact`.
    pub fn render_manifest(
        &self,
        product: &Product,
        artifact: &Artifact,
    ) -> Result<String, RenderError> {
        let mut context = Context::new();
        for (key, value) in &product.variables {
            context.insert(key.as_str(), value);
        }
        context.insert("name", &product.name);
        context.insert("version", &artifact.version);
        context.insert("file_name", &artifact.file_name);
        Ok(self.tera.render(MANIFEST_TEMPLATE, &context)?)
    }

    /// Render the index page listing `products` in order.
    ///
    /// `products` serializes as a list of [`ProductEntry`](crate::types::ProductEntry)-shaped records.
    pub fn render_index<T: Serialize>(&self, products: &[T]) -> Result<String, RenderError> {
        let mut context = Context::new();
        context.insert("products", products);
        Ok(self.tera.render(INDEX_TEMPLATE, &context)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductEntry;
    use std::fs;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"{"name": "{{ name }}", "version": "{{ version }}", "file_name": "{{ file_name }}"}"#;
    const INDEX: &str = "{% for p in products %}{{ p.name }}|{{ p.stem }}|{{ p.version }}\n{% endfor %}";

    fn artifact(file_name: &str, version: &str) -> Artifact {
        Artifact {
            path: PathBuf::from(file_name),
            file_name: file_name.to_string(),
            version: version.to_string(),
        }
    }

    fn entry(name: &str, stem: &str, version: &str) -> ProductEntry {
        ProductEntry {
            name: name.to_string(),
            stem: stem.to_string(),
            version: version.to_string(),
        }
    }

    #[test]
    fn manifest_contains_builtins_and_variables() {
        let templates = Templates::from_sources(
            r#"{{ name }};{{ version }};{{ file_name }};{{ foo }}"#,
            INDEX,
        )
        .unwrap();
        let mut product = Product::new("X", "x", "x", "x_v*.bin");
        product
            .variables
            .insert("foo".to_string(), serde_json::json!("bar"));

        let out = templates
            .render_manifest(&product, &artifact("x_v003.bin", "v003"))
            .unwrap();
        assert_eq!(out, "X;v003;x_v003.bin;bar");
    }

    #[test]
    fn manifest_renders_structured_variables() {
        let templates = Templates::from_sources(
            r#"{% for part in parts %}{{ part.offset }} {% endfor %}"#,
            INDEX,
        )
        .unwrap();
        let mut product = Product::new("X", "x", "x", "*.bin");
        product.variables.insert(
            "parts".to_string(),
            serde_json::json!([{"offset": 4096}, {"offset": 65536}]),
        );

        let out = templates
            .render_manifest(&product, &artifact("x_v1.bin", "v1"))
            .unwrap();
        assert_eq!(out, "4096 65536 ");
    }

    #[test]
    fn manifest_is_valid_json() {
        let templates = Templates::from_sources(MANIFEST, INDEX).unwrap();
        let product = Product::new("Oxocard Mini Galaxy", "galaxy", "galaxy", "*.bin");

        let out = templates
            .render_manifest(&product, &artifact("oxocard_mini_galaxy_v004.bin", "v004"))
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["name"], "Oxocard Mini Galaxy");
        assert_eq!(json["version"], "v004");
        assert_eq!(json["file_name"], "oxocard_mini_galaxy_v004.bin");
    }

    #[test]
    fn undefined_variable_is_error() {
        let templates = Templates::from_sources("{{ chip_family }}", INDEX).unwrap();
        let product = Product::new("X", "x", "x", "*.bin");

        let result = templates.render_manifest(&product, &artifact("x_v1.bin", "v1"));
        assert!(matches!(result, Err(RenderError::Tera(_))));
    }

    #[test]
    fn syntax_error_is_error() {
        let result = Templates::from_sources("{{ name ", INDEX);
        assert!(matches!(result, Err(RenderError::Tera(_))));
    }

    #[test]
    fn index_lists_products_in_order() {
        let templates = Templates::from_sources(MANIFEST, INDEX).unwrap();
        let products = vec![
            entry("A", "a", "v001"),
            entry("B", "b", "v002"),
            entry("C", "c", "v003"),
        ];

        let out = templates.render_index(&products).unwrap();
        assert_eq!(out, "A|a|v001\nB|b|v002\nC|c|v003\n");
    }

    #[test]
    fn index_is_not_autoescaped() {
        let templates = Templates::from_sources(MANIFEST, INDEX).unwrap();
        let products = vec![entry("Science + (PLUS) & Co", "scienceplus", "v1")];

        let out = templates.render_index(&products).unwrap();
        assert!(out.contains("Science + (PLUS) & Co"));
    }

    #[test]
    fn load_from_directory() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(MANIFEST_TEMPLATE), MANIFEST).unwrap();
        fs::write(tmp.path().join(INDEX_TEMPLATE), INDEX).unwrap();

        let templates = Templates::load(tmp.path()).unwrap();
        let out = templates.render_index(&[entry("A", "a", "v1")]).unwrap();
        assert_eq!(out, "A|a|v1\n");
    }

    #[test]
    fn load_missing_template_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(MANIFEST_TEMPLATE), MANIFEST).unwrap();

        let result = Templates::load(tmp.path());
        match result {
            Err(RenderError::MissingTemplate(path)) => {
                assert_eq!(path, tmp.path().join(INDEX_TEMPLATE));
            }
            other => panic!("expected MissingTemplate, got {other:?}"),
        }
    }

    #[test]
    fn shipped_templates_render() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("templates");
        let templates = Templates::load(&dir).unwrap();
        let product = Product::new(
            "Oxocard Mini Artwork",
            "artwork",
            "artwork",
            "oxocard_mini_artwork_v*.bin",
        );

        let manifest = templates
            .render_manifest(&product, &artifact("oxocard_mini_artwork_v002.bin", "v002"))
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&manifest).unwrap();
        assert_eq!(json["name"], "Oxocard Mini Artwork");
        assert_eq!(json["version"], "v002");
        let paths: Vec<&str> = json["builds"][0]["parts"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["path"].as_str().unwrap())
            .collect();
        assert_eq!(
            paths,
            vec![
                "firmware/common/bootloader.bin",
                "firmware/common/partition-table.bin",
                "firmware/oxocard_mini_artwork_v002.bin"
            ]
        );

        let index = templates
            .render_index(&[entry("Oxocard Mini Artwork", "artwork", "v002")])
            .unwrap();
        assert!(index.contains("manifest_artwork.json"));
        assert!(index.contains("v002"));
    }
}
