use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::AppConfig;
use crate::error::{Result, TaggerError};

/// JSON dependency manifest of the app repository (e.g. `composer.json`).
///
/// Key order is preserved on rewrite. Only the one configured dependency
/// constraint is ever touched.
#[derive(Debug, Clone)]
pub struct DependencyManifest {
    path: PathBuf,
    section: String,
    package: String,
    original: Value,
    document: Value,
}

impl DependencyManifest {
    /// Read the manifest configured in `config` from the checkout at `root`.
    pub fn load(root: &Path, config: &AppConfig) -> Result<Self> {
        let path = root.join(&config.manifest);
        let raw = fs::read_to_string(&path).map_err(|e| {
            TaggerError::manifest(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let document: Value = serde_json::from_str(&raw)?;
        if !document.is_object() {
            return Err(TaggerError::manifest(format!(
                "{} is not a JSON object",
                path.display()
            )));
        }

        Ok(DependencyManifest {
            path,
            section: config.section.clone(),
            package: config.package.clone(),
            original: document.clone(),
            document,
        })
    }

    /// Current constraint of the configured package, if any.
    pub fn constraint(&self) -> Option<&str> {
        self.document
            .get(&self.section)?
            .get(&self.package)?
            .as_str()
    }

    /// Set the package constraint in memory.
    ///
    /// # Returns
    /// * `Ok(())` - The constraint is set
    /// * `Err(Manifest)` - If the section or the package entry does not exist
    pub fn set_constraint(&mut self, constraint: &str) -> Result<()> {
        let section: &mut Map<String, Value> = self
            .document
            .get_mut(&self.section)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| {
                TaggerError::manifest(format!(
                    "{} has no '{}' object",
                    self.path.display(),
                    self.section
                ))
            })?;
        let entry = section.get_mut(&self.package).ok_or_else(|| {
            TaggerError::manifest(format!(
                "{} does not require '{}'",
                self.path.display(),
                self.package
            ))
        })?;
        *entry = Value::String(constraint.to_string());
        debug!(package = %self.package, constraint, "manifest constraint set");
        Ok(())
    }

    /// Pretty-print with four-space indentation and a trailing newline.
    pub fn render(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.document.serialize(&mut serializer)?;
        buf.push(b'\n');
        String::from_utf8(buf).map_err(|e| TaggerError::manifest(e.to_string()))
    }

    /// Write the current document back to disk.
    pub fn save(&self) -> Result<()> {
        let rendered = self.render()?;
        fs::write(&self.path, rendered).map_err(|e| {
            TaggerError::manifest(format!("Cannot write {}: {}", self.path.display(), e))
        })
    }

    /// Whether the document differs from what was loaded.
    pub fn is_modified(&self) -> bool {
        self.document != self.original
    }
}
