use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, warn};

use crate::config::VersionConfig;
use crate::error::{Result, TaggerError};

/// Replaces the placeholder value of a version constant with a release tag.
///
/// Matches declarations of the form `const NAME = "value"` where `value` is
/// one of the configured placeholders (e.g. `2.0.0.0` or `dev`). Whitespace
/// around `=` may vary; the replacement is always written as
/// `const NAME = "<tag>"`.
#[derive(Debug, Clone)]
pub struct VersionBumper {
    file: PathBuf,
    constant: String,
    pattern: Regex,
}

impl VersionBumper {
    /// Build a bumper from configuration.
    ///
    /// # Returns
    /// * `Ok(VersionBumper)` - Ready to run against a checkout
    /// * `Err` - If no placeholder is configured or the constant name is empty
    pub fn new(config: &VersionConfig) -> Result<Self> {
        if config.constant.trim().is_empty() {
            return Err(TaggerError::config("version.constant cannot be empty"));
        }
        if config.placeholders.is_empty() {
            return Err(TaggerError::config("version.placeholders cannot be empty"));
        }

        let alternatives: Vec<String> = config
            .placeholders
            .iter()
            .map(|p| regex::escape(p))
            .collect();
        let pattern = format!(
            r#"const\s+{}\s*=\s*"(?:{})""#,
            regex::escape(&config.constant),
            alternatives.join("|")
        );
        let pattern = Regex::new(&pattern)
            .map_err(|e| TaggerError::config(format!("Invalid version pattern: {}", e)))?;

        Ok(VersionBumper {
            file: config.file.clone(),
            constant: config.constant.clone(),
            pattern,
        })
    }

    /// Path of the versioned file, relative to the checkout root.
    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn constant(&self) -> &str {
        &self.constant
    }

    /// Replace every placeholder declaration in `content`.
    ///
    /// Returns `None` when no placeholder declaration was found.
    pub fn replace(&self, content: &str, tag: &str) -> Option<String> {
        if !self.pattern.is_match(content) {
            return None;
        }
        let declaration = format!("const {} = \"{}\"", self.constant, tag);
        Some(
            self.pattern
                .replace_all(content, regex::NoExpand(&declaration))
                .into_owned(),
        )
    }

    /// Bump the versioned file inside the checkout at `root`.
    ///
    /// Returns whether the file was changed. A file without any placeholder is
    /// left untouched and reported with a warning, not an error.
    pub fn bump(&self, root: &Path, tag: &str) -> Result<bool> {
        let path = root.join(&self.file);
        let content = fs::read_to_string(&path).map_err(|e| {
            std::io::Error::new(e.kind(), format!("{}: {}", path.display(), e))
        })?;

        match self.replace(&content, tag) {
            Some(updated) => {
                fs::write(&path, updated)?;
                debug!(path = %path.display(), tag, "version constant replaced");
                Ok(true)
            }
            None => {
                warn!(
                    path = %path.display(),
                    constant = %self.constant,
                    "no version placeholder found; embedded version unchanged"
                );
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"<?php

abstract class AbstractApplication
{
    const EXPANSION_VERSION = "2.0.0.0";

    public function run() {}
}
"#;

    fn bumper() -> VersionBumper {
        VersionBumper::new(&VersionConfig::default()).unwrap()
    }

    #[test]
    fn test_replaces_release_placeholder() {
        let updated = bumper().replace(SOURCE, "2.1.0.0").unwrap();
        assert_eq!(updated.matches(r#"const EXPANSION_VERSION = "2.1.0.0""#).count(), 1);
        assert!(!updated.contains("2.0.0.0"));
    }

    #[test]
    fn test_replaces_dev_placeholder() {
        let source = SOURCE.replace("2.0.0.0", "dev");
        let updated = bumper().replace(&source, "2.1.0.0").unwrap();
        assert!(updated.contains(r#"const EXPANSION_VERSION = "2.1.0.0";"#));
        assert!(!updated.contains(r#""dev""#));
    }

    #[test]
    fn test_irregular_spacing_is_normalized() {
        let source = "const EXPANSION_VERSION   =\"dev\";\n";
        let updated = bumper().replace(source, "2.1.0.0").unwrap();
        assert_eq!(updated, "const EXPANSION_VERSION = \"2.1.0.0\";\n");
    }

    #[test]
    fn test_already_versioned_file_is_a_no_op() {
        let source = SOURCE.replace("2.0.0.0", "2.0.5.0");
        assert!(bumper().replace(&source, "2.1.0.0").is_none());
    }

    #[test]
    fn test_other_constants_are_ignored() {
        let source = "const OTHER_VERSION = \"dev\";\n";
        assert!(bumper().replace(source, "2.1.0.0").is_none());
    }

    #[test]
    fn test_tag_with_dollar_is_literal() {
        let updated = bumper().replace(SOURCE, "2.1.0-$1").unwrap();
        assert!(updated.contains(r#""2.1.0-$1""#));
    }

    #[test]
    fn test_bump_reports_whether_file_changed() {
        let dir = tempfile::tempdir().unwrap();
        let bumper = bumper();
        let path = dir.path().join(bumper.file());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, SOURCE).unwrap();

        assert!(bumper.bump(dir.path(), "2.1.0.0").unwrap());
        assert!(!bumper.bump(dir.path(), "2.1.0.1").unwrap());
        assert!(fs::read_to_string(&path).unwrap().contains("2.1.0.0"));
    }

    #[test]
    fn test_requires_placeholders() {
        let config = VersionConfig {
            placeholders: Vec::new(),
            ..VersionConfig::default()
        };
        assert!(VersionBumper::new(&config).is_err());
    }
}
