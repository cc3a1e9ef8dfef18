//! Configuration synchronization between two checkouts.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Result, TaggerError};

/// Outcome of one synchronization pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Files copied into the target, relative to the checkout roots.
    pub copied: Vec<PathBuf>,
    /// Configured paths that do not exist in the source checkout.
    pub missing: Vec<PathBuf>,
}

impl SyncReport {
    /// Whether at least one file was written to the target.
    pub fn changed(&self) -> bool {
        !self.copied.is_empty()
    }
}

/// Copies configured files from one checkout into another when they differ.
pub struct ConfigSynchronizer<'a> {
    paths: &'a [PathBuf],
}

impl<'a> ConfigSynchronizer<'a> {
    pub fn new(paths: &'a [PathBuf]) -> Self {
        ConfigSynchronizer { paths }
    }

    /// Flatten the configured paths into the relative files they name.
    ///
    /// Directories are walked recursively in file-name order. Configured paths
    /// absent from `source_root` are returned separately.
    pub fn collect_files(&self, source_root: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
        let mut files = Vec::new();
        let mut missing = Vec::new();

        for configured in self.paths {
            let root = source_root.join(configured);
            if !root.exists() {
                missing.push(configured.clone());
                continue;
            }
            if root.is_file() {
                files.push(configured.clone());
                continue;
            }

            for entry in WalkDir::new(&root).sort_by_file_name() {
                let entry = entry.map_err(|e| {
                    let path = e.path().unwrap_or(&root).to_path_buf();
                    TaggerError::config_sync(path, e.into())
                })?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let relative = entry
                    .path()
                    .strip_prefix(source_root)
                    .map_err(|e| {
                        TaggerError::config_sync(
                            entry.path(),
                            std::io::Error::new(ErrorKind::InvalidInput, e),
                        )
                    })?
                    .to_path_buf();
                files.push(relative);
            }
        }

        Ok((files, missing))
    }

    /// Make every configured file under `target_root` byte-identical to `source_root`.
    ///
    /// Only the target is ever written, and only for files that differ or are
    /// absent there.
    pub fn sync(&self, source_root: &Path, target_root: &Path) -> Result<SyncReport> {
        let (files, missing) = self.collect_files(source_root)?;
        for path in &missing {
            warn!(path = %path.display(), "configured sync path missing in source checkout");
        }

        let mut report = SyncReport {
            copied: Vec::new(),
            missing,
        };
        for relative in files {
            if copy_if_different(&source_root.join(&relative), &target_root.join(&relative))? {
                debug!(path = %relative.display(), "synchronized");
                report.copied.push(relative);
            }
        }
        Ok(report)
    }
}

fn copy_if_different(source: &Path, target: &Path) -> Result<bool> {
    let wanted = fs::read(source).map_err(|e| TaggerError::config_sync(source, e))?;
    match fs::read(target) {
        Ok(current) if current == wanted => return Ok(false),
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(TaggerError::config_sync(target, e)),
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| TaggerError::config_sync(parent, e))?;
    }
    fs::write(target, &wanted).map_err(|e| TaggerError::config_sync(target, e))?;
    Ok(true)
}
