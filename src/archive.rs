use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Result, TaggerError};

/// A packaged release archive on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseArchive {
    pub path: PathBuf,
    pub file_name: String,
    pub entries: usize,
}

impl ReleaseArchive {
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        fs::read(&self.path).map_err(|e| {
            TaggerError::archive(format!("Cannot read {}: {}", self.path.display(), e))
        })
    }
}

fn is_git_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_type().is_dir() && entry.file_name() == ".git"
}

/// Zip every file under `root` into `output_dir/file_name`.
///
/// Entry names are relative to `root` with `/` separators. `.git`
/// directories are left out; an existing archive of the same name is
/// overwritten.
pub fn create_archive(root: &Path, output_dir: &Path, file_name: &str) -> Result<ReleaseArchive> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(file_name);
    let file = File::create(&path).map_err(|e| {
        TaggerError::archive(format!("Cannot create {}: {}", path.display(), e))
    })?;

    let mut zip = ZipWriter::new(file);
    let base_options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(true);
    let mut entries = 0;

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_git_dir(e));
    for entry in walker {
        let entry = entry.map_err(|e| TaggerError::archive(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| TaggerError::archive(e.to_string()))?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let options = with_permissions(base_options, &entry)?;
        zip.start_file(name.as_str(), options)?;
        let mut source = File::open(entry.path())?;
        io::copy(&mut source, &mut zip)?;
        entries += 1;
        debug!(entry = %name, "archived");
    }

    zip.finish()?;
    info!(path = %path.display(), entries, "release archive written");
    Ok(ReleaseArchive {
        path,
        file_name: file_name.to_string(),
        entries,
    })
}

#[cfg(unix)]
fn with_permissions(options: SimpleFileOptions, entry: &DirEntry) -> Result<SimpleFileOptions> {
    use std::os::unix::fs::PermissionsExt;
    let metadata = entry.metadata().map_err(|e| TaggerError::archive(e.to_string()))?;
    Ok(options.unix_permissions(metadata.permissions().mode()))
}

#[cfg(not(unix))]
fn with_permissions(options: SimpleFileOptions, _entry: &DirEntry) -> Result<SimpleFileOptions> {
    Ok(options)
}
