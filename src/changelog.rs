//! Changelog section extraction and heading rewrite.
//!
//! A changelog is a sequence of `# <heading>` sections, most recent first.
//! While a maintenance line is open its section is headed `# <a.b.c>.x`; cutting
//! a release renames that heading to `# <tag> (<date>)` and hands the section
//! body to the release publisher.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Result, TaggerError};

const HEADING_PREFIX: &str = "# ";

/// Result of one extraction pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogSection {
    /// Lines between the matched heading and the next heading, endings kept.
    pub body: String,
    /// Full file content with the matched heading rewritten.
    pub content: String,
    /// Whether the heading was found and rewritten.
    pub changed: bool,
}

impl ChangelogSection {
    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }
}

/// Heading of the open section for a maintenance branch, e.g. `# 2.1.0.x`.
pub fn open_heading(origin_branch: &str) -> String {
    format!("{}{}", HEADING_PREFIX, origin_branch)
}

/// Heading a released section carries, e.g. `# 2.1.0.1 (2024-05-01)`.
pub fn release_heading(tag: &str, date: &str) -> String {
    format!("{}{} ({})", HEADING_PREFIX, tag, date)
}

/// Single pass over `content`.
///
/// The first line starting with the open heading is replaced and starts the
/// section; any later line starting with `"# "` ends it. Every other line is
/// copied byte for byte, line endings included.
pub fn extract_section(
    content: &str,
    origin_branch: &str,
    tag: &str,
    date: &str,
) -> ChangelogSection {
    let target = open_heading(origin_branch);
    let mut rewritten = String::with_capacity(content.len() + 16);
    let mut body = String::new();
    let mut in_section = false;
    let mut found = false;

    for line in content.split_inclusive('\n') {
        if !found && line.starts_with(&target) {
            found = true;
            in_section = true;
            rewritten.push_str(&release_heading(tag, date));
            rewritten.push_str(line_ending(line));
            continue;
        }

        rewritten.push_str(line);
        if line.starts_with(HEADING_PREFIX) {
            in_section = false;
        }
        if in_section {
            body.push_str(line);
        }
    }

    ChangelogSection {
        body,
        content: rewritten,
        changed: found,
    }
}

fn line_ending(line: &str) -> &str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}

/// Extract and rewrite the changelog at `path` in place.
///
/// The file is only written back when the heading was found; a missing heading
/// leaves it untouched and yields an empty body.
pub fn update_changelog_file(
    path: &Path,
    origin_branch: &str,
    tag: &str,
    date: &str,
) -> Result<ChangelogSection> {
    let content = fs::read_to_string(path).map_err(|e| {
        TaggerError::changelog(format!("Cannot read {}: {}", path.display(), e))
    })?;

    let section = extract_section(&content, origin_branch, tag, date);
    if section.changed {
        fs::write(path, &section.content).map_err(|e| {
            TaggerError::changelog(format!("Cannot write {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), lines = section.body.lines().count(), "changelog rewritten");
    } else {
        warn!(
            path = %path.display(),
            heading = %open_heading(origin_branch),
            "changelog heading not found"
        );
    }
    Ok(section)
}
