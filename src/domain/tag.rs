use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, TaggerError};

/// Number of dot-separated segments a stable release tag carries.
pub const STABLE_SEGMENTS: usize = 4;

static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z][0-9A-Za-z._+*-]*$").expect("Invalid regex"));

/// A release tag such as `2.1.0.0`.
///
/// Tags with exactly four numeric (or `*`) segments are stable releases. Any
/// other shape is accepted but flagged non-stable, which keeps the app
/// repository pinned to the exact tag instead of a floating constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTag {
    name: String,
    segments: Vec<String>,
    stable: bool,
}

impl ReleaseTag {
    /// Parse and validate a tag name.
    ///
    /// # Returns
    /// * `Ok(ReleaseTag)` - The tag, with its stable flag computed once
    /// * `Err` - If the name is empty or not usable as a git ref
    pub fn parse(name: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TaggerError::tag("Tag name cannot be empty"));
        }

        if !TAG_REGEX.is_match(name) || name.contains("..") || name.ends_with('.') {
            return Err(TaggerError::tag(format!(
                "Invalid tag '{}': expected dot-separated segments like 2.1.0.0",
                name
            )));
        }

        let segments: Vec<String> = name.split('.').map(str::to_string).collect();
        let stable = segments.len() == STABLE_SEGMENTS
            && segments
                .iter()
                .all(|s| s == "*" || s.chars().all(|c| c.is_ascii_digit()));

        Ok(ReleaseTag {
            name: name.to_string(),
            segments,
            stable,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn is_stable(&self) -> bool {
        self.stable
    }

    /// The `major.minor.patch` part of the tag (fewer segments if the tag is shorter).
    pub fn maintenance_line(&self) -> String {
        let take = self.segments.len().min(3);
        self.segments[..take].join(".")
    }

    /// Long-lived maintenance branch the release is cut from, e.g. `2.1.0.x`.
    pub fn origin_branch(&self) -> String {
        format!("{}.x", self.maintenance_line())
    }

    /// Floating dependency constraint, e.g. `2.1.*.*`.
    ///
    /// Non-stable tags have no meaningful float, so the tag itself is returned.
    pub fn generic_tag(&self) -> String {
        if self.stable {
            format!("{}.{}.*.*", self.segments[0], self.segments[1])
        } else {
            self.name.clone()
        }
    }

    /// Changelog file kept at the repository root for this maintenance line.
    pub fn changelog_file(&self) -> String {
        format!("CHANGELOG-{}.md", self.maintenance_line())
    }
}

impl fmt::Display for ReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl FromStr for ReleaseTag {
    type Err = TaggerError;

    fn from_str(s: &str) -> Result<Self> {
        ReleaseTag::parse(s)
    }
}
