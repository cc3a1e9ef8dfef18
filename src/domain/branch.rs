use super::tag::ReleaseTag;

/// Prefix of the short-lived branch that lands changelog edits.
pub const PREPARE_PREFIX: &str = "prepare-";

/// Prefix of the branch that is tagged as the release point.
pub const RELEASE_PREFIX: &str = "release-";

/// Branch names derived from a release tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseBranches {
    pub origin: String,
    pub prepare: String,
    pub release: String,
}

impl ReleaseBranches {
    pub fn for_tag(tag: &ReleaseTag) -> Self {
        ReleaseBranches {
            origin: tag.origin_branch(),
            prepare: format!("{}{}", PREPARE_PREFIX, tag),
            release: format!("{}{}", RELEASE_PREFIX, tag),
        }
    }

    /// Branches this tool creates, in cleanup order.
    pub fn created(&self) -> [&str; 2] {
        [&self.prepare, &self.release]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branches_for_stable_tag() {
        let tag = ReleaseTag::parse("2.1.0.0").unwrap();
        let branches = ReleaseBranches::for_tag(&tag);
        assert_eq!(branches.origin, "2.1.0.x");
        assert_eq!(branches.prepare, "prepare-2.1.0.0");
        assert_eq!(branches.release, "release-2.1.0.0");
    }

    #[test]
    fn test_created_excludes_origin() {
        let tag = ReleaseTag::parse("2.1.0.3").unwrap();
        let branches = ReleaseBranches::for_tag(&tag);
        assert_eq!(branches.created(), ["prepare-2.1.0.3", "release-2.1.0.3"]);
    }
}
