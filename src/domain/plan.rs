use std::fmt;

use tracing::info;

use super::branch::ReleaseBranches;
use super::tag::ReleaseTag;

/// Linear stages of one release run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReleaseStage {
    Start,
    BranchesCleaned,
    ChangelogUpdated,
    VersionBumped,
    AwaitingPushConfirmation,
    Tagged,
    ReleaseCreated,
    AppDependencyPinned,
    AppInstalled,
    AppDependencyFloated,
    ConfigSynced,
    AppPushedIfChanged,
    ArtifactPackaged,
    ArtifactUploaded,
    Done,
}

impl ReleaseStage {
    pub fn name(&self) -> &'static str {
        match self {
            ReleaseStage::Start => "start",
            ReleaseStage::BranchesCleaned => "branches-cleaned",
            ReleaseStage::ChangelogUpdated => "changelog-updated",
            ReleaseStage::VersionBumped => "version-bumped",
            ReleaseStage::AwaitingPushConfirmation => "awaiting-push-confirmation",
            ReleaseStage::Tagged => "tagged",
            ReleaseStage::ReleaseCreated => "release-created",
            ReleaseStage::AppDependencyPinned => "app-dependency-pinned",
            ReleaseStage::AppInstalled => "app-installed",
            ReleaseStage::AppDependencyFloated => "app-dependency-floated",
            ReleaseStage::ConfigSynced => "config-synced",
            ReleaseStage::AppPushedIfChanged => "app-pushed-if-changed",
            ReleaseStage::ArtifactPackaged => "artifact-packaged",
            ReleaseStage::ArtifactUploaded => "artifact-uploaded",
            ReleaseStage::Done => "done",
        }
    }
}

impl fmt::Display for ReleaseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Working state of one release run, owned by the orchestrator.
#[derive(Debug, Clone)]
pub struct ReleasePlan {
    pub tag: ReleaseTag,
    /// Set once from the tag shape and only read afterwards.
    stable: bool,
    pub prerelease: bool,
    pub branches: ReleaseBranches,
    pub changelog: String,
    pub app_needs_commit: bool,
    stage: ReleaseStage,
}

impl ReleasePlan {
    pub fn new(tag: ReleaseTag, prerelease: bool) -> Self {
        let branches = ReleaseBranches::for_tag(&tag);
        ReleasePlan {
            stable: tag.is_stable(),
            tag,
            prerelease,
            branches,
            changelog: String::new(),
            app_needs_commit: false,
            stage: ReleaseStage::Start,
        }
    }

    pub fn is_stable(&self) -> bool {
        self.stable
    }

    pub fn generic_tag(&self) -> String {
        self.tag.generic_tag()
    }

    pub fn stage(&self) -> ReleaseStage {
        self.stage
    }

    /// Move to the next stage. Stages only move forward.
    pub fn advance(&mut self, next: ReleaseStage) {
        debug_assert!(next > self.stage, "{} after {}", next, self.stage);
        info!(tag = %self.tag, from = %self.stage, to = %next, "release stage");
        self.stage = next;
    }

    /// Record that the app repository picked up a change needing a commit.
    pub fn mark_app_changed(&mut self, changed: bool) {
        self.app_needs_commit |= changed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_for_stable_tag() {
        let plan = ReleasePlan::new(ReleaseTag::parse("2.1.0.0").unwrap(), false);
        assert!(plan.is_stable());
        assert_eq!(plan.branches.origin, "2.1.0.x");
        assert_eq!(plan.branches.prepare, "prepare-2.1.0.0");
        assert_eq!(plan.branches.release, "release-2.1.0.0");
        assert_eq!(plan.generic_tag(), "2.1.*.*");
        assert_eq!(plan.stage(), ReleaseStage::Start);
        assert!(!plan.app_needs_commit);
    }

    #[test]
    fn test_plan_for_unstable_tag() {
        let plan = ReleasePlan::new(ReleaseTag::parse("2.1.0-beta").unwrap(), true);
        assert!(!plan.is_stable());
        assert!(plan.prerelease);
        assert_eq!(plan.generic_tag(), "2.1.0-beta");
    }

    #[test]
    fn test_advance_moves_forward() {
        let mut plan = ReleasePlan::new(ReleaseTag::parse("2.1.0.0").unwrap(), false);
        plan.advance(ReleaseStage::BranchesCleaned);
        plan.advance(ReleaseStage::ChangelogUpdated);
        assert_eq!(plan.stage(), ReleaseStage::ChangelogUpdated);
    }

    #[test]
    fn test_app_changes_accumulate() {
        let mut plan = ReleasePlan::new(ReleaseTag::parse("2.1.0.0").unwrap(), false);
        plan.mark_app_changed(false);
        assert!(!plan.app_needs_commit);
        plan.mark_app_changed(true);
        plan.mark_app_changed(false);
        assert!(plan.app_needs_commit);
    }

    #[test]
    fn test_stage_order_and_names() {
        assert!(ReleaseStage::Start < ReleaseStage::Done);
        assert!(ReleaseStage::Tagged < ReleaseStage::ReleaseCreated);
        assert_eq!(
            ReleaseStage::AwaitingPushConfirmation.to_string(),
            "awaiting-push-confirmation"
        );
    }
}
