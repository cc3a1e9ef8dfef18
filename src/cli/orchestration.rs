//! Release workflow orchestration
//!
//! [ReleaseOrchestrator] sequences one release across the source and app
//! repositories. It only sees traits (repositories, publisher, installer,
//! confirmation), so the whole sequence runs headlessly in tests.
//! [run_release_workflow] wires up the real implementations.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{info, warn};

use crate::archive;
use crate::boundary::BoundaryWarning;
use crate::changelog;
use crate::config::Config;
use crate::domain::{ReleasePlan, ReleaseStage, ReleaseTag};
use crate::error::Result;
use crate::git::{GitCliRepository, Repository};
use crate::github::{
    GithubClient, NewRelease, ReleaseAsset, ReleaseId, ReleasePublisher, ZIP_CONTENT_TYPE,
};
use crate::install::{PackageInstaller, ShellInstaller};
use crate::manifest::DependencyManifest;
use crate::sync::ConfigSynchronizer;
use crate::ui::{self, AutoConfirm, Confirm, TerminalConfirm};
use crate::version::VersionBumper;

/// Arguments for the release workflow
///
/// Mirrors the CLI Args but in a format suitable for orchestration logic.
/// This decoupling allows the workflow to be called programmatically
/// without depending on clap.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseWorkflowArgs {
    /// Tag to release, e.g. `2.1.0.0`
    pub tag: String,

    /// Mark the created release as a prerelease
    pub prerelease: bool,

    /// Answer every confirmation with yes
    pub force: bool,
}

/// What a finished release produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseSummary {
    pub tag: String,
    pub release_id: ReleaseId,
    pub archive: PathBuf,
    /// Whether the app release branch got a commit and was pushed
    pub app_pushed: bool,
    pub warnings: Vec<BoundaryWarning>,
}

/// How a run ended, short of an error.
#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseOutcome {
    Completed(ReleaseSummary),
    /// The operator declined a confirmation at `stage`; nothing was tagged or published.
    Aborted { stage: ReleaseStage },
}

/// Runs one release against two checkouts.
pub struct ReleaseOrchestrator<'a> {
    config: &'a Config,
    source: &'a dyn Repository,
    app: &'a dyn Repository,
    publisher: &'a dyn ReleasePublisher,
    installer: &'a dyn PackageInstaller,
    confirm: &'a dyn Confirm,
    today: String,
    warnings: Vec<BoundaryWarning>,
}

impl<'a> ReleaseOrchestrator<'a> {
    /// `today` is the date written into the changelog heading, `YYYY-MM-DD`.
    pub fn new(
        config: &'a Config,
        source: &'a dyn Repository,
        app: &'a dyn Repository,
        publisher: &'a dyn ReleasePublisher,
        installer: &'a dyn PackageInstaller,
        confirm: &'a dyn Confirm,
        today: impl Into<String>,
    ) -> Self {
        ReleaseOrchestrator {
            config,
            source,
            app,
            publisher,
            installer,
            confirm,
            today: today.into(),
            warnings: Vec::new(),
        }
    }

    /// Run every stage in order.
    ///
    /// Any error halts the run where it happened. Nothing already pushed,
    /// tagged or published is rolled back; rerunning starts by deleting the
    /// stale branches.
    pub fn run(&mut self, plan: &mut ReleasePlan) -> Result<ReleaseOutcome> {
        if !self.confirm_non_stable(plan)? {
            return Ok(ReleaseOutcome::Aborted {
                stage: plan.stage(),
            });
        }

        self.clean_branches(plan)?;
        self.update_changelog(plan)?;
        self.bump_version(plan)?;

        plan.advance(ReleaseStage::AwaitingPushConfirmation);
        let prompt = format!("Branch {} was pushed, is all ok?", plan.branches.release);
        if !self.confirm.confirm(&prompt)? {
            ui::display_status("Release aborted; no tag or release was created");
            return Ok(ReleaseOutcome::Aborted {
                stage: plan.stage(),
            });
        }

        let release_id = self.tag_and_publish(plan)?;
        self.prepare_app(plan)?;
        let app_pushed = self.sync_and_push_app(plan)?;
        let archive = self.package_and_upload(plan, release_id)?;

        plan.advance(ReleaseStage::Done);
        Ok(ReleaseOutcome::Completed(ReleaseSummary {
            tag: plan.tag.to_string(),
            release_id,
            archive,
            app_pushed,
            warnings: std::mem::take(&mut self.warnings),
        }))
    }

    fn warn(&mut self, warning: BoundaryWarning) {
        warn!(%warning, "release warning");
        ui::display_boundary_warning(&warning);
        self.warnings.push(warning);
    }

    fn confirm_non_stable(&mut self, plan: &ReleasePlan) -> Result<bool> {
        if plan.is_stable() {
            return Ok(true);
        }
        self.warn(BoundaryWarning::NonStableTag {
            tag: plan.tag.to_string(),
        });
        self.confirm.confirm(&format!(
            "Tag {} is not a stable release, continue anyway?",
            plan.tag
        ))
    }

    fn clean_branches(&mut self, plan: &mut ReleasePlan) -> Result<()> {
        ui::display_section("Deleting release branches");
        let repositories = [self.source, self.app];
        for repo in repositories {
            for branch in plan.branches.created() {
                match repo.delete_branch(branch) {
                    Ok(()) => {
                        ui::display_success(&format!("Deleted {} in {}", branch, repo.identity()))
                    }
                    Err(e) if e.is_branch_not_found() => {
                        ui::display_note(&format!(
                            "Branch {} didn't exist in {}",
                            branch,
                            repo.identity()
                        ));
                        self.warnings.push(BoundaryWarning::BranchAbsent {
                            repository: repo.identity().to_string(),
                            branch: branch.to_string(),
                        });
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        plan.advance(ReleaseStage::BranchesCleaned);
        Ok(())
    }

    fn update_changelog(&mut self, plan: &mut ReleasePlan) -> Result<()> {
        ui::display_section("Updating changelog");
        let branches = plan.branches.clone();
        self.source.create_branch(&branches.origin, &branches.prepare)?;

        let file = plan.tag.changelog_file();
        let path = self.source.working_path().join(&file);
        let section = changelog::update_changelog_file(
            &path,
            &branches.origin,
            plan.tag.as_str(),
            &self.today,
        )?;
        plan.changelog = section.body.clone();

        if !section.changed || section.is_empty() {
            self.warn(BoundaryWarning::EmptyChangelog {
                file: file.clone(),
                heading: changelog::open_heading(&branches.origin),
            });
        }
        if section.changed {
            self.source.stage_file(Path::new(&file))?;
            self.source
                .commit(&format!("Update changelog for {}", plan.tag))?;
        }
        self.source.push(&branches.prepare)?;
        ui::display_success(&format!("Pushed {}", branches.prepare));
        plan.advance(ReleaseStage::ChangelogUpdated);
        Ok(())
    }

    fn bump_version(&mut self, plan: &mut ReleasePlan) -> Result<()> {
        ui::display_section("Updating version in source codes");
        let branches = plan.branches.clone();
        self.source.create_branch(&branches.prepare, &branches.release)?;

        let bumper = VersionBumper::new(&self.config.version)?;
        if bumper.bump(self.source.working_path(), plan.tag.as_str())? {
            self.source.stage_file(bumper.file())?;
            self.source.commit(&format!("Bump version {}", plan.tag))?;
        } else {
            self.warn(BoundaryWarning::VersionPlaceholderMissing {
                file: bumper.file().to_path_buf(),
                constant: bumper.constant().to_string(),
            });
        }
        self.source.push(&branches.release)?;
        ui::display_success(&format!("Pushed {}", branches.release));
        plan.advance(ReleaseStage::VersionBumped);
        Ok(())
    }

    fn tag_and_publish(&mut self, plan: &mut ReleasePlan) -> Result<ReleaseId> {
        ui::display_section("Tagging release");
        self.source
            .tag_and_push(&plan.branches.release, plan.tag.as_str())?;
        ui::display_success(&format!("Tagged {}", plan.tag));
        plan.advance(ReleaseStage::Tagged);

        let release = NewRelease {
            repository: self.source.identity().clone(),
            tag_name: plan.tag.to_string(),
            title: self.config.release.release_title(plan.tag.as_str()),
            body: plan.changelog.trim().to_string(),
            prerelease: plan.prerelease,
        };
        let release_id = self.publisher.create_release(&release)?;
        ui::display_success(&format!("Created release {}", release.title));
        plan.advance(ReleaseStage::ReleaseCreated);
        Ok(release_id)
    }

    fn prepare_app(&mut self, plan: &mut ReleasePlan) -> Result<()> {
        ui::display_section("Install latest tag");
        let app_config = &self.config.app;
        self.app.create_branch(
            &self.config.repositories.app_branch,
            &plan.branches.release,
        )?;

        let mut manifest = DependencyManifest::load(self.app.working_path(), app_config)?;
        manifest.set_constraint(plan.tag.as_str())?;
        manifest.save()?;
        plan.advance(ReleaseStage::AppDependencyPinned);

        self.installer.install(self.app.working_path())?;
        ui::display_success("Dependencies installed");
        plan.advance(ReleaseStage::AppInstalled);

        if plan.is_stable() {
            manifest.set_constraint(&plan.generic_tag())?;
            manifest.save()?;
        } else {
            ui::display_note(&format!("Keeping {} pinned to {}", app_config.package, plan.tag));
        }
        plan.advance(ReleaseStage::AppDependencyFloated);

        if manifest.is_modified() {
            self.app.stage_file(&app_config.manifest)?;
        }
        plan.mark_app_changed(manifest.is_modified());
        Ok(())
    }

    fn sync_and_push_app(&mut self, plan: &mut ReleasePlan) -> Result<bool> {
        ui::display_section("Synchronizing configuration");
        let report = ConfigSynchronizer::new(&self.config.sync.paths)
            .sync(self.source.working_path(), self.app.working_path())?;
        for path in &report.missing {
            self.warn(BoundaryWarning::SyncPathMissing { path: path.clone() });
        }
        for path in &report.copied {
            self.app.stage_file(path)?;
            ui::display_status(&format!("Updated {}", path.display()));
        }
        plan.mark_app_changed(report.changed());
        plan.advance(ReleaseStage::ConfigSynced);

        let pushed = if plan.app_needs_commit {
            self.app.commit(&format!("Release {}", plan.tag))?;
            self.app.push(&plan.branches.release)?;
            ui::display_success(&format!(
                "Pushed {} in {}",
                plan.branches.release,
                self.app.identity()
            ));
            true
        } else {
            ui::display_note("App repository unchanged, nothing to push");
            false
        };
        plan.advance(ReleaseStage::AppPushedIfChanged);
        Ok(pushed)
    }

    fn package_and_upload(
        &mut self,
        plan: &mut ReleasePlan,
        release_id: ReleaseId,
    ) -> Result<PathBuf> {
        ui::display_section("Create release zip");
        let file_name = self.config.release.archive_name(plan.tag.as_str());
        let archive = archive::create_archive(
            self.app.working_path(),
            &self.config.repositories.work_dir,
            &file_name,
        )?;
        ui::display_success(&format!(
            "Wrote {} ({} files)",
            archive.path.display(),
            archive.entries
        ));
        plan.advance(ReleaseStage::ArtifactPackaged);

        ui::display_section("Uploading release zip to github");
        let asset = ReleaseAsset {
            file_name: archive.file_name.clone(),
            content_type: ZIP_CONTENT_TYPE.to_string(),
            bytes: archive.read_bytes()?,
        };
        self.publisher
            .upload_asset(self.source.identity(), release_id, &asset)?;
        ui::display_success(&format!("Uploaded {}", asset.file_name));
        plan.advance(ReleaseStage::ArtifactUploaded);
        Ok(archive.path)
    }
}

/// Main release workflow
///
/// 1. Parse the tag and validate configuration
/// 2. Ask whether the operator is ready
/// 3. Clone both repositories into fresh checkouts
/// 4. Run the [ReleaseOrchestrator] with the GitHub client and shell installer
pub fn run_release_workflow(
    args: ReleaseWorkflowArgs,
    config: Config,
) -> anyhow::Result<ReleaseOutcome> {
    let tag = ReleaseTag::parse(&args.tag)?;
    config.validate()?;
    let source_id = config.source_repository()?;
    let app_id = config.app_repository()?;

    let confirm: Box<dyn Confirm> = if args.force {
        Box::new(AutoConfirm)
    } else {
        Box::new(TerminalConfirm)
    };
    if !confirm.confirm(&format!("Releasing {} from {}. Are you ready?", tag, source_id))? {
        return Ok(ReleaseOutcome::Aborted {
            stage: ReleaseStage::Start,
        });
    }

    ui::display_section("Cloning repositories");
    let repositories = &config.repositories;
    let source = GitCliRepository::clone_from_remote(
        &source_id,
        &repositories.source_branch,
        repositories,
        &config.timeouts,
    )
    .with_context(|| format!("Cloning {}", source_id))?;
    let app = GitCliRepository::clone_from_remote(
        &app_id,
        &repositories.app_branch,
        repositories,
        &config.timeouts,
    )
    .with_context(|| format!("Cloning {}", app_id))?;
    ui::display_success("Repositories cloned");

    let publisher = GithubClient::new(&config.github, config.timeouts.push_timeout())?;
    let installer = ShellInstaller::new(
        config.app.install_command.clone(),
        config.timeouts.install_timeout(),
    )?;
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();

    let mut plan = ReleasePlan::new(tag, args.prerelease);
    info!(
        tag = %plan.tag,
        stable = plan.is_stable(),
        prerelease = plan.prerelease,
        "starting release"
    );
    let mut orchestrator = ReleaseOrchestrator::new(
        &config,
        &source,
        &app,
        &publisher,
        &installer,
        confirm.as_ref(),
        today,
    );
    Ok(orchestrator.run(&mut plan)?)
}
