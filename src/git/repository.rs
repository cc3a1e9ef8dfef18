use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::{RepositoriesConfig, TimeoutsConfig};
use crate::domain::RepositoryId;
use crate::error::{Result, TaggerError};
use crate::process::{self, CommandOutput};

const REMOTE: &str = "origin";

/// A `git` invocation with messages pinned to the C locale.
///
/// Missing-branch detection reads git's stderr, which is only stable untranslated.
fn git() -> Command {
    let mut cmd = Command::new("git");
    cmd.env("LC_ALL", "C").env_remove("LANGUAGE");
    cmd
}

/// Local clone of one remote, driven through the system `git` binary.
pub struct GitCliRepository {
    id: RepositoryId,
    path: PathBuf,
    timeouts: TimeoutsConfig,
}

impl GitCliRepository {
    /// Clone `branch` of `id` into `<work_dir>/<owner>--<name>--<branch>`.
    pub fn clone_from_remote(
        id: &RepositoryId,
        branch: &str,
        repositories: &RepositoriesConfig,
        timeouts: &TimeoutsConfig,
    ) -> Result<Self> {
        let url = repositories.remote_url_for(id);
        Self::clone_from_url(id, &url, branch, &repositories.work_dir, timeouts)
    }

    /// Clone a single branch from an explicit URL or local path.
    ///
    /// A checkout left over from an earlier run is removed first, so every run
    /// starts from the remote's current state.
    pub fn clone_from_url(
        id: &RepositoryId,
        url: &str,
        branch: &str,
        work_dir: &Path,
        timeouts: &TimeoutsConfig,
    ) -> Result<Self> {
        let path = work_dir.join(id.checkout_dir_name(branch));
        let clone_error = |message: String| TaggerError::Clone {
            repository: id.to_string(),
            message,
        };

        if path.exists() {
            debug!(path = %path.display(), "removing previous checkout");
            fs::remove_dir_all(&path).map_err(|e| {
                clone_error(format!("cannot remove {}: {}", path.display(), e))
            })?;
        }
        fs::create_dir_all(work_dir).map_err(|e| {
            clone_error(format!("cannot create {}: {}", work_dir.display(), e))
        })?;

        let mut cmd = git();
        cmd.args(["clone", "-b", branch, "--single-branch", url])
            .arg(&path);
        info!(repository = %id, branch, path = %path.display(), "cloning");
        match process::run_checked(cmd, timeouts.clone_timeout()) {
            Ok(_) => {}
            Err(TaggerError::CommandFailed { stderr, .. }) => return Err(clone_error(stderr)),
            Err(e) => return Err(e),
        }

        Ok(GitCliRepository {
            id: id.clone(),
            path,
            timeouts: timeouts.clone(),
        })
    }

    fn git_command(&self, args: &[&str]) -> Command {
        let mut cmd = git();
        cmd.current_dir(&self.path).args(args);
        cmd
    }

    fn run(&self, args: &[&str], timeout: Duration) -> Result<CommandOutput> {
        process::run_command(self.git_command(args), timeout)
    }

    fn run_checked(&self, args: &[&str], timeout: Duration) -> Result<CommandOutput> {
        process::run_checked(self.git_command(args), timeout)
    }

    fn local_branch_exists(&self, branch: &str) -> Result<bool> {
        let reference = format!("refs/heads/{}", branch);
        let output = self.run(
            &["rev-parse", "--verify", "--quiet", &reference],
            self.timeouts.default_timeout(),
        )?;
        Ok(output.success())
    }
}

impl super::Repository for GitCliRepository {
    fn identity(&self) -> &RepositoryId {
        &self.id
    }

    fn working_path(&self) -> &Path {
        &self.path
    }

    fn create_branch(&self, from: &str, new: &str) -> Result<()> {
        let timeout = self.timeouts.default_timeout();
        let remote_ref = format!("refs/remotes/{}/{}", REMOTE, from);
        let refspec = format!("+refs/heads/{}:{}", from, remote_ref);

        // Single-branch clones only track their default branch, so `from` is fetched by name.
        let fetch = self.run(&["fetch", REMOTE, &refspec], timeout)?;
        if fetch.success() {
            self.run_checked(&["checkout", "-B", from, &remote_ref], timeout)?;
        } else if fetch.stderr_str().contains("couldn't find remote ref") {
            if !self.local_branch_exists(from)? {
                return Err(TaggerError::branch(format!(
                    "Branch '{}' does not exist in {}",
                    from, self.id
                )));
            }
            debug!(repository = %self.id, branch = from, "branch is local only");
            self.run_checked(&["checkout", from], timeout)?;
        } else {
            fetch.into_checked()?;
        }

        self.run_checked(&["checkout", "-b", new], timeout)?;
        info!(repository = %self.id, from, new, "created branch");
        Ok(())
    }

    fn delete_branch(&self, name: &str) -> Result<()> {
        let output = self.run(
            &["push", REMOTE, "--delete", name],
            self.timeouts.push_timeout(),
        )?;
        if output.success() {
            info!(repository = %self.id, branch = name, "deleted remote branch");
            return Ok(());
        }
        if output.stderr_str().contains("remote ref does not exist") {
            return Err(TaggerError::BranchNotFound {
                branch: name.to_string(),
            });
        }
        output.into_checked().map(|_| ())
    }

    fn stage_file(&self, path: &Path) -> Result<()> {
        let path = path.to_string_lossy();
        self.run_checked(&["add", "--", &path], self.timeouts.default_timeout())?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.run_checked(&["commit", "-m", message], self.timeouts.default_timeout())?;
        Ok(())
    }

    fn push(&self, branch: &str) -> Result<()> {
        self.run_checked(&["push", "-u", REMOTE, branch], self.timeouts.push_timeout())?;
        info!(repository = %self.id, branch, "pushed");
        Ok(())
    }

    fn tag_and_push(&self, branch: &str, tag: &str) -> Result<()> {
        let timeout = self.timeouts.default_timeout();
        self.run_checked(&["checkout", branch], timeout)?;
        self.run_checked(&["pull", "--ff-only", REMOTE, branch], self.timeouts.push_timeout())?;
        self.run_checked(&["tag", "-a", tag, "-m", tag], timeout)?;

        let tag_ref = format!("refs/tags/{}", tag);
        self.run_checked(&["push", REMOTE, &tag_ref], self.timeouts.push_timeout())?;
        info!(repository = %self.id, branch, tag, "tagged and pushed");
        Ok(())
    }
}
