use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::domain::RepositoryId;
use crate::error::{Result, TaggerError};
use crate::git::Repository;

/// One recorded call on a [MockRepository].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCall {
    CreateBranch { from: String, new: String },
    DeleteBranch(String),
    Stage(PathBuf),
    Commit(String),
    Push(String),
    TagAndPush { branch: String, tag: String },
}

/// Mock repository for testing without actual git operations
///
/// Files are read and written for real under `working_path`, so the
/// components that edit a checkout can run against it; git verbs are only
/// recorded.
pub struct MockRepository {
    id: RepositoryId,
    path: PathBuf,
    branches: Mutex<HashSet<String>>,
    calls: Mutex<Vec<GitCall>>,
    failing_deletes: HashSet<String>,
}

impl MockRepository {
    /// Create a mock whose checkout lives at `path`, with no branches.
    pub fn new(id: RepositoryId, path: impl Into<PathBuf>) -> Self {
        MockRepository {
            id,
            path: path.into(),
            branches: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
            failing_deletes: HashSet::new(),
        }
    }

    /// Add a branch that exists on the remote
    pub fn with_branch(self, name: impl Into<String>) -> Self {
        lock(&self.branches).insert(name.into());
        self
    }

    /// Make deleting `name` fail with something other than `BranchNotFound`
    pub fn with_failing_delete(mut self, name: impl Into<String>) -> Self {
        self.failing_deletes.insert(name.into());
        self
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<GitCall> {
        lock(&self.calls).clone()
    }

    pub fn has_branch(&self, name: &str) -> bool {
        lock(&self.branches).contains(name)
    }

    fn record(&self, call: GitCall) {
        lock(&self.calls).push(call);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Repository for MockRepository {
    fn identity(&self) -> &RepositoryId {
        &self.id
    }

    fn working_path(&self) -> &Path {
        &self.path
    }

    fn create_branch(&self, from: &str, new: &str) -> Result<()> {
        self.record(GitCall::CreateBranch {
            from: from.to_string(),
            new: new.to_string(),
        });
        let mut branches = lock(&self.branches);
        if !branches.contains(from) {
            return Err(TaggerError::branch(format!(
                "Branch '{}' does not exist in {}",
                from, self.id
            )));
        }
        branches.insert(new.to_string());
        Ok(())
    }

    fn delete_branch(&self, name: &str) -> Result<()> {
        self.record(GitCall::DeleteBranch(name.to_string()));
        if self.failing_deletes.contains(name) {
            return Err(TaggerError::CommandFailed {
                command: format!("git push origin --delete {}", name),
                exit_code: Some(128),
                stderr: "fatal: unable to access remote".to_string(),
            });
        }
        if lock(&self.branches).remove(name) {
            Ok(())
        } else {
            Err(TaggerError::BranchNotFound {
                branch: name.to_string(),
            })
        }
    }

    fn stage_file(&self, path: &Path) -> Result<()> {
        self.record(GitCall::Stage(path.to_path_buf()));
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.record(GitCall::Commit(message.to_string()));
        Ok(())
    }

    fn push(&self, branch: &str) -> Result<()> {
        self.record(GitCall::Push(branch.to_string()));
        Ok(())
    }

    fn tag_and_push(&self, branch: &str, tag: &str) -> Result<()> {
        self.record(GitCall::TagAndPush {
            branch: branch.to_string(),
            tag: tag.to_string(),
        });
        Ok(())
    }
}
