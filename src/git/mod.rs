//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the handful of git
//! verbs the release workflow needs, allowing both a real checkout driven by
//! the system `git` binary and a mock implementation for testing.
//!
//! # Overview
//!
//! The primary abstraction is the [Repository] trait. The concrete
//! implementations are:
//!
//! - [repository::GitCliRepository]: a clone on local disk, driven by `git`
//! - [mock::MockRepository]: an in-memory recorder for testing
//!
//! # Usage
//!
//! The orchestrator only depends on the [Repository] trait, so its sequencing
//! can be exercised headlessly.
//!
//! ```rust
//! # use tagger::git::Repository;
//! # fn example(repo: &dyn Repository) -> tagger::error::Result<()> {
//! repo.create_branch("2.1.0.x", "prepare-2.1.0.0")?;
//! repo.commit("Prepare 2.1.0.0")?;
//! repo.push("prepare-2.1.0.0")?;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::{GitCall, MockRepository};
pub use repository::GitCliRepository;

use std::path::Path;

use crate::domain::RepositoryId;
use crate::error::Result;

/// Branch lifecycle primitives on one local checkout of a remote.
///
/// ## Thread Safety
///
/// All implementors must be `Send + Sync`.
///
/// ## Error Handling
///
/// A non-zero git exit is reported as
/// [CommandFailed](crate::error::TaggerError::CommandFailed) carrying the
/// command line and its stderr; a call exceeding its timeout is reported as
/// [Timeout](crate::error::TaggerError::Timeout). Nothing is retried.
pub trait Repository: Send + Sync {
    /// `owner/name` of the remote this checkout was cloned from.
    fn identity(&self) -> &RepositoryId;

    /// Local filesystem root of the checkout.
    fn working_path(&self) -> &Path;

    /// Check out `from`, bring it up to date, then create and check out `new`.
    ///
    /// # Returns
    /// * `Ok(())` - `new` is checked out at the tip of `from`
    /// * `Err(Branch)` - If `from` exists neither on the remote nor locally
    fn create_branch(&self, from: &str, new: &str) -> Result<()>;

    /// Delete `name` on the remote.
    ///
    /// # Returns
    /// * `Ok(())` - The remote branch was removed
    /// * `Err(BranchNotFound)` - If the remote has no such branch; callers
    ///   cleaning up before a run treat this as expected
    /// * `Err` - Any other failure
    fn delete_branch(&self, name: &str) -> Result<()>;

    /// Stage one path, relative to [Repository::working_path].
    fn stage_file(&self, path: &Path) -> Result<()>;

    /// Commit whatever is staged.
    fn commit(&self, message: &str) -> Result<()>;

    /// Push `branch` to the remote, setting upstream tracking.
    fn push(&self, branch: &str) -> Result<()>;

    /// Check out `branch`, pull it, create an annotated `tag` at its tip and push the tag.
    fn tag_and_push(&self, branch: &str, tag: &str) -> Result<()>;
}
