//! Release publishing on the hosting service.
//!
//! The orchestrator talks to a [ReleasePublisher]; [client::GithubClient]
//! implements it against the GitHub REST API and [mock::RecordingPublisher]
//! records calls for tests.

pub mod client;
pub mod mock;

pub use client::GithubClient;
pub use mock::{PublishCall, RecordingPublisher};

use crate::domain::RepositoryId;
use crate::error::Result;

/// Content type of the packaged release archive.
pub const ZIP_CONTENT_TYPE: &str = "application/zip";

/// Identifier of a created release, needed to attach assets to it.
pub type ReleaseId = u64;

/// A release record to create for an already pushed tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRelease {
    pub repository: RepositoryId,
    pub tag_name: String,
    pub title: String,
    pub body: String,
    pub prerelease: bool,
}

/// A file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAsset {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Creates releases and uploads their assets.
///
/// Both calls are single attempts; any failure is a
/// [Publish](crate::error::TaggerError::Publish) error.
pub trait ReleasePublisher: Send + Sync {
    fn create_release(&self, release: &NewRelease) -> Result<ReleaseId>;

    fn upload_asset(
        &self,
        repository: &RepositoryId,
        release_id: ReleaseId,
        asset: &ReleaseAsset,
    ) -> Result<()>;
}
