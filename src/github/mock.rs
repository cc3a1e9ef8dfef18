use std::sync::Mutex;

use super::{NewRelease, ReleaseAsset, ReleaseId, ReleasePublisher};
use crate::domain::RepositoryId;
use crate::error::{Result, TaggerError};

/// One recorded call on a [RecordingPublisher].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishCall {
    CreateRelease(NewRelease),
    UploadAsset {
        repository: RepositoryId,
        release_id: ReleaseId,
        file_name: String,
        content_type: String,
        size: usize,
    },
}

/// In-memory publisher for tests
pub struct RecordingPublisher {
    release_id: ReleaseId,
    fail_releases: bool,
    fail_uploads: bool,
    calls: Mutex<Vec<PublishCall>>,
}

impl RecordingPublisher {
    /// Every created release gets `release_id`
    pub fn new(release_id: ReleaseId) -> Self {
        RecordingPublisher {
            release_id,
            fail_releases: false,
            fail_uploads: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_releases(mut self) -> Self {
        self.fail_releases = true;
        self
    }

    pub fn failing_uploads(mut self) -> Self {
        self.fail_uploads = true;
        self
    }

    pub fn calls(&self) -> Vec<PublishCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn releases(&self) -> Vec<NewRelease> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PublishCall::CreateRelease(release) => Some(release),
                PublishCall::UploadAsset { .. } => None,
            })
            .collect()
    }

    fn record(&self, call: PublishCall) {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(call);
    }
}

impl ReleasePublisher for RecordingPublisher {
    fn create_release(&self, release: &NewRelease) -> Result<ReleaseId> {
        self.record(PublishCall::CreateRelease(release.clone()));
        if self.fail_releases {
            return Err(TaggerError::publish("release rejected"));
        }
        Ok(self.release_id)
    }

    fn upload_asset(
        &self,
        repository: &RepositoryId,
        release_id: ReleaseId,
        asset: &ReleaseAsset,
    ) -> Result<()> {
        self.record(PublishCall::UploadAsset {
            repository: repository.clone(),
            release_id,
            file_name: asset.file_name.clone(),
            content_type: asset.content_type.clone(),
            size: asset.bytes.len(),
        });
        if self.fail_uploads {
            return Err(TaggerError::publish("upload rejected"));
        }
        Ok(())
    }
}
