use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{NewRelease, ReleaseAsset, ReleaseId, ReleasePublisher};
use crate::config::GithubConfig;
use crate::domain::RepositoryId;
use crate::error::{Result, TaggerError};

const ACCEPT: &str = "application/vnd.github+json";
const USER_AGENT: &str = concat!("tagger/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
struct CreateReleaseRequest<'a> {
    tag_name: &'a str,
    name: &'a str,
    body: &'a str,
    prerelease: bool,
}

#[derive(Debug, Deserialize)]
struct ReleaseResponse {
    id: ReleaseId,
    #[serde(default)]
    html_url: Option<String>,
}

/// Blocking GitHub REST client authenticated with a token.
pub struct GithubClient {
    client: Client,
    token: String,
    api_url: String,
    uploads_url: String,
}

impl GithubClient {
    pub fn new(config: &GithubConfig, timeout: Duration) -> Result<Self> {
        if config.token.trim().is_empty() {
            return Err(TaggerError::config("GitHub token is empty"));
        }
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(GithubClient {
            client,
            token: config.token.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            uploads_url: config.uploads_url.trim_end_matches('/').to_string(),
        })
    }

    fn releases_url(&self, repository: &RepositoryId) -> String {
        format!(
            "{}/repos/{}/{}/releases",
            self.api_url, repository.owner, repository.name
        )
    }

    fn assets_url(&self, repository: &RepositoryId, release_id: ReleaseId) -> String {
        format!(
            "{}/repos/{}/{}/releases/{}/assets",
            self.uploads_url, repository.owner, repository.name, release_id
        )
    }

    fn send(&self, request: RequestBuilder, action: &str) -> Result<Response> {
        let response = request
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().unwrap_or_default();
            return Err(TaggerError::publish(format!(
                "{} failed with HTTP {}: {}",
                action,
                status.as_u16(),
                error_text
            )));
        }
        Ok(response)
    }
}

impl ReleasePublisher for GithubClient {
    fn create_release(&self, release: &NewRelease) -> Result<ReleaseId> {
        let url = self.releases_url(&release.repository);
        debug!(url = %url, tag = %release.tag_name, "creating release");

        let payload = CreateReleaseRequest {
            tag_name: &release.tag_name,
            name: &release.title,
            body: &release.body,
            prerelease: release.prerelease,
        };
        let response = self.send(self.client.post(&url).json(&payload), "Creating release")?;
        let created: ReleaseResponse = response.json()?;

        info!(
            id = created.id,
            url = created.html_url.as_deref().unwrap_or(""),
            "release created"
        );
        Ok(created.id)
    }

    fn upload_asset(
        &self,
        repository: &RepositoryId,
        release_id: ReleaseId,
        asset: &ReleaseAsset,
    ) -> Result<()> {
        let url = self.assets_url(repository, release_id);
        debug!(url = %url, name = %asset.file_name, bytes = asset.bytes.len(), "uploading asset");

        let request = self
            .client
            .post(&url)
            .query(&[("name", asset.file_name.as_str())])
            .header(reqwest::header::CONTENT_TYPE, asset.content_type.as_str())
            .body(asset.bytes.clone());
        self.send(request, "Uploading asset")?;

        info!(release_id, name = %asset.file_name, "asset uploaded");
        Ok(())
    }
}
