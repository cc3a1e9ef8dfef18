use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::RepositoryId;
use crate::error::{Result, TaggerError};

/// Environment variables checked, in order, for the GitHub API token.
pub const TOKEN_ENV_VARS: [&str; 2] = ["TAGGER_GITHUB_TOKEN", "GITHUB_TOKEN"];

/// Represents the complete configuration for tagger.
///
/// Holds the GitHub credentials and repositories, where checkouts live, and
/// the product-specific file locations the release workflow edits.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub github: GithubConfig,

    #[serde(default)]
    pub repositories: RepositoriesConfig,

    #[serde(default)]
    pub release: ReleaseConfig,

    #[serde(default)]
    pub version: VersionConfig,

    #[serde(default)]
    pub app: AppConfig,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub timeouts: TimeoutsConfig,
}

/// GitHub credentials and the two repositories a release touches.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GithubConfig {
    #[serde(default)]
    pub token: String,

    #[serde(default)]
    pub source_repo: String,

    #[serde(default)]
    pub app_repo: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_uploads_url")]
    pub uploads_url: String,
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_uploads_url() -> String {
    "https://uploads.github.com".to_string()
}

impl Default for GithubConfig {
    fn default() -> Self {
        GithubConfig {
            token: String::new(),
            source_repo: String::new(),
            app_repo: String::new(),
            api_url: default_api_url(),
            uploads_url: default_uploads_url(),
        }
    }
}

/// Where and how repositories are cloned.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RepositoriesConfig {
    /// Clone URL template; `{owner}` and `{repo}` are substituted.
    #[serde(default = "default_remote_url")]
    pub remote_url: String,

    #[serde(default = "default_branch")]
    pub source_branch: String,

    #[serde(default = "default_branch")]
    pub app_branch: String,

    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
}

fn default_remote_url() -> String {
    "git@github.com:{owner}/{repo}.git".to_string()
}

fn default_branch() -> String {
    "master".to_string()
}

fn default_work_dir() -> PathBuf {
    PathBuf::from("release")
}

impl Default for RepositoriesConfig {
    fn default() -> Self {
        RepositoriesConfig {
            remote_url: default_remote_url(),
            source_branch: default_branch(),
            app_branch: default_branch(),
            work_dir: default_work_dir(),
        }
    }
}

impl RepositoriesConfig {
    pub fn remote_url_for(&self, id: &RepositoryId) -> String {
        self.remote_url
            .replace("{owner}", &id.owner)
            .replace("{repo}", &id.name)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReleaseConfig {
    #[serde(default = "default_product_name")]
    pub product_name: String,
}

fn default_product_name() -> String {
    "eXpansion".to_string()
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        ReleaseConfig {
            product_name: default_product_name(),
        }
    }
}

impl ReleaseConfig {
    /// Human title of the published release, e.g. `eXpansion v2.1.0.0`.
    pub fn release_title(&self, tag: &str) -> String {
        format!("{} v{}", self.product_name, tag)
    }

    /// File name of the packaged archive, e.g. `eXpansion-v2.1.0.0.zip`.
    pub fn archive_name(&self, tag: &str) -> String {
        format!("{}-v{}.zip", self.product_name, tag)
    }
}

/// Location of the embedded version constant in the source repository.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct VersionConfig {
    #[serde(default = "default_version_file")]
    pub file: PathBuf,

    #[serde(default = "default_version_constant")]
    pub constant: String,

    /// Placeholder values a release replaces with the tag.
    #[serde(default = "default_version_placeholders")]
    pub placeholders: Vec<String>,
}

fn default_version_file() -> PathBuf {
    PathBuf::from("src/eXpansion/Framework/Core/Services/Application/AbstractApplication.php")
}

fn default_version_constant() -> String {
    "EXPANSION_VERSION".to_string()
}

fn default_version_placeholders() -> Vec<String> {
    vec!["2.0.0.0".to_string(), "dev".to_string()]
}

impl Default for VersionConfig {
    fn default() -> Self {
        VersionConfig {
            file: default_version_file(),
            constant: default_version_constant(),
            placeholders: default_version_placeholders(),
        }
    }
}

/// Dependency manifest and install step of the app repository.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,

    /// Top-level manifest object holding the dependency.
    #[serde(default = "default_manifest_section")]
    pub section: String,

    #[serde(default = "default_package")]
    pub package: String,

    /// Program followed by its arguments.
    #[serde(default = "default_install_command")]
    pub install_command: Vec<String>,
}

fn default_manifest() -> PathBuf {
    PathBuf::from("composer.json")
}

fn default_manifest_section() -> String {
    "require".to_string()
}

fn default_package() -> String {
    "expansion-mp/expansion".to_string()
}

fn default_install_command() -> Vec<String> {
    [
        "composer",
        "update",
        "--prefer-dist",
        "--no-scripts",
        "--no-suggest",
        "--ignore-platform-reqs",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            manifest: default_manifest(),
            section: default_manifest_section(),
            package: default_package(),
            install_command: default_install_command(),
        }
    }
}

/// Paths copied from the source checkout into the app checkout.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SyncConfig {
    #[serde(default = "default_sync_paths")]
    pub paths: Vec<PathBuf>,
}

fn default_sync_paths() -> Vec<PathBuf> {
    vec![PathBuf::from("app/config"), PathBuf::from("bin/console")]
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            paths: default_sync_paths(),
        }
    }
}

/// Per-call timeouts, in seconds.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TimeoutsConfig {
    #[serde(default = "default_timeout_secs")]
    pub default_secs: u64,

    #[serde(default = "default_clone_secs")]
    pub clone_secs: u64,

    #[serde(default = "default_push_secs")]
    pub push_secs: u64,

    #[serde(default = "default_install_secs")]
    pub install_secs: u64,
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_clone_secs() -> u64 {
    720
}

fn default_push_secs() -> u64 {
    300
}

fn default_install_secs() -> u64 {
    900
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        TimeoutsConfig {
            default_secs: default_timeout_secs(),
            clone_secs: default_clone_secs(),
            push_secs: default_push_secs(),
            install_secs: default_install_secs(),
        }
    }
}

impl TimeoutsConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_secs)
    }

    pub fn clone_timeout(&self) -> Duration {
        Duration::from_secs(self.clone_secs)
    }

    pub fn push_timeout(&self) -> Duration {
        Duration::from_secs(self.push_secs)
    }

    pub fn install_timeout(&self) -> Duration {
        Duration::from_secs(self.install_secs)
    }
}

impl Config {
    pub fn source_repository(&self) -> Result<RepositoryId> {
        self.github.source_repo.parse()
    }

    pub fn app_repository(&self) -> Result<RepositoryId> {
        self.github.app_repo.parse()
    }

    /// Checks everything a release run needs before touching any repository.
    pub fn validate(&self) -> Result<()> {
        if self.github.token.trim().is_empty() {
            return Err(TaggerError::config(format!(
                "No GitHub token configured; set github.token or {}",
                TOKEN_ENV_VARS.join(" / ")
            )));
        }
        self.source_repository()?;
        self.app_repository()?;
        if self.app.install_command.is_empty() {
            return Err(TaggerError::config("app.install_command cannot be empty"));
        }
        if self.version.placeholders.is_empty() {
            return Err(TaggerError::config("version.placeholders cannot be empty"));
        }
        Ok(())
    }

    /// Override the token from the environment when one of [`TOKEN_ENV_VARS`] is set.
    pub fn apply_env_overrides(&mut self) {
        for var in TOKEN_ENV_VARS {
            if let Ok(token) = std::env::var(var) {
                if !token.trim().is_empty() {
                    self.github.token = token;
                    return;
                }
            }
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `tagger.toml` in current directory
/// 3. `.tagger.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// Environment token overrides are applied in every case.
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        Some(read_config_file(Path::new(path))?)
    } else if Path::new("./tagger.toml").exists() {
        Some(read_config_file(Path::new("./tagger.toml"))?)
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(".tagger.toml");
        if config_path.exists() {
            Some(read_config_file(&config_path)?)
        } else {
            None
        }
    } else {
        None
    };

    let mut config = match config_str {
        Some(s) => toml::from_str(&s)
            .map_err(|e| TaggerError::config(format!("Invalid configuration: {}", e)))?,
        None => Config::default(),
    };
    config.apply_env_overrides();
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        TaggerError::config(format!("Cannot read config file {}: {}", path.display(), e))
    })
}
