use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for tagger operations
#[derive(Error, Debug)]
pub enum TaggerError {
    #[error("Unable to clone the {repository} repository: {message}")]
    Clone { repository: String, message: String },

    #[error("Branch error: {0}")]
    Branch(String),

    #[error("Branch '{branch}' does not exist on the remote")]
    BranchNotFound { branch: String },

    #[error("Command `{command}` failed with exit code {}: {stderr}", display_exit_code(.exit_code))]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Command `{command}` timed out after {timeout_secs}s")]
    Timeout { command: String, timeout_secs: u64 },

    #[error("Release publishing failed: {0}")]
    Publish(String),

    #[error("Configuration sync failed for {}: {source}", .path.display())]
    ConfigSync {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("Changelog error: {0}")]
    Changelog(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn display_exit_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none (terminated by signal)".to_string(),
    }
}

/// Convenience type alias for Results in tagger
pub type Result<T> = std::result::Result<T, TaggerError>;

impl TaggerError {
    /// Create a branch error with context
    pub fn branch(msg: impl Into<String>) -> Self {
        TaggerError::Branch(msg.into())
    }

    /// Create a publish error with context
    pub fn publish(msg: impl Into<String>) -> Self {
        TaggerError::Publish(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        TaggerError::Config(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        TaggerError::Tag(msg.into())
    }

    /// Create a changelog error with context
    pub fn changelog(msg: impl Into<String>) -> Self {
        TaggerError::Changelog(msg.into())
    }

    /// Create a manifest error with context
    pub fn manifest(msg: impl Into<String>) -> Self {
        TaggerError::Manifest(msg.into())
    }

    /// Create an archive error with context
    pub fn archive(msg: impl Into<String>) -> Self {
        TaggerError::Archive(msg.into())
    }

    /// Wrap an I/O failure on a synchronized configuration path
    pub fn config_sync(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TaggerError::ConfigSync {
            path: path.into(),
            source,
        }
    }

    /// True for the one failure the branch cleanup step expects and swallows.
    pub fn is_branch_not_found(&self) -> bool {
        matches!(self, TaggerError::BranchNotFound { .. })
    }
}

impl From<zip::result::ZipError> for TaggerError {
    fn from(err: zip::result::ZipError) -> Self {
        TaggerError::Archive(err.to_string())
    }
}

impl From<reqwest::Error> for TaggerError {
    fn from(err: reqwest::Error) -> Self {
        TaggerError::Publish(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TaggerError::config("missing token");
        assert_eq!(err.to_string(), "Configuration error: missing token");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TaggerError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_command_failed_reports_command_and_stderr() {
        let err = TaggerError::CommandFailed {
            command: "git push origin release-2.1.0.0".to_string(),
            exit_code: Some(128),
            stderr: "fatal: could not read from remote".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("git push origin release-2.1.0.0"));
        assert!(msg.contains("128"));
        assert!(msg.contains("could not read from remote"));
    }

    #[test]
    fn test_command_failed_without_exit_code() {
        let err = TaggerError::CommandFailed {
            command: "git clone".to_string(),
            exit_code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[test]
    fn test_timeout_display() {
        let err = TaggerError::Timeout {
            command: "composer update".to_string(),
            timeout_secs: 900,
        };
        assert_eq!(
            err.to_string(),
            "Command `composer update` timed out after 900s"
        );
    }

    #[test]
    fn test_is_branch_not_found() {
        let absent = TaggerError::BranchNotFound {
            branch: "prepare-2.1.0.0".to_string(),
        };
        assert!(absent.is_branch_not_found());
        assert!(!TaggerError::branch("checkout failed").is_branch_not_found());
        assert!(!TaggerError::CommandFailed {
            command: "git push".to_string(),
            exit_code: Some(1),
            stderr: "remote ref does not exist".to_string(),
        }
        .is_branch_not_found());
    }

    #[test]
    fn test_config_sync_keeps_path_and_source() {
        let err = TaggerError::config_sync(
            "app/config/config.yml",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("app/config/config.yml"));
        assert!(msg.contains("denied"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (TaggerError::config("x"), "Configuration error"),
            (TaggerError::branch("x"), "Branch error"),
            (TaggerError::tag("x"), "Tag error"),
            (TaggerError::publish("x"), "Release publishing failed"),
            (TaggerError::changelog("x"), "Changelog error"),
            (TaggerError::manifest("x"), "Manifest error"),
            (TaggerError::archive("x"), "Archive error"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }
}
