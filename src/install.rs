use std::path::Path;
use std::time::Duration;

use tracing::info;

use crate::error::{Result, TaggerError};
use crate::process;

/// Resolves and installs the app checkout's dependencies.
pub trait PackageInstaller: Send + Sync {
    fn install(&self, app_root: &Path) -> Result<()>;
}

/// Runs a configured command (e.g. `composer update ...`) in the app checkout.
#[derive(Debug, Clone)]
pub struct ShellInstaller {
    command: Vec<String>,
    timeout: Duration,
}

impl ShellInstaller {
    pub fn new(command: Vec<String>, timeout: Duration) -> Result<Self> {
        if command.is_empty() {
            return Err(TaggerError::config("install command cannot be empty"));
        }
        Ok(ShellInstaller { command, timeout })
    }
}

impl PackageInstaller for ShellInstaller {
    fn install(&self, app_root: &Path) -> Result<()> {
        let (program, args) = match self.command.split_first() {
            Some(parts) => parts,
            None => return Err(TaggerError::config("install command cannot be empty")),
        };
        let mut cmd = process::command_in(program, app_root);
        cmd.args(args);

        info!(
            command = %process::describe(&cmd),
            timeout_secs = self.timeout.as_secs(),
            "installing dependencies"
        );
        process::run_checked(cmd, self.timeout)?;
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[test]
    fn test_runs_in_app_root() {
        let dir = tempfile::tempdir().unwrap();
        let installer =
            ShellInstaller::new(sh("touch installed"), Duration::from_secs(10)).unwrap();

        installer.install(dir.path()).unwrap();

        assert!(dir.path().join("installed").exists());
    }

    #[test]
    fn test_failure_is_command_failed() {
        let dir = tempfile::tempdir().unwrap();
        let installer = ShellInstaller::new(sh("exit 2"), Duration::from_secs(10)).unwrap();
        assert!(matches!(
            installer.install(dir.path()),
            Err(TaggerError::CommandFailed { exit_code: Some(2), .. })
        ));
    }

    #[test]
    fn test_empty_command_is_rejected() {
        assert!(ShellInstaller::new(Vec::new(), Duration::from_secs(1)).is_err());
    }
}
