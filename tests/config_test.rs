// tests/config_test.rs
use std::io::Write;
use std::path::PathBuf;

use serial_test::serial;
use tagger::config::{load_config, Config};
use tempfile::NamedTempFile;

fn clear_token_env() {
    std::env::remove_var("TAGGER_GITHUB_TOKEN");
    std::env::remove_var("GITHUB_TOKEN");
}

fn config_file(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_load_default_config() {
    let config = Config::default();
    assert_eq!(config.repositories.remote_url, "git@github.com:{owner}/{repo}.git");
    assert_eq!(config.repositories.app_branch, "master");
    assert_eq!(config.release.product_name, "eXpansion");
    assert_eq!(
        config.sync.paths,
        vec![PathBuf::from("app/config"), PathBuf::from("bin/console")]
    );
    assert_eq!(config.app.install_command[0], "composer");
    assert!(config
        .app
        .install_command
        .contains(&"--ignore-platform-reqs".to_string()));
}

#[test]
#[serial]
fn test_load_from_file() {
    clear_token_env();
    let temp_file = config_file(
        r#"
[github]
token = "from-file"
source_repo = "eXpansionPluginPack/eXpansion2"
app_repo = "eXpansionPluginPack/eXpansion2-app"

[repositories]
work_dir = "/tmp/tagger-release"

[sync]
paths = ["app/config"]

[timeouts]
install_secs = 1800
"#,
    );

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.github.token, "from-file");
    assert_eq!(
        config.source_repository().unwrap().to_string(),
        "eXpansionPluginPack/eXpansion2"
    );
    assert_eq!(config.app_repository().unwrap().name, "eXpansion2-app");
    assert_eq!(
        config.repositories.work_dir,
        PathBuf::from("/tmp/tagger-release")
    );
    assert_eq!(config.sync.paths, vec![PathBuf::from("app/config")]);
    assert_eq!(config.timeouts.install_secs, 1800);
    assert_eq!(config.timeouts.clone_secs, 720);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_environment_token_wins() {
    clear_token_env();
    let temp_file = config_file(
        r#"
[github]
token = "from-file"
"#,
    );

    std::env::set_var("GITHUB_TOKEN", "from-github-env");
    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.github.token, "from-github-env");

    std::env::set_var("TAGGER_GITHUB_TOKEN", "from-tagger-env");
    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.github.token, "from-tagger-env");

    clear_token_env();
}

#[test]
#[serial]
fn test_missing_explicit_file_is_an_error() {
    clear_token_env();
    let err = load_config(Some("/definitely/not/here/tagger.toml")).unwrap_err();
    assert!(err.to_string().contains("Cannot read config file"));
}

#[test]
#[serial]
fn test_invalid_toml_is_an_error() {
    clear_token_env();
    let temp_file = config_file("[github\ntoken = ");
    let err = load_config(Some(temp_file.path().to_str().unwrap())).unwrap_err();
    assert!(err.to_string().contains("Invalid configuration"));
}

#[test]
#[serial]
fn test_defaults_fail_validation_without_token() {
    clear_token_env();
    let config = Config::default();
    assert!(config.validate().is_err());
}
