// tests/integration_test.rs
use std::process::Command;

fn tagger() -> Command {
    Command::new(env!("CARGO_BIN_EXE_tagger"))
}

#[test]
fn test_tagger_help() {
    let output = tagger()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("tagger"));
    assert!(stdout.contains("--prerelease"));
    assert!(stdout.contains("<TAG>"));
}

#[test]
fn test_tagger_version() {
    let output = tagger()
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_tag_argument_is_required() {
    let output = tagger().output().expect("Failed to execute command");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_invalid_tag_fails_before_touching_anything() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("tagger.toml");
    std::fs::write(
        &config_path,
        r#"
[github]
token = "secret"
source_repo = "acme/source"
app_repo = "acme/app"
"#,
    )
    .unwrap();

    let output = tagger()
        .args(["--force", "--config"])
        .arg(&config_path)
        .arg("2.1..0")
        .current_dir(dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Invalid tag"), "stderr: {}", stderr);
    assert!(!dir.path().join("release").exists());
}

#[test]
fn test_missing_token_fails_validation() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("tagger.toml");
    std::fs::write(&config_path, "[github]\nsource_repo = \"acme/source\"\n").unwrap();

    let output = tagger()
        .args(["--force", "--config"])
        .arg(&config_path)
        .arg("2.1.0.0")
        .env_remove("TAGGER_GITHUB_TOKEN")
        .env_remove("GITHUB_TOKEN")
        .current_dir(dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("GitHub token"), "stderr: {}", stderr);
}
