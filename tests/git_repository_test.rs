// Exercises GitCliRepository against bare fixture remotes built with git2.
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use git2::{ObjectType, Repository as Git2Repo, RepositoryInitOptions, Signature};
use serial_test::serial;
use tagger::config::TimeoutsConfig;
use tagger::domain::RepositoryId;
use tagger::error::TaggerError;
use tagger::git::{GitCliRepository, Repository};
use tempfile::TempDir;

fn git_available() -> bool {
    Command::new("git").arg("--version").output().is_ok()
}

/// Bare remote with `master` and `2.1.0.x`, each holding a changelog.
fn bare_remote(dir: &Path) -> PathBuf {
    let path = dir.join("remote.git");
    let mut opts = RepositoryInitOptions::new();
    opts.bare(true).initial_head("master");
    let repo = Git2Repo::init_opts(&path, &opts).unwrap();
    let sig = Signature::now("Fixture", "fixture@example.com").unwrap();

    let blob = repo
        .blob(b"# 2.1.0.x\n- Added chat commands\n")
        .unwrap();
    let mut builder = repo.treebuilder(None).unwrap();
    builder
        .insert("CHANGELOG-2.1.0.md", blob, 0o100644)
        .unwrap();
    let tree = repo.find_tree(builder.write().unwrap()).unwrap();

    let oid = repo
        .commit(Some("refs/heads/master"), &sig, &sig, "Initial commit", &tree, &[])
        .unwrap();
    let commit = repo.find_commit(oid).unwrap();
    repo.branch("2.1.0.x", &commit, false).unwrap();
    path
}

fn clone(dir: &TempDir, remote: &Path, branch: &str) -> tagger::Result<GitCliRepository> {
    GitCliRepository::clone_from_url(
        &RepositoryId::new("acme", "source"),
        remote.to_str().unwrap(),
        branch,
        &dir.path().join("release"),
        &TimeoutsConfig::default(),
    )
}

fn set_identity(repo: &GitCliRepository) {
    let git = Git2Repo::open(repo.working_path()).unwrap();
    let mut config = git.config().unwrap();
    config.set_str("user.name", "Release Bot").unwrap();
    config.set_str("user.email", "release@example.com").unwrap();
}

fn remote_has(remote: &Path, reference: &str) -> bool {
    Git2Repo::open_bare(remote)
        .unwrap()
        .find_reference(reference)
        .is_ok()
}

#[test]
fn test_clone_lands_in_deterministic_path() {
    if !git_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let remote = bare_remote(dir.path());

    let repo = clone(&dir, &remote, "master").unwrap();
    assert_eq!(
        repo.working_path(),
        dir.path().join("release/acme--source--master")
    );
    assert!(repo.working_path().join("CHANGELOG-2.1.0.md").exists());

    fs::write(repo.working_path().join("leftover.txt"), "stale").unwrap();
    let again = clone(&dir, &remote, "master").unwrap();
    assert_eq!(again.working_path(), repo.working_path());
    assert!(!again.working_path().join("leftover.txt").exists());
}

#[test]
fn test_clone_of_missing_branch_is_clone_error() {
    if !git_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let remote = bare_remote(dir.path());

    let err = clone(&dir, &remote, "does-not-exist").err().unwrap();
    assert!(matches!(err, TaggerError::Clone { .. }), "{}", err);
}

#[test]
fn test_branch_commit_and_push() {
    if !git_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let remote = bare_remote(dir.path());
    let repo = clone(&dir, &remote, "master").unwrap();
    set_identity(&repo);

    repo.create_branch("2.1.0.x", "prepare-2.1.0.0").unwrap();
    fs::write(
        repo.working_path().join("CHANGELOG-2.1.0.md"),
        "# 2.1.0.0 (2024-05-01)\n- Added chat commands\n",
    )
    .unwrap();
    repo.stage_file(Path::new("CHANGELOG-2.1.0.md")).unwrap();
    repo.commit("Update changelog for 2.1.0.0").unwrap();
    repo.push("prepare-2.1.0.0").unwrap();

    assert!(remote_has(&remote, "refs/heads/prepare-2.1.0.0"));
}

#[test]
fn test_create_branch_from_default_branch() {
    if !git_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let remote = bare_remote(dir.path());
    let repo = clone(&dir, &remote, "master").unwrap();

    repo.create_branch("master", "release-2.1.0.0").unwrap();

    let head = Git2Repo::open(repo.working_path()).unwrap();
    assert_eq!(
        head.head().unwrap().shorthand(),
        Some("release-2.1.0.0")
    );
}

#[test]
fn test_create_branch_from_missing_origin() {
    if !git_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let remote = bare_remote(dir.path());
    let repo = clone(&dir, &remote, "master").unwrap();

    let err = repo.create_branch("9.9.9.x", "prepare-9.9.9.0").unwrap_err();
    assert!(matches!(err, TaggerError::Branch(_)), "{}", err);
}

#[test]
fn test_delete_branch_distinguishes_absence() {
    if !git_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let remote = bare_remote(dir.path());
    let repo = clone(&dir, &remote, "master").unwrap();

    let err = repo.delete_branch("prepare-2.1.0.0").unwrap_err();
    assert!(err.is_branch_not_found(), "{}", err);

    repo.create_branch("2.1.0.x", "prepare-2.1.0.0").unwrap();
    repo.push("prepare-2.1.0.0").unwrap();
    assert!(remote_has(&remote, "refs/heads/prepare-2.1.0.0"));

    repo.delete_branch("prepare-2.1.0.0").unwrap();
    assert!(!remote_has(&remote, "refs/heads/prepare-2.1.0.0"));
}

#[test]
fn test_tag_and_push_creates_annotated_tag() {
    if !git_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let remote = bare_remote(dir.path());
    let repo = clone(&dir, &remote, "master").unwrap();
    set_identity(&repo);

    repo.create_branch("2.1.0.x", "release-2.1.0.0").unwrap();
    repo.push("release-2.1.0.0").unwrap();
    repo.tag_and_push("release-2.1.0.0", "2.1.0.0").unwrap();

    let bare = Git2Repo::open_bare(&remote).unwrap();
    let tag_ref = bare.find_reference("refs/tags/2.1.0.0").unwrap();
    let object = bare.find_object(tag_ref.target().unwrap(), None).unwrap();
    assert_eq!(object.kind(), Some(ObjectType::Tag));
}

/// Sets a translated message locale for the duration of a test.
struct GermanMessages {
    language: Option<String>,
    lang: Option<String>,
}

impl GermanMessages {
    fn enable() -> Self {
        let guard = GermanMessages {
            language: std::env::var("LANGUAGE").ok(),
            lang: std::env::var("LANG").ok(),
        };
        std::env::set_var("LANGUAGE", "de");
        std::env::set_var("LANG", "C.UTF-8");
        guard
    }
}

impl Drop for GermanMessages {
    fn drop(&mut self) {
        match &self.language {
            Some(value) => std::env::set_var("LANGUAGE", value),
            None => std::env::remove_var("LANGUAGE"),
        }
        match &self.lang {
            Some(value) => std::env::set_var("LANG", value),
            None => std::env::remove_var("LANG"),
        }
    }
}

#[test]
#[serial]
fn test_missing_branches_detected_under_translated_locale() {
    if !git_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let remote = bare_remote(dir.path());
    let _locale = GermanMessages::enable();
    let repo = clone(&dir, &remote, "master").unwrap();

    let err = repo.delete_branch("prepare-2.1.0.0").unwrap_err();
    assert!(err.is_branch_not_found(), "{}", err);

    let err = repo.create_branch("9.9.9.x", "prepare-9.9.9.0").unwrap_err();
    assert!(matches!(err, TaggerError::Branch(_)), "{}", err);
}
