//! Binary-level tests for commands that need no host access

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `gitcms` isolated from the caller's config files and environment
fn gitcms(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("gitcms").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .env("NO_COLOR", "1")
        .env_remove("GITCMS_PLATFORM")
        .env_remove("GITCMS_REPOSITORY")
        .env_remove("GITHUB_REPOSITORY")
        .env_remove("GITCMS_HOST")
        .env_remove("GITCMS_WORK_BRANCH")
        .env_remove("GITCMS_BASE_BRANCH")
        .env_remove("GITCMS_CONTENT_DIR");
    cmd
}

fn write_json(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    gitcms(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("publish"))
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("auth"));
}

#[test]
fn test_dry_run_prints_module_without_auth() {
    let dir = TempDir::new().unwrap();
    let file = write_json(
        &dir,
        "home.json",
        r#"{"heroTitle":"Welcome","features":[{"title":"Fast"}]}"#,
    );

    gitcms(&dir)
        .args(["publish", "home", "--dry-run", "--file"])
        .arg(&file)
        .env_remove("GITHUB_TOKEN")
        .env_remove("GH_TOKEN")
        .env("PATH", "")
        .assert()
        .success()
        .stdout(predicate::str::contains("content/home.ts"))
        .stdout(predicate::str::contains("development"))
        .stdout(predicate::str::contains("const content = {"))
        .stdout(predicate::str::contains("\"heroTitle\": \"Welcome\""))
        .stdout(predicate::str::contains("export default content;"));
}

#[test]
fn test_dry_run_applies_set_edits() {
    let dir = TempDir::new().unwrap();
    let file = write_json(&dir, "home.json", r#"{"title":"Old"}"#);

    gitcms(&dir)
        .args(["publish", "home", "--dry-run", "--set", "title=New", "--file"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"title\": \"New\""))
        .stdout(predicate::str::contains("Old").not());
}

#[test]
fn test_invalid_slug_is_rejected() {
    let dir = TempDir::new().unwrap();
    gitcms(&dir)
        .args(["publish", "../etc/passwd", "--dry-run", "--set", "title=x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid input"));
}

#[test]
fn test_protected_work_branch_from_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("gitcms.toml"), "work_branch = \"master\"\n").unwrap();

    gitcms(&dir)
        .args(["publish", "home", "--dry-run", "--set", "title=x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("protected branch 'master'"));
}

#[test]
fn test_explicit_config_content_dir() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("custom.toml");
    std::fs::write(&config, "content_dir = \"site/pages\"\n").unwrap();

    let file = write_json(&dir, "about.json", r#"{"title":"About"}"#);

    gitcms(&dir)
        .arg("--config")
        .arg(&config)
        .args(["publish", "about", "--dry-run", "--file"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("site/pages/about.ts"));
}

#[test]
fn test_unknown_config_key_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("gitcms.toml"), "wrok_branch = \"x\"\n").unwrap();

    gitcms(&dir)
        .args(["publish", "home", "--dry-run", "--set", "title=x"])
        .assert()
        .failure();
}

#[test]
fn test_malformed_file_fails() {
    let dir = TempDir::new().unwrap();
    let file = write_json(&dir, "bad.json", "[1, 2, 3]");

    gitcms(&dir)
        .args(["publish", "home", "--dry-run", "--file"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("serialization"));
}

#[test]
fn test_auth_setup_mentions_env_tokens() {
    let dir = TempDir::new().unwrap();
    gitcms(&dir)
        .args(["auth", "gitlab", "setup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("GITLAB_TOKEN"));
}
