use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn shipit() -> assert_cmd::Command {
    cargo_bin_cmd!("shipit")
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap()
        .status;
    assert!(status.success(), "git {args:?} failed");
}

/// Committed source tree with a build script that emits the artifact.
#[cfg(unix)]
fn init_source_repo(dir: &Path) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::create_dir_all(dir.join("scripts")).unwrap();
    std::fs::create_dir_all(dir.join("s/css")).unwrap();
    let build = dir.join("scripts/build_linux.sh");
    std::fs::write(
        &build,
        "#!/bin/sh\necho compiling\nprintf bin > quicknotes_linux\n",
    )
    .unwrap();
    std::fs::set_permissions(&build, std::fs::Permissions::from_mode(0o755)).unwrap();
    std::fs::write(dir.join("scripts/server_run.sh"), "#!/bin/sh\n").unwrap();
    std::fs::write(dir.join("s/index.html"), "<p>hi</p>").unwrap();
    std::fs::write(dir.join("s/css/app.css"), "p {}").unwrap();
    std::fs::write(dir.join(".gitignore"), "quicknotes_linux\n*.zip\n").unwrap();

    git(dir, &["init"]);
    git(dir, &["config", "user.email", "test@test.com"]);
    git(dir, &["config", "user.name", "Test"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
    git(dir, &["add", "."]);
    git(dir, &["commit", "-m", "init"]);
}

fn write_config(invocation_dir: &Path, source_root: &Path) {
    std::fs::write(
        invocation_dir.join("shipit.toml"),
        format!("[source]\nroot = {:?}\n", source_root.display().to_string()),
    )
    .unwrap();
}

// ── Help / Version ──

#[test]
fn shows_help() {
    shipit()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("deployable zip"));
}

#[test]
fn shows_version() {
    shipit()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("shipit"));
}

#[test]
fn json_conflicts_with_streamed_build_output() {
    shipit()
        .args(["package", "--json", "--show-build-output"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

// ── Package Command ──

#[test]
fn package_fails_without_base_path_env() {
    let tmp = TempDir::new().unwrap();

    shipit()
        .current_dir(tmp.path())
        .env_remove("GOPATH")
        .arg("package")
        .assert()
        .failure()
        .stderr(predicate::str::contains("GOPATH"));
}

#[test]
fn package_fails_when_source_root_missing() {
    let tmp = TempDir::new().unwrap();
    write_config(tmp.path(), &tmp.path().join("missing"));

    shipit()
        .current_dir(tmp.path())
        .arg("package")
        .assert()
        .failure()
        .stderr(predicate::str::contains("doesn't exist"));
}

#[test]
fn package_fails_on_invalid_config() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("shipit.toml"), "[source\n").unwrap();

    shipit()
        .current_dir(tmp.path())
        .arg("package")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config"));
}

#[cfg(unix)]
#[test]
fn package_refuses_dirty_tree() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("src");
    let out = tmp.path().join("out");
    std::fs::create_dir_all(&source).unwrap();
    std::fs::create_dir_all(&out).unwrap();
    init_source_repo(&source);
    write_config(&out, &source);
    std::fs::write(source.join("wip.txt"), "unfinished").unwrap();

    shipit()
        .current_dir(&out)
        .arg("package")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("uncommitted changes"))
        .stderr(predicate::str::contains("wip.txt"));

    assert!(!source.join("quicknotes_linux").exists());
}

#[cfg(unix)]
#[test]
fn package_writes_archive_to_invocation_dir() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("src");
    let out = tmp.path().join("out");
    std::fs::create_dir_all(&source).unwrap();
    std::fs::create_dir_all(&out).unwrap();
    init_source_repo(&source);
    write_config(&out, &source);

    let assert = shipit()
        .current_dir(&out)
        .args(["package", "--json"])
        .assert()
        .success();

    let summary: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    let commit = summary["commit"].as_str().unwrap();
    assert_eq!(commit.len(), 40);
    assert!(out.join(format!("{commit}.zip")).exists());
    assert_eq!(
        summary["entries"],
        serde_json::json!([
            "quicknotes",
            "server_run.sh",
            "s/css/app.css",
            "s/index.html"
        ])
    );

    // The archive lists back through `inspect`.
    shipit()
        .current_dir(&out)
        .args(["inspect", &format!("{commit}.zip")])
        .assert()
        .success()
        .stdout(predicate::str::contains("server_run.sh"))
        .stdout(predicate::str::contains("s/css/app.css"));
}

#[cfg(unix)]
#[test]
fn package_prints_steps_without_json() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("src");
    let out = tmp.path().join("out");
    std::fs::create_dir_all(&source).unwrap();
    std::fs::create_dir_all(&out).unwrap();
    init_source_repo(&source);
    write_config(&out, &source);

    shipit()
        .current_dir(&out)
        .arg("package")
        .assert()
        .success()
        .stdout(predicate::str::contains("Working tree is clean"))
        .stdout(predicate::str::contains("Packaged: "))
        .stdout(predicate::str::contains("compiling").not());
}

// ── Inspect Command ──

#[test]
fn inspect_fails_for_missing_archive() {
    let tmp = TempDir::new().unwrap();

    shipit()
        .current_dir(tmp.path())
        .args(["inspect", "nope.zip"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.zip"));
}

#[test]
fn inspect_fails_for_non_zip_file() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("fake.zip"), "not a zip").unwrap();

    shipit()
        .current_dir(tmp.path())
        .args(["inspect", "fake.zip"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read archive"));
}

// ── Doctor Command ──

#[test]
fn doctor_fails_without_source_root() {
    let tmp = TempDir::new().unwrap();
    write_config(tmp.path(), &tmp.path().join("missing"));

    shipit()
        .current_dir(tmp.path())
        .arg("doctor")
        .assert()
        .failure()
        .stdout(predicate::str::contains("[NG] Source root"))
        .stdout(predicate::str::contains("[OK] Config file"));
}

#[cfg(unix)]
#[test]
fn doctor_passes_on_ready_tree() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("src");
    let out = tmp.path().join("out");
    std::fs::create_dir_all(&source).unwrap();
    std::fs::create_dir_all(&out).unwrap();
    init_source_repo(&source);
    write_config(&out, &source);

    shipit()
        .current_dir(&out)
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("[OK] Working tree"));
}
