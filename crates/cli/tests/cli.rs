//! Integration tests for the zig-bsdiff binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn zig_bsdiff(cwd: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("zig-bsdiff").unwrap();
    cmd.current_dir(cwd)
        .env_remove("ZIG_BSDIFF_BIN_DIR")
        .env_remove("ZIG_BSDIFF_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

/// Write both spellings so the test does not depend on the host OS.
fn fake_binaries(dir: &std::path::Path) {
    std::fs::create_dir_all(dir).unwrap();
    for name in ["bsdiff", "bspatch", "bsdiff.exe", "bspatch.exe"] {
        std::fs::write(dir.join(name), b"binary").unwrap();
    }
}

#[test]
fn test_help_lists_commands() {
    let temp = TempDir::new().unwrap();
    zig_bsdiff(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("setup"))
        .stdout(predicate::str::contains("exec"));
}

#[test]
fn test_path_prints_installed_binary() {
    let temp = TempDir::new().unwrap();
    let bin_dir = temp.path().join("bin");
    fake_binaries(&bin_dir);

    zig_bsdiff(temp.path())
        .args(["path", "bspatch", "--bin-dir"])
        .arg(&bin_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("bspatch"))
        .stdout(predicate::str::contains(bin_dir.to_string_lossy().as_ref()));
}

#[test]
fn test_path_reports_missing_binary() {
    let temp = TempDir::new().unwrap();

    zig_bsdiff(temp.path())
        .args(["path", "bsdiff", "--bin-dir", "empty"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Binary not found"))
        .stderr(predicate::str::contains("zig-bsdiff install"));
}

#[test]
fn test_path_rejects_unknown_name() {
    let temp = TempDir::new().unwrap();

    zig_bsdiff(temp.path())
        .args(["path", "bsmerge"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid binary name: bsmerge"));
}

#[test]
fn test_bin_dir_from_environment() {
    let temp = TempDir::new().unwrap();
    let bin_dir = temp.path().join("from-env");
    fake_binaries(&bin_dir);

    zig_bsdiff(temp.path())
        .env("ZIG_BSDIFF_BIN_DIR", &bin_dir)
        .args(["path", "bsdiff"])
        .assert()
        .success()
        .stdout(predicate::str::contains("from-env"));
}

#[test]
fn test_config_file_sets_bin_dir() {
    let temp = TempDir::new().unwrap();
    fake_binaries(&temp.path().join("tools"));
    std::fs::write(
        temp.path().join("zig-bsdiff.toml"),
        "[provision]\nbin_dir = \"tools\"\n",
    )
    .unwrap();

    zig_bsdiff(temp.path())
        .args(["path", "bsdiff"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tools"));
}

#[test]
fn test_invalid_config_file_fails() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("broken.toml"), "[provision]\nmirror = 1\n").unwrap();

    zig_bsdiff(temp.path())
        .args(["--config", "broken.toml", "path", "bsdiff"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("broken.toml"));
}

#[test]
fn test_already_installed_makes_no_request() {
    let temp = TempDir::new().unwrap();
    fake_binaries(&temp.path().join("bin"));
    // Unroutable base URL: any request would fail
    std::fs::write(
        temp.path().join("zig-bsdiff.toml"),
        "[provision]\nrelease_base_url = \"http://127.0.0.1:9\"\n",
    )
    .unwrap();

    zig_bsdiff(temp.path())
        .arg("install")
        .assert()
        .success()
        .stdout(predicate::str::contains("already installed"))
        .stdout(predicate::str::contains("installed successfully"));
}

#[test]
fn test_install_failure_suggests_remedies() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("zig-bsdiff.toml"),
        "[provision]\nrelease_base_url = \"http://127.0.0.1:9\"\n",
    )
    .unwrap();

    zig_bsdiff(temp.path())
        .arg("install")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Downloading zig-bsdiff binaries from"))
        .stderr(predicate::str::contains("Failed to install zig-bsdiff binaries"))
        .stderr(predicate::str::contains("You can try"));
}

#[test]
fn test_package_stages_binaries() {
    let temp = TempDir::new().unwrap();
    fake_binaries(&temp.path().join("zig-out").join("bin"));

    zig_bsdiff(temp.path())
        .arg("package")
        .assert()
        .success()
        .stdout(predicate::str::contains("staged in"));

    let dist = temp.path().join("dist");
    assert!(dist.join("bsdiff").exists() || dist.join("bsdiff.exe").exists());
}

#[test]
fn test_package_without_build_fails() {
    let temp = TempDir::new().unwrap();

    zig_bsdiff(temp.path())
        .arg("package")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to package"));
}
