//! CLI integration tests for extpkg.
//!
//! These tests run the binary without a real module tool. Shell scripts
//! stand in for it where a load has to succeed.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the extpkg binary command.
fn extpkg() -> Command {
    let mut cmd = Command::cargo_bin("extpkg").unwrap();
    cmd.env_remove("EXTPKG_GO")
        .env_remove("EXTPKG_TMPDIR")
        .env_remove("GOROOT");
    cmd
}

/// Write an executable shell script standing in for the module tool.
#[cfg(unix)]
fn write_tool(dir: &Path, script: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let tool = dir.join("fake-go");
    fs::write(&tool, script).unwrap();
    fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();
    tool
}

/// Lists one module package; inside a clone it also imports example.com/a.
/// `get` appends its directory and target to `$EXTPKG_TEST_LOG`.
#[cfg(unix)]
const CLONING_TOOL: &str = r##"#!/bin/sh
dir=$(pwd -P)
case "$1" in
list)
    case "$dir" in
        */external-*) imports='["example.com/a"]' ;;
        *) imports='[]' ;;
    esac
    cat <<JSON
{"ImportPath": "example.com/a", "Name": "a", "DepOnly": true}
{"ImportPath": "example.com/mod", "Name": "mod", "Dir": "$dir", "GoFiles": ["mod.go"], "Module": {"Path": "example.com/mod", "Dir": "$dir", "GoMod": "$dir/go.mod", "Main": true}, "Imports": $imports}
JSON
    ;;
get)
    echo "$dir $2" >> "$EXTPKG_TEST_LOG"
    if [ -n "$EXTPKG_TEST_FAIL_GET" ]; then
        echo "go: module $2: not found" >&2
        exit 1
    fi
    ;;
esac
"##;

/// A module directory, an empty scratch directory and a log path.
#[cfg(unix)]
fn module_workspace(tmp: &TempDir) -> (PathBuf, PathBuf, PathBuf) {
    let mod_dir = tmp.path().join("mod");
    fs::create_dir_all(&mod_dir).unwrap();
    fs::write(mod_dir.join("go.mod"), "module example.com/mod\n").unwrap();
    fs::write(mod_dir.join("mod.go"), "package mod\n").unwrap();
    let scratch = tmp.path().join("scratch");
    fs::create_dir_all(&scratch).unwrap();
    (mod_dir, scratch, tmp.path().join("get.log"))
}

#[test]
fn test_requires_target_and_patterns() {
    extpkg().assert().failure();

    extpkg()
        .arg("example.com/a")
        .assert()
        .failure()
        .stderr(predicate::str::contains("PATTERNS"));
}

#[test]
fn test_help_lists_options() {
    extpkg()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--search"))
        .stdout(predicate::str::contains("first-import"));
}

#[test]
fn test_rejects_unknown_search_mode() {
    extpkg()
        .args(["--search", "breadth", "example.com/a", "./..."])
        .assert()
        .failure()
        .stderr(predicate::str::contains("breadth"));
}

#[test]
fn test_missing_tool_reports_error() {
    let tmp = TempDir::new().unwrap();

    extpkg()
        .args(["--go", "/nonexistent/extpkg-go", "example.com/a", "./..."])
        .current_dir(tmp.path())
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::starts_with("Error: "))
        .stderr(predicate::str::contains("/nonexistent/extpkg-go"));
}

#[test]
fn test_tool_from_environment() {
    let tmp = TempDir::new().unwrap();

    extpkg()
        .env("EXTPKG_GO", "/nonexistent/from-env-go")
        .args(["example.com/a", "./..."])
        .current_dir(tmp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("/nonexistent/from-env-go"));
}

#[cfg(unix)]
#[test]
fn test_failing_tool_reports_its_stderr() {
    let tmp = TempDir::new().unwrap();
    let tool = write_tool(
        tmp.path(),
        "#!/bin/sh\necho \"go: cannot find main module\" >&2\nexit 1\n",
    );

    extpkg()
        .arg("--go")
        .arg(&tool)
        .args(["example.com/a", "./..."])
        .current_dir(tmp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot find main module"));
}

#[cfg(unix)]
#[test]
fn test_already_imported_prints_true() {
    let tmp = TempDir::new().unwrap();
    let tool = write_tool(
        tmp.path(),
        r#"#!/bin/sh
cat <<'JSON'
{"ImportPath": "example.com/a", "Name": "a", "DepOnly": true}
{"ImportPath": "example.com/mod/b", "Name": "b", "Imports": ["example.com/a"]}
JSON
"#,
    );

    extpkg()
        .arg("--go")
        .arg(&tool)
        .args(["example.com/a", "./..."])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout("true\n");
}

#[cfg(unix)]
#[test]
fn test_missing_target_is_fetched_in_clone() {
    let tmp = TempDir::new().unwrap();
    let (mod_dir, scratch, log) = module_workspace(&tmp);
    let tool = write_tool(tmp.path(), CLONING_TOOL);

    extpkg()
        .arg("--go")
        .arg(&tool)
        .arg("--tmpdir")
        .arg(&scratch)
        .args(["example.com/a", "./..."])
        .env("EXTPKG_TEST_LOG", &log)
        .current_dir(&mod_dir)
        .assert()
        .success()
        .stdout("false\n");

    let calls = fs::read_to_string(&log).unwrap();
    let lines: Vec<_> = calls.lines().collect();
    assert_eq!(lines.len(), 1);
    let (dir, target) = lines[0].rsplit_once(' ').unwrap();
    assert_eq!(target, "example.com/a");
    assert!(Path::new(dir).starts_with(scratch.canonicalize().unwrap()));

    // The clone is gone and the module is untouched.
    assert_eq!(fs::read_dir(&scratch).unwrap().count(), 0);
    assert_eq!(fs::read_dir(&mod_dir).unwrap().count(), 2);
}

#[cfg(unix)]
#[test]
fn test_failing_get_reports_error_and_cleans_up() {
    let tmp = TempDir::new().unwrap();
    let (mod_dir, scratch, log) = module_workspace(&tmp);
    let tool = write_tool(tmp.path(), CLONING_TOOL);

    extpkg()
        .arg("--go")
        .arg(&tool)
        .args(["example.com/a", "./..."])
        .env("EXTPKG_TMPDIR", &scratch)
        .env("EXTPKG_TEST_LOG", &log)
        .env("EXTPKG_TEST_FAIL_GET", "1")
        .current_dir(&mod_dir)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::starts_with("Error: "))
        .stderr(predicate::str::contains("module example.com/a: not found"));

    assert_eq!(fs::read_to_string(&log).unwrap().lines().count(), 1);
    assert_eq!(fs::read_dir(&scratch).unwrap().count(), 0);
}
