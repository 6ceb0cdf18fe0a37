//! Integration tests for the scan command

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

fn diskface() -> Command {
    let mut cmd = Command::cargo_bin("diskface").unwrap();
    cmd.env("XDG_CONFIG_HOME", "/nonexistent/diskface-test")
        .env_remove("DISKFACE_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn write_file(path: &Path, len: usize) {
    File::create(path)
        .unwrap()
        .write_all(&vec![0u8; len])
        .unwrap();
}

fn create_test_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    fs::create_dir_all(root.join("bigdata/nested")).unwrap();
    fs::create_dir_all(root.join("smalldata")).unwrap();
    fs::create_dir_all(root.join(".hiddendata")).unwrap();

    for i in 0..4 {
        write_file(&root.join(format!("bigdata/chunk{}.bin", i)), 10240);
    }
    write_file(&root.join("bigdata/nested/deep.bin"), 20480);
    write_file(&root.join("smalldata/note.txt"), 100);
    write_file(&root.join(".hiddendata/secret.bin"), 4096);
    write_file(&root.join("loose.iso"), 30000);

    dir
}

fn scan_json(dir: &TempDir, extra: &[&str]) -> serde_json::Value {
    let output = diskface()
        .arg("scan")
        .arg("--json")
        .args(extra)
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

fn result_names(report: &serde_json::Value) -> Vec<String> {
    report["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| {
            Path::new(e["path"].as_str().unwrap())
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect()
}

#[test]
fn test_scan_basic() {
    let dir = create_test_tree();

    diskface()
        .arg("scan")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Largest Directories"))
        .stdout(predicate::str::contains("bigdata"))
        .stdout(predicate::str::contains("Total:"));
}

#[test]
fn test_scan_json_output() {
    let dir = create_test_tree();
    let report = scan_json(&dir, &[]);

    assert_eq!(report["mode"], "directories");
    assert_eq!(
        report["root"].as_str().unwrap(),
        dir.path().canonicalize().unwrap().to_str().unwrap()
    );
    assert_eq!(result_names(&report), vec!["bigdata", "nested", "smalldata"]);
    assert_eq!(report["results"][0]["size"], 4 * 10240 + 20480);
}

#[test]
fn test_scan_files_mode() {
    let dir = create_test_tree();
    let report = scan_json(&dir, &["--files", "-n", "2"]);

    assert_eq!(report["mode"], "files");
    assert_eq!(result_names(&report), vec!["loose.iso", "deep.bin"]);
}

#[test]
fn test_scan_exclude_pattern() {
    let dir = create_test_tree();
    let report = scan_json(&dir, &["-e", "bigdata"]);

    assert_eq!(result_names(&report), vec!["smalldata"]);
    // .hiddendata and bigdata
    assert_eq!(report["stats"]["excluded"], 2);
}

#[test]
fn test_scan_hidden_entries() {
    let dir = create_test_tree();

    let names = result_names(&scan_json(&dir, &[]));
    assert!(!names.contains(&".hiddendata".to_string()));

    let names = result_names(&scan_json(&dir, &["--all"]));
    assert!(names.contains(&".hiddendata".to_string()));
}

#[test]
fn test_scan_min_size() {
    let dir = create_test_tree();
    let report = scan_json(&dir, &["-m", "10KB"]);

    assert_eq!(result_names(&report), vec!["bigdata", "nested"]);
}

#[test]
fn test_scan_root_only() {
    let dir = create_test_tree();
    let report = scan_json(&dir, &["--root-only"]);

    assert_eq!(result_names(&report), vec!["bigdata", "smalldata"]);
}

#[test]
fn test_scan_nonexistent_path() {
    diskface()
        .arg("scan")
        .arg("/nonexistent/path/12345")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Path not found"));
}

#[test]
fn test_scan_file_root_fails() {
    let dir = create_test_tree();

    diskface()
        .arg("scan")
        .arg(dir.path().join("loose.iso"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid path"));
}

#[test]
fn test_interactive_delete_selected() {
    let dir = create_test_tree();

    diskface()
        .arg("scan")
        .arg("-i")
        .arg(dir.path())
        .write_stdin("3\ny\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("About to delete 1 entry"))
        .stdout(predicate::str::contains("Deleted"));

    assert!(!dir.path().join("smalldata").exists());
    assert!(dir.path().join("bigdata").exists());
}

#[test]
fn test_interactive_declined_keeps_everything() {
    let dir = create_test_tree();

    diskface()
        .arg("scan")
        .arg("-i")
        .arg(dir.path())
        .write_stdin("all\nn\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Selection cancelled. Choose again or 'q' to quit."))
        .stdout(predicate::str::contains("Deleted").not());

    assert!(dir.path().join("bigdata").exists());
    assert!(dir.path().join("smalldata").exists());
}

#[test]
fn test_interactive_declined_then_reselected() {
    let dir = create_test_tree();

    diskface()
        .arg("scan")
        .arg("-i")
        .arg(dir.path())
        .write_stdin("all\nn\n3\ny\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Selection cancelled"))
        .stdout(predicate::str::contains("About to delete 1 entry"));

    assert!(!dir.path().join("smalldata").exists());
    assert!(dir.path().join("bigdata").exists());
}

#[test]
fn test_removal_prompt_after_plain_scan() {
    let dir = create_test_tree();

    diskface()
        .arg("scan")
        .arg(dir.path())
        .write_stdin("y\n3\ny\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Select items for removal?"))
        .stdout(predicate::str::contains("Deleted"));

    assert!(!dir.path().join("smalldata").exists());
}

#[test]
fn test_removal_prompt_declined() {
    let dir = create_test_tree();

    diskface()
        .arg("scan")
        .arg(dir.path())
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Select entries to delete").not());

    assert!(dir.path().join("smalldata").exists());
}

#[test]
fn test_quiet_skips_removal_prompt() {
    let dir = create_test_tree();

    diskface()
        .args(["-q", "scan"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Select items for removal?").not());
}

#[test]
fn test_interactive_setting_goes_straight_to_selection() {
    let dir = create_test_tree();
    let config_dir = TempDir::new().unwrap();
    let config = config_dir.path().join("config.toml");
    fs::write(&config, "[scan]\ninteractive = true\n").unwrap();

    diskface()
        .arg("--config")
        .arg(&config)
        .arg("scan")
        .arg(dir.path())
        .write_stdin("3\ny\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Select items for removal?").not())
        .stdout(predicate::str::contains("About to delete 1 entry"));

    assert!(!dir.path().join("smalldata").exists());
}

#[test]
fn test_scan_max_depth() {
    let dir = create_test_tree();
    let report = scan_json(&dir, &["--max-depth", "1"]);
    assert_eq!(result_names(&report), vec!["bigdata", "smalldata"]);
    assert_eq!(report["results"][0]["size"], 4 * 10240 + 20480);

    let report = scan_json(&dir, &["--depth", "2"]);
    assert_eq!(result_names(&report), vec!["bigdata", "nested", "smalldata"]);
}

#[test]
fn test_scan_include_os_ignores_configured_exclusions() {
    let dir = create_test_tree();
    let config_dir = TempDir::new().unwrap();
    let config = config_dir.path().join("config.toml");
    fs::write(&config, "exclusions = [\"bigdata\"]\n").unwrap();

    let run = |extra: &[&str]| {
        let output = diskface()
            .arg("--config")
            .arg(&config)
            .args(["scan", "--json"])
            .args(extra)
            .arg(dir.path())
            .output()
            .unwrap();
        assert!(output.status.success());
        let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        result_names(&report)
    };

    assert_eq!(run(&[]), vec!["smalldata"]);
    assert_eq!(run(&["--include-os"]), vec!["bigdata", "nested", "smalldata"]);
    assert_eq!(run(&["--include-os", "-e", "nested"]), vec!["bigdata", "smalldata"]);
}

#[test]
fn test_scan_clean_runs_temp_cleanup_first() {
    let dir = create_test_tree();
    let scratch = TempDir::new().unwrap();
    write_file(&scratch.path().join("stale.tmp"), 5000);
    write_file(&scratch.path().join("keep.txt"), 10);

    let config_dir = TempDir::new().unwrap();
    let config = config_dir.path().join("config.toml");
    fs::write(
        &config,
        format!(
            "[temp]\npatterns = [\"{}/*.tmp\"]\n",
            scratch.path().display()
        ),
    )
    .unwrap();

    diskface()
        .arg("--config")
        .arg(&config)
        .args(["scan", "--clean"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Freed:"))
        .stdout(predicate::str::contains("Largest Directories"));

    assert!(!scratch.path().join("stale.tmp").exists());
    assert!(scratch.path().join("keep.txt").exists());
}

#[test]
fn test_scan_width_truncates_paths() {
    let dir = create_test_tree();

    diskface()
        .args(["scan", "-w", "20", "--no-share"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("  ..."))
        .stdout(predicate::str::contains("%").not());
}

#[test]
fn test_interactive_quit() {
    let dir = create_test_tree();

    diskface()
        .arg("scan")
        .arg("-i")
        .arg(dir.path())
        .write_stdin("q\n")
        .assert()
        .success();

    assert!(dir.path().join("bigdata").exists());
}
