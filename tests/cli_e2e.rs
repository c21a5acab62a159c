#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SIDECAR: &str = ".superhxpro_metadata.json";

/// Command isolated from the user's config and log settings.
fn helper_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin("superhxpro"));
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("SUPERHXPRO_HASH_CHUNK_SIZE")
        .env_remove("SUPERHXPRO_FOLLOW_LINKS");
    cmd
}

fn sidecar(dir: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(dir.join(SIDECAR)).unwrap()).unwrap()
}

fn workspace() -> (TempDir, TempDir) {
    let home = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    fs::write(data.path().join("report.pdf"), vec![0u8; 2048]).unwrap();
    fs::write(data.path().join("notes.txt"), "hello").unwrap();
    (home, data)
}

#[test]
fn test_tag_is_idempotent() {
    let (home, data) = workspace();
    let file = data.path().join("report.pdf");

    helper_cmd(home.path())
        .arg("tag")
        .arg(&file)
        .args(["--add", "a,b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated tags"));

    helper_cmd(home.path())
        .arg("tag")
        .arg(&file)
        .args(["--add", "b,c", "--remove", "a"])
        .assert()
        .success();
    assert_eq!(
        sidecar(data.path())["report.pdf"]["tags"],
        serde_json::json!(["b", "c"])
    );

    helper_cmd(home.path())
        .arg("tag")
        .arg(&file)
        .args(["--add", "b,c", "--remove", "a"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tag changes"))
        .stdout(predicate::str::contains("Processed 0 file(s)"));
}

#[test]
fn test_tag_folder_then_search_tag() {
    let (home, data) = workspace();

    helper_cmd(home.path())
        .arg("tag")
        .arg(data.path())
        .args(["--add", "work"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 2 file(s)"));

    helper_cmd(home.path())
        .arg("search-tag")
        .arg(data.path())
        .arg("work")
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 file(s) with tag 'work'"));
}

#[test]
fn test_search_meta_combines_predicates() {
    let (home, data) = workspace();
    helper_cmd(home.path())
        .arg("tag")
        .arg(data.path().join("report.pdf"))
        .args(["--add", "urgent"])
        .assert()
        .success();
    helper_cmd(home.path())
        .arg("tag")
        .arg(data.path().join("notes.txt"))
        .args(["--add", "urgent"])
        .assert()
        .success();

    helper_cmd(home.path())
        .arg("search-meta")
        .arg(data.path())
        .arg(r#"{"size":{"gt":1000},"tags":["urgent"]}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("report.pdf"))
        .stdout(predicate::str::contains("notes.txt").not())
        .stdout(predicate::str::contains("Found 1 file(s) matching criteria"));
}

#[test]
fn test_search_meta_accepts_negative_size_bound() {
    let (home, data) = workspace();
    helper_cmd(home.path())
        .arg("search-meta")
        .arg(data.path())
        .arg(r#"{"size":{"gt":-1}}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 file(s) matching criteria"));
}

#[test]
fn test_search_meta_rejects_malformed_query() {
    let (home, data) = workspace();
    helper_cmd(home.path())
        .arg("search-meta")
        .arg(data.path())
        .arg("{not json")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: Invalid query"));
}

#[test]
fn test_export_map_writes_catalog() {
    let (home, data) = workspace();
    fs::create_dir(data.path().join("sub")).unwrap();
    let out = home.path().join("map.json");

    helper_cmd(home.path())
        .args(["folder-mood", "set"])
        .arg(data.path())
        .args(["--mood", "happy"])
        .assert()
        .success();

    helper_cmd(home.path())
        .arg("export-map")
        .arg(data.path())
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("exported successfully"));

    let map: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(map["/"]["subdirectories"], serde_json::json!(["sub"]));
    assert_eq!(map["/"]["mood"]["value"], "happy");
    let names: Vec<_> = map["/"]["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["notes.txt", "report.pdf"]);
    assert!(map.get("sub").is_some());
}

#[test]
fn test_deduplicate_keeps_first_seen() {
    let home = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    for name in ["a.txt", "b.txt", "c.txt"] {
        fs::write(data.path().join(name), "same content").unwrap();
    }

    helper_cmd(home.path())
        .arg("deduplicate")
        .arg(data.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 duplicate(s)"));
    assert!(data.path().join("b.txt").exists());
    assert!(data.path().join("c.txt").exists());

    helper_cmd(home.path())
        .arg("deduplicate")
        .arg(data.path())
        .arg("--delete")
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 2 file(s)"));
    assert!(data.path().join("a.txt").exists());
    assert!(!data.path().join("b.txt").exists());
    assert!(!data.path().join("c.txt").exists());
}

#[test]
fn test_folder_mood_overwrites() {
    let (home, data) = workspace();

    for mood in ["happy", "stressful"] {
        helper_cmd(home.path())
            .args(["folder-mood", "set"])
            .arg(data.path())
            .args(["--mood", mood])
            .assert()
            .success();
    }

    assert_eq!(sidecar(data.path())["/"]["mood"]["value"], "stressful");
    helper_cmd(home.path())
        .args(["folder-mood", "get"])
        .arg(data.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("stressful"))
        .stdout(predicate::str::contains("happy").not());
}

#[test]
fn test_health_check_reports_corrupt_metadata() {
    let (home, data) = workspace();
    fs::write(data.path().join(SIDECAR), "{ nope").unwrap();

    helper_cmd(home.path())
        .arg("health-check")
        .arg(data.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Unreadable metadata"))
        .stdout(predicate::str::contains("Found 1 issue(s)"));
}

#[test]
fn test_missing_folder_fails() {
    let (home, data) = workspace();
    helper_cmd(home.path())
        .arg("health-check")
        .arg(data.path().join("missing"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_zero_chunk_size_config_fails() {
    let (home, data) = workspace();
    let config = home.path().join("custom.toml");
    fs::write(&config, "hash_chunk_size = 0\n").unwrap();

    helper_cmd(home.path())
        .arg("--config")
        .arg(&config)
        .arg("deduplicate")
        .arg(data.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config error"));
}
