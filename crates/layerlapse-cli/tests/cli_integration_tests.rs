//! CLI integration tests
//!
//! Run the built binary against temporary layer descriptions and folders.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const DOCUMENT: &str = r#"{
  "path": "/art/piece.psd",
  "width": 4000,
  "height": 2000,
  "layers": [
    { "leaf": { "id": 1, "name": "A" } },
    { "group": { "name": "Group", "children": [
      { "leaf": { "id": 2, "name": "B" } },
      { "leaf": { "id": 3, "name": "C" } }
    ] } },
    { "leaf": { "id": 4, "name": "hidden", "visible": false } }
  ]
}"#;

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_layerlapse-cli"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn write_document(dir: &TempDir) -> String {
    let path = dir.path().join("piece.json");
    fs::write(&path, DOCUMENT).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn test_plan_prints_frames_in_build_up_order() {
    let dir = TempDir::new().unwrap();
    let doc = write_document(&dir);

    let output = run(dir.path(), &["plan", &doc]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Leaves: 4 (3 visible, 0 unreadable)"));
    assert!(stdout.contains("Canvas: 4000x2000 -> 1000x500"));
    assert!(stdout.contains("Frames: 3"));
    assert!(stdout.contains("psdtemp_00000.png  A, Group/B, Group/C"));
    assert!(stdout.contains("psdtemp_00001.png  Group/B, Group/C"));
    assert!(stdout.contains("psdtemp_00002.png  Group/C"));
}

#[test]
fn test_plan_json_output() {
    let dir = TempDir::new().unwrap();
    let doc = write_document(&dir);

    let output = run(dir.path(), &["plan", &doc, "--json"]);

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["report"]["visible_count"], 3);
    assert_eq!(value["frames"].as_array().unwrap().len(), 3);
    assert_eq!(value["frames"][2]["visible"], serde_json::json!([3]));
}

#[test]
fn test_plan_skips_leaves_of_hidden_group() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hidden.json");
    fs::write(
        &path,
        r#"{"path": "/art/piece.psd", "width": 100, "height": 100, "layers": [
            { "leaf": { "id": 1, "name": "top" } },
            { "group": { "name": "off", "visible": false, "children": [
              { "leaf": { "id": 2, "name": "x" } },
              { "leaf": { "id": 3, "name": "y" } }
            ] } },
            { "leaf": { "id": 4, "name": "bg" } }
        ]}"#,
    )
    .unwrap();

    let output = run(dir.path(), &["plan", path.to_str().unwrap()]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Leaves: 4 (2 visible, 0 unreadable)"));
    assert!(stdout.contains("Frames: 2"));
    assert!(stdout.contains("psdtemp_00000.png  top, bg"));
}

#[test]
fn test_plan_honours_config_file() {
    let dir = TempDir::new().unwrap();
    let doc = write_document(&dir);
    let config = dir.path().join("layerlapse.toml");
    fs::write(&config, "resize = \"unchanged\"\nframe_prefix = \"shot_\"\n").unwrap();

    let output = run(
        dir.path(),
        &["plan", &doc, "--config", config.to_str().unwrap()],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Canvas: unchanged"));
    assert!(stdout.contains("shot_00002.png"));
}

#[test]
fn test_plan_missing_document_fails() {
    let dir = TempDir::new().unwrap();

    let output = run(dir.path(), &["plan", "missing.json"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

#[test]
fn test_scan_reports_documents_needing_export() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("fresh.psd"), "").unwrap();
    fs::create_dir(dir.path().join("backup")).unwrap();
    fs::write(dir.path().join("backup").join("old.psd"), "").unwrap();

    let output = run(dir.path(), &["scan", dir.path().to_str().unwrap(), "--json"]);

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = value.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["needs_export"], true);
    assert!(rows[0]["document"].as_str().unwrap().ends_with("fresh.psd"));
}
