use std::fs;
use std::path::PathBuf;
use std::process::Command;

use tempfile::tempdir;

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_callgraph"))
}

fn fixture(rel: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join(rel)
        .display()
        .to_string()
}

#[test]
fn single_file_dot_output() {
    let path = fixture("trait_dispatch.rs");
    let output = bin().arg(&path).output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let expected = format!(
        "digraph G {{\n\
         \x20   \"trait_dispatch.run\" -> \"trait_dispatch.apply\" [label=\"{path}:14:5\"];\n\
         \x20   \"trait_dispatch.main\" -> \"trait_dispatch.run\" [label=\"{path}:19:5\"];\n\
         \x20   \"trait_dispatch.main\" -> \"trait_dispatch.run\" [label=\"{path}:20:5\"];\n\
         }}\n"
    );
    assert_eq!(stdout, expected);
}

#[test]
fn every_line_is_well_formed() {
    let output = bin().arg(fixture("workspace/...")).output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.first(), Some(&"digraph G {"));
    assert_eq!(lines.last(), Some(&"}"));
    for line in &lines[1..lines.len() - 1] {
        assert!(
            line.is_empty()
                || (line.starts_with("    \"") && line.contains("\" -> \"") && line.ends_with("\"];")),
            "malformed line: {line}"
        );
    }
    assert!(lines.len() > 2);
}

#[test]
fn json_output_to_file() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("graph.json");
    let output = bin()
        .args(["--format", "json", "--output"])
        .arg(&out)
        .arg(fixture("trait_dispatch.rs"))
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["edges"].as_array().map(Vec::len), Some(3));
    assert_eq!(json["nodes"][0]["id"], "trait_dispatch.apply");
}

#[test]
fn missing_target_prints_usage() {
    let output = bin().output().unwrap();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}

#[test]
fn load_failure_is_fatal_and_silent_on_stdout() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.rs");
    fs::write(&path, "fn a( {\n").unwrap();

    let output = bin().arg(&path).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("parse error"));
}
