//! Tests for the pagesift command line runner.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use pagesift_cli::{run, Args};
use serde_json::{json, Value};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn records(dir: &TempDir) -> PathBuf {
    write(
        dir,
        "records.json",
        &json!([
            {"id": 1, "status": "A", "createdAt": "2024-01-03T00:00:00Z"},
            {"id": 2, "status": "B", "createdAt": "2024-01-01T00:00:00Z"},
            {"id": 3, "status": "A", "createdAt": "2024-01-02T00:00:00Z"}
        ])
        .to_string(),
    )
}

fn args(records: PathBuf) -> Args {
    Args {
        records,
        request: None,
        schema: None,
        config: None,
        pretty: false,
    }
}

#[test]
fn request_from_stdin() {
    let dir = TempDir::new().unwrap();
    let request = r#"{"filters": {"logic": "AND", "conditions": [
                          {"field": "status", "operator": "eq", "value": "a"}
                      ]},
                      "sorts": [{"field": "createdAt", "direction": "ASC"}]}"#;

    let output = run(&args(records(&dir)), request.as_bytes()).unwrap();
    let page: Value = serde_json::from_str(&output).unwrap();

    assert_eq!(page["data"][0]["id"], 3);
    assert_eq!(page["data"][1]["id"], 1);
    assert_eq!(page["page"]["totalElements"], 2);
    assert_eq!(page["page"]["size"], 20);
    assert_eq!(page["page"]["filters"], Value::Null);
}

#[test]
fn request_file_schema_and_config() {
    let dir = TempDir::new().unwrap();
    let mut args = args(records(&dir));
    args.request = Some(write(
        &dir,
        "request.json",
        r#"{"filters": [
            {"type": "condition", "field": "createdAt", "operator": "gte", "value": "2024-01-02"}
        ]}"#,
    ));
    args.schema = Some(write(&dir, "schema.yaml", "createdAt: timestamp\nid: number\n"));
    args.config = Some(write(&dir, "config.yaml", "defaultPageSize: 1\n"));
    args.pretty = true;

    let output = run(&args, std::io::empty()).unwrap();
    assert!(output.contains('\n'));
    let page: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(page["data"].as_array().unwrap().len(), 1);
    assert_eq!(page["data"][0]["id"], 1);
    assert_eq!(page["page"]["totalElements"], 2);
    assert_eq!(page["page"]["totalPages"], 2);
}

#[test]
fn config_limits_apply() {
    let dir = TempDir::new().unwrap();
    let mut args = args(records(&dir));
    args.config = Some(write(&dir, "config.yaml", "maxRecords: 2\n"));

    let err = run(&args, "{}".as_bytes()).unwrap_err();
    assert!(format!("{err:#}").contains("record source holds 3 records, limit is 2"));
}

#[test]
fn errors_carry_context() {
    let dir = TempDir::new().unwrap();

    let err = run(&args(records(&dir)), "[1, 2]".as_bytes()).unwrap_err();
    assert!(format!("{err:#}").starts_with("invalid list request"));

    let err = run(
        &args(records(&dir)),
        r#"{"filters": [{"type": "operator", "logic": "AND"}]}"#.as_bytes(),
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("sequence must not start with an operator"));

    let err = run(&args(dir.path().join("missing.json")), "{}".as_bytes()).unwrap_err();
    assert!(format!("{err:#}").contains("failed to read"));

    let not_objects = write(&dir, "numbers.json", "[1, 2]");
    let err = run(&args(not_objects), "{}".as_bytes()).unwrap_err();
    assert!(format!("{err:#}").contains("record 0 is not a JSON object"));
}

#[test]
fn parses_command_line() {
    let args = Args::try_parse_from([
        "pagesift",
        "--records",
        "r.json",
        "-q",
        "q.json",
        "--schema",
        "s.yaml",
        "--pretty",
    ])
    .unwrap();
    assert_eq!(args.records, PathBuf::from("r.json"));
    assert_eq!(args.request, Some(PathBuf::from("q.json")));
    assert_eq!(args.schema, Some(PathBuf::from("s.yaml")));
    assert!(args.pretty);

    assert!(Args::try_parse_from(["pagesift"]).is_err());
}
