mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::Value;

use common::TestWorkspace;

const SAMPLE: &str = "Timestamp::datetime,Name::key,Count::int\n06/12/2023 01:00,Cisco,36\n06/13/2023 14:30,Juniper,12\n";

fn csv_live() -> Command {
    Command::cargo_bin("csv-live").expect("binary present")
}

#[test]
fn schema_lists_columns_types_and_key() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("sample.csv", SAMPLE);

    csv_live()
        .args(["schema", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("Timestamp  DateTime"))
        .stdout(contains("Name       String    yes"))
        .stdout(contains("Count      Integer"));
}

#[test]
fn show_renders_typed_rows_as_table() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("sample.csv", SAMPLE);

    csv_live()
        .args(["show", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("Timestamp:DateTime"))
        .stdout(contains("2023-06-12T01:00:00Z"))
        .stdout(contains("Juniper"));
}

#[test]
fn show_json_reports_schema_and_cells() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("sample.csv", SAMPLE);

    let output = csv_live()
        .args(["show", "-i", input.to_str().unwrap(), "--format", "json"])
        .output()
        .expect("run show");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(json["header"]["key_column_index"], 1);
    assert_eq!(json["header"]["columns"][2]["type"], "Integer");
    assert_eq!(json["rows"][1]["identity"], "1");
    assert_eq!(json["rows"][0]["cells"][0], "2023-06-12T01:00:00Z");
    assert_eq!(json["rows"][0]["cells"][2], 36);
}

#[test]
fn custom_delimiter_is_applied() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("sample.txt", "Name|Score::double\nAda|9.5\n");

    csv_live()
        .args(["show", "-i", input.to_str().unwrap(), "--delimiter", "pipe"])
        .assert()
        .success()
        .stdout(contains("Score:Double"))
        .stdout(contains("9.5"));
}

#[test]
fn missing_file_is_rejected_before_loading() {
    let workspace = TestWorkspace::new();
    let missing = workspace.path().join("nope.csv");

    csv_live()
        .args(["show", "-i", missing.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("does not exist"));
}

#[test]
fn coercion_failure_reports_value_and_line() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("bad.csv", "Name,Count::int\na,1\nb,two\n");

    csv_live()
        .args(["show", "-i", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("Line 3").and(contains("'two'")));
}

#[test]
fn duplicate_key_header_fails_the_load() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("keys.csv", "A::key,B::key\n1,2\n");

    csv_live()
        .args(["schema", "-i", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("only one key column"));
}

#[test]
fn watch_prints_initial_page_and_stops_when_stdin_closes() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("sample.csv", SAMPLE);

    csv_live()
        .args(["watch", "-i", input.to_str().unwrap(), "--debounce-ms", "0"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(contains("Cisco"));
}

#[test]
fn list_shows_candidate_files() {
    let workspace = TestWorkspace::new();
    workspace.write("b.csv", "x\n");
    workspace.write("a.tsv", "x\n");
    workspace.write("readme.md", "x\n");

    csv_live()
        .args(["list", "-r", workspace.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("a.tsv").and(contains("b.csv")))
        .stdout(contains("readme.md").not());
}
