use std::io::Write;
use std::process::{Command, Output};

use tempfile::NamedTempFile;

const PRODUCTION: &str = "\
maximize x1 + x2
subject to
  sum: x1 + x2 <= 4
  x1_max: x1 <= 3
";

const CONFLICTING: &str = "\
max x1 + x2
x1 + x2 <= 1
x1 + x2 >= 2
";

fn source_file(source: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".lp2").tempfile().unwrap();
    file.write_all(source.as_bytes()).unwrap();
    file
}

fn graphlp(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_graphlp"))
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn solve_prints_vertex_table_and_optimum() {
    let file = source_file(PRODUCTION);
    let output = graphlp(&["solve", file.path().to_str().unwrap()]);
    let text = stdout(&output);

    assert!(output.status.success());
    assert!(text.contains("Status: OPTIMAL"));
    assert!(text.contains("Optimum: x1=3.00, x2=1.00, Z=4.00"));
    let row_d: Vec<&str> = text
        .lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>())
        .find(|fields| fields.first() == Some(&"D"))
        .unwrap_or_default();
    assert_eq!(row_d, vec!["D", "0.00", "4.00", "4.00"]);
}

#[test]
fn solve_with_analysis_lists_binding_constraints() {
    let file = source_file(PRODUCTION);
    let output = graphlp(&["solve", file.path().to_str().unwrap(), "--analysis"]);
    let text = stdout(&output);

    assert!(text.contains("Binding constraints:"));
    assert!(text.contains("  - sum"));
    assert!(text.contains("  - x1_max"));
    assert!(text.contains("Alternative optima (same Z):"));
    assert!(text.contains("x1=0.00, x2=4.00"));
}

#[test]
fn lexicographic_tie_break_prefers_smaller_x1() {
    let file = source_file(PRODUCTION);
    let output = graphlp(&[
        "solve",
        file.path().to_str().unwrap(),
        "--tie-break",
        "lexicographic",
    ]);
    assert!(stdout(&output).contains("Optimum: x1=0.00, x2=4.00, Z=4.00"));
}

#[test]
fn solve_json_includes_chart_on_request() {
    let file = source_file(PRODUCTION);
    let output = graphlp(&["solve", file.path().to_str().unwrap(), "-f", "json", "--chart"]);
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["optimum"], "Optimum: x1=3.00, x2=1.00, Z=4.00");
    assert_eq!(value["table"].as_array().map(Vec::len), Some(4));
    assert_eq!(value["chart"]["bounds"]["max_x"], 4.0);
    assert_eq!(value["chart"]["bounds"]["max_y"], 5.0);
}

#[test]
fn infeasible_problem_exits_with_failure() {
    let file = source_file(CONFLICTING);
    let output = graphlp(&["solve", file.path().to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    let text = stdout(&output);
    assert!(text.contains("Status: INFEASIBLE"));
    assert!(text.contains("No feasible solution found."));
}

#[test]
fn check_reports_valid_file() {
    let file = source_file(PRODUCTION);
    let output = graphlp(&["check", file.path().to_str().unwrap()]);
    let text = stdout(&output);

    assert!(output.status.success());
    assert!(text.contains("is valid"));
    assert!(text.contains("objective: maximize"));
    assert!(text.contains("2 constraints"));
}

#[test]
fn check_rejects_unknown_variable() {
    let file = source_file("max x1 + x3\n");
    let output = graphlp(&["check", file.path().to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("has errors"));
}

#[test]
fn parse_outputs_ast_as_json() {
    let file = source_file(PRODUCTION);
    let output = graphlp(&["parse", file.path().to_str().unwrap(), "--format", "json"]);
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["items"].as_array().map(Vec::len), Some(3));
}

#[test]
fn missing_file_is_an_error() {
    let output = graphlp(&["solve", "does-not-exist.lp2"]);
    assert!(!output.status.success());
}

#[test]
fn form_skips_incomplete_rows() {
    let output = graphlp(&[
        "form",
        "--c1",
        "1",
        "--c2",
        "1",
        "--direction",
        "max",
        "--row",
        "1,1,<=,4",
        "--row",
        "1,0,<=,3",
        "--row",
        ",2,>=,1",
    ]);
    let text = stdout(&output);

    assert!(output.status.success());
    assert!(text.contains("(row 3 skipped: incomplete)"));
    assert!(text.contains("Optimum: x1=3.00, x2=1.00, Z=4.00"));
}

#[test]
fn form_rejects_unknown_direction() {
    let output = graphlp(&["form", "--c1", "1", "--c2", "1", "--direction", "best"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown direction"));
}
