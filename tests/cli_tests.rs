use assert_cmd::Command;

fn stdout_lines(output: &std::process::Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_cli_exits_with_success_on_help() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_kvgraph"));
    cmd.arg("--help");
    cmd.assert().success();
}

#[test]
fn test_cli_runs_queries_in_order() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_kvgraph"));
    cmd.args([
        "g.addV('person').property('name','Alice').label()",
        "g.addV('person').property('name','Bob').label()",
        "g.V().has('name','Alice').count()",
        "g.V().count()",
    ]);
    let output = cmd.output().expect("run");
    assert!(output.status.success());
    assert_eq!(
        stdout_lines(&output),
        vec!["\"person\"", "\"person\"", "1", "2"]
    );
}

#[test]
fn test_cli_explain_prints_plan() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_kvgraph"));
    cmd.args(["--explain", "g.V().has('label','person').count()"]);
    let output = cmd.output().expect("run");
    assert!(output.status.success());
    assert_eq!(
        stdout_lines(&output),
        vec![r#"Graph() -> labelScan("person") -> count()"#]
    );

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_kvgraph"));
    cmd.args(["--no-optimize", "--explain", "g.V().has('label','person')"]);
    let output = cmd.output().expect("run");
    assert_eq!(
        stdout_lines(&output),
        vec![r#"Graph() -> V() -> has("label", "person")"#]
    );
}

#[test]
fn test_cli_persists_with_db_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("cli.db");
    let path = path.to_str().expect("utf8 path");

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_kvgraph"));
    cmd.args(["--db", path, "g.addV('person')", "g.addV('place')"]);
    cmd.assert().success();

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_kvgraph"));
    cmd.args(["--db", path, "g.V().count()"]);
    let output = cmd.output().expect("run");
    assert_eq!(stdout_lines(&output), vec!["2"]);

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_kvgraph"));
    cmd.args(["--db", path, "--bucket", "empty", "g.V().count()"]);
    let output = cmd.output().expect("run");
    assert_eq!(stdout_lines(&output), vec!["0"]);
}

#[test]
fn test_cli_query_error_exits_with_one() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_kvgraph"));
    cmd.args(["g.V().outV()"]);
    cmd.assert().code(1);
}

#[test]
fn test_cli_flag_errors_exit_with_two() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_kvgraph"));
    cmd.args(["--bogus", "g.V()"]);
    cmd.assert().code(2);

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_kvgraph"));
    cmd.assert().code(2);

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_kvgraph"));
    cmd.args(["--backend", "redis", "g.V()"]);
    cmd.assert().code(2);
}
