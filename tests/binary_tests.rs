//! Integration tests for the sql-review binary.

use std::io::Write;

use assert_cmd::{Command, cargo::cargo_bin_cmd};
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn cmd() -> Command {
    let mut cmd = cargo_bin_cmd!("sql-review");
    cmd.env_remove("SQL_REVIEW_CONFIG")
        .env_remove("SQL_REVIEW_ENGINE")
        .env_remove("SQL_REVIEW_DATABASE");
    cmd
}

fn sql_file(sql: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", sql).unwrap();
    file
}

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

#[test]
fn test_check_clean_input() {
    let sql = sql_file("SELECT id FROM users WHERE id = 1;");
    let config = config_file("");

    cmd()
        .args(["--no-color", "--config"])
        .arg(config.path())
        .arg("check")
        .arg(sql.path())
        .assert()
        .code(0)
        .stdout(predicate::str::contains("No issues found"));
}

#[test]
fn test_check_reports_errors() {
    let sql = sql_file("INSERT INTO t VALUES (1);\nDELETE FROM t;");
    let config = config_file("");

    cmd()
        .args(["--no-color", "--config"])
        .arg(config.path())
        .arg("check")
        .arg(sql.path())
        .assert()
        .code(2)
        .stdout(predicate::str::contains(
            "[ERROR] statement.insert.must-specify-column (code 1107) line 1"
        ))
        .stdout(predicate::str::contains("\"DELETE FROM t;\" requires WHERE clause"));
}

#[test]
fn test_check_single_rule_as_warning() {
    let sql = sql_file("SELECT * FROM t;");

    cmd()
        .args(["--no-color", "check"])
        .arg(sql.path())
        .args(["--rule", "statement.select.no-select-all", "--level", "warning"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[WARN]"));
}

#[test]
fn test_check_reads_stdin() {
    cmd()
        .args(["--no-color", "check", "-", "--rule", "statement.where.require"])
        .write_stdin("UPDATE t SET a = 1;")
        .assert()
        .code(2);
}

#[test]
fn test_check_json_output() {
    let sql = sql_file("SELECT * FROM t;");

    cmd()
        .args(["-f", "json", "check"])
        .arg(sql.path())
        .args(["--rule", "statement.select.no-select-all", "--level", "error"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("\"code\": 203"))
        .stdout(predicate::str::contains("\"status\": \"ERROR\""));
}

#[test]
fn test_check_syntax_error_fails() {
    let sql = sql_file("SELECT * FROM;");

    cmd()
        .arg("check")
        .arg(sql.path())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_check_unsupported_rule_fails() {
    let sql = sql_file("COMMIT;");

    cmd()
        .args(["check", "--engine", "postgres", "--rule", "statement.disallow-commit"])
        .arg(sql.path())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_check_unknown_rule_is_usage_error() {
    let sql = sql_file("SELECT 1;");

    cmd()
        .args(["check", "--rule", "statement.nope"])
        .arg(sql.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown rule type"));
}

#[test]
fn test_check_file_not_found() {
    cmd()
        .args(["check", "/nonexistent/migration.sql"])
        .assert()
        .code(3);
}

#[test]
fn test_resources_with_database() {
    let sql = sql_file("SELECT * FROM t1 JOIN db2.t2 ON t1.c1 = t2.c1;");

    cmd()
        .arg("resources")
        .arg(sql.path())
        .args(["--database", "app"])
        .assert()
        .success()
        .stdout("app.t1\ndb2.t2\n");
}

#[test]
fn test_resources_database_from_env() {
    let sql = sql_file("SELECT * FROM t1;");

    cmd()
        .env("SQL_REVIEW_DATABASE", "ops")
        .arg("resources")
        .arg(sql.path())
        .assert()
        .success()
        .stdout("ops.t1\n");
}

#[test]
fn test_validate_accepts_selects() {
    let sql = sql_file("SELECT 1;\nEXPLAIN SELECT * FROM t;");

    cmd()
        .args(["--no-color", "validate"])
        .arg(sql.path())
        .assert()
        .code(0)
        .stdout(predicate::str::contains("OK 2 statement(s) are read-only"));
}

#[test]
fn test_validate_rejects_writes() {
    let sql = sql_file("SELECT 1;\nUPDATE t SET a = 1;");

    cmd()
        .args(["--no-color", "validate"])
        .arg(sql.path())
        .assert()
        .code(2)
        .stdout(predicate::str::contains("REJECTED"))
        .stdout(predicate::str::contains("line 2"));
}

#[test]
fn test_rust_log_sets_log_level() {
    let sql = sql_file("UPDATE t SET a = 1;");

    cmd()
        .env("RUST_LOG", "debug")
        .args(["--no-color", "validate"])
        .arg(sql.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("statement rejected"));
}

#[test]
fn test_default_log_level_hides_debug() {
    let sql = sql_file("UPDATE t SET a = 1;");

    cmd()
        .env_remove("RUST_LOG")
        .args(["--no-color", "validate"])
        .arg(sql.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("statement rejected").not());
}

#[test]
fn test_rules_lists_catalog() {
    cmd()
        .args(["--no-color", "rules", "--engine", "mysql"])
        .assert()
        .success()
        .stdout(predicate::str::contains("statement.disallow-commit"))
        .stdout(predicate::str::contains("naming.table"));
}

#[test]
fn test_engine_from_config_file() {
    let sql = sql_file("SELECT id FROM users WHERE name ILIKE '%a';");
    let config = config_file(
        "engine = \"postgres\"\n\n[[rules]]\ntype = \"statement.where.no-leading-wildcard-like\"\nlevel = \"error\"\n"
    );

    cmd()
        .args(["--no-color", "--config"])
        .arg(config.path())
        .arg("check")
        .arg(sql.path())
        .assert()
        .code(2)
        .stdout(predicate::str::contains("uses leading wildcard LIKE"));
}

#[test]
fn test_help() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("validate"));
}
