use pretty_assertions::assert_eq;
use sql_review::{
    ast::StatementKind,
    error::ReviewError,
    parser::{Engine, parse},
    validate::validate_read_only
};

fn validate(engine: Engine, sql: &str) -> Result<(), ReviewError> {
    validate_read_only(&parse(engine, sql).unwrap())
}

#[test]
fn test_selects_are_accepted() {
    for engine in Engine::ALL {
        assert!(validate(engine, "SELECT * FROM t1; SELECT a FROM t2 WHERE b = 1;").is_ok());
    }
}

#[test]
fn test_explain_select_is_accepted() {
    assert!(validate(Engine::MySql, "EXPLAIN SELECT * FROM t1;").is_ok());
    assert!(validate(Engine::Postgres, "EXPLAIN SELECT * FROM t1;").is_ok());
}

#[test]
fn test_create_is_rejected() {
    let err = validate(Engine::MySql, "SELECT 1;\nCREATE TABLE t (id INT);").unwrap_err();
    assert_eq!(err, ReviewError::Disallowed {
        kind: StatementKind::CreateTable,
        line: 2
    });
}

#[test]
fn test_update_is_rejected() {
    let err = validate(Engine::Postgres, "UPDATE t SET a = 1 WHERE id = 1;").unwrap_err();
    assert_eq!(err, ReviewError::Disallowed {
        kind: StatementKind::Update,
        line: 1
    });
}

#[test]
fn test_explain_format_json_delete_is_rejected() {
    let err = validate(Engine::MySql, "EXPLAIN FORMAT=JSON DELETE FROM t1 WHERE c1 = 1").unwrap_err();
    assert_eq!(err, ReviewError::Disallowed {
        kind: StatementKind::Delete,
        line: 1
    });
}

#[test]
fn test_first_offending_statement_wins() {
    let err = validate(
        Engine::MySql,
        "SELECT 1;\nINSERT INTO t (a) VALUES (1);\nDROP TABLE t;"
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ReviewError::Disallowed {
            kind: StatementKind::Insert,
            line: 2
        }
    ));
}

#[test]
fn test_empty_input_is_accepted() {
    assert!(validate(Engine::Postgres, "-- nothing to run\n").is_ok());
}

#[test]
fn test_explain_format_json_delete_literal() {
    let err = validate(Engine::MySql, "EXPLAIN FORMAT=JSON DELETE FROM t1;").unwrap_err();
    assert_eq!(err, ReviewError::Disallowed {
        kind: StatementKind::Delete,
        line: 1
    });
}

#[test]
fn test_show_statements_are_accepted() {
    assert!(validate(Engine::Postgres, "SHOW search_path;").is_ok());
    assert!(validate(Engine::MySql, "SHOW STATUS;\nSHOW COLLATION;").is_ok());
}

#[test]
fn test_procedure_definition_is_rejected() {
    let err = validate(
        Engine::MySql,
        "SELECT 1;\nCREATE PROCEDURE p()\nBEGIN\n  SELECT 1;\nEND;"
    )
    .unwrap_err();
    assert_eq!(err, ReviewError::Disallowed {
        kind: StatementKind::CreateRoutine,
        line: 2
    });
}
