use super::*;
use na_db::mock::ScriptedGateway;
use na_db::QueryResult;

fn context(database: Option<&str>, schema: Option<&str>) -> ConnectionContext {
    ConnectionContext {
        database: database.map(str::to_string),
        schema: schema.map(str::to_string),
        ..ConnectionContext::default()
    }
}

fn owner_row(owner: &str) -> Row {
    QueryResult::from_text_rows(&["name", "owner"], &[&["PKG", owner]])
        .rows
        .remove(0)
}

#[test]
fn test_fqn_three_parts_only_uppercased() {
    let ctx = context(None, None);
    assert_eq!(
        to_fully_qualified_name("db.s.obj", None, None, &ctx).unwrap(),
        "DB.S.OBJ"
    );
}

#[test]
fn test_fqn_two_parts_prefixed_with_database() {
    let ctx = context(Some("conn_db"), None);
    assert_eq!(
        to_fully_qualified_name("s.obj", None, None, &ctx).unwrap(),
        "CONN_DB.S.OBJ"
    );
    assert_eq!(
        to_fully_qualified_name("s.obj", Some("arg_db"), None, &ctx).unwrap(),
        "ARG_DB.S.OBJ"
    );
}

#[test]
fn test_fqn_one_part_schema_resolution() {
    assert_eq!(
        to_fully_qualified_name("obj", None, None, &context(Some("db"), None)).unwrap(),
        "DB.PUBLIC.OBJ"
    );
    assert_eq!(
        to_fully_qualified_name("obj", None, None, &context(Some("db"), Some("cs"))).unwrap(),
        "DB.CS.OBJ"
    );
    assert_eq!(
        to_fully_qualified_name("obj", None, Some("as"), &context(Some("db"), Some("cs")))
            .unwrap(),
        "DB.AS.OBJ"
    );
}

#[test]
fn test_fqn_is_idempotent() {
    let ctx = context(Some("db"), Some("s"));
    for name in ["obj", "s2.obj", "d.s.obj"] {
        let once = to_fully_qualified_name(name, None, None, &ctx).unwrap();
        let twice = to_fully_qualified_name(&once, None, None, &ctx).unwrap();
        assert_eq!(once, twice);
    }
}

#[test]
fn test_fqn_requires_database() {
    let ctx = context(None, Some("s"));
    assert!(matches!(
        to_fully_qualified_name("obj", None, None, &ctx),
        Err(ManagerError::DatabaseNotProvided)
    ));
}

#[test]
fn test_owner_check_ignores_case_and_quoting() {
    let row = owner_row("PKG_ADMIN");
    ensure_correct_owner(&row, "pkg_admin", "pkg").unwrap();
    ensure_correct_owner(&row, "PKG_ADMIN", "pkg").unwrap();
    ensure_correct_owner(&row, r#""PKG_ADMIN""#, "pkg").unwrap();
    ensure_correct_owner(&row, r#""pkg_admin""#, "pkg").unwrap();
}

#[test]
fn test_owner_mismatch() {
    let row = owner_row("ACCOUNTADMIN");
    match ensure_correct_owner(&row, "pkg_admin", "pkg") {
        Err(ManagerError::UnexpectedOwner {
            object,
            expected,
            actual,
        }) => {
            assert_eq!(object, "pkg");
            assert_eq!(expected, "pkg_admin");
            assert_eq!(actual, "ACCOUNTADMIN");
        }
        other => panic!("expected UnexpectedOwner, got {:?}", other),
    }
}

#[tokio::test]
async fn test_show_filters_exact_name() {
    let conn = ScriptedGateway::new("R");
    conn.on(
        "show application packages like",
        QueryResult::from_text_rows(&["name", "owner"], &[&["MY_PKGX", "R"]]),
    );
    let row = show_specific_object(&conn, "application packages", "my_pkg", "name", None, false)
        .await
        .unwrap();
    assert!(row.is_none());
    assert_eq!(
        conn.statements(),
        vec![r"show application packages like 'MY\\_PKG'"]
    );
}

#[tokio::test]
async fn test_show_returns_matching_row() {
    let conn = ScriptedGateway::new("R");
    conn.on(
        "show applications like",
        QueryResult::from_text_rows(&["name", "owner"], &[&["My App", "R"]]),
    );
    let row = show_specific_object(&conn, "applications", r#""My App""#, "name", None, false)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.get("owner").unwrap(), Some("R"));
}

#[tokio::test]
async fn test_show_qualified_name_builds_in_clause() {
    let conn = ScriptedGateway::new("R");
    show_specific_object(&conn, "stages", "pkg.app_src.stage", "name", None, false)
        .await
        .unwrap();
    assert_eq!(
        conn.statements(),
        vec!["show stages like 'STAGE' in schema pkg.app_src"]
    );
}

#[tokio::test]
async fn test_show_rejects_in_clause_with_qualified_name() {
    let conn = ScriptedGateway::new("R");
    let result = show_specific_object(
        &conn,
        "stages",
        "s.stage",
        "name",
        Some("in database d"),
        false,
    )
    .await;
    assert!(matches!(
        result,
        Err(ManagerError::InClauseWithQualifiedName { .. })
    ));
    assert!(conn.statements().is_empty());
}

#[tokio::test]
async fn test_show_multiple_rows_is_programming_error() {
    let conn = ScriptedGateway::new("R");
    conn.on(
        "show versions",
        QueryResult::from_text_rows(&["version"], &[&["V1"], &["V1"]]),
    );
    let result = show_specific_object(
        &conn,
        "versions",
        "v1",
        "version",
        Some("in application package p"),
        false,
    )
    .await;
    assert!(matches!(result, Err(ManagerError::Programming { .. })));
}

#[tokio::test]
async fn test_show_unknown_row_count_is_execution_error() {
    let conn = ScriptedGateway::new("R");
    conn.on(
        "show applications",
        QueryResult::empty().with_unknown_row_count(),
    );
    let result = show_specific_object(&conn, "applications", "a", "name", None, false).await;
    match result {
        Err(ManagerError::SqlExecution { query }) => {
            assert_eq!(query, "show applications like 'A'")
        }
        other => panic!("expected SqlExecution, got {:?}", other),
    }
}

#[tokio::test]
async fn test_show_check_schema_requires_context() {
    let conn = ScriptedGateway::new("R");
    let result = show_specific_object(&conn, "stages", "stage", "name", None, true).await;
    assert!(matches!(result, Err(ManagerError::DatabaseNotProvided)));

    let conn = ScriptedGateway::new("R").with_context(ConnectionContext {
        role: Some("R".to_string()),
        database: Some("db".to_string()),
        ..ConnectionContext::default()
    });
    let result = show_specific_object(&conn, "stages", "stage", "name", None, true).await;
    assert!(matches!(result, Err(ManagerError::SchemaNotProvided)));

    show_specific_object(&conn, "stages", "s.stage", "name", None, true)
        .await
        .unwrap();
}
