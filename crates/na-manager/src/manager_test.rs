use super::*;
use crate::test_utils::{identity, write_files, Level, RecordingConsole};
use na_db::mock::ScriptedGateway;
use na_db::QueryResult;
use tempfile::TempDir;

const HELLO_MD5: &str = "b1946ac92492d2347c6235b4d2611184";

fn package_row(owner: &str, comment: &str) -> QueryResult {
    QueryResult::from_text_rows(
        &["created_on", "name", "owner", "comment", "distribution"],
        &[&["2024-01-01", "MYAPP_PKG", owner, comment, "INTERNAL"]],
    )
}

fn describe(distribution: &str) -> QueryResult {
    QueryResult::from_text_rows(
        &["property", "value"],
        &[
            &["name", "MYAPP_PKG"],
            &["distribution", distribution],
            &["owner", "PKG_ROLE"],
        ],
    )
}

#[tokio::test]
async fn test_missing_package_is_created_without_describe() {
    let temp = TempDir::new().unwrap();
    let id = identity(temp.path());
    let conn = ScriptedGateway::new("pkg_role");
    let console = RecordingConsole::default();
    let manager = NativeAppManager::new(&conn, &console, &id);

    manager.create_app_package().await.unwrap();

    assert_eq!(conn.count("create application package"), 1);
    assert_eq!(conn.count("describe"), 0);
    let create = conn
        .statements()
        .into_iter()
        .find(|s| s.starts_with("create application package"))
        .unwrap();
    assert_eq!(
        create,
        "create application package myapp_pkg\n    comment = GENERATED_BY_SNOWFLAKECLI\n    distribution = internal"
    );
    assert_eq!(
        console.at(Level::Step),
        vec!["Creating new application package myapp_pkg in account."]
    );
}

#[tokio::test]
async fn test_package_owned_by_other_role_fails_before_describe() {
    let temp = TempDir::new().unwrap();
    let id = identity(temp.path());
    let conn = ScriptedGateway::new("pkg_role");
    conn.on(
        "show application packages",
        package_row("ACCOUNTADMIN", "GENERATED_BY_SNOWFLAKECLI"),
    );
    let console = RecordingConsole::default();
    let manager = NativeAppManager::new(&conn, &console, &id);

    let result = manager.create_app_package().await;
    assert!(matches!(result, Err(ManagerError::UnexpectedOwner { .. })));
    assert_eq!(conn.count("describe"), 0);
    assert_eq!(conn.count("create application package"), 0);
}

#[tokio::test]
async fn test_internal_package_without_marker_is_rejected() {
    let temp = TempDir::new().unwrap();
    let id = identity(temp.path());
    let conn = ScriptedGateway::new("pkg_role");
    conn.on(
        "show application packages",
        package_row("PKG_ROLE", "someone else's package"),
    );
    conn.on("describe application package", describe("INTERNAL"));
    let console = RecordingConsole::default();
    let manager = NativeAppManager::new(&conn, &console, &id);

    match manager.create_app_package().await {
        Err(ManagerError::ApplicationPackageAlreadyExists { name }) => {
            assert_eq!(name, "myapp_pkg")
        }
        other => panic!("expected ApplicationPackageAlreadyExists, got {:?}", other),
    }
}

#[tokio::test]
async fn test_internal_package_with_marker_is_left_alone() {
    let temp = TempDir::new().unwrap();
    let id = identity(temp.path());
    for marker in ["GENERATED_BY_SNOWFLAKECLI", "GENERATED_BY_SNOWCLI"] {
        let conn = ScriptedGateway::new("pkg_role");
        conn.on("show application packages", package_row("PKG_ROLE", marker));
        conn.on("describe application package", describe("INTERNAL"));
        let console = RecordingConsole::default();
        let manager = NativeAppManager::new(&conn, &console, &id);

        manager.create_app_package().await.unwrap();
        assert_eq!(conn.count("create "), 0);
        assert_eq!(conn.count("alter "), 0);
        assert!(console.warnings().is_empty());
    }
}

#[tokio::test]
async fn test_distribution_mismatch_warns_and_continues() {
    let temp = TempDir::new().unwrap();
    let id = identity(temp.path());
    let conn = ScriptedGateway::new("pkg_role");
    conn.on("show application packages", package_row("PKG_ROLE", "not ours"));
    conn.on("describe application package", describe("EXTERNAL"));
    let console = RecordingConsole::default();
    let manager = NativeAppManager::new(&conn, &console, &id);

    // External packages skip the marker check
    manager.create_app_package().await.unwrap();
    let warnings = console.warnings();
    assert_eq!(warnings.len(), 2);
    assert!(warnings[0].contains("has distribution property external"));
    assert!(warnings[0].contains("project definition file: internal."));
    assert!(warnings[1].contains("with distribution 'external'"));
}

#[tokio::test]
async fn test_distribution_lookup() {
    let temp = TempDir::new().unwrap();
    let id = identity(temp.path());
    let console = RecordingConsole::default();

    let conn = ScriptedGateway::new("pkg_role");
    conn.on("describe application package", describe("EXTERNAL"));
    let manager = NativeAppManager::new(&conn, &console, &id);
    assert_eq!(
        manager.get_app_pkg_distribution_in_snowflake().await.unwrap(),
        "external"
    );
    assert_eq!(
        conn.statements(),
        vec!["select current_role()", "describe application package myapp_pkg"]
    );

    let conn = ScriptedGateway::new("pkg_role");
    let manager = NativeAppManager::new(&conn, &console, &id);
    assert!(matches!(
        manager.get_app_pkg_distribution_in_snowflake().await,
        Err(ManagerError::SqlExecution { .. })
    ));

    let conn = ScriptedGateway::new("pkg_role");
    conn.on(
        "describe application package",
        QueryResult::from_text_rows(&["property", "value"], &[&["name", "MYAPP_PKG"]]),
    );
    let manager = NativeAppManager::new(&conn, &console, &id);
    match manager.get_app_pkg_distribution_in_snowflake().await {
        Err(ManagerError::Programming { message }) => {
            assert!(message.contains("'describe application package myapp_pkg'"))
        }
        other => panic!("expected Programming, got {:?}", other),
    }
}

#[tokio::test]
async fn test_verify_distribution_queries_when_not_given() {
    let temp = TempDir::new().unwrap();
    let id = identity(temp.path());
    let conn = ScriptedGateway::new("pkg_role");
    conn.on("describe application package", describe("INTERNAL"));
    let console = RecordingConsole::default();
    let manager = NativeAppManager::new(&conn, &console, &id);

    assert!(manager.verify_project_distribution(None).await.unwrap());
    assert_eq!(conn.count("describe"), 1);
    assert!(manager
        .verify_project_distribution(Some("internal"))
        .await
        .unwrap());
    assert!(!manager
        .verify_project_distribution(Some("external"))
        .await
        .unwrap());
    assert_eq!(conn.count("describe"), 1);
}

#[tokio::test]
async fn test_describe_failure_is_classified() {
    let temp = TempDir::new().unwrap();
    let id = identity(temp.path());
    let conn = ScriptedGateway::new("pkg_role");
    conn.fail_on(
        "describe application package",
        2043,
        "Object does not exist, or operation cannot be performed.",
    );
    let console = RecordingConsole::default();
    let manager = NativeAppManager::new(&conn, &console, &id);

    match manager.get_app_pkg_distribution_in_snowflake().await {
        Err(ManagerError::Db(err)) => {
            assert_eq!(err.code(), Some(2043));
            assert!(err.message().contains("pkg_role"));
        }
        other => panic!("expected Db error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_script_render_failure_executes_nothing() {
    let temp = TempDir::new().unwrap();
    write_files(
        temp.path(),
        &[
            ("scripts/one.sql", "create schema if not exists {{ package_name }}.one;\n"),
            ("scripts/two.sql", "select {{ no_such_variable }};\n"),
            ("scripts/three.sql", "create schema if not exists {{ package_name }}.three;\n"),
        ],
    );
    let mut id = identity(temp.path());
    id.package_scripts = vec![
        "scripts/one.sql".to_string(),
        "scripts/two.sql".to_string(),
        "scripts/three.sql".to_string(),
    ];
    let conn = ScriptedGateway::new("pkg_role");
    let console = RecordingConsole::default();
    let manager = NativeAppManager::new(&conn, &console, &id);

    let result = manager.apply_package_scripts().await;
    match result {
        Err(ManagerError::InvalidPackageScript { path, .. }) => {
            assert_eq!(path, "scripts/two.sql")
        }
        other => panic!("expected InvalidPackageScript, got {:?}", other),
    }
    assert!(conn.statements().is_empty());
    assert!(console.at(Level::Step).is_empty());
}

#[tokio::test]
async fn test_missing_script_is_reported() {
    let temp = TempDir::new().unwrap();
    let mut id = identity(temp.path());
    id.package_scripts = vec!["scripts/missing.sql".to_string()];
    let conn = ScriptedGateway::new("pkg_role");
    let console = RecordingConsole::default();
    let manager = NativeAppManager::new(&conn, &console, &id);

    assert!(matches!(
        manager.apply_package_scripts().await,
        Err(ManagerError::MissingPackageScript { .. })
    ));
    assert!(conn.statements().is_empty());
}

#[tokio::test]
async fn test_scripts_run_in_order_under_package_role() {
    let temp = TempDir::new().unwrap();
    write_files(
        temp.path(),
        &[
            ("scripts/one.sql", "create schema if not exists {{ package_name }}.one;\ncreate schema if not exists {{ package_name }}.two;\n"),
            ("scripts/two.sql", "grant usage on schema {{ package_name }}.one to share in application package {{ package_name }};\n"),
        ],
    );
    let mut id = identity(temp.path());
    id.package_scripts = vec!["scripts/one.sql".to_string(), "scripts/two.sql".to_string()];
    let conn = ScriptedGateway::new("accountadmin");
    let console = RecordingConsole::default();
    let manager = NativeAppManager::new(&conn, &console, &id);

    manager.apply_package_scripts().await.unwrap();

    assert_eq!(
        conn.statements(),
        vec![
            "select current_role()",
            "use role pkg_role",
            "use warehouse pkg_wh",
            "create schema if not exists myapp_pkg.one",
            "create schema if not exists myapp_pkg.two",
            "grant usage on schema myapp_pkg.one to share in application package myapp_pkg",
            "use role accountadmin",
        ]
    );
    assert_eq!(
        console.at(Level::Step),
        vec![
            "Applying package script: scripts/one.sql",
            "Applying package script: scripts/two.sql",
        ]
    );
    assert_eq!(conn.current_role(), "accountadmin");
}

#[tokio::test]
async fn test_script_failure_is_classified_with_warehouse() {
    let temp = TempDir::new().unwrap();
    write_files(temp.path(), &[("scripts/one.sql", "select 1;\n")]);
    let mut id = identity(temp.path());
    id.package_scripts = vec!["scripts/one.sql".to_string()];
    let conn = ScriptedGateway::new("pkg_role");
    conn.fail_on(
        "select 1",
        606,
        "No active warehouse selected in the current session.",
    );
    let console = RecordingConsole::default();
    let manager = NativeAppManager::new(&conn, &console, &id);

    match manager.apply_package_scripts().await {
        Err(ManagerError::Db(err)) => {
            assert_eq!(err.code(), Some(606));
            assert!(err.message().contains("Please provide a warehouse"));
        }
        other => panic!("expected Db error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_deploy_fresh_project() {
    let temp = TempDir::new().unwrap();
    write_files(
        temp.path(),
        &[
            ("scripts/one.sql", "create schema if not exists {{ package_name }}.shared;\n"),
            ("scripts/two.sql", "grant usage on schema {{ package_name }}.shared to share in application package {{ package_name }};\n"),
            ("output/deploy/manifest.yml", "manifest_version: 1\n"),
            ("output/deploy/setup.sql", "create application role app_public;\n"),
            ("output/deploy/ui/main.py", "print('hi')\n"),
        ],
    );
    let mut id = identity(temp.path());
    id.package_scripts = vec!["scripts/one.sql".to_string(), "scripts/two.sql".to_string()];
    let conn = ScriptedGateway::new("pkg_role");
    let console = RecordingConsole::default();
    let manager = NativeAppManager::new(&conn, &console, &id);

    let diff = manager.deploy().await.unwrap();

    assert_eq!(diff.added.len(), 3);
    assert_eq!(conn.count("create application package"), 1);
    assert_eq!(conn.count("put "), 3);
    let first = conn
        .position("create schema if not exists myapp_pkg.shared")
        .unwrap();
    let second = conn.position("grant usage on schema myapp_pkg.shared").unwrap();
    let stage = conn.position("create stage if not exists myapp_pkg.app_src.stage").unwrap();
    let create = conn.position("create application package").unwrap();
    assert!(create < first);
    assert!(first < second);
    assert!(second < stage);
    assert_eq!(conn.count("create schema if not exists myapp_pkg.app_src"), 1);
    assert_eq!(conn.current_role(), "pkg_role");
    assert_eq!(conn.count("use role"), 0);
}

#[tokio::test]
async fn test_deploy_up_to_date_external_package() {
    let temp = TempDir::new().unwrap();
    write_files(temp.path(), &[("output/deploy/manifest.yml", "hello\n")]);
    let mut id = identity(temp.path());
    id.package_distribution = Distribution::External;
    let conn = ScriptedGateway::new("pkg_role");
    conn.on("show application packages", package_row("PKG_ROLE", "not ours"));
    conn.on("describe application package", describe("EXTERNAL"));
    conn.on(
        "ls @",
        QueryResult::from_text_rows(
            &["name", "size", "md5", "last_modified"],
            &[&["stage/manifest.yml", "6", HELLO_MD5, "x"]],
        ),
    );
    let console = RecordingConsole::default();
    let manager = NativeAppManager::new(&conn, &console, &id);

    let diff = manager.deploy().await.unwrap();

    assert!(!diff.has_changes());
    assert_eq!(diff.identical, vec!["manifest.yml"]);
    assert_eq!(conn.count("create application package"), 0);
    assert_eq!(conn.count("put "), 0);
    assert_eq!(conn.count("remove "), 0);
    assert!(console.warnings().is_empty());
    assert_eq!(console.at(Level::Message), vec![diff.to_string()]);
}

#[tokio::test]
async fn test_missing_deploy_root_fails_sync() {
    let temp = TempDir::new().unwrap();
    let id = identity(temp.path());
    let conn = ScriptedGateway::new("pkg_role");
    let console = RecordingConsole::default();
    let manager = NativeAppManager::new(&conn, &console, &id);

    let result = manager.sync_deploy_root_with_stage("pkg_role").await;
    assert!(matches!(
        result,
        Err(ManagerError::Stage(na_stage::StageError::DeployRootNotFound { .. }))
    ));
    assert_eq!(conn.count("create stage if not exists"), 1);
}
