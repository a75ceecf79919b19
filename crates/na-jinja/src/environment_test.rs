use super::*;
use std::fs;
use tempfile::TempDir;

fn project(files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    for (path, content) in files {
        let full = temp.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }
    temp
}

#[test]
fn test_render_package_name() {
    let temp = project(&[(
        "scripts/shared.sql",
        "grant usage on schema {{ package_name }}.shared to share in application package {{ package_name }};\n",
    )]);
    let env = ScriptEnvironment::new(temp.path());
    let sql = env
        .render_script("scripts/shared.sql", &ScriptContext::new("myapp_pkg"))
        .unwrap();
    assert_eq!(
        sql,
        "grant usage on schema myapp_pkg.shared to share in application package myapp_pkg;\n"
    );
}

#[test]
fn test_missing_script() {
    let temp = project(&[]);
    let env = ScriptEnvironment::new(temp.path());
    let err = env
        .render_script("scripts/missing.sql", &ScriptContext::new("p"))
        .unwrap_err();
    assert!(matches!(err, JinjaError::TemplateNotFound { .. }));
    assert_eq!(err.path(), "scripts/missing.sql");
}

#[test]
fn test_syntax_error() {
    let temp = project(&[("bad.sql", "select {{ package_name ;\n")]);
    let env = ScriptEnvironment::new(temp.path());
    let err = env
        .render_script("bad.sql", &ScriptContext::new("p"))
        .unwrap_err();
    assert!(matches!(err, JinjaError::Syntax { .. }));
}

#[test]
fn test_undefined_variable_is_strict() {
    let temp = project(&[("undef.sql", "select '{{ app_owner }}';\n")]);
    let env = ScriptEnvironment::new(temp.path());
    let err = env
        .render_script("undef.sql", &ScriptContext::new("p"))
        .unwrap_err();
    assert!(matches!(err, JinjaError::Undefined { .. }));
}

#[test]
fn test_plain_sql_passes_through() {
    let temp = project(&[("plain.sql", "create schema if not exists s;")]);
    let env = ScriptEnvironment::new(temp.path());
    let sql = env
        .render_script("plain.sql", &ScriptContext::new("p"))
        .unwrap();
    assert_eq!(sql, "create schema if not exists s;");
}
