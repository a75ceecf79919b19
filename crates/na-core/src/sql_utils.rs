//! Snowflake identifier utilities
//!
//! Snowflake folds unquoted identifiers to upper case and preserves quoted
//! identifiers verbatim. Every name that ends up in generated SQL goes through
//! these helpers so that comparisons against `show ...` output (which always
//! reports the resolved, unquoted form) are consistent.

/// Maximum identifier length accepted by Snowflake.
const MAX_IDENTIFIER_LEN: usize = 255;

/// Check whether `identifier` is a valid unquoted identifier.
///
/// # Examples
/// ```
/// use na_core::sql_utils::is_valid_unquoted_identifier;
/// assert!(is_valid_unquoted_identifier("my_app$1"));
/// assert!(!is_valid_unquoted_identifier("1app"));
/// assert!(!is_valid_unquoted_identifier("my-app"));
/// ```
pub fn is_valid_unquoted_identifier(identifier: &str) -> bool {
    let mut chars = identifier.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    identifier.len() <= MAX_IDENTIFIER_LEN
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Check whether `identifier` is a valid double-quoted identifier.
///
/// Embedded double quotes must be escaped by doubling them.
pub fn is_valid_quoted_identifier(identifier: &str) -> bool {
    let Some(inner) = identifier
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return false;
    };
    if inner.chars().count() > MAX_IDENTIFIER_LEN {
        return false;
    }
    // Every quote inside must be part of a `""` pair.
    inner.replace("\"\"", "").find('"').is_none()
}

/// Check whether `identifier` is valid either quoted or unquoted.
pub fn is_valid_identifier(identifier: &str) -> bool {
    is_valid_unquoted_identifier(identifier) || is_valid_quoted_identifier(identifier)
}

/// Wrap `value` in double quotes, doubling any embedded quotes.
pub fn to_quoted_identifier(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Return `name` unchanged when it is already a valid identifier, otherwise
/// quote it.
///
/// # Examples
/// ```
/// use na_core::sql_utils::to_identifier;
/// assert_eq!(to_identifier("my_app"), "my_app");
/// assert_eq!(to_identifier("my app"), r#""my app""#);
/// assert_eq!(to_identifier(r#""Already Quoted""#), r#""Already Quoted""#);
/// ```
pub fn to_identifier(name: &str) -> String {
    if is_valid_identifier(name) {
        name.to_string()
    } else {
        to_quoted_identifier(name)
    }
}

/// Resolve an identifier to the form Snowflake reports in `show` output.
///
/// Unquoted identifiers are upper-cased; quoted identifiers lose their quotes
/// and have `""` collapsed to `"`. Anything else is returned as-is.
///
/// # Examples
/// ```
/// use na_core::sql_utils::unquote_identifier;
/// assert_eq!(unquote_identifier("my_role"), "MY_ROLE");
/// assert_eq!(unquote_identifier(r#""My ""Role""""#), r#"My "Role""#);
/// ```
pub fn unquote_identifier(identifier: &str) -> String {
    if is_valid_unquoted_identifier(identifier) {
        identifier.to_uppercase()
    } else if is_valid_quoted_identifier(identifier) {
        identifier[1..identifier.len() - 1].replace("\"\"", "\"")
    } else {
        identifier.to_string()
    }
}

/// Append `suffix` to an identifier, keeping quoted identifiers quoted.
pub fn append_to_identifier(identifier: &str, suffix: &str) -> String {
    if is_valid_quoted_identifier(identifier) {
        let inner = &identifier[1..identifier.len() - 1];
        format!("\"{}{}\"", inner, suffix.replace('"', "\"\""))
    } else {
        format!("{}{}", identifier, suffix)
    }
}

/// Drop every character that cannot appear in an unquoted identifier.
pub fn clean_identifier(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
        .collect()
}

/// Build the single-quoted pattern for a `show <objects> like` query that
/// matches exactly the given identifier.
///
/// `%` and `_` are wildcards in LIKE patterns and are escaped.
pub fn identifier_to_show_like_pattern(identifier: &str) -> String {
    let resolved = unquote_identifier(identifier)
        .replace('\\', "\\\\\\\\")
        .replace('%', "\\\\%")
        .replace('_', "\\\\_")
        .replace('\'', "''");
    format!("'{}'", resolved)
}

/// Quote `value` as a SQL string literal.
pub fn to_string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Split a possibly-qualified name into its dot-separated parts, ignoring
/// dots inside double-quoted identifiers.
///
/// # Examples
/// ```
/// use na_core::sql_utils::split_qualified_name;
/// assert_eq!(split_qualified_name("db.schema.obj"), vec!["db", "schema", "obj"]);
/// assert_eq!(split_qualified_name(r#"db."a.b".obj"#), vec!["db", r#""a.b""#, "obj"]);
/// ```
pub fn split_qualified_name(name: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in name.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '.' if !in_quotes => {
                parts.push(&name[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&name[start..]);
    parts
}

/// Components of a `[[database.]schema.]name` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualifiedName<'a> {
    /// Object name
    pub name: &'a str,
    /// Schema, when qualified
    pub schema: Option<&'a str>,
    /// Database, when fully qualified
    pub database: Option<&'a str>,
}

/// Parse a `[[database.]schema.]name` reference.
///
/// Names with more than three parts keep everything before the last two
/// separators as the database component.
pub fn from_qualified_name(name: &str) -> QualifiedName<'_> {
    let parts = split_qualified_name(name);
    match parts.as_slice() {
        [obj] => QualifiedName {
            name: *obj,
            schema: None,
            database: None,
        },
        [schema, obj] => QualifiedName {
            name: *obj,
            schema: Some(*schema),
            database: None,
        },
        _ => {
            let obj_start = name.len() - parts[parts.len() - 1].len();
            let schema_len = parts[parts.len() - 2].len();
            let database = &name[..obj_start - schema_len - 2];
            QualifiedName {
                name: parts[parts.len() - 1],
                schema: Some(parts[parts.len() - 2]),
                database: Some(database),
            }
        }
    }
}

/// Return the schema component of a qualified object name, if any.
///
/// # Examples
/// ```
/// use na_core::sql_utils::extract_schema;
/// assert_eq!(extract_schema("pkg.app_src.stage"), Some("app_src"));
/// assert_eq!(extract_schema("app_src.stage"), Some("app_src"));
/// assert_eq!(extract_schema("stage"), None);
/// ```
pub fn extract_schema(qualified_name: &str) -> Option<&str> {
    from_qualified_name(qualified_name).schema
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquoted_identifier_validity() {
        assert!(is_valid_unquoted_identifier("a"));
        assert!(is_valid_unquoted_identifier("_private"));
        assert!(is_valid_unquoted_identifier("app$v2"));
        assert!(!is_valid_unquoted_identifier(""));
        assert!(!is_valid_unquoted_identifier("$app"));
        assert!(!is_valid_unquoted_identifier("my.app"));
        assert!(!is_valid_unquoted_identifier(&"a".repeat(256)));
    }

    #[test]
    fn test_quoted_identifier_validity() {
        assert!(is_valid_quoted_identifier(r#""my app""#));
        assert!(is_valid_quoted_identifier(r#""say ""hi""""#));
        assert!(is_valid_quoted_identifier(r#""""#));
        assert!(!is_valid_quoted_identifier(r#""bad"quote""#));
        assert!(!is_valid_quoted_identifier(r#""unterminated"#));
        assert!(!is_valid_quoted_identifier("plain"));
    }

    #[test]
    fn test_to_identifier_quotes_embedded_quotes() {
        assert_eq!(to_identifier(r#"a"b"#), r#""a""b""#);
    }

    #[test]
    fn test_unquote_identifier_case_folding() {
        assert_eq!(unquote_identifier("Accountadmin"), "ACCOUNTADMIN");
        assert_eq!(unquote_identifier(r#""Accountadmin""#), "Accountadmin");
    }

    #[test]
    fn test_unquote_identifier_invalid_passthrough() {
        assert_eq!(unquote_identifier("not valid"), "not valid");
    }

    #[test]
    fn test_append_to_identifier() {
        assert_eq!(append_to_identifier("myapp", "_pkg_bob"), "myapp_pkg_bob");
        assert_eq!(
            append_to_identifier(r#""My App""#, "_pkg_bob"),
            r#""My App_pkg_bob""#
        );
    }

    #[test]
    fn test_clean_identifier() {
        assert_eq!(clean_identifier("jane.doe-42"), "janedoe42");
        assert_eq!(clean_identifier("svc_$user"), "svc_$user");
    }

    #[test]
    fn test_show_like_pattern_escapes_wildcards() {
        assert_eq!(identifier_to_show_like_pattern("my_app"), r"'MY\\_APP'");
        assert_eq!(identifier_to_show_like_pattern(r#""100%""#), r"'100\\%'");
        assert_eq!(identifier_to_show_like_pattern(r#""it's""#), "'it''s'");
    }

    #[test]
    fn test_to_string_literal() {
        assert_eq!(to_string_literal("plain"), "'plain'");
        assert_eq!(to_string_literal("it's"), r"'it\'s'");
        assert_eq!(to_string_literal(r"c:\dir"), r"'c:\\dir'");
    }

    #[test]
    fn test_from_qualified_name() {
        let q = from_qualified_name("db.sch.obj");
        assert_eq!(q.database, Some("db"));
        assert_eq!(q.schema, Some("sch"));
        assert_eq!(q.name, "obj");

        let q = from_qualified_name("sch.obj");
        assert_eq!(q.database, None);
        assert_eq!(q.schema, Some("sch"));

        let q = from_qualified_name(r#""my.db".sch."o.b""#);
        assert_eq!(q.database, Some(r#""my.db""#));
        assert_eq!(q.name, r#""o.b""#);
    }

    #[test]
    fn test_from_qualified_name_extra_parts() {
        let q = from_qualified_name("a.b.c.d");
        assert_eq!(q.database, Some("a.b"));
        assert_eq!(q.schema, Some("c"));
        assert_eq!(q.name, "d");
    }
}
