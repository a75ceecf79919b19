//! Object naming, lookup and ownership checks

use crate::constants::OWNER_COL;
use crate::error::{ManagerError, ManagerResult};
use na_core::sql_utils::{
    from_qualified_name, identifier_to_show_like_pattern, split_qualified_name, unquote_identifier,
};
use na_db::{ConnectionContext, Row, SqlGateway};

/// Qualify `name` as `DATABASE.SCHEMA.NAME`, upper-cased.
///
/// Three-part names are only upper-cased. Otherwise the database comes
/// from `database`, then the connection. One-part names also take a schema
/// from `schema`, then the connection, then `public`.
pub fn to_fully_qualified_name(
    name: &str,
    database: Option<&str>,
    schema: Option<&str>,
    context: &ConnectionContext,
) -> ManagerResult<String> {
    let parts = split_qualified_name(name);
    if parts.len() == 3 {
        return Ok(name.to_uppercase());
    }

    let database = database
        .or(context.database.as_deref())
        .ok_or(ManagerError::DatabaseNotProvided)?;
    if parts.len() == 2 {
        return Ok(format!("{}.{}", database, name).to_uppercase());
    }

    let schema = schema.or(context.schema.as_deref()).unwrap_or("public");
    Ok(format!("{}.{}.{}", database, schema, name).to_uppercase())
}

/// Fail unless `row`'s owner is `role`.
///
/// Both sides are compared in resolved, case-folded form, so quoting and
/// case differences in `role` do not matter.
pub fn ensure_correct_owner(row: &Row, role: &str, object_name: &str) -> ManagerResult<()> {
    let actual = row.text(OWNER_COL)?.to_uppercase();
    if actual != unquote_identifier(role).to_uppercase() {
        return Err(ManagerError::UnexpectedOwner {
            object: object_name.to_string(),
            expected: role.to_string(),
            actual,
        });
    }
    Ok(())
}

/// Unqualified name plus the `in schema ...` clause implied by its
/// qualification.
fn qualified_name_to_in_clause(name: &str) -> (&str, Option<String>) {
    let qualified = from_qualified_name(name);
    let in_clause = match (qualified.database, qualified.schema) {
        (Some(database), Some(schema)) => Some(format!("in schema {}.{}", database, schema)),
        (None, Some(schema)) => Some(format!("in schema {}", schema)),
        _ => None,
    };
    (qualified.name, in_clause)
}

fn check_database_and_schema(name: &str, context: &ConnectionContext) -> ManagerResult<()> {
    let qualified = from_qualified_name(name);
    if qualified.database.or(context.database.as_deref()).is_none() {
        return Err(ManagerError::DatabaseNotProvided);
    }
    if qualified.schema.or(context.schema.as_deref()).is_none() {
        return Err(ManagerError::SchemaNotProvided);
    }
    Ok(())
}

/// Look up a single object with `show <object_type_plural> like ...`.
///
/// The query must come back with at most one row; more means the caller
/// scoped it too loosely. Because `like` is a pattern match, the row is only
/// returned when its `name_col` equals the resolved name exactly.
pub async fn show_specific_object(
    conn: &dyn SqlGateway,
    object_type_plural: &str,
    name: &str,
    name_col: &str,
    in_clause: Option<&str>,
    check_schema: bool,
) -> ManagerResult<Option<Row>> {
    let (unqualified, name_in_clause) = qualified_name_to_in_clause(name);
    let in_clause = match (in_clause.filter(|c| !c.is_empty()), name_in_clause) {
        (Some(_), Some(_)) => {
            return Err(ManagerError::InClauseWithQualifiedName {
                name: name.to_string(),
            })
        }
        (Some(clause), None) => clause.to_string(),
        (None, Some(clause)) => clause,
        (None, None) => String::new(),
    };
    let query = format!(
        "show {} like {} {}",
        object_type_plural,
        identifier_to_show_like_pattern(unqualified),
        in_clause
    )
    .trim()
    .to_string();

    if check_schema {
        check_database_and_schema(name, &conn.connection_context())?;
    }
    let result = conn.execute(&query).await?;

    match result.row_count {
        None => return Err(ManagerError::SqlExecution { query }),
        Some(count) if count > 1 => {
            return Err(ManagerError::Programming {
                message: format!(
                    "Received multiple rows from result of SQL statement: {}. \
                     Usage of 'show_specific_object' may not be properly scoped.",
                    query
                ),
            })
        }
        Some(_) => {}
    }

    let wanted = unquote_identifier(unqualified);
    for row in result.rows {
        if row.get(name_col)? == Some(wanted.as_str()) {
            return Ok(Some(row));
        }
    }
    Ok(None)
}

#[cfg(test)]
#[path = "objects_test.rs"]
mod tests;
