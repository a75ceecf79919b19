//! Scripted in-memory gateway for tests
//!
//! Records every statement it receives and answers from canned responses
//! registered by the test. Role and warehouse switches are tracked so that
//! role-scoping behaviour can be asserted without a live account.

use crate::error::{DbError, DbResult};
use crate::row::QueryResult;
use crate::traits::{ConnectionContext, SqlGateway};
use async_trait::async_trait;
use na_core::sql_utils::{is_valid_quoted_identifier, unquote_identifier};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
enum Reply {
    Rows(QueryResult),
    Fail { code: i64, message: String },
}

#[derive(Debug)]
struct Scripted {
    pattern: String,
    reply: Reply,
    once: bool,
}

#[derive(Debug, Default)]
struct State {
    role: String,
    warehouse: Option<String>,
    statements: Vec<String>,
    responses: Vec<Scripted>,
}

/// A [`SqlGateway`] answering from canned responses.
///
/// Patterns are matched as substrings of the statement after lower-casing and
/// collapsing whitespace. The most recently registered matching response
/// wins. Statements nothing matches return an empty result.
#[derive(Debug)]
pub struct ScriptedGateway {
    state: Mutex<State>,
    context: ConnectionContext,
}

fn normalize(sql: &str) -> String {
    sql.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl ScriptedGateway {
    /// Create a gateway whose session starts with `role` active.
    pub fn new(role: &str) -> Self {
        Self {
            state: Mutex::new(State {
                role: role.to_string(),
                ..State::default()
            }),
            context: ConnectionContext {
                role: Some(role.to_string()),
                ..ConnectionContext::default()
            },
        }
    }

    /// Replace the connection defaults reported by
    /// [`SqlGateway::connection_context`].
    pub fn with_context(mut self, context: ConnectionContext) -> Self {
        if let Some(role) = &context.role {
            self.lock().role = role.clone();
        }
        self.lock().warehouse = context.warehouse.clone();
        self.context = context;
        self
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn register(&self, pattern: &str, reply: Reply, once: bool) -> &Self {
        self.lock().responses.push(Scripted {
            pattern: normalize(pattern),
            reply,
            once,
        });
        self
    }

    /// Answer every statement containing `pattern` with `result`.
    pub fn on(&self, pattern: &str, result: QueryResult) -> &Self {
        self.register(pattern, Reply::Rows(result), false)
    }

    /// Answer the next statement containing `pattern` with `result`.
    pub fn on_once(&self, pattern: &str, result: QueryResult) -> &Self {
        self.register(pattern, Reply::Rows(result), true)
    }

    /// Fail every statement containing `pattern` with a SQL error.
    pub fn fail_on(&self, pattern: &str, code: i64, message: &str) -> &Self {
        self.register(
            pattern,
            Reply::Fail {
                code,
                message: message.to_string(),
            },
            false,
        )
    }

    /// Every statement executed so far, in order
    pub fn statements(&self) -> Vec<String> {
        self.lock().statements.clone()
    }

    /// Number of executed statements containing `pattern`
    pub fn count(&self, pattern: &str) -> usize {
        let pattern = normalize(pattern);
        self.lock()
            .statements
            .iter()
            .filter(|s| normalize(s).contains(&pattern))
            .count()
    }

    /// Index of the first executed statement containing `pattern`
    pub fn position(&self, pattern: &str) -> Option<usize> {
        let pattern = normalize(pattern);
        self.lock()
            .statements
            .iter()
            .position(|s| normalize(s).contains(&pattern))
    }

    /// Role currently active in the scripted session
    pub fn current_role(&self) -> String {
        self.lock().role.clone()
    }

    /// Warehouse currently active in the scripted session
    pub fn current_warehouse(&self) -> Option<String> {
        self.lock().warehouse.clone()
    }
}

/// Name recorded for a `use` target: quoted identifiers lose their quotes,
/// unquoted names are kept as written so a restored role reads back
/// unchanged.
fn session_name(target: &str) -> String {
    let target = target.trim();
    if is_valid_quoted_identifier(target) {
        unquote_identifier(target)
    } else {
        target.to_string()
    }
}

fn reply(result: Reply) -> DbResult<QueryResult> {
    match result {
        Reply::Rows(rows) => Ok(rows),
        Reply::Fail { code, message } => Err(DbError::sql(Some(code), message)),
    }
}

#[async_trait]
impl SqlGateway for ScriptedGateway {
    async fn execute(&self, sql: &str) -> DbResult<QueryResult> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))?;
        let statement = sql.trim().to_string();
        log::debug!("[scripted] {}", statement);
        state.statements.push(statement.clone());

        let normalized = normalize(&statement);
        let scripted = state
            .responses
            .iter()
            .rposition(|r| normalized.contains(&r.pattern));
        if let Some(index) = scripted {
            let found = if state.responses[index].once {
                state.responses.remove(index).reply
            } else {
                state.responses[index].reply.clone()
            };
            return reply(found);
        }

        if normalized.starts_with("select current_role()") {
            let role = state.role.clone();
            return Ok(QueryResult::new(["CURRENT_ROLE()"], vec![vec![Some(role)]]));
        }
        if let Some(role) = statement
            .strip_prefix("use role ")
            .or_else(|| statement.strip_prefix("USE ROLE "))
        {
            state.role = session_name(role);
        } else if let Some(warehouse) = statement
            .strip_prefix("use warehouse ")
            .or_else(|| statement.strip_prefix("USE WAREHOUSE "))
        {
            state.warehouse = Some(session_name(warehouse));
        }
        Ok(QueryResult::empty())
    }

    fn connection_context(&self) -> ConnectionContext {
        self.context.clone()
    }

    fn db_type(&self) -> &'static str {
        "scripted"
    }
}
