//! Snowflake backend over the SQL API (v2)
//!
//! The SQL API is stateless per request, so the session's role, warehouse,
//! database and schema are tracked client-side and sent with every
//! statement. `use ...` statements are forwarded for validation and, once
//! they succeed, update the tracked session.

use crate::error::{DbError, DbResult};
use crate::row::QueryResult;
use crate::traits::{ConnectionContext, SqlGateway};
use async_trait::async_trait;
use na_core::sql_utils::unquote_identifier;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Mutex;
use std::time::Duration;

const STATEMENTS_PATH: &str = "/api/v2/statements";
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Reported when a `put` or `get` reaches the SQL API
const FILE_TRANSFER_UNSUPPORTED: &str =
    "PUT/GET file transfer. The SQL API cannot upload local files, so stage \
     changes must be uploaded with a Snowflake driver or SnowSQL before rerunning";

/// Connection settings for [`SnowflakeBackend`]
#[derive(Debug, Clone, Default)]
pub struct SnowflakeConfig {
    /// Account identifier, e.g. `myorg-myaccount`
    pub account: String,
    /// Host override; defaults to `<account>.snowflakecomputing.com`
    pub host: Option<String>,
    /// OAuth or key-pair JWT token
    pub token: String,
    /// Value for the `X-Snowflake-Authorization-Token-Type` header
    pub token_type: Option<String>,
    /// Initial role
    pub role: Option<String>,
    /// Initial warehouse
    pub warehouse: Option<String>,
    /// Initial database
    pub database: Option<String>,
    /// Initial schema
    pub schema: Option<String>,
    /// Per-statement timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl SnowflakeConfig {
    fn base_url(&self) -> String {
        match &self.host {
            Some(host) if host.starts_with("http://") || host.starts_with("https://") => {
                host.trim_end_matches('/').to_string()
            }
            Some(host) => format!("https://{}", host.trim_end_matches('/')),
            None => format!("https://{}.snowflakecomputing.com", self.account),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RowType {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartitionInfo {
    #[serde(default)]
    row_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultSetMetaData {
    #[serde(default)]
    num_rows: Option<usize>,
    #[serde(default)]
    row_type: Vec<RowType>,
    #[serde(default)]
    partition_info: Vec<PartitionInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatementResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    statement_handle: Option<String>,
    #[serde(default)]
    result_set_meta_data: Option<ResultSetMetaData>,
    #[serde(default)]
    data: Vec<Vec<Option<String>>>,
}

/// Snowflake SQL API backend
pub struct SnowflakeBackend {
    client: reqwest::Client,
    config: SnowflakeConfig,
    session: Mutex<ConnectionContext>,
}

impl SnowflakeBackend {
    /// Create a backend from connection settings
    pub fn new(config: SnowflakeConfig) -> DbResult<Self> {
        if config.account.is_empty() && config.host.is_none() {
            return Err(DbError::ConnectionError(
                "a Snowflake account or host is required".to_string(),
            ));
        }
        if config.token.is_empty() {
            return Err(DbError::ConnectionError(
                "a Snowflake access token is required".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .user_agent(concat!("napp/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let session = ConnectionContext {
            role: config.role.clone(),
            warehouse: config.warehouse.clone(),
            database: config.database.clone(),
            schema: config.schema.clone(),
        };
        Ok(Self {
            client,
            config,
            session: Mutex::new(session),
        })
    }

    fn session(&self) -> DbResult<ConnectionContext> {
        self.session
            .lock()
            .map(|s| s.clone())
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .bearer_auth(&self.config.token)
            .header(
                "X-Snowflake-Authorization-Token-Type",
                self.config.token_type.as_deref().unwrap_or("OAUTH"),
            )
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn submit(&self, sql: &str) -> DbResult<StatementResponse> {
        let session = self.session()?;
        let url = format!(
            "{}{}?requestId={}",
            self.config.base_url(),
            STATEMENTS_PATH,
            uuid::Uuid::new_v4()
        );
        let mut body = json!({ "statement": sql });
        if let Some(timeout) = self.config.timeout_secs {
            body["timeout"] = json!(timeout);
        }
        for (key, value) in [
            ("role", &session.role),
            ("warehouse", &session.warehouse),
            ("database", &session.database),
            ("schema", &session.schema),
        ] {
            if let Some(value) = value {
                body[key] = Value::String(value.clone());
            }
        }

        let response = self
            .request(self.client.post(&url))
            .json(&body)
            .send()
            .await?;
        let mut status = response.status();
        let mut parsed = parse_response(response).await?;

        while status == reqwest::StatusCode::ACCEPTED {
            let handle = parsed.statement_handle.clone().ok_or_else(|| {
                DbError::UnexpectedResult {
                    query: sql.to_string(),
                    reason: "statement accepted without a handle".to_string(),
                }
            })?;
            tokio::time::sleep(POLL_INTERVAL).await;
            let response = self
                .request(self.client.get(self.status_url(&handle)))
                .send()
                .await?;
            status = response.status();
            parsed = parse_response(response).await?;
        }

        if status.is_success() {
            return Ok(parsed);
        }
        let message = parsed
            .message
            .clone()
            .unwrap_or_else(|| format!("HTTP {}", status));
        if status == reqwest::StatusCode::UNPROCESSABLE_ENTITY {
            let code = parsed.code.as_deref().and_then(|c| c.parse::<i64>().ok());
            return Err(DbError::sql(code, message));
        }
        Err(DbError::ConnectionError(message))
    }

    fn status_url(&self, handle: &str) -> String {
        format!("{}{}/{}", self.config.base_url(), STATEMENTS_PATH, handle)
    }

    async fn collect(&self, sql: &str, response: StatementResponse) -> DbResult<QueryResult> {
        let meta = response.result_set_meta_data.ok_or_else(|| DbError::UnexpectedResult {
            query: sql.to_string(),
            reason: "response has no result set metadata".to_string(),
        })?;
        let mut data = response.data;
        if let Some(handle) = &response.statement_handle {
            for partition in 1..meta.partition_info.len() {
                log::debug!(
                    "Fetching partition {} ({:?} rows)",
                    partition,
                    meta.partition_info[partition].row_count
                );
                let url = format!("{}?partition={}", self.status_url(handle), partition);
                let page = self.request(self.client.get(&url)).send().await?;
                let page = parse_response(page).await?;
                data.extend(page.data);
            }
        }
        let columns: Vec<String> = meta.row_type.into_iter().map(|r| r.name).collect();
        let mut result = QueryResult::new(columns, data);
        result.row_count = meta.num_rows;
        Ok(result)
    }

    fn track_session_change(&self, sql: &str) -> DbResult<()> {
        let mut words = sql.trim().splitn(3, char::is_whitespace);
        let (Some(verb), Some(kind), Some(name)) = (words.next(), words.next(), words.next())
        else {
            return Ok(());
        };
        if !verb.eq_ignore_ascii_case("use") {
            return Ok(());
        }
        let mut session = self
            .session
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))?;
        let value = Some(unquote_identifier(name.trim().trim_end_matches(';')));
        match kind.to_ascii_lowercase().as_str() {
            "role" => session.role = value,
            "warehouse" => session.warehouse = value,
            "database" => session.database = value,
            "schema" => session.schema = value,
            _ => {}
        }
        Ok(())
    }
}

async fn parse_response(response: reqwest::Response) -> DbResult<StatementResponse> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| {
        DbError::ConnectionError(format!("invalid SQL API response: {} ({})", e, text))
    })
}

fn is_file_transfer(sql: &str) -> bool {
    let first = sql.split_whitespace().next().unwrap_or("");
    first.eq_ignore_ascii_case("put") || first.eq_ignore_ascii_case("get")
}

#[async_trait]
impl SqlGateway for SnowflakeBackend {
    async fn execute(&self, sql: &str) -> DbResult<QueryResult> {
        if is_file_transfer(sql) {
            return Err(DbError::NotImplemented {
                backend: "snowflake".to_string(),
                feature: FILE_TRANSFER_UNSUPPORTED.to_string(),
            });
        }
        log::debug!("Executing: {}", sql);
        let response = self.submit(sql).await?;
        let result = self.collect(sql, response).await?;
        self.track_session_change(sql)?;
        Ok(result)
    }

    fn connection_context(&self) -> ConnectionContext {
        ConnectionContext {
            role: self.config.role.clone(),
            warehouse: self.config.warehouse.clone(),
            database: self.config.database.clone(),
            schema: self.config.schema.clone(),
        }
    }

    fn db_type(&self) -> &'static str {
        "snowflake"
    }
}
