//! Query Gateway for the hosted SQL endpoint
//!
//! The writings database lives on DoltHub and is read through a single
//! GET endpoint: `<api_base>?q=<url-encoded SQL>` answering
//! `{"rows": [{column: value, ...}, ...]}`.
//!
//! [`QueryGateway::query`] never fails: transport errors, non-success
//! statuses and unparseable bodies are logged and come back as an empty row
//! set. The few page-level callers that must show an error use
//! [`QueryGateway::try_query`] instead.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error};

/// DoltHub read API for the writings repository
pub const DEFAULT_API_BASE: &str =
    "https://www.dolthub.com/api/v1alpha1/holywritings/bahaiwritings/main";

/// Identical SQL text is answered from memory for this long
pub const REQUEST_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

const USER_AGENT: &str = concat!("hw-reader/", env!("CARGO_PKG_VERSION"));

/// Gateway errors (only visible through `try_query`)
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error! status: {0}, body: {1}")]
    Status(u16, String),

    #[error("Failed to parse API response as JSON: {0}")]
    Parse(String),
}

impl From<GatewayError> for crate::Error {
    fn from(e: GatewayError) -> Self {
        crate::Error::Http(e.to_string())
    }
}

/// One result row: column name to JSON value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Map<String, Value>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by tests and fixtures
    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.0.insert(column.to_string(), value.into());
        self
    }

    /// Column as text; `null`, missing and empty strings are all absent
    pub fn get(&self, column: &str) -> Option<String> {
        match self.0.get(column)? {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            other => Some(other.to_string()),
        }
    }

    /// Column as an integer; DoltHub renders aggregates as strings
    pub fn get_i64(&self, column: &str) -> Option<i64> {
        match self.0.get(column)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

impl From<Map<String, Value>> for Row {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[derive(Debug, Deserialize)]
struct QueryEnvelope {
    #[serde(default)]
    rows: Option<Vec<Row>>,
}

/// Read-only SQL gateway
#[async_trait]
pub trait QueryGateway: Send + Sync {
    /// Run `sql`, surfacing failures
    async fn try_query(&self, sql: &str) -> Result<Vec<Row>, GatewayError>;

    /// Run `sql`; any failure is logged and yields no rows
    async fn query(&self, sql: &str) -> Vec<Row> {
        match self.try_query(sql).await {
            Ok(rows) => rows,
            Err(e) => {
                error!(error = %e, sql = %sql, "Query failed, treating as empty result");
                Vec::new()
            }
        }
    }
}

struct CachedRows {
    rows: Vec<Row>,
    fetched_at: Instant,
}

/// Gateway talking to the DoltHub SQL API
pub struct DoltHubGateway {
    http_client: reqwest::Client,
    api_base: String,
    ttl: Duration,
    cache: Mutex<HashMap<String, CachedRows>>,
}

impl DoltHubGateway {
    pub fn new(api_base: impl Into<String>) -> Result<Self, GatewayError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_base: api_base.into(),
            ttl: REQUEST_CACHE_TTL,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Override the response cache lifetime (zero disables caching)
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Full request URL for `sql`
    pub fn query_url(&self, sql: &str) -> String {
        format!("{}?q={}", self.api_base, urlencoding::encode(sql))
    }

    async fn cached(&self, sql: &str) -> Option<Vec<Row>> {
        let mut cache = self.cache.lock().await;
        match cache.get(sql) {
            Some(entry) if entry.fetched_at.elapsed() < self.ttl => Some(entry.rows.clone()),
            Some(_) => {
                cache.remove(sql);
                None
            }
            None => None,
        }
    }

    async fn fetch(&self, sql: &str) -> Result<Vec<Row>, GatewayError> {
        let url = self.query_url(sql);
        debug!(url = %url, "Fetching query");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(GatewayError::Status(status.as_u16(), body));
        }

        let envelope: QueryEnvelope =
            serde_json::from_str(&body).map_err(|e| GatewayError::Parse(e.to_string()))?;

        Ok(envelope.rows.unwrap_or_default())
    }
}

#[async_trait]
impl QueryGateway for DoltHubGateway {
    async fn try_query(&self, sql: &str) -> Result<Vec<Row>, GatewayError> {
        if let Some(rows) = self.cached(sql).await {
            debug!(sql = %sql, "Returning cached result");
            return Ok(rows);
        }

        let rows = self.fetch(sql).await?;

        if !self.ttl.is_zero() {
            self.cache.lock().await.insert(
                sql.to_string(),
                CachedRows {
                    rows: rows.clone(),
                    fetched_at: Instant::now(),
                },
            );
        }

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_accessors() {
        let row: Row = serde_json::from_value(json!({
            "version": "abc",
            "name": "",
            "phelps": null,
            "total": "42",
            "count": 7
        }))
        .unwrap();

        assert_eq!(row.get("version").as_deref(), Some("abc"));
        assert_eq!(row.get("name"), None);
        assert_eq!(row.get("phelps"), None);
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.get("count").as_deref(), Some("7"));
        assert_eq!(row.get_i64("total"), Some(42));
        assert_eq!(row.get_i64("count"), Some(7));
        assert_eq!(row.get_i64("version"), None);
    }

    #[test]
    fn test_envelope_without_rows_is_empty() {
        let envelope: QueryEnvelope = serde_json::from_str(r#"{"query_execution_status":"Success"}"#).unwrap();
        assert!(envelope.rows.unwrap_or_default().is_empty());
    }

    #[test]
    fn test_query_url_encodes_sql() {
        let gateway = DoltHubGateway::new("https://example.test/api").unwrap();
        let url = gateway.query_url("SELECT * FROM writings WHERE name LIKE '%a b%'");
        assert_eq!(
            url,
            "https://example.test/api?q=SELECT%20%2A%20FROM%20writings%20WHERE%20name%20LIKE%20%27%25a%20b%25%27"
        );
    }
}
