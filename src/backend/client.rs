use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::catalog::VisParams;
use crate::config::BackendConfig;
use crate::errors::{BackendError, BackendResult};
use crate::expression::Expression;

/// A renderable raster tile source returned by the backend.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TileSource {
    /// XYZ tile URL template.
    pub url_template: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub attribution: Option<String>,
}

/// A computed scalar/table result: one row of properties per feature.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TableResult {
    pub columns: Vec<String>,
    pub rows: Vec<serde_json::Map<String, Value>>,
}

impl TableResult {
    /// The no-data table an empty statistics zone resolves to.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column across all rows, in row order.
    pub fn column(&self, name: &str) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| row.get(name).cloned().unwrap_or(Value::Null))
            .collect()
    }
}

/// The request/response contract with the processing backend.
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Materialize an expression as a tile source using the given
    /// visualization parameters.
    async fn render(&self, expr: &Expression, vis: Option<&VisParams>)
        -> BackendResult<TileSource>;

    /// Evaluate an expression that ends in a reduction, returning its table.
    async fn reduce(&self, expr: &Expression) -> BackendResult<TableResult>;

    /// Fetch metadata for an expression (image dates, feature properties).
    async fn info(&self, expr: &Expression) -> BackendResult<Value>;
}

#[derive(Serialize)]
struct RenderRequest<'a> {
    expression: &'a Expression,
    #[serde(skip_serializing_if = "Option::is_none")]
    vis: Option<&'a VisParams>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// HTTP implementation of [`BackendClient`] against the expression-evaluation
/// gateway configured in [`BackendConfig`].
pub struct HttpBackendClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBackendClient {
    pub fn new(config: &BackendConfig) -> BackendResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    async fn post<B: Serialize>(&self, endpoint: &str, body: &B) -> BackendResult<Value> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("Backend request: POST {}", url);
        let mut request = self.http.post(&url).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        let payload: Value = response.json().await?;

        // Structured refusals carry {"error": {"code", "message"}} regardless
        // of HTTP status; classify those before falling back on the status.
        if let Ok(body) = serde_json::from_value::<ErrorBody>(payload.clone()) {
            return Err(classify(&body.error.code, body.error.message));
        }
        if !status.is_success() {
            return Err(BackendError::RequestFailed(format!(
                "{} returned {}",
                endpoint, status
            )));
        }
        Ok(payload)
    }
}

fn classify(code: &str, message: String) -> BackendError {
    match code {
        "dataset_not_found" => BackendError::DatasetNotFound(message),
        "query_too_large" => BackendError::QueryTooLarge(message),
        "malformed_expression" => BackendError::MalformedExpression(message),
        "empty_result_set" => BackendError::EmptyResultSet(message),
        _ => BackendError::RequestFailed(message),
    }
}

#[async_trait]
impl BackendClient for HttpBackendClient {
    async fn render(
        &self,
        expr: &Expression,
        vis: Option<&VisParams>,
    ) -> BackendResult<TileSource> {
        let payload = self
            .post("render", &RenderRequest { expression: expr, vis })
            .await?;
        serde_json::from_value(payload)
            .map_err(|e| BackendError::RequestFailed(format!("invalid render response: {}", e)))
    }

    async fn reduce(&self, expr: &Expression) -> BackendResult<TableResult> {
        let payload = self.post("reduce", expr).await?;
        serde_json::from_value(payload)
            .map_err(|e| BackendError::RequestFailed(format!("invalid reduce response: {}", e)))
    }

    async fn info(&self, expr: &Expression) -> BackendResult<Value> {
        self.post("info", expr).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_classify_to_variants() {
        assert!(matches!(
            classify("dataset_not_found", "x".into()),
            BackendError::DatasetNotFound(_)
        ));
        assert!(matches!(
            classify("empty_result_set", "x".into()),
            BackendError::EmptyResultSet(_)
        ));
        assert!(matches!(
            classify("quota_exceeded", "x".into()),
            BackendError::RequestFailed(_)
        ));
    }

    #[test]
    fn table_column_preserves_row_order() {
        let mut row1 = serde_json::Map::new();
        row1.insert("sum".into(), Value::from(1.5));
        let mut row2 = serde_json::Map::new();
        row2.insert("sum".into(), Value::from(2.5));
        let table = TableResult {
            columns: vec!["sum".into()],
            rows: vec![row1, row2],
        };
        assert_eq!(table.column("sum"), vec![Value::from(1.5), Value::from(2.5)]);
        assert_eq!(table.column("missing"), vec![Value::Null, Value::Null]);
    }
}
