//! Shared test fixtures: a scriptable in-process backend client.
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use basinview::backend::{BackendClient, TableResult, TileSource};
use basinview::catalog::VisParams;
use basinview::config::Config;
use basinview::context::PageContext;
use basinview::errors::{BackendError, BackendResult};
use basinview::expression::{Expression, Op};

/// A backend that evaluates nothing but follows the contract: renders
/// resolve to deterministic tile URLs, reductions to canned tables, and
/// failures can be scripted per asset.
#[derive(Default, Clone)]
pub struct StubBackend {
    /// Render requests whose expression mentions any of these assets fail.
    pub fail_assets: Vec<String>,
    /// Reductions report an empty result set instead of a table.
    pub empty_reductions: bool,
}

impl StubBackend {
    pub fn failing_on(asset: &str) -> Self {
        Self {
            fail_assets: vec![asset.to_string()],
            ..Self::default()
        }
    }

    pub fn with_empty_reductions() -> Self {
        Self {
            empty_reductions: true,
            ..Self::default()
        }
    }
}

/// A subtraction of two structurally identical operands reduces to a
/// constant-zero raster.
fn is_zero_difference(expr: &Expression) -> bool {
    let mut stripped = expr.clone();
    match stripped.ops.pop() {
        Some(Op::Subtract { other }) => *other == stripped,
        _ => false,
    }
}

#[async_trait]
impl BackendClient for StubBackend {
    async fn render(
        &self,
        expr: &Expression,
        _vis: Option<&VisParams>,
    ) -> BackendResult<TileSource> {
        let serialized = serde_json::to_string(expr).expect("expression serializes");
        for asset in &self.fail_assets {
            if serialized.contains(asset.as_str()) {
                return Err(BackendError::RequestFailed(format!(
                    "scripted failure for '{}'",
                    asset
                )));
            }
        }
        let template = if is_zero_difference(expr) {
            "https://tiles.test/zero/{z}/{x}/{y}".to_string()
        } else {
            format!("https://tiles.test/{}/{{z}}/{{x}}/{{y}}", expr.source)
        };
        Ok(TileSource {
            url_template: template,
            attribution: None,
        })
    }

    async fn reduce(&self, expr: &Expression) -> BackendResult<TableResult> {
        if self.empty_reductions {
            return Err(BackendError::EmptyResultSet(expr.source.clone()));
        }
        let mut row = serde_json::Map::new();
        row.insert("year".to_string(), json!("Y2019"));
        row.insert("sum".to_string(), json!(42.5));
        Ok(TableResult {
            columns: vec!["year".to_string(), "sum".to_string()],
            rows: vec![row],
        })
    }

    async fn info(&self, _expr: &Expression) -> BackendResult<Value> {
        Ok(json!({"name": "Test basin", "areasqkm": 123.4}))
    }
}

pub fn test_context(backend: StubBackend) -> PageContext {
    PageContext::new(Arc::new(Config::default()), Arc::new(backend))
}
