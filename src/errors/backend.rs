//! External processing-backend errors
//!
//! The backend owns the evaluation semantics of every expression; this type
//! only classifies its refusals. `EmptyResultSet` is deliberately separate
//! from the failure variants: a statistics zone with zero features is a
//! "no data" answer, not an error a page should abort on.

use thiserror::Error;

/// Failures reported by (or while reaching) the processing backend
#[derive(Error, Debug)]
pub enum BackendError {
    /// The referenced dataset does not exist at the backend
    #[error("Dataset not found at backend: '{0}'")]
    DatasetNotFound(String),

    /// The backend refused the request as too large
    #[error("Query too large: {0}")]
    QueryTooLarge(String),

    /// The backend could not interpret the expression
    #[error("Malformed expression: {0}")]
    MalformedExpression(String),

    /// A reduction matched zero features in the requested zone
    #[error("Empty result set: {0}")]
    EmptyResultSet(String),

    /// Generic request failure (auth, rate limits, 5xx)
    #[error("Backend request failed: {0}")]
    RequestFailed(String),

    /// Transport-level failure
    #[error("Backend HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl BackendError {
    /// Whether this is the "zone had no features" case pages treat as
    /// no-data rather than a failure.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, BackendError::EmptyResultSet(_))
    }
}
