//! Web Map Service client errors

use thiserror::Error;

/// Errors raised while querying a WMS endpoint for its capabilities
#[derive(Error, Debug)]
pub enum WmsError {
    /// GetCapabilities request failed at the transport level
    #[error("WMS request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The capabilities document could not be parsed
    #[error("Invalid WMS capabilities document: {0}")]
    Capabilities(String),
}
