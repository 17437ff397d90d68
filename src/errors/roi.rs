//! Region-of-interest ingestion errors
//!
//! A failed upload must leave the previously active ROI in effect, so every
//! variant here is recoverable at the call site: the page keeps its default
//! boundary and surfaces the message inline.

use thiserror::Error;

/// Errors raised while converting an uploaded vector file into an ROI
#[derive(Error, Debug)]
pub enum RoiError {
    /// File extension outside the supported {geojson, kml, zip} set
    #[error("Unsupported ROI format: '.{0}' (expected .geojson, .kml, or a zipped Shapefile)")]
    InvalidFormat(String),

    /// The file matched a supported format but did not parse
    #[error("Failed to parse ROI file: {0}")]
    Parse(String),

    /// The file parsed but contained no polygonal geometry
    #[error("ROI file contains no polygon features")]
    EmptyGeometry,

    /// Temporary-file handling failed
    #[error("ROI upload I/O error: {0}")]
    Io(#[from] std::io::Error),
}
