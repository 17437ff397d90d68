//! Domain-specific error types for basinview
//!
//! One file per domain, mirroring the places a request can go wrong:
//!
//! - **CatalogError**: dataset/palette lookups against the fixed catalog
//! - **RoiError**: region-of-interest upload parsing
//! - **BackendError**: failures reported by the external processing backend
//! - **WmsError**: Web Map Service capability queries
//! - **LegendError**: free-text legend parsing
//!
//! Backend-facing failures are never propagated out of a page render; they
//! are converted to inline [`crate::render::PageError`] entries so one bad
//! layer or statistics request does not take the rest of the page with it.

pub mod backend;
pub mod catalog;
pub mod legend;
pub mod roi;
pub mod wms;

pub use backend::BackendError;
pub use catalog::CatalogError;
pub use legend::LegendError;
pub use roi::RoiError;
pub use wms::WmsError;

/// Result type alias for catalog lookups
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Result type alias for ROI ingestion
pub type RoiResult<T> = Result<T, RoiError>;

/// Result type alias for backend requests
pub type BackendResult<T> = Result<T, BackendError>;

/// Result type alias for WMS queries
pub type WmsResult<T> = Result<T, WmsError>;
