//! Catalog lookup errors

use thiserror::Error;

/// Errors raised by dataset and palette lookups
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Display label not present in the catalog
    #[error("Unknown dataset: '{0}'")]
    UnknownDataset(String),

    /// Palette name not present in the colormap registry
    #[error("Unknown palette: '{0}'")]
    UnknownPalette(String),

    /// Watershed identifier not present in the bundled HU10 index
    #[error("Unknown watershed: '{0}'")]
    UnknownWatershed(String),
}
