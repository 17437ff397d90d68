//! Dashboard pages
//!
//! One module per page, registered in [`PAGES`]. Each page is a pure
//! function of a [`PageContext`] and its typed parameters, returning a
//! [`PageView`]: the map document plus any tables, charts, and notes. Pages
//! re-run top to bottom per request; nothing persists between renders.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::backend::TableResult;
use crate::context::PageContext;
use crate::render::MapDocument;

pub mod datasets;
pub mod dem;
pub mod home;
pub mod lidar;
pub mod naip;
pub mod planet;
pub mod resources;
pub mod split;
pub mod trend;
pub mod water;
pub mod wms;

/// A titled table in a page view.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NamedTable {
    pub title: String,
    pub table: TableResult,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub name: String,
    pub values: Vec<f64>,
}

/// A grouped bar chart (the only chart kind the dashboard draws).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

/// The rendered output of one page pass.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PageView {
    pub slug: String,
    pub title: String,
    pub map: MapDocument,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tables: Vec<NamedTable>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub charts: Vec<ChartSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub notes: Vec<String>,
}

impl PageView {
    pub fn new(slug: &str, title: &str, map: MapDocument) -> Self {
        Self {
            slug: slug.to_string(),
            title: title.to_string(),
            map,
            tables: Vec::new(),
            charts: Vec::new(),
            notes: Vec::new(),
        }
    }
}

/// Registry entry: menu title, bootstrap icon name, slug.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageEntry {
    pub slug: &'static str,
    pub title: &'static str,
    pub icon: &'static str,
}

/// All pages, in sidebar order. Index 0 is the fallback page.
pub const PAGES: &[PageEntry] = &[
    PageEntry { slug: "home", title: "Home", icon: "house" },
    PageEntry { slug: "dem", title: "DEM Datasets", icon: "building" },
    PageEntry { slug: "split", title: "Split-panel Map", icon: "layout-split" },
    PageEntry { slug: "planet", title: "Planet Imagery", icon: "globe" },
    PageEntry { slug: "naip", title: "NAIP Imagery", icon: "camera" },
    PageEntry { slug: "datasets", title: "Surface Water Datasets", icon: "moisture" },
    PageEntry { slug: "water", title: "NAIP Water Mapping", icon: "water" },
    PageEntry { slug: "wms", title: "ESA Global Land Cover", icon: "map" },
    PageEntry { slug: "lidar", title: "LiDAR Data", icon: "lightning" },
    PageEntry { slug: "trend", title: "Trend Analysis", icon: "graph-up-arrow" },
    PageEntry { slug: "resources", title: "Useful Resources", icon: "book" },
];

pub fn find(slug: &str) -> Option<&'static PageEntry> {
    PAGES.iter().find(|p| p.slug == slug)
}

/// Render the page selected by `slug`. An unmatched slug falls back to the
/// first registered page (with a log entry rather than a silent no-op).
pub async fn render_page(ctx: &PageContext, slug: &str, params: Value) -> PageView {
    let entry = match find(slug) {
        Some(entry) => entry,
        None => {
            warn!("Unknown page '{}', falling back to '{}'", slug, PAGES[0].slug);
            &PAGES[0]
        }
    };
    info!("Rendering page '{}'", entry.slug);

    match entry.slug {
        "home" => home::render(ctx, parse(params)).await,
        "dem" => dem::render(ctx, parse(params)).await,
        "split" => split::render(ctx, parse(params)).await,
        "planet" => planet::render(ctx, parse(params)).await,
        "naip" => naip::render(ctx, parse(params)).await,
        "datasets" => datasets::render(ctx, parse(params)).await,
        "water" => water::render(ctx, parse(params)).await,
        "wms" => wms::render(ctx, parse(params)).await,
        "lidar" => lidar::render(ctx, parse(params)).await,
        "trend" => trend::render(ctx, parse(params)).await,
        "resources" => resources::render(ctx, parse(params)).await,
        other => unreachable!("unregistered page slug '{}'", other),
    }
}

/// Parse page parameters, falling back to defaults on malformed input. Every
/// page's parameter struct defaults to its initial UI state.
fn parse<P: serde::de::DeserializeOwned + Default>(params: Value) -> P {
    match serde_json::from_value(params) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Malformed page parameters ({}); using defaults", e);
            P::default()
        }
    }
}

/// Base-64 ROI upload payload accepted by pages with an ROI uploader.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct RoiUpload {
    pub filename: String,
    pub data_base64: String,
}

impl RoiUpload {
    /// Decode and parse into an ROI.
    pub fn ingest(&self) -> Result<crate::roi::Roi, crate::errors::RoiError> {
        use base64::Engine;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&self.data_base64)
            .map_err(|e| crate::errors::RoiError::Parse(format!("invalid base64: {}", e)))?;
        crate::roi::ingest_upload(&self.filename, &bytes)
    }
}

/// The styled study-area boundary every page overlays.
pub(crate) fn study_area_layer() -> crate::expression::Expression {
    crate::expression::Expression::feature_collection(crate::catalog::STUDY_AREA_ASSET)
        .style("ff0000", 2, "00000000")
}

/// HUC10 watershed boundaries for the Upper Mississippi (07), Ohio (05), and
/// Missouri (10) regions.
pub(crate) fn huc10_boundaries() -> crate::expression::Expression {
    crate::expression::Expression::feature_collection(crate::catalog::HUC10_ASSET)
        .filter_starts_with_any("huc10", &["05", "07", "10"])
        .style("000000", 1, "00000000")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_are_unique() {
        let mut slugs: Vec<&str> = PAGES.iter().map(|p| p.slug).collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), PAGES.len());
    }

    #[test]
    fn fallback_page_is_home() {
        assert_eq!(PAGES[0].slug, "home");
        assert!(find("nope").is_none());
    }
}
