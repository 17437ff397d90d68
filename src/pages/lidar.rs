//! LiDAR data page
//!
//! Two sub-applications: the USGS 3DEP elevation index (a WMS overlay plus a
//! split map of the 1 m collection) and the North Dakota LiDAR tile indices.

use serde::Deserialize;

use crate::catalog::{self, VisParams, LIDAR_INDEX_DATASETS};
use crate::context::PageContext;
use crate::expression::Expression;
use crate::render::{MapBuilder, SplitSide};
use crate::wms::WmsLayerSpec;

use super::PageView;

const THREEDEP_WMS_URL: &str =
    "https://index.nationalmap.gov/arcgis/services/3DEPElevationIndex/MapServer/WMSServer";

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Application {
    Usgs3dep,
    NorthDakota,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Params {
    pub application: Application,
    /// North Dakota sub-app: selected tile-index datasets.
    pub datasets: Vec<String>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            application: Application::Usgs3dep,
            datasets: Vec::new(),
        }
    }
}

fn elevation_palette() -> Vec<String> {
    [
        "3ae237", "b5e22e", "d6e21f", "fff705", "ffd611", "ffb613", "ff8b13", "ff6e08", "ff500d",
        "ff0000", "de0101", "c21301", "0602ff", "235cb1", "307ef3", "269db1", "30c8e2", "32d3ef",
        "3be285", "3ff38f", "86e26f",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect()
}

pub async fn render(ctx: &PageContext, params: Params) -> PageView {
    match params.application {
        Application::Usgs3dep => render_3dep(ctx).await,
        Application::NorthDakota => render_north_dakota(ctx, &params).await,
    }
}

async fn render_3dep(ctx: &PageContext) -> PageView {
    let mut map = MapBuilder::new((40.0, -100.0), 4);
    map.add_wms_layer(WmsLayerSpec::new(THREEDEP_WMS_URL, "30"), "USGS 3DEP");

    let dataset = Expression::image_collection("USGS/3DEP/1m").mosaic();
    let vis = VisParams::new(0.0, 3000.0, elevation_palette());
    // Same layer on both panes; the divider compares it against itself.
    map.split_map(
        SplitSide::Expression {
            expr: dataset.clone(),
            vis: Some(vis.clone()),
            name: "3DEP 1m".to_string(),
        },
        SplitSide::Expression {
            expr: dataset,
            vis: Some(vis),
            name: "3DEP 1m".to_string(),
        },
    );

    PageView::new("lidar", "LiDAR Data", map.finish(ctx.backend.as_ref()).await)
}

async fn render_north_dakota(ctx: &PageContext, params: &Params) -> PageView {
    let (center, zoom) = ctx.default_view();
    let mut map = MapBuilder::new(center, zoom);
    map.add_basemap("TERRAIN");

    for label in &params.datasets {
        match catalog::lookup(&LIDAR_INDEX_DATASETS, label) {
            Ok(dataset) => {
                map.add_expression_layer(dataset.expression(), None, label, true, 1.0)
            }
            Err(e) => map.add_error(label, e),
        }
    }

    let boundary = Expression::feature_collection(crate::catalog::STUDY_AREA_ASSET)
        .style("0000ffff", 2, "00000000");
    map.add_expression_layer(boundary, None, "MRB", true, 1.0);

    let mut view = PageView::new("lidar", "LiDAR Data", map.finish(ctx.backend.as_ref()).await);
    view.notes = vec![
        "ND LiDAR Dissemination MapService: James River Basin LiDAR Phase 6; 7702 files, 61 GB."
            .to_string(),
    ];
    view
}
