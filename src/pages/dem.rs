//! DEM datasets page
//!
//! Land-cover and elevation-model layers over the study area, with optional
//! ROI clipping, hillshading, and DEM differencing. A failing layer (unknown
//! label, backend refusal) surfaces inline and never blocks the rest.

use serde::Deserialize;

use crate::catalog::{
    self, VisParams, DEM_DATASETS, LANDCOVER_DATASETS, SINKS_10M_ASSET, SINKS_30M_ASSET,
};
use crate::context::PageContext;
use crate::expression::Expression;
use crate::palette;
use crate::render::MapBuilder;
use crate::roi::Roi;

use super::{huc10_boundaries, study_area_layer, PageView, RoiUpload};

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Params {
    pub landcover_datasets: Vec<String>,
    pub dem_datasets: Vec<String>,
    pub palette: String,
    /// Elevation range for visualization, meters.
    pub elevation_range: (f64, f64),
    pub opacity: f64,
    pub clip: bool,
    pub hillshade: bool,
    pub difference: Option<DiffParams>,
    pub roi_upload: Option<RoiUpload>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            landcover_datasets: Vec::new(),
            dem_datasets: Vec::new(),
            palette: "terrain".to_string(),
            elevation_range: (0.0, 4000.0),
            opacity: 0.8,
            clip: false,
            hillshade: false,
            difference: None,
            roi_upload: None,
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct DiffParams {
    pub first: String,
    pub second: String,
    pub range: (f64, f64),
    pub palette: String,
}

impl Default for DiffParams {
    fn default() -> Self {
        Self {
            first: "STRM".to_string(),
            second: "NASA SRTM".to_string(),
            range: (-20.0, 20.0),
            palette: "coolwarm".to_string(),
        }
    }
}

pub async fn render(ctx: &PageContext, params: Params) -> PageView {
    let (center, zoom) = ctx.default_view();
    let mut map = MapBuilder::new(center, zoom);
    map.add_basemap("HYBRID");
    map.add_basemap("TERRAIN");

    // Upload replaces the ROI for this pass only; a failed parse keeps the
    // previous ROI and surfaces the reason inline.
    let mut roi = ctx.roi.clone();
    if let Some(upload) = &params.roi_upload {
        match upload.ingest() {
            Ok(uploaded) => {
                if let Roi::Uploaded { polygons, .. } = &uploaded {
                    map.add_vector_layer(
                        serde_json::to_value(geojson::Geometry::new(geojson::Value::from(
                            polygons,
                        )))
                        .expect("multipolygon serializes as geojson"),
                        "ROI",
                        "0000ff",
                        "00000000",
                        2,
                    );
                }
                roi = uploaded;
            }
            Err(e) => map.add_error("ROI upload", e),
        }
    }

    let clip_region = params.clip.then(|| roi.region_spec());
    if params.clip {
        map.center_on(&roi, 9);
    }

    for label in &params.landcover_datasets {
        let dataset = match catalog::lookup(&LANDCOVER_DATASETS, label) {
            Ok(dataset) => dataset,
            Err(e) => {
                map.add_error(label, e);
                continue;
            }
        };
        let mut expr = dataset.expression();
        if let Some(region) = &clip_region {
            expr = expr.clip(region.clone());
        }
        map.add_expression_layer(expr, dataset.vis.clone(), label, true, 1.0);
        if let Some(legend) = dataset.legend {
            map.add_legend(legend.spec());
        }
    }

    let dem_palette = match palette::get_palette(&params.palette, 15) {
        Ok(palette) => palette,
        Err(e) => {
            map.add_error("Palette", e);
            palette::get_palette("terrain", 15).expect("terrain palette registered")
        }
    };
    let dem_vis = VisParams::new(
        params.elevation_range.0.min(params.elevation_range.1),
        params.elevation_range.0.max(params.elevation_range.1),
        dem_palette,
    );

    for label in &params.dem_datasets {
        let dataset = match catalog::lookup(&DEM_DATASETS, label) {
            Ok(dataset) => dataset,
            Err(e) => {
                map.add_error(label, e);
                continue;
            }
        };
        let mut dem = dataset.expression();
        if let Some(region) = &clip_region {
            dem = dem.clip(region.clone());
        }
        if params.hillshade {
            let hillshade = dem
                .clone()
                .default_projection("EPSG:3857")
                .hillshade(315.0, 45.0);
            map.add_expression_layer(
                hillshade,
                None,
                &format!("{} hillshade", label),
                true,
                1.0,
            );
        }
        map.add_expression_layer(dem, Some(dem_vis.clone()), label, true, params.opacity);
        map.add_colorbar(&dem_vis, "Elevation (m)");
    }

    if let Some(diff_params) = &params.difference {
        render_difference(ctx, &mut map, diff_params, clip_region.as_ref(), &roi);
    }

    map.add_expression_layer(
        Expression::feature_collection(SINKS_30M_ASSET),
        None,
        "Depressions (30m)",
        false,
        1.0,
    );
    map.add_expression_layer(
        Expression::feature_collection(SINKS_10M_ASSET).style("0000ff", 2, "0000ff44"),
        None,
        "Depressions (10m)",
        false,
        1.0,
    );
    map.add_expression_layer(huc10_boundaries(), None, "NHD-HUC10", false, 1.0);
    map.add_expression_layer(study_area_layer(), None, "Study Area", true, 1.0);

    PageView::new(
        "dem",
        "DEM Datasets",
        map.finish(ctx.backend.as_ref()).await,
    )
}

/// DEM differencing. Identical selections are not special-cased: the backend
/// computes a zero-valued difference for them like any other pair.
fn render_difference(
    _ctx: &PageContext,
    map: &mut MapBuilder,
    diff: &DiffParams,
    clip_region: Option<&crate::expression::RegionSpec>,
    roi: &Roi,
) {
    let first = match catalog::lookup(&DEM_DATASETS, &diff.first) {
        Ok(dataset) => dataset,
        Err(e) => {
            map.add_error(&diff.first, e);
            return;
        }
    };
    let second = match catalog::lookup(&DEM_DATASETS, &diff.second) {
        Ok(dataset) => dataset,
        Err(e) => {
            map.add_error(&diff.second, e);
            return;
        }
    };

    let mut expr = first.expression().subtract(second.expression());
    if let Some(region) = clip_region {
        expr = expr.clip(region.clone());
        map.center_on(roi, 9);
    }

    let diff_palette = match palette::get_palette(&diff.palette, 15) {
        Ok(palette) => palette,
        Err(e) => {
            map.add_error("Difference palette", e);
            palette::get_palette("coolwarm", 15).expect("coolwarm palette registered")
        }
    };
    let vis = VisParams::new(
        diff.range.0.min(diff.range.1),
        diff.range.0.max(diff.range.1),
        diff_palette,
    );
    let name = format!("{} - {}", diff.first, diff.second);
    map.add_expression_layer(expr, Some(vis.clone()), &name, true, 1.0);
    map.add_colorbar(&vis, &format!("Elevation difference (m): {}", name));
}
