//! Surface-water datasets page

use serde::Deserialize;

use crate::catalog::{self, SURFACE_WATER_DATASETS};
use crate::context::PageContext;
use crate::render::MapBuilder;

use super::{study_area_layer, PageView};

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Params {
    pub datasets: Vec<String>,
    pub opacity: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            datasets: vec!["JRC Water Occurrence".to_string()],
            opacity: 1.0,
        }
    }
}

pub async fn render(ctx: &PageContext, params: Params) -> PageView {
    let (center, zoom) = ctx.default_view();
    let mut map = MapBuilder::new(center, zoom);
    map.add_basemap("HYBRID");

    // Precomputed global occurrence tiles, drawn under the backend layers.
    map.add_tile_layer(
        "https://storage.googleapis.com/global-surface-water/tiles2020/occurrence/{z}/{x}/{y}.png",
        "JRC Water Occurrence (tiles)",
        Some("EC JRC/Google"),
    );

    for label in &params.datasets {
        match catalog::lookup(&SURFACE_WATER_DATASETS, label) {
            Ok(dataset) => {
                map.add_expression_layer(
                    dataset.expression(),
                    dataset.vis.clone(),
                    label,
                    true,
                    params.opacity,
                );
                if let Some(vis) = &dataset.vis {
                    map.add_colorbar(vis, label);
                }
            }
            Err(e) => map.add_error(label, e),
        }
    }

    map.add_expression_layer(study_area_layer(), None, "Study Area", true, 1.0);

    PageView::new(
        "datasets",
        "Surface Water Datasets",
        map.finish(ctx.backend.as_ref()).await,
    )
}
