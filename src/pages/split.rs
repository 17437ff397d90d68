//! Split-panel comparison page

use serde::Deserialize;

use crate::catalog::{self, VisParams, DEM_DATASETS};
use crate::context::PageContext;
use crate::palette;
use crate::render::{MapBuilder, SplitSide};

use super::{study_area_layer, PageView};

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Params {
    pub left: String,
    pub left_palette: String,
    pub right: String,
    pub right_palette: String,
    pub lat: f64,
    pub lon: f64,
    pub zoom: u8,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            left: "TERRAIN".to_string(),
            left_palette: "terrain".to_string(),
            right: "HYBRID".to_string(),
            right_palette: "gist_earth".to_string(),
            lat: 40.0,
            lon: -100.0,
            zoom: 4,
        }
    }
}

pub async fn render(ctx: &PageContext, params: Params) -> PageView {
    let mut map = MapBuilder::new((params.lat, params.lon), params.zoom);

    // Equal selections still render (a comparison of a layer with itself),
    // with a warning surfaced inline.
    if params.left == params.right {
        map.add_error("Layers", "Please select different layers");
    }

    let left = side(&mut map, &params.left, &params.left_palette);
    let right = side(&mut map, &params.right, &params.right_palette);
    map.split_map(left, right);

    map.add_expression_layer(study_area_layer(), None, "Study Area", true, 1.0);

    PageView::new(
        "split",
        "Split-panel Map",
        map.finish(ctx.backend.as_ref()).await,
    )
}

fn side(map: &mut MapBuilder, name: &str, palette_name: &str) -> SplitSide {
    if catalog::basemap_names().contains(&name) {
        return SplitSide::Basemap(name.to_string());
    }
    match catalog::lookup(&DEM_DATASETS, name) {
        Ok(dataset) => {
            let ramp = match palette::get_palette(palette_name, 15) {
                Ok(ramp) => ramp,
                Err(e) => {
                    map.add_error(name, e);
                    palette::get_palette("terrain", 15).expect("terrain palette registered")
                }
            };
            let vis = dataset
                .vis
                .clone()
                .map(|v| VisParams::new(v.min, v.max, ramp.clone()))
                .unwrap_or_else(|| VisParams::new(0.0, 4000.0, ramp));
            SplitSide::Expression {
                expr: dataset.expression(),
                vis: Some(vis),
                name: name.to_string(),
            }
        }
        Err(e) => {
            // Fall back to a blank basemap side so the divider still works.
            map.add_error(name, e);
            SplitSide::Basemap("ROADMAP".to_string())
        }
    }
}
