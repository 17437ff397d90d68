//! WMS overlay page (ESA 10-m global land cover by default)
//!
//! Lists the layers a WMS endpoint advertises and overlays the selected
//! ones. A legend can come from the builtin ESA WorldCover table or from
//! free-text `label: color` lines.

use serde::Deserialize;

use crate::context::PageContext;
use crate::expression::Expression;
use crate::legend::{parse_legend_text, BuiltinLegend};
use crate::render::MapBuilder;
use crate::wms::{get_wms_layers, WmsLayerSpec};

use super::PageView;

const ESA_LANDCOVER_URL: &str = "https://services.terrascope.be/wms/v2";
const ESA_DEFAULT_LAYERS: &[&str] = &[
    "WORLDCOVER_2020_S2_TCC",
    "WORLDCOVER_2020_S2_FCC",
    "WORLDCOVER_2020_MAP",
];

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Params {
    pub url: String,
    /// Selected layer names; `None` selects the known defaults for the ESA
    /// endpoint and nothing elsewhere.
    pub layers: Option<Vec<String>>,
    pub add_legend: bool,
    pub legend_text: Option<String>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            url: ESA_LANDCOVER_URL.to_string(),
            layers: None,
            add_legend: true,
            legend_text: None,
        }
    }
}

pub async fn render(ctx: &PageContext, params: Params) -> PageView {
    let mut map = MapBuilder::new((36.3, 0.0), 2);
    let mut notes = Vec::new();

    let available = match get_wms_layers(&ctx.http, &params.url).await {
        Ok(layers) => layers,
        Err(e) => {
            map.add_error("WMS capabilities", e);
            Vec::new()
        }
    };
    if !available.is_empty() {
        notes.push(format!("{} WMS layers available", available.len()));
    }

    let selected: Vec<String> = match &params.layers {
        Some(layers) => layers.clone(),
        None if params.url == ESA_LANDCOVER_URL => {
            ESA_DEFAULT_LAYERS.iter().map(|l| l.to_string()).collect()
        }
        None => Vec::new(),
    };

    for layer in &selected {
        map.add_wms_layer(WmsLayerSpec::new(&params.url, layer), layer);
    }

    if params.add_legend {
        match &params.legend_text {
            Some(text) if !text.trim().is_empty() => match parse_legend_text("Legend", text) {
                Ok(spec) => map.add_legend(spec),
                Err(e) => map.add_error("Legend", e),
            },
            _ => {
                if selected.iter().any(|l| l == "WORLDCOVER_2020_MAP") {
                    map.add_legend(BuiltinLegend::EsaWorldCover.spec());
                }
            }
        }
    }

    let boundary = Expression::feature_collection(crate::catalog::STUDY_AREA_ASSET)
        .style("000000ff", 2, "00000000");
    map.add_expression_layer(boundary, None, "MRB", true, 1.0);

    let mut view = PageView::new(
        "wms",
        "ESA 10-m Global Land Cover 2020",
        map.finish(ctx.backend.as_ref()).await,
    );
    view.notes = notes;
    view
}
