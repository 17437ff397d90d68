//! NAIP imagery page

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::catalog::{VisParams, NAIP_ASSET, STUDY_AREA_ASSET};
use crate::context::PageContext;
use crate::expression::{Expression, RegionSpec};
use crate::render::MapBuilder;

use super::{study_area_layer, PageView};

/// Images per collection year, taken from the collection's inventory. Years
/// without coverage over the study area report zero.
static NAIP_COUNT: Lazy<Vec<(u32, u32)>> = Lazy::new(|| {
    vec![
        (2003, 26077),
        (2004, 53323),
        (2005, 55570),
        (2006, 62976),
        (2007, 22060),
        (2008, 28334),
        (2009, 47088),
        (2010, 46418),
        (2011, 24892),
        (2012, 37606),
        (2013, 27017),
        (2014, 37896),
        (2015, 42909),
        (2016, 24088),
        (2017, 42936),
        (2018, 27789),
        (2019, 37855),
        (2020, 0),
        (2021, 0),
    ]
});

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Params {
    pub basemap: String,
    pub add_naip: bool,
    pub year: u32,
    pub lat: f64,
    pub lon: f64,
    pub zoom: u8,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            basemap: "ROADMAP".to_string(),
            add_naip: false,
            year: 2019,
            lat: 40.0,
            lon: -100.0,
            zoom: 4,
        }
    }
}

pub async fn render(ctx: &PageContext, params: Params) -> PageView {
    let mut map = MapBuilder::new((params.lat, params.lon), params.zoom);
    map.add_basemap(&params.basemap);

    let mut notes = Vec::new();
    if params.add_naip {
        let naip = Expression::image_collection(NAIP_ASSET)
            .filter_calendar_range(params.year, params.year, "year")
            .filter_bounds(RegionSpec::Asset {
                asset: STUDY_AREA_ASSET.to_string(),
            });
        // Early years carry no NIR band, so fall back to natural color.
        let vis = if (2005..=2007).contains(&params.year) {
            VisParams::bands(&["R", "G", "B"])
        } else {
            VisParams::bands(&["N", "R", "G"])
        };
        map.add_expression_layer(naip, Some(vis), &format!("NAIP {}", params.year), true, 1.0);

        let count = NAIP_COUNT
            .iter()
            .find(|(year, _)| *year == params.year)
            .map(|(_, count)| *count)
            .unwrap_or(0);
        notes.push(format!("Number of images: {}", count));
    }

    map.add_expression_layer(study_area_layer(), None, "MRB", true, 1.0);

    let mut view = PageView::new(
        "naip",
        "NAIP Imagery for Missouri River Basins",
        map.finish(ctx.backend.as_ref()).await,
    );
    view.notes = notes;
    view
}
