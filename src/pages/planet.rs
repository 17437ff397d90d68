//! Planet imagery page
//!
//! Planet basemap mosaics are served straight from the Planet tile API; the
//! backend is not involved. A missing API key or an out-of-range period
//! surfaces as an inline error instead of failing the whole page.

use serde::Deserialize;

use crate::catalog::HUC08_ASSET;
use crate::context::PageContext;
use crate::expression::Expression;
use crate::render::MapBuilder;

use super::{study_area_layer, PageView};

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    Quarterly,
    Monthly,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Params {
    pub basemap: String,
    pub cadence: Cadence,
    pub year: u32,
    pub quarter: u32,
    pub month: u32,
    pub lat: f64,
    pub lon: f64,
    pub zoom: u8,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            basemap: "ROADMAP".to_string(),
            cadence: Cadence::Quarterly,
            year: 2020,
            quarter: 1,
            month: 1,
            lat: 40.0,
            lon: -100.0,
            zoom: 4,
        }
    }
}

pub async fn render(ctx: &PageContext, params: Params) -> PageView {
    let mut map = MapBuilder::new((params.lat, params.lon), params.zoom);
    map.add_basemap(&params.basemap);

    match planet_mosaic_url(ctx.config.planet_api_key.as_deref(), &params) {
        Ok((url, name)) => map.add_tile_layer(&url, &name, Some("Planet")),
        Err(message) => map.add_error("Planet imagery", message),
    }

    let huc8 = Expression::feature_collection(HUC08_ASSET)
        .filter_starts_with_any("huc8", &["05", "07", "10"])
        .style("000000", 1, "00000000");
    map.add_expression_layer(huc8, None, "NHD-HUC8", false, 1.0);
    map.add_expression_layer(study_area_layer(), None, "MRB", true, 1.0);

    PageView::new(
        "planet",
        "Planet Imagery for Missouri River Basins",
        map.finish(ctx.backend.as_ref()).await,
    )
}

fn planet_mosaic_url(api_key: Option<&str>, params: &Params) -> Result<(String, String), String> {
    let api_key = api_key.ok_or_else(|| "Planet API key is not configured".to_string())?;
    match params.cadence {
        Cadence::Quarterly => {
            if !(1..=4).contains(&params.quarter) {
                return Err(format!("Invalid quarter: {}", params.quarter));
            }
            let mosaic = format!("global_quarterly_{}q{}_mosaic", params.year, params.quarter);
            Ok((
                format!(
                    "https://tiles.planet.com/basemaps/v1/planet-tiles/{}/gmap/{{z}}/{{x}}/{{y}}.png?api_key={}",
                    mosaic, api_key
                ),
                format!("Planet {} Q{}", params.year, params.quarter),
            ))
        }
        Cadence::Monthly => {
            if !(1..=12).contains(&params.month) {
                return Err(format!("Invalid month: {}", params.month));
            }
            let mosaic = format!("global_monthly_{}_{:02}_mosaic", params.year, params.month);
            Ok((
                format!(
                    "https://tiles.planet.com/basemaps/v1/planet-tiles/{}/gmap/{{z}}/{{x}}/{{y}}.png?api_key={}",
                    mosaic, api_key
                ),
                format!("Planet {}-{:02}", params.year, params.month),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_is_an_inline_error() {
        let err = planet_mosaic_url(None, &Params::default()).unwrap_err();
        assert!(err.contains("API key"));
    }

    #[test]
    fn quarter_out_of_range_is_an_error() {
        let params = Params {
            quarter: 5,
            ..Params::default()
        };
        assert!(planet_mosaic_url(Some("test-key"), &params).is_err());
    }

    #[test]
    fn monthly_mosaic_url_is_zero_padded() {
        let params = Params {
            cadence: Cadence::Monthly,
            year: 2021,
            month: 3,
            ..Params::default()
        };
        let (url, name) = planet_mosaic_url(Some("test-key"), &params).unwrap();
        assert!(url.contains("global_monthly_2021_03_mosaic"));
        assert!(url.contains("api_key=test-key"));
        assert_eq!(name, "Planet 2021-03");
    }
}
