//! Useful Resources page: reference links, no analysis

use serde::Deserialize;

use crate::context::PageContext;
use crate::render::MapBuilder;

use super::PageView;

#[derive(Deserialize, Debug, Default)]
pub struct Params {}

pub async fn render(ctx: &PageContext, _params: Params) -> PageView {
    let mut map = MapBuilder::new((40.0, -100.0), 5);
    map.add_basemap("HYBRID");

    let mut view = PageView::new(
        "resources",
        "Useful Resources",
        map.finish(ctx.backend.as_ref()).await,
    );
    view.notes = vec![
        "Data".to_string(),
        "[USGS 3DEP Hydrology Program](https://pubs.usgs.gov/tm/11/b11/tm11b11.pdf)".to_string(),
        "[NASA EarthDEM Project](https://earthdata.nasa.gov/learn/articles/earthdem-available-through-csda): Multi-temporal 2-m DEM"
            .to_string(),
        "![](https://cdn.earthdata.nasa.gov/conduit/upload/18247/Virgin_River__Nevada_2_reduced.jpg)"
            .to_string(),
    ];
    view
}
