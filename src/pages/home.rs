//! Home page: study area overview

use serde::Deserialize;

use crate::catalog::HUC02_ASSET;
use crate::context::PageContext;
use crate::expression::Expression;
use crate::render::MapBuilder;

use super::PageView;

#[derive(Deserialize, Debug, Default)]
pub struct Params {}

pub async fn render(ctx: &PageContext, _params: Params) -> PageView {
    let mut map = MapBuilder::new((40.0, -100.0), 5);

    let huc2 = Expression::feature_collection(HUC02_ASSET)
        .filter_in_list(
            "name",
            &["Upper Mississippi Region", "Missouri Region", "Ohio Region"],
        )
        .style("006633", 2, "e5ffcc44");
    map.add_expression_layer(huc2, None, "NHD-HU2", true, 1.0);

    let study_area = Expression::feature_collection(crate::catalog::STUDY_AREA_ASSET)
        .style("0000FF", 2, "00000000");
    map.add_expression_layer(study_area, None, "Study Area", true, 1.0);

    let mut view = PageView::new("home", "Home", map.finish(ctx.backend.as_ref()).await);
    view.notes = vec![
        "Interactive dashboard for the Non-floodplain Wetlands (NFW) project.".to_string(),
        "Study area: the Mississippi River system (Upper Mississippi, Ohio, and Missouri River Basins)."
            .to_string(),
    ];
    view
}
