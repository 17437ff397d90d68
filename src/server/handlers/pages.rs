use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};

use crate::context::PageContext;
use crate::pages::{self, PageEntry, PageView, RoiUpload};
use crate::roi::Roi;
use crate::server::app::AppState;

pub async fn list_pages(State(_state): State<AppState>) -> Json<&'static [PageEntry]> {
    Json(pages::PAGES)
}

/// Render a page with its default parameters.
pub async fn get_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PageView>, StatusCode> {
    let ctx = PageContext::new(state.config.clone(), state.backend.clone());
    let view = pages::render_page(&ctx, &slug, Value::Object(Default::default())).await;
    Ok(Json(view))
}

/// Render a page with caller-supplied parameters. Malformed parameters fall
/// back to the page's defaults rather than failing the request.
pub async fn render_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(params): Json<Value>,
) -> Result<Json<PageView>, StatusCode> {
    let ctx = PageContext::new(state.config.clone(), state.backend.clone());
    let view = pages::render_page(&ctx, &slug, params).await;
    Ok(Json(view))
}

/// Preview an ROI upload without rendering the page: parse the file and
/// return the polygon set and its bounding box, or the parse failure.
pub async fn preview_roi(
    State(_state): State<AppState>,
    Path(_slug): Path<String>,
    Json(upload): Json<RoiUpload>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let roi = upload.ingest().map_err(|e| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"error": e.to_string()})),
        )
    })?;
    let bbox = roi.bbox();
    match &roi {
        Roi::Uploaded { polygons, source } => {
            let geometry = geojson::Geometry::new(geojson::Value::from(polygons));
            Ok(Json(json!({
                "source": source,
                "polygons": polygons.0.len(),
                "bbox": bbox,
                "geojson": geometry,
            })))
        }
        // ingest_upload only ever produces uploaded polygon sets
        Roi::Asset { .. } => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "unexpected asset ROI"})),
        )),
    }
}
