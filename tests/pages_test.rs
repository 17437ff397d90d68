//! Page rendering integration tests
//!
//! Pages are pure functions of context and parameters; these tests drive
//! them against a scripted backend and assert on the resulting map
//! documents, tables, and inline errors.

mod common;

use base64::Engine;
use serde_json::json;

use basinview::pages::{self, dem, water, RoiUpload};
use basinview::render::{LayerSource, MapDocument};

use common::{test_context, StubBackend};

fn layer_names(map: &MapDocument) -> Vec<&str> {
    map.layers.iter().map(|l| l.name.as_str()).collect()
}

fn tile_url(map: &MapDocument, name: &str) -> Option<String> {
    map.layers.iter().find(|l| l.name == name).and_then(|l| match &l.source {
        LayerSource::Tiles(tiles) => Some(tiles.url_template.clone()),
        _ => None,
    })
}

fn encode(data: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(data)
}

const ROI_GEOJSON: &str = r#"{
    "type": "Feature",
    "properties": {},
    "geometry": {
        "type": "Polygon",
        "coordinates": [[[-100.0, 40.0], [-99.0, 40.0], [-99.0, 41.0], [-100.0, 41.0], [-100.0, 40.0]]]
    }
}"#;

#[tokio::test]
async fn failing_layer_leaves_the_rest_rendered() {
    // STRM resolves to CGIAR/SRTM90_V4; scripting that asset to fail must
    // drop exactly that layer and record exactly one inline error.
    let ctx = test_context(StubBackend::failing_on("CGIAR/SRTM90_V4"));
    let params = dem::Params {
        dem_datasets: vec!["STRM".to_string(), "NASA SRTM".to_string()],
        ..dem::Params::default()
    };

    let view = dem::render(&ctx, params).await;

    let names = layer_names(&view.map);
    assert!(names.contains(&"NASA SRTM"));
    assert!(!names.contains(&"STRM"));
    assert!(names.contains(&"Study Area"));
    assert_eq!(view.map.errors.len(), 1);
    assert_eq!(view.map.errors[0].source, "STRM");
}

#[tokio::test]
async fn identical_difference_resolves_to_zero_valued_tiles() {
    let ctx = test_context(StubBackend::default());
    let params = dem::Params {
        difference: Some(dem::DiffParams {
            first: "NASA SRTM".to_string(),
            second: "NASA SRTM".to_string(),
            ..dem::DiffParams::default()
        }),
        clip: false,
        ..dem::Params::default()
    };

    let view = dem::render(&ctx, params).await;

    assert!(view.map.errors.is_empty());
    let url = tile_url(&view.map, "NASA SRTM - NASA SRTM").expect("difference layer rendered");
    assert!(url.contains("/zero/"), "expected zero-difference tiles, got {}", url);
}

#[tokio::test]
async fn rejected_upload_keeps_previous_roi() {
    let ctx = test_context(StubBackend::default());
    let params = dem::Params {
        roi_upload: Some(RoiUpload {
            filename: "roi.txt".to_string(),
            data_base64: encode("not a vector file"),
        }),
        ..dem::Params::default()
    };

    let view = dem::render(&ctx, params).await;

    assert_eq!(view.map.errors.len(), 1);
    assert_eq!(view.map.errors[0].source, "ROI upload");
    assert!(view.map.errors[0].message.contains("txt"));
    // No uploaded boundary was drawn; the study area remains in effect.
    assert!(!layer_names(&view.map).contains(&"ROI"));
    assert!(layer_names(&view.map).contains(&"Study Area"));
}

#[tokio::test]
async fn geojson_upload_draws_the_boundary() {
    let ctx = test_context(StubBackend::default());
    let params = dem::Params {
        roi_upload: Some(RoiUpload {
            filename: "roi.geojson".to_string(),
            data_base64: encode(ROI_GEOJSON),
        }),
        ..dem::Params::default()
    };

    let view = dem::render(&ctx, params).await;

    assert!(view.map.errors.is_empty());
    let roi_layer = view
        .map
        .layers
        .iter()
        .find(|l| l.name == "ROI")
        .expect("uploaded boundary drawn");
    assert!(matches!(roi_layer.source, LayerSource::Vector { .. }));
}

#[tokio::test]
async fn empty_statistics_zone_reports_no_data() {
    let ctx = test_context(StubBackend::with_empty_reductions());
    let params = water::Params {
        submit: true,
        ..water::Params::default()
    };

    let view = water::render(&ctx, params).await;

    // An empty zone is an answer, not a failure.
    assert!(view.map.errors.is_empty());
    assert!(view
        .notes
        .iter()
        .any(|n| n.contains("No inundation observations")));
    assert!(view.tables.is_empty());
}

#[tokio::test]
async fn water_submit_produces_areas_and_chart() {
    let ctx = test_context(StubBackend::default());
    let params = water::Params {
        submit: true,
        ..water::Params::default()
    };

    let view = water::render(&ctx, params).await;

    assert!(view.map.errors.is_empty());
    assert_eq!(view.charts.len(), 1);
    assert_eq!(view.charts[0].labels, vec!["2019"]);
    assert!(view
        .tables
        .iter()
        .any(|t| t.title.contains("NAIP water area")));
    let names = layer_names(&view.map);
    assert!(names.contains(&"NAIP 2019"));
    assert!(names.contains(&"NAIP Water Occurrence"));
}

#[tokio::test]
async fn unknown_watershed_is_an_inline_error() {
    let ctx = test_context(StubBackend::default());
    let params = water::Params {
        watershed: "0000000000".to_string(),
        submit: true,
        ..water::Params::default()
    };

    let view = water::render(&ctx, params).await;

    assert_eq!(view.map.errors.len(), 1);
    assert_eq!(view.map.errors[0].source, "0000000000");
}

#[tokio::test]
async fn unknown_slug_falls_back_to_the_first_page() {
    let ctx = test_context(StubBackend::default());
    let view = pages::render_page(&ctx, "no-such-page", json!({})).await;
    assert_eq!(view.slug, "home");
}

#[tokio::test]
async fn malformed_parameters_fall_back_to_defaults() {
    let ctx = test_context(StubBackend::default());
    let view = pages::render_page(&ctx, "dem", json!({"opacity": "not a number"})).await;
    assert_eq!(view.slug, "dem");
    assert!(view.map.errors.is_empty());
}
