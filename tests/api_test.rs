//! API integration tests
//!
//! Exercises the REST surface with an in-process server and a scripted
//! backend client.

mod common;

use std::sync::Arc;

use anyhow::Result;
use axum::http::StatusCode;
use axum_test::TestServer;
use base64::Engine;
use serde_json::{json, Value};

use basinview::config::Config;
use basinview::server::app::create_app;

use common::StubBackend;

fn setup_test_server(backend: StubBackend) -> Result<TestServer> {
    let mut config = Config::default();
    config.server.cors_origin = Some("*".to_string());
    let app = create_app(Arc::new(config), Arc::new(backend))?;
    let server = TestServer::new(app)?;
    Ok(server)
}

#[tokio::test]
async fn test_health_endpoint() -> Result<()> {
    let server = setup_test_server(StubBackend::default())?;

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["service"], "basinview");
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());

    Ok(())
}

#[tokio::test]
async fn test_page_registry() -> Result<()> {
    let server = setup_test_server(StubBackend::default())?;

    let response = server.get("/api/v1/pages").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let pages: Vec<Value> = response.json();
    assert_eq!(pages.len(), 11);
    assert_eq!(pages[0]["slug"], "home");
    assert!(pages.iter().any(|p| p["slug"] == "water"));

    Ok(())
}

#[tokio::test]
async fn test_resources_page_lists_reference_links() -> Result<()> {
    let server = setup_test_server(StubBackend::default())?;

    let response = server.get("/api/v1/pages/resources").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let view: Value = response.json();
    assert_eq!(view["title"], "Useful Resources");
    let notes = view["notes"].as_array().unwrap();
    assert!(notes
        .iter()
        .any(|n| n.as_str().unwrap().contains("USGS 3DEP Hydrology Program")));
    assert!(notes
        .iter()
        .any(|n| n.as_str().unwrap().contains("NASA EarthDEM Project")));

    Ok(())
}

#[tokio::test]
async fn test_render_page_with_defaults() -> Result<()> {
    let server = setup_test_server(StubBackend::default())?;

    let response = server.get("/api/v1/pages/home").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let view: Value = response.json();
    assert_eq!(view["slug"], "home");
    assert!(view["map"]["layers"].as_array().is_some_and(|l| !l.is_empty()));

    Ok(())
}

#[tokio::test]
async fn test_render_page_with_parameters() -> Result<()> {
    let server = setup_test_server(StubBackend::default())?;

    let response = server
        .post("/api/v1/pages/dem")
        .json(&json!({
            "dem_datasets": ["NASA SRTM"],
            "palette": "terrain"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let view: Value = response.json();
    assert_eq!(view["slug"], "dem");
    let layers = view["map"]["layers"].as_array().unwrap();
    assert!(layers.iter().any(|l| l["name"] == "NASA SRTM"));
    assert_eq!(view["map"]["errors"].as_array().unwrap().len(), 0);

    Ok(())
}

#[tokio::test]
async fn test_roi_preview_returns_polygons_and_bbox() -> Result<()> {
    let server = setup_test_server(StubBackend::default())?;

    let feature = r#"{
        "type": "Feature",
        "properties": {},
        "geometry": {
            "type": "Polygon",
            "coordinates": [[[-100.0, 40.0], [-99.0, 40.0], [-99.0, 41.0], [-100.0, 41.0], [-100.0, 40.0]]]
        }
    }"#;
    let response = server
        .post("/api/v1/pages/dem/roi")
        .json(&json!({
            "filename": "roi.geojson",
            "data_base64": base64::engine::general_purpose::STANDARD.encode(feature),
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let preview: Value = response.json();
    assert_eq!(preview["source"], "roi.geojson");
    assert_eq!(preview["polygons"], 1);
    assert_eq!(preview["bbox"], json!([-100.0, 40.0, -99.0, 41.0]));
    assert_eq!(preview["geojson"]["type"], "MultiPolygon");

    Ok(())
}

#[tokio::test]
async fn test_roi_preview_rejects_unsupported_format() -> Result<()> {
    let server = setup_test_server(StubBackend::default())?;

    let response = server
        .post("/api/v1/pages/dem/roi")
        .json(&json!({
            "filename": "roi.txt",
            "data_base64": base64::engine::general_purpose::STANDARD.encode("not a vector file"),
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("txt"));

    Ok(())
}

#[tokio::test]
async fn test_unknown_slug_falls_back() -> Result<()> {
    let server = setup_test_server(StubBackend::default())?;

    let response = server.get("/api/v1/pages/does-not-exist").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let view: Value = response.json();
    assert_eq!(view["slug"], "home");

    Ok(())
}
