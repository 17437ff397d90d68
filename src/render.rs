//! Map document assembly
//!
//! The renderer's half of the contract with the external mapping frontend:
//! a page accumulates layers, legends, and colorbars into a [`MapBuilder`],
//! then `finish` resolves every backend-backed layer (in order, later layers
//! drawn on top) and produces the serializable [`MapDocument`]. A per-layer
//! backend failure becomes one inline [`PageError`] and rendering of the
//! remaining layers continues.

use serde::{Deserialize, Serialize};

use crate::backend::{BackendClient, TileSource};
use crate::catalog::VisParams;
use crate::errors::BackendError;
use crate::expression::Expression;
use crate::legend::LegendSpec;
use crate::wms::WmsLayerSpec;

/// A localized, user-visible failure attached to the page instead of
/// aborting it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PageError {
    /// The layer or request the failure belongs to.
    pub source: String,
    pub message: String,
}

/// A resolved layer source the mapping frontend can draw directly.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerSource {
    Tiles(TileSource),
    Wms(WmsLayerSpec),
    Basemap { name: String },
    /// Inline vector geometry (e.g. an uploaded ROI boundary), drawn
    /// client-side.
    Vector {
        geojson: serde_json::Value,
        color: String,
        fill_color: String,
        width: u32,
    },
}

/// One entry of the map's layer list, in draw order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MapLayer {
    pub name: String,
    pub source: LayerSource,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub vis: Option<VisParams>,
    pub shown: bool,
    pub opacity: f64,
}

/// A continuous colorbar keyed to one raster layer's visualization params.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ColorbarSpec {
    pub label: String,
    pub min: f64,
    pub max: f64,
    pub palette: Vec<String>,
}

/// Side-by-side comparison with a draggable divider.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SplitView {
    pub left: MapLayer,
    pub right: MapLayer,
}

/// The complete rendering contract handed to the mapping frontend.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MapDocument {
    pub center: (f64, f64),
    pub zoom: u8,
    pub layers: Vec<MapLayer>,
    pub legends: Vec<LegendSpec>,
    pub colorbars: Vec<ColorbarSpec>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub split: Option<SplitView>,
    pub errors: Vec<PageError>,
}

/// A layer that may still need the backend to materialize it.
enum PendingLayer {
    Ready(MapLayer),
    Expression {
        expr: Expression,
        vis: Option<VisParams>,
        name: String,
        shown: bool,
        opacity: f64,
    },
}

/// A side of a split map before resolution.
pub enum SplitSide {
    Basemap(String),
    Expression {
        expr: Expression,
        vis: Option<VisParams>,
        name: String,
    },
    Wms { spec: WmsLayerSpec, name: String },
}

pub struct MapBuilder {
    center: (f64, f64),
    zoom: u8,
    layers: Vec<PendingLayer>,
    legends: Vec<LegendSpec>,
    colorbars: Vec<ColorbarSpec>,
    split: Option<(SplitSide, SplitSide)>,
    errors: Vec<PageError>,
}

impl MapBuilder {
    pub fn new(center: (f64, f64), zoom: u8) -> Self {
        Self {
            center,
            zoom,
            layers: Vec::new(),
            legends: Vec::new(),
            colorbars: Vec::new(),
            split: None,
            errors: Vec::new(),
        }
    }

    pub fn set_center(&mut self, lat: f64, lon: f64, zoom: u8) {
        self.center = (lat, lon);
        self.zoom = zoom;
    }

    /// Re-center on an uploaded ROI. Asset-backed ROIs resolve at the
    /// backend and do not move the view.
    pub fn center_on(&mut self, roi: &crate::roi::Roi, zoom: u8) {
        if let Some((lon, lat)) = roi.center() {
            self.center = (lat, lon);
            self.zoom = zoom;
        }
    }

    pub fn add_basemap(&mut self, name: &str) {
        self.layers.push(PendingLayer::Ready(MapLayer {
            name: name.to_string(),
            source: LayerSource::Basemap {
                name: name.to_string(),
            },
            vis: None,
            shown: true,
            opacity: 1.0,
        }));
    }

    pub fn add_expression_layer(
        &mut self,
        expr: Expression,
        vis: Option<VisParams>,
        name: &str,
        shown: bool,
        opacity: f64,
    ) {
        self.layers.push(PendingLayer::Expression {
            expr,
            vis,
            name: name.to_string(),
            shown,
            opacity,
        });
    }

    pub fn add_tile_layer(&mut self, url_template: &str, name: &str, attribution: Option<&str>) {
        self.layers.push(PendingLayer::Ready(MapLayer {
            name: name.to_string(),
            source: LayerSource::Tiles(TileSource {
                url_template: url_template.to_string(),
                attribution: attribution.map(|a| a.to_string()),
            }),
            vis: None,
            shown: true,
            opacity: 1.0,
        }));
    }

    pub fn add_wms_layer(&mut self, spec: WmsLayerSpec, name: &str) {
        self.layers.push(PendingLayer::Ready(MapLayer {
            name: name.to_string(),
            source: LayerSource::Wms(spec),
            vis: None,
            shown: true,
            opacity: 1.0,
        }));
    }

    pub fn add_vector_layer(
        &mut self,
        geojson: serde_json::Value,
        name: &str,
        color: &str,
        fill_color: &str,
        width: u32,
    ) {
        self.layers.push(PendingLayer::Ready(MapLayer {
            name: name.to_string(),
            source: LayerSource::Vector {
                geojson,
                color: color.to_string(),
                fill_color: fill_color.to_string(),
                width,
            },
            vis: None,
            shown: true,
            opacity: 1.0,
        }));
    }

    pub fn add_legend(&mut self, legend: LegendSpec) {
        self.legends.push(legend);
    }

    pub fn add_colorbar(&mut self, vis: &VisParams, label: &str) {
        self.colorbars.push(ColorbarSpec {
            label: label.to_string(),
            min: vis.min,
            max: vis.max,
            palette: vis.palette.clone(),
        });
    }

    pub fn split_map(&mut self, left: SplitSide, right: SplitSide) {
        self.split = Some((left, right));
    }

    pub fn add_error(&mut self, source: &str, message: impl std::fmt::Display) {
        self.errors.push(PageError {
            source: source.to_string(),
            message: message.to_string(),
        });
    }

    /// Resolve all pending layers against the backend and produce the map
    /// document. Layer order is preserved; a failing layer contributes one
    /// inline error and is omitted from the layer list.
    pub async fn finish(self, backend: &dyn BackendClient) -> MapDocument {
        let MapBuilder {
            center,
            zoom,
            layers,
            legends,
            colorbars,
            split,
            mut errors,
        } = self;

        let mut resolved = Vec::with_capacity(layers.len());
        for layer in layers {
            match layer {
                PendingLayer::Ready(layer) => resolved.push(layer),
                PendingLayer::Expression {
                    expr,
                    vis,
                    name,
                    shown,
                    opacity,
                } => match backend.render(&expr, vis.as_ref()).await {
                    Ok(tiles) => resolved.push(MapLayer {
                        name,
                        source: LayerSource::Tiles(tiles),
                        vis,
                        shown,
                        opacity,
                    }),
                    Err(e) => {
                        tracing::error!("Layer '{}' failed to render: {}", name, e);
                        errors.push(PageError {
                            source: name,
                            message: e.to_string(),
                        });
                    }
                },
            }
        }

        let mut split_view = None;
        if let Some((left, right)) = split {
            let left = resolve_side(backend, left, &mut errors).await;
            let right = resolve_side(backend, right, &mut errors).await;
            if let (Some(left), Some(right)) = (left, right) {
                split_view = Some(SplitView { left, right });
            }
        }

        MapDocument {
            center,
            zoom,
            layers: resolved,
            legends,
            colorbars,
            split: split_view,
            errors,
        }
    }
}

async fn resolve_side(
    backend: &dyn BackendClient,
    side: SplitSide,
    errors: &mut Vec<PageError>,
) -> Option<MapLayer> {
    match side {
        SplitSide::Basemap(name) => Some(MapLayer {
            source: LayerSource::Basemap { name: name.clone() },
            name,
            vis: None,
            shown: true,
            opacity: 1.0,
        }),
        SplitSide::Wms { spec, name } => Some(MapLayer {
            name,
            source: LayerSource::Wms(spec),
            vis: None,
            shown: true,
            opacity: 1.0,
        }),
        SplitSide::Expression { expr, vis, name } => {
            match backend.render(&expr, vis.as_ref()).await {
                Ok(tiles) => Some(MapLayer {
                    name,
                    source: LayerSource::Tiles(tiles),
                    vis,
                    shown: true,
                    opacity: 1.0,
                }),
                Err(e) => {
                    errors.push(PageError {
                        source: name,
                        message: e.to_string(),
                    });
                    None
                }
            }
        }
    }
}

/// Run a statistics request, mapping an empty zone to a no-data table and
/// any other failure to an inline page error. Returns `None` only on
/// failure; an empty zone yields `Some(TableResult::empty())`.
pub async fn try_reduce(
    backend: &dyn BackendClient,
    expr: &Expression,
    label: &str,
    errors: &mut Vec<PageError>,
) -> Option<crate::backend::TableResult> {
    match backend.reduce(expr).await {
        Ok(table) => Some(table),
        Err(BackendError::EmptyResultSet(_)) => Some(crate::backend::TableResult::empty()),
        Err(e) => {
            tracing::error!("Statistics request '{}' failed: {}", label, e);
            errors.push(PageError {
                source: label.to_string(),
                message: e.to_string(),
            });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::TableResult;
    use crate::errors::{BackendError, BackendResult};

    struct FailingBackend;

    #[async_trait::async_trait]
    impl BackendClient for FailingBackend {
        async fn render(
            &self,
            _expr: &Expression,
            _vis: Option<&VisParams>,
        ) -> BackendResult<TileSource> {
            Err(BackendError::RequestFailed("down".to_string()))
        }

        async fn reduce(&self, expr: &Expression) -> BackendResult<TableResult> {
            Err(BackendError::EmptyResultSet(expr.source.clone()))
        }

        async fn info(&self, _expr: &Expression) -> BackendResult<serde_json::Value> {
            Err(BackendError::RequestFailed("down".to_string()))
        }
    }

    #[test]
    fn failed_expression_layer_becomes_an_inline_error() {
        let mut builder = MapBuilder::new((40.0, -100.0), 4);
        builder.add_basemap("HYBRID");
        builder.add_expression_layer(
            Expression::image("USGS/SRTMGL1_003"),
            None,
            "DEM",
            true,
            1.0,
        );

        let doc = tokio_test::block_on(builder.finish(&FailingBackend));
        assert_eq!(doc.layers.len(), 1);
        assert_eq!(doc.layers[0].name, "HYBRID");
        assert_eq!(doc.errors.len(), 1);
        assert_eq!(doc.errors[0].source, "DEM");
    }

    #[test]
    fn empty_reduction_is_no_data_not_an_error() {
        let mut errors = Vec::new();
        let table = tokio_test::block_on(try_reduce(
            &FailingBackend,
            &Expression::image("JRC/GSW1_2/GlobalSurfaceWater"),
            "stats",
            &mut errors,
        ));
        assert_eq!(table, Some(TableResult::empty()));
        assert!(errors.is_empty());
    }
}
