//! Backend expression builder
//!
//! A declarative request against the external processing backend: a dataset
//! source plus an ordered list of operation descriptors, serialized as one
//! JSON document. The backend owns the evaluation semantics of every
//! operation (how mosaics resolve overlaps, how clustering converges, how
//! histograms bucket); this module only guarantees the *shape* of the
//! request: operation order, parameter names, and defaults.
//!
//! Builder methods consume and return the expression, so partially built
//! requests can never be observed and sharing a prefix requires an explicit
//! `clone()`. Operations applied to an image-collection source are evaluated
//! per-image by the backend; `Sum`/`MaxComposite` collapse a collection into
//! a single image.

use serde::{Deserialize, Serialize};

/// What kind of asset an expression starts from.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Image,
    ImageCollection,
    FeatureCollection,
}

/// A region parameter: a named boundary asset, an inline geometry, a point,
/// or a region the backend derives while evaluating the request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegionSpec {
    Asset { asset: String },
    Geometry { geojson: serde_json::Value },
    Point { lon: f64, lat: f64 },
    /// A `meters` disc around one random point drawn inside `within`, with
    /// the point's latitude capped at `max_lat`. The draw happens at the
    /// backend during evaluation.
    SampledBuffer {
        within: Box<Expression>,
        meters: f64,
        max_lat: f64,
    },
    /// The union geometry of an evaluated expression (e.g. a filtered
    /// watershed collection).
    Derived { expression: Box<Expression> },
}

/// Statistical reducers understood by the backend.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Reducer {
    Sum,
    Max,
    Min,
    Mean,
    Median,
}

/// Clustering methods for the unsupervised water classifier.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClusterMethod {
    XMeans,
}

/// Vector styling parameters (stroke color, stroke width, fill color), hex
/// RGBA strings as the backend expects them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StyleSpec {
    pub color: String,
    pub width: u32,
    pub fill_color: String,
}

/// One operation descriptor. Variant order here is irrelevant; what matters
/// is the order they are accumulated in [`Expression::ops`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    FilterDate { start: String, end: String },
    FilterCalendarRange { start: u32, end: u32, field: String },
    FilterBounds { region: RegionSpec },
    /// Keep features whose `field` starts with any of `prefixes`.
    FilterStartsWithAny { field: String, prefixes: Vec<String> },
    FilterInList { field: String, values: Vec<String> },
    Mosaic,
    First,
    Select { band: String },
    Rename { to: String },
    Clip { region: RegionSpec },
    Subtract { other: Box<Expression> },
    DefaultProjection { crs: String },
    Hillshade { azimuth: f64, altitude: f64 },
    Gt { value: f64 },
    Eq { value: f64 },
    SelfMask,
    /// Replace masked pixels with zero.
    Unmask,
    UpdateMask { mask: Box<Expression> },
    And { other: Box<Expression> },
    Remap { from: Vec<i64>, to: Vec<i64> },
    /// Collapse a collection by summing per-pixel.
    Sum,
    /// Collapse a collection by per-pixel maximum.
    MaxComposite,
    PixelArea,
    Divide { value: f64 },
    Style { style: StyleSpec },
    RandomVisualizer,
    Cluster {
        method: ClusterMethod,
        training_region: RegionSpec,
        scale: f64,
        num_pixels: u32,
    },
    /// Keep the clusters dominated by permanent water: a cluster counts as
    /// water when its pixel share within the permanent-water mask exceeds
    /// `cluster_threshold` (capped at `min_cluster_size` pixels).
    ClassifyWater {
        cluster_threshold: f64,
        min_cluster_size: f64,
    },
    /// Count/sum/mean/min/max of one property across a feature collection.
    AggregateStats { property: String },
    /// Sum of `property` grouped by the values of `group_by`.
    SumByGroup { property: String, group_by: String },
    /// Zonal statistics: reduce over each feature of `zones`.
    ReduceRegions {
        zones: Box<Expression>,
        reducer: Reducer,
        scale: f64,
    },
}

/// An immutable backend request: source asset plus accumulated operations.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Expression {
    pub source: String,
    pub kind: SourceKind,
    pub ops: Vec<Op>,
}

impl Expression {
    pub fn source(asset: &str, kind: SourceKind) -> Self {
        Self {
            source: asset.to_string(),
            kind,
            ops: Vec::new(),
        }
    }

    pub fn image(asset: &str) -> Self {
        Self::source(asset, SourceKind::Image)
    }

    pub fn image_collection(asset: &str) -> Self {
        Self::source(asset, SourceKind::ImageCollection)
    }

    pub fn feature_collection(asset: &str) -> Self {
        Self::source(asset, SourceKind::FeatureCollection)
    }

    fn op(mut self, op: Op) -> Self {
        self.ops.push(op);
        self
    }

    pub fn filter_date(self, start: &str, end: &str) -> Self {
        self.op(Op::FilterDate {
            start: start.to_string(),
            end: end.to_string(),
        })
    }

    pub fn filter_calendar_range(self, start: u32, end: u32, field: &str) -> Self {
        self.op(Op::FilterCalendarRange {
            start,
            end,
            field: field.to_string(),
        })
    }

    pub fn filter_bounds(self, region: RegionSpec) -> Self {
        self.op(Op::FilterBounds { region })
    }

    pub fn filter_starts_with_any(self, field: &str, prefixes: &[&str]) -> Self {
        self.op(Op::FilterStartsWithAny {
            field: field.to_string(),
            prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
        })
    }

    pub fn filter_in_list(self, field: &str, values: &[&str]) -> Self {
        self.op(Op::FilterInList {
            field: field.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        })
    }

    pub fn mosaic(self) -> Self {
        self.op(Op::Mosaic)
    }

    pub fn first(self) -> Self {
        self.op(Op::First)
    }

    pub fn select(self, band: &str) -> Self {
        self.op(Op::Select {
            band: band.to_string(),
        })
    }

    pub fn rename(self, to: &str) -> Self {
        self.op(Op::Rename { to: to.to_string() })
    }

    pub fn clip(self, region: RegionSpec) -> Self {
        self.op(Op::Clip { region })
    }

    /// Elevation difference against another expression. Identical operands
    /// are accepted and produce a degenerate zero-valued difference; the
    /// backend answers that request like any other.
    pub fn subtract(self, other: Expression) -> Self {
        self.op(Op::Subtract {
            other: Box::new(other),
        })
    }

    pub fn default_projection(self, crs: &str) -> Self {
        self.op(Op::DefaultProjection {
            crs: crs.to_string(),
        })
    }

    pub fn hillshade(self, azimuth: f64, altitude: f64) -> Self {
        self.op(Op::Hillshade { azimuth, altitude })
    }

    pub fn gt(self, value: f64) -> Self {
        self.op(Op::Gt { value })
    }

    pub fn eq(self, value: f64) -> Self {
        self.op(Op::Eq { value })
    }

    pub fn self_mask(self) -> Self {
        self.op(Op::SelfMask)
    }

    pub fn unmask(self) -> Self {
        self.op(Op::Unmask)
    }

    pub fn update_mask(self, mask: Expression) -> Self {
        self.op(Op::UpdateMask {
            mask: Box::new(mask),
        })
    }

    pub fn and(self, other: Expression) -> Self {
        self.op(Op::And {
            other: Box::new(other),
        })
    }

    pub fn remap(self, from: &[i64], to: &[i64]) -> Self {
        self.op(Op::Remap {
            from: from.to_vec(),
            to: to.to_vec(),
        })
    }

    pub fn sum(self) -> Self {
        self.op(Op::Sum)
    }

    pub fn max_composite(self) -> Self {
        self.op(Op::MaxComposite)
    }

    pub fn pixel_area(self) -> Self {
        self.op(Op::PixelArea)
    }

    pub fn divide(self, value: f64) -> Self {
        self.op(Op::Divide { value })
    }

    pub fn style(self, color: &str, width: u32, fill_color: &str) -> Self {
        self.op(Op::Style {
            style: StyleSpec {
                color: color.to_string(),
                width,
                fill_color: fill_color.to_string(),
            },
        })
    }

    pub fn random_visualizer(self) -> Self {
        self.op(Op::RandomVisualizer)
    }

    pub fn cluster(
        self,
        method: ClusterMethod,
        training_region: RegionSpec,
        scale: f64,
        num_pixels: u32,
    ) -> Self {
        self.op(Op::Cluster {
            method,
            training_region,
            scale,
            num_pixels,
        })
    }

    pub fn classify_water(self, cluster_threshold: f64, min_cluster_size: f64) -> Self {
        self.op(Op::ClassifyWater {
            cluster_threshold,
            min_cluster_size,
        })
    }

    pub fn aggregate_stats(self, property: &str) -> Self {
        self.op(Op::AggregateStats {
            property: property.to_string(),
        })
    }

    pub fn sum_by_group(self, property: &str, group_by: &str) -> Self {
        self.op(Op::SumByGroup {
            property: property.to_string(),
            group_by: group_by.to_string(),
        })
    }

    pub fn reduce_regions(self, zones: Expression, reducer: Reducer, scale: f64) -> Self {
        self.op(Op::ReduceRegions {
            zones: Box::new(zones),
            reducer,
            scale,
        })
    }

    /// Per-image inundated area in hectares, reduced over `zones`. The
    /// standard chain shared by the water and trend pages.
    pub fn area_hectares(self, zones: Expression, scale: f64) -> Self {
        self.pixel_area()
            .divide(1e4)
            .reduce_regions(zones, Reducer::Sum, scale)
    }
}
