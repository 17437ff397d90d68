//! Dataset catalog
//!
//! Per-page mappings from display label to backend dataset descriptor, built
//! once at startup and immutable thereafter. A descriptor carries everything
//! needed to open the dataset as an expression: the backend asset id, the
//! source kind, an optional composite step (collections that must be
//! mosaicked or reduced to their first image before use), band selection,
//! and default visualization parameters.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{CatalogError, CatalogResult};
use crate::expression::{Expression, SourceKind};
use crate::legend::BuiltinLegend;
use crate::palette;

/// Study-area boundary used as the default ROI on every page.
pub const STUDY_AREA_ASSET: &str = "users/giswqs/MRB/NWI_HU8_Boundary_Simplify";

/// Watershed boundary datasets.
pub const HUC02_ASSET: &str = "USGS/WBD/2017/HUC02";
pub const HUC08_ASSET: &str = "USGS/WBD/2017/HUC08";
pub const HUC10_ASSET: &str = "USGS/WBD/2017/HUC10";

/// Depression-sink overlays for the DEM page.
pub const SINKS_30M_ASSET: &str = "users/giswqs/MRB/NED_30m_sinks";
pub const SINKS_10M_ASSET: &str = "users/giswqs/MRB/NED_10m_sinks";

/// NAIP aerial imagery collection.
pub const NAIP_ASSET: &str = "USDA/NAIP/DOQQ";

/// JRC global surface water mapping layers.
pub const JRC_WATER_ASSET: &str = "JRC/GSW1_2/GlobalSurfaceWater";
pub const JRC_MONTHLY_ASSET: &str = "JRC/GSW1_2/MonthlyHistory";
pub const JRC_MONTHLY_V13_ASSET: &str = "JRC/GSW1_3/MonthlyHistory";

/// How a collection source becomes a single usable image.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composite {
    Mosaic,
    First,
}

/// Default visualization parameters for a dataset.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VisParams {
    pub min: f64,
    pub max: f64,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub palette: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bands: Option<Vec<String>>,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_opacity() -> f64 {
    1.0
}

impl VisParams {
    pub fn new(min: f64, max: f64, palette: Vec<String>) -> Self {
        debug_assert!(min <= max, "vis params must satisfy min <= max");
        Self {
            min,
            max,
            palette,
            bands: None,
            opacity: 1.0,
        }
    }

    pub fn bands(bands: &[&str]) -> Self {
        Self {
            min: 0.0,
            max: 255.0,
            palette: Vec::new(),
            bands: Some(bands.iter().map(|b| b.to_string()).collect()),
            opacity: 1.0,
        }
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }
}

/// An immutable catalog entry.
#[derive(Debug, Clone)]
pub struct DatasetRef {
    pub label: String,
    pub asset: String,
    pub kind: SourceKind,
    pub composite: Option<Composite>,
    pub band: Option<String>,
    pub rename_to: Option<String>,
    pub vis: Option<VisParams>,
    pub legend: Option<BuiltinLegend>,
}

impl DatasetRef {
    fn image(label: &str, asset: &str) -> Self {
        Self {
            label: label.to_string(),
            asset: asset.to_string(),
            kind: SourceKind::Image,
            composite: None,
            band: None,
            rename_to: None,
            vis: None,
            legend: None,
        }
    }

    fn collection(label: &str, asset: &str, composite: Composite) -> Self {
        Self {
            kind: SourceKind::ImageCollection,
            composite: Some(composite),
            ..Self::image(label, asset)
        }
    }

    fn band(mut self, band: &str) -> Self {
        self.band = Some(band.to_string());
        self
    }

    fn rename(mut self, to: &str) -> Self {
        self.rename_to = Some(to.to_string());
        self
    }

    fn vis(mut self, vis: VisParams) -> Self {
        self.vis = Some(vis);
        self
    }

    fn legend(mut self, legend: BuiltinLegend) -> Self {
        self.legend = Some(legend);
        self
    }

    /// Open this dataset as a backend expression, applying the composite and
    /// band-selection recipe recorded in the catalog.
    pub fn expression(&self) -> Expression {
        let mut expr = Expression::source(&self.asset, self.kind);
        match self.composite {
            Some(Composite::Mosaic) => expr = expr.mosaic(),
            Some(Composite::First) => expr = expr.first(),
            None => {}
        }
        if let Some(band) = &self.band {
            expr = expr.select(band);
        }
        if let Some(to) = &self.rename_to {
            expr = expr.rename(to);
        }
        expr
    }
}

fn terrain_vis() -> VisParams {
    VisParams::new(
        0.0,
        4000.0,
        palette::get_palette("terrain", 15).expect("terrain palette registered"),
    )
}

/// DEM datasets offered by the DEM and split pages.
pub static DEM_DATASETS: Lazy<IndexMap<String, DatasetRef>> = Lazy::new(|| {
    let entries = vec![
        DatasetRef::image("STRM", "CGIAR/SRTM90_V4").vis(terrain_vis()),
        DatasetRef::image("NASA SRTM", "USGS/SRTMGL1_003")
            .band("elevation")
            .vis(terrain_vis()),
        DatasetRef::image("NASA DEM", "NASA/NASADEM_HGT/001")
            .band("elevation")
            .vis(terrain_vis()),
        DatasetRef::image("ASTER GDEM", "projects/sat-io/open-datasets/ASTER/GDEM")
            .vis(terrain_vis()),
        DatasetRef::image("GMTED", "USGS/GMTED2010")
            .band("be75")
            .rename("elevation")
            .vis(terrain_vis()),
        DatasetRef::collection("ALOS DEM", "JAXA/ALOS/AW3D30/V3_2", Composite::Mosaic)
            .band("DSM")
            .rename("elevation")
            .vis(terrain_vis()),
        DatasetRef::collection("GLO-30", "projects/sat-io/open-datasets/GLO-30", Composite::Mosaic)
            .rename("elevation")
            .vis(terrain_vis()),
        DatasetRef::collection("FABDEM", "projects/sat-io/open-datasets/FABDEM", Composite::Mosaic)
            .rename("elevation")
            .vis(terrain_vis()),
        DatasetRef::image("NED", "USGS/3DEP/10m").vis(terrain_vis()),
    ];
    entries.into_iter().map(|d| (d.label.clone(), d)).collect()
});

/// Land-cover datasets offered by the DEM page.
pub static LANDCOVER_DATASETS: Lazy<IndexMap<String, DatasetRef>> = Lazy::new(|| {
    let entries = vec![
        DatasetRef::collection("ESA WorldCover", "ESA/WorldCover/v100", Composite::First)
            .legend(BuiltinLegend::EsaWorldCover),
        DatasetRef::collection(
            "ESRI Global Land Cover",
            "projects/sat-io/open-datasets/landcover/ESRI_Global-LULC_10m",
            Composite::Mosaic,
        )
        .vis(VisParams::new(
            1.0,
            10.0,
            BuiltinLegend::EsriLandCover.colors(),
        ))
        .legend(BuiltinLegend::EsriLandCover),
        DatasetRef::image("NLCD 2016", "USGS/NLCD_RELEASES/2016_REL/2016")
            .band("landcover")
            .legend(BuiltinLegend::Nlcd),
    ];
    entries.into_iter().map(|d| (d.label.clone(), d)).collect()
});

/// Surface-water datasets page entries (JRC global surface water bands).
pub static SURFACE_WATER_DATASETS: Lazy<IndexMap<String, DatasetRef>> = Lazy::new(|| {
    let ndwi = palette::get_palette("ndwi", 6).expect("ndwi palette registered");
    let entries = vec![
        DatasetRef::image("JRC Water Occurrence", JRC_WATER_ASSET)
            .band("occurrence")
            .vis(VisParams::new(0.0, 100.0, ndwi.clone())),
        DatasetRef::image("JRC Max Water Extent", JRC_WATER_ASSET)
            .band("max_extent")
            .vis(VisParams::new(0.0, 1.0, vec!["ffffff".into(), "0000ff".into()])),
        DatasetRef::image("JRC Water Seasonality", JRC_WATER_ASSET)
            .band("seasonality")
            .vis(VisParams::new(0.0, 12.0, ndwi)),
    ];
    entries.into_iter().map(|d| (d.label.clone(), d)).collect()
});

/// North Dakota LiDAR tile-index collections for the LiDAR page.
pub static LIDAR_INDEX_DATASETS: Lazy<IndexMap<String, DatasetRef>> = Lazy::new(|| {
    let entries = vec![
        ("ND - James River Basin LiDAR Phase 1", "users/giswqs/MRB/ND_IndexLiDARJamesRiverPh1QL3"),
        ("ND - James River Basin LiDAR Phase 2", "users/giswqs/MRB/ND_IndexLiDARJamesRiverPh2QL3"),
        ("ND - James River Basin LiDAR Phase 3", "users/giswqs/MRB/ND_IndexLiDARJamesRiverPh3QL3"),
        ("ND - James River Basin LiDAR Phase 4", "users/giswqs/MRB/ND_IndexLiDARJamesRiverPh4QL3"),
        ("ND - James River Basin LiDAR Phase 5", "users/giswqs/MRB/ND_IndexLiDARJamesRiverPh5QL3"),
        ("ND - James River Basin LiDAR Phase 6", "users/giswqs/MRB/ND_IndexLiDARJamesRiverPh6QL3"),
        ("ND - James River Basin LiDAR QL2", "users/giswqs/MRB/ND_IndexLiDARJamesRiverQL2"),
        ("ND - Kidder County LiDAR", "users/giswqs/MRB/ND_IndexLiDARKidderCnty2015QL2"),
        ("ND - McKenzie County LiDAR 2014", "users/giswqs/MRB/ND_IndexLiDARMcKenzieCnty2014QL2"),
        ("ND - Red River Basin Mapping Initiative 2008-2010", "users/giswqs/MRB/ND_IndexLiDARRedRiverQL3"),
        ("ND - Stark County LiDAR 2016", "users/giswqs/MRB/ND_IndexLiDARStarkCnty2016QL3"),
    ];
    entries
        .into_iter()
        .map(|(label, asset)| {
            let mut d = DatasetRef::image(label, asset);
            d.kind = SourceKind::FeatureCollection;
            (d.label.clone(), d)
        })
        .collect()
});

/// Look up a dataset by display label within one catalog group.
pub fn lookup<'a>(
    group: &'a IndexMap<String, DatasetRef>,
    label: &str,
) -> CatalogResult<&'a DatasetRef> {
    group
        .get(label)
        .ok_or_else(|| CatalogError::UnknownDataset(label.to_string()))
}

/// Basemap names the mapping frontend knows how to draw itself.
pub fn basemap_names() -> Vec<&'static str> {
    vec!["ROADMAP", "SATELLITE", "TERRAIN", "HYBRID", "OpenStreetMap"]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_groups() -> Vec<&'static IndexMap<String, DatasetRef>> {
        vec![
            &DEM_DATASETS,
            &LANDCOVER_DATASETS,
            &SURFACE_WATER_DATASETS,
            &LIDAR_INDEX_DATASETS,
        ]
    }

    #[test]
    fn every_default_vis_is_ordered() {
        for group in all_groups() {
            for dataset in group.values() {
                if let Some(vis) = &dataset.vis {
                    assert!(
                        vis.min <= vis.max,
                        "{}: min {} > max {}",
                        dataset.label,
                        vis.min,
                        vis.max
                    );
                }
            }
        }
    }

    #[test]
    fn lookup_rejects_unknown_label() {
        let err = lookup(&DEM_DATASETS, "Mystery DEM").unwrap_err();
        assert_eq!(err, CatalogError::UnknownDataset("Mystery DEM".to_string()));
    }

    #[test]
    fn collection_recipe_produces_composite_ops() {
        let alos = lookup(&DEM_DATASETS, "ALOS DEM").unwrap();
        let expr = alos.expression();
        let json = serde_json::to_value(&expr).unwrap();
        let ops: Vec<&str> = json["ops"]
            .as_array()
            .unwrap()
            .iter()
            .map(|op| op["op"].as_str().unwrap())
            .collect();
        assert_eq!(ops, vec!["mosaic", "select", "rename"]);
    }
}
