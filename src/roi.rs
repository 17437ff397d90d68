//! Region-of-interest ingestion
//!
//! Uploaded vector files (GeoJSON, KML, or a zipped Shapefile) become a
//! polygon set usable as an ROI. The upload is written to a scoped temporary
//! file, the parser matching its extension is invoked, and the temporary
//! storage is dropped on every exit path. A failed parse returns an error
//! and nothing else: the caller keeps whatever ROI was previously in effect.

use std::io::Write;
use std::path::Path;

use geo_types::{Geometry, MultiPolygon, Polygon};
use tracing::debug;

use crate::catalog::STUDY_AREA_ASSET;
use crate::errors::{RoiError, RoiResult};
use crate::expression::RegionSpec;

/// The current region of interest: either a fixed boundary asset resolved by
/// the backend, or polygons parsed from an upload.
#[derive(Debug, Clone, PartialEq)]
pub enum Roi {
    Asset { asset: String },
    Uploaded { polygons: MultiPolygon<f64>, source: String },
}

impl Default for Roi {
    fn default() -> Self {
        Roi::Asset {
            asset: STUDY_AREA_ASSET.to_string(),
        }
    }
}

impl Roi {
    /// Region parameter for backend expressions.
    pub fn region_spec(&self) -> RegionSpec {
        match self {
            Roi::Asset { asset } => RegionSpec::Asset {
                asset: asset.clone(),
            },
            Roi::Uploaded { polygons, .. } => RegionSpec::Geometry {
                geojson: serde_json::to_value(geojson::Geometry::new(geojson::Value::from(
                    polygons,
                )))
                .expect("multipolygon serializes as geojson"),
            },
        }
    }

    /// Bounding box `(min_lon, min_lat, max_lon, max_lat)` of the exterior
    /// rings. Asset-backed ROIs have no local geometry.
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        let polygons = match self {
            Roi::Asset { .. } => return None,
            Roi::Uploaded { polygons, .. } => polygons,
        };
        let mut bounds: Option<(f64, f64, f64, f64)> = None;
        for polygon in polygons.iter() {
            for coord in polygon.exterior().coords() {
                bounds = Some(match bounds {
                    None => (coord.x, coord.y, coord.x, coord.y),
                    Some((min_x, min_y, max_x, max_y)) => (
                        min_x.min(coord.x),
                        min_y.min(coord.y),
                        max_x.max(coord.x),
                        max_y.max(coord.y),
                    ),
                });
            }
        }
        bounds
    }

    /// Center of the ROI's bounding box, for map re-centering after an
    /// upload.
    pub fn center(&self) -> Option<(f64, f64)> {
        self.bbox()
            .map(|(min_x, min_y, max_x, max_y)| ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0))
    }
}

/// Supported upload formats, selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorFormat {
    GeoJson,
    Kml,
    ShapefileZip,
}

impl VectorFormat {
    /// Dispatch on the (lowercased) extension of the uploaded filename.
    pub fn from_filename(filename: &str) -> RoiResult<Self> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "geojson" | "json" => Ok(VectorFormat::GeoJson),
            "kml" => Ok(VectorFormat::Kml),
            "zip" => Ok(VectorFormat::ShapefileZip),
            other => Err(RoiError::InvalidFormat(other.to_string())),
        }
    }
}

/// Parse an uploaded vector file into an ROI.
pub fn ingest_upload(filename: &str, data: &[u8]) -> RoiResult<Roi> {
    let format = VectorFormat::from_filename(filename)?;

    // Scoped temporary file; dropped (and deleted) on every path out.
    let mut tmp = tempfile::NamedTempFile::new()?;
    tmp.write_all(data)?;
    tmp.flush()?;

    let polygons = match format {
        VectorFormat::GeoJson => parse_geojson(tmp.path())?,
        VectorFormat::Kml => parse_kml(tmp.path())?,
        VectorFormat::ShapefileZip => parse_shapefile_zip(tmp.path())?,
    };

    if polygons.0.is_empty() {
        return Err(RoiError::EmptyGeometry);
    }
    debug!(
        "Parsed ROI upload '{}': {} polygon(s)",
        filename,
        polygons.0.len()
    );
    Ok(Roi::Uploaded {
        polygons,
        source: filename.to_string(),
    })
}

fn collect_polygons(geometries: impl IntoIterator<Item = Geometry<f64>>) -> MultiPolygon<f64> {
    let mut polygons: Vec<Polygon<f64>> = Vec::new();
    for geometry in geometries {
        match geometry {
            Geometry::Polygon(p) => polygons.push(p),
            Geometry::MultiPolygon(mp) => polygons.extend(mp.0),
            Geometry::GeometryCollection(gc) => {
                polygons.extend(collect_polygons(gc.0).0);
            }
            // Points and lines cannot clip a raster; skip them.
            _ => {}
        }
    }
    MultiPolygon(polygons)
}

fn parse_geojson(path: &Path) -> RoiResult<MultiPolygon<f64>> {
    let content = std::fs::read_to_string(path)?;
    let parsed: geojson::GeoJson = content
        .parse()
        .map_err(|e: geojson::Error| RoiError::Parse(e.to_string()))?;
    let collection: geo_types::GeometryCollection<f64> = geojson::quick_collection(&parsed)
        .map_err(|e| RoiError::Parse(e.to_string()))?;
    Ok(collect_polygons(collection.0))
}

fn parse_kml(path: &Path) -> RoiResult<MultiPolygon<f64>> {
    let mut reader = kml::KmlReader::<_, f64>::from_path(path)
        .map_err(|e| RoiError::Parse(e.to_string()))?;
    let document = reader.read().map_err(|e| RoiError::Parse(e.to_string()))?;
    let collection = kml::quick_collection(document).map_err(|e| RoiError::Parse(e.to_string()))?;
    Ok(collect_polygons(collection.0))
}

fn parse_shapefile_zip(path: &Path) -> RoiResult<MultiPolygon<f64>> {
    let file = std::fs::File::open(path)?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| RoiError::Parse(e.to_string()))?;

    // Shapefiles are multi-file; extract the archive into a scoped directory
    // and read the .shp (the reader picks up sidecars next to it).
    let dir = tempfile::tempdir()?;
    let mut shp_path = None;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| RoiError::Parse(e.to_string()))?;
        let name = match entry.enclosed_name() {
            Some(name) => name.to_owned(),
            None => continue,
        };
        let file_name = match name.file_name() {
            Some(file_name) => file_name.to_owned(),
            None => continue,
        };
        let out_path = dir.path().join(&file_name);
        let mut out = std::fs::File::create(&out_path)?;
        std::io::copy(&mut entry, &mut out)?;
        if out_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("shp"))
            .unwrap_or(false)
        {
            shp_path = Some(out_path);
        }
    }
    let shp_path = shp_path.ok_or_else(|| {
        RoiError::Parse("zip archive contains no .shp file".to_string())
    })?;

    let shapes = shapefile::read_shapes(&shp_path)
        .map_err(|e| RoiError::Parse(e.to_string()))?;
    let geometries = shapes
        .into_iter()
        .filter_map(|shape| Geometry::<f64>::try_from(shape).ok());
    Ok(collect_polygons(geometries))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE_GEOJSON: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {"name": "square"},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[-100.0, 40.0], [-99.0, 40.0], [-99.0, 41.0], [-100.0, 41.0], [-100.0, 40.0]]]
            }
        }]
    }"#;

    #[test]
    fn format_dispatch_by_extension() {
        assert_eq!(
            VectorFormat::from_filename("basin.GeoJSON").unwrap(),
            VectorFormat::GeoJson
        );
        assert_eq!(
            VectorFormat::from_filename("basin.kml").unwrap(),
            VectorFormat::Kml
        );
        assert_eq!(
            VectorFormat::from_filename("basin.zip").unwrap(),
            VectorFormat::ShapefileZip
        );
    }

    #[test]
    fn unsupported_extension_is_invalid_format() {
        match VectorFormat::from_filename("basin.gpkg") {
            Err(RoiError::InvalidFormat(ext)) => assert_eq!(ext, "gpkg"),
            other => panic!("expected InvalidFormat, got {:?}", other),
        }
    }

    #[test]
    fn geojson_upload_becomes_roi() {
        let roi = ingest_upload("square.geojson", SQUARE_GEOJSON.as_bytes()).unwrap();
        match &roi {
            Roi::Uploaded { polygons, source } => {
                assert_eq!(polygons.0.len(), 1);
                assert_eq!(source, "square.geojson");
            }
            other => panic!("expected uploaded ROI, got {:?}", other),
        }
        let (lon, lat) = roi.center().unwrap();
        assert!((lon - -99.5).abs() < 1e-9);
        assert!((lat - 40.5).abs() < 1e-9);
    }

    #[test]
    fn kml_upload_becomes_roi() {
        let kml_doc = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Placemark>
    <name>square</name>
    <Polygon>
      <outerBoundaryIs>
        <LinearRing>
          <coordinates>
            -100.0,40.0,0 -99.0,40.0,0 -99.0,41.0,0 -100.0,41.0,0 -100.0,40.0,0
          </coordinates>
        </LinearRing>
      </outerBoundaryIs>
    </Polygon>
  </Placemark>
</kml>"#;
        let roi = ingest_upload("square.kml", kml_doc.as_bytes()).unwrap();
        match roi {
            Roi::Uploaded { polygons, .. } => assert_eq!(polygons.0.len(), 1),
            other => panic!("expected uploaded ROI, got {:?}", other),
        }
    }

    #[test]
    fn point_only_geojson_is_empty_geometry() {
        let points = r#"{"type": "Point", "coordinates": [-100.0, 40.0]}"#;
        match ingest_upload("point.geojson", points.as_bytes()) {
            Err(RoiError::EmptyGeometry) => {}
            other => panic!("expected EmptyGeometry, got {:?}", other),
        }
    }

    #[test]
    fn garbage_geojson_is_parse_error() {
        match ingest_upload("broken.geojson", b"{not json") {
            Err(RoiError::Parse(_)) => {}
            other => panic!("expected Parse, got {:?}", other),
        }
    }

    #[test]
    fn default_roi_is_the_study_area_asset() {
        match Roi::default() {
            Roi::Asset { asset } => assert_eq!(asset, STUDY_AREA_ASSET),
            other => panic!("expected asset ROI, got {:?}", other),
        }
    }
}
