//! NAIP surface-water mapping page
//!
//! The wetland-mapping pipeline: classify time-series NAIP imagery with
//! unsupervised clustering, keep the clusters dominated by JRC permanent
//! water, refine against the USDA cropland water extent, and compare the
//! resulting inundation areas against the JRC monthly history. The whole
//! pipeline is one chain of backend expressions; this page only assembles
//! it and arranges the resulting layers, chart, and statistics.

use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::Value;

use crate::backend::TableResult;
use crate::catalog::{HUC10_ASSET, JRC_MONTHLY_ASSET, JRC_WATER_ASSET, NAIP_ASSET};
use crate::context::PageContext;
use crate::errors::CatalogError;
use crate::expression::{ClusterMethod, Expression, RegionSpec};
use crate::render::{try_reduce, MapBuilder};

use super::{huc10_boundaries, study_area_layer, ChartSeries, ChartSpec, NamedTable, PageView};

/// Years with 4-band NAIP coverage over the study area.
const NAIP_YEARS: &[u32] = &[2009, 2010, 2011, 2012, 2013, 2014, 2015, 2016, 2017, 2018, 2019];
const FIRST_NAIP_YEAR: u32 = 2009;
const LAST_NAIP_YEAR: u32 = 2019;

/// Radius of the clusterer's training sample around a random point inside
/// the basin.
const TRAINING_RADIUS_M: f64 = 5000.0;
/// NAIP coverage ends at the Canadian border; training points are capped
/// below it.
const TRAINING_MAX_LAT: f64 = 48.998;

/// The clusterer trains on a disc around one random point inside the basin
/// rather than on the whole basin.
fn training_region(basin: &Expression) -> RegionSpec {
    RegionSpec::SampledBuffer {
        within: Box::new(basin.clone()),
        meters: TRAINING_RADIUS_M,
        max_lat: TRAINING_MAX_LAT,
    }
}

/// Bundled HU10 watershed index (subset of the WBD inventory).
static HU10_INDEX: Lazy<Vec<(String, String)>> = Lazy::new(|| {
    let mut reader = csv::Reader::from_reader(include_str!("../data/wbdhu10.csv").as_bytes());
    reader
        .records()
        .filter_map(|record| record.ok())
        .filter_map(|record| {
            Some((record.get(0)?.to_string(), record.get(1)?.to_string()))
        })
        .collect()
});

pub fn hu10_index() -> &'static [(String, String)] {
    &HU10_INDEX
}

fn lookup_watershed(huc10: &str) -> Result<&'static (String, String), CatalogError> {
    HU10_INDEX
        .iter()
        .find(|(id, _)| id == huc10)
        .ok_or_else(|| CatalogError::UnknownWatershed(huc10.to_string()))
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Params {
    /// HU10 watershed identifier.
    pub watershed: String,
    /// Year of NAIP imagery to display.
    pub year: u32,
    /// A cluster within permanent water must exceed this share of pixels to
    /// count as water.
    pub cluster_threshold: f64,
    /// Occurrence percentage above which JRC water counts as permanent.
    pub permanent_threshold: f64,
    /// USDA cropland water occurrence threshold (years observed as water).
    pub usda_threshold: f64,
    /// The pipeline only runs on submit; the base map renders regardless.
    pub submit: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            watershed: "1017010204".to_string(),
            year: 2019,
            cluster_threshold: 0.1,
            permanent_threshold: 30.0,
            usda_threshold: 2.0,
            submit: false,
        }
    }
}

pub async fn render(ctx: &PageContext, params: Params) -> PageView {
    let (center, zoom) = ctx.default_view();
    let mut map = MapBuilder::new(center, zoom);

    let mut tables = Vec::new();
    let mut charts = Vec::new();
    let mut notes = Vec::new();

    if params.submit {
        match lookup_watershed(&params.watershed) {
            Ok((huc10, name)) => {
                notes.push(format!("Watershed: {} ({})", name, huc10));
                run_pipeline(ctx, &params, &mut map, &mut tables, &mut charts, &mut notes).await;
            }
            Err(e) => map.add_error(&params.watershed, e),
        }
    }

    map.add_expression_layer(huc10_boundaries(), None, "NHD-HUC10", true, 1.0);
    map.add_expression_layer(study_area_layer(), None, "MRB", true, 1.0);

    let mut view = PageView::new(
        "water",
        "Surface Water Mapping Using NAIP Imagery",
        map.finish(ctx.backend.as_ref()).await,
    );
    view.tables = tables;
    view.charts = charts;
    view.notes = notes;
    view
}

async fn run_pipeline(
    ctx: &PageContext,
    params: &Params,
    map: &mut MapBuilder,
    tables: &mut Vec<NamedTable>,
    charts: &mut Vec<ChartSpec>,
    notes: &mut Vec<String>,
) {
    let backend = ctx.backend.as_ref();
    let huc8_id = &params.watershed[0..8.min(params.watershed.len())];

    // NAIP imagery is not available for every year; fall back to the first
    // year of the series.
    let shown_year = if NAIP_YEARS.contains(&params.year) {
        params.year
    } else {
        NAIP_YEARS[0]
    };

    let basin = Expression::feature_collection(HUC10_ASSET)
        .filter_in_list("huc10", &[params.watershed.as_str()]);
    let basin_region = RegionSpec::Derived {
        expression: Box::new(basin.clone()),
    };

    // Basin name and size, surfaced as a note.
    match backend.info(&basin.clone().first()).await {
        Ok(info) => notes.push(format!("Basin: {}", info)),
        Err(e) => map.add_error("Basin lookup", e),
    }

    let naip_series = Expression::image_collection(NAIP_ASSET)
        .filter_calendar_range(FIRST_NAIP_YEAR, LAST_NAIP_YEAR, "year")
        .filter_bounds(basin_region.clone());

    let shown_naip = naip_series
        .clone()
        .filter_calendar_range(shown_year, shown_year, "year")
        .mosaic()
        .clip(basin_region.clone());
    map.add_expression_layer(
        shown_naip,
        Some(crate::catalog::VisParams::bands(&["N", "R", "G"])),
        &format!("NAIP {}", shown_year),
        true,
        1.0,
    );

    // Permanent water from the JRC occurrence band.
    let permanent_water = Expression::image(JRC_WATER_ASSET)
        .select("occurrence")
        .clip(basin_region.clone())
        .gt(params.permanent_threshold)
        .self_mask();

    // USDA cropland water classes observed at least `usda_threshold` years.
    let usda_extent = Expression::image_collection("USDA/NASS/CDL")
        .filter_date("1997-01-01", "2019-12-31")
        .select("cropland")
        .remap(&[83, 87, 111, 190, 195], &[999, 999, 999, 999, 999])
        .eq(999.0)
        .clip(basin_region.clone())
        .self_mask()
        .sum()
        .self_mask()
        .gt(params.usda_threshold)
        .self_mask();

    // Unsupervised clusters per NAIP image, trained on a sampled disc
    // inside the basin.
    let clusters = naip_series.clone().cluster(
        ClusterMethod::XMeans,
        training_region(&basin),
        2.0,
        5000,
    );
    let shown_clusters = clusters
        .clone()
        .filter_calendar_range(shown_year, shown_year, "year")
        .first()
        .random_visualizer();
    map.add_expression_layer(shown_clusters, None, "X-Means Clusters", false, 1.0);

    // Clusters dominated by permanent water, refined to the USDA extent and
    // to pixels wet in more than one year.
    let water_series = clusters
        .update_mask(permanent_water)
        .classify_water(params.cluster_threshold, 5000.0);
    let refined_series = water_series
        .clone()
        .and(usda_extent)
        .and(water_series.clone().sum().gt(1.0))
        .self_mask();

    let occurrence = refined_series.clone().sum().random_visualizer();
    map.add_expression_layer(occurrence, None, "NAIP Water Occurrence", true, 1.0);

    // JRC monthly inundation over the same window.
    let jrc_series = Expression::image_collection(JRC_MONTHLY_ASSET)
        .filter_calendar_range(FIRST_NAIP_YEAR, LAST_NAIP_YEAR, "year")
        .eq(2.0)
        .clip(basin_region.clone())
        .self_mask();

    let shown_jrc = jrc_series
        .clone()
        .filter_calendar_range(shown_year, shown_year, "year")
        .max_composite()
        .self_mask();
    map.add_expression_layer(
        shown_jrc,
        Some(crate::catalog::VisParams::new(
            0.0,
            1.0,
            vec!["orange".to_string()],
        )),
        &format!("JRC Inundation Area ({})", shown_year),
        false,
        1.0,
    );

    let shown_refined = refined_series
        .clone()
        .filter_calendar_range(shown_year, shown_year, "year")
        .max_composite()
        .self_mask();
    map.add_expression_layer(
        shown_refined,
        Some(crate::catalog::VisParams::new(
            0.0,
            1.0,
            vec!["blue".to_string()],
        )),
        &format!("NAIP Inundation Area ({})", shown_year),
        true,
        1.0,
    );

    // NAIP omissions: pixels the classifier missed but JRC saw as water.
    let omission_series = jrc_series
        .clone()
        .and(refined_series.clone().unmask().eq(0.0))
        .self_mask();

    let mut errors = Vec::new();
    let naip_areas = try_reduce(
        backend,
        &refined_series.area_hectares(basin.clone(), 10.0),
        "NAIP water areas",
        &mut errors,
    )
    .await;
    let jrc_areas = try_reduce(
        backend,
        &jrc_series.area_hectares(basin.clone(), 10.0),
        "JRC water areas",
        &mut errors,
    )
    .await;
    let omission_areas = try_reduce(
        backend,
        &omission_series.area_hectares(basin.clone(), 10.0),
        "Omission areas",
        &mut errors,
    )
    .await;

    if let (Some(naip), Some(jrc)) = (&naip_areas, &jrc_areas) {
        if naip.is_empty() && jrc.is_empty() {
            notes.push("No inundation observations for this watershed".to_string());
        } else {
            charts.push(inundation_chart(naip, jrc));
        }
    }
    for (title, table) in [
        ("NAIP water area by year (ha)", naip_areas),
        ("JRC water area by year (ha)", jrc_areas),
        ("Omission area by year (ha)", omission_areas),
    ] {
        if let Some(table) = table {
            if !table.is_empty() {
                tables.push(NamedTable {
                    title: title.to_string(),
                    table,
                });
            }
        }
    }

    // NWI wetland inventory summary for the parent HU8.
    let nwi = Expression::feature_collection(&format!(
        "users/giswqs/NWI-HU8/HU8_{}_Wetlands",
        huc8_id
    ))
    .filter_bounds(basin_region);
    if let Some(summary) = try_reduce(
        backend,
        &nwi.clone().aggregate_stats("Shape_Area"),
        "NWI summary",
        &mut errors,
    )
    .await
    {
        if !summary.is_empty() {
            tables.push(NamedTable {
                title: "NWI wetland statistics".to_string(),
                table: summary,
            });
        }
    }
    if let Some(by_type) = try_reduce(
        backend,
        &nwi.sum_by_group("Shape_Area", "WETLAND_TY"),
        "NWI area by type",
        &mut errors,
    )
    .await
    {
        if !by_type.is_empty() {
            tables.push(NamedTable {
                title: "NWI wetland area by type".to_string(),
                table: by_type,
            });
        }
    }

    for error in errors {
        map.add_error(&error.source, error.message);
    }
}

/// Grouped NAIP vs JRC inundation bar chart, aligned on year labels.
fn inundation_chart(naip: &TableResult, jrc: &TableResult) -> ChartSpec {
    let mut labels: Vec<String> = Vec::new();
    for table in [naip, jrc] {
        for year in table.column("year") {
            if let Some(year) = year_label(&year) {
                if !labels.contains(&year) {
                    labels.push(year);
                }
            }
        }
    }
    labels.sort();

    let series = [("NAIP", naip), ("JRC", jrc)]
        .iter()
        .map(|(name, table)| ChartSeries {
            name: name.to_string(),
            values: labels
                .iter()
                .map(|label| {
                    table
                        .rows
                        .iter()
                        .find(|row| {
                            row.get("year")
                                .and_then(|y| year_label(y))
                                .as_deref()
                                == Some(label)
                        })
                        .and_then(|row| row.get("sum").and_then(Value::as_f64))
                        .map(|v| (v * 100.0).round() / 100.0)
                        .unwrap_or(0.0)
                })
                .collect(),
        })
        .collect();

    ChartSpec {
        title: "Inundation dynamics".to_string(),
        x_label: "Year".to_string(),
        y_label: "Area (ha)".to_string(),
        labels,
        series,
    }
}

fn year_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim_start_matches('Y').to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_index_is_well_formed() {
        let index = hu10_index();
        assert!(!index.is_empty());
        for (huc10, name) in index {
            assert_eq!(huc10.len(), 10, "{} is not a HU10 id", huc10);
            assert!(!name.is_empty());
        }
    }

    #[test]
    fn clusterer_trains_on_a_sampled_disc_below_the_border() {
        let basin = Expression::feature_collection(HUC10_ASSET)
            .filter_in_list("huc10", &["1017010204"]);
        match training_region(&basin) {
            RegionSpec::SampledBuffer {
                within,
                meters,
                max_lat,
            } => {
                assert_eq!(*within, basin);
                assert_eq!(meters, 5000.0);
                assert_eq!(max_lat, 48.998);
            }
            other => panic!("expected a sampled buffer, got {:?}", other),
        }
    }

    #[test]
    fn unknown_watershed_is_rejected() {
        assert!(matches!(
            lookup_watershed("9999999999"),
            Err(CatalogError::UnknownWatershed(_))
        ));
        assert!(lookup_watershed("1017010204").is_ok());
    }

    #[test]
    fn chart_aligns_years_across_series() {
        let mut naip_row = serde_json::Map::new();
        naip_row.insert("year".into(), Value::from("Y2019"));
        naip_row.insert("sum".into(), Value::from(12.345));
        let naip = TableResult {
            columns: vec!["year".into(), "sum".into()],
            rows: vec![naip_row],
        };
        let mut jrc_row = serde_json::Map::new();
        jrc_row.insert("year".into(), Value::from("Y2018"));
        jrc_row.insert("sum".into(), Value::from(7.0));
        let jrc = TableResult {
            columns: vec!["year".into(), "sum".into()],
            rows: vec![jrc_row],
        };

        let chart = inundation_chart(&naip, &jrc);
        assert_eq!(chart.labels, vec!["2018", "2019"]);
        assert_eq!(chart.series[0].values, vec![0.0, 12.35]);
        assert_eq!(chart.series[1].values, vec![7.0, 0.0]);
    }
}
