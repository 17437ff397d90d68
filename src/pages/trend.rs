//! Surface-water trend analysis page
//!
//! Click a watershed, pick a month window, and chart how much of it has been
//! inundated per year according to the JRC monthly water history.

use serde::Deserialize;
use serde_json::Value;

use crate::backend::TableResult;
use crate::catalog::JRC_MONTHLY_V13_ASSET;
use crate::context::PageContext;
use crate::expression::{Expression, RegionSpec};
use crate::render::{try_reduce, MapBuilder};
use crate::wms::{get_wms_layers, WmsLayerSpec};

use super::{ChartSeries, ChartSpec, NamedTable, PageView};

const WBD_WMS_URL: &str =
    "https://hydro.nationalmap.gov/arcgis/services/wbd/MapServer/WMSServer";

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMethod {
    Max,
    Mean,
    Median,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Params {
    /// WBD WMS layer to overlay; the HUC level is its numeric prefix.
    pub wbd_layer: String,
    /// Last clicked map location, if any.
    pub clicked: Option<(f64, f64)>,
    /// Start and end month of the analysis window.
    pub months: (u32, u32),
    pub method: AggregationMethod,
    /// Set when the user presses Submit; the series is only computed then.
    pub submit: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            wbd_layer: "8-digit HU (Subbasin)".to_string(),
            clicked: None,
            months: (7, 8),
            method: AggregationMethod::Max,
            submit: false,
        }
    }
}

pub async fn render(ctx: &PageContext, params: Params) -> PageView {
    let mut map = MapBuilder::new((44.96, -100.40), 9);
    map.add_basemap("HYBRID");
    map.add_tile_layer(
        "https://storage.googleapis.com/global-surface-water/tiles2020/occurrence/{z}/{x}/{y}.png",
        "JRC Water Occurrence",
        Some("EC JRC/Google"),
    );

    // Resolve the selected WBD title to its machine layer name.
    match get_wms_layers(&ctx.http, WBD_WMS_URL).await {
        Ok(layers) => {
            match layers.iter().find(|l| l.title == params.wbd_layer) {
                Some(layer) => {
                    map.add_wms_layer(WmsLayerSpec::new(WBD_WMS_URL, &layer.name), &layer.title)
                }
                None => map.add_error(&params.wbd_layer, "WMS layer not offered by the service"),
            }
        }
        Err(e) => map.add_error("WBD service", e),
    }

    let mut tables = Vec::new();
    let mut charts = Vec::new();
    let mut notes = Vec::new();

    if let Some((lat, lon)) = params.clicked {
        let huc_level = huc_level_of(&params.wbd_layer);
        let watershed = Expression::feature_collection(&format!("USGS/WBD/2017/HUC{}", huc_level))
            .filter_bounds(RegionSpec::Point { lon, lat })
            .first();

        match ctx.backend.info(&watershed).await {
            Ok(info) => notes.push(format!("Selected HUC: {}", info)),
            Err(e) => map.add_error("Watershed lookup", e),
        }

        if params.submit {
            let (start_month, end_month) = params.months;
            let water = Expression::image_collection(JRC_MONTHLY_V13_ASSET)
                .filter_calendar_range(start_month, end_month, "month")
                .eq(2.0)
                .self_mask()
                .area_hectares(watershed, 1000.0);

            let mut errors = Vec::new();
            if let Some(table) = try_reduce(ctx.backend.as_ref(), &water, "Water area", &mut errors).await {
                if table.is_empty() {
                    notes.push("No water observations in the selected window".to_string());
                } else {
                    let aggregated = aggregate_by_year(&table, params.method);
                    charts.push(area_chart(&aggregated));
                    tables.push(NamedTable {
                        title: "Monthly water area (ha)".to_string(),
                        table,
                    });
                    tables.push(NamedTable {
                        title: format!(
                            "Water area by year ({})",
                            format!("{:?}", params.method).to_lowercase()
                        ),
                        table: aggregated,
                    });
                }
            }
            for error in errors {
                map.add_error(&error.source, error.message);
            }
        }
    }

    let mut view = PageView::new(
        "trend",
        "Analyzing Surface Water Dynamics",
        map.finish(ctx.backend.as_ref()).await,
    );
    view.tables = tables;
    view.charts = charts;
    view.notes = notes;
    view
}

/// `"8-digit HU (Subbasin)"` → `"08"`.
fn huc_level_of(title: &str) -> String {
    let digits: String = title.chars().take_while(|c| c.is_ascii_digit()).collect();
    format!("{:0>2}", if digits.is_empty() { "8" } else { &digits })
}

fn year_month_value(row: &serde_json::Map<String, Value>) -> Option<(i64, f64)> {
    let year = row.get("year").and_then(Value::as_i64)?;
    let water = row.get("water").and_then(Value::as_f64)?;
    Some((year, water))
}

/// Collapse the monthly rows into one value per year.
fn aggregate_by_year(table: &TableResult, method: AggregationMethod) -> TableResult {
    let mut by_year: indexmap::IndexMap<i64, Vec<f64>> = indexmap::IndexMap::new();
    for row in &table.rows {
        if let Some((year, water)) = year_month_value(row) {
            by_year.entry(year).or_default().push(water);
        }
    }

    let rows = by_year
        .into_iter()
        .map(|(year, mut values)| {
            let aggregate = match method {
                AggregationMethod::Max => values.iter().cloned().fold(f64::MIN, f64::max),
                AggregationMethod::Mean => values.iter().sum::<f64>() / values.len() as f64,
                AggregationMethod::Median => {
                    values.sort_by(|a, b| a.partial_cmp(b).expect("water areas are finite"));
                    values[values.len() / 2]
                }
            };
            let mut row = serde_json::Map::new();
            row.insert("year".to_string(), Value::from(year));
            row.insert("water".to_string(), Value::from(aggregate));
            row
        })
        .collect();

    TableResult {
        columns: vec!["year".to_string(), "water".to_string()],
        rows,
    }
}

fn area_chart(aggregated: &TableResult) -> ChartSpec {
    let labels = aggregated
        .rows
        .iter()
        .filter_map(|r| r.get("year").and_then(Value::as_i64))
        .map(|y| y.to_string())
        .collect();
    let values = aggregated
        .rows
        .iter()
        .filter_map(|r| r.get("water").and_then(Value::as_f64))
        .collect();
    ChartSpec {
        title: "Surface Water Dynamics".to_string(),
        x_label: "Year".to_string(),
        y_label: "Water area (ha)".to_string(),
        labels,
        series: vec![ChartSeries {
            name: "water".to_string(),
            values,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[(i64, u32, f64)]) -> TableResult {
        TableResult {
            columns: vec!["year".into(), "month".into(), "water".into()],
            rows: rows
                .iter()
                .map(|(year, month, water)| {
                    let mut row = serde_json::Map::new();
                    row.insert("year".into(), Value::from(*year));
                    row.insert("month".into(), Value::from(*month));
                    row.insert("water".into(), Value::from(*water));
                    row
                })
                .collect(),
        }
    }

    #[test]
    fn huc_level_parses_title_prefix() {
        assert_eq!(huc_level_of("8-digit HU (Subbasin)"), "08");
        assert_eq!(huc_level_of("10-digit HU (Watershed)"), "10");
        assert_eq!(huc_level_of("no digits"), "08");
    }

    #[test]
    fn yearly_aggregation_respects_method() {
        let monthly = table(&[(2019, 7, 10.0), (2019, 8, 30.0), (2020, 7, 5.0)]);
        let max = aggregate_by_year(&monthly, AggregationMethod::Max);
        assert_eq!(max.rows[0]["water"], Value::from(30.0));
        let mean = aggregate_by_year(&monthly, AggregationMethod::Mean);
        assert_eq!(mean.rows[0]["water"], Value::from(20.0));
        assert_eq!(mean.rows[1]["water"], Value::from(5.0));
    }
}
