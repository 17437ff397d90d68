//! Map legends
//!
//! Builtin legends are keyed by dataset identity (NLCD, ESA WorldCover, ESRI
//! land cover, NWI wetlands) and attached automatically when a catalog entry
//! names one. The WMS page additionally accepts a free-text legend, one
//! `label: #RRGGBB` entry per line.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::LegendError;

/// Identifier for a legend shipped with the dashboard.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinLegend {
    Nlcd,
    EsaWorldCover,
    EsriLandCover,
    NwiWetlands,
}

/// A rendered legend: title plus ordered label → hex-color entries.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LegendSpec {
    pub title: String,
    pub entries: IndexMap<String, String>,
}

static NLCD: Lazy<IndexMap<String, String>> = Lazy::new(|| {
    legend_entries(&[
        ("Open Water", "466b9f"),
        ("Developed, Open Space", "dec5c5"),
        ("Developed, Low Intensity", "d99282"),
        ("Developed, Medium Intensity", "eb0000"),
        ("Developed, High Intensity", "ab0000"),
        ("Barren Land", "b3ac9f"),
        ("Deciduous Forest", "68ab5f"),
        ("Evergreen Forest", "1c5f2c"),
        ("Mixed Forest", "b5c58f"),
        ("Shrub/Scrub", "ccb879"),
        ("Grassland/Herbaceous", "dfdfc2"),
        ("Pasture/Hay", "dcd939"),
        ("Cultivated Crops", "ab6c28"),
        ("Woody Wetlands", "b8d9eb"),
        ("Emergent Herbaceous Wetlands", "6c9fb8"),
    ])
});

static ESA_WORLDCOVER: Lazy<IndexMap<String, String>> = Lazy::new(|| {
    legend_entries(&[
        ("Trees", "006400"),
        ("Shrubland", "ffbb22"),
        ("Grassland", "ffff4c"),
        ("Cropland", "f096ff"),
        ("Built-up", "fa0000"),
        ("Bare / sparse vegetation", "b4b4b4"),
        ("Snow and ice", "f0f0f0"),
        ("Permanent water bodies", "0064c8"),
        ("Herbaceous wetland", "0096a0"),
        ("Mangroves", "00cf75"),
        ("Moss and lichen", "fae6a0"),
    ])
});

static ESRI_LANDCOVER: Lazy<IndexMap<String, String>> = Lazy::new(|| {
    legend_entries(&[
        ("Water", "1a5bab"),
        ("Trees", "358221"),
        ("Grass", "a7d282"),
        ("Flooded Vegetation", "87d19e"),
        ("Crops", "ffdb5c"),
        ("Scrub/Shrub", "eecfa8"),
        ("Built Area", "ed022a"),
        ("Bare Ground", "ede9e4"),
        ("Snow/Ice", "f2faff"),
        ("Clouds", "c8c8c8"),
    ])
});

static NWI_WETLANDS: Lazy<IndexMap<String, String>> = Lazy::new(|| {
    legend_entries(&[
        ("Freshwater Forested/Shrub Wetland", "008837"),
        ("Freshwater Emergent Wetland", "7fc31c"),
        ("Freshwater Pond", "688cc0"),
        ("Estuarine and Marine Wetland", "66c2a5"),
        ("Riverine", "0190bf"),
        ("Lake", "13007c"),
        ("Estuarine and Marine Deepwater", "007c88"),
        ("Other", "b28653"),
    ])
});

fn legend_entries(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs
        .iter()
        .map(|(label, color)| (label.to_string(), color.to_string()))
        .collect()
}

impl BuiltinLegend {
    pub fn title(&self) -> &'static str {
        match self {
            BuiltinLegend::Nlcd => "NLCD Land Cover",
            BuiltinLegend::EsaWorldCover => "ESA Global Land Cover",
            BuiltinLegend::EsriLandCover => "ESRI Global Land Cover",
            BuiltinLegend::NwiWetlands => "NWI Wetlands",
        }
    }

    pub fn entries(&self) -> &'static IndexMap<String, String> {
        match self {
            BuiltinLegend::Nlcd => &NLCD,
            BuiltinLegend::EsaWorldCover => &ESA_WORLDCOVER,
            BuiltinLegend::EsriLandCover => &ESRI_LANDCOVER,
            BuiltinLegend::NwiWetlands => &NWI_WETLANDS,
        }
    }

    pub fn spec(&self) -> LegendSpec {
        LegendSpec {
            title: self.title().to_string(),
            entries: self.entries().clone(),
        }
    }

    /// Colors only, in legend order. Used as a palette for classified rasters
    /// whose class values line up with the legend (ESRI land cover).
    pub fn colors(&self) -> Vec<String> {
        self.entries().values().cloned().collect()
    }
}

/// Parse a free-text legend, one `label: #RRGGBB` (or `label: RRGGBB`) per
/// line. Blank lines are skipped; anything else is a parse error naming the
/// offending line.
pub fn parse_legend_text(title: &str, text: &str) -> Result<LegendSpec, LegendError> {
    let mut entries = IndexMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (label, color) = line
            .rsplit_once(':')
            .ok_or_else(|| LegendError::Parse(line.to_string()))?;
        let label = label.trim();
        let color = color.trim().trim_start_matches('#');
        let valid = (color.len() == 6 || color.len() == 8)
            && color.chars().all(|c| c.is_ascii_hexdigit());
        if label.is_empty() || !valid {
            return Err(LegendError::Parse(line.to_string()));
        }
        entries.insert(label.to_string(), color.to_lowercase());
    }
    Ok(LegendSpec {
        title: title.to_string(),
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_legends_are_nonempty() {
        for legend in [
            BuiltinLegend::Nlcd,
            BuiltinLegend::EsaWorldCover,
            BuiltinLegend::EsriLandCover,
            BuiltinLegend::NwiWetlands,
        ] {
            assert!(!legend.entries().is_empty(), "{} empty", legend.title());
        }
    }

    #[test]
    fn parses_labels_with_colons() {
        let spec = parse_legend_text("Custom", "Water: deep: #0064c8\nTrees: 006400\n").unwrap();
        assert_eq!(spec.entries.len(), 2);
        assert_eq!(spec.entries["Water: deep"], "0064c8");
        assert_eq!(spec.entries["Trees"], "006400");
    }

    #[test]
    fn rejects_bad_color() {
        let err = parse_legend_text("Custom", "Water: bluish").unwrap_err();
        assert_eq!(err, LegendError::Parse("Water: bluish".to_string()));
    }
}
