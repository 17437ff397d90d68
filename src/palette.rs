//! Named color ramps for raster visualization
//!
//! A small registry of the colormaps the pages offer in their palette
//! dropdowns. Ramps are stored as anchor colors and resampled to the
//! requested length by nearest-anchor lookup; the backend interpolates
//! between list entries when it renders tiles, so anchor fidelity is what
//! matters here, not smoothness.

use once_cell::sync::Lazy;

use crate::errors::{CatalogError, CatalogResult};

struct Ramp {
    name: &'static str,
    colors: &'static [&'static str],
}

static RAMPS: Lazy<Vec<Ramp>> = Lazy::new(|| {
    vec![
        Ramp {
            name: "terrain",
            colors: &[
                "333399", "0d7fe5", "00be90", "55dd77", "c6f48e", "e3db8a", "aa926b", "8e6e67",
                "c6b6b3", "ffffff",
            ],
        },
        Ramp {
            name: "gist_earth",
            colors: &[
                "000000", "16339d", "2561a6", "347ba0", "428f87", "55a054", "83ab48", "a8a750",
                "b98a54", "ccab8f", "e2d7d0", "fdfbfb",
            ],
        },
        Ramp {
            name: "coolwarm",
            colors: &[
                "3b4cc0", "5977e3", "7b9ff9", "9ebeff", "c0d4f5", "dddcdc", "f2cbb7", "f7ac8e",
                "ee8468", "d65244", "b40426",
            ],
        },
        Ramp {
            name: "viridis",
            colors: &[
                "440154", "482878", "3e4a89", "31688e", "26828e", "1f9e89", "35b779", "6ece58",
                "b5de2b", "fde725",
            ],
        },
        Ramp {
            name: "ndwi",
            colors: &["00ffff", "00bfff", "0080ff", "0040ff", "0000ff", "000080"],
        },
        Ramp {
            name: "dem",
            colors: &[
                "006633", "e5ffcc", "662a00", "d8d8d8", "f5f5f5",
            ],
        },
    ]
});

/// Names for UI dropdowns, in registry order.
pub fn list_palettes() -> Vec<&'static str> {
    RAMPS.iter().map(|r| r.name).collect()
}

/// Resolve a named ramp to `n` hex colors.
///
/// Anchor colors are repeated/subsampled to the requested length.
pub fn get_palette(name: &str, n: usize) -> CatalogResult<Vec<String>> {
    let ramp = RAMPS
        .iter()
        .find(|r| r.name == name)
        .ok_or_else(|| CatalogError::UnknownPalette(name.to_string()))?;
    let anchors = ramp.colors;
    if n == 0 || anchors.is_empty() {
        return Ok(Vec::new());
    }
    if n == 1 {
        return Ok(vec![anchors[0].to_string()]);
    }
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let idx = i * (anchors.len() - 1) / (n - 1);
        out.push(anchors[idx].to_string());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_contains_defaults_used_by_pages() {
        let names = list_palettes();
        assert!(names.contains(&"terrain"));
        assert!(names.contains(&"coolwarm"));
        assert!(names.contains(&"gist_earth"));
    }

    #[test]
    fn resample_spans_full_ramp() {
        let palette = get_palette("terrain", 15).unwrap();
        assert_eq!(palette.len(), 15);
        assert_eq!(palette.first().unwrap(), "333399");
        assert_eq!(palette.last().unwrap(), "ffffff");
    }

    #[test]
    fn unknown_palette_is_rejected() {
        let err = get_palette("plasma-reversed", 5).unwrap_err();
        assert_eq!(err, CatalogError::UnknownPalette("plasma-reversed".into()));
    }
}
