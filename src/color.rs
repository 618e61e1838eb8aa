use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Site → colour
// ---------------------------------------------------------------------------

/// Stable colour per site, assigned over the full sorted site list so a
/// site keeps its colour when the selection changes.
#[derive(Debug, Clone, Default)]
pub struct SiteColors {
    mapping: BTreeMap<String, Color32>,
}

impl SiteColors {
    pub fn new(sites: &BTreeSet<String>) -> Self {
        let mapping = sites
            .iter()
            .cloned()
            .zip(generate_palette(sites.len()))
            .collect();
        SiteColors { mapping }
    }

    /// Look up the colour for a site; unknown sites are grey.
    pub fn color_for(&self, site: &str) -> Color32 {
        self.mapping.get(site).copied().unwrap_or(Color32::GRAY)
    }
}
