use std::collections::HashMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Palettes
// ---------------------------------------------------------------------------

/// Plotly's qualitative "Vivid" palette.
const VIVID: [(u8, u8, u8); 11] = [
    (229, 134, 6),
    (93, 105, 177),
    (82, 188, 163),
    (153, 201, 69),
    (204, 97, 176),
    (36, 121, 108),
    (218, 165, 27),
    (47, 138, 196),
    (118, 78, 159),
    (237, 100, 90),
    (165, 170, 153),
];

/// Which palette labels draw their colours from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteKind {
    /// Fixed qualitative palette, cycled when there are more labels than colours.
    #[default]
    Vivid,
    /// One evenly spaced hue per label.
    HueWheel,
}

impl PaletteKind {
    /// Colours for `n` labels. May return fewer than `n`; callers cycle.
    pub fn colors(self, n: usize) -> Vec<Color32> {
        match self {
            PaletteKind::Vivid => VIVID
                .iter()
                .map(|&(r, g, b)| Color32::from_rgb(r, g, b))
                .collect(),
            PaletteKind::HueWheel => generate_palette(n),
        }
    }
}

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
                (rgb.red * 255.0).round() as u8,
                (rgb.green * 255.0).round() as u8,
                (rgb.blue * 255.0).round() as u8,
            )
        })
        .collect()
}

/// `#rrggbb` for SVG output.
pub fn hex(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}

// ---------------------------------------------------------------------------
// Color mapping: label → Color32
// ---------------------------------------------------------------------------

/// Maps each distinct label to a colour, assigned in first-seen order.
///
/// Built once per loaded table and shared by every chart so a compound keeps
/// its colour even when some of its points are filtered out.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: HashMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map from labels already in first-seen order.
    pub fn new(labels: &[String], kind: PaletteKind) -> Self {
        let palette = kind.colors(labels.len());
        let mut mapping = HashMap::with_capacity(labels.len());

        for label in labels {
            if mapping.contains_key(label) || palette.is_empty() {
                continue;
            }
            let color = palette[mapping.len() % palette.len()];
            mapping.insert(label.clone(), color);
        }

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn vivid_colours_follow_first_seen_order() {
        let map = ColorMap::new(&labels(&["MoO3", "SrO", "Mo"]), PaletteKind::Vivid);
        assert_eq!(map.color_for("MoO3"), Color32::from_rgb(229, 134, 6));
        assert_eq!(map.color_for("SrO"), Color32::from_rgb(93, 105, 177));
        assert_eq!(map.color_for("Mo"), Color32::from_rgb(82, 188, 163));
    }

    #[test]
    fn vivid_palette_cycles_past_eleven_labels() {
        let names: Vec<String> = (0..13).map(|i| format!("L{i}")).collect();
        let map = ColorMap::new(&names, PaletteKind::Vivid);
        assert_eq!(map.color_for("L11"), map.color_for("L0"));
        assert_eq!(map.color_for("L12"), map.color_for("L1"));
        assert_ne!(map.color_for("L12"), Color32::GRAY);
    }

    #[test]
    fn repeated_label_does_not_consume_a_colour() {
        let map = ColorMap::new(&labels(&["A", "A", "B"]), PaletteKind::Vivid);
        assert_eq!(map.color_for("A"), Color32::from_rgb(229, 134, 6));
        assert_eq!(map.color_for("B"), Color32::from_rgb(93, 105, 177));
    }

    #[test]
    fn unknown_label_falls_back_to_grey() {
        let map = ColorMap::new(&labels(&["A"]), PaletteKind::Vivid);
        assert_eq!(map.color_for("B"), Color32::GRAY);
    }

    #[test]
    fn hue_wheel_gives_distinct_colours() {
        let names = labels(&["A", "B", "C", "D"]);
        let map = ColorMap::new(&names, PaletteKind::HueWheel);
        for i in 0..names.len() {
            for j in (i + 1)..names.len() {
                assert_ne!(map.color_for(&names[i]), map.color_for(&names[j]));
            }
        }
    }

    #[test]
    fn hex_is_lowercase_rrggbb() {
        assert_eq!(hex(Color32::from_rgb(229, 134, 6)), "#e58606");
    }
}
