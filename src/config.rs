use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::color::PaletteKind;
use crate::i18n::Locale;

/// Environment variable pointing at an alternative settings file.
pub const CONFIG_ENV: &str = "RUSTY_TERNARY_CONFIG";
const CONFIG_FILE: &str = "rusty-ternary.json";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// User settings, read once at start-up. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Initial axis (element) names.
    pub axis_names: [String; 3],
    /// Replace the axis names with the file's column headers on load.
    pub axis_names_from_header: bool,
    pub locale: Locale,
    pub palette: PaletteKind,
    /// Marker radius in screen points.
    pub marker_radius: f32,
    pub export: ExportSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            axis_names: ["Sr".to_string(), "Mo".to_string(), "O".to_string()],
            axis_names_from_header: false,
            locale: Locale::default(),
            palette: PaletteKind::default(),
            marker_radius: 5.0,
            export: ExportSettings::default(),
        }
    }
}

/// Image export options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// SVG canvas size in user units.
    pub width: u32,
    pub height: u32,
    /// Pixels per SVG unit for PNG export.
    pub raster_scale: f32,
    /// Explicit path to `rsvg-convert`; searched on `PATH` when unset.
    pub converter: Option<PathBuf>,
    /// Extra font directories for PNG rendering.
    pub font_dirs: Vec<PathBuf>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            width: 900,
            height: 700,
            raster_scale: 2.0,
            converter: None,
            font_dirs: Vec::new(),
        }
    }
}

/// Path to the settings file.
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}

pub fn parse_settings(text: &str) -> Result<Settings, serde_json::Error> {
    serde_json::from_str(text)
}

/// Load settings from disk, returning defaults if the file doesn't exist or is invalid.
pub fn load_settings() -> Settings {
    let path = config_path();
    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(_) => {
            log::debug!("no settings at {}, using defaults", path.display());
            return Settings::default();
        }
    };
    match parse_settings(&text) {
        Ok(settings) => {
            log::info!("loaded settings from {}", path.display());
            settings
        }
        Err(e) => {
            log::warn!("ignoring invalid settings file {}: {e}", path.display());
            Settings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_strontium_molybdenum_oxygen_system() {
        let settings = Settings::default();
        assert_eq!(settings.axis_names, ["Sr", "Mo", "O"]);
        assert_eq!(settings.locale, Locale::En);
        assert_eq!(settings.palette, PaletteKind::Vivid);
        assert!(settings.export.converter.is_none());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let settings = parse_settings(
            r#"{ "locale": "ja", "palette": "hue_wheel", "export": { "raster_scale": 3.0 } }"#,
        )
        .unwrap();
        assert_eq!(settings.locale, Locale::Ja);
        assert_eq!(settings.palette, PaletteKind::HueWheel);
        assert_eq!(settings.export.raster_scale, 3.0);
        assert_eq!(settings.export.width, 900);
        assert_eq!(settings.axis_names, ["Sr", "Mo", "O"]);
    }

    #[test]
    fn unknown_locale_is_rejected() {
        assert!(parse_settings(r#"{ "locale": "fr" }"#).is_err());
    }
}
