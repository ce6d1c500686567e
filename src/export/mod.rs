/// Chart export: SVG in-process, PNG via resvg, PDF via an external converter.
///
/// ```text
///   TernaryChart ──▶ svg ──┬──▶ .svg
///                          ├──▶ raster (resvg + image) ──▶ .png
///                          └──▶ SvgConverter (rsvg-convert) ──▶ .pdf
/// ```

pub mod convert;
pub mod raster;
pub mod svg;

use std::path::Path;
use std::sync::{Arc, OnceLock};

use crate::chart::TernaryChart;
use crate::config::ExportSettings;
use crate::error::TernaryError;
use convert::{ExternalConverter, SvgConverter};

/// Output file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Svg,
    Png,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Svg, ExportFormat::Png, ExportFormat::Pdf];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Svg => "svg",
            ExportFormat::Png => "png",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Svg => "SVG",
            ExportFormat::Png => "PNG",
            ExportFormat::Pdf => "PDF",
        }
    }
}

/// Renders a chart to a byte buffer in a given format.
pub trait ChartRenderer {
    fn render(&self, chart: &TernaryChart, format: ExportFormat) -> Result<Vec<u8>, TernaryError>;
}

/// Default renderer: SVG writer, resvg rasterizer and a pluggable converter.
pub struct Exporter<C = ExternalConverter> {
    settings: ExportSettings,
    marker_radius: f32,
    converter: C,
    fontdb: OnceLock<Arc<usvg::fontdb::Database>>,
}

impl Exporter<ExternalConverter> {
    pub fn new(settings: ExportSettings, marker_radius: f32) -> Self {
        let converter = ExternalConverter::new(settings.converter.clone());
        Self::with_converter(settings, marker_radius, converter)
    }
}

impl<C: SvgConverter> Exporter<C> {
    pub fn with_converter(settings: ExportSettings, marker_radius: f32, converter: C) -> Self {
        Self {
            settings,
            marker_radius,
            converter,
            fontdb: OnceLock::new(),
        }
    }

    fn svg(&self, chart: &TernaryChart) -> Result<String, TernaryError> {
        svg::render_svg(
            chart,
            self.settings.width,
            self.settings.height,
            self.marker_radius,
        )
    }

    fn fontdb(&self) -> Arc<usvg::fontdb::Database> {
        self.fontdb
            .get_or_init(|| raster::build_fontdb(&self.settings.font_dirs))
            .clone()
    }
}

impl<C: SvgConverter> ChartRenderer for Exporter<C> {
    fn render(&self, chart: &TernaryChart, format: ExportFormat) -> Result<Vec<u8>, TernaryError> {
        let svg = self.svg(chart)?;
        match format {
            ExportFormat::Svg => Ok(svg.into_bytes()),
            ExportFormat::Png => raster::svg_to_png(
                svg.as_bytes(),
                self.settings.raster_scale,
                self.fontdb(),
            ),
            ExportFormat::Pdf => self.converter.convert(svg.as_bytes(), format),
        }
    }
}

/// Render `chart` and write it to `path`.
pub fn write_export(
    renderer: &impl ChartRenderer,
    chart: &TernaryChart,
    format: ExportFormat,
    path: &Path,
) -> Result<(), TernaryError> {
    let bytes = renderer.render(chart, format)?;
    std::fs::write(path, &bytes)?;
    log::info!(
        "exported {} ({} bytes) to {}",
        format.label(),
        bytes.len(),
        path.display()
    );
    Ok(())
}

/// File name built from the axis or basis names, e.g. `Sr-Mo-O_ternary.svg`.
pub fn export_file_name(names: &[String; 3], suffix: &str, format: ExportFormat) -> String {
    let stem: String = names
        .join("-")
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("{stem}_{suffix}.{}", format.extension())
}
