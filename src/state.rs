use std::path::Path;

use crate::chart::TernaryChart;
use crate::color::ColorMap;
use crate::config::Settings;
use crate::data::model::CompositionTable;
use crate::data::projection::{project, project_onto_basis, Basis, ProjectedPoint};
use crate::error::TernaryError;
use crate::export::{export_file_name, write_export, ExportFormat, Exporter};
use crate::i18n::Strings;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which of the two charts an action refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Raw element axes.
    Default,
    /// User-selected basis compounds.
    Custom,
}

/// Severity of the message in the top bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Error,
}

/// The whole session, independent of rendering.
///
/// Everything derived from the table (colours, projections, charts) is
/// recomputed here whenever an input changes.
pub struct AppState {
    pub settings: Settings,
    pub strings: &'static Strings,

    /// Loaded table (None until the user opens a file).
    pub table: Option<CompositionTable>,
    /// File name of the loaded table, for the top bar.
    pub source_name: Option<String>,

    /// Vertex names of the default chart.
    pub axis_names: [String; 3],
    /// Chosen basis compounds; `None` until picked.
    pub basis_selection: [Option<String>; 3],

    /// Built once per table so both charts agree on colours.
    pub color_map: Option<ColorMap>,

    /// Per-row default coordinates, for the data table.
    pub default_points: Vec<ProjectedPoint>,
    pub default_chart: Option<Result<TernaryChart, TernaryError>>,
    pub custom_chart: Option<Result<TernaryChart, TernaryError>>,
    /// Rows left out of the custom chart.
    pub custom_dropped: usize,

    /// Status / error message shown in the UI.
    pub status: Option<(StatusLevel, String)>,

    pub show_table: bool,

    exporter: Exporter,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let exporter = Exporter::new(settings.export.clone(), settings.marker_radius);
        Self {
            strings: settings.locale.strings(),
            axis_names: settings.axis_names.clone(),
            settings,
            table: None,
            source_name: None,
            basis_selection: [None, None, None],
            color_map: None,
            default_points: Vec::new(),
            default_chart: None,
            custom_chart: None,
            custom_dropped: 0,
            status: None,
            show_table: false,
            exporter,
        }
    }

    /// Ingest a newly loaded table: reset selections, build colours and charts.
    pub fn set_table(&mut self, table: CompositionTable, source_name: Option<String>) {
        if self.settings.axis_names_from_header {
            self.axis_names = table.component_names.clone();
        }
        self.color_map = Some(ColorMap::new(
            &table.unique_labels(),
            self.settings.palette,
        ));
        self.basis_selection = [None, None, None];
        self.table = Some(table);
        self.source_name = source_name;
        self.status = None;
        self.refresh_charts();
    }

    /// Load a file from disk, reporting failures in the status line.
    pub fn load_path(&mut self, path: &Path) {
        match crate::data::loader::load_file(path) {
            Ok(table) => {
                log::info!(
                    "Loaded {} rows with {} distinct labels from {}",
                    table.len(),
                    table.unique_labels().len(),
                    path.display()
                );
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned());
                self.set_table(table, name);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                let message = match e.downcast_ref::<TernaryError>() {
                    Some(err) => self.strings.explain(err),
                    None => format!("{}: {e:#}", self.strings.load_failed),
                };
                self.status = Some((StatusLevel::Error, message));
            }
        }
    }

    /// Rename one vertex of the default chart.
    pub fn set_axis_name(&mut self, slot: usize, name: String) {
        self.axis_names[slot] = name;
        self.refresh_default();
    }

    /// Choose (or clear) one basis compound.
    pub fn select_basis(&mut self, slot: usize, label: Option<String>) {
        self.basis_selection[slot] = label;
        self.refresh_custom();
    }

    /// Rebuild both charts from the current table and selections.
    pub fn refresh_charts(&mut self) {
        self.refresh_default();
        self.refresh_custom();
    }

    fn refresh_default(&mut self) {
        let (Some(table), Some(colors)) = (&self.table, &self.color_map) else {
            self.default_points.clear();
            self.default_chart = None;
            return;
        };

        match project(table, None) {
            Ok(points) => {
                let chart = TernaryChart::build(
                    self.strings.default_title(&self.axis_names),
                    self.axis_names.clone(),
                    self.strings.legend_title,
                    &points,
                    colors,
                );
                self.default_points = points;
                self.default_chart = Some(Ok(chart));
            }
            Err(e) => {
                log::warn!("default projection failed: {e}");
                self.default_points.clear();
                self.default_chart = Some(Err(e));
            }
        }
    }

    fn refresh_custom(&mut self) {
        self.custom_dropped = 0;
        let (Some(table), Some(colors)) = (&self.table, &self.color_map) else {
            self.custom_chart = None;
            return;
        };

        let chart = Basis::resolve(table, &self.basis_selection).map(|basis| {
            let projection = project_onto_basis(table, &basis);
            self.custom_dropped = projection.dropped.len();
            TernaryChart::build(
                self.strings.custom_title,
                basis.labels().clone(),
                self.strings.legend_title,
                &projection.points,
                colors,
            )
        });
        match &chart {
            Ok(c) => log::debug!(
                "custom chart: {} points in {} series, {} rows dropped",
                c.point_count(),
                c.series.len(),
                self.custom_dropped
            ),
            Err(e @ TernaryError::DegenerateBasis { .. }) => log::warn!("{e}"),
            Err(_) => {}
        }
        self.custom_chart = Some(chart);
    }

    /// The chart of `kind`, if it could be built.
    pub fn chart(&self, kind: ChartKind) -> Option<&TernaryChart> {
        let slot = match kind {
            ChartKind::Default => &self.default_chart,
            ChartKind::Custom => &self.custom_chart,
        };
        slot.as_ref().and_then(|r| r.as_ref().ok())
    }

    /// Suggested file name for exporting the chart of `kind`.
    pub fn export_file_name(&self, kind: ChartKind, format: ExportFormat) -> Option<String> {
        let chart = self.chart(kind)?;
        let suffix = match kind {
            ChartKind::Default => "ternary",
            ChartKind::Custom => "basis",
        };
        Some(export_file_name(&chart.axis_names, suffix, format))
    }

    /// Export one chart, reporting the outcome in the status line.
    pub fn export(&mut self, kind: ChartKind, format: ExportFormat, path: &Path) {
        let Some(chart) = self.chart(kind) else {
            return;
        };
        match write_export(&self.exporter, chart, format, path) {
            Ok(()) => {
                self.status = Some((
                    StatusLevel::Info,
                    format!("{} {}", self.strings.exported, path.display()),
                ));
            }
            Err(e) => {
                log::error!("export to {} failed: {e}", path.display());
                self.status = Some((StatusLevel::Error, self.strings.explain(&e)));
            }
        }
    }
}
