use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::export::ExportFormat;
use crate::state::{AppState, ChartKind, StatusLevel};
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Left side panel – axis names, basis selection, export
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    let strings = state.strings;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Axis names ----
            ui.heading(strings.elements_heading);
            ui.separator();
            for slot in 0..3 {
                ui.label(strings.element_slots[slot]);
                let mut name = state.axis_names[slot].clone();
                if ui.text_edit_singleline(&mut name).changed() {
                    state.set_axis_name(slot, name);
                }
            }
            ui.add_space(8.0);

            // ---- Basis compounds ----
            ui.heading(strings.basis_heading);
            ui.separator();
            let labels = match &state.table {
                Some(table) => table.unique_labels(),
                None => {
                    ui.label(strings.no_data);
                    Vec::new()
                }
            };
            if !labels.is_empty() {
                for slot in 0..3 {
                    let current = state.basis_selection[slot].clone();
                    let shown = current.as_deref().unwrap_or(strings.not_selected);
                    ui.label(strings.basis_slots[slot]);
                    egui::ComboBox::from_id_salt(("basis", slot))
                        .selected_text(shown)
                        .show_ui(ui, |ui: &mut Ui| {
                            if ui
                                .selectable_label(current.is_none(), strings.not_selected)
                                .clicked()
                            {
                                state.select_basis(slot, None);
                            }
                            for label in &labels {
                                let selected = current.as_deref() == Some(label.as_str());
                                let mut text = RichText::new(label);
                                if let Some(cm) = &state.color_map {
                                    text = text.color(cm.color_for(label));
                                }
                                if ui.selectable_label(selected, text).clicked() {
                                    state.select_basis(slot, Some(label.clone()));
                                }
                            }
                        });
                }
            }
            ui.add_space(8.0);

            // ---- Export ----
            ui.heading(strings.export_heading);
            ui.separator();
            export_row(ui, state, ChartKind::Default, strings.default_section);
            export_row(ui, state, ChartKind::Custom, strings.custom_section);
            ui.add_space(8.0);

            ui.checkbox(&mut state.show_table, strings.show_table);
        });
}

fn export_row(ui: &mut Ui, state: &mut AppState, kind: ChartKind, title: &str) {
    ui.label(title);
    ui.horizontal(|ui: &mut Ui| {
        for format in ExportFormat::ALL {
            let name = state.export_file_name(kind, format);
            let clicked = ui
                .add_enabled(name.is_some(), egui::Button::new(format.label()))
                .clicked();
            if let (true, Some(name)) = (clicked, name) {
                save_file_dialog(state, kind, format, &name);
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Central panel – both charts and the optional data table
// ---------------------------------------------------------------------------

pub fn central_panel(ui: &mut Ui, state: &AppState) {
    let strings = state.strings;
    if state.table.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading(format!("{}\n\n{}", strings.no_data, strings.file_hint));
        });
        return;
    }

    let radius = state.settings.marker_radius;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading(strings.default_section);
            match &state.default_chart {
                Some(Ok(chart)) => plot::ternary_plot(ui, "default_ternary", chart, radius),
                Some(Err(e)) => error_label(ui, state, e),
                None => {}
            }
            ui.separator();

            ui.heading(strings.custom_section);
            match &state.custom_chart {
                Some(Ok(chart)) => {
                    plot::ternary_plot(ui, "custom_ternary", chart, radius);
                    if state.custom_dropped > 0 {
                        ui.label(
                            RichText::new(format!(
                                "{} {}",
                                state.custom_dropped, strings.outside_basis
                            ))
                            .weak(),
                        );
                    }
                }
                Some(Err(e)) => error_label(ui, state, e),
                None => {}
            }

            if state.show_table {
                ui.separator();
                ui.heading(strings.table_heading);
                data_table(ui, state);
            }
        });
}

fn error_label(ui: &mut Ui, state: &AppState, err: &crate::error::TernaryError) {
    let text = RichText::new(state.strings.explain(err));
    if err.is_prompt() {
        ui.label(text.color(Color32::LIGHT_BLUE));
    } else {
        ui.label(text.color(Color32::RED));
    }
}

/// Raw and normalised composition per row.
fn data_table(ui: &mut Ui, state: &AppState) {
    let Some(table) = &state.table else {
        return;
    };
    let names = &table.component_names;

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::auto().at_least(80.0))
        .columns(Column::auto().at_least(60.0), 6)
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong(state.strings.label_column);
            });
            for name in names {
                header.col(|ui| {
                    ui.strong(name.as_str());
                });
            }
            for name in &state.axis_names {
                header.col(|ui| {
                    ui.strong(format!("x({name})"));
                });
            }
        })
        .body(|mut body| {
            for (i, row) in table.rows().iter().enumerate() {
                let normalized = state
                    .default_points
                    .get(i)
                    .map(|p| p.coords);
                body.row(18.0, |mut table_row| {
                    table_row.col(|ui| {
                        let color = state
                            .color_map
                            .as_ref()
                            .map(|cm| cm.color_for(&row.label))
                            .unwrap_or(Color32::GRAY);
                        ui.label(RichText::new(&row.label).color(color));
                    });
                    for value in row.composition() {
                        table_row.col(|ui| {
                            ui.label(format!("{value}"));
                        });
                    }
                    for k in 0..3 {
                        table_row.col(|ui| {
                            match normalized {
                                Some(coords) => ui.label(format!("{:.4}", coords[k])),
                                None => ui.label("–"),
                            };
                        });
                    }
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    let strings = state.strings;
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button(strings.menu_file, |ui: &mut Ui| {
            if ui.button(strings.menu_open).clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            let source = state.source_name.as_deref().unwrap_or("");
            ui.label(format!("{source}  {} {}", table.len(), strings.rows_loaded));
            ui.separator();
        }

        if let Some((level, msg)) = &state.status {
            let color = match level {
                StatusLevel::Info => Color32::from_rgb(60, 160, 60),
                StatusLevel::Error => Color32::RED,
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open composition table")
        .add_filter(
            "Supported files",
            &["xlsx", "xlsm", "xls", "ods", "csv", "tsv", "json", "parquet", "pq"],
        )
        .add_filter("Excel", &["xlsx", "xlsm", "xls", "ods"])
        .add_filter("CSV", &["csv", "tsv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

fn save_file_dialog(state: &mut AppState, kind: ChartKind, format: ExportFormat, name: &str) {
    let file = rfd::FileDialog::new()
        .set_title("Export chart")
        .set_file_name(name)
        .add_filter(format.label(), &[format.extension()])
        .save_file();

    if let Some(path) = file {
        state.export(kind, format, &path);
    }
}
