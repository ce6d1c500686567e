use eframe::egui::{Align, Align2, Color32, Layout, RichText, Ui};
use egui_plot::{Corner, Legend, Line, MarkerShape, Plot, PlotPoint, PlotPoints, Points, Text};

use crate::chart::{grid_lines, to_cartesian, to_ternary, TernaryChart, TRIANGLE_HEIGHT};

const GRID_COLOR: Color32 = Color32::from_gray(200);
const GRID_STEP: f64 = 0.2;
/// Width of the black ring drawn around every marker, in points.
const MARKER_OUTLINE: f32 = 1.5;

// ---------------------------------------------------------------------------
// Ternary plot (central panel)
// ---------------------------------------------------------------------------

/// Draw a ternary scatter chart inside an `egui_plot` with a locked aspect ratio.
pub fn ternary_plot(ui: &mut Ui, id: &str, chart: &TernaryChart, marker_radius: f32) {
    // The legend sits in the top-right corner; its title goes right above it.
    ui.horizontal(|ui: &mut Ui| {
        ui.label(RichText::new(&chart.title).strong().size(16.0));
        ui.with_layout(Layout::right_to_left(Align::Center), |ui: &mut Ui| {
            ui.label(RichText::new(&chart.legend_title).strong());
        });
    });

    let axis_names = chart.axis_names.clone();
    let height = (ui.available_width() * 0.8).clamp(240.0, 640.0);

    Plot::new(id)
        .legend(Legend::default().position(Corner::RightTop))
        .data_aspect(1.0)
        .height(height)
        .show_axes(false)
        .show_grid(false)
        .include_x(-0.15)
        .include_x(1.35)
        .include_y(-0.12)
        .include_y(TRIANGLE_HEIGHT + 0.1)
        .allow_scroll(false)
        .label_formatter(move |name, value| {
            let [a, b, c] = to_ternary([value.x, value.y]);
            let coords = format!(
                "{}: {a:.3}\n{}: {b:.3}\n{}: {c:.3}",
                axis_names[0], axis_names[1], axis_names[2]
            );
            if name.is_empty() {
                coords
            } else {
                format!("{name}\n{coords}")
            }
        })
        .show(ui, |plot_ui| {
            for (start, end) in grid_lines(GRID_STEP) {
                let segment: PlotPoints = vec![to_cartesian(start), to_cartesian(end)].into();
                plot_ui.line(Line::new(segment).color(GRID_COLOR).width(1.0));
            }

            let outline: PlotPoints = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]]
                .into_iter()
                .map(to_cartesian)
                .collect();
            plot_ui.line(Line::new(outline).color(Color32::BLACK).width(1.5));

            let vertex_titles = [
                ([1.0, 0.0, 0.0], [0.0, 0.04], Align2::CENTER_BOTTOM),
                ([0.0, 1.0, 0.0], [0.0, -0.04], Align2::CENTER_TOP),
                ([0.0, 0.0, 1.0], [0.0, -0.04], Align2::CENTER_TOP),
            ];
            for (name, (vertex, offset, anchor)) in chart.axis_names.iter().zip(vertex_titles) {
                let [x, y] = to_cartesian(vertex);
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(x + offset[0], y + offset[1]),
                        RichText::new(name).size(15.0).strong(),
                    )
                    .anchor(anchor),
                );
            }

            for series in &chart.series {
                // Unnamed, so it stays out of the legend.
                let ring: PlotPoints = series.points.iter().copied().map(to_cartesian).collect();
                plot_ui.points(
                    Points::new(ring)
                        .color(Color32::BLACK)
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(marker_radius + MARKER_OUTLINE),
                );
                let points: PlotPoints = series.points.iter().copied().map(to_cartesian).collect();
                plot_ui.points(
                    Points::new(points)
                        .name(&series.label)
                        .color(series.color)
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(marker_radius),
                );
            }
        });
}

#[cfg(test)]
mod tests {
    use eframe::egui::{self, epaint::CircleShape, Pos2, Rect, Shape};

    use super::*;
    use crate::chart::ChartSeries;

    const RADIUS: f32 = 5.0;

    fn chart() -> TernaryChart {
        TernaryChart {
            title: "Sr-Mo-O 三角相図".into(),
            axis_names: ["Sr".into(), "Mo".into(), "O".into()],
            legend_title: "化合物".into(),
            series: vec![
                ChartSeries {
                    label: "SrO".into(),
                    color: Color32::from_rgb(229, 134, 6),
                    points: vec![[0.5, 0.0, 0.5], [0.4, 0.0, 0.6]],
                },
                ChartSeries {
                    label: "MoO3".into(),
                    color: Color32::from_rgb(93, 105, 177),
                    points: vec![[0.0, 0.25, 0.75]],
                },
            ],
        }
    }

    fn flatten(shape: &Shape, out: &mut Vec<Shape>) {
        match shape {
            Shape::Vec(shapes) => shapes.iter().for_each(|s| flatten(s, out)),
            other => out.push(other.clone()),
        }
    }

    /// Draw one frame headlessly and return every painted primitive.
    fn draw(chart: &TernaryChart) -> Vec<Shape> {
        let ctx = egui::Context::default();
        let input = egui::RawInput {
            screen_rect: Some(Rect::from_min_size(Pos2::ZERO, egui::vec2(1000.0, 800.0))),
            ..Default::default()
        };
        let output = ctx.run(input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                ternary_plot(ui, "ternary_test", chart, RADIUS);
            });
        });
        let mut shapes = Vec::new();
        for clipped in &output.shapes {
            flatten(&clipped.shape, &mut shapes);
        }
        shapes
    }

    fn circles(shapes: &[Shape], fill: Color32, radius: f32) -> usize {
        shapes
            .iter()
            .filter(|s| {
                matches!(s, Shape::Circle(CircleShape { fill: f, radius: r, .. })
                    if *f == fill && (*r - radius).abs() < 1e-3)
            })
            .count()
    }

    #[test]
    fn legend_title_is_painted() {
        let shapes = draw(&chart());
        let painted = shapes.iter().any(|s| match s {
            Shape::Text(text) => text.galley.text() == "化合物",
            _ => false,
        });
        assert!(painted);
    }

    #[test]
    fn every_marker_has_a_black_ring() {
        let chart = chart();
        let shapes = draw(&chart);
        assert_eq!(
            circles(&shapes, Color32::BLACK, RADIUS + MARKER_OUTLINE),
            chart.point_count()
        );
        for series in &chart.series {
            assert!(circles(&shapes, series.color, RADIUS) >= series.points.len());
        }
    }
}
