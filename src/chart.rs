use std::collections::HashMap;

use eframe::egui::Color32;

use crate::color::ColorMap;
use crate::data::projection::ProjectedPoint;

/// Height of the unit equilateral triangle.
pub const TRIANGLE_HEIGHT: f64 = 0.866_025_403_784_438_6;

// ---------------------------------------------------------------------------
// Ternary geometry
// ---------------------------------------------------------------------------

/// Map ternary coordinates onto the unit triangle.
///
/// The first component sits at the top vertex `(0.5, h)`, the second at the
/// bottom-left `(0, 0)` and the third at the bottom-right `(1, 0)`.
pub fn to_cartesian(coords: [f64; 3]) -> [f64; 2] {
    let [a, _b, c] = coords;
    [0.5 * a + c, TRIANGLE_HEIGHT * a]
}

/// Inverse of [`to_cartesian`], for hover read-outs.
pub fn to_ternary(point: [f64; 2]) -> [f64; 3] {
    let a = point[1] / TRIANGLE_HEIGHT;
    let c = point[0] - 0.5 * a;
    [a, 1.0 - a - c, c]
}

/// Grid segments in ternary coordinates, one family per component, at
/// multiples of `step` strictly between 0 and 1.
pub fn grid_lines(step: f64) -> Vec<([f64; 3], [f64; 3])> {
    let n = (1.0 / step).round() as usize;
    let mut lines = Vec::new();
    for k in 0..3 {
        for i in 1..n {
            let t = i as f64 * step;
            let mut start = [0.0; 3];
            let mut end = [0.0; 3];
            start[k] = t;
            end[k] = t;
            start[(k + 1) % 3] = 1.0 - t;
            end[(k + 2) % 3] = 1.0 - t;
            lines.push((start, end));
        }
    }
    lines
}

// ---------------------------------------------------------------------------
// Chart model
// ---------------------------------------------------------------------------

/// All points of one label.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub label: String,
    pub color: Color32,
    pub points: Vec<[f64; 3]>,
}

/// A renderer-independent ternary scatter chart.
#[derive(Debug, Clone, PartialEq)]
pub struct TernaryChart {
    pub title: String,
    /// Names for the top, bottom-left and bottom-right vertices.
    pub axis_names: [String; 3],
    pub legend_title: String,
    /// One series per distinct label, in first-seen order.
    pub series: Vec<ChartSeries>,
}

impl TernaryChart {
    /// Group points by label.
    ///
    /// Series order is the order in which labels first appear in `points`,
    /// tracked explicitly so the legend lists each label exactly once.
    pub fn build(
        title: impl Into<String>,
        axis_names: [String; 3],
        legend_title: impl Into<String>,
        points: &[ProjectedPoint],
        colors: &ColorMap,
    ) -> Self {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut series: Vec<ChartSeries> = Vec::new();

        for point in points {
            let index = *seen.entry(point.label.as_str()).or_insert_with(|| {
                series.push(ChartSeries {
                    label: point.label.clone(),
                    color: colors.color_for(&point.label),
                    points: Vec::new(),
                });
                series.len() - 1
            });
            series[index].points.push(point.coords);
        }

        Self {
            title: title.into(),
            axis_names,
            legend_title: legend_title.into(),
            series,
        }
    }

    /// Legend rows: one `(label, colour)` per series.
    pub fn legend_entries(&self) -> Vec<(&str, Color32)> {
        self.series
            .iter()
            .map(|s| (s.label.as_str(), s.color))
            .collect()
    }

    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::PaletteKind;

    fn point(label: &str, row: usize, coords: [f64; 3]) -> ProjectedPoint {
        ProjectedPoint {
            label: label.to_string(),
            row,
            coords,
        }
    }

    fn axes() -> [String; 3] {
        ["Sr".into(), "Mo".into(), "O".into()]
    }

    #[test]
    fn vertices_map_to_triangle_corners() {
        assert_eq!(to_cartesian([1.0, 0.0, 0.0]), [0.5, TRIANGLE_HEIGHT]);
        assert_eq!(to_cartesian([0.0, 1.0, 0.0]), [0.0, 0.0]);
        assert_eq!(to_cartesian([0.0, 0.0, 1.0]), [1.0, 0.0]);
    }

    #[test]
    fn cartesian_round_trips_to_ternary() {
        let coords = [0.2, 0.3, 0.5];
        let back = to_ternary(to_cartesian(coords));
        for (a, b) in coords.iter().zip(back.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn grid_has_four_lines_per_component_at_fifths() {
        let lines = grid_lines(0.2);
        assert_eq!(lines.len(), 12);
        for (start, end) in &lines {
            assert!((start.iter().sum::<f64>() - 1.0).abs() < 1e-12);
            assert!((end.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn repeated_labels_share_one_legend_entry() {
        let points = vec![
            point("SrO", 0, [0.5, 0.0, 0.5]),
            point("MoO3", 1, [0.0, 0.25, 0.75]),
            point("SrO", 2, [0.5, 0.0, 0.5]),
            point("SrO", 3, [0.4, 0.0, 0.6]),
        ];
        let labels = vec!["SrO".to_string(), "MoO3".to_string()];
        let colors = ColorMap::new(&labels, PaletteKind::Vivid);
        let chart = TernaryChart::build("t", axes(), "Compound", &points, &colors);

        let legend: Vec<&str> = chart.legend_entries().iter().map(|(l, _)| *l).collect();
        assert_eq!(legend, vec!["SrO", "MoO3"]);
        assert_eq!(chart.series[0].points.len(), 3);
        assert_eq!(chart.point_count(), 4);
        assert_eq!(chart.series[0].color, colors.color_for("SrO"));
    }

    #[test]
    fn empty_projection_gives_empty_chart() {
        let colors = ColorMap::new(&[], PaletteKind::Vivid);
        let chart = TernaryChart::build("t", axes(), "Compound", &[], &colors);
        assert!(chart.series.is_empty());
        assert_eq!(chart.point_count(), 0);
    }
}
