use std::fmt::Write as _;

use crate::chart::{grid_lines, to_cartesian, TernaryChart, TRIANGLE_HEIGHT};
use crate::color::hex;
use crate::error::TernaryError;

const FONT_FAMILY: &str = "DejaVu Sans, Arial, Helvetica, sans-serif";
const LEGEND_WIDTH: f64 = 200.0;
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_TOP: f64 = 90.0;
const MARGIN_BOTTOM: f64 = 60.0;
const GRID_STEP: f64 = 0.2;

/// Canvas geometry: where the unit triangle lands on the page.
struct Frame {
    x0: f64,
    base_y: f64,
    side: f64,
}

impl Frame {
    fn new(width: f64, height: f64) -> Self {
        let avail_w = (width - MARGIN_LEFT - LEGEND_WIDTH - 20.0).max(1.0);
        let avail_h = (height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0);
        let side = avail_w.min(avail_h / TRIANGLE_HEIGHT);
        let top_y = MARGIN_TOP + (avail_h - side * TRIANGLE_HEIGHT) / 2.0;
        Self {
            x0: MARGIN_LEFT + (avail_w - side) / 2.0,
            base_y: top_y + side * TRIANGLE_HEIGHT,
            side,
        }
    }

    fn place(&self, coords: [f64; 3]) -> (f64, f64) {
        let [x, y] = to_cartesian(coords);
        (self.x0 + self.side * x, self.base_y - self.side * y)
    }
}

/// Escape text for use inside SVG elements and attributes.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render a chart as a standalone SVG document.
pub fn render_svg(
    chart: &TernaryChart,
    width: u32,
    height: u32,
    marker_radius: f32,
) -> Result<String, TernaryError> {
    let mut out = String::new();
    write_svg(&mut out, chart, width as f64, height as f64, marker_radius as f64)
        .map_err(|e| TernaryError::Render(format!("writing svg: {e}")))?;
    Ok(out)
}

fn write_svg(
    out: &mut String,
    chart: &TernaryChart,
    width: f64,
    height: f64,
    radius: f64,
) -> std::fmt::Result {
    let frame = Frame::new(width, height);

    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" font-family="{FONT_FAMILY}">"#
    )?;
    writeln!(out, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
    writeln!(
        out,
        r#"<text x="{:.1}" y="40" font-size="20" text-anchor="middle">{}</text>"#,
        width / 2.0,
        escape_xml(&chart.title)
    )?;

    // Grid
    writeln!(out, r##"<g stroke="#d0d0d0" stroke-width="1">"##)?;
    for (start, end) in grid_lines(GRID_STEP) {
        let (x1, y1) = frame.place(start);
        let (x2, y2) = frame.place(end);
        writeln!(
            out,
            r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}"/>"#
        )?;
    }
    writeln!(out, "</g>")?;

    // Triangle frame
    let (ax, ay) = frame.place([1.0, 0.0, 0.0]);
    let (bx, by) = frame.place([0.0, 1.0, 0.0]);
    let (cx, cy) = frame.place([0.0, 0.0, 1.0]);
    writeln!(
        out,
        r#"<polygon points="{ax:.2},{ay:.2} {bx:.2},{by:.2} {cx:.2},{cy:.2}" fill="none" stroke="black" stroke-width="1.5"/>"#
    )?;

    // Vertex titles
    let [name_a, name_b, name_c] = &chart.axis_names;
    writeln!(
        out,
        r#"<text x="{ax:.2}" y="{:.2}" font-size="16" text-anchor="middle">{}</text>"#,
        ay - 14.0,
        escape_xml(name_a)
    )?;
    writeln!(
        out,
        r#"<text x="{bx:.2}" y="{:.2}" font-size="16" text-anchor="middle">{}</text>"#,
        by + 30.0,
        escape_xml(name_b)
    )?;
    writeln!(
        out,
        r#"<text x="{cx:.2}" y="{:.2}" font-size="16" text-anchor="middle">{}</text>"#,
        cy + 30.0,
        escape_xml(name_c)
    )?;

    // Markers
    for series in &chart.series {
        writeln!(
            out,
            r#"<g fill="{}" stroke="black" stroke-width="2">"#,
            hex(series.color)
        )?;
        for &coords in &series.points {
            let (x, y) = frame.place(coords);
            writeln!(out, r#"<circle cx="{x:.2}" cy="{y:.2}" r="{radius}"/>"#)?;
        }
        writeln!(out, "</g>")?;
    }

    // Legend
    let lx = width - LEGEND_WIDTH;
    writeln!(
        out,
        r#"<text x="{lx:.1}" y="{MARGIN_TOP}" font-size="15" font-weight="bold">{}</text>"#,
        escape_xml(&chart.legend_title)
    )?;
    for (i, (label, color)) in chart.legend_entries().into_iter().enumerate() {
        let y = MARGIN_TOP + 26.0 + 24.0 * i as f64;
        writeln!(
            out,
            r#"<circle cx="{:.1}" cy="{y:.1}" r="{radius}" fill="{}" stroke="black" stroke-width="2"/>"#,
            lx + 10.0,
            hex(color)
        )?;
        writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" font-size="14">{}</text>"#,
            lx + 24.0,
            y + 5.0,
            escape_xml(label)
        )?;
    }

    writeln!(out, "</svg>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartSeries;
    use eframe::egui::Color32;

    fn chart() -> TernaryChart {
        TernaryChart {
            title: "Sr-Mo-O ternary diagram".into(),
            axis_names: ["Sr".into(), "Mo".into(), "O".into()],
            legend_title: "Compound".into(),
            series: vec![
                ChartSeries {
                    label: "SrO".into(),
                    color: Color32::from_rgb(229, 134, 6),
                    points: vec![[0.5, 0.0, 0.5], [0.4, 0.0, 0.6]],
                },
                ChartSeries {
                    label: "A&B<1>".into(),
                    color: Color32::from_rgb(93, 105, 177),
                    points: vec![[0.0, 0.25, 0.75]],
                },
            ],
        }
    }

    #[test]
    fn one_marker_per_point_plus_one_per_legend_entry() {
        let svg = render_svg(&chart(), 900, 700, 5.0).unwrap();
        assert_eq!(svg.matches("<circle").count(), 3 + 2);
        assert_eq!(svg.matches(">Compound</text>").count(), 1);
        assert_eq!(svg.matches(">SrO</text>").count(), 1);
    }

    #[test]
    fn labels_and_titles_are_escaped() {
        let svg = render_svg(&chart(), 900, 700, 5.0).unwrap();
        assert!(svg.contains("A&amp;B&lt;1&gt;"));
        assert!(!svg.contains("A&B<1>"));
        assert!(svg.contains("fill=\"#e58606\""));
    }

    #[test]
    fn vertices_stay_inside_the_canvas() {
        let frame = Frame::new(900.0, 700.0);
        for coords in [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]] {
            let (x, y) = frame.place(coords);
            assert!(x >= MARGIN_LEFT && x <= 900.0 - LEGEND_WIDTH);
            assert!(y >= MARGIN_TOP && y <= 700.0 - MARGIN_BOTTOM + 1e-9);
        }
    }
}
