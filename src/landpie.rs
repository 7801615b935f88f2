use anyhow::{anyhow, bail, Context, Result};
use std::f64::consts::PI;
use std::path::Path as FsPath;
use svg::node::element::{Circle, Group, Path, Rectangle, Text};
use svg::Document;

const RADIUS: f64 = 180.0;
const PADDING: f64 = 40.0;
/// Extra ring around the pie for leader lines and percentage labels.
const CALLOUT_REACH: f64 = 1.45;
const LEGEND_WIDTH: f64 = 240.0;
const FONT: &str = "Times New Roman, Arial, sans-serif";

/// Publication palette, cycled when there are more slices than entries.
const PALETTE: [&str; 6] = [
    "#4C72B0", "#55A868", "#C44E52", "#8172B2", "#CCB974", "#64B5CD",
];

#[derive(Clone, Debug, PartialEq)]
pub struct SliceRow {
    pub label: String,
    pub area: f64,
}

/// Reads a two-column (label, area) CSV with a header row. Header names are
/// synonym-tolerant like the segment reader.
pub fn read_area_table(path: &FsPath) -> Result<Vec<SliceRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Could not read area table '{}'", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .context("Could not read area table header")?
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();
    let pick = |candidates: &[&str]| -> Option<usize> {
        candidates
            .iter()
            .find_map(|c| headers.iter().position(|h| h == c))
    };
    let label_col = pick(&["type", "label", "name", "category"]);
    let area_col = pick(&["area", "value", "amount"]);
    let (label_col, area_col) = match (label_col, area_col) {
        (Some(l), Some(a)) => (l, a),
        _ => bail!(
            "Could not resolve label/area columns in header: {:?}",
            headers
        ),
    };

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.context("Could not read area table row")?;
        let label = record
            .get(label_col)
            .ok_or_else(|| anyhow!("Row {}: missing label column", i + 2))?
            .trim()
            .to_string();
        let raw = record
            .get(area_col)
            .ok_or_else(|| anyhow!("Row {}: missing area column", i + 2))?;
        let area: f64 = raw
            .trim()
            .replace(',', "")
            .parse()
            .map_err(|_| anyhow!("Row {}: could not parse area '{raw}'", i + 2))?;
        if area < 0.0 {
            bail!("Row {}: negative area {area}", i + 2);
        }
        rows.push(SliceRow { label, area });
    }
    if rows.is_empty() {
        bail!("Area table '{}' has no data rows", path.display());
    }
    Ok(rows)
}

fn polar(cx: f64, cy: f64, r: f64, angle: f64) -> (f64, f64) {
    (cx + r * angle.cos(), cy + r * angle.sin())
}

fn wedge_path(cx: f64, cy: f64, r: f64, start: f64, end: f64, color: &str) -> Path {
    let (x1, y1) = polar(cx, cy, r, start);
    let (x2, y2) = polar(cx, cy, r, end);
    let large_arc = i32::from(end - start > PI);
    let data = format!(
        "M {cx:.3} {cy:.3} L {x1:.3} {y1:.3} A {r:.3} {r:.3} 0 {large_arc} 1 {x2:.3} {y2:.3} Z"
    );
    Path::new().set("d", data).set("fill", color.to_string())
}

/// Pie chart with leader-line percentage callouts and a side legend:
/// slices start at 12 o'clock and run clockwise in input order.
pub fn render_landpie_svg(rows: &[SliceRow], title: &str) -> Result<Document> {
    if rows.is_empty() {
        bail!("Pie chart needs at least one slice");
    }
    let total: f64 = rows.iter().map(|r| r.area).sum();
    if total <= 0.0 {
        bail!("Total area is zero; nothing to draw");
    }

    let title_space = if title.is_empty() { 0.0 } else { 50.0 };
    let cx = PADDING + CALLOUT_REACH * RADIUS;
    let cy = PADDING + title_space + CALLOUT_REACH * RADIUS;
    let width = cx + CALLOUT_REACH * RADIUS + LEGEND_WIDTH + PADDING;
    let height = cy + CALLOUT_REACH * RADIUS + PADDING;

    let mut doc = Document::new()
        .set("viewBox", (0, 0, width, height))
        .set("width", width)
        .set("height", height)
        .add(
            Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", "100%")
                .set("height", "100%")
                .set("fill", "white"),
        );

    if !title.is_empty() {
        doc = doc.add(
            Text::new(title.to_string())
                .set("x", cx)
                .set("y", PADDING + 20.0)
                .set("text-anchor", "middle")
                .set("font-family", FONT)
                .set("font-weight", 600)
                .set("font-size", 20),
        );
    }

    let mut angle = -PI / 2.0;
    for (i, row) in rows.iter().enumerate() {
        let fraction = row.area / total;
        let end = angle + fraction * 2.0 * PI;
        let color = PALETTE[i % PALETTE.len()];
        if fraction >= 1.0 {
            doc = doc.add(
                Circle::new()
                    .set("cx", format!("{cx:.3}"))
                    .set("cy", format!("{cy:.3}"))
                    .set("r", RADIUS)
                    .set("fill", color),
            );
        } else if fraction > 0.0 {
            doc = doc.add(wedge_path(cx, cy, RADIUS, angle, end, color));
        }

        // Leader line from just inside the rim to outside, label beyond it.
        let mid = (angle + end) / 2.0;
        let (sx, sy) = polar(cx, cy, RADIUS * 0.9, mid);
        let (ex, ey) = polar(cx, cy, RADIUS * 1.2, mid);
        let (tx, ty) = polar(cx, cy, RADIUS * 1.32, mid);
        let anchor = if mid.cos() >= 0.0 { "start" } else { "end" };
        doc = doc
            .add(
                Path::new()
                    .set("d", format!("M {sx:.3} {sy:.3} L {ex:.3} {ey:.3}"))
                    .set("stroke", "black")
                    .set("stroke-width", 0.8)
                    .set("fill", "none"),
            )
            .add(
                Text::new(format!("{:.1}%", fraction * 100.0))
                    .set("x", format!("{tx:.3}"))
                    .set("y", format!("{ty:.3}"))
                    .set("text-anchor", anchor)
                    .set("dominant-baseline", "middle")
                    .set("font-family", FONT)
                    .set("font-size", 12),
            );
        angle = end;
    }

    let legend_x = cx + CALLOUT_REACH * RADIUS + 30.0;
    let mut legend = Group::new().set(
        "transform",
        format!("translate({legend_x}, {:.3})", cy - rows.len() as f64 * 11.0),
    );
    let mut y = 0.0;
    for (i, row) in rows.iter().enumerate() {
        legend = legend
            .add(
                Rectangle::new()
                    .set("x", 0)
                    .set("y", y)
                    .set("width", 14)
                    .set("height", 14)
                    .set("fill", PALETTE[i % PALETTE.len()])
                    .set("stroke", "black")
                    .set("stroke-width", 0.4),
            )
            .add(
                Text::new(row.label.clone())
                    .set("x", 20)
                    .set("y", y + 12.0)
                    .set("font-family", FONT)
                    .set("font-size", 12),
            );
        y += 22.0;
    }
    doc = doc.add(legend);
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn rows() -> Vec<SliceRow> {
        vec![
            SliceRow {
                label: "Temperate steppe".to_string(),
                area: 75.0,
            },
            SliceRow {
                label: "Lowland meadow".to_string(),
                area: 25.0,
            },
        ]
    }

    #[test]
    fn reads_area_csv_with_synonym_headers() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Type,Area\nSteppe,100.5\nMeadow,\"1,200\"\n").unwrap();
        let rows = read_area_table(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label, "Steppe");
        assert_eq!(rows[1].area, 1200.0);
    }

    #[test]
    fn rejects_header_only_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "type,area\n").unwrap();
        assert!(read_area_table(file.path()).is_err());
    }

    #[test]
    fn percentages_cover_the_whole_pie() {
        let svg = render_landpie_svg(&rows(), "").unwrap().to_string();
        assert!(svg.contains(">75.0%</text>"));
        assert!(svg.contains(">25.0%</text>"));
    }

    #[test]
    fn legend_lists_every_slice() {
        let svg = render_landpie_svg(&rows(), "Grassland types")
            .unwrap()
            .to_string();
        assert!(svg.contains(">Temperate steppe</text>"));
        assert!(svg.contains(">Lowland meadow</text>"));
        assert!(svg.contains(">Grassland types</text>"));
    }

    #[test]
    fn zero_total_is_an_error() {
        let rows = vec![SliceRow {
            label: "Empty".to_string(),
            area: 0.0,
        }];
        assert!(render_landpie_svg(&rows, "").is_err());
    }
}
