use crate::colors::{hex_to_rgb, lerp_rgb, rgb_to_hex};
use crate::segments::{ancestry_labels, chromosome_extent, chromosomes, Segment};
use anyhow::{bail, Result};
use svg::node::element::{Circle, Line, Path, Rectangle, Text};
use svg::Document;

const FONT: &str = "Arial, sans-serif";

// Horizontal slot per chromosome; the marker column sits in the gap
// halfway to the next slot.
const SLOT: f64 = 70.0;
const BAR_WIDTH: f64 = 24.0;
const SEG_WIDTH: f64 = 18.0;
const MARKER_OFFSET: f64 = SLOT / 2.0;
const MARKER_SIZE: f64 = 6.0;

const PADDING: f64 = 60.0;
const HEADER_HEIGHT: f64 = 70.0;
const PLOT_HEIGHT: f64 = 600.0;
const FOOTER_HEIGHT: f64 = 70.0;

const COLORBAR_SWATCHES: usize = 64;
const COLORBAR_WIDTH: f64 = 160.0;
const COLORBAR_HEIGHT: f64 = 14.0;

const MIN_SEGMENT_HEIGHT: f64 = 0.6;

#[derive(Clone, Copy, Debug, PartialEq)]
enum MarkerShape {
    Triangle,
    Circle,
}

/// Ancestry marker shape and fill, matching the study's published figure.
/// Labels outside the study fall back to a plain black circle.
fn marker_for(label: &str) -> (MarkerShape, &'static str) {
    match label {
        "Mo-OD" => (MarkerShape::Triangle, "#007C73"),
        "Charolais" => (MarkerShape::Circle, "#6A51A3"),
        _ => (MarkerShape::Circle, "black"),
    }
}

/// Configuration for the frequency painting: segment fills come from a
/// two-point gradient over the frequency value, clamped to
/// [freq_min, freq_max].
#[derive(Clone, Debug)]
pub struct FreqStyle {
    pub freq_min: f64,
    pub freq_max: f64,
    pub low_color: String,
    pub high_color: String,
    pub axis_title: String,
}

impl Default for FreqStyle {
    fn default() -> Self {
        Self {
            freq_min: 0.6,
            freq_max: 1.0,
            low_color: "#007C73".to_string(),
            high_color: "#6A51A3".to_string(),
            axis_title: "Bos taurus autosome".to_string(),
        }
    }
}

fn triangle_path(x: f64, y: f64, size: f64) -> String {
    let half = size * 0.866;
    format!(
        "M {x:.3} {:.3} L {:.3} {:.3} L {:.3} {:.3} Z",
        y - size,
        x - half,
        y + size / 2.0,
        x + half,
        y + size / 2.0
    )
}

fn add_marker(doc: Document, label: &str, x: f64, y: f64) -> Document {
    let (shape, fill) = marker_for(label);
    match shape {
        MarkerShape::Triangle => doc.add(
            Path::new()
                .set("d", triangle_path(x, y, MARKER_SIZE))
                .set("fill", fill),
        ),
        MarkerShape::Circle => doc.add(
            Circle::new()
                .set("cx", format!("{x:.3}"))
                .set("cy", format!("{y:.3}"))
                .set("r", MARKER_SIZE * 0.8)
                .set("fill", fill),
        ),
    }
}

/// Emits the frequency painting: one rounded bar per chromosome with its
/// height proportional to true genomic length, inner segments colored by
/// segment frequency through the low→high gradient, ancestry markers with
/// leader lines in the inter-bar gap, a marker legend and a swatch-run
/// colorbar.
///
/// Every segment needs a frequency value; tables without the column are
/// rejected here rather than silently painted black.
pub fn render_freq_svg(segments: &[Segment], style: &FreqStyle) -> Result<Document> {
    if segments.is_empty() {
        bail!("No segments to paint");
    }
    if let Some(missing) = segments.iter().find(|s| s.frequency.is_none()) {
        bail!(
            "Segment {}:{} has no frequency value; the frequency painting \
             needs a frequency column",
            missing.chrom,
            missing.start
        );
    }
    if style.freq_max <= style.freq_min {
        bail!(
            "Invalid frequency range {}..{}",
            style.freq_min,
            style.freq_max
        );
    }
    let low = match hex_to_rgb(&style.low_color) {
        Some(rgb) => rgb,
        None => bail!("Invalid low color '{}', expected #RRGGBB", style.low_color),
    };
    let high = match hex_to_rgb(&style.high_color) {
        Some(rgb) => rgb,
        None => bail!("Invalid high color '{}', expected #RRGGBB", style.high_color),
    };
    let color_at = |t: f64| rgb_to_hex(lerp_rgb(low, high, t.clamp(0.0, 1.0)));
    let freq_color =
        |f: f64| color_at((f - style.freq_min) / (style.freq_max - style.freq_min));

    let chroms = chromosomes(segments);
    let global_max = chroms
        .iter()
        .map(|c| chromosome_extent(segments, c))
        .max()
        .unwrap_or(0);
    if global_max == 0 {
        bail!("All chromosome extents are zero");
    }
    let scale = PLOT_HEIGHT / global_max as f64;

    let width = (PADDING * 2.0 + chroms.len() as f64 * SLOT)
        .max(PADDING * 2.0 + COLORBAR_WIDTH + 220.0);
    let plot_top = PADDING + HEADER_HEIGHT;
    let plot_bottom = plot_top + PLOT_HEIGHT;
    let height = plot_bottom + FOOTER_HEIGHT;

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

    for (i, chrom) in chroms.iter().enumerate() {
        let center = PADDING + i as f64 * SLOT + SLOT / 2.0;
        let extent = chromosome_extent(segments, chrom) as f64;
        let bar_height = extent * scale;
        let bar_top = plot_bottom - bar_height;

        doc = doc.add(
            Rectangle::new()
                .set("x", format!("{:.3}", center - BAR_WIDTH / 2.0))
                .set("y", format!("{bar_top:.3}"))
                .set("width", BAR_WIDTH)
                .set("height", format!("{bar_height:.3}"))
                .set("rx", BAR_WIDTH / 2.0)
                .set("ry", BAR_WIDTH / 2.0)
                .set("fill", "white")
                .set("stroke", "#999999")
                .set("stroke-width", 0.4),
        );

        for segment in segments.iter().filter(|s| s.chrom == *chrom) {
            let y_top = plot_bottom - segment.end as f64 * scale;
            let seg_height =
                ((segment.end - segment.start) as f64 * scale).max(MIN_SEGMENT_HEIGHT);
            let frequency = segment.frequency.unwrap_or(style.freq_min);
            doc = doc.add(
                Rectangle::new()
                    .set("x", format!("{:.3}", center - SEG_WIDTH / 2.0))
                    .set("y", format!("{y_top:.3}"))
                    .set("width", SEG_WIDTH)
                    .set("height", format!("{seg_height:.3}"))
                    .set("rx", SEG_WIDTH / 2.0)
                    .set("ry", SEG_WIDTH / 2.0)
                    .set("fill", freq_color(frequency)),
            );

            // Leader line out of the bar to the ancestry marker.
            let mid_y = y_top + seg_height / 2.0;
            let marker_x = center + MARKER_OFFSET;
            doc = doc.add(
                Line::new()
                    .set("x1", format!("{:.3}", center + SEG_WIDTH / 2.0))
                    .set("y1", format!("{mid_y:.3}"))
                    .set("x2", format!("{:.3}", marker_x - MARKER_SIZE))
                    .set("y2", format!("{mid_y:.3}"))
                    .set("stroke", "black")
                    .set("stroke-width", 0.5),
            );
            doc = add_marker(doc, &segment.ancestry, marker_x, mid_y);
        }

        doc = doc.add(
            Text::new(chrom.trim_start_matches("chr").to_string())
                .set("x", format!("{center:.3}"))
                .set("y", format!("{:.3}", plot_bottom + 22.0))
                .set("text-anchor", "middle")
                .set("font-family", FONT)
                .set("font-size", 12),
        );
    }

    if !style.axis_title.is_empty() {
        doc = doc.add(
            Text::new(style.axis_title.clone())
                .set("x", format!("{:.3}", width / 2.0))
                .set("y", format!("{:.3}", plot_bottom + 48.0))
                .set("text-anchor", "middle")
                .set("font-family", FONT)
                .set("font-size", 14),
        );
    }

    doc = add_colorbar(doc, width, style, &color_at);
    doc = add_marker_legend(doc, segments);
    Ok(doc)
}

/// The colorbar is written as a dense run of thin swatch rects at one
/// y/height, the shape the gradient recolorer locates structurally.
fn add_colorbar(
    mut doc: Document,
    width: f64,
    style: &FreqStyle,
    color_at: &dyn Fn(f64) -> String,
) -> Document {
    let cb_x = width - PADDING - COLORBAR_WIDTH;
    let cb_y = PADDING;
    let swatch_width = COLORBAR_WIDTH / COLORBAR_SWATCHES as f64;

    for i in 0..COLORBAR_SWATCHES {
        let t = i as f64 / (COLORBAR_SWATCHES - 1) as f64;
        doc = doc.add(
            Rectangle::new()
                .set("x", format!("{:.3}", cb_x + i as f64 * swatch_width))
                .set("y", format!("{cb_y:.3}"))
                .set("width", format!("{swatch_width:.3}"))
                .set("height", format!("{COLORBAR_HEIGHT:.3}"))
                .set("fill", color_at(t)),
        );
    }
    doc.add(
        Text::new("Frequency")
            .set("x", format!("{cb_x:.3}"))
            .set("y", format!("{:.3}", cb_y - 6.0))
            .set("font-family", FONT)
            .set("font-size", 12),
    )
    .add(
        Text::new(format!("{:.1}", style.freq_min))
            .set("x", format!("{cb_x:.3}"))
            .set("y", format!("{:.3}", cb_y + COLORBAR_HEIGHT + 14.0))
            .set("text-anchor", "middle")
            .set("font-family", FONT)
            .set("font-size", 11),
    )
    .add(
        Text::new(format!("{:.1}", style.freq_max))
            .set("x", format!("{:.3}", cb_x + COLORBAR_WIDTH))
            .set("y", format!("{:.3}", cb_y + COLORBAR_HEIGHT + 14.0))
            .set("text-anchor", "middle")
            .set("font-family", FONT)
            .set("font-size", 11),
    )
}

fn add_marker_legend(mut doc: Document, segments: &[Segment]) -> Document {
    let mut y = PADDING + 6.0;
    for label in ancestry_labels(segments) {
        doc = add_marker(doc, &label, PADDING + MARKER_SIZE, y);
        doc = doc.add(
            Text::new(label)
                .set("x", format!("{:.3}", PADDING + MARKER_SIZE * 2.0 + 8.0))
                .set("y", format!("{:.3}", y + 4.0))
                .set("font-family", FONT)
                .set("font-size", 12),
        );
        y += 20.0;
    }
    doc
}
