use crate::layout::{Layout, PaintStyle};
use crate::segments::Segment;
use std::collections::BTreeMap;
use svg::node::element::{ClipPath, Definitions, Group, Rectangle, Text};
use svg::Document;

const LABEL_FONT: &str = "Times New Roman, Arial, sans-serif";
const LEGEND_SWATCH: f64 = 14.0;
const LEGEND_ROW_HEIGHT: f64 = 20.0;

fn capsule(x: f64, y: f64, width: f64, height: f64, radius: f64) -> Rectangle {
    Rectangle::new()
        .set("x", x)
        .set("y", y)
        .set("width", width)
        .set("height", height)
        .set("rx", radius)
        .set("ry", radius)
}

/// Emits the chromosome painting as a self-contained SVG document:
/// one capsule-shaped bar per chromosome, ancestry segments clipped into
/// the capsule, optional labels and title, and a swatch legend.
///
/// Output is byte-identical across runs for identical inputs and style.
pub fn render_paint_svg(
    segments: &[Segment],
    layout: &Layout,
    color_map: &BTreeMap<String, String>,
    style: &PaintStyle,
) -> Document {
    let mut doc = Document::new()
        .set("viewBox", (0, 0, layout.width, layout.height))
        .set("width", layout.width)
        .set("height", layout.height)
        .add(
            Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", "100%")
                .set("height", "100%")
                .set("fill", "white"),
        );

    if !style.title.is_empty() {
        doc = doc.add(
            Text::new(style.title.clone())
                .set("x", layout.width / 2.0)
                .set("y", style.canvas_padding + 24.0)
                .set("text-anchor", "middle")
                .set("font-family", LABEL_FONT)
                .set("font-weight", 600)
                .set("font-size", 18),
        );
    }

    let bar_height = layout.bar_height();
    let radius = style.corner_radius.min(style.bar_width / 2.0);

    for bar in &layout.bars {
        let clip_id = format!("clip_{}", bar.name);
        doc = doc.add(
            Definitions::new().add(
                ClipPath::new().set("id", clip_id.clone()).add(capsule(
                    bar.x,
                    layout.bar_top,
                    style.bar_width,
                    bar_height,
                    radius,
                )),
            ),
        );
        doc = doc.add(
            capsule(bar.x, layout.bar_top, style.bar_width, bar_height, radius)
                .set("fill", "white")
                .set("stroke", "black")
                .set("stroke-width", style.stroke_width),
        );

        if bar.max_coord > 0 {
            let mut clipped = Group::new().set("clip-path", format!("url(#{clip_id})"));
            let extent = bar.max_coord as f64;
            for segment in segments.iter().filter(|s| s.chrom == bar.name) {
                let y1 = layout.bar_top + (segment.start as f64 / extent) * bar_height;
                let y2 = layout.bar_top + (segment.end as f64 / extent) * bar_height;
                let height = (y2 - y1).max(style.min_segment_height);
                let fill = color_map
                    .get(&segment.ancestry)
                    .cloned()
                    .unwrap_or_else(|| crate::colors::stable_color(&segment.ancestry));
                clipped = clipped.add(
                    Rectangle::new()
                        .set("x", bar.x)
                        .set("y", format!("{y1:.3}"))
                        .set("width", style.bar_width)
                        .set("height", format!("{height:.3}"))
                        .set("fill", fill)
                        .set("stroke", "none"),
                );
            }
            doc = doc.add(clipped);
        }

        if style.show_chrom_labels {
            doc = doc.add(
                Text::new(bar.name.clone())
                    .set("x", bar.x + style.bar_width / 2.0)
                    .set("y", layout.bar_bottom + 26.0)
                    .set("text-anchor", "middle")
                    .set("font-family", LABEL_FONT)
                    .set("font-size", style.label_font_size),
            );
        }
    }

    doc = doc.add(render_legend(segments, color_map, layout, style));
    doc
}

fn render_legend(
    segments: &[Segment],
    color_map: &BTreeMap<String, String>,
    layout: &Layout,
    style: &PaintStyle,
) -> Group {
    let labels = crate::segments::ancestry_labels(segments);
    let legend_x = layout.width - style.canvas_padding + 10.0;
    let mut legend = Group::new()
        .set(
            "transform",
            format!("translate({legend_x}, {})", layout.bar_top),
        )
        .add(
            Text::new("Ancestry")
                .set("x", 0)
                .set("y", -10)
                .set("font-family", LABEL_FONT)
                .set("font-size", 14),
        );
    let mut y = 10.0;
    for label in labels {
        let fill = color_map
            .get(&label)
            .cloned()
            .unwrap_or_else(|| crate::colors::stable_color(&label));
        legend = legend
            .add(
                Rectangle::new()
                    .set("x", 0)
                    .set("y", y)
                    .set("width", LEGEND_SWATCH)
                    .set("height", LEGEND_SWATCH)
                    .set("fill", fill)
                    .set("stroke", "black")
                    .set("stroke-width", 0.4),
            )
            .add(
                Text::new(label)
                    .set("x", 20)
                    .set("y", y + 12.0)
                    .set("font-family", LABEL_FONT)
                    .set("font-size", 12),
            );
        y += LEGEND_ROW_HEIGHT;
    }
    legend
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::build_color_map;
    use crate::layout::compute_layout;
    use crate::segments::ancestry_labels;

    fn segment(chrom: &str, start: u64, end: u64, ancestry: &str) -> Segment {
        Segment {
            chrom: chrom.to_string(),
            start,
            end,
            ancestry: ancestry.to_string(),
            frequency: None,
        }
    }

    fn paint(segments: &[Segment], style: &PaintStyle) -> String {
        let layout = compute_layout(segments, style);
        let colors = build_color_map(&ancestry_labels(segments), &[]);
        render_paint_svg(segments, &layout, &colors, style).to_string()
    }

    #[test]
    fn output_is_byte_identical_across_runs() {
        let segments = vec![
            segment("chr1", 0, 500, "A"),
            segment("chr1", 500, 1000, "B"),
            segment("chr2", 0, 800, "A"),
        ];
        let style = PaintStyle::default();
        assert_eq!(paint(&segments, &style), paint(&segments, &style));
    }

    #[test]
    fn every_chromosome_gets_capsule_clip_and_label() {
        let segments = vec![segment("chr1", 0, 500, "A"), segment("chr2", 0, 800, "B")];
        let svg = paint(&segments, &PaintStyle::default());
        assert!(svg.contains("clip_chr1"));
        assert!(svg.contains("clip_chr2"));
        assert!(svg.contains(">chr1</text>"));
        assert!(svg.contains(">chr2</text>"));
    }

    #[test]
    fn override_color_is_used_verbatim() {
        let segments = vec![segment("chr1", 0, 500, "Mo-OD")];
        let layout = compute_layout(&segments, &PaintStyle::default());
        let colors = build_color_map(&ancestry_labels(&segments), &[("Mo-OD", "#d62728")]);
        let svg =
            render_paint_svg(&segments, &layout, &colors, &PaintStyle::default()).to_string();
        assert!(svg.contains("#d62728"));
        assert!(!svg.contains(&crate::colors::stable_color("Mo-OD")));
    }

    #[test]
    fn tiny_segments_keep_minimum_thickness() {
        // 1 bp on a 100 Mbp chromosome rounds to ~0 px without the floor.
        let segments = vec![
            segment("chr1", 0, 1, "A"),
            segment("chr1", 1, 100_000_000, "B"),
        ];
        let svg = paint(&segments, &PaintStyle::default());
        assert!(svg.contains("height=\"0.600\""));
    }

    #[test]
    fn legend_lists_each_ancestry_once_in_sorted_order() {
        let segments = vec![
            segment("chr1", 0, 500, "B"),
            segment("chr1", 500, 900, "A"),
            segment("chr2", 0, 800, "A"),
        ];
        let svg = paint(&segments, &PaintStyle::default());
        let a = svg.find(">A</text>").unwrap();
        let b = svg.find(">B</text>").unwrap();
        assert!(a < b);
        assert_eq!(svg.matches(">A</text>").count(), 1);
    }

    #[test]
    fn title_is_rendered_when_configured() {
        let segments = vec![segment("chr1", 0, 500, "A")];
        let style = PaintStyle {
            title: "Ancestry painting".to_string(),
            ..PaintStyle::default()
        };
        let svg = paint(&segments, &style);
        assert!(svg.contains("Ancestry painting"));
    }
}
