use crate::segments::{chromosome_extent, chromosomes, Segment};

/// Style constants for the chromosome painting. Mirrors what a figure for a
/// two-column paper needs: generous padding, capsule-shaped bars, thin
/// strokes.
#[derive(Clone, Debug)]
pub struct PaintStyle {
    pub canvas_padding: f64,
    pub bar_width: f64,
    pub bar_gap: f64,
    pub corner_radius: f64,
    pub stroke_width: f64,
    pub show_chrom_labels: bool,
    pub label_font_size: f64,
    pub title: String,
    /// Logical bar height in px. Every chromosome is drawn at this height
    /// regardless of its true genomic length; only positions within a bar
    /// are proportional.
    pub bar_band_height: f64,
    /// Minimum rendered thickness for very short segments.
    pub min_segment_height: f64,
}

impl Default for PaintStyle {
    fn default() -> Self {
        Self {
            canvas_padding: 60.0,
            bar_width: 26.0,
            bar_gap: 48.0,
            corner_radius: 13.0,
            stroke_width: 1.0,
            show_chrom_labels: true,
            label_font_size: 14.0,
            title: String::new(),
            bar_band_height: 900.0,
            min_segment_height: 0.6,
        }
    }
}

/// Horizontal placement of one chromosome bar.
#[derive(Clone, Debug)]
pub struct ChromBar {
    pub name: String,
    pub x: f64,
    pub max_coord: u64,
}

/// Derived canvas geometry, rebuilt for every render.
#[derive(Clone, Debug)]
pub struct Layout {
    pub width: f64,
    pub height: f64,
    pub bar_top: f64,
    pub bar_bottom: f64,
    pub bars: Vec<ChromBar>,
}

impl Layout {
    pub fn bar_height(&self) -> f64 {
        self.bar_bottom - self.bar_top
    }
}

pub fn compute_layout(segments: &[Segment], style: &PaintStyle) -> Layout {
    let names = chromosomes(segments);
    let count = names.len() as f64;

    let content_width = count * style.bar_width + (count - 1.0).max(0.0) * style.bar_gap;
    let width = style.canvas_padding * 2.0 + content_width;

    let title_space = if style.title.is_empty() { 0.0 } else { 40.0 };
    let label_space = if style.show_chrom_labels { 40.0 } else { 0.0 };
    let bar_top = style.canvas_padding + title_space;
    let bar_bottom = bar_top + style.bar_band_height;
    let height = bar_bottom + style.canvas_padding + label_space;

    let mut bars = Vec::with_capacity(names.len());
    let mut x = style.canvas_padding;
    for name in names {
        let max_coord = chromosome_extent(segments, &name);
        bars.push(ChromBar { name, x, max_coord });
        x += style.bar_width + style.bar_gap;
    }

    Layout {
        width,
        height,
        bar_top,
        bar_bottom,
        bars,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(chrom: &str, start: u64, end: u64) -> Segment {
        Segment {
            chrom: chrom.to_string(),
            start,
            end,
            ancestry: "A".to_string(),
            frequency: None,
        }
    }

    #[test]
    fn width_follows_bar_count() {
        let segments = vec![segment("chr1", 0, 100), segment("chr2", 0, 200)];
        let style = PaintStyle::default();
        let layout = compute_layout(&segments, &style);
        let expected =
            style.canvas_padding * 2.0 + 2.0 * style.bar_width + style.bar_gap;
        assert_eq!(layout.width, expected);
        assert_eq!(layout.bars.len(), 2);
        assert_eq!(layout.bars[0].x, style.canvas_padding);
        assert_eq!(
            layout.bars[1].x,
            style.canvas_padding + style.bar_width + style.bar_gap
        );
    }

    #[test]
    fn title_reserves_vertical_space() {
        let segments = vec![segment("chr1", 0, 100)];
        let plain = compute_layout(&segments, &PaintStyle::default());
        let titled = compute_layout(
            &segments,
            &PaintStyle {
                title: "Ancestry painting".to_string(),
                ..PaintStyle::default()
            },
        );
        assert_eq!(titled.bar_top, plain.bar_top + 40.0);
        assert_eq!(titled.height, plain.height + 40.0);
        assert_eq!(titled.bar_height(), plain.bar_height());
    }

    #[test]
    fn bars_are_in_natural_order_with_extents() {
        let segments = vec![
            segment("chr10", 0, 700),
            segment("chr2", 0, 300),
            segment("chr2", 300, 900),
        ];
        let layout = compute_layout(&segments, &PaintStyle::default());
        let names: Vec<&str> = layout.bars.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["chr2", "chr10"]);
        assert_eq!(layout.bars[0].max_coord, 900);
        assert_eq!(layout.bars[1].max_coord, 700);
    }

    #[test]
    fn bar_height_is_independent_of_genomic_span() {
        let short = vec![segment("chr1", 0, 10)];
        let long = vec![segment("chr1", 0, 100_000_000)];
        let style = PaintStyle::default();
        assert_eq!(
            compute_layout(&short, &style).bar_height(),
            compute_layout(&long, &style).bar_height()
        );
    }
}
