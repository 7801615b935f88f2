use chromoplot::colors::build_color_map;
use chromoplot::layout::{compute_layout, PaintStyle};
use chromoplot::render_paint::render_paint_svg;
use chromoplot::segments::{ancestry_labels, chromosomes, read_segments};
use std::io::Write;
use std::path::Path;

fn render_from_file(path: &Path) -> String {
    let segments = read_segments(path).unwrap();
    let style = PaintStyle::default();
    let layout = compute_layout(&segments, &style);
    let colors = build_color_map(&ancestry_labels(&segments), &[]);
    render_paint_svg(&segments, &layout, &colors, &style).to_string()
}

#[test]
fn full_pipeline_from_table_to_svg() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "Chr\tStart\tEnd\tAncestry\n\
         chr1\t0\t500\tA\n\
         chr1\t500\t1000\tB\n\
         chr2\t0\t800\tA\n\
         chr2\t800\t800\tB\n"
    )
    .unwrap();

    // The end==start row is filtered, not fatal, since rows remain.
    let segments = read_segments(file.path()).unwrap();
    assert_eq!(segments.len(), 3);
    assert_eq!(chromosomes(&segments), vec!["chr1", "chr2"]);
    assert_eq!(ancestry_labels(&segments), vec!["A", "B"]);

    let svg = render_from_file(file.path());
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("clip_chr1") && svg.contains("clip_chr2"));
    assert_eq!(svg.matches(">A</text>").count(), 1);
    assert_eq!(svg.matches(">B</text>").count(), 1);

    // Identical input and constants give byte-identical output.
    assert_eq!(svg, render_from_file(file.path()));
}

#[test]
fn header_only_input_fails_loudly() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "chr\tstart\tend\tancestry\n").unwrap();
    let err = read_segments(file.path()).unwrap_err().to_string();
    assert!(err.contains("no data rows"), "{err}");
}

#[test]
fn pipeline_svg_rasterizes_end_to_end() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "chr\tstart\tend\tanc\nchr1\t0\t500\tA\nchr1\t500\t1000\tB\n").unwrap();
    let svg = render_from_file(file.path());
    let png = chromoplot::raster_export::svg_to_png_bytes(&svg, 400).unwrap();
    let img = image::load_from_memory(&png).unwrap();
    assert_eq!(img.width(), 400);
}
