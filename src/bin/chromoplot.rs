use chromoplot::colors::build_color_map;
use chromoplot::layout::{compute_layout, PaintStyle};
use chromoplot::raster_export::{cm_to_px, svg_to_png_bytes, write_jpeg};
use chromoplot::render_paint::render_paint_svg;
use chromoplot::segments::{ancestry_labels, chromosomes, read_segments};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{env, fs};

// Configuration. Edit for your data; the two optional positional arguments
// override INPUT and OUT_DIR.
const INPUT: &str = "data/loter_segment.txt";
const OUT_DIR: &str = "output";
const BASENAME: &str = "loter";

// Raster output: physical width + dpi, or an explicit pixel width.
const DPI: u32 = 600;
const FIG_WIDTH_CM: f64 = 18.0;
const PX_WIDTH: Option<u32> = None;
const EXPORT_PNG: bool = true;
const EXPORT_JPG: bool = true;
const JPG_QUALITY: u8 = 95;

const TITLE: &str = "";
const SHOW_CHR_LABELS: bool = true;

// Ancestry labels missing here get a stable hash-derived color.
const USER_COLOR_MAP: &[(&str, &str)] = &[
    // ("Mo-OD", "#d62728"),
    // ("Charolais", "#1f77b4"),
];

#[derive(Serialize)]
struct PaintSummary {
    segments: usize,
    chromosomes: usize,
    ancestries: usize,
    colors: BTreeMap<String, String>,
}

fn usage() {
    eprintln!(
        "Usage:\n  \
  chromoplot [INPUT [OUT_DIR]]\n\n  \
  Renders the chromosome ancestry painting from a loter segment table.\n  \
  Defaults: INPUT='{INPUT}', OUT_DIR='{OUT_DIR}'."
    );
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        usage();
        return Ok(());
    }
    if args.len() > 3 {
        usage();
        return Err("Expected at most INPUT and OUT_DIR".to_string());
    }
    let input = PathBuf::from(args.get(1).map(String::as_str).unwrap_or(INPUT));
    let out_dir = PathBuf::from(args.get(2).map(String::as_str).unwrap_or(OUT_DIR));

    let segments = read_segments(&input).map_err(|e| format!("{e:#}"))?;
    let labels = ancestry_labels(&segments);
    println!(
        "Read {} segments across {} chromosomes, {} ancestry labels",
        segments.len(),
        chromosomes(&segments).len(),
        labels.len()
    );

    let style = PaintStyle {
        title: TITLE.to_string(),
        show_chrom_labels: SHOW_CHR_LABELS,
        ..PaintStyle::default()
    };
    let layout = compute_layout(&segments, &style);
    let colors = build_color_map(&labels, USER_COLOR_MAP);
    let svg_text = render_paint_svg(&segments, &layout, &colors, &style).to_string();

    fs::create_dir_all(&out_dir)
        .map_err(|e| format!("Could not create output directory '{}': {e}", out_dir.display()))?;
    let svg_path = out_dir.join(format!("{BASENAME}.svg"));
    fs::write(&svg_path, &svg_text)
        .map_err(|e| format!("Could not write SVG '{}': {e}", svg_path.display()))?;
    println!("Wrote SVG to '{}'", svg_path.display());

    if EXPORT_PNG || EXPORT_JPG {
        export_raster(&svg_text, &out_dir)?;
    }

    let summary = PaintSummary {
        segments: segments.len(),
        chromosomes: chromosomes(&segments).len(),
        ancestries: labels.len(),
        colors,
    };
    let text = serde_json::to_string_pretty(&summary)
        .map_err(|e| format!("Could not serialize summary: {e}"))?;
    println!("{text}");
    Ok(())
}

fn export_raster(svg_text: &str, out_dir: &Path) -> Result<(), String> {
    let out_width_px = PX_WIDTH.unwrap_or_else(|| cm_to_px(FIG_WIDTH_CM, DPI));
    let png = svg_to_png_bytes(svg_text, out_width_px).map_err(|e| format!("{e:#}"))?;

    if EXPORT_PNG {
        let png_path = out_dir.join(format!("{BASENAME}_{DPI}dpi.png"));
        fs::write(&png_path, &png)
            .map_err(|e| format!("Could not write PNG '{}': {e}", png_path.display()))?;
        println!("Wrote PNG to '{}' ({out_width_px}px wide, {DPI} dpi)", png_path.display());
    }
    if EXPORT_JPG {
        let jpg_path = out_dir.join(format!("{BASENAME}_{DPI}dpi.jpg"));
        write_jpeg(&png, &jpg_path, JPG_QUALITY).map_err(|e| format!("{e:#}"))?;
        println!(
            "Wrote JPG to '{}' (quality {JPG_QUALITY}, {out_width_px}px wide)",
            jpg_path.display()
        );
    }
    Ok(())
}
