use chromoplot::raster_export::{cm_to_px, write_png};
use chromoplot::render_freq::{render_freq_svg, FreqStyle};
use chromoplot::segments::read_segments;
use std::path::PathBuf;
use std::{env, fs};

// Configuration. The positional arguments override INPUT and OUT_SVG.
const INPUT: &str = "data/loter_segment.txt";
const OUT_SVG: &str = "output/freq_painting.svg";
const PNG_DPI: u32 = 600;
const PNG_WIDTH_CM: f64 = 18.0;

fn usage() {
    eprintln!(
        "Usage:\n  \
  chromoplot_freq [INPUT [OUT_SVG [OUT_PNG]]]\n\n  \
  Renders the frequency painting: chromosome bars at true genomic length\n  \
  with segments colored by their frequency column through a two-point\n  \
  gradient, ancestry markers and a colorbar.\n  \
  Defaults: INPUT='{INPUT}', OUT_SVG='{OUT_SVG}'."
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
    if args.len() > 4 {
        usage();
        return Err("Expected at most INPUT, OUT_SVG and OUT_PNG".to_string());
    }
    let input = PathBuf::from(args.get(1).map(String::as_str).unwrap_or(INPUT));
    let out_svg = PathBuf::from(args.get(2).map(String::as_str).unwrap_or(OUT_SVG));

    let segments = read_segments(&input).map_err(|e| format!("{e:#}"))?;
    let svg_text = render_freq_svg(&segments, &FreqStyle::default())
        .map_err(|e| format!("{e:#}"))?
        .to_string();

    if let Some(parent) = out_svg.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Could not create '{}': {e}", parent.display()))?;
    }
    fs::write(&out_svg, &svg_text)
        .map_err(|e| format!("Could not write SVG '{}': {e}", out_svg.display()))?;
    println!(
        "Wrote SVG to '{}' ({} segments)",
        out_svg.display(),
        segments.len()
    );

    if let Some(out_png) = args.get(3) {
        let width = cm_to_px(PNG_WIDTH_CM, PNG_DPI);
        write_png(&svg_text, PathBuf::from(out_png).as_path(), width)
            .map_err(|e| format!("{e:#}"))?;
        println!("Wrote PNG to '{out_png}' ({width}px wide, {PNG_DPI} dpi)");
    }
    Ok(())
}
