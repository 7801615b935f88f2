use chromoplot::landpie::{read_area_table, render_landpie_svg, SliceRow};
use chromoplot::raster_export::write_png;
use std::path::PathBuf;
use std::{env, fs};

const OUT_SVG: &str = "output/landpie.svg";
const TITLE: &str = "Grassland resource composition";

// 8 inch figure at 600 dpi, the usual print target for this chart.
const PNG_WIDTH_PX: u32 = 4800;

// Used when no CSV is given: grassland areas (km^2) by type.
fn default_rows() -> Vec<SliceRow> {
    [
        ("Temperate desert steppe", 30323.33),
        ("Temperate steppe", 92688.40),
        ("Temperate meadow steppe", 26597.07),
        ("Temperate steppified desert", 4071.93),
        ("Lowland meadow", 31243.13),
        ("Temperate montane meadow", 3903.14),
    ]
    .into_iter()
    .map(|(label, area)| SliceRow {
        label: label.to_string(),
        area,
    })
    .collect()
}

fn usage() {
    eprintln!(
        "Usage:\n  \
  chromoplot_landpie [AREAS.csv [OUT_SVG [OUT_PNG]]]\n\n  \
  Pie chart of land-type areas with percentage callouts and a legend.\n  \
  AREAS.csv needs label and area columns; without it the built-in\n  \
  grassland table is used. Default output: '{OUT_SVG}'."
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
        return Err("Expected at most AREAS.csv, OUT_SVG and OUT_PNG".to_string());
    }

    let rows = match args.get(1) {
        Some(path) => read_area_table(PathBuf::from(path).as_path())
            .map_err(|e| format!("{e:#}"))?,
        None => default_rows(),
    };
    let out_svg = PathBuf::from(args.get(2).map(String::as_str).unwrap_or(OUT_SVG));

    let svg_text = render_landpie_svg(&rows, TITLE)
        .map_err(|e| format!("{e:#}"))?
        .to_string();

    if let Some(parent) = out_svg.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Could not create '{}': {e}", parent.display()))?;
    }
    fs::write(&out_svg, &svg_text)
        .map_err(|e| format!("Could not write SVG '{}': {e}", out_svg.display()))?;
    println!("Wrote SVG to '{}' ({} slices)", out_svg.display(), rows.len());

    if let Some(out_png) = args.get(3) {
        write_png(&svg_text, PathBuf::from(out_png).as_path(), PNG_WIDTH_PX)
            .map_err(|e| format!("{e:#}"))?;
        println!("Wrote PNG to '{out_png}' ({PNG_WIDTH_PX}px wide)");
    }
    Ok(())
}
