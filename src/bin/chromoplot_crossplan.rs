use chromoplot::crossplan::{render_crossplan_svg, CrossPlan};
use chromoplot::raster_export::{cm_to_px, write_png};
use std::path::PathBuf;
use std::{env, fs};

const OUT_SVG: &str = "output/crossplan.svg";
const PNG_DPI: u32 = 300;
const PNG_WIDTH_CM: f64 = 25.0;

fn usage() {
    eprintln!(
        "Usage:\n  \
  chromoplot_crossplan [OUT_SVG [OUT_PNG]]\n\n  \
  Draws the rotational crossbreeding scheme: one composition pie per dam\n  \
  generation plus the sire rotation. Default output: '{OUT_SVG}'."
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
        return Err("Expected at most OUT_SVG and OUT_PNG".to_string());
    }
    let out_svg = PathBuf::from(args.get(1).map(String::as_str).unwrap_or(OUT_SVG));

    let plan = CrossPlan::default();
    let svg_text = render_crossplan_svg(&plan)
        .map_err(|e| format!("{e:#}"))?
        .to_string();

    if let Some(parent) = out_svg.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Could not create '{}': {e}", parent.display()))?;
    }
    fs::write(&out_svg, &svg_text)
        .map_err(|e| format!("Could not write SVG '{}': {e}", out_svg.display()))?;
    println!("Wrote SVG to '{}'", out_svg.display());

    if let Some(out_png) = args.get(2) {
        let width = cm_to_px(PNG_WIDTH_CM, PNG_DPI);
        write_png(&svg_text, PathBuf::from(out_png).as_path(), width)
            .map_err(|e| format!("{e:#}"))?;
        println!("Wrote PNG to '{out_png}' ({width}px wide, {PNG_DPI} dpi)");
    }
    Ok(())
}
