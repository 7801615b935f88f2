use chromoplot::recolor::{remap_gradient, BandHint};
use std::{env, fs};

const DEFAULT_LOW: &str = "#6A51A3";
const DEFAULT_HIGH: &str = "#007C73";

// Category colors that sit outside the colorbar but follow the same remap.
const DEFAULT_CATEGORY_OLD: [&str; 2] = ["#ff7f00", "#33a02c"];

fn usage() {
    eprintln!(
        "Usage:\n  \
  chromoplot_recolor --in INPUT.svg --out OUTPUT.svg [options]\n\n  \
  Remaps an existing figure's continuous color ramp onto a new two-point\n  \
  gradient, leaving every non-color byte of the SVG untouched.\n\n  \
  Options:\n    \
  --low COLOR      new gradient low end (default {DEFAULT_LOW})\n    \
  --high COLOR     new gradient high end (default {DEFAULT_HIGH})\n    \
  --band Y,HEIGHT  pin the colorbar to rects at this y/height instead of\n                     locating it structurally\n    \
  --map OLD=NEW    extra exact color substitution (repeatable; defaults\n                     map {} -> low and {} -> high)",
        DEFAULT_CATEGORY_OLD[0], DEFAULT_CATEGORY_OLD[1]
    );
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn parse_band(value: &str) -> Result<BandHint, String> {
    let (y, height) = value
        .split_once(',')
        .ok_or_else(|| format!("--band expects Y,HEIGHT, got '{value}'"))?;
    let y: f64 = y
        .trim()
        .parse()
        .map_err(|_| format!("--band: invalid y '{y}'"))?;
    let height: f64 = height
        .trim()
        .parse()
        .map_err(|_| format!("--band: invalid height '{height}'"))?;
    Ok(BandHint { y, height })
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    let mut input = None;
    let mut output = None;
    let mut low = DEFAULT_LOW.to_string();
    let mut high = DEFAULT_HIGH.to_string();
    let mut band = None;
    let mut category_map: Vec<(String, String)> = Vec::new();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        if flag == "--help" || flag == "-h" {
            usage();
            return Ok(());
        }
        if !matches!(flag, "--in" | "--out" | "--low" | "--high" | "--band" | "--map") {
            usage();
            return Err(format!("Unknown argument '{flag}'"));
        }
        let value = args
            .get(i + 1)
            .ok_or_else(|| format!("Missing value for {flag}"))?;
        match flag {
            "--in" => input = Some(value.clone()),
            "--out" => output = Some(value.clone()),
            "--low" => low = value.clone(),
            "--high" => high = value.clone(),
            "--band" => band = Some(parse_band(value)?),
            "--map" => {
                let (old, new) = value
                    .split_once('=')
                    .ok_or_else(|| format!("--map expects OLD=NEW, got '{value}'"))?;
                category_map.push((old.to_string(), new.to_string()));
            }
            _ => unreachable!(),
        }
        i += 2;
    }

    let input = input.ok_or_else(|| {
        usage();
        "Missing required --in".to_string()
    })?;
    let output = output.ok_or_else(|| {
        usage();
        "Missing required --out".to_string()
    })?;

    if category_map.is_empty() {
        category_map.push((DEFAULT_CATEGORY_OLD[0].to_string(), low.clone()));
        category_map.push((DEFAULT_CATEGORY_OLD[1].to_string(), high.clone()));
    }

    let svg_in = fs::read_to_string(&input)
        .map_err(|e| format!("Could not read input SVG '{input}': {e}"))?;
    let svg_out =
        remap_gradient(&svg_in, &low, &high, &category_map, band).map_err(|e| format!("{e:#}"))?;
    fs::write(&output, svg_out)
        .map_err(|e| format!("Could not write output SVG '{output}': {e}"))?;
    println!("Recolored '{input}' -> '{output}' ({low} .. {high})");
    Ok(())
}
