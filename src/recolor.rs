use crate::colors::{hex_to_rgb, lerp_rgb, rgb_to_hex};
use anyhow::{anyhow, bail, Result};
use regex::{Captures, Regex};
use std::collections::BTreeMap;

/// One swatch rectangle of a rasterized gradient colorbar (the dense run of
/// thin `<rect>`s a plotting library writes for a continuous color ramp).
#[derive(Clone, Debug)]
pub struct Swatch {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Lowercase #rrggbb.
    pub fill: String,
}

/// Optional override forcing the matcher onto a specific horizontal band.
/// Without it the colorbar is located structurally, since hardcoded y/height
/// constants only ever fit one generated artifact.
#[derive(Clone, Copy, Debug)]
pub struct BandHint {
    pub y: f64,
    pub height: f64,
}

const MIN_SWATCHES: usize = 4;

fn rect_attr(tag: &str, name: &str) -> Option<f64> {
    let pattern = format!(r#"{name}\s*=\s*"([0-9.eE+-]+)""#);
    let re = Regex::new(&pattern).expect("attribute pattern");
    re.captures(tag)?.get(1)?.as_str().parse().ok()
}

fn rect_fill(tag: &str) -> Option<String> {
    let attr = Regex::new(r##"fill\s*=\s*"(#[0-9A-Fa-f]{6})""##).expect("fill pattern");
    let styled = Regex::new(r##"fill\s*:\s*(#[0-9A-Fa-f]{6})"##).expect("style pattern");
    attr.captures(tag)
        .or_else(|| styled.captures(tag))
        .map(|c| c[1].to_ascii_lowercase())
}

fn parse_rects(svg_text: &str) -> Vec<Swatch> {
    let rect_re = Regex::new(r"<rect\b[^>]*>").expect("rect pattern");
    rect_re
        .find_iter(svg_text)
        .filter_map(|m| {
            let tag = m.as_str();
            Some(Swatch {
                x: rect_attr(tag, "x")?,
                y: rect_attr(tag, "y")?,
                width: rect_attr(tag, "width")?,
                height: rect_attr(tag, "height")?,
                fill: rect_fill(tag)?,
            })
        })
        .collect()
}

fn widths_agree(group: &[Swatch]) -> bool {
    let min = group.iter().map(|s| s.width).fold(f64::INFINITY, f64::min);
    let max = group.iter().map(|s| s.width).fold(0.0, f64::max);
    min > 0.0 && max <= min * 1.1
}

/// Locates the gradient colorbar: the band (shared y and height) holding the
/// most filled rects of agreeing width. A `BandHint` pins a specific band
/// instead, for documents with several dense rect runs.
pub fn find_colorbar(svg_text: &str, hint: Option<BandHint>) -> Result<Vec<Swatch>> {
    let rects = parse_rects(svg_text);
    let mut bands: BTreeMap<(String, String), Vec<Swatch>> = BTreeMap::new();
    for rect in rects {
        bands
            .entry((format!("{:.6}", rect.y), format!("{:.6}", rect.height)))
            .or_default()
            .push(rect);
    }

    if let Some(hint) = hint {
        let key = (format!("{:.6}", hint.y), format!("{:.6}", hint.height));
        return bands.remove(&key).ok_or_else(|| {
            anyhow!(
                "No rect band at y={} height={} in the input SVG",
                hint.y,
                hint.height
            )
        });
    }

    let best = bands
        .into_values()
        .filter(|group| group.len() >= MIN_SWATCHES && widths_agree(group))
        .max_by_key(|group| group.len());
    match best {
        Some(mut group) => {
            group.sort_by(|a, b| a.x.total_cmp(&b.x));
            Ok(group)
        }
        None => bail!(
            "Could not locate a gradient colorbar (no band of {MIN_SWATCHES}+ \
             equal-size rects found in the input SVG)"
        ),
    }
}

/// For every distinct color of the colorbar, derives its relative position
/// t in [0,1] along the bar and maps it onto the new low→high gradient.
/// Keys are lowercase old colors; values are uppercase #RRGGBB.
pub fn gradient_mapping(
    swatches: &[Swatch],
    new_low: &str,
    new_high: &str,
) -> Result<BTreeMap<String, String>> {
    if swatches.is_empty() {
        bail!("Gradient colorbar is empty");
    }
    let low = hex_to_rgb(new_low)
        .ok_or_else(|| anyhow!("Invalid low-end color '{new_low}', expected #RRGGBB"))?;
    let high = hex_to_rgb(new_high)
        .ok_or_else(|| anyhow!("Invalid high-end color '{new_high}', expected #RRGGBB"))?;

    let x_min = swatches.iter().map(|s| s.x).fold(f64::INFINITY, f64::min);
    let x_max = swatches.iter().map(|s| s.x).fold(f64::NEG_INFINITY, f64::max);
    let first_width = swatches
        .iter()
        .min_by(|a, b| a.x.total_cmp(&b.x))
        .map(|s| s.width)
        .unwrap_or(0.0);
    let bar_len = (x_max + first_width) - x_min;
    if bar_len <= 0.0 {
        bail!("Gradient colorbar has zero length");
    }

    let mut centers: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for swatch in swatches {
        centers
            .entry(swatch.fill.clone())
            .or_default()
            .push(swatch.x + swatch.width / 2.0);
    }

    let mut mapping = BTreeMap::new();
    for (old, positions) in centers {
        let mean = positions.iter().sum::<f64>() / positions.len() as f64;
        let t = ((mean - (x_min + first_width / 2.0)) / bar_len).clamp(0.0, 1.0);
        mapping.insert(old, rgb_to_hex(lerp_rgb(low, high, t)));
    }
    Ok(mapping)
}

/// Substitutes 6-digit hex color literals according to `mapping` (matched
/// case-insensitively); every other byte of the document is untouched, so
/// geometry, element order and attributes are preserved exactly.
pub fn recolor_svg(svg_text: &str, mapping: &BTreeMap<String, String>) -> String {
    let hex_re = Regex::new(r"#[0-9A-Fa-f]{6}").expect("hex pattern");
    hex_re
        .replace_all(svg_text, |caps: &Captures| {
            let old = caps[0].to_ascii_lowercase();
            mapping.get(&old).cloned().unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Full gradient remap: locate the bar, project every bar color onto the
/// new low→high ramp, add explicit category substitutions on top, rewrite.
pub fn remap_gradient(
    svg_text: &str,
    new_low: &str,
    new_high: &str,
    category_map: &[(String, String)],
    hint: Option<BandHint>,
) -> Result<String> {
    let swatches = find_colorbar(svg_text, hint)?;
    let mut mapping = gradient_mapping(&swatches, new_low, new_high)?;
    for (old, new) in category_map {
        mapping.insert(old.to_ascii_lowercase(), new.to_ascii_uppercase());
    }
    Ok(recolor_svg(svg_text, &mapping))
}
