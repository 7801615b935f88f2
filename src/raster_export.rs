use anyhow::{anyhow, bail, Context, Result};
use image::codecs::jpeg::JpegEncoder;
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};
use std::fs;
use std::io::BufWriter;
use std::path::Path;

/// Physical-size to pixel conversion used for print targets.
pub fn cm_to_px(cm: f64, dpi: u32) -> u32 {
    ((cm / 2.54) * f64::from(dpi)).round() as u32
}

/// Rasterizes SVG text to PNG bytes at the requested pixel width, scaling
/// height to preserve the aspect ratio. All failure modes (unparsable SVG,
/// degenerate dimensions, allocation or encoding problems) are descriptive
/// errors; nothing is silently skipped.
pub fn svg_to_png_bytes(svg_text: &str, out_width_px: u32) -> Result<Vec<u8>> {
    if out_width_px == 0 {
        bail!("Raster width must be at least 1 px");
    }

    let mut options = Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = Tree::from_str(svg_text, &options)
        .map_err(|e| anyhow!("Could not parse SVG for rasterization: {e}"))?;

    let size = tree.size();
    if size.width() <= 0.0 || size.height() <= 0.0 {
        bail!("SVG has a degenerate size ({} x {})", size.width(), size.height());
    }
    let scale = out_width_px as f32 / size.width();
    let out_height_px = (size.height() * scale).ceil().max(1.0) as u32;

    let mut pixmap = Pixmap::new(out_width_px, out_height_px)
        .ok_or_else(|| anyhow!("Could not allocate a {out_width_px}x{out_height_px} pixmap"))?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| anyhow!("Could not encode PNG: {e}"))
}

pub fn write_png(svg_text: &str, path: &Path, out_width_px: u32) -> Result<()> {
    let png = svg_to_png_bytes(svg_text, out_width_px)?;
    fs::write(path, png)
        .with_context(|| format!("Could not write PNG to '{}'", path.display()))
}

/// Derives a JPEG from already-rasterized PNG bytes at the given quality
/// (1-100). The PNG stays the color-accurate intermediate, matching how the
/// figures were produced for print.
pub fn write_jpeg(png_bytes: &[u8], path: &Path, quality: u8) -> Result<()> {
    let rgb = image::load_from_memory(png_bytes)
        .context("Could not decode intermediate PNG for JPEG export")?
        .to_rgb8();
    let file = fs::File::create(path)
        .with_context(|| format!("Could not create JPEG file '{}'", path.display()))?;
    let mut encoder = JpegEncoder::new_with_quality(BufWriter::new(file), quality);
    encoder
        .encode_image(&rgb)
        .with_context(|| format!("Could not encode JPEG to '{}'", path.display()))
}
