use anyhow::{bail, Result};
use std::f64::consts::PI;
use svg::node::element::{Circle, Path, Rectangle, Text};
use svg::Document;

/// Fractions below this are omitted from a generation's pie.
const COMPOSITION_EPS: f64 = 1e-3;

/// Pixel size of one layout unit of the diagram grid.
const UNIT: f64 = 60.0;
const PIE_RADIUS: f64 = 0.6 * UNIT;
const STEP_X: f64 = 2.5 * UNIT;
const STEP_Y: f64 = 1.6 * UNIT;
const SIRE_OFFSET_X: f64 = 1.8 * UNIT;
const SIRE_WIDTH: f64 = 1.4 * UNIT;
const SIRE_HEIGHT: f64 = 1.0 * UNIT;
const MARGIN: f64 = 1.5 * UNIT;

/// One genetic source line (founder breed or sire line) with its display
/// code and wedge color.
#[derive(Clone, Debug)]
pub struct SourceLine {
    pub code: String,
    pub color: String,
}

/// A rotational crossbreeding scheme: generation 0 is purely the founder
/// dam line, and each following generation takes half from the previous
/// dams and half from that round's sire source.
#[derive(Clone, Debug)]
pub struct CrossPlan {
    pub sources: Vec<SourceLine>,
    pub dam_index: usize,
    pub sire_rotation: Vec<usize>,
}

impl Default for CrossPlan {
    fn default() -> Self {
        let sources = [
            ("Af", "#FFC000"),
            ("Am", "#1f77b4"),
            ("B", "#ff7f0e"),
            ("C", "#2ca02c"),
            ("D", "#e15759"),
            ("E", "#59a14f"),
            ("F", "#8c564b"),
        ]
        .into_iter()
        .map(|(code, color)| SourceLine {
            code: code.to_string(),
            color: color.to_string(),
        })
        .collect();
        Self {
            sources,
            dam_index: 0,
            sire_rotation: vec![1, 2, 3, 4, 5, 6],
        }
    }
}

impl CrossPlan {
    /// Genetic composition of every dam generation, one fraction vector per
    /// generation (index 0 is the founder generation). Each vector sums to 1.
    pub fn generation_compositions(&self) -> Result<Vec<Vec<f64>>> {
        let n = self.sources.len();
        if self.dam_index >= n {
            bail!("Dam index {} out of range ({n} sources)", self.dam_index);
        }
        if let Some(&bad) = self.sire_rotation.iter().find(|&&i| i >= n) {
            bail!("Sire index {bad} out of range ({n} sources)");
        }

        let mut generations = Vec::with_capacity(self.sire_rotation.len() + 1);
        let mut current = vec![0.0; n];
        current[self.dam_index] = 1.0;
        generations.push(current.clone());

        for &sire in &self.sire_rotation {
            let mut next: Vec<f64> = current.iter().map(|f| f * 0.5).collect();
            next[sire] += 0.5;
            generations.push(next.clone());
            current = next;
        }
        Ok(generations)
    }
}

/// Sire squares carry a single-letter line label: "Am" and "Af" both
/// collapse to "A", breed codes keep their initial.
fn sire_letter(code: &str) -> String {
    code.chars()
        .take(1)
        .collect::<String>()
        .to_ascii_uppercase()
}

fn polar(cx: f64, cy: f64, r: f64, angle: f64) -> (f64, f64) {
    (cx + r * angle.cos(), cy + r * angle.sin())
}

/// Clockwise pie wedges starting at 12 o'clock.
fn pie_wedges(cx: f64, cy: f64, r: f64, fractions: &[(f64, &str)]) -> Vec<Path> {
    let total: f64 = fractions.iter().map(|(f, _)| f).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    let mut wedges = Vec::new();
    let mut angle = -PI / 2.0;
    for (fraction, color) in fractions {
        let sweep = (fraction / total) * 2.0 * PI;
        let end = angle + sweep;
        let (x1, y1) = polar(cx, cy, r, angle);
        let (x2, y2) = polar(cx, cy, r, end);
        let large_arc = i32::from(sweep > PI);
        let data = format!(
            "M {cx:.3} {cy:.3} L {x1:.3} {y1:.3} A {r:.3} {r:.3} 0 {large_arc} 1 {x2:.3} {y2:.3} Z"
        );
        wedges.push(Path::new().set("d", data).set("fill", *color));
        angle = end;
    }
    wedges
}

/// Lays out the scheme along a diagonal: one composition pie per dam
/// generation, with the square of the sire that produced it to its right
/// and a final square showing the rotation returning to the first sire.
pub fn render_crossplan_svg(plan: &CrossPlan) -> Result<Document> {
    let generations = plan.generation_compositions()?;
    let count = generations.len();

    let last_cx = MARGIN + PIE_RADIUS + (count - 1) as f64 * STEP_X;
    let width = last_cx + SIRE_OFFSET_X + SIRE_WIDTH + 2.5 * UNIT + SIRE_WIDTH + MARGIN;
    let height = MARGIN * 2.0 + 2.0 * PIE_RADIUS + (count - 1) as f64 * STEP_Y;

    let mut doc = Document::new()
        .set("viewBox", (0, 0, width, height))
        .set("width", width)
        .set("height", height)
        .add(
            Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", "100%")
                .set("height", "100%")
                .set("fill", "white"),
        );

    let sire_square = |doc: Document, x: f64, y: f64, color: &str, code: &str| -> Document {
        doc.add(
            Rectangle::new()
                .set("x", format!("{x:.3}"))
                .set("y", format!("{:.3}", y - SIRE_HEIGHT / 2.0))
                .set("width", SIRE_WIDTH)
                .set("height", SIRE_HEIGHT)
                .set("fill", color.to_string()),
        )
        .add(
            Text::new(code.to_string())
                .set("x", format!("{:.3}", x + SIRE_WIDTH / 2.0))
                .set("y", format!("{y:.3}"))
                .set("text-anchor", "middle")
                .set("dominant-baseline", "middle")
                .set("font-family", "Arial, sans-serif")
                .set("font-size", 14)
                .set("fill", "white"),
        )
    };

    for (i, composition) in generations.iter().enumerate() {
        let cx = MARGIN + PIE_RADIUS + i as f64 * STEP_X;
        let cy = MARGIN + PIE_RADIUS + i as f64 * STEP_Y;

        let fractions: Vec<(f64, &str)> = composition
            .iter()
            .zip(&plan.sources)
            .filter(|(f, _)| **f > COMPOSITION_EPS)
            .map(|(f, source)| (*f, source.color.as_str()))
            .collect();
        if fractions.len() == 1 {
            doc = doc.add(
                Circle::new()
                    .set("cx", format!("{cx:.3}"))
                    .set("cy", format!("{cy:.3}"))
                    .set("r", PIE_RADIUS)
                    .set("fill", fractions[0].1.to_string()),
            );
        } else {
            for wedge in pie_wedges(cx, cy, PIE_RADIUS, &fractions) {
                doc = doc.add(wedge);
            }
        }
        doc = doc.add(
            Circle::new()
                .set("cx", format!("{cx:.3}"))
                .set("cy", format!("{cy:.3}"))
                .set("r", PIE_RADIUS)
                .set("fill", "none")
                .set("stroke", "black")
                .set("stroke-width", 0.8),
        );

        let label = if i == 0 {
            "A0".to_string()
        } else {
            format!("F{i}")
        };
        doc = doc.add(
            Text::new(label)
                .set("x", format!("{cx:.3}"))
                .set("y", format!("{:.3}", cy + PIE_RADIUS + 18.0))
                .set("text-anchor", "middle")
                .set("font-family", "Arial, sans-serif")
                .set("font-size", 12),
        );

        // The sire whose cross produced this generation sits beside it;
        // the founder generation has none.
        if i >= 1 {
            let sire = &plan.sources[plan.sire_rotation[i - 1]];
            doc = sire_square(
                doc,
                cx + SIRE_OFFSET_X,
                cy,
                &sire.color,
                &sire_letter(&sire.code),
            );
        }
    }

    // Rotation restarts: show the first sire once more after the last round.
    if let Some(&first) = plan.sire_rotation.first() {
        let last_cy = MARGIN + PIE_RADIUS + (count - 1) as f64 * STEP_Y;
        let sire = &plan.sources[first];
        doc = sire_square(
            doc,
            last_cx + SIRE_OFFSET_X + SIRE_WIDTH + 2.5 * UNIT,
            last_cy,
            &sire.color,
            &sire_letter(&sire.code),
        );
    }

    Ok(doc)
}
