use sha1::{Digest, Sha1};
use std::collections::BTreeMap;

const STABLE_SATURATION: u32 = 65;
const STABLE_LIGHTNESS: u32 = 45;

/// Deterministic fallback color for a label without a configured entry.
/// The label text is hashed into a hue; saturation and lightness are fixed
/// so the result is neither washed out nor near-black. Two distinct labels
/// may collide in the reduced hue space.
pub fn stable_color(label: &str) -> String {
    let digest = Sha1::digest(label.as_bytes());
    let hue = (u32::from(digest[0]) << 8 | u32::from(digest[1])) % 360;
    format!("hsl({hue}, {STABLE_SATURATION}%, {STABLE_LIGHTNESS}%)")
}

/// Builds the label→color map: explicit overrides first (never overwritten),
/// then a stable hash-derived color for every remaining label.
pub fn build_color_map(
    labels: &[String],
    overrides: &[(&str, &str)],
) -> BTreeMap<String, String> {
    let mut map: BTreeMap<String, String> = overrides
        .iter()
        .map(|(label, color)| (label.to_string(), color.to_string()))
        .collect();
    for label in labels {
        map.entry(label.clone())
            .or_insert_with(|| stable_color(label));
    }
    map
}

pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let h = hex.trim().trim_start_matches('#');
    if h.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&h[0..2], 16).ok()?;
    let g = u8::from_str_radix(&h[2..4], 16).ok()?;
    let b = u8::from_str_radix(&h[4..6], 16).ok()?;
    Some((r, g, b))
}

pub fn rgb_to_hex(rgb: (u8, u8, u8)) -> String {
    format!("#{:02X}{:02X}{:02X}", rgb.0, rgb.1, rgb.2)
}

/// Channel-wise linear interpolation between two colors at t in [0,1].
pub fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let lerp = |x: u8, y: u8| -> u8 {
        (f64::from(x) * (1.0 - t) + f64::from(y) * t).round() as u8
    };
    (lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_color_is_deterministic() {
        assert_eq!(stable_color("Mo-OD"), stable_color("Mo-OD"));
        let color = stable_color("Charolais");
        assert!(color.starts_with("hsl("));
        assert!(color.ends_with(", 65%, 45%)"));
    }

    #[test]
    fn overrides_always_win() {
        let labels = vec!["Mo-OD".to_string(), "Charolais".to_string()];
        let map = build_color_map(&labels, &[("Mo-OD", "#d62728")]);
        assert_eq!(map["Mo-OD"], "#d62728");
        assert_eq!(map["Charolais"], stable_color("Charolais"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn every_label_is_covered_exactly_once() {
        let labels = vec!["A".to_string(), "B".to_string(), "A".to_string()];
        let map = build_color_map(&labels, &[]);
        assert_eq!(map.len(), 2);
        assert!(map.contains_key("A") && map.contains_key("B"));
    }

    #[test]
    fn hex_round_trip() {
        assert_eq!(hex_to_rgb("#6A51A3"), Some((0x6a, 0x51, 0xa3)));
        assert_eq!(rgb_to_hex((0x6a, 0x51, 0xa3)), "#6A51A3");
        assert_eq!(hex_to_rgb("not-a-color"), None);
    }

    #[test]
    fn lerp_hits_both_ends() {
        let a = (0x00, 0x7c, 0x73);
        let b = (0x6a, 0x51, 0xa3);
        assert_eq!(lerp_rgb(a, b, 0.0), a);
        assert_eq!(lerp_rgb(a, b, 1.0), b);
        let mid = lerp_rgb(a, b, 0.5);
        assert!(mid.0 > a.0 && mid.0 < b.0);
    }
}
