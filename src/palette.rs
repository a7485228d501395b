//! Color parsing, categorical palettes, and gradient interpolation.

use std::collections::BTreeMap;

/// An opaque RGB color. The backend converts this at the drawing seam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Linear interpolation between two colors, `t` clamped to [0, 1].
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| -> u8 { (a as f64 + (b as f64 - a as f64) * t).round() as u8 };
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

/// Default gradient endpoints for continuous fill scales.
pub const GRADIENT_LOW: Rgb = Rgb(19, 43, 67);
pub const GRADIENT_HIGH: Rgb = Rgb(86, 177, 247);

/// The d3 category10 palette, used for discrete colour/fill assignment.
const CATEGORY10: [Rgb; 10] = [
    Rgb(31, 119, 180),
    Rgb(255, 127, 14),
    Rgb(44, 160, 44),
    Rgb(214, 39, 40),
    Rgb(148, 103, 189),
    Rgb(140, 86, 75),
    Rgb(227, 119, 194),
    Rgb(127, 127, 127),
    Rgb(188, 189, 34),
    Rgb(23, 190, 207),
];

/// Categorical color palette cycling through category10.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    colors: Vec<Rgb>,
}

impl ColorPalette {
    pub fn category10() -> Self {
        ColorPalette {
            colors: CATEGORY10.to_vec(),
        }
    }

    /// Assign a color to each key in order; keys beyond the palette wrap.
    pub fn assign_colors(&self, keys: &[String]) -> BTreeMap<String, Rgb> {
        keys.iter()
            .enumerate()
            .map(|(i, k)| (k.clone(), self.colors[i % self.colors.len()]))
            .collect()
    }

    /// First palette entry, used when a layer has no grouping at all.
    pub fn default_color(&self) -> Rgb {
        self.colors[0]
    }
}

/// Parse a color string: hex (#RRGGBB, #RGB), named colors, and the
/// ggplot-style `grayNN`/`greyNN` scale (gray0 = black, gray100 = white).
pub fn parse_color(color_str: &str) -> Option<Rgb> {
    let color_str = color_str.trim();

    if color_str.starts_with('#') {
        return parse_hex_color(color_str);
    }

    match color_str.to_lowercase().as_str() {
        "white" => Some(Rgb(255, 255, 255)),
        "black" => Some(Rgb(0, 0, 0)),
        "red" => Some(Rgb(255, 0, 0)),
        "green" => Some(Rgb(0, 128, 0)),
        "blue" => Some(Rgb(0, 0, 255)),
        "yellow" => Some(Rgb(255, 255, 0)),
        "cyan" => Some(Rgb(0, 255, 255)),
        "magenta" => Some(Rgb(255, 0, 255)),
        "orange" => Some(Rgb(255, 165, 0)),
        "purple" => Some(Rgb(128, 0, 128)),
        "pink" => Some(Rgb(255, 192, 203)),
        "brown" => Some(Rgb(139, 69, 19)),
        "steelblue" => Some(Rgb(70, 130, 180)),
        "gray" | "grey" => Some(Rgb(128, 128, 128)),
        "darkgray" | "darkgrey" => Some(Rgb(64, 64, 64)),
        "lightgray" | "lightgrey" => Some(Rgb(192, 192, 192)),
        s if s.starts_with("gray") || s.starts_with("grey") => {
            let n = s[4..].parse::<u8>().ok()?;
            if n > 100 {
                return None;
            }
            let v = (n as f64 * 2.55).round() as u8;
            Some(Rgb(v, v, v))
        }
        _ => None,
    }
}

fn parse_hex_color(hex: &str) -> Option<Rgb> {
    let hex = hex.trim_start_matches('#');
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Rgb(r, g, b))
        }
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
            Some(Rgb(r, g, b))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_color("#FF0000"), Some(Rgb(255, 0, 0)));
        assert_eq!(parse_color("#F00"), Some(Rgb(255, 0, 0)));
        assert_eq!(parse_color("#CCCCCC"), Some(Rgb(204, 204, 204)));
        assert_eq!(parse_color("#GGGGGG"), None);
    }

    #[test]
    fn test_parse_named_color() {
        assert_eq!(parse_color("steelblue"), Some(Rgb(70, 130, 180)));
        assert_eq!(parse_color(" white "), Some(Rgb(255, 255, 255)));
        assert_eq!(parse_color("no-such-color"), None);
    }

    #[test]
    fn test_parse_gray_scale() {
        assert_eq!(parse_color("gray0"), Some(Rgb(0, 0, 0)));
        assert_eq!(parse_color("grey100"), Some(Rgb(255, 255, 255)));
        assert_eq!(parse_color("gray50"), Some(Rgb(128, 128, 128)));
        assert_eq!(parse_color("gray101"), None);
    }

    #[test]
    fn test_assign_colors_stable() {
        let palette = ColorPalette::category10();
        let keys = vec!["a".to_string(), "b".to_string()];
        let map = palette.assign_colors(&keys);
        assert_eq!(map["a"], Rgb(31, 119, 180));
        assert_eq!(map["b"], Rgb(255, 127, 14));
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(Rgb::BLACK.lerp(Rgb::WHITE, 0.0), Rgb::BLACK);
        assert_eq!(Rgb::BLACK.lerp(Rgb::WHITE, 1.0), Rgb::WHITE);
        assert_eq!(Rgb::BLACK.lerp(Rgb::WHITE, 2.0), Rgb::WHITE);
    }
}
