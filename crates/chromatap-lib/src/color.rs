//! Color value type, parsing and formatting.
//!
//! Channels are stored in RGB order. Backends that deliver another order
//! (OpenCV's BGR) convert at the edge.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An 8-bit-per-channel RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Sum of the three channel values (0..=765).
    pub fn brightness(self) -> u16 {
        u16::from(self.r) + u16::from(self.g) + u16::from(self.b)
    }

    /// Squared Euclidean distance in channel space.
    pub fn distance_sq(self, other: Color) -> u32 {
        let dr = i32::from(self.r) - i32::from(other.r);
        let dg = i32::from(self.g) - i32::from(other.g);
        let db = i32::from(self.b) - i32::from(other.b);
        (dr * dr + dg * dg + db * db) as u32
    }

    /// Scale every channel by `factor`, flooring the result: `c' = floor(c * factor)`.
    ///
    /// Results are clamped to 0..=255, so factors above 1 saturate.
    pub fn scale(self, factor: f64) -> Color {
        let ch = |c: u8| (f64::from(c) * factor).floor().clamp(0.0, 255.0) as u8;
        Color::new(ch(self.r), ch(self.g), ch(self.b))
    }

    /// Channels as a `[r, g, b]` array.
    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Color::new(r, g, b)
    }
}

impl From<image::Rgb<u8>> for Color {
    fn from(px: image::Rgb<u8>) -> Self {
        Color::from(px.0)
    }
}

impl From<Color> for image::Rgb<u8> {
    fn from(c: Color) -> Self {
        image::Rgb(c.to_array())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_color(*self))
    }
}

/// Parse a color string.
///
/// Accepts:
/// - Hex: `"#FFA500"`, `"FFA500"`, `"#ffa500"`
/// - Named: `"red"`, `"orange"`, `"yellow"`, `"green"`, `"blue"`, `"white"`, `"purple"`, `"cyan"`, `"black"`/`"off"`
pub fn parse_color(s: &str) -> crate::error::Result<Color> {
    let s = s.trim();

    match s.to_lowercase().as_str() {
        "red" => return Ok(Color::new(255, 0, 0)),
        "orange" => return Ok(Color::new(255, 165, 0)),
        "yellow" => return Ok(Color::new(255, 255, 0)),
        "green" => return Ok(Color::new(0, 128, 0)),
        "blue" => return Ok(Color::new(0, 0, 255)),
        "white" => return Ok(Color::WHITE),
        "purple" => return Ok(Color::new(128, 0, 128)),
        "cyan" => return Ok(Color::new(0, 255, 255)),
        "off" | "black" => return Ok(Color::BLACK),
        _ => {}
    }

    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(crate::ChromatapError::Color(format!(
            "Invalid color: {s} (use #RRGGBB or a color name)"
        )));
    }
    let val = u32::from_str_radix(hex, 16)
        .map_err(|_| crate::ChromatapError::Color(format!("Invalid hex color: {s}")))?;
    Ok(Color::new(
        ((val >> 16) & 0xFF) as u8,
        ((val >> 8) & 0xFF) as u8,
        (val & 0xFF) as u8,
    ))
}

/// Format a color as `#RRGGBB`.
pub fn format_color(c: Color) -> String {
    format!("#{:02X}{:02X}{:02X}", c.r, c.g, c.b)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── parse_color ──

    #[test]
    fn parse_named_palette_colors() {
        assert_eq!(parse_color("red").unwrap(), Color::new(255, 0, 0));
        assert_eq!(parse_color("orange").unwrap(), Color::new(255, 165, 0));
        assert_eq!(parse_color("green").unwrap(), Color::new(0, 128, 0));
        assert_eq!(parse_color("white").unwrap(), Color::WHITE);
    }

    #[test]
    fn parse_named_off() {
        assert_eq!(parse_color("off").unwrap(), Color::BLACK);
        assert_eq!(parse_color("black").unwrap(), Color::BLACK);
    }

    #[test]
    fn parse_named_case_insensitive() {
        assert_eq!(parse_color("RED").unwrap(), Color::new(255, 0, 0));
        assert_eq!(parse_color("  Blue  ").unwrap(), Color::new(0, 0, 255));
    }

    #[test]
    fn parse_hex_with_and_without_hash() {
        assert_eq!(parse_color("#123456").unwrap(), Color::new(0x12, 0x34, 0x56));
        assert_eq!(parse_color("abcdef").unwrap(), Color::new(0xAB, 0xCD, 0xEF));
    }

    #[test]
    fn parse_invalid() {
        assert!(parse_color("#FFF").is_err());
        assert!(parse_color("#FF000000").is_err());
        assert!(parse_color("chartreuse").is_err());
        assert!(parse_color("#GGHHII").is_err());
    }

    #[test]
    fn parse_rejects_signs_in_hex() {
        assert!(parse_color("#+12345").is_err());
        assert!(parse_color("-12345").is_err());
        assert!(parse_color("#12 345").is_err());
    }

    #[test]
    fn format_uppercase_hex() {
        assert_eq!(format_color(Color::new(255, 165, 0)), "#FFA500");
        assert_eq!(Color::new(1, 2, 3).to_string(), "#010203");
    }

    // ── arithmetic ──

    #[test]
    fn brightness_sums_channels() {
        assert_eq!(Color::new(10, 10, 9).brightness(), 29);
        assert_eq!(Color::WHITE.brightness(), 765);
    }

    #[test]
    fn distance_is_squared_euclidean() {
        let a = Color::new(10, 20, 30);
        let b = Color::new(13, 24, 30);
        assert_eq!(a.distance_sq(b), 9 + 16);
        assert_eq!(b.distance_sq(a), 25);
        assert_eq!(Color::BLACK.distance_sq(Color::WHITE), 3 * 255 * 255);
    }

    #[test]
    fn scale_floors_each_channel() {
        assert_eq!(Color::WHITE.scale(0.1), Color::new(25, 25, 25));
        assert_eq!(Color::new(255, 165, 0).scale(0.5), Color::new(127, 82, 0));
        assert_eq!(Color::new(7, 8, 9).scale(1.0), Color::new(7, 8, 9));
    }

    #[test]
    fn scale_saturates() {
        assert_eq!(Color::new(200, 0, 1).scale(2.0), Color::new(255, 0, 2));
        assert_eq!(Color::WHITE.scale(0.0), Color::BLACK);
    }
}
