//! Fixed reference palette and nearest-color matching.
//!
//! Matching uses squared RGB Euclidean distance. Very dark samples bypass
//! the palette entirely and resolve to a dimmed white.

use crate::color::{self, Color};

/// Brightness (channel sum) below which a sample resolves to the dark override.
pub const DEFAULT_DARK_THRESHOLD: u16 = 30;

/// Scale applied to white to produce the dark override.
pub const DEFAULT_DARK_SCALE: f64 = 0.1;

/// Default reference colors: red, orange, yellow, green, blue, white.
pub const DEFAULT_PALETTE: [Color; 6] = [
    Color::new(255, 0, 0),
    Color::new(255, 165, 0),
    Color::new(255, 255, 0),
    Color::new(0, 128, 0),
    Color::new(0, 0, 255),
    Color::new(255, 255, 255),
];

/// Ordered, immutable set of reference colors. Order is tie-break priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<Color>,
}

impl Palette {
    /// Build a palette. Returns `None` for an empty entry list.
    pub fn new(entries: Vec<Color>) -> Option<Self> {
        if entries.is_empty() {
            None
        } else {
            Some(Self { entries })
        }
    }

    /// Parse a list of color strings (hex or names).
    pub fn parse<S: AsRef<str>>(specs: &[S]) -> crate::error::Result<Self> {
        let entries = specs
            .iter()
            .map(|s| color::parse_color(s.as_ref()))
            .collect::<crate::error::Result<Vec<_>>>()?;
        Self::new(entries)
            .ok_or_else(|| crate::ChromatapError::Config("palette must not be empty".into()))
    }

    pub fn entries(&self) -> &[Color] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, c: Color) -> bool {
        self.entries.contains(&c)
    }

    /// Entry closest to `sample`; the first of equally close entries wins.
    pub fn nearest(&self, sample: Color) -> Color {
        self.entries
            .iter()
            .copied()
            .min_by_key(|entry| sample.distance_sq(*entry))
            .unwrap_or(Color::BLACK)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            entries: DEFAULT_PALETTE.to_vec(),
        }
    }
}

/// Maps a sampled color onto the palette, with the darkness override.
#[derive(Debug, Clone)]
pub struct PaletteMatcher {
    palette: Palette,
    dark_threshold: u16,
    dark_color: Color,
}

impl PaletteMatcher {
    pub fn new(palette: Palette, dark_threshold: u16, dark_scale: f64) -> Self {
        Self {
            palette,
            dark_threshold,
            dark_color: Color::WHITE.scale(dark_scale),
        }
    }

    /// Resolve a sample to its output color.
    ///
    /// Samples with `brightness < dark_threshold` return the dark override
    /// regardless of hue. Everything else returns the nearest palette entry
    /// unscaled.
    pub fn resolve(&self, sample: Color) -> Color {
        if sample.brightness() < self.dark_threshold {
            return self.dark_color;
        }
        self.palette.nearest(sample).scale(1.0)
    }

    /// The fixed color returned for very dark samples.
    pub fn dark_color(&self) -> Color {
        self.dark_color
    }

    pub fn dark_threshold(&self) -> u16 {
        self.dark_threshold
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }
}

impl Default for PaletteMatcher {
    fn default() -> Self {
        Self::new(
            Palette::default(),
            DEFAULT_DARK_THRESHOLD,
            DEFAULT_DARK_SCALE,
        )
    }
}
