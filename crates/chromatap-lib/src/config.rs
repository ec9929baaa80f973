//! Application configuration — TOML-based, platform-aware paths.
//!
//! Everything here is read once at process start; nothing is hot-reloaded.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::buttons::ChannelId;
use crate::color::{self, Color};
use crate::palette::{self, Palette, PaletteMatcher};

/// Header comment prepended to saved config files.
const CONFIG_HEADER: &str = "# chromatap configuration\n\n";

/// How button changes are reported on `/btns`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonReport {
    /// Per-channel pressed / released / unchanged codes.
    #[default]
    Transitions,
    /// Raw levels only (`0` pressed, `1` released).
    Raw,
}

impl fmt::Display for ButtonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ButtonReport::Transitions => write!(f, "transitions"),
            ButtonReport::Raw => write!(f, "raw"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Messaging target host.
    #[serde(default = "default_osc_host")]
    pub osc_host: String,

    /// Messaging target port.
    #[serde(default = "default_osc_port")]
    pub osc_port: u16,

    /// BCM GPIO number of each button, in channel order.
    #[serde(default = "default_button_pins")]
    pub button_pins: Vec<u8>,

    /// 0-based channel whose press triggers a capture.
    #[serde(default = "default_shutter_channel")]
    pub shutter_channel: usize,

    /// `/btns` payload format.
    #[serde(default)]
    pub button_report: ButtonReport,

    /// Number of LEDs on the strip.
    #[serde(default = "default_led_count")]
    pub led_count: usize,

    /// Output scale applied to every LED color (0.0..=1.0).
    #[serde(default = "default_one")]
    pub led_brightness: f64,

    /// SPI bus of the LED strip.
    #[serde(default)]
    pub spi_bus: u8,

    /// SPI chip select of the LED strip.
    #[serde(default)]
    pub spi_device: u8,

    /// Reference colors (hex or names). Order breaks ties.
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,

    /// Channel-sum brightness below which a sample resolves to dimmed white.
    #[serde(default = "default_dark_threshold")]
    pub dark_threshold: u16,

    /// Scale applied to white for the dark override.
    #[serde(default = "default_dark_scale")]
    pub dark_scale: f64,

    /// Capture device index.
    #[serde(default)]
    pub camera_index: i32,

    /// Still image used as the camera. Empty = live camera.
    #[serde(default)]
    pub camera_image: String,

    #[serde(default = "default_frame_width")]
    pub frame_width: u32,

    #[serde(default = "default_frame_height")]
    pub frame_height: u32,

    /// Side of the centered region sampled from each frame.
    #[serde(default = "default_roi_size")]
    pub roi_size: u32,

    /// Side of the grid the region is downsampled to.
    #[serde(default = "default_sample_grid")]
    pub sample_grid: u32,

    /// Color resolved and shown at startup.
    #[serde(default = "default_startup_color")]
    pub startup_color: String,

    /// Cycle the palette on the strip at startup.
    #[serde(default = "default_true")]
    pub self_test: bool,

    #[serde(default = "default_self_test_delay_ms")]
    pub self_test_delay_ms: u64,

    /// Ping-pong chase after each capture.
    #[serde(default)]
    pub animation: bool,

    /// Idle delay between loop ticks.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// PNG path for the preview composite. Empty = disabled.
    #[serde(default)]
    pub preview_path: String,
}

fn default_osc_host() -> String {
    "127.0.0.1".into()
}
fn default_osc_port() -> u16 {
    3000
}
fn default_button_pins() -> Vec<u8> {
    vec![23, 18, 15, 14, 24]
}
fn default_shutter_channel() -> usize {
    4
}
fn default_led_count() -> usize {
    8
}
fn default_one() -> f64 {
    1.0
}
fn default_palette() -> Vec<String> {
    palette::DEFAULT_PALETTE
        .iter()
        .map(|c| color::format_color(*c))
        .collect()
}
fn default_dark_threshold() -> u16 {
    palette::DEFAULT_DARK_THRESHOLD
}
fn default_dark_scale() -> f64 {
    palette::DEFAULT_DARK_SCALE
}
fn default_frame_width() -> u32 {
    640
}
fn default_frame_height() -> u32 {
    480
}
fn default_roi_size() -> u32 {
    crate::sampler::DEFAULT_ROI_SIZE
}
fn default_sample_grid() -> u32 {
    crate::sampler::DEFAULT_SAMPLE_GRID
}
fn default_startup_color() -> String {
    "#282828".into()
}
fn default_true() -> bool {
    true
}
fn default_self_test_delay_ms() -> u64 {
    400
}
fn default_tick_ms() -> u64 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Config {
            osc_host: default_osc_host(),
            osc_port: default_osc_port(),
            button_pins: default_button_pins(),
            shutter_channel: default_shutter_channel(),
            button_report: ButtonReport::default(),
            led_count: default_led_count(),
            led_brightness: default_one(),
            spi_bus: 0,
            spi_device: 0,
            palette: default_palette(),
            dark_threshold: default_dark_threshold(),
            dark_scale: default_dark_scale(),
            camera_index: 0,
            camera_image: String::new(),
            frame_width: default_frame_width(),
            frame_height: default_frame_height(),
            roi_size: default_roi_size(),
            sample_grid: default_sample_grid(),
            startup_color: default_startup_color(),
            self_test: true,
            self_test_delay_ms: default_self_test_delay_ms(),
            animation: false,
            tick_ms: default_tick_ms(),
            preview_path: String::new(),
        }
    }
}

/// Validation errors that [`Config::validate`] can return.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// `button_pins` is empty.
    NoButtons,
    /// `button_pins` lists the same GPIO twice.
    DuplicatePin(u8),
    /// `shutter_channel` does not name a configured button.
    ShutterChannelOutOfRange { channel: usize, count: usize },
    /// `led_count` is zero.
    NoLeds,
    /// A palette entry could not be parsed, or the palette is empty.
    InvalidPalette(String),
    /// `startup_color` could not be parsed.
    InvalidStartupColor(String),
    /// A scale factor is outside 0.0..=1.0 (`field` names which one).
    ScaleOutOfRange { field: &'static str, value: f64 },
    /// A size or port that must be non-zero is zero.
    Zero(&'static str),
    /// `sample_grid` is larger than `roi_size`.
    GridLargerThanRegion { grid: u32, roi: u32 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NoButtons => write!(f, "button_pins cannot be empty"),
            ValidationError::DuplicatePin(p) => write!(f, "GPIO {p} is listed twice"),
            ValidationError::ShutterChannelOutOfRange { channel, count } => write!(
                f,
                "shutter_channel {channel} is out of range ({count} button{} configured)",
                if *count == 1 { "" } else { "s" }
            ),
            ValidationError::NoLeds => write!(f, "led_count must be at least 1"),
            ValidationError::InvalidPalette(e) => write!(f, "Invalid palette: {e}"),
            ValidationError::InvalidStartupColor(e) => write!(f, "Invalid startup color: {e}"),
            ValidationError::ScaleOutOfRange { field, value } => {
                write!(f, "{field} must be between 0.0 and 1.0, got {value}")
            }
            ValidationError::Zero(field) => write!(f, "{field} must be non-zero"),
            ValidationError::GridLargerThanRegion { grid, roi } => {
                write!(f, "sample_grid {grid} must not exceed roi_size {roi}")
            }
        }
    }
}

impl Config {
    /// Platform-specific config directory.
    pub fn dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("chromatap"))
    }

    /// Full path to config file.
    pub fn path() -> Option<PathBuf> {
        Self::dir().map(|d| d.join("config.toml"))
    }

    /// Load config from disk, or return defaults if not found.
    pub fn load() -> Self {
        let (config, warnings) = Self::load_with_warnings();
        for w in &warnings {
            log::warn!("[config] {w}");
        }
        config
    }

    /// Save config to an arbitrary path atomically (write to temp file, then rename).
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let serialized = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        let contents = format!("{CONFIG_HEADER}{serialized}");
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, &contents)?;
        match std::fs::rename(&tmp, path) {
            Ok(()) => Ok(()),
            Err(_) => {
                // Rename can fail across filesystems; fall back to direct write + cleanup
                let result = std::fs::write(path, &contents);
                let _ = std::fs::remove_file(&tmp);
                result
            }
        }
    }

    /// Save config to the default platform path.
    pub fn save(&self) -> std::io::Result<()> {
        let Some(path) = Self::path() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No config directory",
            ));
        };
        self.save_to(&path)
    }

    /// Load config from an arbitrary path, returning the config and any parse warnings.
    ///
    /// Returns `(defaults, [])` if the file doesn't exist.
    /// Returns `(defaults, [warning])` if the file exists but can't be parsed.
    pub fn load_from(path: &Path) -> (Self, Vec<String>) {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => (config, vec![]),
                Err(e) => {
                    let warning = format!(
                        "config parse error ({}), using defaults: {e}",
                        path.display()
                    );
                    (Self::default(), vec![warning])
                }
            },
            Err(_) => (Self::default(), vec![]),
        }
    }

    /// Load config from the default path, returning the config and any parse warnings.
    pub fn load_with_warnings() -> (Self, Vec<String>) {
        let Some(path) = Self::path() else {
            return (Self::default(), vec![]);
        };
        Self::load_from(&path)
    }

    /// Parsed palette.
    pub fn palette(&self) -> crate::error::Result<Palette> {
        Palette::parse(&self.palette)
    }

    /// Matcher built from the palette and dark-override settings.
    pub fn matcher(&self) -> crate::error::Result<PaletteMatcher> {
        Ok(PaletteMatcher::new(
            self.palette()?,
            self.dark_threshold,
            self.dark_scale,
        ))
    }

    pub fn startup_color(&self) -> crate::error::Result<Color> {
        color::parse_color(&self.startup_color)
    }

    pub fn shutter_channel_id(&self) -> Option<ChannelId> {
        (self.shutter_channel < self.button_pins.len()).then_some(ChannelId(self.shutter_channel))
    }

    /// Camera still-image path, if one is configured.
    pub fn camera_image_path(&self) -> Option<PathBuf> {
        let p = self.camera_image.trim();
        (!p.is_empty()).then(|| PathBuf::from(p))
    }

    /// Preview PNG path, if one is configured.
    pub fn preview_path(&self) -> Option<PathBuf> {
        let p = self.preview_path.trim();
        (!p.is_empty()).then(|| PathBuf::from(p))
    }

    /// Validate the entire config, collecting all errors.
    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.button_pins.is_empty() {
            errors.push(ValidationError::NoButtons);
        }
        let mut seen = Vec::with_capacity(self.button_pins.len());
        for &pin in &self.button_pins {
            if seen.contains(&pin) {
                errors.push(ValidationError::DuplicatePin(pin));
            } else {
                seen.push(pin);
            }
        }
        if !self.button_pins.is_empty() && self.shutter_channel >= self.button_pins.len() {
            errors.push(ValidationError::ShutterChannelOutOfRange {
                channel: self.shutter_channel,
                count: self.button_pins.len(),
            });
        }

        if self.led_count == 0 {
            errors.push(ValidationError::NoLeds);
        }

        if let Err(e) = self.palette() {
            errors.push(ValidationError::InvalidPalette(e.to_string()));
        }
        if let Err(e) = self.startup_color() {
            errors.push(ValidationError::InvalidStartupColor(e.to_string()));
        }

        for (field, value) in [
            ("dark_scale", self.dark_scale),
            ("led_brightness", self.led_brightness),
        ] {
            if !(0.0..=1.0).contains(&value) {
                errors.push(ValidationError::ScaleOutOfRange { field, value });
            }
        }

        if self.osc_port == 0 {
            errors.push(ValidationError::Zero("osc_port"));
        }
        if self.roi_size == 0 {
            errors.push(ValidationError::Zero("roi_size"));
        }
        if self.sample_grid == 0 {
            errors.push(ValidationError::Zero("sample_grid"));
        } else if self.roi_size > 0 && self.sample_grid > self.roi_size {
            errors.push(ValidationError::GridLargerThanRegion {
                grid: self.sample_grid,
                roi: self.roi_size,
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
