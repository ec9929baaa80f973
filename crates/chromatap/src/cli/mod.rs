//! CLI subcommands — the appliance loop plus offline sampling and inspection.

mod appliance;
mod config_cmd;
mod keys;
mod palette;
mod sample;
mod value;

use std::path::{Path, PathBuf};

use clap::Subcommand;
use serde::Serialize;

pub(super) use crate::RUNNING;
pub(super) use chromatap_lib::color;
pub(super) use chromatap_lib::config::Config;
pub(super) use chromatap_lib::error::Result;

const PADDING: usize = 2;

/// Compute alignment width for a command's key-value output.
/// Ensures at least PADDING spaces after the longest key in either level,
/// with top-level and indent values aligned to the same column.
pub(super) fn kv_width(top: &[&str], indent: &[&str]) -> usize {
    let top_max = top.iter().map(|k| k.len()).max().unwrap_or(0);
    let indent_max = indent.iter().map(|k| k.len()).max().unwrap_or(0);
    let top_need = if top.is_empty() { 0 } else { top_max + PADDING };
    // Indent keys lose 2 chars of inner width to the "  " prefix
    let indent_need = if indent.is_empty() {
        0
    } else {
        indent_max + PADDING + 2
    };
    top_need.max(indent_need)
}

pub(super) fn format_kv(key: &str, value: impl std::fmt::Display, w: usize) -> String {
    format!("{key:<width$}{value}", width = w)
}

pub(super) fn kv(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("{}", format_kv(key, value, w));
}

pub(super) fn kv_indent(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("  {key:<width$}{value}", width = w - 2);
}

/// Load config from `custom_path`, or from the platform default.
///
/// Parse problems are logged and defaults are used.
pub(super) fn load_config(custom_path: Option<&Path>) -> Config {
    match custom_path {
        Some(path) => {
            let (config, warnings) = Config::load_from(path);
            for w in &warnings {
                log::warn!("[config] {w}");
            }
            config
        }
        None => Config::load(),
    }
}

/// The config file in effect: `custom_path` if given, else the platform default.
pub(super) fn config_path(custom_path: Option<&Path>) -> Option<PathBuf> {
    custom_path.map(Path::to_path_buf).or_else(Config::path)
}

/// Reject configs that cannot drive the appliance.
pub(super) fn validated(config: Config) -> Result<Config> {
    match config.validate() {
        Ok(()) => Ok(config),
        Err(errors) => {
            let msgs: Vec<String> = errors.iter().map(ToString::to_string).collect();
            Err(chromatap_lib::ChromatapError::Config(msgs.join("; ")))
        }
    }
}

/// Print `value` as pretty JSON on stdout.
pub(super) fn print_json(value: &impl Serialize) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{text}");
    Ok(())
}

// ── JSON output structs ──

#[derive(Serialize)]
pub(super) struct ConfigOutput {
    pub config_file: Option<String>,
    pub config_file_exists: bool,
    pub valid: bool,
    pub problems: Vec<String>,
    pub settings: Config,
}

#[derive(Serialize)]
pub(super) struct PaletteOutput {
    pub entries: Vec<PaletteEntryJson>,
    pub dark_threshold: u16,
    pub dark_scale: f64,
    pub dark_color: String,
}

#[derive(Serialize)]
pub(super) struct PaletteEntryJson {
    pub index: usize,
    pub color: String,
    pub rgb: [u8; 3],
}

#[derive(Serialize)]
pub(super) struct SampleOutput {
    pub image: String,
    pub frame: [u32; 2],
    pub region: [u32; 2],
    pub sampled: String,
    pub resolved: String,
    pub dark_override: bool,
    pub palette_index: Option<usize>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the appliance loop (s = capture, q/Esc = exit)
    Run {
        /// Do not read keys from the terminal (buttons and Ctrl+C only)
        #[arg(long)]
        no_keys: bool,
    },

    /// Sample and resolve the color of an image file (no hardware required)
    Sample {
        /// Image to sample (PNG or JPEG)
        image: PathBuf,
        /// Write the preview composite to this PNG file
        #[arg(long, value_name = "PATH")]
        preview: Option<PathBuf>,
    },

    /// Show the palette and the dark override
    Palette,

    /// Show current configuration and file path
    Config {
        /// Write the settings to the config file if it does not exist yet
        #[arg(long)]
        init: bool,
    },

    /// Send one /value message with a color (hex or name)
    Value {
        /// Color to report, e.g. "#FF8000" or "orange"
        color: String,
    },
}

impl Command {
    /// Whether this command runs the long-lived appliance loop.
    pub fn is_loop(&self) -> bool {
        matches!(self, Command::Run { .. })
    }

    /// Whether this command puts the terminal into raw mode.
    pub fn uses_raw_terminal(&self) -> bool {
        matches!(self, Command::Run { no_keys: false })
    }
}

/// Warn if `--json` was passed to a command that doesn't support it.
fn warn_json_unsupported(cmd_name: &str) {
    log::warn!("--json is not supported for `{cmd_name}` (ignored)");
}

pub fn run(cmd: Command, json: bool, config_path: Option<&Path>) -> Result<()> {
    match cmd {
        Command::Run { no_keys } => {
            if json {
                warn_json_unsupported("run");
            }
            appliance::cmd_run(config_path, no_keys)
        }
        Command::Sample { image, preview } => {
            sample::cmd_sample(&image, preview.as_deref(), json, config_path)
        }
        Command::Palette => palette::cmd_palette(json, config_path),
        Command::Config { init } => config_cmd::cmd_config(json, init, config_path),
        Command::Value { color } => {
            if json {
                warn_json_unsupported("value");
            }
            value::cmd_value(&color, config_path)
        }
    }
}


#[cfg(test)]
mod command_tests {
    use super::*;

    #[test]
    fn only_run_is_a_loop() {
        assert!(Command::Run { no_keys: true }.is_loop());
        assert!(!Command::Palette.is_loop());
        assert!(!Command::Config { init: false }.is_loop());
    }

    #[test]
    fn raw_terminal_only_with_keys() {
        assert!(Command::Run { no_keys: false }.uses_raw_terminal());
        assert!(!Command::Run { no_keys: true }.uses_raw_terminal());
        assert!(
            !Command::Value {
                color: "red".into()
            }
            .uses_raw_terminal()
        );
    }

    #[test]
    fn validated_joins_problems() {
        let config = Config {
            led_count: 0,
            osc_port: 0,
            ..Config::default()
        };
        let err = validated(config).unwrap_err().to_string();
        assert!(err.starts_with("Config error: "));
        assert!(err.contains("led_count"));
        assert!(err.contains("osc_port"));
    }

    #[test]
    fn load_config_from_custom_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.toml");
        std::fs::write(&path, "led_count = 12\n").unwrap();
        assert_eq!(load_config(Some(&path)).led_count, 12);
        assert_eq!(config_path(Some(&path)), Some(path));
    }
}
