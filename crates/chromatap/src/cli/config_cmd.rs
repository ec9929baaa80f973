//! `config` subcommand — show current configuration and file path, or write
//! it out with `--init`.

use std::path::Path;

use chromatap_lib::ChromatapError;

use super::{Config, ConfigOutput, Result, color, kv, kv_indent, kv_width};

/// `value (invalid)` for colors that do not parse, `value -> #RRGGBB` otherwise.
fn color_display(value: &str) -> String {
    match color::parse_color(value) {
        Ok(c) => format!("{value} -> {}", color::format_color(c)),
        Err(_) => format!("{value} (invalid)"),
    }
}

fn optional_path(value: &str, unset: &str) -> String {
    if value.trim().is_empty() {
        unset.to_string()
    } else {
        value.to_string()
    }
}

/// Write `config` to the file in effect. Never overwrites an existing file.
fn init_config(config: &Config, custom_path: Option<&Path>) -> Result<()> {
    let Some(path) = super::config_path(custom_path) else {
        return Err(ChromatapError::Config("no config directory".into()));
    };
    if path.exists() {
        return Err(ChromatapError::Config(format!(
            "{} already exists",
            path.display()
        )));
    }
    match custom_path {
        Some(p) => config.save_to(p)?,
        None => config.save()?,
    }
    log::info!("[config] wrote {}", path.display());
    Ok(())
}

pub(super) fn cmd_config(json: bool, init: bool, custom_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(custom_path);
    if init {
        init_config(&config, custom_path)?;
    }
    let config_path = super::config_path(custom_path);
    let config_exists = config_path.as_ref().is_some_and(|p| p.exists());
    let problems: Vec<String> = match config.validate() {
        Ok(()) => vec![],
        Err(errors) => errors.iter().map(ToString::to_string).collect(),
    };

    if json {
        let output = ConfigOutput {
            config_file: config_path.as_ref().map(|p| p.display().to_string()),
            config_file_exists: config_exists,
            valid: problems.is_empty(),
            problems,
            settings: config,
        };
        return super::print_json(&output);
    }

    // Human-readable output
    let w = kv_width(
        &["Config file:"],
        &[
            "osc_target:",
            "button_pins:",
            "shutter_channel:",
            "button_report:",
            "led_count:",
            "led_brightness:",
            "spi:",
            "palette:",
            "dark_threshold:",
            "dark_scale:",
            "camera:",
            "frame_size:",
            "roi_size:",
            "sample_grid:",
            "startup_color:",
            "self_test:",
            "animation:",
            "tick_ms:",
            "preview_path:",
        ],
    );

    match &config_path {
        Some(p) => {
            if config_exists {
                kv("Config file:", format_args!("{} (loaded)", p.display()), w);
            } else {
                kv(
                    "Config file:",
                    format_args!("{} (not found, using defaults)", p.display()),
                    w,
                );
            }
        }
        None => kv("Config file:", "(no config directory)", w),
    }
    println!();

    println!("Settings:");
    kv_indent(
        "osc_target:",
        format_args!("{}:{}", config.osc_host, config.osc_port),
        w,
    );
    kv_indent("button_pins:", format_args!("{:?}", config.button_pins), w);
    kv_indent("shutter_channel:", config.shutter_channel, w);
    kv_indent("button_report:", config.button_report, w);
    kv_indent("led_count:", config.led_count, w);
    kv_indent("led_brightness:", config.led_brightness, w);
    kv_indent(
        "spi:",
        format_args!("bus {} device {}", config.spi_bus, config.spi_device),
        w,
    );
    let palette: Vec<String> = config.palette.iter().map(|p| color_display(p)).collect();
    kv_indent("palette:", palette.join(", "), w);
    kv_indent("dark_threshold:", config.dark_threshold, w);
    kv_indent("dark_scale:", config.dark_scale, w);
    let camera = if config.camera_image.trim().is_empty() {
        format!("device {}", config.camera_index)
    } else {
        format!("image {}", config.camera_image)
    };
    kv_indent("camera:", camera, w);
    kv_indent(
        "frame_size:",
        format_args!("{}x{}", config.frame_width, config.frame_height),
        w,
    );
    kv_indent("roi_size:", config.roi_size, w);
    kv_indent("sample_grid:", config.sample_grid, w);
    kv_indent("startup_color:", color_display(&config.startup_color), w);
    kv_indent(
        "self_test:",
        format_args!("{} ({} ms each)", config.self_test, config.self_test_delay_ms),
        w,
    );
    kv_indent("animation:", config.animation, w);
    kv_indent("tick_ms:", config.tick_ms, w);
    kv_indent(
        "preview_path:",
        optional_path(&config.preview_path, "(disabled)"),
        w,
    );

    if !problems.is_empty() {
        println!();
        println!("Problems:");
        for p in &problems {
            println!("  {p}");
        }
    }
    Ok(())
}
