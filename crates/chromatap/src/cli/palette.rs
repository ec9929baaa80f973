//! `palette` subcommand — list the palette and the dark override.

use std::path::Path;

use super::{PaletteEntryJson, PaletteOutput, Result, color, kv, kv_indent, kv_width};

pub(super) fn cmd_palette(json: bool, config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path);
    let matcher = config.matcher()?;
    let entries = matcher.palette().entries();

    if json {
        let output = PaletteOutput {
            entries: entries
                .iter()
                .enumerate()
                .map(|(index, &c)| PaletteEntryJson {
                    index,
                    color: color::format_color(c),
                    rgb: c.to_array(),
                })
                .collect(),
            dark_threshold: matcher.dark_threshold(),
            dark_scale: config.dark_scale,
            dark_color: color::format_color(matcher.dark_color()),
        };
        return super::print_json(&output);
    }

    let labels: Vec<String> = (0..entries.len()).map(|i| format!("#{i}:")).collect();
    let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
    let w = kv_width(&["Dark override:"], &label_refs);

    println!("Palette ({} entries, first match wins ties):", entries.len());
    for (label, &c) in labels.iter().zip(entries) {
        kv_indent(
            label,
            format_args!("{}  ({}, {}, {})", color::format_color(c), c.r, c.g, c.b),
            w,
        );
    }
    println!();
    kv(
        "Dark override:",
        format_args!(
            "brightness < {} -> {}",
            matcher.dark_threshold(),
            color::format_color(matcher.dark_color())
        ),
        w,
    );
    Ok(())
}
