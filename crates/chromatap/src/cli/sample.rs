//! `sample` subcommand — run the sampler and matcher on an image file.

use std::path::Path;

use chromatap_lib::ChromatapError;
use chromatap_lib::camera::{FrameSource, StillImageCamera};
use chromatap_lib::preview;
use chromatap_lib::sampler::{ColorSampler, RegionOfInterest};

use super::{Result, SampleOutput, color, kv, kv_width};

pub(super) fn cmd_sample(
    image: &Path,
    preview_path: Option<&Path>,
    json: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = super::load_config(config_path);
    let matcher = config.matcher()?;

    let mut camera = StillImageCamera::open(image)?;
    let frame = camera
        .capture()?
        .ok_or_else(|| ChromatapError::Config(format!("{}: no image data", image.display())))?;
    let roi = RegionOfInterest::from_frame(&frame, config.roi_size).ok_or_else(|| {
        ChromatapError::Config(format!("{}: image has no pixels", image.display()))
    })?;

    let sampled = ColorSampler::new(config.sample_grid).sample(&roi);
    let resolved = matcher.resolve(sampled);
    let dark_override = sampled.brightness() < matcher.dark_threshold();
    let palette_index = if dark_override {
        None
    } else {
        matcher
            .palette()
            .entries()
            .iter()
            .position(|&c| c == resolved)
    };

    if let Some(path) = preview_path {
        preview::compose(resolved, Some(&roi))
            .save(path)
            .map_err(|e| ChromatapError::Io(std::io::Error::other(e)))?;
    }

    if json {
        let output = SampleOutput {
            image: image.display().to_string(),
            frame: [frame.width(), frame.height()],
            region: [roi.dimensions().0, roi.dimensions().1],
            sampled: color::format_color(sampled),
            resolved: color::format_color(resolved),
            dark_override,
            palette_index,
        };
        return super::print_json(&output);
    }

    let w = kv_width(
        &["Image:", "Region:", "Sampled:", "Resolved:", "Preview:"],
        &[],
    );
    kv(
        "Image:",
        format_args!(
            "{} ({}x{})",
            image.display(),
            frame.width(),
            frame.height()
        ),
        w,
    );
    let (rw, rh) = roi.dimensions();
    kv("Region:", format_args!("{rw}x{rh} (centered)"), w);
    kv("Sampled:", color::format_color(sampled), w);
    let how = match palette_index {
        Some(i) => format!("palette #{i}"),
        None => "dark override".to_string(),
    };
    kv(
        "Resolved:",
        format_args!("{} ({how})", color::format_color(resolved)),
        w,
    );
    if let Some(path) = preview_path {
        kv("Preview:", path.display(), w);
    }
    Ok(())
}
