//! Preview composite: the resolved color above the last region of interest.
//!
//! The canvas is 120×220. The top 100×100 block at (10, 10) is filled with
//! the resolved color; the bottom block at (10, 120) holds the region scaled
//! to 100×100. Everything else is black.

use std::path::PathBuf;

use image::RgbImage;
use image::imageops::{self, FilterType};

use crate::color::Color;
use crate::sampler::RegionOfInterest;

pub const CANVAS_WIDTH: u32 = 120;
pub const CANVAS_HEIGHT: u32 = 220;
const BLOCK: u32 = 100;
const MARGIN: u32 = 10;
const ROI_TOP: u32 = 120;

/// Build the composite for `resolved` and an optional region.
pub fn compose(resolved: Color, roi: Option<&RegionOfInterest>) -> RgbImage {
    let mut canvas = RgbImage::new(CANVAS_WIDTH, CANVAS_HEIGHT);
    for y in MARGIN..MARGIN + BLOCK {
        for x in MARGIN..MARGIN + BLOCK {
            canvas.put_pixel(x, y, resolved.into());
        }
    }
    if let Some(roi) = roi {
        let block = if roi.dimensions() == (BLOCK, BLOCK) {
            roi.image().clone()
        } else {
            imageops::resize(roi.image(), BLOCK, BLOCK, FilterType::Triangle)
        };
        imageops::replace(&mut canvas, &block, i64::from(MARGIN), i64::from(ROI_TOP));
    }
    canvas
}

/// Keeps the latest composite and optionally mirrors it to a PNG file.
#[derive(Debug, Default)]
pub struct Preview {
    path: Option<PathBuf>,
    canvas: Option<RgbImage>,
    shown_color: Option<Color>,
    shown_roi: Option<RegionOfInterest>,
}

impl Preview {
    /// A preview that writes to `path` whenever it changes (`None` = memory only).
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            ..Self::default()
        }
    }

    /// Recompose if the inputs differ from the last refresh.
    ///
    /// Returns `true` when the composite was rebuilt. A failed PNG write is
    /// logged and does not stop the loop.
    pub fn refresh(&mut self, resolved: Color, roi: Option<&RegionOfInterest>) -> bool {
        if self.canvas.is_some()
            && self.shown_color == Some(resolved)
            && self.shown_roi.as_ref() == roi
        {
            return false;
        }
        let canvas = compose(resolved, roi);
        if let Some(path) = &self.path
            && let Err(e) = canvas.save(path)
        {
            log::warn!("[preview] could not write {}: {e}", path.display());
        }
        self.canvas = Some(canvas);
        self.shown_color = Some(resolved);
        self.shown_roi = roi.cloned();
        true
    }

    pub fn canvas(&self) -> Option<&RgbImage> {
        self.canvas.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_places_color_and_roi() {
        let roi = RegionOfInterest::from_image(RgbImage::from_pixel(
            100,
            100,
            Color::new(0, 0, 255).into(),
        ))
        .unwrap();
        let canvas = compose(Color::new(255, 0, 0), Some(&roi));
        assert_eq!(canvas.dimensions(), (120, 220));
        assert_eq!(canvas.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(canvas.get_pixel(10, 10).0, [255, 0, 0]);
        assert_eq!(canvas.get_pixel(109, 109).0, [255, 0, 0]);
        assert_eq!(canvas.get_pixel(110, 110).0, [0, 0, 0]);
        assert_eq!(canvas.get_pixel(10, 120).0, [0, 0, 255]);
        assert_eq!(canvas.get_pixel(109, 219).0, [0, 0, 255]);
    }

    #[test]
    fn compose_without_roi_leaves_bottom_black() {
        let canvas = compose(Color::WHITE, None);
        assert_eq!(canvas.get_pixel(50, 150).0, [0, 0, 0]);
    }

    #[test]
    fn refresh_only_when_inputs_change() {
        let mut p = Preview::new(None);
        assert!(p.refresh(Color::WHITE, None));
        assert!(!p.refresh(Color::WHITE, None));
        assert!(p.refresh(Color::BLACK, None));
        let roi = RegionOfInterest::from_image(RgbImage::new(4, 4)).unwrap();
        assert!(p.refresh(Color::BLACK, Some(&roi)));
        assert!(!p.refresh(Color::BLACK, Some(&roi)));
    }

    #[test]
    fn refresh_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview.png");
        let mut p = Preview::new(Some(path.clone()));
        p.refresh(Color::new(0, 128, 0), None);
        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.get_pixel(50, 50).0, [0, 128, 0]);
    }
}
