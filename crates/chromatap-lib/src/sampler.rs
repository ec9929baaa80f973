//! Region-of-interest extraction and dominant-color sampling.
//!
//! The dominant color is the per-channel mean of the region after it has been
//! downsampled to a small fixed grid, truncated to integers.

use image::RgbImage;
use image::imageops::{self, FilterType};

use crate::color::Color;

/// Side length of the centered region cut from each frame.
pub const DEFAULT_ROI_SIZE: u32 = 100;

/// Side length of the grid the region is downsampled to before averaging.
pub const DEFAULT_SAMPLE_GRID: u32 = 50;

/// A captured frame. Owned by the capture tick and never mutated downstream.
pub type Frame = RgbImage;

/// An independent copy of the centered sub-rectangle of a frame.
///
/// Always non-empty: construction fails for an empty frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionOfInterest {
    pixels: RgbImage,
}

impl RegionOfInterest {
    /// Copy the centered `size`×`size` region out of `frame`.
    ///
    /// The region is clipped to the frame when the frame is smaller than
    /// `size` in either dimension. Returns `None` for an empty frame or a
    /// zero `size`.
    pub fn from_frame(frame: &Frame, size: u32) -> Option<Self> {
        let (w, h) = frame.dimensions();
        if w == 0 || h == 0 || size == 0 {
            return None;
        }
        let rw = size.min(w);
        let rh = size.min(h);
        let x = w / 2 - rw / 2;
        let y = h / 2 - rh / 2;
        let pixels = imageops::crop_imm(frame, x, y, rw, rh).to_image();
        Some(Self { pixels })
    }

    /// Wrap an existing image. Returns `None` if it has no pixels.
    pub fn from_image(pixels: RgbImage) -> Option<Self> {
        if pixels.width() == 0 || pixels.height() == 0 {
            None
        } else {
            Some(Self { pixels })
        }
    }

    pub fn image(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}

/// Reduces a region to one representative color.
#[derive(Debug, Clone, Copy)]
pub struct ColorSampler {
    grid: u32,
}

impl ColorSampler {
    /// Create a sampler averaging over a `grid`×`grid` downsample (minimum 1).
    pub fn new(grid: u32) -> Self {
        Self { grid: grid.max(1) }
    }

    pub fn grid(&self) -> u32 {
        self.grid
    }

    /// Mean color of the downsampled region, truncated per channel.
    ///
    /// The grid never exceeds the region, so sampling only ever shrinks.
    pub fn sample(&self, region: &RegionOfInterest) -> Color {
        let (w, h) = region.dimensions();
        let small = imageops::resize(
            region.image(),
            self.grid.min(w),
            self.grid.min(h),
            FilterType::Triangle,
        );
        mean_color(&small)
    }
}

impl Default for ColorSampler {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_GRID)
    }
}

/// Arithmetic mean of every channel over all pixels, truncated.
fn mean_color(img: &RgbImage) -> Color {
    let count = u64::from(img.width()) * u64::from(img.height());
    if count == 0 {
        return Color::BLACK;
    }
    let mut sums = [0u64; 3];
    for px in img.pixels() {
        for (sum, &c) in sums.iter_mut().zip(px.0.iter()) {
            *sum += u64::from(c);
        }
    }
    Color::new(
        (sums[0] / count) as u8,
        (sums[1] / count) as u8,
        (sums[2] / count) as u8,
    )
}
