//! LED strip trait, the logging backend, and the test mock.

use std::fmt;

use crate::color::{Color, format_color};

/// LED strip errors.
///
/// String payloads follow the convention **"context: details"**.
#[derive(Debug)]
pub enum LedError {
    OpenFailed(String),
    WriteFailed(String),
    ShowFailed(String),
}

impl fmt::Display for LedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedError::OpenFailed(e) => write!(f, "Failed to open LED strip: {e}"),
            LedError::WriteFailed(e) => write!(f, "LED buffer write failed: {e}"),
            LedError::ShowFailed(e) => write!(f, "LED show failed: {e}"),
        }
    }
}

impl std::error::Error for LedError {}

pub type Result<T> = std::result::Result<T, LedError>;

/// An addressable strip. Writes go to a buffer; `show` pushes the buffer out.
pub trait LedStrip {
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Set every pixel in the buffer.
    fn set_all(&mut self, color: Color) -> Result<()>;
    /// Set one pixel in the buffer. Out-of-range indices are ignored.
    fn set_pixel(&mut self, index: usize, color: Color) -> Result<()>;
    /// Commit the buffer to the physical strip.
    fn show(&mut self) -> Result<()>;
    /// Release the underlying bus. Called once during shutdown, after the
    /// final "all off" frame.
    fn release(&mut self) {}
}

impl<T: LedStrip + ?Sized> LedStrip for Box<T> {
    fn len(&self) -> usize {
        (**self).len()
    }
    fn set_all(&mut self, color: Color) -> Result<()> {
        (**self).set_all(color)
    }
    fn set_pixel(&mut self, index: usize, color: Color) -> Result<()> {
        (**self).set_pixel(index, color)
    }
    fn show(&mut self) -> Result<()> {
        (**self).show()
    }
    fn release(&mut self) {
        (**self).release()
    }
}

/// A strip with no hardware: keeps a buffer and logs each shown frame.
#[derive(Debug, Clone)]
pub struct LogStrip {
    pixels: Vec<Color>,
    shown: Vec<Color>,
}

impl LogStrip {
    pub fn new(len: usize) -> Self {
        Self {
            pixels: vec![Color::BLACK; len],
            shown: vec![Color::BLACK; len],
        }
    }

    /// The last committed frame.
    pub fn shown(&self) -> &[Color] {
        &self.shown
    }
}

impl LedStrip for LogStrip {
    fn len(&self) -> usize {
        self.pixels.len()
    }

    fn set_all(&mut self, color: Color) -> Result<()> {
        self.pixels.fill(color);
        Ok(())
    }

    fn set_pixel(&mut self, index: usize, color: Color) -> Result<()> {
        if let Some(px) = self.pixels.get_mut(index) {
            *px = color;
        }
        Ok(())
    }

    fn show(&mut self) -> Result<()> {
        if self.pixels != self.shown {
            let frame: Vec<String> = self.pixels.iter().map(|c| format_color(*c)).collect();
            log::debug!("[led] {}", frame.join(" "));
        }
        self.shown.clone_from(&self.pixels);
        Ok(())
    }
}

// ── Mock strip for testing ──

/// In-memory strip that records every committed frame.
#[doc(hidden)]
pub mod mock {
    use super::*;
    use std::cell::Cell;

    pub struct MockStrip {
        pub pixels: Vec<Color>,
        /// Every frame passed to `show`, in order.
        pub frames: Vec<Vec<Color>>,
        pub released: bool,
        /// If true, `show` returns an error.
        pub fail_show: Cell<bool>,
    }

    impl MockStrip {
        pub fn new(len: usize) -> Self {
            Self {
                pixels: vec![Color::BLACK; len],
                frames: Vec::new(),
                released: false,
                fail_show: Cell::new(false),
            }
        }

        pub fn last_frame(&self) -> Option<&[Color]> {
            self.frames.last().map(Vec::as_slice)
        }
    }

    impl LedStrip for MockStrip {
        fn len(&self) -> usize {
            self.pixels.len()
        }

        fn set_all(&mut self, color: Color) -> Result<()> {
            self.pixels.fill(color);
            Ok(())
        }

        fn set_pixel(&mut self, index: usize, color: Color) -> Result<()> {
            if let Some(px) = self.pixels.get_mut(index) {
                *px = color;
            }
            Ok(())
        }

        fn show(&mut self) -> Result<()> {
            if self.fail_show.get() {
                return Err(LedError::ShowFailed("mock: show failure injected".into()));
            }
            self.frames.push(self.pixels.clone());
            Ok(())
        }

        fn release(&mut self) {
            self.released = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockStrip;
    use super::*;

    #[test]
    fn log_strip_commits_on_show() {
        let mut strip = LogStrip::new(3);
        strip.set_all(Color::WHITE).unwrap();
        assert_eq!(strip.shown(), &[Color::BLACK; 3]);
        strip.show().unwrap();
        assert_eq!(strip.shown(), &[Color::WHITE; 3]);
    }

    #[test]
    fn set_pixel_out_of_range_is_ignored() {
        let mut strip = LogStrip::new(2);
        strip.set_pixel(5, Color::WHITE).unwrap();
        strip.show().unwrap();
        assert_eq!(strip.shown(), &[Color::BLACK; 2]);
    }

    #[test]
    fn mock_records_frames() {
        let mut strip = MockStrip::new(2);
        strip.set_all(Color::new(1, 2, 3)).unwrap();
        strip.show().unwrap();
        strip.set_pixel(0, Color::BLACK).unwrap();
        strip.show().unwrap();
        assert_eq!(strip.frames.len(), 2);
        assert_eq!(
            strip.last_frame().unwrap(),
            &[Color::BLACK, Color::new(1, 2, 3)]
        );
    }

    #[test]
    fn mock_show_failure() {
        let mut strip = MockStrip::new(1);
        strip.fail_show.set(true);
        assert!(matches!(strip.show(), Err(LedError::ShowFailed(_))));
    }
}
