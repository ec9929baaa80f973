//! Frame sources — trait + still-image and OpenCV backends.
//!
//! `capture` returns `Ok(None)` when no frame is available. The control loop
//! treats a backend error the same way: the capture is skipped for that tick.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::sampler::Frame;

#[derive(Debug)]
pub enum CameraError {
    OpenFailed(String),
    CaptureFailed(String),
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::OpenFailed(e) => write!(f, "Failed to open camera: {e}"),
            CameraError::CaptureFailed(e) => write!(f, "Capture failed: {e}"),
        }
    }
}

impl std::error::Error for CameraError {}

pub type Result<T> = std::result::Result<T, CameraError>;

/// Supplies color frames on demand.
pub trait FrameSource {
    /// Grab the current frame, or `None` if the source has nothing to give.
    fn capture(&mut self) -> Result<Option<Frame>>;
    /// Release the device handle. Called once during shutdown.
    fn release(&mut self) {}
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn capture(&mut self) -> Result<Option<Frame>> {
        (**self).capture()
    }
    fn release(&mut self) {
        (**self).release()
    }
}

/// A source that never has a frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCamera;

impl FrameSource for NoCamera {
    fn capture(&mut self) -> Result<Option<Frame>> {
        Ok(None)
    }
}

/// Serves the same still image on every capture.
#[derive(Debug, Clone)]
pub struct StillImageCamera {
    path: PathBuf,
    frame: Option<Frame>,
}

impl StillImageCamera {
    /// Load `path` (any format the `image` crate decodes) as an RGB frame.
    pub fn open(path: &Path) -> Result<Self> {
        let frame = image::open(path)
            .map_err(|e| CameraError::OpenFailed(format!("{}: {e}", path.display())))?
            .to_rgb8();
        log::debug!(
            "[capture] still image {} ({}x{})",
            path.display(),
            frame.width(),
            frame.height()
        );
        Ok(Self {
            path: path.to_path_buf(),
            frame: Some(frame),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSource for StillImageCamera {
    fn capture(&mut self) -> Result<Option<Frame>> {
        Ok(self.frame.clone())
    }

    fn release(&mut self) {
        self.frame = None;
    }
}

// ── OpenCV implementation ──

#[cfg(feature = "opencv")]
mod cv {
    use super::*;
    use opencv::core::Mat;
    use opencv::imgproc;
    use opencv::prelude::*;
    use opencv::videoio::{self, VideoCapture, VideoWriter};

    /// Live camera read through OpenCV's `VideoCapture`.
    pub struct OpenCvCamera {
        cap: VideoCapture,
    }

    impl OpenCvCamera {
        /// Open capture device `index`, requesting MJPG at `width`×`height`.
        pub fn open(index: i32, width: u32, height: u32) -> Result<Self> {
            let err = |e: opencv::Error| CameraError::OpenFailed(format!("device {index}: {e}"));
            let mut cap = VideoCapture::new(index, videoio::CAP_ANY).map_err(err)?;
            if !cap.is_opened().map_err(err)? {
                return Err(CameraError::OpenFailed(format!(
                    "device {index}: not opened"
                )));
            }
            let fourcc = VideoWriter::fourcc('M', 'J', 'P', 'G').map_err(err)?;
            cap.set(videoio::CAP_PROP_FOURCC, f64::from(fourcc))
                .map_err(err)?;
            cap.set(videoio::CAP_PROP_FRAME_WIDTH, f64::from(width))
                .map_err(err)?;
            cap.set(videoio::CAP_PROP_FRAME_HEIGHT, f64::from(height))
                .map_err(err)?;
            Ok(Self { cap })
        }
    }

    impl FrameSource for OpenCvCamera {
        fn capture(&mut self) -> Result<Option<Frame>> {
            let err = |e: opencv::Error| CameraError::CaptureFailed(e.to_string());
            let mut bgr = Mat::default();
            if !self.cap.read(&mut bgr).map_err(err)? || bgr.empty() {
                return Ok(None);
            }
            let mut rgb = Mat::default();
            imgproc::cvt_color(&bgr, &mut rgb, imgproc::COLOR_BGR2RGB, 0).map_err(err)?;
            let (w, h) = (rgb.cols() as u32, rgb.rows() as u32);
            let bytes = rgb.data_bytes().map_err(err)?.to_vec();
            Ok(Frame::from_raw(w, h, bytes))
        }

        fn release(&mut self) {
            if let Err(e) = self.cap.release() {
                log::warn!("[capture] release failed: {e}");
            }
        }
    }
}

#[cfg(feature = "opencv")]
pub use cv::OpenCvCamera;

// ── Mock camera for testing ──

/// Scripted frame source for unit and integration tests.
#[doc(hidden)]
pub mod mock {
    use super::*;
    use crate::color::Color;
    use std::collections::VecDeque;

    /// Returns queued results in order; once empty, returns `fallback`.
    pub struct MockCamera {
        queue: VecDeque<Result<Option<Frame>>>,
        pub fallback: Option<Frame>,
        pub captures: usize,
        pub released: bool,
    }

    impl MockCamera {
        /// A camera that always returns a solid `width`×`height` frame of `color`.
        pub fn solid(width: u32, height: u32, color: Color) -> Self {
            Self {
                queue: VecDeque::new(),
                fallback: Some(Frame::from_pixel(width, height, color.into())),
                captures: 0,
                released: false,
            }
        }

        /// A camera with no frames at all.
        pub fn empty() -> Self {
            Self {
                queue: VecDeque::new(),
                fallback: None,
                captures: 0,
                released: false,
            }
        }

        pub fn push_frame(&mut self, frame: Frame) {
            self.queue.push_back(Ok(Some(frame)));
        }

        pub fn push_missing(&mut self) {
            self.queue.push_back(Ok(None));
        }

        pub fn push_error(&mut self, msg: &str) {
            self.queue
                .push_back(Err(CameraError::CaptureFailed(msg.to_string())));
        }
    }

    impl FrameSource for MockCamera {
        fn capture(&mut self) -> Result<Option<Frame>> {
            self.captures += 1;
            match self.queue.pop_front() {
                Some(next) => next,
                None => Ok(self.fallback.clone()),
            }
        }

        fn release(&mut self) {
            self.released = true;
        }
    }
}
