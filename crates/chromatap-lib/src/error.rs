//! Unified error type for the chromatap-lib crate.
//!
//! [`ChromatapError`] wraps collaborator-specific errors (`CameraError`,
//! `InputError`, `LedError`, `OscError`) and domain-specific error kinds
//! (`Config`, `Color`). `From` impls allow `?` to propagate across module
//! boundaries seamlessly.

use std::fmt;

use crate::camera::CameraError;
use crate::input::InputError;
use crate::led::LedError;
use crate::osc::OscError;

/// Unified error type for chromatap-lib operations.
#[derive(Debug)]
pub enum ChromatapError {
    /// Frame source error (open, capture).
    Camera(CameraError),
    /// Digital input error (pin reservation, channel count mismatch).
    Input(InputError),
    /// LED strip error (buffer write, show).
    Led(LedError),
    /// Messaging error (socket bind, send).
    Osc(OscError),
    /// Standard I/O error (file read/write, config persistence).
    Io(std::io::Error),
    /// Configuration validation error.
    Config(String),
    /// Color parsing error.
    Color(String),
}

impl fmt::Display for ChromatapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChromatapError::Camera(e) => write!(f, "{e}"),
            ChromatapError::Input(e) => write!(f, "{e}"),
            ChromatapError::Led(e) => write!(f, "{e}"),
            ChromatapError::Osc(e) => write!(f, "{e}"),
            ChromatapError::Io(e) => write!(f, "I/O error: {e}"),
            ChromatapError::Config(e) => write!(f, "Config error: {e}"),
            ChromatapError::Color(e) => write!(f, "Color error: {e}"),
        }
    }
}

impl std::error::Error for ChromatapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChromatapError::Camera(e) => Some(e),
            ChromatapError::Input(e) => Some(e),
            ChromatapError::Led(e) => Some(e),
            ChromatapError::Osc(e) => Some(e),
            ChromatapError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CameraError> for ChromatapError {
    fn from(e: CameraError) -> Self {
        ChromatapError::Camera(e)
    }
}

impl From<InputError> for ChromatapError {
    fn from(e: InputError) -> Self {
        ChromatapError::Input(e)
    }
}

impl From<LedError> for ChromatapError {
    fn from(e: LedError) -> Self {
        ChromatapError::Led(e)
    }
}

impl From<OscError> for ChromatapError {
    fn from(e: OscError) -> Self {
        ChromatapError::Osc(e)
    }
}

impl From<std::io::Error> for ChromatapError {
    fn from(e: std::io::Error) -> Self {
        ChromatapError::Io(e)
    }
}

/// Crate-level Result alias using [`ChromatapError`].
pub type Result<T> = std::result::Result<T, ChromatapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_led_error() {
        let e: ChromatapError = LedError::ShowFailed("spi".into()).into();
        assert!(matches!(e, ChromatapError::Led(LedError::ShowFailed(_))));
    }

    #[test]
    fn from_osc_error() {
        let e: ChromatapError = OscError::SendFailed("unreachable".into()).into();
        assert!(matches!(e, ChromatapError::Osc(OscError::SendFailed(_))));
    }

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let e: ChromatapError = io_err.into();
        assert!(matches!(e, ChromatapError::Io(_)));
    }

    #[test]
    fn display_config_error() {
        let e = ChromatapError::Config("no buttons".into());
        assert_eq!(e.to_string(), "Config error: no buttons");
    }

    #[test]
    fn display_color_error() {
        let e = ChromatapError::Color("bad hex".into());
        assert_eq!(e.to_string(), "Color error: bad hex");
    }

    #[test]
    fn display_input_error_is_transparent() {
        let e = ChromatapError::Input(InputError::ChannelCount {
            expected: 5,
            actual: 4,
        });
        assert_eq!(e.to_string(), "Input poll returned 4 channels, expected 5");
    }

    #[test]
    fn source_chains_camera_error() {
        let e = ChromatapError::Camera(CameraError::OpenFailed("busy".into()));
        let source = std::error::Error::source(&e).unwrap();
        assert!(source.to_string().contains("busy"));
    }

    #[test]
    fn source_none_for_string_variants() {
        let e = ChromatapError::Color("test".into());
        assert!(std::error::Error::source(&e).is_none());
    }

    #[test]
    fn question_mark_propagation_led_to_chromatap() {
        fn inner() -> crate::led::Result<()> {
            Err(LedError::WriteFailed("bus".into()))
        }
        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }
        let err = outer().unwrap_err();
        assert!(matches!(err, ChromatapError::Led(LedError::WriteFailed(_))));
    }
}
