//! Chromatap — camera color sampler with button input, LED indicator, and OSC output.

pub mod buttons;
pub mod camera;
pub mod color;
pub mod config;
pub mod context;
pub mod control;
pub mod error;
pub mod input;
pub mod led;
pub mod osc;
pub mod palette;
pub mod preview;
pub mod sampler;

pub use error::ChromatapError;
