//! LED output — strip backends, the indicator driver, and the chase animation.

mod animation;
mod indicator;
mod strip;
#[cfg(all(feature = "rpi", target_os = "linux"))]
mod ws2812;

pub use animation::{Direction, PingPong, STEPS_PER_LED};
pub use indicator::IndicatorDriver;
pub use strip::{LedError, LedStrip, LogStrip, Result, mock};
#[cfg(all(feature = "rpi", target_os = "linux"))]
pub use ws2812::Ws2812Strip;
