//! Device context — opens the camera, buttons, strip, and messaging sink.
//!
//! Consolidates backend selection so the CLI only has to hand a [`Config`]
//! over: a still image beats a live camera, hardware backends are used when
//! their feature is compiled in, and software stand-ins fill the gaps.

use crate::camera::{FrameSource, StillImageCamera};
use crate::config::Config;
use crate::control::ControlLoop;
use crate::input::InputSource;
use crate::led::LedStrip;
use crate::osc::{MessageSink, UdpSink};

/// Boxed backends chosen at runtime.
pub type ApplianceLoop =
    ControlLoop<Box<dyn FrameSource>, Box<dyn InputSource>, Box<dyn LedStrip>, Box<dyn MessageSink>>;

/// Opened backends plus a short name for each, for logging and `--json`.
pub struct DeviceContext {
    pub camera: Box<dyn FrameSource>,
    pub input: Box<dyn InputSource>,
    pub strip: Box<dyn LedStrip>,
    pub sink: Box<dyn MessageSink>,
    pub backends: Backends,
}

/// Which implementation backs each device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backends {
    pub camera: &'static str,
    pub input: &'static str,
    pub strip: &'static str,
    pub target: String,
}

impl DeviceContext {
    /// Open every backend described by `config`.
    ///
    /// Any open failure is returned as-is; backends opened before the
    /// failure are dropped, which releases them.
    pub fn open(config: &Config) -> crate::error::Result<Self> {
        let (camera, camera_name) = open_camera(config)?;
        let (input, input_name) = open_input(config)?;
        let (strip, strip_name) = open_strip(config)?;
        let sink = UdpSink::connect(&config.osc_host, config.osc_port)?;
        let backends = Backends {
            camera: camera_name,
            input: input_name,
            strip: strip_name,
            target: sink.target().to_string(),
        };
        log::info!(
            "[context] camera={} buttons={} leds={} osc={}",
            backends.camera,
            backends.input,
            backends.strip,
            backends.target
        );
        Ok(Self {
            camera,
            input,
            strip,
            sink: Box::new(sink),
            backends,
        })
    }

    /// Hand the backends to a new control loop.
    pub fn into_loop(self, config: &Config) -> crate::error::Result<ApplianceLoop> {
        ControlLoop::new(self.camera, self.input, self.strip, self.sink, config)
    }
}

fn open_camera(config: &Config) -> crate::error::Result<(Box<dyn FrameSource>, &'static str)> {
    if let Some(path) = config.camera_image_path() {
        let cam = StillImageCamera::open(&path)?;
        return Ok((Box::new(cam), "still-image"));
    }

    #[cfg(feature = "opencv")]
    {
        let cam = crate::camera::OpenCvCamera::open(
            config.camera_index,
            config.frame_width,
            config.frame_height,
        )?;
        Ok((Box::new(cam), "opencv"))
    }

    #[cfg(not(feature = "opencv"))]
    {
        log::warn!("[capture] no camera backend; captures will be skipped");
        Ok((Box::new(crate::camera::NoCamera), "none"))
    }
}

fn open_input(config: &Config) -> crate::error::Result<(Box<dyn InputSource>, &'static str)> {
    #[cfg(all(feature = "rpi", target_os = "linux"))]
    {
        let input = crate::input::GpioInput::open(&config.button_pins)?;
        Ok((Box::new(input), "gpio"))
    }

    #[cfg(not(all(feature = "rpi", target_os = "linux")))]
    {
        let input = crate::input::NullInput::new(config.button_pins.len());
        Ok((Box::new(input), "null"))
    }
}

fn open_strip(config: &Config) -> crate::error::Result<(Box<dyn LedStrip>, &'static str)> {
    #[cfg(all(feature = "rpi", target_os = "linux"))]
    {
        let strip =
            crate::led::Ws2812Strip::open(config.spi_bus, config.spi_device, config.led_count)?;
        Ok((Box::new(strip), "ws2812"))
    }

    #[cfg(not(all(feature = "rpi", target_os = "linux")))]
    {
        Ok((Box::new(crate::led::LogStrip::new(config.led_count)), "log"))
    }
}
