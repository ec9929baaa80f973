//! Control loop — one synchronous tick per poll, decoupled from I/O backends.
//!
//! Per tick, in order: poll buttons, service a capture (button edge or
//! manual command), emit the shutter notification, emit the button change,
//! step the chase animation (from the tick after a capture), refresh the
//! preview, then check for exit.
//! Shutdown runs exactly once on every exit path, including drop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::buttons::ButtonStateTracker;
use crate::camera::FrameSource;
use crate::color::Color;
use crate::config::{ButtonReport, Config};
use crate::error::Result;
use crate::input::InputSource;
use crate::led::{IndicatorDriver, LedStrip};
use crate::osc::{MessageSink, OscMessage};
use crate::palette::PaletteMatcher;
use crate::preview::Preview;
use crate::sampler::{ColorSampler, RegionOfInterest};

/// Operator command delivered to a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    /// Capture and resolve now, as if the shutter button fired.
    Capture,
    /// Shut down and leave the loop.
    Exit,
}

/// Source of operator commands, polled once per tick without blocking.
pub trait CommandSource {
    fn poll_command(&mut self) -> Option<UserCommand>;
}

impl<T: CommandSource + ?Sized> CommandSource for Box<T> {
    fn poll_command(&mut self) -> Option<UserCommand> {
        (**self).poll_command()
    }
}

/// A command source that never produces anything.
#[derive(Debug, Default)]
pub struct NoCommands;

impl CommandSource for NoCommands {
    fn poll_command(&mut self) -> Option<UserCommand> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Waiting for a trigger.
    Idle,
    /// Servicing a trigger. Always returns to `Idle` within the same tick.
    Capturing,
}

/// What the driver should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopSignal {
    Continue,
    Exit,
}

/// Owns every backend and all cross-tick state.
pub struct ControlLoop<C, I, S, M>
where
    C: FrameSource,
    I: InputSource,
    S: LedStrip,
    M: MessageSink,
{
    camera: C,
    input: I,
    indicator: IndicatorDriver<S>,
    sink: M,
    tracker: ButtonStateTracker,
    sampler: ColorSampler,
    matcher: PaletteMatcher,
    preview: Preview,
    roi_size: u32,
    button_report: ButtonReport,
    startup_color: Color,
    self_test_delay: Option<Duration>,
    tick_interval: Duration,
    state: LoopState,
    resolved: Color,
    last_roi: Option<RegionOfInterest>,
    captures: u64,
    shut_down: bool,
}

impl<C, I, S, M> ControlLoop<C, I, S, M>
where
    C: FrameSource,
    I: InputSource,
    S: LedStrip,
    M: MessageSink,
{
    /// Assemble a loop from opened backends and the process configuration.
    ///
    /// Fails only if the palette or startup color in `config` do not parse.
    pub fn new(camera: C, input: I, strip: S, sink: M, config: &Config) -> Result<Self> {
        let mut indicator = IndicatorDriver::new(strip, config.led_brightness);
        if config.animation {
            indicator = indicator.with_animation();
        }
        let tracker = ButtonStateTracker::new(input.channel_count(), config.shutter_channel_id());
        Ok(Self {
            camera,
            input,
            indicator,
            sink,
            tracker,
            sampler: ColorSampler::new(config.sample_grid),
            matcher: config.matcher()?,
            preview: Preview::new(config.preview_path()),
            roi_size: config.roi_size,
            button_report: config.button_report,
            startup_color: config.startup_color()?,
            self_test_delay: config
                .self_test
                .then(|| Duration::from_millis(config.self_test_delay_ms)),
            tick_interval: Duration::from_millis(config.tick_ms),
            state: LoopState::Idle,
            resolved: Color::BLACK,
            last_roi: None,
            captures: 0,
            shut_down: false,
        })
    }

    /// Optional palette self-test, then show the resolved startup color.
    pub fn startup(&mut self) -> Result<()> {
        if let Some(delay) = self.self_test_delay {
            log::debug!("[led] self test ({} colors)", self.matcher.palette().len());
            self.indicator
                .self_test(self.matcher.palette().entries(), delay)?;
        }
        self.resolved = self.matcher.resolve(self.startup_color);
        self.indicator.apply(self.resolved)?;
        self.preview.refresh(self.resolved, self.last_roi.as_ref());
        log::info!("[led] startup color {}", self.resolved);
        Ok(())
    }

    /// Run one tick.
    ///
    /// LED and messaging failures propagate; the caller is expected to let
    /// the loop end, and shutdown still runs on drop.
    pub fn tick(&mut self, command: Option<UserCommand>) -> Result<LoopSignal> {
        // 1. Poll
        let levels = self.input.poll();
        let outcome = self.tracker.poll(&levels)?;
        if outcome.capture || command == Some(UserCommand::Capture) {
            self.state = LoopState::Capturing;
        }

        // 2. Capture + /shutter
        let captures_before = self.captures;
        if self.state == LoopState::Capturing {
            let result = self.capture();
            self.state = LoopState::Idle;
            result?;
        }

        // 3. /btns
        if let Some(event) = &outcome.event {
            log::debug!("[buttons] {event}");
            let msg = match self.button_report {
                ButtonReport::Transitions => OscMessage::buttons(event),
                ButtonReport::Raw => OscMessage::buttons_raw(event),
            };
            self.sink.send(&msg)?;
        }

        // 3.5 Chase. A capture tick keeps the applied color on the strip.
        if self.captures == captures_before {
            self.indicator.step()?;
        }

        // 4. Preview
        self.preview.refresh(self.resolved, self.last_roi.as_ref());

        // 5. Exit
        if command == Some(UserCommand::Exit) {
            self.shutdown();
            return Ok(LoopSignal::Exit);
        }
        Ok(LoopSignal::Continue)
    }

    /// Drive ticks until an exit command arrives, `running` is cleared, or a
    /// tick fails. Sleeps the configured interval between ticks.
    pub fn run(&mut self, commands: &mut impl CommandSource, running: &AtomicBool) -> Result<()> {
        loop {
            let mut command = commands.poll_command();
            if !running.load(Ordering::SeqCst) {
                command = Some(UserCommand::Exit);
            }
            match self.tick(command) {
                Ok(LoopSignal::Continue) => {
                    if !self.tick_interval.is_zero() {
                        std::thread::sleep(self.tick_interval);
                    }
                }
                Ok(LoopSignal::Exit) => return Ok(()),
                Err(e) => {
                    self.shutdown();
                    return Err(e);
                }
            }
        }
    }

    /// Sample the current frame and publish the result.
    ///
    /// A missing frame, or a camera error, leaves all state untouched and
    /// sends nothing.
    fn capture(&mut self) -> Result<()> {
        let frame = match self.camera.capture() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                log::debug!("[capture] no frame available");
                return Ok(());
            }
            Err(e) => {
                log::warn!("[capture] {e}");
                return Ok(());
            }
        };
        let Some(roi) = RegionOfInterest::from_frame(&frame, self.roi_size) else {
            log::debug!("[capture] empty frame");
            return Ok(());
        };

        let sampled = self.sampler.sample(&roi);
        let resolved = self.matcher.resolve(sampled);
        log::debug!("[capture] sampled {sampled} -> {resolved}");
        log::info!("Selected color {resolved}");
        self.resolved = resolved;
        self.last_roi = Some(roi);
        self.captures += 1;

        self.indicator.apply(resolved)?;
        self.indicator.arm_animation(resolved);
        self.sink.send(&OscMessage::shutter())?;
        Ok(())
    }

    /// Turn the strip off and release every device. Safe to call repeatedly.
    ///
    /// Failures are logged, not returned.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        if let Err(e) = self.indicator.turn_off() {
            log::warn!("[led] could not turn strip off: {e}");
        }
        self.indicator.release();
        self.camera.release();
        self.input.release();
        log::debug!("[control] shut down after {} capture(s)", self.captures);
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// The current resolved color.
    pub fn resolved(&self) -> Color {
        self.resolved
    }

    /// Region from the most recent successful capture.
    pub fn last_roi(&self) -> Option<&RegionOfInterest> {
        self.last_roi.as_ref()
    }

    /// Number of successful captures so far.
    pub fn captures(&self) -> u64 {
        self.captures
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    pub fn preview(&self) -> &Preview {
        &self.preview
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut C {
        &mut self.camera
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn strip(&self) -> &S {
        self.indicator.strip()
    }

    pub fn strip_mut(&mut self) -> &mut S {
        self.indicator.strip_mut()
    }

    pub fn sink(&self) -> &M {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut M {
        &mut self.sink
    }
}

impl<C, I, S, M> Drop for ControlLoop<C, I, S, M>
where
    C: FrameSource,
    I: InputSource,
    S: LedStrip,
    M: MessageSink,
{
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ── Scripted commands for testing ──

#[doc(hidden)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;

    /// Returns queued commands in order, then `None` forever.
    #[derive(Default)]
    pub struct ScriptedCommands {
        queue: VecDeque<Option<UserCommand>>,
        pub polls: usize,
    }

    impl ScriptedCommands {
        pub fn new<T: IntoIterator<Item = Option<UserCommand>>>(script: T) -> Self {
            Self {
                queue: script.into_iter().collect(),
                polls: 0,
            }
        }
    }

    impl CommandSource for ScriptedCommands {
        fn poll_command(&mut self) -> Option<UserCommand> {
            self.polls += 1;
            self.queue.pop_front().flatten()
        }
    }
}
