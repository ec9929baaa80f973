//! Digital input source — trait + GPIO backend.
//!
//! Sources report one "active" (pressed) flag per configured channel. The
//! electrical polarity is the source's business: the GPIO backend reads
//! pulled-up lines, so a low level is reported as pressed.

use std::fmt;

#[derive(Debug)]
pub enum InputError {
    /// A pin could not be reserved or configured.
    OpenFailed(String),
    /// A poll produced a different number of channels than configured.
    ChannelCount { expected: usize, actual: usize },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::OpenFailed(e) => write!(f, "Failed to open inputs: {e}"),
            InputError::ChannelCount { expected, actual } => {
                write!(f, "Input poll returned {actual} channels, expected {expected}")
            }
        }
    }
}

impl std::error::Error for InputError {}

pub type Result<T> = std::result::Result<T, InputError>;

/// Supplies one boolean per configured channel on each poll.
pub trait InputSource {
    /// Number of channels every poll returns.
    fn channel_count(&self) -> usize;
    /// Read all channels. `true` means pressed.
    ///
    /// A channel that cannot be read is reported as a fixed value rather than
    /// an error, so comparison logic never sees a gap.
    fn poll(&mut self) -> Vec<bool>;
    /// Release any pin reservations. Called once during shutdown.
    fn release(&mut self) {}
}

impl<T: InputSource + ?Sized> InputSource for Box<T> {
    fn channel_count(&self) -> usize {
        (**self).channel_count()
    }
    fn poll(&mut self) -> Vec<bool> {
        (**self).poll()
    }
    fn release(&mut self) {
        (**self).release()
    }
}

/// Input source with no hardware behind it: every channel reads released.
#[derive(Debug, Clone)]
pub struct NullInput {
    channels: usize,
}

impl NullInput {
    pub fn new(channels: usize) -> Self {
        Self { channels }
    }
}

impl InputSource for NullInput {
    fn channel_count(&self) -> usize {
        self.channels
    }

    fn poll(&mut self) -> Vec<bool> {
        vec![false; self.channels]
    }
}

// ── Raspberry Pi GPIO implementation ──

#[cfg(all(feature = "rpi", target_os = "linux"))]
mod gpio {
    use super::*;
    use rppal::gpio::{Gpio, InputPin};

    /// Pulled-up GPIO inputs read through `rppal`. Low = pressed.
    pub struct GpioInput {
        pins: Vec<InputPin>,
    }

    impl GpioInput {
        /// Reserve each BCM pin as an input with the internal pull-up enabled.
        pub fn open(bcm_pins: &[u8]) -> Result<Self> {
            let gpio = Gpio::new().map_err(|e| InputError::OpenFailed(format!("GPIO: {e}")))?;
            let mut pins = Vec::with_capacity(bcm_pins.len());
            for &bcm in bcm_pins {
                let pin = gpio
                    .get(bcm)
                    .map_err(|e| InputError::OpenFailed(format!("GPIO{bcm}: {e}")))?
                    .into_input_pullup();
                pins.push(pin);
            }
            log::debug!("[buttons] reserved GPIO {bcm_pins:?}");
            Ok(Self { pins })
        }
    }

    impl InputSource for GpioInput {
        fn channel_count(&self) -> usize {
            self.pins.len()
        }

        fn poll(&mut self) -> Vec<bool> {
            self.pins.iter().map(|p| p.is_low()).collect()
        }

        fn release(&mut self) {
            // Dropping an InputPin restores its previous mode and pull state.
            self.pins.clear();
        }
    }
}

#[cfg(all(feature = "rpi", target_os = "linux"))]
pub use gpio::GpioInput;

// ── Mock input for testing ──

/// Scripted input source for unit and integration tests.
#[doc(hidden)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;

    /// Returns queued snapshots in order, then repeats the last one forever.
    pub struct MockInput {
        channels: usize,
        queue: VecDeque<Vec<bool>>,
        last: Vec<bool>,
        pub polls: usize,
        pub released: bool,
    }

    impl MockInput {
        pub fn new(channels: usize) -> Self {
            Self {
                channels,
                queue: VecDeque::new(),
                last: vec![false; channels],
                polls: 0,
                released: false,
            }
        }

        /// Queue a snapshot. Accepts `0`/`1` electrical levels like a
        /// pulled-up button: `0` means pressed.
        pub fn push_levels(&mut self, levels: &[u8]) {
            self.queue.push_back(levels.iter().map(|&l| l == 0).collect());
        }

        /// Queue a snapshot of pressed flags.
        pub fn push(&mut self, active: &[bool]) {
            self.queue.push_back(active.to_vec());
        }
    }

    impl InputSource for MockInput {
        fn channel_count(&self) -> usize {
            self.channels
        }

        fn poll(&mut self) -> Vec<bool> {
            self.polls += 1;
            if let Some(next) = self.queue.pop_front() {
                self.last = next;
            }
            self.last.clone()
        }

        fn release(&mut self) {
            self.released = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockInput;
    use super::*;

    #[test]
    fn null_input_reads_released() {
        let mut input = NullInput::new(4);
        assert_eq!(input.channel_count(), 4);
        assert_eq!(input.poll(), vec![false; 4]);
    }

    #[test]
    fn mock_levels_are_active_low() {
        let mut input = MockInput::new(3);
        input.push_levels(&[1, 0, 1]);
        assert_eq!(input.poll(), vec![false, true, false]);
    }

    #[test]
    fn mock_repeats_last_snapshot() {
        let mut input = MockInput::new(2);
        input.push(&[true, false]);
        assert_eq!(input.poll(), vec![true, false]);
        assert_eq!(input.poll(), vec![true, false]);
        assert_eq!(input.polls, 2);
    }

    #[test]
    fn boxed_source_forwards() {
        let mut input: Box<dyn InputSource> = Box::new(NullInput::new(2));
        assert_eq!(input.channel_count(), 2);
        assert_eq!(input.poll().len(), 2);
        input.release();
    }

    #[test]
    fn channel_count_error_display() {
        let e = InputError::ChannelCount {
            expected: 5,
            actual: 3,
        };
        assert_eq!(e.to_string(), "Input poll returned 3 channels, expected 5");
    }
}
