//! Button state tracking — edge detection over polled input channels.
//!
//! Each poll is compared with the previous snapshot. When anything changed,
//! a [`ChangeEvent`] records per channel whether it was just pressed, just
//! released, or left alone. The first poll only establishes a baseline.

use std::fmt;

use crate::input::InputError;

/// Stable identifier of an input channel (its position in the configured pin list).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub usize);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-channel transition between two polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Became active since the previous poll.
    Pressed,
    /// Became inactive since the previous poll.
    Released,
    /// Same as the previous poll.
    Unchanged,
}

impl ChannelState {
    /// Wire code: `0` pressed, `1` released, `2` unchanged.
    ///
    /// Pressed/released match the electrical levels of a pulled-up button
    /// (low when pressed).
    pub fn wire_code(self) -> i32 {
        match self {
            ChannelState::Pressed => 0,
            ChannelState::Released => 1,
            ChannelState::Unchanged => 2,
        }
    }

    fn between(previous: bool, current: bool) -> Self {
        match (previous, current) {
            (false, true) => ChannelState::Pressed,
            (true, false) => ChannelState::Released,
            _ => ChannelState::Unchanged,
        }
    }
}

/// Emitted when the channel set differs from the previous poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    states: Vec<ChannelState>,
    /// Raw active flags of the poll that produced this event.
    active: Vec<bool>,
}

impl ChangeEvent {
    pub fn states(&self) -> &[ChannelState] {
        &self.states
    }

    pub fn state(&self, id: ChannelId) -> Option<ChannelState> {
        self.states.get(id.0).copied()
    }

    /// Channels with a transition, in channel order.
    pub fn changed(&self) -> impl Iterator<Item = (ChannelId, ChannelState)> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, s)| **s != ChannelState::Unchanged)
            .map(|(i, s)| (ChannelId(i), *s))
    }

    /// Tri-state wire codes, one per channel.
    pub fn wire_codes(&self) -> Vec<i32> {
        self.states.iter().map(|s| s.wire_code()).collect()
    }

    /// Raw levels, one per channel: `0` active, `1` inactive.
    pub fn raw_codes(&self) -> Vec<i32> {
        self.active.iter().map(|&a| if a { 0 } else { 1 }).collect()
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .states
            .iter()
            .map(|s| match s {
                ChannelState::Pressed => "P",
                ChannelState::Released => "R",
                ChannelState::Unchanged => "-",
            })
            .map(str::to_string)
            .collect();
        write!(f, "[{}]", parts.join(" "))
    }
}

/// Result of one [`ButtonStateTracker::poll`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollOutcome {
    /// Set when the channel set changed.
    pub event: Option<ChangeEvent>,
    /// Set when the designated capture channel just became active.
    pub capture: bool,
}

/// Tracks the previous snapshot of a fixed number of channels.
#[derive(Debug, Clone)]
pub struct ButtonStateTracker {
    channel_count: usize,
    capture_channel: Option<ChannelId>,
    previous: Option<Vec<bool>>,
}

impl ButtonStateTracker {
    /// Track `channel_count` channels. `capture_channel` (if in range) fires
    /// [`PollOutcome::capture`] on its inactive → active edge.
    pub fn new(channel_count: usize, capture_channel: Option<ChannelId>) -> Self {
        Self {
            channel_count,
            capture_channel: capture_channel.filter(|c| c.0 < channel_count),
            previous: None,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    pub fn capture_channel(&self) -> Option<ChannelId> {
        self.capture_channel
    }

    /// Last stored snapshot, if any poll has happened.
    pub fn previous(&self) -> Option<&[bool]> {
        self.previous.as_deref()
    }

    /// Compare `current` (true = pressed) with the previous poll.
    ///
    /// The first call stores a baseline and reports nothing. A snapshot of
    /// the wrong length is rejected without touching the stored state.
    pub fn poll(&mut self, current: &[bool]) -> Result<PollOutcome, InputError> {
        if current.len() != self.channel_count {
            return Err(InputError::ChannelCount {
                expected: self.channel_count,
                actual: current.len(),
            });
        }

        let Some(previous) = self.previous.as_deref() else {
            self.previous = Some(current.to_vec());
            return Ok(PollOutcome::default());
        };

        if previous == current {
            return Ok(PollOutcome::default());
        }

        let capture = self
            .capture_channel
            .is_some_and(|c| !previous[c.0] && current[c.0]);

        let states = previous
            .iter()
            .zip(current)
            .map(|(&p, &c)| ChannelState::between(p, c))
            .collect();
        let event = ChangeEvent {
            states,
            active: current.to_vec(),
        };
        self.previous = Some(current.to_vec());

        Ok(PollOutcome {
            event: Some(event),
            capture,
        })
    }
}
