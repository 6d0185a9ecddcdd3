//! Outbound LED feedback.
//!
//! Once per tick the [`FeedbackEncoder`] derives the full indicator frame
//! for the currently selected pattern (64 pads, 8 pattern-select buttons,
//! 9 fader buttons) and pushes it to a [`FeedbackSink`]. Resolution follows
//! a strict priority order so every physical indicator has exactly one
//! rendered state, and all brightness values are clamped into the 7-bit
//! protocol range before emission.
//!
//! The encoder caches the last emitted frame and only re-sends indicators
//! whose resolved value changed, so a quiet surface costs nothing on the
//! wire at 60 Hz. [`FeedbackEncoder::force_refresh`] re-emits everything,
//! for use after a transport reconnect.
//!
//! Emission is fire-and-forget: a sink with no device behind it simply
//! drops messages, and the next tick retries from consistent state.

use crate::layout::{
    fader_button_channel, grid_channel, pattern_select_channel, FADER_COUNT, GRID_SIZE,
    PATTERN_COUNT,
};
use crate::sequencer::StepSequencer;
use crate::state::ControlSurfaceState;

/// Highest valid LED value on the wire.
pub const MAX_LED_VALUE: u8 = 127;

/// Palette offset for the brightened "active" variant of a pattern color.
const ACTIVE_BOOST: u8 = 2;

/// Neutral playhead color for pads in the current step column.
const PLAYHEAD_COLOR: u8 = 3;

/// One palette color per pattern.
pub const PATTERN_COLORS: [u8; PATTERN_COUNT] = [5, 9, 13, 21, 29, 37, 45, 53];

/// Which indicator class a message addresses. Pad LEDs use the surface's
/// full-brightness message variant; button LEDs use the plain one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedTarget {
    Pad,
    Button,
}

/// One outbound indicator update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedMessage {
    pub target: LedTarget,
    pub channel: u8,
    pub value: u8,
}

impl LedMessage {
    /// Encode as raw MIDI bytes.
    ///
    /// Pads go out as note-on on channel 6, the full-brightness variant
    /// understood by the 8x8 pad surfaces kasa targets; buttons as plain
    /// note-on.
    pub fn to_bytes(&self) -> [u8; 3] {
        match self.target {
            LedTarget::Pad => [0x96, self.channel & 0x7F, self.value & 0x7F],
            LedTarget::Button => [0x90, self.channel & 0x7F, self.value & 0x7F],
        }
    }
}

/// Outbound transport capability, injected by the host.
///
/// Implementations must never block or fail the tick loop; when the device
/// is gone they drop messages and report `is_connected() == false`.
pub trait FeedbackSink {
    /// Send one indicator update. Fire-and-forget.
    fn send(&mut self, message: LedMessage);

    /// Whether a device is currently behind this sink.
    fn is_connected(&self) -> bool;
}

/// Sink with no device behind it, for tests and headless operation.
pub struct DummySink;

impl FeedbackSink for DummySink {
    fn send(&mut self, message: LedMessage) {
        log::trace!(
            "LED (dropped, no device): ch={} val={}",
            message.channel,
            message.value
        );
    }

    fn is_connected(&self) -> bool {
        false
    }
}

/// The brightened variant of a pattern color, capped rather than wrapped.
fn boost(color: u8) -> u8 {
    color.saturating_add(ACTIVE_BOOST).min(MAX_LED_VALUE)
}

/// Resolve one pad with the fixed priority order.
///
/// `configured_row` is the pattern's row at the current step; it lights
/// across every column, with the brightened variant where it meets the
/// playhead column.
fn resolve_pad(configured_row: u8, row: u8, col: u8, current_step: u8, color: u8) -> u8 {
    if row == configured_row && col == current_step {
        boost(color)
    } else if row == configured_row {
        color
    } else if col == current_step {
        PLAYHEAD_COLOR
    } else {
        0
    }
}

/// Derives the per-tick LED frame, diffed against the previous one.
#[derive(Debug)]
pub struct FeedbackEncoder {
    pads: [u8; GRID_SIZE * GRID_SIZE],
    pattern_buttons: [u8; PATTERN_COUNT],
    fader_buttons: [u8; FADER_COUNT],
    refresh_all: bool,
}

impl Default for FeedbackEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedbackEncoder {
    /// Create an encoder that will emit the full frame on its first tick.
    pub fn new() -> Self {
        Self {
            pads: [0; GRID_SIZE * GRID_SIZE],
            pattern_buttons: [0; PATTERN_COUNT],
            fader_buttons: [0; FADER_COUNT],
            refresh_all: true,
        }
    }

    /// Re-emit every indicator on the next `encode`, diff or no diff.
    pub fn force_refresh(&mut self) {
        self.refresh_all = true;
    }

    /// Compute and emit the feedback frame for `current_step`.
    pub fn encode(
        &mut self,
        state: &ControlSurfaceState,
        sequencer: &StepSequencer,
        current_step: usize,
        sink: &mut dyn FeedbackSink,
    ) {
        let pattern = state.selected_pattern();
        let color = PATTERN_COLORS[pattern];
        let step = (current_step % GRID_SIZE) as u8;
        // One configured row per frame: the row stored at the current step.
        let configured = sequencer.value_at(pattern, step as usize);

        for row in 0..GRID_SIZE as u8 {
            for col in 0..GRID_SIZE as u8 {
                let value = resolve_pad(configured, row, col, step, color);
                let slot = grid_channel(row, col) as usize;
                if self.refresh_all || self.pads[slot] != value {
                    self.pads[slot] = value;
                    sink.send(LedMessage {
                        target: LedTarget::Pad,
                        channel: grid_channel(row, col),
                        value,
                    });
                }
            }
        }

        for p in 0..PATTERN_COUNT {
            let value = if p == pattern { boost(PATTERN_COLORS[p]) } else { 0 };
            if self.refresh_all || self.pattern_buttons[p] != value {
                self.pattern_buttons[p] = value;
                sink.send(LedMessage {
                    target: LedTarget::Button,
                    channel: pattern_select_channel(p),
                    value,
                });
            }
        }

        for i in 0..FADER_COUNT {
            let value = if state.fader_button_toggled(i) {
                MAX_LED_VALUE
            } else {
                0
            };
            if self.refresh_all || self.fader_buttons[i] != value {
                self.fader_buttons[i] = value;
                sink.send(LedMessage {
                    target: LedTarget::Button,
                    channel: fader_button_channel(i),
                    value,
                });
            }
        }

        // Only settle into diffing once a live transport has taken a frame;
        // a disconnected sink drops everything, so the next tick retries the
        // full frame and a reattached device comes up in sync.
        self.refresh_all = !sink.is_connected();
    }
}
