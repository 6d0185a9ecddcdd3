//! kasa-core - real-time performance core for the kasa visuals tool.
//!
//! This crate owns the timing and protocol logic that drives the kasa
//! animations from a grid control surface (8x8 pads, 9 faders, 9 fader
//! buttons, 8 side buttons):
//!
//! - [`BeatClock`] - Drift-correcting beat counter with deferred tempo
//!   changes and tap-tempo estimation
//! - [`ControlSurfaceState`] - Typed device state decoded from the inbound
//!   event stream (faders, toggles, pattern select)
//! - [`StepSequencer`] - 8 patterns x 8 steps of per-step row memory
//! - [`FeedbackEncoder`] - Outbound LED frame derivation with priority and
//!   brightness rules
//! - [`PerformanceEngine`] - Per-tick orchestrator wiring all of the above
//!   together for the host render loop
//!
//! The renderers themselves (waves, clouds, umbrellas, ...) live in the host
//! application; they only consume `beat()` and `value_at()` each frame.
//!
//! # Usage
//!
//! ```no_run
//! use kasa_core::PerformanceEngine;
//!
//! let mut engine = PerformanceEngine::new();
//! engine.start();
//!
//! // Host render loop, once per frame:
//! let now_ms = 16.7; // milliseconds from any fixed origin
//! engine.tick(now_ms);
//! let beat = engine.beat();
//! let level = engine.value_at(engine.selected_pattern(), engine.current_step());
//! ```

pub mod clock;
pub mod engine;
pub mod error;
pub mod events;
pub mod feedback;
pub mod layout;
#[cfg(feature = "native")]
pub mod midi;
pub mod sequencer;
pub mod state;

// Re-export main types
pub use clock::{BeatClock, DEFAULT_BPM};
pub use engine::PerformanceEngine;
pub use error::{Error, Result};
pub use events::{EventKind, SurfaceEvent};
pub use feedback::{DummySink, FeedbackEncoder, FeedbackSink, LedMessage, LedTarget};
pub use layout::{ControlRole, CLEAR_FADER, FADER_COUNT, GRID_SIZE, PATTERN_COUNT};
#[cfg(feature = "native")]
pub use midi::{list_input_ports, list_output_ports, MidiSurface};
pub use sequencer::StepSequencer;
pub use state::ControlSurfaceState;
