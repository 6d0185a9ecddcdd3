//! Per-tick orchestration.
//!
//! [`PerformanceEngine`] is what the host render loop talks to. It owns the
//! clock, the surface state, the sequencer, and the feedback encoder, plus
//! the channel that buffers asynchronously arriving surface events between
//! ticks.
//!
//! One tick:
//!
//! 1. advance the beat clock with the host's wall-clock timestamp
//! 2. derive the current step (`beat mod 8`)
//! 3. drain buffered events strictly in arrival order and decode them
//! 4. advance the synthetic fader pulse trains
//! 5. emit the LED feedback frame
//!
//! There is exactly one writer (the tick loop); renderers read the exposed
//! getters synchronously within the same tick, so no locking is involved.

use crossbeam_channel::{unbounded, Receiver, Sender};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::clock::BeatClock;
use crate::events::{EventKind, SurfaceEvent};
use crate::feedback::{DummySink, FeedbackEncoder, FeedbackSink};
use crate::layout::{classify, ControlRole, GRID_SIZE};
use crate::sequencer::StepSequencer;
use crate::state::ControlSurfaceState;

/// The performance core: clock, surface state, sequencer, and feedback,
/// driven by one `tick` per host frame.
pub struct PerformanceEngine {
    clock: BeatClock,
    state: ControlSurfaceState,
    sequencer: StepSequencer,
    encoder: FeedbackEncoder,
    events_tx: Sender<SurfaceEvent>,
    events_rx: Receiver<SurfaceEvent>,
    sink: Box<dyn FeedbackSink>,
    rng: StdRng,
}

impl Default for PerformanceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PerformanceEngine {
    /// Create an engine with no device attached (feedback goes to a
    /// [`DummySink`]).
    pub fn new() -> Self {
        Self::with_bpm(crate::clock::DEFAULT_BPM)
    }

    /// Create an engine whose clock starts at the given tempo.
    pub fn with_bpm(bpm: f64) -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            clock: BeatClock::with_bpm(bpm),
            state: ControlSurfaceState::new(),
            sequencer: StepSequencer::new(),
            encoder: FeedbackEncoder::new(),
            events_tx,
            events_rx,
            sink: Box::new(DummySink),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Replace the feedback sink and re-emit the full frame on the next
    /// tick so a freshly attached device starts in sync.
    pub fn set_sink(&mut self, sink: Box<dyn FeedbackSink>) {
        self.sink = sink;
        self.encoder.force_refresh();
    }

    /// Seed the synthetic-fader RNG, for reproducible runs and tests.
    pub fn seed_rng(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// A sender the transport layer can push events through from any
    /// thread. Events are buffered and drained at the start of the next
    /// tick, in arrival order.
    pub fn event_sender(&self) -> Sender<SurfaceEvent> {
        self.events_tx.clone()
    }

    /// Push one event directly (same path as `event_sender`).
    pub fn push_event(&self, event: SurfaceEvent) {
        let _ = self.events_tx.send(event);
    }

    /// Start the beat clock from beat zero.
    pub fn start(&mut self) {
        self.clock.start();
    }

    /// Stop the beat clock.
    pub fn stop(&mut self) {
        self.clock.stop();
    }

    /// Run one tick. `now_ms` is the host's wall clock in milliseconds from
    /// any fixed origin; irregular tick spacing self-corrects.
    pub fn tick(&mut self, now_ms: f64) {
        self.clock.advance(now_ms);
        let step = self.current_step();
        self.drain_events();
        self.state.update_synthetic(&mut self.rng);
        self.encoder
            .encode(&self.state, &self.sequencer, step, self.sink.as_mut());
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.dispatch(event);
        }
    }

    /// Decode one event into state. The selected pattern is read here, once
    /// per event, so a pattern-select earlier in the same batch retargets
    /// every grid edit after it (the hardware's own event order wins).
    fn dispatch(&mut self, event: SurfaceEvent) {
        let Some(role) = classify(event.kind, event.channel) else {
            log::debug!("Ignoring event on unmapped channel {}", event.channel);
            return;
        };
        match (event.kind, role) {
            (EventKind::ButtonDown, ControlRole::GridPad { row, col }) => {
                let pattern = self.state.selected_pattern();
                self.sequencer
                    .apply_grid_event(pattern, col as usize, row);
            }
            (EventKind::ButtonDown, ControlRole::FaderButton(index)) => {
                self.state.toggle_fader_button(index);
            }
            (EventKind::ButtonDown, ControlRole::PatternSelect(pattern)) => {
                self.state.select_pattern(pattern);
            }
            (EventKind::Continuous, ControlRole::Fader(index)) => {
                self.state.set_fader(index, event.normalized());
            }
            // Releases carry no state for this surface.
            (EventKind::ButtonUp, _) => {}
            _ => {}
        }
    }

    // --- host contract -----------------------------------------------------

    /// Continuous beat position.
    pub fn beat(&self) -> f64 {
        self.clock.beat()
    }

    /// Whether the last tick crossed a beat boundary.
    pub fn is_beat_boundary(&self) -> bool {
        self.clock.is_beat_boundary()
    }

    /// Current tempo.
    pub fn bpm(&self) -> f64 {
        self.clock.bpm()
    }

    /// Stage a tempo change for the next beat boundary.
    pub fn set_bpm(&mut self, bpm: f64) {
        self.clock.set_bpm(bpm);
    }

    /// Register a tempo tap.
    pub fn tap_tempo(&mut self, now_ms: f64) {
        self.clock.tap_tempo(now_ms);
    }

    /// The step the playhead is on, in `0..8`.
    pub fn current_step(&self) -> usize {
        (self.clock.beat() as u64 % GRID_SIZE as u64) as usize
    }

    /// Stored row at `(pattern, step)`; 0 for out-of-range queries.
    pub fn value_at(&self, pattern: usize, step: usize) -> u8 {
        self.sequencer.value_at(pattern, step)
    }

    /// Visible fader value in `[0, 1]`; 0.0 for out-of-range queries.
    pub fn fader_value(&self, index: usize) -> f32 {
        self.state.fader_value(index)
    }

    /// The currently selected pattern.
    pub fn selected_pattern(&self) -> usize {
        self.state.selected_pattern()
    }

    /// Zero all steps of the currently selected pattern.
    pub fn clear_current_pattern(&mut self) {
        self.sequencer.clear_pattern(self.state.selected_pattern());
    }

    /// Zero all steps of any pattern by index.
    pub fn clear_pattern(&mut self, pattern: usize) {
        self.sequencer.clear_pattern(pattern);
    }
}
