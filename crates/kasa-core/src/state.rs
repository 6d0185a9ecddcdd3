//! Typed control-surface state.
//!
//! [`ControlSurfaceState`] is the decoded model of the physical surface:
//! nine fader values, nine latching fader-button toggles, and the
//! single-select pattern index. It is mutated only through the decode
//! methods called from the tick loop and read synchronously by the
//! sequencer and the renderers.
//!
//! While a fader button is toggled, the externally visible value of that
//! fader is a synthetic random telegraph (snapping between 0 and 1 with
//! small per-tick probabilities) instead of the hardware reading. The
//! hardware reading keeps being recorded in the shadow slot and becomes
//! visible again the moment the toggle is released.

use rand::Rng;

use crate::layout::{FADER_COUNT, PATTERN_COUNT};

/// Per-tick probability that a synthetic fader snaps to full.
const PULSE_RISE_PROBABILITY: f64 = 0.12;

/// Per-tick probability that a synthetic fader snaps back to zero.
const PULSE_FALL_PROBABILITY: f64 = 0.08;

/// Decoded device state: faders, toggles, and the pattern radio group.
#[derive(Debug, Clone)]
pub struct ControlSurfaceState {
    /// Externally visible fader values.
    fader: [f32; FADER_COUNT],
    /// Last raw hardware reading per fader, kept while synthetic mode owns
    /// the visible value.
    raw_fader: [f32; FADER_COUNT],
    toggled: [bool; FADER_COUNT],
    selected_pattern: usize,
}

impl Default for ControlSurfaceState {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlSurfaceState {
    /// Create the startup state: all faders at zero, nothing toggled,
    /// pattern 0 selected.
    pub fn new() -> Self {
        Self {
            fader: [0.0; FADER_COUNT],
            raw_fader: [0.0; FADER_COUNT],
            toggled: [false; FADER_COUNT],
            selected_pattern: 0,
        }
    }

    /// The visible value of fader `index` in `[0, 1]`.
    ///
    /// Out-of-range indices return 0.0; this is called every frame from
    /// render code that must never panic.
    pub fn fader_value(&self, index: usize) -> f32 {
        self.fader.get(index).copied().unwrap_or(0.0)
    }

    /// Whether fader `index` is in synthetic pulse mode.
    pub fn fader_button_toggled(&self, index: usize) -> bool {
        self.toggled.get(index).copied().unwrap_or(false)
    }

    /// The currently selected pattern, always in `0..PATTERN_COUNT`.
    pub fn selected_pattern(&self) -> usize {
        self.selected_pattern
    }

    /// Record a raw hardware fader reading.
    ///
    /// The reading always lands in the shadow slot; it only becomes the
    /// visible value when the fader is not toggled into synthetic mode.
    pub fn set_fader(&mut self, index: usize, value: f32) {
        if index >= FADER_COUNT {
            log::debug!("Dropping fader reading for out-of-range index {}", index);
            return;
        }
        let value = value.clamp(0.0, 1.0);
        self.raw_fader[index] = value;
        if !self.toggled[index] {
            self.fader[index] = value;
        }
    }

    /// Toggle the latching button overlay for fader `index`.
    ///
    /// Toggling out immediately reverts the visible value to the last raw
    /// hardware reading. Toggling in leaves the visible value where it is;
    /// the pulse train takes over from the next tick.
    pub fn toggle_fader_button(&mut self, index: usize) {
        if index >= FADER_COUNT {
            log::debug!("Dropping toggle for out-of-range fader button {}", index);
            return;
        }
        self.toggled[index] = !self.toggled[index];
        if !self.toggled[index] {
            self.fader[index] = self.raw_fader[index];
        }
    }

    /// Select a pattern, deselecting all others.
    ///
    /// The hardware tends to enforce a single concurrent press per side
    /// button group, but the decoder does not rely on that: selection is a
    /// plain radio index, so single-select always holds.
    pub fn select_pattern(&mut self, pattern: usize) {
        if pattern >= PATTERN_COUNT {
            log::debug!("Dropping select of out-of-range pattern {}", pattern);
            return;
        }
        self.selected_pattern = pattern;
    }

    /// Advance the synthetic pulse trains by one tick.
    ///
    /// Each toggled fader independently snaps to full with a small
    /// probability, otherwise back to zero with a smaller one: an
    /// intentionally noisy, asymmetric telegrapher rather than a smooth
    /// oscillator. The RNG is injected so tests can drive exact timing.
    pub fn update_synthetic<R: Rng>(&mut self, rng: &mut R) {
        for index in 0..FADER_COUNT {
            if !self.toggled[index] {
                continue;
            }
            // Always draw both samples so the stream consumed per tick is
            // independent of the current pulse level.
            let rise = rng.random::<f64>() < PULSE_RISE_PROBABILITY;
            let fall = rng.random::<f64>() < PULSE_FALL_PROBABILITY;
            if rise {
                self.fader[index] = 1.0;
            } else if fall {
                self.fader[index] = 0.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// RNG returning a scripted sequence of `f64` samples in `[0, 1)`.
    struct SeqRng {
        samples: Vec<f64>,
        next: usize,
    }

    impl SeqRng {
        fn new(samples: &[f64]) -> Self {
            Self {
                samples: samples.to_vec(),
                next: 0,
            }
        }
    }

    impl rand::RngCore for SeqRng {
        fn next_u32(&mut self) -> u32 {
            (self.next_u64() >> 32) as u32
        }

        fn next_u64(&mut self) -> u64 {
            // random::<f64>() takes the top 53 bits as the mantissa, so
            // scripting a sample means inverting that mapping.
            let sample = self.samples[self.next % self.samples.len()];
            self.next += 1;
            ((sample * (1u64 << 53) as f64) as u64) << 11
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for chunk in dest.chunks_mut(8) {
                let bytes = self.next_u64().to_le_bytes();
                chunk.copy_from_slice(&bytes[..chunk.len()]);
            }
        }
    }

    #[test]
    fn test_fader_reading_is_visible_when_untoggled() {
        let mut state = ControlSurfaceState::new();
        state.set_fader(2, 0.75);
        assert!((state.fader_value(2) - 0.75).abs() < f32::EPSILON);
    }

    #[test]
    fn test_fader_value_clamped_and_total() {
        let mut state = ControlSurfaceState::new();
        state.set_fader(0, 1.5);
        assert_eq!(state.fader_value(0), 1.0);
        state.set_fader(99, 0.5); // dropped
        assert_eq!(state.fader_value(99), 0.0);
    }

    #[test]
    fn test_toggled_fader_shadows_raw_readings() {
        let mut state = ControlSurfaceState::new();
        state.set_fader(1, 0.3);
        state.toggle_fader_button(1);
        assert!(state.fader_button_toggled(1));

        // Hardware keeps moving, but the visible value stays put.
        state.set_fader(1, 0.9);
        assert!((state.fader_value(1) - 0.3).abs() < f32::EPSILON);

        // Toggling out reverts to the latest raw reading, not the stale one.
        state.toggle_fader_button(1);
        assert!((state.fader_value(1) - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_pattern_select_is_single_select() {
        let mut state = ControlSurfaceState::new();
        state.select_pattern(5);
        assert_eq!(state.selected_pattern(), 5);
        state.select_pattern(2);
        assert_eq!(state.selected_pattern(), 2);
        state.select_pattern(99);
        assert_eq!(state.selected_pattern(), 2);
    }

    #[test]
    fn test_synthetic_pulse_rises_and_falls_on_script() {
        let mut state = ControlSurfaceState::new();
        state.set_fader(0, 0.5);
        state.toggle_fader_button(0);

        // Tick 1: rise sample hits, fall sample misses -> snaps to 1.
        let mut rng = SeqRng::new(&[0.01, 0.99]);
        state.update_synthetic(&mut rng);
        assert_eq!(state.fader_value(0), 1.0);

        // Tick 2: rise misses, fall hits -> snaps to 0.
        let mut rng = SeqRng::new(&[0.99, 0.01]);
        state.update_synthetic(&mut rng);
        assert_eq!(state.fader_value(0), 0.0);

        // Tick 3: both miss -> holds.
        let mut rng = SeqRng::new(&[0.99, 0.99]);
        state.update_synthetic(&mut rng);
        assert_eq!(state.fader_value(0), 0.0);
    }

    #[test]
    fn test_synthetic_pulse_ignores_untoggled_faders() {
        let mut state = ControlSurfaceState::new();
        state.set_fader(3, 0.4);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            state.update_synthetic(&mut rng);
        }
        assert!((state.fader_value(3) - 0.4).abs() < f32::EPSILON);
    }

    #[test]
    fn test_synthetic_pulse_only_emits_extremes() {
        let mut state = ControlSurfaceState::new();
        state.toggle_fader_button(4);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            state.update_synthetic(&mut rng);
            let value = state.fader_value(4);
            assert!(value == 0.0 || value == 1.0);
        }
    }
}
