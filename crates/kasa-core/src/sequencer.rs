//! Per-pattern step memory.
//!
//! [`StepSequencer`] owns the 8-pattern x 8-step grid. Each cell stores the
//! selected row (0-7) for that step; consumers treat row 0 as inactive by
//! convention, the grid itself has no separate empty marker. Edits are
//! addressed to an explicit pattern index, which the engine reads from the
//! selected-pattern state once per incoming event so that a pattern-select
//! arriving earlier in the same batch retargets later grid edits.

use crate::layout::{GRID_SIZE, PATTERN_COUNT};

/// 8 patterns x 8 steps of stored rows. Created zero-filled, never
/// persisted.
#[derive(Debug, Clone, Default)]
pub struct StepSequencer {
    grid: [[u8; GRID_SIZE]; PATTERN_COUNT],
}

impl StepSequencer {
    /// Create an empty sequencer (all cells at row 0).
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `row` into `step` of `pattern`.
    ///
    /// Out-of-range coordinates or rows are dropped, matching the decoder's
    /// policy for malformed input.
    pub fn apply_grid_event(&mut self, pattern: usize, step: usize, row: u8) {
        if pattern >= PATTERN_COUNT || step >= GRID_SIZE || row as usize >= GRID_SIZE {
            log::debug!(
                "Dropping grid event outside layout: pattern={} step={} row={}",
                pattern,
                step,
                row
            );
            return;
        }
        self.grid[pattern][step] = row;
    }

    /// The stored row at `(pattern, step)`.
    ///
    /// Total over all inputs: out-of-range coordinates read as 0 so the
    /// render loop can call this with host-derived indices every frame.
    pub fn value_at(&self, pattern: usize, step: usize) -> u8 {
        self.grid
            .get(pattern)
            .and_then(|steps| steps.get(step))
            .copied()
            .unwrap_or(0)
    }

    /// Zero all eight steps of one pattern.
    pub fn clear_pattern(&mut self, pattern: usize) {
        if let Some(steps) = self.grid.get_mut(pattern) {
            *steps = [0; GRID_SIZE];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_starts_empty() {
        let seq = StepSequencer::new();
        for pattern in 0..PATTERN_COUNT {
            for step in 0..GRID_SIZE {
                assert_eq!(seq.value_at(pattern, step), 0);
            }
        }
    }

    #[test]
    fn test_edit_targets_one_pattern_only() {
        let mut seq = StepSequencer::new();
        seq.apply_grid_event(2, 3, 5);
        assert_eq!(seq.value_at(2, 3), 5);
        assert_eq!(seq.value_at(0, 3), 0);
        assert_eq!(seq.value_at(1, 3), 0);
        assert_eq!(seq.value_at(3, 3), 0);
    }

    #[test]
    fn test_edit_is_not_retroactively_retargeted() {
        // A later selection change must not move an already-written cell;
        // the sequencer addresses cells by explicit pattern index.
        let mut seq = StepSequencer::new();
        seq.apply_grid_event(2, 3, 5);
        seq.apply_grid_event(6, 0, 1);
        assert_eq!(seq.value_at(2, 3), 5);
    }

    #[test]
    fn test_out_of_range_reads_are_zero() {
        let seq = StepSequencer::new();
        assert_eq!(seq.value_at(99, 0), 0);
        assert_eq!(seq.value_at(0, 99), 0);
    }

    #[test]
    fn test_out_of_range_writes_are_dropped() {
        let mut seq = StepSequencer::new();
        seq.apply_grid_event(99, 0, 3);
        seq.apply_grid_event(0, 99, 3);
        seq.apply_grid_event(0, 0, 99);
        for pattern in 0..PATTERN_COUNT {
            for step in 0..GRID_SIZE {
                assert_eq!(seq.value_at(pattern, step), 0);
            }
        }
    }

    #[test]
    fn test_clear_pattern_leaves_others_untouched() {
        let mut seq = StepSequencer::new();
        for step in 0..GRID_SIZE {
            seq.apply_grid_event(1, step, 4);
            seq.apply_grid_event(2, step, 6);
        }
        seq.clear_pattern(1);
        for step in 0..GRID_SIZE {
            assert_eq!(seq.value_at(1, step), 0);
            assert_eq!(seq.value_at(2, step), 6);
        }
        // Clearing out of range is a no-op, not a panic.
        seq.clear_pattern(99);
    }
}
