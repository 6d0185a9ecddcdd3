//! Fixed control-surface channel layout.
//!
//! kasa assumes one surface layout (the 8x8 pad grid family): pads on
//! channels 0-63 row-major, nine fader buttons, eight pattern-select side
//! buttons, and nine faders on continuous-change channels. The mapping from
//! channel id to semantic role is a data-driven range table consulted by a
//! single classify function; there is no per-control dispatch hierarchy.
//!
//! Vendor-specific channels outside these ranges classify to `None` and are
//! dropped by the decoder.

use crate::events::EventKind;

/// Pads per grid side; also the number of steps per pattern and the number
/// of selectable rows per step.
pub const GRID_SIZE: usize = 8;

/// Number of independent patterns.
pub const PATTERN_COUNT: usize = 8;

/// Number of faders and fader buttons.
pub const FADER_COUNT: usize = 9;

/// Index of the reserved "clear" fader and its button. On the wire it
/// behaves like the other eight; hosts must not route it to visual
/// parameters.
pub const CLEAR_FADER: usize = 8;

const GRID_FIRST: u8 = 0;
const GRID_LAST: u8 = 63;
const FADER_BUTTON_FIRST: u8 = 100;
const FADER_BUTTON_LAST: u8 = 108;
const PATTERN_SELECT_FIRST: u8 = 112;
const PATTERN_SELECT_LAST: u8 = 119;
const FADER_FIRST: u8 = 48;
const FADER_LAST: u8 = 56;

/// Semantic role of a control-surface channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRole {
    /// One grid pad: `row` is the stored intensity level, `col` the step.
    GridPad { row: u8, col: u8 },
    /// One of the nine fader toggle buttons.
    FaderButton(usize),
    /// One of the eight pattern-select side buttons.
    PatternSelect(usize),
    /// One of the nine continuous faders.
    Fader(usize),
}

#[derive(Debug, Clone, Copy)]
enum RoleKind {
    GridPad,
    FaderButton,
    PatternSelect,
    Fader,
}

struct ChannelRange {
    first: u8,
    last: u8,
    /// Whether this range is addressed by continuous-change events rather
    /// than button events.
    continuous: bool,
    kind: RoleKind,
}

/// Channel-range to role table. Button and continuous id spaces overlap on
/// real hardware, so the event kind takes part in the lookup.
const CHANNEL_MAP: &[ChannelRange] = &[
    ChannelRange {
        first: GRID_FIRST,
        last: GRID_LAST,
        continuous: false,
        kind: RoleKind::GridPad,
    },
    ChannelRange {
        first: FADER_BUTTON_FIRST,
        last: FADER_BUTTON_LAST,
        continuous: false,
        kind: RoleKind::FaderButton,
    },
    ChannelRange {
        first: PATTERN_SELECT_FIRST,
        last: PATTERN_SELECT_LAST,
        continuous: false,
        kind: RoleKind::PatternSelect,
    },
    ChannelRange {
        first: FADER_FIRST,
        last: FADER_LAST,
        continuous: true,
        kind: RoleKind::Fader,
    },
];

/// Look up the semantic role of a channel for a given event kind.
///
/// Returns `None` for unmapped channels; the decoder drops those silently.
pub fn classify(kind: EventKind, channel: u8) -> Option<ControlRole> {
    let continuous = kind == EventKind::Continuous;
    let range = CHANNEL_MAP
        .iter()
        .find(|r| r.continuous == continuous && (r.first..=r.last).contains(&channel))?;
    let offset = channel - range.first;
    Some(match range.kind {
        RoleKind::GridPad => ControlRole::GridPad {
            row: offset / GRID_SIZE as u8,
            col: offset % GRID_SIZE as u8,
        },
        RoleKind::FaderButton => ControlRole::FaderButton(offset as usize),
        RoleKind::PatternSelect => ControlRole::PatternSelect(offset as usize),
        RoleKind::Fader => ControlRole::Fader(offset as usize),
    })
}

/// Channel id of a grid pad, row-major.
pub fn grid_channel(row: u8, col: u8) -> u8 {
    row * GRID_SIZE as u8 + col
}

/// Channel id of a pattern-select indicator.
pub fn pattern_select_channel(pattern: usize) -> u8 {
    PATTERN_SELECT_FIRST + pattern as u8
}

/// Channel id of a fader-button indicator.
pub fn fader_button_channel(index: usize) -> u8 {
    FADER_BUTTON_FIRST + index as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_grid_pads_row_major() {
        assert_eq!(
            classify(EventKind::ButtonDown, 0),
            Some(ControlRole::GridPad { row: 0, col: 0 })
        );
        assert_eq!(
            classify(EventKind::ButtonDown, 27),
            Some(ControlRole::GridPad { row: 3, col: 3 })
        );
        assert_eq!(
            classify(EventKind::ButtonUp, 63),
            Some(ControlRole::GridPad { row: 7, col: 7 })
        );
    }

    #[test]
    fn test_classify_fader_buttons_including_ninth() {
        assert_eq!(
            classify(EventKind::ButtonDown, 100),
            Some(ControlRole::FaderButton(0))
        );
        assert_eq!(
            classify(EventKind::ButtonDown, 108),
            Some(ControlRole::FaderButton(CLEAR_FADER))
        );
    }

    #[test]
    fn test_classify_pattern_select() {
        assert_eq!(
            classify(EventKind::ButtonDown, 112),
            Some(ControlRole::PatternSelect(0))
        );
        assert_eq!(
            classify(EventKind::ButtonDown, 119),
            Some(ControlRole::PatternSelect(7))
        );
    }

    #[test]
    fn test_classify_faders_are_continuous_only() {
        assert_eq!(
            classify(EventKind::Continuous, 48),
            Some(ControlRole::Fader(0))
        );
        assert_eq!(
            classify(EventKind::Continuous, 56),
            Some(ControlRole::Fader(CLEAR_FADER))
        );
        // A button event on a fader channel is a grid pad by id, not a fader.
        assert_eq!(
            classify(EventKind::ButtonDown, 48),
            Some(ControlRole::GridPad { row: 6, col: 0 })
        );
    }

    #[test]
    fn test_classify_unknown_channels() {
        assert_eq!(classify(EventKind::ButtonDown, 64), None);
        assert_eq!(classify(EventKind::ButtonDown, 99), None);
        assert_eq!(classify(EventKind::ButtonDown, 127), None);
        assert_eq!(classify(EventKind::Continuous, 0), None);
        assert_eq!(classify(EventKind::Continuous, 57), None);
    }

    #[test]
    fn test_indicator_channels_round_trip() {
        assert_eq!(grid_channel(3, 5), 29);
        assert_eq!(
            classify(EventKind::ButtonDown, grid_channel(3, 5)),
            Some(ControlRole::GridPad { row: 3, col: 5 })
        );
        assert_eq!(pattern_select_channel(7), 119);
        assert_eq!(fader_button_channel(8), 108);
    }
}
