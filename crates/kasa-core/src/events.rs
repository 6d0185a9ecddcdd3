//! Inbound wire events.
//!
//! The control surface delivers an ordered stream of discrete events, each a
//! `(kind, channel, value)` triple. [`SurfaceEvent::from_bytes`] parses the
//! raw transport bytes; anything outside the three modeled message types is
//! not an error, the device emits vendor-specific traffic the core simply
//! ignores.

/// Kind of a discrete surface event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A button or pad was pressed (note-on).
    ButtonDown,
    /// A button or pad was released (note-off).
    ButtonUp,
    /// A continuous control moved (control-change).
    Continuous,
}

/// One decoded event from the control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceEvent {
    pub kind: EventKind,
    /// Channel id; ranges partition into grid, buttons, and faders
    /// (see [`crate::layout`]).
    pub channel: u8,
    /// Raw value, 0..=127. Velocity for buttons, position for faders.
    pub value: u8,
}

impl SurfaceEvent {
    /// Create an event, masking the value into the 7-bit protocol range.
    pub fn new(kind: EventKind, channel: u8, value: u8) -> Self {
        Self {
            kind,
            channel,
            value: value & 0x7F,
        }
    }

    /// Parse raw MIDI bytes into a surface event.
    ///
    /// Note-on with velocity 0 is treated as a release, per the MIDI
    /// convention. Unknown or truncated messages yield `None`.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() {
            return None;
        }

        let msg_type = bytes[0] & 0xF0;
        match msg_type {
            0x90 if bytes.len() >= 3 => {
                let kind = if bytes[2] == 0 {
                    EventKind::ButtonUp
                } else {
                    EventKind::ButtonDown
                };
                Some(Self::new(kind, bytes[1], bytes[2]))
            }
            0x80 if bytes.len() >= 3 => Some(Self::new(EventKind::ButtonUp, bytes[1], 0)),
            0xB0 if bytes.len() >= 3 => Some(Self::new(EventKind::Continuous, bytes[1], bytes[2])),
            _ => None,
        }
    }

    /// The value as a normalized float in `[0, 1]`.
    pub fn normalized(&self) -> f32 {
        self.value as f32 / 127.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_button_down() {
        let event = SurfaceEvent::from_bytes(&[0x90, 27, 100]).unwrap();
        assert_eq!(event.kind, EventKind::ButtonDown);
        assert_eq!(event.channel, 27);
        assert_eq!(event.value, 100);
    }

    #[test]
    fn test_parse_button_up() {
        let event = SurfaceEvent::from_bytes(&[0x80, 27, 64]).unwrap();
        assert_eq!(event.kind, EventKind::ButtonUp);
        assert_eq!(event.value, 0);
    }

    #[test]
    fn test_parse_note_on_velocity_zero_is_release() {
        let event = SurfaceEvent::from_bytes(&[0x90, 12, 0]).unwrap();
        assert_eq!(event.kind, EventKind::ButtonUp);
    }

    #[test]
    fn test_parse_continuous_change() {
        let event = SurfaceEvent::from_bytes(&[0xB0, 48, 127]).unwrap();
        assert_eq!(event.kind, EventKind::Continuous);
        assert_eq!(event.channel, 48);
        assert!((event.normalized() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parse_ignores_channel_nibble() {
        let event = SurfaceEvent::from_bytes(&[0x96, 5, 3]).unwrap();
        assert_eq!(event.kind, EventKind::ButtonDown);
    }

    #[test]
    fn test_parse_unknown_and_truncated_messages() {
        assert!(SurfaceEvent::from_bytes(&[]).is_none());
        assert!(SurfaceEvent::from_bytes(&[0x90, 27]).is_none());
        assert!(SurfaceEvent::from_bytes(&[0xE0, 0x00, 0x40]).is_none());
        assert!(SurfaceEvent::from_bytes(&[0xF8]).is_none());
    }

    #[test]
    fn test_value_is_masked_to_seven_bits() {
        let event = SurfaceEvent::new(EventKind::Continuous, 48, 0xFF);
        assert_eq!(event.value, 0x7F);
    }
}
