//! Error types for kasa-core

use thiserror::Error;

/// Result type alias for kasa-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in kasa-core.
///
/// Almost nothing in the core itself errors: malformed input events are
/// dropped, out-of-range queries return neutral defaults, and feedback
/// emission degrades to a no-op when the transport is gone. What remains is
/// transport setup, which only the host ever sees.
#[derive(Debug, Error)]
pub enum Error {
    /// MIDI backend error
    #[error("MIDI error: {0}")]
    Midi(String),

    /// No MIDI port matched the requested name
    #[error("no MIDI port matching '{0}'")]
    PortNotFound(String),
}
