//! MIDI transport for the control surface (native only).
//!
//! [`MidiSurface`] owns the midir input and output connections for one
//! device. Inbound bytes are parsed into [`SurfaceEvent`]s on the driver
//! callback thread and pushed through a crossbeam channel; the engine
//! drains them at the start of each tick. Outbound LED messages go through
//! the [`FeedbackSink`] impl and are dropped silently if the output
//! connection is gone.
//!
//! The core never owns device lifecycle policy: the host decides which
//! port to attach and simply runs headless when none matches.

use crossbeam_channel::Sender;
use midir::{MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};

use crate::error::{Error, Result};
use crate::events::SurfaceEvent;
use crate::feedback::{FeedbackSink, LedMessage};

const CLIENT_NAME: &str = "kasa";

/// One connected control surface: event source plus feedback sink.
pub struct MidiSurface {
    // Dropping the connection closes the input stream.
    _input: MidiInputConnection<()>,
    output: Option<MidiOutputConnection>,
    port_name: String,
}

impl MidiSurface {
    /// Connect to the first input port whose name contains `port_match`
    /// (case-insensitive), and to the matching output port if one exists.
    ///
    /// A missing output port is not an error: the surface still delivers
    /// input and feedback degrades to a no-op.
    pub fn connect(port_match: &str, events: Sender<SurfaceEvent>) -> Result<Self> {
        let midi_in = MidiInput::new(CLIENT_NAME).map_err(|e| Error::Midi(e.to_string()))?;
        let (port, port_name) = find_port(&midi_in.ports(), &midi_in, port_match)?;
        log::info!("Attaching control surface '{}'", port_name);

        let input = midi_in
            .connect(
                &port,
                "kasa-input",
                move |_timestamp, bytes, _| {
                    if let Some(event) = SurfaceEvent::from_bytes(bytes) {
                        let _ = events.send(event);
                    }
                },
                (),
            )
            .map_err(|e| Error::Midi(e.to_string()))?;

        let output = connect_output(port_match);
        if output.is_none() {
            log::warn!("No output port matching '{}', LED feedback disabled", port_match);
        }

        Ok(Self {
            _input: input,
            output,
            port_name,
        })
    }

    /// Name of the attached input port.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl FeedbackSink for MidiSurface {
    fn send(&mut self, message: LedMessage) {
        if let Some(output) = self.output.as_mut() {
            if let Err(e) = output.send(&message.to_bytes()) {
                log::debug!("LED send failed: {}", e);
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.output.is_some()
    }
}

fn connect_output(port_match: &str) -> Option<MidiOutputConnection> {
    let midi_out = MidiOutput::new(CLIENT_NAME).ok()?;
    let (port, _) = find_port(&midi_out.ports(), &midi_out, port_match).ok()?;
    midi_out.connect(&port, "kasa-feedback").ok()
}

fn find_port<T: midir::MidiIO>(
    ports: &[T::Port],
    io: &T,
    port_match: &str,
) -> Result<(T::Port, String)>
where
    T::Port: Clone,
{
    let needle = port_match.to_lowercase();
    for port in ports {
        if let Ok(name) = io.port_name(port) {
            if name.to_lowercase().contains(&needle) {
                return Ok((port.clone(), name));
            }
        }
    }
    Err(Error::PortNotFound(port_match.to_string()))
}

/// List available MIDI input port names.
pub fn list_input_ports() -> Vec<String> {
    match MidiInput::new(CLIENT_NAME) {
        Ok(midi_in) => midi_in
            .ports()
            .iter()
            .filter_map(|p| midi_in.port_name(p).ok())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// List available MIDI output port names.
pub fn list_output_ports() -> Vec<String> {
    match MidiOutput::new(CLIENT_NAME) {
        Ok(midi_out) => midi_out
            .ports()
            .iter()
            .filter_map(|p| midi_out.port_name(p).ok())
            .collect(),
        Err(_) => Vec::new(),
    }
}
