//! MIDI event decoding and input-port acquisition.
//!
//! Raw bytes arrive from a midir callback (or a test), get decoded into
//! [`MidiEvent`]s, and are translated into synth messages by
//! [`converter::midi_to_synth`] before being pushed onto the lock-free queue
//! the audio thread drains. When no hardware port exists, [`demo_sequence`]
//! stands in for a keyboard.
//!
//! [`converter::midi_to_synth`]: crate::io::converter::midi_to_synth

#[cfg(feature = "rtrb")]
use midir::{MidiInput, MidiInputConnection};

#[cfg(feature = "rtrb")]
use crate::io::{converter, IoError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
}

impl MidiEvent {
    /// Decode one channel-voice message. Statuses other than note-on,
    /// note-off, and control-change are ignored, as are truncated messages.
    pub fn parse(bytes: &[u8]) -> Option<MidiEvent> {
        let (&status, data) = bytes.split_first()?;
        let channel = status & 0x0F;

        match status & 0xF0 {
            0x80 => Some(MidiEvent::NoteOff {
                channel,
                key: *data.first()?,
                velocity: *data.get(1)?,
            }),
            0x90 => Some(MidiEvent::NoteOn {
                channel,
                key: *data.first()?,
                velocity: *data.get(1)?,
            }),
            0xB0 => Some(MidiEvent::ControlChange {
                channel,
                controller: *data.first()?,
                value: *data.get(1)?,
            }),
            _ => None,
        }
    }
}

/// Live MIDI input: owns the midir connection for its lifetime.
#[cfg(feature = "rtrb")]
pub struct MidiInputHandler {
    // Dropping the connection closes the port.
    _connection: MidiInputConnection<()>,
    port_name: String,
}

#[cfg(feature = "rtrb")]
impl MidiInputHandler {
    /// True if at least one MIDI input port can be opened. Callers use this
    /// to decide between live input and the scripted fallback BEFORE handing
    /// over the queue producer, because a midir connection consumes its
    /// callback and cannot return it on failure.
    pub fn ports_available() -> bool {
        MidiInput::new("subtone midi probe")
            .map(|midi_in| !midi_in.ports().is_empty())
            .unwrap_or(false)
    }

    /// Connect to the first available MIDI input port and forward its
    /// events onto the synth queue.
    pub fn connect_default(
        mut tx: rtrb::Producer<crate::synth::message::SynthMessage>,
        channel_filter: u8,
    ) -> Result<Self, IoError> {
        let midi_in = MidiInput::new("subtone midi input")?;

        let ports = midi_in.ports();
        let port = ports.first().ok_or(IoError::NoMidiPort)?;
        let port_name = midi_in
            .port_name(port)
            .unwrap_or_else(|_| String::from("unknown"));

        let connection = midi_in
            .connect(
                port,
                "subtone-read-input",
                move |_stamp, bytes, _| {
                    let Some(event) = MidiEvent::parse(bytes) else {
                        return;
                    };
                    log::debug!("midi event: {event:?}");
                    if let Some(msg) = converter::midi_to_synth(event, channel_filter) {
                        if tx.push(msg).is_err() {
                            log::warn!("synth queue full, dropping {msg:?}");
                        }
                    }
                },
                (),
            )
            .map_err(|err| IoError::MidiConnect(err.to_string()))?;

        log::info!("listening on MIDI port '{port_name}'");
        Ok(Self {
            _connection: connection,
            port_name,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

/// Scripted stand-in for a keyboard: an ascending C major arpeggio, half a
/// second per note. Blocks the calling thread while it plays.
#[cfg(feature = "rtrb")]
pub fn demo_sequence(tx: &mut rtrb::Producer<crate::synth::message::SynthMessage>) {
    use crate::synth::message::SynthMessage;
    use std::{thread, time::Duration};

    for note in [60u8, 64, 67, 72] {
        log::info!("demo: playing note {note}");
        let _ = tx.push(SynthMessage::NoteOn {
            note,
            velocity: 100,
        });
        thread::sleep(Duration::from_millis(500));
        let _ = tx.push(SynthMessage::NoteOff { note });
        thread::sleep(Duration::from_millis(100));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_note_on() {
        assert_eq!(
            MidiEvent::parse(&[0x90, 60, 100]),
            Some(MidiEvent::NoteOn {
                channel: 0,
                key: 60,
                velocity: 100
            })
        );
    }

    #[test]
    fn parses_note_off_with_channel() {
        assert_eq!(
            MidiEvent::parse(&[0x83, 64, 0]),
            Some(MidiEvent::NoteOff {
                channel: 3,
                key: 64,
                velocity: 0
            })
        );
    }

    #[test]
    fn parses_control_change() {
        assert_eq!(
            MidiEvent::parse(&[0xB0, 73, 127]),
            Some(MidiEvent::ControlChange {
                channel: 0,
                controller: 73,
                value: 127
            })
        );
    }

    #[test]
    fn ignores_unknown_status_and_truncated_messages() {
        assert_eq!(MidiEvent::parse(&[0xE0, 0, 64]), None); // pitch bend
        assert_eq!(MidiEvent::parse(&[0x90, 60]), None);
        assert_eq!(MidiEvent::parse(&[]), None);
    }
}
