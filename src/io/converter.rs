use crate::{io::midi::MidiEvent, synth::message::SynthMessage};

/// Translate a raw MIDI event into a synth message.
///
/// The MIDI conventions the core must never see are applied here: events on
/// foreign channels are dropped, and a NoteOn with velocity 0 becomes a
/// NoteOff (running-status keyboards send those instead of real note-offs).
pub fn midi_to_synth(midi: MidiEvent, channel_filter: u8) -> Option<SynthMessage> {
    match midi {
        MidiEvent::NoteOn {
            channel,
            key,
            velocity,
        } if channel == channel_filter => {
            if velocity == 0 {
                Some(SynthMessage::NoteOff { note: key })
            } else {
                Some(SynthMessage::NoteOn {
                    note: key,
                    velocity,
                })
            }
        }
        MidiEvent::NoteOff { channel, key, .. } if channel == channel_filter => {
            Some(SynthMessage::NoteOff { note: key })
        }
        MidiEvent::ControlChange {
            channel,
            controller,
            value,
        } if channel == channel_filter => Some(SynthMessage::ControlChange { controller, value }),
        _ => None,
    }
}

/// Convert MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69, equal temperament.
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}
