use crate::synth::{
    manager::VoiceManager,
    message::{MessageReceiver, SynthMessage},
    SynthConfig,
};

/// Scaling applied to the 0-127 range of the envelope-time controllers:
/// full deflection means a two-second segment.
const CC_TIME_RANGE: f32 = 2.0;

// MIDI controller numbers understood by the control map.
const CC_ATTACK: u8 = 73;
const CC_DECAY: u8 = 74;
const CC_SUSTAIN: u8 = 75;
const CC_RELEASE: u8 = 76;
const CC_WAVEFORM: u8 = 77;
const CC_ALL_NOTES_OFF: u8 = 123;

/// Message-driven polyphonic synth.
///
/// Owns the voice manager plus the receiving end of the event queue. All
/// pending messages are drained at the top of [`render_block`], which is the
/// single serialization point between the event-producing thread and the
/// audio callback. The manager itself is never locked; exclusive access is
/// guaranteed by draining before rendering.
///
/// [`render_block`]: PolySynth::render_block
pub struct PolySynth<R: MessageReceiver> {
    manager: VoiceManager,
    rx: R,
}

impl<R: MessageReceiver> PolySynth<R> {
    pub fn new(config: SynthConfig, rx: R) -> Self {
        Self {
            manager: VoiceManager::new(config.sample_rate, config.max_voices),
            rx,
        }
    }

    /// Drain pending events, then mix one mono block.
    pub fn render_block(&mut self, out: &mut [f32]) {
        while let Some(msg) = self.rx.pop() {
            self.apply(msg);
        }
        self.manager.render_block(out);
    }

    fn apply(&mut self, msg: SynthMessage) {
        match msg {
            SynthMessage::NoteOn { note, velocity: 0 } => {
                // Tolerated for robustness; the converter normally translates
                // these before they reach the queue.
                self.manager.note_off(note);
            }
            SynthMessage::NoteOn { note, velocity } => {
                self.manager.note_on(note, velocity);
            }
            SynthMessage::NoteOff { note } => {
                self.manager.note_off(note);
            }
            SynthMessage::ControlChange { controller, value } => {
                self.control_change(controller, value);
            }
            SynthMessage::AllNotesOff => {
                self.manager.all_notes_off();
            }
        }
    }

    /// The control-change parameter map: CC 73-76 shape the envelope,
    /// CC 77 selects the waveform, CC 123 silences the pool.
    fn control_change(&mut self, controller: u8, value: u8) {
        let normalized = value as f32 / 127.0;
        match controller {
            CC_ATTACK => self.manager.set_attack(normalized * CC_TIME_RANGE),
            CC_DECAY => self.manager.set_decay(normalized * CC_TIME_RANGE),
            CC_SUSTAIN => self.manager.set_sustain(normalized),
            CC_RELEASE => self.manager.set_release(normalized * CC_TIME_RANGE),
            CC_WAVEFORM => {
                let index = ((normalized * 3.0) as usize).min(3);
                self.manager.set_oscillator_type(index);
            }
            CC_ALL_NOTES_OFF => self.manager.all_notes_off(),
            _ => {} // unknown controllers are ignored
        }
    }

    pub fn manager(&self) -> &VoiceManager {
        &self.manager
    }
}
