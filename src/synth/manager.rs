use std::collections::VecDeque;

use crate::{
    synth::{params::SynthParams, voice::Voice},
    MAX_BLOCK_SIZE,
};

/*
Polyphonic Voice Management
===========================

The manager owns a fixed pool of voices and decides which voice plays which
note. The pool size is the maximum polyphony and never changes at runtime.

Allocation policy
-----------------

  note_on: scan the pool in its current order and bind the first voice whose
  envelope has gone idle. If every voice is sounding, steal the FRONT of the
  pool and rotate that slot to the BACK, so the ordering always lists voices
  oldest-allocation-first. Rotation happens only on a steal; binding a free
  voice leaves the order alone.

  This is round-robin stealing by allocation order, not a loudness- or
  velocity-aware policy. The deque IS the age record: pop front, push back,
  no timestamps needed.

  note_off: broadcast to every voice bound to the note. Duplicate bindings
  of one note can exist transiently (two quick note_ons before the first
  voice finishes), and all of them must release.

Mixing
------

Active voices are summed into the output block, then the sum is divided by
max(1, sqrt(active_count)). Square-root compensation keeps perceived
loudness roughly constant as polyphony grows. It is not a limiter: a pile of
full-velocity voices can still leave [-1, 1], and this layer does not clamp.
*/

pub struct VoiceManager {
    /// Ordered pool, oldest-allocated at the front. Fixed size.
    voices: VecDeque<Voice>,
    params: SynthParams,
    voice_buffer: Vec<f32>,
    last_active: usize,
}

impl VoiceManager {
    pub fn new(sample_rate: f32, max_voices: usize) -> Self {
        let voices = (0..max_voices.max(1))
            .map(|_| Voice::new(sample_rate))
            .collect();

        Self {
            voices,
            params: SynthParams::default(),
            voice_buffer: vec![0.0; MAX_BLOCK_SIZE],
            last_active: 0,
        }
    }

    /// Assign a free voice, or steal the oldest-allocated one.
    pub fn note_on(&mut self, note: u8, velocity: u8) {
        if let Some(idx) = self.voices.iter().position(|v| !v.is_active()) {
            self.voices[idx].note_on(note, velocity, &self.params);
            return;
        }

        // Pool exhausted: steal the front slot and rotate it to the back so
        // the next steal hits the now-oldest voice.
        if let Some(mut voice) = self.voices.pop_front() {
            voice.note_on(note, velocity, &self.params);
            self.voices.push_back(voice);
        }
    }

    /// Release every voice currently bound to the note.
    pub fn note_off(&mut self, note: u8) {
        for voice in self.voices.iter_mut() {
            if voice.note() == Some(note) {
                voice.note_off();
            }
        }
    }

    /// Release every sounding voice.
    pub fn all_notes_off(&mut self) {
        for voice in self.voices.iter_mut() {
            if voice.is_active() {
                voice.note_off();
            }
        }
    }

    /// Mix one mono block from all active voices, with square-root loudness
    /// compensation. Samples are nominally in [-1, 1] but are not clamped.
    pub fn render_block(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        let mut active = 0usize;

        // Destructure to allow simultaneous borrows of pool and params.
        let Self {
            voices,
            params,
            voice_buffer,
            ..
        } = self;

        for voice in voices.iter_mut() {
            if voice.is_active() {
                let block = &mut voice_buffer[..out.len()];
                block.fill(0.0);
                voice.render(block, params);

                for (mixed, &sample) in out.iter_mut().zip(block.iter()) {
                    *mixed += sample;
                }
                active += 1;
            }
        }

        if active > 0 {
            let norm = (active as f32).sqrt().max(1.0);
            for sample in out.iter_mut() {
                *sample /= norm;
            }
        }

        self.last_active = active;
    }

    // Broadcast parameter setters. They mutate the single shared params
    // value, so every voice in the pool, including inactive ones, inherits
    // the change.

    pub fn set_attack(&mut self, seconds: f32) {
        self.params.envelope.set_attack(seconds);
    }

    pub fn set_decay(&mut self, seconds: f32) {
        self.params.envelope.set_decay(seconds);
    }

    pub fn set_sustain(&mut self, level: f32) {
        self.params.envelope.set_sustain(level);
    }

    pub fn set_release(&mut self, seconds: f32) {
        self.params.envelope.set_release(seconds);
    }

    pub fn set_oscillator_type(&mut self, index: usize) {
        self.params.waveform = crate::dsp::Waveform::from_index(index);
    }

    pub fn params(&self) -> &SynthParams {
        &self.params
    }

    pub fn max_voices(&self) -> usize {
        self.voices.len()
    }

    /// Number of voices that were sounding during the last rendered block.
    pub fn active_voices(&self) -> usize {
        self.last_active
    }

    /// Notes currently bound to sounding voices, for status reporting.
    pub fn active_notes(&self) -> Vec<u8> {
        let mut notes: Vec<u8> = self
            .voices
            .iter()
            .filter(|v| v.is_active())
            .filter_map(|v| v.note())
            .collect();
        notes.sort_unstable();
        notes
    }
}
