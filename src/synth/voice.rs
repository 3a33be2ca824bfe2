use crate::{
    dsp::{Envelope, Oscillator},
    io::converter::midi_note_to_freq,
    synth::params::SynthParams,
    MAX_BLOCK_SIZE,
};

/// A single note-producing unit: one oscillator shaped by one envelope.
///
/// Voices are allocated once when the pool is built and rebound to new notes
/// for their whole lifetime. The gain scratch buffer is preallocated so
/// rendering never allocates.
pub struct Voice {
    oscillator: Oscillator,
    envelope: Envelope,
    note: Option<u8>,
    /// MIDI velocity normalized into [0, 1].
    velocity: f32,
    active: bool,
    gain_buffer: Vec<f32>,
}

impl Voice {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            oscillator: Oscillator::new(sample_rate),
            envelope: Envelope::new(sample_rate),
            note: None,
            velocity: 0.0,
            active: false,
            gain_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    /// Bind this voice to a note: pitch from the equal-tempered mapping,
    /// waveform from the shared params, envelope retriggered from its
    /// current level.
    pub fn note_on(&mut self, note: u8, velocity: u8, params: &SynthParams) {
        self.note = Some(note);
        self.velocity = velocity as f32 / 127.0;
        self.oscillator.set_frequency(midi_note_to_freq(note));
        self.oscillator.set_waveform(params.waveform);
        self.envelope.note_on();
        self.active = true;
    }

    /// Release the envelope. The oscillator keeps running until the release
    /// ramp finishes.
    pub fn note_off(&mut self) {
        self.envelope.note_off();
    }

    /// The sole liveness query used for allocation and stealing decisions.
    pub fn is_active(&self) -> bool {
        self.active && self.envelope.is_active()
    }

    pub fn note(&self) -> Option<u8> {
        self.note
    }

    pub fn envelope_level(&self) -> f32 {
        self.envelope.level()
    }

    pub fn envelope_stage(&self) -> crate::dsp::EnvelopeStage {
        self.envelope.stage()
    }

    /// Render one mono block: oscillator output, multiplied element-wise by
    /// the envelope curve and the velocity scalar.
    pub fn render(&mut self, out: &mut [f32], params: &SynthParams) {
        if !self.active {
            out.fill(0.0);
            return;
        }

        // The waveform selector lives in the shared params, so sync it
        // before rendering. The oscillator's phase is untouched by this.
        self.oscillator.set_waveform(params.waveform);
        self.oscillator.render(out);

        let gains = &mut self.gain_buffer[..out.len()];
        self.envelope.render(gains, &params.envelope);

        for (sample, gain) in out.iter_mut().zip(gains.iter()) {
            *sample *= gain * self.velocity;
        }

        // Lazy deactivation: the flag is cleared when the finished envelope
        // is observed here, not at the instant it reached Idle.
        if !self.is_active() {
            self.active = false;
        }
    }
}
