use crate::dsp::{EnvelopeParams, Waveform};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The shared sound-design parameters for the whole voice pool.
///
/// Exactly one value of this struct exists per [`VoiceManager`], and voices
/// read it by reference on note-on and during every render. There is no
/// per-voice parameter override: a change here is heard by every sounding
/// voice on its next block and inherited by every future note-on.
///
/// [`VoiceManager`]: crate::synth::manager::VoiceManager
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct SynthParams {
    pub envelope: EnvelopeParams,
    pub waveform: Waveform,
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            envelope: EnvelopeParams::default(),
            waveform: Waveform::Sine,
        }
    }
}
