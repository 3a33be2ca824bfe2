// Purpose: Voice management, polyphony, MIDI-driven control
// This layer sits above the DSP primitives and manages multiple voices

pub mod manager;
pub mod message;
pub mod params;
pub mod poly;
pub mod voice;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fixed configuration supplied at construction. Neither value can change
/// at runtime.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct SynthConfig {
    pub sample_rate: f32,
    pub max_voices: usize,
    /// Preferred frame count per pull from the audio device.
    pub block_size: usize,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100.0,
            max_voices: 16,
            block_size: 1024,
        }
    }
}
