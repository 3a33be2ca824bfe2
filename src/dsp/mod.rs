//! Low-level DSP primitives used by the voice layer.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside voice structs. They intentionally stay focused on the
//! signal-processing math so the synth layer can handle orchestration.

/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// Oscillator waveforms and phase bookkeeping.
pub mod oscillator;

pub use envelope::{Envelope, EnvelopeParams, EnvelopeStage};
pub use oscillator::{Oscillator, Waveform};
