// Purpose - external interfaces: MIDI acquisition, audio output, conversions

pub mod converter;
pub mod midi;
pub mod output;

use thiserror::Error;

/// Setup failures in the device adapters. The synthesis core itself has no
/// fallible operations; everything here is about the outside world.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to initialize MIDI input: {0}")]
    MidiInit(#[from] midir::InitError),

    #[error("failed to connect to MIDI port: {0}")]
    MidiConnect(String),

    #[error("no MIDI input port available")]
    NoMidiPort,

    #[error("failed to build audio stream: {0}")]
    StreamBuild(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    StreamPlay(#[from] cpal::PlayStreamError),
}
