//! Subtone - application builder and runner

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use rtrb::RingBuffer;
use std::{thread, time::Duration};

use subtone::{
    io::{
        midi::{self, MidiInputHandler},
        output::AudioOutput,
    },
    synth::{message::SynthMessage, poly::PolySynth, SynthConfig},
};

/// Capacity of the event queue between the MIDI thread and the audio
/// callback. Generous for hand-played input.
const MESSAGE_QUEUE_SIZE: usize = 256;

/// Main application builder
pub struct Subtone {
    config: SynthConfig,
    midi_channel: u8,
}

impl Subtone {
    pub fn new() -> Self {
        Self {
            config: SynthConfig::default(),
            midi_channel: 0,
        }
    }

    #[allow(dead_code)]
    pub fn sample_rate(mut self, hz: f32) -> Self {
        self.config.sample_rate = hz;
        self
    }

    #[allow(dead_code)]
    pub fn voices(mut self, max_voices: usize) -> Self {
        self.config.max_voices = max_voices;
        self
    }

    #[allow(dead_code)]
    pub fn midi_channel(mut self, channel: u8) -> Self {
        self.midi_channel = channel;
        self
    }

    /// Run the application (takes over, plays audio until interrupted)
    pub fn run(self) -> EyreResult<()> {
        let (tx, rx) = RingBuffer::<SynthMessage>::new(MESSAGE_QUEUE_SIZE);

        let synth = PolySynth::new(self.config, rx);
        let output =
            AudioOutput::start(synth, self.config).wrap_err("failed to start audio output")?;

        println!("=== subtone ===");
        println!("Sample rate: {} Hz", self.config.sample_rate);
        println!("Polyphony: {} voices", self.config.max_voices);
        match output.device_name() {
            Some(name) => println!("Output device: {name}"),
            None => println!("Output device: none (rendering silently)"),
        }

        // Live MIDI if a port exists, scripted demo otherwise. The port
        // check happens first because connecting consumes the producer.
        let _midi = if MidiInputHandler::ports_available() {
            let handler = MidiInputHandler::connect_default(tx, self.midi_channel)
                .wrap_err("failed to connect to MIDI input")?;
            println!("MIDI input: {}", handler.port_name());
            Some(handler)
        } else {
            println!("MIDI input: none, playing built-in demo sequence");
            thread::spawn(move || {
                let mut tx = tx;
                midi::demo_sequence(&mut tx);
            });
            None
        };

        println!("Playing... Press Ctrl+C to stop");
        println!();

        // Status loop: report voice activity as it changes.
        let mut last_active = usize::MAX;
        loop {
            let active = output.active_voices();
            if active != last_active {
                println!("Active voices: {active}");
                last_active = active;
            }
            thread::sleep(Duration::from_millis(100));
        }
    }
}

impl Default for Subtone {
    fn default() -> Self {
        Self::new()
    }
}
