//! subtone - terminal polyphonic MIDI synthesizer
//!
//! Plays whatever arrives on the first MIDI input port; with no port
//! attached it performs a short built-in sequence instead.
//!
//! Run with: cargo run

mod app;

use app::Subtone;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init();

    Subtone::new().run()
}
