//! Audio output: pulls fixed-size blocks out of the synth and hands them to
//! the device, or discards them when no device exists.
//!
//! The synth renders mono; the adapter fans each frame out to every device
//! channel. Device absence is not an error: the null backend keeps pulling
//! blocks at the configured rate so voice and envelope state stay correct,
//! it just never delivers the samples anywhere.

use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::{
    io::IoError,
    synth::{message::MessageReceiver, poly::PolySynth, SynthConfig},
    MAX_BLOCK_SIZE,
};

pub struct AudioOutput {
    backend: Backend,
    /// Voice count of the most recently rendered block, for status display.
    active_voices: Arc<AtomicUsize>,
}

enum Backend {
    Device { _stream: cpal::Stream, name: String },
    Null(NullOutput),
}

impl AudioOutput {
    /// Start pulling blocks from the synth.
    ///
    /// A missing or unqueryable output device is not fatal: the null backend
    /// takes over and synthesis keeps running unheard. Errors are only
    /// returned for a device that was found but refused a stream.
    pub fn start<R>(synth: PolySynth<R>, config: SynthConfig) -> Result<Self, IoError>
    where
        R: MessageReceiver + Send + 'static,
    {
        let active_voices = Arc::new(AtomicUsize::new(0));

        let host = cpal::default_host();
        let device = host.default_output_device();
        let device_config = match &device {
            Some(device) => match device.default_output_config() {
                Ok(config) => Some(config),
                Err(err) => {
                    log::warn!("could not query output device config: {err}");
                    None
                }
            },
            None => None,
        };

        let backend = match (device, device_config) {
            (Some(device), Some(device_config)) => {
                Self::build_stream(device, device_config, synth, config, &active_voices)?
            }
            _ => {
                log::warn!("no usable audio output device, using null backend");
                Backend::Null(NullOutput::start(synth, config, Arc::clone(&active_voices)))
            }
        };

        Ok(Self {
            backend,
            active_voices,
        })
    }

    fn build_stream<R>(
        device: cpal::Device,
        device_config: cpal::SupportedStreamConfig,
        mut synth: PolySynth<R>,
        config: SynthConfig,
        active_voices: &Arc<AtomicUsize>,
    ) -> Result<Backend, IoError>
    where
        R: MessageReceiver + Send + 'static,
    {
        let channels = device_config.channels() as usize;
        let name = device.name().unwrap_or_else(|_| String::from("unknown"));

        // Keep the device's channel layout but force the synth's fixed
        // sample rate; pitch and envelope timing depend on it.
        let stream_config = cpal::StreamConfig {
            channels: device_config.channels(),
            sample_rate: cpal::SampleRate(config.sample_rate as u32),
            buffer_size: cpal::BufferSize::Default,
        };

        let counter = Arc::clone(active_voices);
        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device.build_output_stream(
            &stream_config,
            move |data: &mut [f32], _| {
                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let block = &mut render_buf[..frames];
                    synth.render_block(block);

                    // Fan mono out to every device channel.
                    let out_off = frames_written * channels;
                    for (i, &sample) in block.iter().enumerate() {
                        for ch in 0..channels {
                            data[out_off + i * channels + ch] = sample;
                        }
                    }

                    frames_written += frames;
                }

                counter.store(synth.manager().active_voices(), Ordering::Relaxed);
            },
            |err| log::error!("audio stream error: {err}"),
            None,
        )?;

        stream.play()?;

        log::info!("audio output on '{name}' ({channels} channels)");
        Ok(Backend::Device {
            _stream: stream,
            name,
        })
    }

    /// Voice count of the most recently rendered block.
    pub fn active_voices(&self) -> usize {
        self.active_voices.load(Ordering::Relaxed)
    }

    /// Name of the output device, or None when running on the null backend.
    pub fn device_name(&self) -> Option<&str> {
        match &self.backend {
            Backend::Device { name, .. } => Some(name),
            Backend::Null(_) => None,
        }
    }
}

/// Pulls blocks on a plain thread and discards them, pacing itself to the
/// nominal sample rate so envelopes advance in roughly real time.
struct NullOutput {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl NullOutput {
    fn start<R>(
        mut synth: PolySynth<R>,
        config: SynthConfig,
        active_voices: Arc<AtomicUsize>,
    ) -> Self
    where
        R: MessageReceiver + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            let frames = config.block_size.clamp(1, MAX_BLOCK_SIZE);
            let mut block = vec![0.0f32; frames];
            let period = Duration::from_secs_f32(frames as f32 / config.sample_rate);

            while !flag.load(Ordering::Relaxed) {
                synth.render_block(&mut block);
                active_voices.store(synth.manager().active_voices(), Ordering::Relaxed);
                thread::sleep(period);
            }
        });

        Self {
            stop,
            handle: Some(handle),
        }
    }
}

impl Drop for NullOutput {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
