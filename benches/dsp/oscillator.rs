//! Benchmarks for the waveform generators.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use subtone::dsp::{Oscillator, Waveform};

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for waveform in [
            Waveform::Sine,
            Waveform::Sawtooth,
            Waveform::Triangle,
            Waveform::Pulse,
        ] {
            let mut osc = Oscillator::new(44_100.0);
            osc.set_frequency(440.0);
            osc.set_waveform(waveform);

            group.bench_with_input(
                BenchmarkId::new(format!("{waveform:?}"), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        osc.render(black_box(&mut buffer));
                    })
                },
            );
        }
    }

    group.finish();
}
