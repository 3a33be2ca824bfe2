//! Benchmarks for the ADSR envelope generator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use subtone::dsp::{Envelope, EnvelopeParams};

use crate::BLOCK_SIZES;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let sample_rate = 44_100.0;

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase (ramping up)
        let params = EnvelopeParams::adsr(10.0, 0.1, 0.7, 0.3);
        let mut env = Envelope::new(sample_rate);
        env.note_on();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer), black_box(&params));
            })
        });

        // Sustain phase (holding steady)
        let params = EnvelopeParams::adsr(0.001, 0.001, 0.7, 0.3);
        let mut env = Envelope::new(sample_rate);
        env.note_on();
        // Advance past attack/decay
        let mut warmup = vec![0.0f32; 256];
        env.render(&mut warmup, &params);
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer), black_box(&params));
            })
        });

        // Release phase (ramping down)
        let params = EnvelopeParams::adsr(0.001, 0.001, 0.7, 10.0);
        let mut env = Envelope::new(sample_rate);
        env.note_on();
        env.render(&mut warmup, &params);
        env.note_off();
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer), black_box(&params));
            })
        });
    }

    group.finish();
}
