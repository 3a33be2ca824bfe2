//! Benchmarks for full voice-pool mixes.
//!
//! The interesting number is the 16-voice case: a saturated pool is the
//! worst block the audio callback can be asked for.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use subtone::synth::manager::VoiceManager;

use crate::BLOCK_SIZES;

pub fn bench_poly(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/poly");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for voices in [1usize, 4, 16] {
            let mut manager = VoiceManager::new(44_100.0, 16);
            manager.set_sustain(0.8);
            for i in 0..voices {
                // Spread a whole-tone cluster so every voice has its own pitch.
                manager.note_on(48 + 2 * i as u8, 100);
            }

            group.bench_with_input(
                BenchmarkId::new(format!("{voices}_voices"), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        manager.render_block(black_box(&mut buffer));
                    })
                },
            );
        }
    }

    group.finish();
}
