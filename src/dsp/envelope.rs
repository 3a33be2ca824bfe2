use crate::MIN_TIME;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
ADSR Envelope Implementation
============================

A linear ADSR envelope generator: the per-sample gain curve that shapes a
voice's amplitude over its lifetime.

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release

Vocabulary
----------

  level     The envelope's current output value (0.0 to 1.0).

  stage     Which phase of the state machine we're in: Idle, Attack, Decay,
            Sustain, or Release.

  segment   A timed ramp (Attack, Decay, Release). Each segment has a sample
            budget of round(duration * sample_rate), clamped to at least 1
            sample so the ramp math never degenerates.

The State Machine
-----------------

  Idle    --note_on-->  Attack  --budget spent-->  Decay  --budget spent-->
  Sustain --note_off--> Release --budget spent-->  Idle

note_on is legal from EVERY stage and restarts the attack ramp FROM THE
CURRENT LEVEL, not from zero. Retriggering a note mid-release therefore
picks up where the amplitude already is instead of snapping to silence,
which is what keeps fast repeated notes click-free.

note_off is likewise legal from every stage, including Idle (the release
then just ramps 0 to 0 and completes).

Ramp arithmetic
---------------

Each segment snapshots its starting level on entry and interpolates toward
the target by elapsed/budget. The k-th sample of a segment is

    start + (target - start) * k / budget      (k = 1..=budget)

so the final sample of a segment lands on the target exactly, and splitting
a render across blocks of any size produces the identical sample stream.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,    // inactive, level = 0
    Attack,  // ramping from the trigger level up to 1.0
    Decay,   // ramping from 1.0 down to the sustain level
    Sustain, // holding until note_off
    Release, // ramping from the release level down to 0
}

/// The four timing/level knobs of the envelope.
///
/// One value of this struct is shared across the whole voice pool (owned by
/// the manager, threaded into every render call by reference), so a knob
/// change reaches every voice uniformly.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeParams {
    attack: f32,
    decay: f32,
    sustain: f32,
    release: f32,
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self {
            attack: 0.1,  // seconds
            decay: 0.1,   // seconds
            sustain: 0.7, // level (0-1)
            release: 0.2, // seconds
        }
    }
}

impl EnvelopeParams {
    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack: attack.max(MIN_TIME),
            decay: decay.max(MIN_TIME),
            sustain: sustain.clamp(0.0, 1.0),
            release: release.max(MIN_TIME),
        }
    }

    pub fn set_attack(&mut self, seconds: f32) {
        self.attack = seconds.max(MIN_TIME);
    }

    pub fn set_decay(&mut self, seconds: f32) {
        self.decay = seconds.max(MIN_TIME);
    }

    pub fn set_sustain(&mut self, level: f32) {
        self.sustain = level.clamp(0.0, 1.0);
    }

    pub fn set_release(&mut self, seconds: f32) {
        self.release = seconds.max(MIN_TIME);
    }

    pub fn attack(&self) -> f32 {
        self.attack
    }

    pub fn decay(&self) -> f32 {
        self.decay
    }

    pub fn sustain(&self) -> f32 {
        self.sustain
    }

    pub fn release(&self) -> f32 {
        self.release
    }
}

pub struct Envelope {
    sample_rate: f32,

    // Runtime state
    stage: EnvelopeStage,
    level: f32,

    // Segment bookkeeping: the level we entered the current segment at,
    // and how many of its samples we have consumed so far.
    segment_start_level: f32,
    elapsed: u32,
}

impl Envelope {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            stage: EnvelopeStage::Idle,
            level: 0.0,
            segment_start_level: 0.0,
            elapsed: 0,
        }
    }

    /// Gate high: restart the attack ramp from the current level.
    ///
    /// Deliberately does NOT zero the level. A retrigger mid-envelope ramps
    /// up from wherever the amplitude already is.
    pub fn note_on(&mut self) {
        self.stage = EnvelopeStage::Attack;
        self.segment_start_level = self.level;
        self.elapsed = 0;
    }

    /// Gate low: start the release ramp from the current level.
    ///
    /// Legal from every stage. From Idle the ramp runs 0 to 0 and completes
    /// after the usual release budget.
    pub fn note_off(&mut self) {
        self.stage = EnvelopeStage::Release;
        self.segment_start_level = self.level;
        self.elapsed = 0;
    }

    /// Fill the buffer with gain values, consuming segment budgets and
    /// advancing the state machine as they run out. Once the machine reaches
    /// Idle the remainder of the buffer is zero.
    pub fn render(&mut self, out: &mut [f32], params: &EnvelopeParams) {
        let mut filled = 0;

        while filled < out.len() {
            match self.stage {
                EnvelopeStage::Idle => {
                    out[filled..].fill(0.0);
                    self.level = 0.0;
                    return;
                }

                EnvelopeStage::Sustain => {
                    // Hold at the sustain level until the gate goes low.
                    // Read live so a knob change applies immediately.
                    self.level = params.sustain();
                    out[filled..].fill(self.level);
                    return;
                }

                EnvelopeStage::Attack => {
                    filled += self.ramp(
                        &mut out[filled..],
                        params.attack(),
                        1.0,
                        EnvelopeStage::Decay,
                    );
                }

                EnvelopeStage::Decay => {
                    filled += self.ramp(
                        &mut out[filled..],
                        params.decay(),
                        params.sustain(),
                        EnvelopeStage::Sustain,
                    );
                }

                EnvelopeStage::Release => {
                    filled += self.ramp(
                        &mut out[filled..],
                        params.release(),
                        0.0,
                        EnvelopeStage::Idle,
                    );
                }
            }
        }
    }

    /// Returns true if the envelope is producing output (not idle).
    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Idle
    }

    /// Get the current envelope level (0.0 to 1.0)
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Get the current envelope stage
    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    /// Reset to idle state.
    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Idle;
        self.level = 0.0;
        self.segment_start_level = 0.0;
        self.elapsed = 0;
    }

    /// Fill as much of the buffer as the current segment has budget for,
    /// interpolating from the segment's start level to `target`. Advances to
    /// `next` once the budget is spent. Returns how many samples were written.
    fn ramp(
        &mut self,
        out: &mut [f32],
        duration: f32,
        target: f32,
        next: EnvelopeStage,
    ) -> usize {
        let budget = segment_samples(duration, self.sample_rate);
        let remaining = budget.saturating_sub(self.elapsed);
        let count = (remaining as usize).min(out.len());

        let start = self.segment_start_level;
        let span = target - start;
        for (i, sample) in out[..count].iter_mut().enumerate() {
            let progress = (self.elapsed + i as u32 + 1) as f32 / budget as f32;
            *sample = start + span * progress;
        }

        self.elapsed += count as u32;
        if count > 0 {
            self.level = out[count - 1];
        }

        if self.elapsed >= budget {
            self.stage = next;
            self.segment_start_level = self.level;
            self.elapsed = 0;
        }

        count
    }
}

/// Segment budget in samples: round(duration * sample_rate), at least 1.
#[inline]
fn segment_samples(duration: f32, sample_rate: f32) -> u32 {
    (duration * sample_rate).round().max(1.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 44_100.0;

    fn render(env: &mut Envelope, params: &EnvelopeParams, samples: usize) -> Vec<f32> {
        let mut buffer = vec![0.0f32; samples];
        env.render(&mut buffer, params);
        buffer
    }

    #[test]
    fn attack_peaks_in_exact_sample_count() {
        let params = EnvelopeParams::adsr(0.1, 0.1, 0.7, 0.2);
        let mut env = Envelope::new(SAMPLE_RATE);
        env.note_on();

        // round(0.1 * 44100) = 4410 samples to the peak
        let curve = render(&mut env, &params, 4410);

        assert_eq!(curve[4409], 1.0, "attack must land on 1.0 exactly");
        assert!(
            curve.windows(2).all(|w| w[1] >= w[0]),
            "attack must be monotonically non-decreasing"
        );
        assert_eq!(env.stage(), EnvelopeStage::Decay);
    }

    #[test]
    fn decay_settles_on_sustain_level() {
        let sustain = 0.6;
        let params = EnvelopeParams::adsr(0.01, 0.05, sustain, 0.2);
        let mut env = Envelope::new(SAMPLE_RATE);
        env.note_on();

        let attack_decay = ((0.01 + 0.05) * SAMPLE_RATE) as usize + 5;
        let curve = render(&mut env, &params, attack_decay);

        assert_eq!(env.stage(), EnvelopeStage::Sustain);
        assert!((env.level() - sustain).abs() < 1e-6);
        assert_eq!(*curve.last().unwrap(), sustain);
    }

    #[test]
    fn retrigger_ramps_from_current_level() {
        let params = EnvelopeParams::adsr(0.1, 0.1, 0.7, 0.5);
        let mut env = Envelope::new(SAMPLE_RATE);
        env.note_on();

        // Get partway up the attack, then release partway down.
        render(&mut env, &params, 2000);
        env.note_off();
        render(&mut env, &params, 1000);
        let level_before = env.level();
        assert!(level_before > 0.0);

        // Retrigger: the new attack must pick up from level_before.
        env.note_on();
        let curve = render(&mut env, &params, 100);
        assert!(
            curve[0] >= level_before,
            "retrigger must not drop below the level it interrupted ({} < {})",
            curve[0],
            level_before
        );
        assert!(curve.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn note_off_from_idle_completes_cleanly() {
        let release = 0.2;
        let params = EnvelopeParams::adsr(0.1, 0.1, 0.7, release);
        let mut env = Envelope::new(SAMPLE_RATE);

        env.note_off();
        assert_eq!(env.stage(), EnvelopeStage::Release);

        let budget = (release * SAMPLE_RATE).round() as usize;
        let curve = render(&mut env, &params, budget + 1);

        assert_eq!(env.stage(), EnvelopeStage::Idle);
        for &gain in &curve {
            assert!(gain.is_finite() && gain >= 0.0, "bad gain {gain}");
        }
    }

    #[test]
    fn release_during_attack_falls_from_current_level() {
        let params = EnvelopeParams::adsr(0.1, 0.1, 0.7, 0.05);
        let mut env = Envelope::new(SAMPLE_RATE);
        env.note_on();
        render(&mut env, &params, 2205); // halfway up the attack

        let level = env.level();
        env.note_off();
        let curve = render(&mut env, &params, 100);

        assert!(curve[0] <= level, "release must start at the current level");
        assert!(curve.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn block_size_does_not_change_the_curve() {
        let params = EnvelopeParams::adsr(0.011, 0.007, 0.4, 0.013);
        let total = 2048;

        let mut whole = Envelope::new(SAMPLE_RATE);
        whole.note_on();
        let reference = render(&mut whole, &params, total);

        let mut chunked = Envelope::new(SAMPLE_RATE);
        chunked.note_on();
        let mut stitched = Vec::with_capacity(total);
        while stitched.len() < total {
            let n = 17.min(total - stitched.len());
            stitched.extend(render(&mut chunked, &params, n));
        }

        assert_eq!(reference, stitched);
    }

    #[test]
    fn params_are_clamped() {
        let mut params = EnvelopeParams::default();
        params.set_attack(0.0);
        params.set_sustain(1.5);
        params.set_release(-3.0);

        assert!(params.attack() > 0.0);
        assert_eq!(params.sustain(), 1.0);
        assert!(params.release() > 0.0);
    }
}
