// Groove humanization: bounded random perturbation of a note sequence.
//
// Two dials drive it. Complexity (chaos) loosens timing and, above 0.8,
// starts dropping notes. Vulnerability lowers and destabilizes velocity.
//
// Per note, in order:
// 1. Dropout, only when complexity > 0.8: draw u in [0, 1), drop iff u > 0.8.
// 2. Timing: jitter = clamp(round(gauss(0, complexity * 20)), -40, 40),
//    start = max(0, start + jitter). Complexity exactly 0 skips the draw.
// 3. Velocity: target = (velocity + (90 - vulnerability * 30)) / 2,
//    velocity = clamp(round(gauss(target, 5 + vulnerability * 15)), 20, 120).
//
// The draw order is fixed, so the same seed and input always produce the
// same output. The input slice is never modified.

use crate::config::GrooveLimits;
use crate::note::NoteEvent;
use crate::rng::rng_for;
use heartwood_prng::HumanRng;
use tracing::debug;

/// Clamp to [0, 1], mapping NaN to 0.
pub fn clamp_unit(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

/// Humanizer for one complexity/vulnerability setting.
#[derive(Debug, Clone)]
pub struct GrooveHumanizer {
    complexity: f64,
    vulnerability: f64,
    limits: GrooveLimits,
}

impl GrooveHumanizer {
    /// Both dials are clamped to [0, 1].
    pub fn new(complexity: f64, vulnerability: f64, limits: GrooveLimits) -> Self {
        GrooveHumanizer {
            complexity: clamp_unit(complexity),
            vulnerability: clamp_unit(vulnerability),
            limits,
        }
    }

    pub fn complexity(&self) -> f64 {
        self.complexity
    }

    pub fn vulnerability(&self) -> f64 {
        self.vulnerability
    }

    fn timing_sigma(&self) -> f64 {
        self.complexity * self.limits.timing_sigma_scale
    }

    fn base_velocity(&self) -> f64 {
        self.limits.confident_velocity - self.vulnerability * self.limits.vulnerability_velocity_drop
    }

    fn velocity_sigma(&self) -> f64 {
        self.limits.velocity_sigma_base + self.vulnerability * self.limits.velocity_sigma_vulnerability
    }

    fn dropout_enabled(&self) -> bool {
        self.complexity > self.limits.dropout_complexity
    }

    /// Humanize `notes`, drawing from `rng`.
    pub fn apply(&self, notes: &[NoteEvent], rng: &mut HumanRng) -> Vec<NoteEvent> {
        let drift = self.limits.drift_limit as f64;
        let vel_min = self.limits.velocity_min;
        let vel_max = self.limits.velocity_max.max(vel_min);
        let dropout = self.dropout_enabled();
        let timing_sigma = self.timing_sigma();
        let base_velocity = self.base_velocity();
        let velocity_sigma = self.velocity_sigma();

        let mut out = Vec::with_capacity(notes.len());
        for note in notes {
            if dropout && rng.next_f64() > self.limits.dropout_draw {
                continue;
            }

            let start_tick = if self.complexity == 0.0 {
                note.start_tick
            } else {
                let jitter = rng.gauss(0.0, timing_sigma).round().clamp(-drift, drift) as i64;
                (note.start_tick as i64 + jitter).clamp(0, u32::MAX as i64) as u32
            };

            let target = (note.velocity as f64 + base_velocity) / 2.0;
            let velocity = rng
                .gauss(target, velocity_sigma)
                .round()
                .clamp(vel_min as f64, vel_max as f64) as u8;

            out.push(NoteEvent {
                start_tick,
                velocity,
                ..*note
            });
        }

        debug!(
            input = notes.len(),
            output = out.len(),
            complexity = self.complexity,
            vulnerability = self.vulnerability,
            "humanized notes"
        );
        out
    }
}

/// One-call humanization with default limits. `seed = None` draws a random seed.
pub fn humanize(
    notes: &[NoteEvent],
    complexity: f64,
    vulnerability: f64,
    seed: Option<u64>,
) -> Vec<NoteEvent> {
    let mut rng = rng_for(seed);
    GrooveHumanizer::new(complexity, vulnerability, GrooveLimits::default()).apply(notes, &mut rng)
}
