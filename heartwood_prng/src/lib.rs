// Seeded, portable pseudo-random source for performance generation.
//
// xoshiro256++ (Blackman & Vigna, 2019) expanded from a single `u64` seed
// with SplitMix64. Uniform draws are integer-only; the Gaussian sampler on
// top uses Box–Muller with one pair of uniforms per sample and no cached
// spare, so the number of `next_u64` calls per sample is always two.
//
// `heartwood_music` threads one `HumanRng` through note assembly and groove
// humanization. Two generators built from the same seed yield identical
// streams, which is what makes a rendered performance reproducible.
//
// The integer core must stay free of floating point and of any outside
// entropy. Entropy seeding lives in the consumer, not here.

use serde::{Deserialize, Serialize};

/// xoshiro256++ state plus Gaussian helpers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanRng {
    s: [u64; 4],
}

impl HumanRng {
    /// Build a generator from a `u64` seed.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        let mut s = [0u64; 4];
        for word in &mut s {
            *word = splitmix64(&mut sm);
        }
        Self { s }
    }

    pub fn next_u64(&mut self) -> u64 {
        let [s0, s1, s2, s3] = &mut self.s;
        let result = s0.wrapping_add(*s3).rotate_left(23).wrapping_add(*s0);
        let t = *s1 << 17;

        *s2 ^= *s0;
        *s3 ^= *s1;
        *s1 ^= *s2;
        *s0 ^= *s3;
        *s2 ^= t;
        *s3 = s3.rotate_left(45);

        result
    }

    /// Uniform `f64` in [0, 1) from the top 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `[low, high)` by rejection sampling.
    ///
    /// Panics if `low >= high`.
    pub fn range_usize(&mut self, low: usize, high: usize) -> usize {
        assert!(low < high, "range_usize: low must be less than high");
        let span = (high - low) as u64;
        let threshold = span.wrapping_neg() % span;
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low + (r % span) as usize;
            }
        }
    }

    /// Pick a reference to one element of a non-empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.range_usize(0, items.len());
        items.get(idx)
    }

    /// Standard normal sample (mean 0, sigma 1) via Box–Muller.
    ///
    /// `u1` is mapped into (0, 1] so the logarithm is always finite.
    pub fn standard_normal(&mut self) -> f64 {
        let u1 = 1.0 - self.next_f64();
        let u2 = self.next_f64();
        (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }

    /// Normal sample with the given mean and standard deviation.
    ///
    /// Negative or non-finite sigmas are treated as zero, but the draw is
    /// still consumed so callers keep a stable stream position.
    pub fn gauss(&mut self, mean: f64, sigma: f64) -> f64 {
        let z = self.standard_normal();
        if sigma.is_finite() && sigma > 0.0 {
            mean + z * sigma
        } else {
            mean
        }
    }
}

/// SplitMix64 step, used only to expand the seed.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = HumanRng::new(7);
        let mut b = HumanRng::new(7);
        for _ in 0..1000 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn known_sequence_from_seed_zero() {
        // Pinned output. A change here changes every seeded performance.
        let mut rng = HumanRng::new(0);
        let vals: Vec<u64> = (0..4).map(|_| rng.next_u64()).collect();
        assert_eq!(
            vals,
            vec![
                0x5317_5d61_490b_23df,
                0x61da_6f3d_c380_d507,
                0x5c0f_df91_ec9a_7bfc,
                0x02ee_bf8c_3bbe_5e1a,
            ]
        );
        assert_eq!(HumanRng::new(0).next_f64(), 0.3245752680314067);
    }

    #[test]
    fn known_gauss_from_seed_42() {
        let v = HumanRng::new(42).gauss(90.0, 5.0);
        assert!((v - 86.15503473089497).abs() < 1e-9, "gauss drifted: {v}");
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = HumanRng::new(7);
        let mut b = HumanRng::new(8);
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn f64_in_unit_range() {
        let mut rng = HumanRng::new(12345);
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v), "f64 out of range: {v}");
        }
    }

    #[test]
    fn range_usize_within_bounds() {
        let mut rng = HumanRng::new(555);
        for _ in 0..10_000 {
            let v = rng.range_usize(5, 15);
            assert!((5..15).contains(&v), "range_usize out of range: {v}");
        }
    }

    #[test]
    fn choose_empty_is_none() {
        let mut rng = HumanRng::new(1);
        let empty: [u8; 0] = [];
        assert!(rng.choose(&empty).is_none());
        assert_eq!(rng.choose(&[42]), Some(&42));
    }

    #[test]
    fn gauss_moments_are_plausible() {
        let mut rng = HumanRng::new(2024);
        let n = 20_000;
        let samples: Vec<f64> = (0..n).map(|_| rng.gauss(90.0, 5.0)).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        assert!((mean - 90.0).abs() < 0.2, "mean drifted: {mean}");
        assert!((var.sqrt() - 5.0).abs() < 0.2, "sigma drifted: {}", var.sqrt());
    }

    #[test]
    fn gauss_samples_are_finite() {
        let mut rng = HumanRng::new(0);
        for _ in 0..10_000 {
            assert!(rng.standard_normal().is_finite());
        }
    }

    #[test]
    fn zero_sigma_returns_mean_but_advances() {
        let mut a = HumanRng::new(99);
        let mut b = HumanRng::new(99);
        assert_eq!(a.gauss(64.0, 0.0), 64.0);
        assert_eq!(a.gauss(64.0, f64::NAN), 64.0);
        b.next_u64();
        b.next_u64();
        b.next_u64();
        b.next_u64();
        assert_eq!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn serialization_roundtrip() {
        let mut rng = HumanRng::new(42);
        for _ in 0..100 {
            rng.next_u64();
        }
        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: HumanRng = serde_json::from_str(&json).unwrap();
        for _ in 0..100 {
            assert_eq!(rng.next_u64(), restored.next_u64());
        }
    }
}
