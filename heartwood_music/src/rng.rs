// Seed resolution for the stochastic stages.
//
// An explicit seed gives a reproducible stream. Without one, the seed is
// drawn from the OS-seeded thread generator in `rand`; this is the only
// non-deterministic input anywhere in the pipeline. All actual draws still
// go through `HumanRng`.

use heartwood_prng::HumanRng;
use tracing::debug;

pub fn rng_for(seed: Option<u64>) -> HumanRng {
    HumanRng::new(seed.unwrap_or_else(entropy_seed))
}

fn entropy_seed() -> u64 {
    let seed = rand::random::<u64>();
    debug!(seed, "no seed given, drew one from OS entropy");
    seed
}
