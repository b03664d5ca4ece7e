//! Seeded pseudorandom streams
//!
//! Sequential runs draw everything from one `ChaCha8Rng` seeded once. Parallel runs give
//! every (season, day, trial) its own stream, derived from the run seed with a `SplitMix64`
//! finaliser, so results do not depend on how rayon splits the work.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// Single stream for a sequential run.
pub fn sequential_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Independent stream for one trial of one query day.
pub fn trial_rng(seed: u64, year: i32, julian_day: u16, trial: usize) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_seed(seed, year, julian_day, trial))
}

/// Mix the run seed with a trial's coordinates.
pub fn derive_seed(seed: u64, year: i32, julian_day: u16, trial: usize) -> u64 {
    let key = (u64::from(year as u32) << 32) | (u64::from(julian_day) << 16);
    let mut z = splitmix64(seed ^ key.wrapping_mul(GOLDEN_GAMMA));
    z ^= (trial as u64).wrapping_mul(GOLDEN_GAMMA);
    splitmix64(z)
}

fn splitmix64(value: u64) -> u64 {
    let mut z = value.wrapping_add(GOLDEN_GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
