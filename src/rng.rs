// src/rng.rs
//! Random Number Generation for Monte Carlo Simulations
//!
//! # Design Philosophy
//!
//! Monte Carlo pricing requires random numbers with specific properties:
//! 1. **Reproducibility**: Same seed → same price (critical for debugging/validation)
//! 2. **Parallel safety**: Different paths must have independent streams
//! 3. **Performance**: Fast generation for millions of paths
//! 4. **Statistical quality**: Good distributional properties
//!
//! # Stream/Path Seeding
//!
//! Every pricing call consumes one *stream* from the owning context. The
//! stream index is mixed with the base seed through a splitmix64-style
//! finalizer, and each path derives its own generator from the mixed value:
//! ```text
//! stream_seed = mix(base_seed, stream)
//! path_rng(k) = StdRng::seed_from_u64(stream_seed + k)
//! ```
//! The mapping is stateless per path, so the reported price is identical
//! for any thread count, and sequential pricing calls on one context see
//! fresh randomness.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

/// Mix a base seed and a stream index into a single 64-bit seed.
///
/// Splitmix64-style finalizer:
/// ```text
/// z = seed ⊕ (stream · 0x9e3779b97f4a7c15)
/// z = (z ⊕ (z >> 30)) * 0xbf58476d1ce4e5b9
/// z = (z ⊕ (z >> 27)) * 0x94d049bb133111eb
/// output = z ⊕ (z >> 31)
/// ```
pub fn mix_stream(seed: u64, stream: u64) -> u64 {
    let mut z = seed ^ stream.wrapping_mul(0x9e3779b97f4a7c15u64);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9u64);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111ebu64);
    z ^ (z >> 31)
}

/// Create the generator for one path of a pricing call.
pub fn path_rng(stream_seed: u64, path_id: u64) -> StdRng {
    StdRng::seed_from_u64(stream_seed.wrapping_add(path_id))
}

/// Standard normal draw, Z ~ N(0,1)
pub fn get_normal_draw<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    StandardNormal.sample(rng)
}

/// Uniform draw on (0,1)
pub fn get_uniform_draw<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // gen::<f64>() yields [0,1); nudge zero off the boundary
    let u: f64 = rng.gen();
    if u == 0.0 {
        f64::MIN_POSITIVE
    } else {
        u
    }
}
