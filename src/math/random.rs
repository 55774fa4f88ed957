//! Deterministic hashing and pseudo-random values
//!
//! Every random decision in tree generation is a pure function of integer
//! inputs (seed, step, clone index, a purpose tag), so the same tree is
//! produced regardless of how work is scheduled. The bit pattern is part of
//! the output contract: changing it changes every generated tree, so any
//! change must bump [`HASH_VERSION`].

/// Version of the hash scheme below.
pub const HASH_VERSION: u32 = 1;

const HASH_BASIS: u32 = 0x811c_9dc5;

/// Avalanche finalizer (two xor-shift-multiply rounds).
#[inline]
fn finalize(mut h: u32) -> u32 {
    h = ((h >> 16) ^ h).wrapping_mul(0x045d_9f3b);
    h = ((h >> 16) ^ h).wrapping_mul(0x045d_9f3b);
    (h >> 16) ^ h
}

/// Combine a seed with another value into a new well-mixed seed.
#[inline]
pub fn combine_seed(seed: u32, value: u32) -> u32 {
    let mixed = seed
        ^ value
            .wrapping_add(0x9e37_79b9)
            .wrapping_add(seed << 6)
            .wrapping_add(seed >> 2);
    finalize(mixed)
}

/// Hash an ordered list of values.
#[inline]
pub fn hash(values: &[u32]) -> u32 {
    values.iter().fold(HASH_BASIS, |h, &v| combine_seed(h, v))
}

/// Uniform value in `[0, 1)` derived from `values`.
#[inline]
pub fn random(values: &[u32]) -> f32 {
    // 24 bits fit the f32 mantissa exactly
    (hash(values) >> 8) as f32 * (1.0 / 16_777_216.0)
}

/// Uniform value in `[-1, 1)` derived from `values`.
#[inline]
pub fn signed_random(values: &[u32]) -> f32 {
    random(values) * 2.0 - 1.0
}
