//! Mathematical utilities and data structures

pub mod frustum;
pub mod quat;
pub mod random;

pub use frustum::{Plane, Frustum};

/// Linearly remap `value` from `[s_min, s_max]` to `[d_min, d_max]`, clamped to the target range.
#[inline]
pub fn map_range(value: f32, s_min: f32, s_max: f32, d_min: f32, d_max: f32) -> f32 {
    let t = ((value - s_min) / (s_max - s_min)).clamp(0.0, 1.0);
    d_min + t * (d_max - d_min)
}

/// Clamp to `[0, 1]`.
#[inline]
pub fn saturate(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Round up to the next even integer.
#[inline]
pub fn round_up_multiple2(x: f32) -> u32 {
    ((x / 2.0).ceil() * 2.0).max(0.0) as u32
}

/// `1` if bit `bit` of `data` is set, `-1` otherwise.
#[inline]
pub fn bit_sign(data: u32, bit: u32) -> f32 {
    if data & (1 << bit) != 0 { 1.0 } else { -1.0 }
}

/// True if the sign bit of `x` is set (includes `-0.0`).
#[inline]
pub fn is_sign_bit_set(x: f32) -> bool {
    x.to_bits() & 0x8000_0000 != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_range_clamps() {
        assert_eq!(map_range(45.0, 30.0, 60.0, 1.0, 4.0), 2.5);
        assert_eq!(map_range(0.0, 30.0, 60.0, 1.0, 4.0), 1.0);
        assert_eq!(map_range(100.0, 30.0, 60.0, 1.0, 4.0), 4.0);
        // Reversed source range
        assert_eq!(map_range(1.0, 1.0, 0.95, 0.0, 1.0), 0.0);
        assert_eq!(map_range(0.9, 1.0, 0.95, 0.0, 1.0), 1.0);
    }

    #[test]
    fn test_round_up_multiple2() {
        assert_eq!(round_up_multiple2(2.0), 2);
        assert_eq!(round_up_multiple2(2.1), 4);
        assert_eq!(round_up_multiple2(3.0), 4);
        assert_eq!(round_up_multiple2(64.0), 64);
    }

    #[test]
    fn test_bit_helpers() {
        assert_eq!(bit_sign(0, 0), -1.0);
        assert_eq!(bit_sign(1, 0), 1.0);
        assert_eq!(bit_sign(2, 0), -1.0);
        assert!(is_sign_bit_set(-30.0));
        assert!(is_sign_bit_set(-0.0));
        assert!(!is_sign_bit_set(0.0));
    }
}
