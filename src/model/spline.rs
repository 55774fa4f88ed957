//! Stem centerline between two walker poses.
//!
//! A cubic Hermite (Catmull-Rom style) curve through the segment end points.
//! Tangents are the pose headings scaled by the chord length, so curvature
//! scales with the segment.

use crate::core::types::{Vec3, Vec4};

/// Hermite basis weights `(p0, m0, p1, m1)` at `t`.
pub fn catmull_rom_weights(t: f32) -> Vec4 {
    let t2 = t * t;
    let t3 = t2 * t;
    Vec4::new(
        2.0 * t3 - 3.0 * t2 + 1.0,
        t3 - 2.0 * t2 + t,
        -2.0 * t3 + 3.0 * t2,
        t3 - t2,
    )
}

/// Derivative of [`catmull_rom_weights`].
pub fn catmull_rom_weights_derivative(t: f32) -> Vec4 {
    let t2 = t * t;
    Vec4::new(
        6.0 * t2 - 6.0 * t,
        3.0 * t2 - 4.0 * t + 1.0,
        -6.0 * t2 + 6.0 * t,
        3.0 * t2 - 2.0 * t,
    )
}

fn combine(w: Vec4, from_pos: Vec3, from_z: Vec3, to_pos: Vec3, to_z: Vec3) -> Vec3 {
    let l = from_pos.distance(to_pos);
    from_pos * w.x + from_z * (l * w.y) + to_pos * w.z + to_z * (l * w.w)
}

/// Point on the stem centerline at `t` in `[0, 1]`.
pub fn stem_spline(from_pos: Vec3, from_z: Vec3, to_pos: Vec3, to_z: Vec3, t: f32) -> Vec3 {
    combine(catmull_rom_weights(t), from_pos, from_z, to_pos, to_z)
}

/// Tangent of the stem centerline at `t`.
pub fn stem_spline_derivative(
    from_pos: Vec3,
    from_z: Vec3,
    to_pos: Vec3,
    to_z: Vec3,
    t: f32,
) -> Vec3 {
    combine(catmull_rom_weights_derivative(t), from_pos, from_z, to_pos, to_z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_partition_of_unity_for_points() {
        for i in 0..=10 {
            let w = catmull_rom_weights(i as f32 / 10.0);
            assert!((w.x + w.z - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_spline_hits_end_points() {
        let from = Vec3::new(1.0, 0.0, 0.0);
        let to = Vec3::new(1.0, 2.0, 0.5);
        let heading = Vec3::Y;

        assert!((stem_spline(from, heading, to, heading, 0.0) - from).length() < 1e-6);
        assert!((stem_spline(from, heading, to, heading, 1.0) - to).length() < 1e-6);
    }

    #[test]
    fn test_straight_segment_is_linear() {
        let from = Vec3::ZERO;
        let to = Vec3::new(0.0, 4.0, 0.0);
        for i in 0..=8 {
            let t = i as f32 / 8.0;
            let p = stem_spline(from, Vec3::Y, to, Vec3::Y, t);
            assert!((p - Vec3::new(0.0, 4.0 * t, 0.0)).length() < 1e-5);
        }
    }

    #[test]
    fn test_derivative_matches_tangents() {
        let from = Vec3::ZERO;
        let to = Vec3::new(3.0, 0.0, 4.0);
        let from_z = Vec3::X;
        let to_z = Vec3::Z;

        let d0 = stem_spline_derivative(from, from_z, to, to_z, 0.0);
        let d1 = stem_spline_derivative(from, from_z, to, to_z, 1.0);
        assert!((d0 - from_z * 5.0).length() < 1e-5);
        assert!((d1 - to_z * 5.0).length() < 1e-5);
    }
}
