//! Quaternion helpers for stem walking
//!
//! A stem's orientation is a unit quaternion whose local +Z axis is the growth
//! direction. Composition uses the Hamilton product (`glam::Quat` `*`).

use crate::core::types::{Quat, Vec3};

/// Growth direction of an orientation (its rotated +Z axis).
#[inline]
pub fn heading(q: Quat) -> Vec3 {
    q * Vec3::Z
}

/// Rotated +X axis of an orientation.
#[inline]
pub fn right(q: Quat) -> Vec3 {
    q * Vec3::X
}

/// Rotation by `angle` radians around `axis` (normalized here).
#[inline]
pub fn axis_angle(axis: Vec3, angle: f32) -> Quat {
    Quat::from_axis_angle(axis.normalize(), angle)
}

#[inline]
pub fn rotate_x(angle: f32) -> Quat {
    Quat::from_rotation_x(angle)
}

#[inline]
pub fn rotate_y(angle: f32) -> Quat {
    Quat::from_rotation_y(angle)
}

#[inline]
pub fn rotate_z(angle: f32) -> Quat {
    Quat::from_rotation_z(angle)
}

/// Spherical interpolation along the arc from `a` to `b` as given.
///
/// Unlike [`Quat::slerp`] this does not flip `b` onto the shorter arc, so
/// interpolated frames stay on the same side as the walker produced them.
pub fn slerp(a: Quat, b: Quat, t: f32) -> Quat {
    let theta = a.dot(b).clamp(-1.0, 1.0).acos();
    if theta.abs() < 1e-5 {
        return a.lerp(b, t);
    }

    let wa = ((1.0 - t) * theta).sin();
    let wb = (t * theta).sin();
    (a * wa + b * wb) * (1.0 / theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_heading_of_identity_is_z() {
        assert_eq!(heading(Quat::IDENTITY), Vec3::Z);
    }

    #[test]
    fn test_rotate_x_turns_heading_up() {
        let up = heading(rotate_x(-FRAC_PI_2));
        assert!((up - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_composition_applies_local_rotation_last() {
        // Parent turns heading to +Y, local roll around Z keeps it there
        let q = rotate_x(-FRAC_PI_2) * rotate_z(1.0);
        assert!((heading(q) - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_slerp_endpoints_and_midpoint() {
        let a = Quat::IDENTITY;
        let b = rotate_y(FRAC_PI_2);

        assert!((slerp(a, b, 0.0).dot(a) - 1.0).abs() < 1e-5);
        assert!((slerp(a, b, 1.0).dot(b) - 1.0).abs() < 1e-5);

        let mid = slerp(a, b, 0.5);
        assert!((mid.length() - 1.0).abs() < 1e-5);
        let expected = rotate_y(FRAC_PI_2 * 0.5);
        assert!(mid.dot(expected).abs() > 0.99999);
    }

    #[test]
    fn test_slerp_of_identical_rotations() {
        let q = axis_angle(Vec3::new(1.0, 1.0, 0.0), 0.7);
        let r = slerp(q, q, 0.3);
        assert!((r.dot(q) - 1.0).abs() < 1e-5);
    }
}
