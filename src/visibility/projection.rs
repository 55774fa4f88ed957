//! Screen-space projection helpers

use std::f32::consts::PI;

use crate::core::types::{Mat4, Vec2, Vec3, Vec4};

/// `1` or `-1` carrying the sign bit of `x`, so `-0.0` maps to `-1`.
#[inline]
pub fn sign(x: f32) -> f32 {
    1f32.copysign(x)
}

/// A unit vector perpendicular to the unit vector `n` (Frisvad's construction).
pub fn arbitrary_orthonormal(n: Vec3) -> Vec3 {
    let s = sign(n.z);
    let a = -1.0 / (s + n.z);
    let b = n.x * n.y * a;
    Vec3::new(b, s + n.y * n.y * a, -n.y)
}

/// Normalized device coordinates of `position`.
pub fn pos_to_clip(view_projection: &Mat4, position: Vec3) -> Vec3 {
    let clip = *view_projection * Vec4::new(position.x, position.y, position.z, 1.0);
    // Keep points on the eye plane finite
    let w = if clip.w.abs() < 1e-6 { 1e-6f32.copysign(clip.w) } else { clip.w };
    clip.truncate() / w
}

/// Pixel offset of `position` from the screen centre.
pub fn pos_to_pixel(view_projection: &Mat4, render_size: Vec2, position: Vec3) -> Vec2 {
    let clip = pos_to_clip(view_projection, position);
    Vec2::new(clip.x, clip.y) * render_size * 0.5
}

/// Half-width of the tube surface facing the camera, in radians.
///
/// `to_camera` and `up` are unit vectors, `radius_slope` is the change of the
/// radius per unit length along the stem. A cone seen from its tip side shows
/// more of its surface than a cylinder.
pub fn opening_angle(to_camera: Vec3, up: Vec3, z: f32, radius_slope: f32) -> f32 {
    if z >= 0.95 {
        return PI;
    }
    let d = to_camera.dot(up);
    let tan_alpha = d / (1.0 - d * d).sqrt();
    let a = tan_alpha * radius_slope;
    if a.is_nan() || a < -1.0 {
        return PI;
    }
    a.min(1.0).acos().clamp(0.0, PI)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orthonormal_is_perpendicular() {
        let dirs = [
            Vec3::X,
            Vec3::Y,
            Vec3::Z,
            -Vec3::Z,
            Vec3::new(1.0, 2.0, -3.0).normalize(),
            Vec3::new(-0.3, 0.1, 0.9).normalize(),
        ];
        for n in dirs {
            let p = arbitrary_orthonormal(n);
            assert!(p.dot(n).abs() < 1e-5, "{n:?}");
            assert!((p.length() - 1.0).abs() < 1e-5, "{n:?}");
        }
    }

    #[test]
    fn test_pixel_of_screen_centre() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(60f32.to_radians(), 1.0, 0.1, 100.0);
        let vp = proj * view;
        let size = Vec2::new(800.0, 800.0);

        assert!(pos_to_pixel(&vp, size, Vec3::ZERO).length() < 1e-3);
        let right = pos_to_pixel(&vp, size, Vec3::X);
        assert!(right.x > 0.0 && right.y.abs() < 1e-3);
    }

    #[test]
    fn test_opening_angle() {
        assert_eq!(opening_angle(Vec3::X, Vec3::Y, 0.97, 0.0), PI);
        // Cylinder seen from the side shows half its surface
        let a = opening_angle(Vec3::X, Vec3::Y, 0.2, 0.0);
        assert!((a - PI * 0.5).abs() < 1e-6);
        // Steep view from above onto a widening stem
        let down = Vec3::new(0.0, -0.99, 0.141).normalize();
        assert_eq!(opening_angle(down, Vec3::Y, 0.2, 0.5), PI);
        // Degenerate view straight along the axis
        assert_eq!(opening_angle(Vec3::Y, Vec3::Y, 0.2, 0.0), PI);
    }
}
