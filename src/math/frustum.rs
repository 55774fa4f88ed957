//! View frustum for culling

use crate::core::types::{Vec3, Vec4, Mat4};

/// A plane defined by normal and distance from origin
#[derive(Clone, Copy, Debug)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal, distance }
    }

    /// Plane through `point` facing along the unit vector `normal`.
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        Self { normal, distance: -normal.dot(point) }
    }

    /// Signed distance from point to plane (positive = in front)
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }
}

/// View frustum with 6 planes (Near, Far, Left, Right, Top, Bottom)
#[derive(Clone, Copy, Debug)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    pub const NEAR: usize = 0;
    pub const FAR: usize = 1;

    /// Extract frustum planes from view-projection matrix
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let m = vp.to_cols_array_2d();

        // Left: row3 + row0
        let left = Self::normalize_plane(Vec4::new(
            m[0][3] + m[0][0],
            m[1][3] + m[1][0],
            m[2][3] + m[2][0],
            m[3][3] + m[3][0],
        ));

        // Right: row3 - row0
        let right = Self::normalize_plane(Vec4::new(
            m[0][3] - m[0][0],
            m[1][3] - m[1][0],
            m[2][3] - m[2][0],
            m[3][3] - m[3][0],
        ));

        // Bottom: row3 + row1
        let bottom = Self::normalize_plane(Vec4::new(
            m[0][3] + m[0][1],
            m[1][3] + m[1][1],
            m[2][3] + m[2][1],
            m[3][3] + m[3][1],
        ));

        // Top: row3 - row1
        let top = Self::normalize_plane(Vec4::new(
            m[0][3] - m[0][1],
            m[1][3] - m[1][1],
            m[2][3] - m[2][1],
            m[3][3] - m[3][1],
        ));

        // Near: row3 + row2
        let near = Self::normalize_plane(Vec4::new(
            m[0][3] + m[0][2],
            m[1][3] + m[1][2],
            m[2][3] + m[2][2],
            m[3][3] + m[3][2],
        ));

        // Far: row3 - row2
        let far = Self::normalize_plane(Vec4::new(
            m[0][3] - m[0][2],
            m[1][3] - m[1][2],
            m[2][3] - m[2][2],
            m[3][3] - m[3][2],
        ));

        Self {
            planes: [near, far, left, right, top, bottom],
        }
    }

    fn normalize_plane(plane: Vec4) -> Plane {
        let normal = Vec3::new(plane.x, plane.y, plane.z);
        let len = normal.length();
        if len <= 0.0 {
            // Degenerate row: a plane that rejects nothing
            return Plane::new(Vec3::ZERO, 0.0);
        }
        Plane {
            normal: normal / len,
            distance: plane.w / len,
        }
    }

    /// Check if point is inside frustum
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|plane| plane.distance_to_point(point) >= 0.0)
    }

    /// Sphere test: visible unless it lies outside any plane by more than its radius.
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance_to_point(center) >= -radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perspective_frustum() -> Frustum {
        let proj = Mat4::perspective_rh(60f32.to_radians(), 1.0, 0.1, 100.0);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        Frustum::from_view_projection(&(proj * view))
    }

    #[test]
    fn test_plane_distance() {
        let plane = Plane::new(Vec3::Y, 0.0); // XZ plane
        assert_eq!(plane.distance_to_point(Vec3::new(0.0, 5.0, 0.0)), 5.0);
        assert_eq!(plane.distance_to_point(Vec3::new(0.0, -3.0, 0.0)), -3.0);
    }

    #[test]
    fn test_plane_from_point_normal() {
        let plane = Plane::from_point_normal(Vec3::new(0.0, 2.0, 0.0), Vec3::Y);
        assert!(plane.distance_to_point(Vec3::new(4.0, 2.0, -1.0)).abs() < 1e-6);
        assert!((plane.distance_to_point(Vec3::new(0.0, 5.0, 0.0)) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_frustum_contains_point() {
        // Simple orthographic-like projection for testing
        let proj = Mat4::orthographic_rh(-1.0, 1.0, -1.0, 1.0, 0.1, 100.0);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let frustum = Frustum::from_view_projection(&(proj * view));

        // Point at origin should be visible
        assert!(frustum.contains_point(Vec3::ZERO));
    }

    #[test]
    fn test_planes_are_unit_length() {
        let frustum = perspective_frustum();
        for plane in &frustum.planes {
            assert!((plane.normal.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_sphere_beyond_far_plane_is_outside() {
        let frustum = perspective_frustum();
        // Camera at z=5 looking down -Z, far plane at distance 100
        assert!(frustum.intersects_sphere(Vec3::new(0.0, 0.0, 5.0 - 50.0), 0.0));
        assert!(!frustum.intersects_sphere(Vec3::new(0.0, 0.0, 5.0 - 150.0), 0.0));
        // Large enough radius reaches back inside
        assert!(frustum.intersects_sphere(Vec3::new(0.0, 0.0, 5.0 - 150.0), 60.0));
    }

    #[test]
    fn test_sphere_outside_side_plane() {
        let frustum = perspective_frustum();
        assert!(!frustum.intersects_sphere(Vec3::new(50.0, 0.0, 0.0), 1.0));
        assert!(frustum.intersects_sphere(Vec3::new(2.0, 0.0, 0.0), 1.0));
    }
}
