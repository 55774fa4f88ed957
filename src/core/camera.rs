//! Camera for visibility and LOD decisions
//!
//! Generation only reads a [`CameraState`] snapshot taken at the start of a
//! pass. [`Camera`] is a convenience producer for that snapshot.

use serde::{Deserialize, Serialize};

use crate::core::types::{Vec2, Vec3, Mat4, Quat};
use crate::math::frustum::{Frustum, Plane};

/// Camera with position, rotation, and projection parameters
#[derive(Clone, Debug)]
pub struct Camera {
    /// World position
    pub position: Vec3,
    /// Rotation as quaternion
    pub rotation: Quat,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
}

impl Camera {
    /// Create a new camera looking down -Z
    pub fn new(position: Vec3, fov_y_degrees: f32, aspect: f32) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            fov_y: fov_y_degrees.to_radians(),
            aspect,
            near: 0.1,
            far: 1000.0,
        }
    }

    /// Create camera looking at a target
    pub fn look_at(position: Vec3, target: Vec3, up: Vec3) -> Self {
        let forward = (target - position).normalize();
        let right = forward.cross(up).normalize();
        let up = right.cross(forward);

        let rotation = Quat::from_mat3(&glam::Mat3::from_cols(right, up, -forward));

        Self {
            position,
            rotation,
            ..Self::default()
        }
    }

    /// Camera circling `focus` at `distance`, angles in degrees.
    ///
    /// Yaw is measured in the XZ plane from +X towards +Z, pitch upwards from
    /// the horizon.
    pub fn orbit(focus: Vec3, yaw_degrees: f32, pitch_degrees: f32, distance: f32) -> Self {
        let yaw = yaw_degrees.to_radians();
        let pitch = pitch_degrees.to_radians().clamp(-1.55, 1.55);
        let dir = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos());
        Self::look_at(focus + dir * distance.max(1e-3), focus, Vec3::Y)
    }

    /// Get view matrix (world to camera space)
    pub fn view_matrix(&self) -> Mat4 {
        let rotation_matrix = Mat4::from_quat(self.rotation.conjugate());
        let translation_matrix = Mat4::from_translation(-self.position);
        rotation_matrix * translation_matrix
    }

    /// Get projection matrix (camera to clip space)
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Get combined view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Get forward direction (negative Z in camera space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Update aspect ratio from a render target size
    pub fn set_aspect(&mut self, width: f32, height: f32) {
        self.aspect = width / height;
    }

    /// Freeze the camera into the read-only state consumed by a generation pass.
    pub fn snapshot(&self, render_size: Vec2) -> CameraState {
        CameraState::new(self.position, self.forward(), self.view_projection(), render_size)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 5.0), 60.0, 16.0 / 9.0)
    }
}

/// Orbit camera settings stored in the generation config.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Degrees around the tree, from +X towards +Z.
    pub yaw: f32,
    /// Degrees above the horizon.
    pub pitch: f32,
    /// Distance from the focus point in world units.
    pub distance: f32,
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// Render target size in pixels.
    pub render_size: [f32; 2],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            yaw: 30.0,
            pitch: 10.0,
            distance: 20.0,
            fov_y: 60.0,
            near: 0.1,
            far: 1000.0,
            render_size: [1920.0, 1080.0],
        }
    }
}

impl CameraConfig {
    /// Build the orbit camera around `focus`.
    pub fn camera(&self, focus: Vec3) -> Camera {
        let mut camera = Camera::orbit(focus, self.yaw, self.pitch, self.distance);
        camera.fov_y = self.fov_y.to_radians();
        camera.near = self.near;
        camera.far = self.far;
        camera.set_aspect(self.render_size[0], self.render_size[1]);
        camera
    }

    pub fn render_size(&self) -> Vec2 {
        Vec2::from_array(self.render_size)
    }
}

/// Read-only camera snapshot: position, view-projection and frustum.
#[derive(Clone, Copy, Debug)]
pub struct CameraState {
    pub position: Vec3,
    pub view_projection: Mat4,
    pub frustum: Frustum,
    /// Render target size in pixels.
    pub render_size: Vec2,
}

impl CameraState {
    /// Build a snapshot from an externally supplied view-projection matrix.
    ///
    /// The near plane of the culling frustum passes through the eye, so geometry
    /// surrounding the camera is never culled by it.
    pub fn new(position: Vec3, forward: Vec3, view_projection: Mat4, render_size: Vec2) -> Self {
        let mut frustum = Frustum::from_view_projection(&view_projection);
        frustum.planes[Frustum::NEAR] = Plane::from_point_normal(position, forward.normalize());
        Self {
            position,
            view_projection,
            frustum,
            render_size,
        }
    }

    /// Distance from the camera to a world position.
    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.position.distance(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directions() {
        let camera = Camera::default();

        // Default camera looks down -Z
        let forward = camera.forward();
        assert!((forward.z - (-1.0)).abs() < 0.001);
    }

    #[test]
    fn test_view_matrix_translation() {
        let mut camera = Camera::default();
        camera.position = Vec3::new(10.0, 0.0, 0.0);

        let view = camera.view_matrix();
        // View matrix should translate world origin to (-10, 0, 0) in camera space
        let origin_in_camera = view.transform_point3(Vec3::ZERO);
        assert!((origin_in_camera.x - (-10.0)).abs() < 0.001);
    }

    #[test]
    fn test_orbit_looks_at_focus() {
        let focus = Vec3::new(0.0, 3.0, 0.0);
        let camera = Camera::orbit(focus, 45.0, 20.0, 12.0);

        assert!((camera.position.distance(focus) - 12.0).abs() < 1e-3);
        let to_focus = (focus - camera.position).normalize();
        assert!(camera.forward().dot(to_focus) > 0.999);
    }

    #[test]
    fn test_snapshot_contains_eye_and_focus() {
        let focus = Vec3::new(0.0, 3.0, 0.0);
        let state = CameraConfig::default().camera(focus).snapshot(Vec2::new(1920.0, 1080.0));

        assert!(state.frustum.intersects_sphere(state.position, 0.0));
        assert!(state.frustum.intersects_sphere(focus, 0.0));
    }
}
