//! Per-segment visibility and tessellation planning
//!
//! Every stem slice the walker emits is scored here before it is kept: tiny
//! slices are culled stochastically, slices outside the view frustum are
//! culled, and visible slices get ring point counts sized to a pixel budget.

pub mod partition;
pub mod projection;

use std::f32::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use crate::core::CameraState;
use crate::generation::records::{SegmentInfo, StemPose};
use crate::math::random::random;
use crate::species::TreeParameters;

pub use partition::{GroupOutput, RingCounts, group_output};
use partition::{MAX_POINTS_U, MAX_POINTS_V, MIN_POINTS};
use projection::{arbitrary_orthonormal, opening_angle, pos_to_pixel};

/// Projected diameter below which slices start to be culled at random.
const MIN_BRANCH_PIXEL_RADIUS: f32 = 1.0;

/// Hash tag of the contribution culling decision.
const CONTRIBUTION_CULL_TAG: u32 = 1337;

/// Height step of the numeric radius derivative.
const RADIUS_SLOPE_STEP: f32 = 0.01;

/// Tessellation of one stem slice. A `thread_group_count` of 0 means culled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TessellationPlan {
    pub thread_group_count: u32,
    /// Points on the bottom ring.
    pub from_points: f32,
    /// Points on the top ring.
    pub to_points: f32,
    /// Rings along the slice.
    pub v_points: f32,
    /// Bands each dispatch group owns.
    pub face_rings_per_group: u32,
    pub from_opening_angle: f32,
    pub to_opening_angle: f32,
}

impl TessellationPlan {
    pub fn is_visible(&self) -> bool {
        self.thread_group_count > 0
    }

    /// Even point counts the mesh stage works with.
    pub fn ring_counts(&self) -> RingCounts {
        RingCounts::new(self.from_points, self.to_points, self.v_points)
    }

    /// Output sizes and offsets of dispatch group `group`.
    pub fn group_output(&self, group: u32) -> Option<GroupOutput> {
        if group >= self.thread_group_count {
            return None;
        }
        Some(group_output(
            &self.ring_counts(),
            self.face_rings_per_group,
            group,
            self.thread_group_count,
        ))
    }
}

/// Scores stem slices against a camera snapshot.
pub struct TessellationPlanner<'a> {
    camera: &'a CameraState,
    params: &'a TreeParameters,
}

impl<'a> TessellationPlanner<'a> {
    pub fn new(camera: &'a CameraState, params: &'a TreeParameters) -> Self {
        Self { camera, params }
    }

    pub fn camera(&self) -> &CameraState {
        self.camera
    }

    /// Plan the slice `info` bounded by `from` and `to`, with triangle edges of
    /// about `pixels_per_triangle` pixels.
    pub fn plan(
        &self,
        info: &SegmentInfo,
        from: &StemPose,
        to: &StemPose,
        pixels_per_triangle: f32,
    ) -> TessellationPlan {
        let camera = self.camera;
        let vp = &camera.view_projection;
        let size = camera.render_size;

        let from_to_camera = (camera.position - from.position).normalize_or_zero();
        let to_to_camera = (camera.position - to.position).normalize_or_zero();

        let from_perp = arbitrary_orthonormal(from_to_camera).normalize_or_zero();
        let to_perp = arbitrary_orthonormal(to_to_camera).normalize_or_zero();

        let from_pixel = pos_to_pixel(vp, size, from.position);
        let to_pixel = pos_to_pixel(vp, size, to.position);

        let from_z = info.from_z();
        let to_z = info.to_z();

        let from_radius = info.tapered_radius(self.params, from_z);
        let to_radius = info.tapered_radius(self.params, to_z);

        let from_pixel_b = pos_to_pixel(vp, size, from.position + from_perp * from_radius);
        let to_pixel_b = pos_to_pixel(vp, size, to.position + to_perp * to_radius);

        let from_diameter = 2.0 * from_pixel.distance(from_pixel_b);
        let to_diameter = 2.0 * to_pixel.distance(to_pixel_b);
        let length_pixels = from_pixel.distance(to_pixel);

        // Small contribution culling, randomized so slices fade instead of popping
        let [a, b, c] = info.pack();
        let threshold = MIN_BRANCH_PIXEL_RADIUS * random(&[a, b, c, CONTRIBUTION_CULL_TAG]);
        let draw = from_diameter.max(to_diameter) > threshold;

        let center = (from.position + to.position) * 0.5;
        let half_length = from.position.distance(to.position) * 0.5;
        let max_radius = from_radius.max(to_radius);
        let bounding_radius = (max_radius * max_radius + half_length * half_length).sqrt();
        let in_frustum = camera.frustum.intersects_sphere(center, bounding_radius);

        if !draw || !in_frustum {
            return TessellationPlan::default();
        }

        let from_slope = self.radius_slope(info, from_z, from_radius);
        let to_slope = self.radius_slope(info, to_z, to_radius);

        let from_angle = opening_angle(from_to_camera, from.heading(), from_z, from_slope);
        let to_angle = opening_angle(to_to_camera, to.heading(), to_z, to_slope);

        // `max`/`min` rather than `clamp` so a NaN falls back to the minimum
        let points =
            |pixels: f32, max: f32| (pixels / pixels_per_triangle).max(MIN_POINTS).min(max);
        let from_points = points(from_angle * from_diameter, MAX_POINTS_U);
        let to_points = points(to_angle * to_diameter, MAX_POINTS_U);
        let v_points = points(length_pixels, MAX_POINTS_V);

        let counts = RingCounts::new(from_points, to_points, v_points);
        let face_rings_per_group = counts.face_rings_per_group();

        TessellationPlan {
            thread_group_count: counts.group_count(face_rings_per_group),
            from_points,
            to_points,
            v_points,
            face_rings_per_group,
            from_opening_angle: if counts.from < 5 { FRAC_PI_2 } else { from_angle },
            to_opening_angle: if counts.to < 5 { FRAC_PI_2 } else { to_angle },
        }
    }

    fn radius_slope(&self, info: &SegmentInfo, z: f32, radius: f32) -> f32 {
        if info.length <= 0.0 {
            return 0.0;
        }
        let next = info.tapered_radius(self.params, z + RADIUS_SLOPE_STEP);
        (next - radius) / (RADIUS_SLOPE_STEP * info.length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;
    use crate::core::camera::CameraConfig;
    use crate::core::types::{Quat, Vec3};
    use crate::generation::records::BranchTask;

    fn camera() -> CameraState {
        let config = CameraConfig::default();
        config.camera(Vec3::new(0.0, 2.0, 0.0)).snapshot(config.render_size())
    }

    fn upright(position: Vec3) -> StemPose {
        StemPose::new(position, BranchTask::upright())
    }

    #[test]
    fn test_visible_segment_gets_a_plan() {
        let camera = camera();
        let params = TreeParameters::default_species();
        let planner = TessellationPlanner::new(&camera, &params);

        let info = SegmentInfo::new(1, 0.2, 0.3, 10.0, 0.2);
        let from = upright(Vec3::new(0.0, 1.5, 0.0));
        let plan = planner.plan(&info, &from, &upright(Vec3::new(0.0, 2.5, 0.0)), 4.0);

        assert!(plan.is_visible());
        assert!(plan.face_rings_per_group >= 1);
        assert!((MIN_POINTS..=MAX_POINTS_U).contains(&plan.from_points));
        assert!((MIN_POINTS..=MAX_POINTS_U).contains(&plan.to_points));
        assert!((MIN_POINTS..=MAX_POINTS_V).contains(&plan.v_points));
        for g in 0..plan.thread_group_count {
            let out = plan.group_output(g).unwrap();
            assert!(out.vertex_count <= partition::MAX_VERTICES_PER_GROUP);
            assert!(out.triangle_count <= partition::MAX_TRIANGLES_PER_GROUP);
        }
        assert!(plan.group_output(plan.thread_group_count).is_none());
    }

    #[test]
    fn test_finer_budget_gives_more_points() {
        let camera = camera();
        let params = TreeParameters::default_species();
        let planner = TessellationPlanner::new(&camera, &params);

        let info = SegmentInfo::new(0, 0.2, 0.3, 10.0, 0.5);
        let from = upright(Vec3::new(0.0, 1.0, 0.0));
        let to = upright(Vec3::new(0.0, 3.0, 0.0));
        let coarse = planner.plan(&info, &from, &to, 16.0);
        let fine = planner.plan(&info, &from, &to, 2.0);

        assert!(coarse.is_visible() && fine.is_visible());
        assert!(fine.v_points >= coarse.v_points);
        assert!(fine.from_points >= coarse.from_points);
    }

    #[test]
    fn test_zero_radius_is_always_culled() {
        let camera = camera();
        let params = TreeParameters::default_species();
        let planner = TessellationPlanner::new(&camera, &params);

        for level in 0..4 {
            let info = SegmentInfo::new(level, 0.1, 0.2, 5.0, 0.0);
            let plan = planner.plan(&info, &upright(Vec3::ZERO), &upright(Vec3::Y), 4.0);
            assert_eq!(plan, TessellationPlan::default());
        }
    }

    #[test]
    fn test_segment_behind_camera_is_culled() {
        let camera = camera();
        let params = TreeParameters::default_species();
        let planner = TessellationPlanner::new(&camera, &params);

        let forward = (Vec3::new(0.0, 2.0, 0.0) - camera.position).normalize();
        let behind = camera.position - forward * 50.0;
        let info = SegmentInfo::new(0, 0.0, 0.1, 10.0, 0.5);
        let from = StemPose::new(behind, Quat::IDENTITY);
        let to = StemPose::new(behind + Vec3::Y, Quat::IDENTITY);
        assert!(!planner.plan(&info, &from, &to, 4.0).is_visible());
    }

    #[test]
    fn test_tip_opening_angle() {
        let camera = camera();
        let params = TreeParameters::default_species();
        let planner = TessellationPlanner::new(&camera, &params);

        let info = SegmentInfo::new(0, 0.9, 1.0, 10.0, 2.0);
        let from = upright(Vec3::new(0.0, 1.0, 0.0));
        let plan = planner.plan(&info, &from, &upright(Vec3::new(0.0, 2.0, 0.0)), 1.0);
        assert!(plan.is_visible());
        // The tip ring collapses to the minimum point count
        assert_eq!(plan.to_points, MIN_POINTS);
        assert_eq!(plan.to_opening_angle, FRAC_PI_2);
        assert!(plan.from_points > 5.0);
        assert!(plan.from_opening_angle > 0.0 && plan.from_opening_angle <= PI);
    }
}
