//! Splitting a tessellated segment into fixed-size dispatch groups
//!
//! A segment is a stack of rings: the first ring has `from` points, the
//! last `to` points and every ring in between `u` points. Consecutive rings
//! are joined by a band of triangles. Groups own whole bands and repeat the
//! ring they share with the previous group.

use serde::{Deserialize, Serialize};

use crate::math::round_up_multiple2;

/// Vertex budget of one dispatch group.
pub const MAX_VERTICES_PER_GROUP: u32 = 128;
/// Triangle budget of one dispatch group.
pub const MAX_TRIANGLES_PER_GROUP: u32 = 128;
/// Most bands (and dispatch groups) per segment.
pub const MAX_RINGS_PER_SEGMENT: u32 = 128;

pub const MIN_POINTS: f32 = 2.0;
/// Most points on an end ring.
pub const MAX_POINTS_U: f32 = {
    let by_vertices = MAX_VERTICES_PER_GROUP / 2;
    let by_triangles = MAX_TRIANGLES_PER_GROUP / 2 + 1;
    (if by_vertices < by_triangles { by_vertices } else { by_triangles }) as f32
};
/// Most rings along a segment.
pub const MAX_POINTS_V: f32 = MAX_RINGS_PER_SEGMENT as f32;

/// Even integer point counts derived from fractional ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingCounts {
    pub from: u32,
    pub to: u32,
    /// Points on inner rings.
    pub u: u32,
    /// Number of rings.
    pub v: u32,
}

impl RingCounts {
    pub fn new(from_points: f32, to_points: f32, v_points: f32) -> Self {
        Self {
            from: round_up_multiple2(from_points),
            to: round_up_multiple2(to_points),
            u: round_up_multiple2(from_points + (to_points - from_points) * 0.5),
            v: round_up_multiple2(v_points),
        }
    }

    /// Bands (rings minus one) per group that fit both budgets.
    pub fn face_rings_per_group(&self) -> u32 {
        let biggest_ring_v = self.from.max(self.to) + self.u;
        let biggest_ring_t = biggest_ring_v.saturating_sub(2);

        let band_triangles = (2 * self.u.saturating_sub(1)).max(1);
        let max_by_vertices =
            1 + MAX_VERTICES_PER_GROUP.saturating_sub(biggest_ring_v) / self.u.max(1);
        let max_by_triangles =
            1 + MAX_TRIANGLES_PER_GROUP.saturating_sub(biggest_ring_t) / band_triangles;

        self.v.saturating_sub(1).min(max_by_vertices.min(max_by_triangles)).max(1)
    }

    /// Dispatch groups needed with `face_rings_per_group` bands each.
    pub fn group_count(&self, face_rings_per_group: u32) -> u32 {
        let rings = face_rings_per_group.max(1);
        (self.v + rings).saturating_sub(2) / rings
    }

    pub fn total_vertex_count(&self) -> u32 {
        self.from + self.u * self.v.saturating_sub(2) + self.to
    }

    pub fn total_triangle_count(&self) -> u32 {
        let inner_bands = self.v.saturating_sub(2);
        (self.from - 1) + (self.to - 1) + 2 * (self.u - 1) * inner_bands
    }
}

/// Output sizes and global offsets of one dispatch group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupOutput {
    pub vertex_count: u32,
    pub triangle_count: u32,
    /// First band owned by the group.
    pub ring_offset: u32,
    /// Global index of the group's first vertex.
    pub vertex_offset: u32,
    /// Global index of the group's first triangle.
    pub triangle_offset: u32,
}

/// Output of `group` out of `group_count` groups owning `rings_per_group` bands each.
pub fn group_output(
    counts: &RingCounts,
    rings_per_group: u32,
    group: u32,
    group_count: u32,
) -> GroupOutput {
    let is_first = group == 0;
    let is_last = group + 1 == group_count;
    let u = counts.u;

    let mut vertex_count = (rings_per_group + 1) * u;
    let mut triangle_count = rings_per_group * 2 * (u - 1);

    if is_last {
        let global_rings = counts.v - 1;
        let rings_last_group = global_rings - rings_per_group * (group_count - 1);

        vertex_count = rings_last_group * u + counts.to;
        triangle_count = rings_last_group * 2 * (u - 1) - (u - 1) + (counts.to - 1);
    }
    if is_first {
        vertex_count = vertex_count - u + counts.from;
        triangle_count = triangle_count - (u - 1) + (counts.from - 1);
    }

    let ring_offset = group * rings_per_group;
    let (vertex_offset, triangle_offset) = if is_first {
        (0, 0)
    } else {
        (
            counts.from + u * (ring_offset - 1),
            (counts.from - 1) + (u - 1) + 2 * (u - 1) * (ring_offset - 1),
        )
    };

    GroupOutput {
        vertex_count,
        triangle_count,
        ring_offset,
        vertex_offset,
        triangle_offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(from: f32, to: f32, v: f32) {
        let counts = RingCounts::new(from, to, v);
        let rings = counts.face_rings_per_group();
        let groups = counts.group_count(rings);
        assert!(groups >= 1 && groups <= MAX_RINGS_PER_SEGMENT);

        let mut expected_vertex_offset = 0;
        let mut expected_triangle_offset = 0;
        for g in 0..groups {
            let out = group_output(&counts, rings, g, groups);
            assert!(out.vertex_count <= MAX_VERTICES_PER_GROUP, "{counts:?} group {g}: {out:?}");
            assert!(out.triangle_count <= MAX_TRIANGLES_PER_GROUP, "{counts:?} group {g}: {out:?}");
            assert_eq!(out.triangle_offset, expected_triangle_offset, "{counts:?} group {g}");
            if g > 0 {
                // The first ring of a group repeats the last ring of the previous one
                assert_eq!(
                    out.vertex_offset + counts.u,
                    expected_vertex_offset,
                    "{counts:?} group {g}"
                );
            }
            expected_vertex_offset = out.vertex_offset + out.vertex_count;
            expected_triangle_offset = out.triangle_offset + out.triangle_count;
        }
        assert_eq!(expected_vertex_offset, counts.total_vertex_count(), "{counts:?}");
        assert_eq!(expected_triangle_offset, counts.total_triangle_count(), "{counts:?}");
    }

    #[test]
    fn test_max_points() {
        assert_eq!(MAX_POINTS_U, 64.0);
        assert_eq!(MAX_POINTS_V, 128.0);
    }

    #[test]
    fn test_ring_counts_round_up_to_even() {
        let counts = RingCounts::new(2.0, 5.1, 3.0);
        assert_eq!(counts.from, 2);
        assert_eq!(counts.to, 6);
        assert_eq!(counts.u, 4);
        assert_eq!(counts.v, 4);
    }

    #[test]
    fn test_single_band() {
        let counts = RingCounts::new(2.0, 2.0, 2.0);
        assert_eq!(counts.face_rings_per_group(), 1);
        assert_eq!(counts.group_count(1), 1);
        let out = group_output(&counts, 1, 0, 1);
        assert_eq!(out.vertex_count, 4);
        assert_eq!(out.triangle_count, 2);
    }

    #[test]
    fn test_budgets_hold_across_sizes() {
        let samples = [2.0, 3.5, 8.0, 13.0, 31.9, 47.0, 64.0];
        let v_samples = [2.0, 3.0, 9.5, 40.0, 77.0, 128.0];
        for &from in &samples {
            for &to in &samples {
                for &v in &v_samples {
                    check(from, to, v);
                }
            }
        }
    }
}
