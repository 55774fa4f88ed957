//! Records passed between the stem walker, the planner and geometry emission

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::core::types::{Quat, Vec3};
use crate::math::quat::heading;
use crate::math::random::signed_random;
use crate::model::shape::tapered_radius;
use crate::species::TreeParameters;
use crate::visibility::TessellationPlan;

pub const LEVEL_BITS: u32 = 2;
pub const SEGMENT_Z_BITS: u32 = 15;
/// Largest encoded z value; encodes `z = 1`.
pub const MAX_ENCODED_Z: u32 = (1 << SEGMENT_Z_BITS) - 1;

/// One tube slice of a stem between two curvature steps.
///
/// Heights along the stem are stored quantized so that the `to` of one step
/// and the `from` of the next compare equal.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentInfo {
    pub level: u32,
    encoded_from_z: u32,
    encoded_to_z: u32,
    /// Total length of the stem.
    pub length: f32,
    /// Base radius of the stem.
    pub radius: f32,
}

impl SegmentInfo {
    pub fn new(level: u32, from_z: f32, to_z: f32, length: f32, radius: f32) -> Self {
        Self {
            level: level & ((1 << LEVEL_BITS) - 1),
            encoded_from_z: Self::encode_z(from_z),
            encoded_to_z: Self::encode_z(to_z),
            length,
            radius,
        }
    }

    /// Quantize `z` in `[0, 1]` to [`SEGMENT_Z_BITS`] bits.
    ///
    /// # Examples
    /// ```
    /// use sylvan::generation::records::{SegmentInfo, MAX_ENCODED_Z};
    ///
    /// assert_eq!(SegmentInfo::encode_z(0.0), 0);
    /// assert_eq!(SegmentInfo::encode_z(1.0), MAX_ENCODED_Z);
    /// assert_eq!(SegmentInfo::encode_z(7.0), MAX_ENCODED_Z);
    /// ```
    pub fn encode_z(z: f32) -> u32 {
        let z = if z.is_nan() { 0.0 } else { z.clamp(0.0, 1.0) };
        ((z * MAX_ENCODED_Z as f32).round_ties_even() as u32).min(MAX_ENCODED_Z)
    }

    pub fn decode_z(encoded: u32) -> f32 {
        (encoded as f32 / MAX_ENCODED_Z as f32).clamp(0.0, 1.0)
    }

    pub fn from_z(&self) -> f32 {
        Self::decode_z(self.encoded_from_z)
    }

    pub fn to_z(&self) -> f32 {
        Self::decode_z(self.encoded_to_z)
    }

    pub fn encoded_from_z(&self) -> u32 {
        self.encoded_from_z
    }

    pub fn encoded_to_z(&self) -> u32 {
        self.encoded_to_z
    }

    pub fn set_from_z(&mut self, z: f32) {
        self.encoded_from_z = Self::encode_z(z);
    }

    pub fn set_to_z(&mut self, z: f32) {
        self.encoded_to_z = Self::encode_z(z);
    }

    /// Radius of the stem this slice belongs to at height `z`.
    pub fn tapered_radius(&self, params: &TreeParameters, z: f32) -> f32 {
        tapered_radius(self.level, self.length, self.radius, params, z)
    }

    /// Bit-packed form: level, from and to heights in the first word, then the
    /// raw bits of length and radius. Used as the identity of the slice when hashing.
    pub fn pack(&self) -> [u32; 3] {
        [
            self.level
                | (self.encoded_from_z << LEVEL_BITS)
                | (self.encoded_to_z << (LEVEL_BITS + SEGMENT_Z_BITS)),
            self.length.to_bits(),
            self.radius.to_bits(),
        ]
    }

    pub fn unpack(packed: [u32; 3]) -> Self {
        let [bits, length, radius] = packed;
        Self {
            level: bits & ((1 << LEVEL_BITS) - 1),
            encoded_from_z: (bits >> LEVEL_BITS) & MAX_ENCODED_Z,
            encoded_to_z: (bits >> (LEVEL_BITS + SEGMENT_Z_BITS)) & MAX_ENCODED_Z,
            length: f32::from_bits(length),
            radius: f32::from_bits(radius),
        }
    }
}

/// Walker state at a step boundary.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StemPose {
    pub position: Vec3,
    /// Local +Z is the growth direction.
    pub orientation: Quat,
}

impl StemPose {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self { position, orientation }
    }

    pub fn heading(&self) -> Vec3 {
        heading(self.orientation)
    }
}

impl Default for StemPose {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY)
    }
}

/// Work item: one stem to walk.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BranchTask {
    pub seed: u32,
    pub pose: StemPose,
    pub scale: f32,
    pub length: f32,
    pub radius: f32,
    /// Children this stem spawns (stems, or leaves on the last level).
    pub children: u32,
    /// Distance travelled from the root, for ambient occlusion.
    pub ao_distance: f32,
    /// Recursion depth; 0 is the trunk.
    pub level: u32,
}

impl BranchTask {
    /// Trunk task for a tree rooted at `position`.
    pub fn root(params: &TreeParameters, position: Vec3, orientation: Quat, seed: u32) -> Self {
        let scale = params.scale + 0.5 * params.scale_v * signed_random(&[seed, 2413]);
        let length = scale * (params.length[0] + params.length_v[0] * signed_random(&[seed, 123]));
        let children = if params.levels <= 1 {
            params.leaf.count + params.blossom.count
        } else {
            params.branches[1]
        };

        Self {
            seed,
            pose: StemPose::new(position, orientation),
            scale,
            length,
            radius: length * params.ratio,
            children,
            ao_distance: 0.0,
            level: 0,
        }
    }

    /// Orientation that turns the stem heading (+Z) to world up.
    pub fn upright() -> Quat {
        Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2)
    }
}

/// A visible tube slice ready for geometry emission.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrawSegmentRecord {
    pub from: StemPose,
    pub to: StemPose,
    pub info: SegmentInfo,
    pub ao_distance: f32,
    pub plan: TessellationPlan,
}

/// Which stream a terminal child goes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafKind {
    Leaf,
    Blossom,
    Fruit,
}

impl LeafKind {
    pub fn index(self) -> u32 {
        match self {
            LeafKind::Leaf => 0,
            LeafKind::Blossom => 1,
            LeafKind::Fruit => 2,
        }
    }
}

/// A surviving leaf, blossom or fruit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeafInstance {
    pub pose: StemPose,
    pub seed: u32,
    pub scale: f32,
    pub ao_distance: f32,
}

/// GPU layout of [`DrawSegmentRecord`] (112 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GpuSegmentRecord {
    pub from_position: [f32; 3],
    pub from_rotation: [f32; 4],
    pub to_position: [f32; 3],
    pub to_rotation: [f32; 4],
    /// [`SegmentInfo::pack`]
    pub segment_info: [u32; 3],
    pub ao_distance: f32,
    pub from_points: f32,
    pub to_points: f32,
    pub v_points: f32,
    pub face_rings_per_group: u32,
    pub from_opening_angle: f32,
    pub to_opening_angle: f32,
    pub dispatch_grid: u32,
    pub _padding: [u32; 3],
}

impl From<&DrawSegmentRecord> for GpuSegmentRecord {
    fn from(record: &DrawSegmentRecord) -> Self {
        Self {
            from_position: record.from.position.to_array(),
            from_rotation: record.from.orientation.to_array(),
            to_position: record.to.position.to_array(),
            to_rotation: record.to.orientation.to_array(),
            segment_info: record.info.pack(),
            ao_distance: record.ao_distance,
            from_points: record.plan.from_points,
            to_points: record.plan.to_points,
            v_points: record.plan.v_points,
            face_rings_per_group: record.plan.face_rings_per_group,
            from_opening_angle: record.plan.from_opening_angle,
            to_opening_angle: record.plan.to_opening_angle,
            dispatch_grid: record.plan.thread_group_count,
            _padding: [0; 3],
        }
    }
}

/// GPU layout of [`LeafInstance`] (48 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GpuLeafInstance {
    pub position: [f32; 3],
    pub seed: u32,
    pub rotation: [f32; 4],
    pub scale: f32,
    pub ao_distance: f32,
    /// [`LeafKind::index`]
    pub kind: u32,
    pub _padding: u32,
}

impl GpuLeafInstance {
    pub fn new(instance: &LeafInstance, kind: LeafKind) -> Self {
        Self {
            position: instance.pose.position.to_array(),
            seed: instance.seed,
            rotation: instance.pose.orientation.to_array(),
            scale: instance.scale,
            ao_distance: instance.ao_distance,
            kind: kind.index(),
            _padding: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_z_quantization_is_stable() {
        let res = 7.0;
        let mut previous = SegmentInfo::encode_z(0.0);
        for step in 0..7 {
            let z = SegmentInfo::encode_z((step + 1) as f32 / res);
            assert!(z > previous);
            previous = z;
        }
        assert_eq!(previous, MAX_ENCODED_Z);
        let half = SegmentInfo::decode_z(SegmentInfo::encode_z(0.5));
        assert!((half - 0.5).abs() < 1.0 / MAX_ENCODED_Z as f32);
        assert_eq!(SegmentInfo::encode_z(f32::NAN), 0);
    }

    #[test]
    fn test_pack_unpack() {
        let info = SegmentInfo::new(3, 0.25, 0.5, 4.0, 0.125);
        let unpacked = SegmentInfo::unpack(info.pack());
        assert_eq!(unpacked, info);
        assert_eq!(unpacked.level, 3);
        assert_eq!(info.pack()[0] & 0b11, 3);
    }

    #[test]
    fn test_root_task() {
        let params = TreeParameters::apple();
        let root = BranchTask::root(&params, Vec3::ZERO, BranchTask::upright(), 42);
        assert_eq!(root.level, 0);
        assert_eq!(root.children, params.branches[1]);
        assert!((root.radius - root.length * params.ratio).abs() < 1e-6);
        assert!((root.pose.heading() - Vec3::Y).length() < 1e-6);

        let mut single = params.clone();
        single.levels = 1;
        let root = BranchTask::root(&single, Vec3::ZERO, Quat::IDENTITY, 42);
        assert_eq!(root.children, single.leaf.count + single.blossom.count);
    }

    #[test]
    fn test_root_scale_jitter_bounds() {
        let params = TreeParameters::apple();
        for seed in 0..100 {
            let root = BranchTask::root(&params, Vec3::ZERO, Quat::IDENTITY, seed);
            assert!((root.scale - params.scale).abs() <= 0.5 * params.scale_v.abs() + 1e-5);
        }
    }

    #[test]
    fn test_gpu_layouts() {
        assert_eq!(std::mem::size_of::<GpuSegmentRecord>(), 112);
        assert_eq!(std::mem::size_of::<GpuLeafInstance>(), 48);
        assert_eq!(std::mem::size_of::<GpuSegmentRecord>() % 16, 0);
        assert_eq!(std::mem::size_of::<GpuLeafInstance>() % 16, 0);
    }

    #[test]
    fn test_gpu_leaf_from_instance() {
        let instance = LeafInstance {
            pose: StemPose::new(Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY),
            seed: 9,
            scale: 0.5,
            ao_distance: 4.0,
        };
        let gpu = GpuLeafInstance::new(&instance, LeafKind::Fruit);
        assert_eq!(gpu.position, [1.0, 2.0, 3.0]);
        assert_eq!(gpu.kind, 2);
        let bytes: &[u8] = bytemuck::bytes_of(&gpu);
        assert_eq!(bytes.len(), 48);
    }
}
