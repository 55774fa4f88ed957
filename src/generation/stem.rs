//! Stem walker: one [`BranchTask`] walked step by step.
//!
//! A task is processed by a pool of worker lanes (see [`ClonePartition`]).
//! At every curvature step the lanes agree on a split count, advance every
//! clone by one slice, let each clone's leader request a segment slot, then
//! emit the children whose attachment point falls inside the step. Every
//! random decision is keyed on `(seed, step, clone)` so the walk is
//! independent of scheduling.

use serde::Serialize;

use crate::core::CameraState;
use crate::core::types::{Quat, Vec3};
use crate::environment::{Environment, WindField};
use crate::generation::clones::ClonePartition;
use crate::generation::config::RecordCapacity;
use crate::generation::growth::{
    add_fruit_weight, add_split_spread, add_vertical_attraction, add_wind_sway, apply_curve,
    child_azimuth, child_down_rotation, child_orientation, vertical_attraction,
};
use crate::generation::records::{
    BranchTask, DrawSegmentRecord, LeafInstance, LeafKind, SegmentInfo, StemPose,
};
use crate::lod::{LodConfig, nth_child};
use crate::math::quat::{heading, slerp};
use crate::math::random::{combine_seed, random, signed_random};
use crate::model::season::{fruit_scale, is_leaf_blossom, season_fruit_progress, season_leaf_scale};
use crate::model::shape::{shape_ratio, tapered_radius};
use crate::model::spline::stem_spline;
use crate::species::TreeParameters;
use crate::visibility::TessellationPlanner;

/// Largest curve resolution a stem is walked with.
pub const MAX_STEPS: u32 = 32;

/// Child seeds keep 23 bits.
const CHILD_SEED_MASK: u32 = 0x7F_FFFF;

/// Quantized `(from_z, to_z)` of every step of a stem with `resolution` steps.
///
/// The `to_z` of one step is bit-identical to the `from_z` of the next and
/// the last step ends at exactly 1.
///
/// # Examples
/// ```
/// use sylvan::generation::stem::step_heights;
///
/// let heights: Vec<_> = step_heights(4).collect();
/// assert_eq!(heights.len(), 4);
/// assert_eq!(heights[0].0, 0.0);
/// assert_eq!(heights[3].1, 1.0);
/// ```
pub fn step_heights(resolution: u32) -> impl Iterator<Item = (f32, f32)> {
    let resolution = resolution.clamp(1, MAX_STEPS);
    let res = resolution as f32;
    (0..resolution).scan(0.0f32, move |to_z, step| {
        let from_z = *to_z;
        *to_z = SegmentInfo::decode_z(SegmentInfo::encode_z((step + 1) as f32 / res));
        Some((from_z, *to_z))
    })
}

/// Counters of one walk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    /// Segment slots asked for, one per clone and step.
    pub segments_requested: u32,
    /// Slots granted but rejected by the planner or degenerate.
    pub segments_culled: u32,
    /// Requests past the per-task segment capacity.
    pub segments_dropped: u32,
}

/// Everything one task emits, in emission order.
#[derive(Clone, Debug, Default)]
pub struct TaskOutput {
    pub segments: Vec<DrawSegmentRecord>,
    pub children: Vec<BranchTask>,
    pub leaves: Vec<LeafInstance>,
    pub blossoms: Vec<LeafInstance>,
    pub fruits: Vec<LeafInstance>,
    pub stats: TaskStats,
}

impl TaskOutput {
    /// Stream of a terminal child kind.
    pub fn leaf_stream(&self, kind: LeafKind) -> &[LeafInstance] {
        match kind {
            LeafKind::Leaf => &self.leaves,
            LeafKind::Blossom => &self.blossoms,
            LeafKind::Fruit => &self.fruits,
        }
    }

    fn push_leaf(&mut self, kind: LeafKind, instance: LeafInstance) {
        match kind {
            LeafKind::Leaf => self.leaves.push(instance),
            LeafKind::Blossom => self.blossoms.push(instance),
            LeafKind::Fruit => self.fruits.push(instance),
        }
    }
}

/// Lane state carried across steps.
#[derive(Clone, Copy, Debug)]
struct Walker {
    pose: StemPose,
    /// Curve (degrees per step) taking back a split angle.
    split_correction: f32,
}

/// Pose of one clone around the current step.
#[derive(Clone, Copy, Debug)]
struct CloneStep {
    from: StemPose,
    to: Walker,
}

/// Read-only inputs shared by every task of a generation pass.
pub struct StemContext<'a> {
    pub params: &'a TreeParameters,
    pub environment: &'a Environment,
    pub wind: &'a WindField,
    pub lod: &'a LodConfig,
    pub camera: &'a CameraState,
    pub capacity: &'a RecordCapacity,
    /// Worker lanes per task.
    pub workers: u32,
}

impl StemContext<'_> {
    fn levels(&self) -> u32 {
        self.params.levels.clamp(1, TreeParameters::MAX_LEVELS)
    }

    /// Walk `task` from base to tip.
    pub fn walk(&self, task: &BranchTask) -> TaskOutput {
        let params = self.params;
        let level = task.level.min(TreeParameters::MAX_LEVELS - 1);
        let l = level as usize;
        let levels = self.levels();
        let is_terminal = level + 1 >= levels;

        let resolution = params.curve_res[l].clamp(1, MAX_STEPS);
        let res = resolution as f32;
        let children = task.children.min(self.capacity.children_per_task);

        let distance = self.camera.distance_to(task.pose.position);
        let (density, child_scale) = if is_terminal {
            self.lod.density_and_scale(distance)
        } else {
            (1.0, 1.0)
        };
        let pixels_per_triangle = self.lod.pixels_per_triangle_at(distance);

        let base_z = params.base_size[l];
        let child_delta = if children > 0 { res * (1.0 - base_z) / children as f32 } else { 0.0 };
        let first_child = res * base_z + child_delta * 0.5;

        let attraction = vertical_attraction(
            params,
            level,
            self.environment.attraction_up_or(params.attraction_up),
            self.environment.season,
        );
        let planner = TessellationPlanner::new(self.camera, params);

        let mut partition = ClonePartition::new(self.workers);
        let workers = partition.workers();
        let start = Walker {
            pose: task.pose,
            split_correction: 0.0,
        };
        let mut lanes = vec![start; workers as usize];
        let mut clones = vec![CloneStep { from: task.pose, to: start }; workers as usize];

        let mut output = TaskOutput::default();
        let mut split_schedule = SplitSchedule::new(params, level);
        let mut draw_count = 0u32;
        let mut child_output_count = 0u32;

        for (step, (from_z, to_z)) in (0u32..).zip(step_heights(resolution)) {
            let step_t_size = (to_z - from_z) * res;

            let branches = split_schedule.splits(step) + 1;
            let has_splits = branches > 1;
            let original = if has_splits {
                partition.split(branches)
            } else {
                vec![true; workers as usize]
            };

            let step_seed = combine_seed(task.seed, step);
            for (i, lane) in partition.lanes().iter().enumerate() {
                let clone = lane.clone as usize;
                if !lane.is_leader() {
                    // Lanes of a clone follow its leader, which precedes them
                    lanes[i] = clones[clone].to;
                    continue;
                }

                let mut walker = lanes[i];
                clones[clone].from = walker.pose;

                let seed = combine_seed(step_seed, lane.clone);
                let mut rotation = apply_curve(
                    walker.pose.orientation,
                    params,
                    level,
                    res,
                    seed,
                    from_z,
                    walker.split_correction,
                );
                if has_splits && !original[i] {
                    rotation = add_split_spread(
                        rotation,
                        params,
                        level,
                        seed,
                        step,
                        &mut walker.split_correction,
                    );
                }
                rotation = add_vertical_attraction(rotation, attraction, res);
                if !has_splits {
                    rotation = add_wind_sway(
                        rotation,
                        self.wind,
                        task.radius,
                        task.length,
                        res,
                        task.pose.position,
                    );
                }
                let rotation = rotation.normalize();

                walker.pose.orientation = rotation;
                walker.pose.position += heading(rotation) * (to_z - from_z) * task.length;
                lanes[i] = walker;
                clones[clone].to = walker;
            }

            let clone_count = partition.clone_count();
            let mut active_clones = 0u32;
            for clone in &clones[..clone_count as usize] {
                output.stats.segments_requested += 1;
                if draw_count >= self.capacity.segments_per_task {
                    output.stats.segments_dropped += 1;
                    continue;
                }
                draw_count += 1;
                active_clones += 1;

                if task.length <= 0.0 || task.radius <= 0.0 {
                    output.stats.segments_culled += 1;
                    continue;
                }
                let info = SegmentInfo::new(level, from_z, to_z, task.length, task.radius);
                let plan = planner.plan(&info, &clone.from, &clone.to.pose, pixels_per_triangle);
                if !plan.is_visible() {
                    output.stats.segments_culled += 1;
                    continue;
                }
                output.segments.push(DrawSegmentRecord {
                    from: clone.from,
                    to: clone.to.pose,
                    info,
                    ao_distance: task.ao_distance + task.length * (1.0 - step as f32 / res),
                    plan,
                });
            }

            if children == 0 {
                continue;
            }
            let lookup_clones = if active_clones > 0 { active_clones } else { clone_count.max(1) };

            // Each round hands one candidate child to every lane
            for _ in 0..self.capacity.children_per_task.div_ceil(workers) {
                let mut emitted = 0u32;
                for lane in 0..workers {
                    let n = child_output_count + lane;
                    if n >= children {
                        break;
                    }
                    let (index, scale) = nth_child(n, children, density);
                    let local = first_child + index as f32 * child_delta;
                    if scale == 0.0 || local.floor() != step as f32 {
                        continue;
                    }
                    emitted += 1;

                    let clone = &clones[(index % lookup_clones) as usize];
                    let t = if step_t_size > 0.0 { local.fract() / step_t_size } else { 0.0 };
                    let z = SegmentInfo::decode_z(SegmentInfo::encode_z(local / res));
                    let attachment = Attachment::new(self, task, clone, index, t, z);

                    if is_terminal {
                        self.emit_leaf(&mut output, task, &attachment, scale * child_scale);
                    } else {
                        output.children.push(self.child_task(task, &attachment));
                    }
                }

                if emitted == 0 {
                    break;
                }
                child_output_count += emitted;
                if emitted < workers {
                    break;
                }
            }
        }

        log::trace!(
            "level {} task (seed {:#x}): {} segments, {} children, {} leaves, {} blossoms, {} fruits",
            level,
            task.seed,
            output.segments.len(),
            output.children.len(),
            output.leaves.len(),
            output.blossoms.len(),
            output.fruits.len()
        );
        output
    }

    fn emit_leaf(&self, output: &mut TaskOutput, task: &BranchTask, at: &Attachment, scale: f32) {
        let params = self.params;
        let season = self.environment.season;

        let is_blossom = is_leaf_blossom(params, at.seed);
        let fruit_progress = season_fruit_progress(season, at.seed);
        let is_fruit = is_blossom
            && random(&[at.seed, at.index]) < params.fruit.chance
            && fruit_progress > 0.0;

        let leaf = params.leaf_parameters(is_blossom);
        let base_scale = leaf.scale * shape_ratio(leaf.scale_shape, 1.0 - at.z) * scale;
        let leaf_scale = if leaf.is_needle {
            base_scale
        } else if is_fruit {
            scale * params.fruit.size * fruit_scale(fruit_progress)
        } else {
            base_scale * season_leaf_scale(season, at.seed, is_blossom)
        };

        let mut rotation = child_orientation(at.parent_rotation, at.down, at.azimuth);
        if is_fruit {
            rotation =
                add_fruit_weight(rotation, params.fruit.down_force * fruit_scale(fruit_progress));
        }

        // Move out to the parent surface; clamped so near-tangent children stay finite
        let child_z = heading(rotation);
        let d = child_z.dot(heading(at.parent_rotation)).clamp(0.05, 0.95);
        let position =
            at.position + child_z * (at.parent_radius / (1.0 - d * d).sqrt() + leaf.stem_len);

        if !is_fruit {
            rotation = add_wind_sway(rotation, self.wind, 0.03, leaf.scale, 1.0, position);
        }

        if leaf_scale > 0.0 {
            let kind = if is_fruit {
                LeafKind::Fruit
            } else if is_blossom {
                LeafKind::Blossom
            } else {
                LeafKind::Leaf
            };
            output.push_leaf(
                kind,
                LeafInstance {
                    pose: StemPose::new(position, rotation.normalize()),
                    seed: at.seed,
                    scale: leaf_scale,
                    ao_distance: task.ao_distance + task.length * (1.0 - at.z),
                },
            );
        }
    }

    fn child_task(&self, task: &BranchTask, at: &Attachment) -> BranchTask {
        let params = self.params;
        let level = task.level;
        let levels = self.levels();
        let next = (level + 1).min(levels - 1) as usize;
        let z = at.z;

        let max_length =
            params.length[next] + signed_random(&[at.seed, 89]) * params.length_v[next];
        let shape_position = if level == 0 { at.ratio } else { 1.0 - 0.6 * z };
        let shape = shape_ratio(params.shape[level as usize], shape_position);
        let length = (max_length * task.length * shape).max(0.0);

        let radius = if task.length > 0.0 {
            let by_ratio = task.radius * (length / task.length).powf(params.ratio_power);
            // Never thicker than the parent where it attaches
            (at.parent_radius * 0.9).min(by_ratio).max(0.0)
        } else {
            0.0
        };

        let children = if level + 2 == levels {
            let leaves = (params.leaf.count + params.blossom.count) as f32;
            (leaves * shape_ratio(params.shape[next], 1.0 - z)) as u32
        } else {
            let branches = params.branches[((level + 2).min(levels - 1)) as usize] as f32;
            if level == 0 {
                let relative = if task.length > 0.0 && max_length > 0.0 {
                    length / task.length / max_length
                } else {
                    0.0
                };
                (branches * (0.2 + 0.8 * relative)) as u32
            } else {
                (branches * (1.0 - 0.5 * z)) as u32
            }
        };

        BranchTask {
            seed: at.seed,
            pose: StemPose::new(
                at.position,
                child_orientation(at.parent_rotation, at.down, at.azimuth).normalize(),
            ),
            scale: task.scale,
            length,
            radius,
            children,
            ao_distance: task.ao_distance + task.length * (1.0 - z),
            level: level + 1,
        }
    }
}

/// Split count of every step of one stem.
///
/// Error diffusion keeps the long-run number of splits per step at
/// `seg_splits`. The base splits of the first step count against the same
/// error, so they pay back splits later steps would otherwise make.
#[derive(Clone, Copy, Debug)]
struct SplitSchedule {
    rate: f32,
    base_splits: u32,
    error: f32,
}

impl SplitSchedule {
    fn new(params: &TreeParameters, level: u32) -> Self {
        let l = level.min(TreeParameters::MAX_LEVELS - 1) as usize;
        Self {
            rate: params.seg_splits[l],
            base_splits: params.base_splits[l],
            error: -params.seg_split_base_offset[l],
        }
    }

    fn splits(&mut self, step: u32) -> u32 {
        let mut splits = (self.rate + self.error).round_ties_even().max(0.0) as u32;
        if step == 0 {
            splits += self.base_splits;
        }
        self.error -= splits as f32 - self.rate;
        splits
    }
}

/// Where and how a child attaches to its parent stem.
struct Attachment {
    index: u32,
    seed: u32,
    /// Height along the parent.
    z: f32,
    /// Position along the branching part of the parent, 1 at its base.
    ratio: f32,
    position: Vec3,
    parent_rotation: Quat,
    parent_radius: f32,
    down: Quat,
    azimuth: f32,
}

impl Attachment {
    fn new(
        ctx: &StemContext<'_>,
        task: &BranchTask,
        clone: &CloneStep,
        index: u32,
        t: f32,
        z: f32,
    ) -> Self {
        let params = ctx.params;
        let level = task.level;
        let seed = combine_seed(index, task.seed) & CHILD_SEED_MASK;

        let length_base = params.base_size[0] * task.scale;
        let branching_length = task.length - length_base;
        let ratio = if branching_length > f32::EPSILON {
            task.length * (1.0 - z) / branching_length
        } else {
            1.0 - z
        };

        let from = clone.from;
        let to = clone.to.pose;

        Self {
            index,
            seed,
            z,
            ratio,
            position: stem_spline(from.position, from.heading(), to.position, to.heading(), t),
            parent_rotation: slerp(from.orientation, to.orientation, t),
            parent_radius: tapered_radius(level, task.length, task.radius, params, z),
            down: child_down_rotation(params, level, seed, ratio),
            azimuth: child_azimuth(params, level, seed, index),
        }
    }
}
