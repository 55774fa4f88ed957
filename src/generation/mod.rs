//! Tree generation pass: walks the branch hierarchy level by level.
//!
//! The pass is a small work graph:
//! 1. The root task (trunk) is built from the species parameters and seed
//! 2. Every task of a level wave is walked in parallel (rayon)
//! 3. Task outputs are merged in task order into bounded record streams
//! 4. Child tasks form the next wave until no level spawns children
//!
//! Merging in task order makes the result independent of how rayon
//! schedules the walks.

pub mod clones;
pub mod config;
pub mod growth;
pub mod output;
pub mod records;
pub mod stem;

pub use config::{GenerationConfig, RecordCapacity};
pub use output::RecordBuffer;
pub use records::{
    BranchTask, DrawSegmentRecord, GpuLeafInstance, GpuSegmentRecord, LeafInstance, LeafKind,
    SegmentInfo, StemPose,
};
pub use stem::{StemContext, TaskOutput, TaskStats};

use rayon::prelude::*;
use serde::Serialize;

use crate::core::CameraState;
use crate::core::types::Vec3;
use crate::species::{ParameterProvider, TreeParameters};

/// Counters of one generation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GenerationStats {
    /// Tasks walked per stem level.
    pub tasks_per_level: [u32; TreeParameters::MAX_LEVELS as usize],
    pub segments_requested: u64,
    /// Visible segments produced by the walkers.
    pub segments_emitted: u64,
    pub segments_culled: u64,
    /// Segment requests past a task's capacity.
    pub segments_over_task_capacity: u64,
    /// Records lost to the pass-level capacities.
    pub segments_dropped: u64,
    pub leaves_dropped: u64,
    pub blossoms_dropped: u64,
    pub fruits_dropped: u64,
    pub tasks_dropped: u64,
}

impl GenerationStats {
    pub fn total_tasks(&self) -> u32 {
        self.tasks_per_level.iter().sum()
    }

    /// Records lost to any capacity.
    pub fn total_dropped(&self) -> u64 {
        self.segments_over_task_capacity
            + self.segments_dropped
            + self.leaves_dropped
            + self.blossoms_dropped
            + self.fruits_dropped
            + self.tasks_dropped
    }

    fn add_task(&mut self, level: u32, stats: &TaskStats, emitted: usize) {
        let level = level.min(TreeParameters::MAX_LEVELS - 1) as usize;
        self.tasks_per_level[level] += 1;
        self.segments_requested += stats.segments_requested as u64;
        self.segments_culled += stats.segments_culled as u64;
        self.segments_over_task_capacity += stats.segments_dropped as u64;
        self.segments_emitted += emitted as u64;
    }
}

/// Output of a generation pass: the three geometry streams plus stem slices.
#[derive(Clone, Debug, Serialize)]
pub struct TreeGeometry {
    pub segments: RecordBuffer<DrawSegmentRecord>,
    pub leaves: RecordBuffer<LeafInstance>,
    pub blossoms: RecordBuffer<LeafInstance>,
    pub fruits: RecordBuffer<LeafInstance>,
    pub stats: GenerationStats,
}

impl TreeGeometry {
    fn with_capacity(capacity: &RecordCapacity) -> Self {
        Self {
            segments: RecordBuffer::new(capacity.segments),
            leaves: RecordBuffer::new(capacity.leaves),
            blossoms: RecordBuffer::new(capacity.blossoms),
            fruits: RecordBuffer::new(capacity.fruits),
            stats: GenerationStats::default(),
        }
    }

    pub fn leaf_stream(&self, kind: LeafKind) -> &RecordBuffer<LeafInstance> {
        match kind {
            LeafKind::Leaf => &self.leaves,
            LeafKind::Blossom => &self.blossoms,
            LeafKind::Fruit => &self.fruits,
        }
    }

    /// Segments in upload layout.
    pub fn gpu_segments(&self) -> Vec<GpuSegmentRecord> {
        self.segments.iter().map(GpuSegmentRecord::from).collect()
    }

    /// Leaves, then blossoms, then fruits in upload layout.
    pub fn gpu_leaf_instances(&self) -> Vec<GpuLeafInstance> {
        [LeafKind::Leaf, LeafKind::Blossom, LeafKind::Fruit]
            .into_iter()
            .flat_map(|kind| {
                self.leaf_stream(kind)
                    .iter()
                    .map(move |leaf| GpuLeafInstance::new(leaf, kind))
            })
            .collect()
    }

    fn merge(&mut self, task: &BranchTask, output: TaskOutput) {
        self.stats.add_task(task.level, &output.stats, output.segments.len());
        self.segments.extend(output.segments);
        self.leaves.extend(output.leaves);
        self.blossoms.extend(output.blossoms);
        self.fruits.extend(output.fruits);
    }

    fn finish(&mut self) {
        self.stats.segments_dropped = self.segments.dropped() as u64;
        self.stats.leaves_dropped = self.leaves.dropped() as u64;
        self.stats.blossoms_dropped = self.blossoms.dropped() as u64;
        self.stats.fruits_dropped = self.fruits.dropped() as u64;
    }
}

/// Generates one tree from a config snapshot and species parameters.
pub struct TreeGenerator {
    config: GenerationConfig,
    params: TreeParameters,
}

impl TreeGenerator {
    /// Create a generator, looking up the species once.
    pub fn new(config: GenerationConfig, species: &dyn ParameterProvider) -> Self {
        let params = species.parameters(config.tree_type);
        Self::with_parameters(config, params)
    }

    pub fn with_parameters(config: GenerationConfig, params: TreeParameters) -> Self {
        Self { config, params }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn parameters(&self) -> &TreeParameters {
        &self.params
    }

    /// Trunk task for the configured seed and position.
    pub fn root_task(&self) -> BranchTask {
        BranchTask::root(
            &self.params,
            Vec3::from_array(self.config.position),
            BranchTask::upright(),
            self.config.seed,
        )
    }

    /// Orbit camera from the config, looking at the trunk's mid-height.
    pub fn camera_state(&self) -> CameraState {
        let focus = Vec3::from_array(self.config.position)
            + Vec3::Y * (0.5 * self.params.scale * self.params.length[0]);
        let camera = &self.config.camera;
        camera.camera(focus).snapshot(camera.render_size())
    }

    /// Generate the tree as seen by the configured orbit camera.
    pub fn generate(&self) -> TreeGeometry {
        self.generate_with_camera(&self.camera_state())
    }

    /// Generate the tree as seen by `camera`.
    pub fn generate_with_camera(&self, camera: &CameraState) -> TreeGeometry {
        let start = std::time::Instant::now();
        let config = &self.config;
        let wind = config.environment.wind_field();
        let ctx = StemContext {
            params: &self.params,
            environment: &config.environment,
            wind: &wind,
            lod: &config.lod,
            camera,
            capacity: &config.capacity,
            workers: config.workers(),
        };
        let levels = self.params.levels.clamp(1, TreeParameters::MAX_LEVELS);

        let mut geometry = TreeGeometry::with_capacity(&config.capacity);
        let mut task_budget = config.capacity.tasks;
        let mut wave = Vec::new();
        if task_budget > 0 {
            wave.push(self.root_task());
            task_budget -= 1;
        } else {
            geometry.stats.tasks_dropped = 1;
        }

        let mut level = 0;
        while !wave.is_empty() {
            let outputs: Vec<TaskOutput> = wave.par_iter().map(|task| ctx.walk(task)).collect();

            let mut next = RecordBuffer::new(task_budget);
            for (task, mut output) in wave.iter().zip(outputs) {
                next.extend(output.children.drain(..).filter(|child| child.level < levels));
                geometry.merge(task, output);
            }
            log::debug!(
                "Level {} wave: {} tasks, {} child tasks, {} segments so far",
                level,
                wave.len(),
                next.len(),
                geometry.segments.len()
            );

            task_budget -= next.len();
            geometry.stats.tasks_dropped += next.dropped() as u64;
            wave = next.into_vec();
            level += 1;
        }

        geometry.finish();
        let stats = &geometry.stats;
        if stats.segments_dropped
            + stats.leaves_dropped
            + stats.blossoms_dropped
            + stats.fruits_dropped
            + stats.tasks_dropped
            > 0
        {
            log::warn!(
                "Record capacity reached: dropped {} segments, {} leaves, {} blossoms, {} fruits, {} tasks",
                stats.segments_dropped,
                stats.leaves_dropped,
                stats.blossoms_dropped,
                stats.fruits_dropped,
                stats.tasks_dropped
            );
        }
        log::info!(
            "Generated {} tree (seed {}) in {:.1}ms: {} tasks, {} segments, {} leaves, {} blossoms, {} fruits",
            config.tree_type.name(),
            config.seed,
            start.elapsed().as_secs_f64() * 1000.0,
            stats.total_tasks(),
            geometry.segments.len(),
            geometry.leaves.len(),
            geometry.blossoms.len(),
            geometry.fruits.len()
        );

        geometry
    }
}
