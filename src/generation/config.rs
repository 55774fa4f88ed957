//! Generation configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::camera::CameraConfig;
use crate::core::{Error, Result};
use crate::environment::Environment;
use crate::generation::clones::MAX_WORKERS;
use crate::lod::LodConfig;
use crate::species::TreeType;

/// Record limits, per task and per generation pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordCapacity {
    /// Segment slots one stem may request, visible or not.
    pub segments_per_task: u32,
    /// Children (stems or leaves) one stem may spawn.
    pub children_per_task: u32,
    pub segments: usize,
    pub leaves: usize,
    pub blossoms: usize,
    pub fruits: usize,
    /// Stem tasks across all levels.
    pub tasks: usize,
}

impl Default for RecordCapacity {
    fn default() -> Self {
        Self {
            segments_per_task: 128,
            children_per_task: 128,
            segments: 1 << 16,
            leaves: 1 << 18,
            blossoms: 1 << 18,
            fruits: 1 << 16,
            tasks: 1 << 16,
        }
    }
}

/// Everything a generation pass reads besides the species parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub tree_type: TreeType,
    pub seed: u32,
    /// World position of the trunk base.
    pub position: [f32; 3],
    pub environment: Environment,
    pub lod: LodConfig,
    pub camera: CameraConfig,
    /// Worker lanes per stem task (1..=32). Also bounds the number of clones.
    pub workers_per_group: u32,
    pub capacity: RecordCapacity,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            tree_type: TreeType::Default,
            seed: 1,
            position: [0.0; 3],
            environment: Environment::default(),
            lod: LodConfig::default(),
            camera: CameraConfig::default(),
            workers_per_group: MAX_WORKERS,
            capacity: RecordCapacity::default(),
        }
    }
}

impl GenerationConfig {
    /// Profile for software rasterizers: four lanes and a coarse pixel budget.
    pub fn low_power() -> Self {
        Self {
            lod: LodConfig::low_power(),
            workers_per_group: 4,
            ..Self::default()
        }
    }

    /// Lane count actually used.
    pub fn workers(&self) -> u32 {
        self.workers_per_group.clamp(1, MAX_WORKERS)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded generation config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_WORKERS).contains(&self.workers_per_group) {
            return Err(Error::InvalidConfig(format!(
                "workers_per_group must be in 1..={MAX_WORKERS}, got {}",
                self.workers_per_group
            )));
        }
        if self.position.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidConfig("position must be finite".to_string()));
        }
        self.environment
            .validate()
            .map_err(|msg| Error::InvalidConfig(format!("environment: {msg}")))?;
        self.lod
            .validate()
            .map_err(|msg| Error::InvalidConfig(format!("lod: {msg}")))?;

        let camera = &self.camera;
        let camera_values = [
            camera.yaw,
            camera.pitch,
            camera.distance,
            camera.fov_y,
            camera.near,
            camera.far,
        ];
        if camera_values.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidConfig("camera values must be finite".to_string()));
        }
        if !(camera.fov_y > 0.0 && camera.fov_y < 180.0) {
            return Err(Error::InvalidConfig(format!(
                "camera fov_y must be in (0, 180), got {}",
                camera.fov_y
            )));
        }
        if !(camera.near > 0.0 && camera.far > camera.near) {
            return Err(Error::InvalidConfig(format!(
                "camera planes must satisfy 0 < near < far, got {} and {}",
                camera.near, camera.far
            )));
        }
        if camera.render_size.iter().any(|&v| !(v >= 1.0 && v.is_finite())) {
            return Err(Error::InvalidConfig("render_size must be at least 1x1".to_string()));
        }

        let capacity = &self.capacity;
        if capacity.segments_per_task == 0 || capacity.children_per_task == 0 {
            return Err(Error::InvalidConfig("per-task capacities must be positive".to_string()));
        }
        if capacity.children_per_task > 128 {
            return Err(Error::InvalidConfig(format!(
                "children_per_task must be at most 128, got {}",
                capacity.children_per_task
            )));
        }
        Ok(())
    }
}
