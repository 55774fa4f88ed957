//! Species parameter set ("genome") in the Weber-Penn style.
//!
//! Per-level arrays are indexed by stem level (0 = trunk). All angles are in
//! degrees, lengths are relative to the parent unless stated otherwise.

use serde::{Deserialize, Serialize};

/// Envelope curve used to scale lengths and counts along a parent stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[default]
    Conical,
    Spherical,
    Hemispherical,
    Cylindrical,
    TaperedCylindrical,
    Flame,
    InverseConical,
    TendFlame,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 8] = [
        ShapeKind::Conical,
        ShapeKind::Spherical,
        ShapeKind::Hemispherical,
        ShapeKind::Cylindrical,
        ShapeKind::TaperedCylindrical,
        ShapeKind::Flame,
        ShapeKind::InverseConical,
        ShapeKind::TendFlame,
    ];

    /// Shape for a numeric tag, as found in Weber-Penn parameter tables.
    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn index(self) -> u32 {
        self as u32
    }
}

/// Leaf or blossom parameters. Blossoms reuse the same layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeafParameters {
    /// Leaves per terminal stem.
    pub count: u32,
    /// Envelope for leaf scale along the parent.
    pub scale_shape: ShapeKind,
    pub scale: f32,
    pub scale_x: f32,
    /// Distance from the parent surface to the leaf base.
    pub stem_len: f32,
    pub bot_angle: f32,
    pub mid_angle: f32,
    pub top_angle: f32,
    pub side_offset: f32,
    pub lobes: u32,
    pub lobe_angle: f32,
    pub lobe_falloff: f32,
    /// Summer colour (linear RGBA).
    pub color: [f32; 4],
    pub translucency: f32,
    pub season_offset: f32,
    pub top_convex: bool,
    /// Needles ignore the season and keep their colour year round.
    pub is_needle: bool,
}

impl Default for LeafParameters {
    fn default() -> Self {
        Self {
            count: 0,
            scale_shape: ShapeKind::Cylindrical,
            scale: 0.2,
            scale_x: 0.5,
            stem_len: 0.5,
            bot_angle: -85.0,
            mid_angle: 0.0,
            top_angle: 45.0,
            side_offset: 0.45,
            lobes: 1,
            lobe_angle: 0.0,
            lobe_falloff: 0.0,
            color: [0.0, 0.125, 0.0, 1.0],
            translucency: 0.7,
            season_offset: 0.0,
            top_convex: false,
            is_needle: false,
        }
    }
}

/// Fruit parameters. Fruit grows from blossoms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FruitParameters {
    /// Probability that a blossom turns into fruit.
    pub chance: f32,
    /// How strongly grown fruit pulls its stem towards the ground.
    pub down_force: f32,
    pub size: f32,
    /// Profile control points for the fruit mesh.
    pub shape: [f32; 4],
    pub color: [f32; 4],
}

impl Default for FruitParameters {
    fn default() -> Self {
        Self {
            chance: 0.0,
            down_force: 1.0,
            size: 0.1,
            shape: [0.5, 0.333, 0.5, 0.666],
            color: [0.25, 0.0, 0.0, 1.0],
        }
    }
}

/// Immutable per-species configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeParameters {
    /// Number of stem levels including the leaf level (1..=4).
    pub levels: u32,
    /// Fraction of each stem without children.
    pub base_size: [f32; 4],
    pub attraction_up: f32,
    /// Trunk base widening.
    pub flare: f32,
    /// Trunk cross-section lobes.
    pub lobes: u32,
    pub lobe_depth: f32,
    /// Tree size in world units.
    pub scale: f32,
    pub scale_v: f32,
    /// Trunk radius to length ratio.
    pub ratio: f32,
    /// Child radius falloff exponent.
    pub ratio_power: f32,
    pub shape: [ShapeKind; 4],
    pub base_splits: [u32; 4],
    pub seg_splits: [f32; 4],
    pub seg_split_base_offset: [f32; 4],
    pub split_angle: [f32; 4],
    pub split_angle_v: [f32; 4],
    pub branches: [u32; 4],
    pub length: [f32; 4],
    pub length_v: [f32; 4],
    pub curve: [f32; 4],
    /// Curve jitter; negative values select helix mode.
    pub curve_v: [f32; 4],
    pub curve_back: [f32; 4],
    /// Azimuth step between children; a set sign bit selects alternating placement.
    pub rotate: [f32; 4],
    pub rotate_v: [f32; 4],
    pub down_angle: [f32; 4],
    /// Down angle jitter; a set sign bit makes it depend on the position along the parent.
    pub down_angle_v: [f32; 4],
    /// Steps per stem.
    pub curve_res: [u32; 4],
    pub taper: [f32; 4],
    pub leaf: LeafParameters,
    pub blossom: LeafParameters,
    pub fruit: FruitParameters,
}

impl Default for TreeParameters {
    fn default() -> Self {
        Self::default_species()
    }
}

impl TreeParameters {
    /// Maximum number of stem levels (trunk plus three child levels).
    pub const MAX_LEVELS: u32 = 4;

    /// Leaf or blossom parameters.
    pub fn leaf_parameters(&self, is_blossom: bool) -> &LeafParameters {
        if is_blossom { &self.blossom } else { &self.leaf }
    }

    /// Index of the level whose children are leaves.
    pub fn leaf_level(&self) -> u32 {
        self.levels.clamp(1, Self::MAX_LEVELS) - 1
    }

    /// Ratio of blossoms among terminal children.
    pub fn blossom_ratio(&self) -> f32 {
        let total = self.blossom.count + self.leaf.count;
        if total == 0 {
            return 0.0;
        }
        self.blossom.count as f32 / total as f32
    }

    /// Check ranges the generator relies on.
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=Self::MAX_LEVELS).contains(&self.levels) {
            return Err(format!("levels must be in 1..={}, got {}", Self::MAX_LEVELS, self.levels));
        }
        if !self.scale.is_finite() || self.scale < 0.0 {
            return Err(format!("scale must be finite and non-negative, got {}", self.scale));
        }
        if !self.ratio.is_finite() || self.ratio < 0.0 {
            return Err(format!("ratio must be finite and non-negative, got {}", self.ratio));
        }
        for (level, &res) in self.curve_res.iter().enumerate().take(self.levels as usize) {
            if res == 0 {
                return Err(format!("curve_res[{level}] must be at least 1"));
            }
        }
        let per_level = [
            &self.base_size,
            &self.seg_splits,
            &self.split_angle,
            &self.length,
            &self.curve,
            &self.curve_v,
            &self.rotate,
            &self.down_angle,
            &self.taper,
        ];
        if per_level.iter().any(|values| values.iter().any(|v| !v.is_finite())) {
            return Err("per-level parameters must be finite".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_kind_indices() {
        for (i, kind) in ShapeKind::ALL.iter().enumerate() {
            assert_eq!(ShapeKind::from_index(i as u32), Some(*kind));
            assert_eq!(kind.index(), i as u32);
        }
        assert_eq!(ShapeKind::from_index(8), None);
    }

    #[test]
    fn test_blossom_ratio() {
        let mut params = TreeParameters::default();
        params.leaf.count = 30;
        params.blossom.count = 10;
        assert!((params.blossom_ratio() - 0.25).abs() < 1e-6);

        params.leaf.count = 0;
        params.blossom.count = 0;
        assert_eq!(params.blossom_ratio(), 0.0);
    }

    #[test]
    fn test_validate_rejects_bad_levels() {
        let mut params = TreeParameters::default();
        assert!(params.validate().is_ok());
        params.levels = 0;
        assert!(params.validate().is_err());
        params.levels = 5;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "levels": 2, "scale": 3.0 }"#;
        let params: TreeParameters = serde_json::from_str(json).unwrap();
        assert_eq!(params.levels, 2);
        assert_eq!(params.scale, 3.0);
        assert_eq!(params.leaf, TreeParameters::default_species().leaf);
    }
}
