//! Continuous level of detail for tree generation
//!
//! Two knobs scale with camera distance:
//! - leaf density: far trees keep fewer, larger leaves ([`density`]),
//! - tessellation: the pixel budget per triangle edge grows with distance.

pub mod density;

use serde::{Deserialize, Serialize};

use crate::math::map_range;

pub use density::{alive_child_count, child_scale_from_index, nth_child};

/// Densities never drop below this, so one child always survives.
pub const MIN_CHILD_DENSITY: f32 = 0.0001;

/// Largest compensating scale applied to thinned children.
pub const MAX_CHILD_SCALE: f32 = 5.0;

/// Configuration for LOD behavior
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LodConfig {
    /// Leaf density at distance zero.
    pub density_factor: f32,
    /// Distance over which leaf density halves.
    pub density_half_distance: f32,
    /// Target size of a triangle edge in pixels, close to the camera.
    pub pixels_per_triangle: f32,
    /// Distance where the pixel budget starts to grow.
    pub resolution_near: f32,
    /// Distance where the pixel budget reaches its maximum.
    pub resolution_far: f32,
    /// Pixel budget multiplier at `resolution_far` and beyond.
    pub resolution_max_scale: f32,
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            density_factor: 1.0,
            density_half_distance: 60.0,
            pixels_per_triangle: 4.0,
            resolution_near: 30.0,
            resolution_far: 60.0,
            resolution_max_scale: 4.0,
        }
    }
}

impl LodConfig {
    /// Settings for slow (software) devices: sparser leaves, coarser stems.
    pub fn low_power() -> Self {
        Self {
            density_factor: 0.9,
            density_half_distance: 30.0,
            pixels_per_triangle: 16.0,
            ..Self::default()
        }
    }

    /// Fraction of leaves kept at `distance` from the camera.
    ///
    /// # Examples
    /// ```
    /// use sylvan::lod::LodConfig;
    ///
    /// let lod = LodConfig::default();
    /// assert_eq!(lod.child_density(0.0), 1.0);
    /// assert!((lod.child_density(60.0) - 0.5).abs() < 1e-6);
    /// ```
    pub fn child_density(&self, distance: f32) -> f32 {
        let half = self.density_half_distance.max(f32::EPSILON);
        (self.density_factor * 2f32.powf(-distance / half)).clamp(MIN_CHILD_DENSITY, 1.0)
    }

    /// Density and the matching compensating scale at `distance`.
    pub fn density_and_scale(&self, distance: f32) -> (f32, f32) {
        let density = self.child_density(distance);
        (density, child_scale(density))
    }

    /// Pixel budget per triangle edge for a stem at `distance`.
    ///
    /// # Examples
    /// ```
    /// use sylvan::lod::LodConfig;
    ///
    /// let lod = LodConfig::default();
    /// assert_eq!(lod.pixels_per_triangle_at(10.0), 4.0);
    /// assert_eq!(lod.pixels_per_triangle_at(45.0), 10.0);
    /// assert_eq!(lod.pixels_per_triangle_at(500.0), 16.0);
    /// ```
    pub fn pixels_per_triangle_at(&self, distance: f32) -> f32 {
        self.pixels_per_triangle * self.resolution_scale(distance)
    }

    /// Multiplier on the pixel budget at `distance`.
    pub fn resolution_scale(&self, distance: f32) -> f32 {
        if self.resolution_far <= self.resolution_near {
            return if distance >= self.resolution_far { self.resolution_max_scale } else { 1.0 };
        }
        map_range(
            distance,
            self.resolution_near,
            self.resolution_far,
            1.0,
            self.resolution_max_scale,
        )
    }

    pub fn validate(&self) -> Result<(), String> {
        let values = [
            ("density_factor", self.density_factor),
            ("density_half_distance", self.density_half_distance),
            ("pixels_per_triangle", self.pixels_per_triangle),
            ("resolution_near", self.resolution_near),
            ("resolution_far", self.resolution_far),
            ("resolution_max_scale", self.resolution_max_scale),
        ];
        for (name, value) in values {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be finite and non-negative, got {value}"));
            }
        }
        if self.density_half_distance == 0.0 {
            return Err("density_half_distance must be positive".to_string());
        }
        if self.pixels_per_triangle == 0.0 {
            return Err("pixels_per_triangle must be positive".to_string());
        }
        Ok(())
    }
}

/// Scale that keeps leaf coverage roughly constant when only `density` of the leaves survive.
///
/// # Examples
/// ```
/// use sylvan::lod::child_scale;
///
/// assert_eq!(child_scale(1.0), 1.0);
/// assert_eq!(child_scale(0.25), 2.0);
/// assert_eq!(child_scale(0.0001), 5.0);
/// ```
pub fn child_scale(density: f32) -> f32 {
    (1.0 / density.sqrt()).clamp(1.0, MAX_CHILD_SCALE)
}
