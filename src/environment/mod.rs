//! Seasonal and wind inputs read by tree generation.
//!
//! These values are driven from outside (time of day, UI sliders) and are
//! snapshotted once per generation pass.

use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::core::types::{Vec2, Vec3};

/// Seed of the wind noise. Fixed so wind is coherent across trees.
const WIND_NOISE_SEED: u32 = 0x57_1D;

/// External environment state.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Environment {
    /// Season in `[0, 4]`: 0 winter, 1 spring, 2 summer, 3 fall, 4 winter.
    pub season: f32,
    /// Wind strength; 0 disables sway.
    pub wind_strength: f32,
    /// Wind direction in radians around +Y.
    pub wind_direction: f32,
    /// Animation time in seconds.
    pub time: f32,
    /// Upward attraction for higher stem levels. `None` uses the species value.
    pub attraction_up: Option<f32>,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            season: 2.0,
            wind_strength: 2.0,
            wind_direction: 0.0,
            time: 0.0,
            attraction_up: None,
        }
    }
}

impl Environment {
    /// Calm summer day with no wind.
    pub fn calm() -> Self {
        Self {
            wind_strength: 0.0,
            ..Self::default()
        }
    }

    pub fn with_season(mut self, season: f32) -> Self {
        self.season = season;
        self
    }

    pub fn with_wind(mut self, strength: f32, direction: f32) -> Self {
        self.wind_strength = strength;
        self.wind_direction = direction;
        self
    }

    /// Attraction for this pass, preferring the environment override.
    pub fn attraction_up_or(&self, species_value: f32) -> f32 {
        self.attraction_up.unwrap_or(species_value)
    }

    pub fn wind_field(&self) -> WindField {
        WindField::new(self.wind_strength, self.wind_direction, self.time)
    }

    pub fn validate(&self) -> Result<(), String> {
        let values = [
            ("season", self.season),
            ("wind_strength", self.wind_strength),
            ("wind_direction", self.wind_direction),
            ("time", self.time),
        ];
        for (name, value) in values {
            if !value.is_finite() {
                return Err(format!("{name} must be finite, got {value}"));
            }
        }
        if self.wind_strength < 0.0 {
            return Err(format!("wind_strength must be non-negative, got {}", self.wind_strength));
        }
        if let Some(a) = self.attraction_up.filter(|a| !a.is_finite()) {
            return Err(format!("attraction_up must be finite, got {a}"));
        }
        Ok(())
    }
}

/// Coherent wind: a direction plus a noise phase that varies smoothly in space and time.
pub struct WindField {
    noise: Perlin,
    strength: f32,
    direction: Vec3,
    time: f32,
}

impl WindField {
    pub fn new(strength: f32, direction_radians: f32, time: f32) -> Self {
        Self {
            noise: Perlin::new(WIND_NOISE_SEED),
            strength,
            direction: Vec3::new(-direction_radians.cos(), 0.0, direction_radians.sin()),
            time,
        }
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    /// Horizontal unit vector the wind blows towards.
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Gust phase at `position` for a stem swaying at `frequency`.
    ///
    /// The noise field scrolls along the wind direction over time, so
    /// neighbouring stems move together.
    pub fn phase(&self, position: Vec3, frequency: f32) -> f32 {
        let wind_xz = Vec2::new(self.direction.x, self.direction.z);
        let scroll = self.time * frequency * (self.strength * 0.06).max(0.8);
        let p = Vec2::new(position.x, position.z) * 0.75 - wind_xz * scroll;
        0.4 + self.noise.get([p.x as f64, p.y as f64]) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_environment_is_valid() {
        assert!(Environment::default().validate().is_ok());
        assert!(Environment::calm().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_nan() {
        let env = Environment {
            season: f32::NAN,
            ..Environment::default()
        };
        assert!(env.validate().is_err());

        let env = Environment::default().with_wind(-1.0, 0.0);
        assert!(env.validate().is_err());
    }

    #[test]
    fn test_attraction_override() {
        let mut env = Environment::default();
        assert_eq!(env.attraction_up_or(0.5), 0.5);
        env.attraction_up = Some(2.0);
        assert_eq!(env.attraction_up_or(0.5), 2.0);
    }

    #[test]
    fn test_wind_direction_is_horizontal_unit() {
        for i in 0..8 {
            let field = WindField::new(1.0, i as f32 * 0.8, 0.0);
            let d = field.direction();
            assert_eq!(d.y, 0.0);
            assert!((d.length() - 1.0).abs() < 1e-5);
        }
        // Direction 0 blows towards -X
        assert!((WindField::new(1.0, 0.0, 0.0).direction() - Vec3::NEG_X).length() < 1e-6);
    }

    #[test]
    fn test_wind_phase_is_deterministic_and_bounded() {
        let a = WindField::new(3.0, 0.3, 1.5);
        let b = WindField::new(3.0, 0.3, 1.5);
        for i in 0..50 {
            let p = Vec3::new(i as f32 * 0.37, 2.0, i as f32 * -0.21);
            let phase = a.phase(p, 1.2);
            assert_eq!(phase, b.phase(p, 1.2));
            assert!(phase.is_finite());
            assert!((-0.7..=1.5).contains(&phase));
        }
    }
}
