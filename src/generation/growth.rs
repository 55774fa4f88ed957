//! Growth rules applied to a stem walker at every step, and child orientation.
//!
//! Angles in the species parameters are in degrees; everything returned here
//! is a rotation or an angle in radians unless noted.

use std::f32::consts::TAU;

use crate::core::types::{Quat, Vec3};
use crate::environment::WindField;
use crate::math::quat::{axis_angle, heading, rotate_x, rotate_y, rotate_z};
use crate::math::random::{random, signed_random};
use crate::math::{bit_sign, is_sign_bit_set, map_range, saturate};
use crate::model::season::{fruit_load_progress, fruit_scale};
use crate::model::shape::shape_ratio;
use crate::species::{ShapeKind, TreeParameters};

/// Curve angle in degrees for one step of a stem at height `z`.
///
/// With a back curve the stem bends by `curve` in its lower half and by
/// `curve_back` in its upper half, blending between 40% and 60% height.
pub fn stem_curve(params: &TreeParameters, level: u32, resolution: f32, seed: u32, z: f32) -> f32 {
    let l = level as usize;
    let mut angle = params.curve_v[l] / resolution * signed_random(&[seed, 6]);
    if params.curve_back[l] == 0.0 {
        angle += params.curve[l] / resolution;
    } else {
        let alpha = map_range(z, 0.4, 0.6, 0.0, 1.0);
        let curve = params.curve[l] + (params.curve_back[l] - params.curve[l]) * alpha;
        angle += curve / (resolution * 0.5);
    }
    angle
}

/// Bend the walker for one step. A negative `curve_v` selects a helix.
pub fn apply_curve(
    rotation: Quat,
    params: &TreeParameters,
    level: u32,
    resolution: f32,
    seed: u32,
    z: f32,
    split_correction: f32,
) -> Quat {
    let curve_v = params.curve_v[level as usize];
    if curve_v >= 0.0 {
        let curve = stem_curve(params, level, resolution, seed, z);
        rotation * rotate_x((curve + split_correction).to_radians())
    } else {
        rotation * rotate_x(curve_v.abs().to_radians() / resolution) * rotate_z(TAU / resolution)
    }
}

fn declination_degrees(rotation: Quat) -> f32 {
    heading(rotation).y.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Turn a new clone away from its parent.
///
/// The split angle shrinks with the current declination. The remaining steps
/// take back the split angle through `split_correction` (degrees), so the
/// clone's overall course stays close to an unsplit stem.
pub fn add_split_spread(
    rotation: Quat,
    params: &TreeParameters,
    level: u32,
    seed: u32,
    step: u32,
    split_correction: &mut f32,
) -> Quat {
    let l = level as usize;
    let declination = declination_degrees(rotation);
    let jitter = params.split_angle_v[l] * signed_random(&[seed, 0xFA]);
    let split_angle = (params.split_angle[l] + jitter - declination).max(0.0);

    let remaining_steps = params.curve_res[l] as i64 - step as i64 - 1;
    if remaining_steps != 0 {
        *split_correction -= split_angle / remaining_steps as f32;
    }

    let rotation = rotation * rotate_x(split_angle.to_radians());

    let declination = declination_degrees(rotation);
    let r = random(&[seed, 900]);
    let mut spread = (20.0 + 0.75 * (30.0 + (declination - 90.0).abs())) * r * r;
    if random(&[seed, step, 2]) < 0.5 {
        spread = -spread;
    }

    rotate_y(spread.to_radians()) * rotation
}

/// Upward attraction for a stem of `level` in `season`.
///
/// Higher levels use `attraction_up`. Winter snow pulls every level down and
/// so does the expected fruit load on levels that carry fruit.
pub fn vertical_attraction(
    params: &TreeParameters,
    level: u32,
    attraction_up: f32,
    season: f32,
) -> f32 {
    let mut attraction = if level > 1 { attraction_up } else { 0.0 };

    const SNOW: f32 = 0.2;
    let d = 2.0 - (season - 2.0).abs();
    attraction += (d * d / SNOW - SNOW).min(0.0);

    if level > 0 && params.fruit.chance > 0.0 {
        let level_factor = 1.0 / 4f32.powi(params.levels as i32 - level as i32 - 1);
        let size = 15.0 * params.fruit.size * fruit_scale(fruit_load_progress(season));
        let volume = size * size * size;
        attraction -= level_factor * params.blossom.count as f32 * params.fruit.chance * volume;
    }
    attraction
}

/// Bend the heading towards (positive) or away from (negative) world up.
pub fn add_vertical_attraction(rotation: Quat, attraction: f32, resolution: f32) -> Quat {
    let axis = heading(rotation);
    if attraction == 0.0 || axis.y >= 0.9999 {
        return rotation;
    }

    // Fade out when pointing straight down
    let c = saturate(map_range(axis.y, 1.0, 0.95, 0.0, 1.0));
    let declination = axis.y.clamp(-1.0, 1.0).acos();
    let angle = attraction * (declination * declination.sin()).abs() / resolution;

    let bend_axis = Vec3::new(-axis.z, 0.0, axis.x);
    if bend_axis.length_squared() <= f32::EPSILON * f32::EPSILON {
        return rotation;
    }
    axis_angle(bend_axis, angle * c) * rotation
}

/// Sway a stem of `radius` and `length` towards the wind.
///
/// Thin stems bend more, long stems sway slower. `position` samples the gust
/// phase so neighbouring stems move together.
pub fn add_wind_sway(
    rotation: Quat,
    wind: &WindField,
    radius: f32,
    length: f32,
    resolution: f32,
    position: Vec3,
) -> Quat {
    let wind_dir = wind.direction();
    let z = heading(rotation);
    let d = z.dot(wind_dir).clamp(-1.0, 1.0);

    let axis = z.cross(wind_dir);
    if axis.length_squared() <= 1e-12 {
        return rotation;
    }

    let c = saturate(map_range(d, -1.0, -0.95, 0.0, 1.0));
    let angle = d.acos() * wind.strength() * 0.003 / radius.max(0.03) * c / resolution;

    let frequency = (2.0 / length.sqrt()).min(5.0);
    let phase = wind.phase(position, frequency);

    axis_angle(axis, angle * phase) * rotation
}

/// Rotate a fruit towards the ground by `force` times its angle to straight down.
pub fn add_fruit_weight(rotation: Quat, force: f32) -> Quat {
    let z = heading(rotation);
    if z.y <= -1.0 {
        return rotation;
    }
    // cross(z, -Y)
    let axis = Vec3::new(z.z, 0.0, -z.x);
    if axis.length_squared() <= 1e-12 {
        return rotation;
    }
    let angle = (-z.y).clamp(-1.0, 1.0).acos();
    axis_angle(axis, angle * force) * rotation
}

/// Down angle between a child and its parent, as a rotation about the local X axis.
///
/// A negative down-angle jitter makes the jitter depend on where the child
/// sits along the parent (`ratio`, 1 at the base).
pub fn child_down_rotation(
    params: &TreeParameters,
    parent_level: u32,
    seed: u32,
    ratio: f32,
) -> Quat {
    let next = (parent_level + 1).min(3) as usize;

    let down_v = params.down_angle_v[next];
    let mut down = down_v * random(&[seed, 1998]);
    if is_sign_bit_set(down_v) {
        down *= 1.0 - 2.0 * shape_ratio(ShapeKind::Conical, ratio);
    }
    down += params.down_angle[next];
    rotate_x(down.to_radians())
}

/// Azimuth of child `index` around its parent, in radians.
///
/// Children are spread by a fixed `rotate` step; a negative `rotate` places
/// them on alternating sides instead. Jitter of earlier children is not
/// carried over to later ones.
pub fn child_azimuth(params: &TreeParameters, parent_level: u32, seed: u32, index: u32) -> f32 {
    let next = (parent_level + 1).min(3) as usize;

    let rotate = params.rotate[next];
    let rotate_v = params.rotate_v[next];
    let jitter = rotate_v * signed_random(&[seed, 50]);
    if !is_sign_bit_set(rotate) {
        return (index as f32 * rotate + jitter).to_radians();
    }
    bit_sign(index, 0) * (180.0 - rotate + jitter).to_radians()
}

/// Orientation of a child: down angle inside the parent frame, then azimuth
/// about the parent's heading.
pub fn child_orientation(parent: Quat, down: Quat, azimuth: f32) -> Quat {
    axis_angle(heading(parent), azimuth) * (parent * down)
}
