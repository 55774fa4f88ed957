//! Season-driven leaf, blossom and fruit appearance.
//!
//! The season runs from 0 to 4 (winter, spring, summer, fall, winter).

use crate::core::types::Vec3;
use crate::math::random::{random, signed_random};
use crate::math::{map_range, saturate};
use crate::species::{LeafParameters, TreeParameters};

/// Season for one leaf, jittered so leaves do not change in lockstep.
pub fn noised_leaf_season(season: f32, seed: u32) -> f32 {
    let scale = 0.2 + 0.1 * season;
    season + scale * random(&[seed, 0xDEAD])
}

/// Growth of a leaf or blossom. Leaves fall after 3.75, blossoms after 1.75.
pub fn season_leaf_scale(season: f32, seed: u32, is_blossom: bool) -> f32 {
    let season = noised_leaf_season(season, seed);
    let mut growth = saturate(season);
    if !is_blossom {
        growth *= growth;
    }
    let fall = if is_blossom { 1.75 } else { 3.75 };
    if season < fall { growth } else { 0.0 }
}

/// Leaf colour over the year. Needles and blossoms keep their summer colour.
pub fn season_leaf_color(params: &LeafParameters, season: f32, is_blossom: bool) -> Vec3 {
    let summer = Vec3::new(params.color[0], params.color[1], params.color[2]) * 1.1;
    if params.is_needle || is_blossom {
        return summer;
    }

    let season = season.clamp(0.0, 4.0);
    let spring = summer * 1.1;
    let early_fall = Vec3::new(0.99, 0.74, 0.17) * 0.5;
    let late_fall = Vec3::new(0.55, 0.10, 0.03) * 0.5;

    let keys = [
        (spring, -1e9),
        (spring, 1.0),
        (summer, 2.3),
        (early_fall, 3.0),
        (late_fall, 3.5),
        (late_fall, 1e9),
    ];

    for pair in keys.windows(2) {
        let (from, from_t) = pair[0];
        let (to, to_t) = pair[1];
        if season < to_t {
            let t = (season - from_t) / (to_t - from_t);
            return from.lerp(to, t);
        }
    }
    late_fall
}

/// Fruit growth shared by all fruit: none before 1.5 or after 3.25.
pub fn general_fruit_progress(season: f32) -> f32 {
    if !(1.5..=3.25).contains(&season) {
        return 0.0;
    }
    (season - 1.5).min(1.0)
}

/// Fruit growth for one fruit.
pub fn season_fruit_progress(season: f32, seed: u32) -> f32 {
    general_fruit_progress(season + 0.025 * signed_random(&[seed, 0xBEAF]))
}

/// Fruit growth used for branch weight; fades out as fruit drops.
pub fn fruit_load_progress(season: f32) -> f32 {
    if season > 3.2 {
        map_range(season, 3.2, 3.3, 1.0, 0.0)
    } else {
        general_fruit_progress(season)
    }
}

/// Fruit size multiplier from its growth progress.
pub fn fruit_scale(progress: f32) -> f32 {
    progress.powf(0.25)
}

/// Whether a terminal child with this seed is a blossom rather than a leaf.
pub fn is_leaf_blossom(params: &TreeParameters, child_seed: u32) -> bool {
    random(&[child_seed]) < params.blossom_ratio()
}
