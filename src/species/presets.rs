//! Built-in species presets

use super::params::{FruitParameters, LeafParameters, ShapeKind, TreeParameters};

use ShapeKind::*;

impl TreeParameters {
    /// Apple: three levels, split-happy branches, blossoms and heavy fruit.
    pub fn apple() -> Self {
        Self {
            levels: 3,
            base_size: [0.15, 0.217, 0.0, 0.05],
            attraction_up: 2.0,
            flare: 0.9,
            lobes: 0,
            lobe_depth: 0.0,
            scale: 4.5,
            scale_v: 1.0,
            ratio: 0.02,
            ratio_power: 1.5,
            shape: [Hemispherical, Hemispherical, TaperedCylindrical, Conical],
            base_splits: [0, 0, 0, 0],
            seg_splits: [0.0, 0.474, 0.0, 0.0],
            seg_split_base_offset: [0.0; 4],
            split_angle: [0.0, 20.0, 0.0, 0.0],
            split_angle_v: [0.0, 10.0, 0.0, 0.0],
            branches: [0, 28, 100, 10],
            length: [1.0, 0.5, 0.4, 0.0],
            length_v: [0.0, 0.0, 0.1, 0.0],
            curve: [0.0, -20.0, 0.0, 0.0],
            curve_v: [30.0, 140.0, 100.0, 0.0],
            curve_back: [0.0; 4],
            rotate: [0.0, 140.0, 140.0, 77.0],
            rotate_v: [0.0; 4],
            down_angle: [0.0, 60.0, 60.0, 45.0],
            down_angle_v: [0.0, -30.0, 20.0, 30.0],
            curve_res: [5, 10, 5, 1],
            taper: [1.0; 4],
            leaf: LeafParameters {
                count: 13,
                scale_shape: Cylindrical,
                scale: 0.085,
                scale_x: 0.465,
                stem_len: 0.01,
                color: [0.0, 0.225, 0.0, 1.0],
                season_offset: -0.186,
                ..LeafParameters::default()
            },
            blossom: LeafParameters {
                count: 10,
                scale_shape: Cylindrical,
                scale: 0.0495,
                scale_x: 0.612,
                stem_len: 0.01,
                lobes: 4,
                lobe_angle: 39.556,
                lobe_falloff: 0.02,
                color: [0.48, 0.35, 0.48, 1.0],
                ..LeafParameters::default()
            },
            fruit: FruitParameters {
                chance: 0.03,
                down_force: 1.0,
                size: 0.06,
                shape: [0.685, -0.4, 0.74, 1.1],
                color: [0.293_023_23, 0.104_214_2, 0.040_886_965, 1.0],
            },
        }
    }

    /// Sassafras: four levels with strongly curved, lobed limbs.
    pub fn sassafras() -> Self {
        Self {
            levels: 4,
            base_size: [0.2, 0.05, 0.05, 0.05],
            attraction_up: 0.5,
            flare: 0.5,
            lobes: 3,
            lobe_depth: 0.05,
            scale: 11.4625,
            scale_v: 3.5,
            ratio: 0.02,
            ratio_power: 1.3,
            shape: [Hemispherical, Conical, Conical, TaperedCylindrical],
            base_splits: [0, 0, 0, 0],
            seg_splits: [0.0; 4],
            seg_split_base_offset: [0.0; 4],
            split_angle: [20.0, 0.0, 0.0, 0.0],
            split_angle_v: [5.0, 0.0, 0.0, 0.0],
            branches: [0, 15, 20, 30],
            length: [1.0, 0.4, 0.7, 0.4],
            length_v: [0.0; 4],
            curve: [0.0, -60.0, -40.0, 0.0],
            curve_v: [10.0, 200.0, 300.0, 200.0],
            curve_back: [0.0, 30.0, 0.0, 0.0],
            rotate: [0.0, 140.0, 140.0, 140.0],
            rotate_v: [0.0; 4],
            down_angle: [0.0, 90.0, 50.0, 45.0],
            down_angle_v: [0.0, -10.0, 10.0, 10.0],
            curve_res: [16, 15, 8, 3],
            taper: [1.05, 1.0, 1.0, 1.0],
            leaf: LeafParameters {
                count: 12,
                scale_shape: Cylindrical,
                scale: 0.125,
                scale_x: 0.286,
                stem_len: 0.01,
                bot_angle: -85.889,
                mid_angle: -40.0,
                top_angle: 90.0,
                side_offset: 0.63,
                lobes: 3,
                lobe_angle: 32.285,
                lobe_falloff: 0.123,
                color: [0.0, 0.25, 0.0, 1.0],
                season_offset: 0.347,
                top_convex: true,
                ..LeafParameters::default()
            },
            blossom: LeafParameters {
                count: 8,
                scale_shape: Cylindrical,
                scale: 0.0505,
                scale_x: 0.303,
                stem_len: 0.01,
                top_angle: 90.0,
                lobes: 5,
                lobe_angle: 40.0,
                color: [0.818_493_1, 0.590_216_6, 0.005_606_096, 1.0],
                top_convex: true,
                ..LeafParameters::default()
            },
            fruit: FruitParameters {
                chance: 0.2,
                down_force: 0.5,
                size: 0.025,
                shape: [0.649, 0.0, 0.5, 1.0],
                color: [0.013_326_132, 0.014_881_321, 0.037_209_332, 1.0],
            },
        }
    }

    /// Palm: a bumpy trunk topped by a crown of long drooping fronds.
    pub fn palm() -> Self {
        Self {
            levels: 2,
            base_size: [0.95, 0.05, 0.05, 0.05],
            attraction_up: 0.0,
            flare: 0.0,
            lobes: 0,
            lobe_depth: 0.0,
            scale: 6.0,
            scale_v: 1.5,
            ratio: 0.015,
            ratio_power: 2.0,
            shape: [TaperedCylindrical, TaperedCylindrical, Conical, Conical],
            base_splits: [0, 0, 0, 0],
            seg_splits: [0.0; 4],
            seg_split_base_offset: [0.0; 4],
            split_angle: [0.0; 4],
            split_angle_v: [0.0; 4],
            branches: [0, 33, 0, 0],
            length: [1.0, 0.4, 0.0, 0.0],
            length_v: [0.0, 0.05, 0.0, 0.0],
            curve: [20.0, 50.0, 0.0, 0.0],
            curve_v: [10.0, 20.0, 0.0, 0.0],
            curve_back: [-5.0, 0.0, 0.0, 0.0],
            rotate: [0.0, 120.0, -120.0, 0.0],
            rotate_v: [0.0, 60.0, 20.0, 0.0],
            down_angle: [0.0, 70.0, 50.0, 0.0],
            down_angle_v: [0.0, -80.0, -50.0, 0.0],
            curve_res: [12, 9, 1, 1],
            taper: [2.1, 1.0, 0.0, 0.0],
            leaf: LeafParameters {
                count: 250,
                scale_shape: Cylindrical,
                scale: 0.3,
                scale_x: 0.06,
                stem_len: 0.01,
                color: [0.020_941_045, 0.102_325_56, 0.020_941_045, 1.0],
                season_offset: -0.75,
                ..LeafParameters::default()
            },
            blossom: LeafParameters {
                count: 0,
                scale: 0.1,
                stem_len: 0.01,
                lobes: 5,
                ..LeafParameters::default()
            },
            fruit: FruitParameters {
                chance: 0.0,
                down_force: 0.0,
                ..FruitParameters::default()
            },
        }
    }

    /// Tamarack: a conifer with needles that keep their colour.
    pub fn tamarack() -> Self {
        Self {
            levels: 3,
            base_size: [0.1, 0.05, 0.05, 0.05],
            attraction_up: 0.5,
            flare: 0.4,
            lobes: 0,
            lobe_depth: 0.0,
            scale: 10.925,
            scale_v: 1.5,
            ratio: 0.015,
            ratio_power: 1.3,
            shape: [Conical, Conical, TaperedCylindrical, Conical],
            base_splits: [0, 0, 0, 0],
            seg_splits: [0.0; 4],
            seg_split_base_offset: [0.0; 4],
            split_angle: [0.0; 4],
            split_angle_v: [0.0; 4],
            branches: [0, 75, 50, 0],
            length: [1.0, 0.4, 0.2, 0.0],
            length_v: [0.0; 4],
            curve: [0.0, -30.0, 0.0, 0.0],
            curve_v: [0.0, 120.0, 180.0, 0.0],
            curve_back: [0.0; 4],
            rotate: [0.0, 140.0, 140.0, 140.0],
            rotate_v: [0.0; 4],
            down_angle: [0.0, 55.0, 45.0, 45.0],
            down_angle_v: [0.0, -45.0, 10.0, 10.0],
            curve_res: [8, 8, 8, 1],
            taper: [0.9, 1.0, 1.0, 0.0],
            leaf: LeafParameters {
                count: 50,
                scale_shape: Cylindrical,
                scale: 0.1,
                scale_x: 0.35,
                stem_len: 0.0,
                color: [0.0, 0.2, 0.0, 1.0],
                season_offset: -1.0,
                is_needle: true,
                ..LeafParameters::default()
            },
            blossom: LeafParameters {
                count: 0,
                scale: 0.1,
                stem_len: 0.0,
                lobes: 5,
                ..LeafParameters::default()
            },
            fruit: FruitParameters {
                chance: 0.0,
                down_force: 0.0,
                ..FruitParameters::default()
            },
        }
    }

    /// Fallback species: a plain three-level tree without splits or curvature.
    pub fn default_species() -> Self {
        Self {
            levels: 3,
            base_size: [0.25, 0.05, 0.05, 0.05],
            attraction_up: 0.0,
            flare: 0.5,
            lobes: 0,
            lobe_depth: 0.0,
            scale: 10.0,
            scale_v: 0.0,
            ratio: 0.05,
            ratio_power: 1.0,
            shape: [Conical; 4],
            base_splits: [0, 0, 0, 0],
            seg_splits: [0.0; 4],
            seg_split_base_offset: [0.0; 4],
            split_angle: [0.0; 4],
            split_angle_v: [0.0; 4],
            branches: [1, 10, 5, 0],
            length: [1.0, 0.5, 0.5, 0.0],
            length_v: [0.0; 4],
            curve: [0.0; 4],
            curve_v: [0.0; 4],
            curve_back: [0.0; 4],
            rotate: [0.0, 120.0, 120.0, 120.0],
            rotate_v: [0.0; 4],
            down_angle: [0.0, 30.0, 30.0, 30.0],
            down_angle_v: [0.0; 4],
            curve_res: [3, 3, 1, 0],
            taper: [1.0, 1.0, 1.0, 0.0],
            leaf: LeafParameters {
                count: 100,
                ..LeafParameters::default()
            },
            blossom: LeafParameters {
                count: 0,
                lobes: 5,
                ..LeafParameters::default()
            },
            fruit: FruitParameters::default(),
        }
    }
}
