//! Stem envelope and cross-section functions

use crate::math::saturate;
use crate::species::{ShapeKind, TreeParameters};

/// Envelope value of `shape` at `ratio` in `[0, 1]`.
pub fn shape_ratio(shape: ShapeKind, ratio: f32) -> f32 {
    use std::f32::consts::PI;

    let flame = |r: f32| if r <= 0.7 { r / 0.7 } else { (1.0 - r) / 0.3 };

    match shape {
        // Arbaro variant; the paper uses 0.2 + 0.8 * ratio
        ShapeKind::Conical => ratio,
        ShapeKind::Spherical => 0.2 + 0.8 * (PI * ratio).sin(),
        ShapeKind::Hemispherical => 0.2 + 0.8 * (0.5 * PI * ratio).sin(),
        ShapeKind::Cylindrical => 1.0,
        ShapeKind::TaperedCylindrical => 0.5 + 0.5 * ratio,
        ShapeKind::Flame => flame(ratio),
        ShapeKind::InverseConical => 1.0 - 0.8 * ratio,
        ShapeKind::TendFlame => 0.5 + 0.5 * flame(ratio),
    }
}

fn smooth_abs(x: f32) -> f32 {
    (x * x + 0.00001).sqrt()
}

/// Trunk base widening factor. Only the trunk flares, over its lowest eighth.
pub fn flare(level: u32, params: &TreeParameters, z: f32) -> f32 {
    if level != 0 {
        return 1.0;
    }
    let y = (1.0 - 8.0 * z).max(0.0);
    params.flare * (100f32.powf(y) - 1.0) / 100.0 + 1.0
}

/// Radius of a stem at normalized height `z`.
///
/// `length` and `radius` are the stem's total length and base radius. The
/// per-level taper selects the profile: `< 1` and `[1, 2)` are linear tapers
/// (1 is a full cone), `2` keeps the radius constant, and `(2, 3]` produces
/// periodic palm-trunk bumps. The tip is closed with a rounded cap and the
/// radius is exactly zero at `z = 1`.
pub fn tapered_radius(
    level: u32,
    length: f32,
    radius: f32,
    params: &TreeParameters,
    z: f32,
) -> f32 {
    if z > 0.9999 {
        return 0.0;
    }

    let mut taper = params.taper[level.min(3) as usize];
    if taper < 1.0 {
        taper = 2.0 - taper;
    }
    taper -= 1.0;

    let is_palm = taper >= 1.0;

    let unit_taper = (1.0 - taper).max(0.0);
    let tr = radius * (1.0 - unit_taper * z);
    if tr <= 0.0 {
        return 0.0;
    }

    let z2 = (1.0 - z) * length;
    let z3 = if is_palm {
        smooth_abs(z2 - 2.0 * tr * (z2 / (2.0 * tr)).round_ties_even())
    } else {
        z2
    };

    let a = tr * tr;
    let b = (z3 - tr) * (z3 - tr);
    let r = (a - b).max(0.0).sqrt();

    let mut depth = 0.0;
    if is_palm && z2 >= tr {
        depth = 2.0 - taper;
    }
    if !is_palm && z3 >= tr {
        depth = 1.0;
    }

    let tapered = r + (tr - r) * depth;
    tapered * flare(level, params, z)
}

/// Cross-section lobe multiplier at angle `theta`, fading out as `t` reaches 1.
pub fn lobe_factor(params: &TreeParameters, theta: f32, t: f32) -> f32 {
    let lobed = 1.0 + params.lobe_depth * (params.lobes as f32 * theta).sin();
    lobed + (1.0 - lobed) * saturate(t)
}

/// Cheap ambient occlusion from the distance travelled along the tree.
pub fn fake_ao_from_distance(distance: f32) -> f32 {
    (1.0 - distance * 0.015).clamp(0.8, 1.0).powi(3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::TreeType;

    fn params_with_taper(taper: f32) -> TreeParameters {
        let mut params = TreeParameters::default_species();
        params.taper = [taper; 4];
        params.flare = 0.5;
        params
    }

    #[test]
    fn test_shape_ratio_values() {
        assert_eq!(shape_ratio(ShapeKind::Conical, 0.3), 0.3);
        assert_eq!(shape_ratio(ShapeKind::Cylindrical, 0.3), 1.0);
        assert!((shape_ratio(ShapeKind::Spherical, 0.5) - 1.0).abs() < 1e-6);
        assert!((shape_ratio(ShapeKind::Hemispherical, 1.0) - 1.0).abs() < 1e-6);
        assert_eq!(shape_ratio(ShapeKind::TaperedCylindrical, 0.0), 0.5);
        assert!((shape_ratio(ShapeKind::Flame, 0.7) - 1.0).abs() < 1e-6);
        assert!(shape_ratio(ShapeKind::Flame, 1.0).abs() < 1e-6);
        assert!((shape_ratio(ShapeKind::InverseConical, 1.0) - 0.2).abs() < 1e-6);
        assert!((shape_ratio(ShapeKind::TendFlame, 0.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_radius_is_zero_at_tip_for_every_species() {
        for tree_type in TreeType::ALL {
            let params = TreeParameters::for_type(tree_type);
            for level in 0..4 {
                let tip = tapered_radius(level, 5.0, 0.2, &params, 1.0);
                assert_eq!(tip, 0.0, "{tree_type:?} level {level}");
            }
        }
    }

    #[test]
    fn test_radius_at_base_includes_flare() {
        let flared = [
            TreeType::Apple,
            TreeType::Sassafras,
            TreeType::Tamarack,
            TreeType::Default,
        ];
        for tree_type in flared {
            let params = TreeParameters::for_type(tree_type);
            let r = tapered_radius(0, 10.0, 0.2, &params, 0.0);
            let expected = 0.2 * flare(0, &params, 0.0);
            assert!((r - expected).abs() < 1e-5, "{tree_type:?}: {r} vs {expected}");
        }
    }

    #[test]
    fn test_full_cone_is_linear() {
        let params = params_with_taper(1.0);
        for i in 1..8 {
            let z = i as f32 / 10.0;
            // Above the flare region on a child level
            let r = tapered_radius(1, 10.0, 0.2, &params, z);
            assert!((r - 0.2 * (1.0 - z)).abs() < 1e-5);
        }
    }

    #[test]
    fn test_no_taper_keeps_radius() {
        let params = params_with_taper(2.0);
        for i in 0..19 {
            let z = i as f32 / 20.0;
            let r = tapered_radius(1, 10.0, 0.2, &params, z);
            assert!((r - 0.2).abs() < 1e-5, "z={z}: {r}");
            // Trunk differs only by the flare at the base
            let trunk = tapered_radius(0, 10.0, 0.2, &params, z);
            assert!((trunk - 0.2 * flare(0, &params, z)).abs() < 1e-5);
        }
    }

    #[test]
    fn test_palm_bumps_stay_within_radius() {
        let params = TreeParameters::palm();
        for i in 0..100 {
            let z = i as f32 / 100.0;
            let r = tapered_radius(0, 6.0, 0.09, &params, z);
            assert!(r.is_finite());
            assert!(r >= 0.0 && r <= 0.09 + 1e-5, "z={z}: {r}");
        }
    }

    #[test]
    fn test_zero_radius_is_safe() {
        let params = TreeParameters::palm();
        assert_eq!(tapered_radius(0, 6.0, 0.0, &params, 0.5), 0.0);
    }

    #[test]
    fn test_flare_only_on_trunk_base() {
        let params = params_with_taper(1.0);
        assert!((flare(0, &params, 0.0) - (1.0 + 0.5 * 99.0 / 100.0)).abs() < 1e-4);
        assert_eq!(flare(0, &params, 0.125), 1.0);
        assert_eq!(flare(0, &params, 0.5), 1.0);
        assert_eq!(flare(1, &params, 0.0), 1.0);
    }

    #[test]
    fn test_lobe_factor_fades() {
        let mut params = TreeParameters::sassafras();
        params.lobe_depth = 0.1;
        let theta = std::f32::consts::FRAC_PI_2 / params.lobes as f32;
        assert!((lobe_factor(&params, theta, 0.0) - 1.1).abs() < 1e-5);
        assert_eq!(lobe_factor(&params, theta, 1.0), 1.0);
    }

    #[test]
    fn test_fake_ao_range() {
        assert_eq!(fake_ao_from_distance(0.0), 1.0);
        assert!((fake_ao_from_distance(100.0) - 0.512).abs() < 1e-5);
        assert!(fake_ao_from_distance(5.0) < 1.0);
    }
}
