//! Geometric model of a stem: envelope curves, radius profile, centerline
//! spline and seasonal appearance. All functions are pure.

pub mod season;
pub mod shape;
pub mod spline;

pub use shape::{fake_ao_from_distance, flare, lobe_factor, shape_ratio, tapered_radius};
pub use spline::{stem_spline, stem_spline_derivative};
