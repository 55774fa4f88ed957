//! Sylvan - deterministic procedural trees with continuous LOD

pub mod core;
pub mod math;
pub mod species;
pub mod environment;
pub mod model;
pub mod lod;
pub mod visibility;
pub mod generation;
