//! Tree species: parameter sets and the providers that hand them out.
//!
//! Generation never looks a species up by itself. It receives a
//! [`TreeParameters`] value from a [`ParameterProvider`] once per pass.

pub mod library;
pub mod params;
pub mod presets;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::Error;

pub use library::SpeciesLibrary;
pub use params::{FruitParameters, LeafParameters, ShapeKind, TreeParameters};

/// Built-in species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeType {
    #[default]
    Apple,
    Sassafras,
    Palm,
    Tamarack,
    /// Plain fallback tree.
    Default,
}

impl TreeType {
    pub const ALL: [TreeType; 5] = [
        TreeType::Apple,
        TreeType::Sassafras,
        TreeType::Palm,
        TreeType::Tamarack,
        TreeType::Default,
    ];

    /// Species for a numeric tree type; unknown numbers map to [`TreeType::Default`].
    pub fn from_index(index: u32) -> Self {
        match index {
            0 => TreeType::Apple,
            1 => TreeType::Sassafras,
            2 => TreeType::Palm,
            3 => TreeType::Tamarack,
            _ => TreeType::Default,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TreeType::Apple => "apple",
            TreeType::Sassafras => "sassafras",
            TreeType::Palm => "palm",
            TreeType::Tamarack => "tamarack",
            TreeType::Default => "default",
        }
    }
}

impl fmt::Display for TreeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TreeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        if let Ok(index) = lower.parse::<u32>() {
            return Ok(Self::from_index(index));
        }
        Self::ALL
            .into_iter()
            .find(|t| t.name() == lower)
            .ok_or_else(|| Error::UnknownSpecies(s.to_string()))
    }
}

impl TreeParameters {
    /// Built-in parameters for a species.
    pub fn for_type(tree_type: TreeType) -> Self {
        match tree_type {
            TreeType::Apple => Self::apple(),
            TreeType::Sassafras => Self::sassafras(),
            TreeType::Palm => Self::palm(),
            TreeType::Tamarack => Self::tamarack(),
            TreeType::Default => Self::default_species(),
        }
    }
}

/// Source of species parameters, consulted once at the start of a generation pass.
pub trait ParameterProvider: Send + Sync {
    fn parameters(&self, tree_type: TreeType) -> TreeParameters;
}

/// Provider returning the built-in presets.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSpecies;

impl ParameterProvider for BuiltinSpecies {
    fn parameters(&self, tree_type: TreeType) -> TreeParameters {
        TreeParameters::for_type(tree_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_type_from_index() {
        assert_eq!(TreeType::from_index(0), TreeType::Apple);
        assert_eq!(TreeType::from_index(3), TreeType::Tamarack);
        assert_eq!(TreeType::from_index(4), TreeType::Default);
        assert_eq!(TreeType::from_index(99), TreeType::Default);
    }

    #[test]
    fn test_tree_type_parse() {
        assert_eq!("Palm".parse::<TreeType>().unwrap(), TreeType::Palm);
        assert_eq!(" tamarack ".parse::<TreeType>().unwrap(), TreeType::Tamarack);
        assert_eq!("1".parse::<TreeType>().unwrap(), TreeType::Sassafras);
        assert!(matches!("oak".parse::<TreeType>(), Err(Error::UnknownSpecies(_))));
    }

    #[test]
    fn test_builtin_provider() {
        let provider = BuiltinSpecies;
        assert_eq!(provider.parameters(TreeType::Palm), TreeParameters::palm());
        assert_eq!(provider.parameters(TreeType::Default), TreeParameters::default_species());
    }

    #[test]
    fn test_name_round_trip() {
        for t in TreeType::ALL {
            assert_eq!(t.to_string().parse::<TreeType>().unwrap(), t);
        }
    }
}
