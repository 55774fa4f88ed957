//! JSON-backed species library.
//!
//! A library stores parameter overrides per [`TreeType`]. Types without an
//! override fall back to the built-in presets.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ParameterProvider, TreeParameters, TreeType};
use crate::core::{Error, Result};

/// Current version of the library file format
pub const SPECIES_LIBRARY_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeciesLibrary {
    #[serde(default = "library_version")]
    pub version: u32,
    #[serde(default)]
    species: BTreeMap<TreeType, TreeParameters>,
}

fn library_version() -> u32 {
    SPECIES_LIBRARY_VERSION
}

impl SpeciesLibrary {
    pub fn new() -> Self {
        Self {
            version: SPECIES_LIBRARY_VERSION,
            species: BTreeMap::new(),
        }
    }

    /// Override the parameters for a species. Returns the previous override.
    pub fn insert(
        &mut self,
        tree_type: TreeType,
        params: TreeParameters,
    ) -> Option<TreeParameters> {
        self.species.insert(tree_type, params)
    }

    pub fn get(&self, tree_type: TreeType) -> Option<&TreeParameters> {
        self.species.get(&tree_type)
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let library: Self = serde_json::from_str(json)?;
        library.validate()?;
        Ok(library)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate a library file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let library = Self::from_json(&json)?;
        log::info!("Loaded {} species override(s) from {}", library.len(), path.display());
        Ok(library)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.version > SPECIES_LIBRARY_VERSION {
            return Err(Error::InvalidConfig(format!(
                "species library version {} is newer than supported version {}",
                self.version, SPECIES_LIBRARY_VERSION
            )));
        }
        for (tree_type, params) in &self.species {
            params
                .validate()
                .map_err(|msg| Error::InvalidConfig(format!("species '{tree_type}': {msg}")))?;
        }
        Ok(())
    }
}

impl ParameterProvider for SpeciesLibrary {
    fn parameters(&self, tree_type: TreeType) -> TreeParameters {
        self.species
            .get(&tree_type)
            .cloned()
            .unwrap_or_else(|| TreeParameters::for_type(tree_type))
    }
}
