//! PET detector description.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A named PET module hierarchy (crystals grouped into modules).
///
/// Only the name is consumed: sub-volumes are resolved in the host as
/// `"<name>_crystal"` and `"<name>_module"`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PetDetector {
    name: String,
}

impl PetDetector {
    /// Creates a detector description.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Detector name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the crystal volume.
    #[must_use]
    pub fn crystal_volume(&self) -> String {
        format!("{}_crystal", self.name)
    }

    /// Name of the module volume.
    #[must_use]
    pub fn module_volume(&self) -> String {
        format!("{}_module", self.name)
    }
}
