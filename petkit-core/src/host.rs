//! Simulation host seam: volume resolution and actor registration.

use std::collections::BTreeSet;

use crate::detector::PetDetector;
use crate::digitizer::DigitizerStage;
use crate::error::HostError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Handle to a volume resolved by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Volume {
    /// Volume name as known to the host.
    pub name: String,
}

impl Volume {
    /// Creates a volume handle.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// The part of a Monte Carlo simulation that digitizer stages are
/// registered with.
///
/// Stages are registered in chain order; the host must keep them
/// addressable by name.
pub trait SimulationHost {
    /// Resolves a volume by name.
    ///
    /// # Errors
    /// Returns an error if the host has no volume with this name.
    fn get_volume(&self, name: &str) -> Result<Volume, HostError>;

    /// Registers one digitizer stage as an actor.
    ///
    /// # Errors
    /// Returns an error if the host rejects the actor.
    fn add_actor(&mut self, stage: &DigitizerStage) -> Result<(), HostError>;
}

/// In-memory host: a set of known volumes and the ordered list of
/// registered actors.
#[derive(Debug, Clone, Default)]
pub struct ActorRegistry {
    volumes: BTreeSet<String>,
    actors: Vec<DigitizerStage>,
}

impl ActorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry that already knows the detector's crystal and
    /// module volumes.
    #[must_use]
    pub fn for_detector(detector: &PetDetector) -> Self {
        Self::new()
            .with_volume(detector.crystal_volume())
            .with_volume(detector.module_volume())
    }

    /// Adds a volume.
    #[must_use]
    pub fn with_volume(mut self, name: impl Into<String>) -> Self {
        self.add_volume(name);
        self
    }

    /// Adds a volume in place.
    pub fn add_volume(&mut self, name: impl Into<String>) {
        self.volumes.insert(name.into());
    }

    /// Registered actors in registration order.
    #[must_use]
    pub fn actors(&self) -> &[DigitizerStage] {
        &self.actors
    }

    /// Looks up a registered actor by name.
    #[must_use]
    pub fn actor(&self, name: &str) -> Option<&DigitizerStage> {
        self.actors.iter().find(|stage| stage.name == name)
    }

    /// Number of registered actors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Returns true if no actor is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}

impl SimulationHost for ActorRegistry {
    fn get_volume(&self, name: &str) -> Result<Volume, HostError> {
        if self.volumes.contains(name) {
            Ok(Volume::new(name))
        } else {
            Err(HostError::UnknownVolume(name.to_string()))
        }
    }

    fn add_actor(&mut self, stage: &DigitizerStage) -> Result<(), HostError> {
        if self.actor(&stage.name).is_some() {
            return Err(HostError::DuplicateActor(stage.name.clone()));
        }
        log::debug!(
            "registering {} actor {}",
            stage.params.actor_kind(),
            stage.name
        );
        self.actors.push(stage.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digitizer::{StageInput, StageParams};

    fn efficiency_stage(name: &str) -> DigitizerStage {
        DigitizerStage {
            name: name.to_string(),
            input: StageInput::Volume("crystal".to_string()),
            output: "out.root".to_string(),
            params: StageParams::Efficiency { efficiency: 0.5 },
        }
    }

    #[test]
    fn test_volume_resolution() {
        let registry = ActorRegistry::for_detector(&PetDetector::new("pet"));
        assert_eq!(
            registry.get_volume("pet_crystal").unwrap(),
            Volume::new("pet_crystal")
        );
        assert!(registry.get_volume("pet_module").is_ok());
        assert_eq!(
            registry.get_volume("pet_rsector"),
            Err(HostError::UnknownVolume("pet_rsector".to_string()))
        );
    }

    #[test]
    fn test_duplicate_actor_rejected() {
        let mut registry = ActorRegistry::new();
        registry.add_actor(&efficiency_stage("Singles2")).unwrap();
        let result = registry.add_actor(&efficiency_stage("Singles2"));
        assert_eq!(
            result,
            Err(HostError::DuplicateActor("Singles2".to_string()))
        );
        assert_eq!(registry.len(), 1);
    }
}
