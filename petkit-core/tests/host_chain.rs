use std::collections::HashMap;

use petkit_core::{
    build_digitizer_chain, DigitizerConfig, DigitizerStage, Error, HostError, PetDetector,
    SimulationHost, StageParams, Volume,
};

/// Host that refuses efficiency stages and counts volume lookups.
#[derive(Default)]
struct PickyHost {
    lookups: std::cell::Cell<usize>,
    actors: HashMap<String, &'static str>,
}

impl SimulationHost for PickyHost {
    fn get_volume(&self, name: &str) -> Result<Volume, HostError> {
        self.lookups.set(self.lookups.get() + 1);
        Ok(Volume::new(name))
    }

    fn add_actor(&mut self, stage: &DigitizerStage) -> Result<(), HostError> {
        if matches!(stage.params, StageParams::Efficiency { .. }) {
            return Err(HostError::Other(format!("{} not supported", stage.name)));
        }
        self.actors
            .insert(stage.name.clone(), stage.params.actor_kind());
        Ok(())
    }
}

#[test]
fn test_host_rejection_stops_the_build() {
    let detector = PetDetector::new("scanner");
    let mut host = PickyHost::default();
    let err = build_digitizer_chain(&mut host, &detector, "out", &DigitizerConfig::default())
        .unwrap_err();
    assert!(matches!(err, Error::Host(HostError::Other(ref msg)) if msg.contains("Singles2")));
    assert_eq!(host.lookups.get(), 2);
    assert_eq!(host.actors.len(), 2);
    assert_eq!(host.actors["Singles1"], "DigitizerReadoutActor");
}

#[test]
fn test_build_through_trait_object() {
    struct Accepting(Vec<String>);
    impl SimulationHost for Accepting {
        fn get_volume(&self, name: &str) -> Result<Volume, HostError> {
            Ok(Volume::new(name))
        }
        fn add_actor(&mut self, stage: &DigitizerStage) -> Result<(), HostError> {
            self.0.push(stage.name.clone());
            Ok(())
        }
    }

    let mut inner = Accepting(Vec::new());
    let host: &mut dyn SimulationHost = &mut inner;
    let chain = build_digitizer_chain(
        host,
        &PetDetector::new("pet"),
        "out",
        &DigitizerConfig::default(),
    )
    .unwrap();
    assert_eq!(chain.final_output(), Some("Singles5"));
    assert_eq!(
        inner.0,
        vec!["Hits", "Singles1", "Singles2", "Singles3", "Singles4", "Singles5"]
    );
}

#[cfg(feature = "serde")]
#[test]
fn test_chain_json_round_trip() {
    use petkit_core::{ActorRegistry, DigitizerChain};

    let detector = PetDetector::new("pet");
    let mut host = ActorRegistry::for_detector(&detector);
    let chain =
        build_digitizer_chain(&mut host, &detector, "out", &DigitizerConfig::default()).unwrap();
    let json = serde_json::to_string(&chain).unwrap();
    assert!(json.contains("\"kind\":\"Readout\""));
    let back: DigitizerChain = serde_json::from_str(&json).unwrap();
    assert_eq!(back, chain);
    back.validate().unwrap();
}
