//! Digitizer chain description and builder.
//!
//! The chain mirrors a simplified PET front end: hits collection, readout,
//! detection efficiency, energy blurring, time blurring and energy window.
//! There is no noise, pile-up or dead-time stage.

use crate::detector::PetDetector;
use crate::error::{Error, Result};
use crate::host::SimulationHost;
use crate::units::Units;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Output name of the hits collection stage.
pub const HITS: &str = "Hits";

/// Output names of the singles stages, in chain order.
pub const SINGLES: [&str; 5] = ["Singles1", "Singles2", "Singles3", "Singles4", "Singles5"];

/// Step attributes recorded by the hits collection.
pub const HIT_ATTRIBUTES: [&str; 5] = [
    "PostPosition",
    "TotalEnergyDeposit",
    "PreStepUniqueVolumeID",
    "GlobalTime",
    "LocalTime",
];

/// How the readout combines the hits of one group into a single.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ReadoutPolicy {
    /// Position is the energy-weighted centroid of the hits.
    #[default]
    EnergyWeightedCentroidPosition,
    /// Position is taken from the hit with the largest energy deposit.
    EnergyWinnerPosition,
}

impl ReadoutPolicy {
    /// Host name of the policy.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EnergyWeightedCentroidPosition => "EnergyWeightedCentroidPosition",
            Self::EnergyWinnerPosition => "EnergyWinnerPosition",
        }
    }
}

/// Attribute perturbed by a blurring stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BlurAttribute {
    TotalEnergyDeposit,
    GlobalTime,
}

impl BlurAttribute {
    /// Host name of the attribute.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TotalEnergyDeposit => "TotalEnergyDeposit",
            Self::GlobalTime => "GlobalTime",
        }
    }
}

/// Blurring model.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BlurMethod {
    /// Relative resolution scaling with the inverse square root of the
    /// value, anchored at `reference_value`.
    InverseSquare {
        resolution: f64,
        reference_value: f64,
    },
    /// Gaussian with a fixed full width at half maximum.
    Gaussian { fwhm: f64 },
}

impl BlurMethod {
    /// Host name of the method.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InverseSquare { .. } => "InverseSquare",
            Self::Gaussian { .. } => "Gaussian",
        }
    }
}

/// One acceptance channel of an energy window stage.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnergyChannel {
    pub name: String,
    pub min: f64,
    pub max: f64,
}

impl EnergyChannel {
    /// Returns true if `energy` lies inside the closed window.
    #[must_use]
    pub fn accepts(&self, energy: f64) -> bool {
        energy >= self.min && energy <= self.max
    }
}

/// Stage-specific parameters. Numeric values are in host units.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind"))]
pub enum StageParams {
    HitsCollection {
        attributes: Vec<String>,
        authorize_repeated_volumes: bool,
    },
    Readout {
        group_volume: String,
        discretize_volume: String,
        policy: ReadoutPolicy,
    },
    Efficiency {
        efficiency: f64,
    },
    Blurring {
        attribute: BlurAttribute,
        method: BlurMethod,
    },
    EnergyWindows {
        channels: Vec<EnergyChannel>,
    },
}

impl StageParams {
    /// Actor type the host instantiates for this stage.
    #[must_use]
    pub fn actor_kind(&self) -> &'static str {
        match self {
            Self::HitsCollection { .. } => "DigitizerHitsCollectionActor",
            Self::Readout { .. } => "DigitizerReadoutActor",
            Self::Efficiency { .. } => "DigitizerEfficiencyActor",
            Self::Blurring { .. } => "DigitizerBlurringActor",
            Self::EnergyWindows { .. } => "DigitizerEnergyWindowsActor",
        }
    }
}

/// Where a stage takes its input from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StageInput {
    /// Raw interactions in a host volume.
    Volume(String),
    /// Output of the stage at this index in the chain.
    Stage(usize),
}

/// One named processing step of the digitizer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DigitizerStage {
    /// Stage name, also the name of the collection it produces.
    pub name: String,
    pub input: StageInput,
    /// Output destination shared by every stage of a chain.
    pub output: String,
    pub params: StageParams,
}

/// A validated linear sequence of digitizer stages.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DigitizerChain {
    stages: Vec<DigitizerStage>,
}

impl DigitizerChain {
    /// Creates a chain, rejecting dangling, cyclic or branching inputs.
    ///
    /// # Errors
    /// Returns [`Error::InvalidChain`] if the stages are not a single
    /// linear sequence.
    pub fn new(stages: Vec<DigitizerStage>) -> Result<Self> {
        let chain = Self { stages };
        chain.validate()?;
        Ok(chain)
    }

    /// Checks the chain invariants.
    ///
    /// The first stage reads a volume and stage `k` reads stage `k - 1`.
    /// Stage names are unique.
    ///
    /// # Errors
    /// Returns [`Error::InvalidChain`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        for (index, stage) in self.stages.iter().enumerate() {
            if self.stages[..index].iter().any(|s| s.name == stage.name) {
                return Err(Error::InvalidChain(format!(
                    "duplicate stage name {}",
                    stage.name
                )));
            }
            match (&stage.input, index) {
                (StageInput::Volume(_), 0) => {}
                (StageInput::Volume(volume), _) => {
                    return Err(Error::InvalidChain(format!(
                        "stage {} reads volume {volume} but is not the first stage",
                        stage.name
                    )));
                }
                (StageInput::Stage(source), 0) => {
                    return Err(Error::InvalidChain(format!(
                        "first stage {} reads stage {source} instead of a volume",
                        stage.name
                    )));
                }
                (StageInput::Stage(source), _) if *source >= self.stages.len() => {
                    return Err(Error::InvalidChain(format!(
                        "stage {} reads missing stage {source}",
                        stage.name
                    )));
                }
                (StageInput::Stage(source), _) if *source >= index => {
                    return Err(Error::InvalidChain(format!(
                        "stage {} reads later stage {} (cycle)",
                        stage.name, self.stages[*source].name
                    )));
                }
                (StageInput::Stage(source), _) if *source + 1 != index => {
                    return Err(Error::InvalidChain(format!(
                        "stage {} branches from {} instead of {}",
                        stage.name,
                        self.stages[*source].name,
                        self.stages[index - 1].name
                    )));
                }
                (StageInput::Stage(_), _) => {}
            }
        }
        Ok(())
    }

    /// Stages in chain order.
    #[must_use]
    pub fn stages(&self) -> &[DigitizerStage] {
        &self.stages
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true if the chain has no stage.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Looks up a stage by name.
    #[must_use]
    pub fn stage(&self, name: &str) -> Option<&DigitizerStage> {
        self.stages.iter().find(|stage| stage.name == name)
    }

    /// Name of the collection or volume a stage reads from.
    #[must_use]
    pub fn input_name<'a>(&'a self, stage: &'a DigitizerStage) -> Option<&'a str> {
        match &stage.input {
            StageInput::Volume(volume) => Some(volume),
            StageInput::Stage(index) => self.stages.get(*index).map(|s| s.name.as_str()),
        }
    }

    /// Name of the last collection produced by the chain.
    #[must_use]
    pub fn final_output(&self) -> Option<&str> {
        self.stages.last().map(|stage| stage.name.as_str())
    }
}

/// Parameters of the digitizer chain.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DigitizerConfig {
    /// Readout combination policy.
    pub policy: ReadoutPolicy,
    /// Probability of keeping each single (detector quantum efficiency).
    pub efficiency: f64,
    /// Relative energy resolution at the reference energy.
    pub energy_resolution: f64,
    /// Reference energy for the resolution (keV).
    pub energy_reference_kev: f64,
    /// Time blurring FWHM (ps).
    pub time_fwhm_ps: f64,
    /// Lower energy window bound (keV).
    pub window_min_kev: f64,
    /// Upper energy window bound (keV).
    pub window_max_kev: f64,
    /// Scale factors into host units.
    pub units: Units,
}

impl Default for DigitizerConfig {
    fn default() -> Self {
        Self {
            policy: ReadoutPolicy::EnergyWeightedCentroidPosition,
            efficiency: 0.86481,
            energy_resolution: 0.112,
            energy_reference_kev: 511.0,
            time_fwhm_ps: 220.0,
            window_min_kev: 449.68,
            window_max_kev: 613.20,
            units: Units::geant4(),
        }
    }
}

impl DigitizerConfig {
    /// Set readout policy.
    #[must_use]
    pub fn with_policy(mut self, policy: ReadoutPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set detection efficiency.
    #[must_use]
    pub fn with_efficiency(mut self, efficiency: f64) -> Self {
        self.efficiency = efficiency;
        self
    }

    /// Set energy resolution and its reference energy (keV).
    #[must_use]
    pub fn with_energy_resolution(mut self, resolution: f64, reference_kev: f64) -> Self {
        self.energy_resolution = resolution;
        self.energy_reference_kev = reference_kev;
        self
    }

    /// Set time blurring FWHM (ps).
    #[must_use]
    pub fn with_time_fwhm_ps(mut self, fwhm: f64) -> Self {
        self.time_fwhm_ps = fwhm;
        self
    }

    /// Set the energy window (keV).
    #[must_use]
    pub fn with_energy_window(mut self, min_kev: f64, max_kev: f64) -> Self {
        self.window_min_kev = min_kev;
        self.window_max_kev = max_kev;
        self
    }

    /// Set the unit system of the host.
    #[must_use]
    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    /// Checks parameter ranges.
    ///
    /// # Errors
    /// Returns [`Error::ConfigError`] for an out-of-range or NaN parameter.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.efficiency) {
            return Err(Error::ConfigError(format!(
                "efficiency must be in [0, 1], got {}",
                self.efficiency
            )));
        }
        if !(self.energy_resolution > 0.0 && self.energy_reference_kev > 0.0) {
            return Err(Error::ConfigError(
                "energy resolution and reference must be positive".to_string(),
            ));
        }
        if !(self.time_fwhm_ps > 0.0) {
            return Err(Error::ConfigError(format!(
                "time FWHM must be positive, got {}",
                self.time_fwhm_ps
            )));
        }
        if !(self.window_min_kev < self.window_max_kev) {
            return Err(Error::ConfigError(format!(
                "energy window [{}, {}] is empty",
                self.window_min_kev, self.window_max_kev
            )));
        }
        Ok(())
    }
}

/// Builds the six-stage digitizer for `detector` and registers it with
/// `host`, in chain order.
///
/// Every stage writes to `output`. Volume lookups go through the host and
/// its errors are returned as [`Error::Host`].
///
/// # Errors
/// Returns an error if the configuration is invalid, a volume cannot be
/// resolved, or the host rejects a stage.
pub fn build_digitizer_chain<H: SimulationHost + ?Sized>(
    host: &mut H,
    detector: &PetDetector,
    output: &str,
    config: &DigitizerConfig,
) -> Result<DigitizerChain> {
    config.validate()?;
    let units = &config.units;

    let crystal = host.get_volume(&detector.crystal_volume())?;
    let module = host.get_volume(&detector.module_volume())?;

    let stage = |name: &str, input: StageInput, params: StageParams| DigitizerStage {
        name: name.to_string(),
        input,
        output: output.to_string(),
        params,
    };

    let stages = vec![
        stage(
            HITS,
            StageInput::Volume(crystal.name.clone()),
            StageParams::HitsCollection {
                attributes: HIT_ATTRIBUTES.iter().map(ToString::to_string).collect(),
                authorize_repeated_volumes: true,
            },
        ),
        stage(
            SINGLES[0],
            StageInput::Stage(0),
            StageParams::Readout {
                group_volume: module.name,
                discretize_volume: crystal.name,
                policy: config.policy,
            },
        ),
        stage(
            SINGLES[1],
            StageInput::Stage(1),
            StageParams::Efficiency {
                efficiency: config.efficiency,
            },
        ),
        stage(
            SINGLES[2],
            StageInput::Stage(2),
            StageParams::Blurring {
                attribute: BlurAttribute::TotalEnergyDeposit,
                method: BlurMethod::InverseSquare {
                    resolution: config.energy_resolution,
                    reference_value: units.energy_kev(config.energy_reference_kev),
                },
            },
        ),
        stage(
            SINGLES[3],
            StageInput::Stage(3),
            StageParams::Blurring {
                attribute: BlurAttribute::GlobalTime,
                method: BlurMethod::Gaussian {
                    fwhm: units.time_ps(config.time_fwhm_ps),
                },
            },
        ),
        stage(
            SINGLES[4],
            StageInput::Stage(4),
            StageParams::EnergyWindows {
                channels: vec![EnergyChannel {
                    name: SINGLES[4].to_string(),
                    min: units.energy_kev(config.window_min_kev),
                    max: units.energy_kev(config.window_max_kev),
                }],
            },
        ),
    ];

    let chain = DigitizerChain::new(stages)?;
    for stage in chain.stages() {
        host.add_actor(stage)?;
    }
    log::debug!(
        "digitizer for {} registered: {} stages into {output}",
        detector.name(),
        chain.len()
    );
    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;
    use crate::host::ActorRegistry;
    use approx::assert_relative_eq;

    fn build(name: &str) -> (ActorRegistry, DigitizerChain) {
        let detector = PetDetector::new(name);
        let mut registry = ActorRegistry::for_detector(&detector);
        let chain = build_digitizer_chain(
            &mut registry,
            &detector,
            "output.root",
            &DigitizerConfig::default(),
        )
        .unwrap();
        (registry, chain)
    }

    #[test]
    fn test_registers_six_stages_in_order() {
        let (registry, chain) = build("pet");
        let names: Vec<&str> = registry.actors().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            ["Hits", "Singles1", "Singles2", "Singles3", "Singles4", "Singles5"]
        );
        assert_eq!(chain.stages(), registry.actors());
        assert_eq!(chain.final_output(), Some("Singles5"));
    }

    #[test]
    fn test_inputs_follow_previous_outputs() {
        let (_, chain) = build("pet");
        let hits = chain.stage("Hits").unwrap();
        assert_eq!(chain.input_name(hits), Some("pet_crystal"));
        let expected = [
            ("Singles1", "Hits"),
            ("Singles2", "Singles1"),
            ("Singles3", "Singles2"),
            ("Singles4", "Singles3"),
            ("Singles5", "Singles4"),
        ];
        for (stage, input) in expected {
            let stage = chain.stage(stage).unwrap();
            assert_eq!(chain.input_name(stage), Some(input));
        }
    }

    #[test]
    fn test_all_stages_share_output() {
        let (_, chain) = build("pet");
        assert!(chain.stages().iter().all(|s| s.output == "output.root"));
    }

    #[test]
    fn test_stage_parameters_in_host_units() {
        let (registry, _) = build("pet");

        match &registry.actor("Singles1").unwrap().params {
            StageParams::Readout {
                group_volume,
                discretize_volume,
                policy,
            } => {
                assert_eq!(group_volume, "pet_module");
                assert_eq!(discretize_volume, "pet_crystal");
                assert_eq!(*policy, ReadoutPolicy::EnergyWeightedCentroidPosition);
            }
            other => panic!("unexpected params {other:?}"),
        }

        match &registry.actor("Singles3").unwrap().params {
            StageParams::Blurring {
                attribute: BlurAttribute::TotalEnergyDeposit,
                method:
                    BlurMethod::InverseSquare {
                        resolution,
                        reference_value,
                    },
            } => {
                assert_relative_eq!(*resolution, 0.112, epsilon = 1e-12);
                assert_relative_eq!(*reference_value, 0.511, epsilon = 1e-12);
            }
            other => panic!("unexpected params {other:?}"),
        }

        match &registry.actor("Singles4").unwrap().params {
            StageParams::Blurring {
                attribute: BlurAttribute::GlobalTime,
                method: BlurMethod::Gaussian { fwhm },
            } => assert_relative_eq!(*fwhm, 0.22, epsilon = 1e-12),
            other => panic!("unexpected params {other:?}"),
        }

        match &registry.actor("Singles5").unwrap().params {
            StageParams::EnergyWindows { channels } => {
                assert_eq!(channels.len(), 1);
                assert_eq!(channels[0].name, "Singles5");
                assert_relative_eq!(channels[0].min, 0.44968, epsilon = 1e-12);
                assert_relative_eq!(channels[0].max, 0.6132, epsilon = 1e-12);
                assert!(channels[0].accepts(0.511));
                assert!(!channels[0].accepts(0.3));
            }
            other => panic!("unexpected params {other:?}"),
        }
    }

    #[test]
    fn test_missing_volume_propagates_host_error() {
        let detector = PetDetector::new("pet");
        let mut registry = ActorRegistry::new().with_volume("pet_crystal");
        let err = build_digitizer_chain(
            &mut registry,
            &detector,
            "output.root",
            &DigitizerConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Host(HostError::UnknownVolume(ref name)) if name == "pet_module"
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let detector = PetDetector::new("pet");
        let mut registry = ActorRegistry::for_detector(&detector);
        let config = DigitizerConfig::default().with_energy_window(613.2, 449.68);
        let result = build_digitizer_chain(&mut registry, &detector, "out", &config);
        assert!(matches!(result, Err(Error::ConfigError(_))));

        let config = DigitizerConfig::default().with_efficiency(1.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nan_parameters_rejected() {
        let configs = [
            DigitizerConfig::default().with_time_fwhm_ps(f64::NAN),
            DigitizerConfig::default().with_energy_window(f64::NAN, 613.2),
            DigitizerConfig::default().with_energy_window(449.68, f64::NAN),
            DigitizerConfig::default().with_energy_resolution(f64::NAN, 511.0),
            DigitizerConfig::default().with_energy_resolution(0.112, f64::NAN),
            DigitizerConfig::default().with_efficiency(f64::NAN),
        ];
        for config in configs {
            assert!(matches!(config.validate(), Err(Error::ConfigError(_))));
        }
        assert!(DigitizerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_input_name_of_detached_stage() {
        let (_, chain) = build("pet");
        let detached = stage("Extra", StageInput::Volume("pet_module".to_string()));
        let name = chain.input_name(&detached);
        assert_eq!(name, Some("pet_module"));
        let linked = stage("Extra", StageInput::Stage(1));
        assert_eq!(chain.input_name(&linked), Some("Singles1"));
        let dangling = stage("Extra", StageInput::Stage(99));
        assert_eq!(chain.input_name(&dangling), None);
    }

    #[test]
    fn test_winner_policy_and_natural_units() {
        let detector = PetDetector::new("vereos");
        let mut registry = ActorRegistry::for_detector(&detector);
        let config = DigitizerConfig::default()
            .with_policy(ReadoutPolicy::EnergyWinnerPosition)
            .with_units(Units::natural());
        let chain = build_digitizer_chain(&mut registry, &detector, "out", &config).unwrap();
        match &chain.stage("Singles1").unwrap().params {
            StageParams::Readout { policy, .. } => {
                assert_eq!(policy.as_str(), "EnergyWinnerPosition");
            }
            other => panic!("unexpected params {other:?}"),
        }
        match &chain.stage("Singles5").unwrap().params {
            StageParams::EnergyWindows { channels } => {
                assert_relative_eq!(channels[0].min, 449.68, epsilon = 1e-12);
            }
            other => panic!("unexpected params {other:?}"),
        }
    }

    fn stage(name: &str, input: StageInput) -> DigitizerStage {
        DigitizerStage {
            name: name.to_string(),
            input,
            output: "out".to_string(),
            params: StageParams::Efficiency { efficiency: 1.0 },
        }
    }

    #[test]
    fn test_chain_rejects_dangling_reference() {
        let stages = vec![
            stage("Hits", StageInput::Volume("crystal".into())),
            stage("Singles1", StageInput::Stage(7)),
        ];
        assert!(matches!(
            DigitizerChain::new(stages),
            Err(Error::InvalidChain(_))
        ));
    }

    #[test]
    fn test_chain_rejects_cycle() {
        let stages = vec![
            stage("Hits", StageInput::Volume("crystal".into())),
            stage("Singles1", StageInput::Stage(2)),
            stage("Singles2", StageInput::Stage(1)),
        ];
        let err = DigitizerChain::new(stages).unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_chain_rejects_branch_and_duplicates() {
        let branching = vec![
            stage("Hits", StageInput::Volume("crystal".into())),
            stage("Singles1", StageInput::Stage(0)),
            stage("Singles2", StageInput::Stage(0)),
        ];
        assert!(DigitizerChain::new(branching).is_err());

        let duplicated = vec![
            stage("Hits", StageInput::Volume("crystal".into())),
            stage("Hits", StageInput::Stage(0)),
        ];
        assert!(DigitizerChain::new(duplicated).is_err());

        let second_volume = vec![
            stage("Hits", StageInput::Volume("crystal".into())),
            stage("Singles1", StageInput::Volume("crystal".into())),
        ];
        assert!(DigitizerChain::new(second_volume).is_err());
    }
}
