//! Unit scale factors used when writing physical parameters into a host
//! simulation's configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Scale factors from named units into the host's internal unit system.
///
/// A value of `511.0 * units.kev` is 511 keV expressed in host units.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Units {
    /// One kiloelectronvolt.
    pub kev: f64,
    /// One picosecond.
    pub ps: f64,
    /// One nanosecond.
    pub ns: f64,
}

impl Default for Units {
    fn default() -> Self {
        Self::geant4()
    }
}

impl Units {
    /// Geant4 internal units: MeV = 1 and ns = 1.
    #[must_use]
    pub fn geant4() -> Self {
        Self {
            kev: 1.0e-3,
            ps: 1.0e-3,
            ns: 1.0,
        }
    }

    /// Identity scale: parameters stay in keV and ps.
    #[must_use]
    pub fn natural() -> Self {
        Self {
            kev: 1.0,
            ps: 1.0,
            ns: 1.0e3,
        }
    }

    /// Converts an energy in keV into host units.
    #[inline]
    #[must_use]
    pub fn energy_kev(&self, value: f64) -> f64 {
        value * self.kev
    }

    /// Converts a duration in picoseconds into host units.
    #[inline]
    #[must_use]
    pub fn time_ps(&self, value: f64) -> f64 {
        value * self.ps
    }

    /// Converts a duration in nanoseconds into host units.
    #[inline]
    #[must_use]
    pub fn time_ns(&self, value: f64) -> f64 {
        value * self.ns
    }
}
