use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Lennard-Jones pair energy in reduced units (well depth and sigma set to 1).
/// Scale as `4 * eps * lennard_jones(r / sigma)` for physical units.
#[inline]
pub fn lennard_jones(r: f64) -> f64 {
    let r6 = r.powi(6);
    1.0 / (r6 * r6) - 1.0 / r6
}

/// Morse pair energy with unit dissociation energy and width.
#[inline]
pub fn morse(r: f64, re: f64) -> f64 {
    let x = 1.0 - (-(r - re)).exp();
    x * x
}

/// The closed set of supported pair potentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Potential {
    #[value(name = "lennard-jones")]
    LennardJones,
    /// Morse with equilibrium distance 1.
    #[value(name = "morse-1")]
    Morse1,
    /// Morse with equilibrium distance 2.
    #[value(name = "morse-2")]
    Morse2,
}

impl Potential {
    /// Pair energy at distance `r`. Only defined for `r > 0`.
    #[inline(always)]
    pub fn energy(self, r: f64) -> f64 {
        match self {
            Potential::LennardJones => lennard_jones(r),
            Potential::Morse1 => morse(r, 1.0),
            Potential::Morse2 => morse(r, 2.0),
        }
    }

    /// Distance at which a single pair sits at the bottom of the well.
    pub fn equilibrium_distance(self) -> f64 {
        match self {
            Potential::LennardJones => 2f64.powf(1.0 / 6.0),
            Potential::Morse1 => 1.0,
            Potential::Morse2 => 2.0,
        }
    }

    /// Energy of a single pair at its equilibrium distance.
    pub fn pair_minimum(self) -> f64 {
        self.energy(self.equilibrium_distance())
    }

    pub fn name(self) -> &'static str {
        match self {
            Potential::LennardJones => "lennard-jones",
            Potential::Morse1 => "morse-1",
            Potential::Morse2 => "morse-2",
        }
    }
}

impl std::fmt::Display for Potential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
