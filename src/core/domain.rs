use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::error::ConfigError;
use crate::core::potential::Potential;

// --- Constants ---

/// Smallest cluster with a well-defined reduced coordinate frame.
pub const MIN_ATOMS: usize = 3;
pub const MIN_MULTI_START_ITERATIONS: usize = 1;
pub const MIN_ANNEALING_ITERATIONS: usize = 100;
/// Required extension of the coordinate output.
pub const OUTPUT_EXTENSION: &str = "xyz";

// --- Configuration Types ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AlgorithmType {
    /// Repeated local minimization from perturbed starting points.
    MultiStart,
    /// Metropolis random walk on a cooling schedule.
    Annealing,
}

impl AlgorithmType {
    pub fn min_iterations(self) -> usize {
        match self {
            AlgorithmType::MultiStart => MIN_MULTI_START_ITERATIONS,
            AlgorithmType::Annealing => MIN_ANNEALING_ITERATIONS,
        }
    }
}

/// Numerical knobs. Defaults reproduce the reference schedules; a JSON file
/// may override any subset of them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Tuning {
    /// Edge length of the cube (centred on the origin) used for random starts.
    pub box_size: f64,

    // Multi-start
    /// Perturbation amplitude at the first iteration, decays linearly to zero.
    pub start_amplitude: f64,

    // Annealing
    pub start_temperature: f64,
    pub temperature_floor: f64,
    /// Proposals with any |coordinate| above this are rejected.
    pub coordinate_bound: f64,

    // Local minimizer
    pub gtol: f64,
    /// Iteration cap per reduced coordinate.
    pub max_iterations_per_dim: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            box_size: 8.0,
            start_amplitude: 2.0,
            start_temperature: 0.1,
            temperature_floor: 1e-7,
            coordinate_bound: 5.0,
            gtol: 1e-5,
            max_iterations_per_dim: 200,
        }
    }
}

impl Tuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, v: f64) -> Result<(), ConfigError> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::InvalidTuning {
                    field,
                    reason: format!("must be a positive number, got {}", v),
                })
            }
        }

        positive("box_size", self.box_size)?;
        positive("start_temperature", self.start_temperature)?;
        positive("temperature_floor", self.temperature_floor)?;
        positive("coordinate_bound", self.coordinate_bound)?;
        positive("gtol", self.gtol)?;
        if !(self.start_amplitude.is_finite() && self.start_amplitude >= 0.0) {
            return Err(ConfigError::InvalidTuning {
                field: "start_amplitude",
                reason: format!("must be non-negative, got {}", self.start_amplitude),
            });
        }
        if self.max_iterations_per_dim == 0 {
            return Err(ConfigError::InvalidTuning {
                field: "max_iterations_per_dim",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    pub algorithm: AlgorithmType,
    pub potential: Potential,
    /// `None` draws a seed from the OS.
    pub seed: Option<u64>,

    pub atom_count: usize,
    pub iterations: usize,
    /// Independent multi-start runs; only the best survives.
    pub restarts: usize,

    pub tuning: Tuning,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            algorithm: AlgorithmType::MultiStart,
            potential: Potential::LennardJones,
            seed: None,
            atom_count: 3,
            iterations: 100,
            restarts: 1,
            tuning: Tuning::default(),
        }
    }
}

impl Params {
    /// Checks every run limit. Nothing is computed until this passes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.atom_count < MIN_ATOMS {
            return Err(ConfigError::TooFewAtoms(self.atom_count));
        }
        let minimum = self.algorithm.min_iterations();
        if self.iterations < minimum {
            return Err(ConfigError::TooFewIterations {
                minimum,
                got: self.iterations,
            });
        }
        if self.restarts == 0 {
            return Err(ConfigError::ZeroRestarts);
        }
        self.tuning.validate()
    }
}

/// Output paths must carry the `.xyz` extension.
pub fn check_output_path(path: &std::path::Path) -> Result<(), ConfigError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(OUTPUT_EXTENSION) => Ok(()),
        _ => Err(ConfigError::OutputExtension(path.display().to_string())),
    }
}
