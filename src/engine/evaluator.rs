use nalgebra::{DMatrix, DVector};

use crate::core::domain::MIN_ATOMS;
use crate::core::error::{ConfigError, SearchError};
use crate::core::potential::Potential;
use crate::core::spatial;

/// Sums the potential over each unordered pair once.
///
/// Only the strict upper triangle is read; the zero diagonal and the mirrored
/// lower triangle never reach the potential.
pub fn sum_potential(distances: &DMatrix<f64>, potential: Potential) -> f64 {
    let n = distances.nrows();
    let mut total = 0.0;
    for j in 1..n {
        for i in 0..j {
            total += potential.energy(distances[(i, j)]);
        }
    }
    total
}

/// Total energy of the cluster described by a reduced vector.
pub fn energy(vector: &DVector<f64>, potential: Potential) -> Result<f64, SearchError> {
    let geometry = spatial::expand(vector)?;
    let dist = spatial::distances(&geometry);
    Ok(sum_potential(&dist, potential))
}

/// A scalar objective over reduced coordinates.
/// Implementations must be thread-safe so restarts can share one instance.
pub trait Evaluator: Send + Sync {
    fn energy(&self, vector: &DVector<f64>) -> f64;

    /// Number of reduced coordinates the evaluator expects.
    fn dimension(&self) -> usize;

    fn name(&self) -> &str;
}

/// Pairwise-potential energy of an `atom_count` cluster.
#[derive(Debug, Clone, Copy)]
pub struct PairwiseEvaluator {
    potential: Potential,
    atom_count: usize,
}

impl PairwiseEvaluator {
    pub fn new(potential: Potential, atom_count: usize) -> Result<Self, ConfigError> {
        if atom_count < MIN_ATOMS {
            return Err(ConfigError::TooFewAtoms(atom_count));
        }
        Ok(Self {
            potential,
            atom_count,
        })
    }

    pub fn potential(&self) -> Potential {
        self.potential
    }

    pub fn atom_count(&self) -> usize {
        self.atom_count
    }
}

impl Evaluator for PairwiseEvaluator {
    /// A vector of the wrong length scores `+inf` so it can never win.
    fn energy(&self, vector: &DVector<f64>) -> f64 {
        energy(vector, self.potential).unwrap_or(f64::INFINITY)
    }

    fn dimension(&self) -> usize {
        spatial::reduced_dimension(self.atom_count)
    }

    fn name(&self) -> &str {
        self.potential.name()
    }
}
