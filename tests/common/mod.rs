#![allow(dead_code)]

use nalgebra::DVector;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use pairmin::engine::evaluator::Evaluator;
use pairmin::engine::minimizer::{LocalMinimizer, Refinement};

pub fn seeded(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Lennard-Jones 3-atom minimum: three pairs at the bottom of the well.
pub const LJ3_MINIMUM: f64 = -0.75;

/// Reduced vector of an equilateral triangle with side `a`.
pub fn triangle(a: f64) -> DVector<f64> {
    DVector::from_vec(vec![a, 0.5 * a, 0.5 * 3f64.sqrt() * a])
}

/// Simple mock energy: squared distance from a fixed target vector.
pub struct MockEvaluator {
    pub target: DVector<f64>,
}

impl Evaluator for MockEvaluator {
    fn energy(&self, vector: &DVector<f64>) -> f64 {
        (vector - &self.target).norm_squared()
    }

    fn dimension(&self) -> usize {
        self.target.len()
    }

    fn name(&self) -> &str {
        "Mock Evaluator"
    }
}

/// A minimizer that never converges and leaves the point where it found it.
pub struct StuckMinimizer;

impl LocalMinimizer for StuckMinimizer {
    fn minimize(&self, objective: &dyn Fn(&DVector<f64>) -> f64, start: &DVector<f64>) -> Refinement {
        Refinement {
            vector: start.clone(),
            energy: objective(start),
            converged: false,
            message: "stuck".to_string(),
            iterations: 0,
        }
    }

    fn name(&self) -> &str {
        "Stuck"
    }
}

/// A minimizer that reports convergence at a fixed point, whatever the start.
pub struct FixedMinimizer {
    pub target: DVector<f64>,
}

impl LocalMinimizer for FixedMinimizer {
    fn minimize(&self, objective: &dyn Fn(&DVector<f64>) -> f64, _start: &DVector<f64>) -> Refinement {
        Refinement {
            vector: self.target.clone(),
            energy: objective(&self.target),
            converged: true,
            message: "fixed".to_string(),
            iterations: 1,
        }
    }

    fn name(&self) -> &str {
        "Fixed"
    }
}
