use nalgebra::DVector;
use serde::Serialize;

pub mod annealing;
pub mod multistart;

/// Walker state owned by a single solver run.
#[derive(Debug, Clone)]
pub struct OptimizationState {
    pub current: DVector<f64>,
    pub current_energy: f64,
    pub best: DVector<f64>,
    pub best_energy: f64,
}

impl OptimizationState {
    /// Current and best both start at `start`, scored with `energy`.
    pub fn new(start: DVector<f64>, energy: f64) -> Self {
        Self {
            best: start.clone(),
            current: start,
            current_energy: energy,
            best_energy: energy,
        }
    }

    /// Replaces the best pair when `energy` is strictly lower. Returns whether it did.
    pub fn offer_best(&mut self, vector: &DVector<f64>, energy: f64) -> bool {
        if energy < self.best_energy {
            self.best = vector.clone();
            self.best_energy = energy;
            true
        } else {
            false
        }
    }
}

/// Per-iteration statistics, used for progress reporting.
#[derive(Debug, Clone, Default)]
pub struct StepStats {
    pub restart: usize,
    pub iteration: usize,
    pub current_energy: f64,
    pub best_energy: f64,
    pub amplitude: f64,
    /// Annealing only.
    pub temperature: Option<f64>,
}

/// Counters collected over one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    pub iterations: usize,
    pub refinements: usize,
    pub failed_refinements: usize,
    pub accepted_moves: usize,
    pub out_of_bounds: usize,
}

/// One accepted move of the annealing walk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TracePoint {
    pub iteration: usize,
    pub energy: f64,
}

/// The result handed to the output sinks.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub vector: DVector<f64>,
    pub energy: f64,
    pub stats: RunStats,
    /// Accepted annealing moves; empty for multi-start.
    pub trace: Vec<TracePoint>,
    /// Best energy after each iteration.
    #[serde(skip)]
    pub best_history: Vec<f64>,
}

/// Events emitted by solvers to the main thread.
#[derive(Debug, Clone)]
pub enum SolverEvent {
    /// A completed iteration.
    StepUpdate(StepStats),

    /// A structure that beats the run's best so far.
    NewBest {
        restart: usize,
        iteration: usize,
        energy: f64,
    },

    /// A local refinement that did not converge.
    RefinementFailed {
        restart: usize,
        iteration: usize,
        message: String,
    },

    /// Solver has finished its run.
    Finished { restart: usize, energy: f64 },
}
