use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::Sender;
use log::{debug, info};
use nalgebra::DVector;
use rand::Rng;

use crate::core::domain::{Params, MIN_ANNEALING_ITERATIONS};
use crate::core::error::{ConfigError, SearchError};
use crate::engine::evaluator::Evaluator;
use crate::engine::minimizer::{refine, LocalMinimizer};
use crate::engine::operators::{gaussian_kick, linspace, random_start};
use crate::solvers::{OptimizationState, RunStats, SearchOutcome, SolverEvent, StepStats, TracePoint};

/// One (amplitude, temperature) pair per iteration, both decreasing.
#[derive(Debug, Clone)]
pub struct CoolingSchedule {
    steps: Vec<(f64, f64)>,
}

impl CoolingSchedule {
    /// Temperature falls linearly from `start + floor` to `floor`; the kick
    /// amplitude follows the temperature.
    pub fn linear(iterations: usize, start: f64, floor: f64) -> Self {
        let steps = linspace(0.0, 1.0, iterations)
            .into_iter()
            .map(|t| {
                let temperature = (1.0 - t) * start + floor;
                (temperature, temperature)
            })
            .collect();
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn amplitude(&self, i: usize) -> f64 {
        self.steps[i].0
    }

    pub fn temperature(&self, i: usize) -> f64 {
        self.steps[i].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.steps.iter().copied()
    }
}

/// What happened to a single proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Some coordinate left the allowed box; state untouched.
    OutOfBounds,
    Accepted,
    Rejected,
}

/// One Metropolis step of the walker.
///
/// The best pair is updated before the acceptance test, so it never depends on
/// whether the walk itself moves.
pub fn metropolis_step<R: Rng + ?Sized>(
    state: &mut OptimizationState,
    evaluator: &dyn Evaluator,
    amplitude: f64,
    temperature: f64,
    bound: f64,
    rng: &mut R,
) -> (Move, f64) {
    let test = gaussian_kick(&state.current, amplitude, rng);

    // Single global bound on the largest |coordinate|.
    if test.amax() > bound {
        return (Move::OutOfBounds, f64::NAN);
    }

    let test_energy = evaluator.energy(&test);
    state.offer_best(&test, test_energy);

    let delta = test_energy - state.current_energy;
    let accepted = test_energy.is_finite() && (delta < 0.0 || (-delta / temperature).exp() >= rng.gen::<f64>());

    if accepted {
        state.current = test;
        state.current_energy = test_energy;
        (Move::Accepted, test_energy)
    } else {
        (Move::Rejected, test_energy)
    }
}

/// Metropolis random walk on a linear cooling schedule, finished by one local
/// refinement of the best point seen.
pub struct SimulatedAnnealing {
    evaluator: Arc<dyn Evaluator>,
    minimizer: Arc<dyn LocalMinimizer>,
    params: Params,
}

impl SimulatedAnnealing {
    pub fn new(evaluator: Arc<dyn Evaluator>, minimizer: Arc<dyn LocalMinimizer>, params: Params) -> Self {
        Self {
            evaluator,
            minimizer,
            params,
        }
    }

    pub fn schedule(&self) -> CoolingSchedule {
        let t = &self.params.tuning;
        CoolingSchedule::linear(self.params.iterations, t.start_temperature, t.temperature_floor)
    }

    pub fn solve<R: Rng + ?Sized>(&self, rng: &mut R, tx: &Sender<SolverEvent>) -> Result<SearchOutcome, SearchError> {
        let start = random_start(self.evaluator.dimension(), self.params.tuning.box_size, rng);
        self.solve_from(start, rng, tx)
    }

    /// Walks from `start`, then refines the best point.
    /// A refinement that does not converge fails the whole run.
    pub fn solve_from<R: Rng + ?Sized>(
        &self,
        start: DVector<f64>,
        rng: &mut R,
        tx: &Sender<SolverEvent>,
    ) -> Result<SearchOutcome, SearchError> {
        let start_time = Instant::now();
        let mut outcome = self.walk(start, rng, tx)?;

        info!("Refining the best walker position (E = {:.6})", outcome.energy);
        let refined = refine(self.minimizer.as_ref(), self.evaluator.as_ref(), &outcome.vector);
        outcome.stats.refinements += 1;
        if !refined.converged {
            outcome.stats.failed_refinements += 1;
            let _ = tx.send(SolverEvent::RefinementFailed {
                restart: 0,
                iteration: outcome.stats.iterations,
                message: refined.message.clone(),
            });
            return Err(SearchError::RefinementFailed {
                message: refined.message,
            });
        }
        // A converged refinement always ends the run, scored by the evaluator
        outcome.vector = refined.vector;
        outcome.energy = refined.energy;

        info!(
            "Annealing finished in {:.2?}: E = {:.6} ({} accepted, {} out of bounds)",
            start_time.elapsed(),
            outcome.energy,
            outcome.stats.accepted_moves,
            outcome.stats.out_of_bounds
        );
        let _ = tx.send(SolverEvent::Finished {
            restart: 0,
            energy: outcome.energy,
        });
        Ok(outcome)
    }

    /// The random walk alone, without the final refinement.
    pub fn walk<R: Rng + ?Sized>(
        &self,
        start: DVector<f64>,
        rng: &mut R,
        tx: &Sender<SolverEvent>,
    ) -> Result<SearchOutcome, SearchError> {
        // 1. Validate inputs
        if start.len() != self.evaluator.dimension() {
            return Err(SearchError::Dimension(start.len()));
        }
        if self.params.iterations < MIN_ANNEALING_ITERATIONS {
            return Err(ConfigError::TooFewIterations {
                minimum: MIN_ANNEALING_ITERATIONS,
                got: self.params.iterations,
            }
            .into());
        }

        let schedule = self.schedule();
        let bound = self.params.tuning.coordinate_bound;
        // Unscored start: the first finite in-bound proposal is always accepted
        let mut state = OptimizationState::new(start, f64::INFINITY);
        let mut stats = RunStats::default();
        let mut trace = Vec::new();
        let mut best_history = Vec::with_capacity(schedule.len());

        // 2. Main Loop
        for (i, (amplitude, temperature)) in schedule.iter().enumerate() {
            let best_before = state.best_energy;
            let (outcome, energy) =
                metropolis_step(&mut state, self.evaluator.as_ref(), amplitude, temperature, bound, rng);

            match outcome {
                Move::OutOfBounds => stats.out_of_bounds += 1,
                Move::Accepted => {
                    stats.accepted_moves += 1;
                    trace.push(TracePoint { iteration: i, energy });
                }
                Move::Rejected => {}
            }
            if state.best_energy < best_before {
                let _ = tx.send(SolverEvent::NewBest {
                    restart: 0,
                    iteration: i,
                    energy: state.best_energy,
                });
            }

            stats.iterations += 1;
            best_history.push(state.best_energy);
            let _ = tx.send(SolverEvent::StepUpdate(StepStats {
                restart: 0,
                iteration: i,
                current_energy: state.current_energy,
                best_energy: state.best_energy,
                amplitude,
                temperature: Some(temperature),
            }));
        }

        debug!(
            "Walk done: {}/{} accepted, best E = {:.6}",
            stats.accepted_moves, stats.iterations, state.best_energy
        );

        // Every proposal left the box; score the start itself
        let energy = if state.best_energy.is_finite() {
            state.best_energy
        } else {
            self.evaluator.energy(&state.best)
        };

        Ok(SearchOutcome {
            vector: state.best,
            energy,
            stats,
            trace,
            best_history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn schedule_is_monotone_down_to_floor() {
        let s = CoolingSchedule::linear(100, 0.1, 1e-7);
        assert_eq!(s.len(), 100);
        assert_relative_eq!(s.temperature(0), 0.1 + 1e-7);
        assert_relative_eq!(s.temperature(99), 1e-7);
        let temps: Vec<f64> = s.iter().map(|(_, t)| t).collect();
        assert!(temps.windows(2).all(|w| w[1] < w[0]));
        assert!(s.iter().all(|(a, t)| a == t));
    }
}
