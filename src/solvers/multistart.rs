use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::Sender;
use log::{debug, info, warn};
use nalgebra::DVector;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::core::domain::{Params, MIN_MULTI_START_ITERATIONS};
use crate::core::error::{ConfigError, SearchError};
use crate::engine::evaluator::Evaluator;
use crate::engine::minimizer::{refine, LocalMinimizer};
use crate::engine::operators::{gaussian_kick, linspace, random_start};
use crate::solvers::{OptimizationState, RunStats, SearchOutcome, SolverEvent, StepStats};

/// Basin-hopping style search: minimize, keep the best, kick it, repeat.
///
/// The kick amplitude decays linearly from `tuning.start_amplitude` to zero over
/// the iteration budget. Refinements that fail to converge are skipped.
pub struct MultiStart {
    evaluator: Arc<dyn Evaluator>,
    minimizer: Arc<dyn LocalMinimizer>,
    params: Params,
}

impl MultiStart {
    pub fn new(evaluator: Arc<dyn Evaluator>, minimizer: Arc<dyn LocalMinimizer>, params: Params) -> Self {
        Self {
            evaluator,
            minimizer,
            params,
        }
    }

    /// Runs once from a random start inside the tuning box.
    pub fn solve<R: Rng + ?Sized>(&self, rng: &mut R, tx: &Sender<SolverEvent>) -> Result<SearchOutcome, SearchError> {
        let start = random_start(self.evaluator.dimension(), self.params.tuning.box_size, rng);
        self.run(0, start, rng, tx)
    }

    pub fn solve_from<R: Rng + ?Sized>(
        &self,
        start: DVector<f64>,
        rng: &mut R,
        tx: &Sender<SolverEvent>,
    ) -> Result<SearchOutcome, SearchError> {
        self.run(0, start, rng, tx)
    }

    /// Runs `params.restarts` independent searches in parallel and keeps the lowest.
    ///
    /// Restart `r` draws from stream `r` of a ChaCha generator seeded with
    /// `base_seed`, so the result does not depend on thread scheduling.
    pub fn solve_restarts(&self, base_seed: u64, tx: &Sender<SolverEvent>) -> Result<SearchOutcome, SearchError> {
        if self.params.restarts == 0 {
            return Err(ConfigError::ZeroRestarts.into());
        }

        let outcomes = (0..self.params.restarts)
            .into_par_iter()
            .map(|restart| {
                let mut rng = ChaCha8Rng::seed_from_u64(base_seed);
                rng.set_stream(restart as u64);
                let start = random_start(self.evaluator.dimension(), self.params.tuning.box_size, &mut rng);
                self.run(restart, start, &mut rng, tx).map(|o| (restart, o))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (restart, best) = outcomes
            .into_iter()
            .min_by(|(_, a), (_, b)| a.energy.total_cmp(&b.energy))
            .ok_or(ConfigError::ZeroRestarts)?;

        if self.params.restarts > 1 {
            info!(
                "Best of {} restarts: restart {} with E = {:.6}",
                self.params.restarts, restart, best.energy
            );
        }
        Ok(best)
    }

    fn run<R: Rng + ?Sized>(
        &self,
        restart: usize,
        start: DVector<f64>,
        rng: &mut R,
        tx: &Sender<SolverEvent>,
    ) -> Result<SearchOutcome, SearchError> {
        // 1. Validate inputs
        if start.len() != self.evaluator.dimension() {
            return Err(SearchError::Dimension(start.len()));
        }
        let iterations = self.params.iterations;
        if iterations < MIN_MULTI_START_ITERATIONS {
            return Err(ConfigError::TooFewIterations {
                minimum: MIN_MULTI_START_ITERATIONS,
                got: iterations,
            }
            .into());
        }

        let amplitudes = linspace(self.params.tuning.start_amplitude, 0.0, iterations);
        let start_time = Instant::now();

        // The first converged refinement always wins against +inf.
        let mut state = OptimizationState::new(start, f64::INFINITY);
        let mut stats = RunStats::default();
        let mut best_history = Vec::with_capacity(iterations);

        // 2. Main Loop
        for (i, &amplitude) in amplitudes.iter().enumerate() {
            // A. Local minimization
            let refined = refine(self.minimizer.as_ref(), self.evaluator.as_ref(), &state.current);
            stats.refinements += 1;

            // B. Keep or discard
            if !refined.converged {
                stats.failed_refinements += 1;
                warn!("Solution did not converge, skipping iteration {}: {}", i, refined.message);
                let _ = tx.send(SolverEvent::RefinementFailed {
                    restart,
                    iteration: i,
                    message: refined.message.clone(),
                });
            } else {
                state.current_energy = refined.energy;
                if state.offer_best(&refined.vector, refined.energy) {
                    let _ = tx.send(SolverEvent::NewBest {
                        restart,
                        iteration: i,
                        energy: refined.energy,
                    });
                }
            }

            stats.iterations += 1;
            best_history.push(state.best_energy);
            debug!("Restart {} iter {}: E = {}", restart, i, state.best_energy);
            let _ = tx.send(SolverEvent::StepUpdate(StepStats {
                restart,
                iteration: i,
                current_energy: state.current_energy,
                best_energy: state.best_energy,
                amplitude,
                temperature: None,
            }));

            // C. Perturb the best-known point
            state.current = gaussian_kick(&state.best, amplitude, rng);
        }

        // Nothing converged: report the start point with its real energy.
        if !state.best_energy.is_finite() {
            warn!("No refinement converged in {} iterations", iterations);
            state.best_energy = self.evaluator.energy(&state.best);
        }

        info!(
            "Multi-start finished in {:.2?}: E = {:.6} ({}/{} refinements converged)",
            start_time.elapsed(),
            state.best_energy,
            stats.refinements - stats.failed_refinements,
            stats.refinements
        );
        let _ = tx.send(SolverEvent::Finished {
            restart,
            energy: state.best_energy,
        });

        Ok(SearchOutcome {
            vector: state.best,
            energy: state.best_energy,
            stats,
            trace: Vec::new(),
            best_history,
        })
    }
}
