use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossbeam_channel::unbounded;
use log::{debug, error, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use pairmin::analysis::shape;
use pairmin::core::domain::{check_output_path, AlgorithmType, Params, Tuning};
use pairmin::core::potential::Potential;
use pairmin::core::spatial;
use pairmin::engine::evaluator::{Evaluator, PairwiseEvaluator};
use pairmin::engine::minimizer::{Bfgs, LocalMinimizer};
use pairmin::interface::{report, trace, xyz};
use pairmin::solvers::annealing::SimulatedAnnealing;
use pairmin::solvers::multistart::MultiStart;
use pairmin::solvers::SolverEvent;

// --- CLI Definitions ---

#[derive(Parser, Debug)]
#[command(author, version, about = "Global minimum search for pair-potential clusters", long_about = None)]
struct Args {
    /// Pair potential
    #[arg(value_enum)]
    potential: Potential,

    /// Number of particles (at least 3)
    atoms: usize,

    /// Iteration budget (at least 1 for multi-start, 100 for annealing)
    iterations: usize,

    /// Output coordinates (.xyz)
    output: PathBuf,

    /// Search algorithm
    #[arg(short, long, value_enum, default_value_t = AlgorithmType::MultiStart)]
    algo: AlgorithmType,

    /// Seed for the random stream (drawn from the OS when omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Independent multi-start runs, evaluated in parallel
    #[arg(short, long, default_value_t = 1)]
    restarts: usize,

    /// JSON file overriding numerical tuning (box size, schedules, tolerances)
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// CSV file receiving the accepted annealing moves
    #[arg(long)]
    trace: Option<PathBuf>,

    /// JSON file receiving a full run summary
    #[arg(long)]
    summary: Option<PathBuf>,
}

// --- Initialization Helpers ---

fn load_tuning(path: Option<&Path>) -> Result<Tuning> {
    match path {
        Some(p) => {
            let text = fs::read_to_string(p).with_context(|| format!("Failed to read tuning file {}", p.display()))?;
            serde_json::from_str(&text).with_context(|| format!("Failed to parse tuning file {}", p.display()))
        }
        None => Ok(Tuning::default()),
    }
}

fn build_params(args: &Args) -> Result<Params> {
    let params = Params {
        algorithm: args.algo,
        potential: args.potential,
        seed: args.seed,
        atom_count: args.atoms,
        iterations: args.iterations,
        restarts: args.restarts,
        tuning: load_tuning(args.tuning.as_deref())?,
    };
    params.validate()?;
    check_output_path(&args.output)?;
    if args.trace.is_some() && params.algorithm != AlgorithmType::Annealing {
        warn!("--trace is only recorded by the annealing search; no trace will be written");
    }
    if params.restarts > 1 && params.algorithm == AlgorithmType::Annealing {
        warn!("--restarts applies to multi-start only; running a single annealing walk");
    }
    Ok(params)
}

// --- Main ---

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 1. Parsing & validation
    let args = Args::parse();
    let params = match build_params(&args) {
        Ok(p) => p,
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    };

    // 2. Physics components
    let evaluator: Arc<dyn Evaluator> = Arc::new(PairwiseEvaluator::new(params.potential, params.atom_count)?);
    let minimizer: Arc<dyn LocalMinimizer> = Arc::new(Bfgs::from_tuning(&params.tuning));
    let seed = params.seed.unwrap_or_else(rand::random::<u64>);
    info!(
        "{} particles, {} potential, {:?}, {} iterations, seed {}",
        params.atom_count, params.potential, params.algorithm, params.iterations, seed
    );

    // 3. Solver thread
    let (tx, rx) = unbounded();
    let worker_params = params.clone();
    let worker = thread::Builder::new()
        .name("Solver-Worker".to_string())
        .spawn(move || match worker_params.algorithm {
            AlgorithmType::MultiStart => {
                MultiStart::new(evaluator, minimizer, worker_params).solve_restarts(seed, &tx)
            }
            AlgorithmType::Annealing => {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                SimulatedAnnealing::new(evaluator, minimizer, worker_params).solve(&mut rng, &tx)
            }
        })?;

    // 4. Event loop, ends when the worker drops its sender
    info!("Minimizing energy...");
    let start = Instant::now();
    for event in rx {
        match event {
            SolverEvent::NewBest {
                restart,
                iteration,
                energy,
            } => debug!("[{}] Iter {}: new best E = {:.6}", restart, iteration, energy),
            SolverEvent::StepUpdate(stats) => log::trace!(
                "[{}] Iter {}: E = {:.6}, best = {:.6}, amplitude = {:.3e}",
                stats.restart,
                stats.iteration,
                stats.current_energy,
                stats.best_energy,
                stats.amplitude
            ),
            SolverEvent::RefinementFailed { .. } => {}
            SolverEvent::Finished { restart, energy } => debug!("[{}] finished at E = {:.6}", restart, energy),
        }
    }

    let outcome = match worker.join().map_err(|_| anyhow!("Solver thread panicked"))? {
        Ok(o) => o,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    let elapsed = start.elapsed();
    println!("Minimization ended in {:.2?}", elapsed);

    // 5. Report & save
    let geometry = spatial::expand(&outcome.vector)?;
    let distances = spatial::distances(&geometry);
    let summary = shape::summarize(&geometry);

    println!("Minimum energy = {:.4}", outcome.energy);
    println!("Distance matrix:");
    println!("{}", report::distance_matrix_to_string(&distances));
    println!("{}", report::shape_to_string(&summary));

    xyz::save_coordinates(&args.output, &outcome.vector, &report::energy_comment(outcome.energy))?;
    println!("Coordinates saved to {}", args.output.display());

    if let Some(path) = args.trace.as_deref() {
        if params.algorithm == AlgorithmType::Annealing {
            trace::write_trace(path, &outcome.trace)?;
            println!("Trace of {} accepted moves saved to {}", outcome.trace.len(), path.display());
        }
    }

    if let Some(path) = args.summary.as_deref() {
        let run = report::RunSummary {
            params: &params,
            seed,
            elapsed_seconds: elapsed.as_secs_f64(),
            outcome: &outcome,
            shape: &summary,
        };
        report::write_summary(path, &run)?;
        println!("Summary saved to {}", path.display());
    }

    Ok(())
}
