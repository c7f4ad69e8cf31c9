//! Global minimum search for clusters of particles bound by a pair potential.
//!
//! Geometries live in reduced coordinates (`3N - 6` values, see
//! [`core::spatial`]). Two searches are provided: multi-start local
//! minimization ([`solvers::multistart`]) and simulated annealing
//! ([`solvers::annealing`]).

pub mod analysis;
pub mod core;
pub mod engine;
pub mod interface;
pub mod solvers;
