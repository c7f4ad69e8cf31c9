pub mod evaluator;
pub mod minimizer;
pub mod operators;
