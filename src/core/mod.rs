pub mod domain;
pub mod error;
pub mod potential;
pub mod spatial;
