use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use nalgebra::DMatrix;
use serde::Serialize;

use crate::analysis::shape::ShapeSummary;
use crate::core::domain::Params;
use crate::solvers::SearchOutcome;

/// Comment line stored in the XYZ output.
pub fn energy_comment(energy: f64) -> String {
    format!("Optimized solution, E = {:.4}", energy)
}

/// One row per atom, four decimals, space separated.
pub fn distance_matrix_to_string(distances: &DMatrix<f64>) -> String {
    distances
        .row_iter()
        .map(|row| row.iter().map(|d| format!("{:.4}", d)).collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn shape_to_string(shape: &ShapeSummary) -> String {
    let [a, b, c] = shape.principal_moments;
    format!(
        "Pair distances: min = {:.4}, max = {:.4}\n\
         Mean nearest neighbour = {:.4}\n\
         Radius of gyration = {:.4}\n\
         Principal moments = {:.4} {:.4} {:.4}",
        shape.min_distance, shape.max_distance, shape.mean_nearest_neighbour, shape.radius_of_gyration, a, b, c
    )
}

/// Everything about a finished run, for the optional JSON summary.
#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub params: &'a Params,
    pub seed: u64,
    pub elapsed_seconds: f64,
    pub outcome: &'a SearchOutcome,
    pub shape: &'a ShapeSummary,
}

pub fn write_summary(path: &Path, summary: &RunSummary<'_>) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), summary)
        .with_context(|| format!("Failed to write summary to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_rows() {
        let m = DMatrix::from_row_slice(2, 2, &[0.0, 1.5, 1.5, 0.0]);
        assert_eq!(distance_matrix_to_string(&m), "0.0000 1.5000\n1.5000 0.0000");
        assert_eq!(energy_comment(-0.75), "Optimized solution, E = -0.7500");
    }
}
