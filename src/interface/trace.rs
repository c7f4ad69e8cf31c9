use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::solvers::TracePoint;

/// Writes accepted annealing moves as `iteration,energy` rows.
pub fn write_trace_to<W: Write>(w: W, trace: &[TracePoint]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(w);
    for point in trace {
        writer.serialize(point)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_trace(path: &Path, trace: &[TracePoint]) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_trace_to(file, trace).with_context(|| format!("Failed to write trace to {}", path.display()))
}
