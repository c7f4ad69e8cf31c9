use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use nalgebra::{DVector, Point3};

use crate::core::spatial;

/// Every atom is written with this symbol; only geometry and energy matter.
pub const PLACEHOLDER_SYMBOL: &str = "H";

/// Five decimals with a leading space for non-negative values, so columns line up.
fn coord(v: f64) -> String {
    if v.is_sign_negative() {
        format!("{:.5}", v)
    } else {
        format!(" {:.5}", v)
    }
}

/// Writes an XYZ point cloud: atom count, comment line, one `H x y z` line per atom.
pub fn write_xyz<W: Write>(w: &mut W, geometry: &[Point3<f64>], comment: &str) -> io::Result<()> {
    writeln!(w, "{}", geometry.len())?;
    writeln!(w, "{}", comment)?;
    for p in geometry {
        writeln!(w, "{} {}  {} {}", PLACEHOLDER_SYMBOL, coord(p.x), coord(p.y), coord(p.z))?;
    }
    Ok(())
}

/// Expands `vector` and saves it to `path`.
pub fn save_coordinates(path: &Path, vector: &DVector<f64>, comment: &str) -> Result<()> {
    let geometry = spatial::expand(vector)?;
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    write_xyz(&mut w, &geometry, comment).with_context(|| format!("Failed to write {}", path.display()))?;
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_columns() {
        assert_eq!(coord(1.0), " 1.00000");
        assert_eq!(coord(-0.25), "-0.25000");
    }
}
