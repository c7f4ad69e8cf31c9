use nalgebra::{DMatrix, DVector, Point3};

use crate::core::error::SearchError;

/// Coordinates pinned to zero to remove translation, rotation and reflection:
/// x1, y1, z1, y2, z2, z3.
pub const FIXED_COORDINATES: usize = 6;

/// Cartesian coordinates of every particle, in input order.
pub type Geometry = Vec<Point3<f64>>;

/// Length of the reduced vector describing `n_atoms` particles.
/// Fewer than three particles have no free coordinates and give 0.
#[inline]
pub fn reduced_dimension(n_atoms: usize) -> usize {
    (3 * n_atoms).saturating_sub(FIXED_COORDINATES)
}

/// Inverse of [`reduced_dimension`]. `None` when `len` is not `3N - 6` for some `N >= 3`.
pub fn atom_count(len: usize) -> Option<usize> {
    let full = len + FIXED_COORDINATES;
    if full % 3 == 0 && full / 3 >= 3 {
        Some(full / 3)
    } else {
        None
    }
}

/// Expands a reduced vector into full Cartesian coordinates.
///
/// Atom 1 sits at the origin, atom 2 on the x axis and atom 3 in the xy plane:
/// `[0,0,0, v0,0,0, v1,v2,0, v3,v4,v5, ...]`.
pub fn expand(vector: &DVector<f64>) -> Result<Geometry, SearchError> {
    let n = atom_count(vector.len()).ok_or(SearchError::Dimension(vector.len()))?;

    let mut geometry = Vec::with_capacity(n);
    geometry.push(Point3::origin());
    geometry.push(Point3::new(vector[0], 0.0, 0.0));
    geometry.push(Point3::new(vector[1], vector[2], 0.0));
    for chunk in vector.as_slice()[3..].chunks_exact(3) {
        geometry.push(Point3::new(chunk[0], chunk[1], chunk[2]));
    }
    Ok(geometry)
}

/// Drops the pinned coordinates again. Exact inverse of [`expand`].
pub fn flatten(geometry: &[Point3<f64>]) -> DVector<f64> {
    let mut values = Vec::with_capacity(3 * geometry.len());
    for (i, p) in geometry.iter().enumerate() {
        match i {
            0 => {}
            1 => values.push(p.x),
            2 => values.extend_from_slice(&[p.x, p.y]),
            _ => values.extend_from_slice(&[p.x, p.y, p.z]),
        }
    }
    DVector::from_vec(values)
}

/// Full pairwise Euclidean distance matrix.
///
/// Each pair is computed once and mirrored, so the result is exactly symmetric
/// and the diagonal is zero.
pub fn distances(geometry: &[Point3<f64>]) -> DMatrix<f64> {
    let n = geometry.len();
    let mut m = DMatrix::zeros(n, n);
    for i in 0..n {
        for j in (i + 1)..n {
            let d = nalgebra::distance(&geometry[i], &geometry[j]);
            m[(i, j)] = d;
            m[(j, i)] = d;
        }
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_round_trip() {
        for n in 3..10 {
            assert_eq!(atom_count(reduced_dimension(n)), Some(n));
        }
        assert_eq!(atom_count(0), None);
        assert_eq!(atom_count(2), None);
        assert_eq!(atom_count(4), None);
    }

    #[test]
    fn small_clusters_have_no_free_coordinates() {
        assert_eq!(reduced_dimension(3), 3);
        assert_eq!(reduced_dimension(2), 0);
        assert_eq!(reduced_dimension(1), 0);
        assert_eq!(reduced_dimension(0), 0);
    }

    #[test]
    fn expand_rejects_bad_length() {
        let v = DVector::from_element(5, 1.0);
        assert!(matches!(expand(&v), Err(SearchError::Dimension(5))));
    }
}
