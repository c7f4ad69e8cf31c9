use nalgebra::{DMatrix, Matrix3, Point3, SymmetricEigen, Vector3, U3};
use serde::Serialize;

use crate::core::spatial;

/// Geometric descriptors of a final structure.
#[derive(Debug, Clone, Serialize)]
pub struct ShapeSummary {
    pub atom_count: usize,
    /// Shortest and longest pair separations.
    pub min_distance: f64,
    pub max_distance: f64,
    /// Mean over atoms of the distance to the closest neighbour.
    pub mean_nearest_neighbour: f64,
    pub radius_of_gyration: f64,
    /// Principal moments of inertia (unit masses), ascending.
    pub principal_moments: [f64; 3],
}

pub fn summarize(geometry: &[Point3<f64>]) -> ShapeSummary {
    let n = geometry.len();
    let dist = spatial::distances(geometry);

    let mut min_distance = f64::INFINITY;
    let mut max_distance: f64 = 0.0;
    for j in 1..n {
        for i in 0..j {
            min_distance = min_distance.min(dist[(i, j)]);
            max_distance = max_distance.max(dist[(i, j)]);
        }
    }
    if n < 2 {
        min_distance = 0.0;
    }

    let nn = nearest_neighbours(&dist);
    let mean_nearest_neighbour = if nn.is_empty() {
        0.0
    } else {
        nn.iter().sum::<f64>() / nn.len() as f64
    };

    let center = centroid(geometry);
    let radius_of_gyration = if n == 0 {
        0.0
    } else {
        (geometry.iter().map(|p| (p.coords - center).norm_squared()).sum::<f64>() / n as f64).sqrt()
    };

    let pmoi = principal_moments(geometry);

    ShapeSummary {
        atom_count: n,
        min_distance,
        max_distance,
        mean_nearest_neighbour,
        radius_of_gyration,
        principal_moments: [pmoi.x, pmoi.y, pmoi.z],
    }
}

/// Distance from each atom to its closest neighbour. Empty for fewer than two atoms.
pub fn nearest_neighbours(distances: &DMatrix<f64>) -> Vec<f64> {
    let n = distances.nrows();
    if n < 2 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            (0..n)
                .filter(|&j| j != i)
                .map(|j| distances[(i, j)])
                .fold(f64::INFINITY, f64::min)
        })
        .collect()
}

fn centroid(geometry: &[Point3<f64>]) -> Vector3<f64> {
    if geometry.is_empty() {
        return Vector3::zeros();
    }
    let mut center = Vector3::zeros();
    for p in geometry {
        center += p.coords;
    }
    center / geometry.len() as f64
}

/// Principal moments of inertia with every mass set to 1, ascending.
/// A purely geometric shape descriptor: a linear chain has one zero moment.
pub fn principal_moments(geometry: &[Point3<f64>]) -> Vector3<f64> {
    if geometry.len() < 2 {
        return Vector3::zeros();
    }
    let center = centroid(geometry);

    let mut tensor = Matrix3::zeros();
    for p in geometry {
        let r = p.coords - center;
        tensor[(0, 0)] += r.y * r.y + r.z * r.z;
        tensor[(1, 1)] += r.x * r.x + r.z * r.z;
        tensor[(2, 2)] += r.x * r.x + r.y * r.y;
        let i_xy = -r.x * r.y;
        let i_xz = -r.x * r.z;
        let i_yz = -r.y * r.z;
        tensor[(0, 1)] += i_xy;
        tensor[(1, 0)] += i_xy;
        tensor[(0, 2)] += i_xz;
        tensor[(2, 0)] += i_xz;
        tensor[(1, 2)] += i_yz;
        tensor[(2, 1)] += i_yz;
    }

    let eigen: SymmetricEigen<f64, U3> = SymmetricEigen::new(tensor);
    let mut pmoi: Vec<f64> = eigen.eigenvalues.iter().cloned().collect();
    pmoi.sort_by(|a, b| a.total_cmp(b));
    Vector3::new(pmoi[0], pmoi[1], pmoi[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn equilateral_triangle() {
        let s = 3f64.sqrt() / 2.0;
        let g = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.5, s, 0.0)];
        let summary = summarize(&g);
        assert_abs_diff_eq!(summary.min_distance, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(summary.max_distance, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(summary.mean_nearest_neighbour, 1.0, epsilon = 1e-12);
        // Planar body: the two in-plane moments add up to the out-of-plane one
        let [a, b, c] = summary.principal_moments;
        assert_abs_diff_eq!(a + b, c, epsilon = 1e-10);
        assert_abs_diff_eq!(a, b, epsilon = 1e-10);
    }

    #[test]
    fn linear_chain_has_zero_moment() {
        let g = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)];
        let pmoi = principal_moments(&g);
        assert_abs_diff_eq!(pmoi.x, 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(pmoi.y, 2.0, epsilon = 1e-10);
    }
}
