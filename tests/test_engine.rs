use approx::assert_abs_diff_eq;
use nalgebra::DVector;
use pairmin::core::potential::Potential;
use pairmin::core::spatial::{distances, expand};
use pairmin::engine::evaluator::{Evaluator, PairwiseEvaluator};
use pairmin::engine::minimizer::{refine, Bfgs};
use pairmin::engine::operators::{gaussian_kick, random_start};

use crate::common::{seeded, triangle, MockEvaluator, StuckMinimizer, LJ3_MINIMUM};

mod common;

#[test]
fn test_refine_lj_triangle() {
    let ev = PairwiseEvaluator::new(Potential::LennardJones, 3).unwrap();
    let start = DVector::from_vec(vec![1.3, 0.4, 1.0]);

    let res = refine(&Bfgs::default(), &ev, &start);

    assert!(res.converged, "{}", res.message);
    assert_abs_diff_eq!(res.energy, LJ3_MINIMUM, epsilon = 1e-8);

    let d = distances(&expand(&res.vector).unwrap());
    let r0 = Potential::LennardJones.equilibrium_distance();
    for (i, j) in [(0, 1), (0, 2), (1, 2)] {
        assert_abs_diff_eq!(d[(i, j)], r0, epsilon = 1e-3);
    }
}

#[test]
fn test_refine_morse_from_triangle() {
    let ev = PairwiseEvaluator::new(Potential::Morse2, 3).unwrap();
    let res = refine(&Bfgs::default(), &ev, &triangle(2.3));

    assert!(res.converged, "{}", res.message);
    assert_abs_diff_eq!(res.energy, 0.0, epsilon = 1e-8);
}

#[test]
fn test_refine_reports_energy_of_returned_point() {
    let ev = MockEvaluator {
        target: DVector::from_vec(vec![1.0, 2.0, 3.0]),
    };
    let start = DVector::zeros(3);

    let stuck = refine(&StuckMinimizer, &ev, &start);
    assert!(!stuck.converged);
    assert_eq!(stuck.vector, start);
    assert_abs_diff_eq!(stuck.energy, 14.0);

    let res = refine(&Bfgs::default(), &ev, &start);
    assert!(res.converged);
    assert_abs_diff_eq!(res.energy, ev.energy(&res.vector));
    assert_abs_diff_eq!(res.vector[2], 3.0, epsilon = 1e-5);
}

#[test]
fn test_operators_are_reproducible() {
    let a = random_start(9, 8.0, &mut seeded(11));
    let b = random_start(9, 8.0, &mut seeded(11));
    assert_eq!(a, b);

    let ka = gaussian_kick(&a, 0.5, &mut seeded(12));
    let kb = gaussian_kick(&a, 0.5, &mut seeded(12));
    assert_eq!(ka, kb);
    assert_ne!(ka, a);
}
