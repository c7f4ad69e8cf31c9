use approx::assert_abs_diff_eq;
use nalgebra::{DVector, Point3};
use pairmin::core::domain::{check_output_path, AlgorithmType, Params};
use pairmin::core::error::ConfigError;
use pairmin::core::potential::Potential;
use pairmin::core::spatial::{self, distances, expand, flatten};
use pairmin::engine::evaluator::{energy, sum_potential, Evaluator, PairwiseEvaluator};
use rand::Rng;
use std::path::Path;

use crate::common::{seeded, triangle, LJ3_MINIMUM};

mod common;

#[test]
fn test_expand_layout() {
    let v = DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let g = expand(&v).unwrap();

    assert_eq!(g.len(), 4);
    assert_eq!(g[0], Point3::origin());
    assert_eq!(g[1], Point3::new(1.0, 0.0, 0.0));
    assert_eq!(g[2], Point3::new(2.0, 3.0, 0.0));
    assert_eq!(g[3], Point3::new(4.0, 5.0, 6.0));
}

#[test]
fn test_expand_fixed_coordinates_random() {
    let mut rng = seeded(1);
    for n in 3..12 {
        let v = DVector::from_fn(spatial::reduced_dimension(n), |_, _| rng.gen_range(-4.0..4.0));
        let g = expand(&v).unwrap();

        assert_eq!(g.len(), n);
        assert_eq!(g[0], Point3::origin());
        assert_eq!((g[1].y, g[1].z), (0.0, 0.0));
        assert_eq!(g[2].z, 0.0);

        // Exact inverse
        assert_eq!(flatten(&g), v);
    }
}

#[test]
fn test_distance_matrix_symmetric() {
    let mut rng = seeded(2);
    let v = DVector::from_fn(spatial::reduced_dimension(8), |_, _| rng.gen_range(-4.0..4.0));
    let d = distances(&expand(&v).unwrap());

    assert_eq!(d.shape(), (8, 8));
    for i in 0..8 {
        assert_eq!(d[(i, i)], 0.0);
        for j in 0..8 {
            assert_eq!(d[(i, j)], d[(j, i)]);
            assert!(d[(i, j)] >= 0.0);
        }
    }
}

#[test]
fn test_three_atom_regression() {
    let g = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)];
    let d = distances(&g);

    let s2 = 2f64.sqrt();
    let expected = [[0.0, 1.0, 1.0], [1.0, 0.0, s2], [1.0, s2, 0.0]];
    for i in 0..3 {
        for j in 0..3 {
            assert_abs_diff_eq!(d[(i, j)], expected[i][j], epsilon = 1e-15);
        }
    }

    // Unit pairs contribute zero; the sqrt(2) pair gives 1/2^6 - 1/2^3
    let e = sum_potential(&d, Potential::LennardJones);
    assert_abs_diff_eq!(e, 1.0 / 64.0 - 1.0 / 8.0, epsilon = 1e-12);

    // Same geometry through the reduced vector
    let v = DVector::from_vec(vec![1.0, 0.0, 1.0]);
    assert_abs_diff_eq!(energy(&v, Potential::LennardJones).unwrap(), e, epsilon = 1e-12);
}

#[test]
fn test_triangle_minima() {
    let lj = energy(&triangle(2f64.powf(1.0 / 6.0)), Potential::LennardJones).unwrap();
    assert_abs_diff_eq!(lj, LJ3_MINIMUM, epsilon = 1e-12);

    let m1 = energy(&triangle(1.0), Potential::Morse1).unwrap();
    assert_abs_diff_eq!(m1, 0.0, epsilon = 1e-12);

    let m2 = energy(&triangle(2.0), Potential::Morse2).unwrap();
    assert_abs_diff_eq!(m2, 0.0, epsilon = 1e-12);
}

#[test]
fn test_evaluator_dimension_guard() {
    let ev = PairwiseEvaluator::new(Potential::LennardJones, 4).unwrap();
    assert_eq!(ev.dimension(), 6);
    assert_eq!(ev.energy(&DVector::zeros(5)), f64::INFINITY);
    assert!(energy(&DVector::zeros(5), Potential::LennardJones).is_err());
}

#[test]
fn test_evaluator_needs_three_atoms() {
    for n in 0..3 {
        assert!(matches!(
            PairwiseEvaluator::new(Potential::Morse1, n),
            Err(ConfigError::TooFewAtoms(got)) if got == n
        ));
    }
    assert_eq!(PairwiseEvaluator::new(Potential::Morse1, 3).unwrap().dimension(), 3);
}

#[test]
fn test_params_validation() {
    let ok = Params {
        atom_count: 3,
        iterations: 1,
        ..Default::default()
    };
    assert!(ok.validate().is_ok());

    let few_atoms = Params {
        atom_count: 2,
        ..Default::default()
    };
    assert!(matches!(few_atoms.validate(), Err(ConfigError::TooFewAtoms(2))));

    let short_anneal = Params {
        algorithm: AlgorithmType::Annealing,
        iterations: 99,
        ..Default::default()
    };
    assert!(matches!(
        short_anneal.validate(),
        Err(ConfigError::TooFewIterations { minimum: 100, got: 99 })
    ));

    let no_restarts = Params {
        restarts: 0,
        ..Default::default()
    };
    assert!(matches!(no_restarts.validate(), Err(ConfigError::ZeroRestarts)));

    let mut bad_tuning = Params::default();
    bad_tuning.tuning.gtol = 0.0;
    assert!(matches!(
        bad_tuning.validate(),
        Err(ConfigError::InvalidTuning { field: "gtol", .. })
    ));
}

#[test]
fn test_output_extension() {
    assert!(check_output_path(Path::new("out/cluster.xyz")).is_ok());
    assert!(matches!(
        check_output_path(Path::new("cluster.txt")),
        Err(ConfigError::OutputExtension(_))
    ));
    assert!(check_output_path(Path::new("cluster")).is_err());
}

#[test]
fn test_tuning_partial_json() {
    let t: pairmin::core::domain::Tuning = serde_json::from_str(r#"{ "box_size": 6.0 }"#).unwrap();
    assert_eq!(t.box_size, 6.0);
    assert_eq!(t.coordinate_bound, 5.0);
    assert_eq!(t.gtol, 1e-5);
}
