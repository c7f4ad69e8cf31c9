use nalgebra::DVector;
use rand::Rng;
use rand_distr::StandardNormal;

/// Uniform random reduced vector inside a cube of edge `box_size` centred on the origin.
pub fn random_start<R: Rng + ?Sized>(dimension: usize, box_size: f64, rng: &mut R) -> DVector<f64> {
    let half = 0.5 * box_size;
    DVector::from_fn(dimension, |_, _| rng.gen::<f64>() * box_size - half)
}

/// Returns `vector + N(0, 1) * amplitude`, drawing one normal deviate per coordinate.
pub fn gaussian_kick<R: Rng + ?Sized>(vector: &DVector<f64>, amplitude: f64, rng: &mut R) -> DVector<f64> {
    vector.map(|v| {
        let z: f64 = rng.sample(StandardNormal);
        v + z * amplitude
    })
}

/// `count` evenly spaced values from `start` to `stop` inclusive.
/// A single value is `start`.
pub fn linspace(start: f64, stop: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (count - 1) as f64;
            (0..count)
                .map(|i| if i == count - 1 { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn random_start_stays_in_box() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let v = random_start(300, 8.0, &mut rng);
        assert_eq!(v.len(), 300);
        assert!(v.iter().all(|x| (-4.0..4.0).contains(x)));
    }

    #[test]
    fn zero_amplitude_kick_is_identity() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let v = DVector::from_vec(vec![1.0, -2.0, 3.5]);
        assert_eq!(gaussian_kick(&v, 0.0, &mut rng), v);
    }

    #[test]
    fn linspace_endpoints() {
        assert_eq!(linspace(2.0, 0.0, 1), vec![2.0]);
        assert_eq!(linspace(2.0, 0.0, 3), vec![2.0, 1.0, 0.0]);
        assert!(linspace(1.0, 0.0, 0).is_empty());
    }
}
