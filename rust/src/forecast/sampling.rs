//! Right-skewed triangular duration sampling.

use rand::Rng;

/// Inverse CDF of a triangular distribution on `[min, max]` with `mode = min`.
///
/// With the mode at the lower bound the CDF breakpoint is zero, so every draw
/// falls on the descending branch.
#[inline]
pub fn triangular_mode_min(u: f64, min: f64, max: f64) -> f64 {
    if max <= min {
        return min;
    }
    let mode = min;
    max - ((1.0 - u) * (max - min) * (max - mode)).sqrt()
}

/// Draw a duration for a task estimated at `[optimistic, pessimistic]`.
#[inline]
pub fn sample_duration<R: Rng + ?Sized>(rng: &mut R, optimistic: f64, pessimistic: f64) -> f64 {
    if pessimistic <= optimistic {
        return optimistic;
    }
    triangular_mode_min(rng.random::<f64>(), optimistic, pessimistic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_bounds() {
        assert_eq!(triangular_mode_min(0.0, 60.0, 120.0), 60.0);
        assert!((triangular_mode_min(1.0, 60.0, 120.0) - 120.0).abs() < 1e-12);
        // u = 0.75 -> 120 - sqrt(0.25 * 60 * 60) = 90
        assert!((triangular_mode_min(0.75, 60.0, 120.0) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_fixed_estimate_is_constant() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            assert_eq!(sample_duration(&mut rng, 45.0, 45.0), 45.0);
        }
        for u in [0.0, 0.3, 0.999] {
            assert_eq!(triangular_mode_min(u, 45.0, 45.0), 45.0);
        }
    }

    #[test]
    fn test_samples_stay_in_range_and_skew_low() {
        let mut rng = StdRng::seed_from_u64(42);
        let samples: Vec<f64> = (0..5000)
            .map(|_| sample_duration(&mut rng, 100.0, 400.0))
            .collect();

        assert!(samples.iter().all(|&s| (100.0..=400.0).contains(&s)));
        // Mean of a triangular distribution is (min + max + mode) / 3 = 200
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        assert!((mean - 200.0).abs() < 10.0, "mean {mean}");
        let below_midpoint = samples.iter().filter(|&&s| s < 250.0).count();
        assert!(below_midpoint > samples.len() / 2);
    }
}
