//! Summary statistics over price slices.

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// True when every value equals the first one. Empty slices are flat.
pub fn is_flat(values: &[f64]) -> bool {
    values.first().map_or(true, |&first| values.iter().all(|&v| v == first))
}

/// Sample variance with Bessel's correction (divisor `n - 1`).
/// Identical values give exactly zero.
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    if is_flat(values) {
        return Some(0.0);
    }
    let mean = mean(values)?;
    let sum_sq = values
        .iter()
        .map(|v| {
            let d = *v - mean;
            d * d
        })
        .sum::<f64>();
    Some(sum_sq / (values.len() - 1) as f64)
}

/// Sample standard deviation, the square root of [`sample_variance`].
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn mean_basic() {
        let v = mean(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!((v - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn sample_std_dev_needs_two_values() {
        assert_eq!(sample_std_dev(&[]), None);
        assert_eq!(sample_std_dev(&[42.0]), None);
    }

    #[test]
    fn sample_std_dev_uses_bessel_correction() {
        // Population variance would be 4.0 here; the sample variance is 32 / 7.
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let var = sample_variance(&values).unwrap();
        assert!((var - 32.0 / 7.0).abs() < 1e-12);
        let sd = sample_std_dev(&values).unwrap();
        assert!((sd - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn constant_values_have_zero_spread() {
        assert_eq!(sample_std_dev(&[100.0; 24]), Some(0.0));
    }

    #[test]
    fn constant_fractional_values_have_zero_spread() {
        for v in [0.1, 0.3, 1.1, 2.7, 0.07] {
            assert_eq!(sample_variance(&[v; 24]), Some(0.0), "variance of {}", v);
            assert_eq!(sample_std_dev(&[v; 24]), Some(0.0), "std dev of {}", v);
        }
    }

    #[test]
    fn flatness() {
        assert!(is_flat(&[]));
        assert!(is_flat(&[0.1, 0.1, 0.1]));
        assert!(!is_flat(&[0.1, 0.1, 0.1000000001]));
        assert!(!is_flat(&[f64::NAN, f64::NAN]));
    }
}
