//! Order statistics over positioning history.

/// Percentile with linear interpolation between the closest ranks.
///
/// `p` is in `[0, 100]`. The rank is `p / 100 * (n - 1)`; the result
/// interpolates between the values at the floor and ceiling of that rank in
/// the sorted sample. Returns `None` for an empty sample.
#[must_use]
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Mean of absolute values, `None` for an empty sample.
#[must_use]
pub fn mean_abs(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().map(|v| v.abs()).sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_empty() {
        assert!(percentile(&[], 90.0).is_none());
    }

    #[test]
    fn test_percentile_single_value() {
        assert_eq!(percentile(&[42.0], 90.0), Some(42.0));
        assert_eq!(percentile(&[42.0], 10.0), Some(42.0));
    }

    #[test]
    fn test_percentile_interpolates_between_ranks() {
        // 10, 12, ..., 208: rank 89.1 sits between 188 and 190.
        let values: Vec<f64> = (0..100).map(|i| f64::from(10 + 2 * i)).collect();
        let p90 = percentile(&values, 90.0).unwrap();
        assert!((p90 - 188.2).abs() < 1e-9);

        let p10 = percentile(&values, 10.0).unwrap();
        assert!((p10 - 29.8).abs() < 1e-9);
    }

    #[test]
    fn test_percentile_ignores_input_order() {
        let ascending = [1.0, 2.0, 3.0, 4.0, 5.0];
        let shuffled = [4.0, 1.0, 5.0, 3.0, 2.0];
        assert_eq!(percentile(&ascending, 75.0), percentile(&shuffled, 75.0));
        assert_eq!(percentile(&shuffled, 75.0), Some(4.0));
    }

    #[test]
    fn test_percentile_bounds() {
        let values = [-5.0, 0.0, 5.0];
        assert_eq!(percentile(&values, 0.0), Some(-5.0));
        assert_eq!(percentile(&values, 100.0), Some(5.0));
        assert_eq!(percentile(&values, 50.0), Some(0.0));
    }

    #[test]
    fn test_mean_abs() {
        assert_eq!(mean_abs(&[-10.0, 10.0, -20.0, 20.0]), Some(15.0));
        assert!(mean_abs(&[]).is_none());
    }
}
