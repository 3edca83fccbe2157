//! Binomial helpers for the row-level victory estimates.

/// `C(n, k)` by multiplicative accumulation so no factorial ever overflows.
pub fn binomial_coefficient(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

/// `P(min ≤ X ≤ max)` for `X ~ Binomial(n, p)`. The upper bound is clipped to `n`.
pub fn binomial_range(n: usize, p: f64, min: usize, max: usize) -> f64 {
    let upper = max.min(n);
    if min > upper {
        return 0.0;
    }
    (min..=upper)
        .map(|k| binomial_coefficient(n, k) * p.powi(k as i32) * (1.0 - p).powi((n - k) as i32))
        .sum()
}

/// `P(X ≤ max)` for `X ~ Binomial(n, p)`.
pub fn binomial_at_most(n: usize, p: f64, max: usize) -> f64 {
    binomial_range(n, p, 0, max)
}

#[cfg(test)]
mod tests {
    use super::{binomial_at_most, binomial_coefficient, binomial_range};

    #[test]
    fn coefficients_match_pascal() {
        assert_eq!(binomial_coefficient(10, 0), 1.0);
        assert_eq!(binomial_coefficient(10, 10), 1.0);
        assert!((binomial_coefficient(10, 3) - 120.0).abs() < 1e-9);
        assert!((binomial_coefficient(10, 7) - 120.0).abs() < 1e-9);
        assert!((binomial_coefficient(30, 15) - 155_117_520.0).abs() < 1e-3);
        assert_eq!(binomial_coefficient(3, 4), 0.0);
    }

    #[test]
    fn full_range_sums_to_one() {
        for n in 0..=10 {
            let total = binomial_range(n, 0.37, 0, n);
            assert!((total - 1.0).abs() < 1e-12, "n={n} total={total}");
        }
    }

    #[test]
    fn all_successes_is_power() {
        let p = 0.75f64;
        assert!((binomial_range(10, p, 10, 10) - p.powi(10)).abs() < 1e-15);
    }

    #[test]
    fn empty_or_clipped_ranges() {
        assert_eq!(binomial_range(3, 0.5, 4, 6), 0.0);
        assert!((binomial_range(3, 0.5, 2, 9) - 0.5).abs() < 1e-12);
        assert!((binomial_at_most(0, 0.5, 0) - 1.0).abs() < 1e-12);
    }
}
