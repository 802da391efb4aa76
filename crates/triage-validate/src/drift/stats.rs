//! Two-sample test statistics and effect sizes.
//!
//! Uses the chi-square distribution from `statrs`; the Kolmogorov
//! distribution tail is summed directly.

use std::collections::{BTreeMap, BTreeSet};

use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Statistic and p-value of a two-sample test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestOutcome {
    pub statistic: f64,
    pub p_value: f64,
}

/// Two-sample Kolmogorov-Smirnov test.
///
/// `D` is the largest gap between the empirical CDFs. The p-value is the
/// asymptotic Kolmogorov tail at `(√nₑ + 0.12 + 0.11/√nₑ)·D` with
/// `nₑ = n₁n₂/(n₁+n₂)`.
pub fn ks_two_sample(reference: &[f64], current: &[f64]) -> TestOutcome {
    if reference.is_empty() || current.is_empty() {
        return TestOutcome {
            statistic: 0.0,
            p_value: 1.0,
        };
    }
    let mut a = reference.to_vec();
    let mut b = current.to_vec();
    a.sort_by(f64::total_cmp);
    b.sort_by(f64::total_cmp);

    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let (mut i, mut j) = (0usize, 0usize);
    let mut d = 0.0_f64;
    while i < a.len() && j < b.len() {
        let x = a[i].min(b[j]);
        while i < a.len() && a[i] <= x {
            i += 1;
        }
        while j < b.len() && b[j] <= x {
            j += 1;
        }
        d = d.max((i as f64 / n1 - j as f64 / n2).abs());
    }

    let ne = (n1 * n2 / (n1 + n2)).sqrt();
    let lambda = (ne + 0.12 + 0.11 / ne) * d;
    TestOutcome {
        statistic: d,
        p_value: kolmogorov_q(lambda),
    }
}

/// Tail probability of the Kolmogorov distribution,
/// `Q(λ) = 2 Σ (-1)^(j-1) exp(-2j²λ²)`.
pub fn kolmogorov_q(lambda: f64) -> f64 {
    const EPS1: f64 = 0.001;
    const EPS2: f64 = 1.0e-8;

    let a2 = -2.0 * lambda * lambda;
    let mut fac = 2.0;
    let mut sum = 0.0;
    let mut term_before = 0.0_f64;
    for j in 1..=100 {
        let j = f64::from(j);
        let term = fac * (a2 * j * j).exp();
        sum += term;
        if term.abs() <= EPS1 * term_before || term.abs() <= EPS2 * sum {
            return sum.clamp(0.0, 1.0);
        }
        fac = -fac;
        term_before = term.abs();
    }
    // The series fails to converge only as λ approaches zero.
    1.0
}

/// Absolute Cohen's d with the pooled standard deviation.
///
/// Identical constant samples give 0; different constant samples give
/// infinity.
pub fn cohens_d(reference: &[f64], current: &[f64]) -> f64 {
    let (n1, n2) = (reference.len(), current.len());
    if n1 < 2 || n2 < 2 {
        return 0.0;
    }
    let (mean1, var1) = mean_variance(reference);
    let (mean2, var2) = mean_variance(current);
    let pooled = (((n1 - 1) as f64 * var1 + (n2 - 1) as f64 * var2) / (n1 + n2 - 2) as f64).sqrt();
    let diff = (mean1 - mean2).abs();
    if pooled > 0.0 {
        diff / pooled
    } else if diff == 0.0 {
        0.0
    } else {
        f64::INFINITY
    }
}

/// Mean and sample variance.
pub fn mean_variance(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, variance)
}

/// Chi-square test of independence on the 2×k table of category counts.
pub fn chi_square_two_sample(
    reference: &BTreeMap<String, usize>,
    current: &BTreeMap<String, usize>,
) -> TestOutcome {
    let categories: BTreeSet<&String> = reference.keys().chain(current.keys()).collect();
    let n_ref: usize = reference.values().sum();
    let n_cur: usize = current.values().sum();
    let n = (n_ref + n_cur) as f64;
    if categories.len() < 2 || n_ref == 0 || n_cur == 0 {
        return TestOutcome {
            statistic: 0.0,
            p_value: 1.0,
        };
    }

    let mut statistic = 0.0;
    for category in &categories {
        let observed_ref = reference.get(*category).copied().unwrap_or(0) as f64;
        let observed_cur = current.get(*category).copied().unwrap_or(0) as f64;
        let column_total = observed_ref + observed_cur;
        for (observed, row_total) in [(observed_ref, n_ref as f64), (observed_cur, n_cur as f64)] {
            let expected = row_total * column_total / n;
            if expected > 0.0 {
                statistic += (observed - expected).powi(2) / expected;
            }
        }
    }

    let dof = (categories.len() - 1) as f64;
    let p_value = match ChiSquared::new(dof) {
        Ok(dist) => 1.0 - dist.cdf(statistic),
        Err(_) => 1.0,
    };
    TestOutcome {
        statistic,
        p_value: p_value.clamp(0.0, 1.0),
    }
}

/// Cramér's V of a 2×k table: `sqrt(χ² / n)`.
pub fn cramers_v(chi_square: f64, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (chi_square / total as f64).sqrt().min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_samples_have_no_gap() {
        let values: Vec<f64> = (0..50).map(f64::from).collect();
        let outcome = ks_two_sample(&values, &values);
        assert_eq!(outcome.statistic, 0.0);
        assert!(outcome.p_value > 0.99);
    }

    #[test]
    fn disjoint_samples_have_full_gap() {
        let low: Vec<f64> = (0..100).map(f64::from).collect();
        let high: Vec<f64> = (1000..1100).map(f64::from).collect();
        let outcome = ks_two_sample(&low, &high);
        assert!((outcome.statistic - 1.0).abs() < 1e-12);
        assert!(outcome.p_value < 1e-10);
    }

    #[test]
    fn kolmogorov_tail_matches_known_values() {
        // Q(1.36) is the classic 5% critical point.
        assert!((kolmogorov_q(1.36) - 0.0494).abs() < 1e-3);
        assert!((kolmogorov_q(1.63) - 0.0098).abs() < 1e-3);
        assert_eq!(kolmogorov_q(0.0), 1.0);
    }

    #[test]
    fn cohens_d_uses_pooled_deviation() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [2.0, 3.0, 4.0, 5.0, 6.0];
        // Both variances are 2.5, so d = 1 / sqrt(2.5).
        assert!((cohens_d(&a, &b) - 1.0 / 2.5_f64.sqrt()).abs() < 1e-12);
        assert_eq!(cohens_d(&[3.0, 3.0], &[3.0, 3.0]), 0.0);
    }

    #[test]
    fn chi_square_detects_shifted_proportions() {
        let reference = BTreeMap::from([("0".to_string(), 90), ("1".to_string(), 10)]);
        let current = BTreeMap::from([("0".to_string(), 10), ("1".to_string(), 90)]);
        let outcome = chi_square_two_sample(&reference, &current);
        assert!(outcome.statistic > 100.0);
        assert!(outcome.p_value < 1e-10);
        assert!(cramers_v(outcome.statistic, 200) > 0.7);

        let same = chi_square_two_sample(&reference, &reference);
        assert!(same.statistic.abs() < 1e-12);
        assert!((same.p_value - 1.0).abs() < 1e-9);
    }
}
