//! Statistical kernel for campaign comparisons.
//!
//! Provides the moment and quantile helpers used by the dataset overview and
//! the spend tiers, plus the two significance tests the comparison tables are
//! built from: the 2x2 chi-square independence test (with continuity
//! correction) and the pooled two-sample t-test.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF, StudentsT};

// ── Moments ───────────────────────────────────────────────────────────────────

/// Arithmetic mean. Returns NaN for an empty slice, so an empty segment
/// surfaces as "undefined" rather than panicking.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Unbiased sample variance (n - 1 denominator). NaN when fewer than two
/// values are present.
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() as f64 - 1.0)
}

/// Sample standard deviation (square root of [`sample_variance`]).
pub fn sample_std(values: &[f64]) -> f64 {
    sample_variance(values).sqrt()
}

/// Compute the `q`-quantile (`q` in `[0, 1]`) of a **sorted** slice using
/// standard linear interpolation (the same algorithm used by NumPy's
/// `percentile` function).
///
/// Returns NaN for an empty slice.
///
/// # Examples
///
/// ```
/// use insight_core::stats::quantile;
///
/// let data = vec![1.0, 2.0, 3.0, 4.0];
/// assert_eq!(quantile(&data, 0.5), 2.5);
/// assert_eq!(quantile(&data, 1.0), 4.0);
/// ```
pub fn quantile(sorted_data: &[f64], q: f64) -> f64 {
    if sorted_data.is_empty() {
        return f64::NAN;
    }
    let len = sorted_data.len();
    if len == 1 {
        return sorted_data[0];
    }
    let rank = q * (len as f64 - 1.0);
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted_data[lo];
    }
    let frac = rank - lo as f64;
    sorted_data[lo] + frac * (sorted_data[hi] - sorted_data[lo])
}

// ── Chi-square independence ───────────────────────────────────────────────────

/// Outcome of a 2x2 chi-square independence test.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChiSquareOutcome {
    /// The corrected chi-square statistic.
    pub statistic: f64,
    /// Two-sided p-value from the chi-square distribution with one degree
    /// of freedom.
    pub p_value: f64,
}

/// Run a chi-square independence test on a 2x2 contingency table.
///
/// `table[i]` is `[successes, failures]` for group `i`. A 2x2 table has one
/// degree of freedom, so the continuity correction always applies: each
/// observed count is moved toward its expected count by
/// `min(0.5, |observed - expected|)` before the statistic is computed.
///
/// Returns `None` when a row or column sums to zero, which makes an expected
/// frequency zero and the statistic undefined. A zero in a single cell is
/// fine and takes no special path.
pub fn chi_square_independence(table: [[u64; 2]; 2]) -> Option<ChiSquareOutcome> {
    let observed = [
        [table[0][0] as f64, table[0][1] as f64],
        [table[1][0] as f64, table[1][1] as f64],
    ];
    let row_totals = [
        observed[0][0] + observed[0][1],
        observed[1][0] + observed[1][1],
    ];
    let col_totals = [
        observed[0][0] + observed[1][0],
        observed[0][1] + observed[1][1],
    ];
    let grand_total = row_totals[0] + row_totals[1];

    if row_totals.contains(&0.0) || col_totals.contains(&0.0) {
        return None;
    }

    let mut statistic = 0.0;
    for i in 0..2 {
        for j in 0..2 {
            let expected = row_totals[i] * col_totals[j] / grand_total;
            let diff = (observed[i][j] - expected).abs();
            // Continuity correction, capped so it never overshoots.
            let adjusted = (diff - 0.5).max(0.0);
            statistic += adjusted * adjusted / expected;
        }
    }

    let dist = chi_squared_dist(1.0);
    Some(ChiSquareOutcome {
        statistic,
        p_value: 1.0 - dist.cdf(statistic),
    })
}

// ── Two-sample t-test ─────────────────────────────────────────────────────────

/// Outcome of a pooled two-sample t-test.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TTestOutcome {
    /// The t statistic. Infinite when the pooled variance is zero but the
    /// means differ; NaN when the test is undefined.
    pub statistic: f64,
    /// Two-sided p-value from Student's t distribution.
    pub p_value: f64,
    /// Degrees of freedom (n1 + n2 - 2).
    pub dof: f64,
}

/// Two-sided pooled-variance (equal variance) t-test for a difference in
/// means between two samples.
///
/// Non-finite values are dropped from each sample before testing, the same
/// treatment the dataset's missing spend cells get everywhere else. When a
/// side retains fewer than two values the test is undefined and every field
/// of the outcome is NaN.
pub fn students_t_test(sample_a: &[f64], sample_b: &[f64]) -> TTestOutcome {
    let a: Vec<f64> = sample_a.iter().copied().filter(|v| v.is_finite()).collect();
    let b: Vec<f64> = sample_b.iter().copied().filter(|v| v.is_finite()).collect();

    if a.len() < 2 || b.len() < 2 {
        return TTestOutcome {
            statistic: f64::NAN,
            p_value: f64::NAN,
            dof: f64::NAN,
        };
    }

    let n1 = a.len() as f64;
    let n2 = b.len() as f64;
    let dof = n1 + n2 - 2.0;
    let pooled_variance =
        ((n1 - 1.0) * sample_variance(&a) + (n2 - 1.0) * sample_variance(&b)) / dof;
    let std_error = (pooled_variance * (1.0 / n1 + 1.0 / n2)).sqrt();
    let statistic = (mean(&a) - mean(&b)) / std_error;

    // Zero pooled variance: identical means give 0/0 = NaN, distinct means
    // give an infinite statistic and a p-value of zero.
    let p_value = if statistic.is_nan() {
        f64::NAN
    } else if statistic.is_infinite() {
        0.0
    } else {
        let dist = t_dist(dof);
        2.0 * (1.0 - dist.cdf(statistic.abs()))
    };

    TTestOutcome {
        statistic,
        p_value,
        dof,
    }
}

// ── Distribution helpers ──────────────────────────────────────────────────────

fn chi_squared_dist(dof: f64) -> ChiSquared {
    ChiSquared::new(dof).expect("valid degrees of freedom")
}

fn t_dist(dof: f64) -> StudentsT {
    StudentsT::new(0.0, 1.0, dof).expect("valid degrees of freedom")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
