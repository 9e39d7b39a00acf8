use chrono::Datelike;

use crate::error::{LensError, Result};
use crate::models::Transaction;

// ---------------------------------------------------------------------------
// Least-squares trend line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// The fitted line evaluated at each input x, for overlay against the
    /// raw scatter.
    pub fitted: Vec<f64>,
}

/// Fit a first-degree least-squares line to parallel x/y sequences. The fit
/// is descriptive: flagging points far above the line is left to the caller.
pub fn fit_line(x: &[f64], y: &[f64]) -> Result<LinearFit> {
    if x.len() != y.len() || x.len() < 2 {
        return Err(LensError::InsufficientData(
            "a trend line needs at least two (x, y) points",
        ));
    }

    let n = x.len() as f64;
    let x_mean: f64 = x.iter().sum::<f64>() / n;
    let y_mean: f64 = y.iter().sum::<f64>() / n;
    let mut num = 0.0;
    let mut den = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        num += (xi - x_mean) * (yi - y_mean);
        den += (xi - x_mean) * (xi - x_mean);
    }
    if den.abs() < 1e-12 {
        // every x identical: no identifiable line
        return Err(LensError::InsufficientData(
            "a trend line needs at least two distinct x values",
        ));
    }

    let slope = num / den;
    let intercept = y_mean - slope * x_mean;
    let fitted = x.iter().map(|&xi| slope * xi + intercept).collect();

    Ok(LinearFit {
        slope,
        intercept,
        fitted,
    })
}

/// Time encoded as an ordinal number of days, for use as a regression x-axis.
pub fn date_ordinal(t: &Transaction) -> f64 {
    t.timestamp.date().num_days_from_ce() as f64
}

// ---------------------------------------------------------------------------
// Leading-digit distribution (Benford comparison)
// ---------------------------------------------------------------------------

/// Theoretical Benford percentages for leading digits 1–9.
pub const BENFORD_EXPECTED: [f64; 9] = [
    30.103, 17.6091, 12.4939, 9.691, 7.91812, 6.69468, 5.79919, 5.11525, 4.57575,
];

const DIGIT_LABELS: [&str; 9] = ["1", "2", "3", "4", "5", "6", "7", "8", "9"];

#[derive(Debug, Clone)]
pub struct DigitBucket {
    pub label: &'static str,
    pub expected: f64,
    pub observed: f64,
    pub count: usize,
}

#[derive(Debug, Clone)]
pub struct DigitDistribution {
    /// Ordered buckets: optional `-1`/`0` sentinels, then digits 1–9.
    pub buckets: Vec<DigitBucket>,
    pub total: usize,
}

/// Leading significant digit of an amount, defined for amounts >= 1. The
/// digit is read off the shortest round-trip decimal rendering, which never
/// uses scientific notation.
fn leading_digit(amount: f64) -> Option<usize> {
    if amount < 1.0 {
        return None;
    }
    let first = format!("{amount}").bytes().next()?;
    if first.is_ascii_digit() && first != b'0' {
        Some((first - b'1') as usize)
    } else {
        None
    }
}

/// Observed leading-digit percentages against the Benford expectation.
///
/// With `include_negatives_zeros` set, negative amounts are counted into a
/// `-1` sentinel bucket and amounts in (0, 1) into a `0` bucket, and every
/// percentage is taken against the enlarged total; both sentinels have a
/// theoretical expectation of 0. Amounts of exactly 0 never qualify.
pub fn digit_distribution(
    rows: &[Transaction],
    include_negatives_zeros: bool,
) -> Result<DigitDistribution> {
    let mut digit_counts = [0usize; 9];
    let mut neg_count = 0usize;
    let mut sub_unit_count = 0usize;
    for t in rows {
        if let Some(d) = leading_digit(t.amount) {
            digit_counts[d] += 1;
        } else if t.amount < 0.0 {
            neg_count += 1;
        } else if t.amount > 0.0 {
            sub_unit_count += 1;
        }
    }

    let mut total: usize = digit_counts.iter().sum();
    if include_negatives_zeros {
        total += neg_count + sub_unit_count;
    }
    if total == 0 {
        return Err(LensError::EmptyDataset(
            "no amounts qualify for leading-digit analysis",
        ));
    }

    let observed = |count: usize| count as f64 / total as f64 * 100.0;

    let mut buckets = Vec::with_capacity(11);
    if include_negatives_zeros {
        buckets.push(DigitBucket {
            label: "-1",
            expected: 0.0,
            observed: observed(neg_count),
            count: neg_count,
        });
        buckets.push(DigitBucket {
            label: "0",
            expected: 0.0,
            observed: observed(sub_unit_count),
            count: sub_unit_count,
        });
    }
    for (i, &count) in digit_counts.iter().enumerate() {
        buckets.push(DigitBucket {
            label: DIGIT_LABELS[i],
            expected: BENFORD_EXPECTED[i],
            observed: observed(count),
            count,
        });
    }

    Ok(DigitDistribution { buckets, total })
}
