//! Inter-rater agreement and rank-correlation statistics.
//!
//! Both statistics take two positionally aligned numeric sequences (the
//! consensus medians and an automatic annotator's labels) and tolerate
//! missing values, represented as `f64::NAN`:
//!
//! - [`krippendorff_alpha_ordinal`]: chance-corrected agreement for
//!   ordinal scales. Disagreeing by one scale step costs less than
//!   disagreeing across the whole scale, which exact-match coefficients
//!   ignore. A unit with a missing value on either side is unpairable and
//!   contributes nothing; the rest of the sequence still counts.
//! - [`spearman`]: monotonic rank correlation with average ranks for
//!   ties. Pairs with a missing value on either side are omitted rather
//!   than poisoning the whole statistic.
//!
//! Degenerate input (empty after missing-value removal, or without any
//! variation) yields `f64::NAN`. That is a valid, expected outcome for
//! such data, not an error.
//!
//! # Formulation
//!
//! Alpha is computed from the coincidence matrix: for `n` pairable values
//! over categories `c` with marginals `n_c`,
//!
//! ```text
//! alpha = 1 - (n - 1) * sum_{c<k} o_ck * d(c,k) / sum_{c<k} n_c n_k * d(c,k)
//! ```
//!
//! with the ordinal distance
//! `d(c,k) = (sum_{g=c..=k} n_g - (n_c + n_k) / 2)^2`
//! over categories ordered by their numeric value.

/// Ordinal Krippendorff's alpha between two aligned raters.
///
/// `gold` and `auto` must have equal length; `NaN` marks a missing value.
/// Returns `NaN` when no pairable variation remains (no complete pairs, or
/// a single observed category).
#[must_use]
pub fn krippendorff_alpha_ordinal(gold: &[f64], auto: &[f64]) -> f64 {
    debug_assert_eq!(gold.len(), auto.len());

    // Units where both raters produced a value; with two raters, a unit
    // with one missing value has nothing to pair against.
    let units: Vec<(f64, f64)> = gold
        .iter()
        .zip(auto)
        .filter(|(g, a)| !g.is_nan() && !a.is_nan())
        .map(|(g, a)| (*g, *a))
        .collect();
    if units.is_empty() {
        return f64::NAN;
    }

    // Category domain: distinct observed values, in scale order.
    let mut categories: Vec<f64> = units.iter().flat_map(|&(g, a)| [g, a]).collect();
    categories.sort_by(f64::total_cmp);
    categories.dedup();
    let index_of = |v: f64| {
        categories
            .iter()
            .position(|&c| c == v)
            .expect("value collected into the category domain")
    };

    let k = categories.len();
    let mut coincidence = vec![vec![0.0f64; k]; k];
    for &(g, a) in &units {
        let (c, d) = (index_of(g), index_of(a));
        coincidence[c][d] += 1.0;
        coincidence[d][c] += 1.0;
    }

    let marginals: Vec<f64> = coincidence.iter().map(|row| row.iter().sum()).collect();
    let n: f64 = marginals.iter().sum();
    if n <= 1.0 {
        return f64::NAN;
    }

    let ordinal_distance = |c: usize, d: usize| -> f64 {
        let between: f64 = marginals[c..=d].iter().sum();
        let step = between - (marginals[c] + marginals[d]) / 2.0;
        step * step
    };

    let mut observed = 0.0;
    let mut expected = 0.0;
    for c in 0..k {
        for d in (c + 1)..k {
            let distance = ordinal_distance(c, d);
            observed += coincidence[c][d] * distance;
            expected += marginals[c] * marginals[d] * distance;
        }
    }
    if expected == 0.0 {
        return f64::NAN;
    }

    1.0 - (n - 1.0) * observed / expected
}

/// Spearman rank correlation between two aligned sequences.
///
/// Pairs with `NaN` on either side are omitted. Returns `NaN` when fewer
/// than two complete pairs remain or either side is constant.
#[must_use]
pub fn spearman(gold: &[f64], auto: &[f64]) -> f64 {
    debug_assert_eq!(gold.len(), auto.len());

    let (xs, ys): (Vec<f64>, Vec<f64>) = gold
        .iter()
        .zip(auto)
        .filter(|(g, a)| !g.is_nan() && !a.is_nan())
        .map(|(g, a)| (*g, *a))
        .unzip();
    if xs.len() < 2 {
        return f64::NAN;
    }

    pearson(&average_ranks(&xs), &average_ranks(&ys))
}

/// Ranks with ties assigned the average of their positions (1-based).
fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&i, &j| values[i].total_cmp(&values[j]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start;
        while end + 1 < order.len() && values[order[end + 1]] == values[order[start]] {
            end += 1;
        }
        let rank = (start + end) as f64 / 2.0 + 1.0;
        for &idx in &order[start..=end] {
            ranks[idx] = rank;
        }
        start = end + 1;
    }
    ranks
}

fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance_x = 0.0;
    let mut variance_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        variance_x += dx * dx;
        variance_y += dy * dy;
    }

    let denominator = (variance_x * variance_y).sqrt();
    if denominator == 0.0 {
        return f64::NAN;
    }
    covariance / denominator
}
