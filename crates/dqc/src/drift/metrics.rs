//! Divergence metrics between a current and a reference distribution.

use std::collections::{BTreeMap, BTreeSet};

use crate::utils::{quantile_sorted, sort_floats};

/// Probability substituted for empty bins before taking logarithms.
pub const PSI_EPSILON: f64 = 1e-8;

/// Minimum number of distinct bin edges (two bins) for PSI to be defined.
const MIN_EDGES: usize = 3;

/// Distinct quantiles of `reference` at `bins + 1` evenly spaced points.
pub fn quantile_edges(reference: &[f64], bins: usize) -> Vec<f64> {
    let mut sorted = reference.to_vec();
    sort_floats(&mut sorted);

    let mut edges: Vec<f64> = (0..=bins)
        .filter_map(|i| quantile_sorted(&sorted, i as f64 / bins as f64))
        .collect();
    edges.dedup();
    edges
}

/// Counts of `values` per bin defined by ascending `edges`.
///
/// Bins are half-open `[e_i, e_i+1)` except the last, which also includes the
/// upper edge. Values outside `[e_0, e_n]` are not counted.
pub fn histogram(values: &[f64], edges: &[f64]) -> Vec<usize> {
    let n_bins = edges.len().saturating_sub(1);
    let mut counts = vec![0; n_bins];
    if n_bins == 0 {
        return counts;
    }

    let (first, last) = (edges[0], edges[n_bins]);
    for &v in values {
        if v < first || v > last {
            continue;
        }
        let bin = if v == last {
            n_bins - 1
        } else {
            edges.partition_point(|e| *e <= v) - 1
        };
        counts[bin] += 1;
    }
    counts
}

/// Counts divided by their total, with a total of zero treated as one.
fn normalise(counts: &[usize]) -> Vec<f64> {
    let total = counts.iter().sum::<usize>().max(1) as f64;
    counts.iter().map(|c| *c as f64 / total).collect()
}

/// Population stability index of `current` against `reference`.
///
/// Returns `None` when either side is empty or the reference has too few
/// distinct quantiles to form two bins.
pub fn psi(current: &[f64], reference: &[f64], bins: usize) -> Option<f64> {
    if current.is_empty() || reference.is_empty() || bins == 0 {
        return None;
    }

    let edges = quantile_edges(reference, bins);
    if edges.len() < MIN_EDGES {
        return None;
    }

    let cur = normalise(&histogram(current, &edges));
    let refr = normalise(&histogram(reference, &edges));

    let value = cur
        .iter()
        .zip(&refr)
        .map(|(&c, &r)| {
            let c = if c == 0.0 { PSI_EPSILON } else { c };
            let r = if r == 0.0 { PSI_EPSILON } else { r };
            (c - r) * (c / r).ln()
        })
        .sum();
    Some(value)
}

fn frequencies<'a>(values: &[&'a str]) -> BTreeMap<&'a str, usize> {
    let mut counts = BTreeMap::new();
    for v in values {
        *counts.entry(*v).or_insert(0) += 1;
    }
    counts
}

/// Jensen-Shannon distance (square root of the divergence, base 2) between
/// the category frequencies of `current` and `reference`.
///
/// Bounded in `[0, 1]`: identical distributions give 0, disjoint ones 1.
/// Returns `None` when either side is empty.
pub fn jensen_shannon(current: &[&str], reference: &[&str]) -> Option<f64> {
    if current.is_empty() || reference.is_empty() {
        return None;
    }

    let cur_counts = frequencies(current);
    let ref_counts = frequencies(reference);
    let categories: BTreeSet<&str> = cur_counts.keys().chain(ref_counts.keys()).copied().collect();

    let dist = |counts: &BTreeMap<&str, usize>| -> Vec<f64> {
        let aligned: Vec<usize> = categories
            .iter()
            .map(|c| counts.get(c).copied().unwrap_or(0))
            .collect();
        normalise(&aligned)
    };
    let p = dist(&ref_counts);
    let q = dist(&cur_counts);

    let kl_to_mid = |a: &[f64], b: &[f64]| -> f64 {
        a.iter()
            .zip(b)
            .filter(|(x, _)| **x > 0.0)
            .map(|(x, y)| x * (x / ((x + y) / 2.0)).ln())
            .sum()
    };

    let divergence = (kl_to_mid(&p, &q) + kl_to_mid(&q, &p)) / 2.0 / std::f64::consts::LN_2;
    Some(divergence.max(0.0).sqrt())
}
