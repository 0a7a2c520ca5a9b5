// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

/// Squared Euclidean distance. Callers guarantee equal lengths.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

pub fn magnitude(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Scale to unit length in place; zero vectors are left as they are.
pub fn l2_normalize(v: &mut [f32]) {
    let mag = magnitude(v);
    if mag == 0.0 {
        return;
    }
    for x in v.iter_mut() {
        *x /= mag;
    }
}

/// Positions of the `k` smallest distances, ascending.
///
/// Ties keep the lower position first. NaN distances sort last.
pub fn top_k_smallest(distances: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut indexed: Vec<(usize, f32)> = distances.iter().copied().enumerate().collect();

    let by_distance = |a: &(usize, f32), b: &(usize, f32)| {
        a.1.partial_cmp(&b.1)
            .unwrap_or_else(|| a.1.is_nan().cmp(&b.1.is_nan()))
            .then(a.0.cmp(&b.0))
    };

    let k = k.min(indexed.len());
    if k == 0 {
        return Vec::new();
    }
    if k < indexed.len() {
        indexed.select_nth_unstable_by(k - 1, by_distance);
        indexed.truncate(k);
    }
    indexed.sort_by(by_distance);
    indexed
}
