use crate::kmeans::distance_sq;
use crate::types::cmp_f64_asc;

/// Mean Euclidean distance from each point to its `k` nearest other points.
///
/// `k` is clamped to `n - 1`; a lone point (or `k == 0`) scores `0.0`.
pub fn mean_knn_distances(points: &[[f64; 2]], k: usize) -> Vec<f64> {
    let n = points.len();
    let k = k.min(n.saturating_sub(1));
    if k == 0 {
        return vec![0.0; n];
    }

    let mut out = Vec::with_capacity(n);
    let mut dists: Vec<f64> = Vec::with_capacity(n - 1);
    for (i, p) in points.iter().enumerate() {
        dists.clear();
        dists.extend(
            points
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, q)| distance_sq(*p, *q).sqrt()),
        );
        dists.sort_by(|a, b| cmp_f64_asc(*a, *b));
        let sum: f64 = dists.iter().take(k).sum();
        out.push(sum / k as f64);
    }
    out
}
