//! Seeded k-means over two-dimensional features.
//!
//! Initialisation is k-means++ driven by a `StdRng` seeded from a fixed value,
//! followed by Lloyd iterations. Every returned cluster is non-empty: whenever
//! an assignment step leaves a cluster empty, the point farthest from its own
//! centroid (taken from a cluster with more than one member) is moved into it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Clone, Debug, PartialEq)]
pub struct Clustering {
    /// Cluster index per input point.
    pub labels: Vec<usize>,
    pub centroids: Vec<[f64; 2]>,
    pub iterations: usize,
}

impl Clustering {
    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    /// Point indices of cluster `c`, ascending.
    pub fn members(&self, c: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, &l)| l == c)
            .map(|(i, _)| i)
            .collect()
    }
}

pub(crate) fn distance_sq(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

/// Clusters `points` into exactly `k` non-empty clusters.
///
/// Returns `None` when `k == 0` or `k > points.len()`.
pub fn kmeans(points: &[[f64; 2]], k: usize, seed: u64, max_iterations: usize) -> Option<Clustering> {
    let n = points.len();
    if k == 0 || k > n {
        return None;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut centroids = init_plus_plus(points, k, &mut rng);

    let mut labels: Vec<usize> = Vec::new();
    let mut iterations = 0;
    for _ in 0..max_iterations.max(1) {
        iterations += 1;
        let mut next = assign(points, &centroids);
        repair_empty(points, &centroids, &mut next, k);
        let changed = next != labels;
        labels = next;
        centroids = recompute_centroids(points, &labels, k);
        if !changed {
            break;
        }
    }

    Some(Clustering {
        labels,
        centroids,
        iterations,
    })
}

fn init_plus_plus(points: &[[f64; 2]], k: usize, rng: &mut StdRng) -> Vec<[f64; 2]> {
    let n = points.len();
    let mut chosen = vec![false; n];
    let first = rng.random_range(0..n);
    chosen[first] = true;
    let mut centroids = vec![points[first]];

    while centroids.len() < k {
        let weights: Vec<f64> = points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if chosen[i] {
                    0.0
                } else {
                    centroids
                        .iter()
                        .map(|c| distance_sq(*p, *c))
                        .fold(f64::INFINITY, f64::min)
                }
            })
            .collect();
        let total: f64 = weights.iter().sum();

        let pick = if total > 0.0 && total.is_finite() {
            let target = rng.random::<f64>() * total;
            let mut acc = 0.0;
            let mut pick = None;
            for (i, w) in weights.iter().enumerate() {
                if chosen[i] || *w <= 0.0 {
                    continue;
                }
                acc += w;
                pick = Some(i);
                if acc >= target {
                    break;
                }
            }
            pick
        } else {
            None
        };

        // Remaining points all coincide with a centroid.
        let pick = pick.or_else(|| (0..n).find(|&i| !chosen[i]));
        let Some(i) = pick else {
            break;
        };
        chosen[i] = true;
        centroids.push(points[i]);
    }

    centroids
}

/// Nearest centroid per point; ties go to the lower cluster index.
fn assign(points: &[[f64; 2]], centroids: &[[f64; 2]]) -> Vec<usize> {
    points
        .iter()
        .map(|p| {
            let mut best = 0;
            let mut best_d = f64::INFINITY;
            for (c, centroid) in centroids.iter().enumerate() {
                let d = distance_sq(*p, *centroid);
                if d < best_d {
                    best = c;
                    best_d = d;
                }
            }
            best
        })
        .collect()
}

fn repair_empty(points: &[[f64; 2]], centroids: &[[f64; 2]], labels: &mut [usize], k: usize) {
    let mut counts = vec![0usize; k];
    for &l in labels.iter() {
        counts[l] += 1;
    }

    for empty in 0..k {
        if counts[empty] > 0 {
            continue;
        }
        let mut donor: Option<(usize, f64)> = None;
        for (i, p) in points.iter().enumerate() {
            let l = labels[i];
            if counts[l] <= 1 {
                continue;
            }
            let d = distance_sq(*p, centroids[l]);
            if donor.map_or(true, |(_, best)| d > best) {
                donor = Some((i, d));
            }
        }
        let Some((i, _)) = donor else {
            return;
        };
        counts[labels[i]] -= 1;
        labels[i] = empty;
        counts[empty] += 1;
    }
}

fn recompute_centroids(points: &[[f64; 2]], labels: &[usize], k: usize) -> Vec<[f64; 2]> {
    let mut sums = vec![[0.0f64; 2]; k];
    let mut counts = vec![0usize; k];
    for (p, &l) in points.iter().zip(labels) {
        sums[l][0] += p[0];
        sums[l][1] += p[1];
        counts[l] += 1;
    }
    sums.iter()
        .zip(&counts)
        .map(|(s, &c)| {
            if c == 0 {
                *s
            } else {
                [s[0] / c as f64, s[1] / c as f64]
            }
        })
        .collect()
}
