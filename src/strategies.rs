//! Per-heliostat split strategies.
//!
//! Each strategy is a pure function over the samples of a single heliostat.
//! Assignments come back grouped by label (train, validation, test), each
//! group in the strategy's ranking order.

use crate::config::{GapPolicy, SplitterOptions};
use crate::errors::{SplitError, SplitResult};
use crate::kmeans::{distance_sq, kmeans};
use crate::knn::mean_knn_distances;
use crate::solstice::{solstice_distance_days, Season};
use crate::types::{
    cmp_f64_asc, cmp_f64_desc, HeliostatSample, SplitAssignment, SplitConfiguration, SplitLabel,
    SplitType,
};

/// Result of splitting one heliostat.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupSplit {
    pub assignments: Vec<SplitAssignment>,
    /// Samples deliberately left without a label (high-variance gap).
    pub excluded: usize,
}

impl GroupSplit {
    pub fn count(&self, label: SplitLabel) -> usize {
        self.assignments.iter().filter(|a| a.split == label).count()
    }
}

pub fn split_heliostat(
    samples: &[HeliostatSample],
    cfg: &SplitConfiguration,
    opts: &SplitterOptions,
) -> SplitResult<GroupSplit> {
    let t = cfg.training_size;
    let v = cfg.validation_size;
    match cfg.split_type {
        SplitType::Azimuth => azimuth_split(samples, t, v),
        SplitType::Solstice => solstice_split(samples, t, v),
        SplitType::Balanced => {
            balanced_split(samples, v, opts.kmeans_seed, opts.kmeans_max_iterations)
        }
        SplitType::HighVariance => {
            high_variance_split(samples, t, v, opts.knn_neighbors, opts.gap_policy)
        }
    }
}

/// Samples needed for `training_size` plus `validation_blocks` blocks of
/// `validation_size`. Saturates to `usize::MAX` on overflow.
fn required_samples(training_size: usize, validation_size: usize, validation_blocks: usize) -> usize {
    validation_size
        .checked_mul(validation_blocks)
        .and_then(|v| v.checked_add(training_size))
        .unwrap_or(usize::MAX)
}

fn ensure_samples(samples: &[HeliostatSample], required: usize) -> SplitResult<()> {
    if required > samples.len() {
        return Err(SplitError::InsufficientSamples {
            heliostat_id: samples
                .first()
                .map(|s| s.heliostat_id.clone())
                .unwrap_or_default(),
            available: samples.len(),
            required,
        });
    }
    Ok(())
}

fn labelled(
    samples: &[HeliostatSample],
    train: &[usize],
    validation: &[usize],
    test: &[usize],
) -> Vec<SplitAssignment> {
    let mut out = Vec::with_capacity(train.len() + validation.len() + test.len());
    for (idxs, label) in [
        (train, SplitLabel::Train),
        (validation, SplitLabel::Validation),
        (test, SplitLabel::Test),
    ] {
        out.extend(idxs.iter().map(|&i| SplitAssignment::new(&samples[i], label)));
    }
    out
}

/// Smallest azimuths train, largest azimuths validate, the middle tests.
pub fn azimuth_split(
    samples: &[HeliostatSample],
    training_size: usize,
    validation_size: usize,
) -> SplitResult<GroupSplit> {
    ensure_samples(samples, required_samples(training_size, validation_size, 1))?;
    let n = samples.len();

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        cmp_f64_asc(samples[a].azimuth, samples[b].azimuth)
            .then_with(|| samples[a].row.cmp(&samples[b].row))
    });

    let train = &order[..training_size];
    let test = &order[training_size..n - validation_size];
    let validation = &order[n - validation_size..];

    Ok(GroupSplit {
        assignments: labelled(samples, train, validation, test),
        excluded: 0,
    })
}

/// Samples closest to the winter solstice train, the remaining samples closest
/// to the summer solstice validate, the rest tests.
pub fn solstice_split(
    samples: &[HeliostatSample],
    training_size: usize,
    validation_size: usize,
) -> SplitResult<GroupSplit> {
    ensure_samples(samples, required_samples(training_size, validation_size, 1))?;

    let winter: Vec<f64> = samples
        .iter()
        .map(|s| solstice_distance_days(&s.timestamp, Season::Winter))
        .collect();
    let summer: Vec<f64> = samples
        .iter()
        .map(|s| solstice_distance_days(&s.timestamp, Season::Summer))
        .collect();

    let by = |dist: &[f64], a: usize, b: usize| {
        cmp_f64_asc(dist[a], dist[b])
            .then_with(|| samples[a].timestamp.cmp(&samples[b].timestamp))
            .then_with(|| samples[a].row.cmp(&samples[b].row))
    };

    let mut order: Vec<usize> = (0..samples.len()).collect();
    order.sort_by(|&a, &b| by(&winter, a, b));
    let (train, rest) = order.split_at(training_size);

    let mut rest = rest.to_vec();
    rest.sort_by(|&a, &b| by(&summer, a, b));
    let (validation, test) = rest.split_at(validation_size);

    Ok(GroupSplit {
        assignments: labelled(samples, train, validation, test),
        excluded: 0,
    })
}

/// One validation and at most one test sample per k-means cluster over
/// (azimuth, elevation) in raw degrees, with `k = validation_size`.
pub fn balanced_split(
    samples: &[HeliostatSample],
    validation_size: usize,
    seed: u64,
    max_iterations: usize,
) -> SplitResult<GroupSplit> {
    ensure_samples(samples, validation_size)?;
    let n = samples.len();

    if validation_size == 0 {
        let train: Vec<usize> = (0..n).collect();
        return Ok(GroupSplit {
            assignments: labelled(samples, &train, &[], &[]),
            excluded: 0,
        });
    }

    // Canonical point order keeps clustering independent of input row order.
    let mut canonical: Vec<usize> = (0..n).collect();
    canonical.sort_by(|&a, &b| {
        cmp_f64_asc(samples[a].azimuth, samples[b].azimuth)
            .then_with(|| cmp_f64_asc(samples[a].elevation, samples[b].elevation))
            .then_with(|| samples[a].row.cmp(&samples[b].row))
    });
    let points: Vec<[f64; 2]> = canonical.iter().map(|&i| samples[i].position()).collect();

    let clustering = kmeans(&points, validation_size, seed, max_iterations).ok_or_else(|| {
        SplitError::InsufficientSamples {
            heliostat_id: samples[0].heliostat_id.clone(),
            available: n,
            required: validation_size,
        }
    })?;

    let mut taken = vec![false; n];
    let mut validation = Vec::with_capacity(validation_size);
    let mut test = Vec::with_capacity(validation_size);

    for c in 0..clustering.k() {
        let centroid = clustering.centroids[c];
        let mut members: Vec<usize> = clustering
            .members(c)
            .into_iter()
            .map(|p| canonical[p])
            .collect();
        members.sort_by(|&a, &b| {
            cmp_f64_asc(
                distance_sq(samples[a].position(), centroid),
                distance_sq(samples[b].position(), centroid),
            )
            .then_with(|| samples[a].row.cmp(&samples[b].row))
        });

        let mut picks = members.into_iter();
        if let Some(i) = picks.next() {
            taken[i] = true;
            validation.push(i);
        }
        if let Some(i) = picks.next() {
            taken[i] = true;
            test.push(i);
        }
    }

    if test.len() < validation_size {
        let mut pool: Vec<usize> = (0..n).filter(|&i| !taken[i]).collect();
        pool.sort_by_key(|&i| samples[i].row);
        for i in pool.into_iter().take(validation_size - test.len()) {
            taken[i] = true;
            test.push(i);
        }
    }

    let mut train: Vec<usize> = (0..n).filter(|&i| !taken[i]).collect();
    train.sort_by_key(|&i| samples[i].row);

    Ok(GroupSplit {
        assignments: labelled(samples, &train, &validation, &test),
        excluded: 0,
    })
}

/// Ranks samples by mean k-nearest-neighbour distance: the most distinct
/// validate, the next most distinct test, the most typical train.
pub fn high_variance_split(
    samples: &[HeliostatSample],
    training_size: usize,
    validation_size: usize,
    neighbors: usize,
    gap_policy: GapPolicy,
) -> SplitResult<GroupSplit> {
    ensure_samples(samples, required_samples(training_size, validation_size, 2))?;
    let n = samples.len();

    let points: Vec<[f64; 2]> = samples.iter().map(|s| s.position()).collect();
    let scores = mean_knn_distances(&points, neighbors);

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        cmp_f64_desc(scores[a], scores[b]).then_with(|| samples[a].row.cmp(&samples[b].row))
    });

    let validation = &order[..validation_size];
    let test = &order[validation_size..2 * validation_size];
    let gap = &order[2 * validation_size..n - training_size];
    let bottom = &order[n - training_size..];

    let (train, excluded) = match gap_policy {
        GapPolicy::Exclude => (bottom.to_vec(), gap.len()),
        GapPolicy::Train => (order[2 * validation_size..].to_vec(), 0),
    };

    Ok(GroupSplit {
        assignments: labelled(samples, &train, validation, test),
        excluded,
    })
}

/// Mean KNN distance per sample, in input order. Exposed for reporting.
pub fn distinctiveness(samples: &[HeliostatSample], neighbors: usize) -> Vec<f64> {
    let points: Vec<[f64; 2]> = samples.iter().map(|s| s.position()).collect();
    mean_knn_distances(&points, neighbors)
}
