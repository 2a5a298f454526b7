//! Descriptive statistics over the historical dataset, ready for charting.

use std::collections::BTreeMap;

use crate::mix::domain::Feature;

use super::domain::{
    AgeGroup, Column, CorrelationMatrix, Dataset, DatasetStats, Distribution, HistogramBin,
    ScatterSeries,
};

/// Histogram resolution used when the caller does not pick one.
pub const DEFAULT_BINS: usize = 20;

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Pearson correlation; 0 when either side has no variance.
fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let (ma, mb) = (mean(a), mean(b));
    let mut cov = 0.0;
    let mut va = 0.0;
    let mut vb = 0.0;
    for (x, y) in a.iter().zip(b) {
        let (dx, dy) = (x - ma, y - mb);
        cov += dx * dy;
        va += dx * dx;
        vb += dy * dy;
    }
    if va == 0.0 || vb == 0.0 {
        return 0.0;
    }
    cov / (va * vb).sqrt()
}

/// Linear-interpolated quantile of sorted values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Correlation of every feature and strength with every other.
pub fn correlation_matrix(dataset: &Dataset) -> CorrelationMatrix {
    let columns = Column::all();
    let data: Vec<Vec<f64>> = columns.iter().map(|c| dataset.column(*c)).collect();
    let values = (0..columns.len())
        .map(|i| {
            (0..columns.len())
                .map(|j| if i == j { 1.0 } else { pearson(&data[i], &data[j]) })
                .collect()
        })
        .collect();
    CorrelationMatrix { columns, values }
}

/// Summary statistics and an equal-width histogram of measured strength.
///
/// Returns `None` for an empty dataset.
pub fn strength_distribution(dataset: &Dataset, bins: usize) -> Option<Distribution> {
    let values = dataset.column(Column::Strength);
    if values.is_empty() {
        return None;
    }
    let bins = bins.max(1);
    let count = values.len();
    let avg = mean(&values);
    let std_dev = if count > 1 {
        (values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (count - 1) as f64).sqrt()
    } else {
        0.0
    };
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let width = (max - min) / bins as f64;
    let mut histogram: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();
    for v in &values {
        let idx = if width > 0.0 {
            (((v - min) / width) as usize).min(bins - 1)
        } else {
            0
        };
        histogram[idx].count += 1;
    }

    Some(Distribution {
        count,
        mean: avg,
        std_dev,
        min,
        max,
        bins: histogram,
    })
}

/// `(feature value, strength)` pairs for a scatter plot.
pub fn scatter(dataset: &Dataset, feature: Feature) -> Vec<(f64, f64)> {
    dataset
        .records
        .iter()
        .map(|r| (r.get(feature), r.strength_mpa))
        .collect()
}

/// Five-number strength summary per curing age, youngest first.
pub fn strength_by_age(dataset: &Dataset) -> Vec<AgeGroup> {
    let mut groups: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for record in &dataset.records {
        let age = record.get(Feature::Age).round().max(0.0) as u32;
        groups.entry(age).or_default().push(record.strength_mpa);
    }

    groups
        .into_iter()
        .map(|(age_days, mut values)| {
            values.sort_by(f64::total_cmp);
            AgeGroup {
                age_days,
                count: values.len(),
                min: values[0],
                q1: quantile(&values, 0.25),
                median: quantile(&values, 0.5),
                q3: quantile(&values, 0.75),
                max: values[values.len() - 1],
            }
        })
        .collect()
}

/// Every chart's data at once: correlations, the strength histogram, one
/// scatter series per feature and the by-age summaries.
pub fn summarise(dataset: &Dataset, bins: usize) -> DatasetStats {
    DatasetStats {
        rows: dataset.len(),
        correlation: correlation_matrix(dataset),
        strength: strength_distribution(dataset, bins),
        scatter: Feature::ALL
            .into_iter()
            .map(|feature| ScatterSeries {
                feature,
                points: scatter(dataset, feature),
            })
            .collect(),
        by_age: strength_by_age(dataset),
    }
}
