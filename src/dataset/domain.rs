//! Historical mixes with measured strength, and the summaries derived from them.
//!
//! Used for descriptive statistics only; predictions never read this data.

use serde::Serialize;

use crate::mix::domain::{Feature, FEATURE_COUNT};

/// One laboratory sample.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MixRecord {
    /// Feature values in model order.
    pub features: [f64; FEATURE_COUNT],
    /// Measured compressive strength in MPa.
    pub strength_mpa: f64,
}

impl MixRecord {
    pub fn get(&self, feature: Feature) -> f64 {
        self.features[feature.index()]
    }
}

/// Columns a summary can refer to. Serialised as the model column name.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Column {
    Feature(Feature),
    Strength,
}

impl Serialize for Column {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.name())
    }
}

impl Column {
    /// The eight features followed by strength.
    pub fn all() -> Vec<Column> {
        Feature::ALL
            .into_iter()
            .map(Column::Feature)
            .chain(std::iter::once(Column::Strength))
            .collect()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Column::Feature(f) => f.column(),
            Column::Strength => "Strength",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    pub records: Vec<MixRecord>,
}

impl Dataset {
    pub fn new(records: Vec<MixRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column(&self, column: Column) -> Vec<f64> {
        self.records
            .iter()
            .map(|r| match column {
                Column::Feature(f) => r.get(f),
                Column::Strength => r.strength_mpa,
            })
            .collect()
    }
}

/// Pearson correlations between every pair of columns.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<Column>,
    /// Row-major, `values[i][j]` correlates `columns[i]` with `columns[j]`.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: Column, b: Column) -> Option<f64> {
        let i = self.columns.iter().position(|c| *c == a)?;
        let j = self.columns.iter().position(|c| *c == b)?;
        Some(self.values[i][j])
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Summary statistics and histogram of measured strength.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Distribution {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub bins: Vec<HistogramBin>,
}

/// Five-number summary of strength for one curing age.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct AgeGroup {
    pub age_days: u32,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// One feature plotted against measured strength.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub feature: Feature,
    /// `(feature value, strength)` pairs in dataset order.
    pub points: Vec<(f64, f64)>,
}

/// Everything the descriptive charts draw, in one payload.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DatasetStats {
    pub rows: usize,
    pub correlation: CorrelationMatrix,
    /// `None` only for an empty dataset.
    pub strength: Option<Distribution>,
    pub scatter: Vec<ScatterSeries>,
    pub by_age: Vec<AgeGroup>,
}
