//! CSV loader for the historical concrete dataset.
//!
//! Headers are matched by prefix, so both the short model column names and
//! the long UCI headers (`Cement (component 1)(kg in a m^3 mixture)`, ...)
//! are understood.

use std::io::Read;
use std::path::{Path, PathBuf};

use csv::StringRecord;

use crate::common::error::DatasetError;
use crate::mix::domain::{Feature, FEATURE_COUNT};

use super::domain::{Dataset, MixRecord};

const STRENGTH_PREFIXES: [&str; 3] = ["concrete compressive strength", "strength", "csmpa"];

fn normalise(header: &str) -> String {
    header.trim().to_ascii_lowercase().replace('_', " ")
}

fn prefixes(feature: Feature) -> &'static [&'static str] {
    match feature {
        Feature::Cement => &["cement"],
        Feature::BlastFurnaceSlag => &["blast furnace slag", "slag"],
        Feature::FlyAsh => &["fly ash"],
        Feature::Water => &["water"],
        Feature::Superplasticizer => &["superplasticizer"],
        Feature::CoarseAggregate => &["coarse aggregate"],
        Feature::FineAggregate => &["fine aggregate"],
        Feature::Age => &["age"],
    }
}

/// Column positions of the eight features and the strength target.
struct Layout {
    features: [usize; FEATURE_COUNT],
    strength: usize,
}

impl Layout {
    fn from_headers(headers: &StringRecord) -> Result<Self, DatasetError> {
        let names: Vec<String> = headers.iter().map(normalise).collect();
        let find = |candidates: &[&str]| {
            names
                .iter()
                .position(|h| candidates.iter().any(|p| h.starts_with(p)))
        };

        let mut features = [0; FEATURE_COUNT];
        for feature in Feature::ALL {
            features[feature.index()] = find(prefixes(feature))
                .ok_or_else(|| DatasetError::MissingColumn(feature.column().to_string()))?;
        }
        let strength =
            find(&STRENGTH_PREFIXES).ok_or_else(|| DatasetError::MissingColumn("strength".to_string()))?;
        Ok(Self { features, strength })
    }
}

/// Reads datasets from CSV files.
pub struct CsvDatasetRepo;

impl CsvDatasetRepo {
    pub fn load(path: &Path) -> Result<Dataset, DatasetError> {
        let reader = csv::Reader::from_path(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::read(reader, path)
    }

    pub fn from_reader<R: Read>(input: R) -> Result<Dataset, DatasetError> {
        Self::read(csv::Reader::from_reader(input), Path::new("<reader>"))
    }

    fn read<R: Read>(mut reader: csv::Reader<R>, path: &Path) -> Result<Dataset, DatasetError> {
        let io_err = |source: csv::Error| DatasetError::Io {
            path: PathBuf::from(path),
            source,
        };

        let headers = reader.headers().map_err(io_err)?.clone();
        let layout = Layout::from_headers(&headers)?;

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(io_err)?;
            let line = row.position().map(|p| p.line()).unwrap_or_default();
            let cell = |idx: usize| -> Result<f64, DatasetError> {
                let raw = row.get(idx).unwrap_or_default().trim();
                raw.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| DatasetError::BadCell {
                        line,
                        column: headers.get(idx).unwrap_or_default().to_string(),
                        value: raw.to_string(),
                    })
            };

            let mut features = [0.0; FEATURE_COUNT];
            for (slot, idx) in features.iter_mut().zip(layout.features) {
                *slot = cell(idx)?;
            }
            records.push(MixRecord {
                features,
                strength_mpa: cell(layout.strength)?,
            });
        }

        if records.is_empty() {
            return Err(DatasetError::Empty);
        }
        tracing::debug!(rows = records.len(), path = %path.display(), "dataset loaded");
        Ok(Dataset::new(records))
    }
}
