//! Mix-design quantities, their documented ranges and the fixed feature order.

use std::fmt;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::error::{Bound, ValidationError};

/// Number of features every regressor consumes.
pub const FEATURE_COUNT: usize = 8;

/// One mix-design quantity. Declaration order is the model's feature order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Cement,
    BlastFurnaceSlag,
    FlyAsh,
    Water,
    Superplasticizer,
    CoarseAggregate,
    FineAggregate,
    Age,
}

/// Inclusive physical range of a feature.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FeatureRange {
    pub min: f64,
    pub max: f64,
}

impl FeatureRange {
    const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// The violated bound, if any.
    pub fn check(&self, value: f64) -> Option<Bound> {
        if value < self.min {
            Some(Bound::Min(self.min))
        } else if value > self.max {
            Some(Bound::Max(self.max))
        } else {
            None
        }
    }
}

impl Feature {
    /// All features in model order.
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Cement,
        Feature::BlastFurnaceSlag,
        Feature::FlyAsh,
        Feature::Water,
        Feature::Superplasticizer,
        Feature::CoarseAggregate,
        Feature::FineAggregate,
        Feature::Age,
    ];

    /// Request key.
    pub fn key(&self) -> &'static str {
        match self {
            Feature::Cement => "cement",
            Feature::BlastFurnaceSlag => "blast_furnace_slag",
            Feature::FlyAsh => "fly_ash",
            Feature::Water => "water",
            Feature::Superplasticizer => "superplasticizer",
            Feature::CoarseAggregate => "coarse_aggregate",
            Feature::FineAggregate => "fine_aggregate",
            Feature::Age => "age",
        }
    }

    /// Column name the model was trained with.
    pub fn column(&self) -> &'static str {
        match self {
            Feature::Cement => "Cement",
            Feature::BlastFurnaceSlag => "Blast_Furnace_Slag",
            Feature::FlyAsh => "Fly_Ash",
            Feature::Water => "Water",
            Feature::Superplasticizer => "Superplasticizer",
            Feature::CoarseAggregate => "Coarse_Aggregate",
            Feature::FineAggregate => "Fine_Aggregate",
            Feature::Age => "Age",
        }
    }

    fn alias(&self) -> Option<&'static str> {
        match self {
            Feature::BlastFurnaceSlag => Some("slag"),
            Feature::CoarseAggregate => Some("coarse"),
            Feature::FineAggregate => Some("fine"),
            _ => None,
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Feature::Age => "days",
            _ => "kg/m³",
        }
    }

    pub fn range(&self) -> FeatureRange {
        match self {
            Feature::Cement => FeatureRange::new(0.0, 1000.0),
            Feature::BlastFurnaceSlag => FeatureRange::new(0.0, 400.0),
            Feature::FlyAsh => FeatureRange::new(0.0, 300.0),
            Feature::Water => FeatureRange::new(100.0, 300.0),
            Feature::Superplasticizer => FeatureRange::new(0.0, 30.0),
            Feature::CoarseAggregate => FeatureRange::new(500.0, 1200.0),
            Feature::FineAggregate => FeatureRange::new(500.0, 1000.0),
            Feature::Age => FeatureRange::new(1.0, 365.0),
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Resolve a request key, column name or alias, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Feature> {
        let name = name.trim();
        Feature::ALL.into_iter().find(|f| {
            name.eq_ignore_ascii_case(f.key())
                || name.eq_ignore_ascii_case(f.column())
                || f.alias().is_some_and(|a| name.eq_ignore_ascii_case(a))
        })
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Unvalidated request payload: field name to JSON value, in document order.
///
/// Unlike a map, a key that appears twice in the source document is kept
/// twice, so validation can reject it instead of silently keeping the last.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawMix(Vec<(String, Value)>);

impl RawMix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing every existing entry with exactly that name.
    pub fn insert(&mut self, key: String, value: Value) {
        self.0.retain(|(k, _)| *k != key);
        self.0.push((key, value));
    }

    /// Drop every entry named exactly `key`; returns the last value removed.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let mut removed = None;
        self.0.retain(|(k, v)| {
            if k == key {
                removed = Some(v.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for RawMix {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for RawMix {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RawMixVisitor;

        impl<'de> Visitor<'de> for RawMixVisitor {
            type Value = RawMix;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of mix fields")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawMix, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(FEATURE_COUNT));
                while let Some(entry) = map.next_entry::<String, Value>()? {
                    entries.push(entry);
                }
                Ok(RawMix(entries))
            }
        }

        deserializer.deserialize_map(RawMixVisitor)
    }
}

/// Plain numbers for Rust callers; turned into a [`MixInput`] by [`MixInput::new`].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MixValues {
    pub cement: f64,
    pub blast_furnace_slag: f64,
    pub fly_ash: f64,
    pub water: f64,
    pub superplasticizer: f64,
    pub coarse_aggregate: f64,
    pub fine_aggregate: f64,
    pub age: f64,
}

impl MixValues {
    fn to_array(self) -> [f64; FEATURE_COUNT] {
        [
            self.cement,
            self.blast_furnace_slag,
            self.fly_ash,
            self.water,
            self.superplasticizer,
            self.coarse_aggregate,
            self.fine_aggregate,
            self.age,
        ]
    }

    /// Request payload using the canonical keys.
    pub fn to_raw(self) -> RawMix {
        Feature::ALL
            .into_iter()
            .zip(self.to_array())
            .map(|(f, v)| (f.key().to_string(), Value::from(v)))
            .collect()
    }
}

impl From<[f64; FEATURE_COUNT]> for MixValues {
    fn from(v: [f64; FEATURE_COUNT]) -> Self {
        MixValues {
            cement: v[0],
            blast_furnace_slag: v[1],
            fly_ash: v[2],
            water: v[3],
            superplasticizer: v[4],
            coarse_aggregate: v[5],
            fine_aggregate: v[6],
            age: v[7],
        }
    }
}

/// Features laid out in the fixed model order.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Validated mix. Every field is finite and inside its documented range;
/// age is a whole number of days.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(into = "MixValues")]
pub struct MixInput {
    values: [f64; FEATURE_COUNT],
}

impl MixInput {
    /// Validate typed values.
    pub fn new(values: MixValues) -> Result<Self, ValidationError> {
        let values = values.to_array();
        for feature in Feature::ALL {
            check_value(feature, values[feature.index()])?;
        }
        Ok(Self { values })
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    pub fn age_days(&self) -> u32 {
        self.get(Feature::Age) as u32
    }

    pub fn to_features(&self) -> FeatureVector {
        FeatureVector(self.values)
    }
}

impl From<MixInput> for MixValues {
    fn from(mix: MixInput) -> Self {
        mix.values.into()
    }
}

/// Finite, in range, and integral for age.
pub(crate) fn check_value(feature: Feature, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotNumeric { field: feature });
    }
    if let Some(bound) = feature.range().check(value) {
        return Err(ValidationError::OutOfRange {
            field: feature,
            value,
            bound,
        });
    }
    if feature == Feature::Age && value.fract() != 0.0 {
        return Err(ValidationError::NotInteger {
            field: feature,
            value,
        });
    }
    Ok(())
}
