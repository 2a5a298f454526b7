//! Validation of raw request payloads into [`MixInput`] snapshots.

use crate::common::error::ValidationError;

use super::domain::{check_value, Feature, MixInput, RawMix, FEATURE_COUNT};

/// What the payload supplied for one feature.
#[derive(Copy, Clone)]
enum Slot<'a> {
    Empty,
    Once(&'a serde_json::Value),
    Repeated,
}

/// Validate a raw payload.
///
/// Keys are matched with [`Feature::from_name`]; unknown keys are ignored.
/// Features are checked in model order and the first failure is returned,
/// so a repeated field is only reported once every earlier feature passed.
pub fn validate(raw: &RawMix) -> Result<MixInput, ValidationError> {
    let mut slots = [Slot::Empty; FEATURE_COUNT];

    for (name, value) in raw.iter() {
        let Some(feature) = Feature::from_name(name) else {
            tracing::debug!(field = %name, "ignoring unknown mix field");
            continue;
        };
        let slot = &mut slots[feature.index()];
        *slot = match *slot {
            Slot::Empty => Slot::Once(value),
            Slot::Once(_) | Slot::Repeated => Slot::Repeated,
        };
    }

    let mut values = [0.0; FEATURE_COUNT];
    for feature in Feature::ALL {
        let value = match slots[feature.index()] {
            Slot::Empty => return Err(ValidationError::MissingField { field: feature }),
            Slot::Repeated => return Err(ValidationError::DuplicateField { field: feature }),
            Slot::Once(value) => value
                .as_f64()
                .ok_or(ValidationError::NotNumeric { field: feature })?,
        };
        check_value(feature, value)?;
        values[feature.index()] = value;
    }

    MixInput::new(values.into())
}
