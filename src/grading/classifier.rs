//! Strength category and usage recommendation for a predicted value.

use serde::Serialize;

use super::bands::{Category, StrengthBands};

/// Usage advice attached to a category.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Recommendation {
    pub advice: &'static str,
    pub typical_uses: &'static str,
    pub caution: &'static str,
}

impl Recommendation {
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::Low => Recommendation {
                advice: "Consider increasing the cement content or lowering the water/cement ratio.",
                typical_uses: "Fills, temporary bases and non-structural elements.",
                caution: "Not recommended for elements carrying significant loads.",
            },
            Category::Moderate => Recommendation {
                advice: "Suitable for conventional structures such as housing, sidewalks and pavements.",
                typical_uses: "Columns, beams and slabs under moderate loads.",
                caution: "Always check the project specifications for compliance.",
            },
            Category::High => Recommendation {
                advice: "Well suited to structures that need high durability and strength, such as bridges, tall buildings and industrial structures.",
                typical_uses: "Aggressive environments or high loads.",
                caution: "Keep strict quality control over mixing and curing.",
            },
        }
    }

    /// One line per part, in display order.
    pub fn text(&self) -> String {
        format!("{}\n{}\n{}", self.advice, self.typical_uses, self.caution)
    }
}

/// Maps strength values to categories using a fixed set of bands.
#[derive(Copy, Clone, Debug, Default)]
pub struct StrengthClassifier {
    bands: StrengthBands,
}

impl StrengthClassifier {
    pub fn new(bands: StrengthBands) -> Self {
        Self { bands }
    }

    pub fn classify(&self, strength_mpa: f64) -> (Category, Recommendation) {
        let category = self.bands.category_for(strength_mpa);
        (category, Recommendation::for_category(category))
    }
}

/// Classify with the standard bands.
pub fn classify(strength_mpa: f64) -> (Category, Recommendation) {
    StrengthClassifier::default().classify(strength_mpa)
}
