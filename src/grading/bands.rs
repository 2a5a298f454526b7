//! The three strength bands. Both the classifier and the gauge read them from
//! here, so a threshold change moves category and colour together.

use serde::Serialize;

use crate::common::error::{Error, Result};

/// Usage tier of a concrete mix.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Low,
    Moderate,
    High,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Low => "LOW",
            Category::Moderate => "MODERATE",
            Category::High => "HIGH",
        }
    }
}

/// Gauge colour of a band.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BandColor {
    Red,
    Yellow,
    Green,
}

impl BandColor {
    pub fn hex(&self) -> &'static str {
        match self {
            BandColor::Red => "#ff0000",
            BandColor::Yellow => "#ffff00",
            BandColor::Green => "#008000",
        }
    }
}

/// One half-open interval `[lower, upper)` in MPa.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Band {
    pub category: Category,
    pub lower: f64,
    pub upper: f64,
    pub color: BandColor,
}

/// Thresholds and the displayable scale.
///
/// Always ordered `scale_min < moderate_from < high_from < scale_max`, so the
/// three bands are non-empty, contiguous and cover the scale.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StrengthBands {
    moderate_from: f64,
    high_from: f64,
    scale_min: f64,
    scale_max: f64,
}

impl StrengthBands {
    pub const STANDARD: StrengthBands = StrengthBands {
        moderate_from: 20.0,
        high_from: 40.0,
        scale_min: 0.0,
        scale_max: 100.0,
    };

    /// `moderate_from` and `high_from` are the lowest MPa values counted as
    /// MODERATE and HIGH.
    pub fn new(moderate_from: f64, high_from: f64, scale_min: f64, scale_max: f64) -> Result<Self> {
        let edges = [scale_min, moderate_from, high_from, scale_max];
        if edges.iter().any(|v| !v.is_finite()) {
            return Err(Error::Config("strength bands must be finite".to_string()));
        }
        if !edges.windows(2).all(|w| w[0] < w[1]) {
            return Err(Error::Config(format!(
                "strength bands must satisfy {scale_min} < {moderate_from} < {high_from} < {scale_max}"
            )));
        }
        Ok(Self {
            moderate_from,
            high_from,
            scale_min,
            scale_max,
        })
    }

    pub fn moderate_from(&self) -> f64 {
        self.moderate_from
    }

    pub fn high_from(&self) -> f64 {
        self.high_from
    }

    pub fn scale_min(&self) -> f64 {
        self.scale_min
    }

    pub fn scale_max(&self) -> f64 {
        self.scale_max
    }

    /// Lower bounds are inclusive. NaN falls into LOW.
    pub fn category_for(&self, strength_mpa: f64) -> Category {
        if strength_mpa >= self.high_from {
            Category::High
        } else if strength_mpa >= self.moderate_from {
            Category::Moderate
        } else {
            Category::Low
        }
    }

    /// Bands clipped to the displayable scale, low to high.
    pub fn bands(&self) -> [Band; 3] {
        [
            Band {
                category: Category::Low,
                lower: self.scale_min,
                upper: self.moderate_from,
                color: BandColor::Red,
            },
            Band {
                category: Category::Moderate,
                lower: self.moderate_from,
                upper: self.high_from,
                color: BandColor::Yellow,
            },
            Band {
                category: Category::High,
                lower: self.high_from,
                upper: self.scale_max,
                color: BandColor::Green,
            },
        ]
    }

    pub fn band(&self, category: Category) -> Band {
        self.bands()[category as usize]
    }
}

impl Default for StrengthBands {
    fn default() -> Self {
        Self::STANDARD
    }
}
