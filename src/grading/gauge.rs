//! Renderer-agnostic description of the strength gauge.
//!
//! A display collaborator draws the scale, the coloured bands and a marker
//! line with a label. Band boundaries come from [`StrengthBands`] so the
//! gauge never disagrees with the classifier.

use serde::Serialize;

use super::bands::{Band, BandColor, Category, StrengthBands};

const TITLE: &str = "Compressive strength scale (MPa)";
const BAND_OPACITY: f64 = 0.3;
const TICK_INTERVALS: usize = 5;

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct GaugeScale {
    pub min: f64,
    pub max: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct GaugeBand {
    pub category: Category,
    pub lower: f64,
    pub upper: f64,
    pub color: BandColor,
    pub hex: &'static str,
    pub opacity: f64,
}

impl From<Band> for GaugeBand {
    fn from(band: Band) -> Self {
        Self {
            category: band.category,
            lower: band.lower,
            upper: band.upper,
            color: band.color,
            hex: band.color.hex(),
            opacity: BAND_OPACITY,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GaugeMarker {
    /// Where to draw the line; always inside the scale.
    pub position: f64,
    /// The unclamped strength.
    pub value: f64,
    pub label: String,
    /// `true` when `position != value`.
    pub clamped: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GaugeSpec {
    pub title: &'static str,
    pub unit: &'static str,
    pub scale: GaugeScale,
    pub ticks: Vec<f64>,
    pub bands: Vec<GaugeBand>,
    pub marker: GaugeMarker,
}

impl GaugeSpec {
    /// Band the marker sits in. The top edge of the scale belongs to the last band.
    pub fn band_at_marker(&self) -> Option<&GaugeBand> {
        let pos = self.marker.position;
        self.bands
            .iter()
            .find(|b| b.lower <= pos && pos < b.upper)
            .or_else(|| self.bands.last().filter(|b| pos == b.upper))
    }
}

/// Builds [`GaugeSpec`]s over a fixed set of bands.
#[derive(Copy, Clone, Debug, Default)]
pub struct GaugeRenderer {
    bands: StrengthBands,
}

impl GaugeRenderer {
    pub fn new(bands: StrengthBands) -> Self {
        Self { bands }
    }

    /// Never fails: out-of-scale values pin the marker to the nearest edge
    /// and NaN pins it to the bottom.
    pub fn render(&self, strength_mpa: f64) -> GaugeSpec {
        let (scale_min, scale_max) = (self.bands.scale_min(), self.bands.scale_max());

        let position = if strength_mpa.is_nan() {
            scale_min
        } else {
            strength_mpa.clamp(scale_min, scale_max)
        };
        let step = (scale_max - scale_min) / TICK_INTERVALS as f64;

        GaugeSpec {
            title: TITLE,
            unit: "MPa",
            scale: GaugeScale {
                min: scale_min,
                max: scale_max,
            },
            ticks: (0..=TICK_INTERVALS)
                .map(|i| scale_min + step * i as f64)
                .collect(),
            bands: self.bands.bands().into_iter().map(GaugeBand::from).collect(),
            marker: GaugeMarker {
                position,
                value: strength_mpa,
                label: format!("{strength_mpa:.1}"),
                clamped: position != strength_mpa,
            },
        }
    }
}

/// Render with the standard bands.
pub fn render(strength_mpa: f64) -> GaugeSpec {
    GaugeRenderer::default().render(strength_mpa)
}
