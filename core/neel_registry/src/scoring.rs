//! # XAI confidence scorer
//!
//! A deterministic stand-in for the monitoring-report model. Given the
//! carbon removal a project claims and the removal the model predicts:
//!
//! ```text
//! confidence = clamp(100 * (1 - |claimed - predicted| / claimed), 0, 100)
//! ```
//!
//! rounded to two decimals. A report is recommended for ACVA review when
//! `confidence >= threshold`; otherwise resubmission is requested.
//!
//! The feature-importance breakdown is a fixed policy input, not learned.
//! Its weights must sum to exactly 100, which [`FeatureImportance::new`]
//! enforces (also on deserialization).

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default acceptance threshold, in percent.
pub const DEFAULT_THRESHOLD: f64 = 85.0;

/// Named feature weights, in percent. Always sums to 100.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWeights")]
pub struct FeatureImportance {
    canopy_density: u8,
    tree_heights: u8,
    satellite_imagery: u8,
    other: u8,
}

#[derive(Deserialize)]
struct RawWeights {
    canopy_density: u8,
    tree_heights: u8,
    satellite_imagery: u8,
    other: u8,
}

impl TryFrom<RawWeights> for FeatureImportance {
    type Error = Error;

    fn try_from(raw: RawWeights) -> Result<Self> {
        Self::new(
            raw.canopy_density,
            raw.tree_heights,
            raw.satellite_imagery,
            raw.other,
        )
    }
}

impl FeatureImportance {
    pub fn new(
        canopy_density: u8,
        tree_heights: u8,
        satellite_imagery: u8,
        other: u8,
    ) -> Result<Self> {
        let total = u16::from(canopy_density)
            + u16::from(tree_heights)
            + u16::from(satellite_imagery)
            + u16::from(other);
        if total != 100 {
            return Err(Error::InvalidInput("feature weights must sum to 100"));
        }
        Ok(Self {
            canopy_density,
            tree_heights,
            satellite_imagery,
            other,
        })
    }

    pub fn canopy_density(&self) -> u8 {
        self.canopy_density
    }

    pub fn tree_heights(&self) -> u8 {
        self.tree_heights
    }

    pub fn satellite_imagery(&self) -> u8 {
        self.satellite_imagery
    }

    pub fn other(&self) -> u8 {
        self.other
    }

    /// `(name, weight)` pairs in display order.
    pub fn entries(&self) -> [(&'static str, u8); 4] {
        [
            ("canopy_density", self.canopy_density),
            ("tree_heights", self.tree_heights),
            ("satellite_imagery", self.satellite_imagery),
            ("other", self.other),
        ]
    }
}

impl Default for FeatureImportance {
    fn default() -> Self {
        Self {
            canopy_density: 35,
            tree_heights: 28,
            satellite_imagery: 22,
            other: 15,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// Forward to ACVA verification.
    Accept,
    /// Request resubmission.
    Reject,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Score {
    pub claimed: f64,
    pub predicted: f64,
    /// Percentage in `[0, 100]`.
    pub confidence: f64,
    pub recommendation: Recommendation,
    pub feature_importance: FeatureImportance,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfidenceScorer {
    weights: FeatureImportance,
}

impl ConfidenceScorer {
    pub fn new(weights: FeatureImportance) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> FeatureImportance {
        self.weights
    }

    pub fn score(&self, claimed: f64, predicted: f64, threshold: f64) -> Result<Score> {
        if !claimed.is_finite() || claimed <= 0.0 {
            return Err(Error::InvalidInput("claimed removal must be positive"));
        }
        if !predicted.is_finite() || predicted < 0.0 {
            return Err(Error::InvalidInput("predicted removal must be non-negative"));
        }
        if !(0.0..=100.0).contains(&threshold) {
            return Err(Error::InvalidInput("threshold must be within [0, 100]"));
        }

        let raw = 100.0 * (1.0 - (claimed - predicted).abs() / claimed);
        let confidence = (raw.clamp(0.0, 100.0) * 100.0).round() / 100.0;
        let recommendation = if confidence >= threshold {
            Recommendation::Accept
        } else {
            Recommendation::Reject
        };

        Ok(Score {
            claimed,
            predicted,
            confidence,
            recommendation,
            feature_importance: self.weights,
        })
    }
}

/// Score with the default feature weights.
pub fn score(claimed: f64, predicted: f64, threshold: f64) -> Result<Score> {
    ConfidenceScorer::default().score(claimed, predicted, threshold)
}
