//! Match-ratio grading

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeBand {
    pub min_ratio: f64,
    pub grade: String,
}

impl GradeBand {
    pub fn new(min_ratio: f64, grade: impl Into<String>) -> Self {
        Self {
            min_ratio,
            grade: grade.into(),
        }
    }
}

/// Maps a match ratio (0-100) to a letter grade.
///
/// Bands are checked from the highest `min_ratio` down; a ratio below every
/// band gets `floor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeScale {
    bands: Vec<GradeBand>,
    floor: String,
}

impl GradeScale {
    pub fn new(bands: Vec<GradeBand>, floor: impl Into<String>) -> Result<Self, ConfigError> {
        Self {
            bands,
            floor: floor.into(),
        }
        .validated()
    }

    /// Check band values and sort them highest first.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if self.floor.trim().is_empty() {
            return Err(ConfigError::InvalidGradeScale("floor grade is empty".to_string()));
        }
        for band in &self.bands {
            if !band.min_ratio.is_finite() || band.min_ratio < 0.0 || band.min_ratio > 100.0 {
                return Err(ConfigError::InvalidGradeScale(format!(
                    "band '{}' has min ratio {} outside [0, 100]",
                    band.grade, band.min_ratio
                )));
            }
            if band.grade.trim().is_empty() {
                return Err(ConfigError::InvalidGradeScale("band grade is empty".to_string()));
            }
        }
        self.bands
            .sort_by(|a, b| b.min_ratio.total_cmp(&a.min_ratio));
        Ok(self)
    }

    pub fn grade(&self, ratio: f64) -> &str {
        self.bands
            .iter()
            .find(|band| ratio >= band.min_ratio)
            .map(|band| band.grade.as_str())
            .unwrap_or(&self.floor)
    }

    pub fn bands(&self) -> &[GradeBand] {
        &self.bands
    }
}

impl Default for GradeScale {
    fn default() -> Self {
        Self {
            bands: vec![
                GradeBand::new(100.0, "A++"),
                GradeBand::new(85.0, "A+"),
                GradeBand::new(70.0, "A"),
                GradeBand::new(55.0, "B+"),
                GradeBand::new(40.0, "B"),
            ],
            floor: "C".to_string(),
        }
    }
}
