// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PagewerkError, Result};

/// Parameters of a sweep-and-search skew estimate.
///
/// The sweep scores every angle in `[-sweep_range, +sweep_range]` at
/// `sweep_delta` spacing on an image OR-reduced by `sweep_reduction`; the best
/// angle is then refined by interval halving on an image reduced by
/// `search_reduction` until the step drops below `min_search_delta`.
/// All angles are in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepParams {
    pub sweep_reduction: u32,
    pub search_reduction: u32,
    pub sweep_range: f32,
    pub sweep_delta: f32,
    pub min_search_delta: f32,
    /// Best scores below this are treated as noise (confidence 0).
    pub min_valid_score: f64,
}

impl SweepParams {
    /// Reduced-resolution, narrower sweep: fast, lower precision.
    pub fn fast() -> Self {
        Self {
            sweep_reduction: 4,
            search_reduction: 2,
            sweep_range: 7.0,
            sweep_delta: 1.0,
            min_search_delta: 0.01,
            min_valid_score: 10_000.0,
        }
    }

    /// Full-resolution sweep over +/-10 degrees, 1 degree steps, refined to
    /// 0.01 degrees.
    pub fn thorough() -> Self {
        Self {
            sweep_reduction: 1,
            search_reduction: 1,
            sweep_range: 10.0,
            sweep_delta: 1.0,
            min_search_delta: 0.01,
            min_valid_score: 10_000.0,
        }
    }

    /// Reject parameters that would make the sweep loop degenerate.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.sweep_reduction, 1 | 2 | 4 | 8) {
            return Err(PagewerkError::Config(format!(
                "sweep_reduction must be 1, 2, 4 or 8, got {}",
                self.sweep_reduction
            )));
        }
        if !matches!(self.search_reduction, 1 | 2 | 4 | 8) {
            return Err(PagewerkError::Config(format!(
                "search_reduction must be 1, 2, 4 or 8, got {}",
                self.search_reduction
            )));
        }
        if !(self.sweep_range > 0.0 && self.sweep_range < 45.0) {
            return Err(PagewerkError::Config(format!(
                "sweep_range must be in (0, 45) degrees, got {}",
                self.sweep_range
            )));
        }
        if !(self.sweep_delta > 0.0 && self.sweep_delta <= self.sweep_range) {
            return Err(PagewerkError::Config(format!(
                "sweep_delta must be in (0, sweep_range], got {}",
                self.sweep_delta
            )));
        }
        if !(self.min_search_delta > 0.0) {
            return Err(PagewerkError::Config(format!(
                "min_search_delta must be positive, got {}",
                self.min_search_delta
            )));
        }
        Ok(())
    }
}

impl Default for SweepParams {
    fn default() -> Self {
        Self::fast()
    }
}

/// When a skew estimate is acted on by `deskew`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskewConfig {
    /// Estimates below this confidence leave the page untouched.
    pub min_confidence: f32,
    /// Angles smaller than this (degrees) are not worth a resampling pass.
    pub min_angle_degrees: f32,
}

impl Default for DeskewConfig {
    fn default() -> Self {
        Self {
            min_confidence: 3.0,
            min_angle_degrees: 0.1,
        }
    }
}

/// Orientation decision thresholds and pipeline switches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientationConfig {
    /// The winning score must exceed this in absolute value.
    pub min_confidence: f32,
    /// The winning score must exceed the other one by this factor.
    pub min_ratio: f32,
    /// Run a deskew pass before detection and fold its angle into the result.
    pub deskew_first: bool,
    /// Treat an `Unknown` decision as a failure rather than passing the page
    /// through unrotated.
    pub reject_ambiguous: bool,
    /// Pages with fewer ascender plus descender strokes score 0.
    pub min_strokes: u32,
}

impl OrientationConfig {
    /// Near-zero thresholds: any non-zero score decides.
    pub fn permissive() -> Self {
        Self {
            min_confidence: 0.01,
            min_ratio: 0.01,
            reject_ambiguous: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.min_confidence >= 0.0) || !(self.min_ratio >= 0.0) {
            return Err(PagewerkError::Config(format!(
                "orientation thresholds must be non-negative, got confidence {} ratio {}",
                self.min_confidence, self.min_ratio
            )));
        }
        Ok(())
    }
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            min_confidence: 8.0,
            min_ratio: 2.5,
            deskew_first: false,
            reject_ambiguous: true,
            min_strokes: 10,
        }
    }
}

/// Complete pipeline settings, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagewerkConfig {
    pub fast_skew: SweepParams,
    pub thorough_skew: SweepParams,
    pub deskew: DeskewConfig,
    pub orientation: OrientationConfig,
}

impl Default for PagewerkConfig {
    fn default() -> Self {
        Self {
            fast_skew: SweepParams::fast(),
            thorough_skew: SweepParams::thorough(),
            deskew: DeskewConfig::default(),
            orientation: OrientationConfig::default(),
        }
    }
}

impl PagewerkConfig {
    /// Parse and validate a JSON config file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.fast_skew.validate()?;
        self.thorough_skew.validate()?;
        self.orientation.validate()
    }
}
