// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Pagewerk deskew and orientation pipeline.

use std::f32::consts::{FRAC_PI_2, PI};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PagewerkError;

/// Result of a skew detection pass.
///
/// `angle` is in radians. A positive angle means the text lines descend to
/// the right in image coordinates, i.e. the page was turned clockwise.
/// `confidence` is unitless; higher is more reliable and 0.0 means the
/// estimate carries no information.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SkewEstimate {
    pub angle: f32,
    pub confidence: f32,
}

impl SkewEstimate {
    /// An estimate with no information (angle 0, confidence 0).
    pub const NONE: Self = Self {
        angle: 0.0,
        confidence: 0.0,
    };

    /// Build an estimate from an angle in degrees.
    pub fn from_degrees(degrees: f32, confidence: f32) -> Self {
        Self {
            angle: degrees.to_radians(),
            confidence,
        }
    }

    /// The skew angle in degrees.
    pub fn degrees(&self) -> f32 {
        self.angle.to_degrees()
    }
}

/// The two scores produced by orientation detection.
///
/// `up_confidence` > 0 means the text reads upright, < 0 means upside-down.
/// `left_confidence` > 0 means the text is left-facing (turned 90 degrees
/// counter-clockwise), < 0 means right-facing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OrientationScores {
    pub up_confidence: f32,
    pub left_confidence: f32,
}

/// Page orientation relative to upright reading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrientationDecision {
    /// Scores were too weak or too close to call.
    Unknown,
    /// Already upright.
    Normal,
    /// Text turned 90 degrees counter-clockwise; needs a clockwise turn.
    LeftFacing,
    /// Text turned 180 degrees.
    UpsideDown,
    /// Text turned 90 degrees clockwise; needs a counter-clockwise turn.
    RightFacing,
}

impl OrientationDecision {
    /// Angle in radians added to the reported page angle once corrected.
    pub fn angle_offset(&self) -> f32 {
        match self {
            Self::Unknown | Self::Normal => 0.0,
            Self::LeftFacing => FRAC_PI_2,
            Self::UpsideDown => PI,
            Self::RightFacing => 3.0 * FRAC_PI_2,
        }
    }

    /// The lossless rotation that brings a page with this orientation upright.
    pub fn correction(&self) -> Option<QuarterTurn> {
        match self {
            Self::Unknown | Self::Normal => None,
            Self::LeftFacing => Some(QuarterTurn::Clockwise),
            Self::UpsideDown => Some(QuarterTurn::HalfTurn),
            Self::RightFacing => Some(QuarterTurn::CounterClockwise),
        }
    }

    /// Short label used in logs and CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Normal => "normal",
            Self::LeftFacing => "left-facing",
            Self::UpsideDown => "upside-down",
            Self::RightFacing => "right-facing",
        }
    }
}

impl std::fmt::Display for OrientationDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Lossless orthogonal rotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuarterTurn {
    /// +90 degrees.
    Clockwise,
    /// 180 degrees.
    HalfTurn,
    /// -90 degrees.
    CounterClockwise,
}

/// Encodings supported when writing a page back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Portable anymap (PBM/PGM/PPM/PAM picked from the pixel layout).
    #[default]
    Pnm,
    Png,
    Bmp,
    Tiff,
    Jpeg,
}

impl OutputFormat {
    /// Canonical file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pnm => "pnm",
            Self::Png => "png",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
            Self::Jpeg => "jpg",
        }
    }

    /// Infer the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pnm" | "pbm" | "pgm" | "ppm" | "pam" => Some(Self::Pnm),
            "png" => Some(Self::Png),
            "bmp" => Some(Self::Bmp),
            "tif" | "tiff" => Some(Self::Tiff),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = PagewerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s)
            .ok_or_else(|| PagewerkError::Config(format!("unknown output format: {s}")))
    }
}
