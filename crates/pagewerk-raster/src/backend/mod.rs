// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster backend abstraction.
//
// The deskew and orientation pipeline never touches pixels itself; every
// analysis and transform goes through a `RasterBackend`, so any compliant
// image-processing implementation can be swapped in.

pub mod software;

use image::DynamicImage;
use pagewerk_core::error::Result;
use pagewerk_core::{OrientationScores, QuarterTurn, SkewEstimate, SweepParams};

pub use software::SoftwareBackend;

/// The raster operations the page pipeline depends on.
///
/// Implementations must not mutate their inputs: every transform returns a
/// new raster, leaving ownership of the input with the caller. Errors must be
/// reported with the pipeline's error kinds (`Detection` for analysis,
/// `Rotation` for transforms).
pub trait RasterBackend: Send + Sync {
    /// Human-readable backend name for logs.
    fn name(&self) -> &str;

    /// Estimate the skew of a page.
    fn find_skew(&self, image: &DynamicImage, params: &SweepParams) -> Result<SkewEstimate>;

    /// Score the upright and left-facing hypotheses of a page.
    fn detect_orientation(
        &self,
        image: &DynamicImage,
        min_strokes: u32,
    ) -> Result<OrientationScores>;

    /// Lossless orthogonal rotation.
    fn rotate_quarter(&self, image: &DynamicImage, turn: QuarterTurn) -> Result<DynamicImage>;

    /// Rotate clockwise by an arbitrary angle in radians, keeping the canvas
    /// size and filling uncovered pixels with white.
    fn rotate(&self, image: &DynamicImage, radians: f32) -> Result<DynamicImage>;
}

impl<T: RasterBackend + ?Sized> RasterBackend for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn find_skew(&self, image: &DynamicImage, params: &SweepParams) -> Result<SkewEstimate> {
        (**self).find_skew(image, params)
    }

    fn detect_orientation(
        &self,
        image: &DynamicImage,
        min_strokes: u32,
    ) -> Result<OrientationScores> {
        (**self).detect_orientation(image, min_strokes)
    }

    fn rotate_quarter(&self, image: &DynamicImage, turn: QuarterTurn) -> Result<DynamicImage> {
        (**self).rotate_quarter(image, turn)
    }

    fn rotate(&self, image: &DynamicImage, radians: f32) -> Result<DynamicImage> {
        (**self).rotate(image, radians)
    }
}
