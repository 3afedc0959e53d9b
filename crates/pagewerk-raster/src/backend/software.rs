// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pure-Rust raster backend built on the `image` and `imageproc` crates.

use image::{DynamicImage, Luma, LumaA, Pixel, Rgb, Rgba};
use imageproc::definitions::{Clamp, Image};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use pagewerk_core::error::{PagewerkError, Result};
use pagewerk_core::{OrientationScores, QuarterTurn, SkewEstimate, SweepParams};
use tracing::{debug, instrument};

use super::RasterBackend;
use crate::scan;

/// Rotations smaller than this (radians) are skipped as a no-op.
const MIN_ROTATION: f32 = 1e-5;

/// Default backend: Otsu binarization, sweep-and-search skew, stroke-count
/// orientation, bilinear rotation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareBackend;

impl SoftwareBackend {
    pub fn new() -> Self {
        Self
    }
}

fn ensure_area(image: &DynamicImage, what: &str) -> std::result::Result<(), String> {
    if image.width() == 0 || image.height() == 0 {
        return Err(format!(
            "cannot {what} an empty {}x{} raster",
            image.width(),
            image.height()
        ));
    }
    Ok(())
}

impl RasterBackend for SoftwareBackend {
    fn name(&self) -> &str {
        "software"
    }

    fn find_skew(&self, image: &DynamicImage, params: &SweepParams) -> Result<SkewEstimate> {
        ensure_area(image, "deskew").map_err(PagewerkError::Detection)?;
        Ok(scan::find_skew(image, params))
    }

    fn detect_orientation(
        &self,
        image: &DynamicImage,
        min_strokes: u32,
    ) -> Result<OrientationScores> {
        ensure_area(image, "analyse").map_err(PagewerkError::Detection)?;
        Ok(scan::orientation_scores(image, min_strokes))
    }

    fn rotate_quarter(&self, image: &DynamicImage, turn: QuarterTurn) -> Result<DynamicImage> {
        ensure_area(image, "rotate").map_err(PagewerkError::Rotation)?;
        Ok(match turn {
            QuarterTurn::Clockwise => image.rotate90(),
            QuarterTurn::HalfTurn => image.rotate180(),
            QuarterTurn::CounterClockwise => image.rotate270(),
        })
    }

    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    fn rotate(&self, image: &DynamicImage, radians: f32) -> Result<DynamicImage> {
        ensure_area(image, "rotate").map_err(PagewerkError::Rotation)?;
        if !radians.is_finite() {
            return Err(PagewerkError::Rotation(format!(
                "rotation angle is not finite: {radians}"
            )));
        }
        if radians.abs() < MIN_ROTATION {
            return Ok(image.clone());
        }

        // Keep the pixel layout; uncovered corners become white paper.
        let rotated = match image {
            DynamicImage::ImageLuma8(buf) => turn(buf, radians, Luma([u8::MAX])).into(),
            DynamicImage::ImageLumaA8(buf) => turn(buf, radians, LumaA([u8::MAX; 2])).into(),
            DynamicImage::ImageRgb8(buf) => turn(buf, radians, Rgb([u8::MAX; 3])).into(),
            DynamicImage::ImageRgba8(buf) => turn(buf, radians, Rgba([u8::MAX; 4])).into(),
            DynamicImage::ImageLuma16(buf) => turn(buf, radians, Luma([u16::MAX])).into(),
            DynamicImage::ImageLumaA16(buf) => turn(buf, radians, LumaA([u16::MAX; 2])).into(),
            DynamicImage::ImageRgb16(buf) => turn(buf, radians, Rgb([u16::MAX; 3])).into(),
            DynamicImage::ImageRgba16(buf) => turn(buf, radians, Rgba([u16::MAX; 4])).into(),
            DynamicImage::ImageRgb32F(buf) => turn(buf, radians, Rgb([1.0f32; 3])).into(),
            DynamicImage::ImageRgba32F(buf) => turn(buf, radians, Rgba([1.0f32; 4])).into(),
            other => turn(&other.to_rgba16(), radians, Rgba([u16::MAX; 4])).into(),
        };
        debug!(radians, "General rotation applied");
        Ok(rotated)
    }
}

fn turn<P>(buffer: &Image<P>, radians: f32, paper: P) -> Image<P>
where
    P: Pixel + Send + Sync,
    P::Subpixel: Send + Sync + Into<f32> + Clamp<f32>,
{
    rotate_about_center(buffer, radians, Interpolation::Bilinear, paper)
}
