// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Deskew: estimate, then rotate by the negated skew when the estimate is
// worth acting on.

use image::DynamicImage;
use pagewerk_core::error::Result;
use pagewerk_core::{DeskewConfig, SkewEstimate, SweepParams};
use tracing::{debug, info};

use crate::backend::RasterBackend;

/// Result of a deskew attempt on one raster.
pub(crate) struct DeskewOutcome {
    /// The straightened raster, or `None` when the page was left as is.
    pub raster: Option<DynamicImage>,
    pub estimate: SkewEstimate,
    /// Whether a rotation was applied.
    pub applied: bool,
}

/// Whether an estimate is confident and large enough to rotate for.
pub fn should_deskew(estimate: &SkewEstimate, config: &DeskewConfig) -> bool {
    estimate.confidence >= config.min_confidence
        && estimate.degrees().abs() >= config.min_angle_degrees
}

pub(crate) fn deskew_raster<B: RasterBackend + ?Sized>(
    backend: &B,
    raster: &DynamicImage,
    sweep: &SweepParams,
    config: &DeskewConfig,
) -> Result<DeskewOutcome> {
    let estimate = backend.find_skew(raster, sweep)?;
    if !should_deskew(&estimate, config) {
        debug!(
            degrees = estimate.degrees(),
            confidence = estimate.confidence,
            "Skew below threshold; page left unrotated"
        );
        return Ok(DeskewOutcome {
            raster: None,
            estimate,
            applied: false,
        });
    }

    let straightened = backend.rotate(raster, -estimate.angle)?;
    info!(
        degrees = estimate.degrees(),
        confidence = estimate.confidence,
        "Page deskewed"
    );
    Ok(DeskewOutcome {
        raster: Some(straightened),
        estimate,
        applied: true,
    })
}
