// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Orientation decision and angle normalization.

use std::f32::consts::TAU;

use pagewerk_core::error::{PagewerkError, Result};
use pagewerk_core::{OrientationDecision, OrientationScores};

/// Decide a page's orientation from its two detection scores.
///
/// The up/down hypothesis wins when `|up| > min_confidence` and
/// `|up| > min_ratio * |left|`; otherwise the left/right hypothesis is tried
/// the same way. Neither winning, or both scores being zero, is `Unknown`.
/// Non-finite scores are a `Decision` error.
pub fn decide(
    scores: OrientationScores,
    min_confidence: f32,
    min_ratio: f32,
) -> Result<OrientationDecision> {
    let OrientationScores {
        up_confidence: up,
        left_confidence: left,
    } = scores;
    if !up.is_finite() || !left.is_finite() {
        return Err(PagewerkError::Decision(format!(
            "orientation scores are not finite: up {up}, left {left}"
        )));
    }
    if up == 0.0 && left == 0.0 {
        return Ok(OrientationDecision::Unknown);
    }

    let (abs_up, abs_left) = (up.abs(), left.abs());
    let decision = if abs_up > min_confidence && abs_up > min_ratio * abs_left {
        if up > 0.0 {
            OrientationDecision::Normal
        } else {
            OrientationDecision::UpsideDown
        }
    } else if abs_left > min_confidence && abs_left > min_ratio * abs_up {
        if left > 0.0 {
            OrientationDecision::LeftFacing
        } else {
            OrientationDecision::RightFacing
        }
    } else {
        OrientationDecision::Unknown
    };
    Ok(decision)
}

/// Bring an angle in radians into `[0, 2π)`.
///
/// Angles already in range are returned unchanged; larger angles lose whole
/// turns, and negative angles gain them.
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if wrapped >= TAU { 0.0 } else { wrapped }
}
