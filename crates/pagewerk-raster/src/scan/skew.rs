// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sweep-and-search skew estimation.
//
// A page whose text lines are sheared back to horizontal has a row profile
// with sharp peaks (lines) and valleys (gaps). The score of a candidate angle
// is the sum of squared differences between adjacent rows of the sheared
// profile, which is largest when the lines are aligned. A coarse sweep finds
// the best whole step; interval halving refines it.

use image::{DynamicImage, GrayImage};
use pagewerk_core::{SkewEstimate, SweepParams};
use tracing::{debug, instrument};

use super::binarize::{binarize, ink_points, reduce_or};

/// Ink points of a binary page at one reduction level.
struct ShearTarget {
    points: Vec<(u32, u32)>,
    width: u32,
    height: u32,
}

impl ShearTarget {
    fn new(binary: &GrayImage, reduction: u32) -> Self {
        let reduced = reduce_or(binary, reduction);
        let (width, height) = reduced.dimensions();
        Self {
            points: ink_points(&reduced),
            width,
            height,
        }
    }

    /// Differential square sum of the row profile after a vertical shear of
    /// `angle_deg` about the horizontal centre.
    fn score(&self, angle_deg: f32) -> f64 {
        let tan = (angle_deg as f64).to_radians().tan();
        let cx = self.width as f64 / 2.0;
        let margin = (tan.abs() * cx).ceil() as i64 + 1;
        let rows = self.height as i64 + 2 * margin;
        let mut profile = vec![0u32; rows as usize];

        for &(x, y) in &self.points {
            let sheared = y as f64 - tan * (x as f64 - cx);
            let row = (sheared.round() as i64 + margin).clamp(0, rows - 1);
            profile[row as usize] += 1;
        }

        profile
            .windows(2)
            .map(|pair| {
                let diff = pair[1] as f64 - pair[0] as f64;
                diff * diff
            })
            .sum()
    }
}

/// Estimate the skew angle of a page.
///
/// Returns [`SkewEstimate::NONE`] for a page without ink. Confidence is the
/// ratio of the best to the worst sweep score, and is forced to 0 when the
/// best score is below `min_valid_score` or the best sweep angle sits on the
/// edge of the sweep range (the true maximum may lie outside it).
#[instrument(skip_all, fields(
    width = image.width(),
    height = image.height(),
    sweep_reduction = params.sweep_reduction,
    sweep_range = params.sweep_range,
))]
pub fn find_skew(image: &DynamicImage, params: &SweepParams) -> SkewEstimate {
    let binary = binarize(image);
    find_skew_binary(&binary, params)
}

/// [`find_skew`] on an already binarized page.
pub fn find_skew_binary(binary: &GrayImage, params: &SweepParams) -> SkewEstimate {
    let sweep = ShearTarget::new(binary, params.sweep_reduction);
    if sweep.points.is_empty() {
        debug!("No ink found; skew undefined");
        return SkewEstimate::NONE;
    }

    // -- Sweep ----------------------------------------------------------------

    let steps = (params.sweep_range / params.sweep_delta).round() as i32;
    let mut best_angle = 0.0f32;
    let mut best_score = f64::MIN;
    let mut worst_score = f64::MAX;
    for step in -steps..=steps {
        let angle = step as f32 * params.sweep_delta;
        let score = sweep.score(angle);
        // Ties resolve towards the smallest absolute angle.
        if score > best_score || (score == best_score && angle.abs() < best_angle.abs()) {
            best_score = score;
            best_angle = angle;
        }
        worst_score = worst_score.min(score);
    }
    debug!(best_angle, best_score, worst_score, "Sweep complete");

    let on_edge = best_angle.abs() >= steps as f32 * params.sweep_delta - params.sweep_delta / 2.0
        && steps > 0;
    let confidence = if worst_score <= 0.0 || best_score < params.min_valid_score || on_edge {
        0.0
    } else {
        (best_score / worst_score) as f32
    };

    // -- Search ---------------------------------------------------------------

    let search = if params.search_reduction == params.sweep_reduction {
        sweep
    } else {
        ShearTarget::new(binary, params.search_reduction)
    };

    let mut center = best_angle;
    let mut center_score = search.score(center);
    for delta in refinement_steps(params.sweep_delta, params.min_search_delta) {
        let left = center - delta;
        let right = center + delta;
        let left_score = search.score(left);
        let right_score = search.score(right);
        if left_score > center_score && left_score >= right_score {
            center = left;
            center_score = left_score;
        } else if right_score > center_score {
            center = right;
            center_score = right_score;
        }
    }

    debug!(angle = center, confidence, "Skew search complete");
    SkewEstimate::from_degrees(center, confidence)
}

/// Halving steps of the search, starting at half the sweep step and ending
/// with the first step below `min_search_delta`.
fn refinement_steps(sweep_delta: f32, min_search_delta: f32) -> impl Iterator<Item = f32> {
    std::iter::successors(Some(sweep_delta / 2.0), move |&delta| {
        (delta >= min_search_delta).then_some(delta / 2.0)
    })
}
