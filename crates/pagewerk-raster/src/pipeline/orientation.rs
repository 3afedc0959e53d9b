// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Orientation correction state machine.
//
//   Detecting -> Deciding -> Rotating -> Done
//        \           \           \
//         +-----------+-----------+--> Failed
//
// A single pass, no retries. The input page is released only when the run
// reaches Done; on Failed it is untouched and every intermediate raster has
// been dropped.

use image::DynamicImage;
use pagewerk_core::error::{PagewerkError, Result};
use pagewerk_core::{
    DeskewConfig, OrientationConfig, OrientationDecision, SkewEstimate, SweepParams,
};
use tracing::{debug, info, instrument, warn};

use super::decision::{decide, normalize_angle};
use super::deskew::{DeskewOutcome, deskew_raster};
use crate::backend::RasterBackend;
use crate::page::PageImage;

/// States of an orientation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Detecting,
    Deciding,
    Rotating,
    Done,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Result of a successful orientation run.
#[derive(Debug)]
pub struct OrientationOutcome {
    /// The corrected page; the sole live handle to its pixels.
    pub image: PageImage,
    /// Prior deskew angle (if any) plus the orientation offset, in `[0, 2π)`.
    pub angle: f32,
    pub decision: OrientationDecision,
    /// The deskew estimate, when a deskew pass ran first.
    pub skew: Option<SkewEstimate>,
}

/// One pass of the orientation state machine over one page.
pub struct OrientationPipeline<'a, B: RasterBackend + ?Sized> {
    backend: &'a B,
    config: OrientationConfig,
    deskew: DeskewConfig,
    sweep: SweepParams,
    state: PipelineState,
    trace: Vec<PipelineState>,
}

impl<'a, B: RasterBackend + ?Sized> OrientationPipeline<'a, B> {
    pub fn new(
        backend: &'a B,
        config: OrientationConfig,
        deskew: DeskewConfig,
        sweep: SweepParams,
    ) -> Self {
        Self {
            backend,
            config,
            deskew,
            sweep,
            state: PipelineState::Detecting,
            trace: vec![PipelineState::Detecting],
        }
    }

    /// Current state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Every state entered so far, starting with `Detecting`.
    pub fn trace(&self) -> &[PipelineState] {
        &self.trace
    }

    fn enter(&mut self, next: PipelineState) {
        debug!(from = ?self.state, to = ?next, "Orientation pipeline transition");
        self.state = next;
        self.trace.push(next);
    }

    /// Run the pipeline to a terminal state.
    ///
    /// Can only be run once; a second call fails with `Config`.
    #[instrument(skip_all, fields(backend = self.backend.name()))]
    pub fn run(&mut self, image: &PageImage) -> Result<OrientationOutcome> {
        if self.state.is_terminal() {
            return Err(PagewerkError::Config(
                "orientation pipeline has already run".into(),
            ));
        }

        let result = image.consume_with(|raster| self.correct(raster));
        match result {
            Ok((image, (angle, decision, skew))) => {
                self.enter(PipelineState::Done);
                info!(
                    decision = %decision,
                    angle,
                    "Orientation corrected"
                );
                Ok(OrientationOutcome {
                    image,
                    angle,
                    decision,
                    skew,
                })
            }
            Err(err) => {
                warn!(state = ?self.state, error = %err, "Orientation pipeline failed");
                self.enter(PipelineState::Failed);
                Err(err)
            }
        }
    }

    /// Detect, decide and rotate one raster. Returns the replacement raster
    /// (`None` when the input is already correct) with the angle and decision.
    #[allow(clippy::type_complexity)]
    fn correct(
        &mut self,
        raster: &DynamicImage,
    ) -> Result<(
        Option<DynamicImage>,
        (f32, OrientationDecision, Option<SkewEstimate>),
    )> {
        // -- Detecting ------------------------------------------------------------

        let (deskewed, skew) = if self.config.deskew_first {
            let DeskewOutcome {
                raster: straightened,
                estimate,
                applied,
            } = deskew_raster(self.backend, raster, &self.sweep, &self.deskew)
                .map_err(|err| as_kind(err, PagewerkError::Detection))?;
            let angle = if applied { estimate.angle } else { 0.0 };
            (straightened, Some((estimate, angle)))
        } else {
            (None, None)
        };
        let working = deskewed.as_ref().unwrap_or(raster);

        let scores = self
            .backend
            .detect_orientation(working, self.config.min_strokes)
            .map_err(|err| as_kind(err, PagewerkError::Detection))?;

        // -- Deciding -------------------------------------------------------------

        self.enter(PipelineState::Deciding);
        let decision = decide(scores, self.config.min_confidence, self.config.min_ratio)?;
        debug!(
            up = scores.up_confidence,
            left = scores.left_confidence,
            decision = %decision,
            "Orientation decided"
        );
        if decision == OrientationDecision::Unknown && self.config.reject_ambiguous {
            return Err(PagewerkError::Decision(format!(
                "ambiguous orientation (up {:.3}, left {:.3}; need > {} and ratio > {})",
                scores.up_confidence,
                scores.left_confidence,
                self.config.min_confidence,
                self.config.min_ratio
            )));
        }

        // -- Rotating -------------------------------------------------------------

        self.enter(PipelineState::Rotating);
        let replacement = match decision.correction() {
            None => deskewed,
            Some(turn) => Some(
                self.backend
                    .rotate_quarter(working, turn)
                    .map_err(|err| as_kind(err, PagewerkError::Rotation))?,
            ),
        };

        let deskew_angle = skew.map(|(_, angle)| angle).unwrap_or(0.0);
        let angle = normalize_angle(deskew_angle + decision.angle_offset());
        Ok((replacement, (angle, decision, skew.map(|(estimate, _)| estimate))))
    }
}

/// Re-tag a backend error with the kind of the stage it failed in. Errors
/// already of a pipeline kind keep their kind.
fn as_kind(err: PagewerkError, kind: fn(String) -> PagewerkError) -> PagewerkError {
    match err {
        PagewerkError::Detection(_) | PagewerkError::Decision(_) | PagewerkError::Rotation(_) => {
            err
        }
        other => kind(other.to_string()),
    }
}
