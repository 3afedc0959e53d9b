// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page pipeline — skew estimation, deskew, and orientation correction over
// an injected raster backend.

pub mod decision;
pub mod deskew;
pub mod orientation;

use pagewerk_core::error::Result;
use pagewerk_core::{PagewerkConfig, SkewEstimate};
use tracing::{debug, instrument};

use crate::backend::{RasterBackend, SoftwareBackend};
use crate::page::PageImage;

pub use decision::{decide, normalize_angle};
pub use orientation::{OrientationOutcome, OrientationPipeline, PipelineState};

/// Entry point for the page operations.
///
/// ```ignore
/// let processor = PageProcessor::new(PagewerkConfig::default())?;
/// let page = PageImage::load("scan.png")?;
/// let skew = processor.estimate_skew_fast(&page)?;
/// let outcome = processor.correct_orientation(&page)?;
/// outcome.image.save("upright.png")?;
/// ```
pub struct PageProcessor<B: RasterBackend = SoftwareBackend> {
    backend: B,
    config: PagewerkConfig,
}

impl PageProcessor<SoftwareBackend> {
    /// Processor over the software backend with a validated config.
    pub fn new(config: PagewerkConfig) -> Result<Self> {
        Self::with_backend(SoftwareBackend::new(), config)
    }

    /// Processor over the software backend with default settings.
    pub fn with_defaults() -> Self {
        Self {
            backend: SoftwareBackend::new(),
            config: PagewerkConfig::default(),
        }
    }
}

impl<B: RasterBackend> PageProcessor<B> {
    pub fn with_backend(backend: B, config: PagewerkConfig) -> Result<Self> {
        config.validate()?;
        debug!(backend = backend.name(), "Page processor ready");
        Ok(Self { backend, config })
    }

    pub fn config(&self) -> &PagewerkConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Single-pass reduced-resolution skew estimate.
    #[instrument(skip_all)]
    pub fn estimate_skew_fast(&self, image: &PageImage) -> Result<SkewEstimate> {
        image.with_raster(|raster| self.backend.find_skew(raster, &self.config.fast_skew))?
    }

    /// Full-resolution sweep-and-search skew estimate.
    #[instrument(skip_all)]
    pub fn estimate_skew_thorough(&self, image: &PageImage) -> Result<SkewEstimate> {
        image.with_raster(|raster| self.backend.find_skew(raster, &self.config.thorough_skew))?
    }

    /// Straighten a page.
    ///
    /// On success the input handle is released and the returned page is the
    /// sole owner of the pixels (rotated, or moved unchanged when the estimate
    /// is below the deskew thresholds). On error the input is untouched.
    #[instrument(skip_all)]
    pub fn deskew(&self, image: &PageImage) -> Result<(PageImage, SkewEstimate)> {
        image.consume_with(|raster| {
            let outcome = deskew::deskew_raster(
                &self.backend,
                raster,
                &self.config.thorough_skew,
                &self.config.deskew,
            )?;
            Ok((outcome.raster, outcome.estimate))
        })
    }

    /// Detect the page orientation and rotate the page upright.
    pub fn correct_orientation(&self, image: &PageImage) -> Result<OrientationOutcome> {
        self.orientation_pipeline().run(image)
    }

    /// A fresh orientation state machine using this processor's settings.
    pub fn orientation_pipeline(&self) -> OrientationPipeline<'_, B> {
        OrientationPipeline::new(
            &self.backend,
            self.config.orientation,
            self.config.deskew,
            self.config.thorough_skew,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::updown::synthetic_text_page;
    use image::{DynamicImage, GrayImage, Luma};
    use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
    use pagewerk_core::{
        OrientationConfig, OrientationDecision, OrientationScores, PagewerkError, QuarterTurn,
        SweepParams,
    };
    use std::f32::consts::{FRAC_PI_2, PI, TAU};

    /// Delegates to the software backend, with scripted scores and failures.
    #[derive(Default)]
    struct ScriptedBackend {
        scores: Option<OrientationScores>,
        fail_detect: bool,
        fail_rotate: bool,
    }

    impl RasterBackend for ScriptedBackend {
        fn name(&self) -> &str {
            "scripted"
        }

        fn find_skew(
            &self,
            image: &DynamicImage,
            params: &SweepParams,
        ) -> Result<SkewEstimate> {
            SoftwareBackend.find_skew(image, params)
        }

        fn detect_orientation(
            &self,
            image: &DynamicImage,
            min_strokes: u32,
        ) -> Result<OrientationScores> {
            if self.fail_detect {
                return Err(PagewerkError::Detection("scripted failure".into()));
            }
            match self.scores {
                Some(scores) => Ok(scores),
                None => SoftwareBackend.detect_orientation(image, min_strokes),
            }
        }

        fn rotate_quarter(
            &self,
            image: &DynamicImage,
            turn: QuarterTurn,
        ) -> Result<DynamicImage> {
            if self.fail_rotate {
                return Err(PagewerkError::Rotation("out of memory".into()));
            }
            SoftwareBackend.rotate_quarter(image, turn)
        }

        fn rotate(&self, image: &DynamicImage, radians: f32) -> Result<DynamicImage> {
            if self.fail_rotate {
                return Err(PagewerkError::Rotation("out of memory".into()));
            }
            SoftwareBackend.rotate(image, radians)
        }
    }

    fn upright() -> DynamicImage {
        DynamicImage::ImageLuma8(synthetic_text_page())
    }

    fn processor() -> PageProcessor {
        PageProcessor::with_defaults()
    }

    fn scripted(
        backend: ScriptedBackend,
        orientation: OrientationConfig,
    ) -> PageProcessor<ScriptedBackend> {
        let config = PagewerkConfig {
            orientation,
            ..PagewerkConfig::default()
        };
        PageProcessor::with_backend(backend, config).unwrap()
    }

    fn assert_upright(outcome: &OrientationOutcome) {
        let pixels = outcome.image.snapshot().unwrap().to_luma8();
        assert_eq!(pixels.as_raw(), upright().to_luma8().as_raw());
    }

    #[test]
    fn upright_page_is_done_and_normal() {
        let page = PageImage::from_dynamic(upright());
        let processor = processor();
        let mut pipeline = processor.orientation_pipeline();
        let outcome = pipeline.run(&page).unwrap();

        assert_eq!(outcome.decision, OrientationDecision::Normal);
        assert_eq!(outcome.angle, 0.0);
        assert!(outcome.skew.is_none());
        assert!(page.is_closed(), "input must be released on success");
        assert_upright(&outcome);
        assert_eq!(
            pipeline.trace(),
            &[
                PipelineState::Detecting,
                PipelineState::Deciding,
                PipelineState::Rotating,
                PipelineState::Done
            ]
        );
    }

    #[test]
    fn upside_down_page_is_turned() {
        let page = PageImage::from_dynamic(upright().rotate180());
        let outcome = processor().correct_orientation(&page).unwrap();
        assert_eq!(outcome.decision, OrientationDecision::UpsideDown);
        assert!((outcome.angle - PI).abs() < 1e-6);
        assert_upright(&outcome);
    }

    #[test]
    fn left_facing_page_is_turned_clockwise() {
        let page = PageImage::from_dynamic(upright().rotate270());
        let outcome = processor().correct_orientation(&page).unwrap();
        assert_eq!(outcome.decision, OrientationDecision::LeftFacing);
        assert!((outcome.angle - FRAC_PI_2).abs() < 1e-6);
        assert_upright(&outcome);
    }

    #[test]
    fn right_facing_page_is_turned_counter_clockwise() {
        let page = PageImage::from_dynamic(upright().rotate90());
        let outcome = processor().correct_orientation(&page).unwrap();
        assert_eq!(outcome.decision, OrientationDecision::RightFacing);
        assert!((outcome.angle - 3.0 * FRAC_PI_2).abs() < 1e-6);
        assert_upright(&outcome);
    }

    #[test]
    fn blank_page_fails_decision_and_keeps_input() {
        let page = PageImage::from_dynamic(DynamicImage::ImageLuma8(GrayImage::from_pixel(
            120,
            80,
            Luma([255u8]),
        )));
        let processor = processor();
        let mut pipeline = processor.orientation_pipeline();
        let err = pipeline.run(&page).unwrap_err();

        assert!(matches!(err, PagewerkError::Decision(_)));
        assert_eq!(pipeline.state(), PipelineState::Failed);
        assert_eq!(
            pipeline.trace(),
            &[
                PipelineState::Detecting,
                PipelineState::Deciding,
                PipelineState::Failed
            ]
        );
        assert!(!page.is_closed());
        assert_eq!(page.dimensions().unwrap(), (120, 80));
    }

    #[test]
    fn ambiguous_page_passes_through_when_allowed() {
        let page = PageImage::from_dynamic(upright());
        let processor = scripted(
            ScriptedBackend {
                scores: Some(OrientationScores {
                    up_confidence: 0.0,
                    left_confidence: 0.0,
                }),
                ..Default::default()
            },
            OrientationConfig::permissive(),
        );
        let outcome = processor.correct_orientation(&page).unwrap();
        assert_eq!(outcome.decision, OrientationDecision::Unknown);
        assert_eq!(outcome.angle, 0.0);
        assert_upright(&outcome);
    }

    #[test]
    fn rotation_failure_keeps_input() {
        let page = PageImage::from_dynamic(upright());
        let processor = scripted(
            ScriptedBackend {
                scores: Some(OrientationScores {
                    up_confidence: -20.0,
                    left_confidence: 0.0,
                }),
                fail_rotate: true,
                ..Default::default()
            },
            OrientationConfig::default(),
        );
        let mut pipeline = processor.orientation_pipeline();
        let err = pipeline.run(&page).unwrap_err();

        assert!(matches!(err, PagewerkError::Rotation(_)));
        assert_eq!(pipeline.trace().last(), Some(&PipelineState::Failed));
        assert!(pipeline.trace().contains(&PipelineState::Rotating));
        assert!(!page.is_closed());
        assert_eq!(
            page.snapshot().unwrap().to_luma8().as_raw(),
            upright().to_luma8().as_raw()
        );
    }

    #[test]
    fn detection_failure_is_detection_error() {
        let page = PageImage::from_dynamic(upright());
        let processor = scripted(
            ScriptedBackend {
                fail_detect: true,
                ..Default::default()
            },
            OrientationConfig::default(),
        );
        let err = processor.correct_orientation(&page).unwrap_err();
        assert!(matches!(err, PagewerkError::Detection(_)));
        assert!(!page.is_closed());
    }

    #[test]
    fn pipeline_runs_once() {
        let first = PageImage::from_dynamic(upright());
        let second = PageImage::from_dynamic(upright());
        let processor = processor();
        let mut pipeline = processor.orientation_pipeline();
        assert!(!pipeline.state().is_terminal());
        pipeline.run(&first).unwrap();
        assert!(pipeline.state().is_terminal());
        assert!(matches!(pipeline.run(&second), Err(PagewerkError::Config(_))));
        assert!(!second.is_closed());
        assert_eq!(pipeline.trace().len(), 4, "a rejected rerun records no states");
    }

    #[test]
    fn construction_validates_config() {
        let mut config = PagewerkConfig::default();
        config.orientation.min_ratio = -1.0;
        assert!(matches!(
            PageProcessor::new(config.clone()),
            Err(PagewerkError::Config(_))
        ));

        config.orientation = OrientationConfig::permissive();
        let processor = PageProcessor::with_backend(ScriptedBackend::default(), config).unwrap();
        assert_eq!(processor.backend().name(), "scripted");
        assert!(!processor.config().orientation.reject_ambiguous);
        assert_eq!(processor.config().thorough_skew, SweepParams::thorough());
    }

    fn deskew_first_processor() -> PageProcessor {
        PageProcessor::new(PagewerkConfig {
            orientation: OrientationConfig {
                deskew_first: true,
                ..OrientationConfig::default()
            },
            ..PagewerkConfig::default()
        })
        .unwrap()
    }

    fn skewed_text(degrees: f32) -> DynamicImage {
        DynamicImage::ImageLuma8(rotate_about_center(
            &synthetic_text_page(),
            degrees.to_radians(),
            Interpolation::Bilinear,
            Luma([255u8]),
        ))
    }

    #[test]
    fn deskew_first_on_level_page_adds_nothing() {
        let page = PageImage::from_dynamic(upright());
        let outcome = deskew_first_processor().correct_orientation(&page).unwrap();
        assert_eq!(outcome.decision, OrientationDecision::Normal);
        let skew = outcome.skew.expect("deskew pass should report its estimate");
        assert!(skew.degrees().abs() < 0.1, "got {} degrees", skew.degrees());
        assert_eq!(outcome.angle, 0.0);
    }

    #[test]
    fn deskew_first_folds_skew_into_angle() {
        let cases = [
            (3.0f32, false, OrientationDecision::Normal),
            (-3.0, false, OrientationDecision::Normal),
            (3.0, true, OrientationDecision::UpsideDown),
            (-3.0, true, OrientationDecision::UpsideDown),
        ];
        let processor = deskew_first_processor();
        for (degrees, flipped, expected) in cases {
            let raster = skewed_text(degrees);
            let raster = if flipped { raster.rotate180() } else { raster };
            let page = PageImage::from_dynamic(raster);

            let outcome = processor.correct_orientation(&page).unwrap();
            let case = format!("{degrees} degrees, flipped {flipped}");
            assert_eq!(outcome.decision, expected, "{case}");

            let skew = outcome.skew.expect("deskew pass should report its estimate");
            assert!(
                (skew.degrees() - degrees).abs() < 0.5,
                "{case}: skew {}",
                skew.degrees()
            );

            let folded = normalize_angle(skew.angle + expected.angle_offset());
            assert!(
                (outcome.angle - folded).abs() < 1e-5,
                "{case}: angle {}",
                outcome.angle
            );
            assert!((0.0..TAU).contains(&outcome.angle), "{case}");
            // The skew must be visible in the result, not just the quarter turn.
            assert!(
                (outcome.angle - expected.angle_offset()).abs() > 0.03,
                "{case}: angle {} carries no skew",
                outcome.angle
            );
        }
    }

    #[test]
    fn negative_skew_wraps_upward() {
        let page = PageImage::from_dynamic(skewed_text(-3.0));
        let outcome = deskew_first_processor().correct_orientation(&page).unwrap();
        let skew = outcome.skew.expect("deskew pass should report its estimate");
        assert!(skew.angle < 0.0);
        assert!((outcome.angle - (TAU + skew.angle)).abs() < 1e-5);
    }

    fn skewed_ruled_page(degrees: f32) -> PageImage {
        let mut img = GrayImage::from_pixel(300, 300, Luma([255u8]));
        for line in 0..12 {
            let y0 = 40 + line * 18;
            for y in y0..y0 + 3 {
                for x in 50..250 {
                    img.put_pixel(x, y, Luma([0u8]));
                }
            }
        }
        let rotated = rotate_about_center(
            &img,
            degrees.to_radians(),
            Interpolation::Bilinear,
            Luma([255u8]),
        );
        PageImage::from_dynamic(DynamicImage::ImageLuma8(rotated))
    }

    #[test]
    fn deskew_straightens_page() {
        let page = skewed_ruled_page(3.0);
        let processor = processor();
        let (straight, estimate) = processor.deskew(&page).unwrap();
        assert!((estimate.degrees() - 3.0).abs() < 0.5, "got {}", estimate.degrees());
        assert!(page.is_closed());

        let residual = processor.estimate_skew_thorough(&straight).unwrap();
        assert!(residual.degrees().abs() < 0.5, "residual {}", residual.degrees());
    }

    #[test]
    fn deskew_rotation_failure_keeps_input() {
        let page = skewed_ruled_page(3.0);
        let processor = scripted(
            ScriptedBackend {
                fail_rotate: true,
                ..Default::default()
            },
            OrientationConfig::default(),
        );
        assert!(matches!(
            processor.deskew(&page),
            Err(PagewerkError::Rotation(_))
        ));
        assert!(!page.is_closed());
    }

    #[test]
    fn fast_estimate_on_loaded_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        let mut img = GrayImage::from_pixel(100, 100, Luma([255u8]));
        for y in [30u32, 31, 60, 61] {
            for x in 10..90 {
                img.put_pixel(x, y, Luma([0u8]));
            }
        }
        img.save(&path).unwrap();

        let page = PageImage::load(&path).unwrap();
        let estimate = processor().estimate_skew_fast(&page).unwrap();
        assert!(estimate.angle.is_finite());
        assert!(estimate.confidence >= 0.0);
    }

    #[test]
    fn released_page_is_rejected() {
        let page = PageImage::from_dynamic(upright());
        page.destroy();
        assert!(matches!(
            processor().estimate_skew_fast(&page),
            Err(PagewerkError::Released)
        ));
        assert!(matches!(
            processor().correct_orientation(&page),
            Err(PagewerkError::Released)
        ));
    }
}
