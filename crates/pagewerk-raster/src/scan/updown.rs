// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Up/down text orientation scoring.
//
// Latin text has more ascenders (b, d, h, k, l, t, capitals) than descenders
// (g, j, p, q, y). Each text line is split into its x-height core and the
// strokes sticking out above and below it are counted; an upright page has a
// surplus of strokes above the core, an upside-down page a surplus below.

use image::{DynamicImage, GrayImage, imageops};
use pagewerk_core::OrientationScores;
use tracing::{debug, instrument};

use super::binarize::{INK, binarize, row_profile};

/// Text bands shorter than this many rows are treated as noise.
const MIN_BAND_HEIGHT: usize = 4;

/// Ascender and descender stroke counts over a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrokeCounts {
    pub up: u32,
    pub down: u32,
}

impl StrokeCounts {
    /// `2 (up - down) / sqrt(up + down)`, or 0 with fewer than `min_strokes`
    /// strokes in total.
    pub fn confidence(&self, min_strokes: u32) -> f32 {
        let total = self.up + self.down;
        if total == 0 || total < min_strokes {
            return 0.0;
        }
        2.0 * (self.up as f32 - self.down as f32) / (total as f32).sqrt()
    }
}

/// Score both orientation hypotheses of a page.
///
/// `up_confidence` comes from the page as given; `left_confidence` is the
/// same score on the page turned 90 degrees clockwise, which is upright when
/// the original text was left-facing.
#[instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn orientation_scores(image: &DynamicImage, min_strokes: u32) -> OrientationScores {
    let binary = binarize(image);
    let up = count_strokes(&binary);
    let left = count_strokes(&imageops::rotate90(&binary));
    let scores = OrientationScores {
        up_confidence: up.confidence(min_strokes),
        left_confidence: left.confidence(min_strokes),
    };
    debug!(
        up_strokes = up.up,
        down_strokes = up.down,
        left_up_strokes = left.up,
        left_down_strokes = left.down,
        up_confidence = scores.up_confidence,
        left_confidence = scores.left_confidence,
        "Orientation scored"
    );
    scores
}

/// Count ascender and descender strokes over every text band of a binary page.
pub fn count_strokes(binary: &GrayImage) -> StrokeCounts {
    let profile = row_profile(binary);
    let mut counts = StrokeCounts::default();

    for (top, bottom) in text_bands(&profile) {
        let band = &profile[top..bottom];
        let Some((core_top, core_bottom)) = x_height_core(band) else {
            continue;
        };
        let core_top = top + core_top;
        let core_bottom = top + core_bottom;

        counts.up += column_runs(binary, top, core_top);
        counts.down += column_runs(binary, core_bottom + 1, bottom);
    }

    counts
}

/// Maximal runs of rows containing ink, as half-open `[top, bottom)` ranges.
fn text_bands(profile: &[u32]) -> Vec<(usize, usize)> {
    let mut bands = Vec::new();
    let mut start = None;
    for (y, &count) in profile.iter().enumerate() {
        match (count > 0, start) {
            (true, None) => start = Some(y),
            (false, Some(s)) => {
                if y - s >= MIN_BAND_HEIGHT {
                    bands.push((s, y));
                }
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        if profile.len() - s >= MIN_BAND_HEIGHT {
            bands.push((s, profile.len()));
        }
    }
    bands
}

/// First and last row (inclusive, band-relative) whose ink count reaches half
/// the band's peak.
fn x_height_core(band: &[u32]) -> Option<(usize, usize)> {
    let peak = *band.iter().max()?;
    if peak == 0 {
        return None;
    }
    let is_core = |count: &u32| count * 2 >= peak;
    let first = band.iter().position(is_core)?;
    let last = band.iter().rposition(is_core)?;
    Some((first, last))
}

/// Number of runs of adjacent columns that hold ink within rows `[top, bottom)`.
fn column_runs(binary: &GrayImage, top: usize, bottom: usize) -> u32 {
    if top >= bottom {
        return 0;
    }
    let mut runs = 0;
    let mut in_run = false;
    for x in 0..binary.width() {
        let has_ink = (top..bottom).any(|y| binary.get_pixel(x, y as u32).0[0] == INK);
        if has_ink && !in_run {
            runs += 1;
        }
        in_run = has_ink;
    }
    runs
}

/// Synthetic page of "text" for tests and benches (`test-support` feature).
///
/// Ten lines of thirty 8x10 glyph blocks; every third glyph carries a 2px
/// ascender stem, every seventh (offset 3) a descender stem.
#[cfg(any(test, feature = "test-support"))]
pub fn synthetic_text_page() -> GrayImage {
    use image::Luma;

    let mut img = GrayImage::from_pixel(400, 340, Luma([255u8]));
    let mut fill = |x0: u32, x1: u32, y0: u32, y1: u32| {
        for y in y0..y1 {
            for x in x0..x1 {
                img.put_pixel(x, y, Luma([0u8]));
            }
        }
    };
    for line in 0..10u32 {
        let top = 20 + line * 30;
        for glyph in 0..30u32 {
            let x0 = 20 + glyph * 12;
            fill(x0, x0 + 8, top + 6, top + 16);
            if glyph % 3 == 0 {
                fill(x0, x0 + 2, top, top + 6);
            }
            if glyph % 7 == 3 {
                fill(x0 + 6, x0 + 8, top + 16, top + 22);
            }
        }
    }
    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn upright_text_has_more_ascenders() {
        let counts = count_strokes(&synthetic_text_page());
        assert_eq!(counts, StrokeCounts { up: 100, down: 40 });
        assert!(counts.confidence(10) > 10.0);
    }

    #[test]
    fn upside_down_text_scores_negative() {
        let page = DynamicImage::ImageLuma8(synthetic_text_page()).rotate180();
        let scores = orientation_scores(&page, 10);
        assert!(scores.up_confidence < -10.0, "got {:?}", scores);
        assert_eq!(scores.left_confidence, 0.0);
    }

    #[test]
    fn upright_page_scores() {
        let page = DynamicImage::ImageLuma8(synthetic_text_page());
        let scores = orientation_scores(&page, 10);
        assert!(scores.up_confidence > 10.0, "got {:?}", scores);
        assert_eq!(scores.left_confidence, 0.0);
    }

    #[test]
    fn left_facing_page_scores_on_left() {
        // Text turned counter-clockwise.
        let page = DynamicImage::ImageLuma8(synthetic_text_page()).rotate270();
        let scores = orientation_scores(&page, 10);
        assert_eq!(scores.up_confidence, 0.0);
        assert!(scores.left_confidence > 10.0, "got {:?}", scores);
    }

    #[test]
    fn too_few_strokes_score_zero() {
        let counts = StrokeCounts { up: 3, down: 1 };
        assert_eq!(counts.confidence(10), 0.0);
        assert!(counts.confidence(0) > 0.0);
    }

    #[test]
    fn blank_page_scores_zero() {
        let page = DynamicImage::ImageLuma8(GrayImage::from_pixel(50, 50, Luma([255u8])));
        assert_eq!(orientation_scores(&page, 10), OrientationScores::default());
    }

    #[test]
    fn bands_skip_noise_rows() {
        let profile = [0, 5, 0, 0, 3, 4, 9, 9, 2, 0, 1, 1];
        assert_eq!(text_bands(&profile), vec![(4, 9)]);
    }

    #[test]
    fn core_is_half_peak() {
        let band = [2, 2, 10, 10, 10, 1];
        assert_eq!(x_height_core(&band), Some((2, 4)));
    }
}
