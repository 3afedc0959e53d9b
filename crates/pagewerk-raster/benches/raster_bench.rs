// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the pagewerk-raster crate: fast and thorough skew
// estimation and the full orientation pipeline on a synthetic text page.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::DynamicImage;

use pagewerk_core::SweepParams;
use pagewerk_raster::scan::updown::synthetic_text_page;
use pagewerk_raster::{PageImage, PageProcessor, scan};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Skew estimation at both presets on a 400x340 page. The fast preset sweeps
/// at 4x reduction, the thorough one at full resolution.
fn bench_find_skew(c: &mut Criterion) {
    let page = DynamicImage::ImageLuma8(synthetic_text_page());
    let fast = SweepParams::fast();
    let thorough = SweepParams::thorough();

    c.bench_function("find_skew fast (400x340)", |b| {
        b.iter(|| black_box(scan::find_skew(black_box(&page), &fast)));
    });
    c.bench_function("find_skew thorough (400x340)", |b| {
        b.iter(|| black_box(scan::find_skew(black_box(&page), &thorough)));
    });
}

/// Detect, decide and rotate an upside-down page, including the handle
/// hand-off.
fn bench_correct_orientation(c: &mut Criterion) {
    let flipped = DynamicImage::ImageLuma8(synthetic_text_page()).rotate180();
    let processor = PageProcessor::with_defaults();

    c.bench_function("correct_orientation upside-down (400x340)", |b| {
        b.iter(|| {
            let page = PageImage::from_dynamic(black_box(flipped.clone()));
            let outcome = processor.correct_orientation(&page);
            black_box(outcome.map(|o| o.angle).ok());
        });
    });
}

criterion_group!(benches, bench_find_skew, bench_correct_orientation);
criterion_main!(benches);
