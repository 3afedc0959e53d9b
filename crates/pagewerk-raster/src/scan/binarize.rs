// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Binarization and binary reduction — the common front end of skew and
// orientation analysis.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::{ThresholdType, threshold};
use imageproc::stats::histogram;
use tracing::debug;

/// Pixel value of ink (foreground) in a binarized page.
pub const INK: u8 = 0;
/// Pixel value of paper (background) in a binarized page.
pub const PAPER: u8 = 255;

/// Binarize a page with a global Otsu threshold.
///
/// Pixels at or below the threshold become `INK`, everything else `PAPER`.
pub fn binarize(image: &DynamicImage) -> GrayImage {
    let gray = image.to_luma8();
    let level = otsu_threshold(&gray);
    debug!(level, "Otsu threshold computed");
    threshold(&gray, level, ThresholdType::Binary)
}

/// Otsu level of a grayscale page: the gray level splitting the histogram
/// into the two classes with the largest between-class variance.
///
/// Sums are kept in 64 bits so large scans cannot overflow. A page with a
/// single gray level has no split and yields 0, which leaves a light page
/// without ink.
pub fn otsu_threshold(gray: &GrayImage) -> u8 {
    let counts = histogram(gray).channels[0].map(u64::from);
    let pixels: u64 = counts.iter().sum();
    let mass: u64 = (0u64..).zip(counts).map(|(level, n)| level * n).sum();

    let mut level = 0u8;
    let mut best = 0.0f64;
    let (mut dark, mut dark_mass) = (0u64, 0u64);
    for (value, n) in (0u8..=u8::MAX).zip(counts) {
        dark += n;
        dark_mass += u64::from(value) * n;
        let light = pixels - dark;
        if dark == 0 || light == 0 {
            continue;
        }
        let gap = dark_mass as f64 / dark as f64 - (mass - dark_mass) as f64 / light as f64;
        let variance = dark as f64 * light as f64 * gap * gap;
        if variance > best {
            best = variance;
            level = value;
        }
    }
    level
}

/// OR-reduce a binary page by `factor`: an output pixel is ink when any pixel
/// of its `factor x factor` source block is ink.
pub fn reduce_or(binary: &GrayImage, factor: u32) -> GrayImage {
    if factor <= 1 {
        return binary.clone();
    }
    let (width, height) = binary.dimensions();
    let out_w = width.div_ceil(factor);
    let out_h = height.div_ceil(factor);
    let mut output = GrayImage::from_pixel(out_w, out_h, Luma([PAPER]));

    for (x, y, pixel) in binary.enumerate_pixels() {
        if pixel.0[0] == INK {
            output.put_pixel(x / factor, y / factor, Luma([INK]));
        }
    }
    output
}

/// Coordinates of every ink pixel, in row-major order.
pub fn ink_points(binary: &GrayImage) -> Vec<(u32, u32)> {
    binary
        .enumerate_pixels()
        .filter(|(_, _, p)| p.0[0] == INK)
        .map(|(x, y, _)| (x, y))
        .collect()
}

/// Ink pixel count of every row.
pub fn row_profile(binary: &GrayImage) -> Vec<u32> {
    let mut profile = vec![0u32; binary.height() as usize];
    for (_, y, pixel) in binary.enumerate_pixels() {
        if pixel.0[0] == INK {
            profile[y as usize] += 1;
        }
    }
    profile
}
