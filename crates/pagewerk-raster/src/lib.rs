// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pagewerk-raster — Page raster processing for the Pagewerk scan cleaner.
//
// Provides the page image handle (load, encode, save, exactly-once release),
// skew estimation (fast and thorough sweep-and-search), deskew, and the
// orientation-correction pipeline, all over a swappable raster backend.

pub mod backend;
pub mod page;
pub mod pipeline;
pub mod scan;

// Re-export the primary types so callers can use `pagewerk_raster::PageImage` etc.
pub use crate::backend::{RasterBackend, SoftwareBackend};
pub use crate::page::PageImage;
pub use crate::pipeline::{
    OrientationOutcome, OrientationPipeline, PageProcessor, PipelineState, decide,
    normalize_angle,
};
