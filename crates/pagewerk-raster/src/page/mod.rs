// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page image module — the owning raster handle and its codecs.

pub mod codec;
pub mod handle;

pub use handle::PageImage;
