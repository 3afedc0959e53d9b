// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page analysis — binarization, skew estimation, and up/down orientation
// scoring.

pub mod binarize;
pub mod skew;
pub mod updown;

pub use skew::find_skew;
pub use updown::orientation_scores;
