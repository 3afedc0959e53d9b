// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Pagewerk.

use thiserror::Error;

/// Top-level error type for all Pagewerk operations.
///
/// Every operation is terminal on error: nothing is retried internally, and a
/// handle passed in by the caller that was not consumed is still valid.
#[derive(Debug, Error)]
pub enum PagewerkError {
    // -- Loading / encoding --
    #[error("image not found: {0}")]
    NotFound(String),

    #[error("invalid image format: {0}")]
    InvalidFormat(String),

    #[error("image encoding failed: {0}")]
    Encode(String),

    // -- Orientation pipeline --
    #[error("orientation detection failed: {0}")]
    Detection(String),

    #[error("orientation decision failed: {0}")]
    Decision(String),

    #[error("rotation failed: {0}")]
    Rotation(String),

    // -- Handle lifecycle --
    #[error("image handle has already been released")]
    Released,

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PagewerkError>;
