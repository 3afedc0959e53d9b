// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the command line and batch reports.
//
// Every technical error is mapped to plain English with a clear suggestion,
// plus whether the caller should fall back to the unmodified page.

use crate::error::PagewerkError;

/// What the caller should do with the page after an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The page could not be read at all; there is nothing to fall back to.
    Unreadable,
    /// Processing gave up; keep using the unmodified page.
    KeepOriginal,
    /// The invocation itself is wrong (bad config, bad output path).
    FixInvocation,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    pub disposition: Disposition,
}

/// Convert a `PagewerkError` into a `HumanError`.
pub fn humanize_error(err: &PagewerkError) -> HumanError {
    match err {
        PagewerkError::NotFound(detail) => HumanError {
            message: "The page image couldn't be opened.".into(),
            suggestion: format!(
                "Check the path exists and is a PNM, PNG, BMP, TIFF or JPEG file. ({detail})"
            ),
            disposition: Disposition::Unreadable,
        },

        PagewerkError::InvalidFormat(_) => HumanError {
            message: "These bytes aren't a page image we can decode.".into(),
            suggestion: "The data may be empty, truncated, or in an unsupported format.".into(),
            disposition: Disposition::Unreadable,
        },

        PagewerkError::Encode(_) => HumanError {
            message: "The page couldn't be written in that format.".into(),
            suggestion: "Try a lossless format such as PNG or PNM.".into(),
            disposition: Disposition::FixInvocation,
        },

        PagewerkError::Detection(_) => HumanError {
            message: "We couldn't tell which way up this page is.".into(),
            suggestion: "The page may contain too little text. The original page was kept.".into(),
            disposition: Disposition::KeepOriginal,
        },

        PagewerkError::Decision(_) => HumanError {
            message: "The page orientation was too close to call.".into(),
            suggestion: "Lower the orientation thresholds or use --permissive. The original page was kept.".into(),
            disposition: Disposition::KeepOriginal,
        },

        PagewerkError::Rotation(_) => HumanError {
            message: "Rotating the page failed.".into(),
            suggestion: "The original page was kept unchanged.".into(),
            disposition: Disposition::KeepOriginal,
        },

        PagewerkError::Released => HumanError {
            message: "The page was already released.".into(),
            suggestion: "This is a bug in the calling code; please report it.".into(),
            disposition: Disposition::FixInvocation,
        },

        PagewerkError::Config(detail) => HumanError {
            message: "The configuration isn't valid.".into(),
            suggestion: format!("Fix the setting and try again. ({detail})"),
            disposition: Disposition::FixInvocation,
        },

        PagewerkError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "We don't have permission to use that file.".into(),
                    suggestion: "Check the file permissions, or choose a different location.".into(),
                    disposition: Disposition::FixInvocation,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Check the path and that the disk isn't full.".into(),
                    disposition: Disposition::FixInvocation,
                }
            }
        }

        PagewerkError::Serialization(_) => HumanError {
            message: "The configuration file isn't valid JSON.".into(),
            suggestion: "Check the file for typos such as missing commas or quotes.".into(),
            disposition: Disposition::FixInvocation,
        },
    }
}
