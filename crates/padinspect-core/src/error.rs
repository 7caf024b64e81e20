// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for padinspect.

use thiserror::Error;

/// Top-level error type for all padinspect operations.
///
/// Inspection itself never surfaces these to the caller: the orchestrator
/// folds them into the `InspectionResult`. They are returned by the lower
/// level building blocks (decoding, slicing, encoding, configuration).
#[derive(Debug, Error)]
pub enum PadInspectError {
    // -- Image errors --
    #[error("image decoding failed: {0}")]
    Decode(String),

    #[error("image encoding failed: {0}")]
    Encode(String),

    #[error(
        "region {x},{y} {width}x{height} exceeds image bounds {image_width}x{image_height}"
    )]
    InvalidRegion {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PadInspectError>;
