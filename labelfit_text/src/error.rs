// Copyright 2025 the labelfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

/// Reasons a measurement backend could not produce metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MeasureError {
    /// The measurement primitive does not exist in this environment (no layout engine,
    /// no canvas, no fonts).
    #[error("text measurement unavailable: {0}")]
    Unavailable(&'static str),
    /// The backend exists but raised an error while measuring.
    #[error("text measurement failed")]
    Failed,
    /// The font size cannot be handed to the backend.
    #[error("font size must be finite and non-negative")]
    InvalidFontSize,
}
