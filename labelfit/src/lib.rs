// Copyright 2025 the labelfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shrink-to-fit label sizing and margin layout for chart renderers.
//!
//! Every chart needs the same step before it can build scales: measure the labels it is about
//! to draw (category names, formatted values, legend entries), decide on a font size that lets
//! them fit, and reserve margins for them. This crate does that step once:
//!
//! - [`LabelLayoutEstimator`] measures labels through a [`TextMeasurer`] backend, falling back
//!   to a deterministic heuristic when the backend is unavailable, and fits label sets into a
//!   [`LayoutBudget`].
//! - [`compute_margin`] turns a [`FitResult`] into the margin to reserve.
//! - [`MarginLayout`] runs the measure/arrange pass for a whole chart (title, axis labels,
//!   legend) and yields the plot rectangle.
//! - [`LabelLayoutEstimator::truncate_to_width`] and [`LabelLayoutEstimator::wrap_to_width`]
//!   handle labels that still overflow once the font floor is reached.
//!
//! Scale construction and mark generation are out of scope.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod estimator;
#[cfg(test)]
mod fit_tests;
mod fit_text;
#[cfg(not(feature = "std"))]
mod float;
mod format;
mod label;
mod layout;

pub use estimator::{LabelLayoutEstimator, compute_margin};
pub use format::{NumberFormat, format_number};
pub use label::{
    FitResult, LabelSpec, LayoutBudget, MIN_RENDERABLE_FONT_SIZE_PX, MeasurementResult,
    MeasurementSource,
};
pub use labelfit_text::{
    FontFamily, FontStyle, FontWeight, HeuristicTextMeasurer, MeasureError, TextMeasurer,
    TextMetrics, TextStyle,
};
pub use layout::{
    LegendFit, LegendOrient, LegendPlacement, LegendSpec, MarginLayout, MarginSpec, Margins,
    Placed, Side, SideFit, SideLabels, Size, TitleFit, TitleSpec,
};
