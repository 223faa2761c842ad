// Copyright 2025 the labelfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Label inputs, layout budgets and fit outputs.

extern crate alloc;

use alloc::string::String;

use labelfit_text::{FontFamily, FontWeight, TextStyle};

/// Smallest font size a fit will ever produce, in pixels.
///
/// Budgets with a lower (or zero) floor are raised to this value so the scale factor stays
/// strictly positive.
pub const MIN_RENDERABLE_FONT_SIZE_PX: f64 = 1.0;

/// One label to be laid out as part of a label set.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelSpec {
    /// The unshaped label text.
    pub text: String,
    /// Font family used to render the label.
    pub font_family: FontFamily,
    /// Nominal font size in pixels.
    pub font_size_px: f64,
    /// Font weight used to render the label.
    pub font_weight: FontWeight,
}

impl LabelSpec {
    /// Creates a sans-serif, normal-weight label.
    pub fn new(text: impl Into<String>, font_size_px: f64) -> Self {
        Self {
            text: text.into(),
            font_family: FontFamily::SansSerif,
            font_size_px,
            font_weight: FontWeight::NORMAL,
        }
    }

    /// Creates a label from CSS-style typography values, as found in chart configuration
    /// (`"Arial"`, `"bold"`).
    pub fn from_css(
        text: impl Into<String>,
        font_family: &str,
        font_size_px: f64,
        font_weight: &str,
    ) -> Self {
        Self {
            text: text.into(),
            font_family: FontFamily::from_css(font_family),
            font_size_px,
            font_weight: FontWeight::from_css(font_weight),
        }
    }

    /// Sets the font family.
    #[must_use]
    pub fn with_family(mut self, font_family: FontFamily) -> Self {
        self.font_family = font_family;
        self
    }

    /// Sets the font weight.
    #[must_use]
    pub fn with_weight(mut self, font_weight: FontWeight) -> Self {
        self.font_weight = font_weight;
        self
    }

    /// The nominal font size, with non-finite and negative values mapped to `0`.
    pub fn nominal_font_size(&self) -> f64 {
        sanitize(self.font_size_px)
    }

    /// The measurement style for this label at `font_size_px`.
    pub fn style_at(&self, font_size_px: f64) -> TextStyle {
        TextStyle::new(font_size_px)
            .with_family(self.font_family.clone())
            .with_weight(self.font_weight)
    }

    /// The measurement style for this label at its nominal size.
    pub fn style(&self) -> TextStyle {
        self.style_at(self.nominal_font_size())
    }
}

/// The measured width of one label.
#[derive(Clone, Debug, PartialEq)]
pub struct MeasurementResult {
    /// The label text.
    pub text: String,
    /// Width in pixels at the size it was measured at.
    pub width_px: f64,
}

/// Space available to a label set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutBudget {
    /// Maximum width the widest label may occupy, in pixels.
    pub available_px: f64,
    /// Font size the fit will not shrink below, in pixels.
    pub min_font_size_px: f64,
}

impl LayoutBudget {
    /// Creates a budget.
    pub fn new(available_px: f64, min_font_size_px: f64) -> Self {
        Self {
            available_px,
            min_font_size_px,
        }
    }

    /// Available width, with non-finite and negative values mapped to `0`.
    ///
    /// `f64::INFINITY` is kept: an unbounded budget never shrinks.
    pub fn sanitized_available(&self) -> f64 {
        if self.available_px.is_nan() {
            0.0
        } else {
            self.available_px.max(0.0)
        }
    }

    /// The floor actually applied by a fit.
    pub fn effective_min_font_size(&self) -> f64 {
        sanitize(self.min_font_size_px).max(MIN_RENDERABLE_FONT_SIZE_PX)
    }
}

impl Default for LayoutBudget {
    fn default() -> Self {
        Self {
            available_px: f64::INFINITY,
            min_font_size_px: 8.0,
        }
    }
}

/// Which measurer produced the widths of a pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MeasurementSource {
    /// The configured backend measured every label.
    Backend,
    /// The backend was unavailable, so every label was measured by the heuristic.
    Heuristic,
}

/// Outcome of fitting a label set into a budget.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitResult {
    /// Factor applied to every nominal font size, `0 < scale_factor <= 1`.
    pub scale_factor: f64,
    /// Rendered font size of the largest label in the set.
    pub adjusted_font_size_px: f64,
    /// Width of the widest label at its adjusted size.
    pub max_label_width_px: f64,
    /// The floor applied to every label's rendered size.
    pub min_font_size_px: f64,
    /// The widest label still exceeds the budget at its adjusted size.
    ///
    /// Only set once the largest label has settled at the floor.
    pub overflows: bool,
    /// Which measurer produced the widths.
    pub source: MeasurementSource,
}

impl FitResult {
    /// Rendered size for a label with the given nominal size under this fit.
    pub fn font_size_for(&self, nominal_font_size_px: f64) -> f64 {
        (sanitize(nominal_font_size_px) * self.scale_factor).max(self.min_font_size_px)
    }

    /// Shorthand for [`compute_margin`](crate::compute_margin).
    pub fn margin(&self, padding_px: f64) -> f64 {
        crate::compute_margin(self, padding_px)
    }
}

pub(crate) fn sanitize(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}
