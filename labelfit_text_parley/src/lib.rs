// Copyright 2025 the labelfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parley-backed text measurement adapter.
//!
//! This crate implements [`labelfit_text::TextMeasurer`] using Parley, giving shaping-aware
//! label widths (kerning, real glyph advances, font fallback) instead of the `0.6em` heuristic.
//!
//! Shaped widths are not linear in font size once hinting and quantization kick in, which is
//! why the estimator re-measures labels at the fitted size.

#![no_std]

extern crate alloc;

use alloc::borrow::Cow;
use core::cell::RefCell;

use labelfit_text::{FontFamily, FontStyle, MeasureError, TextMeasurer, TextMetrics, TextStyle};
use parley::style::{FontFamily as ParleyFontFamily, FontStack, GenericFamily, StyleProperty};
use parley::{Alignment, AlignmentOptions, FontContext, FontStyle as ParleyFontStyle, FontWeight};

/// A [`TextMeasurer`] backed by Parley.
///
/// The font and layout contexts are reused between calls, so this type is `!Sync`; keep one
/// per render thread.
pub struct ParleyTextMeasurer {
    font_cx: RefCell<FontContext>,
    layout_cx: RefCell<parley::LayoutContext<()>>,
    display_scale: f32,
    quantize: bool,
}

impl core::fmt::Debug for ParleyTextMeasurer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ParleyTextMeasurer")
            .field("display_scale", &self.display_scale)
            .field("quantize", &self.quantize)
            .finish_non_exhaustive()
    }
}

impl ParleyTextMeasurer {
    /// Creates a new Parley-backed text measurer using the system font configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            font_cx: RefCell::new(FontContext::new()),
            layout_cx: RefCell::new(parley::LayoutContext::new()),
            display_scale: 1.0,
            quantize: true,
        }
    }

    /// Sets the display scale passed to Parley.
    ///
    /// This is typically a device pixel ratio. Measurements are scaled back into logical
    /// coordinates (divided by the scale).
    #[must_use]
    pub fn with_display_scale(mut self, display_scale: f32) -> Self {
        self.display_scale = display_scale.max(0.0);
        self
    }

    /// Sets whether Parley should quantize layout coordinates to pixel boundaries.
    #[must_use]
    pub fn with_quantize(mut self, quantize: bool) -> Self {
        self.quantize = quantize;
        self
    }

    fn parley_font_stack(family: &FontFamily) -> FontStack<'_> {
        let family = match family {
            FontFamily::Serif => ParleyFontFamily::Generic(GenericFamily::Serif),
            FontFamily::SansSerif => ParleyFontFamily::Generic(GenericFamily::SansSerif),
            FontFamily::Monospace => ParleyFontFamily::Generic(GenericFamily::Monospace),
            FontFamily::Named(name) => ParleyFontFamily::Named(Cow::Borrowed(name.as_ref())),
        };
        FontStack::from(family)
    }

    fn parley_font_style(style: FontStyle) -> ParleyFontStyle {
        match style {
            FontStyle::Normal => ParleyFontStyle::Normal,
            FontStyle::Italic => ParleyFontStyle::Italic,
            FontStyle::Oblique => ParleyFontStyle::Oblique(None),
        }
    }

    fn font_size_f32(font_size: f64) -> Result<f32, MeasureError> {
        if !font_size.is_finite() || font_size < 0.0 || font_size >= f64::from(f32::MAX) {
            return Err(MeasureError::InvalidFontSize);
        }
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Value is range-checked against f32::MAX above"
        )]
        let font_size = font_size as f32;
        Ok(font_size)
    }
}

impl Default for ParleyTextMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasurer for ParleyTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> Result<TextMetrics, MeasureError> {
        let text = text.split('\n').next().unwrap_or("");
        if text.is_empty() {
            return Ok(TextMetrics::ZERO);
        }
        let font_size = Self::font_size_f32(style.font_size)?;

        let scale = self.display_scale.max(1.0e-6);

        let mut font_cx = self
            .font_cx
            .try_borrow_mut()
            .map_err(|_| MeasureError::Unavailable("parley font context is busy"))?;
        let mut layout_cx = self
            .layout_cx
            .try_borrow_mut()
            .map_err(|_| MeasureError::Unavailable("parley layout context is busy"))?;

        let mut builder = layout_cx.ranged_builder(&mut font_cx, text, scale, self.quantize);
        builder.push_default(StyleProperty::FontSize(font_size));
        builder.push_default(StyleProperty::FontStack(Self::parley_font_stack(
            &style.font_family,
        )));
        builder.push_default(StyleProperty::FontStyle(Self::parley_font_style(
            style.font_style,
        )));
        builder.push_default(StyleProperty::FontWeight(FontWeight::new(f32::from(
            style.font_weight.0,
        ))));

        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);
        layout.align(None, Alignment::Start, AlignmentOptions::default());

        // No line for non-empty text means no usable font was resolved.
        let line = layout
            .lines()
            .next()
            .ok_or(MeasureError::Unavailable("parley produced no line"))?;

        let m = line.metrics();
        let scale = f64::from(scale);
        Ok(TextMetrics {
            advance_width: f64::from(m.advance) / scale,
            ascent: f64::from(m.ascent) / scale,
            descent: f64::from(m.descent) / scale,
            leading: f64::from(m.leading) / scale,
        })
    }
}
