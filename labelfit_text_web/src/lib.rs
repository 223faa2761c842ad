// Copyright 2025 the labelfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web/WASM text measurement adapter.
//!
//! This crate provides a [`labelfit_text::TextMeasurer`] implementation for `wasm32-*` targets
//! using HTML Canvas `measureText` on an offscreen, unattached canvas.
//!
//! Notes:
//! - This uses `web-sys`/`wasm-bindgen` only on `wasm32` targets.
//! - Outside a browser (non-`wasm32` builds, or a `wasm32` host without `document`) every
//!   measurement reports [`MeasureError::Unavailable`]. It does not guess; the estimator
//!   decides how to fall back.

#![no_std]

extern crate alloc;

#[cfg(target_arch = "wasm32")]
use alloc::{format, string::String};
use labelfit_text::{MeasureError, TextMeasurer, TextMetrics, TextStyle};

/// A `wasm32` measurer backed by HTML Canvas 2D text metrics.
#[derive(Clone, Debug)]
pub struct WebTextMeasurer {
    #[cfg(target_arch = "wasm32")]
    ctx: Option<web_sys::CanvasRenderingContext2d>,
}

impl Default for WebTextMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

impl WebTextMeasurer {
    #[cfg(target_arch = "wasm32")]
    fn css_font(style: &TextStyle) -> String {
        let family = style.font_family.as_css_family();
        let weight = style.font_weight.0;
        let font_style = match style.font_style {
            labelfit_text::FontStyle::Normal => "normal",
            labelfit_text::FontStyle::Italic => "italic",
            labelfit_text::FontStyle::Oblique => "oblique",
        };
        format!("{font_style} {weight} {}px {family}", style.font_size)
    }

    #[cfg(target_arch = "wasm32")]
    fn offscreen_context() -> Option<web_sys::CanvasRenderingContext2d> {
        use wasm_bindgen::JsCast as _;

        let document = web_sys::window()?.document()?;
        let canvas = document
            .create_element("canvas")
            .ok()?
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .ok()?;
        canvas
            .get_context("2d")
            .ok()??
            .dyn_into::<web_sys::CanvasRenderingContext2d>()
            .ok()
    }

    /// Creates a web measurer using an offscreen canvas.
    ///
    /// If the host has no `window`/`document` the measurer is still created, but reports
    /// [`MeasureError::Unavailable`] for every non-empty string.
    #[cfg(target_arch = "wasm32")]
    #[must_use]
    pub fn new() -> Self {
        Self {
            ctx: Self::offscreen_context(),
        }
    }

    /// Creates a web measurer that uses an existing canvas 2D context.
    ///
    /// This is useful for embedders that want to reuse an existing (or offscreen) canvas
    /// instead of having this crate create DOM nodes.
    #[cfg(target_arch = "wasm32")]
    #[must_use]
    pub fn from_canvas_context(ctx: web_sys::CanvasRenderingContext2d) -> Self {
        Self { ctx: Some(ctx) }
    }

    /// Creates a measurer for a target without a web canvas.
    #[cfg(not(target_arch = "wasm32"))]
    #[must_use]
    pub fn new() -> Self {
        Self {}
    }

    /// Returns `true` if a canvas context backs this measurer.
    #[must_use]
    pub fn is_available(&self) -> bool {
        #[cfg(target_arch = "wasm32")]
        {
            self.ctx.is_some()
        }

        #[cfg(not(target_arch = "wasm32"))]
        false
    }
}

impl TextMeasurer for WebTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> Result<TextMetrics, MeasureError> {
        if text.is_empty() {
            return Ok(TextMetrics::ZERO);
        }
        if !style.font_size.is_finite() || style.font_size < 0.0 {
            return Err(MeasureError::InvalidFontSize);
        }

        #[cfg(target_arch = "wasm32")]
        {
            let ctx = self
                .ctx
                .as_ref()
                .ok_or(MeasureError::Unavailable("no canvas 2d context"))?;
            ctx.set_font(&Self::css_font(style));
            let metrics = ctx.measure_text(text).map_err(|_| MeasureError::Failed)?;

            // `width` is widely supported; the bounding box fields may be 0 or absent in older
            // engines. Treat zeros as unknown.
            let width = metrics.width();
            let ascent = metrics.actual_bounding_box_ascent();
            let descent = metrics.actual_bounding_box_descent();

            let ascent = if ascent > 0.0 {
                ascent
            } else {
                0.8 * style.font_size
            };
            let descent = if descent > 0.0 {
                descent
            } else {
                0.2 * style.font_size
            };

            Ok(TextMetrics {
                advance_width: width.max(0.0),
                ascent,
                descent,
                leading: 0.0,
            })
        }

        #[cfg(not(target_arch = "wasm32"))]
        Err(MeasureError::Unavailable("no web canvas on this target"))
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn native_builds_report_unavailable() {
        let m = WebTextMeasurer::new();
        assert!(!m.is_available(), "native targets have no canvas");
        assert!(
            matches!(
                m.measure("USA", &TextStyle::new(12.0)),
                Err(MeasureError::Unavailable(_))
            ),
            "non-empty text cannot be measured without a canvas"
        );
    }

    #[test]
    fn empty_text_is_zero_everywhere() {
        let m = WebTextMeasurer::new();
        assert_eq!(
            m.measure("", &TextStyle::new(12.0)),
            Ok(TextMetrics::ZERO),
            "empty text"
        );
    }
}
