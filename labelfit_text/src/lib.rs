// Copyright 2025 the labelfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text measurement hooks for label layout.
//!
//! Chart code needs to know how wide a label will be before it can reserve margins or pick a
//! font size. Shaping and glyph layout live downstream, so layout code depends on a tiny
//! measurement interface instead:
//!
//! - [`TextMeasurer`] is implemented by real backends (a shaping engine, an HTML canvas) and by
//!   the deterministic [`HeuristicTextMeasurer`].
//! - Backends report failure through [`MeasureError`] instead of guessing, so callers can apply
//!   one fallback policy consistently.
//!
//! This crate is `no_std`-friendly (it uses `alloc` for owned font family names).

#![no_std]

extern crate alloc;

mod error;

use alloc::boxed::Box;
use alloc::sync::Arc;

use unicode_segmentation::UnicodeSegmentation;

pub use error::MeasureError;

/// A minimal, fallible text measurement interface.
///
/// Implementations can be:
/// - heuristic (fast, deterministic, never fails),
/// - backed by a shaping engine (e.g. Parley), or
/// - backed by web platform text measurement (e.g. HTML canvas).
///
/// Measuring the same text with the same style twice must yield the same metrics.
pub trait TextMeasurer {
    /// Measure a single line of text.
    ///
    /// `text` is treated as a single line; callers should split on `\n` if they want
    /// multi-line layout.
    fn measure(&self, text: &str, style: &TextStyle) -> Result<TextMetrics, MeasureError>;
}

impl<M: TextMeasurer + ?Sized> TextMeasurer for &M {
    fn measure(&self, text: &str, style: &TextStyle) -> Result<TextMetrics, MeasureError> {
        (**self).measure(text, style)
    }
}

impl<M: TextMeasurer + ?Sized> TextMeasurer for Box<M> {
    fn measure(&self, text: &str, style: &TextStyle) -> Result<TextMetrics, MeasureError> {
        (**self).measure(text, style)
    }
}

/// Text styling inputs relevant to measurement.
///
/// This is intentionally minimal: just enough to make label layout consistent.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in the chart’s coordinate system (typically pixels).
    pub font_size: f64,
    /// The preferred font family.
    pub font_family: FontFamily,
    /// Font weight (e.g. `400` for normal, `700` for bold).
    pub font_weight: FontWeight,
    /// Font style (normal/italic/oblique).
    pub font_style: FontStyle,
}

impl TextStyle {
    /// Creates a default `TextStyle` with the given `font_size`.
    #[must_use]
    pub fn new(font_size: f64) -> Self {
        Self {
            font_size,
            font_family: FontFamily::SansSerif,
            font_weight: FontWeight::NORMAL,
            font_style: FontStyle::Normal,
        }
    }

    /// Returns a copy of this style at a different font size.
    #[must_use]
    pub fn with_font_size(&self, font_size: f64) -> Self {
        Self {
            font_size,
            ..self.clone()
        }
    }

    /// Sets the font family.
    #[must_use]
    pub fn with_family(mut self, family: FontFamily) -> Self {
        self.font_family = family;
        self
    }

    /// Sets the font weight.
    #[must_use]
    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.font_weight = weight;
        self
    }

    /// Sets the font style.
    #[must_use]
    pub fn with_style(mut self, style: FontStyle) -> Self {
        self.font_style = style;
        self
    }

    /// Returns the font size clamped to a usable value.
    ///
    /// Non-finite and negative sizes map to `0`.
    #[must_use]
    pub fn sanitized_font_size(&self) -> f64 {
        if self.font_size.is_finite() {
            self.font_size.max(0.0)
        } else {
            0.0
        }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::new(12.0)
    }
}

/// Font family selection for measurement.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FontFamily {
    /// A generic serif family (CSS `serif`).
    Serif,
    /// A generic sans-serif family (CSS `sans-serif`).
    SansSerif,
    /// A generic monospace family (CSS `monospace`).
    Monospace,
    /// A named family (e.g. `"Inter"`, `"Helvetica Neue"`).
    Named(Arc<str>),
}

impl FontFamily {
    /// Returns the font family string for CSS-style font declarations.
    #[must_use]
    pub fn as_css_family(&self) -> &str {
        match self {
            Self::Serif => "serif",
            Self::SansSerif => "sans-serif",
            Self::Monospace => "monospace",
            Self::Named(name) => name,
        }
    }

    /// Parses a CSS `font-family` value.
    ///
    /// Only the first entry of a comma-separated list is used. Surrounding quotes are removed
    /// and the generic keywords map to their variants. An empty value resolves to
    /// [`FontFamily::SansSerif`].
    #[must_use]
    pub fn from_css(value: &str) -> Self {
        let first = value.split(',').next().unwrap_or("").trim();
        let first = first.trim_matches(|c| c == '"' || c == '\'').trim();
        match first {
            "" | "sans-serif" => Self::SansSerif,
            "serif" => Self::Serif,
            "monospace" => Self::Monospace,
            name => Self::Named(Arc::from(name)),
        }
    }
}

/// CSS-style font weights.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontWeight(pub u16);

impl FontWeight {
    /// Light weight (`300`).
    pub const LIGHT: Self = Self(300);
    /// Normal weight (`400`).
    pub const NORMAL: Self = Self(400);
    /// Bold weight (`700`).
    pub const BOLD: Self = Self(700);

    /// Parses a CSS `font-weight` value.
    ///
    /// Accepts the keywords `normal`, `bold`, `bolder`, `lighter` and numeric weights in
    /// `1..=1000`. Relative keywords resolve against normal. Anything else is normal.
    #[must_use]
    pub fn from_css(value: &str) -> Self {
        let value = value.trim();
        match value {
            "normal" => Self::NORMAL,
            "bold" | "bolder" => Self::BOLD,
            "lighter" => Self::LIGHT,
            _ => match value.parse::<u16>() {
                Ok(w) if (1..=1000).contains(&w) => Self(w),
                _ => Self::NORMAL,
            },
        }
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// CSS-style font styles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontStyle {
    /// Normal style.
    Normal,
    /// Italic style.
    Italic,
    /// Oblique style.
    Oblique,
}

/// Measured metrics for a single line of text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextMetrics {
    /// The advance width (useful for horizontal layout).
    pub advance_width: f64,
    /// Distance from baseline to the top of typical glyphs.
    pub ascent: f64,
    /// Distance from baseline to the bottom of typical glyphs.
    pub descent: f64,
    /// Additional line spacing beyond ascent+descent.
    pub leading: f64,
}

impl TextMetrics {
    /// Metrics of an empty line.
    pub const ZERO: Self = Self {
        advance_width: 0.0,
        ascent: 0.0,
        descent: 0.0,
        leading: 0.0,
    };

    /// Returns `ascent + descent + leading`.
    #[must_use]
    pub fn line_height(&self) -> f64 {
        self.ascent + self.descent + self.leading
    }
}

/// A deterministic heuristic text measurer.
///
/// It assumes an average glyph width of `char_width_em` (0.6em by default) and a baseline at
/// 0.8em. Font family and weight are ignored, which keeps the output reproducible in headless
/// environments. This measurer never fails.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeuristicTextMeasurer {
    /// Average advance of a single character, in ems.
    pub char_width_em: f64,
    /// Ascent, in ems.
    pub ascent_em: f64,
    /// Descent, in ems.
    pub descent_em: f64,
}

impl HeuristicTextMeasurer {
    /// The default measurer (`0.6em` per character).
    pub const DEFAULT: Self = Self {
        char_width_em: 0.6,
        ascent_em: 0.8,
        descent_em: 0.2,
    };

    /// Creates the default heuristic measurer.
    #[must_use]
    pub const fn new() -> Self {
        Self::DEFAULT
    }

    /// Sets the average character width in ems.
    #[must_use]
    pub fn with_char_width_em(mut self, char_width_em: f64) -> Self {
        self.char_width_em = char_width_em.max(0.0);
        self
    }

    /// Width of `text` at `font_size`: `clusters * font_size * char_width_em`.
    ///
    /// Counts extended grapheme clusters, so a flag or an accented letter built from a combining
    /// mark is one character wide.
    #[must_use]
    pub fn width(&self, text: &str, font_size: f64) -> f64 {
        self.char_width_em * font_size * text.graphemes(true).count() as f64
    }

    /// Infallible counterpart of [`TextMeasurer::measure`].
    #[must_use]
    pub fn metrics(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let font_size = style.sanitized_font_size();
        TextMetrics {
            advance_width: self.width(text, font_size),
            ascent: self.ascent_em * font_size,
            descent: self.descent_em * font_size,
            leading: 0.0,
        }
    }
}

impl Default for HeuristicTextMeasurer {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TextMeasurer for HeuristicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> Result<TextMetrics, MeasureError> {
        Ok(self.metrics(text, style))
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn heuristic_width_is_linear_in_chars_and_size() {
        let m = HeuristicTextMeasurer::new();
        let metrics = m.measure("China", &TextStyle::new(10.0)).unwrap();
        assert!(
            (metrics.advance_width - 30.0).abs() < 1e-9,
            "5 chars * 10px * 0.6 should be 30, got {}",
            metrics.advance_width
        );
        assert!((metrics.line_height() - 10.0).abs() < 1e-9, "line height is 1em");
    }

    #[test]
    fn heuristic_counts_chars_not_bytes() {
        let m = HeuristicTextMeasurer::new();
        assert!(
            (m.width("Zürich", 10.0) - 36.0).abs() < 1e-9,
            "multi-byte chars count once"
        );
    }

    #[test]
    fn heuristic_counts_grapheme_clusters() {
        let m = HeuristicTextMeasurer::new();
        assert!(
            (m.width("Cafe\u{301}", 10.0) - 24.0).abs() < 1e-9,
            "a combining accent joins its base letter"
        );
        assert!(
            (m.width("ab\u{1F1FA}\u{1F1F8}", 10.0) - 18.0).abs() < 1e-9,
            "a regional-indicator pair is one flag"
        );
    }

    #[test]
    fn heuristic_treats_invalid_font_size_as_zero() {
        let m = HeuristicTextMeasurer::new();
        let metrics = m.metrics("abc", &TextStyle::new(f64::NAN));
        assert_eq!(metrics, TextMetrics::ZERO, "NaN size measures as zero");
        let metrics = m.metrics("abc", &TextStyle::new(-4.0));
        assert_eq!(metrics.advance_width, 0.0, "negative size measures as zero");
    }

    #[test]
    fn font_family_parses_first_css_entry() {
        assert_eq!(
            FontFamily::from_css("'Helvetica Neue', Arial, sans-serif"),
            FontFamily::Named(Arc::from("Helvetica Neue")),
            "quotes are stripped from the first entry"
        );
        assert_eq!(
            FontFamily::from_css(" monospace "),
            FontFamily::Monospace,
            "generic keyword"
        );
        assert_eq!(FontFamily::from_css(""), FontFamily::SansSerif, "empty list");
        assert_eq!(
            FontFamily::from_css("Arial").as_css_family(),
            "Arial",
            "named family round-trips"
        );
    }

    #[test]
    fn font_weight_parses_keywords_and_numbers() {
        for (css, expected) in [
            ("bold", FontWeight::BOLD),
            ("normal", FontWeight::NORMAL),
            ("600", FontWeight(600)),
            ("lighter", FontWeight::LIGHT),
            ("0", FontWeight::NORMAL),
            ("heavy", FontWeight::NORMAL),
        ] {
            assert_eq!(FontWeight::from_css(css), expected, "weight {css:?}");
        }
    }

    #[test]
    fn references_and_boxes_forward_measurement() {
        let boxed: Box<dyn TextMeasurer> = Box::new(HeuristicTextMeasurer::new());
        let style = TextStyle::new(12.0);
        assert_eq!(
            boxed.measure("USA", &style),
            (&HeuristicTextMeasurer::new()).measure("USA", &style),
            "boxed and borrowed measurers agree"
        );
    }
}
