// Copyright 2025 the labelfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Truncation and wrapping for labels that still overflow after shrinking.
//!
//! A [`FitResult`](crate::FitResult) with `overflows` set leaves the decision to the caller;
//! these helpers cover the two usual answers. Both measure through the estimator's backend and
//! redo the whole operation with the heuristic if any measurement fails.

extern crate alloc;

use alloc::borrow::ToOwned;
use alloc::string::String;
use alloc::vec::Vec;

use labelfit_text::{TextMeasurer, TextMetrics, TextStyle};
use unicode_segmentation::UnicodeSegmentation;

use crate::LabelLayoutEstimator;

impl<M: TextMeasurer> LabelLayoutEstimator<M> {
    /// Shortens `text` so that it plus `ellipsis` fits into `max_width`.
    ///
    /// Text is cut between grapheme clusters, so flags and combining marks are kept whole.
    /// Text that already fits is returned unchanged. If not even the ellipsis fits the result
    /// is empty.
    pub fn truncate_to_width(
        &self,
        text: &str,
        style: &TextStyle,
        max_width: f64,
        ellipsis: &str,
    ) -> String {
        match truncate_with(text, style, max_width, ellipsis, |t, s| {
            self.backend_metrics(t, s)
        }) {
            Ok(out) => out,
            Err(err) => {
                tracing::debug!(%err, "truncation measured with heuristic fallback");
                let Ok(out) = truncate_with(text, style, max_width, ellipsis, |t, s| {
                    self.heuristic_metrics(t, s)
                });
                out
            }
        }
    }

    /// Greedily wraps `text` into lines no wider than `max_width`.
    ///
    /// Explicit `\n` breaks are kept. A word wider than `max_width` gets a line of its own
    /// rather than being split. Always returns at least one line.
    pub fn wrap_to_width(&self, text: &str, style: &TextStyle, max_width: f64) -> Vec<String> {
        match wrap_with(text, style, max_width, |t, s| self.backend_metrics(t, s)) {
            Ok(lines) => lines,
            Err(err) => {
                tracing::debug!(%err, "wrapping measured with heuristic fallback");
                let Ok(lines) = wrap_with(text, style, max_width, |t, s| {
                    self.heuristic_metrics(t, s)
                });
                lines
            }
        }
    }
}

fn budget(max_width: f64) -> f64 {
    if max_width.is_nan() {
        0.0
    } else {
        max_width.max(0.0)
    }
}

fn truncate_with<E>(
    text: &str,
    style: &TextStyle,
    max_width: f64,
    ellipsis: &str,
    mut measure: impl FnMut(&str, &TextStyle) -> Result<TextMetrics, E>,
) -> Result<String, E> {
    let max_width = budget(max_width);
    if measure(text, style)?.advance_width <= max_width {
        return Ok(text.to_owned());
    }
    if measure(ellipsis, style)?.advance_width > max_width {
        return Ok(String::new());
    }

    // Byte offsets of every cluster boundary after the first cluster.
    let ends: Vec<usize> = text
        .grapheme_indices(true)
        .skip(1)
        .map(|(i, _)| i)
        .chain(core::iter::once(text.len()))
        .collect();

    let mut candidate = String::with_capacity(text.len() + ellipsis.len());
    let mut fits = |clusters: usize| -> Result<bool, E> {
        candidate.clear();
        if clusters > 0 {
            candidate.push_str(text[..ends[clusters - 1]].trim_end());
        }
        candidate.push_str(ellipsis);
        Ok(measure(&candidate, style)?.advance_width <= max_width)
    };

    // Largest prefix length that fits; zero clusters always fits here.
    let (mut lo, mut hi) = (0_usize, ends.len());
    while lo < hi {
        let mid = lo + (hi - lo).div_ceil(2);
        if fits(mid)? {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }

    let mut out = String::new();
    if lo > 0 {
        out.push_str(text[..ends[lo - 1]].trim_end());
    }
    out.push_str(ellipsis);
    Ok(out)
}

fn wrap_with<E>(
    text: &str,
    style: &TextStyle,
    max_width: f64,
    mut measure: impl FnMut(&str, &TextStyle) -> Result<TextMetrics, E>,
) -> Result<Vec<String>, E> {
    let max_width = budget(max_width);
    let mut lines = Vec::new();

    for source_line in text.split('\n') {
        let mut current = String::new();
        for word in source_line.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let width = {
                let mut candidate = String::with_capacity(current.len() + 1 + word.len());
                candidate.push_str(&current);
                candidate.push(' ');
                candidate.push_str(word);
                measure(&candidate, style)?.advance_width
            };
            if width <= max_width {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(core::mem::take(&mut current));
                current.push_str(word);
            }
        }
        lines.push(current);
    }

    Ok(lines)
}
