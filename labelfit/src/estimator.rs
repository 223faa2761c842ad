// Copyright 2025 the labelfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Label measurement and shrink-to-fit.
//!
//! [`LabelLayoutEstimator`] wraps a [`TextMeasurer`] backend and a deterministic
//! [`HeuristicTextMeasurer`]. Every operation measures through the backend first; if the backend
//! fails for *any* label of a pass, the whole pass is redone with the heuristic, so a result is
//! never a mix of shaped and estimated widths.

extern crate alloc;

use alloc::vec::Vec;
use core::convert::Infallible;

use labelfit_text::{
    FontFamily, FontWeight, HeuristicTextMeasurer, MeasureError, TextMeasurer, TextMetrics,
    TextStyle,
};

use crate::label::{
    FitResult, LabelSpec, LayoutBudget, MeasurementResult, MeasurementSource, sanitize,
};

/// Upper bound on shrink passes.
///
/// The first pass scales linearly; further passes only run for backends whose widths are not
/// linear in font size.
const MAX_SHRINK_PASSES: usize = 4;

/// Bisection steps used when shrink passes did not converge.
const MAX_BISECT_STEPS: usize = 16;

/// Relative slack below which a re-measured width counts as fitting.
const WIDTH_TOLERANCE: f64 = 1e-9;

/// Measures label sets and fits them into a pixel budget.
///
/// The estimator holds no mutable state; every call is an independent computation over its
/// arguments.
#[derive(Clone, Copy, Debug)]
pub struct LabelLayoutEstimator<M = HeuristicTextMeasurer> {
    measurer: M,
    fallback: HeuristicTextMeasurer,
}

impl LabelLayoutEstimator {
    /// An estimator that only uses the heuristic measurer.
    ///
    /// Its output is reproducible on any host.
    pub const fn heuristic() -> Self {
        Self {
            measurer: HeuristicTextMeasurer::DEFAULT,
            fallback: HeuristicTextMeasurer::DEFAULT,
        }
    }
}

impl Default for LabelLayoutEstimator {
    fn default() -> Self {
        Self::heuristic()
    }
}

impl<M: TextMeasurer> LabelLayoutEstimator<M> {
    /// Creates an estimator measuring through `measurer`, falling back to the default
    /// heuristic.
    pub fn new(measurer: M) -> Self {
        Self {
            measurer,
            fallback: HeuristicTextMeasurer::DEFAULT,
        }
    }

    /// Replaces the fallback heuristic.
    #[must_use]
    pub fn with_fallback(mut self, fallback: HeuristicTextMeasurer) -> Self {
        self.fallback = fallback;
        self
    }

    /// The measurement backend.
    pub fn measurer(&self) -> &M {
        &self.measurer
    }

    /// The heuristic used when the backend is unavailable.
    pub fn fallback(&self) -> &HeuristicTextMeasurer {
        &self.fallback
    }

    /// Width in pixels of `text` set in the given font.
    ///
    /// Empty text is `0`. If the backend cannot measure, the width is
    /// `clusters * font_size_px * 0.6` (with the default fallback), counting grapheme clusters.
    pub fn measure_width(
        &self,
        text: &str,
        font_family: &FontFamily,
        font_size_px: f64,
        font_weight: FontWeight,
    ) -> f64 {
        let style = TextStyle::new(sanitize(font_size_px))
            .with_family(font_family.clone())
            .with_weight(font_weight);
        self.metrics(text, &style).advance_width
    }

    /// Metrics for a single line of text, falling back to the heuristic on failure.
    pub fn metrics(&self, text: &str, style: &TextStyle) -> TextMetrics {
        self.metrics_from(MeasurementSource::Backend, text, style)
    }

    /// Measures one label at its nominal size.
    pub fn measure_label(&self, label: &LabelSpec) -> MeasurementResult {
        MeasurementResult {
            text: label.text.clone(),
            width_px: self.metrics(&label.text, &label.style()).advance_width,
        }
    }

    /// Fits a label set into `budget`.
    ///
    /// Every label is scaled by the same factor. The factor is `1` when the widest label already
    /// fits; otherwise it is `available / widest`, clamped so no label renders below the budget's
    /// floor. If the set cannot fit above the floor, the largest label settles at the floor and
    /// [`FitResult::overflows`] is set. That includes sets whose widest label is held at the floor
    /// already. The reported width is re-measured at the adjusted sizes.
    pub fn fit_label_set(&self, labels: &[LabelSpec], budget: LayoutBudget) -> FitResult {
        match fit_with(labels, &budget, MeasurementSource::Backend, |text, style| {
            self.backend_metrics(text, style)
        }) {
            Ok(fit) => fit,
            Err(err) => {
                tracing::debug!(
                    %err,
                    labels = labels.len(),
                    "label set measured with heuristic fallback"
                );
                let Ok(fit) = fit_with(labels, &budget, MeasurementSource::Heuristic, |t, s| {
                    self.heuristic_metrics(t, s)
                });
                fit
            }
        }
    }

    /// Per-label widths at the sizes chosen by `fit`.
    ///
    /// Uses the same measurer that produced `fit`.
    pub fn measure_label_set(
        &self,
        labels: &[LabelSpec],
        fit: &FitResult,
    ) -> Vec<MeasurementResult> {
        self.label_set_metrics(labels, fit)
            .into_iter()
            .zip(labels)
            .map(|(metrics, label)| MeasurementResult {
                text: label.text.clone(),
                width_px: metrics.advance_width,
            })
            .collect()
    }

    /// Per-label metrics at the sizes chosen by `fit`.
    pub(crate) fn label_set_metrics(
        &self,
        labels: &[LabelSpec],
        fit: &FitResult,
    ) -> Vec<TextMetrics> {
        if fit.source == MeasurementSource::Backend {
            match metrics_at(labels, fit, |t, s| self.backend_metrics(t, s)) {
                Ok(metrics) => return metrics,
                Err(err) => {
                    tracing::debug!(
                        %err,
                        labels = labels.len(),
                        "label set re-measured with heuristic fallback"
                    );
                }
            }
        }
        let Ok(metrics) = metrics_at(labels, fit, |t, s| self.heuristic_metrics(t, s));
        metrics
    }

    /// Metrics for one line, honoring the source a surrounding pass settled on.
    pub(crate) fn metrics_from(
        &self,
        source: MeasurementSource,
        text: &str,
        style: &TextStyle,
    ) -> TextMetrics {
        if source == MeasurementSource::Backend {
            match self.backend_metrics(text, style) {
                Ok(metrics) => return metrics,
                Err(err) => {
                    tracing::debug!(%err, "text measured with heuristic fallback");
                }
            }
        }
        let Ok(metrics) = self.heuristic_metrics(text, style);
        metrics
    }

    pub(crate) fn backend_metrics(
        &self,
        text: &str,
        style: &TextStyle,
    ) -> Result<TextMetrics, MeasureError> {
        if text.is_empty() {
            return Ok(TextMetrics::ZERO);
        }
        let m = self.measurer.measure(text, style)?;
        if !(m.advance_width.is_finite() && m.ascent.is_finite() && m.descent.is_finite()) {
            return Err(MeasureError::Failed);
        }
        Ok(TextMetrics {
            advance_width: m.advance_width.max(0.0),
            ascent: m.ascent.max(0.0),
            descent: m.descent.max(0.0),
            leading: sanitize(m.leading),
        })
    }

    pub(crate) fn heuristic_metrics(
        &self,
        text: &str,
        style: &TextStyle,
    ) -> Result<TextMetrics, Infallible> {
        if text.is_empty() {
            return Ok(TextMetrics::ZERO);
        }
        Ok(self.fallback.metrics(text, style))
    }
}

/// `margin = max_label_width + padding`.
pub fn compute_margin(fit_result: &FitResult, padding_px: f64) -> f64 {
    fit_result.max_label_width_px + padding_px
}

fn fit_with<E>(
    labels: &[LabelSpec],
    budget: &LayoutBudget,
    source: MeasurementSource,
    mut measure: impl FnMut(&str, &TextStyle) -> Result<TextMetrics, E>,
) -> Result<FitResult, E> {
    let floor = budget.effective_min_font_size();
    let available = budget.sanitized_available();

    if labels.is_empty() {
        return Ok(FitResult {
            scale_factor: 1.0,
            adjusted_font_size_px: floor,
            max_label_width_px: 0.0,
            min_font_size_px: floor,
            overflows: false,
            source,
        });
    }

    let nominal = labels
        .iter()
        .map(LabelSpec::nominal_font_size)
        .fold(0.0, f64::max);
    // Smallest useful scale: the largest label renders at the floor.
    let floor_scale = if nominal > floor { floor / nominal } else { 1.0 };
    let limit = available * (1.0 + WIDTH_TOLERANCE);

    let mut scale = 1.0_f64;
    let mut widest = widest_at(labels, scale, floor, &mut measure)?;
    let mut passes = 0;
    while widest.width > limit
        && !widest.at_floor
        && scale > floor_scale
        && passes < MAX_SHRINK_PASSES
    {
        let next = (scale * available / widest.width).max(floor_scale);
        let remeasured = widest_at(labels, next, floor, &mut measure)?;
        let stalled = remeasured.width >= widest.width;
        scale = next;
        widest = remeasured;
        passes += 1;
        if stalled {
            break;
        }
    }
    if widest.width > limit && scale > floor_scale {
        let at_floor = widest_at(labels, floor_scale, floor, &mut measure)?;
        if at_floor.width > limit {
            // Nothing above the floor fits; settle there.
            scale = floor_scale;
            widest = at_floor;
        } else {
            // The floor fits but the passes did not converge: bisect between the two.
            let (mut lo, mut hi) = (floor_scale, scale);
            widest = at_floor;
            for _ in 0..MAX_BISECT_STEPS {
                let mid = 0.5 * (lo + hi);
                let candidate = widest_at(labels, mid, floor, &mut measure)?;
                if candidate.width > limit {
                    hi = mid;
                } else {
                    lo = mid;
                    widest = candidate;
                }
            }
            scale = lo;
        }
    }

    let at_floor = scale <= floor_scale;
    let mut max_width = widest.width;
    if !at_floor && max_width > available && max_width <= limit {
        // Rounding noise from re-measuring at the scaled size.
        max_width = available;
    }
    let overflows = max_width > available;
    let adjusted = if at_floor {
        floor
    } else {
        (nominal * scale).max(floor)
    };

    tracing::trace!(
        labels = labels.len(),
        nominal,
        adjusted,
        scale,
        max_width,
        available,
        overflows,
        "fitted label set"
    );

    Ok(FitResult {
        scale_factor: scale,
        adjusted_font_size_px: adjusted,
        max_label_width_px: max_width,
        min_font_size_px: floor,
        overflows,
        source,
    })
}

/// The widest label of a pass.
#[derive(Clone, Copy, Debug)]
struct Widest {
    width: f64,
    /// The widest label renders at the floor, so scaling cannot narrow it.
    at_floor: bool,
}

fn widest_at<E>(
    labels: &[LabelSpec],
    scale: f64,
    floor: f64,
    measure: &mut impl FnMut(&str, &TextStyle) -> Result<TextMetrics, E>,
) -> Result<Widest, E> {
    let mut widest = Widest {
        width: 0.0,
        at_floor: false,
    };
    for label in labels {
        let scaled = label.nominal_font_size() * scale;
        let metrics = measure(&label.text, &label.style_at(scaled.max(floor)))?;
        if metrics.advance_width > widest.width {
            widest = Widest {
                width: metrics.advance_width,
                at_floor: scaled <= floor,
            };
        }
    }
    Ok(widest)
}

fn metrics_at<E>(
    labels: &[LabelSpec],
    fit: &FitResult,
    mut measure: impl FnMut(&str, &TextStyle) -> Result<TextMetrics, E>,
) -> Result<Vec<TextMetrics>, E> {
    labels
        .iter()
        .map(|label| {
            let size = fit.font_size_for(label.font_size_px);
            measure(&label.text, &label.style_at(size))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    #[test]
    fn empty_text_is_zero_width() {
        let estimator = LabelLayoutEstimator::heuristic();
        let w = estimator.measure_width("", &FontFamily::SansSerif, 12.0, FontWeight::NORMAL);
        assert_eq!(w, 0.0, "empty text has no advance");
    }

    #[test]
    fn measure_label_uses_nominal_size() {
        let estimator = LabelLayoutEstimator::heuristic();
        let m = estimator.measure_label(&LabelSpec::new("China", 12.0));
        assert_eq!(m.text, "China", "text is carried through");
        assert!((m.width_px - 36.0).abs() < 1e-9, "got {}", m.width_px);
    }

    #[test]
    fn label_set_widths_follow_the_fit() {
        let estimator = LabelLayoutEstimator::heuristic();
        let labels = vec![LabelSpec::new("aaaaaaaaaa", 20.0), LabelSpec::new("bb", 10.0)];
        let fit = estimator.fit_label_set(&labels, LayoutBudget::new(60.0, 2.0));
        assert!((fit.scale_factor - 0.5).abs() < 1e-9, "got {}", fit.scale_factor);

        let widths = estimator.measure_label_set(&labels, &fit);
        assert_eq!(widths.len(), 2, "one width per label");
        assert!((widths[0].width_px - 60.0).abs() < 1e-9, "got {}", widths[0].width_px);
        // 10px * 0.5 = 5px, two chars at 0.6em.
        assert!((widths[1].width_px - 6.0).abs() < 1e-9, "got {}", widths[1].width_px);
    }

    #[test]
    fn labels_below_the_floor_are_raised_to_it() {
        let estimator = LabelLayoutEstimator::heuristic();
        let labels = vec![LabelSpec::new("ab", 4.0)];
        let fit = estimator.fit_label_set(&labels, LayoutBudget::new(100.0, 6.0));
        assert_eq!(fit.scale_factor, 1.0, "nothing to shrink");
        assert_eq!(fit.adjusted_font_size_px, 6.0, "raised to the floor");
        assert!((fit.max_label_width_px - 7.2).abs() < 1e-9, "measured at the floor");
    }

    #[test]
    fn unbounded_budget_never_shrinks() {
        let estimator = LabelLayoutEstimator::heuristic();
        let labels = vec![LabelSpec::new("a very long label indeed", 30.0)];
        let fit = estimator.fit_label_set(&labels, LayoutBudget::default());
        assert_eq!(fit.scale_factor, 1.0, "unbounded width never scales");
        assert_eq!(fit.adjusted_font_size_px, 30.0, "nominal size kept");
        assert!(!fit.overflows, "nothing overflows an unbounded budget");
    }
}
