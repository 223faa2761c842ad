// Copyright 2025 the labelfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

extern crate std;

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::Cell;

use crate::{
    FitResult, FontFamily, FontWeight, HeuristicTextMeasurer, LabelLayoutEstimator, LabelSpec,
    LayoutBudget, MeasureError, MeasurementSource, TextMeasurer, TextMetrics, TextStyle,
    compute_margin,
};

const EPS: f64 = 1e-9;

fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() < EPS,
        "{what}: expected {expected}, got {actual}"
    );
}

fn labels(texts: &[&str], font_size_px: f64) -> Vec<LabelSpec> {
    texts
        .iter()
        .map(|t| LabelSpec::new(*t, font_size_px))
        .collect()
}

/// A backend that is never available.
#[derive(Debug)]
struct Offline;

impl TextMeasurer for Offline {
    fn measure(&self, _text: &str, _style: &TextStyle) -> Result<TextMetrics, MeasureError> {
        Err(MeasureError::Unavailable("offline"))
    }
}

/// A backend that refuses one specific string.
#[derive(Debug)]
struct RejectsText(&'static str);

impl TextMeasurer for RejectsText {
    fn measure(&self, text: &str, style: &TextStyle) -> Result<TextMetrics, MeasureError> {
        if text == self.0 {
            return Err(MeasureError::Failed);
        }
        HeuristicTextMeasurer::new()
            .with_char_width_em(0.5)
            .measure(text, style)
    }
}

/// A backend whose widths grow with the square of the font size, counting its calls.
#[derive(Debug, Default)]
struct Quadratic {
    calls: Cell<usize>,
}

impl TextMeasurer for Quadratic {
    fn measure(&self, text: &str, style: &TextStyle) -> Result<TextMetrics, MeasureError> {
        self.calls.set(self.calls.get() + 1);
        let size = style.sanitized_font_size();
        let chars = text.chars().count() as f64;
        Ok(TextMetrics {
            advance_width: chars * size * size / 20.0,
            ascent: size * 0.8,
            descent: size * 0.2,
            leading: 0.0,
        })
    }
}

/// A backend adding fixed side bearings, so proportional shrinking always falls short.
#[derive(Debug)]
struct Padded;

impl TextMeasurer for Padded {
    fn measure(&self, text: &str, style: &TextStyle) -> Result<TextMetrics, MeasureError> {
        let mut metrics = HeuristicTextMeasurer::new().metrics(text, style);
        metrics.advance_width += 10.0;
        Ok(metrics)
    }
}

#[test]
fn short_labels_fit_without_scaling() {
    let estimator = LabelLayoutEstimator::heuristic();
    let fit = estimator.fit_label_set(
        &labels(&["USA", "China"], 12.0),
        LayoutBudget::new(200.0, 8.0),
    );

    assert_eq!(fit.scale_factor, 1.0, "nothing to shrink");
    assert_eq!(fit.adjusted_font_size_px, 12.0, "nominal size kept");
    // "China" is the widest: 5 chars * 12px * 0.6.
    assert_close(fit.max_label_width_px, 36.0, "widest label");
    assert!(!fit.overflows, "fits the budget");
    assert_eq!(
        fit.source,
        MeasurementSource::Backend,
        "heuristic estimator measures through its backend"
    );
}

#[test]
fn long_label_stops_at_the_floor_and_overflows() {
    let estimator = LabelLayoutEstimator::heuristic();
    let text: String = "x".repeat(32);
    let fit = estimator.fit_label_set(
        &[LabelSpec::new(text, 16.0)],
        LayoutBudget::new(80.0, 8.0),
    );

    assert_close(fit.adjusted_font_size_px, 8.0, "adjusted size");
    assert_close(fit.scale_factor, 0.5, "scale factor");
    // 32 chars * 8px * 0.6.
    assert_close(fit.max_label_width_px, 153.6, "width at the floor");
    assert!(fit.overflows, "153.6px cannot fit into 80px");
}

#[test]
fn widest_label_held_at_the_floor_settles_the_set_at_the_floor() {
    let estimator = LabelLayoutEstimator::heuristic();
    // The small label is raised to the 6px floor: 25 * 6 * 0.6 = 90px, wider than the budget
    // no matter how far the 20px label shrinks.
    let set = vec![
        LabelSpec::new("aa", 20.0),
        LabelSpec::new("b".repeat(25), 2.0),
    ];
    let fit = estimator.fit_label_set(&set, LayoutBudget::new(80.0, 6.0));

    assert_eq!(fit.adjusted_font_size_px, 6.0, "largest label lands on the floor");
    assert_close(fit.scale_factor, 0.3, "scale that puts 20px on the floor");
    assert_close(fit.max_label_width_px, 90.0, "width of the pinned label");
    assert!(fit.overflows, "the pinned label cannot fit");
}

#[test]
fn empty_label_set_is_zero_width() {
    let estimator = LabelLayoutEstimator::heuristic();
    let fit = estimator.fit_label_set(&[], LayoutBudget::new(100.0, 8.0));

    assert_eq!(fit.max_label_width_px, 0.0, "no labels, no width");
    assert_eq!(fit.scale_factor, 1.0, "no labels, no scaling");
    assert!(!fit.overflows, "an empty set always fits");
    assert_eq!(compute_margin(&fit, 4.0), 4.0, "margin is padding only");
}

#[test]
fn margin_is_width_plus_padding() {
    let fit = FitResult {
        scale_factor: 1.0,
        adjusted_font_size_px: 12.0,
        max_label_width_px: 50.0,
        min_font_size_px: 8.0,
        overflows: false,
        source: MeasurementSource::Heuristic,
    };
    assert_eq!(compute_margin(&fit, 20.0), 70.0, "50 + 20");
    assert_eq!(fit.margin(20.0), 70.0, "shorthand agrees");
}

#[test]
fn scaled_labels_land_exactly_on_the_budget() {
    let estimator = LabelLayoutEstimator::heuristic();
    // 20 chars at 10px = 120px; a 90px budget scales by 0.75.
    let fit = estimator.fit_label_set(
        &labels(&["aaaaaaaaaaaaaaaaaaaa", "short"], 10.0),
        LayoutBudget::new(90.0, 4.0),
    );

    assert_close(fit.scale_factor, 0.75, "scale factor");
    assert_close(fit.adjusted_font_size_px, 7.5, "adjusted size");
    assert_close(fit.max_label_width_px, 90.0, "widest label");
    assert!(!fit.overflows, "shrinking above the floor fits");
}

#[test]
fn width_is_monotonic_in_font_size() {
    let estimator = LabelLayoutEstimator::heuristic();
    for text in ["", "a", "USA", "Exceptionally Long Category Name", "日本語"] {
        let mut prev = 0.0;
        for size in 1..=48 {
            let w = estimator.measure_width(
                text,
                &FontFamily::SansSerif,
                f64::from(size),
                FontWeight::NORMAL,
            );
            assert!(w >= prev, "{text:?} at {size}px: {w} < {prev}");
            prev = w;
        }
    }
}

#[test]
fn fitting_is_deterministic() {
    let estimator = LabelLayoutEstimator::heuristic();
    let set = labels(&["Alpha", "Beta", "Gamma Delta Epsilon"], 14.0);
    let budget = LayoutBudget::new(73.0, 6.0);
    assert_eq!(
        estimator.fit_label_set(&set, budget),
        estimator.fit_label_set(&set, budget),
        "same inputs, same fit"
    );
}

#[test]
fn refitting_at_the_adjusted_size_keeps_it() {
    let estimator = LabelLayoutEstimator::heuristic();
    let budget = LayoutBudget::new(60.0, 4.0);
    let first = estimator.fit_label_set(&labels(&["abcdefghijkl", "abc"], 12.0), budget);
    assert!(first.scale_factor < 1.0, "first fit shrinks");

    let again = estimator.fit_label_set(
        &labels(&["abcdefghijkl", "abc"], first.adjusted_font_size_px),
        budget,
    );
    assert_eq!(again.scale_factor, 1.0, "already fitted labels are not shrunk again");
    assert_close(
        again.adjusted_font_size_px,
        first.adjusted_font_size_px,
        "adjusted size",
    );
    assert_close(again.max_label_width_px, first.max_label_width_px, "widest label");
}

#[test]
fn floor_and_budget_hold_across_budgets() {
    let estimator = LabelLayoutEstimator::heuristic();
    let set = vec![
        LabelSpec::new("North America", 16.0),
        LabelSpec::new("EU", 11.0),
        LabelSpec::new("Asia-Pacific", 13.0),
    ];
    for available in [0.0, 1.0, 10.0, 33.3, 57.0, 100.0, 150.0, 1000.0] {
        for min_font in [0.0, 4.0, 8.0, 12.0, 20.0] {
            let fit = estimator.fit_label_set(&set, LayoutBudget::new(available, min_font));
            let floor = min_font.max(1.0);
            let ctx = format!("available {available}, min {min_font}: {fit:?}");

            assert!(fit.scale_factor > 0.0 && fit.scale_factor <= 1.0, "{ctx}");
            assert!(fit.adjusted_font_size_px >= floor, "{ctx}");
            for label in &set {
                assert!(fit.font_size_for(label.font_size_px) >= floor, "{ctx}");
            }
            if fit.overflows {
                assert!(fit.max_label_width_px > available, "{ctx}");
                assert_eq!(fit.adjusted_font_size_px, floor, "{ctx}");
            } else {
                assert!(fit.max_label_width_px <= available, "{ctx}");
            }
        }
    }
}

#[test]
fn margin_is_linear_in_padding() {
    let estimator = LabelLayoutEstimator::heuristic();
    let fit = estimator.fit_label_set(
        &labels(&["one", "three"], 12.0),
        LayoutBudget::new(30.0, 6.0),
    );
    for (p, q) in [(0.0, 1.0), (4.0, 8.0), (2.5, 10.25)] {
        assert_close(
            compute_margin(&fit, p + q),
            compute_margin(&fit, p) + q,
            "margin(p + q) = margin(p) + q",
        );
    }
}

#[test]
fn unavailable_backend_uses_the_heuristic() {
    let estimator = LabelLayoutEstimator::new(Offline);
    let w = estimator.measure_width("China", &FontFamily::SansSerif, 12.0, FontWeight::NORMAL);
    assert_close(w, 36.0, "fallback width");

    let fit = estimator.fit_label_set(
        &labels(&["USA", "China"], 12.0),
        LayoutBudget::new(200.0, 8.0),
    );
    assert_eq!(
        fit.source,
        MeasurementSource::Heuristic,
        "fit reports the fallback"
    );
    assert_close(fit.max_label_width_px, 36.0, "fallback widest label");
}

#[test]
fn one_failure_moves_the_whole_pass_to_the_heuristic() {
    let estimator = LabelLayoutEstimator::new(RejectsText("boom"));
    let heuristic = LabelLayoutEstimator::heuristic();
    let budget = LayoutBudget::new(40.0, 4.0);

    // Without the rejected label the backend's 0.5em widths are used.
    let clean = estimator.fit_label_set(&labels(&["abcdefghij"], 10.0), budget);
    assert_eq!(clean.source, MeasurementSource::Backend, "backend measured");
    assert_close(clean.scale_factor, 0.8, "backend scale");

    let set = labels(&["abcdefghij", "boom"], 10.0);
    let fit = estimator.fit_label_set(&set, budget);
    assert_eq!(fit.source, MeasurementSource::Heuristic, "whole pass fell back");
    let mut expected = heuristic.fit_label_set(&set, budget);
    expected.source = MeasurementSource::Heuristic;
    assert_eq!(fit, expected, "no mix of backend and heuristic widths");

    let widths = estimator.measure_label_set(&set, &fit);
    assert_close(widths[0].width_px, 40.0, "widest label at the fitted size");
    assert_close(
        widths[1].width_px,
        4.0 * fit.adjusted_font_size_px * 0.6,
        "rejected label measured by the heuristic",
    );
}

#[test]
fn non_linear_backends_are_re_measured() {
    let estimator = LabelLayoutEstimator::new(Quadratic::default());
    // 4 chars at 20px = 80px; scaling by 0.25 gives 5px text, 5px wide.
    let fit = estimator.fit_label_set(&labels(&["abcd"], 20.0), LayoutBudget::new(20.0, 1.0));

    assert_eq!(fit.source, MeasurementSource::Backend, "backend measured");
    assert_close(fit.scale_factor, 0.25, "one proportional pass");
    assert_close(fit.max_label_width_px, 5.0, "re-measured width");
    assert!(!fit.overflows, "fits after one pass");
    assert_eq!(
        estimator.measurer().calls.get(),
        2,
        "nominal pass plus one re-measurement"
    );
}

#[test]
fn slowly_converging_backends_still_fit_above_the_floor() {
    let estimator = LabelLayoutEstimator::new(Padded);
    // 10 chars * 0.6 * size + 10 fits 70px exactly at 10px, half the nominal size.
    let fit = estimator.fit_label_set(&labels(&["abcdefghij"], 20.0), LayoutBudget::new(70.0, 1.0));

    assert!(!fit.overflows, "a fitting scale exists: {fit:?}");
    assert!(fit.max_label_width_px <= 70.0, "within budget: {fit:?}");
    assert!(
        (fit.scale_factor - 0.5).abs() < 1e-3,
        "close to the exact scale: {fit:?}"
    );
    assert!(fit.adjusted_font_size_px > 1.0, "well above the floor: {fit:?}");
}

#[test]
fn invalid_inputs_do_not_poison_the_fit() {
    let estimator = LabelLayoutEstimator::heuristic();
    let set = vec![LabelSpec::new("abc", f64::NAN), LabelSpec::new("de", 10.0)];
    let fit = estimator.fit_label_set(&set, LayoutBudget::new(f64::NAN, f64::NAN));

    assert!(fit.scale_factor.is_finite(), "finite scale: {fit:?}");
    assert!(fit.max_label_width_px.is_finite(), "finite width: {fit:?}");
    assert_eq!(fit.min_font_size_px, 1.0, "NaN floor becomes 1px");
    assert!(fit.overflows, "a zero budget cannot hold text");
}
