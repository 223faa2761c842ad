// Copyright 2025 the labelfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Label fitting demos for `labelfit`.
//!
//! Renders the same grouped bar chart into views of decreasing size and writes one SVG per
//! view. Set `RUST_LOG=labelfit=trace` to follow the fitting decisions.
mod svg;

use kurbo::{Point, Rect};
use labelfit::{
    LabelLayoutEstimator, LabelSpec, LayoutBudget, LegendOrient, LegendPlacement, LegendSpec,
    MarginLayout, MarginSpec, NumberFormat, SideLabels, Size, TextMeasurer, TitleSpec,
    format_number,
};
use peniko::Color;
use peniko::color::palette::css;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::svg::{Anchor, SvgDocument, Text};

const PLOT_BACKGROUND: Color = Color::from_rgba8(245, 245, 245, 255);
const SERIES_COLORS: [Color; 2] = [css::STEEL_BLUE, css::DARK_ORANGE];

/// Share of final energy use per sector.
#[derive(Debug)]
struct EnergyShares {
    sectors: Vec<&'static str>,
    series: Vec<(&'static str, Vec<f64>)>,
}

fn energy_shares() -> EnergyShares {
    EnergyShares {
        sectors: vec![
            "Residential buildings",
            "Commercial & public services",
            "Transport",
            "Industry",
            "Agriculture, forestry & fishing",
        ],
        series: vec![
            ("2013", vec![0.262, 0.091, 0.318, 0.286, 0.043]),
            ("2023", vec![0.271, 0.084, 0.295, 0.302, 0.048]),
        ],
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let estimator = LabelLayoutEstimator::new(demo_measurer());
    let data = energy_shares();

    for (name, view_size) in [
        ("wide", Size::new(720.0, 360.0)),
        ("medium", Size::new(480.0, 300.0)),
        ("narrow", Size::new(300.0, 240.0)),
    ] {
        let (layout, svg) = render_bar_chart(&estimator, &data, view_size);
        tracing::info!(
            view = name,
            width = view_size.width,
            height = view_size.height,
            overflows = layout.overflows(),
            "rendered chart"
        );
        let path = format!("labelfit_demo_{name}.svg");
        std::fs::write(&path, svg).expect("write demo svg");
        println!(
            "wrote {path}: plot {:.0}x{:.0}, left labels at {:.1}px{}",
            layout.plot.width(),
            layout.plot.height(),
            layout
                .axis_left
                .map_or(0.0, |a| a.measured.fit.adjusted_font_size_px),
            if layout.overflows() { " (overflow)" } else { "" },
        );
    }
}

fn demo_measurer() -> Box<dyn TextMeasurer> {
    #[cfg(feature = "parley")]
    {
        Box::new(labelfit_text_parley::ParleyTextMeasurer::new())
    }

    #[cfg(not(feature = "parley"))]
    {
        Box::new(labelfit::HeuristicTextMeasurer::new())
    }
}

fn ticks() -> Vec<f64> {
    (0..=4).map(|i| f64::from(i) * 0.1).collect()
}

fn render_bar_chart<M: TextMeasurer>(
    estimator: &LabelLayoutEstimator<M>,
    data: &EnergyShares,
    view_size: Size,
) -> (MarginLayout, String) {
    let category_labels: Vec<LabelSpec> = data
        .sectors
        .iter()
        .map(|s| LabelSpec::new(*s, 12.0))
        .collect();
    let tick_labels: Vec<LabelSpec> = ticks()
        .into_iter()
        .map(|t| {
            LabelSpec::from_css(
                format_number(t, NumberFormat::Percent(0)),
                "ui-monospace, monospace",
                11.0,
                "normal",
            )
        })
        .collect();
    let legend_labels: Vec<LabelSpec> = data
        .series
        .iter()
        .map(|(name, _)| LabelSpec::new(*name, 11.0))
        .collect();

    // Category names may take at most a third of the view.
    let category_budget = LayoutBudget::new(view_size.width / 3.0, 8.0);
    let narrow = view_size.width < 400.0;
    let title = TitleSpec::new(LabelSpec::from_css(
        "Final energy use by sector",
        "Georgia, serif",
        18.0,
        "bold",
    ))
    .with_subtitle(LabelSpec::new(
        "Share of total consumption, 2013 vs 2023",
        12.0,
    ));
    // Narrow views slant the tick labels so neighbours do not collide.
    let value_axis = SideLabels::new(tick_labels.clone(), LayoutBudget::default())
        .with_label_angle(if narrow { 45.0 } else { 0.0 });
    let legend = LegendSpec::new(legend_labels.clone(), LayoutBudget::default()).with_placement(
        LegendPlacement {
            orient: if narrow {
                LegendOrient::Bottom
            } else {
                LegendOrient::Right
            },
            ..LegendPlacement::default()
        },
    );
    let spec = MarginSpec {
        view_size,
        outer_padding: 8.0,
        title: Some(title),
        axis_left: Some(SideLabels::new(category_labels.clone(), category_budget)),
        axis_bottom: Some(value_axis),
        legend: Some(legend),
        ..MarginSpec::default()
    };
    let layout = MarginLayout::arrange(estimator, &spec);

    let mut doc = SvgDocument::new(layout.view);
    doc.rect(layout.view, Color::WHITE);
    doc.rect(layout.plot, PLOT_BACKGROUND);

    draw_title(&mut doc, estimator, &spec, &layout);
    draw_bars(&mut doc, data, layout.plot);
    draw_category_axis(
        &mut doc,
        estimator,
        &category_labels,
        category_budget,
        &spec,
        &layout,
    );
    draw_value_axis(&mut doc, estimator, &tick_labels, &spec, &layout);
    draw_legend(&mut doc, estimator, &legend_labels, &spec, &layout);

    (layout, doc.to_svg_string())
}

fn draw_title<M: TextMeasurer>(
    doc: &mut SvgDocument,
    estimator: &LabelLayoutEstimator<M>,
    spec: &MarginSpec,
    layout: &MarginLayout,
) {
    let (Some(title), Some(placed)) = (&spec.title, layout.title) else {
        return;
    };
    let fit = placed.measured.fit;
    let mut y = placed.rect.y0 + title.padding;
    for (i, label) in std::iter::once(&title.title)
        .chain(title.subtitle.as_ref())
        .enumerate()
    {
        if i > 0 {
            y += title.subtitle_gap;
        }
        let font_size = fit.font_size_for(label.font_size_px);
        let line_height = estimator
            .metrics(&label.text, &label.style_at(font_size))
            .line_height();
        let mut text = Text::for_label(
            Point::new(placed.rect.x0, y + line_height / 2.0),
            &label.text,
            label,
            font_size,
        );
        text.fill = if i == 0 { Color::BLACK } else { css::DIM_GRAY };
        doc.text(&text);
        y += line_height;
    }
}

fn draw_bars(doc: &mut SvgDocument, data: &EnergyShares, plot: Rect) {
    let max = ticks().last().copied().unwrap_or(1.0);
    let band = plot.height() / data.sectors.len().max(1) as f64;
    let inner = band * 0.8;
    let bar_h = inner / data.series.len().max(1) as f64;

    for (s, (_, values)) in data.series.iter().enumerate() {
        for (row, value) in values.iter().enumerate() {
            let y0 = plot.y0 + row as f64 * band + (band - inner) / 2.0 + s as f64 * bar_h;
            let x1 = plot.x0 + (value / max).clamp(0.0, 1.0) * plot.width();
            doc.rect(
                Rect::new(plot.x0, y0, x1, y0 + bar_h),
                SERIES_COLORS[s % SERIES_COLORS.len()],
            );
        }
    }
}

fn draw_category_axis<M: TextMeasurer>(
    doc: &mut SvgDocument,
    estimator: &LabelLayoutEstimator<M>,
    labels: &[LabelSpec],
    budget: LayoutBudget,
    spec: &MarginSpec,
    layout: &MarginLayout,
) {
    let (Some(side), Some(placed)) = (&spec.axis_left, layout.axis_left) else {
        return;
    };
    let fit = placed.measured.fit;
    let plot = layout.plot;
    let band = plot.height() / labels.len().max(1) as f64;
    let x = plot.x0 - side.tick_size - side.padding;

    for (row, label) in labels.iter().enumerate() {
        let y = plot.y0 + (row as f64 + 0.5) * band;
        doc.line(
            Point::new(plot.x0 - side.tick_size, y),
            Point::new(plot.x0, y),
            css::GRAY,
        );

        let font_size = fit.font_size_for(label.font_size_px);
        // At the floor the label may still be too wide; cut it instead of spilling over.
        let shown = if fit.overflows {
            estimator.truncate_to_width(
                &label.text,
                &label.style_at(font_size),
                budget.available_px,
                "…",
            )
        } else {
            label.text.clone()
        };
        let mut text = Text::for_label(Point::new(x, y), &shown, label, font_size);
        text.anchor = Anchor::End;
        doc.text(&text);
    }
}

fn draw_value_axis<M: TextMeasurer>(
    doc: &mut SvgDocument,
    estimator: &LabelLayoutEstimator<M>,
    labels: &[LabelSpec],
    spec: &MarginSpec,
    layout: &MarginLayout,
) {
    let (Some(side), Some(placed)) = (&spec.axis_bottom, layout.axis_bottom) else {
        return;
    };
    let fit = placed.measured.fit;
    let plot = layout.plot;
    let values = ticks();
    let max = values.last().copied().unwrap_or(1.0);

    for (value, label) in values.iter().zip(labels) {
        let x = plot.x0 + value / max * plot.width();
        doc.line(
            Point::new(x, plot.y1),
            Point::new(x, plot.y1 + side.tick_size),
            css::GRAY,
        );
        let font_size = fit.font_size_for(label.font_size_px);
        let line_height = estimator
            .metrics(&label.text, &label.style_at(font_size))
            .line_height();
        let mut text = Text::for_label(
            Point::new(x, plot.y1 + side.tick_size + side.padding + line_height / 2.0),
            &label.text,
            label,
            font_size,
        );
        if side.label_angle == 0.0 {
            text.anchor = Anchor::Middle;
        } else {
            // Slanted labels hang down-left from their tick.
            text.anchor = Anchor::End;
            text.angle = -side.label_angle;
        }
        doc.text(&text);
    }
}

fn draw_legend<M: TextMeasurer>(
    doc: &mut SvgDocument,
    estimator: &LabelLayoutEstimator<M>,
    labels: &[LabelSpec],
    spec: &MarginSpec,
    layout: &MarginLayout,
) {
    let (Some(legend), Some(placed)) = (&spec.legend, layout.legend) else {
        return;
    };
    let fit = placed.measured.fit;
    let row_height = placed.measured.row_height;
    let widths = estimator.measure_label_set(labels, &fit);
    let row = matches!(
        legend.placement.orient,
        LegendOrient::Top | LegendOrient::Bottom
    );

    let mut cursor = Point::new(placed.rect.x0, placed.rect.y0);
    for (i, (label, width)) in labels.iter().zip(&widths).enumerate() {
        let center_y = cursor.y + row_height / 2.0;
        let half = legend.swatch_size / 2.0;
        doc.rect(
            Rect::new(
                cursor.x,
                center_y - half,
                cursor.x + legend.swatch_size,
                center_y + half,
            ),
            SERIES_COLORS[i % SERIES_COLORS.len()],
        );
        let text = Text::for_label(
            Point::new(cursor.x + legend.swatch_size + legend.label_gap, center_y),
            &label.text,
            label,
            fit.font_size_for(label.font_size_px),
        );
        doc.text(&text);

        if row {
            cursor.x += legend.swatch_size + legend.label_gap + width.width_px + legend.entry_gap;
        } else {
            cursor.y += row_height + legend.entry_gap;
        }
    }
    doc.outline(placed.rect.inflate(2.0, 2.0), css::LIGHT_GRAY);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_views_shrink_category_labels() {
        let estimator = LabelLayoutEstimator::heuristic();
        let data = energy_shares();
        let (wide, _) = render_bar_chart(&estimator, &data, Size::new(720.0, 360.0));
        let (narrow, svg) = render_bar_chart(&estimator, &data, Size::new(300.0, 240.0));

        let size = |l: &MarginLayout| {
            l.axis_left
                .map(|a| a.measured.fit.adjusted_font_size_px)
                .unwrap_or_default()
        };
        assert!(size(&narrow) < size(&wide), "{} vs {}", size(&narrow), size(&wide));
        assert!(narrow.plot.width() > 0.0, "plot width {}", narrow.plot.width());
        assert!(svg.starts_with("<svg"), "{svg}");
        assert!(svg.contains(r#"font-family="Georgia""#), "title family: {svg}");
        assert!(svg.contains(r#"transform="rotate(-45"#), "slanted ticks: {svg}");
    }
}
