// Copyright 2025 the labelfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A tiny measure/arrange pass that turns label sets into chart margins.
//!
//! - **Measure**: fit each guide's labels (axis labels, title, legend entries) with the
//!   [`LabelLayoutEstimator`] and derive the thickness each guide needs.
//! - **Arrange**: reserve that thickness around the plot rectangle inside the view.
//!
//! Scales and marks are built afterwards from [`MarginLayout::plot`].

extern crate alloc;

use alloc::vec::Vec;

use kurbo::Rect;
use labelfit_text::TextMeasurer;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt as _;
use crate::{FitResult, LabelLayoutEstimator, LabelSpec, LayoutBudget};

/// A width/height pair used by chart layout.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    /// Width in chart coordinate units.
    pub width: f64,
    /// Height in chart coordinate units.
    pub height: f64,
}

impl Size {
    /// Creates a size.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Space reserved on each side of the plot.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Margins {
    /// Space above the plot.
    pub top: f64,
    /// Space right of the plot.
    pub right: f64,
    /// Space below the plot.
    pub bottom: f64,
    /// Space left of the plot.
    pub left: f64,
}

impl Margins {
    /// No margins.
    pub const ZERO: Self = Self {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };

    /// The same margin on every side.
    pub const fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    /// `left + right`.
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    /// `top + bottom`.
    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }

    /// Shrinks `rect` by these margins. The result never has a negative size.
    pub fn inset(&self, rect: Rect) -> Rect {
        let x0 = rect.x0 + self.left;
        let y0 = rect.y0 + self.top;
        Rect::new(
            x0,
            y0,
            (rect.x1 - self.right).max(x0),
            (rect.y1 - self.bottom).max(y0),
        )
    }
}

/// Which side of the plot a guide sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Above the plot.
    Top,
    /// Right of the plot.
    Right,
    /// Below the plot.
    Bottom,
    /// Left of the plot.
    Left,
}

/// A label set placed along one side of the plot (axis tick labels, category names).
#[derive(Clone, Debug, PartialEq)]
pub struct SideLabels {
    /// Labels in display order.
    pub labels: Vec<LabelSpec>,
    /// Width budget for the widest label.
    pub budget: LayoutBudget,
    /// Tick length; only its magnitude reserves space.
    pub tick_size: f64,
    /// Gap between tick and label.
    pub padding: f64,
    /// Label rotation in degrees.
    pub label_angle: f64,
}

impl SideLabels {
    /// Creates a side label set with d3-style tick defaults (6px ticks, 3px padding).
    pub fn new(labels: Vec<LabelSpec>, budget: LayoutBudget) -> Self {
        Self {
            labels,
            budget,
            tick_size: 6.0,
            padding: 3.0,
            label_angle: 0.0,
        }
    }

    /// Sets the tick length.
    #[must_use]
    pub fn with_tick_size(mut self, tick_size: f64) -> Self {
        self.tick_size = tick_size;
        self
    }

    /// Sets the gap between tick and label.
    #[must_use]
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    /// Sets the label rotation in degrees.
    #[must_use]
    pub fn with_label_angle(mut self, label_angle: f64) -> Self {
        self.label_angle = label_angle;
        self
    }

    /// Fits the labels and measures the thickness this side needs along its normal.
    pub fn measure<M: TextMeasurer>(
        &self,
        side: Side,
        estimator: &LabelLayoutEstimator<M>,
    ) -> SideFit {
        let fit = estimator.fit_label_set(&self.labels, self.budget);
        let theta = if self.label_angle.is_finite() {
            self.label_angle.to_radians()
        } else {
            0.0
        };
        let sin = theta.sin().abs();
        let cos = theta.cos().abs();

        let mut label_extent = 0.0_f64;
        for metrics in estimator.label_set_metrics(&self.labels, &fit) {
            let w = metrics.advance_width;
            let h = metrics.line_height();
            let extent = match side {
                Side::Left | Side::Right => cos * w + sin * h,
                Side::Top | Side::Bottom => sin * w + cos * h,
            };
            label_extent = label_extent.max(extent);
        }

        let mut thickness = self.tick_size.abs();
        if !self.labels.is_empty() {
            thickness += self.padding.max(0.0) + label_extent;
        }

        SideFit {
            fit,
            label_extent,
            thickness,
        }
    }
}

/// Measured side labels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SideFit {
    /// The shared sizing decision for the labels.
    pub fit: FitResult,
    /// Extent of the largest (possibly rotated) label along the side's normal.
    pub label_extent: f64,
    /// Total thickness: ticks, padding and labels.
    pub thickness: f64,
}

/// A chart title with an optional subtitle.
///
/// Title and subtitle are fitted as one label set so a narrow view shrinks both by the same
/// factor.
#[derive(Clone, Debug, PartialEq)]
pub struct TitleSpec {
    /// The title.
    pub title: LabelSpec,
    /// Optional subtitle.
    pub subtitle: Option<LabelSpec>,
    /// Vertical padding applied above and below the title block.
    pub padding: f64,
    /// Gap between title and subtitle.
    pub subtitle_gap: f64,
    /// Smallest font size the title may shrink to.
    pub min_font_size_px: f64,
}

impl TitleSpec {
    /// Creates a title with default spacing.
    pub fn new(title: LabelSpec) -> Self {
        Self {
            title,
            subtitle: None,
            padding: 6.0,
            subtitle_gap: 2.0,
            min_font_size_px: 8.0,
        }
    }

    /// Sets the subtitle.
    #[must_use]
    pub fn with_subtitle(mut self, subtitle: LabelSpec) -> Self {
        self.subtitle = Some(subtitle);
        self
    }

    /// Sets the vertical padding.
    #[must_use]
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    /// Sets the smallest font size.
    #[must_use]
    pub fn with_min_font_size(mut self, min_font_size_px: f64) -> Self {
        self.min_font_size_px = min_font_size_px;
        self
    }

    fn labels(&self) -> Vec<LabelSpec> {
        let mut labels = Vec::with_capacity(2);
        labels.push(self.title.clone());
        labels.extend(self.subtitle.clone());
        labels
    }

    /// Fits the title into `available_width` and measures the height it reserves.
    pub fn measure<M: TextMeasurer>(
        &self,
        estimator: &LabelLayoutEstimator<M>,
        available_width: f64,
    ) -> TitleFit {
        let labels = self.labels();
        let fit = estimator.fit_label_set(
            &labels,
            LayoutBudget::new(available_width, self.min_font_size_px),
        );
        let metrics = estimator.label_set_metrics(&labels, &fit);

        let mut height = 2.0 * self.padding.max(0.0);
        for (i, m) in metrics.iter().enumerate() {
            if i > 0 {
                height += self.subtitle_gap.max(0.0);
            }
            height += m.line_height();
        }
        TitleFit { fit, height }
    }
}

/// A measured title.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TitleFit {
    /// The shared sizing decision for title and subtitle.
    pub fit: FitResult,
    /// Height reserved above the plot.
    pub height: f64,
}

/// Legend orientation settings, matching Vega’s core options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LegendOrient {
    /// Place the legend to the left of the chart.
    Left,
    /// Place the legend to the right of the chart.
    Right,
    /// Place the legend above the chart, entries in one row.
    Top,
    /// Place the legend below the chart, entries in one row.
    Bottom,
    /// Place the legend inside the upper-left corner of the plot.
    TopLeft,
    /// Place the legend inside the upper-right corner of the plot.
    TopRight,
    /// Place the legend inside the lower-left corner of the plot.
    BottomLeft,
    /// Place the legend inside the lower-right corner of the plot.
    BottomRight,
    /// Disable automatic placement and use explicit coordinates.
    None,
}

impl LegendOrient {
    fn is_row(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }
}

/// Legend placement options (orientation + offset).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LegendPlacement {
    /// Legend orientation.
    pub orient: LegendOrient,
    /// Offset in pixels away from the plot and axes (or inward for corners).
    pub offset: f64,
    /// Explicit x position, used only when `orient` is `None`.
    pub x: f64,
    /// Explicit y position, used only when `orient` is `None`.
    pub y: f64,
}

impl Default for LegendPlacement {
    fn default() -> Self {
        Self {
            orient: LegendOrient::Right,
            offset: 18.0,
            x: 0.0,
            y: 0.0,
        }
    }
}

/// A swatch + label legend.
#[derive(Clone, Debug, PartialEq)]
pub struct LegendSpec {
    /// Entry labels in display order.
    pub entries: Vec<LabelSpec>,
    /// Width budget for the widest entry label.
    pub budget: LayoutBudget,
    /// Swatch square size.
    pub swatch_size: f64,
    /// Gap between swatch and label.
    pub label_gap: f64,
    /// Gap between entries (vertical for columns, horizontal for rows).
    pub entry_gap: f64,
    /// Where the legend goes.
    pub placement: LegendPlacement,
}

impl LegendSpec {
    /// Creates a legend with default spacing, placed right of the plot.
    pub fn new(entries: Vec<LabelSpec>, budget: LayoutBudget) -> Self {
        Self {
            entries,
            budget,
            swatch_size: 12.0,
            label_gap: 4.0,
            entry_gap: 6.0,
            placement: LegendPlacement::default(),
        }
    }

    /// Sets the placement.
    #[must_use]
    pub fn with_placement(mut self, placement: LegendPlacement) -> Self {
        self.placement = placement;
        self
    }

    /// Fits the entry labels and measures the legend box.
    pub fn measure<M: TextMeasurer>(&self, estimator: &LabelLayoutEstimator<M>) -> LegendFit {
        let fit = estimator.fit_label_set(&self.entries, self.budget);
        let metrics = estimator.label_set_metrics(&self.entries, &fit);
        let swatch = self.swatch_size.max(0.0);
        let label_gap = self.label_gap.max(0.0);
        let gap = self.entry_gap.max(0.0);
        let gaps = metrics.len().saturating_sub(1) as f64 * gap;

        let row_height = metrics
            .iter()
            .map(|m| m.line_height())
            .fold(swatch, f64::max);

        let size = if metrics.is_empty() {
            Size::default()
        } else if self.placement.orient.is_row() {
            let width: f64 = metrics
                .iter()
                .map(|m| swatch + label_gap + m.advance_width)
                .sum();
            Size::new(width + gaps, row_height)
        } else {
            Size::new(
                swatch + label_gap + fit.max_label_width_px,
                metrics.len() as f64 * row_height + gaps,
            )
        };

        LegendFit {
            fit,
            size,
            row_height,
        }
    }
}

/// A measured legend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LegendFit {
    /// The shared sizing decision for the entry labels.
    pub fit: FitResult,
    /// Legend box size.
    pub size: Size,
    /// Height of one entry row.
    pub row_height: f64,
}

/// Layout inputs: a fixed view plus optional guides.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MarginSpec {
    /// Outer chart bounds.
    pub view_size: Size,
    /// Padding around the whole chart, applied on all sides.
    pub outer_padding: f64,
    /// Optional title above the plot.
    pub title: Option<TitleSpec>,
    /// Labels left of the plot (typically category names or y tick labels).
    pub axis_left: Option<SideLabels>,
    /// Labels right of the plot.
    pub axis_right: Option<SideLabels>,
    /// Labels above the plot.
    pub axis_top: Option<SideLabels>,
    /// Labels below the plot (typically x tick labels).
    pub axis_bottom: Option<SideLabels>,
    /// Optional legend.
    pub legend: Option<LegendSpec>,
}

/// A guide's measured extents together with the rectangle reserved for it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placed<T> {
    /// Reserved rectangle in view coordinates.
    pub rect: Rect,
    /// What the measure pass found.
    pub measured: T,
}

/// Output of the arrange pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarginLayout {
    /// Outer chart bounds.
    pub view: Rect,
    /// Space reserved around the plot, padding included.
    pub margins: Margins,
    /// The plot (data) rectangle scales should map onto.
    pub plot: Rect,
    /// Title placement.
    pub title: Option<Placed<TitleFit>>,
    /// Left labels placement.
    pub axis_left: Option<Placed<SideFit>>,
    /// Right labels placement.
    pub axis_right: Option<Placed<SideFit>>,
    /// Top labels placement.
    pub axis_top: Option<Placed<SideFit>>,
    /// Bottom labels placement.
    pub axis_bottom: Option<Placed<SideFit>>,
    /// Legend placement.
    pub legend: Option<Placed<LegendFit>>,
}

impl MarginLayout {
    /// Measures every guide in `spec` and arranges them around the plot.
    pub fn arrange<M: TextMeasurer>(
        estimator: &LabelLayoutEstimator<M>,
        spec: &MarginSpec,
    ) -> Self {
        let view_w = spec.view_size.width.max(0.0);
        let view_h = spec.view_size.height.max(0.0);
        let outer_padding = spec.outer_padding.max(0.0);

        let title = spec
            .title
            .as_ref()
            .map(|t| t.measure(estimator, (view_w - 2.0 * outer_padding).max(0.0)));
        let axis_left = spec
            .axis_left
            .as_ref()
            .map(|s| s.measure(Side::Left, estimator));
        let axis_right = spec
            .axis_right
            .as_ref()
            .map(|s| s.measure(Side::Right, estimator));
        let axis_top = spec
            .axis_top
            .as_ref()
            .map(|s| s.measure(Side::Top, estimator));
        let axis_bottom = spec
            .axis_bottom
            .as_ref()
            .map(|s| s.measure(Side::Bottom, estimator));
        let legend = spec.legend.as_ref().map(|l| (l.measure(estimator), l.placement));

        let title_h = title.map_or(0.0, |t| t.height);
        let left_w = axis_left.map_or(0.0, |s| s.thickness);
        let right_w = axis_right.map_or(0.0, |s| s.thickness);
        let top_h = axis_top.map_or(0.0, |s| s.thickness);
        let bottom_h = axis_bottom.map_or(0.0, |s| s.thickness);

        let mut margins = Margins {
            top: outer_padding + title_h + top_h,
            right: outer_padding + right_w,
            bottom: outer_padding + bottom_h,
            left: outer_padding + left_w,
        };

        if let Some((fit, placement)) = &legend {
            let offset = placement.offset.max(0.0);
            match placement.orient {
                LegendOrient::Left => margins.left += fit.size.width + offset,
                LegendOrient::Right => margins.right += fit.size.width + offset,
                LegendOrient::Top => margins.top += fit.size.height + offset,
                LegendOrient::Bottom => margins.bottom += fit.size.height + offset,
                LegendOrient::TopLeft
                | LegendOrient::TopRight
                | LegendOrient::BottomLeft
                | LegendOrient::BottomRight
                | LegendOrient::None => {}
            }
        }

        let view = Rect::new(0.0, 0.0, view_w, view_h);
        let plot = margins.inset(view);

        tracing::trace!(
            top = margins.top,
            right = margins.right,
            bottom = margins.bottom,
            left = margins.left,
            plot_width = plot.width(),
            plot_height = plot.height(),
            "arranged margins"
        );

        // Axis labels are placed adjacent to the plot so scale mapping matches marks.
        let axis_left = axis_left.map(|m| Placed {
            rect: Rect::new(plot.x0 - m.thickness, plot.y0, plot.x0, plot.y1),
            measured: m,
        });
        let axis_right = axis_right.map(|m| Placed {
            rect: Rect::new(plot.x1, plot.y0, plot.x1 + m.thickness, plot.y1),
            measured: m,
        });
        let axis_top = axis_top.map(|m| Placed {
            rect: Rect::new(plot.x0, plot.y0 - m.thickness, plot.x1, plot.y0),
            measured: m,
        });
        let axis_bottom = axis_bottom.map(|m| Placed {
            rect: Rect::new(plot.x0, plot.y1, plot.x1, plot.y1 + m.thickness),
            measured: m,
        });

        let title = title.map(|m| Placed {
            rect: Rect::new(
                outer_padding,
                outer_padding,
                (view.x1 - outer_padding).max(outer_padding),
                outer_padding + m.height,
            ),
            measured: m,
        });

        // Legends are placed outside the axes, matching Vega’s default semantics.
        let legend = legend.map(|(m, placement)| Placed {
            rect: legend_rect(plot, left_w, right_w, top_h, bottom_h, m.size, placement),
            measured: m,
        });

        Self {
            view,
            margins,
            plot,
            title,
            axis_left,
            axis_right,
            axis_top,
            axis_bottom,
            legend,
        }
    }

    /// Returns `true` if any label set overflowed its budget or the guides left no room for
    /// the plot.
    pub fn overflows(&self) -> bool {
        let sides = [
            self.axis_left,
            self.axis_right,
            self.axis_top,
            self.axis_bottom,
        ];
        sides.iter().flatten().any(|s| s.measured.fit.overflows)
            || self.title.is_some_and(|t| t.measured.fit.overflows)
            || self.legend.is_some_and(|l| l.measured.fit.overflows)
            || self.margins.horizontal() > self.view.width()
            || self.margins.vertical() > self.view.height()
    }
}

fn legend_rect(
    plot: Rect,
    axis_left_w: f64,
    axis_right_w: f64,
    axis_top_h: f64,
    axis_bottom_h: f64,
    size: Size,
    placement: LegendPlacement,
) -> Rect {
    let w = size.width.max(0.0);
    let h = size.height.max(0.0);
    let offset = placement.offset.max(0.0);

    match placement.orient {
        LegendOrient::Right => {
            let x0 = plot.x1 + axis_right_w + offset;
            Rect::new(x0, plot.y0, x0 + w, plot.y0 + h)
        }
        LegendOrient::Left => {
            let x1 = plot.x0 - axis_left_w - offset;
            Rect::new(x1 - w, plot.y0, x1, plot.y0 + h)
        }
        LegendOrient::Top => {
            let y1 = plot.y0 - axis_top_h - offset;
            Rect::new(plot.x0, y1 - h, plot.x0 + w, y1)
        }
        LegendOrient::Bottom => {
            let y0 = plot.y1 + axis_bottom_h + offset;
            Rect::new(plot.x0, y0, plot.x0 + w, y0 + h)
        }
        LegendOrient::TopLeft => Rect::new(
            plot.x0 + offset,
            plot.y0 + offset,
            plot.x0 + offset + w,
            plot.y0 + offset + h,
        ),
        LegendOrient::TopRight => Rect::new(
            plot.x1 - offset - w,
            plot.y0 + offset,
            plot.x1 - offset,
            plot.y0 + offset + h,
        ),
        LegendOrient::BottomLeft => Rect::new(
            plot.x0 + offset,
            plot.y1 - offset - h,
            plot.x0 + offset + w,
            plot.y1 - offset,
        ),
        LegendOrient::BottomRight => Rect::new(
            plot.x1 - offset - w,
            plot.y1 - offset - h,
            plot.x1 - offset,
            plot.y1 - offset,
        ),
        LegendOrient::None => Rect::new(placement.x, placement.y, placement.x + w, placement.y + h),
    }
}
