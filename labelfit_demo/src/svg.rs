// Copyright 2025 the labelfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal SVG output for `labelfit_demo`.

use std::fmt::Write as _;

use kurbo::{Point, Rect};
use labelfit::{FontWeight, LabelSpec};
use peniko::Color;

/// Horizontal text alignment relative to the anchor point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Anchor {
    Start,
    Middle,
    End,
}

/// A text element.
#[derive(Clone, Debug)]
pub(crate) struct Text<'a> {
    pub(crate) pos: Point,
    pub(crate) text: &'a str,
    pub(crate) font_size: f64,
    pub(crate) font_family: &'a str,
    pub(crate) bold: bool,
    pub(crate) anchor: Anchor,
    pub(crate) angle: f64,
    pub(crate) fill: Color,
}

impl<'a> Text<'a> {
    pub(crate) fn new(pos: Point, text: &'a str, font_size: f64) -> Self {
        Self {
            pos,
            text,
            font_size,
            font_family: "sans-serif",
            bold: false,
            anchor: Anchor::Start,
            angle: 0.0,
            fill: Color::BLACK,
        }
    }

    /// A text element in the family and weight of `label`.
    pub(crate) fn for_label(
        pos: Point,
        text: &'a str,
        label: &'a LabelSpec,
        font_size: f64,
    ) -> Self {
        Self {
            font_family: label.font_family.as_css_family(),
            bold: label.font_weight >= FontWeight::BOLD,
            ..Self::new(pos, text, font_size)
        }
    }
}

/// Accumulates SVG elements for a fixed view box.
#[derive(Debug)]
pub(crate) struct SvgDocument {
    view_box: Rect,
    body: String,
}

impl SvgDocument {
    pub(crate) fn new(view_box: Rect) -> Self {
        Self {
            view_box,
            body: String::new(),
        }
    }

    pub(crate) fn rect(&mut self, rect: Rect, fill: Color) {
        let _ = write!(
            self.body,
            r#"<rect x="{}" y="{}" width="{}" height="{}""#,
            rect.x0,
            rect.y0,
            rect.width(),
            rect.height(),
        );
        write_paint_attr(&mut self.body, "fill", fill);
        self.body.push_str("/>\n");
    }

    pub(crate) fn outline(&mut self, rect: Rect, stroke: Color) {
        let _ = write!(
            self.body,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="none" stroke-width="1""#,
            rect.x0,
            rect.y0,
            rect.width(),
            rect.height(),
        );
        write_paint_attr(&mut self.body, "stroke", stroke);
        self.body.push_str("/>\n");
    }

    pub(crate) fn line(&mut self, from: Point, to: Point, stroke: Color) {
        let _ = write!(
            self.body,
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke-width="1""#,
            from.x, from.y, to.x, to.y
        );
        write_paint_attr(&mut self.body, "stroke", stroke);
        self.body.push_str("/>\n");
    }

    pub(crate) fn text(&mut self, t: &Text<'_>) {
        let _ = write!(
            self.body,
            r#"<text x="{}" y="{}" font-size="{}" font-family="{}" dominant-baseline="middle""#,
            t.pos.x,
            t.pos.y,
            t.font_size,
            escape_xml(t.font_family)
        );
        if t.bold {
            self.body.push_str(r#" font-weight="bold""#);
        }
        if t.angle != 0.0 {
            let _ = write!(
                self.body,
                r#" transform="rotate({} {} {})""#,
                t.angle, t.pos.x, t.pos.y
            );
        }
        self.body.push_str(match t.anchor {
            Anchor::Start => r#" text-anchor="start""#,
            Anchor::Middle => r#" text-anchor="middle""#,
            Anchor::End => r#" text-anchor="end""#,
        });
        write_paint_attr(&mut self.body, "fill", t.fill);
        self.body.push('>');
        self.body.push_str(&escape_xml(t.text));
        self.body.push_str("</text>\n");
    }

    pub(crate) fn to_svg_string(&self) -> String {
        let v = self.view_box;
        let mut out = String::with_capacity(self.body.len() + 160);
        out.push_str(r#"<svg xmlns="http://www.w3.org/2000/svg" "#);
        let _ = writeln!(
            out,
            r#"viewBox="{} {} {} {}" width="{}" height="{}">"#,
            v.x0,
            v.y0,
            v.width(),
            v.height(),
            v.width(),
            v.height()
        );
        out.push_str(&self.body);
        out.push_str("</svg>\n");
        out
    }
}

fn svg_paint(color: Color) -> (String, Option<f64>) {
    let rgba = color.to_rgba8();
    let paint = format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b);
    let opacity = if rgba.a == 255 {
        None
    } else {
        Some(f64::from(rgba.a) / 255.0)
    };
    (paint, opacity)
}

fn write_paint_attr(out: &mut String, name: &str, color: Color) {
    let (value, opacity) = svg_paint(color);
    let _ = write!(out, r#" {name}="{value}""#);
    if let Some(o) = opacity {
        let _ = write!(out, r#" {name}-opacity="{o}""#);
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_escaped_and_anchored() {
        let mut doc = SvgDocument::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut t = Text::new(Point::new(1.0, 2.0), "R&D <east>", 12.0);
        t.anchor = Anchor::End;
        doc.text(&t);
        let svg = doc.to_svg_string();
        assert!(svg.contains("R&amp;D &lt;east&gt;"), "{svg}");
        assert!(svg.contains(r#"text-anchor="end""#), "{svg}");
        assert!(svg.contains(r##"fill="#000000""##), "{svg}");
    }

    #[test]
    fn translucent_paint_gets_opacity() {
        let (paint, opacity) = svg_paint(Color::from_rgba8(255, 0, 0, 51));
        assert_eq!(paint, "#ff0000", "rgb part");
        assert_eq!(opacity, Some(0.2), "alpha becomes opacity");
    }

    #[test]
    fn label_typography_and_rotation_reach_the_element() {
        let label = LabelSpec::from_css("Transport", "Georgia, serif", 12.0, "bold");
        let mut doc = SvgDocument::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut t = Text::for_label(Point::new(3.0, 4.0), &label.text, &label, 12.0);
        t.angle = -45.0;
        doc.text(&t);
        let svg = doc.to_svg_string();
        assert!(svg.contains(r#"font-family="Georgia""#), "{svg}");
        assert!(svg.contains(r#"font-weight="bold""#), "{svg}");
        assert!(svg.contains(r#"transform="rotate(-45 3 4)""#), "{svg}");
    }
}
