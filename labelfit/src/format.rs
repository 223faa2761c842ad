// Copyright 2025 the labelfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Number formatting for value labels.
//!
//! Formatted values are the most common label set after category names; the string produced
//! here is what gets measured, so it must be the string that gets drawn.

extern crate alloc;

use alloc::format;
use alloc::string::{String, ToString};

#[cfg(not(feature = "std"))]
use crate::float::FloatExt as _;

/// How a number becomes a label.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NumberFormat {
    /// Integers without decimals, everything else with up to two decimals.
    #[default]
    Auto,
    /// Exactly `n` decimals.
    Fixed(usize),
    /// `n` decimals with `,` thousands separators.
    Grouped(usize),
    /// Multiplied by 100, `n` decimals, `%` suffix.
    Percent(usize),
    /// Scaled to an SI prefix (`k`, `M`, `G`, `T`, `m`, `µ`) with up to `n` decimals.
    Si(usize),
}

const SI_PREFIXES: [(f64, &str); 7] = [
    (1e12, "T"),
    (1e9, "G"),
    (1e6, "M"),
    (1e3, "k"),
    (1.0, ""),
    (1e-3, "m"),
    (1e-6, "µ"),
];

/// Formats `value` as a label.
///
/// Non-finite values format as `NaN`, `∞` and `-∞`. Values that round to zero never carry a
/// minus sign.
pub fn format_number(value: f64, format: NumberFormat) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let s = if value > 0.0 { "∞" } else { "-∞" };
        return s.to_string();
    }

    let out = match format {
        NumberFormat::Auto => {
            if value.abs() < 1e15 && value.round() == value {
                format!("{value:.0}")
            } else {
                trim_zeros(format!("{value:.2}"))
            }
        }
        NumberFormat::Fixed(precision) => format!("{value:.precision$}"),
        NumberFormat::Grouped(precision) => group_thousands(&format!("{value:.precision$}")),
        NumberFormat::Percent(precision) => {
            let pct = value * 100.0;
            format!("{pct:.precision$}%")
        }
        NumberFormat::Si(precision) => format_si(value, precision),
    };
    drop_negative_zero(out)
}

fn format_si(value: f64, precision: usize) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let abs = value.abs();
    let mut idx = SI_PREFIXES
        .iter()
        .position(|(threshold, _)| abs >= *threshold)
        .unwrap_or(SI_PREFIXES.len() - 1);

    let mut digits = format!("{:.*}", precision, value / SI_PREFIXES[idx].0);
    // Rounding can carry into the next prefix (999.96 -> "1000.0").
    if idx > 0 && digits.parse::<f64>().is_ok_and(|r| r.abs() >= 1000.0) {
        idx -= 1;
        digits = format!("{:.*}", precision, value / SI_PREFIXES[idx].0);
    }
    let mut out = trim_zeros(digits);
    out.push_str(SI_PREFIXES[idx].1);
    out
}

fn trim_zeros(s: String) -> String {
    if !s.contains('.') {
        return s;
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn group_thousands(s: &str) -> String {
    let (sign, unsigned) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s),
    };
    let (int, frac) = match unsigned.find('.') {
        Some(dot) => unsigned.split_at(dot),
        None => (unsigned, ""),
    };

    let mut out = String::with_capacity(s.len() + int.len() / 3);
    out.push_str(sign);
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out.push_str(frac);
    out
}

fn drop_negative_zero(s: String) -> String {
    match s.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| !c.is_ascii_digit() || c == '0') => rest.to_string(),
        _ => s,
    }
}
