// Copyright (c) 2018-2022  Ministerio de Fomento
//                          Instituto de Ciencias de la Construcción Eduardo Torroja (IETcc-CSIC)

// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:

// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

// Author(s): Rafael Villar Burke <pachi@ietcc.csic.es>,
//            Daniel Jiménez González <dani@ietcc.csic.es>,
//            Marta Sorribes Gil <msorribes@ietcc.csic.es>

/*!
Utilidades numéricas
====================

Rounding, discounting sums and German number notation (`1.234,5`).
*/

use num::Float;

use crate::error::{LcaError, Result};

/// Values whose magnitude is below this threshold are treated as zero in divisions
pub const NEAR_ZERO: f64 = 1e-6;

/// Round to `decimals` decimal places (half away from zero)
pub fn round_dp(value: f64, decimals: i32) -> f64 {
    let k = 10_f64.powi(decimals);
    (value * k).round() / k
}

/// Is the value zero for practical purposes?
pub fn is_near_zero(value: f64) -> bool {
    value.abs() < NEAR_ZERO
}

/// Present value of a cash flow growing at rate `growth`, discounted at rate `rate`
///
/// sum_{i=1}^{n} value * (1 + growth)^i / (1 + rate)^i, evaluated term by term
pub fn discounted_sum<T: Float>(value: T, growth: T, rate: T, n: u32) -> T {
    let one = T::one();
    (1..=n as i32).fold(T::zero(), |acc, i| {
        acc + value * (one + growth).powi(i) / (one + rate).powi(i)
    })
}

/// Serialize a float rounded to 3 decimal places
pub(crate) fn round_serialize_3<S>(x: &f64, s: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_f64(round_dp(*x, 3))
}

/// Serialize an optional float rounded to 3 decimal places
pub(crate) fn round_serialize_opt_3<S>(x: &Option<f64>, s: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match x {
        Some(v) => s.serialize_some(&round_dp(*v, 3)),
        None => s.serialize_none(),
    }
}

/// Parse a number with german (`1.234,5`) or standard (`1234.5`) notation
///
/// A dash (`-`) or an empty string is a missing value and returns `None`.
/// Dots are thousands separators when a decimal comma is present or when there is more
/// than one of them. A single dot without a comma is read as a decimal point, so a
/// german integer with one thousands separator is misread (`"1.000"` is 1.0): write it
/// with a decimal comma (`"1.000,0"`) or without separator (`"1000"`).
pub fn parse_de_number(s: &str) -> Result<Option<f64>> {
    let s = s.trim();
    if s.is_empty() || s == "-" {
        return Ok(None);
    }
    let normalized = if s.contains(',') {
        s.replace('.', "").replace(',', ".")
    } else if s.matches('.').count() > 1 {
        s.replace('.', "")
    } else {
        s.to_string()
    };
    normalized
        .parse::<f64>()
        .map(Some)
        .map_err(|_| LcaError::Parse(s.into()))
}

/// Parse a mandatory number with german or standard notation
pub fn parse_de_number_req(s: &str) -> Result<f64> {
    parse_de_number(s)?.ok_or_else(|| LcaError::Parse(format!("missing value: \"{}\"", s)))
}

/// Format a number using german notation (decimal comma, no thousands separator)
pub fn fmt_de(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value).replace('.', ",")
}

/// Format an optional number using german notation or a dash when missing
pub fn fmt_de_or_dash(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => fmt_de(v, decimals),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numops_round_dp() {
        assert_eq!(17459.911, round_dp(17459.91102259352, 3));
        assert_eq!(-2.35, round_dp(-2.346, 2));
        assert_eq!(1.0, round_dp(0.96, 1));
    }

    #[test]
    fn numops_discounted_sum() {
        assert_eq!(14.0, discounted_sum(1.0_f64, 1.0, 0.0, 3));
        assert_eq!(300.0, discounted_sum(100.0_f64, 0.0, 0.0, 3));
        assert_eq!(0.0, discounted_sum(100.0_f64, 0.05, 0.015, 0));
    }

    #[test]
    fn numops_parse_de_number() {
        assert_eq!(Some(1234.5), parse_de_number("1.234,5").unwrap());
        assert_eq!(Some(12.5), parse_de_number(" 12,5 ").unwrap());
        assert_eq!(Some(12.5), parse_de_number("12.5").unwrap());
        assert_eq!(Some(-0.25), parse_de_number("-0,25").unwrap());
        assert_eq!(None, parse_de_number("-").unwrap());
        assert_eq!(None, parse_de_number("").unwrap());
        assert_eq!(Some(1000.0), parse_de_number("1.000,0").unwrap());
        assert_eq!(Some(1234567.0), parse_de_number("1.234.567").unwrap());
        // A single dot is a decimal point
        assert_eq!(Some(1.0), parse_de_number("1.000").unwrap());
        assert_eq!(Some(42.5), parse_de_number("42.500").unwrap());
        assert!(parse_de_number("1.234.567,8,9").is_err());
        assert!(parse_de_number("zwölf").is_err());
        assert!(parse_de_number_req("-").is_err());
    }

    #[test]
    fn numops_fmt_de() {
        assert_eq!("1234,50", fmt_de(1234.5, 2));
        assert_eq!("-", fmt_de_or_dash(None, 2));
        assert_eq!("0,125", fmt_de_or_dash(Some(0.125), 3));
    }
}
