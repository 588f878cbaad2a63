//! Precision-safe decimal arithmetic over string operands.
//!
//! Monetary and quantity values routinely exceed the `f64` mantissa once
//! they are chained through fee, margin and leverage calculations, and
//! silent precision loss is a correctness bug in a trading context. Every
//! place the library combines two money values goes through this module.
//!
//! Values enter and leave as decimal strings (the form venue APIs use on
//! the wire); internally they are exact [`rust_decimal::Decimal`] values,
//! which cover 28 significant digits. Addition, subtraction and
//! multiplication preserve the operand scales, so significant trailing
//! zeros survive (`"1.10" - "0.1"` is `"1.00"`); division takes an
//! explicit result precision and rounding mode.
//!
//! Malformed operands and division by zero fail with a parse/bad-request
//! class error; all other operations are total over well-formed decimal
//! strings.
//!
//! # Examples
//!
//! ```rust
//! use coinbridge_core::precise::{string_add, string_mul, string_div};
//!
//! assert_eq!(string_add("0.1", "0.2").unwrap(), "0.3");
//! assert_eq!(string_mul("1.5", "2").unwrap(), "3.0");
//! assert_eq!(string_div("1", "3", Some(8)).unwrap(), "0.33333333");
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::error::{Error, ParseError, Result};

/// Default number of decimal places for [`string_div`] when the caller
/// does not specify one.
pub const DEFAULT_DIV_PRECISION: u32 = 18;

/// Rounding mode for precision formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundingMode {
    /// Round to nearest, ties away from zero.
    Round,
    /// Round away from zero.
    RoundUp,
    /// Truncate toward zero.
    RoundDown,
}

impl RoundingMode {
    fn strategy(self) -> RoundingStrategy {
        match self {
            Self::Round => RoundingStrategy::MidpointAwayFromZero,
            Self::RoundUp => RoundingStrategy::AwayFromZero,
            Self::RoundDown => RoundingStrategy::ToZero,
        }
    }
}

/// How a precision value counts digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountingMode {
    /// Precision is a number of decimal places.
    DecimalPlaces,
    /// Precision is a number of significant digits.
    SignificantDigits,
}

/// Output padding behaviour for precision formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddingMode {
    /// Trim trailing fractional zeros.
    NoPadding,
    /// Pad the fraction with zeros out to the precision.
    PadWithZero,
}

fn parse(s: &str) -> Result<Decimal> {
    Decimal::from_str(s.trim())
        .map_err(ParseError::from)
        .map_err(Error::from)
}

fn overflow(op: &'static str) -> Error {
    Error::from(ParseError::invalid_value(op, "decimal overflow"))
}

/// Adds two decimal strings exactly.
pub fn string_add(a: &str, b: &str) -> Result<String> {
    let sum = parse(a)?
        .checked_add(parse(b)?)
        .ok_or_else(|| overflow("add"))?;
    Ok(sum.to_string())
}

/// Subtracts `b` from `a` exactly.
pub fn string_sub(a: &str, b: &str) -> Result<String> {
    let diff = parse(a)?
        .checked_sub(parse(b)?)
        .ok_or_else(|| overflow("sub"))?;
    Ok(diff.to_string())
}

/// Multiplies two decimal strings exactly.
pub fn string_mul(a: &str, b: &str) -> Result<String> {
    let product = parse(a)?
        .checked_mul(parse(b)?)
        .ok_or_else(|| overflow("mul"))?;
    Ok(product.to_string())
}

/// Divides `a` by `b`, rounding half-away-from-zero to `precision`
/// decimal places (default [`DEFAULT_DIV_PRECISION`]).
///
/// Exactly representable quotients keep their natural scale and are not
/// padded out to the precision.
///
/// # Errors
///
/// Fails on malformed operands and on division by zero.
pub fn string_div(a: &str, b: &str, precision: Option<u32>) -> Result<String> {
    let divisor = parse(b)?;
    if divisor.is_zero() {
        return Err(Error::from(ParseError::invalid_value(
            "div",
            "division by zero",
        )));
    }
    let precision = precision.unwrap_or(DEFAULT_DIV_PRECISION);
    let quotient = parse(a)?
        .checked_div(divisor)
        .ok_or_else(|| overflow("div"))?;
    let rounded = if quotient.scale() > precision {
        quotient.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero)
    } else {
        quotient
    };
    Ok(rounded.to_string())
}

/// Negates a decimal string.
pub fn string_neg(a: &str) -> Result<String> {
    Ok((-parse(a)?).to_string())
}

/// Absolute value of a decimal string.
pub fn string_abs(a: &str) -> Result<String> {
    Ok(parse(a)?.abs().to_string())
}

/// Numerically smaller of two decimal strings.
pub fn string_min(a: &str, b: &str) -> Result<String> {
    let (da, db) = (parse(a)?, parse(b)?);
    Ok(if db < da { b.to_string() } else { a.to_string() })
}

/// Numerically larger of two decimal strings.
pub fn string_max(a: &str, b: &str) -> Result<String> {
    let (da, db) = (parse(a)?, parse(b)?);
    Ok(if db > da { b.to_string() } else { a.to_string() })
}

/// `a > b` numerically.
pub fn string_gt(a: &str, b: &str) -> Result<bool> {
    Ok(parse(a)? > parse(b)?)
}

/// `a >= b` numerically.
pub fn string_ge(a: &str, b: &str) -> Result<bool> {
    Ok(parse(a)? >= parse(b)?)
}

/// `a < b` numerically.
pub fn string_lt(a: &str, b: &str) -> Result<bool> {
    Ok(parse(a)? < parse(b)?)
}

/// `a <= b` numerically.
pub fn string_le(a: &str, b: &str) -> Result<bool> {
    Ok(parse(a)? <= parse(b)?)
}

/// Numeric equality (`"1.10"` equals `"1.1"`).
pub fn string_eq(a: &str, b: &str) -> Result<bool> {
    Ok(parse(a)? == parse(b)?)
}

/// Drops a zero value, keeping everything else.
///
/// Venues frequently encode "not applicable" as `"0"`; a zero price or
/// average is never meaningful where this is used.
pub fn omit_zero(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| !v.is_zero())
}

/// Formats a decimal without scientific notation, trimming trailing
/// fractional zeros.
pub fn number_to_string(value: Decimal) -> String {
    let s = value.to_string();
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

/// Number of decimal places implied by a string representation.
///
/// Scientific notation is honored (`"1e-8"` has precision 8); trailing
/// zeros do not count (`"1.0000"` has precision 0).
pub fn precision_from_string(s: &str) -> i32 {
    if let Some(e_pos) = s.find(['e', 'E']) {
        if let Ok(exp) = s[e_pos + 1..].parse::<i32>() {
            return -exp;
        }
    }
    let trimmed = s.trim_end_matches('0');
    match trimmed.find('.') {
        #[allow(clippy::cast_possible_truncation)]
        Some(dot) => (trimmed.len() - dot - 1) as i32,
        None => 0,
    }
}

fn round_decimal(value: Decimal, decimal_places: i32, mode: RoundingMode) -> Decimal {
    if decimal_places >= 0 {
        #[allow(clippy::cast_sign_loss)]
        return value.round_dp_with_strategy(decimal_places as u32, mode.strategy());
    }
    // Negative precision rounds to a power of ten above the decimal point.
    let scale = Decimal::from_i128_with_scale(10_i128.pow(decimal_places.unsigned_abs()), 0);
    let rounded = (value / scale).round_dp_with_strategy(0, mode.strategy());
    rounded * scale
}

fn format_places(value: Decimal, decimal_places: i32, padding: PaddingMode) -> String {
    match padding {
        PaddingMode::NoPadding => number_to_string(value),
        PaddingMode::PadWithZero => {
            if decimal_places > 0 {
                #[allow(clippy::cast_sign_loss)]
                let prec = decimal_places as usize;
                format!("{value:.prec$}")
            } else {
                value.trunc().to_string()
            }
        }
    }
}

/// Formats a decimal to a digit-count precision.
///
/// # Examples
///
/// ```rust
/// use coinbridge_core::precise::{
///     decimal_to_precision, CountingMode, PaddingMode, RoundingMode,
/// };
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let value = Decimal::from_str("123.456").unwrap();
/// let out = decimal_to_precision(
///     value,
///     RoundingMode::RoundDown,
///     2,
///     CountingMode::DecimalPlaces,
///     PaddingMode::NoPadding,
/// );
/// assert_eq!(out, "123.45");
/// ```
pub fn decimal_to_precision(
    value: Decimal,
    rounding: RoundingMode,
    precision: i32,
    counting: CountingMode,
    padding: PaddingMode,
) -> String {
    match counting {
        CountingMode::DecimalPlaces => {
            format_places(round_decimal(value, precision, rounding), precision, padding)
        }
        CountingMode::SignificantDigits => {
            if value.is_zero() {
                return "0".to_string();
            }
            let magnitude = magnitude_of(value.abs());
            let decimal_places = precision - magnitude - 1;
            format_places(
                round_decimal(value, decimal_places, rounding),
                decimal_places,
                padding,
            )
        }
    }
}

/// Aligns a value to a tick-size increment.
///
/// Most venues publish precision as a minimum price/amount step rather
/// than a digit count; order prices must land exactly on a multiple of it.
///
/// # Errors
///
/// Fails when `tick_size` is not positive.
pub fn apply_tick_size(value: Decimal, tick_size: Decimal, rounding: RoundingMode) -> Result<String> {
    if tick_size <= Decimal::ZERO {
        return Err(Error::from(ParseError::invalid_value(
            "tick_size",
            "tick size must be positive",
        )));
    }
    let ticks = (value / tick_size).round_dp_with_strategy(0, rounding.strategy());
    let aligned = ticks * tick_size;
    let tick_precision = precision_from_string(&tick_size.to_string());
    Ok(format_places(aligned, tick_precision, PaddingMode::NoPadding))
}

/// Exponent of the leading digit: 0 for `[1, 10)`, -1 for `[0.1, 1)`.
fn magnitude_of(value: Decimal) -> i32 {
    debug_assert!(value > Decimal::ZERO);
    let mantissa = value.mantissa().unsigned_abs();
    let digits = mantissa.to_string().len() as i32;
    #[allow(clippy::cast_possible_wrap)]
    let scale = value.scale() as i32;
    digits - scale - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_add_exact() {
        assert_eq!(string_add("0.1", "0.2").unwrap(), "0.3");
        assert_eq!(
            string_add("9007199254740993", "1").unwrap(),
            "9007199254740994"
        );
    }

    #[test]
    fn test_string_sub_preserves_scale() {
        assert_eq!(string_sub("1.10", "0.1").unwrap(), "1.00");
        assert_eq!(string_add("1.00", "0.1").unwrap(), "1.10");
    }

    #[test]
    fn test_string_mul() {
        assert_eq!(string_mul("1.5", "2").unwrap(), "3.0");
        assert_eq!(string_mul("67756.7", "0.001").unwrap(), "67.7567");
    }

    #[test]
    fn test_string_div() {
        assert_eq!(string_div("1", "4", None).unwrap(), "0.25");
        assert_eq!(string_div("1", "3", Some(8)).unwrap(), "0.33333333");
        assert_eq!(string_div("10", "2", Some(2)).unwrap(), "5");
    }

    #[test]
    fn test_string_div_by_zero() {
        assert!(string_div("1", "0", None).is_err());
        assert!(string_div("1", "0.0", None).is_err());
    }

    #[test]
    fn test_malformed_input() {
        assert!(string_add("abc", "1").is_err());
        assert!(string_mul("1", "").is_err());
    }

    #[test]
    fn test_neg_abs() {
        assert_eq!(string_neg("1.5").unwrap(), "-1.5");
        assert_eq!(string_neg("-1.5").unwrap(), "1.5");
        assert_eq!(string_abs("-0.01").unwrap(), "0.01");
    }

    #[test]
    fn test_min_max_keep_operand_form() {
        assert_eq!(string_min("1.50", "2").unwrap(), "1.50");
        assert_eq!(string_max("1.50", "2").unwrap(), "2");
    }

    #[test]
    fn test_comparisons() {
        assert!(string_gt("2", "1.9999").unwrap());
        assert!(string_le("1.10", "1.1").unwrap());
        assert!(string_eq("1.10", "1.1").unwrap());
        assert!(!string_lt("3", "3").unwrap());
    }

    #[test]
    fn test_omit_zero() {
        use std::str::FromStr;
        assert_eq!(omit_zero(Some(Decimal::from_str("0").unwrap())), None);
        assert_eq!(omit_zero(Some(Decimal::from_str("0.00").unwrap())), None);
        assert!(omit_zero(Some(Decimal::from_str("0.1").unwrap())).is_some());
        assert_eq!(omit_zero(None), None);
    }

    #[test]
    fn test_precision_from_string() {
        assert_eq!(precision_from_string("0.001"), 3);
        assert_eq!(precision_from_string("1.2345"), 4);
        assert_eq!(precision_from_string("100"), 0);
        assert_eq!(precision_from_string("1.0000"), 0);
        assert_eq!(precision_from_string("1e-8"), 8);
    }

    #[test]
    fn test_decimal_to_precision_modes() {
        let v = Decimal::from_str("123.456").unwrap();
        assert_eq!(
            decimal_to_precision(
                v,
                RoundingMode::Round,
                2,
                CountingMode::DecimalPlaces,
                PaddingMode::NoPadding
            ),
            "123.46"
        );
        assert_eq!(
            decimal_to_precision(
                v,
                RoundingMode::RoundDown,
                2,
                CountingMode::DecimalPlaces,
                PaddingMode::NoPadding
            ),
            "123.45"
        );
        assert_eq!(
            decimal_to_precision(
                v,
                RoundingMode::Round,
                4,
                CountingMode::SignificantDigits,
                PaddingMode::NoPadding
            ),
            "123.5"
        );
        assert_eq!(
            decimal_to_precision(
                Decimal::from_str("123.4").unwrap(),
                RoundingMode::Round,
                3,
                CountingMode::DecimalPlaces,
                PaddingMode::PadWithZero
            ),
            "123.400"
        );
    }

    #[test]
    fn test_negative_precision_rounds_above_point() {
        let v = Decimal::from_str("123.456").unwrap();
        assert_eq!(
            decimal_to_precision(
                v,
                RoundingMode::Round,
                -1,
                CountingMode::DecimalPlaces,
                PaddingMode::NoPadding
            ),
            "120"
        );
    }

    #[test]
    fn test_apply_tick_size() {
        let v = Decimal::from_str("123.456").unwrap();
        let tick = Decimal::from_str("0.05").unwrap();
        assert_eq!(apply_tick_size(v, tick, RoundingMode::Round).unwrap(), "123.45");
        assert_eq!(
            apply_tick_size(v, tick, RoundingMode::RoundUp).unwrap(),
            "123.5"
        );
        assert!(apply_tick_size(v, Decimal::ZERO, RoundingMode::Round).is_err());
    }

    #[test]
    fn test_number_to_string() {
        assert_eq!(
            number_to_string(Decimal::from_str("123.4500").unwrap()),
            "123.45"
        );
        assert_eq!(number_to_string(Decimal::from_str("100").unwrap()), "100");
    }
}
