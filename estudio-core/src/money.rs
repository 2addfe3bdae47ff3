//! es-ES money and quantity formatting.
//!
//! Display convention is `1.234,56 €`: period as thousands separator, comma
//! as decimal separator, trailing euro sign. Parsing is lenient and never
//! fails; malformed input degrades to zero (currency) or `None` (quantity)
//! so a half-typed field can never break a recompute cycle.

use rust_decimal::Decimal;

use crate::calculations::common::round_half_up;

/// Parses a currency display string into a [`Decimal`].
///
/// Strips thousands separators, the euro sign and all whitespace (including
/// non-breaking spaces) and converts the decimal comma. Empty or unparseable
/// input yields `Decimal::ZERO`.
///
/// ```
/// use rust_decimal_macros::dec;
/// use estudio_core::money::parse_currency;
///
/// assert_eq!(parse_currency("1.234,56 €"), dec!(1234.56));
/// assert_eq!(parse_currency(""), dec!(0));
/// assert_eq!(parse_currency("abc"), dec!(0));
/// ```
pub fn parse_currency(text: &str) -> Decimal {
    parse_quantity(text).unwrap_or(Decimal::ZERO)
}

/// Parses a plain numeric display string into an optional [`Decimal`].
///
/// Same normalization as [`parse_currency`], but empty or unparseable input
/// yields `None` instead of zero. Callers must treat "no value" and "zero"
/// as distinct states for quantity fields.
pub fn parse_quantity(text: &str) -> Option<Decimal> {
    let normalized: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '€' && *c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if normalized.is_empty() {
        return None;
    }
    match normalized.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(input = %text, "unparseable numeric input: {e}");
            None
        }
    }
}

/// Formats a currency value as `1.234,56 €` with exactly two fraction
/// digits. `None` renders as the empty string, never as `0,00 €`.
pub fn format_currency(value: Option<Decimal>) -> String {
    match value {
        Some(v) => format!("{} €", format_fixed(v, 2)),
        None => String::new(),
    }
}

/// Formats a plain quantity with the given number of fraction digits in the
/// es-ES convention (no currency suffix). `None` renders as the empty
/// string.
pub fn format_quantity(
    value: Option<Decimal>,
    fraction_digits: u32,
) -> String {
    match value {
        Some(v) => format_fixed(v, fraction_digits),
        None => String::new(),
    }
}

/// Renders a decimal with fixed fraction digits, grouped thousands and a
/// decimal comma.
fn format_fixed(
    value: Decimal,
    fraction_digits: u32,
) -> String {
    let mut rounded = value.round_dp_with_strategy(
        fraction_digits,
        rust_decimal::RoundingStrategy::MidpointAwayFromZero,
    );
    rounded.rescale(fraction_digits);

    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let plain = rounded.abs().to_string();
    let (int_part, frac_part) = match plain.split_once('.') {
        Some((i, f)) => (i, f),
        None => (plain.as_str(), ""),
    };

    let mut out = String::with_capacity(plain.len() + int_part.len() / 3 + 1);
    if negative {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    if !frac_part.is_empty() {
        out.push(',');
        out.push_str(frac_part);
    }
    out
}

/// Parses a currency field the way an input element is read: blank text is
/// "no value" (`None`), anything else goes through [`parse_currency`].
pub fn optional_currency(text: &str) -> Option<Decimal> {
    if text.trim().is_empty() {
        None
    } else {
        Some(parse_currency(text))
    }
}

/// Round-trip normalization used when a field loses focus: reparse the
/// displayed text and re-render it in canonical form.
pub fn normalize_currency_display(text: &str) -> String {
    match optional_currency(text) {
        Some(v) => format_currency(Some(round_half_up(v))),
        None => String::new(),
    }
}
