//! Number and text formatting for dashboard cells

use num_format::{Locale, ToFormattedString};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Format a USD amount as `$1,234.50` (negatives as `-$1,234.50`).
///
/// Non-finite values render as `$0.00`.
pub fn format_price(value: f64) -> String {
    let (negative, digits) = two_decimals(value, true);
    if negative {
        format!("-${}", digits)
    } else {
        format!("${}", digits)
    }
}

/// Format an optional price, `$0.00` when absent
pub fn format_optional_price(value: Option<f64>) -> String {
    format_price(value.unwrap_or(0.0))
}

/// Format a 24h change as a signed percentage span.
///
/// Non-negative values get a leading `+` and the `positive-change` class.
pub fn format_change(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let (_, digits) = two_decimals(value.abs(), false);
    if value >= 0.0 {
        format!("<span class=\"positive-change\">+{}%</span>", digits)
    } else {
        format!("<span class=\"negative-change\">-{}%</span>", digits)
    }
}

/// Plain two-decimal number, `0.00` when absent
pub fn format_number(value: Option<f64>) -> String {
    let (negative, digits) = two_decimals(value.unwrap_or(0.0), false);
    if negative {
        format!("-{}", digits)
    } else {
        digits
    }
}

/// Upper-case the first character only: `avalanche-2` -> `Avalanche-2`
pub fn capitalize(coin: &str) -> String {
    let mut chars = coin.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Escape text for HTML element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Round half away from zero to cents; returns (is_negative, "1,234.50").
///
/// Non-finite values give `0.00`. Magnitudes past `Decimal` range are whole
/// numbers in `f64` and print with zero cents.
fn two_decimals(value: f64, grouped: bool) -> (bool, String) {
    if !value.is_finite() {
        return (false, "0.00".to_string());
    }

    let Some(decimal) = Decimal::from_f64(value) else {
        let abs = value.abs();
        let whole = if abs < u128::MAX as f64 {
            group_whole(abs as u128, grouped)
        } else {
            format!("{:.0}", abs)
        };
        return (value < 0.0, format!("{}.00", whole));
    };

    let rounded = decimal.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();

    let abs = rounded.abs();
    let cents = (abs.fract() * dec!(100)).to_u64().unwrap_or(0);
    let mut whole = abs.trunc();
    whole.rescale(0);

    let whole = match u128::try_from(whole.mantissa()) {
        Ok(w) => group_whole(w, grouped),
        Err(_) => whole.to_string(),
    };

    (negative, format!("{}.{:02}", whole, cents))
}

fn group_whole(whole: u128, grouped: bool) -> String {
    if grouped {
        whole.to_formatted_string(&Locale::en)
    } else {
        whole.to_string()
    }
}
