//! Number formatting for metric cards.

/// Formats a count with thousands separators: `1234567` becomes
/// `"1,234,567"`.
#[must_use]
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats a signed count with an explicit sign and thousands separators:
/// `"+1,234"`, `"-56"`, `"+0"`.
#[must_use]
pub fn format_signed_count(value: i64) -> String {
    let sign = if value < 0 { '-' } else { '+' };
    format!("{sign}{}", format_count(value.unsigned_abs()))
}

/// Formats a rate with two decimals.
#[must_use]
pub fn format_rate(value: f64) -> String {
    format!("{value:.2}")
}

/// Formats a signed rate with two decimals: `"+1.50"`, `"-0.25"`. A value
/// that rounds to zero is always shown as `"+0.00"`.
#[must_use]
pub fn format_signed_rate(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.abs() < f64::EPSILON {
        return "+0.00".to_string();
    }
    format!("{rounded:+.2}")
}
