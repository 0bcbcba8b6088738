//! Numeric parsing and rendering helpers
//!
//! All values are metric (mm, mm/s, °C). Input accepts both `.` and `,`
//! as the decimal separator; output is locale-invariant and drops
//! trailing zeros so rendered values match what the operator typed.

/// Parse a decimal number from raw user input.
///
/// A comma decimal separator is accepted and treated as a point.
/// Returns `None` when the input is not a well-formed number.
pub fn parse_decimal(input: &str) -> Option<f64> {
    input.trim().replace(',', ".").parse::<f64>().ok()
}

/// Parse an integer-valued field from raw user input.
///
/// Decimal input is accepted and rounded to the nearest integer.
pub fn parse_count(input: &str) -> Option<i64> {
    parse_decimal(input).map(|value| round_to(value, 0) as i64)
}

/// Round `value` to `decimals` places, half away from zero.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let ratio = 10f64.powi(decimals as i32);
    (value * ratio).round() / ratio
}

/// Render `value` rounded to at most `decimals` places, without
/// trailing zeros.
pub fn format_value(value: f64, decimals: u32) -> String {
    let text = format!("{:.*}", decimals as usize, round_to(value, decimals));
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    };
    if text == "-0" {
        "0".to_string()
    } else {
        text
    }
}
