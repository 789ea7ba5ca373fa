//! Numeric helpers shared by the geometry kernel and overlay builder.

/// Number of fractional digits kept in serialized transform entries.
pub(crate) const MATRIX_DECIMALS: i32 = 6;

/// Rounds `value` to `decimals` fractional digits.
///
/// Negative zero is folded into positive zero so serialized output never
/// shows `-0`.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor + 0.0
}

/// Formats a percentage with four fractional digits, e.g. `10.0000%`.
pub(crate) fn format_percent(value: f64) -> String {
    format!("{:.4}%", value + 0.0)
}

/// Greatest common divisor via Euclid's algorithm.
pub(crate) fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}
