//! Shared numeric helpers.
//!
//! Weather values reach us either as JSON numbers or as numeric strings
//! (the CWA API mixes both). `json_number` reads either form; the rounding
//! helpers go through `Decimal` so one-decimal output is exact.
//!
//! Non-finite inputs round to `Decimal::ZERO`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Convert an f64 to Decimal, rounded to 1 decimal place.
pub(crate) fn f64_to_decimal_1dp(v: f64) -> Decimal {
    if !v.is_finite() {
        tracing::warn!(
            "f64_to_decimal_1dp received non-finite value {}, defaulting to 0",
            v
        );
        return Decimal::ZERO;
    }
    Decimal::from_str_exact(&format!("{:.1}", v)).unwrap_or_default()
}

/// Convert a Decimal to f64, defaulting to 0.0 for values that can't be represented.
pub(crate) fn dec_to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

/// Round an f64 to one decimal place.
pub(crate) fn round_1dp(v: f64) -> f64 {
    dec_to_f64(f64_to_decimal_1dp(v))
}

/// First present, non-null value among `aliases`.
///
/// CWA payloads are not consistent about key casing, so lookups try each
/// spelling in order.
pub(crate) fn json_field<'a>(
    obj: &'a serde_json::Value,
    aliases: &[&str],
) -> Option<&'a serde_json::Value> {
    aliases
        .iter()
        .find_map(|key| obj.get(*key).filter(|v| !v.is_null()))
}

/// Read a JSON number or numeric string as f64.
///
/// Returns `None` for placeholders such as `"-"`, empty strings, and
/// non-scalar values.
pub(crate) fn json_number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}
