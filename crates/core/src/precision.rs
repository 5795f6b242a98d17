//! Significant-digit rounding and display of p-values.

/// Significant digits used for p-values and slider values.
pub const DEFAULT_PRECISION: usize = 5;

/// Round `value` to `digits` significant digits.
pub fn round_significant(value: f64, digits: usize) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let digits = digits.max(1);
    format!("{:.*e}", digits - 1, value)
        .parse()
        .unwrap_or(value)
}

/// Format `value` with `digits` significant digits.
///
/// Uses fixed notation unless the decimal exponent is below -6 or at
/// least `digits`, in which case exponential notation (`1.0000e-7`) is
/// used. Trailing zeros are kept: `0.0001` at five digits is
/// `0.00010000`.
pub fn format_significant(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let digits = digits.max(1);
    if value == 0.0 {
        return format!("{:.*}", digits - 1, 0.0);
    }

    let sci = format!("{:.*e}", digits - 1, value);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);

    if exp < -6 || exp >= digits as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{}", exp.unsigned_abs())
    } else {
        let decimals = (digits as i32 - 1 - exp).max(0) as usize;
        format!("{value:.decimals$}")
    }
}

/// Display form of a p-value: `None` outside `[0, 1]`, `"1"` for exactly
/// one, otherwise five significant digits.
pub fn format_pvalue(value: Option<f64>) -> Option<String> {
    let v = value?;
    if !(0.0..=1.0).contains(&v) {
        return None;
    }
    if v == 1.0 {
        return Some("1".to_string());
    }
    Some(format_significant(v, DEFAULT_PRECISION))
}
