//! Decimal text <-> fixed-point integer conversion
//!
//! Amounts are native-currency base units (18 decimals), prices use the
//! oracle's 8 decimals. Parsing is exact: input with more fractional digits
//! than the unit supports is rejected, never rounded.

use thiserror::Error;

/// Largest decimal count whose scale factor fits in a u128
pub const MAX_DECIMALS: u32 = 38;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitsError {
    #[error("empty value")]
    Empty,

    #[error("negative values are not allowed: {0}")]
    Negative(String),

    #[error("not a decimal number: {0}")]
    Malformed(String),

    #[error("{value} has more than {decimals} fractional digits")]
    TooPrecise { value: String, decimals: u32 },

    #[error("{0} does not fit in 128 bits")]
    Overflow(String),

    #[error("unsupported decimals: {0} (max {MAX_DECIMALS})")]
    Decimals(u32),
}

fn scale(decimals: u32) -> Result<u128, UnitsError> {
    if decimals > MAX_DECIMALS {
        return Err(UnitsError::Decimals(decimals));
    }
    Ok(10u128.pow(decimals))
}

/// Parse `"1.5"` with 18 decimals into `1500000000000000000`.
pub fn parse_units(text: &str, decimals: u32) -> Result<u128, UnitsError> {
    let unit = scale(decimals)?;
    let text = text.trim().replace('_', "");
    if text.is_empty() {
        return Err(UnitsError::Empty);
    }
    if text.starts_with('-') {
        return Err(UnitsError::Negative(text));
    }
    let body = text.strip_prefix('+').unwrap_or(&text);

    let (whole, frac) = match body.split_once('.') {
        Some((w, f)) => (w, f),
        None => (body, ""),
    };
    let digits_only = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !digits_only(whole) || !digits_only(frac) {
        return Err(UnitsError::Malformed(text));
    }
    if frac.len() > decimals as usize {
        return Err(UnitsError::TooPrecise { value: text, decimals });
    }

    let overflow = || UnitsError::Overflow(text.clone());
    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| overflow())?
    };
    let frac_units: u128 = if frac.is_empty() {
        0
    } else {
        // frac.len() <= decimals <= 38, so the padded value fits
        let padded = format!("{:0<width$}", frac, width = decimals as usize);
        padded.parse().map_err(|_| overflow())?
    };

    whole
        .checked_mul(unit)
        .and_then(|w| w.checked_add(frac_units))
        .ok_or_else(overflow)
}

/// Format with trailing fractional zeros trimmed, keeping at least one digit
/// (`3000000000000000000` with 18 decimals is `"3.0"`).
pub fn format_units(value: u128, decimals: u32) -> String {
    let full = format_fixed(value, decimals);
    match full.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                format!("{}.0", whole)
            } else {
                format!("{}.{}", whole, frac)
            }
        }
        None => full,
    }
}

/// Format showing every fractional digit (`300000000000` with 8 decimals is
/// `"3000.00000000"`).
pub fn format_fixed(value: u128, decimals: u32) -> String {
    if decimals == 0 {
        return value.to_string();
    }
    let digits = format!("{:0>width$}", value, width = decimals as usize + 1);
    let (whole, frac) = digits.split_at(digits.len() - decimals as usize);
    format!("{}.{}", whole, frac)
}
