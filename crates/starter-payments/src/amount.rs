// ============================================================================
// STARTER-PAYMENTS - Amounts
// ============================================================================
// Stellar amounts are decimal strings with at most 7 fractional digits,
// carried on the wire as i64 stroops. Conversion is exact: anything that
// cannot be represented without rounding is rejected.

use crate::error::ClientError;
use crate::Result;

/// Stroops per whole unit (1 XLM = 10,000,000 stroops)
pub const STROOPS_PER_UNIT: i64 = 10_000_000;

const DECIMALS: usize = 7;

/// Parse a strictly positive decimal amount into stroops
pub fn parse_amount(amount: &str) -> Result<i64> {
    let invalid = |reason: &str| ClientError::InvalidAmount(format!("{:?}: {}", amount, reason));

    let (whole, fraction) = match amount.split_once('.') {
        Some((w, f)) => (w, f),
        None => (amount, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("empty"));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("not a plain decimal number"));
    }
    if fraction.len() > DECIMALS {
        return Err(invalid("more than 7 decimal places"));
    }

    let whole_value: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid("too large"))?
    };

    let mut fraction_digits = fraction.to_string();
    while fraction_digits.len() < DECIMALS {
        fraction_digits.push('0');
    }
    let fraction_value: i64 = fraction_digits.parse().map_err(|_| invalid("bad fraction"))?;

    let stroops = whole_value
        .checked_mul(STROOPS_PER_UNIT)
        .and_then(|w| w.checked_add(fraction_value))
        .ok_or_else(|| invalid("too large"))?;

    if stroops <= 0 {
        return Err(invalid("must be greater than zero"));
    }

    Ok(stroops)
}

/// Render stroops the way Horizon does ("10.0000000")
pub fn format_stroops(stroops: i64) -> String {
    let sign = if stroops < 0 { "-" } else { "" };
    let abs = stroops.unsigned_abs();
    let unit = STROOPS_PER_UNIT as u64;
    format!("{}{}.{:07}", sign, abs / unit, abs % unit)
}
