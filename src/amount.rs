//! Token amounts in deterministic fixed-point

use crate::error::SimError;
use fixed::types::I64F64;

/// Amount type for requested transfers and fetched balances.
pub type TokenAmount = I64F64;

/// Highest precision a token contract may report and still be scaled.
pub const MAX_DECIMALS: u8 = 18;

/// Parses a user-supplied amount. Only plain positive decimals are accepted.
pub fn parse_amount(raw: &str) -> Result<TokenAmount, SimError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SimError::InvalidAmount(
            "amount cannot be empty".to_string(),
        ));
    }

    let amount: TokenAmount = trimmed
        .parse()
        .map_err(|e| SimError::InvalidAmount(format!("'{}' is not a number: {}", trimmed, e)))?;

    if amount <= TokenAmount::ZERO {
        return Err(SimError::InvalidAmount(format!(
            "'{}' must be greater than zero",
            trimmed
        )));
    }

    Ok(amount)
}

/// Scales an integer contract balance down by `10^decimals`.
pub fn from_raw_units(raw: u128, decimals: u8) -> Option<TokenAmount> {
    if decimals > MAX_DECIMALS {
        return None;
    }
    let scale = 10u128.pow(decimals as u32);

    let whole = TokenAmount::checked_from_num(raw / scale)?;
    let frac = TokenAmount::checked_from_num(raw % scale)?
        .checked_div(TokenAmount::checked_from_num(scale)?)?;
    whole.checked_add(frac)
}

/// Prints `amount` with exactly `decimals` fractional digits, rounding half
/// up on the last digit. Works on the raw bits so no precision is lost.
pub fn format_amount(amount: TokenAmount, decimals: u8) -> String {
    let bits = amount.to_bits();
    let sign = if bits < 0 { "-" } else { "" };
    let magnitude = bits.unsigned_abs();

    let frac_bits = TokenAmount::FRAC_NBITS;
    let mut whole = magnitude >> frac_bits;
    let frac = magnitude & ((1u128 << frac_bits) - 1);

    let decimals = decimals.min(MAX_DECIMALS) as u32;
    let scale = 10u128.pow(decimals);
    // frac < 2^64 and scale <= 10^18 < 2^60, so the product fits
    let mut digits = (frac * scale + (1u128 << (frac_bits - 1))) >> frac_bits;
    if digits == scale {
        whole += 1;
        digits = 0;
    }

    if decimals == 0 {
        format!("{}{}", sign, whole)
    } else {
        format!("{}{}.{:0width$}", sign, whole, digits, width = decimals as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_positive_decimals() {
        assert_eq!(parse_amount("10").unwrap(), TokenAmount::from_num(10));
        assert_eq!(parse_amount("0.5").unwrap(), TokenAmount::from_num(0.5));
        assert_eq!(parse_amount("  3.25 \n").unwrap(), TokenAmount::from_num(3.25));
        assert!(parse_amount("0.000001").is_ok());
    }

    #[test]
    fn test_rejects_non_positive() {
        for raw in ["0", "0.0", "-5", "-0.01"] {
            let result = parse_amount(raw);
            assert!(
                matches!(result, Err(SimError::InvalidAmount(_))),
                "accepted {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_rejects_non_numeric() {
        for raw in ["", "   ", "abc", "10 USDT", "NaN", "inf", "1,5", "--1"] {
            assert!(parse_amount(raw).is_err(), "accepted {:?}", raw);
        }
    }

    #[test]
    fn test_rejects_overflow() {
        assert!(parse_amount("99999999999999999999999999").is_err());
    }

    #[test]
    fn test_from_raw_units() {
        assert_eq!(from_raw_units(12_500_000, 6), Some(TokenAmount::from_num(12.5)));
        assert_eq!(from_raw_units(0, 6), Some(TokenAmount::ZERO));
        assert_eq!(from_raw_units(7, 0), Some(TokenAmount::from_num(7)));
        assert_eq!(from_raw_units(1, 19), None);
        assert_eq!(from_raw_units(u128::MAX, 0), None);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(TokenAmount::from_num(10), 6), "10.000000");
        assert_eq!(format_amount(TokenAmount::from_num(0.5), 2), "0.50");
        assert_eq!(format_amount(TokenAmount::from_num(3), 0), "3");
        assert_eq!(format_amount(parse_amount("0.1").unwrap(), 6), "0.100000");
        assert_eq!(format_amount(parse_amount("2.5").unwrap(), 0), "3");
        assert_eq!(format_amount(parse_amount("9.9999999").unwrap(), 6), "10.000000");
        assert_eq!(format_amount(TokenAmount::from_num(-1.5), 1), "-1.5");
    }

    #[test]
    fn test_format_large_amount_exactly() {
        let amount = parse_amount("123456789012345678.5").unwrap();
        assert_eq!(format_amount(amount, 6), "123456789012345678.500000");

        let balance = from_raw_units(9_000_000_000_000_000_123_456, 6).unwrap();
        assert_eq!(format_amount(balance, 6), "9000000000000000.123456");
    }
}
