use anyhow::{Context, Result};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

use crate::error::AmountError;

pub fn parse_pubkey(s: &str) -> Result<Pubkey> {
    Pubkey::from_str(s.trim()).with_context(|| format!("Invalid public key format: {s}"))
}

pub fn format_amount(amount: u64, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    let divisor = 10u64.pow(decimals as u32);
    let whole = amount / divisor;
    let fraction = amount % divisor;
    format!("{}.{:0width$}", whole, fraction, width = decimals as usize)
}

// No floats: "12.5" with 6 decimals is exactly 12_500_000.
pub fn parse_amount(input: &str, decimals: u8) -> Result<u64, AmountError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(AmountError::Empty);
    }

    let (whole, raw_fraction) = s.split_once('.').unwrap_or((s, ""));
    let digits_only = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if !digits_only(whole)
        || !digits_only(raw_fraction)
        || (whole.is_empty() && raw_fraction.is_empty())
    {
        return Err(AmountError::Malformed(s.to_string()));
    }
    let fraction = raw_fraction.trim_end_matches('0');
    if fraction.len() > decimals as usize {
        return Err(AmountError::TooPrecise {
            amount: s.to_string(),
            decimals,
        });
    }

    let overflow = || AmountError::Overflow(s.to_string());
    let scale = 10u64.checked_pow(decimals as u32).ok_or_else(overflow)?;
    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| overflow())?
    };
    let fraction_units: u64 = if fraction.is_empty() {
        0
    } else {
        let pad = 10u64
            .checked_pow((decimals as usize - fraction.len()) as u32)
            .ok_or_else(overflow)?;
        let f: u64 = fraction.parse().map_err(|_| overflow())?;
        f.checked_mul(pad).ok_or_else(overflow)?
    };

    let base = whole
        .checked_mul(scale)
        .and_then(|w| w.checked_add(fraction_units))
        .ok_or_else(overflow)?;
    if base == 0 {
        return Err(AmountError::Zero);
    }
    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_and_without_decimals() {
        assert_eq!(format_amount(1_500_000_000, 9), "1.500000000");
        assert_eq!(format_amount(42, 0), "42");
        assert_eq!(format_amount(5, 2), "0.05");
    }

    #[test]
    fn scales_exactly() {
        assert_eq!(parse_amount("1", 9).unwrap(), 1_000_000_000);
        assert_eq!(parse_amount("12.5", 2).unwrap(), 1250);
        assert_eq!(parse_amount("0.000000001", 9).unwrap(), 1);
        assert_eq!(parse_amount(".5", 1).unwrap(), 5);
        assert_eq!(parse_amount("3.10", 1).unwrap(), 31);
    }

    #[test]
    fn large_amounts_do_not_lose_precision() {
        // 18446744073.709551615 * 10^9 == u64::MAX
        assert_eq!(parse_amount("18446744073.709551615", 9).unwrap(), u64::MAX);
        assert!(matches!(
            parse_amount("18446744073.709551616", 9),
            Err(AmountError::Overflow(_))
        ));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(parse_amount("", 9), Err(AmountError::Empty)));
        assert!(matches!(parse_amount("abc", 9), Err(AmountError::Malformed(_))));
        assert!(matches!(parse_amount("-1", 9), Err(AmountError::Malformed(_))));
        assert!(matches!(parse_amount("1.2.3", 9), Err(AmountError::Malformed(_))));
        assert!(matches!(parse_amount(".", 9), Err(AmountError::Malformed(_))));
        assert!(matches!(parse_amount("0", 9), Err(AmountError::Zero)));
        assert!(matches!(
            parse_amount("1.234", 2),
            Err(AmountError::TooPrecise { decimals: 2, .. })
        ));
    }

    #[test]
    fn parses_pubkeys() {
        let key = Pubkey::new_unique();
        assert_eq!(parse_pubkey(&format!(" {key} ")).unwrap(), key);
        assert!(parse_pubkey("not-a-key").is_err());
    }
}
