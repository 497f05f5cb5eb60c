//! Fixed-width 256-bit integers.

use crate::{pasta::BIGINT_BITS, value::FieldBytes};
use crypto_bigint::{Encoding, U256};

/// Largest power of ten below `2^64`, the chunk size of decimal rendering.
const DECIMAL_CHUNK: u64 = 10_000_000_000_000_000_000;
const DECIMAL_CHUNK_DIGITS: usize = 19;

/// Decode exactly 32 little-endian bytes.
pub fn decode(bytes: &[u8]) -> Option<U256> {
    let bytes = FieldBytes::try_from(bytes).ok()?;
    Some(U256::from_le_bytes(bytes))
}

/// Encode as 32 little-endian bytes.
pub fn encode(x: &U256) -> FieldBytes {
    x.to_le_bytes()
}

/// Checked bit access for indices coming over the bridge.
pub fn test_bit(x: &U256, index: i64) -> Option<bool> {
    let index = usize::try_from(index)
        .ok()
        .filter(|&i| i < BIGINT_BITS as usize)?;
    Some(x.bit_vartime(index))
}

/// Truncating division, `None` on a zero divisor.
pub fn checked_div(x: &U256, rhs: &U256) -> Option<U256> {
    x.checked_div(rhs).into()
}

fn low_word(x: &U256) -> u64 {
    let bytes = x.to_le_bytes();
    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(word)
}

/// Parse a numeral in `base` (2 to 36), rejecting overflow past 256 bits.
pub fn parse_numeral(numeral: &str, base: i64) -> Option<U256> {
    let radix = u32::try_from(base).ok().filter(|b| (2..=36).contains(b))?;
    if numeral.is_empty() {
        return None;
    }

    let base = U256::from_u64(u64::from(radix));
    let mut acc = U256::ZERO;
    for c in numeral.chars() {
        let digit = U256::from_u64(u64::from(c.to_digit(radix)?));
        // acc * base + digit <= MAX
        let bound = U256::MAX.wrapping_sub(&digit).wrapping_div(&base);
        if acc > bound {
            return None;
        }
        acc = acc.wrapping_mul(&base).wrapping_add(&digit);
    }
    Some(acc)
}

/// Decimal rendering without leading zeros.
pub fn to_decimal(x: &U256) -> String {
    let chunk = U256::from_u64(DECIMAL_CHUNK);
    let mut chunks = Vec::new();
    let mut rest = *x;
    loop {
        chunks.push(low_word(&rest.wrapping_rem(&chunk)));
        rest = rest.wrapping_div(&chunk);
        if rest == U256::ZERO {
            break;
        }
    }

    let mut out = String::new();
    for (i, chunk) in chunks.iter().rev().enumerate() {
        if i == 0 {
            out.push_str(&chunk.to_string());
        } else {
            out.push_str(&format!("{chunk:0width$}", width = DECIMAL_CHUNK_DIGITS));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{checked_div, parse_numeral, test_bit, to_decimal};
    use crypto_bigint::U256;

    #[test]
    fn decimal_rendering() {
        assert_eq!(to_decimal(&U256::ZERO), "0");
        assert_eq!(to_decimal(&U256::from_u64(u64::MAX)), "18446744073709551615");
        assert_eq!(
            to_decimal(&U256::MAX),
            "115792089237316195423570985008687907853269984665640564039457584007913129639935"
        );
    }

    #[test]
    fn numerals() {
        assert_eq!(parse_numeral("ff", 16), Some(U256::from_u64(255)));
        assert_eq!(parse_numeral("101", 2), Some(U256::from_u64(5)));
        assert_eq!(parse_numeral("12a", 10), None);
        assert_eq!(parse_numeral("", 10), None);
        assert_eq!(parse_numeral("-1", 10), None);
        assert_eq!(parse_numeral("7", 1), None);
        assert_eq!(
            parse_numeral(
                "115792089237316195423570985008687907853269984665640564039457584007913129639935",
                10
            ),
            Some(U256::MAX)
        );
        assert_eq!(
            parse_numeral(
                "115792089237316195423570985008687907853269984665640564039457584007913129639936",
                10
            ),
            None
        );
    }

    #[test]
    fn bit_access() {
        let x = U256::from_u64(0b1010);
        assert_eq!(test_bit(&x, 1), Some(true));
        assert_eq!(test_bit(&x, 2), Some(false));
        assert_eq!(test_bit(&x, 256), None);
        assert_eq!(test_bit(&x, -3), None);
        assert_eq!(test_bit(&U256::MAX, 255), Some(true));
    }

    #[test]
    fn division() {
        assert_eq!(checked_div(&U256::from_u64(9), &U256::ZERO), None);
        assert_eq!(
            checked_div(&U256::from_u64(9), &U256::from_u64(4)),
            Some(U256::from_u64(2))
        );
        assert_eq!(checked_div(&U256::MAX, &U256::MAX), Some(U256::ONE));
    }
}
