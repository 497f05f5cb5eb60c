//! The managed implementation: arbitrary-precision arithmetic on
//! [`BigUint`], whose types make up the logical domain of the harness.

mod bigint;
mod bindings;
mod curve;
mod field;

pub use self::{
    bigint::Bigint256,
    bindings::bindings,
    curve::{GroupAffine, GroupProjective, OrInfinity, ProjectiveCurve, curve},
    field::{FiniteField, field},
};

use crate::value::{FIELD_BYTES, FieldBytes};
use num_bigint::BigUint;

/// Little-endian encoding of `value`, or `None` if it needs more than 32 bytes.
pub fn encode(value: &BigUint) -> Option<FieldBytes> {
    let le = value.to_bytes_le();
    if le.len() > FIELD_BYTES {
        return None;
    }

    let mut out = [0u8; FIELD_BYTES];
    out[..le.len()].copy_from_slice(&le);
    Some(out)
}

/// Decode a 32-byte little-endian buffer.
pub fn decode(bytes: &[u8]) -> Option<BigUint> {
    (bytes.len() == FIELD_BYTES).then(|| BigUint::from_bytes_le(bytes))
}

/// Parse a numeral in `base`, accepting only digits of that base.
///
/// Signs, separators and the empty string are rejected.
pub(crate) fn parse_numeral(numeral: &str, base: i64) -> Option<BigUint> {
    let base = u32::try_from(base).ok().filter(|b| (2..=36).contains(b))?;
    if numeral.is_empty() || !numeral.chars().all(|c| c.is_digit(base)) {
        return None;
    }

    BigUint::parse_bytes(numeral.as_bytes(), base)
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, parse_numeral};
    use num_bigint::BigUint;

    #[test]
    fn encoding_is_little_endian() {
        let bytes = encode(&BigUint::from(0x0102u32)).expect("fits");
        assert_eq!(bytes[0], 0x02);
        assert_eq!(bytes[1], 0x01);
        assert!(bytes[2..].iter().all(|&b| b == 0));
        assert_eq!(decode(&bytes), Some(BigUint::from(0x0102u32)));
    }

    #[test]
    fn oversized_values_do_not_encode() {
        assert_eq!(encode(&(BigUint::from(1u8) << 256u32)), None);
        assert_eq!(decode(&[0u8; 31]), None);
    }

    #[test]
    fn numerals() {
        assert_eq!(parse_numeral("ff", 16), Some(BigUint::from(255u32)));
        assert_eq!(parse_numeral("FF", 16), Some(BigUint::from(255u32)));
        assert_eq!(parse_numeral("102", 2), None);
        assert_eq!(parse_numeral("1_000", 10), None);
        assert_eq!(parse_numeral("+1", 10), None);
        assert_eq!(parse_numeral("", 10), None);
        assert_eq!(parse_numeral("1", 37), None);
        assert_eq!(parse_numeral("1", 1), None);
    }
}
