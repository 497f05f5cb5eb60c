//! 256-bit unsigned integers.

use crate::{
    pasta::BIGINT_BITS,
    value::{FIELD_BYTES, FieldBytes},
};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::Zero;

/// An unsigned integer of at most 256 bits.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Bigint256(BigUint);

impl Bigint256 {
    /// Number of bytes in the encoding.
    pub const BYTES: usize = FIELD_BYTES;

    /// Wrap `value`, or `None` if it needs more than 256 bits.
    pub fn new(value: BigUint) -> Option<Self> {
        (value.bits() <= BIGINT_BITS as u64).then_some(Self(value))
    }

    /// Integer from a native word.
    pub fn from_u64(value: u64) -> Self {
        Self(BigUint::from(value))
    }

    /// Borrow the value.
    pub const fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Unwrap the value.
    pub fn into_biguint(self) -> BigUint {
        self.0
    }

    /// Decode from exactly 32 little-endian bytes.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        super::decode(bytes).map(Self)
    }

    /// Encode as 32 little-endian bytes.
    pub fn to_bytes(&self) -> FieldBytes {
        super::encode(&self.0).expect("value bounded to 256 bits")
    }

    /// Parse a decimal string.
    pub fn from_decimal(decimal: &str) -> Option<Self> {
        Self::from_numeral(decimal, 10)
    }

    /// Parse a numeral in `base` (2 to 36).
    pub fn from_numeral(numeral: &str, base: i64) -> Option<Self> {
        super::parse_numeral(numeral, base).and_then(Self::new)
    }

    /// Decimal representation.
    pub fn to_decimal(&self) -> String {
        self.0.to_str_radix(10)
    }

    /// Truncating division, or `None` if `rhs` is zero.
    pub fn checked_div(&self, rhs: &Self) -> Option<Self> {
        (!rhs.0.is_zero()).then(|| Self(self.0.div_floor(&rhs.0)))
    }

    /// Bit `index` (little-endian), or `None` if `index` is outside `0..256`.
    pub fn test_bit(&self, index: i64) -> Option<bool> {
        (0..BIGINT_BITS)
            .contains(&index)
            .then(|| self.0.bit(index as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::Bigint256;
    use num_bigint::BigUint;
    use num_traits::One;

    #[test]
    fn rejects_wide_values() {
        assert!(Bigint256::new(BigUint::one() << 255u32).is_some());
        assert!(Bigint256::new(BigUint::one() << 256u32).is_none());
    }

    #[test]
    fn decimal_overflow() {
        let max = (BigUint::one() << 256u32) - 1u32;
        assert!(Bigint256::from_decimal(&max.to_string()).is_some());
        assert!(Bigint256::from_decimal(&(max + 1u32).to_string()).is_none());
    }

    #[test]
    fn test_bit_range() {
        let x = Bigint256::from_u64(0b101);
        assert_eq!(x.test_bit(0), Some(true));
        assert_eq!(x.test_bit(1), Some(false));
        assert_eq!(x.test_bit(255), Some(false));
        assert_eq!(x.test_bit(256), None);
        assert_eq!(x.test_bit(300), None);
        assert_eq!(x.test_bit(-1), None);
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(
            Bigint256::from_u64(7).checked_div(&Bigint256::default()),
            None
        );
        assert_eq!(
            Bigint256::from_u64(7).checked_div(&Bigint256::from_u64(2)),
            Some(Bigint256::from_u64(3))
        );
    }
}
