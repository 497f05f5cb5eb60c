//! Strategies drawing logical values.
//!
//! Every strategy mixes a uniform draw with a few fixed edge cases (zero, one,
//! the largest value) so the boundaries are reached in a few hundred trials.

use crate::{
    managed::{Bigint256, FiniteField, GroupProjective, ProjectiveCurve},
    value::FIELD_BYTES,
};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use proptest::{collection, prelude::*};

prop_compose! {
    /// Uniform integer of at most 256 bits.
    pub fn uniform_u256()(bytes in any::<[u8; FIELD_BYTES]>()) -> BigUint {
        BigUint::from_bytes_le(&bytes)
    }
}

prop_compose! {
    /// Integer in `0..bound`; `bound` must be nonzero.
    ///
    /// Draws 384 bits before reducing, which keeps the bias negligible for
    /// 255-bit moduli.
    pub fn below(bound: BigUint)(
        low in any::<[u8; FIELD_BYTES]>(),
        high in any::<u128>(),
    ) -> BigUint {
        let mut bytes = low.to_vec();
        bytes.extend_from_slice(&high.to_le_bytes());
        BigUint::from_bytes_le(&bytes) % &bound
    }
}

/// Largest integer of `bits` bits.
pub fn max_of_bits(bits: u32) -> BigUint {
    (BigUint::one() << bits) - 1u32
}

/// 256-bit integers: zero, one, word-sized, the maximum and uniform draws.
pub fn bigint256() -> BoxedStrategy<Bigint256> {
    prop_oneof![
        1 => Just(BigUint::zero()),
        1 => Just(BigUint::one()),
        2 => any::<u64>().prop_map(BigUint::from),
        1 => Just(max_of_bits(256)),
        5 => uniform_u256(),
    ]
    .prop_filter_map("wider than 256 bits", Bigint256::new)
    .boxed()
}

/// Field elements: zero, one, `p - 1`, small values and uniform draws.
pub fn field_element(field: &'static FiniteField) -> BoxedStrategy<BigUint> {
    let p_minus_one = field.modulus() - 1u32;
    prop_oneof![
        1 => Just(BigUint::zero()),
        1 => Just(BigUint::one()),
        1 => Just(p_minus_one),
        1 => (0u32..16).prop_map(BigUint::from),
        6 => below(field.modulus().clone()),
    ]
    .boxed()
}

/// Nonzero scalars for `curve`.
pub fn nonzero_scalar(curve: &'static ProjectiveCurve) -> BoxedStrategy<BigUint> {
    let order_minus_one = curve.scalar().modulus() - 1u32;
    below(order_minus_one).prop_map(|k| k + 1u32).boxed()
}

/// Which points a point strategy may draw.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum PointCases {
    /// Identity (1), generator (1) and random multiples of the generator (3).
    #[default]
    Mixed,
    /// Generator (1) and nonzero multiples of the generator (3).
    NonIdentity,
    /// Only the identity.
    Identity,
}

/// Curve points as multiples of the generator; uniform coordinates would
/// almost never land on the curve.
pub fn point(
    curve: &'static ProjectiveCurve,
    cases: PointCases,
) -> BoxedStrategy<GroupProjective> {
    let multiple = nonzero_scalar(curve).prop_map(move |k| curve.scale(&curve.one(), &k));
    match cases {
        PointCases::Mixed => prop_oneof![
            1 => Just(curve.zero()),
            1 => Just(curve.one()),
            3 => multiple,
        ]
        .boxed(),
        PointCases::NonIdentity => prop_oneof![
            1 => Just(curve.one()),
            3 => multiple,
        ]
        .boxed(),
        PointCases::Identity => Just(curve.zero()).boxed(),
    }
}

/// Byte buffers: mostly 32 bytes, sometimes any length up to `max_len`.
pub fn bytes(max_len: usize) -> BoxedStrategy<Vec<u8>> {
    prop_oneof![
        4 => any::<[u8; FIELD_BYTES]>().prop_map(|bytes| bytes.to_vec()),
        1 => collection::vec(any::<u8>(), 0..=max_len),
    ]
    .boxed()
}

/// Encodings of field elements mixed with unreduced and mis-sized buffers.
pub fn field_encodings(field: &'static FiniteField) -> BoxedStrategy<Vec<u8>> {
    prop_oneof![
        4 => field_element(field).prop_map(|x| {
            let mut bytes = x.to_bytes_le();
            bytes.resize(FIELD_BYTES, 0);
            bytes
        }),
        1 => any::<[u8; FIELD_BYTES]>().prop_map(|bytes| bytes.to_vec()),
        1 => collection::vec(any::<u8>(), 0..=2 * FIELD_BYTES),
    ]
    .boxed()
}

/// Decimal strings: mostly values below `bound`, sometimes values at or above
/// it, malformed text or the empty string.
pub fn decimal_string(bound: BigUint) -> BoxedStrategy<String> {
    let over = below(bound.clone()).prop_map({
        let bound = bound.clone();
        move |x| (x + &bound).to_str_radix(10)
    });
    prop_oneof![
        6 => below(bound).prop_map(|x| x.to_str_radix(10)),
        1 => over,
        1 => "[0-9]{0,8}[a-z_ ][0-9]{0,8}",
        1 => Just(String::new()),
    ]
    .boxed()
}

/// Numerals whose digits are valid in base 2, 8, 10 or 16, plus junk.
pub fn numeral_string() -> BoxedStrategy<String> {
    prop_oneof![
        1 => "[01]{1,256}",
        1 => "[0-7]{1,86}",
        2 => "[0-9]{1,78}",
        2 => "[0-9a-fA-F]{1,64}",
        1 => "[0-9a-f]{65,70}",
        1 => "[0-9a-z_+ -]{0,12}",
    ]
    .boxed()
}
