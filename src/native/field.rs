//! Prime fields in Montgomery form over [`U256`].

use super::bigint;
use crate::{pasta::FieldId, value::FieldBytes};
use crypto_bigint::{
    U256,
    modular::runtime_mod::{DynResidue, DynResidueParams},
};
use rand_core::RngCore;
use std::sync::LazyLock;
use subtle::ConstantTimeEq;

/// Limb count of [`U256`] on this target.
pub const LIMBS: usize = U256::LIMBS;

/// A field element in Montgomery form.
pub type Element = DynResidue<LIMBS>;

static FP: LazyLock<PrimeField> = LazyLock::new(|| PrimeField::new(FieldId::Fp));
static FQ: LazyLock<PrimeField> = LazyLock::new(|| PrimeField::new(FieldId::Fq));

/// The native field with the given id.
pub fn field(id: FieldId) -> &'static PrimeField {
    match id {
        FieldId::Fp => &FP,
        FieldId::Fq => &FQ,
    }
}

/// Parameters of one prime field.
#[derive(Debug)]
pub struct PrimeField {
    id: FieldId,
    modulus: U256,
    params: DynResidueParams<LIMBS>,
    two_adicity: usize,
    odd_part: U256,
    root_of_unity: Element,
}

impl PrimeField {
    fn new(id: FieldId) -> Self {
        let modulus = U256::from_be_hex(id.modulus_hex());
        let params = DynResidueParams::new(&modulus);
        let p_minus_one = modulus.wrapping_sub(&U256::ONE);

        let two_adicity = p_minus_one.trailing_zeros_vartime();
        let odd_part = p_minus_one.shr_vartime(two_adicity);

        let mut field = Self {
            id,
            modulus,
            params,
            two_adicity,
            odd_part,
            root_of_unity: DynResidue::one(params),
        };

        let mut candidate = 2;
        while field.is_square(&field.from_u64(candidate)) {
            candidate += 1;
        }
        field.root_of_unity = field.from_u64(candidate).pow(&field.odd_part);
        field
    }

    /// Which field this is.
    pub const fn id(&self) -> FieldId {
        self.id
    }

    /// The modulus.
    pub const fn modulus(&self) -> &U256 {
        &self.modulus
    }

    /// Bit length of the modulus.
    pub fn size_in_bits(&self) -> usize {
        self.modulus.bits_vartime()
    }

    /// `s` with `p - 1 = 2^s * t`, `t` odd.
    pub const fn two_adicity(&self) -> usize {
        self.two_adicity
    }

    /// `0`
    pub fn zero(&self) -> Element {
        DynResidue::zero(self.params)
    }

    /// `1`
    pub fn one(&self) -> Element {
        DynResidue::one(self.params)
    }

    /// Element from a canonical integer.
    pub fn element(&self, x: &U256) -> Option<Element> {
        (x < &self.modulus).then(|| DynResidue::new(x, self.params))
    }

    /// Element from a native word, reduced.
    pub fn from_u64(&self, x: u64) -> Element {
        DynResidue::new(&U256::from_u64(x).wrapping_rem(&self.modulus), self.params)
    }

    /// Element from a signed native word; negative values are negated.
    pub fn from_int(&self, x: i64) -> Element {
        let magnitude = self.from_u64(x.unsigned_abs());
        if x < 0 { -magnitude } else { magnitude }
    }

    /// Decode a canonical 32-byte little-endian element.
    pub fn from_bytes(&self, bytes: &[u8]) -> Option<Element> {
        bigint::decode(bytes).and_then(|x| self.element(&x))
    }

    /// Canonical 32-byte little-endian encoding.
    pub fn to_bytes(&self, x: &Element) -> FieldBytes {
        bigint::encode(&x.retrieve())
    }

    /// Are `a` and `b` the same element?
    pub fn equal(&self, a: &Element, b: &Element) -> bool {
        a.retrieve().ct_eq(&b.retrieve()).into()
    }

    /// Is `a` zero?
    pub fn is_zero(&self, a: &Element) -> bool {
        a.retrieve() == U256::ZERO
    }

    /// `a^-1`, `None` for zero.
    pub fn invert(&self, a: &Element) -> Option<Element> {
        let (inverse, is_some) = a.invert();
        bool::from(is_some).then_some(inverse)
    }

    /// Legendre symbol test; zero is a square.
    pub fn is_square(&self, a: &Element) -> bool {
        let half = self.modulus.shr_vartime(1);
        self.is_zero(a) || self.equal(&a.pow(&half), &self.one())
    }

    /// The square root of `a` whose canonical value is the smaller one.
    pub fn sqrt(&self, a: &Element) -> Option<Element> {
        if !self.is_square(a) {
            return None;
        }
        if self.is_zero(a) {
            return Some(self.zero());
        }

        let exponent = self.odd_part.shr_vartime(1);
        let w = a.pow(&exponent);
        let mut x = *a * w;
        let mut b = x * w;
        let mut z = self.root_of_unity;
        let mut v = self.two_adicity;

        while !self.equal(&b, &self.one()) {
            let mut k = 0;
            let mut b2k = b;
            while !self.equal(&b2k, &self.one()) {
                b2k = b2k.square();
                k += 1;
            }

            let mut w = z;
            for _ in 1..(v - k) {
                w = w.square();
            }
            z = w.square();
            b *= z;
            x *= w;
            v = k;
        }

        let y = -x;
        Some(if x.retrieve() <= y.retrieve() { x } else { y })
    }

    /// Generator of the subgroup of order `2^s`.
    pub const fn two_adic_root_of_unity(&self) -> Element {
        self.root_of_unity
    }

    /// Generator of the subgroup of order `2^log2_size`.
    pub fn domain_generator(&self, log2_size: i64) -> Option<Element> {
        let log2_size = usize::try_from(log2_size)
            .ok()
            .filter(|&k| k <= self.two_adicity)?;

        let mut exponent = U256::ONE;
        for _ in log2_size..self.two_adicity {
            exponent = exponent.shl_vartime(1);
        }
        Some(self.root_of_unity.pow(&exponent))
    }

    /// `g^((p - 1) / 3)` for the first `g >= 2` giving a nontrivial root.
    pub fn cube_root_of_unity(&self) -> Option<Element> {
        let p_minus_one = self.modulus.wrapping_sub(&U256::ONE);
        let three = U256::from_u64(3);
        if p_minus_one.wrapping_rem(&three) != U256::ZERO {
            return None;
        }

        let exponent = p_minus_one.wrapping_div(&three);
        (2..)
            .map(|g| self.from_u64(g).pow(&exponent))
            .find(|root| !self.equal(root, &self.one()))
    }

    /// Random element drawn by rejection sampling.
    pub fn random(&self, rng: &mut impl RngCore) -> Element {
        let top_bits = self.size_in_bits() % 8;
        loop {
            let mut bytes = [0u8; 32];
            rng.fill_bytes(&mut bytes);
            if top_bits != 0 {
                let last = (self.size_in_bits() - 1) / 8;
                bytes[last] &= (1u8 << top_bits) - 1;
            }
            if let Some(x) = self.from_bytes(&bytes) {
                return x;
            }
        }
    }
}
