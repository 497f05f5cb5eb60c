//! Prime fields over [`BigUint`].

use crate::pasta::FieldId;
use num_bigint::BigUint;
use num_traits::{Num, One, Zero};
use rand_core::RngCore;
use std::sync::LazyLock;

static FP: LazyLock<FiniteField> = LazyLock::new(|| FiniteField::new(FieldId::Fp));
static FQ: LazyLock<FiniteField> = LazyLock::new(|| FiniteField::new(FieldId::Fq));

/// The managed field with the given id.
pub fn field(id: FieldId) -> &'static FiniteField {
    match id {
        FieldId::Fp => &FP,
        FieldId::Fq => &FQ,
    }
}

/// A prime field. Elements are canonical [`BigUint`]s below the modulus.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FiniteField {
    id: FieldId,
    modulus: BigUint,
    two_adicity: u32,
    /// Odd `t` with `p - 1 = 2^two_adicity * t`.
    odd_part: BigUint,
    /// Smallest quadratic non-residue.
    non_residue: BigUint,
}

impl FiniteField {
    /// Build the field from its id.
    pub fn new(id: FieldId) -> Self {
        let modulus =
            BigUint::from_str_radix(id.modulus_hex(), 16).expect("modulus constant is valid hex");
        let p_minus_one = &modulus - 1u32;
        let two_adicity = p_minus_one.trailing_zeros().unwrap_or(0);
        let odd_part = &p_minus_one >> two_adicity;

        let mut field = Self {
            id,
            modulus,
            two_adicity: u32::try_from(two_adicity).expect("two-adicity fits in u32"),
            odd_part,
            non_residue: BigUint::zero(),
        };

        let mut candidate = BigUint::from(2u32);
        while field.is_square(&candidate) {
            candidate += 1u32;
        }
        field.non_residue = candidate;
        field
    }

    /// Which field this is.
    pub const fn id(&self) -> FieldId {
        self.id
    }

    /// The modulus `p`.
    pub const fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// Bit length of the modulus.
    pub fn size_in_bits(&self) -> u64 {
        self.modulus.bits()
    }

    /// Largest `s` such that `2^s` divides `p - 1`.
    pub const fn two_adicity(&self) -> u32 {
        self.two_adicity
    }

    /// Is `x` a canonical element?
    pub fn contains(&self, x: &BigUint) -> bool {
        x < &self.modulus
    }

    /// Reduce an arbitrary integer into the field.
    pub fn reduce(&self, x: &BigUint) -> BigUint {
        x % &self.modulus
    }

    /// `a + b`
    pub fn add(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a + b) % &self.modulus
    }

    /// `a - b`
    pub fn sub(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a + &self.modulus - b) % &self.modulus
    }

    /// `-a`
    pub fn negate(&self, a: &BigUint) -> BigUint {
        if a.is_zero() {
            BigUint::zero()
        } else {
            &self.modulus - a
        }
    }

    /// `a * b`
    pub fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.modulus
    }

    /// `a^2`
    pub fn square(&self, a: &BigUint) -> BigUint {
        self.mul(a, a)
    }

    /// `a^e`
    pub fn pow(&self, a: &BigUint, e: &BigUint) -> BigUint {
        a.modpow(e, &self.modulus)
    }

    /// `a^-1`, or `None` for zero.
    pub fn inverse(&self, a: &BigUint) -> Option<BigUint> {
        if a.is_zero() {
            return None;
        }
        Some(self.pow(a, &(&self.modulus - 2u32)))
    }

    /// `a / b`, or `None` if `b` is zero.
    pub fn div(&self, a: &BigUint, b: &BigUint) -> Option<BigUint> {
        self.inverse(b).map(|b_inv| self.mul(a, &b_inv))
    }

    /// Euler's criterion. Zero counts as a square.
    pub fn is_square(&self, a: &BigUint) -> bool {
        a.is_zero() || self.pow(a, &((&self.modulus - 1u32) >> 1u32)).is_one()
    }

    /// Square root by Tonelli-Shanks.
    ///
    /// Of the two roots, returns the one not exceeding `(p - 1) / 2`.
    pub fn sqrt(&self, a: &BigUint) -> Option<BigUint> {
        if a.is_zero() {
            return Some(BigUint::zero());
        }
        if !self.is_square(a) {
            return None;
        }

        let mut m = self.two_adicity;
        let mut c = self.pow(&self.non_residue, &self.odd_part);
        let mut t = self.pow(a, &self.odd_part);
        let mut root = self.pow(a, &((&self.odd_part + 1u32) >> 1u32));

        while !t.is_one() {
            let mut i = 0;
            let mut t_pow = t.clone();
            while !t_pow.is_one() {
                t_pow = self.square(&t_pow);
                i += 1;
                if i == m {
                    return None;
                }
            }

            let mut b = c.clone();
            for _ in 0..(m - i - 1) {
                b = self.square(&b);
            }

            m = i;
            c = self.square(&b);
            t = self.mul(&t, &c);
            root = self.mul(&root, &b);
        }

        let negated = self.negate(&root);
        Some(root.min(negated))
    }

    /// Embed a native integer; negative values are negated.
    pub fn from_int(&self, value: i64) -> BigUint {
        let magnitude = self.reduce(&BigUint::from(value.unsigned_abs()));
        if value < 0 {
            self.negate(&magnitude)
        } else {
            magnitude
        }
    }

    /// Generator of the subgroup of order `2^two_adicity`.
    pub fn two_adic_root_of_unity(&self) -> BigUint {
        self.pow(&self.non_residue, &self.odd_part)
    }

    /// Generator of the multiplicative subgroup of order `2^log2_size`.
    pub fn domain_generator(&self, log2_size: i64) -> Option<BigUint> {
        let log2_size = u32::try_from(log2_size)
            .ok()
            .filter(|&k| k <= self.two_adicity)?;

        let mut root = self.two_adic_root_of_unity();
        for _ in log2_size..self.two_adicity {
            root = self.square(&root);
        }
        Some(root)
    }

    /// A primitive cube root of unity: `g^((p - 1) / 3)` for the smallest
    /// `g >= 2` for which that is not one.
    pub fn cube_root_of_unity(&self) -> Option<BigUint> {
        let p_minus_one = &self.modulus - 1u32;
        if !(&p_minus_one % 3u32).is_zero() {
            return None;
        }

        let exponent = p_minus_one / 3u32;
        let mut base = BigUint::from(2u32);
        loop {
            let root = self.pow(&base, &exponent);
            if !root.is_one() {
                return Some(root);
            }
            base += 1u32;
        }
    }

    /// Decode a canonical 32-byte little-endian element.
    pub fn from_bytes(&self, bytes: &[u8]) -> Option<BigUint> {
        super::decode(bytes).filter(|x| self.contains(x))
    }

    /// Uniformly-ish random element from `rng`.
    pub fn random(&self, rng: &mut impl RngCore) -> BigUint {
        let mut bytes = [0u8; 48];
        rng.fill_bytes(&mut bytes);
        self.reduce(&BigUint::from_bytes_le(&bytes))
    }
}
