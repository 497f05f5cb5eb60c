//! Parameters of the Pallas/Vesta curve cycle, shared by both backends.
//!
//! Pallas is `y^2 = x^3 + 5` over `Fp` with scalar field `Fq`; Vesta is the
//! same equation over `Fq` with scalar field `Fp`. Both use `(-1, 2)` as
//! generator.

use core::fmt;

/// Big-endian hex modulus of `Fp`, the Pallas base field.
pub const FP_MODULUS: &str = "40000000000000000000000000000000224698fc094cf91b992d30ed00000001";

/// Big-endian hex modulus of `Fq`, the Vesta base field.
pub const FQ_MODULUS: &str = "40000000000000000000000000000000224698fc0994a8dd8c46eb2100000001";

/// Constant term `b` of both curve equations.
pub const CURVE_B: u64 = 5;

/// Limb count reported by `bigint256_num_limbs`.
pub const NUM_LIMBS: i64 = 4;

/// Limb width reported by `bigint256_bytes_per_limb`.
pub const BYTES_PER_LIMB: i64 = 8;

/// Number of bits addressable by `bigint256_test_bit`.
pub const BIGINT_BITS: i64 = 256;

/// The two prime fields of the cycle.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum FieldId {
    /// Pallas base field, Vesta scalar field.
    Fp,
    /// Vesta base field, Pallas scalar field.
    Fq,
}

impl FieldId {
    /// Operation name prefix on the bridge.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Fp => "fp",
            Self::Fq => "fq",
        }
    }

    /// Big-endian hex modulus.
    pub const fn modulus_hex(self) -> &'static str {
        match self {
            Self::Fp => FP_MODULUS,
            Self::Fq => FQ_MODULUS,
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// The two curves of the cycle.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum CurveId {
    /// Pallas.
    Pallas,
    /// Vesta.
    Vesta,
}

impl CurveId {
    /// Operation name prefix on the bridge.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Pallas => "pallas",
            Self::Vesta => "vesta",
        }
    }

    /// Field the coordinates live in.
    pub const fn base(self) -> FieldId {
        match self {
            Self::Pallas => FieldId::Fp,
            Self::Vesta => FieldId::Fq,
        }
    }

    /// Field of scalars, i.e. the group order.
    pub const fn scalar(self) -> FieldId {
        match self {
            Self::Pallas => FieldId::Fq,
            Self::Vesta => FieldId::Fp,
        }
    }
}

impl fmt::Display for CurveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Full bridge name of operation `op` in namespace `prefix`.
pub fn op_name(prefix: impl fmt::Display, op: &str) -> String {
    format!("{prefix}_{op}")
}
