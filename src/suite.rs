//! Descriptor maps for the whole Pasta surface.

use crate::{
    Bindings, Descriptors,
    managed::field as managed_field,
    pasta::{CurveId, FieldId},
    spec::{AffineSpec, Bigint, Boolean, Bytes, Field, Int, ProjectiveSpec, Text, option},
};
use num_bigint::BigUint;
use num_traits::One;
use std::sync::Arc;

const STDOUT: &str = "writes to stdout";
const OS_RANDOM: &str = "draws from process-wide OS randomness";
const SEEDED_RNG: &str = "seeded stream is backend-specific";

/// `bigint256_*`.
pub fn bigint256() -> Descriptors {
    let bases: [i64; 8] = [2, 8, 10, 16, 36, 0, 1, 37];
    Descriptors::new("bigint256")
        .check(
            "of_numeral",
            signature!([Text::numeral(), Int::one_of(bases)] => Bigint),
        )
        .check(
            "of_decimal_string",
            signature!([Text::decimal(BigUint::one() << 256u32)] => Bigint),
        )
        .check("num_limbs", signature!([] => Int::any()).with_trials(1))
        .check("bytes_per_limb", signature!([] => Int::any()).with_trials(1))
        .check("div", signature!([Bigint, Bigint] => Bigint))
        .check("compare", signature!([Bigint, Bigint] => Int::any()))
        .check(
            "test_bit",
            signature!([Bigint, Int::range(-16..300)] => Boolean),
        )
        .check("to_bytes", signature!([Bigint] => Bytes::any()))
        .check("of_bytes", signature!([Bytes::any()] => Bigint))
        .check("deep_copy", signature!([Bigint] => Bigint))
        .check("to_string", signature!([Bigint] => Text::numeral()))
        .unsupported("print", STDOUT)
}

/// `fp_*` or `fq_*`.
pub fn field(id: FieldId) -> Descriptors {
    let f = || Field::new(id);
    let modulus = managed_field(id).modulus().clone();

    Descriptors::new(id.prefix())
        .check("size_in_bits", signature!([] => Int::any()).with_trials(1))
        .check("size", signature!([] => Bigint).with_trials(1))
        .check("add", signature!([f(), f()] => f()))
        .check("sub", signature!([f(), f()] => f()))
        .check("mul", signature!([f(), f()] => f()))
        .check("div", signature!([f(), f()] => f()))
        .check("negate", signature!([f()] => f()))
        .check("square", signature!([f()] => f()))
        .check("inv", signature!([f()] => option(f())))
        .check("is_square", signature!([f()] => Boolean))
        .check("sqrt", signature!([f()] => option(f())))
        .check("of_int", signature!([Int::any()] => f()))
        .check("to_string", signature!([f()] => Text::decimal(modulus.clone())))
        .check("of_string", signature!([Text::decimal(modulus)] => f()))
        .check("compare", signature!([f(), f()] => Int::any()))
        .check("equal", signature!([f(), f()] => Boolean))
        .check("to_bigint", signature!([f()] => Bigint))
        .check("of_bigint", signature!([Bigint] => f()))
        .check(
            "two_adic_root_of_unity",
            signature!([] => f()).with_trials(1),
        )
        .check("domain_generator", signature!([Int::range(-4..40)] => f()))
        .check("to_bytes", signature!([f()] => Bytes::any()))
        .check("of_bytes", signature!([Bytes::encoding(id)] => f()))
        .check("deep_copy", signature!([f()] => f()))
        .unsupported("print", STDOUT)
        .unsupported("random", OS_RANDOM)
        .unsupported("rng", SEEDED_RNG)
}

/// `pallas_*` or `vesta_*`; points are converted through `native`.
pub fn curve(id: CurveId, native: Arc<Bindings>) -> Descriptors {
    let p = || ProjectiveSpec::new(id, native.clone());
    let a = || AffineSpec::new(id, native.clone());
    let base = || Field::new(id.base());
    let scalar = || Field::new(id.scalar());

    Descriptors::new(id.prefix())
        .check("one", signature!([] => p()).with_trials(1))
        .check("add", signature!([p(), p()] => p()))
        .check("sub", signature!([p(), p()] => p()))
        .check("negate", signature!([p()] => p()))
        .check("double", signature!([p()] => p()))
        .check("scale", signature!([p(), scalar()] => p()))
        .check("endo_base", signature!([] => base()).with_trials(1))
        .check("endo_scalar", signature!([] => scalar()).with_trials(1))
        .check("to_affine", signature!([p()] => a()))
        .check("of_affine", signature!([a()] => p()))
        .check(
            "of_affine_coordinates",
            signature!([base(), base()] => p()),
        )
        .check("affine_one", signature!([] => a()).with_trials(1))
        .check("affine_deep_copy", signature!([a()] => a()))
        .unsupported("random", OS_RANDOM)
        .unsupported("rng", SEEDED_RNG)
}

/// Every descriptor map, bigints first.
pub fn all(native: Arc<Bindings>) -> Vec<Descriptors> {
    vec![
        bigint256(),
        field(FieldId::Fp),
        field(FieldId::Fq),
        curve(CurveId::Pallas, native.clone()),
        curve(CurveId::Vesta, native),
    ]
}

#[cfg(test)]
mod tests {
    use super::{all, bigint256, curve};
    use crate::{managed, native, pasta::CurveId, signature::Descriptor};
    use std::sync::Arc;

    #[test]
    fn every_bridge_operation_is_described() {
        let reference = managed::bindings();
        let candidate = Arc::new(native::bindings());
        let suites = all(candidate.clone());

        for name in reference.names().chain(candidate.names()) {
            assert!(
                suites.iter().any(|d| d.get(name).is_some()),
                "{name} has no descriptor"
            );
        }
    }

    #[test]
    fn printers_and_randomness_are_skipped() {
        assert!(matches!(
            bigint256().get("bigint256_print"),
            Some(Descriptor::Unsupported(_))
        ));

        let pallas = curve(CurveId::Pallas, Arc::new(native::bindings()));
        assert!(matches!(
            pallas.get("pallas_random"),
            Some(Descriptor::Unsupported(_))
        ));
        assert!(matches!(
            pallas.get("pallas_scale"),
            Some(Descriptor::Check(sig)) if sig.arity() == 2
        ));
    }
}
