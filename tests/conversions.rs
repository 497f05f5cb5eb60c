//! Conversion laws: everything that goes through `there` comes back equal.

mod common;

use hex_literal::hex;
use num_bigint::BigUint;
use pasta_equivalence::{
    ConversionError, Value, managed,
    managed::{Bigint256, GroupProjective, OrInfinity, curve, field},
    native,
    pasta::{CurveId, FieldId},
    spec::{AffineSpec, Bigint, Bytes, Field, Int, ProjectiveSpec, Spec, Text, option},
};
use proptest::prelude::*;
use std::sync::{Arc, LazyLock};

static NATIVE: LazyLock<Arc<pasta_equivalence::Bindings>> =
    LazyLock::new(|| Arc::new(native::bindings()));

/// Run `there` then `back` and check the law under the spec's own equality.
fn round_trip<S: Spec>(spec: &S, x: &S::Logical) -> Result<(), TestCaseError> {
    let value = spec
        .there(x)
        .map_err(|err| TestCaseError::fail(err.to_string()))?;
    let y = spec
        .back(value)
        .map_err(|err| TestCaseError::fail(err.to_string()))?;
    prop_assert!(spec.equal(x, &y), "{x:?} came back as {y:?}");
    Ok(())
}

fn pallas() -> ProjectiveSpec {
    ProjectiveSpec::new(CurveId::Pallas, NATIVE.clone())
}

proptest! {
    #[test]
    fn bigints(x in Bigint.strategy()) {
        round_trip(&Bigint, &x)?;
    }

    #[test]
    fn field_elements(x in Field::new(FieldId::Fq).strategy()) {
        round_trip(&Field::new(FieldId::Fq), &x)?;
    }

    #[test]
    fn optional_field_elements(x in option(Field::new(FieldId::Fp)).strategy()) {
        round_trip(&option(Field::new(FieldId::Fp)), &x)?;
    }

    #[test]
    fn texts_and_bytes(s in Text::numeral().strategy(), b in Bytes::any().strategy()) {
        round_trip(&Text::numeral(), &s)?;
        round_trip(&Bytes::any(), &b)?;
    }

    #[test]
    fn ints(x in Int::any().strategy()) {
        round_trip(&Int::any(), &x)?;
    }

    #[test]
    fn projective_points(p in pallas().strategy()) {
        round_trip(&pallas(), &p)?;
    }

    #[test]
    fn affine_points(p in AffineSpec::new(CurveId::Vesta, NATIVE.clone()).strategy()) {
        round_trip(&AffineSpec::new(CurveId::Vesta, NATIVE.clone()), &p)?;
    }

    #[test]
    fn scaled_coordinates_are_the_same_point(
        p in pallas().strategy(),
        lambda in 1u64..,
    ) {
        let c = curve(CurveId::Pallas);
        let f = c.base();
        let lambda = BigUint::from(lambda);
        let lambda2 = f.square(&lambda);
        let q = GroupProjective {
            x: f.mul(&p.x, &lambda2),
            y: f.mul(&p.y, &f.mul(&lambda2, &lambda)),
            z: f.mul(&p.z, &lambda),
        };
        prop_assert!(pallas().equal(&p, &q));
    }
}

#[test]
fn absent_never_touches_the_inner_spec() {
    let native = Arc::new(native::bindings());
    let spec = option(ProjectiveSpec::new(CurveId::Pallas, native.clone()));

    let value = spec.there(&None).expect("converts");
    assert!(matches!(value, Value::Option(None)));
    assert_eq!(spec.back(value), Ok(None));
    assert_eq!(native.tracker().counts().acquired, 0);
}

#[test]
fn identity_round_trips_exactly() {
    let spec = ProjectiveSpec::new(CurveId::Vesta, NATIVE.clone());
    let zero = curve(CurveId::Vesta).zero();

    let value = spec.there(&zero).expect("converts");
    let back = spec.back(value).expect("converts back");
    assert_eq!(back, zero);

    let affine = AffineSpec::new(CurveId::Vesta, NATIVE.clone());
    let value = affine.there(&OrInfinity::Infinity).expect("converts");
    assert_eq!(affine.back(value), Ok(OrInfinity::Infinity));
}

#[test]
fn modulus_is_rejected() {
    // Fp modulus, little-endian.
    let p = hex!("01000000ed302d991bf94c09fc98462200000000000000000000000000000040");
    assert_eq!(
        BigUint::from_bytes_le(&p),
        *field(FieldId::Fp).modulus()
    );

    let spec = Field::new(FieldId::Fp);
    assert_eq!(
        spec.back(Value::Bytes(p.to_vec())),
        Err(ConversionError::OutOfRange("field element"))
    );
    assert!(spec.there(field(FieldId::Fp).modulus()).is_err());
}

#[test]
fn wrong_lengths_and_variants() {
    assert_eq!(
        Bigint.back(Value::Bytes(vec![0; 31])),
        Err(ConversionError::Length {
            expected: 32,
            found: 31
        })
    );
    assert!(matches!(
        Bigint.back(Value::Int(1)),
        Err(ConversionError::UnexpectedValue { expected: "bytes", found: "int" })
    ));
    assert!(matches!(
        Bigint.there(&Bigint256::from_u64(258)),
        Ok(Value::Bytes(bytes)) if bytes.len() == 32
    ));
}

#[test]
fn native_and_managed_share_the_encoding() {
    let reference = managed::bindings();
    let x = Bigint256::from_u64(0x0102);
    let Value::Bytes(bytes) = Bigint.there(&x).expect("converts") else {
        panic!("expected bytes");
    };
    assert_eq!(bytes[..2], [0x02, 0x01]);

    for bindings in [&reference, &**NATIVE] {
        let out = bindings
            .call("bigint256_to_string", &[Value::Bytes(bytes.clone())])
            .expect("prints");
        assert!(matches!(out, Value::Str(s) if s == "258"), "{}", bindings.name());
    }
}
