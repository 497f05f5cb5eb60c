//! Registration of the managed implementation on the bridge.

use super::{
    Bigint256, FiniteField, GroupAffine, GroupProjective, OrInfinity, ProjectiveCurve, curve,
    encode, field,
};
use crate::{
    ImplementationFailure,
    bindings::{Args, Bindings},
    pasta::{BYTES_PER_LIMB, CurveId, FieldId, NUM_LIMBS, op_name},
    value::{AffineRepr, FieldBytes, Foreign, ProjectiveRepr, Value},
};
use core::cmp::Ordering;
use num_bigint::BigUint;
use rand_chacha::ChaCha20Rng;
use rand_core::{OsRng, SeedableRng, TryRngCore};

/// The managed implementation of the whole bridge namespace.
pub fn bindings() -> Bindings {
    let mut bindings = Bindings::new("managed");
    register_bigint(&mut bindings);
    for id in [FieldId::Fp, FieldId::Fq] {
        register_field(&mut bindings, field(id));
    }
    for id in [CurveId::Pallas, CurveId::Vesta] {
        register_curve(&mut bindings, curve(id));
    }
    bindings
}

fn bigint_arg(args: &Args<'_>, index: usize) -> Result<Bigint256, ImplementationFailure> {
    Bigint256::from_bytes(args.bytes(index)?)
        .ok_or_else(|| ImplementationFailure::failed("bigint256: expected 32 bytes"))
}

fn bigint_value(x: &Bigint256) -> Value {
    Value::Bytes(x.to_bytes().to_vec())
}

fn field_arg(
    f: &FiniteField,
    args: &Args<'_>,
    index: usize,
) -> Result<BigUint, ImplementationFailure> {
    f.from_bytes(args.bytes(index)?).ok_or_else(|| {
        ImplementationFailure::failed(format!("{}: not a canonical field element", f.id()))
    })
}

fn field_bytes(x: &BigUint) -> Result<FieldBytes, ImplementationFailure> {
    encode(x).ok_or_else(|| ImplementationFailure::failed("field element wider than 256 bits"))
}

fn field_value(x: &BigUint) -> Result<Value, ImplementationFailure> {
    field_bytes(x).map(|bytes| Value::Bytes(bytes.to_vec()))
}

fn ordering(order: Ordering) -> Value {
    Value::Int(match order {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    })
}

fn os_random_bytes() -> Result<[u8; 48], ImplementationFailure> {
    let mut bytes = [0u8; 48];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|err| ImplementationFailure::failed(format!("os randomness: {err}")))?;
    Ok(bytes)
}

fn seeded_rng(args: &Args<'_>, index: usize) -> Result<ChaCha20Rng, ImplementationFailure> {
    Ok(ChaCha20Rng::seed_from_u64(args.int(index)? as u64))
}

fn register_bigint(bindings: &mut Bindings) {
    bindings
        .register("bigint256_of_numeral", 2, |args| {
            Bigint256::from_numeral(args.str(0)?, args.int(1)?)
                .map(|x| bigint_value(&x))
                .ok_or_else(|| ImplementationFailure::failed("bigint256: invalid numeral"))
        })
        .register("bigint256_of_decimal_string", 1, |args| {
            Bigint256::from_decimal(args.str(0)?)
                .map(|x| bigint_value(&x))
                .ok_or_else(|| ImplementationFailure::failed("bigint256: invalid decimal string"))
        })
        .register("bigint256_num_limbs", 0, |_| Ok(Value::Int(NUM_LIMBS)))
        .register("bigint256_bytes_per_limb", 0, |_| {
            Ok(Value::Int(BYTES_PER_LIMB))
        })
        .register("bigint256_div", 2, |args| {
            bigint_arg(&args, 0)?
                .checked_div(&bigint_arg(&args, 1)?)
                .map(|x| bigint_value(&x))
                .ok_or_else(|| ImplementationFailure::failed("bigint256: division by zero"))
        })
        .register("bigint256_compare", 2, |args| {
            Ok(ordering(bigint_arg(&args, 0)?.cmp(&bigint_arg(&args, 1)?)))
        })
        .register("bigint256_test_bit", 2, |args| {
            bigint_arg(&args, 0)?
                .test_bit(args.int(1)?)
                .map(Value::Bool)
                .ok_or_else(|| ImplementationFailure::failed("bigint256: bit index out of range"))
        })
        .register("bigint256_to_bytes", 1, |args| {
            Ok(bigint_value(&bigint_arg(&args, 0)?))
        })
        .register("bigint256_of_bytes", 1, |args| {
            Ok(bigint_value(&bigint_arg(&args, 0)?))
        })
        .register("bigint256_deep_copy", 1, |args| {
            Ok(bigint_value(&bigint_arg(&args, 0)?))
        })
        .register("bigint256_to_string", 1, |args| {
            Ok(Value::Str(bigint_arg(&args, 0)?.to_decimal()))
        })
        .register("bigint256_print", 1, |args| {
            println!("{}", bigint_arg(&args, 0)?.to_decimal());
            Ok(Value::Unit)
        });
}

fn register_field(bindings: &mut Bindings, f: &'static FiniteField) {
    let name = |op: &str| op_name(f.id(), op);

    bindings
        .register(name("size_in_bits"), 0, move |_| {
            Ok(Value::Int(f.size_in_bits() as i64))
        })
        .register(name("size"), 0, move |_| {
            field_value(f.modulus())
        })
        .register(name("add"), 2, move |args| {
            field_value(&f.add(&field_arg(f, &args, 0)?, &field_arg(f, &args, 1)?))
        })
        .register(name("sub"), 2, move |args| {
            field_value(&f.sub(&field_arg(f, &args, 0)?, &field_arg(f, &args, 1)?))
        })
        .register(name("negate"), 1, move |args| {
            field_value(&f.negate(&field_arg(f, &args, 0)?))
        })
        .register(name("mul"), 2, move |args| {
            field_value(&f.mul(&field_arg(f, &args, 0)?, &field_arg(f, &args, 1)?))
        })
        .register(name("div"), 2, move |args| {
            let quotient = f
                .div(&field_arg(f, &args, 0)?, &field_arg(f, &args, 1)?)
                .ok_or_else(|| ImplementationFailure::failed("division by zero"))?;
            field_value(&quotient)
        })
        .register(name("inv"), 1, move |args| {
            match f.inverse(&field_arg(f, &args, 0)?) {
                Some(inverse) => field_value(&inverse).map(Value::some),
                None => Ok(Value::none()),
            }
        })
        .register(name("square"), 1, move |args| {
            field_value(&f.square(&field_arg(f, &args, 0)?))
        })
        .register(name("is_square"), 1, move |args| {
            Ok(Value::Bool(f.is_square(&field_arg(f, &args, 0)?)))
        })
        .register(name("sqrt"), 1, move |args| {
            match f.sqrt(&field_arg(f, &args, 0)?) {
                Some(root) => field_value(&root).map(Value::some),
                None => Ok(Value::none()),
            }
        })
        .register(name("of_int"), 1, move |args| {
            field_value(&f.from_int(args.int(0)?))
        })
        .register(name("to_string"), 1, move |args| {
            Ok(Value::Str(field_arg(f, &args, 0)?.to_str_radix(10)))
        })
        .register(name("of_string"), 1, move |args| {
            let value = super::parse_numeral(args.str(0)?, 10)
                .filter(|x| f.contains(x))
                .ok_or_else(|| ImplementationFailure::failed("invalid field element string"))?;
            field_value(&value)
        })
        .register(name("print"), 1, move |args| {
            println!("{}", field_arg(f, &args, 0)?.to_str_radix(10));
            Ok(Value::Unit)
        })
        .register(name("compare"), 2, move |args| {
            Ok(ordering(field_arg(f, &args, 0)?.cmp(&field_arg(f, &args, 1)?)))
        })
        .register(name("equal"), 2, move |args| {
            Ok(Value::Bool(field_arg(f, &args, 0)? == field_arg(f, &args, 1)?))
        })
        .register(name("random"), 0, move |_| {
            field_value(&f.reduce(&BigUint::from_bytes_le(&os_random_bytes()?)))
        })
        .register(name("rng"), 1, move |args| {
            field_value(&f.random(&mut seeded_rng(&args, 0)?))
        })
        .register(name("to_bigint"), 1, move |args| {
            field_value(&field_arg(f, &args, 0)?)
        })
        .register(name("of_bigint"), 1, move |args| {
            let value = bigint_arg(&args, 0)?.into_biguint();
            if !f.contains(&value) {
                return Err(ImplementationFailure::failed("bigint exceeds the modulus"));
            }
            field_value(&value)
        })
        .register(name("two_adic_root_of_unity"), 0, move |_| {
            field_value(&f.two_adic_root_of_unity())
        })
        .register(name("domain_generator"), 1, move |args| {
            let generator = f
                .domain_generator(args.int(0)?)
                .ok_or_else(|| ImplementationFailure::failed("domain size exceeds two-adicity"))?;
            field_value(&generator)
        })
        .register(name("to_bytes"), 1, move |args| {
            field_value(&field_arg(f, &args, 0)?)
        })
        .register(name("of_bytes"), 1, move |args| {
            field_value(&field_arg(f, &args, 0)?)
        })
        .register(name("deep_copy"), 1, move |args| {
            field_value(&field_arg(f, &args, 0)?)
        });
}

fn point_arg(
    c: &ProjectiveCurve,
    args: &Args<'_>,
    index: usize,
) -> Result<GroupProjective, ImplementationFailure> {
    let (x, y, z) = args.projective(index)?.coordinates();
    let coordinate = |bytes: &FieldBytes| {
        c.base().from_bytes(bytes).ok_or_else(|| {
            ImplementationFailure::failed(format!("{}: non-canonical coordinate", c.id()))
        })
    };

    Ok(GroupProjective {
        x: coordinate(x)?,
        y: coordinate(y)?,
        z: coordinate(z)?,
    })
}

fn point_value(args: &Args<'_>, p: &GroupProjective) -> Result<Value, ImplementationFailure> {
    let repr = ProjectiveRepr::from_coordinates(
        field_bytes(&p.x)?,
        field_bytes(&p.y)?,
        field_bytes(&p.z)?,
    );
    Ok(Value::Projective(Foreign::new(repr, args.tracker())))
}

fn affine_arg(
    c: &ProjectiveCurve,
    args: &Args<'_>,
    index: usize,
) -> Result<OrInfinity, ImplementationFailure> {
    let repr = args.affine(index)?;
    if repr.infinity {
        return Ok(OrInfinity::Infinity);
    }

    let coordinate = |bytes: &FieldBytes| {
        c.base().from_bytes(bytes).ok_or_else(|| {
            ImplementationFailure::failed(format!("{}: non-canonical coordinate", c.id()))
        })
    };
    Ok(OrInfinity::Finite(GroupAffine {
        x: coordinate(&repr.x)?,
        y: coordinate(&repr.y)?,
    }))
}

fn affine_value(args: &Args<'_>, p: &OrInfinity) -> Result<Value, ImplementationFailure> {
    let repr = match p {
        OrInfinity::Infinity => AffineRepr {
            infinity: true,
            ..AffineRepr::default()
        },
        OrInfinity::Finite(affine) => AffineRepr {
            x: field_bytes(&affine.x)?,
            y: field_bytes(&affine.y)?,
            infinity: false,
        },
    };
    Ok(Value::Affine(Foreign::new(repr, args.tracker())))
}

fn register_curve(bindings: &mut Bindings, c: &'static ProjectiveCurve) {
    let name = |op: &str| op_name(c.id(), op);

    bindings
        .register(name("one"), 0, move |args| point_value(&args, &c.one()))
        .register(name("add"), 2, move |args| {
            let sum = c.add(&point_arg(c, &args, 0)?, &point_arg(c, &args, 1)?);
            point_value(&args, &sum)
        })
        .register(name("sub"), 2, move |args| {
            let difference = c.sub(&point_arg(c, &args, 0)?, &point_arg(c, &args, 1)?);
            point_value(&args, &difference)
        })
        .register(name("negate"), 1, move |args| {
            point_value(&args, &c.negate(&point_arg(c, &args, 0)?))
        })
        .register(name("double"), 1, move |args| {
            point_value(&args, &c.double(&point_arg(c, &args, 0)?))
        })
        .register(name("scale"), 2, move |args| {
            let scalar = field_arg(c.scalar(), &args, 1)?;
            point_value(&args, &c.scale(&point_arg(c, &args, 0)?, &scalar))
        })
        .register(name("random"), 0, move |args| {
            let scalar = c
                .scalar()
                .reduce(&BigUint::from_bytes_le(&os_random_bytes()?));
            point_value(&args, &c.scale(&c.one(), &scalar))
        })
        .register(name("rng"), 1, move |args| {
            let scalar = c.scalar().random(&mut seeded_rng(&args, 0)?);
            point_value(&args, &c.scale(&c.one(), &scalar))
        })
        .register(name("endo_base"), 0, move |_| {
            let zeta = c
                .endo_base()
                .ok_or_else(|| ImplementationFailure::failed("no endomorphism"))?;
            field_value(&zeta)
        })
        .register(name("endo_scalar"), 0, move |_| {
            let lambda = c
                .endo_scalar()
                .ok_or_else(|| ImplementationFailure::failed("no endomorphism"))?;
            field_value(&lambda)
        })
        .register(name("to_affine"), 1, move |args| {
            affine_value(&args, &c.to_affine(&point_arg(c, &args, 0)?))
        })
        .register(name("of_affine"), 1, move |args| {
            point_value(&args, &c.from_or_infinity(&affine_arg(c, &args, 0)?))
        })
        .register(name("of_affine_coordinates"), 2, move |args| {
            let affine = GroupAffine {
                x: field_arg(c.base(), &args, 0)?,
                y: field_arg(c.base(), &args, 1)?,
            };
            point_value(&args, &c.from_affine(&affine))
        })
        .register(name("affine_one"), 0, move |args| {
            affine_value(&args, &OrInfinity::Finite(c.generator().clone()))
        })
        .register(name("affine_deep_copy"), 1, move |args| {
            affine_value(&args, &affine_arg(c, &args, 0)?)
        });
}
