//! Registration of the native implementation on the bridge.
//!
//! Field elements and integers travel as canonical 32-byte buffers; points
//! travel as handles whose coordinates are canonical encodings of Montgomery
//! residues.

use super::{
    bigint,
    curve::{Curve, Point, curve},
    field::{Element, PrimeField, field},
};
use crate::{
    ImplementationFailure,
    bindings::{Args, Bindings},
    pasta::{BYTES_PER_LIMB, CurveId, FieldId, NUM_LIMBS, op_name},
    value::{AffineRepr, FieldBytes, Foreign, ProjectiveRepr, Value},
};
use crypto_bigint::U256;
use rand_chacha::ChaCha20Rng;
use rand_core::{OsRng, SeedableRng, TryRngCore};

/// The native implementation of the whole bridge namespace.
pub fn bindings() -> Bindings {
    let mut bindings = Bindings::new("native");
    bigint_ops(&mut bindings);
    for id in [FieldId::Fp, FieldId::Fq] {
        field_ops(&mut bindings, field(id));
    }
    for id in [CurveId::Pallas, CurveId::Vesta] {
        curve_ops(&mut bindings, curve(id));
    }
    bindings
}

fn fail(message: &str) -> ImplementationFailure {
    ImplementationFailure::failed(message)
}

fn uint(args: &Args<'_>, index: usize) -> Result<U256, ImplementationFailure> {
    bigint::decode(args.bytes(index)?).ok_or_else(|| fail("expected a 32-byte integer"))
}

fn uint_value(x: &U256) -> Value {
    Value::Bytes(bigint::encode(x).to_vec())
}

fn element(
    f: &PrimeField,
    args: &Args<'_>,
    index: usize,
) -> Result<Element, ImplementationFailure> {
    f.from_bytes(args.bytes(index)?)
        .ok_or_else(|| fail("expected a canonical field element"))
}

fn element_value(f: &PrimeField, x: &Element) -> Value {
    Value::Bytes(f.to_bytes(x).to_vec())
}

fn optional(f: &PrimeField, x: Option<Element>) -> Value {
    x.map_or_else(Value::none, |x| Value::some(element_value(f, &x)))
}

fn sign(x: &U256, y: &U256) -> Value {
    Value::Int(match x.cmp(y) {
        core::cmp::Ordering::Less => -1,
        core::cmp::Ordering::Equal => 0,
        core::cmp::Ordering::Greater => 1,
    })
}

fn os_rng() -> Result<ChaCha20Rng, ImplementationFailure> {
    let mut seed = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut seed)
        .map_err(|err| ImplementationFailure::failed(format!("os randomness: {err}")))?;
    Ok(ChaCha20Rng::from_seed(seed))
}

fn bigint_ops(bindings: &mut Bindings) {
    bindings
        .register("bigint256_of_numeral", 2, |args| {
            bigint::parse_numeral(args.str(0)?, args.int(1)?)
                .map(|x| uint_value(&x))
                .ok_or_else(|| fail("invalid numeral"))
        })
        .register("bigint256_of_decimal_string", 1, |args| {
            bigint::parse_numeral(args.str(0)?, 10)
                .map(|x| uint_value(&x))
                .ok_or_else(|| fail("invalid decimal string"))
        })
        .register("bigint256_num_limbs", 0, |_| Ok(Value::Int(NUM_LIMBS)))
        .register("bigint256_bytes_per_limb", 0, |_| {
            Ok(Value::Int(BYTES_PER_LIMB))
        })
        .register("bigint256_div", 2, |args| {
            bigint::checked_div(&uint(&args, 0)?, &uint(&args, 1)?)
                .map(|x| uint_value(&x))
                .ok_or_else(|| fail("division by zero"))
        })
        .register("bigint256_compare", 2, |args| {
            Ok(sign(&uint(&args, 0)?, &uint(&args, 1)?))
        })
        .register("bigint256_test_bit", 2, |args| {
            bigint::test_bit(&uint(&args, 0)?, args.int(1)?)
                .map(Value::Bool)
                .ok_or_else(|| fail("bit index out of range"))
        })
        .register("bigint256_to_bytes", 1, |args| Ok(uint_value(&uint(&args, 0)?)))
        .register("bigint256_of_bytes", 1, |args| Ok(uint_value(&uint(&args, 0)?)))
        .register("bigint256_deep_copy", 1, |args| Ok(uint_value(&uint(&args, 0)?)))
        .register("bigint256_to_string", 1, |args| {
            Ok(Value::Str(bigint::to_decimal(&uint(&args, 0)?)))
        })
        .register("bigint256_print", 1, |args| {
            println!("{}", bigint::to_decimal(&uint(&args, 0)?));
            Ok(Value::Unit)
        });
}

fn unary(
    bindings: &mut Bindings,
    f: &'static PrimeField,
    op: &str,
    apply: fn(Element) -> Element,
) {
    bindings.register(op_name(f.id(), op), 1, move |args| {
        Ok(element_value(f, &apply(element(f, &args, 0)?)))
    });
}

fn binary(
    bindings: &mut Bindings,
    f: &'static PrimeField,
    op: &str,
    apply: fn(Element, Element) -> Element,
) {
    bindings.register(op_name(f.id(), op), 2, move |args| {
        let (x, y) = (element(f, &args, 0)?, element(f, &args, 1)?);
        Ok(element_value(f, &apply(x, y)))
    });
}

fn field_ops(bindings: &mut Bindings, f: &'static PrimeField) {
    binary(bindings, f, "add", |x, y| x + y);
    binary(bindings, f, "sub", |x, y| x - y);
    binary(bindings, f, "mul", |x, y| x * y);
    unary(bindings, f, "negate", |x| -x);
    unary(bindings, f, "square", |x| x.square());
    unary(bindings, f, "to_bigint", |x| x);
    unary(bindings, f, "to_bytes", |x| x);
    unary(bindings, f, "of_bytes", |x| x);
    unary(bindings, f, "deep_copy", |x| x);

    let name = |op: &str| op_name(f.id(), op);
    bindings
        .register(name("size_in_bits"), 0, move |_| {
            Ok(Value::Int(f.size_in_bits() as i64))
        })
        .register(name("size"), 0, move |_| Ok(uint_value(f.modulus())))
        .register(name("div"), 2, move |args| {
            let divisor = f
                .invert(&element(f, &args, 1)?)
                .ok_or_else(|| fail("division by zero"))?;
            Ok(element_value(f, &(element(f, &args, 0)? * divisor)))
        })
        .register(name("inv"), 1, move |args| {
            Ok(optional(f, f.invert(&element(f, &args, 0)?)))
        })
        .register(name("is_square"), 1, move |args| {
            Ok(Value::Bool(f.is_square(&element(f, &args, 0)?)))
        })
        .register(name("sqrt"), 1, move |args| {
            Ok(optional(f, f.sqrt(&element(f, &args, 0)?)))
        })
        .register(name("of_int"), 1, move |args| {
            Ok(element_value(f, &f.from_int(args.int(0)?)))
        })
        .register(name("to_string"), 1, move |args| {
            Ok(Value::Str(bigint::to_decimal(&element(f, &args, 0)?.retrieve())))
        })
        .register(name("of_string"), 1, move |args| {
            let x = bigint::parse_numeral(args.str(0)?, 10)
                .and_then(|x| f.element(&x))
                .ok_or_else(|| fail("invalid field element string"))?;
            Ok(element_value(f, &x))
        })
        .register(name("print"), 1, move |args| {
            println!("{}", bigint::to_decimal(&element(f, &args, 0)?.retrieve()));
            Ok(Value::Unit)
        })
        .register(name("compare"), 2, move |args| {
            let (x, y) = (element(f, &args, 0)?, element(f, &args, 1)?);
            Ok(sign(&x.retrieve(), &y.retrieve()))
        })
        .register(name("equal"), 2, move |args| {
            let (x, y) = (element(f, &args, 0)?, element(f, &args, 1)?);
            Ok(Value::Bool(f.equal(&x, &y)))
        })
        .register(name("random"), 0, move |_| {
            Ok(element_value(f, &f.random(&mut os_rng()?)))
        })
        .register(name("rng"), 1, move |args| {
            let mut rng = ChaCha20Rng::seed_from_u64(args.int(0)? as u64);
            Ok(element_value(f, &f.random(&mut rng)))
        })
        .register(name("of_bigint"), 1, move |args| {
            let x = f
                .element(&uint(&args, 0)?)
                .ok_or_else(|| fail("integer exceeds the modulus"))?;
            Ok(element_value(f, &x))
        })
        .register(name("two_adic_root_of_unity"), 0, move |_| {
            Ok(element_value(f, &f.two_adic_root_of_unity()))
        })
        .register(name("domain_generator"), 1, move |args| {
            let generator = f
                .domain_generator(args.int(0)?)
                .ok_or_else(|| fail("domain larger than the two-adic subgroup"))?;
            Ok(element_value(f, &generator))
        });
}

fn point(c: &Curve, args: &Args<'_>, index: usize) -> Result<Point, ImplementationFailure> {
    let (x, y, z) = args.projective(index)?.coordinates();
    let coordinate = |bytes: &FieldBytes| {
        c.base()
            .from_bytes(bytes)
            .ok_or_else(|| fail("non-canonical point coordinate"))
    };
    Ok(Point {
        x: coordinate(x)?,
        y: coordinate(y)?,
        z: coordinate(z)?,
    })
}

fn point_value(c: &Curve, args: &Args<'_>, p: &Point) -> Value {
    let f = c.base();
    let repr =
        ProjectiveRepr::from_coordinates(f.to_bytes(&p.x), f.to_bytes(&p.y), f.to_bytes(&p.z));
    Value::Projective(Foreign::new(repr, args.tracker()))
}

fn affine(c: &Curve, args: &Args<'_>, index: usize) -> Result<Point, ImplementationFailure> {
    let repr = args.affine(index)?;
    if repr.infinity {
        return Ok(c.identity());
    }
    let f = c.base();
    match (f.from_bytes(&repr.x), f.from_bytes(&repr.y)) {
        (Some(x), Some(y)) => Ok(c.from_affine(x, y)),
        _ => Err(fail("non-canonical affine coordinate")),
    }
}

fn affine_value(c: &Curve, args: &Args<'_>, p: &Point) -> Value {
    let f = c.base();
    let repr = match c.to_affine(p) {
        Some((x, y)) => AffineRepr {
            x: f.to_bytes(&x),
            y: f.to_bytes(&y),
            infinity: false,
        },
        None => AffineRepr {
            infinity: true,
            ..AffineRepr::default()
        },
    };
    Value::Affine(Foreign::new(repr, args.tracker()))
}

fn curve_ops(bindings: &mut Bindings, c: &'static Curve) {
    let name = |op: &str| op_name(c.id(), op);
    bindings
        .register(name("one"), 0, move |args| Ok(point_value(c, &args, &c.one())))
        .register(name("add"), 2, move |args| {
            let sum = c.add(&point(c, &args, 0)?, &point(c, &args, 1)?);
            Ok(point_value(c, &args, &sum))
        })
        .register(name("sub"), 2, move |args| {
            let difference = c.sub(&point(c, &args, 0)?, &point(c, &args, 1)?);
            Ok(point_value(c, &args, &difference))
        })
        .register(name("negate"), 1, move |args| {
            Ok(point_value(c, &args, &c.negate(&point(c, &args, 0)?)))
        })
        .register(name("double"), 1, move |args| {
            Ok(point_value(c, &args, &c.double(&point(c, &args, 0)?)))
        })
        .register(name("scale"), 2, move |args| {
            let k = element(c.scalar(), &args, 1)?.retrieve();
            Ok(point_value(c, &args, &c.scale(&point(c, &args, 0)?, &k)))
        })
        .register(name("random"), 0, move |args| {
            let k = c.scalar().random(&mut os_rng()?).retrieve();
            Ok(point_value(c, &args, &c.scale(&c.one(), &k)))
        })
        .register(name("rng"), 1, move |args| {
            let mut rng = ChaCha20Rng::seed_from_u64(args.int(0)? as u64);
            let k = c.scalar().random(&mut rng).retrieve();
            Ok(point_value(c, &args, &c.scale(&c.one(), &k)))
        })
        .register(name("endo_base"), 0, move |_| {
            let zeta = c.endo_base().ok_or_else(|| fail("no endomorphism"))?;
            Ok(element_value(c.base(), &zeta))
        })
        .register(name("endo_scalar"), 0, move |_| {
            let lambda = c.endo_scalar().ok_or_else(|| fail("no endomorphism"))?;
            Ok(element_value(c.scalar(), &lambda))
        })
        .register(name("to_affine"), 1, move |args| {
            Ok(affine_value(c, &args, &point(c, &args, 0)?))
        })
        .register(name("of_affine"), 1, move |args| {
            Ok(point_value(c, &args, &affine(c, &args, 0)?))
        })
        .register(name("of_affine_coordinates"), 2, move |args| {
            let (x, y) = (element(c.base(), &args, 0)?, element(c.base(), &args, 1)?);
            Ok(point_value(c, &args, &c.from_affine(x, y)))
        })
        .register(name("affine_one"), 0, move |args| {
            Ok(affine_value(c, &args, &c.one()))
        })
        .register(name("affine_deep_copy"), 1, move |args| {
            Ok(affine_value(c, &args, &affine(c, &args, 0)?))
        });
}

