//! Short Weierstrass curves `y^2 = x^3 + b` in Jacobian coordinates.
//!
//! Arithmetic never normalizes: results keep whatever `z` the formulas
//! produce, so two equal points usually have different coordinates. Compare
//! with [`ProjectiveCurve::equal`], not `==`.

use super::field::{FiniteField, field};
use crate::pasta::{CURVE_B, CurveId};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use std::sync::LazyLock;

static PALLAS: LazyLock<ProjectiveCurve> = LazyLock::new(|| ProjectiveCurve::new(CurveId::Pallas));
static VESTA: LazyLock<ProjectiveCurve> = LazyLock::new(|| ProjectiveCurve::new(CurveId::Vesta));

/// The managed curve with the given id.
pub fn curve(id: CurveId) -> &'static ProjectiveCurve {
    match id {
        CurveId::Pallas => &PALLAS,
        CurveId::Vesta => &VESTA,
    }
}

/// Jacobian point `(x / z^2, y / z^3)`; `z = 0` is the identity.
///
/// The derived `PartialEq` is coordinate-wise.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GroupProjective {
    /// `X`
    pub x: BigUint,
    /// `Y`
    pub y: BigUint,
    /// `Z`
    pub z: BigUint,
}

/// Affine coordinates of a finite point.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GroupAffine {
    /// `x`
    pub x: BigUint,
    /// `y`
    pub y: BigUint,
}

/// Normalized point: affine coordinates, or the point at infinity.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OrInfinity {
    /// The identity.
    Infinity,
    /// A finite point.
    Finite(GroupAffine),
}

/// A curve of the pasta cycle.
#[derive(Debug)]
pub struct ProjectiveCurve {
    id: CurveId,
    base: &'static FiniteField,
    scalar: &'static FiniteField,
    b: BigUint,
    generator: GroupAffine,
}

impl ProjectiveCurve {
    /// Build the curve from its id.
    pub fn new(id: CurveId) -> Self {
        let base = field(id.base());
        let generator = GroupAffine {
            x: base.from_int(-1),
            y: base.from_int(2),
        };

        Self {
            id,
            base,
            scalar: field(id.scalar()),
            b: BigUint::from(CURVE_B),
            generator,
        }
    }

    /// Which curve this is.
    pub const fn id(&self) -> CurveId {
        self.id
    }

    /// Field of coordinates.
    pub const fn base(&self) -> &'static FiniteField {
        self.base
    }

    /// Field of scalars.
    pub const fn scalar(&self) -> &'static FiniteField {
        self.scalar
    }

    /// Affine generator.
    pub const fn generator(&self) -> &GroupAffine {
        &self.generator
    }

    /// The identity.
    pub fn zero(&self) -> GroupProjective {
        GroupProjective {
            x: BigUint::one(),
            y: BigUint::one(),
            z: BigUint::zero(),
        }
    }

    /// The generator.
    pub fn one(&self) -> GroupProjective {
        self.from_affine(&self.generator)
    }

    /// Is `p` the identity?
    pub fn is_zero(&self, p: &GroupProjective) -> bool {
        p.z.is_zero()
    }

    /// Lift affine coordinates, with `z = 1`.
    pub fn from_affine(&self, p: &GroupAffine) -> GroupProjective {
        GroupProjective {
            x: p.x.clone(),
            y: p.y.clone(),
            z: BigUint::one(),
        }
    }

    /// Lift a normalized point.
    pub fn from_or_infinity(&self, p: &OrInfinity) -> GroupProjective {
        match p {
            OrInfinity::Infinity => self.zero(),
            OrInfinity::Finite(affine) => self.from_affine(affine),
        }
    }

    /// Normalize to affine coordinates.
    pub fn to_affine(&self, p: &GroupProjective) -> OrInfinity {
        let Some(z_inv) = self.base.inverse(&p.z) else {
            return OrInfinity::Infinity;
        };
        let f = self.base;
        let z_inv2 = f.square(&z_inv);
        let z_inv3 = f.mul(&z_inv2, &z_inv);

        OrInfinity::Finite(GroupAffine {
            x: f.mul(&p.x, &z_inv2),
            y: f.mul(&p.y, &z_inv3),
        })
    }

    /// Projective equivalence: same point after normalization.
    pub fn equal(&self, p: &GroupProjective, q: &GroupProjective) -> bool {
        match (self.is_zero(p), self.is_zero(q)) {
            (true, true) => true,
            (false, false) => {
                let f = self.base;
                let pz2 = f.square(&p.z);
                let qz2 = f.square(&q.z);
                f.mul(&p.x, &qz2) == f.mul(&q.x, &pz2)
                    && f.mul(&p.y, &f.mul(&qz2, &q.z)) == f.mul(&q.y, &f.mul(&pz2, &p.z))
            }
            _ => false,
        }
    }

    /// Does `p` satisfy the curve equation?
    pub fn is_on_curve(&self, p: &OrInfinity) -> bool {
        match p {
            OrInfinity::Infinity => true,
            OrInfinity::Finite(GroupAffine { x, y }) => {
                let f = self.base;
                f.square(y) == f.add(&f.mul(&f.square(x), x), &self.b)
            }
        }
    }

    /// `-p`
    pub fn negate(&self, p: &GroupProjective) -> GroupProjective {
        GroupProjective {
            x: p.x.clone(),
            y: self.base.negate(&p.y),
            z: p.z.clone(),
        }
    }

    /// `2p`
    pub fn double(&self, p: &GroupProjective) -> GroupProjective {
        if self.is_zero(p) {
            return self.zero();
        }
        let f = self.base;

        let a = f.square(&p.x);
        let b = f.square(&p.y);
        let c = f.square(&b);
        let xb = f.add(&p.x, &b);
        let d = f.sub(&f.sub(&f.square(&xb), &a), &c);
        let d = f.add(&d, &d);
        let e = f.add(&f.add(&a, &a), &a);
        let e2 = f.square(&e);

        let x3 = f.sub(&e2, &f.add(&d, &d));
        let c8 = f.mul(&c, &BigUint::from(8u32));
        let y3 = f.sub(&f.mul(&e, &f.sub(&d, &x3)), &c8);
        let yz = f.mul(&p.y, &p.z);
        let z3 = f.add(&yz, &yz);

        GroupProjective {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    /// `p + q`
    pub fn add(&self, p: &GroupProjective, q: &GroupProjective) -> GroupProjective {
        if self.is_zero(p) {
            return q.clone();
        }
        if self.is_zero(q) {
            return p.clone();
        }
        let f = self.base;

        let z1z1 = f.square(&p.z);
        let z2z2 = f.square(&q.z);
        let u1 = f.mul(&p.x, &z2z2);
        let u2 = f.mul(&q.x, &z1z1);
        let s1 = f.mul(&f.mul(&p.y, &q.z), &z2z2);
        let s2 = f.mul(&f.mul(&q.y, &p.z), &z1z1);

        if u1 == u2 {
            return if s1 == s2 {
                self.double(p)
            } else {
                self.zero()
            };
        }

        let h = f.sub(&u2, &u1);
        let h2 = f.add(&h, &h);
        let i = f.square(&h2);
        let j = f.mul(&h, &i);
        let r = f.sub(&s2, &s1);
        let r = f.add(&r, &r);
        let v = f.mul(&u1, &i);

        let x3 = f.sub(&f.sub(&f.square(&r), &j), &f.add(&v, &v));
        let s1j = f.mul(&s1, &j);
        let y3 = f.sub(&f.mul(&r, &f.sub(&v, &x3)), &f.add(&s1j, &s1j));
        let z1z2 = f.add(&p.z, &q.z);
        let z3 = f.mul(&f.sub(&f.sub(&f.square(&z1z2), &z1z1), &z2z2), &h);

        GroupProjective {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    /// `p - q`
    pub fn sub(&self, p: &GroupProjective, q: &GroupProjective) -> GroupProjective {
        self.add(p, &self.negate(q))
    }

    /// `k * p` by double-and-add over the bits of `k`, most significant first.
    pub fn scale(&self, p: &GroupProjective, k: &BigUint) -> GroupProjective {
        let mut acc = self.zero();
        for i in (0..k.bits()).rev() {
            acc = self.double(&acc);
            if k.bit(i) {
                acc = self.add(&acc, p);
            }
        }
        acc
    }

    /// `λ`: the smaller nontrivial cube root of unity of the scalar field.
    pub fn endo_scalar(&self) -> Option<BigUint> {
        let lambda = self.scalar.cube_root_of_unity()?;
        let lambda2 = self.scalar.square(&lambda);
        Some(lambda.min(lambda2))
    }

    /// `ζ`: the cube root of unity of the base field with
    /// `(ζ x, y) = λ (x, y)` on the generator.
    pub fn endo_base(&self) -> Option<BigUint> {
        let lambda = self.endo_scalar()?;
        let OrInfinity::Finite(target) = self.to_affine(&self.scale(&self.one(), &lambda)) else {
            return None;
        };
        if target.y != self.generator.y {
            return None;
        }

        let zeta = self.base.cube_root_of_unity()?;
        let zeta2 = self.base.square(&zeta);
        [zeta, zeta2]
            .into_iter()
            .find(|candidate| self.base.mul(candidate, &self.generator.x) == target.x)
    }
}
