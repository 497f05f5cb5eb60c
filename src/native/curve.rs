//! Jacobian group arithmetic on `y^2 = x^3 + 5` with Montgomery coordinates.

use super::field::{Element, PrimeField, field};
use crate::pasta::{CURVE_B, CurveId};
use crypto_bigint::U256;
use std::sync::LazyLock;

static PALLAS: LazyLock<Curve> = LazyLock::new(|| Curve::new(CurveId::Pallas));
static VESTA: LazyLock<Curve> = LazyLock::new(|| Curve::new(CurveId::Vesta));

/// The native curve with the given id.
pub fn curve(id: CurveId) -> &'static Curve {
    match id {
        CurveId::Pallas => &PALLAS,
        CurveId::Vesta => &VESTA,
    }
}

/// Jacobian point; `z = 0` is the identity.
#[derive(Clone, Copy, Debug)]
pub struct Point {
    /// `X`
    pub x: Element,
    /// `Y`
    pub y: Element,
    /// `Z`
    pub z: Element,
}

/// A curve of the cycle.
#[derive(Debug)]
pub struct Curve {
    id: CurveId,
    base: &'static PrimeField,
    scalar: &'static PrimeField,
    b: Element,
    generator: (Element, Element),
}

impl Curve {
    fn new(id: CurveId) -> Self {
        let base = field(id.base());
        Self {
            id,
            base,
            scalar: field(id.scalar()),
            b: base.from_u64(CURVE_B),
            generator: (base.from_int(-1), base.from_int(2)),
        }
    }

    /// Which curve this is.
    pub const fn id(&self) -> CurveId {
        self.id
    }

    /// Coordinate field.
    pub const fn base(&self) -> &'static PrimeField {
        self.base
    }

    /// Scalar field.
    pub const fn scalar(&self) -> &'static PrimeField {
        self.scalar
    }

    /// Affine coordinates of the generator.
    pub const fn generator(&self) -> (Element, Element) {
        self.generator
    }

    /// The point at infinity.
    pub fn identity(&self) -> Point {
        Point {
            x: self.base.one(),
            y: self.base.one(),
            z: self.base.zero(),
        }
    }

    /// The generator.
    pub fn one(&self) -> Point {
        let (x, y) = self.generator;
        self.from_affine(x, y)
    }

    /// Is `p` the point at infinity?
    pub fn is_identity(&self, p: &Point) -> bool {
        self.base.is_zero(&p.z)
    }

    /// Lift `(x, y)` with `z = 1`, without checking the curve equation.
    pub fn from_affine(&self, x: Element, y: Element) -> Point {
        Point {
            x,
            y,
            z: self.base.one(),
        }
    }

    /// Affine coordinates, `None` for the identity.
    pub fn to_affine(&self, p: &Point) -> Option<(Element, Element)> {
        let z_inv = self.base.invert(&p.z)?;
        let z_inv2 = z_inv.square();
        Some((p.x * z_inv2, p.y * z_inv2 * z_inv))
    }

    /// Is the affine point `(x, y)` on the curve?
    pub fn contains(&self, x: &Element, y: &Element) -> bool {
        self.base.equal(&y.square(), &(x.square() * *x + self.b))
    }

    /// Do `p` and `q` denote the same point?
    pub fn equal(&self, p: &Point, q: &Point) -> bool {
        match (self.to_affine(p), self.to_affine(q)) {
            (None, None) => true,
            (Some((px, py)), Some((qx, qy))) => {
                self.base.equal(&px, &qx) && self.base.equal(&py, &qy)
            }
            _ => false,
        }
    }

    /// `-p`
    pub fn negate(&self, p: &Point) -> Point {
        Point { y: -p.y, ..*p }
    }

    /// `2p`, with `S = 4XY^2` and `M = 3X^2`.
    pub fn double(&self, p: &Point) -> Point {
        if self.is_identity(p) {
            return *p;
        }

        let xx = p.x.square();
        let yy = p.y.square();
        let s = (p.x * yy) * self.base.from_u64(4);
        let m = xx * self.base.from_u64(3);
        let t = m.square() - s - s;
        let yyyy8 = yy.square() * self.base.from_u64(8);

        Point {
            x: t,
            y: m * (s - t) - yyyy8,
            z: (p.y * p.z) * self.base.from_u64(2),
        }
    }

    /// `p + q` with a single `H` (no doubled intermediates).
    pub fn add(&self, p: &Point, q: &Point) -> Point {
        if self.is_identity(p) {
            return *q;
        }
        if self.is_identity(q) {
            return *p;
        }

        let z1z1 = p.z.square();
        let z2z2 = q.z.square();
        let u1 = p.x * z2z2;
        let u2 = q.x * z1z1;
        let s1 = p.y * q.z * z2z2;
        let s2 = q.y * p.z * z1z1;
        let h = u2 - u1;
        let r = s2 - s1;

        if self.base.is_zero(&h) {
            if self.base.is_zero(&r) {
                return self.double(p);
            }
            return self.identity();
        }

        let hh = h.square();
        let hhh = h * hh;
        let v = u1 * hh;
        let x3 = r.square() - hhh - v - v;

        Point {
            x: x3,
            y: r * (v - x3) - s1 * hhh,
            z: p.z * q.z * h,
        }
    }

    /// `p - q`
    pub fn sub(&self, p: &Point, q: &Point) -> Point {
        self.add(p, &self.negate(q))
    }

    /// `k * p`, scanning `k` from the least significant bit.
    pub fn scale(&self, p: &Point, k: &U256) -> Point {
        let mut acc = self.identity();
        let mut addend = *p;
        for i in 0..k.bits_vartime() {
            if k.bit_vartime(i) {
                acc = self.add(&acc, &addend);
            }
            addend = self.double(&addend);
        }
        acc
    }

    /// `λ`, the scalar-field cube root of unity with the smaller canonical value.
    pub fn endo_scalar(&self) -> Option<Element> {
        let lambda = self.scalar.cube_root_of_unity()?;
        let lambda2 = lambda.square();
        Some(if lambda.retrieve() < lambda2.retrieve() {
            lambda
        } else {
            lambda2
        })
    }

    /// `ζ`, the base-field cube root of unity acting on `x` as `λ` does on the
    /// group.
    pub fn endo_base(&self) -> Option<Element> {
        let lambda = self.endo_scalar()?;
        let (gx, gy) = self.generator;
        let (x, y) = self.to_affine(&self.scale(&self.one(), &lambda.retrieve()))?;
        if !self.base.equal(&y, &gy) {
            return None;
        }

        let zeta = self.base.cube_root_of_unity()?;
        [zeta, zeta.square()]
            .into_iter()
            .find(|candidate| self.base.equal(&(*candidate * gx), &x))
    }
}

#[cfg(test)]
mod tests {
    use super::curve;
    use crate::pasta::CurveId;
    use crypto_bigint::U256;

    #[test]
    fn generator_on_curve() {
        for id in [CurveId::Pallas, CurveId::Vesta] {
            let c = curve(id);
            let (x, y) = c.generator();
            assert!(c.contains(&x, &y));
        }
    }

    #[test]
    fn addition_matches_doubling() {
        let c = curve(CurveId::Vesta);
        let g = c.one();
        let four_g = c.double(&c.double(&g));
        let sum = c.add(&c.add(&g, &g), &c.add(&g, &g));
        assert!(c.equal(&four_g, &sum));
        assert!(c.equal(&c.scale(&g, &U256::from_u64(4)), &four_g));

        let (x, y) = c.to_affine(&four_g).expect("finite");
        assert!(c.contains(&x, &y));
    }

    #[test]
    fn inverse_cancels() {
        let c = curve(CurveId::Pallas);
        let g = c.double(&c.one());
        assert!(c.is_identity(&c.sub(&g, &g)));
        assert!(c.is_identity(&c.scale(&c.identity(), &U256::from_u64(99))));
        assert!(c.is_identity(&c.scale(&g, &U256::ZERO)));
    }

    #[test]
    fn group_order() {
        for id in [CurveId::Pallas, CurveId::Vesta] {
            let c = curve(id);
            assert!(c.is_identity(&c.scale(&c.one(), c.scalar().modulus())));
        }
    }

    #[test]
    fn endomorphism() {
        for id in [CurveId::Pallas, CurveId::Vesta] {
            assert!(curve(id).endo_base().is_some());
        }
    }
}
