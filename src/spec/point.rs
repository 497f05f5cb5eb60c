//! Curve point specs.
//!
//! Points cross the bridge only through the native side's own constructors:
//! the bridge has no way to set raw projective coordinates, so a logical point
//! is normalized, written into a native affine handle and promoted with
//! `<curve>_of_affine`. The way back goes through `<curve>_to_affine`.

use super::{Spec, unexpected};
use crate::{
    Bindings, ConversionError,
    managed::{FiniteField, GroupAffine, GroupProjective, OrInfinity, ProjectiveCurve, curve},
    pasta::{CurveId, op_name},
    random::{self, PointCases},
    value::{FieldBytes, Value, release_all},
};
use num_bigint::BigUint;
use proptest::prelude::*;
use std::sync::Arc;

/// Bridge access shared by both point specs.
#[derive(Clone)]
struct NativeCurve {
    curve: &'static ProjectiveCurve,
    native: Arc<Bindings>,
}

impl NativeCurve {
    fn new(id: CurveId, native: Arc<Bindings>) -> Self {
        Self {
            curve: curve(id),
            native,
        }
    }

    fn call(&self, op: &str, args: Vec<Value>) -> Result<Value, ConversionError> {
        let operation = op_name(self.curve.id(), op);
        let result = self.native.call(&operation, &args);
        release_all(args);
        result.map_err(|failure| ConversionError::Bridge { operation, failure })
    }

    /// A native affine handle holding `p`.
    fn affine(&self, p: &OrInfinity) -> Result<Value, ConversionError> {
        let mut handle = match self.call("affine_one", Vec::new())? {
            Value::Affine(handle) => handle,
            other => return Err(unexpected("affine point", other)),
        };

        let repr = handle.get_mut();
        match p {
            OrInfinity::Infinity => repr.infinity = true,
            OrInfinity::Finite(GroupAffine { x, y }) => {
                let base = self.curve.base();
                match (coordinate(base, x), coordinate(base, y)) {
                    (Ok(x), Ok(y)) => {
                        repr.x = x;
                        repr.y = y;
                        repr.infinity = false;
                    }
                    (Err(err), _) | (_, Err(err)) => {
                        handle.release();
                        return Err(err);
                    }
                }
            }
        }
        Ok(Value::Affine(handle))
    }

    /// Read a native affine handle, releasing it.
    fn read_affine(&self, value: Value) -> Result<OrInfinity, ConversionError> {
        let repr = match value {
            Value::Affine(handle) => handle.release_after(|repr| *repr),
            other => return Err(unexpected("affine point", other)),
        };
        if repr.infinity {
            return Ok(OrInfinity::Infinity);
        }

        let base = self.curve.base();
        Ok(OrInfinity::Finite(GroupAffine {
            x: element(base, &repr.x)?,
            y: element(base, &repr.y)?,
        }))
    }
}

fn coordinate(base: &FiniteField, x: &BigUint) -> Result<FieldBytes, ConversionError> {
    if !base.contains(x) {
        return Err(ConversionError::OutOfRange("point coordinate"));
    }
    crate::managed::encode(x).ok_or(ConversionError::OutOfRange("point coordinate"))
}

fn element(base: &FiniteField, bytes: &FieldBytes) -> Result<BigUint, ConversionError> {
    base.from_bytes(bytes)
        .ok_or(ConversionError::OutOfRange("point coordinate"))
}

/// Projective points, compared up to projective equivalence.
///
/// Both implementations keep results unnormalized and use different formulas,
/// so coordinate triples of equal points differ; [`Spec::equal`] here is
/// [`ProjectiveCurve::equal`], not `==`.
///
/// Results of both sides come back through the candidate's
/// `<curve>_to_affine`. A normalization bug there is applied to the reference
/// result too and goes unseen whenever both formulas produce the same `z`, as
/// for `double` and `negate`. `<curve>_to_affine` is checked on its own, against
/// the reference's affine output.
#[derive(Clone)]
pub struct ProjectiveSpec {
    bridge: NativeCurve,
    cases: PointCases,
}

impl ProjectiveSpec {
    /// Points of `id`, converted through `native`.
    pub fn new(id: CurveId, native: Arc<Bindings>) -> Self {
        Self {
            bridge: NativeCurve::new(id, native),
            cases: PointCases::Mixed,
        }
    }

    /// Restrict which points are drawn.
    pub fn with_cases(mut self, cases: PointCases) -> Self {
        self.cases = cases;
        self
    }
}

impl Spec for ProjectiveSpec {
    type Logical = GroupProjective;

    fn strategy(&self) -> BoxedStrategy<GroupProjective> {
        random::point(self.bridge.curve, self.cases)
    }

    fn there(&self, logical: &GroupProjective) -> Result<Value, ConversionError> {
        let affine = self.bridge.affine(&self.bridge.curve.to_affine(logical))?;
        match self.bridge.call("of_affine", vec![affine])? {
            projective @ Value::Projective(_) => Ok(projective),
            other => Err(unexpected("projective point", other)),
        }
    }

    fn back(&self, value: Value) -> Result<GroupProjective, ConversionError> {
        if !matches!(value, Value::Projective(_)) {
            return Err(unexpected("projective point", value));
        }
        let affine = self.bridge.call("to_affine", vec![value])?;
        let p = self.bridge.read_affine(affine)?;
        Ok(self.bridge.curve.from_or_infinity(&p))
    }

    fn equal(&self, a: &GroupProjective, b: &GroupProjective) -> bool {
        self.bridge.curve.equal(a, b)
    }
}

/// Affine points with an infinity flag, compared structurally.
#[derive(Clone)]
pub struct AffineSpec {
    bridge: NativeCurve,
}

impl AffineSpec {
    /// Affine points of `id`, converted through `native`.
    pub fn new(id: CurveId, native: Arc<Bindings>) -> Self {
        Self {
            bridge: NativeCurve::new(id, native),
        }
    }
}

impl Spec for AffineSpec {
    type Logical = OrInfinity;

    fn strategy(&self) -> BoxedStrategy<OrInfinity> {
        let c = self.bridge.curve;
        random::point(c, PointCases::Mixed)
            .prop_map(move |p| c.to_affine(&p))
            .boxed()
    }

    fn there(&self, logical: &OrInfinity) -> Result<Value, ConversionError> {
        self.bridge.affine(logical)
    }

    fn back(&self, value: Value) -> Result<OrInfinity, ConversionError> {
        self.bridge.read_affine(value)
    }
}

impl core::fmt::Debug for ProjectiveSpec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProjectiveSpec")
            .field("curve", &self.bridge.curve.id())
            .field("cases", &self.cases)
            .finish()
    }
}

impl core::fmt::Debug for AffineSpec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AffineSpec")
            .field("curve", &self.bridge.curve.id())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{AffineSpec, ProjectiveSpec};
    use crate::{
        managed::{GroupProjective, OrInfinity, curve},
        native,
        pasta::CurveId,
        spec::Spec,
        value::Value,
    };
    use num_bigint::BigUint;
    use std::sync::Arc;

    #[test]
    fn identity_sets_only_the_flag() {
        let bindings = Arc::new(native::bindings());
        let spec = ProjectiveSpec::new(CurveId::Pallas, bindings.clone());
        let zero = curve(CurveId::Pallas).zero();

        let value = spec.there(&zero).expect("converts");
        assert!(matches!(value, Value::Projective(_)));
        assert_eq!(spec.back(value).expect("converts back"), zero);
        assert_eq!(bindings.tracker().live(), 0);
        assert_eq!(bindings.tracker().counts().leaked, 0);
    }

    #[test]
    fn affine_infinity() {
        let bindings = Arc::new(native::bindings());
        let spec = AffineSpec::new(CurveId::Vesta, bindings.clone());

        let value = spec.there(&OrInfinity::Infinity).expect("converts");
        match &value {
            Value::Affine(handle) => assert!(handle.get().infinity),
            other => panic!("unexpected value: {other:?}"),
        }
        assert_eq!(spec.back(value), Ok(OrInfinity::Infinity));
        assert_eq!(bindings.tracker().live(), 0);
    }

    #[test]
    fn equality_is_projective() {
        let bindings = Arc::new(native::bindings());
        let spec = ProjectiveSpec::new(CurveId::Pallas, bindings);
        let c = curve(CurveId::Pallas);
        let f = c.base();

        let p = c.double(&c.one());
        let lambda = BigUint::from(5u32);
        let lambda2 = f.square(&lambda);
        let q = GroupProjective {
            x: f.mul(&p.x, &lambda2),
            y: f.mul(&p.y, &f.mul(&lambda2, &lambda)),
            z: f.mul(&p.z, &lambda),
        };

        assert_ne!(p, q);
        assert!(spec.equal(&p, &q));
        assert!(!spec.equal(&p, &c.zero()));
    }

    #[test]
    fn wrong_handle_kind_is_released() {
        let bindings = Arc::new(native::bindings());
        let affine = AffineSpec::new(CurveId::Pallas, bindings.clone());
        let projective = ProjectiveSpec::new(CurveId::Pallas, bindings.clone());

        let value = affine
            .there(&curve(CurveId::Pallas).to_affine(&curve(CurveId::Pallas).one()))
            .expect("converts");
        assert!(projective.back(value).is_err());
        assert_eq!(bindings.tracker().live(), 0);
        assert_eq!(bindings.tracker().counts().leaked, 0);
    }
}
