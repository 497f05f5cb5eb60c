//! Conversion specs: how a logical type is drawn, converted to its external
//! form, converted back and compared.
//!
//! The round-trip law every spec obeys is `back(there(x))` equal to `x` under
//! [`Spec::equal`].

mod point;

pub use self::point::{AffineSpec, ProjectiveSpec};

use crate::{
    ConversionError,
    managed::{Bigint256, FiniteField, decode, encode, field},
    pasta::FieldId,
    random,
    value::{FIELD_BYTES, Value},
};
use core::{any::Any, fmt, ops::Range};
use num_bigint::BigUint;
use proptest::{prelude::*, sample};
use std::sync::Arc;

/// A logical type paired with its external representation.
pub trait Spec: Clone + Send + Sync + 'static {
    /// The logical type.
    type Logical: Clone + fmt::Debug + PartialEq + Send + Sync + 'static;

    /// Strategy drawing logical values.
    fn strategy(&self) -> BoxedStrategy<Self::Logical>;

    /// Convert a logical value into a fresh external value.
    fn there(&self, logical: &Self::Logical) -> Result<Value, ConversionError>;

    /// Convert an external value back, releasing any handle it owns.
    fn back(&self, value: Value) -> Result<Self::Logical, ConversionError>;

    /// Are `a` and `b` the same for test purposes? Structural unless a spec
    /// documents otherwise.
    fn equal(&self, a: &Self::Logical, b: &Self::Logical) -> bool {
        a == b
    }
}

/// Release `value` and describe why it was rejected.
pub(crate) fn unexpected(expected: &'static str, value: Value) -> ConversionError {
    let found = value.kind();
    value.release();
    ConversionError::UnexpectedValue { expected, found }
}

/// A logical value with its type erased.
pub trait Logical: fmt::Debug + Send + Sync {
    /// Downcasting support.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + fmt::Debug + Send + Sync> Logical for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A drawn argument or a converted result, of any logical type.
pub type Sample = Arc<dyn Logical>;

fn downcast<L: 'static>(sample: &Sample) -> Result<&L, ConversionError> {
    // Deref to the trait object first; `Arc<dyn Logical>` is itself `Logical`.
    (**sample)
        .as_any()
        .downcast_ref::<L>()
        .ok_or(ConversionError::LogicalType(core::any::type_name::<L>()))
}

/// Object-safe view of a [`Spec`] over [`Sample`]s.
pub trait ErasedSpec: Send + Sync {
    /// Strategy drawing samples.
    fn sample_strategy(&self) -> BoxedStrategy<Sample>;

    /// [`Spec::there`] on a sample.
    fn there_sample(&self, sample: &Sample) -> Result<Value, ConversionError>;

    /// [`Spec::back`] into a sample.
    fn back_sample(&self, value: Value) -> Result<Sample, ConversionError>;

    /// [`Spec::equal`] on samples.
    fn equal_samples(&self, a: &Sample, b: &Sample) -> Result<bool, ConversionError>;
}

impl<S: Spec> ErasedSpec for S {
    fn sample_strategy(&self) -> BoxedStrategy<Sample> {
        Spec::strategy(self)
            .prop_map(|logical| -> Sample { Arc::new(logical) })
            .boxed()
    }

    fn there_sample(&self, sample: &Sample) -> Result<Value, ConversionError> {
        Spec::there(self, downcast::<S::Logical>(sample)?)
    }

    fn back_sample(&self, value: Value) -> Result<Sample, ConversionError> {
        let logical = Spec::back(self, value)?;
        let sample: Sample = Arc::new(logical);
        Ok(sample)
    }

    fn equal_samples(&self, a: &Sample, b: &Sample) -> Result<bool, ConversionError> {
        Ok(Spec::equal(
            self,
            downcast::<S::Logical>(a)?,
            downcast::<S::Logical>(b)?,
        ))
    }
}

/// Erase `spec` for use in a [`Signature`](crate::Signature).
pub fn erase<S: Spec>(spec: S) -> Arc<dyn ErasedSpec> {
    Arc::new(spec)
}

/// Native integers.
#[derive(Clone, Debug)]
pub struct Int {
    source: IntSource,
}

#[derive(Clone, Debug)]
enum IntSource {
    Range(Range<i64>),
    OneOf(Vec<i64>),
    Any,
}

impl Int {
    /// Uniform in `range`. Used to mix valid and invalid indices.
    pub fn range(range: Range<i64>) -> Self {
        Self {
            source: IntSource::Range(range),
        }
    }

    /// Uniform choice among `values`, which must be nonempty.
    pub fn one_of(values: impl Into<Vec<i64>>) -> Self {
        Self {
            source: IntSource::OneOf(values.into()),
        }
    }

    /// Any `i64`.
    pub fn any() -> Self {
        Self {
            source: IntSource::Any,
        }
    }
}

impl Spec for Int {
    type Logical = i64;

    fn strategy(&self) -> BoxedStrategy<i64> {
        match &self.source {
            IntSource::Range(range) => range.clone().boxed(),
            IntSource::OneOf(values) => sample::select(values.clone()).boxed(),
            IntSource::Any => any::<i64>().boxed(),
        }
    }

    fn there(&self, logical: &i64) -> Result<Value, ConversionError> {
        Ok(Value::Int(*logical))
    }

    fn back(&self, value: Value) -> Result<i64, ConversionError> {
        match value {
            Value::Int(x) => Ok(x),
            other => Err(unexpected("int", other)),
        }
    }
}

/// Booleans.
#[derive(Clone, Copy, Debug, Default)]
pub struct Boolean;

impl Spec for Boolean {
    type Logical = bool;

    fn strategy(&self) -> BoxedStrategy<bool> {
        any::<bool>().boxed()
    }

    fn there(&self, logical: &bool) -> Result<Value, ConversionError> {
        Ok(Value::Bool(*logical))
    }

    fn back(&self, value: Value) -> Result<bool, ConversionError> {
        match value {
            Value::Bool(x) => Ok(x),
            other => Err(unexpected("bool", other)),
        }
    }
}

/// Raw byte buffers.
#[derive(Clone, Copy, Debug)]
pub struct Bytes {
    field: Option<FieldId>,
}

impl Bytes {
    /// Buffers of mostly 32 bytes.
    pub const fn any() -> Self {
        Self { field: None }
    }

    /// Buffers biased towards canonical encodings of elements of `field`.
    pub const fn encoding(field: FieldId) -> Self {
        Self { field: Some(field) }
    }
}

impl Spec for Bytes {
    type Logical = Vec<u8>;

    fn strategy(&self) -> BoxedStrategy<Vec<u8>> {
        match self.field {
            Some(id) => random::field_encodings(field(id)),
            None => random::bytes(2 * FIELD_BYTES),
        }
    }

    fn there(&self, logical: &Vec<u8>) -> Result<Value, ConversionError> {
        Ok(Value::Bytes(logical.clone()))
    }

    fn back(&self, value: Value) -> Result<Vec<u8>, ConversionError> {
        match value {
            Value::Bytes(bytes) => Ok(bytes),
            other => Err(unexpected("bytes", other)),
        }
    }
}

/// Strings.
#[derive(Clone, Debug)]
pub struct Text {
    source: TextSource,
}

#[derive(Clone, Debug)]
enum TextSource {
    Decimal(BigUint),
    Numeral,
}

impl Text {
    /// Decimal numerals mostly below `bound`, with overflowing and malformed
    /// ones mixed in.
    pub fn decimal(bound: BigUint) -> Self {
        Self {
            source: TextSource::Decimal(bound),
        }
    }

    /// Numerals in bases 2, 8, 10 and 16, with junk mixed in.
    pub fn numeral() -> Self {
        Self {
            source: TextSource::Numeral,
        }
    }
}

impl Spec for Text {
    type Logical = String;

    fn strategy(&self) -> BoxedStrategy<String> {
        match &self.source {
            TextSource::Decimal(bound) => random::decimal_string(bound.clone()),
            TextSource::Numeral => random::numeral_string(),
        }
    }

    fn there(&self, logical: &String) -> Result<Value, ConversionError> {
        Ok(Value::Str(logical.clone()))
    }

    fn back(&self, value: Value) -> Result<String, ConversionError> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(unexpected("string", other)),
        }
    }
}

fn encoded(x: &BigUint) -> Result<Value, ConversionError> {
    let bytes = encode(x).ok_or(ConversionError::OutOfRange("256-bit integer"))?;
    Ok(Value::Bytes(bytes.to_vec()))
}

fn decoded(value: Value) -> Result<BigUint, ConversionError> {
    match value {
        Value::Bytes(bytes) => decode(&bytes).ok_or(ConversionError::Length {
            expected: FIELD_BYTES,
            found: bytes.len(),
        }),
        other => Err(unexpected("bytes", other)),
    }
}

/// 256-bit integers as 32 little-endian bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct Bigint;

impl Spec for Bigint {
    type Logical = Bigint256;

    fn strategy(&self) -> BoxedStrategy<Bigint256> {
        random::bigint256()
    }

    fn there(&self, logical: &Bigint256) -> Result<Value, ConversionError> {
        encoded(logical.as_biguint())
    }

    fn back(&self, value: Value) -> Result<Bigint256, ConversionError> {
        Bigint256::new(decoded(value)?).ok_or(ConversionError::OutOfRange("256-bit integer"))
    }
}

/// Elements of a prime field as canonical 32 little-endian bytes.
#[derive(Clone, Copy, Debug)]
pub struct Field {
    field: &'static FiniteField,
}

impl Field {
    /// Elements of `id`.
    pub fn new(id: FieldId) -> Self {
        Self { field: field(id) }
    }
}

impl Spec for Field {
    type Logical = BigUint;

    fn strategy(&self) -> BoxedStrategy<BigUint> {
        random::field_element(self.field)
    }

    fn there(&self, logical: &BigUint) -> Result<Value, ConversionError> {
        if !self.field.contains(logical) {
            return Err(ConversionError::OutOfRange("field element"));
        }
        encoded(logical)
    }

    fn back(&self, value: Value) -> Result<BigUint, ConversionError> {
        let x = decoded(value)?;
        if !self.field.contains(&x) {
            return Err(ConversionError::OutOfRange("field element"));
        }
        Ok(x)
    }
}

/// `Option<L>` over a spec for `L`; see [`option`].
#[derive(Clone, Debug)]
pub struct OptionSpec<S> {
    inner: S,
}

/// Lift `inner` to optional values.
///
/// Present and absent are drawn with equal weight. Absence passes through
/// both directions without touching `inner`.
pub fn option<S: Spec>(inner: S) -> OptionSpec<S> {
    OptionSpec { inner }
}

impl<S: Spec> Spec for OptionSpec<S> {
    type Logical = Option<S::Logical>;

    fn strategy(&self) -> BoxedStrategy<Self::Logical> {
        prop_oneof![
            Just(None),
            self.inner.strategy().prop_map(Some),
        ]
        .boxed()
    }

    fn there(&self, logical: &Self::Logical) -> Result<Value, ConversionError> {
        match logical {
            None => Ok(Value::none()),
            Some(inner) => self.inner.there(inner).map(Value::some),
        }
    }

    fn back(&self, value: Value) -> Result<Self::Logical, ConversionError> {
        match value {
            Value::Option(None) => Ok(None),
            Value::Option(Some(inner)) => self.inner.back(*inner).map(Some),
            other => Err(unexpected("option", other)),
        }
    }

    fn equal(&self, a: &Self::Logical, b: &Self::Logical) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => self.inner.equal(a, b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Bigint, Bytes, Field, Int, Sample, Spec, Text, erase, option};
    use crate::{ConversionError, managed::Bigint256, pasta::FieldId, value::Value};
    use num_bigint::BigUint;
    use std::sync::Arc;

    #[test]
    fn field_rejects_unreduced_bytes() {
        let spec = Field::new(FieldId::Fp);
        assert_eq!(
            spec.back(Value::Bytes(vec![0xff; 32])),
            Err(ConversionError::OutOfRange("field element"))
        );
        assert_eq!(
            spec.back(Value::Bytes(vec![0; 31])),
            Err(ConversionError::Length {
                expected: 32,
                found: 31
            })
        );
    }

    #[test]
    fn wrong_variant() {
        assert_eq!(
            Int::any().back(Value::Bool(true)),
            Err(ConversionError::UnexpectedValue {
                expected: "int",
                found: "bool"
            })
        );
        assert!(Text::numeral().back(Value::Unit).is_err());
        assert!(Bytes::any().back(Value::Int(3)).is_err());
    }

    #[test]
    fn absent_passes_through() {
        let spec = option(Bigint);
        let value = spec.there(&None).expect("absent converts");
        assert!(matches!(value, Value::Option(None)));
        assert_eq!(spec.back(value), Ok(None));
    }

    #[test]
    fn erased_round_trip() {
        let spec = erase(Bigint);
        let sample: Sample = Arc::new(Bigint256::from_u64(42));
        let value = spec.there_sample(&sample).expect("converts");
        let back = spec.back_sample(value).expect("converts back");
        assert_eq!(spec.equal_samples(&sample, &back), Ok(true));
    }

    #[test]
    fn erased_type_confusion() {
        let spec = erase(Field::new(FieldId::Fq));
        let sample: Sample = Arc::new(7i64);
        assert!(matches!(
            spec.there_sample(&sample),
            Err(ConversionError::LogicalType(_))
        ));

        let sample: Sample = Arc::new(BigUint::from(7u32));
        assert!(spec.there_sample(&sample).is_ok());
    }
}
