//! The native implementation: fixed-width Montgomery arithmetic on
//! [`crypto_bigint::U256`], reachable by the harness only through its
//! [`Bindings`](crate::Bindings) table.
//!
//! Point formulas differ from the managed ones, so results agree only up to
//! projective equivalence.

mod bigint;
mod bindings;
mod curve;
mod field;

pub use self::{
    bindings::bindings,
    curve::{Curve, Point, curve},
    field::{Element, LIMBS, PrimeField, field},
};
