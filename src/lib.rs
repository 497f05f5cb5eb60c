//! Randomized equivalence testing of two implementations of the same
//! big integer, prime field and elliptic curve API.
//!
//! # About
//! A *reference* implementation and a *candidate* implementation each expose
//! a flat namespace of named operations ([`Bindings`]). For every operation a
//! [`Signature`] says how to draw arguments, how to convert them to the
//! external representation both sides accept, and how to convert and compare
//! the results. The [`Equivalence`] driver runs matched trials and collects a
//! [`Report`] of mismatches, skipped operations and leaked handles.
//!
//! Two implementations of the Pasta surface (`bigint256_*`, `fp_*`, `fq_*`,
//! `pallas_*`, `vesta_*`) ship with the crate: [`managed`], built on
//! arbitrary-precision [`num_bigint::BigUint`] arithmetic, and [`native`],
//! built on fixed-width [`crypto_bigint`] Montgomery arithmetic. The
//! descriptor maps for that surface live in [`suite`].
//!
//! # Usage
//! ```no_run
//! use pasta_equivalence::{Config, Equivalence, managed, native, suite};
//! use std::sync::Arc;
//!
//! let reference = managed::bindings();
//! let candidate = Arc::new(native::bindings());
//! let config = Config::from_env().expect("valid configuration");
//!
//! let driver = Equivalence::new(&reference, &candidate).with_config(config);
//! for descriptors in suite::all(candidate.clone()) {
//!     driver.check(&descriptors).assert_success();
//! }
//! ```
//!
//! # Resources
//! Point values cross the bridge as owned handles ([`value::Foreign`]) which
//! must be released exactly once. Every handle is counted by the
//! [`value::ResourceTracker`] of the implementation that created it, and a
//! handle dropped without release fails the run.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code, clippy::unwrap_used)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unused_qualifications
)]

#[macro_use]
mod macros;

pub mod bindings;
pub mod driver;
mod error;
pub mod managed;
pub mod native;
pub mod pasta;
pub mod random;
pub mod report;
pub mod signature;
pub mod spec;
pub mod suite;
pub mod value;

pub use crate::{
    bindings::{Args, Binding, Bindings},
    driver::{Config, Equivalence},
    error::{ConfigError, ConversionError, ImplementationFailure},
    report::{Divergence, Mismatch, Outcome, Report, Side, SkipReason},
    signature::{Descriptor, Descriptors, Signature},
    spec::{Sample, Spec},
    value::{Foreign, ResourceTracker, Value},
};
pub use {crypto_bigint, num_bigint, proptest};
