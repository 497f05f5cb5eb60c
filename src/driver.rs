//! The equivalence driver: matched trials of every described operation on a
//! reference and a candidate implementation.

use crate::{
    Bindings, ConfigError, ConversionError,
    bindings::Binding,
    report::{
        Divergence, HarnessError, Mismatch, OperationReport, Outcome, Report, Side, SkipReason,
        Skipped,
    },
    signature::{Descriptor, Descriptors, Signature},
    spec::Sample,
    value::{ResourceCounts, Value, release_all},
};
use core::cell::{Cell, RefCell};
use proptest::{
    strategy::{BoxedStrategy, Just, Strategy},
    test_runner::{self, RngAlgorithm, TestCaseError, TestError, TestRng, TestRunner},
};
use rand_core::{OsRng, TryRngCore};
use std::{collections::BTreeSet, env};

/// Trials per operation unless configured otherwise.
pub const DEFAULT_TRIALS: u32 = 256;

/// Shrinking steps after a mismatch unless configured otherwise.
pub const DEFAULT_MAX_SHRINK_ITERS: u32 = 256;

/// Environment variable overriding [`Config::trials`].
pub const TRIALS_VAR: &str = "PASTA_EQUIVALENCE_TRIALS";

/// Environment variable overriding [`Config::seed`], as 64 hex digits.
pub const SEED_VAR: &str = "PASTA_EQUIVALENCE_SEED";

/// Run configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// Trials per operation, unless a signature overrides it.
    pub trials: u32,
    /// Seed of every operation's trial stream.
    pub seed: [u8; 32],
    /// Shrinking steps spent on a mismatch.
    pub max_shrink_iters: u32,
}

impl Default for Config {
    /// Default counts and a fresh random seed.
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            seed: random_seed(),
            max_shrink_iters: DEFAULT_MAX_SHRINK_ITERS,
        }
    }
}

fn random_seed() -> [u8; 32] {
    let mut seed = [0u8; 32];
    if let Err(err) = OsRng.try_fill_bytes(&mut seed) {
        tracing::warn!(%err, "os randomness unavailable, using the all-zero seed");
    }
    seed
}

fn parse_seed(hex: &str) -> Option<[u8; 32]> {
    if hex.len() != 64 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let mut seed = [0u8; 32];
    for (byte, pair) in seed.iter_mut().zip(hex.as_bytes().chunks(2)) {
        let pair = core::str::from_utf8(pair).ok()?;
        *byte = u8::from_str_radix(pair, 16).ok()?;
    }
    Some(seed)
}

impl Config {
    /// Defaults, overridden by [`TRIALS_VAR`] and [`SEED_VAR`] when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(trials) = env::var(TRIALS_VAR) {
            config.trials = trials
                .trim()
                .parse()
                .ok()
                .filter(|&n| n > 0)
                .ok_or(ConfigError::Trials(trials))?;
        }
        if let Ok(seed) = env::var(SEED_VAR) {
            config.seed = parse_seed(seed.trim()).ok_or(ConfigError::Seed(seed))?;
        }
        Ok(config)
    }

    /// Set the trial count.
    pub const fn with_trials(mut self, trials: u32) -> Self {
        self.trials = trials;
        self
    }

    /// Set the seed.
    pub const fn with_seed(mut self, seed: [u8; 32]) -> Self {
        self.seed = seed;
        self
    }

    /// Set the shrinking budget.
    pub const fn with_max_shrink_iters(mut self, max_shrink_iters: u32) -> Self {
        self.max_shrink_iters = max_shrink_iters;
        self
    }
}

/// An operation described and provided by both sides, resolved once per run.
struct Matched<'a> {
    name: &'a str,
    signature: &'a Signature,
    reference: &'a Binding,
    candidate: &'a Binding,
}

enum Resolution<'a> {
    Check(Matched<'a>),
    Skip(SkipReason),
    Broken(HarnessError),
}

enum TrialError {
    Diverged(Divergence),
    Conversion(ConversionError),
}

impl From<ConversionError> for TrialError {
    fn from(error: ConversionError) -> Self {
        Self::Conversion(error)
    }
}

/// Checks a candidate implementation against a reference.
#[derive(Debug)]
pub struct Equivalence<'a> {
    reference: &'a Bindings,
    candidate: &'a Bindings,
    config: Config,
}

impl<'a> Equivalence<'a> {
    /// Driver over `reference` and `candidate` with the default [`Config`].
    pub fn new(reference: &'a Bindings, candidate: &'a Bindings) -> Self {
        Self {
            reference,
            candidate,
            config: Config::default(),
        }
    }

    /// Replace the configuration.
    pub const fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// The configuration in use.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Check every operation under the prefix of `descriptors`.
    pub fn check(&self, descriptors: &Descriptors) -> Report {
        tracing::debug!(
            namespace = descriptors.namespace(),
            reference = self.reference.name(),
            candidate = self.candidate.name(),
            trials = self.config.trials,
            "checking equivalence"
        );

        let mut report = Report {
            reference: self.reference.name().to_owned(),
            candidate: self.candidate.name().to_owned(),
            seed: self.config.seed,
            operations: Vec::new(),
            skipped: Vec::new(),
        };

        for name in self.names(descriptors) {
            match self.resolve(descriptors, &name) {
                Resolution::Check(op) => report.operations.push(self.run(&op)),
                Resolution::Skip(reason) => {
                    tracing::warn!(operation = %name, %reason, "operation skipped");
                    report.skipped.push(Skipped { name, reason });
                }
                Resolution::Broken(error) => {
                    tracing::error!(
                        target: "pasta_equivalence::harness",
                        operation = %name,
                        %error,
                        "operation cannot be checked"
                    );
                    report.operations.push(OperationReport {
                        name,
                        outcome: Outcome::HarnessFailure { error, passed: 0 },
                        leaked: 0,
                    });
                }
            }
        }

        report
    }

    /// Described names plus every bridge name under the prefix, in order.
    fn names(&self, descriptors: &Descriptors) -> BTreeSet<String> {
        let bridged = self
            .reference
            .names()
            .chain(self.candidate.names())
            .filter(|name| descriptors.covers(name));

        descriptors
            .iter()
            .map(|(name, _)| name)
            .chain(bridged)
            .map(str::to_owned)
            .collect()
    }

    fn resolve<'b>(&'b self, descriptors: &'b Descriptors, name: &str) -> Resolution<'b> {
        let Some((name, descriptor)) = descriptors.iter().find(|(n, _)| *n == name) else {
            return Resolution::Skip(SkipReason::Undescribed);
        };
        let signature = match descriptor {
            Descriptor::Check(signature) => signature,
            Descriptor::Unsupported(reason) => {
                return Resolution::Skip(SkipReason::Unsupported(*reason));
            }
        };

        let Some(reference) = self.reference.get(name) else {
            return Resolution::Skip(SkipReason::Missing(Side::Reference));
        };
        let Some(candidate) = self.candidate.get(name) else {
            return Resolution::Skip(SkipReason::Missing(Side::Candidate));
        };

        if reference.arity() != signature.arity() || candidate.arity() != signature.arity() {
            return Resolution::Broken(HarnessError::Arity {
                signature: signature.arity(),
                reference: reference.arity(),
                candidate: candidate.arity(),
            });
        }

        Resolution::Check(Matched {
            name,
            signature,
            reference,
            candidate,
        })
    }

    fn runner(&self, trials: u32) -> TestRunner {
        let config = test_runner::Config {
            cases: trials,
            max_shrink_iters: self.config.max_shrink_iters,
            failure_persistence: None,
            ..Default::default()
        };
        let rng = TestRng::from_seed(RngAlgorithm::ChaCha, &self.config.seed);
        TestRunner::new_with_rng(config, rng)
    }

    fn counts(&self) -> (ResourceCounts, ResourceCounts) {
        (
            self.reference.tracker().counts(),
            self.candidate.tracker().counts(),
        )
    }

    fn leaked_since(&self, before: &(ResourceCounts, ResourceCounts)) -> usize {
        let (reference, candidate) = self.counts();
        let reference = reference.since(&before.0).leaked;
        if core::ptr::eq(self.reference, self.candidate) {
            return reference;
        }
        reference + candidate.since(&before.1).leaked
    }

    fn run(&self, op: &Matched<'_>) -> OperationReport {
        let span = tracing::info_span!("operation", name = op.name);
        let _entered = span.enter();

        let before = self.counts();
        let trials = op.signature.trials().unwrap_or(self.config.trials);
        let strategy = arguments(op.signature);

        let passed = Cell::new(0u32);
        let failing = Cell::new(false);
        let divergence = RefCell::new(None);
        let conversion = RefCell::new(None);
        let conversions = Cell::new(0u32);

        let result = self.runner(trials).run(&strategy, |args| {
            match self.trial(op, &args) {
                Ok(()) => {
                    if !failing.get() {
                        passed.set(passed.get() + 1);
                    }
                    Ok(())
                }
                Err(TrialError::Diverged(found)) => {
                    failing.set(true);
                    let reason = found.to_string();
                    *divergence.borrow_mut() = Some(found);
                    Err(TestCaseError::fail(reason))
                }
                Err(TrialError::Conversion(error)) => {
                    tracing::error!(
                        target: "pasta_equivalence::harness",
                        operation = op.name,
                        %error,
                        ?args,
                        "conversion failed, trial abandoned"
                    );
                    conversions.set(conversions.get() + 1);
                    let reason = error.to_string();
                    conversion.borrow_mut().get_or_insert((error, args));
                    Err(TestCaseError::reject(reason))
                }
            }
        });

        let passed = passed.get();
        let conversion = conversion.into_inner().map(|(error, args)| HarnessError::Conversion {
            error,
            args,
            occurrences: conversions.get(),
        });
        let outcome = match result {
            Ok(()) => match conversion {
                Some(error) => Outcome::HarnessFailure { error, passed },
                None => Outcome::Passed { trials: passed },
            },
            Err(TestError::Fail(reason, args)) => match divergence.into_inner() {
                Some(divergence) => Outcome::Mismatch(Mismatch {
                    operation: op.name.to_owned(),
                    args,
                    divergence,
                    passed,
                }),
                None => Outcome::HarnessFailure {
                    error: HarnessError::Aborted(reason.to_string()),
                    passed,
                },
            },
            Err(TestError::Abort(reason)) => Outcome::HarnessFailure {
                error: conversion.unwrap_or_else(|| HarnessError::Aborted(reason.to_string())),
                passed,
            },
        };

        match &outcome {
            Outcome::Passed { trials } => tracing::info!(trials, "equivalent"),
            Outcome::Mismatch(mismatch) => {
                tracing::error!(
                    kind = mismatch.divergence.kind(),
                    passed,
                    %mismatch,
                    "implementations disagree"
                );
            }
            Outcome::HarnessFailure { error, .. } => {
                tracing::error!(target: "pasta_equivalence::harness", %error, "operation not checked");
            }
        }

        let leaked = self.leaked_since(&before);
        if leaked > 0 {
            tracing::warn!(leaked, "foreign handles dropped without release");
        }

        OperationReport {
            name: op.name.to_owned(),
            outcome,
            leaked,
        }
    }

    /// One trial: convert, call both sides, compare. Every handle created on
    /// the way is released before returning.
    fn trial(&self, op: &Matched<'_>, samples: &[Sample]) -> Result<(), TrialError> {
        tracing::trace!(?samples, "trial");
        let args = convert(op.signature, samples)?;
        let reference = op.reference.invoke(&args);
        let candidate = op.candidate.invoke(&args);
        release_all(args);

        match (reference, candidate) {
            (Err(_), Err(_)) => Ok(()),
            (Ok(value), Err(failure)) => {
                value.release();
                Err(TrialError::Diverged(Divergence::OneSidedFailure {
                    failed: Side::Candidate,
                    failure,
                }))
            }
            (Err(failure), Ok(value)) => {
                value.release();
                Err(TrialError::Diverged(Divergence::OneSidedFailure {
                    failed: Side::Reference,
                    failure,
                }))
            }
            (Ok(reference), Ok(candidate)) => {
                let spec = op.signature.result();
                let reference = spec.back_sample(reference);
                let candidate = spec.back_sample(candidate);
                let (reference, candidate) = (reference?, candidate?);
                if spec.equal_samples(&reference, &candidate)? {
                    Ok(())
                } else {
                    Err(TrialError::Diverged(Divergence::ValueMismatch {
                        reference,
                        candidate,
                    }))
                }
            }
        }
    }
}

/// Strategy drawing one sample per argument spec, shrinking each in turn.
fn arguments(signature: &Signature) -> BoxedStrategy<Vec<Sample>> {
    signature
        .args()
        .iter()
        .fold(Just(Vec::new()).boxed(), |acc, spec| {
            (acc, spec.sample_strategy())
                .prop_map(|(mut args, arg)| {
                    args.push(arg);
                    args
                })
                .boxed()
        })
}

/// Convert every argument, releasing the ones already converted if a later
/// one fails.
fn convert(signature: &Signature, samples: &[Sample]) -> Result<Vec<Value>, ConversionError> {
    if samples.len() != signature.arity() {
        return Err(ConversionError::Arity {
            expected: signature.arity(),
            found: samples.len(),
        });
    }

    let mut args = Vec::with_capacity(samples.len());
    for (spec, sample) in signature.args().iter().zip(samples) {
        match spec.there_sample(sample) {
            Ok(value) => args.push(value),
            Err(error) => {
                release_all(args);
                return Err(error);
            }
        }
    }
    Ok(args)
}
