//! Results of an equivalence run.

use crate::{ConversionError, ImplementationFailure, spec::Sample};
use core::fmt;

/// One of the two implementations under test.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Side {
    /// The implementation taken as ground truth.
    Reference,
    /// The implementation being checked.
    Candidate,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Reference => "reference",
            Self::Candidate => "candidate",
        })
    }
}

/// How the two implementations disagreed on one input.
#[derive(Clone, Debug)]
pub enum Divergence {
    /// One side failed and the other did not.
    OneSidedFailure {
        /// The side that failed.
        failed: Side,
        /// Its failure.
        failure: ImplementationFailure,
    },
    /// Both succeeded with values that are not equal under the result spec.
    ValueMismatch {
        /// Result of the reference, converted back.
        reference: Sample,
        /// Result of the candidate, converted back.
        candidate: Sample,
    },
}

impl Divergence {
    /// `one-sided-failure` or `value-mismatch`.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::OneSidedFailure { .. } => "one-sided-failure",
            Self::ValueMismatch { .. } => "value-mismatch",
        }
    }
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneSidedFailure { failed, failure } => {
                write!(f, "{}: only the {failed} failed ({failure})", self.kind())
            }
            Self::ValueMismatch {
                reference,
                candidate,
            } => write!(
                f,
                "{}: reference returned {reference:?}, candidate returned {candidate:?}",
                self.kind()
            ),
        }
    }
}

/// A disagreement, with what is needed to reproduce it.
#[derive(Clone, Debug)]
pub struct Mismatch {
    /// Full operation name.
    pub operation: String,
    /// Arguments of the (shrunk) failing trial.
    pub args: Vec<Sample>,
    /// What went wrong.
    pub divergence: Divergence,
    /// Trials that passed before the first failing one.
    pub passed: u32,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} mismatch after {} passing trials, args {:?}: {}",
            self.operation, self.passed, self.args, self.divergence
        )
    }
}

/// The harness itself could not complete an operation's trials.
#[derive(Clone, Debug)]
pub enum HarnessError {
    /// A conversion failed; the trial it happened in was abandoned.
    Conversion {
        /// The first conversion error seen.
        error: ConversionError,
        /// Arguments of that trial.
        args: Vec<Sample>,
        /// How many trials hit a conversion error.
        occurrences: u32,
    },
    /// Signature and bindings disagree on the number of arguments.
    Arity {
        /// Arity of the signature.
        signature: usize,
        /// Arity registered by the reference.
        reference: usize,
        /// Arity registered by the candidate.
        candidate: usize,
    },
    /// The trial loop gave up, e.g. after too many abandoned trials.
    Aborted(String),
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conversion {
                error,
                args,
                occurrences,
            } => write!(
                f,
                "conversion error in {occurrences} trial(s), first with args {args:?}: {error}"
            ),
            Self::Arity {
                signature,
                reference,
                candidate,
            } => write!(
                f,
                "arity mismatch: signature {signature}, reference {reference}, candidate {candidate}"
            ),
            Self::Aborted(reason) => write!(f, "aborted: {reason}"),
        }
    }
}

/// Outcome of one operation.
#[derive(Clone, Debug)]
pub enum Outcome {
    /// Every trial agreed.
    Passed {
        /// Number of trials run.
        trials: u32,
    },
    /// The implementations disagreed.
    Mismatch(Mismatch),
    /// The harness could not check the operation.
    HarnessFailure {
        /// What went wrong.
        error: HarnessError,
        /// Trials that passed nonetheless.
        passed: u32,
    },
}

impl Outcome {
    /// Did every trial agree?
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed { .. })
    }
}

/// Outcome and resource accounting of one checked operation.
#[derive(Clone, Debug)]
pub struct OperationReport {
    /// Full operation name.
    pub name: String,
    /// What happened.
    pub outcome: Outcome,
    /// Handles dropped without release while checking this operation.
    pub leaked: usize,
}

/// Why an operation was not checked.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SkipReason {
    /// Under the descriptor map's prefix but not described.
    Undescribed,
    /// Marked unsupported, with the stated reason.
    Unsupported(&'static str),
    /// Described, but one implementation does not provide it.
    Missing(Side),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undescribed => f.write_str("no descriptor"),
            Self::Unsupported(reason) => write!(f, "unsupported: {reason}"),
            Self::Missing(side) => write!(f, "missing from the {side}"),
        }
    }
}

/// An operation that was not checked.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Skipped {
    /// Full operation name.
    pub name: String,
    /// Why.
    pub reason: SkipReason,
}

/// Everything one run over a descriptor map found.
#[derive(Clone, Debug)]
pub struct Report {
    /// Name of the reference implementation.
    pub reference: String,
    /// Name of the candidate implementation.
    pub candidate: String,
    /// Seed of every operation's trial stream.
    pub seed: [u8; 32],
    /// Checked operations, in name order.
    pub operations: Vec<OperationReport>,
    /// Skipped operations, in name order.
    pub skipped: Vec<Skipped>,
}

impl Report {
    /// Did every checked operation pass without leaking?
    pub fn is_success(&self) -> bool {
        self.operations
            .iter()
            .all(|op| op.outcome.is_passed() && op.leaked == 0)
    }

    /// Report of the named operation.
    pub fn operation(&self, name: &str) -> Option<&OperationReport> {
        self.operations.iter().find(|op| op.name == name)
    }

    /// All mismatches.
    pub fn mismatches(&self) -> impl Iterator<Item = &Mismatch> {
        self.operations.iter().filter_map(|op| match &op.outcome {
            Outcome::Mismatch(mismatch) => Some(mismatch),
            _ => None,
        })
    }

    /// Is `name` in the skip list?
    pub fn is_skipped(&self, name: &str) -> bool {
        self.skipped.iter().any(|skip| skip.name == name)
    }

    /// Total handles leaked.
    pub fn leaked(&self) -> usize {
        self.operations.iter().map(|op| op.leaked).sum()
    }

    /// Panic with the rendered report unless [`Report::is_success`].
    #[track_caller]
    pub fn assert_success(&self) {
        assert!(self.is_success(), "{self}");
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let passed = self
            .operations
            .iter()
            .filter(|op| op.outcome.is_passed())
            .count();
        write!(
            f,
            "{} vs {}: {passed}/{} operations passed, {} skipped, seed ",
            self.reference,
            self.candidate,
            self.operations.len(),
            self.skipped.len(),
        )?;
        for byte in self.seed {
            write!(f, "{byte:02x}")?;
        }
        writeln!(f)?;

        for op in &self.operations {
            match &op.outcome {
                Outcome::Passed { trials } => writeln!(f, "  ok   {} ({trials} trials)", op.name)?,
                Outcome::Mismatch(mismatch) => writeln!(f, "  FAIL {mismatch}")?,
                Outcome::HarnessFailure { error, passed } => {
                    writeln!(f, "  ERR  {} after {passed} trials: {error}", op.name)?
                }
            }
            if op.leaked > 0 {
                writeln!(f, "  LEAK {}: {} handle(s)", op.name, op.leaked)?;
            }
        }
        for skip in &self.skipped {
            writeln!(f, "  skip {}: {}", skip.name, skip.reason)?;
        }
        Ok(())
    }
}
