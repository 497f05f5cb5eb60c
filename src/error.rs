//! Error types.

use core::fmt;

/// A logical value could not be converted to or from its external form.
///
/// These are bugs in the harness (or in a conversion spec), never a
/// disagreement between the implementations under test.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConversionError {
    /// The external value had a different variant than the spec expects.
    UnexpectedValue {
        /// Variant the spec expects.
        expected: &'static str,
        /// Variant that was found.
        found: &'static str,
    },

    /// A byte buffer had the wrong length.
    Length {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        found: usize,
    },

    /// A value violated the representation invariant of its type.
    OutOfRange(&'static str),

    /// A type-erased logical value was not of the type its spec handles.
    LogicalType(&'static str),

    /// The number of samples did not match the number of argument specs.
    Arity {
        /// Number of argument specs.
        expected: usize,
        /// Number of samples provided.
        found: usize,
    },

    /// A helper call into the native bridge failed during conversion.
    Bridge {
        /// Name of the bridge operation.
        operation: String,
        /// How it failed.
        failure: ImplementationFailure,
    },
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedValue { expected, found } => {
                write!(f, "expected {expected} value, found {found}")
            }
            Self::Length { expected, found } => {
                write!(f, "expected {expected} bytes, found {found}")
            }
            Self::OutOfRange(what) => write!(f, "{what} out of range"),
            Self::LogicalType(expected) => write!(f, "logical value is not a {expected}"),
            Self::Arity { expected, found } => {
                write!(f, "expected {expected} arguments, found {found}")
            }
            Self::Bridge { operation, failure } => {
                write!(f, "bridge call `{operation}` failed: {failure}")
            }
        }
    }
}

impl core::error::Error for ConversionError {}

/// An implementation under test failed to produce a result.
///
/// Not an error of the harness: the driver compares it against the other
/// implementation's outcome.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ImplementationFailure {
    /// The operation rejected its input.
    Failed(String),

    /// An argument had a different variant than the operation accepts.
    Argument {
        /// Position of the argument.
        index: usize,
        /// Variant the operation accepts.
        expected: &'static str,
        /// Variant that was passed.
        found: &'static str,
    },

    /// The operation was invoked with the wrong number of arguments.
    Arity {
        /// Registered arity.
        expected: usize,
        /// Number of arguments passed.
        found: usize,
    },

    /// No operation with this name is registered.
    Unknown(String),

    /// The operation panicked; the panic was caught at the bridge.
    Panicked(String),
}

impl ImplementationFailure {
    /// Shorthand for [`ImplementationFailure::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

impl fmt::Display for ImplementationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(message) => f.write_str(message),
            Self::Argument {
                index,
                expected,
                found,
            } => write!(f, "argument {index}: expected {expected}, found {found}"),
            Self::Arity { expected, found } => {
                write!(f, "expected {expected} arguments, found {found}")
            }
            Self::Unknown(name) => write!(f, "unknown operation `{name}`"),
            Self::Panicked(message) => write!(f, "panicked: {message}"),
        }
    }
}

impl core::error::Error for ImplementationFailure {}

/// An environment variable held an unusable configuration value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConfigError {
    /// The trial count was not a positive integer.
    Trials(String),
    /// The seed was not 64 hex digits.
    Seed(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trials(value) => write!(f, "invalid trial count `{value}`"),
            Self::Seed(value) => write!(f, "invalid seed `{value}`: expected 64 hex digits"),
        }
    }
}

impl core::error::Error for ConfigError {}
