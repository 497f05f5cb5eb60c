//! Flat tables of named operations, one per implementation under test.

use crate::{
    ImplementationFailure,
    value::{AffineRepr, ProjectiveRepr, ResourceTracker, Value},
};
use core::fmt;
use std::{
    any::Any,
    collections::BTreeMap,
    panic::{self, AssertUnwindSafe},
};

type Callable = Box<dyn Fn(Args<'_>) -> Result<Value, ImplementationFailure> + Send + Sync>;

/// Positional arguments of one call, with typed accessors.
///
/// Every accessor fails with [`ImplementationFailure::Argument`] when the
/// value has another variant, so implementations reject ill-typed calls
/// instead of panicking.
#[derive(Clone, Copy, Debug)]
pub struct Args<'a> {
    values: &'a [Value],
    tracker: &'a ResourceTracker,
}

impl<'a> Args<'a> {
    /// Wrap a slice of values; handles created for the result are accounted
    /// to `tracker`.
    pub const fn new(values: &'a [Value], tracker: &'a ResourceTracker) -> Self {
        Self { values, tracker }
    }

    /// Tracker of the implementation being called.
    pub const fn tracker(&self) -> &'a ResourceTracker {
        self.tracker
    }

    /// Number of arguments.
    pub const fn len(&self) -> usize {
        self.values.len()
    }

    /// Are there no arguments?
    pub const fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Argument at `index`, whatever its variant.
    pub fn get(&self, index: usize) -> Result<&'a Value, ImplementationFailure> {
        self.values.get(index).ok_or(ImplementationFailure::Arity {
            expected: index + 1,
            found: self.values.len(),
        })
    }

    /// Integer argument.
    pub fn int(&self, index: usize) -> Result<i64, ImplementationFailure> {
        match self.get(index)? {
            Value::Int(value) => Ok(*value),
            other => Err(mistyped(index, "int", other)),
        }
    }

    /// Boolean argument.
    pub fn boolean(&self, index: usize) -> Result<bool, ImplementationFailure> {
        match self.get(index)? {
            Value::Bool(value) => Ok(*value),
            other => Err(mistyped(index, "bool", other)),
        }
    }

    /// Byte buffer argument.
    pub fn bytes(&self, index: usize) -> Result<&'a [u8], ImplementationFailure> {
        match self.get(index)? {
            Value::Bytes(value) => Ok(value),
            other => Err(mistyped(index, "bytes", other)),
        }
    }

    /// String argument.
    pub fn str(&self, index: usize) -> Result<&'a str, ImplementationFailure> {
        match self.get(index)? {
            Value::Str(value) => Ok(value),
            other => Err(mistyped(index, "string", other)),
        }
    }

    /// Affine point handle argument.
    pub fn affine(&self, index: usize) -> Result<&'a AffineRepr, ImplementationFailure> {
        match self.get(index)? {
            Value::Affine(handle) => Ok(handle.get()),
            other => Err(mistyped(index, "affine point", other)),
        }
    }

    /// Projective point handle argument.
    pub fn projective(&self, index: usize) -> Result<&'a ProjectiveRepr, ImplementationFailure> {
        match self.get(index)? {
            Value::Projective(handle) => Ok(handle.get()),
            other => Err(mistyped(index, "projective point", other)),
        }
    }
}

fn mistyped(index: usize, expected: &'static str, found: &Value) -> ImplementationFailure {
    ImplementationFailure::Argument {
        index,
        expected,
        found: found.kind(),
    }
}

/// One registered operation.
pub struct Binding {
    arity: usize,
    callable: Callable,
    tracker: ResourceTracker,
}

impl Binding {
    /// Number of arguments the operation takes.
    pub const fn arity(&self) -> usize {
        self.arity
    }

    /// Invoke the operation.
    ///
    /// Never panics: a wrong argument count is a failure, and a panic inside
    /// the operation is caught and turned into
    /// [`ImplementationFailure::Panicked`].
    pub fn invoke(&self, args: &[Value]) -> Result<Value, ImplementationFailure> {
        if args.len() != self.arity {
            return Err(ImplementationFailure::Arity {
                expected: self.arity,
                found: args.len(),
            });
        }

        panic::catch_unwind(AssertUnwindSafe(|| {
            (self.callable)(Args::new(args, &self.tracker))
        }))
        .unwrap_or_else(|payload| Err(ImplementationFailure::Panicked(panic_message(&*payload))))
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

/// A named collection of operations: the capability interface both
/// implementations under test expose.
pub struct Bindings {
    name: String,
    tracker: ResourceTracker,
    table: BTreeMap<String, Binding>,
}

impl Bindings {
    /// Create an empty table for the implementation called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tracker: ResourceTracker::new(),
            table: BTreeMap::new(),
        }
    }

    /// Name of the implementation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tracker accounting for every handle this implementation creates.
    pub fn tracker(&self) -> &ResourceTracker {
        &self.tracker
    }

    /// Register `callable` as operation `name` taking `arity` arguments.
    ///
    /// Registering a name twice replaces the earlier operation.
    pub fn register<F>(&mut self, name: impl Into<String>, arity: usize, callable: F) -> &mut Self
    where
        F: Fn(Args<'_>) -> Result<Value, ImplementationFailure> + Send + Sync + 'static,
    {
        self.table.insert(
            name.into(),
            Binding {
                arity,
                callable: Box::new(callable),
                tracker: self.tracker.clone(),
            },
        );
        self
    }

    /// Look up an operation.
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.table.get(name)
    }

    /// Is an operation with this name registered?
    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Names of all registered operations, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    /// Number of registered operations.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Look up `name` and invoke it with `args`.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, ImplementationFailure> {
        self.get(name)
            .ok_or_else(|| ImplementationFailure::Unknown(name.to_owned()))?
            .invoke(args)
    }
}

impl fmt::Debug for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bindings")
            .field("name", &self.name)
            .field("operations", &self.table.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::Bindings;
    use crate::{ImplementationFailure, value::Value};

    fn table() -> Bindings {
        let mut bindings = Bindings::new("test");
        bindings
            .register("double", 1, |args| Ok(Value::Int(args.int(0)? * 2)))
            .register("boom", 0, |_| panic!("exploded"));
        bindings
    }

    #[test]
    fn call_by_name() {
        let bindings = table();
        match bindings.call("double", &[Value::Int(21)]) {
            Ok(Value::Int(42)) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn arity_is_checked() {
        let bindings = table();
        assert!(matches!(
            bindings.call("double", &[]),
            Err(ImplementationFailure::Arity {
                expected: 1,
                found: 0
            })
        ));
    }

    #[test]
    fn mistyped_argument() {
        let bindings = table();
        assert!(matches!(
            bindings.call("double", &[Value::Bool(true)]),
            Err(ImplementationFailure::Argument {
                index: 0,
                expected: "int",
                found: "bool"
            })
        ));
    }

    #[test]
    fn panics_are_caught() {
        let bindings = table();
        assert_eq!(
            bindings.call("boom", &[]).err(),
            Some(ImplementationFailure::Panicked("exploded".to_owned()))
        );
    }

    #[test]
    fn unknown_operation() {
        let bindings = table();
        assert!(matches!(
            bindings.call("missing", &[]),
            Err(ImplementationFailure::Unknown(name)) if name == "missing"
        ));
    }
}
