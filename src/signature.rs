//! Operation signatures and the descriptor maps that name them.

use crate::{pasta::op_name, spec::ErasedSpec};
use core::fmt;
use std::{collections::BTreeMap, sync::Arc};

/// Argument specs and result spec of one operation.
#[derive(Clone)]
pub struct Signature {
    args: Vec<Arc<dyn ErasedSpec>>,
    result: Arc<dyn ErasedSpec>,
    trials: Option<u32>,
}

impl Signature {
    /// Signature with the given argument and result specs.
    ///
    /// The [`signature!`](crate::signature) macro erases the specs for you.
    pub fn new(args: Vec<Arc<dyn ErasedSpec>>, result: Arc<dyn ErasedSpec>) -> Self {
        Self {
            args,
            result,
            trials: None,
        }
    }

    /// Run `trials` trials for this operation instead of the configured count.
    pub fn with_trials(mut self, trials: u32) -> Self {
        self.trials = Some(trials);
        self
    }

    /// Number of arguments.
    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// Argument specs, in order.
    pub fn args(&self) -> &[Arc<dyn ErasedSpec>] {
        &self.args
    }

    /// Result spec.
    pub fn result(&self) -> &dyn ErasedSpec {
        &*self.result
    }

    /// Per-operation trial count, if overridden.
    pub const fn trials(&self) -> Option<u32> {
        self.trials
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signature")
            .field("arity", &self.args.len())
            .field("trials", &self.trials)
            .finish_non_exhaustive()
    }
}

/// What the driver does with one operation.
#[derive(Clone, Debug)]
pub enum Descriptor {
    /// Check the operation against this signature.
    Check(Signature),
    /// Skip the operation; the reason is reported.
    Unsupported(&'static str),
}

/// Descriptors of every operation under one name prefix, e.g. all `fp_*`
/// operations.
///
/// Bridge operations under the prefix with no descriptor are reported as
/// undescribed rather than silently ignored.
#[derive(Clone, Debug)]
pub struct Descriptors {
    namespace: String,
    entries: BTreeMap<String, Descriptor>,
}

impl Descriptors {
    /// Empty map for the operations named `<namespace>_*`.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            entries: BTreeMap::new(),
        }
    }

    /// The name prefix.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Describe `<namespace>_<op>`.
    pub fn check(mut self, op: &str, signature: Signature) -> Self {
        self.entries
            .insert(op_name(&self.namespace, op), Descriptor::Check(signature));
        self
    }

    /// Mark `<namespace>_<op>` as deliberately skipped.
    pub fn unsupported(mut self, op: &str, reason: &'static str) -> Self {
        self.entries
            .insert(op_name(&self.namespace, op), Descriptor::Unsupported(reason));
        self
    }

    /// Descriptor for a full operation name.
    pub fn get(&self, name: &str) -> Option<&Descriptor> {
        self.entries.get(name)
    }

    /// Does `name` fall under this map's prefix?
    pub fn covers(&self, name: &str) -> bool {
        name.strip_prefix(self.namespace.as_str())
            .is_some_and(|rest| rest.starts_with('_'))
    }

    /// Descriptors by full operation name, in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Descriptor)> {
        self.entries.iter().map(|(name, d)| (name.as_str(), d))
    }

    /// Number of described operations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Is nothing described?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Descriptor, Descriptors};
    use crate::spec::{Bigint, Boolean, Int};

    #[test]
    fn names_are_prefixed() {
        let descriptors = Descriptors::new("bigint256")
            .check("test_bit", crate::signature!([Bigint, Int::range(0..256)] => Boolean))
            .unsupported("print", "writes to stdout");

        assert_eq!(descriptors.len(), 2);
        assert!(matches!(
            descriptors.get("bigint256_test_bit"),
            Some(Descriptor::Check(sig)) if sig.arity() == 2
        ));
        assert!(matches!(
            descriptors.get("bigint256_print"),
            Some(Descriptor::Unsupported("writes to stdout"))
        ));
    }

    #[test]
    fn coverage() {
        let descriptors = Descriptors::new("fp");
        assert!(descriptors.covers("fp_add"));
        assert!(!descriptors.covers("fq_add"));
        assert!(!descriptors.covers("fpx_add"));
        assert!(!descriptors.covers("fp"));
    }

    #[test]
    fn trial_override() {
        let signature = crate::signature!([] => Int::any()).with_trials(3);
        assert_eq!(signature.trials(), Some(3));
        assert_eq!(signature.arity(), 0);
    }
}
