//! Macro definitions which are a part of the public API.

/// Build a [`Signature`](crate::Signature) from argument specs and a result
/// spec, erasing each of them.
///
/// ```
/// use pasta_equivalence::{signature, spec::{Bigint, Boolean, Int}};
///
/// let test_bit = signature!([Bigint, Int::range(-8..300)] => Boolean);
/// assert_eq!(test_bit.arity(), 2);
/// ```
#[macro_export]
macro_rules! signature {
    ([$($arg:expr),* $(,)?] => $result:expr) => {
        $crate::Signature::new(
            ::std::vec![$($crate::spec::erase($arg)),*],
            $crate::spec::erase($result),
        )
    };
}

#[cfg(test)]
mod tests {
    use crate::spec::{Bigint, Field, option};
    use crate::pasta::FieldId;

    #[test]
    fn signature_macro() {
        let nullary = signature!([] => Bigint);
        assert_eq!(nullary.arity(), 0);

        let binary = signature!([Field::new(FieldId::Fp), Field::new(FieldId::Fp),] => option(Bigint));
        assert_eq!(binary.arity(), 2);
        assert_eq!(binary.trials(), None);
    }
}
