//! Driver behavior against small hand-written implementations with seeded
//! faults.

mod common;

use common::{config, init_tracing};
use pasta_equivalence::{
    Bindings, Descriptors, Divergence, Equivalence, ImplementationFailure, Outcome, Sample, Side,
    SkipReason, Value, managed, native,
    pasta::CurveId,
    report::HarnessError,
    signature,
    spec::{Bigint, Boolean, Int, Logical, ProjectiveSpec},
    value::Foreign,
};
use std::sync::Arc;

fn doubling(name: &str, double: fn(i64) -> Result<i64, ImplementationFailure>) -> Bindings {
    let mut bindings = Bindings::new(name);
    bindings.register("toy_double", 1, move |args| {
        double(args.int(0)?).map(Value::Int)
    });
    bindings
}

fn reference() -> Bindings {
    doubling("reference", |x| Ok(x.wrapping_mul(2)))
}

fn toy() -> Descriptors {
    Descriptors::new("toy").check(
        "double",
        signature!([Int::range(-1000..1000)] => Int::any()),
    )
}

fn int(sample: &Sample) -> i64 {
    *(**sample)
        .as_any()
        .downcast_ref::<i64>()
        .expect("an int sample")
}

#[test]
fn identical_implementations_pass() {
    init_tracing();
    let (a, b) = (reference(), reference());
    let report = Equivalence::new(&a, &b)
        .with_config(config(100))
        .check(&toy());

    report.assert_success();
    let op = report.operation("toy_double").expect("checked");
    assert!(matches!(op.outcome, Outcome::Passed { trials: 100 }));
    assert!(report.skipped.is_empty());
}

#[test]
fn one_sided_failure() {
    init_tracing();
    let a = reference();
    let b = doubling("candidate", |x| {
        if x < 0 {
            Err(ImplementationFailure::failed("negative"))
        } else {
            Ok(2 * x)
        }
    });

    let report = Equivalence::new(&a, &b)
        .with_config(config(256))
        .check(&toy());
    assert!(!report.is_success());

    let mismatch = report.mismatches().next().expect("a mismatch");
    assert_eq!(mismatch.operation, "toy_double");
    assert_eq!(mismatch.divergence.kind(), "one-sided-failure");
    assert!(matches!(
        &mismatch.divergence,
        Divergence::OneSidedFailure { failed: Side::Candidate, failure }
            if *failure == ImplementationFailure::failed("negative")
    ));
    assert_eq!(int(&mismatch.args[0]), -1);
}

#[test]
fn value_mismatch_is_shrunk() {
    init_tracing();
    let a = reference();
    let b = doubling("candidate", |x| Ok(if x >= 100 { 2 * x + 1 } else { 2 * x }));

    let report = Equivalence::new(&a, &b)
        .with_config(config(256))
        .check(&toy());

    let mismatch = report.mismatches().next().expect("a mismatch");
    assert_eq!(mismatch.divergence.kind(), "value-mismatch");
    assert_eq!(int(&mismatch.args[0]), 100);
    match &mismatch.divergence {
        Divergence::ValueMismatch {
            reference,
            candidate,
        } => {
            assert_eq!(int(reference), 200);
            assert_eq!(int(candidate), 201);
        }
        other => panic!("unexpected divergence: {other}"),
    }
    assert!(report.to_string().contains("FAIL toy_double"));
}

#[test]
fn same_seed_same_mismatch() {
    init_tracing();
    let a = reference();
    let b = doubling("candidate", |x| Ok(if x % 7 == 3 { 0 } else { 2 * x }));

    let run = || {
        let report = Equivalence::new(&a, &b)
            .with_config(config(256))
            .check(&toy());
        let mismatch = report.mismatches().next().expect("a mismatch").clone();
        (int(&mismatch.args[0]), mismatch.passed)
    };
    assert_eq!(run(), run());
}

#[test]
fn panics_are_failures() {
    init_tracing();
    let a = reference();
    let b = doubling("candidate", |x| {
        assert!(x != 0, "zero is not supported");
        Ok(2 * x)
    });

    let descriptors = Descriptors::new("toy").check(
        "double",
        signature!([Int::one_of([-1i64, 0, 1])] => Int::any()),
    );
    let report = Equivalence::new(&a, &b)
        .with_config(config(64))
        .check(&descriptors);

    let mismatch = report.mismatches().next().expect("a mismatch");
    assert!(matches!(
        &mismatch.divergence,
        Divergence::OneSidedFailure {
            failed: Side::Candidate,
            failure: ImplementationFailure::Panicked(message),
        } if message.contains("zero is not supported")
    ));
}

#[test]
fn leaks_are_reported() {
    init_tracing();
    let a = reference();
    let mut b = Bindings::new("candidate");
    b.register("toy_double", 1, |args| {
        drop(Foreign::new((), args.tracker()));
        Ok(Value::Int(args.int(0)?.wrapping_mul(2)))
    });

    let report = Equivalence::new(&a, &b)
        .with_config(config(10))
        .check(&toy());

    let op = report.operation("toy_double").expect("checked");
    assert!(op.outcome.is_passed());
    assert_eq!(op.leaked, 10);
    assert_eq!(report.leaked(), 10);
    assert!(!report.is_success());
    assert!(report.to_string().contains("LEAK toy_double"));
}

#[test]
fn skips_and_arity() {
    init_tracing();
    let mut a = reference();
    a.register("toy_triple", 1, |args| Ok(Value::Int(3 * args.int(0)?)))
        .register("toy_pair", 2, |_| Ok(Value::Unit))
        .register("toy_print", 1, |_| Ok(Value::Unit))
        .register("other_op", 0, |_| Ok(Value::Unit));
    let mut b = reference();
    b.register("toy_extra", 0, |_| Ok(Value::Unit))
        .register("toy_pair", 2, |_| Ok(Value::Unit))
        .register("toy_print", 1, |_| panic!("must not be invoked"));

    let descriptors = toy()
        .check("triple", signature!([Int::any()] => Int::any()))
        .check("pair", signature!([Int::any()] => Int::any()))
        .unsupported("print", "writes to stdout");
    let report = Equivalence::new(&a, &b)
        .with_config(config(8))
        .check(&descriptors);

    let reason = |name: &str| {
        report
            .skipped
            .iter()
            .find(|skip| skip.name == name)
            .map(|skip| skip.reason)
    };
    assert_eq!(reason("toy_triple"), Some(SkipReason::Missing(Side::Candidate)));
    assert_eq!(reason("toy_extra"), Some(SkipReason::Undescribed));
    assert_eq!(
        reason("toy_print"),
        Some(SkipReason::Unsupported("writes to stdout"))
    );
    assert_eq!(reason("other_op"), None);

    let pair = report.operation("toy_pair").expect("reported");
    assert!(matches!(
        pair.outcome,
        Outcome::HarnessFailure {
            error: HarnessError::Arity {
                signature: 1,
                reference: 2,
                candidate: 2
            },
            passed: 0,
        }
    ));
    assert!(report.operation("toy_double").is_some_and(|op| op.outcome.is_passed()));
}

#[test]
fn conversion_errors_are_harness_failures() {
    init_tracing();
    let mut a = Bindings::new("reference");
    a.register("toy_flag", 0, |_| Ok(Value::Bool(true)));
    let mut b = Bindings::new("candidate");
    b.register("toy_flag", 0, |_| Ok(Value::Bool(true)));

    let descriptors = Descriptors::new("toy").check("flag", signature!([] => Int::any()));
    let report = Equivalence::new(&a, &b)
        .with_config(config(4))
        .check(&descriptors);

    let op = report.operation("toy_flag").expect("reported");
    assert!(report.mismatches().next().is_none());
    match &op.outcome {
        Outcome::HarnessFailure {
            error: HarnessError::Conversion { occurrences, .. },
            passed: 0,
        } => assert!(*occurrences > 0),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn test_bit_fails_together_out_of_range() {
    init_tracing();
    let reference = managed::bindings();
    let candidate = native::bindings();
    let descriptors = Descriptors::new("bigint256").check(
        "test_bit",
        signature!([Bigint, Int::range(-16..300)] => Boolean),
    );

    let report = Equivalence::new(&reference, &candidate)
        .with_config(config(256))
        .check(&descriptors);
    assert!(
        report
            .operation("bigint256_test_bit")
            .is_some_and(|op| op.outcome.is_passed()),
        "{report}"
    );
    assert!(report.is_skipped("bigint256_div"));

    let x = Value::Bytes(vec![0xff; 32]);
    for index in [-1, 256, 1000] {
        let args = [Value::Bytes(vec![0xff; 32]), Value::Int(index)];
        assert!(reference.call("bigint256_test_bit", &args).is_err());
        assert!(candidate.call("bigint256_test_bit", &args).is_err());
    }
    let args = [x, Value::Int(255)];
    assert!(matches!(
        reference.call("bigint256_test_bit", &args),
        Ok(Value::Bool(true))
    ));
    assert!(matches!(
        candidate.call("bigint256_test_bit", &args),
        Ok(Value::Bool(true))
    ));
}

#[test]
fn handles_are_released_on_every_failure() {
    init_tracing();
    let points = Arc::new(native::bindings());
    let reference = managed::bindings();
    let mut candidate = native::bindings();
    let wrong = points.clone();
    candidate.register("pallas_negate", 1, move |_| wrong.call("pallas_one", &[]));
    candidate.register("pallas_double", 1, |_| {
        Err(ImplementationFailure::failed("doubling is broken"))
    });
    let affine = points.clone();
    candidate.register("pallas_one", 0, move |_| affine.call("pallas_affine_one", &[]));

    let p = ProjectiveSpec::new(CurveId::Pallas, points.clone());
    let descriptors = Descriptors::new("pallas")
        .check("negate", signature!([p.clone()] => p.clone()))
        .check("double", signature!([p.clone()] => p.clone()))
        .check("one", signature!([] => p.clone()));
    let report = Equivalence::new(&reference, &candidate)
        .with_config(config(64))
        .check(&descriptors);

    let kind = |name: &str| {
        report
            .mismatches()
            .find(|mismatch| mismatch.operation == name)
            .map(|mismatch| mismatch.divergence.kind())
    };
    assert_eq!(kind("pallas_negate"), Some("value-mismatch"));
    assert_eq!(kind("pallas_double"), Some("one-sided-failure"));
    let one = report.operation("pallas_one").expect("reported");
    assert!(
        matches!(
            one.outcome,
            Outcome::HarnessFailure {
                error: HarnessError::Conversion { .. },
                ..
            }
        ),
        "{report}"
    );

    for name in ["pallas_negate", "pallas_double", "pallas_one"] {
        assert_eq!(report.operation(name).expect("reported").leaked, 0, "{name}");
    }
    assert_eq!(report.leaked(), 0);
    for tracker in [points.tracker(), reference.tracker(), candidate.tracker()] {
        assert_eq!(tracker.live(), 0);
        assert_eq!(tracker.counts().leaked, 0);
    }
}
