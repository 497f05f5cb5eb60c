use criterion::{
    BatchSize, BenchmarkGroup, Criterion, criterion_group, criterion_main, measurement::Measurement,
};
use pasta_equivalence::{
    Bindings, Config, Descriptors, Equivalence, managed,
    managed::curve,
    native,
    pasta::{CurveId, FieldId},
    signature,
    spec::{Field, ProjectiveSpec, Spec},
    value::release_all,
};
use std::{hint::black_box, sync::Arc};

const SEED: [u8; 32] = [7; 32];

fn bench_calls<M: Measurement>(
    group: &mut BenchmarkGroup<'_, M>,
    reference: &Bindings,
    candidate: &Arc<Bindings>,
) {
    let points = ProjectiveSpec::new(CurveId::Pallas, candidate.clone());
    let pallas = curve(CurveId::Pallas);
    let p = pallas.double(&pallas.one());
    let q = pallas.add(&p, &pallas.one());

    for bindings in [reference, &**candidate] {
        group.bench_function(format!("pallas_add, {}", bindings.name()), |b| {
            b.iter_batched(
                || {
                    vec![
                        points.there(&p).expect("converts"),
                        points.there(&q).expect("converts"),
                    ]
                },
                |args| {
                    let result = bindings.call("pallas_add", black_box(&args));
                    release_all(args);
                    points.back(result.expect("adds")).expect("converts back")
                },
                BatchSize::SmallInput,
            )
        });
    }
}

fn bench_trials<M: Measurement>(
    group: &mut BenchmarkGroup<'_, M>,
    reference: &Bindings,
    candidate: &Arc<Bindings>,
) {
    let config = Config::default().with_seed(SEED).with_trials(1);
    let driver = Equivalence::new(reference, candidate).with_config(config);

    let point = || ProjectiveSpec::new(CurveId::Pallas, candidate.clone());
    let pallas_add =
        Descriptors::new("pallas").check("add", signature!([point(), point()] => point()));
    group.bench_function("pallas_add trial", |b| {
        b.iter(|| driver.check(black_box(&pallas_add)))
    });

    let fp = || Field::new(FieldId::Fp);
    let fp_mul = Descriptors::new("fp").check("mul", signature!([fp(), fp()] => fp()));
    group.bench_function("fp_mul trial", |b| {
        b.iter(|| driver.check(black_box(&fp_mul)))
    });
}

fn bench_equivalence(c: &mut Criterion) {
    let reference = managed::bindings();
    let candidate = Arc::new(native::bindings());

    let mut group = c.benchmark_group("equivalence");
    bench_calls(&mut group, &reference, &candidate);
    bench_trials(&mut group, &reference, &candidate);
    group.finish();
}

criterion_group!(benches, bench_equivalence);

criterion_main!(benches);
