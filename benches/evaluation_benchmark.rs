//! Semi-naive fixed-point benchmark over a transitive-closure program of
//! varying EDB size.
//!
//! Run with: cargo bench --bench evaluation_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use datalog::{Database, Expr};

fn build_chain_program(chain_len: usize) -> Database {
    let mut db = Database::new();
    for i in 0..chain_len {
        db.fact("parent", &[&format!("n{i}"), &format!("n{}", i + 1)])
            .unwrap();
    }
    db.rule(
        Expr::pos("ancestor", vec!["X".into(), "Y".into()]),
        vec![Expr::pos("parent", vec!["X".into(), "Y".into()])],
    )
    .unwrap();
    db.rule(
        Expr::pos("ancestor", vec!["X".into(), "Y".into()]),
        vec![
            Expr::pos("parent", vec!["X".into(), "Z".into()]),
            Expr::pos("ancestor", vec!["Z".into(), "Y".into()]),
        ],
    )
    .unwrap();
    db
}

fn benchmark_transitive_closure_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("transitive_closure");

    for size in [10, 50, 200].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let db = build_chain_program(size);
            b.iter(|| {
                let answers = db
                    .query(&[Expr::pos("ancestor", vec!["n0".into(), "X".into()])])
                    .unwrap();
                black_box(answers)
            });
        });
    }

    group.finish();
}

fn benchmark_sibling_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("sibling_query");

    for size in [10, 50, 200].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let mut db = Database::new();
            for i in 0..*size {
                db.fact("parent", &["root", &format!("n{i}")]).unwrap();
            }
            db.rule(
                Expr::pos("sibling", vec!["A".into(), "B".into()]),
                vec![
                    Expr::pos("parent", vec!["P".into(), "A".into()]),
                    Expr::pos("parent", vec!["P".into(), "B".into()]),
                    Expr::pos("<>", vec!["A".into(), "B".into()]),
                ],
            )
            .unwrap();

            b.iter(|| {
                let answers = db
                    .query(&[Expr::pos("sibling", vec!["A".into(), "B".into()])])
                    .unwrap();
                black_box(answers)
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_transitive_closure_query,
    benchmark_sibling_query
);
criterion_main!(benches);
