// benches/resolve.rs
use std::{hint::black_box, sync::Arc};

use criterion::{criterion_group, criterion_main, Criterion};

use ptr_claim::{
    claim::{ClaimRecord, Stage},
    methods::{CorrectionMethod, Method, TitleMethod, UrlMethod},
    resolve::{CorrectionPolicy, Resolver},
    summary,
    tables::{Corrections, NameHints, ShiftRule, UrlHints},
};

const STAGES: [&str; 5] = ["Design", "Claim Pending", "In Development", "Under Review", "Merged"];

fn sample_claims(n: usize) -> Vec<ClaimRecord> {
    (0..n)
        .map(|i| {
            let title = match i % 4 {
                0 => format!("Claim [{}, {}] interior", (i % 90) as i32 - 40, 30 - (i % 60) as i32),
                1 => format!("Firewatch, House {i}"),
                2 => format!("[ITO] Old Ebonheart [{}, -3]", 100 + i % 20),
                _ => format!("Unknown place {i}"),
            };
            let mut c = ClaimRecord::new(format!("https://x.org/claims/{i}"), title);
            c.status = Stage::parse(STAGES[i % STAGES.len()]);
            c
        })
        .collect()
}

fn resolver() -> Resolver {
    let names = Arc::new(NameHints::from_pairs((0..200).map(|i| (format!("Place {i}"), (i, -i))).chain([("Firewatch".to_string(), (18, 7))])));
    let urls = Arc::new(UrlHints::from_pairs((0..500).map(|i| (format!("https://x.org/claims/{}", i * 7), (i, i)))));
    let ito = ShiftRule { title_contains: "[ITO]".to_string(), min_x: Some(101), min_y: None, offset: (-100, 0) };
    let fixes = Arc::new(Corrections::new([("Old Ebonheart, Tailor", (5, -3))], vec![ito]));

    let methods: Vec<Box<dyn Method>> = vec![
        Box::new(TitleMethod::new(names)),
        Box::new(UrlMethod::new(urls)),
        Box::new(CorrectionMethod::new(fixes)),
    ];
    Resolver::new(methods, CorrectionPolicy::Override)
}

fn bench_resolve(c: &mut Criterion) {
    let claims = sample_claims(2_000);
    let r = resolver();

    c.bench_function("resolve_tue_2000", |b| {
        b.iter(|| {
            let mut batch = claims.clone();
            let report = r.resolve_all(black_box(&mut batch), None);
            black_box(report.located())
        })
    });

    let mut resolved = claims.clone();
    r.resolve_all(&mut resolved, None);
    c.bench_function("summarize_2000", |b| {
        b.iter(|| black_box(summary::summarize(black_box(&resolved)).len()))
    });

    let stages: Vec<Stage> = (0..64).map(|i| Stage::parse(STAGES[i % STAGES.len()])).collect();
    c.bench_function("stage_mean_64", |b| b.iter(|| black_box(summary::stage_mean(black_box(&stages)))));
}

criterion_group!(benches, bench_resolve);
criterion_main!(benches);
