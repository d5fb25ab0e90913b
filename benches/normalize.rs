use criterion::{black_box, criterion_group, criterion_main, Criterion};

use emlrename::model::message::NormalizedFields;
use emlrename::naming::build_filename;
use emlrename::normalize::{normalize_address, normalize_subject, Rules};

fn bench_normalize_subject(c: &mut Criterion) {
    let rules = Rules::default();
    let subject = "RE: FW: Automatic reply: Quarterly numbers (draft) [finance] - please review!!";

    c.bench_function("normalize_subject", |b| {
        b.iter(|| normalize_subject(black_box(Some(subject)), &rules))
    });
}

fn bench_normalize_address(c: &mut Criterion) {
    let rules = Rules::default();
    let to = "\"Doe, Jane\" <Jane.Doe@Example.com>, Bob <bob@example.org>, <carol@example.net>";

    c.bench_function("normalize_address", |b| {
        b.iter(|| normalize_address(black_box(Some(to)), &rules))
    });
}

fn bench_build_filename(c: &mut Criterion) {
    let fields = NormalizedFields {
        date: "2017_08_15_143000".to_string(),
        subject: "Quarterly_numbers".to_string(),
        from: "ann@example.com".to_string(),
        to: "bob@example.com".to_string(),
    };

    c.bench_function("build_filename", |b| {
        b.iter(|| build_filename(black_box(&fields), 190, ".eml"))
    });
}

criterion_group!(
    benches,
    bench_normalize_subject,
    bench_normalize_address,
    bench_build_filename
);
criterion_main!(benches);
