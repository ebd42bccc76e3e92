use criterion::{criterion_group, criterion_main, Criterion};
use pagefreq_core::tokenizer::normalize;

fn bench_normalize(c: &mut Criterion) {
    let text = "El análisis de datos permite encontrar patrones útiles. ".repeat(200);
    c.bench_function("normalize_paragraphs", |b| b.iter(|| normalize(&text)));
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);
