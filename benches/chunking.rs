use criterion::{Criterion, criterion_group, criterion_main};
use ragdex::embeddings::chunk_words;
use std::hint::black_box;

pub fn criterion_benchmark(c: &mut Criterion) {
    let text = (0..20_000)
        .map(|i| format!("word{i}"))
        .collect::<Vec<_>>()
        .join(" ");

    c.bench_function("chunking", |b| {
        b.iter(|| {
            chunk_words(black_box(&text), 500, 50)
                .expect("valid parameters")
                .count()
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
