use std::sync::Arc;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};

use calla::{PorterStemmer, QueryParser, QueryParserConfig, StopwordProvider, Tokenizer};

const PARAGRAPH: &str = "The quick brown fox jumps over the lazy dog while the \
    relentless indexing worker is busily flushing batches of tokenized, \
    stemmed, and filtered terms into the inverted index for later ranking; \
    autocomplete suggestions are resolved against the same term collection \
    through cached prefix range scans.";

const WORDS: &[&str] = &[
    "running", "caresses", "ponies", "relational", "conditional", "hopefulness",
    "generalization", "effective", "replacement", "adjustment", "international",
    "searching", "tokenizer", "frequencies", "ranked",
];

fn bench_stemmer(c: &mut Criterion) {
    let stemmer = PorterStemmer::new();
    let mut group = c.benchmark_group("stemmer");
    group.throughput(Throughput::Elements(WORDS.len() as u64));
    group.bench_function("stem_words", |b| {
        b.iter(|| {
            for word in WORDS {
                std::hint::black_box(stemmer.stem(word));
            }
        })
    });
    group.finish();
}

fn bench_tokenizer(c: &mut Criterion) {
    let tokenizer = Tokenizer::default();
    let mut group = c.benchmark_group("tokenizer");
    group.throughput(Throughput::Bytes(PARAGRAPH.len() as u64));
    group.bench_function("tokenize_paragraph", |b| {
        b.iter(|| std::hint::black_box(tokenizer.tokenize(PARAGRAPH)))
    });
    group.finish();
}

fn bench_query_parser(c: &mut Criterion) {
    let parser = QueryParser::new(
        QueryParserConfig::default(),
        Arc::new(PorterStemmer::new()),
        Arc::new(StopwordProvider::new()),
    )
    .unwrap();

    let mut group = c.benchmark_group("query_parser");
    group.bench_function("parse_query", |b| {
        b.iter(|| std::hint::black_box(parser.parse("the quick brown foxes were running")))
    });
    group.finish();
}

criterion_group!(benches, bench_stemmer, bench_tokenizer, bench_query_parser);
criterion_main!(benches);
