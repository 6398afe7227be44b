//! Criterion benchmarks for the Quarry search engine.
//!
//! Covers the three hot paths:
//! - Tokenizing and indexing text
//! - Parsing queries
//! - Evaluating boolean and phrase queries

use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use quarry::analysis::LetterRunTokenizer;
use quarry::crawler::index_parallel;
use quarry::index::InvertedIndex;
use quarry::query::{QueryEngine, QueryParser};

/// Generate test documents for benchmarking.
fn generate_test_documents(count: usize) -> Vec<(String, String)> {
    let words = [
        "search", "engine", "full", "text", "index", "query", "document", "field", "term",
        "phrase", "boolean", "positions", "posting", "complement", "union", "intersection",
        "tokenizer", "parser", "lexer", "crawler", "memory", "storage", "retrieval", "merge",
    ];

    let mut documents = Vec::with_capacity(count);
    for i in 0..count {
        let doc_length = 50 + (i % 100); // Variable length documents
        let doc_words: Vec<&str> = (0..doc_length)
            .map(|j| words[(i * 7 + j * 13) % words.len()]) // Pseudo-random distribution
            .collect();
        documents.push((format!("doc{i}"), doc_words.join(" ")));
    }

    documents
}

fn build_index(documents: &[(String, String)]) -> InvertedIndex {
    let mut index = InvertedIndex::new();
    for (document, text) in documents {
        index.add_text(document, text);
    }
    index
}

/// Benchmark tokenization and indexing.
fn bench_indexing(c: &mut Criterion) {
    let mut group = c.benchmark_group("indexing");

    let documents = generate_test_documents(1000);
    let tokenizer = LetterRunTokenizer::new();

    group.bench_function("tokenize_single_document", |b| {
        b.iter(|| tokenizer.tokenize(black_box(&documents[0].1)).count())
    });

    group.throughput(Throughput::Elements(documents.len() as u64));
    group.bench_function("add_text_sequential", |b| {
        b.iter(|| black_box(build_index(&documents)))
    });

    group.bench_function("add_text_parallel", |b| {
        b.iter(|| black_box(index_parallel(&documents)))
    });

    group.finish();
}

/// Benchmark query parsing.
fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");
    let parser = QueryParser::new();

    group.bench_function("parse_nested_query", |b| {
        b.iter(|| {
            parser
                .parse(black_box(
                    "((search & !\"full text\") | (index & (query | \"posting positions\")))",
                ))
                .unwrap()
        })
    });

    group.finish();
}

/// Benchmark query evaluation.
fn bench_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluation");

    let engine = QueryEngine::new(build_index(&generate_test_documents(1000)));
    let queries = [
        ("single_word", "merge"),
        ("negated_word", "!merge"),
        ("unordered_words", "search engine index"),
        ("phrase", "\"search engine\""),
        ("boolean", "((search & !lexer) | (parser & \"memory storage\"))"),
    ];

    for (name, query) in queries {
        let tree = engine.parse(query).unwrap();
        group.bench_function(name, |b| b.iter(|| black_box(engine.evaluate(&tree))));
    }

    group.finish();
}

criterion_group!(benches, bench_indexing, bench_parsing, bench_evaluation);
criterion_main!(benches);
