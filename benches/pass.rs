//! Benchmarks for the rewriting pass.
//!
//! Run with: cargo bench

use criterion::{Criterion, criterion_group, criterion_main};

use bionify::{Cascade, Document, Options, Scanner, process_document};

const ARTICLE: &str = include_str!("../tests/fixtures/article.html");

/// The fixture article repeated into one long page.
fn long_page(copies: usize) -> String {
    let body = ARTICLE
        .split_once("<body>")
        .and_then(|(_, rest)| rest.split_once("</body>"))
        .map(|(body, _)| body)
        .unwrap_or(ARTICLE);
    format!("<html><body>{}</body></html>", body.repeat(copies))
}

// ============================================================================
// Pass Benchmarks
// ============================================================================

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_article", |b| {
        b.iter(|| Document::parse(ARTICLE));
    });
}

fn bench_scan(c: &mut Criterion) {
    let doc = Document::parse(ARTICLE);
    c.bench_function("scan_article", |b| {
        b.iter(|| {
            let cascade = Cascade::for_document(&doc, &[], false);
            Scanner::new().scan(&doc, &cascade)
        });
    });
}

fn bench_full_pass(c: &mut Criterion) {
    c.bench_function("pass_article", |b| {
        b.iter(|| {
            let mut doc = Document::parse(ARTICLE);
            process_document(&mut doc, &Options::default())
        });
    });

    let page = long_page(50);
    c.bench_function("pass_long_page", |b| {
        b.iter(|| {
            let mut doc = Document::parse(&page);
            process_document(&mut doc, &Options::default())
        });
    });
}

fn bench_serialize(c: &mut Criterion) {
    let mut doc = Document::parse(ARTICLE);
    process_document(&mut doc, &Options::default());
    c.bench_function("serialize_article", |b| {
        b.iter(|| doc.to_html().unwrap());
    });
}

criterion_group!(benches, bench_parse, bench_scan, bench_full_pass, bench_serialize);
criterion_main!(benches);
