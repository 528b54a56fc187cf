//! Benchmarks for HTML to portable text conversion.
//!
//! Run with: cargo bench -p wp-migrate

#![allow(clippy::pedantic)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

use wp_migrate::config::SourceConfig;
use wp_migrate::connectors::memory::MemoryStore;
use wp_migrate::connectors::wordpress::WordPressConnector;
use wp_migrate::media::{slug_from_url, MediaCache, MediaResolver};
use wp_migrate::richtext::{convert, parse_html};

/// A post body shaped like typical block-editor output.
fn sample_body(paragraphs: usize) -> String {
    let mut html = String::new();
    for i in 0..paragraphs {
        html.push_str(&format!(
            "<h2>Section {i}</h2>\n<p>Paragraph {i} with <strong>bold</strong>, <em>emphasis</em> and a <a href=\"https://example.com/{i}\">link</a>.</p>\n"
        ));
        if i % 5 == 0 {
            html.push_str("<ul><li>First</li><li>Second<ul><li>Nested</li></ul></li></ul>\n<p>&nbsp;</p>\n");
        }
    }
    html
}

fn bench_parse_html(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_html_by_paragraphs");
    for paragraphs in [10, 100, 1000] {
        let html = sample_body(paragraphs);
        group.bench_with_input(BenchmarkId::new("paragraphs", paragraphs), &html, |b, html| {
            b.iter(|| black_box(parse_html(html)))
        });
    }
    group.finish();
}

fn bench_slug_from_url(c: &mut Criterion) {
    let url = "https://example.com/wp-content/uploads/2024/05/Quarterly-Report-Chart-1024x683.png";
    c.bench_function("slug_from_url", |b| b.iter(|| black_box(slug_from_url(url))));
}

fn bench_convert_text_only(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let source = WordPressConnector::new(SourceConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        per_page: 100,
    })
    .unwrap();
    let resolver = MediaResolver::new(
        Arc::new(source),
        Arc::new(MemoryStore::new()),
        Arc::new(MediaCache::new()),
    );
    let html = sample_body(100);

    c.bench_function("convert_text_only_100", |b| {
        b.to_async(&runtime)
            .iter(|| async { black_box(convert(&html, &resolver, 2).await.unwrap()) })
    });
}

criterion_group!(
    benches,
    bench_parse_html,
    bench_slug_from_url,
    bench_convert_text_only
);
criterion_main!(benches);
