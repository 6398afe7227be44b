//! End-to-end test: crawl a small site, persist the index and query it.

use std::fs;
use std::path::Path;

use quarry::crawler::{document_key, Crawler, CrawlerConfig};
use quarry::prelude::*;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn key(dir: &Path, name: &str) -> String {
    document_key(&fs::canonicalize(dir.join(name)).unwrap()).unwrap()
}

#[test]
fn test_crawl_save_and_query() -> Result<()> {
    let site = TempDir::new().unwrap();
    let root = site.path();

    write(
        root,
        "index.html",
        r#"<html><head><title>Search Engines</title></head>
        <body><p>An <b>inverted</b> index maps words to documents.</p>
        <a href="phrases.html">Phrases</a> <a href="https://example.com/">external</a>
        <a href="missing.html">broken</a></body></html>"#,
    );
    write(
        root,
        "phrases.html",
        r#"<p>Phrase queries need word positions.</p><a href="index.html">home</a>"#,
    );
    write(root, "orphan.html", "<p>Nobody links to this page.</p>");

    let mut crawler = Crawler::new(CrawlerConfig::default());
    let report = crawler.crawl(&[root.join("index.html")])?;
    assert_eq!(report.documents_indexed, 2);
    assert_eq!(report.documents_failed, 0);

    let index_path = root.join("site.db");
    crawler.index().save(&index_path, StorageFormat::Binary)?;

    let engine = QueryEngine::new(InvertedIndex::load(&index_path)?);
    let home = key(root, "index.html");
    let phrases = key(root, "phrases.html");

    assert_eq!(engine.query("\"inverted index\"")?.into_sorted_vec(), vec![home.clone()]);
    assert_eq!(engine.query("positions")?.into_sorted_vec(), vec![phrases.clone()]);

    let mut both = vec![home, phrases];
    both.sort();
    assert_eq!(engine.query("(words | word)")?.into_sorted_vec(), both);
    assert!(engine.query("nobody")?.is_empty());
    // Markup is stripped before indexing.
    assert!(engine.query("href")?.is_empty());
    Ok(())
}
