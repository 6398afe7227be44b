//! Local document acquisition.
//!
//! The [`Crawler`] walks seed files and directories breadth-first, extracts
//! plain text from each document and feeds it to an [`InvertedIndex`].
//! HTML anchors pointing at other local files are followed when
//! [`CrawlerConfig::follow_links`] is set; remote URLs are never fetched.
//!
//! Documents of one breadth-first wave are read and parsed in parallel, then
//! indexed one after another so that the index keeps a single writer.
//!
//! # Example
//!
//! ```no_run
//! use quarry::crawler::{Crawler, CrawlerConfig};
//!
//! let mut crawler = Crawler::new(CrawlerConfig::default());
//! let report = crawler.crawl(&["./site"]).unwrap();
//! println!("indexed {} documents", report.documents_indexed);
//! let index = crawler.into_index();
//! ```

pub mod html;

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use ahash::AHashSet;
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{QuarryError, Result};
use crate::index::InvertedIndex;

/// Crawler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Stop after this many documents have been indexed.
    pub max_documents: Option<usize>,

    /// Follow `href` links of HTML documents to other local files.
    pub follow_links: bool,

    /// File extensions picked up when expanding directories (lower-case,
    /// without the dot). Files named explicitly as seeds or reached by links
    /// are always indexed.
    pub extensions: Vec<String>,

    /// Strip markup from HTML documents before indexing.
    pub strip_markup: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        CrawlerConfig {
            max_documents: None,
            follow_links: true,
            extensions: ["html", "htm", "txt", "md"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            strip_markup: true,
        }
    }
}

/// Outcome of a crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlReport {
    /// Documents added to the index.
    pub documents_indexed: usize,

    /// Documents that could not be read and were skipped.
    pub documents_failed: usize,

    /// Word occurrences indexed.
    pub words_indexed: usize,

    /// Local links queued for crawling.
    pub links_followed: usize,
}

/// Text extracted from one document, ready to be indexed.
#[derive(Debug)]
struct ExtractedDocument {
    path: PathBuf,
    key: String,
    chunks: Vec<String>,
    links: Vec<PathBuf>,
}

/// Breadth-first crawler over local files.
#[derive(Debug)]
pub struct Crawler {
    config: CrawlerConfig,
    index: InvertedIndex,
    /// Every path ever queued, so each document is loaded at most once.
    seen: AHashSet<PathBuf>,
    report: CrawlReport,
}

impl Crawler {
    /// Create a crawler with an empty index.
    pub fn new(config: CrawlerConfig) -> Self {
        Self::with_index(config, InvertedIndex::new())
    }

    /// Create a crawler that adds to an existing index.
    pub fn with_index(config: CrawlerConfig, index: InvertedIndex) -> Self {
        Crawler {
            config,
            index,
            seen: AHashSet::new(),
            report: CrawlReport::default(),
        }
    }

    /// The index built so far.
    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    /// Consume the crawler and return its index.
    pub fn into_index(self) -> InvertedIndex {
        self.index
    }

    /// Crawl from `seeds`, returning the cumulative report.
    ///
    /// A seed is a local path or a `file:` URL. A seed that does not exist
    /// is an error; documents that fail to load during the crawl are logged
    /// and skipped.
    pub fn crawl<P: AsRef<Path>>(&mut self, seeds: &[P]) -> Result<CrawlReport> {
        let mut queue = VecDeque::new();
        for seed in seeds {
            let path = seed_path(seed.as_ref())?;
            if path.is_dir() {
                self.expand_directory(&path, &mut queue)?;
            } else {
                self.enqueue(path, &mut queue);
            }
        }

        while !queue.is_empty() {
            let mut wave = Vec::new();
            while !self.at_capacity(wave.len()) {
                match queue.pop_front() {
                    Some(path) => wave.push(path),
                    None => break,
                }
            }
            if wave.is_empty() {
                break;
            }

            debug!("Crawling wave of {} documents", wave.len());
            let config = &self.config;
            let loaded: Vec<Result<ExtractedDocument>> =
                wave.par_iter().map(|path| load_document(path, config)).collect();

            for document in loaded {
                match document {
                    Ok(document) => {
                        for link in &document.links {
                            if self.enqueue(link.clone(), &mut queue) {
                                self.report.links_followed += 1;
                            }
                        }
                        self.add_document(document);
                    }
                    Err(e) => {
                        warn!("Skipping document: {e}");
                        self.report.documents_failed += 1;
                    }
                }
            }

            if self.at_capacity(0) {
                info!("Reached the document limit, stopping crawl");
                break;
            }
        }

        info!(
            "Crawl finished: {} documents indexed, {} failed",
            self.report.documents_indexed, self.report.documents_failed
        );
        Ok(self.report.clone())
    }

    fn at_capacity(&self, pending: usize) -> bool {
        self.config
            .max_documents
            .is_some_and(|max| self.report.documents_indexed + pending >= max)
    }

    /// Queue `path` unless it was queued before. Returns true if queued.
    fn enqueue(&mut self, path: PathBuf, queue: &mut VecDeque<PathBuf>) -> bool {
        if self.seen.insert(path.clone()) {
            queue.push_back(path);
            true
        } else {
            false
        }
    }

    fn add_document(&mut self, document: ExtractedDocument) {
        // An empty chunk still registers the document in the universe.
        let mut words = self.index.add_text(&document.key, "");
        for chunk in &document.chunks {
            words += self.index.add_text(&document.key, chunk);
        }

        debug!(
            "Indexed {} ({} words) from {}",
            document.key,
            words,
            document.path.display()
        );
        self.report.documents_indexed += 1;
        self.report.words_indexed += words;
    }

    /// Queue the files below `dir` whose extension is configured, in sorted order.
    fn expand_directory(&mut self, dir: &Path, queue: &mut VecDeque<PathBuf>) -> Result<()> {
        let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();
        entries.sort();

        for path in entries {
            let is_symlink = fs::symlink_metadata(&path)
                .map(|meta| meta.file_type().is_symlink())
                .unwrap_or(true);
            if path.is_dir() {
                if is_symlink {
                    debug!("Not following symlinked directory {}", path.display());
                    continue;
                }
                self.expand_directory(&path, queue)?;
            } else if self.has_configured_extension(&path) {
                let path = fs::canonicalize(&path).unwrap_or(path);
                self.enqueue(path, queue);
            }
        }
        Ok(())
    }

    fn has_configured_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .is_some_and(|ext| self.config.extensions.iter().any(|e| *e == ext))
    }
}

/// Canonical local path of a seed given as a path or a `file:` URL.
fn seed_path(seed: &Path) -> Result<PathBuf> {
    let path = match seed.to_str() {
        Some(text) if text.starts_with("file:") => Url::parse(text)
            .ok()
            .filter(|url| url.scheme() == "file")
            .and_then(|url| url.to_file_path().ok())
            .ok_or_else(|| QuarryError::crawl(format!("Invalid file URL seed {text}")))?,
        _ => seed.to_path_buf(),
    };
    fs::canonicalize(&path)
        .map_err(|e| QuarryError::crawl(format!("Cannot open seed {}: {e}", seed.display())))
}

/// Stable document key for a local file: its `file:` URL.
///
/// `path` must be absolute.
pub fn document_key(path: &Path) -> Result<String> {
    Url::from_file_path(path)
        .map(String::from)
        .map_err(|()| QuarryError::crawl(format!("Not an absolute path: {}", path.display())))
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
}

fn load_document(path: &Path, config: &CrawlerConfig) -> Result<ExtractedDocument> {
    let key = document_key(path)?;
    let bytes = fs::read(path)
        .map_err(|e| QuarryError::crawl(format!("Cannot read {}: {e}", path.display())))?;
    let content = String::from_utf8_lossy(&bytes);

    if !is_html(path) || !config.strip_markup {
        return Ok(ExtractedDocument {
            path: path.to_path_buf(),
            key,
            chunks: vec![content.into_owned()],
            links: Vec::new(),
        });
    }

    let extracted = html::extract(&content);
    let links = if config.follow_links {
        extracted
            .links
            .iter()
            .filter_map(|href| resolve_link(path, href))
            .collect()
    } else {
        Vec::new()
    };

    Ok(ExtractedDocument {
        path: path.to_path_buf(),
        key,
        chunks: extracted.text_chunks,
        links,
    })
}

/// Resolve an `href` found in `document` to another existing local file.
///
/// `href` is joined to the document's `file:` URL. Links whose target has a
/// scheme other than `file`, points at a directory or a missing file, or
/// is the document itself are ignored.
pub fn resolve_link(document: &Path, href: &str) -> Option<PathBuf> {
    let base = Url::from_file_path(document).ok()?;
    let target = base.join(href).ok()?;
    if target.scheme() != "file" {
        return None;
    }

    let target = fs::canonicalize(target.to_file_path().ok()?).ok()?;
    (target.is_file() && target != document).then_some(target)
}

/// Index `(document, text)` pairs in parallel.
///
/// Each rayon worker fills its own partial index and the partials are merged
/// in input order, so text chunks of the same document keep their order.
pub fn index_parallel<K, T>(documents: &[(K, T)]) -> InvertedIndex
where
    K: AsRef<str> + Sync,
    T: AsRef<str> + Sync,
{
    documents
        .par_iter()
        .fold(InvertedIndex::new, |mut index, (document, text)| {
            index.add_text(document.as_ref(), text.as_ref());
            index
        })
        .reduce(InvertedIndex::new, |mut left, right| {
            left.merge(right);
            left
        })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    fn key(path: &Path) -> String {
        document_key(&fs::canonicalize(path).unwrap()).unwrap()
    }

    #[test]
    fn test_crawl_follows_local_links() {
        let dir = TempDir::new().unwrap();
        let start = write(
            dir.path(),
            "index.html",
            r#"<p>Welcome home</p><a href="sub/page.html#frag">next</a>
               <a href="http://example.com/">remote</a><a href="missing.html">gone</a>"#,
        );
        let page = write(
            dir.path(),
            "sub/page.html",
            r#"<p>Second page</p><a href="../index.html">back</a>"#,
        );

        let mut crawler = Crawler::new(CrawlerConfig::default());
        let report = crawler.crawl(&[&start]).unwrap();

        assert_eq!(report.documents_indexed, 2);
        assert_eq!(report.documents_failed, 0);
        assert_eq!(report.links_followed, 1);
        let index = crawler.into_index();
        assert!(index.get_documents("welcome").contains(&key(&start)));
        assert!(index.get_documents("second").contains(&key(&page)));
        assert!(index.get_documents("remote").contains(&key(&start)));
    }

    #[test]
    fn test_crawl_without_following_links() {
        let dir = TempDir::new().unwrap();
        let start = write(dir.path(), "a.html", r#"<a href="b.html">b</a>"#);
        write(dir.path(), "b.html", "bee");

        let config = CrawlerConfig {
            follow_links: false,
            ..Default::default()
        };
        let mut crawler = Crawler::new(config);
        let report = crawler.crawl(&[&start]).unwrap();

        assert_eq!(report.documents_indexed, 1);
        assert_eq!(report.links_followed, 0);
    }

    #[test]
    fn test_crawl_directory_filters_extensions() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "notes.txt", "plain text notes");
        write(dir.path(), "nested/deep.md", "deep markdown");
        write(dir.path(), "image.png", "not text");
        let empty = write(dir.path(), "empty.txt", "1234");

        let mut crawler = Crawler::new(CrawlerConfig::default());
        let report = crawler.crawl(&[dir.path()]).unwrap();

        assert_eq!(report.documents_indexed, 3);
        let index = crawler.index();
        assert_eq!(index.document_count(), 3);
        assert!(index.contains_document(&key(&empty)));
        assert_eq!(index.get_documents("deep").len(), 1);
    }

    #[test]
    fn test_max_documents() {
        let dir = TempDir::new().unwrap();
        for i in 0..5 {
            write(dir.path(), &format!("doc{i}.txt"), "word");
        }

        let config = CrawlerConfig {
            max_documents: Some(2),
            ..Default::default()
        };
        let mut crawler = Crawler::new(config);
        let report = crawler.crawl(&[dir.path()]).unwrap();

        assert_eq!(report.documents_indexed, 2);
        assert_eq!(crawler.index().document_count(), 2);
    }

    #[test]
    fn test_missing_seed_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mut crawler = Crawler::new(CrawlerConfig::default());
        assert!(crawler.crawl(&[dir.path().join("nope.html")]).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_document_does_not_use_up_capacity() {
        let dir = TempDir::new().unwrap();
        let broken = dir.path().join("a.txt");
        std::os::unix::fs::symlink(dir.path().join("gone.txt"), &broken).unwrap();
        write(dir.path(), "b.txt", "bravo");
        let last = write(dir.path(), "c.txt", "charlie");

        let config = CrawlerConfig {
            max_documents: Some(2),
            ..Default::default()
        };
        let mut crawler = Crawler::new(config);
        let report = crawler.crawl(&[dir.path()]).unwrap();

        assert_eq!(report.documents_indexed, 2);
        assert_eq!(report.documents_failed, 1);
        assert!(crawler.index().contains_document(&key(&last)));
    }

    #[test]
    fn test_shared_link_is_counted_once() {
        let dir = TempDir::new().unwrap();
        let first = write(dir.path(), "a.html", r#"<a href="c.html">c</a>"#);
        let second = write(dir.path(), "b.html", r#"<a href="./c.html#x">c</a>"#);
        write(dir.path(), "c.html", "shared");

        let mut crawler = Crawler::new(CrawlerConfig::default());
        let report = crawler.crawl(&[&first, &second]).unwrap();

        assert_eq!(report.documents_indexed, 3);
        assert_eq!(report.links_followed, 1);
    }

    #[test]
    fn test_file_url_seed() {
        let dir = TempDir::new().unwrap();
        let page = write(dir.path(), "my page.txt", "spaced name");
        let seed = key(&page);

        let mut crawler = Crawler::new(CrawlerConfig::default());
        let report = crawler.crawl(&[seed.as_str()]).unwrap();

        assert_eq!(report.documents_indexed, 1);
        assert!(crawler.index().get_documents("spaced").contains(&seed));
        assert!(crawler.crawl(&["file://remote-host/x.txt"]).is_err());
    }

    #[test]
    fn test_document_key_is_a_file_url() {
        let dir = TempDir::new().unwrap();
        let page = fs::canonicalize(write(dir.path(), "my page.html", "x")).unwrap();

        let key = document_key(&page).unwrap();
        assert!(key.starts_with("file:///"));
        assert!(key.ends_with("/my%20page.html"));
        assert!(!key.contains(' '));
        assert_eq!(Url::parse(&key).unwrap().to_file_path().unwrap(), page);
        assert!(document_key(Path::new("relative.html")).is_err());
    }

    #[test]
    fn test_resolve_link() {
        let dir = TempDir::new().unwrap();
        let document = fs::canonicalize(write(dir.path(), "index.html", "home")).unwrap();
        let target = fs::canonicalize(write(dir.path(), "my page.html", "x")).unwrap();
        let absolute = Url::from_file_path(&target).unwrap();
        let localhost = absolute.as_str().replacen("file://", "file://localhost", 1);

        assert_eq!(resolve_link(&document, "my%20page.html"), Some(target.clone()));
        assert_eq!(resolve_link(&document, "my page.html?q=1"), Some(target.clone()));
        assert_eq!(resolve_link(&document, absolute.as_str()), Some(target.clone()));
        assert_eq!(resolve_link(&document, &localhost), Some(target));
        assert_eq!(resolve_link(&document, "https://example.com/x.html"), None);
        assert_eq!(resolve_link(&document, "mailto:someone@example.com"), None);
        assert_eq!(resolve_link(&document, "#top"), None);
        assert_eq!(resolve_link(&document, "."), None);
        assert_eq!(resolve_link(&document, "missing.html"), None);
    }

    #[test]
    fn test_index_parallel_matches_sequential() {
        let documents: Vec<(String, String)> = (0..50)
            .map(|i| (format!("doc{}", i % 7), format!("word{} common text {}", i, i % 3)))
            .collect();

        let parallel = index_parallel(&documents);
        let mut sequential = InvertedIndex::new();
        for (doc, text) in &documents {
            sequential.add_text(doc, text);
        }

        assert_eq!(parallel.stats(), sequential.stats());
        for word in sequential.words() {
            for doc in sequential.documents() {
                assert_eq!(parallel.positions(word, doc), sequential.positions(word, doc));
            }
        }
    }
}
