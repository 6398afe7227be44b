//! Minimal HTML text and link extraction.
//!
//! Comments, `<script>` and `<style>` bodies are dropped, every remaining
//! tag ends the current text chunk, and a handful of common entities are
//! decoded. Anchor `href` values are collected in document order.

use std::sync::LazyLock;

use regex::Regex;

static IGNORED_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<!--.*?-->|<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>")
        .expect("valid ignored-block pattern")
});

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag pattern"));

static ANCHOR_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
        .expect("valid href pattern")
});

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("valid entity pattern")
});

/// Text and outbound links extracted from an HTML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlContent {
    /// Text between tags, in document order. Whitespace-only chunks are dropped.
    pub text_chunks: Vec<String>,

    /// Raw `href` values of anchors, in document order.
    pub links: Vec<String>,
}

/// Extract text chunks and links from `html`.
pub fn extract(html: &str) -> HtmlContent {
    let links = ANCHOR_HREF
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| decode_entities(m.as_str().trim()))
        .filter(|href| !href.is_empty())
        .collect();

    let visible = IGNORED_BLOCKS.replace_all(html, " ");
    let text_chunks = TAG
        .split(&visible)
        .filter(|chunk| !chunk.trim().is_empty())
        .map(decode_entities)
        .collect();

    HtmlContent { text_chunks, links }
}

/// Decode numeric and a few named character references.
pub fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            let hex = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X"));
            let decoded = if let Some(hex) = hex {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match name {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some(' '),
                    _ => None,
                }
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
