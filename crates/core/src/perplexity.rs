//! Multi-article protocol ("Perplexity format").
//!
//! Input is a sequence of `***`-separated chunks. Article chunks open with
//! an `ARTICLE <n> TITLE:` marker, followed by a full-text section and a
//! numbered real-time sources section (in either order). An optional chunk
//! starting with `الاقتباسات:` lists citations shared by every article.
//!
//! ```text
//! ARTICLE 1 TITLE: First headline
//! **نص المقال الكامل من المصدر:**
//! Body paragraph...
//! **المصادر في الوقت الفعلي:**
//! 1. **Agency report** - https://news.example.com/a
//! ***
//! الاقتباسات:
//! [1] Shared reference https://ref.example.org/1
//! ```

use std::sync::LazyLock;

use regex::{Match, Regex};
use tracing::{debug, trace, warn};

use crate::article::{ParsedArticle, Source};
use crate::sources::{SourceList, clean_url, hostname_of};

const CITATIONS_HEADER: &str = "الاقتباسات:";

static ARTICLE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)ARTICLE\s*\d*\s*TITLE").expect("article marker regex"));

static CHUNK_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\*{3,}\s*").expect("chunk separator regex"));

static TITLE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:\*\*)?\s*ARTICLE\s*\d*\s*TITLE\s*(?:\*\*)?\s*:?\s*(?:\*\*)?").expect("title marker regex")
});

// Header tails stay on the header line. English names only count at the
// start of a line so prose mentioning them is left alone.
static TEXT_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)(?:(?:\*\*)?[ \t]*نص المقال الكامل من المصدر|^[ \t]*(?:\*\*)?[ \t]*FULL ARTICLE TEXT)[ \t]*(?:\*\*)?[ \t]*:?[ \t]*(?:\*\*)?",
    )
    .expect("text header regex")
});

static SOURCES_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)(?:(?:\*\*)?[ \t]*(?:المصادر في الوقت الفعلي|مصادر في الوقت الفعلي)|^[ \t]*(?:\*\*)?[ \t]*REAL[- ]?TIME SOURCES)[ \t]*(?:\*\*)?[ \t]*:?[ \t]*(?:\*\*)?",
    )
    .expect("sources header regex")
});

static GLOBAL_SOURCE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\[\d+\]\s*(.*?)\s*(https?://\S+)").expect("global source regex"));

/// `N. **Title** - url` or `N. [Title] - url`
static SOURCE_EMPHASIZED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\d+\.\s*(?:\*\*(.+?)\*\*|\[([^\]]+)\])\s*[-–—]\s*(https?://\S+)").expect("emphasized source regex")
});

/// `N. [Title](url)`
static SOURCE_MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\d+\.\s*\[([^\]]+)\]\((https?://[^\s)]+)\)").expect("markdown link source regex")
});

/// `N. Title - url`
static SOURCE_PLAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\.\s*(.+?)\s+[-–—]\s+(https?://\S+)").expect("plain source regex"));

static HEADING_MARKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#+\s*").expect("heading marks regex"));

/// True if `text` carries at least one `ARTICLE <n> TITLE` marker.
pub fn looks_like_protocol(text: &str) -> bool {
    ARTICLE_MARKER.is_match(text)
}

/// Parse every article in a multi-article protocol input.
///
/// Returns an empty vector if no chunk yields a title or body; callers then
/// fall back to another dialect.
pub fn parse_protocol(text: &str) -> Vec<ParsedArticle> {
    let mut chunks: Vec<&str> = CHUNK_SEPARATOR.split(text).collect();

    let mut global_sources = Vec::new();
    if let Some(pos) = chunks.iter().position(|c| c.trim().starts_with(CITATIONS_HEADER)) {
        let block = chunks.remove(pos);
        global_sources = parse_citations_block(block);
        if global_sources.is_empty() {
            warn!("citations block present but no source lines were recognized");
        }
    }

    let articles: Vec<ParsedArticle> = chunks
        .into_iter()
        .filter(|chunk| ARTICLE_MARKER.is_match(chunk))
        .filter_map(parse_article_chunk)
        .map(|article| distribute(article, &global_sources))
        .collect();

    debug!(articles = articles.len(), global_sources = global_sources.len(), "parsed protocol input");
    articles
}

/// Parse `[n] Title https://...` lines of the shared citations block.
fn parse_citations_block(block: &str) -> Vec<Source> {
    let body = block.trim().trim_start_matches(CITATIONS_HEADER);
    let mut sources = SourceList::new();

    for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let Some(caps) = GLOBAL_SOURCE_LINE.captures(line) else {
            trace!(line, "skipping unrecognized citation line");
            continue;
        };
        let url = clean_url(&caps[2]);
        let title = caps[1].trim().trim_end_matches(['-', '–', '—', '(', '[', ':', ' ']).trim();
        let title = if title.is_empty() { hostname_of(&url) } else { title.to_string() };
        sources.push(Source::new(title, url));
    }

    sources.into_vec()
}

fn parse_article_chunk(chunk: &str) -> Option<ParsedArticle> {
    let text_header = TEXT_HEADER.find(chunk);
    let sources_header = SOURCES_HEADER.find(chunk);

    let title_end = match (text_header, sources_header) {
        (Some(t), Some(s)) => t.start().min(s.start()),
        (Some(h), None) | (None, Some(h)) => h.start(),
        (None, None) => chunk.len(),
    };
    let title = TITLE_MARKER.replace(&chunk[..title_end], "");
    let title = title.trim().trim_matches('*').trim().to_string();

    let (body, sources_section) = split_sections(chunk, text_header, sources_header);
    let text = normalize_body(body);
    let sources = sources_section.map(parse_source_lines).unwrap_or_default();

    if title.is_empty() && text.is_empty() {
        return None;
    }

    Some(ParsedArticle::new(title, String::new(), text, sources))
}

/// Slice the body and sources sections according to which header comes first.
fn split_sections<'a>(chunk: &'a str, text: Option<Match<'a>>, sources: Option<Match<'a>>) -> (&'a str, Option<&'a str>) {
    match (text, sources) {
        (Some(t), Some(s)) if t.start() < s.start() => (between(chunk, t.end(), s.start()), Some(&chunk[s.end()..])),
        (Some(t), Some(s)) => (&chunk[t.end()..], Some(between(chunk, s.end(), t.start()))),
        (Some(t), None) => (&chunk[t.end()..], None),
        (None, Some(s)) => ("", Some(&chunk[s.end()..])),
        (None, None) => ("", None),
    }
}

/// `chunk[start..end]`, or empty when the two headers overlap.
fn between(chunk: &str, start: usize, end: usize) -> &str {
    &chunk[start..end.max(start)]
}

/// Parse a numbered per-article source list, trying each line format in turn.
fn parse_source_lines(section: &str) -> Vec<Source> {
    let mut sources = SourceList::new();

    for line in section.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match parse_source_line(line) {
            Some(source) => {
                sources.push(source);
            }
            None => trace!(line, "skipping unrecognized source line"),
        }
    }

    sources.into_vec()
}

fn parse_source_line(line: &str) -> Option<Source> {
    if let Some(caps) = SOURCE_EMPHASIZED.captures(line) {
        let title = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str().trim()).unwrap_or_default();
        return Some(Source::new(title, clean_url(&caps[3])));
    }
    if let Some(caps) = SOURCE_MARKDOWN_LINK.captures(line) {
        return Some(Source::new(caps[1].trim(), clean_url(&caps[2])));
    }
    if let Some(caps) = SOURCE_PLAIN.captures(line) {
        return Some(Source::new(caps[1].trim().trim_matches('*').trim(), clean_url(&caps[2])));
    }
    None
}

/// Trim lines, drop heading marks and blank lines, separate paragraphs by one blank line.
fn normalize_body(body: &str) -> String {
    body.lines()
        .map(|line| HEADING_MARKS.replace(line.trim(), "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Append the shared citations an article does not already carry.
fn distribute(article: ParsedArticle, global_sources: &[Source]) -> ParsedArticle {
    if global_sources.is_empty() {
        return article;
    }
    let mut sources: SourceList = article.sources.iter().cloned().collect();
    sources.extend_missing(global_sources);
    article.with_sources(sources.into_vec())
}
