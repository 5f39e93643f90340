//! Source-list utilities shared by the parser and the citation rewriter.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::Result;
use crate::article::Source;

static NUMBERING_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\[\d+\]\s*-\s*").expect("numbering prefix regex"));

/// Ordered collection of sources, unique by URL.
///
/// The first source seen for a URL wins; later duplicates are ignored.
#[derive(Debug, Clone, Default)]
pub struct SourceList {
    items: Vec<Source>,
    seen: HashSet<String>,
}

impl SourceList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `source` unless its URL is already present. Returns whether it was added.
    pub fn push(&mut self, source: Source) -> bool {
        if self.contains_url(&source.url) {
            return false;
        }
        self.seen.insert(source.url.clone());
        self.items.push(source);
        true
    }

    /// Appends every source from `extra` whose URL is not yet present.
    pub fn extend_missing<'a>(&mut self, extra: impl IntoIterator<Item = &'a Source>) {
        for source in extra {
            self.push(source.clone());
        }
    }

    /// True if a source with this URL was already added.
    pub fn contains_url(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[Source] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<Source> {
        self.items
    }
}

impl FromIterator<Source> for SourceList {
    fn from_iter<I: IntoIterator<Item = Source>>(iter: I) -> Self {
        let mut list = SourceList::new();
        for source in iter {
            list.push(source);
        }
        list
    }
}

/// Reads a `[{"title": .., "url": ..}]` source list from a JSON file.
///
/// # Errors
///
/// - [`HorusError::Io`](crate::HorusError::Io) if the file cannot be read
/// - [`HorusError::JsonError`](crate::HorusError::JsonError) if it is not a source list
pub fn read_source_file(path: impl AsRef<Path>) -> Result<Vec<Source>> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Keeps only the sources whose URL is in `selected`, preserving order.
pub fn select_sources(sources: &[Source], selected: &HashSet<String>) -> Vec<Source> {
    sources.iter().filter(|s| selected.contains(&s.url)).cloned().collect()
}

/// Parses manually entered URLs, one per line.
///
/// Lines that do not start with `http` or do not parse as a URL are skipped.
/// Each accepted URL is titled with its hostname.
pub fn parse_manual_sources(text: &str) -> Vec<Source> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.starts_with("http"))
        .filter_map(|line| {
            let url = Url::parse(line).ok()?;
            let host = url.host_str()?.to_string();
            Some(Source::new(host, line))
        })
        .collect::<SourceList>()
        .into_vec()
}

/// Concatenates `primary` and the unseen entries of `extra`.
pub fn merge_sources(primary: &[Source], extra: &[Source]) -> Vec<Source> {
    let mut list: SourceList = primary.iter().cloned().collect();
    list.extend_missing(extra);
    list.into_vec()
}

/// Removes a leading `[n] - ` left over from an earlier numbering pass.
pub fn strip_numbering_prefix(title: &str) -> String {
    NUMBERING_PREFIX.replace(title, "").trim().to_string()
}

/// Hostname of `url`, or `url` itself when it cannot be parsed.
pub fn hostname_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}

/// Trims trailing `)` and `]` picked up from markdown or bracketed lists.
pub(crate) fn clean_url(url: &str) -> String {
    url.trim().trim_end_matches([')', ']']).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn src(title: &str, url: &str) -> Source {
        Source::new(title, url)
    }

    #[test]
    fn test_source_list_first_wins() {
        let mut list = SourceList::new();
        assert!(list.push(src("A", "https://a.example")));
        assert!(!list.push(src("B", "https://a.example")));
        assert_eq!(list.len(), 1);
        assert_eq!(list.as_slice()[0].title, "A");
    }

    #[test]
    fn test_contains_url_tracks_pushes() {
        let mut list = SourceList::new();
        list.push(src("A", "https://a.example/1"));
        assert!(list.contains_url("https://a.example/1"));
        assert!(!list.contains_url("https://a.example/2"));
    }

    #[test]
    fn test_read_source_file_missing_is_io_error() {
        let err = read_source_file("/nonexistent/sources.json").unwrap_err();
        assert!(matches!(err, crate::HorusError::Io(_)));
    }

    #[test]
    fn test_select_sources_preserves_order() {
        let sources = vec![src("A", "https://a.example"), src("B", "https://b.example"), src("C", "https://c.example")];
        let selected: HashSet<String> = ["https://c.example", "https://a.example"].iter().map(|s| s.to_string()).collect();

        let picked = select_sources(&sources, &selected);
        assert_eq!(picked, vec![src("A", "https://a.example"), src("C", "https://c.example")]);
    }

    #[test]
    fn test_parse_manual_sources() {
        let text = "https://news.example.org/story\nnot a url\nhttp://\n  https://blog.example.com/post  \nhttps://news.example.org/story";
        let sources = parse_manual_sources(text);

        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0], src("news.example.org", "https://news.example.org/story"));
        assert_eq!(sources[1], src("blog.example.com", "https://blog.example.com/post"));
    }

    #[test]
    fn test_merge_sources_skips_known_urls() {
        let merged = merge_sources(
            &[src("A", "https://a.example")],
            &[src("A again", "https://a.example"), src("B", "https://b.example")],
        );
        assert_eq!(merged, vec![src("A", "https://a.example"), src("B", "https://b.example")]);
    }

    #[rstest]
    #[case("[3] - Reuters report", "Reuters report")]
    #[case("[12]-Title", "Title")]
    #[case("Plain title", "Plain title")]
    #[case("Title with [1] - inside", "Title with [1] - inside")]
    fn test_strip_numbering_prefix(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(strip_numbering_prefix(input), expected);
    }

    #[rstest]
    #[case("https://example.com/ref", "example.com")]
    #[case("not a url", "not a url")]
    fn test_hostname_of(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(hostname_of(input), expected);
    }

    #[rstest]
    #[case("https://a.example/x)", "https://a.example/x")]
    #[case("https://a.example/x])", "https://a.example/x")]
    #[case("https://a.example/x", "https://a.example/x")]
    fn test_clean_url(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(clean_url(input), expected);
    }
}
