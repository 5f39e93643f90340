//! Line-oriented fallback for unstructured pasted text.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::article::{ParsedArticle, Source};
use crate::ingest::ParserConfig;
use crate::sources::{SourceList, hostname_of};

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").expect("url regex"));

const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "avif"];

/// Parse unstructured text into at most one article.
///
/// The first line longer than `min_title_chars` that does not start with
/// `http` is the title. Lines holding a URL become sources (or the image, for
/// the first image URL); everything else forms the body.
pub fn parse_plain_text(text: &str, config: &ParserConfig) -> Vec<ParsedArticle> {
    let lines: Vec<&str> = text.lines().collect();

    let title_index = lines.iter().position(|line| {
        let line = line.trim();
        line.chars().count() > config.min_title_chars && !line.starts_with("http")
    });

    let (title, body_lines) = match title_index {
        Some(index) => (strip_heading(lines[index]), &lines[index + 1..]),
        None => (String::new(), &lines[..]),
    };

    let mut image_url = String::new();
    let mut sources = SourceList::new();
    let mut kept = Vec::new();

    for line in body_lines {
        let Some(found) = URL_PATTERN.find(line) else {
            kept.push(*line);
            continue;
        };
        let url = found.as_str();

        if image_url.is_empty() && is_image_url(url) {
            image_url = url.to_string();
            continue;
        }

        let label = line.replace(url, "");
        let label = label.trim();
        let title = if label.is_empty() { hostname_of(url) } else { label.to_string() };
        sources.push(Source::new(title, url));
    }

    let mut article = ParsedArticle::new(title, image_url, kept.join("\n").trim().to_string(), sources.into_vec());
    article.backfill(config.title_fallback_chars);

    if article.is_blank() { Vec::new() } else { vec![article] }
}

fn strip_heading(line: &str) -> String {
    line.trim().trim_start_matches('#').trim().to_string()
}

fn is_image_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    parsed
        .path()
        .rsplit_once('.')
        .map(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Vec<ParsedArticle> {
        parse_plain_text(text, &ParserConfig::default())
    }

    #[test]
    fn test_title_body_and_hostname_source() {
        let articles = parse("My Title\nSome body text.\nhttps://example.com/ref");

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "My Title");
        assert_eq!(articles[0].text, "Some body text.");
        assert_eq!(articles[0].sources, vec![Source::new("example.com", "https://example.com/ref")]);
    }

    #[test]
    fn test_labelled_source_line() {
        let articles = parse("# Heading line\nBody.\nReuters coverage https://reuters.example/x\nAgain https://reuters.example/x");

        assert_eq!(articles[0].title, "Heading line");
        assert_eq!(articles[0].sources, vec![Source::new("Reuters coverage", "https://reuters.example/x")]);
    }

    #[test]
    fn test_short_and_url_lines_skipped_for_title() {
        let articles = parse("Hi\nhttps://example.com/first-link\nReal title here\nBody");

        assert_eq!(articles[0].title, "Real title here");
        assert_eq!(articles[0].text, "Body");
        assert!(articles[0].sources.is_empty());
    }

    #[test]
    fn test_no_title_candidate_uses_body() {
        let articles = parse("Hi\nYo\nhttps://example.com/a");

        assert_eq!(articles[0].text, "Hi\nYo");
        assert_eq!(articles[0].title, "Hi\nYo");
        assert_eq!(articles[0].sources.len(), 1);
    }

    #[test]
    fn test_image_url_line() {
        let articles = parse("Photo essay title\nhttps://cdn.example.com/pics/cover.JPG\nCaption text.");

        assert_eq!(articles[0].image_url, "https://cdn.example.com/pics/cover.JPG");
        assert!(articles[0].sources.is_empty());
        assert_eq!(articles[0].text, "Caption text.");
    }

    #[test]
    fn test_title_only_backfills_text() {
        let articles = parse("A lonely title");
        assert_eq!(articles[0].text, "A lonely title");
    }

    #[test]
    fn test_blank_input_yields_nothing() {
        assert!(parse("   \n\n  ").is_empty());
        assert!(parse("").is_empty());
    }
}
