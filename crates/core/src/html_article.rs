//! Single-article extraction from raw HTML.
//!
//! Headline, lead image, body fragments and outbound links are read from the
//! parsed [`Document`]. Links back to the page's own host are not sources.

use std::collections::HashSet;

use url::Url;

use crate::article::{ParsedArticle, Source};
use crate::ingest::ParserConfig;
use crate::parse::Document;
use crate::sources::SourceList;

const BODY_SELECTOR: &str = "p, div, li, h3, h4, article";

impl Document {
    /// Extract headline with priority fallback:
    /// 1. Meta `headline`
    /// 2. Open Graph `og:title`
    /// 3. First `<h1>` element
    /// 4. First `<h2>` element
    pub fn extract_headline(&self) -> Option<String> {
        self.meta_content("headline")
            .or_else(|| self.meta_content("og:title"))
            .or_else(|| self.first_text("h1"))
            .or_else(|| self.first_text("h2"))
    }

    /// Extract lead image with priority fallback:
    /// 1. Open Graph `og:image`
    /// 2. `src` of the first `<img>` anywhere in the document
    pub fn extract_image(&self, base_url: Option<&Url>) -> Option<String> {
        let raw = self.meta_content("og:image").or_else(|| self.first_attr("img[src]", "src"))?;
        Some(resolve(&raw, base_url).map(|u| u.to_string()).unwrap_or(raw))
    }

    /// Collect body paragraphs from block elements.
    ///
    /// Containers holding a nested list whose text mentions the sources
    /// heading are skipped so the source list does not leak into the body.
    /// Fragments of `min_paragraph_chars` characters or fewer are dropped and
    /// repeated paragraphs are kept once.
    pub fn extract_body_text(&self, config: &ParserConfig) -> String {
        let Ok(elements) = self.select(BODY_SELECTOR) else {
            return String::new();
        };

        let collected: Vec<String> = elements
            .iter()
            .filter_map(|el| {
                let text = el.text();
                let text = text.trim();
                if el.has_descendant("ul") && text.contains(config.sources_heading.as_str()) {
                    return None;
                }
                (text.chars().count() > config.min_paragraph_chars).then(|| text.to_string())
            })
            .collect();

        dedupe_paragraphs(&collected.join("\n\n"))
    }

    /// Collect outbound links as sources.
    ///
    /// Only absolute HTTP(S) links pointing away from `base_url`'s host are
    /// kept, and only when their label is longer than `min_source_title_chars`.
    pub fn extract_sources(&self, config: &ParserConfig) -> Vec<Source> {
        let Ok(anchors) = self.select("a[href]") else {
            return Vec::new();
        };
        let own_host = config.base_url.as_ref().and_then(|u| u.host_str());

        let mut sources = SourceList::new();
        for anchor in anchors {
            let Some(url) = anchor.attr("href").and_then(|href| resolve(href, config.base_url.as_ref())) else {
                continue;
            };
            if !matches!(url.scheme(), "http" | "https") {
                continue;
            }
            let Some(host) = url.host_str() else {
                continue;
            };
            if own_host == Some(host) {
                continue;
            }

            let text = anchor.text();
            let title = [text.trim(), anchor.attr("title").unwrap_or("").trim()]
                .into_iter()
                .find(|candidate| !candidate.is_empty())
                .unwrap_or(host)
                .to_string();

            if title.chars().count() > config.min_source_title_chars {
                sources.push(Source::new(title, url.to_string()));
            }
        }

        sources.into_vec()
    }

    /// Extract a complete article, or `None` if there is neither title nor body.
    pub fn extract_article(&self, config: &ParserConfig) -> Option<ParsedArticle> {
        let title = self.extract_headline().unwrap_or_default();
        let text = self.extract_body_text(config);

        if title.is_empty() && text.is_empty() {
            return None;
        }

        let image_url = self.extract_image(config.base_url.as_ref()).unwrap_or_default();
        let mut article = ParsedArticle::new(title, image_url, text, self.extract_sources(config));
        article.backfill(config.title_fallback_chars);
        Some(article)
    }
}

/// Parse raw HTML as a single article.
pub fn parse_html_article(html: &str, config: &ParserConfig) -> Option<ParsedArticle> {
    Document::parse(html).extract_article(config)
}

fn resolve(href: &str, base_url: Option<&Url>) -> Option<Url> {
    match base_url {
        Some(base) => base.join(href.trim()).ok(),
        None => Url::parse(href.trim()).ok(),
    }
}

/// Keep the first occurrence of every blank-line separated paragraph
fn dedupe_paragraphs(text: &str) -> String {
    let mut seen = HashSet::new();
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty() && seen.insert(*p))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ParserConfig {
        ParserConfig::default()
    }

    #[test]
    fn test_headline_priority() {
        let html = r#"
            <html><head>
                <meta property="og:title" content="OG Title">
                <meta name="headline" content="Meta Headline">
            </head><body><h1>H1 Title</h1></body></html>
        "#;
        assert_eq!(Document::parse(html).extract_headline(), Some("Meta Headline".to_string()));

        let html = r#"<html><head><meta property="og:title" content="OG Title"></head><body><h1>H1</h1></body></html>"#;
        assert_eq!(Document::parse(html).extract_headline(), Some("OG Title".to_string()));

        let html = "<h2>Second level</h2><h1>  </h1>";
        assert_eq!(Document::parse(html).extract_headline(), Some("Second level".to_string()));
    }

    #[test]
    fn test_image_prefers_og_image() {
        let html = r#"<meta property="og:image" content="https://cdn.example.com/og.png"><img src="https://cdn.example.com/inline.png">"#;
        assert_eq!(
            Document::parse(html).extract_image(None),
            Some("https://cdn.example.com/og.png".to_string())
        );

        let html = r#"<p>text</p><img src="/img/first.png"><img src="/img/second.png">"#;
        let base = Url::parse("https://blog.example.com/post").unwrap();
        assert_eq!(
            Document::parse(html).extract_image(Some(&base)),
            Some("https://blog.example.com/img/first.png".to_string())
        );
    }

    #[test]
    fn test_body_skips_short_and_source_containers() {
        let html = r#"
            <p>Short one.</p>
            <p>This paragraph is comfortably longer than twenty characters.</p>
            <div><h3>المصادر</h3><ul><li>https://a.example/1 is a cited link here</li></ul></div>
        "#;
        let text = Document::parse(html).extract_body_text(&config());

        assert_eq!(
            text,
            "This paragraph is comfortably longer than twenty characters.\n\nhttps://a.example/1 is a cited link here"
        );
    }

    #[test]
    fn test_body_deduplicates_repeated_paragraphs() {
        let html = r#"
            <article><p>Repeated paragraph text that is long enough.</p></article>
        "#;
        let text = Document::parse(html).extract_body_text(&config());
        assert_eq!(text, "Repeated paragraph text that is long enough.");
    }

    #[test]
    fn test_sources_filter_own_host_and_short_titles() {
        let html = r#"
            <a href="https://blog.example.com/about">About this blog</a>
            <a href="https://other.com/x">Other Site</a>
            <a href="https://other.com/x">Other Site duplicate</a>
            <a href="https://short.example/y">Tiny</a>
            <a href="https://titled.example/z" title="Titled link"></a>
            <a href="mailto:someone@example.com">Write to someone</a>
            <a href="/relative/path">Relative link text</a>
        "#;
        let config = ParserConfig::builder()
            .base_url(Url::parse("https://blog.example.com/post").unwrap())
            .build();

        let sources = Document::parse(html).extract_sources(&config);
        assert_eq!(
            sources,
            vec![
                Source::new("Other Site", "https://other.com/x"),
                Source::new("Titled link", "https://titled.example/z"),
            ]
        );
    }

    #[test]
    fn test_hostname_used_when_label_missing() {
        let html = r#"<a href="https://longhostname.example.org/page"></a>"#;
        let sources = Document::parse(html).extract_sources(&config());
        assert_eq!(sources[0].title, "longhostname.example.org");
    }

    #[test]
    fn test_extract_article_backfills_title() {
        let body = "A paragraph without any heading that runs on for well over seventy characters in total length.";
        let html = format!("<p>{}</p>", body);

        let article = parse_html_article(&html, &config()).unwrap();
        assert_eq!(article.title, body.chars().take(70).collect::<String>());
        assert_eq!(article.text, body);
    }

    #[test]
    fn test_extract_article_none_when_empty() {
        assert!(parse_html_article("<span>tiny</span>", &config()).is_none());
    }
}
