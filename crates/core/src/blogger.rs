//! Import of Blogger export feeds (Atom) as parsed articles.
//!
//! Only post entries are imported. An entry's kind comes from its
//! `<category scheme="...#kind" term="...#post">` or, in newer exports, its
//! `<blogger:type>POST</blogger:type>`; entries without either are treated
//! as posts.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, instrument, trace};

use crate::article::ParsedArticle;
use crate::ingest::ParserConfig;
use crate::parse::Document;
use crate::{HorusError, Result};

#[derive(Debug, Default)]
struct FeedEntry {
    title: String,
    content: String,
    is_post: Option<bool>,
}

impl FeedEntry {
    fn observe_category(&mut self, e: &BytesStart) {
        let scheme = attr(e, b"scheme").unwrap_or_default();
        if !scheme.ends_with("#kind") {
            return;
        }
        let term = attr(e, b"term").unwrap_or_default();
        self.is_post = Some(term.ends_with("#post"));
    }

    fn into_article(self, config: &ParserConfig) -> Option<ParsedArticle> {
        if self.is_post == Some(false) {
            return None;
        }

        let doc = Document::parse(&self.content);
        let mut text = doc.extract_body_text(config);
        if text.is_empty() {
            text = doc.text_content().split_whitespace().collect::<Vec<_>>().join(" ");
        }
        let image_url = doc.extract_image(config.base_url.as_ref()).unwrap_or_default();

        let mut article = ParsedArticle::new(self.title.trim().to_string(), image_url, text, doc.extract_sources(config));
        article.backfill(config.title_fallback_chars);

        (!article.title.is_empty() || !article.text.is_empty()).then_some(article)
    }
}

/// Import every post of a Blogger export feed.
///
/// # Errors
///
/// - [`HorusError::XmlError`] if the feed is not well-formed XML
/// - [`HorusError::NoArticlesInFeed`] if no post yields a title or text
///
/// # Example
///
/// ```rust
/// use horus_core::{ParserConfig, import_blogger_feed};
///
/// let feed = "<feed><entry><title>Hello</title>\
///     <content type='html'>&lt;p&gt;A post body that is long enough to keep.&lt;/p&gt;</content>\
///     </entry></feed>";
/// let articles = import_blogger_feed(feed, &ParserConfig::default()).unwrap();
/// assert_eq!(articles[0].title, "Hello");
/// ```
#[instrument(level = "debug", skip(xml, config), fields(len = xml.len()))]
pub fn import_blogger_feed(xml: &str, config: &ParserConfig) -> Result<Vec<ParsedArticle>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().expand_empty_elements = true;

    let mut buf = Vec::new();
    let mut text_buf = Vec::new();
    let mut entry: Option<FeedEntry> = None;
    let mut articles = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error)? {
            Event::Start(e) => match entry.as_mut() {
                None if e.local_name().as_ref() == b"entry" => entry = Some(FeedEntry::default()),
                None => {}
                Some(current) => match e.local_name().as_ref() {
                    b"category" => current.observe_category(&e),
                    b"title" => current.title = read_text(&mut reader, &e, &mut text_buf)?,
                    b"content" => current.content = read_text(&mut reader, &e, &mut text_buf)?,
                    b"type" => {
                        let kind = read_text(&mut reader, &e, &mut text_buf)?;
                        current.is_post = Some(kind.trim().eq_ignore_ascii_case("post"));
                    }
                    _ => {}
                },
            },
            Event::End(e) if e.local_name().as_ref() == b"entry" => {
                if let Some(finished) = entry.take() {
                    match finished.into_article(config) {
                        Some(article) => articles.push(article),
                        None => trace!("skipping non-post or empty entry"),
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    debug!(articles = articles.len(), "imported feed");
    if articles.is_empty() {
        return Err(HorusError::NoArticlesInFeed);
    }
    Ok(articles)
}

/// Read the text of the element just opened by `start`, ignoring child tags.
fn read_text(reader: &mut Reader<&[u8]>, start: &BytesStart, buf: &mut Vec<u8>) -> Result<String> {
    let end_name = start.name().as_ref().to_vec();
    let mut text = String::new();
    let mut depth: u32 = 1;

    loop {
        match reader.read_event_into(buf).map_err(xml_error)? {
            Event::Start(e) if e.name().as_ref() == end_name.as_slice() => depth += 1,
            Event::End(e) if e.name().as_ref() == end_name.as_slice() => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Event::Text(e) => text.push_str(&e.unescape().map_err(xml_error)?),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e)),
            Event::Eof => return Err(HorusError::XmlError("unexpected end of feed".to_string())),
            _ => {}
        }
        buf.clear();
    }
    buf.clear();

    Ok(text)
}

fn attr(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.try_get_attribute(name)
        .ok()?
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

fn xml_error(e: impl std::fmt::Display) -> HorusError {
    HorusError::XmlError(e.to_string())
}
