//! HTML parsing and DOM querying.
//!
//! [`Document`] wraps a parsed `scraper::Html` tree and exposes the handful
//! of queries the input parser and the citation rewriter need. Mutation of
//! the tree lives in [`crate::dom_tree`].
//!
//! # Example
//!
//! ```rust
//! use horus_core::parse::Document;
//!
//! let doc = Document::parse(r#"<h1>Title</h1><p class="lead">Paragraph</p>"#);
//! assert_eq!(doc.first_text("h1").as_deref(), Some("Title"));
//! assert_eq!(doc.select("p.lead").unwrap().len(), 1);
//! ```

use scraper::{Html, Selector};

use crate::{HorusError, Result};

/// A parsed HTML document or fragment.
pub struct Document {
    html: Html,
    fragment: bool,
}

impl Document {
    /// Parses a full HTML document.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html), fragment: false }
    }

    /// Parses an HTML fragment in a `<body>` context.
    ///
    /// Use this for article bodies that will be serialized back with
    /// [`Document::inner_html`]; no `<head>`/`<body>` wrappers are added.
    pub fn parse_fragment(html: &str) -> Self {
        Self { html: Html::parse_fragment(html), fragment: true }
    }

    /// Gets the underlying `scraper::Html`.
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Gets the underlying `scraper::Html` for in-place tree edits.
    pub fn html_mut(&mut self) -> &mut Html {
        &mut self.html
    }

    /// Serializes the content of the document.
    ///
    /// For fragments this is the markup inside the synthetic root; for full
    /// documents it is the whole document.
    pub fn inner_html(&self) -> String {
        if self.fragment { self.html.root_element().inner_html() } else { self.html.html() }
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`HorusError::HtmlParseError`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Trimmed text of the first element matching `selector`, if non-empty.
    pub fn first_text(&self, selector: &str) -> Option<String> {
        let elements = self.select(selector).ok()?;
        let text = elements.first()?.text();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    /// Value of `attr` on the first element matching `selector`, if non-empty.
    pub fn first_attr(&self, selector: &str, attr: &str) -> Option<String> {
        let elements = self.select(selector).ok()?;
        let value = elements.first()?.attr(attr)?.trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    /// Content of `<meta name="..">` or `<meta property="..">`.
    pub fn meta_content(&self, key: &str) -> Option<String> {
        self.first_attr(&format!("meta[name=\"{}\"]", key), "content")
            .or_else(|| self.first_attr(&format!("meta[property=\"{}\"]", key), "content"))
    }

    /// Gets all text content from the document.
    pub fn text_content(&self) -> String {
        self.html.root_element().text().collect()
    }
}

/// A wrapper around scraper's ElementRef.
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: scraper::ElementRef<'a>,
}

impl<'a> Element<'a> {
    pub(crate) fn new(element: scraper::ElementRef<'a>) -> Self {
        Self { element }
    }

    /// Gets the node id of this element in its tree.
    pub fn id(&self) -> ego_tree::NodeId {
        self.element.id()
    }

    /// Serializes the children of this element.
    pub fn inner_html(&self) -> String {
        self.element.inner_html()
    }

    /// Gets the text content of this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Gets the lowercase tag name.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Next sibling that is an element, skipping text and comments.
    pub fn next_element_sibling(&self) -> Option<Element<'a>> {
        self.element.next_siblings().find_map(scraper::ElementRef::wrap).map(Element::new)
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`HorusError::HtmlParseError`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = parse_selector(selector)?;
        Ok(self.element.select(&sel).map(Element::new).collect())
    }

    /// True if any descendant matches `selector`.
    pub fn has_descendant(&self, selector: &str) -> bool {
        self.select(selector).map(|found| !found.is_empty()).unwrap_or(false)
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| HorusError::HtmlParseError(format!("Invalid selector: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html lang="ar">
        <head>
            <meta charset="UTF-8">
            <meta name="headline" content="  Meta Headline ">
            <meta property="og:image" content="https://cdn.example.com/cover.jpg">
            <title>Solar report</title>
        </head>
        <body>
            <h1>Solar capacity grows</h1>
            <p class="lead">First lead paragraph</p>
            <p class="lead">Second lead paragraph</p>
            <a href="https://iea.example.org">Agency report</a>
        </body>
        </html>
    "#;

    #[test]
    fn test_select_lead_paragraphs() {
        let doc = Document::parse(SAMPLE_HTML);
        let leads = doc.select("p.lead").unwrap();

        assert_eq!(leads.len(), 2);
        assert_eq!(leads[1].text(), "Second lead paragraph");
        assert_eq!(doc.select("a").unwrap()[0].attr("href"), Some("https://iea.example.org"));
    }

    #[test]
    fn test_meta_content_by_name_and_property() {
        let doc = Document::parse(SAMPLE_HTML);
        assert_eq!(doc.meta_content("headline"), Some("Meta Headline".to_string()));
        assert_eq!(doc.meta_content("og:image"), Some("https://cdn.example.com/cover.jpg".to_string()));
        assert_eq!(doc.meta_content("og:title"), None);
    }

    #[test]
    fn test_invalid_selector_is_html_error() {
        let doc = Document::parse(SAMPLE_HTML);
        assert!(matches!(doc.select("li[[id"), Err(HorusError::HtmlParseError(_))));
    }

    #[test]
    fn test_fragment_round_trip_has_no_wrappers() {
        let doc = Document::parse_fragment("<h2>Title</h2><p>Body</p>");
        assert_eq!(doc.inner_html(), "<h2>Title</h2><p>Body</p>");
    }

    #[test]
    fn test_next_element_sibling_skips_text() {
        let doc = Document::parse_fragment("<h2>Sources</h2>\n  <ul><li>x</li></ul>");
        let heading = &doc.select("h2").unwrap()[0];
        let next = heading.next_element_sibling().unwrap();
        assert_eq!(next.tag_name(), "ul");
    }

    #[test]
    fn test_element_inner_html() {
        let doc = Document::parse_fragment("<ul><li>one</li><li>two</li></ul>");
        let list = &doc.select("ul").unwrap()[0];
        assert_eq!(list.inner_html(), "<li>one</li><li>two</li>");
    }

    #[test]
    fn test_has_descendant() {
        let doc = Document::parse_fragment("<div><ul><li>x</li></ul></div><div>plain</div>");
        let divs = doc.select("div").unwrap();
        assert!(divs[0].has_descendant("ul"));
        assert!(!divs[1].has_descendant("ul"));
    }
}
