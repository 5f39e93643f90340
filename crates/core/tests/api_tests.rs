//! Library API integration tests
use horus_core::*;
use std::collections::HashSet;
use url::Url;

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(get_fixture_path(name)).unwrap()
}

fn fixture_sources() -> Vec<Source> {
    read_source_file(get_fixture_path("sources.json")).unwrap()
}

#[test]
fn test_parse_protocol_fixture() {
    let articles = parse_raw_input(&read_fixture("perplexity.txt"));
    assert_eq!(articles.len(), 2);

    let first = &articles[0];
    assert_eq!(first.title, "إطلاق مهمة جديدة لاستكشاف القمر");
    assert!(first.text.starts_with("خلفية المهمة\n\nأعلنت وكالة الفضاء"));
    assert!(first.image_url.is_empty());
    assert_eq!(first.sources.len(), 4);
    assert_eq!(first.sources[0].title, "بيان وكالة الفضاء");
    assert_eq!(first.sources[1].url, "https://science.example.com/lunar-ice");
    assert_eq!(first.sources[3], Source::new("Lunar exploration overview", "https://encyclopedia.example.org/moon"));

    let second = &articles[1];
    assert_eq!(second.title, "Central bank holds interest rates steady");
    assert_eq!(
        second.text,
        "The central bank left its benchmark rate unchanged on Thursday, citing easing inflation.\n\nAnalysts expect the first cut to arrive in the second quarter."
    );
    let urls: Vec<&str> = second.sources.iter().map(|s| s.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://markets.example.com/rates-hold",
            "https://bank.example.org/statement",
            "https://imf.example.org/weo",
            "https://encyclopedia.example.org/moon",
        ]
    );
}

#[test]
fn test_detect_dialect_of_fixtures() {
    assert_eq!(detect_dialect(&read_fixture("perplexity.txt")), Dialect::Protocol);
    assert_eq!(detect_dialect(&read_fixture("article.html")), Dialect::Html);
    assert_eq!(detect_dialect("Title line\nbody"), Dialect::PlainText);
}

#[test]
fn test_parse_html_fixture_with_base_url() {
    let config = ParserConfig::builder()
        .base_url(Url::parse("https://news.example.com/world/cycling").unwrap())
        .build();
    let articles = InputParser::with_config(config).parse(&read_fixture("article.html"));

    assert_eq!(articles.len(), 1);
    let article = &articles[0];
    assert_eq!(article.title, "City council approves new cycling network");
    assert_eq!(article.image_url, "https://news.example.com/media/bike-lanes.jpg");
    assert!(article.text.contains("The city council voted on Tuesday"));
    assert!(article.text.contains("cycling trips have doubled since 2019."));
    assert_eq!(
        article.sources,
        vec![
            Source::new("regional transport report", "https://transport.example.org/report"),
            Source::new("Follow us on social media", "https://social.example.net/examplenews"),
        ]
    );
}

#[test]
fn test_parsed_sources_are_unique_for_every_dialect() {
    let inputs = [
        read_fixture("perplexity.txt"),
        read_fixture("article.html"),
        "Title line\nA https://a.example/x\nB https://a.example/x".to_string(),
    ];

    for input in &inputs {
        for article in parse_raw_input(input) {
            let unique: HashSet<&str> = article.sources.iter().map(|s| s.url.as_str()).collect();
            assert_eq!(unique.len(), article.sources.len());
        }
    }
}

#[test]
fn test_rewrite_generated_fixture() {
    let html = read_fixture("generated.html");
    let outcome = CitationRewriter::new().rewrite(&html, &fixture_sources());

    assert_eq!(outcome.sources_rebuilt, 3);
    assert_eq!(outcome.citations_linked, 4);
    assert!(!outcome.html.contains("مصدر قديم"));
    assert!(outcome.html.contains("[9]"));
    assert!(outcome.html.contains(">International Energy Agency report</a>"));
    assert!(!outcome.html.contains("[1] - International"));

    let doc = Document::parse_fragment(&outcome.html);
    let refs = doc.select("li[id^=\"ref\"]").unwrap();
    assert_eq!(refs.len(), 3);
    assert_eq!(doc.select("a[href=\"#ref9\"]").unwrap().len(), 0);
}

#[test]
fn test_rewrite_generated_fixture_is_idempotent() {
    let html = read_fixture("generated.html");
    let sources = fixture_sources();

    let once = rewrite_citations(&html, &sources);
    let twice = rewrite_citations(&once, &sources);
    assert_eq!(once, twice);
}

#[test]
fn test_select_then_rewrite() {
    let sources = fixture_sources();
    let selected: HashSet<String> = ["https://finance.example.net/renewables".to_string()].into_iter().collect();
    let picked = select_sources(&sources, &selected);

    let outcome = CitationRewriter::new().rewrite(&read_fixture("generated.html"), &picked);
    assert_eq!(outcome.sources_rebuilt, 1);
    assert_eq!(outcome.citations_linked, 2);
    assert_eq!(sources.len(), 3);
}

#[test]
fn test_schema_correction_fixture() {
    let html = read_fixture("generated.html");
    let corrected = apply_schema_correction(&html, &read_fixture("model_response.txt")).unwrap();

    let blocks = extract_schema_blocks(&corrected);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0]["@type"], "NewsArticle");
    assert_eq!(blocks[0]["publisher"]["name"], "Example News");
    assert!(!corrected.contains("عنوان قديم"));
}

#[test]
fn test_extract_json_from_model_response() {
    let json = extract_json_string(&read_fixture("model_response.txt")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["headline"], "ارتفاع استخدام الطاقة الشمسية");
}

#[cfg(feature = "blogger")]
#[test]
fn test_import_blogger_fixture() {
    let articles = import_blogger_feed(&read_fixture("blogger.xml"), &ParserConfig::default()).unwrap();
    assert_eq!(articles.len(), 2);

    assert_eq!(articles[0].title, "A weekend in the mountains");
    assert_eq!(articles[0].image_url, "https://blogger.example.com/img/mountains.jpg");
    assert_eq!(
        articles[0].sources,
        vec![Source::new("park service trail guide", "https://parks.example.org/ridge-trail")]
    );

    assert_eq!(articles[1].title, "وصفة الخبز المنزلي");
    assert!(articles[1].text.starts_with("خطوات بسيطة"));
}

#[test]
fn test_output_formats() {
    let articles = parse_raw_input(&read_fixture("perplexity.txt"));

    let json = articles_to_json(&articles, false).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 2);
    assert!(value[0].get("imageUrl").is_some());

    let text = articles_to_text(&articles);
    assert!(text.contains("Central bank holds interest rates steady\n"));
    assert!(text.contains("[4] Lunar exploration overview - https://encyclopedia.example.org/moon"));
}

#[test]
fn test_slug_for_parsed_titles() {
    let articles = parse_raw_input(&read_fixture("perplexity.txt"));
    assert_eq!(slugify(&articles[1].title), "central-bank-holds-interest-rates-steady");
    assert_eq!(slugify(&articles[0].title), "إطلاق-مهمة-جديدة-لاستكشاف-القمر");
}

#[test]
fn test_manual_sources_merge() {
    let manual = parse_manual_sources("https://extra.example.com/a\nhttps://iea.example.org/solar-2025");
    let merged = merge_sources(&fixture_sources(), &manual);

    assert_eq!(merged.len(), 4);
    assert_eq!(merged[3], Source::new("extra.example.com", "https://extra.example.com/a"));
}
