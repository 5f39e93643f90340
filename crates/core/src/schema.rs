//! Structured-data (schema.org JSON-LD) repair for generated articles.
//!
//! Blocks are read and rewritten with a streaming `lol_html` pass, so the rest
//! of the markup is passed through byte for byte.

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::json_island::extract_json_string;
use crate::{HorusError, Result};

const LD_JSON_SELECTOR: &str = r#"script[type="application/ld+json"]"#;

/// Parse every JSON-LD block in `html` that holds valid JSON.
///
/// Blocks with invalid JSON are skipped.
pub fn extract_schema_blocks(html: &str) -> Vec<Value> {
    let mut raw_blocks: Vec<String> = Vec::new();
    let mut current = String::new();

    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![lol_html::text!(LD_JSON_SELECTOR, |chunk| {
                current.push_str(chunk.as_str());
                if chunk.last_in_text_node() {
                    raw_blocks.push(std::mem::take(&mut current));
                }
                Ok(())
            })],
            ..Default::default()
        },
        |_: &[u8]| {},
    );

    if let Err(e) = rewriter.write(html.as_bytes()).and_then(|_| rewriter.end()) {
        warn!(error = %e, "could not scan html for structured data");
        return Vec::new();
    }

    raw_blocks
        .iter()
        .filter_map(|raw| match serde_json::from_str(raw.trim()) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(error = %e, "skipping JSON-LD block with invalid JSON");
                None
            }
        })
        .collect()
}

/// Remove every JSON-LD block from `html` and append one holding `json`.
///
/// The new block goes before `</body>` when the document has one, otherwise
/// at the end.
pub fn replace_schema_blocks(html: &str, json: &str) -> String {
    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![lol_html::element!(LD_JSON_SELECTOR, |el| {
                el.remove();
                Ok(())
            })],
            ..Default::default()
        },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    let stripped = match rewriter.write(html.as_bytes()).and_then(|_| rewriter.end()) {
        Ok(_) => output,
        Err(e) => {
            warn!(error = %e, "could not strip existing structured data");
            html.to_string()
        }
    };

    let block = format!(
        r#"<script type="application/ld+json">{}</script>"#,
        json.trim().replace("</", r"<\/")
    );

    match stripped.rfind("</body>") {
        Some(pos) => {
            let mut out = stripped;
            out.insert_str(pos, &block);
            out
        }
        None => stripped + &block,
    }
}

/// Replace the article's structured data with the JSON found in `model_output`.
///
/// # Errors
///
/// - [`HorusError::SchemaNotFound`] if no JSON island is present
/// - [`HorusError::InvalidSchema`] if it is not a schema.org object (or list
///   of objects) carrying `@type`
#[instrument(level = "debug", skip(html, model_output), fields(html_len = html.len(), output_len = model_output.len()))]
pub fn apply_schema_correction(html: &str, model_output: &str) -> Result<String> {
    let json = extract_json_string(model_output).ok_or(HorusError::SchemaNotFound)?;
    let value: Value = serde_json::from_str(&json)?;
    validate_schema(&value)?;

    debug!("replacing structured data");
    Ok(replace_schema_blocks(html, &json))
}

fn validate_schema(value: &Value) -> Result<()> {
    match value {
        Value::Object(map) if map.contains_key("@type") => Ok(()),
        Value::Object(_) => Err(HorusError::InvalidSchema("object has no @type".to_string())),
        Value::Array(items) if items.is_empty() => Err(HorusError::InvalidSchema("empty list".to_string())),
        Value::Array(items) => match items.iter().position(|item| item.get("@type").is_none()) {
            Some(index) => Err(HorusError::InvalidSchema(format!("item {} has no @type", index))),
            None => Ok(()),
        },
        _ => Err(HorusError::InvalidSchema("expected an object or a list".to_string())),
    }
}
