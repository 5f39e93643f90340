pub mod json;
pub mod text;

pub use json::{JsonConfig, JsonFormatter, articles_to_json};
pub use text::{TextConfig, TextFormatter, articles_to_text, convert_to_text};
