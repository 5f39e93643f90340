//! URL slug generation for article titles.

const MAX_SLUG_CHARS: usize = 80;

/// Builds a URL slug from `text`.
///
/// Letters and digits from any script are kept (lowercased); every other run
/// of characters collapses into one `-`. The slug is capped at 80 characters.
///
/// ```rust
/// use horus_core::slugify;
///
/// assert_eq!(slugify("  Hello, World!  "), "hello-world");
/// assert_eq!(slugify("الذكاء الاصطناعي 2025"), "الذكاء-الاصطناعي-2025");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.chars().count() > MAX_SLUG_CHARS {
        slug = slug.chars().take(MAX_SLUG_CHARS).collect();
    }

    slug.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Hello World", "hello-world")]
    #[case("--Rust   &  HTML--", "rust-html")]
    #[case("مرحبا بالعالم", "مرحبا-بالعالم")]
    #[case("", "")]
    #[case("!!!", "")]
    #[case("CamelCase Title 42", "camelcase-title-42")]
    fn test_slugify(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(slugify(input), expected);
    }

    #[test]
    fn test_slug_is_capped() {
        let long = "word ".repeat(40);
        let slug = slugify(&long);
        assert!(slug.chars().count() <= MAX_SLUG_CHARS);
        assert!(!slug.ends_with('-'));
    }
}
