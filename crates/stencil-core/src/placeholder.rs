//! Placeholder detection for template text.
//!
//! A placeholder is a `{name}` token where `name` starts with an ASCII letter
//! or underscore, continues with letters, digits or underscores, and is at
//! most 64 characters long. Anything else in braces is ordinary text.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

/// Maximum length of a variable name, in characters.
pub const MAX_NAME_LEN: usize = 64;

static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
static NAME_RE: OnceLock<Regex> = OnceLock::new();

/// Name grammar shared by both patterns: a leading letter or underscore,
/// then up to `MAX_NAME_LEN - 1` word characters.
fn name_pattern() -> String {
    format!(r"[A-Za-z_][A-Za-z0-9_]{{0,{}}}", MAX_NAME_LEN - 1)
}

fn placeholder_re() -> &'static Regex {
    PLACEHOLDER_RE.get_or_init(|| {
        Regex::new(&format!(r"\{{({})\}}", name_pattern())).expect("placeholder pattern compiles")
    })
}

fn name_re() -> &'static Regex {
    NAME_RE.get_or_init(|| {
        Regex::new(&format!("^{}$", name_pattern())).expect("name pattern compiles")
    })
}

/// Extract placeholder names from `text`, in order of first appearance,
/// without duplicates.
pub fn extract(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    placeholder_re()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

/// Whether `name` can be used as a variable name.
pub fn is_valid_name(name: &str) -> bool {
    name_re().is_match(name)
}

/// Remove every placeholder occurrence from `text`.
pub fn strip_placeholders(text: &str) -> String {
    placeholder_re().replace_all(text, "").into_owned()
}

/// The literal token a variable is referenced by, e.g. `{order_id}`.
pub fn token(name: &str) -> String {
    format!("{{{}}}", name)
}

/// Replace each placeholder whose name `resolve` knows with the returned
/// value. Placeholders `resolve` returns `None` for are kept verbatim.
pub fn substitute<F>(text: &str, mut resolve: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    placeholder_re()
        .replace_all(text, |caps: &regex::Captures| {
            resolve(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_in_order_of_appearance() {
        assert_eq!(
            extract("Hello {name}, your {order_id} is ready"),
            vec!["name", "order_id"]
        );
    }

    #[test]
    fn test_extract_skips_invalid_tokens() {
        let text = "{1abc} {a} {toolong_name_that_exceeds_the_sixty_four_character_identifier_limit_xx}";
        assert_eq!(extract(text), vec!["a"]);
    }

    #[test]
    fn test_extract_collapses_duplicates() {
        assert_eq!(extract("{b} {a} {b} {a} {c}"), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_extract_length_bounds() {
        let max = format!("{{{}}}", "x".repeat(MAX_NAME_LEN));
        let over = format!("{{{}}}", "x".repeat(MAX_NAME_LEN + 1));
        assert_eq!(extract(&max).len(), 1);
        assert!(extract(&over).is_empty());
    }

    #[test]
    fn test_extract_ignores_malformed_braces() {
        assert!(extract("{} {has space} {dash-name} {open").is_empty());
        assert!(extract("no placeholders here").is_empty());
        assert_eq!(extract("{{nested}}"), vec!["nested"]);
    }

    #[test]
    fn test_is_valid_name() {
        assert!(is_valid_name("a"));
        assert!(is_valid_name("_private"));
        assert!(is_valid_name("order_id2"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("2fast"));
        assert!(!is_valid_name("with space"));
        assert!(!is_valid_name("{braced}"));
        assert!(!is_valid_name(&"y".repeat(MAX_NAME_LEN + 1)));
    }

    #[test]
    fn test_strip_placeholders_keeps_other_text() {
        assert_eq!(strip_placeholders("Process {a} and {b}"), "Process  and ");
        assert_eq!(strip_placeholders("{a}{b}"), "");
        assert_eq!(strip_placeholders("{1abc} stays"), "{1abc} stays");
    }

    #[test]
    fn test_substitute_leaves_unknown_placeholders() {
        let out = substitute("Ship {item} to {city}", |name| {
            (name == "item").then(|| "books".to_string())
        });
        assert_eq!(out, "Ship books to {city}");
    }
}
