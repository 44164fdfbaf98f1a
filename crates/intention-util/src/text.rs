//! Text Helpers
//!
//! Fuzzy search, JSON detection and capitalization.

use regex::RegexBuilder;

/// Items containing every character of `needle`, in order, ignoring case
///
/// `"ftb"` matches `"FooTBar"` and `"fat bob"`. An empty needle matches
/// everything.
pub fn fuzzy<'a, S: AsRef<str>>(needle: &str, haystack: &'a [S]) -> Vec<&'a S> {
    let pattern = needle
        .chars()
        .map(|c| regex::escape(c.encode_utf8(&mut [0; 4])))
        .collect::<Vec<_>>()
        .join(".*?");
    
    let regex = match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(regex) => regex,
        Err(err) => {
            tracing::warn!("Fuzzy pattern for {:?} rejected: {}", needle, err);
            return Vec::new();
        }
    };
    
    haystack.iter().filter(|item| regex.is_match(item.as_ref())).collect()
}

/// Check whether `text` parses as JSON
pub fn is_json(text: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(text).is_ok()
}

/// Uppercase the first character
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_fuzzy_in_order() {
        let items = ["FooTBar", "fat bob", "bft", "football"];
        
        let found = fuzzy("ftb", &items);
        assert_eq!(found, vec![&"FooTBar", &"fat bob", &"football"]);
    }
    
    #[test]
    fn test_fuzzy_escapes_metacharacters() {
        let items = ["a.b", "axb", "(x)"];
        
        assert_eq!(fuzzy(".", &items), vec![&"a.b"]);
        assert_eq!(fuzzy("()", &items), vec![&"(x)"]);
    }
    
    #[test]
    fn test_fuzzy_empty_needle() {
        let items = vec!["one".to_string(), "two".to_string()];
        assert_eq!(fuzzy("", &items).len(), 2);
    }
    
    #[test]
    fn test_is_json() {
        assert!(is_json(r#"{"a": [1, 2]}"#));
        assert!(is_json("42"));
        assert!(!is_json("{a: 1}"));
        assert!(!is_json(""));
    }
    
    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("intention"), "Intention");
        assert_eq!(capitalize("émile"), "Émile");
        assert_eq!(capitalize(""), "");
    }
}
