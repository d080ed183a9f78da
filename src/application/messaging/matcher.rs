//! Pattern matcher - Compiles `{placeholder}` patterns and extracts captures

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::application::errors::PatternError;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(\w+)\}").expect("placeholder regex is valid"));

/// How literal patterns (no placeholders) compare against message text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteralMode {
    /// Whole text must equal the pattern, ignoring case
    #[default]
    Exact,
    /// Pattern may appear anywhere in the text, ignoring case
    Substring,
}

/// Named captures in placeholder order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matches {
    entries: Vec<(String, String)>,
}

impl Matches {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Capture values in placeholder order
    pub fn values(&self) -> Vec<String> {
        self.entries.iter().map(|(_, v)| v.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone)]
enum Compiled {
    Expression { regex: Regex, names: Vec<String> },
    Literal { lowered: String, mode: LiteralMode },
}

/// A compiled human-authored pattern such as `I am {name} the {attribute}`
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    compiled: Compiled,
}

impl Pattern {
    pub fn compile(source: impl Into<String>, mode: LiteralMode) -> Result<Self, PatternError> {
        let source = source.into();
        if source.trim().is_empty() {
            return Err(PatternError::Empty);
        }

        if !PLACEHOLDER.is_match(&source) {
            return Ok(Self {
                compiled: Compiled::Literal {
                    lowered: source.to_lowercase(),
                    mode,
                },
                source,
            });
        }

        let mut expr = String::from("(?s)^");
        let mut names: Vec<String> = Vec::new();
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(&source) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let name = name.as_str().to_string();
            if names.contains(&name) {
                return Err(PatternError::DuplicatePlaceholder(name));
            }
            expr.push_str(&regex_lite::escape(&source[last..whole.start()].to_lowercase()));
            expr.push_str("(.+)");
            names.push(name);
            last = whole.end();
        }
        expr.push_str(&regex_lite::escape(&source[last..].to_lowercase()));
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|e| PatternError::Invalid(e.to_string()))?;
        Ok(Self {
            source,
            compiled: Compiled::Expression { regex, names },
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Placeholder names in declaration order
    pub fn placeholders(&self) -> &[String] {
        match &self.compiled {
            Compiled::Expression { names, .. } => names,
            Compiled::Literal { .. } => &[],
        }
    }

    /// Match the whole message text, returning captures on success
    pub fn captures(&self, text: &str) -> Option<Matches> {
        match &self.compiled {
            Compiled::Literal { lowered, mode } => {
                let text = text.to_lowercase();
                let hit = match mode {
                    LiteralMode::Exact => text == *lowered,
                    LiteralMode::Substring => text.contains(lowered.as_str()),
                };
                hit.then(Matches::default)
            }
            Compiled::Expression { regex, names } => {
                let (lowered, offsets) = fold_case(text);
                let caps = regex.captures(&lowered)?;
                let entries = names
                    .iter()
                    .enumerate()
                    .map(|(i, name)| {
                        let value = caps
                            .get(i + 1)
                            .map(|m| &text[offsets[m.start()]..offsets[m.end()]])
                            .unwrap_or_default();
                        (name.clone(), value.to_string())
                    })
                    .collect();
                Some(Matches { entries })
            }
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.captures(text).is_some()
    }
}

/// Unicode-lowercase `text`, with the original byte offset of every lowered byte
///
/// regex-lite only folds ASCII case, so expression patterns match on this folded
/// text and captures are sliced back out of the original.
fn fold_case(text: &str) -> (String, Vec<usize>) {
    let mut lowered = String::with_capacity(text.len());
    let mut offsets = Vec::with_capacity(text.len() + 1);
    for (i, c) in text.char_indices() {
        for l in c.to_lowercase() {
            offsets.extend(std::iter::repeat(i).take(l.len_utf8()));
            lowered.push(l);
        }
    }
    offsets.push(text.len());
    (lowered, offsets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(src: &str) -> Pattern {
        Pattern::compile(src, LiteralMode::Exact).unwrap()
    }

    #[test]
    fn test_single_placeholder_ignores_case() {
        let matches = pattern("hi {name}").captures("Hi Julia").unwrap();
        assert_eq!(matches.get("name"), Some("Julia"));
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_multiple_placeholders_are_disjoint() {
        let matches = pattern("I am {name} the {attribute}")
            .captures("I am Gandalf the grey")
            .unwrap();
        assert_eq!(matches.get("name"), Some("Gandalf"));
        assert_eq!(matches.get("attribute"), Some("grey"));
        assert_eq!(matches.values(), vec!["Gandalf", "grey"]);
    }

    #[test]
    fn test_literal_mismatch() {
        assert!(!pattern("foo").is_match("bar"));
        assert!(pattern("foo").is_match("FOO"));
    }

    #[test]
    fn test_literal_exact_vs_substring() {
        let exact = pattern("help");
        let substring = Pattern::compile("help", LiteralMode::Substring).unwrap();
        assert!(!exact.is_match("please help me"));
        assert!(substring.is_match("please HELP me"));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let p = pattern("what is {a}+{b}?");
        let matches = p.captures("what is 1+2?").unwrap();
        assert_eq!(matches.get("a"), Some("1"));
        assert_eq!(matches.get("b"), Some("2"));
        assert!(!p.is_match("what is 1 2"));
    }

    #[test]
    fn test_anchored_to_whole_text() {
        let p = pattern("hi {name}");
        assert!(!p.is_match("oh hi Julia"));
        assert!(!p.is_match("hi "));
    }

    #[test]
    fn test_non_ascii_case_folds_like_literals() {
        let p = pattern("héllo {name}");
        let matches = p.captures("HÉLLO Björn").unwrap();
        assert_eq!(matches.get("name"), Some("Björn"));
        assert!(pattern("héllo").is_match("HÉLLO"));
    }

    #[test]
    fn test_duplicate_placeholder_rejected() {
        let err = Pattern::compile("{a} and {a}", LiteralMode::Exact).unwrap_err();
        assert!(matches!(err, PatternError::DuplicatePlaceholder(name) if name == "a"));
    }

    #[test]
    fn test_empty_pattern_rejected() {
        assert!(matches!(
            Pattern::compile("  ", LiteralMode::Exact),
            Err(PatternError::Empty)
        ));
    }
}
