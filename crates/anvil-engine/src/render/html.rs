//! Small HTML building helpers shared by the block kinds.

use std::borrow::Cow;
use std::fmt;

/// Escape text content.
pub fn text(s: &str) -> Cow<'_, str> {
    html_escape::encode_text(s)
}

/// Escape a value placed inside a double-quoted attribute.
pub fn attr(s: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(s)
}

/// URL for an `href`/`src` attribute. Script-bearing schemes are dropped;
/// the result still needs [`attr`] escaping.
pub fn url(s: &str) -> &str {
    let trimmed = s.trim();
    let lower = trimmed
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .take(11)
        .collect::<String>()
        .to_ascii_lowercase();
    if lower.starts_with("javascript:") || lower.starts_with("vbscript:") || lower.starts_with("data:")
    {
        ""
    } else {
        trimmed
    }
}

/// Reduce a user-supplied token to characters safe in a class name.
pub fn class_token(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

/// Space-separated list of sanitized class tokens.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassList(Vec<String>);

impl ClassList {
    pub fn new(base: &str) -> Self {
        let mut list = Self::default();
        list.push(base);
        list
    }

    pub fn push(&mut self, token: &str) {
        let token = class_token(token);
        if !token.is_empty() && !self.0.contains(&token) {
            self.0.push(token);
        }
    }

    pub fn push_if(&mut self, condition: bool, token: &str) {
        if condition {
            self.push(token);
        }
    }

    /// Append every whitespace-separated token of a free-form class string.
    pub fn extend_from(&mut self, classes: &str) {
        for token in classes.split_whitespace() {
            self.push(token);
        }
    }
}

impl fmt::Display for ClassList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

/// Format a percentage with at most two decimals and no trailing zeros.
pub fn percent(value: f64) -> String {
    let formatted = format!("{value:.2}");
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}
