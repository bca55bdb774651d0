//! Placeholder ledger for protected fragments
//!
//! Each table mints tokens like `__BLK_0__` / `__MTH_0__`. Tokens use only
//! ASCII letters, digits and underscores so they pass through regex
//! rewriting and HTML sanitization untouched.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::{debug, warn};

lazy_static! {
    static ref TOKEN: Regex = Regex::new(r"__[A-Z]+_\d+__").unwrap();
}

pub const BLOCK_PREFIX: &str = "BLK";
pub const MATH_PREFIX: &str = "MTH";

/// Ordered map from placeholder token to the fragment it stands for.
#[derive(Debug, Clone)]
pub struct ProtectionTable {
    prefix: &'static str,
    entries: IndexMap<String, String>,
    next: usize,
}

impl ProtectionTable {
    pub fn new(prefix: &'static str) -> Self {
        ProtectionTable {
            prefix,
            entries: IndexMap::new(),
            next: 0,
        }
    }

    /// Table for block HTML, resolved before sanitization
    pub fn blocks() -> Self {
        Self::new(BLOCK_PREFIX)
    }

    /// Table for raw math source, resolved by the caller after sanitization
    pub fn math() -> Self {
        Self::new(MATH_PREFIX)
    }

    /// Store `value` and return the token that now stands for it.
    pub fn insert(&mut self, value: impl Into<String>) -> String {
        let token = format!("__{}_{}__", self.prefix, self.next);
        self.next += 1;
        self.entries.insert(token.clone(), value.into());
        token
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace this table's tokens in `text` with their fragments.
    ///
    /// Tokens the table does not hold are left as they are.
    pub fn expand(&self, text: &str) -> String {
        TOKEN
            .replace_all(text, |caps: &Captures| {
                let token = &caps[0];
                self.get(token).unwrap_or(token).to_string()
            })
            .into_owned()
    }

    /// Expand tokens like [`expand`](Self::expand) and drop the entries used.
    ///
    /// Token numbers are never reused after an entry is taken.
    pub fn take_expanded(&mut self, text: &str) -> String {
        let expanded = self.expand(text);
        for token in TOKEN.find_iter(text) {
            self.entries.shift_remove(token.as_str());
        }
        expanded
    }

    /// Substitute every token in `html` with its fragment, consuming the table.
    ///
    /// Later entries may embed earlier tokens (a list holding a display
    /// formula), so entries are applied newest first. Each token is replaced
    /// exactly once.
    pub fn resolve(self, html: String) -> String {
        let mut html = html;
        for (token, value) in self.entries.into_iter().rev() {
            if html.contains(&token) {
                html = html.replacen(&token, &value, 1);
            } else {
                warn!(%token, "placeholder missing from output; fragment dropped");
            }
        }
        html
    }

    /// Drop entries whose token no longer appears in `html`.
    pub fn retain_referenced(&mut self, html: &str) {
        let before = self.entries.len();
        self.entries.retain(|token, _| html.contains(token.as_str()));
        let dropped = before - self.entries.len();
        if dropped > 0 {
            debug!(dropped, prefix = self.prefix, "pruned unreferenced placeholders");
        }
    }

    pub fn into_map(self) -> IndexMap<String, String> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_sequential() {
        let mut table = ProtectionTable::math();
        assert_eq!(table.insert("$a$"), "__MTH_0__");
        assert_eq!(table.insert("$b$"), "__MTH_1__");
        assert_eq!(table.get("__MTH_1__"), Some("$b$"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_resolve_nested_blocks() {
        let mut table = ProtectionTable::blocks();
        let inner = table.insert("<div>math</div>");
        let outer = table.insert(format!("<ul><li>{}</li></ul>", inner));
        let html = table.resolve(format!("<p>x</p>\n{}", outer));
        assert_eq!(html, "<p>x</p>\n<ul><li><div>math</div></li></ul>");
    }

    #[test]
    fn test_token_prefix_collision() {
        let mut table = ProtectionTable::blocks();
        let mut tokens = Vec::new();
        for i in 0..11 {
            tokens.push(table.insert(format!("[{}]", i)));
        }
        let html = table.resolve(tokens.join(" "));
        assert_eq!(html, "[0] [1] [2] [3] [4] [5] [6] [7] [8] [9] [10]");
    }

    #[test]
    fn test_expand_leaves_foreign_tokens() {
        let mut math = ProtectionTable::math();
        let token = math.insert("$a$");
        let text = format!("q={}&b=__BLK_0__&c=__MTH_9__", token);
        assert_eq!(math.expand(&text), "q=$a$&b=__BLK_0__&c=__MTH_9__");
        assert_eq!(math.len(), 1);
    }

    #[test]
    fn test_take_expanded_keeps_numbering() {
        let mut blocks = ProtectionTable::blocks();
        let first = blocks.insert("<div>a</div>");
        let second = blocks.insert("<div>b</div>");
        assert_eq!(blocks.take_expanded(&format!("x {}", first)), "x <div>a</div>");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks.insert("<div>c</div>"), "__BLK_2__");
        assert_eq!(blocks.get(&second), Some("<div>b</div>"));
    }

    #[test]
    fn test_retain_referenced() {
        let mut table = ProtectionTable::math();
        let kept = table.insert("$a$");
        table.insert("$b$");
        table.retain_referenced(&format!("<p>{}</p>", kept));
        assert_eq!(table.len(), 1);
        assert!(table.get(&kept).is_some());
    }
}
