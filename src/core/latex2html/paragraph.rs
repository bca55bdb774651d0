//! Paragraph assembly
//!
//! Splits converted text on blank lines and block placeholders. Prose
//! segments become `<p>` elements; placeholders pass through on their own
//! line so their HTML is never wrapped in a paragraph.

use lazy_static::lazy_static;
use regex::Regex;

use super::utils::{finish_text, line_breaks};

lazy_static! {
    static ref BLOCK_TOKEN: Regex = Regex::new(r"__BLK_\d+__").unwrap();
    static ref PARAGRAPH_BREAK: Regex = Regex::new(r"\n[ \t]*\n\s*|\\par\b").unwrap();
}

/// Whether `s` is exactly one block placeholder.
pub fn is_block_token(s: &str) -> bool {
    BLOCK_TOKEN
        .find(s)
        .is_some_and(|m| m.start() == 0 && m.end() == s.len())
}

/// Assemble paragraphs and block placeholders, one unit per line.
pub fn assemble(text: &str) -> String {
    let mut units: Vec<String> = Vec::new();
    let mut last = 0;

    for token in BLOCK_TOKEN.find_iter(text) {
        push_paragraphs(&text[last..token.start()], &mut units);
        units.push(token.as_str().to_string());
        last = token.end();
    }
    push_paragraphs(&text[last..], &mut units);

    units.join("\n")
}

fn push_paragraphs(segment: &str, units: &mut Vec<String>) {
    for paragraph in PARAGRAPH_BREAK.split(segment) {
        let paragraph = paragraph.trim();
        if !paragraph.is_empty() {
            units.push(format!("<p>{}</p>", finish_text(&line_breaks(paragraph))));
        }
    }
}
