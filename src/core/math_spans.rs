//! Math-mode span detection
//!
//! Locates `$$...$$`, `\[...\]`, `\(...\)`, `$...$` and named math
//! environments in raw LaTeX. The validator strips or blanks these spans,
//! the converter swaps them for placeholder tokens, and word counting
//! drops them entirely.
//!
//! The regex crate has no lookbehind and no backreferences, so escape
//! detection and same-name `\begin{X}`/`\end{X}` pairing are done by hand.

use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;

use super::is_escaped;

/// Math environments treated as math context when looking for stray math commands.
pub const MATH_CONTEXT_ENVIRONMENTS: &[&str] = &[
    "equation",
    "align",
    "gather",
    "math",
    "displaymath",
    "multline",
];

/// Math environments the converter lifts out as display blocks.
pub const DISPLAY_MATH_ENVIRONMENTS: &[&str] = &["align", "equation", "gather", "multline"];

lazy_static! {
    static ref BEGIN_ENV: Regex = Regex::new(r"\\begin\{([A-Za-z]+)(\*?)\}").unwrap();
}

/// Delimiter pairs that open and close a math span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathDelimiter {
    /// `$$ ... $$`
    DoubleDollar,
    /// `\[ ... \]`
    Bracket,
    /// `\( ... \)`
    Paren,
    /// `$ ... $`
    Dollar,
}

impl MathDelimiter {
    pub fn open(self) -> &'static str {
        match self {
            MathDelimiter::DoubleDollar => "$$",
            MathDelimiter::Bracket => "\\[",
            MathDelimiter::Paren => "\\(",
            MathDelimiter::Dollar => "$",
        }
    }

    pub fn close(self) -> &'static str {
        match self {
            MathDelimiter::DoubleDollar => "$$",
            MathDelimiter::Bracket => "\\]",
            MathDelimiter::Paren => "\\)",
            MathDelimiter::Dollar => "$",
        }
    }

    /// Whether the span renders on its own line.
    pub fn is_display(self) -> bool {
        matches!(self, MathDelimiter::DoubleDollar | MathDelimiter::Bracket)
    }
}

/// Find non-overlapping spans for one delimiter kind, in source order.
///
/// Each span covers the delimiters themselves. An opener without a closer
/// ends the search; empty bodies are skipped.
pub fn delimited_spans(src: &str, delim: MathDelimiter) -> Vec<Range<usize>> {
    let (open, close) = (delim.open(), delim.close());
    let bytes = src.as_bytes();
    let mut spans = Vec::new();
    let mut pos = 0;

    while let Some(rel) = src[pos..].find(open) {
        let start = pos + rel;
        if is_escaped(bytes, start) {
            pos = start + 1;
            continue;
        }
        let body_start = start + open.len();
        match find_unescaped(src, body_start, close) {
            Some(close_at) if close_at > body_start => {
                let end = close_at + close.len();
                spans.push(start..end);
                pos = end;
            }
            Some(_) => pos = body_start,
            None => break,
        }
    }

    spans
}

/// Find `\begin{name}...\end{name}` spans (starred variants included) for the given names.
///
/// The end tag must repeat the exact name of the begin tag, star and all.
/// An unterminated begin tag is skipped.
pub fn environment_spans(src: &str, names: &[&str]) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut pos = 0;

    while let Some(caps) = BEGIN_ENV.captures_at(src, pos) {
        let Some(begin) = caps.get(0) else { break };
        let name = &caps[1];
        if !names.contains(&name) {
            pos = begin.end();
            continue;
        }
        let end_tag = format!("\\end{{{}{}}}", name, &caps[2]);
        match src[begin.end()..].find(&end_tag) {
            Some(rel) => {
                let end = begin.end() + rel + end_tag.len();
                spans.push(begin.start()..end);
                pos = end;
            }
            None => pos = begin.end(),
        }
    }

    spans
}

/// Rebuild `src` with every span replaced by the output of `replace`.
///
/// Spans must be sorted and non-overlapping.
pub fn replace_spans<F>(src: &str, spans: &[Range<usize>], mut replace: F) -> String
where
    F: FnMut(&str) -> String,
{
    let mut out = String::with_capacity(src.len());
    let mut last = 0;
    for span in spans {
        out.push_str(&src[last..span.start]);
        out.push_str(&replace(&src[span.clone()]));
        last = span.end;
    }
    out.push_str(&src[last..]);
    out
}

/// Remove `$$...$$`, `\[...\]` and `\(...\)` spans.
///
/// What remains still holds any single-dollar inline math.
pub fn strip_paired_math(src: &str) -> String {
    let mut text = src.to_string();
    for delim in [
        MathDelimiter::DoubleDollar,
        MathDelimiter::Bracket,
        MathDelimiter::Paren,
    ] {
        let spans = delimited_spans(&text, delim);
        text = replace_spans(&text, &spans, |_| String::new());
    }
    text
}

/// Replace every math span with a single space, leaving prose only.
pub fn blank_math(src: &str) -> String {
    let mut text = src.to_string();

    let spans = delimited_spans(&text, MathDelimiter::DoubleDollar);
    text = replace_spans(&text, &spans, |_| " ".to_string());

    let spans = environment_spans(&text, MATH_CONTEXT_ENVIRONMENTS);
    text = replace_spans(&text, &spans, |_| " ".to_string());

    for delim in [
        MathDelimiter::Bracket,
        MathDelimiter::Paren,
        MathDelimiter::Dollar,
    ] {
        let spans = delimited_spans(&text, delim);
        text = replace_spans(&text, &spans, |_| " ".to_string());
    }

    text
}

/// Count unescaped `$` characters that are not part of a `$$` pair.
pub fn count_lone_dollars(src: &str) -> usize {
    let bytes = src.as_bytes();
    (0..bytes.len())
        .filter(|&i| bytes[i] == b'$')
        .filter(|&i| !is_escaped(bytes, i))
        .filter(|&i| i == 0 || bytes[i - 1] != b'$')
        .filter(|&i| i + 1 >= bytes.len() || bytes[i + 1] != b'$')
        .count()
}

fn find_unescaped(src: &str, from: usize, pat: &str) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut pos = from;
    while let Some(rel) = src[pos..].find(pat) {
        let at = pos + rel;
        if !is_escaped(bytes, at) {
            return Some(at);
        }
        pos = at + 1;
    }
    None
}
