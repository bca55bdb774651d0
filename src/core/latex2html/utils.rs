//! Argument scanning and text helpers for LaTeX to HTML conversion
//!
//! These are pure functions over strings; none of them touch converter state.

use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;

use crate::core::is_escaped;

lazy_static! {
    static ref BEGIN_TAG: Regex = Regex::new(r"\\begin\{([A-Za-z]+\*?)\}").unwrap();
    static ref LINE_BREAK: Regex =
        Regex::new(r"\\\\(?:\[[^\]]*\])?|\\newline\b|\\linebreak\b").unwrap();
    static ref TEXT_SYMBOL: Regex =
        Regex::new(r"\\(&|%|#|_|ldots\b|dots\b|LaTeX\b|TeX\b)(?:\{\})?").unwrap();
    static ref HTML_TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
}

// =============================================================================
// Argument scanning
// =============================================================================

/// Read a balanced `{...}` group whose opening brace sits at `pos`.
///
/// Returns the inner text and the offset just past the closing brace.
pub fn braced_group(src: &str, pos: usize) -> Option<(&str, usize)> {
    let bytes = src.as_bytes();
    if bytes.get(pos) != Some(&b'{') || is_escaped(bytes, pos) {
        return None;
    }
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(pos) {
        if (b == b'{' || b == b'}') && is_escaped(bytes, i) {
            continue;
        }
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&src[pos + 1..i], i + 1));
                }
            }
            _ => {}
        }
    }
    None
}

/// Read a `[...]` group whose opening bracket sits at `pos`.
pub fn bracket_group(src: &str, pos: usize) -> Option<(&str, usize)> {
    if src.as_bytes().get(pos) != Some(&b'[') {
        return None;
    }
    let close = src[pos..].find(']')? + pos;
    Some((&src[pos + 1..close], close + 1))
}

pub fn skip_whitespace(src: &str, pos: usize) -> usize {
    let rest = &src[pos..];
    pos + (rest.len() - rest.trim_start().len())
}

/// Parse the arguments that follow a command name.
///
/// Accepts an optional `*`, an optional `[...]` (discarded) and then
/// exactly `arity` braced groups. Whitespace may separate them.
pub fn parse_arguments(src: &str, pos: usize, arity: usize) -> Option<(Vec<&str>, usize)> {
    let (spans, end) = argument_spans(src, pos, arity)?;
    Some((spans.into_iter().map(|span| &src[span]).collect(), end))
}

/// Like [`parse_arguments`], returning the byte range of each argument.
fn argument_spans(src: &str, pos: usize, arity: usize) -> Option<(Vec<Range<usize>>, usize)> {
    let mut p = pos;
    if src[p..].starts_with('*') {
        p += 1;
    }
    let q = skip_whitespace(src, p);
    if let Some((_, end)) = bracket_group(src, q) {
        p = end;
    }

    let mut spans = Vec::with_capacity(arity);
    for _ in 0..arity {
        let q = skip_whitespace(src, p);
        let (_, end) = braced_group(src, q)?;
        spans.push(q + 1..end - 1);
        p = end;
    }
    Some((spans, p))
}

/// Offsets of the next `pattern` command at or after `pos`, skipping
/// escaped occurrences and longer names sharing the prefix.
fn next_command(src: &str, pattern: &str, pos: usize) -> Option<(usize, usize)> {
    let bytes = src.as_bytes();
    let mut pos = pos;
    while let Some(rel) = src[pos..].find(pattern) {
        let start = pos + rel;
        let after_name = start + pattern.len();
        let continues_name = src[after_name..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic());
        if !continues_name && !is_escaped(bytes, start) {
            return Some((start, after_name));
        }
        pos = after_name;
    }
    None
}

/// A region of the source being rewritten: the whole input or one argument.
struct Segment {
    pos: usize,
    limit: usize,
    out: String,
}

impl Segment {
    fn new(range: Range<usize>) -> Self {
        Segment {
            pos: range.start,
            limit: range.end,
            out: String::with_capacity(range.len()),
        }
    }
}

/// A command whose arguments are being rewritten.
struct PendingCall {
    /// Remaining argument ranges, last argument first
    remaining: Vec<Range<usize>>,
    rendered: Vec<String>,
}

/// Replace every `\name{a1}...{an}` with the output of `render`.
///
/// Arguments are rewritten before `render` sees them, so nested uses of
/// the same command are handled; `render` runs in order of each command's
/// closing brace. Nesting depth is tracked on the heap. A command whose
/// arguments are missing or unbalanced is left untouched.
pub fn replace_command<F>(src: &str, name: &str, arity: usize, render: &mut F) -> String
where
    F: FnMut(&[String]) -> String,
{
    let pattern = format!("\\{}", name);
    let mut segments = vec![Segment::new(0..src.len())];
    let mut calls: Vec<PendingCall> = Vec::new();

    while let Some(segment) = segments.last_mut() {
        let scope = &src[..segment.limit];
        if let Some((start, after_name)) = next_command(scope, &pattern, segment.pos) {
            match argument_spans(scope, after_name, arity) {
                Some((mut spans, end)) => {
                    segment.out.push_str(&src[segment.pos..start]);
                    segment.pos = end;
                    spans.reverse();
                    match spans.pop() {
                        Some(first) => {
                            calls.push(PendingCall {
                                remaining: spans,
                                rendered: Vec::with_capacity(arity),
                            });
                            segments.push(Segment::new(first));
                        }
                        None => segment.out.push_str(&render(&[])),
                    }
                }
                None => {
                    segment.out.push_str(&src[segment.pos..after_name]);
                    segment.pos = after_name;
                }
            }
            continue;
        }

        segment.out.push_str(&src[segment.pos..segment.limit]);
        let Some(finished) = segments.pop() else {
            break;
        };
        let Some(call) = calls.last_mut() else {
            return finished.out;
        };
        call.rendered.push(finished.out);
        if let Some(next) = call.remaining.pop() {
            segments.push(Segment::new(next));
        } else if let (Some(call), Some(parent)) = (calls.pop(), segments.last_mut()) {
            parent.out.push_str(&render(&call.rendered));
        }
    }

    src.to_string()
}

/// Remove every `\name{...}` (with `arity` arguments).
pub fn strip_command(src: &str, name: &str, arity: usize) -> String {
    replace_command(src, name, arity, &mut |_| String::new())
}

// =============================================================================
// Environment scanning
// =============================================================================

/// A located `\begin{name} ... \end{name}` region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentMatch {
    pub name: String,
    /// From `\begin` through the end of `\end{name}`
    pub span: Range<usize>,
    /// Between the begin and end tags
    pub body: Range<usize>,
}

/// Rewrite environments in `names`, innermost first.
///
/// The rightmost remaining `\begin` is always handled next, so an
/// environment nested inside another of the listed kinds has already
/// been replaced by the time its parent body is rendered. Unterminated
/// environments are left as raw text.
pub fn rewrite_environments<F>(src: &str, names: &[&str], mut render: F) -> String
where
    F: FnMut(&str, &str) -> String,
{
    let mut text = src.to_string();
    let mut limit = text.len();

    while let Some(found) = last_environment(&text, names, limit) {
        match found {
            Ok(env) => {
                let replacement = render(&env.name, &text[env.body.clone()]);
                text.replace_range(env.span.clone(), &replacement);
                limit = env.span.start;
            }
            Err(begin_at) => limit = begin_at,
        }
    }

    text
}

/// Locate the rightmost `\begin` of a listed environment starting before `limit`.
///
/// `Err(start)` means the begin tag at `start` has no matching end tag.
fn last_environment(
    src: &str,
    names: &[&str],
    limit: usize,
) -> Option<Result<EnvironmentMatch, usize>> {
    let caps = BEGIN_TAG
        .captures_iter(&src[..limit])
        .filter(|caps| names.contains(&&caps[1]))
        .last()?;
    let begin = caps.get(0)?;
    let name = caps[1].to_string();
    let end_tag = format!("\\end{{{}}}", name);

    let Some(rel) = src[begin.end()..].find(&end_tag) else {
        return Some(Err(begin.start()));
    };
    let body_end = begin.end() + rel;
    Some(Ok(EnvironmentMatch {
        name,
        span: begin.start()..body_end + end_tag.len(),
        body: begin.end()..body_end,
    }))
}

// =============================================================================
// Text rendering
// =============================================================================

/// Render escaped characters and text-mode symbols.
pub fn finish_text(text: &str) -> String {
    TEXT_SYMBOL
        .replace_all(text, |caps: &regex::Captures| {
            match &caps[1] {
                "&" => "&amp;",
                "%" => "%",
                "#" => "#",
                "_" => "_",
                "ldots" | "dots" => "\u{2026}",
                "LaTeX" => "LaTeX",
                _ => "TeX",
            }
            .to_string()
        })
        .into_owned()
}

/// Turn `\\`, `\newline` and `\linebreak` into `<br>`.
pub fn line_breaks(text: &str) -> String {
    LINE_BREAK.replace_all(text, "<br>").into_owned()
}

/// Escape text for an HTML text node.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Drop every HTML tag, keeping the text between them.
pub fn strip_tags(html: &str) -> String {
    HTML_TAG.replace_all(html, "").into_owned()
}

/// Flatten rendered HTML into plain text for an attribute value.
pub fn attribute_text(html: &str) -> String {
    let plain = strip_tags(html);
    let mut out = String::with_capacity(plain.len());
    for ch in plain.trim().chars() {
        match ch {
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}
