//! Text-level markup rewriting
//!
//! Preamble stripping, title block extraction and inline formatting. None of
//! these stages produce block placeholders.

use lazy_static::lazy_static;
use regex::Regex;

use super::protect::ProtectionTable;
use super::utils::{
    attribute_text, braced_group, bracket_group, escape_html, replace_command, skip_whitespace,
    strip_command, strip_tags,
};
use super::ConvertOptions;
use crate::core::is_escaped;

lazy_static! {
    static ref DOCUMENT_CLASS: Regex =
        Regex::new(r"\\documentclass\s*(?:\[[^\]]*\])?\s*\{[^}]*\}").unwrap();
    static ref USE_PACKAGE: Regex =
        Regex::new(r"\\(?:usepackage|RequirePackage)\s*(?:\[[^\]]*\])?\s*\{[^}]*\}").unwrap();
    static ref DOCUMENT_MARKER: Regex = Regex::new(r"\\(?:begin|end)\{document\}").unwrap();
    static ref BARE_DIRECTIVE: Regex = Regex::new(
        r"\\(?:centering|noindent|newpage|clearpage|tableofcontents|raggedright|raggedleft)\b"
    )
    .unwrap();
    static ref DEFINITION: Regex = Regex::new(
        r"\\(?:newcommand|renewcommand|providecommand|DeclareMathOperator|def)\*?"
    )
    .unwrap();
    static ref MAKETITLE: Regex = Regex::new(r"\\maketitle\b").unwrap();
    static ref AUTHOR_SEPARATOR: Regex = Regex::new(r"\s*(?:\\and\b|\\\\)\s*").unwrap();
}

/// Directives with no HTML meaning, with their argument counts.
const STYLE_DIRECTIVES: &[(&str, usize)] = &[
    ("definecolor", 3),
    ("setlength", 2),
    ("addtolength", 2),
    ("pagestyle", 1),
    ("thispagestyle", 1),
    ("pagecolor", 1),
    ("color", 1),
    ("linespread", 1),
    ("geometry", 1),
    ("bibliographystyle", 1),
    ("vspace", 1),
    ("hspace", 1),
    ("label", 1),
];

/// Inline commands that map onto a single HTML element.
const INLINE_TAGS: &[(&str, &str)] = &[
    ("textbf", "strong"),
    ("textit", "em"),
    ("emph", "em"),
    ("texttt", "code"),
    ("underline", "u"),
];

// =============================================================================
// Preamble
// =============================================================================

/// Remove declarations and directives that have no place in rendered prose.
pub fn strip_preamble(src: &str) -> String {
    let text = DOCUMENT_CLASS.replace_all(src, "");
    let text = USE_PACKAGE.replace_all(&text, "");
    let text = DOCUMENT_MARKER.replace_all(&text, "");

    let mut text = text.into_owned();
    for (name, arity) in STYLE_DIRECTIVES {
        text = strip_command(&text, name, *arity);
    }
    let text = strip_definitions(&text);
    BARE_DIRECTIVE.replace_all(&text, "").into_owned()
}

/// Remove `\newcommand`-style definitions, including their bodies.
fn strip_definitions(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut pos = 0;

    while let Some(m) = DEFINITION.find_at(src, pos) {
        let continues_name = src[m.end()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic());
        let end = if continues_name {
            None
        } else {
            definition_end(src, m.end(), m.as_str() == "\\def")
        };

        match end {
            Some(end) => {
                out.push_str(&src[pos..m.start()]);
                pos = end;
            }
            None => {
                out.push_str(&src[pos..m.end()]);
                pos = m.end();
            }
        }
    }

    out.push_str(&src[pos..]);
    out
}

/// Offset just past the body of a definition whose command ends at `pos`.
fn definition_end(src: &str, pos: usize, is_def: bool) -> Option<usize> {
    let mut p = skip_whitespace(src, pos);

    if let Some((_, end)) = braced_group(src, p) {
        p = end;
    } else if src[p..].starts_with('\\') {
        let name_len = src[p + 1..]
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .count();
        if name_len == 0 {
            return None;
        }
        p += 1 + name_len;
    } else {
        return None;
    }

    if is_def {
        // Parameter text such as `#1#2` runs up to the body.
        let bytes = src.as_bytes();
        p = (p..bytes.len()).find(|&i| bytes[i] == b'{' && !is_escaped(bytes, i))?;
    } else {
        for _ in 0..2 {
            let q = skip_whitespace(src, p);
            if let Some((_, end)) = bracket_group(src, q) {
                p = end;
            }
        }
    }

    let q = skip_whitespace(src, p);
    braced_group(src, q).map(|(_, end)| end)
}

// =============================================================================
// Title block
// =============================================================================

/// Title metadata pulled out of the body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentHeader {
    pub title: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
}

impl DocumentHeader {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.date.is_none()
    }
}

/// Remove `\title`, `\author`, `\date` and `\maketitle`, keeping the first
/// non-empty value of each field.
pub fn extract_header(src: &str) -> (String, DocumentHeader) {
    let mut header = DocumentHeader::default();
    let text = take_field(src, "title", &mut header.title);
    let text = take_field(&text, "author", &mut header.author);
    let text = take_field(&text, "date", &mut header.date);
    let text = MAKETITLE.replace_all(&text, "").into_owned();
    (text, header)
}

fn take_field(src: &str, name: &str, slot: &mut Option<String>) -> String {
    replace_command(src, name, 1, &mut |args| {
        let value = args[0].trim();
        if slot.is_none() && !value.is_empty() {
            *slot = Some(value.to_string());
        }
        String::new()
    })
}

/// Join `\and`- or `\\`-separated authors with commas.
pub fn join_authors(author: &str) -> String {
    AUTHOR_SEPARATOR.replace_all(author.trim(), ", ").into_owned()
}

// =============================================================================
// Inline formatting
// =============================================================================

/// Converter state read and updated by the inline stage.
pub struct InlineState<'a> {
    /// Last footnote number used
    pub footnotes: &'a mut usize,
    pub blocks: &'a mut ProtectionTable,
    pub math: &'a ProtectionTable,
}

/// Rewrite inline formatting, links and footnotes.
///
/// Footnotes are numbered from `*state.footnotes + 1` upward. Link targets
/// carry raw math in place of placeholders, so a token shown in `\url` text
/// is not repeated in its `href`. Display math inside a footnote title is
/// folded back into its inline math token.
pub fn apply_inline_formatting(
    src: &str,
    state: &mut InlineState<'_>,
    options: &ConvertOptions,
) -> String {
    let mut text = src.to_string();
    let tables = (&*state.blocks, &*state.math);

    for (name, tag) in INLINE_TAGS {
        text = replace_command(&text, name, 1, &mut |args| {
            format!("<{0}>{1}</{0}>", tag, args[0])
        });
    }

    let link_attrs = if options.external_links_new_tab {
        r#" target="_blank" rel="noopener noreferrer""#
    } else {
        ""
    };

    text = replace_command(&text, "href", 2, &mut |args| {
        format!(
            r#"<a href="{}"{}>{}</a>"#,
            link_target(&raw_target(&args[0], tables)),
            link_attrs,
            args[1]
        )
    });
    text = replace_command(&text, "url", 1, &mut |args| {
        format!(
            r#"<a href="{}"{}>{}</a>"#,
            link_target(&raw_target(&args[0], tables)),
            link_attrs,
            escape_html(&unescape_url(&args[0]))
        )
    });

    let footnotes = &mut *state.footnotes;
    let blocks = &mut *state.blocks;
    text = replace_command(&text, "footnote", 1, &mut |args| {
        *footnotes += 1;
        let note = blocks.take_expanded(&args[0]);
        format!(
            r#"<sup class="footnote" title="{}">[{}]</sup>"#,
            attribute_text(&note),
            footnotes
        )
    });

    text
}

fn unescape_url(url: &str) -> String {
    url.trim()
        .replace("\\_", "_")
        .replace("\\%", "%")
        .replace("\\#", "#")
        .replace("\\&", "&")
}

/// Replace placeholders in a link target with the source they stand for.
fn raw_target(url: &str, (blocks, math): (&ProtectionTable, &ProtectionTable)) -> String {
    math.expand(&strip_tags(&blocks.expand(url)))
}

fn link_target(url: &str) -> String {
    unescape_url(url)
        .replace('"', "%22")
        .replace('<', "%3C")
        .replace('>', "%3E")
}
