//! LaTeX analysis utilities: word count and document metrics.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::core::math_spans::{
    blank_math, delimited_spans, environment_spans, MathDelimiter, DISPLAY_MATH_ENVIRONMENTS,
};

lazy_static! {
    static ref ENV_MARKER: Regex = Regex::new(r"\\(?:begin|end)\s*\{[^{}]*\}").unwrap();
    static ref COMMAND_WITH_ARG: Regex =
        Regex::new(r"\\[A-Za-z]+\*?\s*(?:\[[^\]]*\])?\s*\{([^{}]*)\}").unwrap();
    static ref BARE_COMMAND: Regex = Regex::new(r"\\(?:[A-Za-z]+\*?|.)").unwrap();
    static ref COMMENT: Regex = Regex::new(r"(?m)(^|[^\\])%.*$").unwrap();
    static ref SPECIAL: Regex = Regex::new(r"[{}$&#^_~%\[\]]").unwrap();
    static ref ITEM: Regex = Regex::new(r"\\item\b").unwrap();
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    pub words: usize,
    pub headings: usize,
    pub equations: usize,
    pub tables: usize,
    pub list_items: usize,
    pub footnotes: usize,
}

/// Count the words a reader would see in the rendered document.
///
/// Math, environment markers, command names and special characters are
/// dropped; the text inside command arguments is kept.
pub fn word_count(source: &str) -> usize {
    if source.trim().is_empty() {
        return 0;
    }

    let text = COMMENT.replace_all(source, "$1");
    let text = blank_math(&text);
    let text = ENV_MARKER.replace_all(&text, " ");

    // Innermost arguments first, until nothing with an argument is left.
    let mut text = text.into_owned();
    loop {
        let next = COMMAND_WITH_ARG.replace_all(&text, " $1 ");
        if next == text {
            break;
        }
        text = next.into_owned();
    }

    let text = BARE_COMMAND.replace_all(&text, " ");
    let text = SPECIAL.replace_all(&text, " ");
    text.split_whitespace().count()
}

pub fn stats_source(source: &str) -> DocumentStats {
    let equations = delimited_spans(source, MathDelimiter::DoubleDollar).len()
        + delimited_spans(source, MathDelimiter::Bracket).len()
        + environment_spans(source, DISPLAY_MATH_ENVIRONMENTS).len();

    DocumentStats {
        words: word_count(source),
        headings: count_any(
            source,
            &[
                "\\section{",
                "\\section*{",
                "\\subsection{",
                "\\subsection*{",
                "\\subsubsection{",
                "\\subsubsection*{",
            ],
        ),
        equations,
        tables: count_any(source, &["\\begin{tabular}", "\\begin{tabular*}"]),
        list_items: ITEM.find_iter(source).count(),
        footnotes: count_any(source, &["\\footnote{"]),
    }
}

fn count_any(haystack: &str, needles: &[&str]) -> usize {
    needles.iter().map(|n| haystack.matches(n).count()).sum()
}
