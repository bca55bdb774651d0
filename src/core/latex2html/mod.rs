//! LaTeX to HTML converter
//!
//! Rewrites LaTeX source into an HTML fragment for in-browser preview.
//! Math is swapped for placeholder tokens before anything else touches the
//! text, so it survives both the rewriting stages and an external HTML
//! sanitizer. The caller restores it afterwards from
//! [`ConversionResult::math_map`].
//!
//! Stages run in a fixed order:
//! 1. preamble strip
//! 2. math protection
//! 3. title block extraction
//! 4. inline formatting, links, footnotes
//! 5. sectioning
//! 6. code listings
//! 7. quotations
//! 8. tables
//! 9. lists
//! 10. paragraph assembly
//! 11. block placeholder resolution

mod environment;
mod markup;
mod paragraph;
pub mod protect;
pub mod table;
pub mod utils;

use std::fmt::Write;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::math_spans::{
    delimited_spans, environment_spans, replace_spans, MathDelimiter, DISPLAY_MATH_ENVIRONMENTS,
};
use environment::{CODE_ENVIRONMENTS, LIST_ENVIRONMENTS, QUOTE_ENVIRONMENTS};
use markup::DocumentHeader;
use protect::ProtectionTable;
use table::{TABLE_ENVIRONMENTS, TABULAR_ENVIRONMENTS};
use utils::{finish_text, line_breaks, replace_command, rewrite_environments};

pub use markup::{extract_header, strip_preamble};
pub use paragraph::{assemble, is_block_token};

/// Heading commands and the element each one becomes.
const SECTION_LEVELS: &[(&str, &str)] = &[
    ("section", "h2"),
    ("subsection", "h3"),
    ("subsubsection", "h4"),
];

// =============================================================================
// LaTeX → HTML Conversion Options
// =============================================================================

/// Options for LaTeX to HTML conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Render `\title`/`\author`/`\date` as a header above the body.
    /// The commands are removed either way.
    /// Default: true
    pub render_header: bool,

    /// Open `\href`/`\url` links in a new tab.
    /// Default: true
    pub external_links_new_tab: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            render_header: true,
            external_links_new_tab: true,
        }
    }
}

/// Output of one conversion.
///
/// `html` has every block resolved but still holds the math tokens listed
/// in `math_map`. Each key appears exactly once in `html`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub html: String,
    pub math_map: IndexMap<String, String>,
}

impl ConversionResult {
    /// The HTML with every math token replaced by its source.
    ///
    /// Only safe to render when no sanitizer has to run in between.
    pub fn restored_html(&self) -> String {
        crate::preview::restore_math(&self.html, &self.math_map)
    }
}

/// Convert LaTeX to an HTML fragment with default options.
///
/// # Example
///
/// ```
/// use texpreview::convert;
///
/// let result = convert("Hello $x+1$ world");
/// assert_eq!(result.html, "<p>Hello __MTH_0__ world</p>");
/// assert_eq!(result.math_map["__MTH_0__"], "$x+1$");
/// ```
pub fn convert(latex: &str) -> ConversionResult {
    convert_with_options(latex, &ConvertOptions::default())
}

/// Convert LaTeX to an HTML fragment.
pub fn convert_with_options(latex: &str, options: &ConvertOptions) -> ConversionResult {
    if latex.is_empty() {
        return ConversionResult::default();
    }
    HtmlConverter::new(options.clone()).convert_document(latex)
}

/// Per-call conversion state: the two placeholder tables and the footnote counter.
struct HtmlConverter {
    options: ConvertOptions,
    blocks: ProtectionTable,
    math: ProtectionTable,
    footnotes: usize,
}

impl HtmlConverter {
    fn new(options: ConvertOptions) -> Self {
        HtmlConverter {
            options,
            blocks: ProtectionTable::blocks(),
            math: ProtectionTable::math(),
            footnotes: 0,
        }
    }

    fn convert_document(mut self, input: &str) -> ConversionResult {
        let text = strip_preamble(input);
        trace!(len = text.len(), "preamble stripped");

        let text = self.protect_math(&text);
        trace!(math = self.math.len(), "math protected");

        let (text, header) = extract_header(&text);
        let header_html = if self.options.render_header && !header.is_empty() {
            self.render_header(&header)
        } else {
            String::new()
        };

        let text = self.inline_formatting(&text);
        let text = self.convert_sections(&text);
        let text = self.convert_code_blocks(&text);
        let text = self.convert_quotes(&text);
        let text = self.convert_tables(&text);
        let text = self.convert_lists(&text);
        trace!(blocks = self.blocks.len(), "block environments converted");

        let body = assemble(&text);
        let html = match (header_html.is_empty(), body.is_empty()) {
            (true, _) => body,
            (false, true) => header_html,
            (false, false) => format!("{}\n{}", header_html, body),
        };

        let html = std::mem::replace(&mut self.blocks, ProtectionTable::blocks()).resolve(html);
        self.math.retain_referenced(&html);

        debug!(
            html_len = html.len(),
            math = self.math.len(),
            footnotes = self.footnotes,
            "converted LaTeX to HTML"
        );

        ConversionResult {
            html,
            math_map: self.math.into_map(),
        }
    }

    /// Swap math for tokens: display forms first, then inline.
    fn protect_math(&mut self, text: &str) -> String {
        let mut text = text.to_string();

        for delim in [MathDelimiter::DoubleDollar, MathDelimiter::Bracket] {
            text = self.protect_delimited(&text, delim);
        }

        let spans = environment_spans(&text, DISPLAY_MATH_ENVIRONMENTS);
        text = replace_spans(&text, &spans, |raw| self.protect_display_math(raw));

        for delim in [MathDelimiter::Paren, MathDelimiter::Dollar] {
            text = self.protect_delimited(&text, delim);
        }

        text
    }

    fn protect_delimited(&mut self, text: &str, delim: MathDelimiter) -> String {
        let spans = delimited_spans(text, delim);
        replace_spans(text, &spans, |raw| {
            if delim.is_display() {
                self.protect_display_math(raw)
            } else {
                self.math.insert(raw)
            }
        })
    }

    /// Display math keeps its source in the math table and gets a block of its own.
    fn protect_display_math(&mut self, raw: &str) -> String {
        let token = self.math.insert(raw);
        self.blocks
            .insert(format!("<div class=\"math-display\">{}</div>", token))
    }

    fn inline_text(&mut self, text: &str) -> String {
        let text = self.inline_formatting(text);
        finish_text(&line_breaks(&text))
    }

    fn render_header(&mut self, header: &DocumentHeader) -> String {
        let mut html = String::from("<header class=\"document-header\">\n");
        if let Some(title) = &header.title {
            let title = self.inline_text(title);
            let _ = writeln!(html, "<h1 class=\"document-title\">{}</h1>", title);
        }
        if let Some(author) = &header.author {
            let author = self.inline_text(&markup::join_authors(author));
            let _ = writeln!(html, "<p class=\"document-author\">{}</p>", author);
        }
        if let Some(date) = &header.date {
            let date = self.inline_text(date);
            let _ = writeln!(html, "<p class=\"document-date\">{}</p>", date);
        }
        html.push_str("</header>");
        html
    }

    fn inline_formatting(&mut self, text: &str) -> String {
        let mut state = markup::InlineState {
            footnotes: &mut self.footnotes,
            blocks: &mut self.blocks,
            math: &self.math,
        };
        markup::apply_inline_formatting(text, &mut state, &self.options)
    }

    fn convert_sections(&mut self, text: &str) -> String {
        let mut text = text.to_string();
        for (name, tag) in SECTION_LEVELS {
            let blocks = &mut self.blocks;
            text = replace_command(&text, name, 1, &mut |args| {
                blocks.insert(format!("<{0}>{1}</{0}>", tag, finish_text(args[0].trim())))
            });
        }
        text
    }

    fn convert_code_blocks(&mut self, text: &str) -> String {
        rewrite_environments(text, CODE_ENVIRONMENTS, |name, body| {
            self.blocks
                .insert(environment::render_code_block(name, body))
        })
    }

    /// Quote bodies get tables, lists and paragraphs of their own.
    fn convert_quotes(&mut self, text: &str) -> String {
        rewrite_environments(text, QUOTE_ENVIRONMENTS, |_, body| {
            let body = self.convert_tables(body);
            let body = self.convert_lists(&body);
            let inner = assemble(&body);
            self.blocks.insert(environment::render_blockquote(&inner))
        })
    }

    fn convert_tables(&mut self, text: &str) -> String {
        let text = rewrite_environments(text, TABULAR_ENVIRONMENTS, |name, body| {
            self.blocks.insert(table::render_tabular(name, body))
        });
        rewrite_environments(&text, TABLE_ENVIRONMENTS, |_, body| {
            self.blocks.insert(table::render_table_float(body))
        })
    }

    fn convert_lists(&mut self, text: &str) -> String {
        rewrite_environments(text, LIST_ENVIRONMENTS, |name, body| {
            self.blocks.insert(environment::render_list(name, body))
        })
    }
}
