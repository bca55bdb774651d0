//! Block environment rendering: code listings, quotations and lists

use std::fmt::Write;

use lazy_static::lazy_static;
use regex::Regex;

use super::utils::{
    braced_group, bracket_group, escape_html, finish_text, line_breaks, skip_whitespace,
};

pub const CODE_ENVIRONMENTS: &[&str] = &["verbatim", "lstlisting", "minted"];
pub const QUOTE_ENVIRONMENTS: &[&str] = &["quote", "quotation"];
pub const LIST_ENVIRONMENTS: &[&str] = &["itemize", "enumerate", "description"];

lazy_static! {
    static ref ITEM: Regex = Regex::new(r"\\item\b").unwrap();
    static ref LISTING_LANGUAGE: Regex = Regex::new(r"language\s*=\s*\{?([A-Za-z0-9+#-]+)").unwrap();
}

/// Render a verbatim-like environment as an escaped `<pre>` block.
pub fn render_code_block(name: &str, body: &str) -> String {
    let mut code = body;
    let mut language: Option<String> = None;

    match name {
        "lstlisting" => {
            if let Some((opts, end)) = bracket_group(code, 0) {
                language = LISTING_LANGUAGE
                    .captures(opts)
                    .map(|caps| caps[1].to_string());
                code = &code[end..];
            }
        }
        "minted" => {
            let mut p = skip_whitespace(code, 0);
            if let Some((_, end)) = bracket_group(code, p) {
                p = skip_whitespace(code, end);
            }
            if let Some((lang, end)) = braced_group(code, p) {
                language = Some(lang.trim().to_string());
                code = &code[end..];
            }
        }
        _ => {}
    }

    let code = code.trim_matches(|c| c == '\n' || c == '\r');
    let class = language
        .filter(|lang| !lang.is_empty() && lang.chars().all(|c| c.is_ascii_alphanumeric() || "+#-".contains(c)))
        .map(|lang| format!(r#" class="language-{}""#, lang.to_ascii_lowercase()))
        .unwrap_or_default();

    format!(
        "<pre class=\"code-block\"><code{}>{}</code></pre>",
        class,
        escape_html(code)
    )
}

/// Wrap already-assembled paragraphs in a blockquote.
pub fn render_blockquote(inner: &str) -> String {
    format!("<blockquote>\n{}\n</blockquote>", inner)
}

/// Render an itemize, enumerate or description body.
///
/// Text before the first `\item` is dropped. Description items carry a
/// `[term]` that ends at the first `]`.
pub fn render_list(name: &str, body: &str) -> String {
    // Keep `\item` separable from a placeholder that follows it directly.
    let body = body.replace("\\item__", "\\item __");
    let items: Vec<&str> = ITEM.split(&body).skip(1).collect();

    let mut html = String::new();
    match name {
        "description" => {
            html.push_str("<dl>\n");
            for item in items {
                let item = item.trim();
                let (term, text) = match item.strip_prefix('[').and_then(|rest| rest.split_once(']')) {
                    Some((term, text)) => (term, text),
                    None => ("", item),
                };
                let _ = writeln!(
                    html,
                    "<dt>{}</dt><dd>{}</dd>",
                    item_text(term),
                    item_text(text)
                );
            }
            html.push_str("</dl>");
        }
        _ => {
            let tag = if name == "enumerate" { "ol" } else { "ul" };
            let _ = writeln!(html, "<{}>", tag);
            for item in items {
                let _ = writeln!(html, "<li>{}</li>", item_text(item));
            }
            let _ = write!(html, "</{}>", tag);
        }
    }
    html
}

fn item_text(text: &str) -> String {
    finish_text(&line_breaks(text.trim()))
}
