//! Tabular grid parser
//!
//! Rows split on `\\`, cells split on unescaped `&`, rule commands dropped.
//! The first row becomes the header. `\multicolumn` is kept as a colspan;
//! there is no rowspan support.

use std::fmt::Write;

use lazy_static::lazy_static;
use regex::Regex;

use crate::core::is_escaped;
use crate::core::latex2html::utils::{
    braced_group, bracket_group, finish_text, line_breaks, parse_arguments, skip_whitespace,
};

lazy_static! {
    static ref ROW_SEPARATOR: Regex = Regex::new(r"\\\\(?:\s*\[[^\]]*\])?").unwrap();
    static ref RULE: Regex = Regex::new(
        r"\\(?:hline|toprule|midrule|bottomrule)\b|\\(?:cline|cmidrule)\s*(?:\([^)]*\))?\s*\{[^}]*\}"
    )
    .unwrap();
}

/// Column alignment from a tabular column spec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellAlign {
    Left,
    Center,
    Right,
}

impl CellAlign {
    pub fn css_class(self) -> &'static str {
        match self {
            CellAlign::Left => "align-left",
            CellAlign::Center => "align-center",
            CellAlign::Right => "align-right",
        }
    }
}

/// Read alignments from a column spec like `|l|c|p{3cm}|`.
pub fn parse_column_spec(spec: &str) -> Vec<CellAlign> {
    let mut aligns = Vec::new();
    let mut pos = 0;
    while let Some(ch) = spec[pos..].chars().next() {
        pos += ch.len_utf8();
        match ch {
            'l' => aligns.push(CellAlign::Left),
            'c' => aligns.push(CellAlign::Center),
            'r' => aligns.push(CellAlign::Right),
            'p' | 'm' | 'b' | 'X' => {
                aligns.push(CellAlign::Left);
                if let Some((_, end)) = braced_group(spec, pos) {
                    pos = end;
                }
            }
            '@' | '>' | '<' | '!' => {
                if let Some((_, end)) = braced_group(spec, pos) {
                    pos = end;
                }
            }
            _ => {}
        }
    }
    aligns
}

/// A single table cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    pub content: String,
    pub colspan: usize,
}

impl GridCell {
    /// Parse raw cell text, unwrapping `\multicolumn{n}{spec}{content}`.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some(rest) = raw.strip_prefix("\\multicolumn") {
            if let Some((args, end)) = parse_arguments(rest, 0, 3) {
                if rest[end..].trim().is_empty() {
                    let colspan = args[0].trim().parse::<usize>().unwrap_or(1).max(1);
                    return GridCell {
                        content: args[2].trim().to_string(),
                        colspan,
                    };
                }
            }
        }
        GridCell {
            content: raw.to_string(),
            colspan: 1,
        }
    }

    fn to_html(&self, tag: &str, align: Option<CellAlign>) -> String {
        let mut attrs = String::new();
        if self.colspan > 1 {
            let _ = write!(attrs, r#" colspan="{}""#, self.colspan);
        }
        if let Some(align) = align {
            let _ = write!(attrs, r#" class="{}""#, align.css_class());
        }
        format!(
            "<{0}{1}>{2}</{0}>",
            tag,
            attrs,
            finish_text(&line_breaks(&self.content))
        )
    }
}

/// Represents a parsed table row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridRow {
    pub cells: Vec<GridCell>,
}

/// Parsed tabular content
#[derive(Debug, Clone, Default)]
pub struct TableGrid {
    pub alignments: Vec<CellAlign>,
    pub rows: Vec<GridRow>,
}

impl TableGrid {
    /// Parse a tabular body that begins right after `\begin{tabular}`.
    ///
    /// `tabular*` carries a width argument ahead of the column spec.
    pub fn parse(name: &str, body: &str) -> Self {
        let (alignments, content) = split_column_spec(name, body);
        let mut grid = TableGrid {
            alignments,
            rows: Vec::new(),
        };

        for row in ROW_SEPARATOR.split(content) {
            let row = clean_cell_content(row);
            if row.is_empty() {
                continue;
            }
            let cells = split_cells(&row).into_iter().map(GridCell::parse).collect();
            grid.rows.push(GridRow { cells });
        }

        grid
    }

    /// Alignment for the cell starting at column `col`
    fn align_at(&self, col: usize) -> Option<CellAlign> {
        self.alignments.get(col).copied()
    }

    pub fn to_html(&self) -> String {
        let mut html = String::from("<table class=\"latex-table\">\n");

        let mut rows = self.rows.iter();
        if let Some(head) = rows.next() {
            html.push_str("<thead>\n");
            html.push_str(&self.row_html(head, "th"));
            html.push_str("</thead>\n");
        }

        let body: Vec<String> = rows.map(|row| self.row_html(row, "td")).collect();
        if !body.is_empty() {
            html.push_str("<tbody>\n");
            html.push_str(&body.concat());
            html.push_str("</tbody>\n");
        }

        html.push_str("</table>");
        html
    }

    fn row_html(&self, row: &GridRow, tag: &str) -> String {
        let mut html = String::from("<tr>");
        let mut col = 0;
        for cell in &row.cells {
            let align = if cell.colspan > 1 {
                None
            } else {
                self.align_at(col)
            };
            html.push_str(&cell.to_html(tag, align));
            col = col.saturating_add(cell.colspan);
        }
        html.push_str("</tr>\n");
        html
    }
}

/// Separate the optional position, width and column spec from the rows.
fn split_column_spec<'a>(name: &str, body: &'a str) -> (Vec<CellAlign>, &'a str) {
    let mut pos = skip_whitespace(body, 0);
    if let Some((_, end)) = bracket_group(body, pos) {
        pos = skip_whitespace(body, end);
    }
    if name.ends_with('*') {
        if let Some((_, end)) = braced_group(body, pos) {
            pos = skip_whitespace(body, end);
        }
    }
    match braced_group(body, pos) {
        Some((spec, end)) => (parse_column_spec(spec), &body[end..]),
        None => (Vec::new(), &body[pos..]),
    }
}

/// Split a row on `&` that is not written as `\&`.
pub fn split_cells(row: &str) -> Vec<&str> {
    let bytes = row.as_bytes();
    let mut cells = Vec::new();
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'&' && !is_escaped(bytes, i) {
            cells.push(&row[start..i]);
            start = i + 1;
        }
    }
    cells.push(&row[start..]);
    cells
}

/// Drop rule commands and surrounding whitespace.
pub fn clean_cell_content(raw: &str) -> String {
    RULE.replace_all(raw, "").trim().to_string()
}
