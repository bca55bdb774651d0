//! Table conversion
//!
//! Bare `tabular` environments become `<table>` blocks; `table` floats wrap
//! an already converted tabular and add a caption underneath.

mod parser;

#[cfg(test)]
mod tests;

pub use parser::{
    clean_cell_content, parse_column_spec, split_cells, CellAlign, GridCell, GridRow, TableGrid,
};

use super::utils::{bracket_group, finish_text, line_breaks, replace_command};

pub const TABULAR_ENVIRONMENTS: &[&str] = &["tabular", "tabular*"];
pub const TABLE_ENVIRONMENTS: &[&str] = &["table", "table*"];

/// Render a `tabular` body as an HTML table.
pub fn render_tabular(name: &str, body: &str) -> String {
    TableGrid::parse(name, body).to_html()
}

/// Render a `table` float body.
///
/// The first `\caption` is rendered below whatever else the float holds.
pub fn render_table_float(body: &str) -> String {
    let body = match bracket_group(body, 0) {
        Some((_, end)) => &body[end..],
        None => body,
    };

    let mut caption: Option<String> = None;
    let rest = replace_command(body, "caption", 1, &mut |args| {
        if caption.is_none() {
            caption = Some(args[0].trim().to_string());
        }
        String::new()
    });

    let mut html = String::from("<div class=\"table-wrapper\">\n");
    let rest = rest.trim();
    if !rest.is_empty() {
        html.push_str(rest);
        html.push('\n');
    }
    if let Some(caption) = caption {
        html.push_str("<p class=\"table-caption\">");
        html.push_str(&finish_text(&line_breaks(&caption)));
        html.push_str("</p>\n");
    }
    html.push_str("</div>");
    html
}
