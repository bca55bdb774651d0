//! Regression tests for table parsing

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_basic_table() {
    let body = "{lcr}\nA & B & C \\\\\n1 & 2 & 3 \\\\\n";
    let grid = TableGrid::parse("tabular", body);

    assert_eq!(grid.alignments.len(), 3);
    assert_eq!(grid.rows.len(), 2);
    assert_eq!(grid.rows[0].cells[1].content, "B");
    assert_eq!(grid.rows[1].cells[2].content, "3");
}

#[test]
fn test_header_row_and_body_rows() {
    let html = render_tabular("tabular", "{ll} Name & Age \\\\ Ann & 30 \\\\ Bo & 41");

    assert_eq!(html.matches("</th>").count(), 2);
    assert_eq!(html.matches("</td>").count(), 4);
    assert!(html.contains(r#"<th class="align-left">Name</th>"#));
    assert!(html.find("<thead>").unwrap() < html.find("<tbody>").unwrap());
}

#[test]
fn test_hline() {
    let body = "{|c|c|}\\hline\nA & B \\\\ \\hline\nC & D \\\\\n\\hline";
    let grid = TableGrid::parse("tabular", body);

    assert_eq!(grid.rows.len(), 2);
    assert_eq!(grid.rows[0].cells[0].content, "A");
    assert_eq!(grid.rows[1].cells[1].content, "D");
}

#[test]
fn test_booktabs_rules() {
    let body = "{cc}\\toprule A & B \\\\ \\midrule C & D \\\\ \\cmidrule(lr){1-2} E & F \\\\ \\bottomrule";
    let html = render_tabular("tabular", body);

    assert!(!html.contains("rule"));
    assert!(!html.contains("(lr)"));
    assert!(html.contains(">E</td>"));
}

#[test]
fn test_multicolumn() {
    let body = "{lll} A & \\multicolumn{2}{c}{Wide} \\\\ 1 & 2 & 3";
    let grid = TableGrid::parse("tabular", body);

    assert_eq!(
        grid.rows[0].cells[1],
        GridCell {
            content: "Wide".to_string(),
            colspan: 2
        }
    );
    let html = grid.to_html();
    assert!(html.contains(r#"<th colspan="2">Wide</th>"#));
}

#[test]
fn test_oversized_multicolumn() {
    let body = format!(
        "{{ll}} \\multicolumn{{{0}}}{{c}}{{A}} & \\multicolumn{{{0}}}{{c}}{{B}} & C",
        usize::MAX
    );
    let html = render_tabular("tabular", &body);

    assert!(html.contains(">A</th>"));
    assert!(html.contains(">C</th>"));
}

#[test]
fn test_sparse_data() {
    let body = "{lll} A & & B \\\\ C & D & ";
    let grid = TableGrid::parse("tabular", body);

    assert_eq!(grid.rows[0].cells.len(), 3);
    assert_eq!(grid.rows[0].cells[1].content, "");
    assert_eq!(grid.rows[1].cells[2].content, "");
}

#[test]
fn test_escaped_ampersand_stays_in_cell() {
    let html = render_tabular("tabular", r"{ll} R\&D & Ops");

    assert!(html.contains(">R&amp;D</th>"));
    assert!(html.contains(">Ops</th>"));
}

#[test]
fn test_row_spacing_argument() {
    let grid = TableGrid::parse("tabular", "{l} A \\\\[4pt] B");
    assert_eq!(grid.rows.len(), 2);
    assert_eq!(grid.rows[1].cells[0].content, "B");
}

#[test]
fn test_tabular_star_width() {
    let grid = TableGrid::parse("tabular*", "{\\textwidth}{rr} 1 & 2");
    assert_eq!(grid.alignments, vec![CellAlign::Right, CellAlign::Right]);
    assert_eq!(grid.rows[0].cells.len(), 2);
}

#[test]
fn test_column_spec() {
    assert_eq!(
        parse_column_spec("|l|p{3cm}|@{}r|"),
        vec![CellAlign::Left, CellAlign::Left, CellAlign::Right]
    );
}

#[test]
fn test_clean_cell_content() {
    assert_eq!(clean_cell_content("\\toprule A"), "A");
    assert_eq!(clean_cell_content("B \\hline"), "B");
    assert_eq!(clean_cell_content("\\cmidrule(lr){2-5} C"), "C");
    assert_eq!(clean_cell_content("\\cline{1-3}"), "");
}

#[test]
fn test_split_cells() {
    assert_eq!(split_cells(r"a & b \& c & d"), vec!["a ", r" b \& c ", " d"]);
}

#[test]
fn test_empty_table() {
    let html = render_tabular("tabular", "{c}");
    assert_eq!(html, "<table class=\"latex-table\">\n</table>");
}

#[test]
fn test_table_float_caption_below() {
    let html = render_table_float("[h]\n\\caption{Results}\n__BLK_0__\n");

    assert!(html.starts_with("<div class=\"table-wrapper\">"));
    let token = html.find("__BLK_0__").unwrap();
    let caption = html.find("<p class=\"table-caption\">Results</p>").unwrap();
    assert!(token < caption);
}

#[test]
fn test_table_float_without_caption() {
    let html = render_table_float("__BLK_3__");
    assert!(!html.contains("table-caption"));
    assert!(html.contains("__BLK_3__"));
}
