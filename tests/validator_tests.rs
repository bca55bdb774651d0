//! Integration tests for structural validation

use pretty_assertions::assert_eq;
use texpreview::{has_errors, validate, validate_with_options, IssueKind, ValidateOptions};

const DOC_START: &str = "\\documentclass{article}\n\\begin{document}\n";
const DOC_END: &str = "\n\\end{document}\n";

fn doc(body: &str) -> String {
    format!("{}{}{}", DOC_START, body, DOC_END)
}

fn messages(src: &str) -> Vec<String> {
    validate(src).into_iter().map(|i| i.message).collect()
}

// ============================================================================
// Required declarations
// ============================================================================

mod declarations {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_input() {
        assert!(validate("").is_empty());
    }

    #[test]
    fn test_complete_document_is_clean() {
        assert!(validate(&doc("Hello, world.")).is_empty());
    }

    #[test]
    fn test_each_marker_checked_independently() {
        let no_class = "\\begin{document}x\\end{document}";
        assert_eq!(messages(no_class), vec!["Missing \\documentclass declaration"]);

        let no_begin = "\\documentclass{article} x \\end{document}";
        let issues = validate(no_begin);
        assert!(issues.iter().any(|i| i.message == "Missing \\begin{document}"));
        assert!(!issues.iter().any(|i| i.message.contains("documentclass")));

        let no_end = "\\documentclass{article}\\begin{document} x";
        let issues = validate(no_end);
        assert!(issues.iter().any(|i| i.message == "Missing \\end{document}"));
    }

    #[test]
    fn test_sections_without_markers() {
        let issues = validate("\\section{Intro}\\section{Intro}");
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().all(|i| i.kind == IssueKind::Error));
        assert_eq!(
            issues.iter().map(|i| i.message.as_str()).collect::<Vec<_>>(),
            vec![
                "Missing \\documentclass declaration",
                "Missing \\begin{document}",
                "Missing \\end{document}",
            ]
        );
    }
}

// ============================================================================
// Braces
// ============================================================================

mod braces {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unclosed_count_reported_once() {
        let issues = validate(&doc("\\textbf{a \\emph{b"));
        let brace_issues: Vec<_> = issues
            .iter()
            .filter(|i| i.message.contains("brace"))
            .collect();
        assert_eq!(brace_issues.len(), 1);
        assert_eq!(brace_issues[0].message, "2 unclosed braces '{'");
        assert!(brace_issues[0].is_error());
    }

    #[test]
    fn test_early_close_stops_scan() {
        let issues = validate(&doc("a } b { { {"));
        let brace_issues: Vec<_> = issues
            .iter()
            .filter(|i| i.message.contains("brace"))
            .collect();
        assert_eq!(brace_issues.len(), 1);
        assert_eq!(
            brace_issues[0].message,
            "Closing brace '}' without matching opening brace (line 3)"
        );
    }

    #[test]
    fn test_escaped_braces_ignored() {
        assert!(validate(&doc(r"a set \{1, 2\}")).is_empty());
    }

    #[test]
    fn test_line_break_before_brace_counts() {
        // `\\{` is a line break followed by a real brace
        let issues = validate(&doc(r"a \\{b"));
        assert!(issues.iter().any(|i| i.message == "1 unclosed brace '{'"));
    }
}

// ============================================================================
// Environments
// ============================================================================

mod environments {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_well_nested() {
        let body = "\\begin{itemize}\\item \\begin{enumerate}\\item x\\end{enumerate}\\end{itemize}";
        assert!(validate(&doc(body)).is_empty());
    }

    #[test]
    fn test_mismatch_then_correct_close() {
        let body = "\\begin{itemize}\\item x\\end{enumerate}\\end{itemize}";
        assert_eq!(
            messages(&doc(body)),
            vec!["Mismatched environment: expected \\end{itemize}, found \\end{enumerate}"]
        );
    }

    #[test]
    fn test_extra_end() {
        let src = format!("{}\\end{{quote}}", doc("x"));
        assert_eq!(
            messages(&src),
            vec!["Extra \\end{quote} without matching \\begin{quote}"]
        );
    }

    #[test]
    fn test_stray_end_inside_document_is_a_mismatch() {
        assert_eq!(
            messages(&doc("\\end{quote}")),
            vec!["Mismatched environment: expected \\end{document}, found \\end{quote}"]
        );
    }

    #[test]
    fn test_unclosed_listed_outermost_first() {
        let unclosed: Vec<String> = messages("\\begin{quote}\\begin{itemize}\\item x")
            .into_iter()
            .filter(|m| m.starts_with("Unclosed"))
            .collect();
        assert_eq!(
            unclosed,
            vec![
                "Unclosed environment \\begin{quote}",
                "Unclosed environment \\begin{itemize}",
            ]
        );
    }
}

// ============================================================================
// Forbidden commands
// ============================================================================

mod forbidden {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_includegraphics_flagged() {
        let issues = validate(&doc("\\includegraphics[width=3cm]{fig.png}"));
        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_error());
        assert!(issues[0].message.contains("\\includegraphics"));
    }

    #[test]
    fn test_flagged_even_in_broken_source() {
        let issues = validate("\\IncludeGraphics{fig.png");
        assert!(issues
            .iter()
            .any(|i| i.is_error() && i.message.contains("includegraphics")));
    }

    #[test]
    fn test_custom_forbidden_list() {
        let options = ValidateOptions {
            forbidden_commands: vec!["input".to_string()],
            ..Default::default()
        };
        let issues = validate_with_options(&doc("\\input{chapter1}\\includegraphics{x}"), &options);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.starts_with("\\input is not allowed"));
    }
}

// ============================================================================
// Math
// ============================================================================

mod math {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_paired_math_is_clean() {
        let body = "Inline $a$, \\(b\\), display $$c$$ and \\[d\\]. \
                    \\begin{align*} \\frac{1}{2} \\end{align*}";
        assert!(validate(&doc(body)).is_empty());
    }

    #[test]
    fn test_unclosed_inline_dollar() {
        let issues = validate(&doc("Price is $5 and $x$ more"));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::Warning);
        assert!(issues[0].message.contains("'$' (3)"));
    }

    #[test]
    fn test_escaped_dollar_ignored() {
        assert!(validate(&doc(r"It costs \$5.")).is_empty());
    }

    #[test]
    fn test_display_delimiter_counts() {
        let issues = validate(&doc(r"\[ x \] and \[ y"));
        assert!(issues
            .iter()
            .any(|i| i.message == "Unbalanced math delimiters: 2 '\\[' vs 1 '\\]'"));
        assert!(!has_errors(&issues));
    }

    #[test]
    fn test_math_commands_in_prose() {
        let issues = validate(&doc(r"We know \alpha \leq \beta but $\gamma$ is fine"));
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].message,
            "Math commands used outside math mode: \\alpha, \\leq, \\beta. Wrap them in $...$ or \\(...\\)"
        );
    }

    #[test]
    fn test_math_command_list_elided() {
        let body = r"\alpha \beta \gamma \delta \pi \sigma \sum";
        let issues = validate(&doc(body));
        let message = &issues[0].message;
        assert!(message.contains("\\alpha, \\beta, \\gamma, \\delta, \\pi, ..."));
        assert!(!message.contains("\\sigma"));
    }

    #[test]
    fn test_word_boundary() {
        // `\topic` and `\pipe` are not `\to` and `\pi`
        assert!(validate(&doc(r"\topic{A} \pipe")).is_empty());
    }
}

// ============================================================================
// Ordering
// ============================================================================

mod ordering {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_issue_order_follows_checks() {
        let src = "\\begin{itemize} { $x \\includegraphics{f} \\[ \\alpha";
        let issues = validate(src);
        let kinds: Vec<_> = issues.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![
                IssueKind::Error,   // documentclass
                IssueKind::Error,   // begin{document}
                IssueKind::Error,   // end{document}
                IssueKind::Error,   // braces
                IssueKind::Error,   // unclosed itemize
                IssueKind::Error,   // includegraphics
                IssueKind::Warning, // lone $
                IssueKind::Warning, // \[ count
                IssueKind::Warning, // \alpha
            ]
        );
    }

    #[test]
    fn test_serialized_shape() {
        let issues = validate("x");
        let json = serde_json::to_value(&issues[0]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "error", "message": "Missing \\documentclass declaration"})
        );
    }
}
