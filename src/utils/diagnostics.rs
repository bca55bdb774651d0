//! Terminal formatting for validation issues

use std::fmt::Write;

use crate::core::validate::{IssueKind, ValidationIssue};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const GREEN: &str = "\x1b[32m";

impl IssueKind {
    /// Get ANSI color code for this severity.
    pub fn color_code(self) -> &'static str {
        match self {
            IssueKind::Error => "\x1b[31m",   // red
            IssueKind::Warning => "\x1b[33m", // yellow
        }
    }
}

/// Render issues one per line, followed by a summary line.
pub fn format_issues(issues: &[ValidationIssue], color: bool) -> String {
    let mut out = String::new();

    if issues.is_empty() {
        if color {
            let _ = write!(out, "{}✓ No structural issues found{}", GREEN, RESET);
        } else {
            out.push_str("✓ No structural issues found");
        }
        return out;
    }

    for issue in issues {
        if color {
            let _ = writeln!(
                out,
                "{}{}{}{}: {}",
                BOLD,
                issue.kind.color_code(),
                issue.kind,
                RESET,
                issue.message
            );
        } else {
            let _ = writeln!(out, "{}: {}", issue.kind, issue.message);
        }
    }

    let errors = issues.iter().filter(|i| i.is_error()).count();
    let warnings = issues.len() - errors;
    let _ = write!(out, "\n{} error(s), {} warning(s)", errors, warnings);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_plain() {
        let issues = vec![
            ValidationIssue::error("Missing \\begin{document}"),
            ValidationIssue::warning("Unclosed inline math"),
        ];
        let out = format_issues(&issues, false);
        assert!(out.contains("error: Missing \\begin{document}\n"));
        assert!(out.contains("warning: Unclosed inline math\n"));
        assert!(out.ends_with("1 error(s), 1 warning(s)"));
        assert!(!out.contains('\x1b'));
    }

    #[test]
    fn test_format_colored() {
        let issues = vec![ValidationIssue::error("x")];
        let out = format_issues(&issues, true);
        assert!(out.contains("\x1b[31m"));
        assert!(out.contains(RESET));
    }

    #[test]
    fn test_format_clean() {
        assert_eq!(format_issues(&[], false), "✓ No structural issues found");
    }
}
