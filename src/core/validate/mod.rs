//! Structural validation of LaTeX source
//!
//! [`validate`] scans raw source for document-shape defects and returns
//! them as an ordered list of [`ValidationIssue`]s. It never fails: bad
//! input only produces more issues.
//!
//! Checks run in a fixed order, which is also the order of the result:
//! 1. required `\documentclass`, `\begin{document}`, `\end{document}`
//! 2. brace balance
//! 3. environment nesting
//! 4. forbidden commands
//! 5. unclosed inline `$` math
//! 6. `\[`/`\]` and `\(`/`\)` counts
//! 7. math commands outside math mode

pub mod braces;
pub mod environments;
pub mod math_mode;

use serde::{Deserialize, Serialize};
use tracing::debug;

use braces::{line_of, scan_braces, BraceBalance};
use environments::match_environments;

/// Severity of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    /// The document will almost certainly fail to compile
    Error,
    /// Likely, but not certainly, a problem
    Warning,
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueKind::Error => write!(f, "error"),
            IssueKind::Warning => write!(f, "warning"),
        }
    }
}

/// A single structural defect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub message: String,
}

impl ValidationIssue {
    pub fn error(message: impl Into<String>) -> Self {
        ValidationIssue {
            kind: IssueKind::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        ValidationIssue {
            kind: IssueKind::Warning,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == IssueKind::Error
    }

    pub fn is_warning(&self) -> bool {
        self.kind == IssueKind::Warning
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// Options for [`validate_with_options`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidateOptions {
    /// Command names (without backslash) that may not appear anywhere.
    /// Matched case-insensitively.
    /// Default: `["includegraphics"]`
    pub forbidden_commands: Vec<String>,

    /// How many stray math command names to list before eliding the rest.
    /// Default: 5
    pub max_listed_math_commands: usize,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            forbidden_commands: vec!["includegraphics".to_string()],
            max_listed_math_commands: 5,
        }
    }
}

/// Validate LaTeX source with default options.
pub fn validate(latex: &str) -> Vec<ValidationIssue> {
    validate_with_options(latex, &ValidateOptions::default())
}

/// Validate LaTeX source.
///
/// # Example
///
/// ```
/// use texpreview::validate;
///
/// let issues = validate(r"\section{Intro}");
/// assert_eq!(issues.iter().filter(|i| i.is_error()).count(), 3);
/// ```
pub fn validate_with_options(latex: &str, options: &ValidateOptions) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    if latex.is_empty() {
        return issues;
    }

    // 1. Required declarations
    if !latex.contains("\\documentclass") {
        issues.push(ValidationIssue::error("Missing \\documentclass declaration"));
    }
    if !latex.contains("\\begin{document}") {
        issues.push(ValidationIssue::error("Missing \\begin{document}"));
    }
    if !latex.contains("\\end{document}") {
        issues.push(ValidationIssue::error("Missing \\end{document}"));
    }

    // 2. Braces
    match scan_braces(latex) {
        BraceBalance::Balanced => {}
        BraceBalance::UnexpectedClose { position } => {
            issues.push(ValidationIssue::error(format!(
                "Closing brace '}}' without matching opening brace (line {})",
                line_of(latex, position)
            )));
        }
        BraceBalance::Unclosed { count } => {
            issues.push(ValidationIssue::error(format!(
                "{} unclosed brace{} '{{'",
                count,
                if count == 1 { "" } else { "s" }
            )));
        }
    }

    // 3. Environments
    issues.extend(
        match_environments(latex)
            .iter()
            .map(|issue| ValidationIssue::error(issue.message())),
    );

    // 4. Forbidden commands
    let lowered = latex.to_ascii_lowercase();
    for name in &options.forbidden_commands {
        let needle = format!("\\{}", name.to_ascii_lowercase());
        if lowered.contains(&needle) {
            issues.push(ValidationIssue::error(format!(
                "\\{} is not allowed: external files are not available when compiling",
                name
            )));
        }
    }

    // 5-7. Math
    issues.extend(math_mode::check_inline_dollars(latex));
    issues.extend(math_mode::check_display_delimiters(latex));
    issues.extend(math_mode::check_math_outside_math_mode(
        latex,
        options.max_listed_math_commands,
    ));

    debug!(
        errors = issues.iter().filter(|i| i.is_error()).count(),
        warnings = issues.iter().filter(|i| i.is_warning()).count(),
        "validated LaTeX source"
    );

    issues
}

/// Whether any issue is an error.
pub fn has_errors(issues: &[ValidationIssue]) -> bool {
    issues.iter().any(ValidationIssue::is_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\\documentclass{article}\n\\begin{document}\nHello\n\\end{document}\n";

    #[test]
    fn test_empty_input() {
        assert!(validate("").is_empty());
    }

    #[test]
    fn test_clean_document() {
        assert!(validate(DOC).is_empty());
    }

    #[test]
    fn test_missing_declarations_are_independent() {
        let src = DOC.replace("\\documentclass{article}", "");
        let issues = validate(&src);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("documentclass"));

        let src = DOC.replace("\\end{document}", "");
        let issues = validate(&src);
        assert!(issues
            .iter()
            .any(|i| i.is_error() && i.message == "Missing \\end{document}"));
    }

    #[test]
    fn test_issue_order_follows_checks() {
        let src = r"\begin{itemize} $x \includegraphics{a.png} {";
        let messages: Vec<String> = validate(src).into_iter().map(|i| i.message).collect();
        let pos = |needle: &str| {
            messages
                .iter()
                .position(|m| m.contains(needle))
                .unwrap_or_else(|| panic!("missing {needle}: {messages:?}"))
        };
        assert!(pos("documentclass") < pos("unclosed brace"));
        assert!(pos("unclosed brace") < pos("Unclosed environment"));
        assert!(pos("Unclosed environment") < pos("includegraphics"));
        assert!(pos("includegraphics") < pos("inline math"));
    }

    #[test]
    fn test_forbidden_command_case_insensitive() {
        let src = DOC.replace("Hello", "\\IncludeGraphics{fig.png}");
        let issues = validate(&src);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_error());
    }

    #[test]
    fn test_custom_forbidden_commands() {
        let options = ValidateOptions {
            forbidden_commands: vec!["input".to_string()],
            ..Default::default()
        };
        let src = DOC.replace("Hello", "\\input{chapter1}");
        let issues = validate_with_options(&src, &options);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("\\input"));
    }

    #[test]
    fn test_issue_serializes_lowercase_kind() {
        let json = serde_json::to_string(&ValidationIssue::warning("w")).unwrap();
        assert_eq!(json, r#"{"kind":"warning","message":"w"}"#);
    }
}
