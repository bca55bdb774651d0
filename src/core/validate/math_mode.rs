//! Math delimiter checks and stray math command detection

use lazy_static::lazy_static;
use phf::phf_set;
use regex::Regex;

use super::ValidationIssue;
use crate::core::math_spans::{blank_math, count_lone_dollars, strip_paired_math};

/// Commands that only make sense in math mode.
static MATH_COMMANDS: phf::Set<&'static str> = phf_set! {
    "frac", "dfrac", "sqrt", "sum", "int", "prod", "lim",
    "alpha", "beta", "gamma", "delta", "epsilon", "theta", "lambda",
    "mu", "pi", "sigma", "omega", "infty", "partial", "nabla",
    "rightarrow", "leftarrow", "Rightarrow", "to",
    "leq", "geq", "neq", "approx", "times", "div", "cdot", "pm",
};

lazy_static! {
    static ref COMMAND_NAME: Regex = Regex::new(r"\\([A-Za-z]+)").unwrap();
}

/// Warn when an odd number of lone `$` remain once paired math is stripped.
pub fn check_inline_dollars(src: &str) -> Option<ValidationIssue> {
    let stripped = strip_paired_math(src);
    let count = count_lone_dollars(&stripped);
    if count % 2 == 1 {
        Some(ValidationIssue::warning(format!(
            "Odd number of inline math delimiters '$' ({}); an inline formula may be unclosed",
            count
        )))
    } else {
        None
    }
}

/// Compare raw counts of `\[` / `\]` and `\(` / `\)`.
pub fn check_display_delimiters(src: &str) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (open, close) in [("\\[", "\\]"), ("\\(", "\\)")] {
        let opens = src.matches(open).count();
        let closes = src.matches(close).count();
        if opens != closes {
            issues.push(ValidationIssue::warning(format!(
                "Unbalanced math delimiters: {} '{}' vs {} '{}'",
                opens, open, closes, close
            )));
        }
    }
    issues
}

/// Warn about math commands that appear in prose.
///
/// Names are listed in order of first appearance, at most `limit` of them.
pub fn check_math_outside_math_mode(src: &str, limit: usize) -> Option<ValidationIssue> {
    let prose = blank_math(src);
    let mut found: Vec<&str> = Vec::new();

    for caps in COMMAND_NAME.captures_iter(&prose) {
        let Some(name) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };
        if MATH_COMMANDS.contains(name) && !found.contains(&name) {
            found.push(name);
        }
    }

    if found.is_empty() {
        return None;
    }

    let listed: Vec<String> = found
        .iter()
        .take(limit)
        .map(|name| format!("\\{}", name))
        .collect();
    let more = if found.len() > limit { ", ..." } else { "" };

    Some(ValidationIssue::warning(format!(
        "Math commands used outside math mode: {}{}. Wrap them in $...$ or \\(...\\)",
        listed.join(", "),
        more
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_inline_math() {
        assert!(check_inline_dollars("$a$ and $b$").is_none());
        assert!(check_inline_dollars("$$a$$ and \\(b\\)").is_none());
    }

    #[test]
    fn test_unclosed_inline_math() {
        let issue = check_inline_dollars("value $x + 1").expect("warning");
        assert!(issue.is_warning());
    }

    #[test]
    fn test_dollar_inside_display_math_not_counted() {
        assert!(check_inline_dollars(r"\[ \text{$} \] and $x$").is_none());
    }

    #[test]
    fn test_display_delimiter_counts() {
        let issues = check_display_delimiters(r"\[ x \] \[ y");
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("2"));
        assert!(issues[0].message.contains("1"));

        let issues = check_display_delimiters(r"\( a \( b \)");
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_reversed_delimiters_pass_count_check() {
        assert!(check_display_delimiters(r"\] x \[").is_empty());
    }

    #[test]
    fn test_math_command_in_prose() {
        let issue = check_math_outside_math_mode(r"We have \alpha and \frac{1}{2}.", 5)
            .expect("warning");
        assert!(issue.message.contains(r"\alpha"));
        assert!(issue.message.contains(r"\frac"));
        assert!(!issue.message.contains("..."));
    }

    #[test]
    fn test_math_command_inside_math_is_fine() {
        let src = r"$\alpha$ and \[\sum_i x_i\] and \begin{align*}\frac{a}{b}\end{align*}";
        assert!(check_math_outside_math_mode(src, 5).is_none());
    }

    #[test]
    fn test_longer_command_name_does_not_match() {
        assert!(check_math_outside_math_mode(r"\alphabet \pifont \today", 5).is_none());
    }

    #[test]
    fn test_listing_is_truncated() {
        let src = r"\alpha \beta \gamma \delta \theta \lambda";
        let issue = check_math_outside_math_mode(src, 5).expect("warning");
        assert!(issue.message.contains("..."));
        assert!(!issue.message.contains(r"\lambda"));
    }
}
