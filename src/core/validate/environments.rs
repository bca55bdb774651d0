//! Stack-based `\begin{X}` / `\end{X}` pairing

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ENV_TOKEN: Regex = Regex::new(r"\\(begin|end)\{([^{}]*)\}").unwrap();
}

/// An open environment waiting for its `\end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentFrame {
    pub name: String,
    /// Byte offset of the `\begin` token
    pub position: usize,
}

/// A nesting defect found while pairing environments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentIssue {
    /// `\end{name}` with nothing open
    Extra { name: String },
    /// `\end{found}` while `expected` is the innermost open environment
    Mismatch { expected: String, found: String },
    /// `\begin{name}` never closed
    Unclosed { name: String },
}

impl EnvironmentIssue {
    pub fn message(&self) -> String {
        match self {
            EnvironmentIssue::Extra { name } => {
                format!("Extra \\end{{{}}} without matching \\begin{{{}}}", name, name)
            }
            EnvironmentIssue::Mismatch { expected, found } => format!(
                "Mismatched environment: expected \\end{{{}}}, found \\end{{{}}}",
                expected, found
            ),
            EnvironmentIssue::Unclosed { name } => {
                format!("Unclosed environment \\begin{{{}}}", name)
            }
        }
    }
}

/// Pair every begin/end token in source order.
///
/// A mismatched `\end` leaves the open frame on the stack, so the correct
/// `\end` that follows still closes it. Unclosed frames are reported
/// outermost first.
pub fn match_environments(src: &str) -> Vec<EnvironmentIssue> {
    let mut stack: Vec<EnvironmentFrame> = Vec::new();
    let mut issues = Vec::new();

    for caps in ENV_TOKEN.captures_iter(src) {
        let Some(token) = caps.get(0) else { continue };
        let name = caps[2].to_string();

        if &caps[1] == "begin" {
            stack.push(EnvironmentFrame {
                name,
                position: token.start(),
            });
            continue;
        }

        match stack.pop() {
            None => issues.push(EnvironmentIssue::Extra { name }),
            Some(frame) if frame.name != name => {
                issues.push(EnvironmentIssue::Mismatch {
                    expected: frame.name.clone(),
                    found: name,
                });
                stack.push(frame);
            }
            Some(_) => {}
        }
    }

    issues.extend(
        stack
            .into_iter()
            .map(|frame| EnvironmentIssue::Unclosed { name: frame.name }),
    );
    issues
}
