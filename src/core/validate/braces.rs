//! Escape-aware brace balance scanning

use crate::core::is_escaped;

/// Outcome of a single brace scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BraceBalance {
    Balanced,
    /// A `}` closed more than was opened. The scan stops here.
    UnexpectedClose { position: usize },
    /// The scan finished with `count` braces still open.
    Unclosed { count: usize },
}

/// Walk `src` tracking brace depth, ignoring `\{` and `\}`.
pub fn scan_braces(src: &str) -> BraceBalance {
    let bytes = src.as_bytes();
    let mut depth: i64 = 0;

    for (i, &b) in bytes.iter().enumerate() {
        if b != b'{' && b != b'}' {
            continue;
        }
        if is_escaped(bytes, i) {
            continue;
        }
        if b == b'{' {
            depth += 1;
        } else {
            depth -= 1;
            if depth < 0 {
                return BraceBalance::UnexpectedClose { position: i };
            }
        }
    }

    if depth > 0 {
        BraceBalance::Unclosed {
            count: depth as usize,
        }
    } else {
        BraceBalance::Balanced
    }
}

/// 1-based line number of a byte offset.
pub fn line_of(src: &str, position: usize) -> usize {
    src.as_bytes()[..position.min(src.len())]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}
