//! Core LaTeX processing
//!
//! - [`validate`]: structural defect detection
//! - [`latex2html`]: LaTeX to HTML conversion with math protection
//! - [`math_spans`]: math-mode span detection shared by both

pub mod latex2html;
pub mod math_spans;
pub mod validate;

/// Whether the byte at `idx` is escaped by a preceding backslash.
///
/// Looks at most two bytes back: `\{` is escaped, `\\{` is not. Longer
/// backslash runs are not counted.
pub(crate) fn is_escaped(bytes: &[u8], idx: usize) -> bool {
    idx > 0 && bytes[idx - 1] == b'\\' && (idx < 2 || bytes[idx - 2] != b'\\')
}
