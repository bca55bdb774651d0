//! # texpreview
//!
//! Structural validation and safe HTML preview for LaTeX source.
//!
//! - [`validate`] reports document-shape defects as errors and warnings.
//! - [`convert`] turns LaTeX into an HTML fragment with math hidden behind
//!   sanitizer-safe tokens, plus the map needed to restore it.
//! - [`word_count`] counts the words a reader would see.
//!
//! Both engines are pure functions: no I/O, no shared state, no failure
//! mode on malformed input.
//!
//! ## Example
//!
//! ```
//! use texpreview::{convert, restore_math, validate};
//!
//! let source = r"\documentclass{article}
//! \begin{document}
//! Euler: $e^{i\pi} + 1 = 0$
//! \end{document}";
//!
//! assert!(validate(source).is_empty());
//!
//! let result = convert(source);
//! let html = restore_math(&result.html, &result.math_map);
//! assert_eq!(html, r"<p>Euler: $e^{i\pi} + 1 = 0$</p>");
//! ```

pub mod core;
pub mod preview;
pub mod service;
pub mod utils;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use crate::core::latex2html::{convert, convert_with_options, ConversionResult, ConvertOptions};
pub use crate::core::validate::{
    has_errors, validate, validate_with_options, IssueKind, ValidateOptions, ValidationIssue,
};
pub use preview::{
    render_preview, render_preview_with_config, restore_math, CompileGate, PassthroughSanitizer,
    PreviewOutput, RenderTickets, Sanitizer,
};
pub use service::{
    cache_key, compile_checked, CompileErrorKind, CompileOutcome, CompileService,
    GenerationCache, MemoryCache, NoopCache,
};
pub use utils::config::Config;
pub use utils::error::{PreviewError, PreviewResult};
pub use utils::latex_analysis::{stats_source, word_count, DocumentStats};
