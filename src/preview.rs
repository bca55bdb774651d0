//! Caller-side render contract
//!
//! [`convert`](crate::convert) leaves math tokens in its HTML so the HTML can
//! go through a sanitizer first. This module holds the other half: the
//! sanitizer seam, math restoration, discarding stale renders and the
//! compile gate that reads validator output.

use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::core::latex2html::convert_with_options;
use crate::core::validate::{validate_with_options, ValidationIssue};
use crate::utils::config::Config;
use crate::utils::error::PreviewError;
use crate::utils::latex_analysis::{stats_source, DocumentStats};

/// HTML sanitization capability.
///
/// Implementations must leave ASCII letters, digits and underscores alone so
/// placeholder tokens survive.
pub trait Sanitizer {
    fn sanitize(&self, html: &str) -> String;
}

/// Sanitizer that returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughSanitizer;

impl Sanitizer for PassthroughSanitizer {
    fn sanitize(&self, html: &str) -> String {
        html.to_string()
    }
}

impl<F> Sanitizer for F
where
    F: Fn(&str) -> String,
{
    fn sanitize(&self, html: &str) -> String {
        self(html)
    }
}

/// Replace each math token with its raw source, once.
pub fn restore_math(html: &str, math_map: &IndexMap<String, String>) -> String {
    let mut out = html.to_string();
    for (token, raw) in math_map {
        out = out.replacen(token.as_str(), raw, 1);
    }
    out
}

/// Everything a preview pane shows for one source revision.
#[derive(Debug, Clone, Serialize)]
pub struct PreviewOutput {
    /// Sanitized HTML with math restored
    pub html: String,
    pub issues: Vec<ValidationIssue>,
    pub stats: DocumentStats,
}

/// Validate, convert, sanitize and restore math in one go.
pub fn render_preview(latex: &str, sanitizer: &dyn Sanitizer) -> PreviewOutput {
    render_preview_with_config(latex, sanitizer, &Config::default())
}

pub fn render_preview_with_config(
    latex: &str,
    sanitizer: &dyn Sanitizer,
    config: &Config,
) -> PreviewOutput {
    let issues = validate_with_options(latex, &config.validate);
    let converted = convert_with_options(latex, &config.convert);
    let sanitized = sanitizer.sanitize(&converted.html);
    let html = restore_math(&sanitized, &converted.math_map);

    PreviewOutput {
        html,
        issues,
        stats: stats_source(latex),
    }
}

// =============================================================================
// Last-call-wins rendering
// =============================================================================

/// Issues numbered render tickets; only the newest one may publish.
///
/// Take a ticket before starting a render and check [`is_current`](Self::is_current)
/// before showing its result. Older results are dropped, never merged.
#[derive(Debug, Default)]
pub struct RenderTickets {
    latest: AtomicU64,
}

/// A claim on one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl RenderTickets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Run `render` and return its output only if no newer ticket was issued meanwhile.
    pub fn run<T>(&self, render: impl FnOnce() -> T) -> Option<T> {
        let ticket = self.issue();
        let output = render();
        if self.is_current(ticket) {
            Some(output)
        } else {
            debug!(ticket = ticket.0, "discarding stale render");
            None
        }
    }
}

// =============================================================================
// Compile gate
// =============================================================================

/// Whether a document may be sent for compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "camelCase")]
pub enum CompileGate {
    /// No issues
    Proceed,
    /// Only warnings; ask the author first
    ConfirmWarnings { count: usize },
    /// At least one error
    Blocked { errors: usize },
}

impl CompileGate {
    pub fn from_issues(issues: &[ValidationIssue]) -> Self {
        let errors = issues.iter().filter(|i| i.is_error()).count();
        if errors > 0 {
            CompileGate::Blocked { errors }
        } else if issues.is_empty() {
            CompileGate::Proceed
        } else {
            CompileGate::ConfirmWarnings {
                count: issues.len(),
            }
        }
    }

    /// Resolve the gate given whether the author confirmed warnings.
    pub fn check(self, confirmed: bool) -> Result<(), PreviewError> {
        match self {
            CompileGate::Proceed => Ok(()),
            CompileGate::ConfirmWarnings { .. } if confirmed => Ok(()),
            CompileGate::ConfirmWarnings { count } => {
                Err(PreviewError::NeedsConfirmation { warnings: count })
            }
            CompileGate::Blocked { errors } => Err(PreviewError::CompileBlocked { errors }),
        }
    }
}
