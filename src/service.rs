//! Service-layer interfaces
//!
//! The validator and converter never touch shared state. Generation caching
//! and remote compilation belong to the surrounding service layer, which
//! gets them through the traits here.

use std::fmt;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::validate::ValidationIssue;
use crate::preview::CompileGate;
use crate::utils::error::PreviewResult;

// =============================================================================
// Generation cache
// =============================================================================

/// Caller-supplied cache for generated LaTeX.
pub trait GenerationCache {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String, ttl: Duration);
}

/// Build a cache key from a generation prompt.
pub fn cache_key(prompt: &str) -> String {
    format!("gen:{:016x}:{}", fxhash::hash64(prompt.trim()), prompt.trim().len())
}

/// In-process cache with per-entry expiry.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<FxHashMap<String, (String, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries that have not expired yet.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        match self.entries.lock() {
            Ok(entries) => entries.values().filter(|(_, at)| *at > now).count(),
            Err(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl GenerationCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(key) {
            Some((value, expires)) if *expires > Instant::now() => Some(value.clone()),
            Some(_) => {
                debug!(key, "cache entry expired");
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: &str, value: String, ttl: Duration) {
        match self.entries.lock() {
            Ok(mut entries) => {
                let now = Instant::now();
                let before = entries.len();
                entries.retain(|_, (_, expires)| *expires > now);
                let pruned = before - entries.len();
                if pruned > 0 {
                    debug!(pruned, "expired cache entries removed");
                }
                entries.insert(key.to_string(), (value, now + ttl));
            }
            Err(_) => warn!(key, "cache lock poisoned; entry not stored"),
        }
    }
}

/// Cache that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl GenerationCache for NoopCache {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: String, _ttl: Duration) {}
}

// =============================================================================
// Remote compilation
// =============================================================================

/// Why a remote compilation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompileErrorKind {
    /// The service could not be reached
    Network,
    /// The service did not answer in time
    Timeout,
    /// The LaTeX engine rejected the document
    LatexErrors,
    /// The service failed for its own reasons
    Server,
    /// The service answered with something that is not a PDF
    InvalidResponse,
}

impl fmt::Display for CompileErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompileErrorKind::Network => "network error",
            CompileErrorKind::Timeout => "timed out",
            CompileErrorKind::LatexErrors => "LaTeX errors",
            CompileErrorKind::Server => "server error",
            CompileErrorKind::InvalidResponse => "invalid response",
        };
        write!(f, "{}", s)
    }
}

/// Result of one compilation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CompileOutcome {
    Success { pdf: Vec<u8> },
    Failure { kind: CompileErrorKind, message: String },
}

impl CompileOutcome {
    pub fn failure(kind: CompileErrorKind, message: impl Into<String>) -> Self {
        CompileOutcome::Failure {
            kind,
            message: message.into(),
        }
    }

    /// Classify a raw HTTP response from a compile service.
    ///
    /// A 2xx body must start with the `%PDF` magic to count as a success.
    pub fn from_response(status: u16, body: Vec<u8>) -> Self {
        match status {
            200..=299 if body.starts_with(b"%PDF") => CompileOutcome::Success { pdf: body },
            200..=299 => CompileOutcome::failure(
                CompileErrorKind::InvalidResponse,
                "response body is not a PDF document",
            ),
            400 | 422 => CompileOutcome::failure(
                CompileErrorKind::LatexErrors,
                String::from_utf8_lossy(&body).trim().to_string(),
            ),
            408 | 504 => CompileOutcome::failure(CompileErrorKind::Timeout, "compilation timed out"),
            _ => CompileOutcome::failure(
                CompileErrorKind::Server,
                format!("compile service returned status {}", status),
            ),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CompileOutcome::Success { .. })
    }
}

/// A remote LaTeX to PDF compiler.
pub trait CompileService {
    fn compile(&self, latex: &str) -> CompileOutcome;
}

/// Compile `latex` if the validator issues allow it.
///
/// Errors always block. Warnings block unless `confirmed` is set.
pub fn compile_checked(
    service: &dyn CompileService,
    latex: &str,
    issues: &[ValidationIssue],
    confirmed: bool,
) -> PreviewResult<CompileOutcome> {
    CompileGate::from_issues(issues).check(confirmed)?;
    let outcome = service.compile(latex);
    if let CompileOutcome::Failure { kind, message } = &outcome {
        warn!(%kind, %message, "compilation failed");
    }
    Ok(outcome)
}
