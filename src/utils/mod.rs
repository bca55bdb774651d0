//! Utility modules
//!
//! This module contains utilities and helpers:
//! - Error types and result types
//! - Terminal formatting of validation issues
//! - Word count and document metrics
//! - Configuration file loading

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod latex_analysis;

// Re-export commonly used items
pub use config::{check_config, Config};
pub use diagnostics::format_issues;
pub use error::{PreviewError, PreviewResult};
pub use latex_analysis::{stats_source, word_count, DocumentStats};
