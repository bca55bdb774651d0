//! WASM bindings for texpreview
//!
//! This module provides JavaScript-accessible functions for validating LaTeX
//! and converting it to preview HTML.

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

#[cfg(feature = "wasm")]
use indexmap::IndexMap;
#[cfg(feature = "wasm")]
use serde::Serialize;

#[cfg(feature = "wasm")]
use crate::core::latex2html::{convert_with_options, ConversionResult, ConvertOptions};
#[cfg(feature = "wasm")]
use crate::core::validate::{validate_with_options, ValidateOptions, ValidationIssue};

/// Error object handed to JavaScript when a result cannot be serialized.
#[cfg(feature = "wasm")]
#[derive(Serialize)]
struct ErrorResult {
    error: String,
}

/// Safely serialize a value to JsValue, returning an error object on failure.
///
/// This prevents panics from `unwrap()` when serialization fails.
#[cfg(feature = "wasm")]
fn to_js_value<T: Serialize>(value: &T) -> JsValue {
    // Plain objects for maps, so `mathMap` arrives as `{ "__MTH_0__": ... }`.
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    value.serialize(&serializer).unwrap_or_else(|e| {
        let error_obj = ErrorResult {
            error: format!("Serialization error: {}", e),
        };
        serde_wasm_bindgen::to_value(&error_obj).unwrap_or(JsValue::NULL)
    })
}

/// Initialize panic hook for better error messages in browser console
#[cfg(feature = "wasm")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Validate LaTeX source
///
/// # Arguments
/// * `input` - LaTeX source
/// * `options` - optional `{ forbidden_commands, max_listed_math_commands }`
///
/// # Returns
/// An array of `{ kind: "error" | "warning", message }`
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "validateLatex")]
pub fn validate_latex_wasm(input: &str, options: JsValue) -> JsValue {
    let opts: ValidateOptions = serde_wasm_bindgen::from_value(options).unwrap_or_default();
    let issues: Vec<ValidationIssue> = validate_with_options(input, &opts);
    to_js_value(&issues)
}

/// Convert LaTeX source to preview HTML
///
/// # Returns
/// `{ html, mathMap }`; `html` still contains the math tokens
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "convertLatex")]
pub fn convert_latex_wasm(input: &str, options: JsValue) -> JsValue {
    let opts: ConvertOptions = serde_wasm_bindgen::from_value(options).unwrap_or_default();
    let result: ConversionResult = convert_with_options(input, &opts);
    to_js_value(&result)
}

/// Put raw math back in place of its tokens, after sanitization
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "restoreMath")]
pub fn restore_math_wasm(html: &str, math_map: JsValue) -> String {
    let map: IndexMap<String, String> =
        serde_wasm_bindgen::from_value(math_map).unwrap_or_default();
    crate::preview::restore_math(html, &map)
}

/// Count the words of the rendered text
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "wordCount")]
pub fn word_count_wasm(input: &str) -> usize {
    crate::utils::latex_analysis::word_count(input)
}

/// Word count plus heading, equation, table, list item and footnote counts
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "documentStats")]
pub fn document_stats_wasm(input: &str) -> JsValue {
    to_js_value(&crate::utils::latex_analysis::stats_source(input))
}

/// Decide whether the document may be compiled
///
/// # Returns
/// `{ decision: "proceed" }`, `{ decision: "confirmWarnings", count }` or
/// `{ decision: "blocked", errors }`
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "compileGate")]
pub fn compile_gate_wasm(input: &str) -> JsValue {
    let issues = crate::core::validate::validate(input);
    to_js_value(&crate::preview::CompileGate::from_issues(&issues))
}

/// Get library version
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "getVersion")]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
