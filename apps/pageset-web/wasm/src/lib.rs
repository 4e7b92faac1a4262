//! WASM bindings for the page-set tool suite
//!
//! Each tool page (extract, split, delete, reorder) drives one
//! [`PageSetSession`]; all state lives in Rust and JavaScript only handles
//! DOM events and file I/O.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { PageSetSession, ToolMode } from './pkg/pageset_wasm.js';
//!
//! await init();
//!
//! const session = new PageSetSession(ToolMode.Extract);
//! session.setProgressCallback((current, total, msg) => updateUI(current, total, msg));
//! const summary = session.loadDocument("file.pdf", bytes);
//! session.setRangeSelection("1-3, 5");
//! const result = session.execute();
//! downloadBlob(result, session.outputFilename(), session.outputMime());
//! ```

pub mod session;
pub mod validation;

use wasm_bindgen::prelude::*;

// Re-export main types for JavaScript
pub use session::{PageSetSession, ToolMode};
pub use validation::DocumentSummary;

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    web_sys::console::debug_1(&"pageset wasm initialized".into());
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Structural sanity check for a candidate file
/// Returns Ok(()) if it looks like a PDF, Err with message if not
#[wasm_bindgen]
pub fn quick_check(bytes: &[u8]) -> Result<(), JsValue> {
    validation::quick_check(bytes).map_err(|e| JsValue::from_str(&e))
}

/// Parse a file and return its summary without creating a session
/// Useful for showing file info before the user picks a tool
#[wasm_bindgen]
pub fn document_summary(bytes: &[u8]) -> Result<JsValue, JsValue> {
    let summary = validation::inspect(bytes).map_err(|e| JsValue::from_str(&e))?;

    serde_wasm_bindgen::to_value(&summary)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Get page count from document bytes (convenience function)
#[wasm_bindgen]
pub fn page_count(bytes: &[u8]) -> Result<u32, JsValue> {
    let summary = validation::inspect(bytes).map_err(|e| JsValue::from_str(&e))?;
    Ok(summary.page_count)
}

/// Format a byte count for display
#[wasm_bindgen]
pub fn format_file_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;
    const GB: usize = MB * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else if bytes < GB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    }
}
