//! Stateful page-tool session
//!
//! Holds the loaded source document, the pending page selection, and the
//! tool mode in Rust, so JavaScript only handles DOM events and file I/O.

use crate::validation::{inspect, DocumentSummary};
use lopdf::Document;
use pageset_core::{
    DocumentEngine, LopdfEngine, OutputBundle, Packaging, PageSelection, TransformMode,
    TransformRequest, Transformer,
};
use wasm_bindgen::prelude::*;

/// Which tool page is driving this session.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolMode {
    /// Extract selected pages into one document
    Extract,
    /// Save each selected page as its own document, zipped
    Split,
    /// Remove selected pages, keep the rest
    Delete,
    /// Rebuild the document with pages in a caller-supplied order
    Reorder,
}

struct SourceEntry {
    name: String,
    document: Document,
    summary: DocumentSummary,
}

/// One loaded document, one pending selection, one tool.
#[wasm_bindgen]
pub struct PageSetSession {
    mode: ToolMode,
    source: Option<SourceEntry>,
    /// Zero-based page indices, in output order (for Delete: pages to remove)
    selection: Vec<u32>,
    progress_callback: Option<js_sys::Function>,
}

impl PageSetSession {
    fn load_document_internal(&mut self, name: &str, bytes: &[u8]) -> Result<DocumentSummary, String> {
        let summary = inspect(bytes)?;
        let document =
            Document::load_mem(bytes).map_err(|e| format!("Failed to parse PDF: {}", e))?;

        // Loading a new file replaces the previous one; each tool run works
        // on exactly one source.
        self.source = Some(SourceEntry {
            name: name.to_string(),
            document,
            summary: summary.clone(),
        });
        self.selection.clear();

        Ok(summary)
    }

    fn set_range_selection_internal(&mut self, ranges: &str) -> Result<(), String> {
        let page_count = self.page_count_internal().ok_or("No document loaded")?;
        let selection =
            PageSelection::parse(ranges, page_count).map_err(|e| e.to_string())?;
        self.selection = selection.indices().to_vec();
        Ok(())
    }

    fn set_toggled_selection_internal(&mut self, toggled: &[u32]) -> Result<(), String> {
        let page_count = self.page_count_internal().ok_or("No document loaded")?;
        let selection =
            PageSelection::from_toggled(toggled, page_count).map_err(|e| e.to_string())?;
        self.selection = selection.indices().to_vec();
        Ok(())
    }

    fn set_page_order_internal(&mut self, order: &[u32]) -> Result<(), String> {
        let page_count = self.page_count_internal().ok_or("No document loaded")?;
        let selection =
            PageSelection::from_order(order, page_count).map_err(|e| e.to_string())?;
        self.selection = selection.indices().to_vec();
        Ok(())
    }

    fn page_count_internal(&self) -> Option<u32> {
        self.source.as_ref().map(|entry| entry.summary.page_count)
    }

    fn execute_internal(&self) -> Result<Vec<u8>, String> {
        let entry = self.source.as_ref().ok_or("No document loaded")?;

        let engine = LopdfEngine;
        let page_count = engine.page_count(&entry.document);

        let selection = match self.mode {
            ToolMode::Delete => PageSelection::from_toggled(&self.selection, page_count)
                .and_then(|to_delete| to_delete.complement(page_count)),
            _ => PageSelection::from_order(&self.selection, page_count),
        }
        .map_err(|e| e.to_string())?;

        let (mode, packaging) = match self.mode {
            ToolMode::Split => (TransformMode::Separate, Packaging::Archive),
            _ => (TransformMode::Combined, Packaging::None),
        };

        let request = TransformRequest {
            source: entry.document.clone(),
            selection,
            mode,
            packaging,
        };

        let transformer = Transformer::new(engine);
        let bundle = transformer
            .transform_with_progress(request, |done, total| self.report_progress(done, total))
            .map_err(|e| e.to_string())?;

        match bundle {
            OutputBundle::Single(bytes) | OutputBundle::Archive(bytes) => Ok(bytes),
            OutputBundle::Documents(_) => Err("expected a single downloadable artifact".into()),
        }
    }

    fn report_progress(&self, done: u32, total: u32) {
        if let Some(ref callback) = self.progress_callback {
            let this = JsValue::null();
            let _ = callback.call3(
                &this,
                &JsValue::from(done),
                &JsValue::from(total),
                &JsValue::from_str(&format!("Processing page {}/{}...", done, total)),
            );
        }
    }
}

#[wasm_bindgen]
impl PageSetSession {
    /// Create a session for one tool page
    #[wasm_bindgen(constructor)]
    pub fn new(mode: ToolMode) -> Self {
        Self {
            mode,
            source: None,
            selection: Vec::new(),
            progress_callback: None,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    /// Set a progress callback function
    /// Callback signature: (current: number, total: number, message: string) => void
    #[wasm_bindgen(js_name = setProgressCallback)]
    pub fn set_progress_callback(&mut self, callback: js_sys::Function) {
        self.progress_callback = Some(callback);
    }

    /// Load the source document; returns its summary as a JS object
    #[wasm_bindgen(js_name = loadDocument)]
    pub fn load_document(&mut self, name: &str, bytes: &[u8]) -> Result<JsValue, JsValue> {
        let summary = self
            .load_document_internal(name, bytes)
            .map_err(|e| JsValue::from_str(&e))?;

        serde_wasm_bindgen::to_value(&summary)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Name of the loaded source document, if any
    #[wasm_bindgen(js_name = documentName)]
    pub fn document_name(&self) -> Option<String> {
        self.source.as_ref().map(|entry| entry.name.clone())
    }

    /// Page count of the loaded source document (0 if none loaded)
    #[wasm_bindgen(js_name = pageCount)]
    pub fn page_count(&self) -> u32 {
        self.page_count_internal().unwrap_or(0)
    }

    /// Set the selection from a range expression like "1-3, 5"
    #[wasm_bindgen(js_name = setRangeSelection)]
    pub fn set_range_selection(&mut self, ranges: &str) -> Result<(), JsValue> {
        self.set_range_selection_internal(ranges)
            .map_err(|e| JsValue::from_str(&e))
    }

    /// Set the selection from checkbox toggles (zero-based indices;
    /// collapses to ascending order)
    #[wasm_bindgen(js_name = setToggledSelection)]
    pub fn set_toggled_selection(&mut self, toggled: &[u32]) -> Result<(), JsValue> {
        self.set_toggled_selection_internal(toggled)
            .map_err(|e| JsValue::from_str(&e))
    }

    /// Set an explicit page order (zero-based indices) for reorder tools
    #[wasm_bindgen(js_name = setPageOrder)]
    pub fn set_page_order(&mut self, order: &[u32]) -> Result<(), JsValue> {
        self.set_page_order_internal(order)
            .map_err(|e| JsValue::from_str(&e))
    }

    /// Current selection as zero-based indices, in output order
    #[wasm_bindgen(js_name = selectedPages)]
    pub fn selected_pages(&self) -> Vec<u32> {
        self.selection.clone()
    }

    /// Whether the session has enough state to execute
    #[wasm_bindgen(js_name = canExecute)]
    pub fn can_execute(&self) -> bool {
        self.source.is_some() && !self.selection.is_empty()
    }

    /// Run the tool and return the result bytes
    pub fn execute(&self) -> Result<js_sys::Uint8Array, JsValue> {
        if !self.can_execute() {
            return Err(JsValue::from_str("Session not ready for execution"));
        }

        let result = self.execute_internal().map_err(|e| JsValue::from_str(&e))?;

        let array = js_sys::Uint8Array::new_with_length(result.len() as u32);
        array.copy_from(&result);
        Ok(array)
    }

    /// Suggested filename for the result download
    #[wasm_bindgen(js_name = outputFilename)]
    pub fn output_filename(&self) -> String {
        match self.mode {
            ToolMode::Extract => "extracted.pdf",
            ToolMode::Split => "split_pages.zip",
            ToolMode::Delete => "remaining.pdf",
            ToolMode::Reorder => "reordered.pdf",
        }
        .to_string()
    }

    /// MIME type of the result download
    #[wasm_bindgen(js_name = outputMime)]
    pub fn output_mime(&self) -> String {
        match self.mode {
            ToolMode::Split => "application/zip",
            _ => "application/pdf",
        }
        .to_string()
    }
}
