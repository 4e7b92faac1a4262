//! Pre-flight document inspection
//!
//! Cheap sanity checks and a parsed summary so the UI can render file info
//! before the user commits to a tool run.

use lopdf::Document;
use serde::Serialize;

/// Summary of a loaded source document.
#[derive(Debug, Clone, Serialize, Default)]
pub struct DocumentSummary {
    /// Number of pages in the document
    pub page_count: u32,
    /// PDF version string (e.g., "1.7")
    pub version: String,
    /// Whether the document is encrypted
    pub encrypted: bool,
    /// File size in bytes
    pub size_bytes: usize,
}

/// Structural sanity check without parsing the object graph.
pub fn quick_check(bytes: &[u8]) -> Result<(), String> {
    if bytes.len() < 8 {
        return Err("File too small to be a PDF".to_string());
    }

    if !bytes.starts_with(b"%PDF-") {
        return Err("Not a PDF file (missing %PDF- header)".to_string());
    }

    // The EOF marker sits within the last kilobyte of any intact file
    let tail = &bytes[bytes.len().saturating_sub(1024)..];
    if !tail.windows(5).any(|w| w == b"%%EOF") {
        return Err("PDF appears truncated (missing %%EOF marker)".to_string());
    }

    Ok(())
}

/// Fully parse the document and extract its summary.
pub fn inspect(bytes: &[u8]) -> Result<DocumentSummary, String> {
    quick_check(bytes)?;

    let document =
        Document::load_mem(bytes).map_err(|e| format!("Failed to parse PDF: {}", e))?;

    let page_count = document.get_pages().len() as u32;
    if page_count == 0 {
        return Err("PDF has no pages".to_string());
    }

    Ok(DocumentSummary {
        page_count,
        version: document.version.clone(),
        encrypted: document.is_encrypted(),
        size_bytes: bytes.len(),
    })
}
