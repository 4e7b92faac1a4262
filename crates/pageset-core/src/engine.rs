//! Capability traits for the underlying document and archive libraries
//!
//! The transformer never touches a PDF library directly; it drives these
//! traits, so it can run against a fake engine in tests and against lopdf
//! in production.

use crate::error::TransformError;

/// Paged-document capability: load, copy pages out, build new documents.
///
/// `Document` is an opaque in-memory document. `Page` is a detached copy of
/// a single page that can be appended to any document created by the same
/// engine. Copying is by value: an appended page never shares mutable state
/// with its source document.
pub trait DocumentEngine {
    type Document;
    type Page;

    /// Parse a serialized document.
    fn load(&self, bytes: &[u8]) -> Result<Self::Document, TransformError>;

    /// Number of pages in the document.
    fn page_count(&self, doc: &Self::Document) -> u32;

    /// Create a new empty document.
    fn create_empty(&self) -> Self::Document;

    /// Copy the pages at the given zero-based indices, in the given order.
    /// Duplicate indices yield independent copies.
    fn copy_pages(
        &self,
        source: &Self::Document,
        indices: &[u32],
    ) -> Result<Vec<Self::Page>, TransformError>;

    /// Append a copied page to the end of a document.
    fn append_page(
        &self,
        doc: &mut Self::Document,
        page: Self::Page,
    ) -> Result<(), TransformError>;

    /// Serialize a document to bytes.
    fn serialize(&self, doc: &mut Self::Document) -> Result<Vec<u8>, TransformError>;

    /// File extension for serialized output (no leading dot).
    fn file_extension(&self) -> &'static str;
}

/// Archive capability for bundling multiple outputs into one download.
pub trait ArchivePacker {
    type Archive;

    fn create(&self) -> Self::Archive;

    fn add_entry(
        &self,
        archive: &mut Self::Archive,
        filename: &str,
        bytes: &[u8],
    ) -> Result<(), TransformError>;

    fn finalize(&self, archive: Self::Archive) -> Result<Vec<u8>, TransformError>;
}
