//! Page-set transformation over paged documents
//!
//! This crate turns a loaded document plus an ordered page selection into
//! new output documents: one combined document, or one document per page,
//! optionally zipped. The decision logic is library-agnostic: it drives the
//! [`DocumentEngine`] and [`ArchivePacker`] traits, with a production
//! implementation over lopdf and an in-memory zip writer.
//!
//! The typical flow:
//! 1. Parse the user's page expression with [`PageSelection::parse`]
//!    (or build a selection from toggles / an explicit order).
//! 2. Build a [`TransformRequest`] with a mode and packaging.
//! 3. Run it through a [`Transformer`].
//!
//! Or hand a whole [`ToolCommand`] to [`command::run`] and get back a
//! [`RunReport`] with status, output bytes, and metrics.

pub mod archive;
pub mod command;
pub mod engine;
pub mod error;
pub mod lopdf_engine;
pub mod selection;
pub mod transform;

pub use archive::ZipPacker;
pub use command::{RequestStatus, RunMetrics, RunReport, ToolCommand};
pub use engine::{ArchivePacker, DocumentEngine};
pub use error::TransformError;
pub use lopdf_engine::LopdfEngine;
pub use selection::PageSelection;
pub use transform::{
    page_filename, OutputBundle, OutputDocument, Packaging, TransformMode, TransformRequest,
    Transformer,
};

/// Parse document bytes and return the page count.
pub fn page_count(bytes: &[u8]) -> Result<u32, TransformError> {
    let engine = LopdfEngine;
    let doc = engine.load(bytes)?;
    Ok(engine.page_count(&doc))
}
