//! Page-set transformation
//!
//! Converts a loaded source document plus an ordered page selection into
//! either one combined document or one document per selected page,
//! optionally bundled into an archive. Output page order is exactly
//! selection order; a request either fully succeeds or fails with no
//! partial output.

use crate::archive::ZipPacker;
use crate::engine::{ArchivePacker, DocumentEngine};
use crate::error::TransformError;
use crate::selection::PageSelection;

/// How selected pages are assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformMode {
    /// One output document containing the selection in order.
    Combined,
    /// One single-page output document per selected index.
    Separate,
}

/// How separate-mode outputs are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packaging {
    /// Hand back each document individually.
    None,
    /// Bundle all documents into one archive.
    Archive,
}

/// One transformation request. The source document is owned by the request
/// and discarded once outputs are produced.
pub struct TransformRequest<D> {
    pub source: D,
    pub selection: PageSelection,
    pub mode: TransformMode,
    pub packaging: Packaging,
}

/// A serialized output document with its download filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Terminal artifact of a transform request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputBundle {
    /// Combined mode: one multi-page document.
    Single(Vec<u8>),
    /// Separate mode without packaging: one document per selected page.
    Documents(Vec<OutputDocument>),
    /// Separate mode with packaging: all documents in one archive.
    Archive(Vec<u8>),
}

/// Deterministic filename for a separate-mode output page.
pub fn page_filename(index: u32, extension: &str) -> String {
    format!("Page_{}.{}", index + 1, extension)
}

/// Drives a [`DocumentEngine`] and an [`ArchivePacker`] through transform
/// requests.
pub struct Transformer<E, P = ZipPacker> {
    engine: E,
    packer: P,
}

impl<E: DocumentEngine> Transformer<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            packer: ZipPacker::new(),
        }
    }
}

impl<E: DocumentEngine, P: ArchivePacker> Transformer<E, P> {
    pub fn with_packer(engine: E, packer: P) -> Self {
        Self { engine, packer }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Run a request to completion. See [`Self::transform_with_progress`].
    pub fn transform(
        &self,
        request: TransformRequest<E::Document>,
    ) -> Result<OutputBundle, TransformError> {
        self.transform_with_progress(request, |_, _| {})
    }

    /// Run a request, reporting `(pages_processed, pages_total)` after each
    /// page. Engine calls are strictly sequential: every copy completes
    /// before the next begins, since engines may keep document-wide state
    /// that is not safe to mutate from two call sites.
    pub fn transform_with_progress<F>(
        &self,
        request: TransformRequest<E::Document>,
        mut progress: F,
    ) -> Result<OutputBundle, TransformError>
    where
        F: FnMut(u32, u32),
    {
        let TransformRequest {
            source,
            selection,
            mode,
            packaging,
        } = request;

        if selection.is_empty() {
            return Err(TransformError::NoValidPages);
        }

        let page_count = self.engine.page_count(&source);
        if let Some(&bad) = selection.indices().iter().find(|&&i| i >= page_count) {
            return Err(TransformError::InvalidSelection(format!(
                "page index {} out of range (document has {} pages)",
                bad, page_count
            )));
        }

        let total = selection.len() as u32;

        match mode {
            TransformMode::Combined => {
                let mut output = self.engine.create_empty();
                let pages = self.engine.copy_pages(&source, selection.indices())?;

                let mut processed = 0;
                for page in pages {
                    self.engine.append_page(&mut output, page)?;
                    processed += 1;
                    progress(processed, total);
                }

                let bytes = self.engine.serialize(&mut output)?;
                Ok(OutputBundle::Single(bytes))
            }
            TransformMode::Separate => {
                let extension = self.engine.file_extension();
                let mut outputs = Vec::with_capacity(selection.len());

                for (processed, &index) in selection.indices().iter().enumerate() {
                    let mut output = self.engine.create_empty();
                    for page in self.engine.copy_pages(&source, &[index])? {
                        self.engine.append_page(&mut output, page)?;
                    }
                    let bytes = self.engine.serialize(&mut output)?;

                    outputs.push(OutputDocument {
                        filename: page_filename(index, extension),
                        bytes,
                    });
                    progress(processed as u32 + 1, total);
                }

                match packaging {
                    Packaging::Archive => {
                        let mut archive = self.packer.create();
                        for doc in &outputs {
                            self.packer.add_entry(&mut archive, &doc.filename, &doc.bytes)?;
                        }
                        Ok(OutputBundle::Archive(self.packer.finalize(archive)?))
                    }
                    Packaging::None => Ok(OutputBundle::Documents(outputs)),
                }
            }
        }
    }
}
