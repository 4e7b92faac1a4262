//! Zip-backed archive packer
//!
//! Bundles separate-mode outputs into one in-memory zip for download.

use crate::engine::ArchivePacker;
use crate::error::TransformError;
use std::io::{Cursor, Write};
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

/// Production packer writing deflated entries into an in-memory zip.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipPacker;

impl ZipPacker {
    pub fn new() -> Self {
        Self
    }
}

impl ArchivePacker for ZipPacker {
    type Archive = ZipWriter<Cursor<Vec<u8>>>;

    fn create(&self) -> Self::Archive {
        ZipWriter::new(Cursor::new(Vec::new()))
    }

    fn add_entry(
        &self,
        archive: &mut Self::Archive,
        filename: &str,
        bytes: &[u8],
    ) -> Result<(), TransformError> {
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        archive
            .start_file(filename, options)
            .map_err(|e| TransformError::Packaging(e.to_string()))?;
        archive
            .write_all(bytes)
            .map_err(|e| TransformError::Packaging(e.to_string()))?;

        Ok(())
    }

    fn finalize(&self, archive: Self::Archive) -> Result<Vec<u8>, TransformError> {
        let cursor = archive
            .finish()
            .map_err(|e| TransformError::Packaging(e.to_string()))?;

        Ok(cursor.into_inner())
    }
}
