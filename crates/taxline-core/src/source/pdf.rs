//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::debug;

use super::{Result, TextSource};
use crate::error::SourceError;

/// Embedded-text source for a PDF document.
pub struct PdfTextSource {
    raw_data: Vec<u8>,
    page_count: u32,
}

impl PdfTextSource {
    /// Load a PDF from bytes.
    pub fn load(data: &[u8]) -> Result<Self> {
        let mut doc = Document::load_mem(data).map_err(|e| SourceError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        let raw_data = if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(SourceError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract needs the decrypted bytes
            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| SourceError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = doc.get_pages().len() as u32;
        if page_count == 0 {
            return Err(SourceError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        Ok(Self {
            raw_data,
            page_count,
        })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.page_count
    }
}

impl TextSource for PdfTextSource {
    fn text(&self) -> Result<String> {
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| SourceError::TextExtraction(e.to_string()))
    }
}
