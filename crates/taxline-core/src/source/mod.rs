//! Raw text acquisition.
//!
//! The parser itself only ever sees a text blob. These sources cover the
//! common ways of getting one: text already in memory, a `.txt` dump on disk,
//! or the embedded text layer of a PDF (feature `pdf`).

#[cfg(feature = "pdf")]
mod pdf;

#[cfg(feature = "pdf")]
pub use pdf::PdfTextSource;

use std::path::{Path, PathBuf};

use crate::error::SourceError;

/// Result type for source operations.
pub type Result<T> = std::result::Result<T, SourceError>;

/// Anything that can yield the full text dump of one invoice.
pub trait TextSource {
    /// Return the complete text.
    fn text(&self) -> Result<String>;
}

/// Text that is already available.
#[derive(Debug, Clone)]
pub struct PlainText(pub String);

impl TextSource for PlainText {
    fn text(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// A UTF-8 text dump on disk.
#[derive(Debug, Clone)]
pub struct TextFile {
    path: PathBuf,
}

impl TextFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TextSource for TextFile {
    fn text(&self) -> Result<String> {
        let bytes = std::fs::read(&self.path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Pick a source for `path` by its extension.
///
/// `.pdf` needs the `pdf` feature; anything else is read as text.
pub fn open(path: &Path) -> Result<Box<dyn TextSource>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        #[cfg(feature = "pdf")]
        "pdf" => {
            let data = std::fs::read(path)?;
            Ok(Box::new(PdfTextSource::load(&data)?))
        }
        #[cfg(not(feature = "pdf"))]
        "pdf" => Err(SourceError::Unsupported(
            "PDF input requires the `pdf` feature".to_string(),
        )),
        _ => Ok(Box::new(TextFile::new(path))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_source() {
        let source = PlainText("TWW 94042190 1 9.00 PCS 720.00".to_string());
        assert_eq!(source.text().unwrap(), "TWW 94042190 1 9.00 PCS 720.00");
    }

    #[test]
    fn test_missing_text_file() {
        let source = TextFile::new("/nonexistent/taxline/input.txt");
        assert!(matches!(source.text(), Err(SourceError::Io(_))));
    }
}
