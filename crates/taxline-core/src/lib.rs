//! Core library for GST tax invoice line-item extraction.
//!
//! This crate provides:
//! - Line classification and block segmentation of raw text dumps
//! - Tolerant header/summary field extraction with plausibility gating
//! - Description reconstruction that strips letterhead and bled-in fields
//! - Block assembly into validated line-item records
//! - An optional PDF text source (feature `pdf`)

pub mod error;
pub mod models;
pub mod source;
pub mod invoice;

pub use error::{ConfigError, LineItemError, SourceError, TaxlineError, Result};
pub use models::config::{MarkerTable, OutputConfig, OutputFormat, ParserConfig, TaxlineConfig};
pub use models::line_item::{
    BlockFailure, DiagnosticRecord, LineItemRecord, ParseOutput, ParseReport, ParseWarning,
};
pub use invoice::{LineItemParser, PostFilter, TaxInvoiceParser};
pub use source::{PlainText, TextFile, TextSource};
#[cfg(feature = "pdf")]
pub use source::PdfTextSource;
