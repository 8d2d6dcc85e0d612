//! Error types for the taxline-core library.

use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the taxline library.
#[derive(Error, Debug)]
pub enum TaxlineError {
    /// Text source error.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Line item extraction error.
    #[error("line item error: {0}")]
    LineItem(#[from] LineItemError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors scoped to a single item block.
///
/// None of these abort a parse pass; the assembler records them against the
/// failing block and moves on to the next one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineItemError {
    /// The block has fewer raw lines than the header, serial and summary need.
    #[error("insufficient block length: {lines} line(s), need at least 3")]
    InsufficientBlockLength { lines: usize },

    /// No header pattern variant matched the block's first line.
    #[error("failed to parse header line: {line:?}")]
    HeaderParseFailed { line: String },

    /// The summary line has no leading amount.
    #[error("failed to parse summary line: {line:?}")]
    SummaryParseFailed { line: String },

    /// The rate failed plausibility and could not be derived from amount / qty.
    #[error("invalid rate {raw:?} (derived: {derived:?})")]
    InvalidRate { raw: String, derived: Option<Decimal> },

    /// rate x qty does not fit in a decimal.
    #[error("amount check overflowed: rate {rate} x qty {qty}")]
    AmountOverflow { rate: Decimal, qty: Decimal },
}

impl LineItemError {
    /// Short machine-friendly kind name.
    pub fn kind(&self) -> &'static str {
        match self {
            LineItemError::InsufficientBlockLength { .. } => "insufficient_block_length",
            LineItemError::HeaderParseFailed { .. } => "header_parse_failed",
            LineItemError::SummaryParseFailed { .. } => "summary_parse_failed",
            LineItemError::InvalidRate { .. } => "invalid_rate",
            LineItemError::AmountOverflow { .. } => "amount_overflow",
        }
    }
}

/// Errors related to acquiring the raw text dump.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Unsupported input type.
    #[error("unsupported input: {0}")]
    Unsupported(String),

    /// I/O error while reading the input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors in parser configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A marker or shape pattern does not compile.
    #[error("invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A numeric setting is out of range.
    #[error("invalid value for {field}: {reason}")]
    Value { field: String, reason: String },

    /// The configuration file could not be read or written.
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON for this schema.
    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for the taxline library.
pub type Result<T> = std::result::Result<T, TaxlineError>;
