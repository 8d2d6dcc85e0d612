//! Data models for line-item extraction.

pub mod config;
pub mod line_item;

pub use config::{MarkerTable, OutputConfig, OutputFormat, ParserConfig, TaxlineConfig};
pub use line_item::{
    BlockFailure, DiagnosticRecord, LineItemRecord, ParseOutput, ParseReport, ParseWarning,
};
