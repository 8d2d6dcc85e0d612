//! Line-item extraction from invoice text.

mod parser;
pub mod postfilter;
pub mod rules;

pub use parser::TaxInvoiceParser;
pub use postfilter::PostFilter;

use crate::models::line_item::{ParseOutput, ParseReport};

/// Trait for line-item parsers.
pub trait LineItemParser {
    /// Parse `text` and keep every failure and warning.
    fn parse_report(&self, text: &str) -> ParseReport;

    /// Parse `text` into records, or a diagnostic record when none parse.
    fn parse(&self, text: &str) -> ParseOutput;
}
