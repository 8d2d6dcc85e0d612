//! Block assembly and the top-level line-item parser.

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::postfilter::PostFilter;
use super::rules::{
    segment, Block, CompiledMarkers, DescriptionReconstructor, HeaderExtractor, LineClassifier,
    RateField, SummaryExtractor,
};
use super::LineItemParser;
use crate::error::{ConfigError, LineItemError, Result};
use crate::models::config::{ParserConfig, TaxlineConfig};
use crate::models::line_item::{
    BlockFailure, LineItemRecord, ParseOutput, ParseReport, ParseWarning,
};
use crate::source::TextSource;

/// Line index of the summary line inside a block; index 1 is the serial number.
const SUMMARY_LINE: usize = 2;

/// Minimum number of lines a block needs to yield a record.
const MIN_BLOCK_LINES: usize = 3;

/// Rule-based parser for GST tax-invoice line items.
pub struct TaxInvoiceParser {
    config: ParserConfig,
    markers: CompiledMarkers,
    post_filter: PostFilter,
    strip_trailing_rates: bool,
    diagnostic_sample: usize,
}

impl TaxInvoiceParser {
    /// Create a parser with the built-in marker table and defaults.
    pub fn new() -> Self {
        Self::from_config(&TaxlineConfig::default())
            .expect("built-in marker table compiles")
    }

    /// Create a parser from a loaded configuration.
    pub fn from_config(config: &TaxlineConfig) -> std::result::Result<Self, ConfigError> {
        config.parser.validate()?;
        let markers = CompiledMarkers::compile(&config.markers)?;
        let post_filter = PostFilter::new(&markers, config.parser.default_tax_rate)?;

        Ok(Self {
            config: config.parser.clone(),
            markers,
            post_filter,
            strip_trailing_rates: config.output.strip_trailing_rates,
            diagnostic_sample: config.parser.diagnostic_sample,
        })
    }

    /// Enable the trailing-rate post-filter.
    pub fn with_strip_trailing_rates(mut self, enabled: bool) -> Self {
        self.strip_trailing_rates = enabled;
        self
    }

    /// Parser settings in use.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// The post-filter used when trailing-rate stripping is on.
    pub fn post_filter(&self) -> &PostFilter {
        &self.post_filter
    }

    /// Read `source` and parse its text.
    pub fn parse_source(&self, source: &dyn TextSource) -> Result<ParseOutput> {
        let text = source.text()?;
        Ok(self.parse(&text))
    }

    /// Split `text` into blocks without assembling them.
    pub fn segment(&self, text: &str) -> Vec<Block> {
        let classifier = LineClassifier::new(&self.markers);
        segment(text, &classifier)
    }

    fn assemble(
        &self,
        block_index: usize,
        block: &Block,
    ) -> std::result::Result<(LineItemRecord, Vec<ParseWarning>), LineItemError> {
        if block.len() < MIN_BLOCK_LINES {
            return Err(LineItemError::InsufficientBlockLength { lines: block.len() });
        }

        let sl_no = (block_index + 1) as u32;
        let mut warnings = Vec::new();

        let header = HeaderExtractor::new(&self.config).extract(block.header())?;

        let summary_line = block.line(SUMMARY_LINE).unwrap_or_default();
        let summary =
            SummaryExtractor::new(self.config.default_tax_rate).extract(summary_line)?;

        let rate = match header.rate {
            RateField::Plausible(rate) => rate,
            RateField::Implausible(raw) => {
                let Some(derived) = summary.amount.checked_div(header.qty) else {
                    warn!("Item {}: amount / qty overflowed", sl_no);
                    return Err(LineItemError::InvalidRate { raw, derived: None });
                };
                let derived = derived.round_dp(4);
                if derived <= Decimal::ZERO || !self.config.rate_in_range(derived) {
                    return Err(LineItemError::InvalidRate {
                        raw,
                        derived: Some(derived),
                    });
                }
                info!("Item {}: rate {:?} replaced by derived {}", sl_no, raw, derived);
                warnings.push(ParseWarning::RateDerived { sl_no, raw, derived });
                derived
            }
        };

        let trailing = block.lines_from(SUMMARY_LINE + 1);
        let patterns = self.markers.for_marker(&header.marker);
        let reconstructed = DescriptionReconstructor::new(&self.markers, &self.config)
            .reconstruct(&patterns, &summary.remainder, &trailing, summary.cgst);

        let Some(expected) = rate.checked_mul(header.qty) else {
            return Err(LineItemError::AmountOverflow {
                rate,
                qty: header.qty,
            });
        };
        let off_by = expected.checked_sub(summary.amount).map(|d| d.abs());
        if off_by.is_none_or(|d| d > self.config.amount_tolerance) {
            warn!(
                "Item {}: rate x qty = {} but amount is {}",
                sl_no, expected, summary.amount
            );
            warnings.push(ParseWarning::AmountMismatch {
                sl_no,
                expected,
                actual: summary.amount,
            });
        }

        let record = LineItemRecord {
            sl_no,
            hsn: header.hsn,
            pkg: header.pkg,
            qty: header.qty,
            unit: header.unit,
            rate,
            amount: summary.amount,
            cgst: summary.cgst,
            sgst: reconstructed.sgst,
            description: reconstructed.description,
        };

        let record = if self.strip_trailing_rates {
            self.post_filter.apply_with(&record, &patterns)
        } else {
            record
        };

        Ok((record, warnings))
    }
}

impl Default for TaxInvoiceParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LineItemParser for TaxInvoiceParser {
    fn parse_report(&self, text: &str) -> ParseReport {
        info!("Parsing line items from {} characters of text", text.len());

        let blocks = self.segment(text);
        let mut report = ParseReport {
            block_count: blocks.len(),
            ..ParseReport::default()
        };

        for (index, block) in blocks.iter().enumerate() {
            match self.assemble(index, block) {
                Ok((record, warnings)) => {
                    debug!("Block {} -> item {}: {}", index, record.sl_no, record.description);
                    report.records.push(record);
                    report.warnings.extend(warnings);
                }
                Err(error) => {
                    warn!("Block {} rejected: {}", index, error);
                    report.failures.push(BlockFailure {
                        block_index: index,
                        error,
                    });
                }
            }
        }
        report.blocks = blocks.iter().map(Block::to_strings).collect();

        info!(
            "Parsed {} of {} block(s), {} warning(s)",
            report.success_count(),
            report.block_count,
            report.warnings.len()
        );
        report
    }

    fn parse(&self, text: &str) -> ParseOutput {
        self.parse_report(text).into_output(self.diagnostic_sample)
    }
}
