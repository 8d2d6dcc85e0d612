//! Line-item records and the per-pass parse report.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LineItemError;

/// A single parsed invoice line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemRecord {
    /// 1-based position of the source block in the segmented sequence.
    pub sl_no: u32,

    /// 8-digit HSN tariff code.
    pub hsn: String,

    /// Package count.
    pub pkg: Decimal,

    /// Quantity.
    pub qty: Decimal,

    /// Unit of measure (e.g. `PCS`).
    pub unit: String,

    /// Unit rate.
    pub rate: Decimal,

    /// Line amount.
    pub amount: Decimal,

    /// Central GST rate (percent).
    pub cgst: Decimal,

    /// State GST rate (percent).
    pub sgst: Decimal,

    /// Product description prefixed with the item marker.
    pub description: String,
}

/// A block that produced no record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockFailure {
    /// 0-based index of the block in the segmented sequence.
    pub block_index: usize,

    /// Why the block was rejected.
    #[serde(serialize_with = "serialize_error")]
    pub error: LineItemError,
}

fn serialize_error<S>(error: &LineItemError, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeStruct;

    let mut state = serializer.serialize_struct("LineItemError", 2)?;
    state.serialize_field("kind", error.kind())?;
    state.serialize_field("message", &error.to_string())?;
    state.end()
}

/// Non-fatal observations recorded while assembling records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    /// `rate * qty` differs from the printed amount by more than the tolerance.
    AmountMismatch {
        sl_no: u32,
        expected: Decimal,
        actual: Decimal,
    },

    /// The printed rate was implausible and was replaced by `amount / qty`.
    RateDerived {
        sl_no: u32,
        raw: String,
        derived: Decimal,
    },
}

/// Everything a parse pass produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseReport {
    /// Records in document order.
    pub records: Vec<LineItemRecord>,

    /// Blocks that were rejected.
    pub failures: Vec<BlockFailure>,

    /// Warnings raised for accepted records.
    pub warnings: Vec<ParseWarning>,

    /// Number of segmented blocks.
    pub block_count: usize,

    /// Raw block text, kept for diagnostics.
    #[serde(skip)]
    pub blocks: Vec<Vec<String>>,
}

impl ParseReport {
    /// Number of blocks that produced a record.
    pub fn success_count(&self) -> usize {
        self.records.len()
    }

    /// Number of blocks that were rejected.
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Whether the record for `sl_no` carries an amount mismatch warning.
    pub fn has_amount_warning(&self, sl_no: u32) -> bool {
        self.warnings.iter().any(|w| {
            matches!(w, ParseWarning::AmountMismatch { sl_no: s, .. } if *s == sl_no)
        })
    }

    /// Convert into the externally visible output.
    ///
    /// An empty record list becomes a single diagnostic record carrying up to
    /// `sample` raw blocks.
    pub fn into_output(self, sample: usize) -> ParseOutput {
        if !self.records.is_empty() {
            return ParseOutput::Items(self.records);
        }

        ParseOutput::Diagnostic(DiagnosticRecord {
            error: "Parsing failed".to_string(),
            total_blocks: self.block_count,
            raw: self.blocks.into_iter().take(sample).collect(),
            debug: if self.block_count == 0 {
                "No item header lines found in input".to_string()
            } else {
                format!("All {} block(s) failed to parse", self.block_count)
            },
        })
    }
}

/// Emitted instead of records when nothing could be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    /// Error marker.
    pub error: String,

    /// Number of blocks the segmenter found.
    #[serde(rename = "totalBlocks")]
    pub total_blocks: usize,

    /// Sample of raw blocks.
    pub raw: Vec<Vec<String>>,

    /// Human-readable hint.
    pub debug: String,
}

/// Final parser output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParseOutput {
    /// Parsed records.
    Items(Vec<LineItemRecord>),
    /// Nothing parsed.
    Diagnostic(DiagnosticRecord),
}

impl ParseOutput {
    /// Whether this is the diagnostic record.
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, ParseOutput::Diagnostic(_))
    }

    /// Parsed records, empty for the diagnostic case.
    pub fn records(&self) -> &[LineItemRecord] {
        match self {
            ParseOutput::Items(items) => items,
            ParseOutput::Diagnostic(_) => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_report_becomes_diagnostic() {
        let report = ParseReport {
            block_count: 4,
            blocks: vec![
                vec!["A".to_string()],
                vec!["B".to_string()],
                vec!["C".to_string()],
                vec!["D".to_string()],
            ],
            ..Default::default()
        };

        let output = report.into_output(3);
        assert!(output.is_diagnostic());
        match output {
            ParseOutput::Diagnostic(diag) => {
                assert_eq!(diag.error, "Parsing failed");
                assert_eq!(diag.total_blocks, 4);
                assert_eq!(diag.raw.len(), 3);
            }
            ParseOutput::Items(_) => unreachable!(),
        }
    }

    #[test]
    fn test_diagnostic_json_shape() {
        let output = ParseReport::default().into_output(3);
        let json = serde_json::to_value(&output).unwrap();

        assert_eq!(json["error"], "Parsing failed");
        assert_eq!(json["totalBlocks"], 0);
        assert!(json["raw"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_failure_serializes_kind() {
        let failure = BlockFailure {
            block_index: 2,
            error: LineItemError::InsufficientBlockLength { lines: 1 },
        };
        let json = serde_json::to_value(&failure).unwrap();

        assert_eq!(json["block_index"], 2);
        assert_eq!(json["error"]["kind"], "insufficient_block_length");
    }
}
