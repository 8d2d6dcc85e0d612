//! Configuration structures for the line-item parser.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Main configuration for taxline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxlineConfig {
    /// Numeric thresholds used while parsing.
    pub parser: ParserConfig,

    /// Marker and pattern tables describing the invoice template.
    pub markers: MarkerTable,

    /// Output defaults for the CLI.
    pub output: OutputConfig,
}

/// Numeric parser settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Absolute tolerance for the rate x qty = amount cross-check.
    pub amount_tolerance: Decimal,

    /// Smallest plausible unit rate (inclusive).
    pub min_rate: Decimal,

    /// Largest plausible unit rate (inclusive).
    pub max_rate: Decimal,

    /// Longest accepted rate token, in characters.
    pub max_rate_len: usize,

    /// CGST used when the summary line carries an amount only. Also the
    /// conventional rate stripped from the end of descriptions.
    pub default_tax_rate: Decimal,

    /// Secondary tax candidates above this percentage are rejected.
    pub max_tax_rate: Decimal,

    /// Number of tokens (candidate included) checked against continuation shapes.
    pub sgst_window: usize,

    /// Number of raw blocks copied into the diagnostic record.
    pub diagnostic_sample: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            amount_tolerance: Decimal::new(1, 2),
            min_rate: Decimal::new(1, 2),
            max_rate: Decimal::new(1_000_000, 0),
            max_rate_len: 10,
            default_tax_rate: Decimal::new(900, 2),
            max_tax_rate: Decimal::new(100, 0),
            sgst_window: 6,
            diagnostic_sample: 3,
        }
    }
}

/// Literal markers and pattern templates for one invoice layout.
///
/// Literal markers are matched as substrings. `continuation_shapes` are regex
/// templates where `{marker}` expands to the block's escaped item marker and
/// `{units}` to an alternation of `unit_codes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerTable {
    /// Lines that end the item table (totals, signatory, dispatch footer).
    pub terminators: Vec<String>,

    /// Recurring boilerplate lines that are dropped without closing a block.
    pub skip_markers: Vec<String>,

    /// Trailing description lines containing any of these are dropped.
    pub page_break_markers: Vec<String>,

    /// Substrings removed from the working description (case-insensitive).
    pub page_break_strip: Vec<String>,

    /// The description is cut at the first occurrence of any of these.
    pub boilerplate_markers: Vec<String>,

    /// Unit-of-measure codes that appear in bled continuation fragments.
    pub unit_codes: Vec<String>,

    /// Token-window shapes that disqualify a secondary tax candidate.
    pub continuation_shapes: Vec<String>,

    /// Address fragments left behind when a block crosses a page boundary.
    pub page_transition_fragments: Vec<String>,
}

impl Default for MarkerTable {
    fn default() -> Self {
        Self {
            terminators: strings(&[
                "TOTAL",
                "TAXABLE AMT",
                "For JUMAX FOAM",
                "Auth. Signatory",
                "GOODS DISPATCHED",
            ]),
            skip_markers: strings(&[
                "CONTD.ON NEXT PAGE",
                "CONTD ON NEXT PAGE",
                "Invoice No Date:",
                "JF/25-26/",
                "Details of Receiver",
                "Details of Consignee",
                "GSTIN :",
                "Original For Buyer",
                "SN DESCRIPITION",
            ]),
            page_break_markers: strings(&["CONTD", "NEXT PAGE"]),
            page_break_strip: strings(&[
                "CONTD.ON NEXT PAGE",
                "CONTD. ON NEXT PAGE",
                "CONTD ON NEXT PAGE",
            ]),
            boilerplate_markers: strings(&[
                "JUMAX",
                "REGD",
                "BANK",
                "ACCOUNT",
                "Invoice",
                "SN DESCRIP",
                "IFSC",
                "UBIN",
                "ONLY",
                "P.O.No",
                "DATED",
                "Vehicle",
                "GST INVOICE",
                "GSTINVOICE",
                "Original For Buyer",
                "FOAM PVT LIMITED",
                "GSTIN",
                "09AAACJ0130B1ZF",
            ]),
            unit_codes: strings(&["PCS", "NOS", "SET", "PAIR", "MTR", "KGS"]),
            continuation_shapes: strings(&[
                // qty unit rate amount tax of the following item
                r"(?:^|\s)[\d.]+\s+(?:{units})\s+[\d.]+\s+[\d.]+\s+[\d.]+$",
                // the same fragment cut short before its tax column
                r"(?:^|\s)[\d.]+\s+(?:{units})(?:\s+[\d.]+){1,2}$",
                // restated item marker followed only by numeric columns
                r"(?:^|\s){marker}(?:-[A-Za-z]+\d*)?(?:\s+(?:[\d.]+|{units}))+$",
            ]),
            page_transition_fragments: strings(&[
                r"(?i)\bGAUTAM\s+BUDD?H\s+NAGAR\b",
                r"(?i)\bBULANDSHAHAR(?:\s+ROAD)?\b",
            ]),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Output format for parsed records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON array of records.
    #[default]
    Json,
    /// One CSV row per record.
    Csv,
    /// Aligned plain-text table.
    Text,
}

/// Output defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format.
    pub format: OutputFormat,

    /// Pretty-print JSON.
    pub pretty: bool,

    /// Run the trailing-rate post-filter over descriptions.
    pub strip_trailing_rates: bool,
}

impl ParserConfig {
    /// Check thresholds for internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.amount_tolerance.is_sign_negative() {
            return Err(value_error("amount_tolerance", "must not be negative"));
        }
        if self.min_rate <= Decimal::ZERO {
            return Err(value_error("min_rate", "must be positive"));
        }
        if self.min_rate > self.max_rate {
            return Err(value_error("max_rate", "must not be below min_rate"));
        }
        if self.max_rate_len == 0 {
            return Err(value_error("max_rate_len", "must be at least 1"));
        }
        if self.sgst_window == 0 {
            return Err(value_error("sgst_window", "must be at least 1"));
        }
        Ok(())
    }

    /// Whether a rate value lies in the plausible range.
    pub fn rate_in_range(&self, rate: Decimal) -> bool {
        rate >= self.min_rate && rate <= self.max_rate
    }
}

fn value_error(field: &str, reason: &str) -> ConfigError {
    ConfigError::Value {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

impl TaxlineConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate thresholds. Pattern tables are checked when compiled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.parser.validate()
    }
}
