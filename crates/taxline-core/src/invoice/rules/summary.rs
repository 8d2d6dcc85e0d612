//! Summary-line field extraction (amount, CGST, description remainder).

use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::debug;

use super::patterns::{SUMMARY_AMOUNT, SUMMARY_FULL, SUMMARY_PAIR};
use super::{first_accepted, Candidate};
use crate::error::LineItemError;

/// Fields from a block's summary line.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSummary {
    /// Line amount.
    pub amount: Decimal,
    /// Primary tax rate.
    pub cgst: Decimal,
    /// Free text following the tax rate, trimmed.
    pub remainder: String,
    /// Whether `cgst` fell back to the default rate.
    pub cgst_defaulted: bool,
}

/// Raw captures; `cgst` is absent for the amount-only form.
struct SummaryCaptures {
    amount: String,
    cgst: Option<String>,
    remainder: String,
}

fn full(line: &str) -> Option<SummaryCaptures> {
    let caps = SUMMARY_FULL.captures(line)?;
    Some(SummaryCaptures {
        amount: caps["amount"].to_string(),
        cgst: Some(caps["cgst"].to_string()),
        remainder: caps["rest"].trim().to_string(),
    })
}

fn pair(line: &str) -> Option<SummaryCaptures> {
    let caps = SUMMARY_PAIR.captures(line)?;
    Some(SummaryCaptures {
        amount: caps["amount"].to_string(),
        cgst: Some(caps["cgst"].to_string()),
        remainder: String::new(),
    })
}

fn amount_only(line: &str) -> Option<SummaryCaptures> {
    let caps = SUMMARY_AMOUNT.captures(line)?;
    Some(SummaryCaptures {
        amount: caps["amount"].to_string(),
        cgst: None,
        remainder: String::new(),
    })
}

const VARIANTS: [Candidate<SummaryCaptures>; 3] = [
    Candidate::new("amount+cgst+text", full),
    Candidate::new("amount+cgst", pair),
    Candidate::new("amount", amount_only),
];

/// Extracts [`ParsedSummary`] from a summary line.
pub struct SummaryExtractor {
    default_cgst: Decimal,
}

impl SummaryExtractor {
    /// `default_cgst` is used when the line carries only an amount.
    pub fn new(default_cgst: Decimal) -> Self {
        Self { default_cgst }
    }

    /// Parse a summary line.
    pub fn extract(&self, line: &str) -> Result<ParsedSummary, LineItemError> {
        let line = line.trim();
        let failed = || LineItemError::SummaryParseFailed {
            line: line.to_string(),
        };

        let (name, caps) = first_accepted(&VARIANTS, line, |_, caps| {
            Decimal::from_str(&caps.amount).is_ok_and(|amount| amount > Decimal::ZERO)
        })
        .ok_or_else(failed)?;

        let amount = Decimal::from_str(&caps.amount).map_err(|_| failed())?;
        let (cgst, cgst_defaulted) = match caps.cgst.as_deref().map(Decimal::from_str) {
            Some(Ok(cgst)) => (cgst, false),
            Some(Err(_)) => return Err(failed()),
            None => {
                debug!("Only amount found in summary line, defaulting CGST to {}", self.default_cgst);
                (self.default_cgst, true)
            }
        };

        debug!("Summary matched variant {}: amount {}, cgst {}", name, amount, cgst);
        Ok(ParsedSummary {
            amount,
            cgst,
            remainder: caps.remainder,
            cgst_defaulted,
        })
    }
}
