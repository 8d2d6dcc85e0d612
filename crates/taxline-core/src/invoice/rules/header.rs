//! Header-line field extraction.

use std::str::FromStr;

use regex::{Captures, Regex};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::patterns::{
    collapse_whitespace, DATE_SLASHED, HEADER_COMPOUND, HEADER_DETACHED, HEADER_LOOSE,
    HEADER_RELAXED, HEADER_STANDARD,
};
use super::{first_accepted, Candidate};
use crate::error::LineItemError;
use crate::models::config::ParserConfig;

/// Fields from a block's first line.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedHeader {
    /// Base alphabetic item marker (e.g. `TWW`).
    pub marker: String,
    /// Compound sub-marker, if present (e.g. `HPCN1` in `TWW-HPCN1`).
    pub sub_marker: Option<String>,
    /// 8-digit HSN code.
    pub hsn: String,
    /// Package count.
    pub pkg: Decimal,
    /// Quantity.
    pub qty: Decimal,
    /// Unit of measure.
    pub unit: String,
    /// Unit rate, or the raw token when it failed plausibility.
    pub rate: RateField,
}

/// The rate column after gating.
#[derive(Debug, Clone, PartialEq)]
pub enum RateField {
    /// Passed every plausibility gate.
    Plausible(Decimal),
    /// Structurally present but implausible; the raw token is kept.
    Implausible(String),
}

/// Header fields before numeric conversion.
#[derive(Debug, Clone)]
struct HeaderCaptures {
    marker: String,
    sub_marker: Option<String>,
    hsn: String,
    pkg: String,
    qty: String,
    unit: String,
    rate: String,
}

impl HeaderCaptures {
    fn from_captures(caps: &Captures<'_>) -> Self {
        Self {
            marker: caps["marker"].to_string(),
            sub_marker: caps.name("sub").map(|m| m.as_str().to_string()),
            hsn: caps["hsn"].to_string(),
            pkg: caps["pkg"].to_string(),
            qty: caps["qty"].to_string(),
            unit: caps["unit"].to_string(),
            rate: caps["rate"].to_string(),
        }
    }
}

fn capture_with(re: &Regex, line: &str) -> Option<HeaderCaptures> {
    re.captures(line).map(|caps| HeaderCaptures::from_captures(&caps))
}

fn standard(line: &str) -> Option<HeaderCaptures> {
    capture_with(&HEADER_STANDARD, line)
}

fn compound(line: &str) -> Option<HeaderCaptures> {
    capture_with(&HEADER_COMPOUND, line)
}

fn detached(line: &str) -> Option<HeaderCaptures> {
    capture_with(&HEADER_DETACHED, line)
}

fn loose(line: &str) -> Option<HeaderCaptures> {
    capture_with(&HEADER_LOOSE, line)
}

fn relaxed(line: &str) -> Option<HeaderCaptures> {
    capture_with(&HEADER_RELAXED, line)
}

const VARIANTS: [Candidate<HeaderCaptures>; 4] = [
    Candidate::new("standard", standard),
    Candidate::new("compound", compound),
    Candidate::new("detached", detached),
    Candidate::new("loose", loose),
];

/// Why a rate token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateRejection {
    /// Contains a `/`, usually a leftover date fragment.
    Slash,
    /// Longer than `max_rate_len`.
    TooLong,
    /// Not a decimal number.
    NotNumeric,
    /// Outside `[min_rate, max_rate]`.
    OutOfRange,
}

/// Apply the rate plausibility gates to a raw token.
pub fn gate_rate(raw: &str, config: &ParserConfig) -> Result<Decimal, RateRejection> {
    if raw.contains('/') {
        return Err(RateRejection::Slash);
    }
    if raw.chars().count() > config.max_rate_len {
        return Err(RateRejection::TooLong);
    }
    let rate = Decimal::from_str(raw).map_err(|_| RateRejection::NotNumeric)?;
    if !config.rate_in_range(rate) {
        return Err(RateRejection::OutOfRange);
    }
    Ok(rate)
}

/// Remove slashed dates and collapse whitespace.
pub fn clean_header_line(line: &str) -> String {
    collapse_whitespace(&DATE_SLASHED.replace_all(line, ""))
}

/// Extracts [`ParsedHeader`] from a block's first line.
pub struct HeaderExtractor<'a> {
    config: &'a ParserConfig,
}

impl<'a> HeaderExtractor<'a> {
    pub fn new(config: &'a ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a header line.
    ///
    /// Variants are tried in order and the first one whose rate and quantity
    /// pass the gates wins. If none does, the relaxed shape is tried; when it
    /// matches but the rate is still implausible the header is returned with
    /// [`RateField::Implausible`] so the caller can derive a replacement.
    pub fn extract(&self, line: &str) -> Result<ParsedHeader, LineItemError> {
        let cleaned = clean_header_line(line);
        if cleaned != line {
            debug!("Cleaned header line: {:?}", cleaned);
        }

        let accepted = first_accepted(&VARIANTS, &cleaned, |name, caps| {
            match self.check(caps) {
                Ok(_) => true,
                Err(reason) => {
                    warn!("Variant {} rejected rate {:?}: {:?}", name, caps.rate, reason);
                    false
                }
            }
        });

        if let Some((name, caps)) = accepted {
            debug!("Header matched variant {}, rate: {}", name, caps.rate);
            return self.build(caps);
        }

        warn!("No header variant accepted {:?}, trying relaxed match", cleaned);
        let caps = relaxed(&cleaned).ok_or_else(|| LineItemError::HeaderParseFailed {
            line: line.to_string(),
        })?;
        self.build(caps)
    }

    fn check(&self, caps: &HeaderCaptures) -> Result<Decimal, RateRejection> {
        let qty = Decimal::from_str(&caps.qty).map_err(|_| RateRejection::NotNumeric)?;
        if qty <= Decimal::ZERO {
            return Err(RateRejection::OutOfRange);
        }
        gate_rate(&caps.rate, self.config)
    }

    fn build(&self, caps: HeaderCaptures) -> Result<ParsedHeader, LineItemError> {
        let failed = || LineItemError::HeaderParseFailed {
            line: format!("{} {} {} {}", caps.marker, caps.hsn, caps.qty, caps.rate),
        };
        let pkg = Decimal::from_str(&caps.pkg).map_err(|_| failed())?;
        let qty = Decimal::from_str(&caps.qty).map_err(|_| failed())?;
        if qty <= Decimal::ZERO {
            return Err(failed());
        }

        let rate = match gate_rate(&caps.rate, self.config) {
            Ok(rate) => RateField::Plausible(rate),
            Err(reason) => {
                warn!("Rate {:?} is implausible ({:?})", caps.rate, reason);
                RateField::Implausible(caps.rate.clone())
            }
        };

        Ok(ParsedHeader {
            marker: caps.marker,
            sub_marker: caps.sub_marker,
            hsn: caps.hsn,
            pkg,
            qty,
            unit: caps.unit,
            rate,
        })
    }
}
