//! Common regex patterns for line-item extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Item-opening line: alphabetic marker, optional hyphen compound, 8-digit HSN
    pub static ref HEADER_SHAPE: Regex = Regex::new(
        r"^[A-Za-z]+(?:-[A-Za-z]+\d*|\s+-[A-Za-z]+\d*)?\s+\d{8}\s"
    ).unwrap();

    // Header variants, tried in order
    pub static ref HEADER_STANDARD: Regex = Regex::new(
        r"^(?P<marker>[A-Za-z]+) (?P<hsn>\d{8}) (?P<pkg>\d+(?:\.\d+)?) (?P<qty>\d+(?:\.\d+)?) (?P<unit>\w+) (?P<rate>\d+(?:\.\d+)?)(?:\s|$)"
    ).unwrap();

    pub static ref HEADER_COMPOUND: Regex = Regex::new(
        r"^(?P<marker>[A-Za-z]+)-(?P<sub>[A-Za-z]+\d*) (?P<hsn>\d{8}) (?P<pkg>\d+(?:\.\d+)?) (?P<qty>\d+(?:\.\d+)?) (?P<unit>\w+) (?P<rate>\d+(?:\.\d+)?)(?:\s|$)"
    ).unwrap();

    pub static ref HEADER_DETACHED: Regex = Regex::new(
        r"^(?P<marker>[A-Za-z]+) -(?P<sub>[A-Za-z]+\d*) (?P<hsn>\d{8}) (?P<pkg>\d+(?:\.\d+)?) (?P<qty>\d+(?:\.\d+)?) (?P<unit>\w+) (?P<rate>\d+(?:\.\d+)?)(?:\s|$)"
    ).unwrap();

    pub static ref HEADER_LOOSE: Regex = Regex::new(
        r"^(?P<marker>[A-Za-z]+)(?:[ \t]*-(?P<sub>[A-Za-z]+\d*))?[ \t]+(?P<hsn>\d{8})[ \t]+(?P<pkg>\d+(?:\.\d+)?)[ \t]+(?P<qty>\d+(?:\.\d+)?)[ \t]+(?P<unit>\w+)[ \t]+(?P<rate>\d+(?:\.\d+)?)(?:\s|$)"
    ).unwrap();

    // Same field shape, any token in the rate column
    pub static ref HEADER_RELAXED: Regex = Regex::new(
        r"^(?P<marker>[A-Za-z]+)(?:\s*-(?P<sub>[A-Za-z]+\d*))?\s+(?P<hsn>\d{8})\s+(?P<pkg>\d+(?:\.\d+)?)\s+(?P<qty>\d+(?:\.\d+)?)\s+(?P<unit>\w+)\s+(?P<rate>\S+)"
    ).unwrap();

    // Calendar dates that bleed into the numeric columns
    pub static ref DATE_SLASHED: Regex = Regex::new(
        r"\b\d{1,2}/\d{1,2}/\d{4}\b"
    ).unwrap();

    // Summary line variants: amount, cgst, description remainder
    pub static ref SUMMARY_FULL: Regex = Regex::new(
        r"^(?P<amount>\d+(?:\.\d+)?)[ \t]+(?P<cgst>\d+(?:\.\d+)?)(?P<rest>[^\d.].*)$"
    ).unwrap();

    pub static ref SUMMARY_PAIR: Regex = Regex::new(
        r"^(?P<amount>\d+(?:\.\d+)?)[ \t]+(?P<cgst>\d+(?:\.\d+)?)$"
    ).unwrap();

    pub static ref SUMMARY_AMOUNT: Regex = Regex::new(
        r"^(?P<amount>\d+(?:\.\d+)?)"
    ).unwrap();

    // Description cleanup
    pub static ref NUMERIC_TOKEN: Regex = Regex::new(
        r"^\d+(?:\.\d+)?$"
    ).unwrap();

    pub static ref NUMERIC_LINE: Regex = Regex::new(
        r"^\d+$"
    ).unwrap();

    pub static ref LONG_NUMBER: Regex = Regex::new(
        r"\b\d{5,}\b"
    ).unwrap();

    pub static ref WHITESPACE_RUN: Regex = Regex::new(
        r"\s+"
    ).unwrap();

    pub static ref HYPHEN_SPACING: Regex = Regex::new(
        r"\s*-\s*"
    ).unwrap();

    // A single capital or a digit run split off the previous token
    pub static ref TRAILING_LONE: Regex = Regex::new(
        r"\s+([A-Z]|\d+)$"
    ).unwrap();

    // Post-filter: common GST rates and any NN.00 at the end
    pub static ref TRAILING_GST_RATE: Regex = Regex::new(
        r"\s*\b(?:5|12|18|28)\.00\s*$"
    ).unwrap();

    pub static ref TRAILING_WHOLE_RATE: Regex = Regex::new(
        r"\s*\d+\.00\s*$"
    ).unwrap();

    pub static ref TRAILING_JOINED_RATE: Regex = Regex::new(
        r"[-\s]+\d+\.00$"
    ).unwrap();
}

/// Collapse whitespace runs to single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}
