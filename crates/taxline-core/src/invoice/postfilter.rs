//! Optional post-filter for record descriptions.
//!
//! Strips tax-rate tokens and next-item fragments that survive at the very
//! end of a description. Only the description is touched, and the leading
//! item marker is never removed.

use regex::Regex;
use rust_decimal::Decimal;
use tracing::debug;

use super::rules::markers::{CompiledMarkers, MarkerPatterns};
use super::rules::patterns::{
    collapse_whitespace, TRAILING_GST_RATE, TRAILING_JOINED_RATE, TRAILING_WHOLE_RATE,
};
use crate::error::ConfigError;
use crate::models::line_item::LineItemRecord;

/// Trailing-token cleanup applied after assembly.
#[derive(Debug, Clone)]
pub struct PostFilter {
    markers: CompiledMarkers,
    default_rate: Regex,
    trailing_fragment: Option<Regex>,
}

impl PostFilter {
    pub fn new(markers: &CompiledMarkers, default_tax_rate: Decimal) -> Result<Self, ConfigError> {
        let default_rate = compile(&format!(
            r"\s*\b{}\s*$",
            regex::escape(&default_tax_rate.to_string())
        ))?;

        let trailing_fragment = if markers.has_units() {
            Some(compile(&format!(
                r"(?i)\s+[\d.]+\s+(?:{})\s+[\d.]+\s+[\d.]+\s+[\d.]+[A-Z\s]*$",
                markers.units
            ))?)
        } else {
            None
        };

        Ok(Self {
            markers: markers.clone(),
            default_rate,
            trailing_fragment,
        })
    }

    /// Clean one description whose leading token is `marker`.
    pub fn clean_description(&self, description: &str, marker: &str) -> String {
        self.clean_with(description, &self.markers.for_marker(marker))
    }

    /// Same as [`clean_description`](Self::clean_description), reusing
    /// patterns already built for the marker.
    pub fn clean_with(&self, description: &str, patterns: &MarkerPatterns) -> String {
        let marker = patterns.marker.as_str();
        let mut desc = self.default_rate.replace(description, "").into_owned();
        desc = TRAILING_GST_RATE.replace(&desc, "").into_owned();
        desc = TRAILING_WHOLE_RATE.replace(&desc, "").into_owned();

        if let Some(fragment) = &self.trailing_fragment {
            desc = fragment.replace(&desc, "").into_owned();
        }
        if let Some(restated) = &patterns.restated_tail {
            desc = restated.replace(&desc, "").into_owned();
        }

        desc = TRAILING_JOINED_RATE.replace(&desc, "").into_owned();
        let desc = collapse_whitespace(&desc);

        if desc.starts_with(marker) {
            desc
        } else {
            marker.to_string()
        }
    }

    /// Apply [`clean_description`](Self::clean_description) to a record.
    pub fn apply(&self, record: &LineItemRecord) -> LineItemRecord {
        let marker = record.description.split_whitespace().next().unwrap_or("");
        self.apply_with(record, &self.markers.for_marker(marker))
    }

    /// Apply [`clean_with`](Self::clean_with) to a record.
    pub fn apply_with(&self, record: &LineItemRecord, patterns: &MarkerPatterns) -> LineItemRecord {
        let description = self.clean_with(&record.description, patterns);
        if description != record.description {
            debug!(
                "Post-filter on item {}: {:?} -> {:?}",
                record.sl_no, record.description, description
            );
        }

        LineItemRecord {
            description,
            ..record.clone()
        }
    }

    /// Apply the filter to every record.
    pub fn strip_trailing_rates(&self, records: &[LineItemRecord]) -> Vec<LineItemRecord> {
        records.iter().map(|r| self.apply(r)).collect()
    }
}

fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::MarkerTable;
    use pretty_assertions::assert_eq;

    fn filter() -> PostFilter {
        let markers = CompiledMarkers::compile(&MarkerTable::default()).unwrap();
        PostFilter::new(&markers, Decimal::new(900, 2)).unwrap()
    }

    fn record(description: &str) -> LineItemRecord {
        LineItemRecord {
            sl_no: 1,
            hsn: "94042190".to_string(),
            pkg: Decimal::ONE,
            qty: Decimal::new(9, 0),
            unit: "PCS".to_string(),
            rate: Decimal::new(720, 0),
            amount: Decimal::new(6480, 0),
            cgst: Decimal::new(9, 0),
            sgst: Decimal::new(9, 0),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_strips_trailing_rates() {
        let f = filter();
        assert_eq!(f.clean_description("TWW WIDGET 9.00", "TWW"), "TWW WIDGET");
        assert_eq!(f.clean_description("TWW WIDGET 18.00", "TWW"), "TWW WIDGET");
        assert_eq!(f.clean_description("TWW WIDGET 69.00", "TWW"), "TWW WIDGET");
        assert_eq!(f.clean_description("TWW WIDGET 15.00", "TWW"), "TWW WIDGET");
    }

    #[test]
    fn test_strips_trailing_fragment() {
        let f = filter();
        assert_eq!(
            f.clean_description("TWW PILLOW 2.00 PCS 255.00 510.00 9.00OSMALL", "TWW"),
            "TWW PILLOW"
        );
        assert_eq!(
            f.clean_description("TWW PILLOW TWW-HPCN2 SOFT", "TWW"),
            "TWW PILLOW"
        );
    }

    #[test]
    fn test_keeps_marker() {
        let f = filter();
        assert_eq!(f.clean_description("TWW", "TWW"), "TWW");
        assert_eq!(f.clean_description("TWW 9.00", "TWW"), "TWW");
    }

    #[test]
    fn test_restated_marker_is_escaped() {
        let f = filter();
        assert_eq!(f.clean_description("A.B PAD A.B-HPCN1 SOFT", "A.B"), "A.B PAD");
        assert_eq!(f.clean_description("A.B PAD AXB-HPCN1 SOFT", "A.B"), "A.B PAD AXB-HPCN1 SOFT");
    }

    #[test]
    fn test_only_description_changes() {
        let f = filter();
        let original = record("TWW WIDGET RED 12.00");
        let cleaned = f.apply(&original);

        assert_eq!(cleaned.description, "TWW WIDGET RED");
        assert_eq!(
            LineItemRecord {
                description: original.description.clone(),
                ..cleaned
            },
            original
        );
    }
}
