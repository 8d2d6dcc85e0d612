//! Description reconstruction.
//!
//! The description column of a block is spread over the summary remainder
//! and any number of wrapped lines, and picks up letterhead, page-break
//! notices and numeric columns of the next item on the way. The steps below
//! run in a fixed order; each one is a plain function over the working text.

use std::str::FromStr;

use regex::Regex;
use rust_decimal::Decimal;
use tracing::{debug, trace};

use super::classifier::contains_any;
use super::markers::{CompiledMarkers, MarkerPatterns};
use super::patterns::{
    collapse_whitespace, HYPHEN_SPACING, LONG_NUMBER, NUMERIC_LINE, NUMERIC_TOKEN, TRAILING_LONE,
};
use crate::models::config::ParserConfig;

/// Output of [`DescriptionReconstructor::reconstruct`].
#[derive(Debug, Clone, PartialEq)]
pub struct Reconstructed {
    /// Marker-prefixed, cleaned description.
    pub description: String,
    /// Secondary tax rate (SGST).
    pub sgst: Decimal,
    /// False when `sgst` fell back to the primary rate.
    pub sgst_recovered: bool,
}

/// Rebuilds a block's description and recovers its SGST.
pub struct DescriptionReconstructor<'a> {
    markers: &'a CompiledMarkers,
    config: &'a ParserConfig,
}

impl<'a> DescriptionReconstructor<'a> {
    pub fn new(markers: &'a CompiledMarkers, config: &'a ParserConfig) -> Self {
        Self { markers, config }
    }

    /// Reconstruct the description for one block.
    ///
    /// `patterns` are the block's marker patterns, `remainder` is the summary line's trailing text, `trailing` the block
    /// lines after the summary line, `cgst` the primary rate used when no
    /// secondary rate can be recovered.
    pub fn reconstruct(
        &self,
        patterns: &MarkerPatterns,
        remainder: &str,
        trailing: &[&str],
        cgst: Decimal,
    ) -> Reconstructed {
        let kept = filter_trailing_lines(trailing, &self.markers.page_break_markers);
        let working = join_parts(remainder, &kept);
        let working = strip_page_breaks(&working, &self.markers.page_break_strip);

        let (working, sgst) = take_secondary_tax(
            &working,
            &patterns.continuation_shapes,
            self.markers,
            self.config,
        );

        let working = truncate_boilerplate(&working, &self.markers.boilerplate_markers);
        let working = self.remove_residue(&working, patterns);
        let cleaned = normalize_description(&working);

        let marker = patterns.marker.as_str();
        let description = if cleaned.is_empty() {
            marker.to_string()
        } else {
            format!("{} {}", marker, cleaned)
        };

        let (sgst, sgst_recovered) = match sgst {
            Some(sgst) => (sgst, true),
            None => (cgst, false),
        };

        debug!("Description {:?}, sgst {} (recovered: {})", description, sgst, sgst_recovered);
        Reconstructed {
            description,
            sgst,
            sgst_recovered,
        }
    }

    fn remove_residue(&self, text: &str, patterns: &MarkerPatterns) -> String {
        let mut text = LONG_NUMBER.replace_all(text, "").into_owned();

        if let Some(fragment) = &self.markers.continuation_fragment {
            text = fragment.replace_all(&text, " ").into_owned();
        }
        if let Some(restated) = &patterns.restated {
            text = restated.replace_all(&text, " ").into_owned();
        }

        text = strip_trailing_rate(&text, &self.config.default_tax_rate.to_string());

        for fragment in &self.markers.page_transition_fragments {
            text = fragment.replace_all(&text, " ").into_owned();
        }
        text
    }
}

/// Drop empty lines, page-continuation lines and bare numbers.
pub fn filter_trailing_lines<'l>(lines: &[&'l str], page_break_markers: &[String]) -> Vec<&'l str> {
    lines
        .iter()
        .copied()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter(|l| !contains_any(l, page_break_markers))
        .filter(|l| !NUMERIC_LINE.is_match(l))
        .collect()
}

fn join_parts(remainder: &str, lines: &[&str]) -> String {
    std::iter::once(remainder.trim())
        .chain(lines.iter().copied())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_page_breaks(text: &str, patterns: &[Regex]) -> String {
    patterns
        .iter()
        .fold(text.to_string(), |acc, re| re.replace_all(&acc, "").into_owned())
}

/// Find and remove the secondary tax rate.
///
/// Tokens are scanned right to left. A numeric token is accepted unless it
/// exceeds `max_tax_rate`, is directly followed by a unit code (making it a
/// quantity), or the window of `sgst_window` tokens ending at it matches one
/// of `shapes`.
pub fn take_secondary_tax(
    text: &str,
    shapes: &[Regex],
    markers: &CompiledMarkers,
    config: &ParserConfig,
) -> (String, Option<Decimal>) {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();

    for i in (0..tokens.len()).rev() {
        let token = tokens[i];
        if !NUMERIC_TOKEN.is_match(token) {
            continue;
        }
        let Ok(value) = Decimal::from_str(token) else {
            continue;
        };
        if value > config.max_tax_rate {
            trace!("Rejected sgst candidate {}: above {}", token, config.max_tax_rate);
            continue;
        }
        if tokens.get(i + 1).is_some_and(|next| markers.is_unit(next)) {
            trace!("Rejected sgst candidate {}: quantity before {}", token, tokens[i + 1]);
            continue;
        }

        let start = (i + 1).saturating_sub(config.sgst_window);
        let window = tokens[start..=i].join(" ");
        if shapes.iter().any(|shape| shape.is_match(&window)) {
            trace!("Rejected sgst candidate {}: continuation shape in {:?}", token, window);
            continue;
        }

        tokens.remove(i);
        return (tokens.join(" "), Some(value));
    }

    (text.to_string(), None)
}

/// Cut `text` at the first occurrence of any marker.
pub fn truncate_boilerplate(text: &str, markers: &[String]) -> String {
    let cut = markers
        .iter()
        .filter(|m| !m.is_empty())
        .filter_map(|m| text.find(m.as_str()))
        .min();

    match cut {
        Some(i) => text[..i].to_string(),
        None => text.to_string(),
    }
}

fn strip_trailing_rate(text: &str, rate: &str) -> String {
    let mut current = text.trim_end();
    while let Some(rest) = current.strip_suffix(rate) {
        if !rest.ends_with(char::is_whitespace) {
            break;
        }
        current = rest.trim_end();
    }
    current.to_string()
}

/// Cosmetic normalization; applying it twice changes nothing.
///
/// Collapses whitespace, removes spaces around hyphens and joins a lone
/// trailing capital or digit run to the token before it.
pub fn normalize_description(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    let mut text = HYPHEN_SPACING.replace_all(&collapsed, "-").into_owned();

    loop {
        let joined = TRAILING_LONE.replace(&text, "$1").into_owned();
        if joined == text {
            return text;
        }
        text = joined;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::MarkerTable;
    use pretty_assertions::assert_eq;

    fn reconstruct(remainder: &str, trailing: &[&str]) -> Reconstructed {
        let markers = CompiledMarkers::compile(&MarkerTable::default()).unwrap();
        let config = ParserConfig::default();
        DescriptionReconstructor::new(&markers, &config).reconstruct(
            &markers.for_marker("TWW"),
            remainder,
            trailing,
            Decimal::new(900, 2),
        )
    }

    #[test]
    fn test_simple_description() {
        let result = reconstruct("WIDGET RED 9.00", &[]);
        assert_eq!(result.description, "TWW WIDGET RED");
        assert_eq!(result.sgst, Decimal::new(9, 0));
        assert!(result.sgst_recovered);
    }

    #[test]
    fn test_wrapped_lines_are_joined() {
        let result = reconstruct("ADJ HE WP", &["24 - 22 - 12", "9.00"]);
        assert_eq!(result.description, "TWW ADJ HE WP 24-22-12");
        assert_eq!(result.sgst, Decimal::new(9, 0));
    }

    #[test]
    fn test_missing_sgst_defaults_to_cgst() {
        let result = reconstruct("", &[]);
        assert_eq!(result.description, "TWW");
        assert_eq!(result.sgst, Decimal::new(900, 2));
        assert!(!result.sgst_recovered);
    }

    #[test]
    fn test_page_break_lines_dropped() {
        let result = reconstruct(
            "MATTRESS TOPPER",
            &["CONTD.ON NEXT PAGE", "2", "QUEEN 9.00"],
        );
        assert_eq!(result.description, "TWW MATTRESS TOPPER QUEEN");
    }

    #[test]
    fn test_boilerplate_truncated_in_full() {
        let result = reconstruct(
            "WIDGET RED 9.00",
            &["JUMAX FOAM PVT LIMITED BANK OF INDIA A/C 1234567890 IFSC UBIN0512345"],
        );
        assert_eq!(result.description, "TWW WIDGET RED");
        assert_eq!(result.sgst, Decimal::new(9, 0));
    }

    #[test]
    fn test_next_item_fragment_is_not_sgst() {
        let result = reconstruct(
            "PILLOW SOFT 9.00 TWW-HPCN1 7.00 PCS 225.00 1575.00 9.00OSMALL",
            &[],
        );
        assert_eq!(result.sgst, Decimal::new(9, 0));
        assert_eq!(result.description, "TWW PILLOW SOFT");
    }

    #[test]
    fn test_take_secondary_tax_skips_next_item_columns() {
        let markers = CompiledMarkers::compile(&MarkerTable::default()).unwrap();
        let config = ParserConfig::default();
        let patterns = markers.for_marker("TWW");

        let (rest, sgst) = take_secondary_tax(
            "CUSHION 12.00 TWW-HPCN1 2.00 PCS 255.00 510.00 9.00",
            &patterns.continuation_shapes,
            &markers,
            &config,
        );
        assert_eq!(sgst, Some(Decimal::new(1200, 2)));
        assert_eq!(rest, "CUSHION TWW-HPCN1 2.00 PCS 255.00 510.00 9.00");
    }

    #[test]
    fn test_quantity_before_unit_is_not_sgst() {
        let markers = CompiledMarkers::compile(&MarkerTable::default()).unwrap();
        let config = ParserConfig::default();

        // No restated marker, so only the unit code gives the quantity away.
        let (rest, sgst) = take_secondary_tax(
            "CUSHION COVER 9.00 7.00 PCS 225.00 1575.00 9.00",
            &markers.for_marker("TWW").continuation_shapes,
            &markers,
            &config,
        );
        assert_eq!(sgst, Some(Decimal::new(900, 2)));
        assert_eq!(rest, "CUSHION COVER 7.00 PCS 225.00 1575.00 9.00");

        let result = reconstruct("CUSHION COVER 9.00", &["7.00 PCS 225.00 1575.00 9.00"]);
        assert_eq!(result.sgst, Decimal::new(900, 2));
        assert_eq!(result.description, "TWW CUSHION COVER");
    }

    #[test]
    fn test_quantity_without_sgst_falls_back() {
        let markers = CompiledMarkers::compile(&MarkerTable::default()).unwrap();
        let config = ParserConfig::default();
        let (rest, sgst) = take_secondary_tax("SHEET 5.00 pcs", &[], &markers, &config);
        assert_eq!(sgst, None);
        assert_eq!(rest, "SHEET 5.00 pcs");
    }

    #[test]
    fn test_take_secondary_tax_rejects_large_numbers() {
        let markers = CompiledMarkers::compile(&MarkerTable::default()).unwrap();
        let config = ParserConfig::default();
        let (rest, sgst) = take_secondary_tax("WIDGET 201301", &[], &markers, &config);
        assert_eq!(sgst, None);
        assert_eq!(rest, "WIDGET 201301");
    }

    #[test]
    fn test_truncate_at_earliest_marker() {
        let markers = vec!["BANK".to_string(), "JUMAX".to_string()];
        assert_eq!(
            truncate_boilerplate("FOAM JUMAX LTD BANK", &markers),
            "FOAM "
        );
        assert_eq!(truncate_boilerplate("FOAM", &markers), "FOAM");
    }

    #[test]
    fn test_strip_trailing_rate() {
        assert_eq!(strip_trailing_rate("WIDGET 9.00 9.00 ", "9.00"), "WIDGET");
        assert_eq!(strip_trailing_rate("WIDGET19.00", "9.00"), "WIDGET19.00");
    }

    #[test]
    fn test_normalize_repairs_split_tokens() {
        assert_eq!(normalize_description("  SOFA   COVER  X "), "SOFA COVERX");
        assert_eq!(normalize_description("SIZE 1 2"), "SIZE12");
        assert_eq!(normalize_description("ADJ HE WP 24 -22- 12"), "ADJ HE WP 24-22-12");
        assert_eq!(normalize_description("WIDGET RED"), "WIDGET RED");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "  SOFA   COVER  X ",
            "SIZE 1 2",
            "A B C D",
            "ADJ HE WP 24 -22- 12",
            " - LEADING HYPHEN",
            "TRAILING - ",
            "",
        ];
        for sample in samples {
            let once = normalize_description(sample);
            assert_eq!(normalize_description(&once), once, "sample {:?}", sample);
        }
    }
}
