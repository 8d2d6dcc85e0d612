//! Line classification.

use super::markers::CompiledMarkers;
use super::patterns::HEADER_SHAPE;

/// What a trimmed line means to the segmenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// End of the item table; stop consuming input.
    Terminate,
    /// Document boilerplate; drop the line.
    Skip,
    /// Opens a new item block.
    Header,
    /// Belongs to the currently open block, if any.
    Continuation,
}

/// Classifies lines against a marker table.
pub struct LineClassifier<'a> {
    markers: &'a CompiledMarkers,
}

impl<'a> LineClassifier<'a> {
    pub fn new(markers: &'a CompiledMarkers) -> Self {
        Self { markers }
    }

    /// Classify one trimmed line.
    pub fn classify(&self, line: &str) -> LineClass {
        if contains_any(line, &self.markers.terminators) {
            LineClass::Terminate
        } else if contains_any(line, &self.markers.skip_markers) {
            LineClass::Skip
        } else if is_header_line(line) {
            LineClass::Header
        } else {
            LineClass::Continuation
        }
    }
}

/// Whether `line` has the item-opening shape (marker, 8-digit HSN, ...).
pub fn is_header_line(line: &str) -> bool {
    HEADER_SHAPE.is_match(line)
}

pub(crate) fn contains_any(line: &str, markers: &[String]) -> bool {
    markers.iter().any(|m| !m.is_empty() && line.contains(m.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::MarkerTable;

    fn markers() -> CompiledMarkers {
        CompiledMarkers::compile(&MarkerTable::default()).unwrap()
    }

    #[test]
    fn test_classify_terminators() {
        let markers = markers();
        let classifier = LineClassifier::new(&markers);

        assert_eq!(classifier.classify("TOTAL 12960.00"), LineClass::Terminate);
        assert_eq!(classifier.classify("TAXABLE AMT 12960.00"), LineClass::Terminate);
        assert_eq!(classifier.classify("Auth. Signatory"), LineClass::Terminate);
        assert_eq!(classifier.classify("GOODS DISPATCHED AS PER"), LineClass::Terminate);
    }

    #[test]
    fn test_classify_noise() {
        let markers = markers();
        let classifier = LineClassifier::new(&markers);

        assert_eq!(classifier.classify("CONTD.ON NEXT PAGE"), LineClass::Skip);
        assert_eq!(classifier.classify("GSTIN : 09AAACJ0130B1ZF"), LineClass::Skip);
        assert_eq!(classifier.classify("Details of Receiver (Billed to)"), LineClass::Skip);
    }

    #[test]
    fn test_classify_header_any_prefix() {
        let markers = markers();
        let classifier = LineClassifier::new(&markers);

        assert_eq!(classifier.classify("TWW 94042190 1 9.00 PCS 720.00"), LineClass::Header);
        assert_eq!(classifier.classify("XYZ-LUX2 94049099 2 4.00 SET 1500.00"), LineClass::Header);
        assert_eq!(classifier.classify("6480.00 9.00 WIDGET"), LineClass::Continuation);
        assert_eq!(classifier.classify("1"), LineClass::Continuation);
    }

    #[test]
    fn test_terminator_wins_over_header_shape() {
        let markers = markers();
        let classifier = LineClassifier::new(&markers);

        assert_eq!(classifier.classify("TOTAL 94042190 1 9.00 PCS"), LineClass::Terminate);
    }
}
