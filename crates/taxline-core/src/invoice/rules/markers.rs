//! Compiled form of a [`MarkerTable`].

use regex::Regex;
use tracing::warn;

use crate::error::ConfigError;
use crate::models::config::MarkerTable;

/// An item marker restated with a compound suffix, with the column before it.
const RESTATED_MARKER: &str = r"(?:[\d.]+\s+)?{marker}-[A-Za-z]+\d*";
/// A restated compound marker and everything after it.
const RESTATED_TAIL: &str = r"(?i)\s+{marker}-.*$";

/// Marker table with its patterns compiled.
#[derive(Debug, Clone)]
pub struct CompiledMarkers {
    pub(crate) terminators: Vec<String>,
    pub(crate) skip_markers: Vec<String>,
    pub(crate) page_break_markers: Vec<String>,
    pub(crate) page_break_strip: Vec<Regex>,
    pub(crate) boilerplate_markers: Vec<String>,
    pub(crate) units: String,
    pub(crate) unit_codes: Vec<String>,
    pub(crate) continuation_fragment: Option<Regex>,
    shape_templates: Vec<String>,
    pub(crate) page_transition_fragments: Vec<Regex>,
}

impl CompiledMarkers {
    /// Compile every pattern in `table`.
    ///
    /// Marker templates are checked once with a placeholder marker so that a
    /// broken template fails here rather than on every block.
    pub fn compile(table: &MarkerTable) -> Result<Self, ConfigError> {
        let units = table
            .unit_codes
            .iter()
            .map(|u| regex::escape(u))
            .collect::<Vec<_>>()
            .join("|");

        // qty unit rate amount tax, plus any letters glued to the tax column
        let continuation_fragment = if units.is_empty() {
            None
        } else {
            Some(compile(&format!(
                r"(?i)\s*[\d.]+\s+(?:{})\s+[\d.]+\s+[\d.]+\s+[\d.]+[A-Z\s]*",
                units
            ))?)
        };

        let page_break_strip = table
            .page_break_strip
            .iter()
            .map(|s| compile(&format!("(?i){}", regex::escape(s))))
            .collect::<Result<Vec<_>, _>>()?;

        let shape_templates: Vec<String> = table
            .continuation_shapes
            .iter()
            .map(|t| t.replace("{units}", &units))
            .collect();
        let templates = shape_templates
            .iter()
            .map(String::as_str)
            .chain([RESTATED_MARKER, RESTATED_TAIL]);
        for template in templates {
            compile(&template.replace("{marker}", "MARKER"))?;
        }

        let page_transition_fragments = table
            .page_transition_fragments
            .iter()
            .map(|p| compile(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            terminators: table.terminators.clone(),
            skip_markers: table.skip_markers.clone(),
            page_break_markers: table.page_break_markers.clone(),
            page_break_strip,
            boilerplate_markers: table.boilerplate_markers.clone(),
            units,
            unit_codes: table.unit_codes.clone(),
            continuation_fragment,
            shape_templates,
            page_transition_fragments,
        })
    }

    /// Build every marker-specific pattern for one item marker.
    pub fn for_marker(&self, marker: &str) -> MarkerPatterns {
        let escaped = regex::escape(marker);
        let specialise = |template: &str| {
            let pattern = template.replace("{marker}", &escaped);
            match Regex::new(&pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("Skipping marker pattern {:?}: {}", pattern, e);
                    None
                }
            }
        };

        MarkerPatterns {
            marker: marker.to_string(),
            continuation_shapes: self
                .shape_templates
                .iter()
                .filter_map(|t| specialise(t))
                .collect(),
            restated: specialise(RESTATED_MARKER),
            restated_tail: if marker.is_empty() {
                None
            } else {
                specialise(RESTATED_TAIL)
            },
        }
    }

    /// Whether `token` is one of the configured unit codes.
    pub fn is_unit(&self, token: &str) -> bool {
        self.unit_codes.iter().any(|u| u.eq_ignore_ascii_case(token))
    }

    /// Whether any unit code is configured.
    pub fn has_units(&self) -> bool {
        !self.units.is_empty()
    }
}

/// Patterns specialised for one item marker, built once per block.
#[derive(Debug, Clone)]
pub struct MarkerPatterns {
    pub marker: String,
    /// Windows that look like the next item's numeric columns.
    pub continuation_shapes: Vec<Regex>,
    /// `TWW-HPCN1`, optionally preceded by a number.
    pub restated: Option<Regex>,
    /// ` TWW-...` through the end of the text. `None` for an empty marker.
    pub restated_tail: Option<Regex>,
}

fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}
