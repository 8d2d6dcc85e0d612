//! Rule-based components of the line-item parser.
//!
//! Leaf-first: [`classifier`] decides what a line is, [`segmenter`] groups
//! lines into item blocks, [`header`] and [`summary`] pull the fixed numeric
//! columns out of a block, and [`description`] rebuilds the free text.

pub mod patterns;
pub mod markers;
pub mod classifier;
pub mod segmenter;
pub mod header;
pub mod summary;
pub mod description;

pub use markers::{CompiledMarkers, MarkerPatterns};
pub use classifier::{LineClass, LineClassifier};
pub use segmenter::{segment, Block, RawLine};
pub use header::{HeaderExtractor, ParsedHeader, RateField};
pub use summary::{ParsedSummary, SummaryExtractor};
pub use description::{normalize_description, DescriptionReconstructor, Reconstructed};

/// One named matcher in an ordered candidate list.
///
/// Matchers are pure: they either return a structured match or `None`.
pub struct Candidate<T> {
    /// Name used in logs.
    pub name: &'static str,
    /// The matcher itself.
    pub matcher: fn(&str) -> Option<T>,
}

impl<T> Candidate<T> {
    pub const fn new(name: &'static str, matcher: fn(&str) -> Option<T>) -> Self {
        Self { name, matcher }
    }
}

/// Run `candidates` in order and return the first match that `accept` approves.
pub fn first_accepted<T>(
    candidates: &[Candidate<T>],
    input: &str,
    mut accept: impl FnMut(&'static str, &T) -> bool,
) -> Option<(&'static str, T)> {
    candidates.iter().find_map(|candidate| {
        let found = (candidate.matcher)(input)?;
        accept(candidate.name, &found).then_some((candidate.name, found))
    })
}
