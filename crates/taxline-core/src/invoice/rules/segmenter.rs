//! Block segmentation of the raw text stream.

use tracing::{debug, trace, warn};

use super::classifier::{is_header_line, LineClass, LineClassifier};

/// A trimmed line with its position in the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    /// 0-based line number in the input text.
    pub index: usize,
    /// Trimmed content.
    pub text: String,
}

/// Lines belonging to one item: header first, then continuation lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    lines: Vec<RawLine>,
}

impl Block {
    fn open(header: RawLine) -> Self {
        Self { lines: vec![header] }
    }

    /// The item-opening line.
    pub fn header(&self) -> &str {
        &self.lines[0].text
    }

    /// Text of line `i`, if present.
    pub fn line(&self, i: usize) -> Option<&str> {
        self.lines.get(i).map(|l| l.text.as_str())
    }

    /// Number of raw lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Blocks are opened with their header line, so this is false for any
    /// block produced by [`segment`].
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Text of lines from `start` onward.
    pub fn lines_from(&self, start: usize) -> Vec<&str> {
        self.lines
            .iter()
            .skip(start)
            .map(|l| l.text.as_str())
            .collect()
    }

    /// Raw lines with origin indices.
    pub fn raw_lines(&self) -> &[RawLine] {
        &self.lines
    }

    /// Owned copy of the text, for diagnostics.
    pub fn to_strings(&self) -> Vec<String> {
        self.lines.iter().map(|l| l.text.clone()).collect()
    }
}

/// Split `text` into item blocks.
///
/// Input before the first header-shaped line is ignored. A terminator line
/// ends segmentation; nothing after it is examined.
pub fn segment(text: &str, classifier: &LineClassifier<'_>) -> Vec<Block> {
    let lines: Vec<RawLine> = text
        .lines()
        .enumerate()
        .map(|(index, line)| RawLine {
            index,
            text: line.trim().to_string(),
        })
        .filter(|l| !l.text.is_empty())
        .collect();

    let Some(start) = lines.iter().position(|l| is_header_line(&l.text)) else {
        debug!("No item header line found in {} non-empty lines", lines.len());
        return Vec::new();
    };

    debug!("Segmenting {} lines starting at line {}", lines.len() - start, lines[start].index);

    let mut blocks = Vec::new();
    let mut current: Option<Block> = None;

    for line in lines.into_iter().skip(start) {
        match classifier.classify(&line.text) {
            LineClass::Terminate => {
                warn!("Stopping at line {}: {:?}", line.index + 1, line.text);
                break;
            }
            LineClass::Skip => {
                trace!("Skipping noise line {}: {:?}", line.index + 1, line.text);
            }
            LineClass::Header => {
                if let Some(block) = current.take() {
                    blocks.push(block);
                }
                current = Some(Block::open(line));
            }
            LineClass::Continuation => match current.as_mut() {
                Some(block) => block.lines.push(line),
                None => trace!("Dropping stray line {}: {:?}", line.index + 1, line.text),
            },
        }
    }

    if let Some(block) = current {
        blocks.push(block);
    }

    debug!("Found {} item blocks", blocks.len());
    blocks
}
