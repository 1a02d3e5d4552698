//! Block classification – decides what kind of block a raw line is and
//! strips its markup tokens before inline run parsing.

use serde::{Deserialize, Serialize};

use crate::runs::{parse_runs, StyledRun};

/// Deepest heading level with its own style. `#######` and beyond collapse
/// onto it.
pub const MAX_HEADING_LEVEL: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    /// Document title, synthesised by the composer.
    Title,
    /// Heading level `1..=MAX_HEADING_LEVEL`.
    Heading(u8),
    BulletItem,
    Paragraph,
    /// Paragraph break: vertical spacing only.
    Blank,
}

/// One classified line of source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub runs: Vec<StyledRun>,
}

impl Block {
    /// The title block for `title`. Titles are plain text: emphasis markers
    /// in a video title are kept literally.
    pub fn title(title: &str) -> Self {
        let text = title.trim();
        Self {
            kind: BlockKind::Title,
            runs: if text.is_empty() {
                Vec::new()
            } else {
                vec![StyledRun::plain(text)]
            },
        }
    }

    pub fn is_blank(&self) -> bool {
        self.kind == BlockKind::Blank
    }
}

/// Classify one line. Leading and trailing whitespace is ignored.
///
/// First match wins: heading (`#`… followed by whitespace), bullet (`- ` or
/// `* `), blank, paragraph.
pub fn classify(line: &str) -> Block {
    let line = line.trim();

    if let Some((level, text)) = heading(line) {
        return Block {
            kind: BlockKind::Heading(level),
            runs: parse_runs(text),
        };
    }

    if let Some(text) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return Block {
            kind: BlockKind::BulletItem,
            runs: parse_runs(text.trim_start()),
        };
    }

    if line.is_empty() {
        return Block {
            kind: BlockKind::Blank,
            runs: Vec::new(),
        };
    }

    Block {
        kind: BlockKind::Paragraph,
        runs: parse_runs(line),
    }
}

/// Split raw body text into blocks, one per line.
pub fn classify_lines(text: &str) -> impl Iterator<Item = Block> + '_ {
    text.lines().map(classify)
}

fn heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 {
        return None;
    }
    let rest = &line[hashes..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let level = hashes.min(MAX_HEADING_LEVEL as usize) as u8;
    Some((level, rest.trim()))
}
