//! Greedy word wrapping over styled runs.
//!
//! Runs are cut into words and whitespace while every piece remembers the run
//! it came from, so a line may change style mid-way. A word is the maximal
//! stretch of non-whitespace, even across run boundaries (`**bold**,` keeps
//! its comma). A word wider than the line sits alone on its own line and
//! overflows; if it mixes styles it is broken at its style changes instead,
//! so an overflowing line always holds a single fragment.

use crate::runs::StyledRun;

/// One styled piece of a physical line.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    /// Offset from the start of the line, in pt.
    pub x_offset: f32,
    /// Measured width, in pt.
    pub width: f32,
}

/// One physical line's worth of fragments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutLine {
    pub fragments: Vec<Fragment>,
}

impl LayoutLine {
    /// Measured width of the whole line.
    pub fn width(&self) -> f32 {
        self.fragments
            .last()
            .map(|f| f.x_offset + f.width)
            .unwrap_or(0.0)
    }

    pub fn text(&self) -> String {
        self.fragments.iter().map(|f| f.text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Wrap `runs` into lines no wider than `max_width`.
///
/// `measure(text, bold, italic)` returns the width of `text` in the block's
/// font.
pub fn wrap_runs<M>(runs: &[StyledRun], max_width: f32, measure: M) -> Vec<LayoutLine>
where
    M: Fn(&str, bool, bool) -> f32,
{
    wrap_runs_indented(runs, max_width, max_width, measure)
}

/// Like [`wrap_runs`], but the first line is limited to `first_width`
/// (e.g. a paragraph with a first-line indent).
pub fn wrap_runs_indented<M>(
    runs: &[StyledRun],
    first_width: f32,
    max_width: f32,
    measure: M,
) -> Vec<LayoutLine>
where
    M: Fn(&str, bool, bool) -> f32,
{
    let mut builder = LineBuilder::new(first_width);
    let mut pending_space: Option<Vec<(Piece<'_>, f32)>> = None;

    for unit in units(runs) {
        let measured: Vec<(Piece<'_>, f32)> = unit
            .pieces
            .into_iter()
            .map(|p| {
                let w = measure(p.text, p.run.bold, p.run.italic);
                (p, w)
            })
            .collect();

        if unit.space {
            // Whitespace never starts a line; elsewhere it waits for the next
            // word so that it is never left dangling at a line end.
            if !builder.line.is_empty() {
                pending_space = Some(measured);
            }
            continue;
        }

        let space_width: f32 = pending_space
            .iter()
            .flatten()
            .map(|(_, w)| *w)
            .sum();
        let word_width: f32 = measured.iter().map(|(_, w)| *w).sum();

        if !builder.line.is_empty() && builder.width + space_width + word_width > builder.limit {
            builder.flush(max_width);
            pending_space = None;
        }

        if builder.line.is_empty() && word_width > builder.limit && measured.len() > 1 {
            for (piece, w) in measured {
                if !builder.line.is_empty() && builder.width + w > builder.limit {
                    builder.flush(max_width);
                }
                builder.push(piece.text, piece.run, w);
            }
            continue;
        }

        for (piece, w) in pending_space.take().into_iter().flatten().chain(measured) {
            builder.push(piece.text, piece.run, w);
        }
    }

    builder.finish()
}

struct Piece<'a> {
    text: &'a str,
    run: &'a StyledRun,
}

/// A word (one or more pieces) or a whitespace stretch.
struct Unit<'a> {
    pieces: Vec<Piece<'a>>,
    space: bool,
}

fn units(runs: &[StyledRun]) -> Vec<Unit<'_>> {
    let mut units: Vec<Unit<'_>> = Vec::new();

    for run in runs {
        let mut rest = run.text.as_str();
        while let Some(first) = rest.chars().next() {
            let space = first.is_whitespace();
            let end = rest
                .find(|c: char| c.is_whitespace() != space)
                .unwrap_or(rest.len());
            let piece = Piece {
                text: &rest[..end],
                run,
            };
            match units.last_mut() {
                Some(last) if last.space == space => last.pieces.push(piece),
                _ => units.push(Unit {
                    pieces: vec![piece],
                    space,
                }),
            }
            rest = &rest[end..];
        }
    }
    units
}

struct LineBuilder {
    lines: Vec<LayoutLine>,
    line: LayoutLine,
    width: f32,
    limit: f32,
}

impl LineBuilder {
    fn new(first_width: f32) -> Self {
        Self {
            lines: Vec::new(),
            line: LayoutLine::default(),
            width: 0.0,
            limit: first_width,
        }
    }

    fn push(&mut self, text: &str, run: &StyledRun, w: f32) {
        match self.line.fragments.last_mut() {
            Some(last) if last.bold == run.bold && last.italic == run.italic => {
                last.text.push_str(text);
                last.width += w;
            }
            _ => self.line.fragments.push(Fragment {
                text: text.to_string(),
                bold: run.bold,
                italic: run.italic,
                x_offset: self.width,
                width: w,
            }),
        }
        self.width += w;
    }

    fn flush(&mut self, next_limit: f32) {
        let line = std::mem::take(&mut self.line);
        if !line.is_empty() {
            self.lines.push(line);
        }
        self.width = 0.0;
        self.limit = next_limit;
    }

    fn finish(mut self) -> Vec<LayoutLine> {
        let limit = self.limit;
        self.flush(limit);
        self.lines
    }
}
