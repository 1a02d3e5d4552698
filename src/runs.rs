//! Inline emphasis parsing: one line of text → ordered [`StyledRun`]s.
//!
//! Recognised markers are `**bold**` and `*italic*`, never nested. A double
//! asterisk is always tried first, so `**x**` can never turn into two italic
//! spans. Markers without a partner are kept as literal text.

use serde::{Deserialize, Serialize};

/// A contiguous span of text sharing one bold/italic combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

impl StyledRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
            italic: false,
        }
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: true,
        }
    }
}

/// Split `line` into style runs covering all of its text.
///
/// Adjacent plain text is merged, so the output never holds two consecutive
/// plain runs or an empty run.
pub fn parse_runs(line: &str) -> Vec<StyledRun> {
    let mut runs = Vec::new();
    let mut plain = String::new();
    let mut rest = line;

    while let Some(star) = rest.find('*') {
        plain.push_str(&rest[..star]);
        let at = &rest[star..];

        if let Some((inner, consumed)) = delimited(at, "**") {
            flush_plain(&mut runs, &mut plain);
            runs.push(StyledRun::bold(inner));
            rest = &at[consumed..];
        } else if at.starts_with("**") {
            // Unmatched double marker stays literal as a pair.
            plain.push_str("**");
            rest = &at[2..];
        } else if let Some((inner, consumed)) = delimited(at, "*") {
            flush_plain(&mut runs, &mut plain);
            runs.push(StyledRun::italic(inner));
            rest = &at[consumed..];
        } else {
            plain.push('*');
            rest = &at[1..];
        }
    }
    plain.push_str(rest);
    flush_plain(&mut runs, &mut plain);
    runs
}

/// Concatenated text of `runs` with all styling dropped.
pub fn plain_text(runs: &[StyledRun]) -> String {
    runs.iter().map(|r| r.text.as_str()).collect()
}

/// Match `marker inner marker` at the start of `s`.
///
/// Any closed `**` pair with visible inner text is bold. For the single
/// marker the inner text must not start or end with whitespace, which keeps
/// arithmetic such as `2 * 3 * 4` literal, and the closing `*` must not be
/// part of a `**` pair.
fn delimited<'a>(s: &'a str, marker: &str) -> Option<(&'a str, usize)> {
    let body = s.strip_prefix(marker)?;
    if marker == "*" && body.starts_with('*') {
        return None;
    }

    let mut search_from = 0;
    loop {
        let close = search_from + body[search_from..].find(marker)?;
        let inner = &body[..close];
        let after = &body[close + marker.len()..];

        let doubled = marker == "*" && after.starts_with('*');
        if !doubled && is_emphasis_body(inner, marker) {
            return Some((inner, marker.len() * 2 + close));
        }
        if doubled {
            // Skip the whole `**` so it is not split into two singles.
            search_from = close + 2;
        } else {
            return None;
        }
    }
}

fn is_emphasis_body(inner: &str, marker: &str) -> bool {
    if marker == "**" {
        return !inner.trim().is_empty();
    }
    !inner.is_empty()
        && !inner.starts_with(char::is_whitespace)
        && !inner.ends_with(char::is_whitespace)
}

fn flush_plain(runs: &mut Vec<StyledRun>, plain: &mut String) {
    if !plain.is_empty() {
        runs.push(StyledRun::plain(std::mem::take(plain)));
    }
}
