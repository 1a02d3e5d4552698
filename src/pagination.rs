//! Pagination – flows wrapped blocks down fixed-size pages.
//!
//! Handles:
//! - Page breaks whenever the next line would cross the bottom margin
//! - Heading keep-with-next (orphan avoidance)
//! - Per-kind alignment, indents and bullet markers
//! - "Page X of N" footers on content pages
//!
//! The [`Cursor`] belongs to one [`PageFlow`], which belongs to one document,
//! so independent documents can be laid out concurrently.

use crate::blocks::BlockKind;
use crate::fonts::FontManager;
use crate::layout_config::*;
use crate::pipeline::LayoutOptions;
use crate::wrap::LayoutLine;

/// Default page margins in points (one inch).
pub const PAGE_MARGIN_PT: f32 = 72.0;

/// Glyph drawn in front of bullet items.
pub const BULLET_MARKER: &str = "\u{2022}";

/// Fixed page size and uniform margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageGeometry {
    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    pub fn body_top(&self) -> f32 {
        self.margin
    }

    pub fn body_bottom(&self) -> f32 {
        self.height - self.margin
    }

    pub fn body_height(&self) -> f32 {
        self.body_bottom() - self.body_top()
    }
}

/// Drawing position within the document being composed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub page_index: usize,
    /// Top of the next line, from the page's top edge.
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// Vertical metrics and placement rules for one kind of block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStyle {
    pub role: LineRole,
    pub font_size: f32,
    pub line_height: f32,
    /// Every run in the block is drawn bold.
    pub bold: bool,
    /// Every run in the block is drawn italic.
    pub italic: bool,
    pub align: Align,
    /// Offset of the first line from the left margin.
    pub first_indent: f32,
    /// Offset of the remaining lines from the left margin.
    pub indent: f32,
    pub space_before: f32,
    pub space_after: f32,
    /// Move the whole block to a fresh page rather than split it.
    pub keep_together: bool,
    /// Extra room that must remain below the block when it is placed.
    pub keep_with_next: f32,
    pub marker: Option<String>,
    /// Offset of the marker glyph from the left margin.
    pub marker_offset: f32,
}

impl BlockStyle {
    /// Style for a block kind under `options`.
    pub fn for_kind(kind: BlockKind, options: &LayoutOptions) -> Self {
        let sizes = &options.font_sizes;
        let body_line = sizes.body * options.line_height_multiplier;
        let base = Self {
            role: LineRole::Paragraph,
            font_size: sizes.body,
            line_height: body_line,
            bold: false,
            italic: false,
            align: Align::Left,
            first_indent: 0.0,
            indent: 0.0,
            space_before: 0.0,
            space_after: options.paragraph_space_after,
            keep_together: false,
            keep_with_next: 0.0,
            marker: None,
            marker_offset: 0.0,
        };

        match kind {
            BlockKind::Title => Self {
                role: LineRole::Title,
                font_size: sizes.title,
                line_height: sizes.title * options.line_height_multiplier,
                bold: true,
                align: Align::Center,
                space_after: options.title_space_after,
                keep_together: true,
                ..base
            },
            BlockKind::Heading(level) => {
                let size = sizes.heading(level);
                Self {
                    role: LineRole::Heading(level),
                    font_size: size,
                    line_height: size * options.line_height_multiplier,
                    bold: true,
                    align: if level == 1 { Align::Center } else { Align::Left },
                    space_before: options.heading_space_before,
                    space_after: options.heading_space_after,
                    keep_together: true,
                    keep_with_next: options.heading_space_after + body_line,
                    ..base
                }
            }
            BlockKind::BulletItem => Self {
                role: LineRole::Bullet,
                first_indent: options.bullet_indent,
                indent: options.bullet_indent,
                space_after: options.list_item_space_after,
                marker: Some(BULLET_MARKER.to_string()),
                marker_offset: options.bullet_marker_offset,
                ..base
            },
            BlockKind::Paragraph => Self {
                first_indent: options.paragraph_indent,
                ..base
            },
            BlockKind::Blank => Self {
                space_after: options.blank_line_space,
                ..base
            },
        }
    }

    /// Wrap widths `(first line, other lines)` inside `geometry`.
    pub fn wrap_widths(&self, geometry: &PageGeometry) -> (f32, f32) {
        let width = geometry.content_width();
        (
            (width - self.first_indent).max(0.0),
            (width - self.indent).max(0.0),
        )
    }
}

/// Page flow controller: owns the cursor and the pages drawn so far.
pub struct PageFlow {
    geometry: PageGeometry,
    cursor: Cursor,
    pages: Vec<PageLayout>,
}

impl PageFlow {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            cursor: Cursor {
                page_index: 0,
                y: geometry.body_top(),
            },
            pages: Vec::new(),
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Append a page and move the cursor to its top margin.
    pub fn start_page(&mut self, kind: PageKind) {
        let index = self.pages.len();
        self.pages.push(PageLayout::new(index, kind));
        self.cursor = Cursor {
            page_index: index,
            y: self.geometry.body_top(),
        };
        log::debug!("started {kind:?} page {}", index + 1);
    }

    /// Whether nothing has been drawn below the top margin of this page.
    pub fn at_page_top(&self) -> bool {
        self.pages.is_empty() || self.cursor.y <= self.geometry.body_top()
    }

    /// Break to a new page if `height` does not fit below the cursor. The
    /// new page continues the current one's kind, so cover overflow stays
    /// out of the content page count. A fresh page never breaks again, so
    /// oversized content is drawn where it is instead of looping. Returns
    /// whether a break happened.
    pub fn ensure_space(&mut self, height: f32) -> bool {
        let Some(kind) = self.pages.last().map(|p| p.kind) else {
            self.start_page(PageKind::Content);
            return true;
        };
        if self.cursor.y + height > self.geometry.body_bottom() && !self.at_page_top() {
            self.start_page(kind);
            return true;
        }
        false
    }

    /// Add vertical space. Ignored at the top of a page; clamped at the
    /// bottom of the body so that the next line breaks instead.
    pub fn skip(&mut self, space: f32) {
        if space <= 0.0 || self.at_page_top() {
            return;
        }
        let bottom = self.geometry.body_bottom().max(self.cursor.y);
        self.cursor.y = (self.cursor.y + space).min(bottom);
    }

    /// Move the cursor down to `y` on the current page.
    pub fn advance_to(&mut self, y: f32) {
        let bottom = self.geometry.body_bottom();
        if y > self.cursor.y {
            self.cursor.y = y.min(bottom);
        }
    }

    /// Draw one wrapped block at the cursor.
    pub fn place_block(&mut self, lines: &[LayoutLine], style: &BlockStyle) {
        if lines.is_empty() {
            return;
        }

        self.skip(style.space_before);
        if style.keep_together {
            let height = lines.len() as f32 * style.line_height + style.keep_with_next;
            self.ensure_space(height);
        }

        for (i, line) in lines.iter().enumerate() {
            self.ensure_space(style.line_height);
            self.place_line(line, style, i == 0);
        }

        self.skip(style.space_after);
    }

    fn place_line(&mut self, line: &LayoutLine, style: &BlockStyle, first: bool) {
        let margin = self.geometry.margin;
        let indent = if first { style.first_indent } else { style.indent };
        let x = match style.align {
            Align::Left => margin + indent,
            Align::Center => {
                margin + indent + ((self.geometry.content_width() - indent - line.width()) / 2.0).max(0.0)
            }
        };

        let marker = match (&style.marker, first) {
            (Some(text), true) => Some(Marker {
                text: text.clone(),
                x: margin + style.marker_offset,
            }),
            _ => None,
        };

        let placed = PlacedLine {
            x,
            y: self.cursor.y,
            font_size: style.font_size,
            line_height: style.line_height,
            role: style.role,
            fragments: line
                .fragments
                .iter()
                .map(|f| PlacedFragment {
                    text: f.text.clone(),
                    bold: f.bold,
                    italic: f.italic,
                    x_offset: f.x_offset,
                })
                .collect(),
            marker,
        };

        if let Some(page) = self.pages.last_mut() {
            page.lines.push(placed);
        }
        self.cursor.y += style.line_height;
    }

    pub fn finish(self) -> Vec<PageLayout> {
        self.pages
    }
}

/// Stamp a centered "Page X of N" footer on every content page. X and N
/// count content pages only.
pub fn stamp_page_numbers(
    pages: &mut [PageLayout],
    geometry: &PageGeometry,
    options: &LayoutOptions,
    fonts: &FontManager,
) {
    let total = pages.iter().filter(|p| p.kind == PageKind::Content).count();
    let size = options.font_sizes.footer;
    let line_height = size * options.line_height_multiplier;
    // Centered vertically in the bottom margin.
    let y = geometry.height - (geometry.margin + line_height) / 2.0;

    let content = pages.iter_mut().filter(|p| p.kind == PageKind::Content);
    for (n, page) in content.enumerate() {
        let text = format!("Page {} of {}", n + 1, total);
        let width = fonts.measure_text_width(&text, size, false, false);
        page.lines.push(PlacedLine {
            x: (geometry.width - width) / 2.0,
            y,
            font_size: size,
            line_height,
            role: LineRole::Footer,
            fragments: vec![PlacedFragment {
                text,
                bold: false,
                italic: false,
                x_offset: 0.0,
            }],
            marker: None,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runs::StyledRun;
    use crate::wrap::wrap_runs;

    fn geometry() -> PageGeometry {
        PageGeometry {
            width: 200.0,
            height: 300.0,
            margin: 50.0,
        }
    }

    fn plain_style(line_height: f32) -> BlockStyle {
        BlockStyle {
            line_height,
            space_after: 0.0,
            first_indent: 0.0,
            ..BlockStyle::for_kind(BlockKind::Paragraph, &LayoutOptions::default())
        }
    }

    fn line(text: &str) -> Vec<LayoutLine> {
        wrap_runs(&[StyledRun::plain(text)], 1000.0, |t, _, _| t.len() as f32)
    }

    #[test]
    fn single_line_advances_by_line_height() {
        let mut flow = PageFlow::new(geometry());
        flow.start_page(PageKind::Content);
        let before = flow.cursor();
        flow.place_block(&line(&"x".repeat(500)), &plain_style(20.0));
        let after = flow.cursor();
        assert_eq!(after.page_index, before.page_index);
        assert!((after.y - before.y - 20.0).abs() < f32::EPSILON);
    }

    #[test]
    fn breaks_before_crossing_bottom_margin() {
        let mut flow = PageFlow::new(geometry());
        flow.start_page(PageKind::Content);
        // Body is 200pt tall: ten 20pt lines fit, the eleventh breaks.
        for i in 0..11 {
            flow.place_block(&line(&format!("line {i}")), &plain_style(20.0));
        }
        let pages = flow.finish();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].lines.len(), 10);
        assert_eq!(pages[1].lines.len(), 1);
        assert!((pages[1].lines[0].y - 50.0).abs() < f32::EPSILON);
        for page in &pages {
            for l in &page.lines {
                assert!(l.bottom() <= geometry().body_bottom() + 0.001);
            }
        }
    }

    #[test]
    fn overflow_continues_the_current_page_kind() {
        let mut flow = PageFlow::new(geometry());
        flow.start_page(PageKind::Cover);
        for i in 0..12 {
            flow.place_block(&line(&format!("cover {i}")), &plain_style(20.0));
        }
        flow.start_page(PageKind::Content);
        flow.place_block(&line("body"), &plain_style(20.0));
        let kinds: Vec<PageKind> = flow.finish().iter().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![PageKind::Cover, PageKind::Cover, PageKind::Content]);
    }

    #[test]
    fn oversized_line_still_makes_progress() {
        let mut flow = PageFlow::new(geometry());
        flow.start_page(PageKind::Content);
        let huge = plain_style(500.0);
        flow.place_block(&line("first"), &huge);
        flow.place_block(&line("second"), &huge);
        flow.place_block(&line("third"), &huge);
        let pages = flow.finish();
        assert_eq!(pages.len(), 3);
        assert!(pages.iter().all(|p| p.lines.len() == 1));
    }

    #[test]
    fn heading_is_kept_with_following_line() {
        let options = LayoutOptions::default();
        let mut heading = BlockStyle::for_kind(BlockKind::Heading(2), &options);
        heading.line_height = 20.0;
        heading.keep_with_next = 20.0;
        heading.space_before = 0.0;

        let mut flow = PageFlow::new(geometry());
        flow.start_page(PageKind::Content);
        for _ in 0..9 {
            flow.place_block(&line("filler"), &plain_style(20.0));
        }
        // One 20pt slot left: the heading fits alone but not with its body.
        flow.place_block(&line("Heading"), &heading);
        let pages = flow.finish();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].lines[0].role, LineRole::Heading(2));
    }

    #[test]
    fn skip_is_ignored_at_page_top_and_clamped_at_bottom() {
        let mut flow = PageFlow::new(geometry());
        flow.start_page(PageKind::Content);
        flow.skip(30.0);
        assert!((flow.cursor().y - 50.0).abs() < f32::EPSILON);

        flow.place_block(&line("a"), &plain_style(20.0));
        flow.skip(10_000.0);
        assert!((flow.cursor().y - 250.0).abs() < f32::EPSILON);
    }

    #[test]
    fn centered_lines_sit_in_the_middle() {
        let options = LayoutOptions::default();
        let mut style = BlockStyle::for_kind(BlockKind::Heading(1), &options);
        style.space_before = 0.0;
        let mut flow = PageFlow::new(geometry());
        flow.start_page(PageKind::Content);
        flow.place_block(&line("abcd"), &style);
        let pages = flow.finish();
        // Content width 100, line width 4.
        assert!((pages[0].lines[0].x - 98.0).abs() < 0.001);
    }

    #[test]
    fn bullet_marker_only_on_first_line() {
        let options = LayoutOptions::default();
        let style = BlockStyle::for_kind(BlockKind::BulletItem, &options);
        let lines = wrap_runs(&[StyledRun::plain("aa bb cc")], 2.0, |t, _, _| t.len() as f32);
        assert_eq!(lines.len(), 3);

        let mut flow = PageFlow::new(PageGeometry {
            width: 595.0,
            height: 842.0,
            margin: 72.0,
        });
        flow.start_page(PageKind::Content);
        flow.place_block(&lines, &style);
        let pages = flow.finish();
        let placed = &pages[0].lines;
        assert!(placed[0].marker.is_some());
        assert!(placed[1..].iter().all(|l| l.marker.is_none()));
        assert!(placed.iter().all(|l| (l.x - (72.0 + options.bullet_indent)).abs() < 0.001));
    }

    #[test]
    fn footers_count_content_pages_only() {
        let mut pages = vec![
            PageLayout::new(0, PageKind::Cover),
            PageLayout::new(1, PageKind::Content),
            PageLayout::new(2, PageKind::Content),
        ];
        let fonts = FontManager::default();
        stamp_page_numbers(&mut pages, &geometry(), &LayoutOptions::default(), &fonts);
        assert!(pages[0].lines.is_empty());
        assert_eq!(pages[1].lines[0].text(), "Page 1 of 2");
        assert_eq!(pages[2].lines[0].text(), "Page 2 of 2");
        assert!(pages[2].lines[0].y > geometry().body_bottom());
    }
}
