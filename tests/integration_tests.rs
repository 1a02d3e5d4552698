//! Integration tests for the summary-forge pipeline.
//!
//! These tests validate:
//! - Layout config places cover, header, headings, paragraphs and bullets
//! - PDF output exists and has valid format
//! - Pagination keeps every body line inside the margins
//! - Layout is reproducible byte for byte

use sha2::{Digest, Sha256};

use summary_forge::fonts::{FontAssets, FontFamily, FontManager};
use summary_forge::layout_config::{LayoutConfig, LineRole, PageKind, PlacedLine};
use summary_forge::pipeline::{compute_layout, generate_document, LayoutOptions};
use summary_forge::render::render_pdf;
use summary_forge::samples;

// =====================================================================
// Helper
// =====================================================================

fn default_options() -> LayoutOptions {
    LayoutOptions {
        date_stamp: Some("June 1, 2025".to_string()),
        ..LayoutOptions::default()
    }
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 100, "PDF too small: {} bytes", bytes.len());
    assert_eq!(&bytes[0..5], b"%PDF-", "Missing PDF header");
}

fn lines_with_role(config: &LayoutConfig, role: LineRole) -> Vec<&PlacedLine> {
    config
        .pages
        .iter()
        .flat_map(|p| p.lines.iter())
        .filter(|l| l.role == role)
        .collect()
}

// =====================================================================
// Document structure
// =====================================================================

#[test]
fn heading_paragraph_and_bullets_scenario() {
    let body = "# Heading\nSome **bold** and *italic* text.\n- item one\n- item two";
    let options = default_options();
    let config = compute_layout("Test", body, &options);

    assert_eq!(config.pages.len(), 2);
    assert_eq!(config.pages[0].kind, PageKind::Cover);
    assert_eq!(config.pages[1].kind, PageKind::Content);

    let cover_title = &config.pages[0].lines[0];
    assert_eq!(cover_title.role, LineRole::Title);
    assert_eq!(cover_title.text(), "Test");

    let body_lines: Vec<&PlacedLine> = config.pages[1].body_lines().collect();
    assert_eq!(body_lines.len(), 5);

    // Repeated title
    assert_eq!(body_lines[0].role, LineRole::Header);
    assert_eq!(body_lines[0].text(), "Test");

    // Centered bold heading
    let heading = body_lines[1];
    assert_eq!(heading.role, LineRole::Heading(1));
    assert_eq!(heading.text(), "Heading");
    assert!(heading.fragments.iter().all(|f| f.bold));
    assert!(heading.x > options.margin, "H1 should be centered");

    // Paragraph with exactly one bold and one italic run
    let para = body_lines[2];
    assert_eq!(para.role, LineRole::Paragraph);
    assert_eq!(para.text(), "Some bold and italic text.");
    let bold: Vec<&str> = para.fragments.iter().filter(|f| f.bold).map(|f| f.text.as_str()).collect();
    let italic: Vec<&str> = para
        .fragments
        .iter()
        .filter(|f| f.italic)
        .map(|f| f.text.as_str())
        .collect();
    assert_eq!(bold, vec!["bold"]);
    assert_eq!(italic, vec!["italic"]);

    // Bullets: marker left of indented text
    for (line, expected) in body_lines[3..].iter().zip(["item one", "item two"]) {
        assert_eq!(line.role, LineRole::Bullet);
        assert_eq!(line.text(), expected);
        let marker = line.marker.as_ref().expect("bullet marker");
        assert_eq!(marker.text, "\u{2022}");
        assert!(marker.x < line.x);
        assert!((line.x - (options.margin + options.bullet_indent)).abs() < 0.001);
    }

    // Lines flow downwards
    for pair in body_lines.windows(2) {
        assert!(pair[1].y > pair[0].y);
    }
}

#[test]
fn single_long_word_is_one_line() {
    let word = "w".repeat(500);
    let config = compute_layout("Long word", &word, &default_options());
    let paragraphs = lines_with_role(&config, LineRole::Paragraph);
    assert_eq!(paragraphs.len(), 1);
    assert_eq!(paragraphs[0].fragments.len(), 1);
    assert_eq!(paragraphs[0].text(), word);

    let header = lines_with_role(&config, LineRole::Header)[0];
    assert!((paragraphs[0].y - header.bottom()).abs() < 50.0);
}

#[test]
fn empty_body_gives_cover_and_one_content_page() {
    let config = compute_layout("Nothing to say", "", &default_options());
    assert_eq!(config.pages.len(), 2);
    let content: Vec<_> = config.content_pages().collect();
    assert_eq!(content.len(), 1);
    let roles: Vec<LineRole> = content[0].lines.iter().map(|l| l.role).collect();
    assert_eq!(roles, vec![LineRole::Header, LineRole::Footer]);
}

#[test]
fn multi_page_lines_stay_inside_margins() {
    let options = default_options();
    let config = compute_layout("Long", &samples::long_summary(40), &options);
    let content: Vec<_> = config.content_pages().collect();
    assert!(content.len() > 2, "expected several content pages, got {}", content.len());

    let bottom = config.page_height_pt - options.margin;
    for page in &content {
        let lines: Vec<&PlacedLine> = page.body_lines().collect();
        assert!(!lines.is_empty(), "page {} is empty", page.page_index);
        for pair in lines.windows(2) {
            assert!(pair[1].y >= pair[0].y, "lines out of order on page {}", page.page_index);
        }
        for line in lines {
            assert!(line.y >= options.margin - 0.01);
            assert!(
                line.bottom() <= bottom + 0.01,
                "line '{}' crosses the bottom margin",
                line.text()
            );
        }
    }
}

#[test]
fn footers_number_content_pages() {
    let config = compute_layout("Long", &samples::long_summary(30), &default_options());
    let footers = lines_with_role(&config, LineRole::Footer);
    let total = config.content_pages().count();
    assert_eq!(footers.len(), total);
    for (i, footer) in footers.iter().enumerate() {
        assert_eq!(footer.text(), format!("Page {} of {}", i + 1, total));
    }
    assert!(config.pages[0].lines.iter().all(|l| l.role != LineRole::Footer));
}

#[test]
fn heading_is_never_last_on_a_page() {
    let config = compute_layout("Long", &samples::long_summary(40), &default_options());
    for page in config.content_pages() {
        if let Some(last) = page.body_lines().last() {
            assert!(
                !matches!(last.role, LineRole::Heading(_)),
                "heading '{}' stranded at the bottom of page {}",
                last.text(),
                page.page_index
            );
        }
    }
}

#[test]
fn filename_from_title() {
    let artifact = generate_document("My: Video?", "Body", &default_options()).unwrap();
    assert_eq!(artifact.filename, "My- Video-.pdf");
}

// =====================================================================
// Markup edge cases
// =====================================================================

#[test]
fn fenced_and_escaped_body_is_unwrapped() {
    let config = compute_layout("Fenced", samples::fenced_summary(), &default_options());
    let headings = lines_with_role(&config, LineRole::Heading(1));
    assert_eq!(headings.len(), 1);
    assert_eq!(headings[0].text(), "Key Points");
    assert_eq!(lines_with_role(&config, LineRole::Bullet).len(), 2);
    for page in &config.pages {
        for line in &page.lines {
            assert!(!line.text().contains("```"));
        }
    }
}

#[test]
fn stray_asterisks_stay_literal() {
    let config = compute_layout("Edges", samples::edge_case_summary(), &default_options());
    let texts: Vec<String> = lines_with_role(&config, LineRole::Paragraph)
        .iter()
        .map(|l| l.text())
        .collect();
    assert!(texts.iter().any(|t| t.contains("2 * 3 * 4")), "{texts:?}");
    assert!(texts.iter().any(|t| t.contains("**unclosed")), "{texts:?}");
    assert!(texts.iter().any(|t| t == "#hashtag is not a heading"), "{texts:?}");
    assert!(texts.iter().any(|t| t == "-dash without space is text"), "{texts:?}");

    let bullets = lines_with_role(&config, LineRole::Bullet);
    assert_eq!(bullets.len(), 1);
    assert!(bullets[0].fragments.iter().any(|f| f.bold && f.text == "bold"));
}

#[test]
fn spaced_bold_pair_is_bold() {
    let config = compute_layout("Bold", "a ** spaced ** b", &default_options());
    let para = lines_with_role(&config, LineRole::Paragraph)[0];
    assert_eq!(para.text(), "a  spaced  b");
    assert!(para.fragments.iter().any(|f| f.bold && f.text.trim() == "spaced"));
}

#[test]
fn oversized_mixed_style_word_never_shares_a_line() {
    let word = format!("**{}**{}", "x".repeat(80), "y".repeat(80));
    let config = compute_layout("Mixed", &format!("a {word} b"), &default_options());
    let paragraphs = lines_with_role(&config, LineRole::Paragraph);
    let texts: Vec<String> = paragraphs.iter().map(|l| l.text()).collect();
    assert_eq!(texts, vec!["a".to_string(), "x".repeat(80), "y".repeat(80), "b".to_string()]);
    assert!(paragraphs.iter().all(|l| l.fragments.len() == 1));
}

// =====================================================================
// Measurement against the drawn fonts
// =====================================================================

/// Width of a placed line using the advances of the built-in faces that
/// printpdf draws.
fn drawn_width(line: &PlacedLine, family: FontFamily) -> f32 {
    line.fragments
        .iter()
        .map(|f| {
            let font = family.builtin(f.bold, f.italic).get_subset_font();
            let face = ttf_parser::Face::parse(&font.bytes, 0).unwrap();
            let scale = line.font_size / face.units_per_em() as f32;
            f.text
                .chars()
                .map(|c| match face.glyph_index(c) {
                    Some(gid) => face.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale,
                    None => line.font_size * 0.5,
                })
                .sum::<f32>()
        })
        .sum()
}

#[test]
fn wide_glyphs_wrap_inside_the_right_margin() {
    let body = "WWWWW MMMMM WWWWW MMMMM WWWWW MMMMM WWWWW MMMMM WWWWW MMMMM\n\
                **WWWWW MMMMM** *WWWWW MMMMM* WWWWW MMMMM WWWWW MMMMM WWWWW";
    for family in [FontFamily::Serif, FontFamily::Sans] {
        let options = LayoutOptions {
            font_family: family,
            ..default_options()
        };
        let config = compute_layout("Wide", body, &options);
        let right = config.page_width_pt - options.margin;
        let paragraphs = lines_with_role(&config, LineRole::Paragraph);
        assert!(paragraphs.len() > 2, "{family:?} did not wrap");
        for line in paragraphs {
            let edge = line.x + drawn_width(line, family);
            assert!(edge <= right + 0.5, "{family:?} '{}' ends at {edge} > {right}", line.text());
        }
    }
}

#[test]
fn heading_is_centered_by_drawn_width() {
    let options = default_options();
    let config = compute_layout("Centered", "# WWW Wide Heading", &options);
    let heading = lines_with_role(&config, LineRole::Heading(1))[0];
    let width = drawn_width(heading, FontFamily::Serif);
    let left_gap = heading.x - options.margin;
    let right_gap = config.page_width_pt - options.margin - (heading.x + width);
    assert!((left_gap - right_gap).abs() < 0.5, "left {left_gap} right {right_gap}");
}

#[test]
fn long_title_does_not_add_content_pages() {
    let title = "Word ".repeat(1500);
    let config = compute_layout(&title, "Body.", &default_options());
    let first_content = config.pages.iter().position(|p| p.kind == PageKind::Content).unwrap();
    assert!(config.pages[..first_content].iter().all(|p| p.kind == PageKind::Cover));
    assert!(!config.pages[0].lines.is_empty());
    assert_eq!(config.pages[first_content].lines[0].role, LineRole::Header);

    let footers = lines_with_role(&config, LineRole::Footer);
    assert_eq!(footers.len(), config.content_pages().count());
    assert_eq!(footers[0].text(), format!("Page 1 of {}", footers.len()));
}

// =====================================================================
// Options
// =====================================================================

#[test]
fn landscape_and_sans() {
    let options = LayoutOptions {
        font_family: FontFamily::Sans,
        ..LayoutOptions::a4_landscape()
    };
    let artifact = generate_document("Wide", samples::short_summary(), &options).unwrap();
    assert_valid_pdf(&artifact.bytes);
    assert!(artifact.layout.page_width_pt > artifact.layout.page_height_pt);
    assert_eq!(artifact.layout.font_family, FontFamily::Sans);
}

#[test]
fn missing_font_files_fall_back_to_builtins() {
    let options = LayoutOptions {
        font_assets: FontAssets {
            regular: Some("/nonexistent/Regular.ttf".into()),
            bold: Some("/nonexistent/Bold.ttf".into()),
            italic: None,
        },
        ..default_options()
    };
    let fallback = compute_layout("Fonts", samples::short_summary(), &options);
    let builtin = compute_layout("Fonts", samples::short_summary(), &default_options());
    assert_eq!(fallback, builtin);

    let artifact = generate_document("Fonts", samples::short_summary(), &options).unwrap();
    assert_valid_pdf(&artifact.bytes);
}

#[test]
fn narrower_margin_fits_more_per_page() {
    let body = samples::long_summary(40);
    let wide = compute_layout("M", &body, &default_options());
    let narrow = compute_layout(
        "M",
        &body,
        &LayoutOptions {
            margin: 36.0,
            ..default_options()
        },
    );
    assert!(narrow.pages.len() < wide.pages.len());
}

// =====================================================================
// Layout config serialisation
// =====================================================================

#[test]
fn render_from_layout_config_json() {
    let config = compute_layout("Lecture", samples::lecture_summary(), &default_options());
    let json = config.to_json();
    let parsed = LayoutConfig::from_json(&json).unwrap();
    assert_eq!(parsed, config);
    let bytes = render_pdf(&parsed, &FontManager::new(parsed.font_family)).unwrap();
    assert_valid_pdf(&bytes);
}

// =====================================================================
// Golden-sample stability test
// =====================================================================

fn layout_digest(title: &str, body: &str, options: &LayoutOptions) -> String {
    let json = compute_layout(title, body, options).to_json();
    Sha256::digest(json.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[test]
fn layout_is_deterministic() {
    let options = default_options();
    let body = samples::lecture_summary();
    let first = layout_digest("Bridges", body, &options);
    let second = layout_digest("Bridges", body, &options);
    assert_eq!(first.len(), 64);
    assert_eq!(first, second);

    let other = layout_digest("Bridges", samples::short_summary(), &options);
    assert_ne!(first, other);
}

#[test]
fn pdf_output_is_byte_identical() {
    let body = "# H\nSome **bold** text.";
    let a = generate_document("Test", body, &default_options()).unwrap();
    let b = generate_document("Test", body, &default_options()).unwrap();
    assert_eq!(a.layout, b.layout);
    assert_eq!(a.bytes, b.bytes);

    let c = generate_document("Test", "# H\nOther text.", &default_options()).unwrap();
    assert_ne!(a.bytes, c.bytes);
}

// =====================================================================
// Concurrency
// =====================================================================

#[test]
fn documents_compose_concurrently() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                compute_layout(&format!("T{i}"), &samples::long_summary(5 + i), &default_options())
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let config = handle.join().unwrap();
        assert_eq!(config, compute_layout(&format!("T{i}"), &samples::long_summary(5 + i), &default_options()));
    }
}

// =====================================================================
// Writing to disk
// =====================================================================

#[test]
fn artifact_writes_under_derived_name() {
    let dir = std::env::temp_dir().join(format!("summary-forge-test-{}", std::process::id()));
    let artifact = generate_document("Saved: copy", samples::short_summary(), &default_options()).unwrap();
    let path = artifact.write_to(&dir).unwrap();
    assert_eq!(path.file_name().unwrap(), "Saved- copy.pdf");
    let written = std::fs::read(&path).unwrap();
    assert_eq!(written, artifact.bytes);
    let _ = std::fs::remove_dir_all(&dir);
}

// =====================================================================
// All samples render without error
// =====================================================================

#[test]
fn all_samples_render_successfully() {
    let long = samples::long_summary(12);
    let bodies: Vec<(&str, &str)> = vec![
        ("short", samples::short_summary()),
        ("lecture", samples::lecture_summary()),
        ("fenced", samples::fenced_summary()),
        ("edge", samples::edge_case_summary()),
        ("long", &long),
    ];

    for (name, body) in bodies {
        let result = generate_document(name, body, &default_options());
        assert!(result.is_ok(), "Sample '{}' failed: {:?}", name, result.err());
        let artifact = result.unwrap();
        assert_valid_pdf(&artifact.bytes);
        assert!(artifact.page_count() >= 2);
    }
}
