//! summary-forge – command-line summary → PDF converter.
//!
//! Usage:
//!   summary-forge <summary.md> [output-dir] [--title "My Video"] [--landscape] [--sans]
//!
//! The PDF is written into `output-dir` (default: the input's directory)
//! under a filename derived from the title.

use std::{env, fs, path::PathBuf, process};

use summary_forge::fonts::FontFamily;
use summary_forge::pipeline::{generate_document, LayoutOptions, PageOrientation};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut input_path: Option<PathBuf> = None;
    let mut output_dir: Option<PathBuf> = None;
    let mut title: Option<String> = None;
    let mut options = LayoutOptions::default();
    let mut positional = 0usize;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--landscape" | "-l" => options.orientation = PageOrientation::Landscape,
            "--sans" => options.font_family = FontFamily::Sans,
            "--title" | "-t" => title = Some(flag_value(&mut iter, arg, &args[0])),
            "--date" => options.date_stamp = Some(flag_value(&mut iter, arg, &args[0])),
            "--font-regular" => {
                options.font_assets.regular = Some(PathBuf::from(flag_value(&mut iter, arg, &args[0])))
            }
            "--font-bold" => {
                options.font_assets.bold = Some(PathBuf::from(flag_value(&mut iter, arg, &args[0])))
            }
            "--font-italic" => {
                options.font_assets.italic = Some(PathBuf::from(flag_value(&mut iter, arg, &args[0])))
            }
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
            path => {
                if positional == 0 {
                    input_path = Some(PathBuf::from(path));
                } else if positional == 1 {
                    output_dir = Some(PathBuf::from(path));
                } else {
                    eprintln!("Unexpected argument: {path}");
                    print_usage(&args[0]);
                    process::exit(1);
                }
                positional += 1;
            }
        }
    }

    let input = match input_path {
        Some(p) => p,
        None => {
            eprintln!("Error: no input file specified.");
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    let output_dir = output_dir.unwrap_or_else(|| {
        input
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default()
    });

    let body = match fs::read_to_string(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading '{}': {e}", input.display());
            process::exit(1);
        }
    };

    // Default title: stem of the input filename.
    let title = title.unwrap_or_else(|| {
        input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Summary")
            .to_string()
    });

    let artifact = match generate_document(&title, &body, &options) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error generating PDF: {e}");
            process::exit(1);
        }
    };

    match artifact.write_to(&output_dir) {
        Ok(path) => {
            let pages = artifact.page_count();
            eprintln!(
                "Wrote '{}' ({} bytes, {} page{})",
                path.display(),
                artifact.bytes.len(),
                pages,
                if pages == 1 { "" } else { "s" }
            );
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

/// Value following a flag; a missing value is a usage error.
fn flag_value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str, prog: &str) -> String {
    match iter.next() {
        Some(v) => v.clone(),
        None => {
            eprintln!("Missing value for {flag}");
            print_usage(prog);
            process::exit(1);
        }
    }
}

fn print_usage(prog: &str) {
    eprintln!("summary-forge – video summary to PDF converter");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <summary.md> [output-dir] [--title \"My Video\"] [--landscape] [--sans]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <summary.md>   Summary text (headings, bullets, **bold**, *italic*)");
    eprintln!("  [output-dir]   Directory for the PDF (default: next to the input)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --title, -t    Document title and output filename (default: input filename stem)");
    eprintln!("  --landscape    Use landscape page orientation (A4 841×595 pt)");
    eprintln!("  --sans         Use Helvetica instead of Times");
    eprintln!("  --date         Cover date text (default: today)");
    eprintln!("  --font-regular, --font-bold, --font-italic <path>");
    eprintln!("                 TrueType faces to embed; missing files fall back to built-ins");
    eprintln!("  --help         Print this message");
}
