//! # summary-forge – markdown-flavoured summary → paginated PDF
//!
//! This crate turns a titled, lightly marked-up summary into a reproducible
//! PDF document. The pipeline stages are:
//!
//! 1. **Classify** – one block per source line ([`blocks`])
//! 2. **Runs** – split `**bold**` / `*italic*` emphasis ([`runs`])
//! 3. **Wrap** – greedy line breaking with measured widths ([`wrap`], [`fonts`])
//! 4. **Paginate** – place lines on A4 pages, stamp footers ([`pagination`])
//! 5. **Render** – emit PDF bytes via printpdf ([`render`])
//!
//! The frozen intermediate form lives in [`layout_config`]; [`pipeline`]
//! drives the stages and [`batch`] runs many documents in parallel.
//! A C-compatible FFI surface is exposed via the [`ffi`] module.

pub mod batch;
pub mod blocks;
pub mod error;
pub mod ffi;
pub mod fonts;
pub mod layout_config;
pub mod pagination;
pub mod pipeline;
pub mod render;
pub mod runs;
pub mod samples;
pub mod wrap;

// Re-exports for convenience
pub use error::{Error, Result};
pub use pipeline::{compute_layout, generate_document, Artifact, LayoutOptions, PageOrientation};
