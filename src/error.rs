//! Error types for summary-forge.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for summary-forge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the layout engine.
///
/// Only [`Error::FontLoad`] is produced during layout, and the composer
/// recovers from it by falling back to a built-in font. Everything else is
/// fatal for the document being produced.
#[derive(Error, Debug)]
pub enum Error {
    /// A font resource could not be read or parsed.
    #[error("Font load error ({path}): {reason}")]
    FontLoad { path: String, reason: String },

    /// The PDF serializer did not produce a usable document.
    #[error("Artifact finalization failed: {0}")]
    Finalization(String),

    /// Writing the finished artifact to disk failed.
    #[error("Failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A frozen layout could not be (de)serialised.
    #[error("Invalid layout JSON: {0}")]
    LayoutJson(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn font_load(path: impl Into<String>, reason: impl ToString) -> Self {
        Error::FontLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
