pub mod fields;
pub mod pdf;
pub mod reader;
pub mod types;

pub use fields::*;
pub use pdf::*;
pub use reader::*;
pub use types::*;

use thiserror::Error;

/// Failures while turning an uploaded document into text.
///
/// Field-level parse failures are not represented here: a field that does
/// not parse is simply absent from [`ExtractedFields`].
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("Text encoding error: {0}")]
    EncodingError(String),

    #[error("File too large: {size_mb:.1}MB exceeds {max_mb}MB limit")]
    FileTooLarge { size_mb: f64, max_mb: u64 },

    #[error("Unsupported format for extraction: {0}")]
    UnsupportedFormat(String),

    #[error("Empty document")]
    EmptyDocument,
}
