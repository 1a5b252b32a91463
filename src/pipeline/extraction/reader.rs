//! Turns an uploaded document (plain text or PDF) into text.
//!
//! Format is decided from magic bytes first, then the declared content type,
//! then the file extension. Anything unrecognised is read as UTF-8 text.

use uuid::Uuid;

use super::types::{DocumentFormat, DocumentText, PageText, PdfExtractor};
use super::DocumentError;

/// Separator placed between PDF pages when building the full text.
const PAGE_SEPARATOR: &str = "\n";

/// Detect the upload format.
///
/// Magic bytes win over the declared content type, which wins over the
/// filename extension.
pub fn detect_format(
    bytes: &[u8],
    content_type: Option<&str>,
    filename: Option<&str>,
) -> Result<DocumentFormat, DocumentError> {
    // PDF: starts with %PDF
    if bytes.starts_with(b"%PDF") {
        return Ok(DocumentFormat::Pdf);
    }

    let declared = content_type
        .map(|ct| ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
        .filter(|ct| !ct.is_empty() && ct != "application/octet-stream")
        .or_else(|| {
            filename
                .and_then(|name| mime_guess::from_path(name).first())
                .map(|mime| mime.essence_str().to_string())
        });

    match declared.as_deref() {
        Some("application/pdf") => Ok(DocumentFormat::Pdf),
        Some(mime) if mime.starts_with("text/") => Ok(DocumentFormat::PlainText),
        Some(mime) if mime.starts_with("image/") || mime.starts_with("audio/") || mime.starts_with("video/") => {
            Err(DocumentError::UnsupportedFormat(mime.to_string()))
        }
        _ => Ok(DocumentFormat::PlainText),
    }
}

/// Reads uploaded documents into text.
pub struct DocumentReader<P: PdfExtractor> {
    pdf: P,
    max_bytes: u64,
}

impl<P: PdfExtractor> DocumentReader<P> {
    pub fn new(pdf: P, max_bytes: u64) -> Self {
        Self { pdf, max_bytes }
    }

    /// Decode `bytes` into text.
    ///
    /// PDF pages are extracted individually and concatenated; plain text must
    /// be valid UTF-8.
    pub fn read(
        &self,
        bytes: &[u8],
        content_type: Option<&str>,
        filename: Option<&str>,
    ) -> Result<DocumentText, DocumentError> {
        if bytes.len() as u64 > self.max_bytes {
            return Err(DocumentError::FileTooLarge {
                size_mb: bytes.len() as f64 / (1024.0 * 1024.0),
                max_mb: self.max_bytes / (1024 * 1024),
            });
        }
        if bytes.is_empty() {
            return Err(DocumentError::EmptyDocument);
        }

        let document_id = Uuid::new_v4();
        let format = detect_format(bytes, content_type, filename)?;

        let pages = match format {
            DocumentFormat::Pdf => self.pdf.extract_text(bytes)?,
            DocumentFormat::PlainText => {
                let text = std::str::from_utf8(bytes)
                    .map_err(|e| DocumentError::EncodingError(e.to_string()))?;
                vec![PageText {
                    page_number: 1,
                    text: text.to_string(),
                }]
            }
        };

        let full_text = pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(PAGE_SEPARATOR);

        let document = DocumentText {
            document_id,
            format,
            pages,
            full_text,
        };
        tracing::info!(
            document_id = %document.document_id,
            format = format.as_str(),
            pages = document.page_count(),
            text_length = document.full_text.len(),
            "Document read"
        );
        Ok(document)
    }
}
