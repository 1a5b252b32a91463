use super::types::{PageText, PdfExtractor};
use super::DocumentError;

/// PDF text extractor using the pdf-extract crate.
/// Handles digital PDFs with embedded text layers; scanned pages yield empty text.
pub struct PdfTextExtractor;

impl PdfExtractor for PdfTextExtractor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<Vec<PageText>, DocumentError> {
        // pdf-extract panics on some malformed inputs instead of returning an error.
        let page_texts =
            std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(pdf_bytes))
                .map_err(|_| DocumentError::PdfParsing("malformed PDF structure".into()))?
                .map_err(|e| DocumentError::PdfParsing(e.to_string()))?;

        let pages = page_texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| PageText {
                page_number: i + 1,
                text,
            })
            .collect();

        Ok(pages)
    }
}
