use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DocumentError;
use crate::models::patient::Field;

/// Text decoded from a single uploaded document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentText {
    pub document_id: Uuid,
    pub format: DocumentFormat,
    pub pages: Vec<PageText>,
    pub full_text: String,
}

impl DocumentText {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Upload formats the reader understands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Pdf,
    PlainText,
}

impl DocumentFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::PlainText => "plain_text",
        }
    }
}

/// Per-page text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageText {
    pub page_number: usize,
    pub text: String,
}

/// PDF text extraction abstraction (allows mocking for tests).
pub trait PdfExtractor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<Vec<PageText>, DocumentError>;
}

/// Fields recognised in a report, keyed by field.
///
/// Partial by design: only fields whose pattern matched are present.
/// Booleans are stored as `0.0` / `1.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedFields(BTreeMap<Field, f64>);

impl ExtractedFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> Option<f64> {
        self.0.get(&field).copied()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    /// Record a value, returning the previous one if the field was already set.
    pub fn insert(&mut self, field: Field, value: f64) -> Option<f64> {
        self.0.insert(field, value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in feature order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, f64)> + '_ {
        self.0.iter().map(|(field, value)| (*field, *value))
    }
}

impl FromIterator<(Field, f64)> for ExtractedFields {
    fn from_iter<I: IntoIterator<Item = (Field, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
