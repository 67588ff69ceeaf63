use std::collections::HashMap;

use thiserror::Error;

pub mod contract;
pub mod quotation;

pub use contract::ContractParser;
pub use quotation::QuotationParser;
// Re-export domain types from core (canonical definitions live there)
pub use tenderwatch_core::{DOC_TYPE_CONTRACT, DOC_TYPE_QUOTATION, DocumentRecord, LineItem};

#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("no parser registered for document type: {0}")]
    UnknownDocumentType(String),
}

/// One field-extraction variant per document type.
///
/// Parsing is best-effort extraction, not validation: every field uses
/// an independent pattern, a missing match yields that field's
/// documented default, and `parse` never fails. Failure exists only at
/// the registry level, when a declared type has no variant.
pub trait DocumentParser: Send + Sync {
    /// The registry key this variant is responsible for.
    fn document_type(&self) -> &'static str;

    /// Turn raw extracted text into a normalized record. The returned
    /// record's `document_type` is always `self.document_type()`.
    fn parse(&self, text: &str) -> DocumentRecord;
}

/// Keyword sets for type auto-detection, checked in priority order:
/// quotation keywords win over contract keywords; neither matching
/// defaults to quotation. A heuristic classifier, not a guarantee.
const QUOTATION_KEYWORDS: [&str; 3] = ["quotation", "quote", "estimate"];
const CONTRACT_KEYWORDS: [&str; 3] = ["contract", "agreement", "terms"];

/// Auto-detect the document type from lower-cased keyword presence.
pub fn detect_document_type(text: &str) -> &'static str {
    let text_lower = text.to_lowercase();

    if QUOTATION_KEYWORDS.iter().any(|kw| text_lower.contains(kw)) {
        DOC_TYPE_QUOTATION
    } else if CONTRACT_KEYWORDS.iter().any(|kw| text_lower.contains(kw)) {
        DOC_TYPE_CONTRACT
    } else {
        DOC_TYPE_QUOTATION
    }
}

/// Registry mapping document-type identifier to parser variant.
///
/// Adding a new document type means registering a new variant; the
/// dispatch itself never changes.
pub struct ParserRegistry {
    parsers: HashMap<&'static str, Box<dyn DocumentParser>>,
}

impl ParserRegistry {
    /// An empty registry with no variants.
    pub fn new() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// The built-in variant set: quotation and contract.
    pub fn with_default_parsers() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(QuotationParser));
        registry.register(Box::new(ContractParser));
        registry
    }

    pub fn register(&mut self, parser: Box<dyn DocumentParser>) {
        self.parsers.insert(parser.document_type(), parser);
    }

    pub fn registered_types(&self) -> Vec<&'static str> {
        let mut types: Vec<_> = self.parsers.keys().copied().collect();
        types.sort_unstable();
        types
    }

    /// Parse raw text with the variant for `declared`, or auto-detect
    /// the type when none is declared.
    pub fn parse_document(
        &self,
        text: &str,
        declared: Option<&str>,
    ) -> Result<DocumentRecord, ParsingError> {
        let document_type = declared.unwrap_or_else(|| detect_document_type(text));
        let parser = self
            .parsers
            .get(document_type)
            .ok_or_else(|| ParsingError::UnknownDocumentType(document_type.to_string()))?;
        Ok(parser.parse(text))
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_default_parsers()
    }
}

/// Parse a monetary amount, stripping digit-group separators first so
/// "1,234.56" parses as 1234.56. Unparsable input yields the default 0.
pub(crate) fn parse_amount(raw: &str) -> f64 {
    raw.replace(',', "").parse().unwrap_or(0.0)
}

/// Normalize a matched raw date to canonical `YYYY-MM-DD` by trying each
/// of the given chrono formats in order. `None` when nothing parses.
pub(crate) fn normalize_date(raw: &str, formats: &[&str]) -> Option<String> {
    formats.iter().find_map(|fmt| {
        chrono::NaiveDate::parse_from_str(raw, fmt)
            .ok()
            .map(|d| d.format("%Y-%m-%d").to_string())
    })
}
