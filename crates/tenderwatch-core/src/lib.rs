use serde::{Deserialize, Serialize};

pub mod backend;
pub mod config_file;
pub mod scoring;
pub mod similarity;
pub mod store;

// Re-export for convenience
pub use backend::{BackendError, TextBackend};
pub use scoring::{RiskAssessment, RiskEngine, RiskFlag, RiskLevel};
pub use store::{DocumentStore, StoreError, StoredDocument, StoredItems};

/// Sentinel vendor name used when no vendor pattern matched.
pub const UNKNOWN_VENDOR: &str = "Unknown Vendor";
/// Sentinel client name used when no client pattern matched.
pub const UNKNOWN_CLIENT: &str = "Unknown Client";

/// Registry key for the quotation parser variant.
pub const DOC_TYPE_QUOTATION: &str = "quotation";
/// Registry key for the contract parser variant.
pub const DOC_TYPE_CONTRACT: &str = "contract";

/// One extracted line item, in document order.
///
/// Serde field names match the legacy `items` JSON column encoding, so
/// records written by earlier deployments decode without migration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub qty: i64,
    pub rate: f64,
    pub total: f64,
}

/// The normalized parsed representation of one business document.
///
/// Extraction is best-effort: every field is either the matched value or
/// its documented default. Textual fields use empty strings (or the
/// `UNKNOWN_*` sentinels for the parties) rather than an absence marker,
/// so downstream comparisons are total. Each record owns its own
/// `additional_fields` map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub vendor: String,
    pub client: String,
    /// Canonical `YYYY-MM-DD`, `None` when no date pattern matched.
    pub date: Option<String>,
    pub postal_code: String,
    pub items: Vec<LineItem>,
    pub total: f64,
    pub signatory: String,
    /// Always a registered parser key; set by the parser that produced
    /// this record, never inferred after the fact.
    pub document_type: String,
    pub reference_number: String,
    /// Extensibility slot for type-specific data.
    pub additional_fields: serde_json::Map<String, serde_json::Value>,
}

impl DocumentRecord {
    /// An empty record of the given type with every field at its
    /// documented default. Parser variants fill in what they match.
    pub fn empty(document_type: &str) -> Self {
        Self {
            vendor: UNKNOWN_VENDOR.to_string(),
            client: UNKNOWN_CLIENT.to_string(),
            date: None,
            postal_code: String::new(),
            items: Vec::new(),
            total: 0.0,
            signatory: String::new(),
            document_type: document_type.to_string(),
            reference_number: String::new(),
            additional_fields: serde_json::Map::new(),
        }
    }
}

/// Similarity thresholds for one scoring run.
///
/// Immutable for the lifetime of a [`RiskEngine`] instance, so every
/// comparison within one ingestion uses identical thresholds. May be
/// shared read-only across concurrent ingestions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityConfig {
    /// Postal-code similarity ratio above which differing codes flag.
    pub address_threshold: f64,
    /// Jaccard item-set similarity above which item overlap flags.
    pub items_threshold: f64,
    /// Relative total divergence above which matching items flag.
    pub price_difference_threshold: f64,
    /// Maximum day gap for the date-proximity signal.
    pub days_threshold: i64,
    /// Raw-text similarity ratio above which near-duplicates flag.
    pub text_similarity_threshold: f64,
    /// Whether signatory reuse across vendors is checked at all.
    pub signatory_exact_match: bool,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            address_threshold: 0.8,
            items_threshold: 0.8,
            price_difference_threshold: 0.1,
            days_threshold: 3,
            text_similarity_threshold: 0.9,
            signatory_exact_match: true,
        }
    }
}
