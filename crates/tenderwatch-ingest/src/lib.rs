//! Ingestion pipeline: obtain raw text, parse, persist, fetch the
//! comparison set and score — one entry point per document.

use std::path::Path;

use thiserror::Error;

use tenderwatch_core::{
    BackendError, DocumentRecord, DocumentStore, RiskAssessment, RiskEngine, RiskFlag,
    SimilarityConfig, StoreError, TextBackend,
};
use tenderwatch_parsing::{ParserRegistry, ParsingError};

// Re-export domain types for convenience
pub use tenderwatch_core::{RiskLevel, StoredDocument};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("text extraction error: {0}")]
    Extraction(#[from] BackendError),
    #[error("parse error: {0}")]
    Parse(#[from] ParsingError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// The structured result of processing one document.
#[derive(Debug)]
pub struct ProcessOutcome {
    pub document_id: i64,
    pub record: DocumentRecord,
    /// Risk flags sorted by descending score.
    pub flags: Vec<RiskFlag>,
    pub assessment: RiskAssessment,
}

/// Orchestrates one ingestion per document: extract text via the
/// backend, parse (auto-detecting the type when undeclared), persist,
/// fetch the same-type comparison set excluding the new id, and score.
///
/// Scoring is read-only with respect to history: nothing is re-persisted
/// based on the outcome, and the corpus is never mutated after the
/// initial insert. Each ingestion is independent; the store boundary is
/// the only coordination point between concurrent ingestions.
pub struct FraudDetector {
    store: DocumentStore,
    registry: ParserRegistry,
    engine: RiskEngine,
}

impl FraudDetector {
    /// A detector over the given store with the default parser variants.
    pub fn new(store: DocumentStore, config: SimilarityConfig) -> Self {
        Self {
            store,
            registry: ParserRegistry::with_default_parsers(),
            engine: RiskEngine::new(config),
        }
    }

    /// Replace the parser registry (e.g. to register extra variants).
    pub fn with_registry(mut self, registry: ParserRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Process one document from a file path, extracting text with the
    /// given backend.
    pub fn process(
        &self,
        path: &Path,
        declared_type: Option<&str>,
        backend: &dyn TextBackend,
    ) -> Result<ProcessOutcome, IngestError> {
        let raw_text = backend.extract_text(path)?;
        self.process_text(&raw_text, declared_type)
    }

    /// Process one document from already-extracted text.
    ///
    /// The insert happens before the comparison fetch, so this
    /// ingestion's own record is always committed (and excluded by id)
    /// when the comparison set is read.
    pub fn process_text(
        &self,
        raw_text: &str,
        declared_type: Option<&str>,
    ) -> Result<ProcessOutcome, IngestError> {
        let record = self.registry.parse_document(raw_text, declared_type)?;

        let document_id = self.store.insert(&record, raw_text)?;
        tracing::info!(
            document_id,
            document_type = %record.document_type,
            vendor = %record.vendor,
            "ingested document"
        );

        let comparison_set = self
            .store
            .fetch_comparison_set(document_id, &record.document_type)?;
        let flags = self
            .engine
            .detect_fraud_indicators(&record, raw_text, &comparison_set);
        let assessment = self.engine.assess_overall_risk(&flags);

        Ok(ProcessOutcome {
            document_id,
            record,
            flags,
            assessment,
        })
    }
}
