//! Multi-factor risk scoring of a new document against the corpus.
//!
//! For every stored document of the same type, six independent signals
//! are evaluated unconditionally and in a fixed order; each signal that
//! exceeds its threshold adds its weight to the pair's risk score and a
//! human-readable finding to the issue list. The overall verdict is the
//! maximum pair score, mapped onto a four-level scale.

use crate::similarity::{
    date_difference, items_similarity, postal_similarity, price_difference, text_similarity,
};
use crate::store::{StoredDocument, StoredItems};
use crate::{DocumentRecord, SimilarityConfig};

/// Signal weights, in evaluation order. Near-duplicate raw text is the
/// strongest fraud signal and carries the highest weight.
pub const WEIGHT_TEXT_SIMILARITY: u32 = 50;
pub const WEIGHT_ADDRESS_SIMILARITY: u32 = 20;
pub const WEIGHT_ITEM_SIMILARITY: u32 = 30;
pub const WEIGHT_PRICE_DIFFERENCE: u32 = 25;
pub const WEIGHT_DATE_PROXIMITY: u32 = 15;
pub const WEIGHT_SIGNATORY_REUSE: u32 = 40;
pub const WEIGHT_REFERENCE_COLLISION: u32 = 35;

/// A scored comparison between the new document and one stored
/// document. Transient: produced during a single run, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskFlag {
    pub existing_doc_id: i64,
    pub existing_vendor: String,
    pub existing_type: String,
    pub risk_score: u32,
    /// Findings in signal evaluation order.
    pub issues: Vec<String>,
}

/// Overall verdict level derived from the maximum pair score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Map a maximum risk score onto the four-level scale.
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=39 => Self::Low,
            40..=59 => Self::Medium,
            60..=79 => Self::High,
            _ => Self::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The overall verdict for one scoring run.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub score: u32,
    pub description: String,
    pub flagged_documents: usize,
}

/// Computes risk flags for a new document against a comparison set.
///
/// Thresholds are fixed at construction and never mutated mid-run, so
/// every comparison within one ingestion sees identical configuration.
pub struct RiskEngine {
    config: SimilarityConfig,
}

impl RiskEngine {
    pub fn new(config: SimilarityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimilarityConfig {
        &self.config
    }

    /// Score the new document against every stored document, returning
    /// flags sorted by descending risk score (stable: ties keep
    /// comparison order). Pairs where no signal fired produce no flag.
    pub fn detect_fraud_indicators(
        &self,
        new_doc: &DocumentRecord,
        raw_text: &str,
        existing: &[StoredDocument],
    ) -> Vec<RiskFlag> {
        let mut flags = Vec::new();

        for stored in existing {
            let mut issues = Vec::new();
            let mut risk_score = 0u32;

            let text_sim = text_similarity(raw_text, &stored.raw_text);
            if text_sim > self.config.text_similarity_threshold {
                issues.push(format!("Very high text similarity: {:.3}", text_sim));
                risk_score += WEIGHT_TEXT_SIMILARITY;
            }

            // Near-identical postal codes used to disguise vendor
            // identity; only evaluated when the codes actually differ.
            if !new_doc.postal_code.is_empty()
                && !stored.record.postal_code.is_empty()
                && new_doc.postal_code != stored.record.postal_code
            {
                let addr_sim = postal_similarity(&new_doc.postal_code, &stored.record.postal_code);
                if addr_sim > self.config.address_threshold {
                    issues.push(format!("Similar but different addresses: {:.3}", addr_sim));
                    risk_score += WEIGHT_ADDRESS_SIMILARITY;
                }
            }

            // Malformed persisted items degrade to 0 rather than
            // aborting the run.
            let item_sim = match &stored.items {
                StoredItems::Decoded(items) => items_similarity(&new_doc.items, items),
                StoredItems::Malformed => {
                    tracing::warn!(
                        id = stored.id,
                        "degrading item similarity to 0 for malformed stored items"
                    );
                    0.0
                }
            };
            if item_sim > self.config.items_threshold {
                issues.push(format!("High item similarity: {:.3}", item_sim));
                risk_score += WEIGHT_ITEM_SIMILARITY;

                // Same-items-different-price manipulation; only relevant
                // once the item sets already match.
                let price_diff = price_difference(new_doc.total, stored.record.total);
                if price_diff > self.config.price_difference_threshold {
                    issues.push(format!(
                        "Significant price difference for similar items: {:.1}%",
                        price_diff * 100.0
                    ));
                    risk_score += WEIGHT_PRICE_DIFFERENCE;
                }
            }

            if let Some(days_apart) =
                date_difference(new_doc.date.as_deref(), stored.record.date.as_deref())
                && days_apart <= self.config.days_threshold
            {
                issues.push(format!("Documents submitted within {} days", days_apart));
                risk_score += WEIGHT_DATE_PROXIMITY;
            }

            if self.config.signatory_exact_match
                && new_doc.vendor != stored.record.vendor
                && !new_doc.signatory.is_empty()
                && new_doc.signatory == stored.record.signatory
            {
                issues.push(format!(
                    "Same signatory '{}' for different vendors",
                    stored.record.signatory
                ));
                risk_score += WEIGHT_SIGNATORY_REUSE;
            }

            if !new_doc.reference_number.is_empty()
                && !stored.record.reference_number.is_empty()
                && new_doc.reference_number == stored.record.reference_number
            {
                issues.push(format!(
                    "Duplicate reference number: {}",
                    stored.record.reference_number
                ));
                risk_score += WEIGHT_REFERENCE_COLLISION;
            }

            if !issues.is_empty() {
                flags.push(RiskFlag {
                    existing_doc_id: stored.id,
                    existing_vendor: stored.record.vendor.clone(),
                    existing_type: stored.record.document_type.clone(),
                    risk_score,
                    issues,
                });
            }
        }

        // sort_by is stable: equal scores keep comparison order
        flags.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));
        flags
    }

    /// Derive the overall verdict from a flag sequence: the maximum
    /// pair score, mapped to LOW / MEDIUM / HIGH / CRITICAL.
    pub fn assess_overall_risk(&self, flags: &[RiskFlag]) -> RiskAssessment {
        let Some(max_score) = flags.iter().map(|f| f.risk_score).max() else {
            return RiskAssessment {
                level: RiskLevel::Low,
                score: 0,
                description: "No suspicious patterns detected".to_string(),
                flagged_documents: 0,
            };
        };

        let level = RiskLevel::from_score(max_score);
        let description = match level {
            RiskLevel::Critical => "High probability of document fraud detected",
            RiskLevel::High => "Multiple suspicious indicators detected",
            RiskLevel::Medium => "Some suspicious patterns detected",
            RiskLevel::Low => "Minor similarities detected",
        };

        RiskAssessment {
            level,
            score: max_score,
            description: description.to_string(),
            flagged_documents: flags.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DOC_TYPE_QUOTATION, LineItem};

    fn record_with(
        vendor: &str,
        total: f64,
        items: Vec<LineItem>,
        reference: &str,
    ) -> DocumentRecord {
        let mut record = DocumentRecord::empty(DOC_TYPE_QUOTATION);
        record.vendor = vendor.to_string();
        record.total = total;
        record.items = items;
        record.reference_number = reference.to_string();
        record
    }

    fn stored(id: i64, record: DocumentRecord, raw_text: &str) -> StoredDocument {
        let items = StoredItems::Decoded(record.items.clone());
        StoredDocument {
            id,
            record,
            items,
            raw_text: raw_text.to_string(),
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }

    fn steel_beam(qty: i64) -> Vec<LineItem> {
        vec![LineItem {
            name: "Steel Beam".to_string(),
            qty,
            rate: 2_000.0,
            total: 10_000.0,
        }]
    }

    #[test]
    fn empty_comparison_set_is_low_risk() {
        let engine = RiskEngine::new(SimilarityConfig::default());
        let new_doc = record_with("ACME PTE LTD", 10_000.0, steel_beam(5), "QT-001");

        let flags = engine.detect_fraud_indicators(&new_doc, "some raw text", &[]);
        assert!(flags.is_empty());

        let assessment = engine.assess_overall_risk(&flags);
        assert_eq!(assessment.level, RiskLevel::Low);
        assert_eq!(assessment.score, 0);
        assert_eq!(assessment.flagged_documents, 0);
        assert_eq!(assessment.description, "No suspicious patterns detected");
    }

    #[test]
    fn matching_items_and_reference_score_sixty_five() {
        // Same items, duplicate reference, 4.8% price gap (below the 10%
        // threshold) and clearly distinct raw text: 30 + 35 = 65 -> HIGH.
        let engine = RiskEngine::new(SimilarityConfig::default());
        let new_doc = record_with("ACME PTE LTD", 10_000.0, steel_beam(5), "QT-001");
        let prior = stored(
            1,
            record_with("RIVAL BUILDERS PTE LTD", 10_500.0, steel_beam(5), "QT-001"),
            "completely unrelated body of stored quotation prose",
        );

        let flags = engine.detect_fraud_indicators(
            &new_doc,
            "the freshly ingested document reads nothing alike",
            &[prior],
        );
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].risk_score, 65);
        assert_eq!(flags[0].issues.len(), 2);
        assert!(flags[0].issues[0].starts_with("High item similarity"));
        assert!(flags[0].issues[1].starts_with("Duplicate reference number"));

        let assessment = engine.assess_overall_risk(&flags);
        assert_eq!(assessment.level, RiskLevel::High);
        assert_eq!(assessment.score, 65);
        assert_eq!(assessment.flagged_documents, 1);
    }

    #[test]
    fn identical_raw_text_fires_text_signal() {
        let engine = RiskEngine::new(SimilarityConfig::default());
        let new_doc = record_with("ACME PTE LTD", 0.0, vec![], "");
        let raw = "QUOTATION\nACME STEEL PTE LTD\nTOTAL AMT: $10,000.00";
        let mut prior_record = record_with("ACME PTE LTD", 0.0, vec![], "");
        // Avoid the empty-items Jaccard firing alongside
        prior_record.items = steel_beam(5);
        let prior = stored(7, prior_record, raw);

        let flags = engine.detect_fraud_indicators(&new_doc, raw, &[prior]);
        assert_eq!(flags.len(), 1);
        assert!(flags[0].issues[0].starts_with("Very high text similarity: 1.000"));
        assert_eq!(flags[0].risk_score, WEIGHT_TEXT_SIMILARITY);
    }

    #[test]
    fn signals_fire_in_documented_order() {
        let mut new_doc = record_with("ACME PTE LTD", 10_000.0, steel_beam(5), "QT-001");
        new_doc.postal_code = "569933".to_string();
        new_doc.date = Some("2024-03-14".to_string());
        new_doc.signatory = "Tan Ah Kow".to_string();

        let mut prior_record =
            record_with("RIVAL BUILDERS PTE LTD", 20_000.0, steel_beam(5), "QT-001");
        prior_record.postal_code = "569934".to_string();
        prior_record.date = Some("2024-03-12".to_string());
        prior_record.signatory = "Tan Ah Kow".to_string();

        let raw = "identical raw text";
        let engine = RiskEngine::new(SimilarityConfig::default());
        let flags = engine.detect_fraud_indicators(&new_doc, raw, &[stored(3, prior_record, raw)]);

        assert_eq!(flags.len(), 1);
        let flag = &flags[0];
        assert_eq!(flag.risk_score, 50 + 20 + 30 + 25 + 15 + 40 + 35);
        assert_eq!(flag.issues.len(), 7);
        assert!(flag.issues[0].starts_with("Very high text similarity"));
        assert!(flag.issues[1].starts_with("Similar but different addresses"));
        assert!(flag.issues[2].starts_with("High item similarity"));
        assert!(flag.issues[3].starts_with("Significant price difference"));
        assert!(flag.issues[4].starts_with("Documents submitted within"));
        assert!(flag.issues[5].starts_with("Same signatory"));
        assert!(flag.issues[6].starts_with("Duplicate reference number"));
        assert_eq!(flag.existing_vendor, "RIVAL BUILDERS PTE LTD");
        assert_eq!(flag.existing_type, DOC_TYPE_QUOTATION);
    }

    #[test]
    fn missing_date_never_fires_proximity() {
        let engine = RiskEngine::new(SimilarityConfig::default());
        let new_doc = record_with("ACME PTE LTD", 10_000.0, steel_beam(5), "");
        let mut prior_record = record_with("ACME PTE LTD", 10_000.0, steel_beam(7), "");
        prior_record.date = Some("2024-03-12".to_string());

        let flags = engine.detect_fraud_indicators(
            &new_doc,
            "first body of text",
            &[stored(1, prior_record, "second body, entirely different")],
        );
        assert!(flags.is_empty());
    }

    #[test]
    fn malformed_stored_items_degrade_to_zero() {
        let engine = RiskEngine::new(SimilarityConfig::default());
        let new_doc = record_with("ACME PTE LTD", 10_000.0, steel_beam(5), "QT-001");

        let mut prior = stored(
            1,
            record_with("RIVAL BUILDERS PTE LTD", 10_500.0, steel_beam(5), "QT-001"),
            "unrelated stored text entirely",
        );
        prior.items = StoredItems::Malformed;
        prior.record.items = Vec::new();

        let flags =
            engine.detect_fraud_indicators(&new_doc, "new document text, nothing alike", &[prior]);
        // Only the reference collision fires; item similarity degraded to 0
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].risk_score, WEIGHT_REFERENCE_COLLISION);
        assert_eq!(flags[0].issues.len(), 1);
    }

    #[test]
    fn flags_sort_descending_and_ties_keep_comparison_order() {
        let engine = RiskEngine::new(SimilarityConfig::default());
        let new_doc = record_with("ACME PTE LTD", 10_000.0, steel_beam(5), "QT-001");

        // id 1: reference collision only (35)
        let first = stored(
            1,
            record_with("VENDOR ONE PTE LTD", 300.0, vec![], "QT-001"),
            "alpha text with no resemblance",
        );
        // id 2: items + reference (65)
        let second = stored(
            2,
            record_with("VENDOR TWO PTE LTD", 10_000.0, steel_beam(5), "QT-001"),
            "beta text with no resemblance",
        );
        // id 3: reference collision only (35), ties with id 1
        let third = stored(
            3,
            record_with("VENDOR THREE PTE LTD", 300.0, vec![], "QT-001"),
            "gamma text with no resemblance",
        );

        let flags =
            engine.detect_fraud_indicators(&new_doc, "fresh text", &[first, second, third]);
        assert_eq!(flags.len(), 3);
        assert_eq!(flags[0].existing_doc_id, 2);
        assert_eq!(flags[1].existing_doc_id, 1);
        assert_eq!(flags[2].existing_doc_id, 3);
    }

    #[test]
    fn verdict_boundaries() {
        let engine = RiskEngine::new(SimilarityConfig::default());
        let flag_with = |score: u32| RiskFlag {
            existing_doc_id: 1,
            existing_vendor: "V".to_string(),
            existing_type: DOC_TYPE_QUOTATION.to_string(),
            risk_score: score,
            issues: vec!["issue".to_string()],
        };

        assert_eq!(
            engine.assess_overall_risk(&[flag_with(80)]).level,
            RiskLevel::Critical
        );
        assert_eq!(
            engine.assess_overall_risk(&[flag_with(79)]).level,
            RiskLevel::High
        );
        assert_eq!(
            engine.assess_overall_risk(&[flag_with(40)]).level,
            RiskLevel::Medium
        );
        assert_eq!(
            engine.assess_overall_risk(&[flag_with(39)]).level,
            RiskLevel::Low
        );
    }

    #[test]
    fn verdict_uses_maximum_across_flags() {
        let engine = RiskEngine::new(SimilarityConfig::default());
        let flag_with = |score: u32| RiskFlag {
            existing_doc_id: 1,
            existing_vendor: "V".to_string(),
            existing_type: DOC_TYPE_QUOTATION.to_string(),
            risk_score: score,
            issues: vec!["issue".to_string()],
        };
        let assessment = engine.assess_overall_risk(&[flag_with(35), flag_with(85), flag_with(60)]);
        assert_eq!(assessment.level, RiskLevel::Critical);
        assert_eq!(assessment.score, 85);
        assert_eq!(assessment.flagged_documents, 3);
    }
}
