//! Field extraction for contract documents.
//!
//! Contracts use labeled fields ("Contractor:", "Client:", "Signed:")
//! and a slash- or dash-separated date. No structured line-item table
//! is extracted; contract clauses do not follow a tabular format.

use once_cell::sync::Lazy;
use regex::Regex;

use tenderwatch_core::{DOC_TYPE_CONTRACT, DocumentRecord};

use crate::{DocumentParser, normalize_date, parse_amount};

static VENDOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)contractor:\s*([A-Z][A-Za-z\s&]+(?:PTE LTD|LTD|INC))").unwrap());

static CLIENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)client:\s*([A-Z][A-Za-z\s&]+(?:PTE LTD|LTD|INC))").unwrap());

/// Slash- or dash-separated date, numeric or abbreviated month,
/// e.g. "12/03/2024" or "12-Mar-2024".
static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)date:\s*(\d{1,2}[/\-][A-Za-z0-9]+[/\-]20\d{2})").unwrap());

static POSTAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Singapore (\d{6})").unwrap());

static SIGNATORY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:signed|signature):\s*([^\n]+)").unwrap());

static TOTAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:contract|total)\s*(?:value|amount):\s*\$?([0-9,]+\.\d{2})").unwrap()
});

static REF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)contract\s*(?:no\.?|number|#)?\s*:\s*([A-Z0-9-]+)").unwrap()
});

/// Formats tried for date normalization. The matched string is always
/// reduced to canonical `YYYY-MM-DD` before storage so date-proximity
/// comparisons across document types stay reliable.
const DATE_FORMATS: [&str; 6] = [
    "%d/%m/%Y", "%d-%m-%Y", "%d/%b/%Y", "%d-%b-%Y", "%d/%B/%Y", "%d-%B-%Y",
];

pub struct ContractParser;

impl DocumentParser for ContractParser {
    fn document_type(&self) -> &'static str {
        DOC_TYPE_CONTRACT
    }

    fn parse(&self, text: &str) -> DocumentRecord {
        let mut record = DocumentRecord::empty(DOC_TYPE_CONTRACT);

        if let Some(caps) = VENDOR_RE.captures(text) {
            record.vendor = caps[1].trim().to_string();
        }
        if let Some(caps) = CLIENT_RE.captures(text) {
            record.client = caps[1].trim().to_string();
        }
        if let Some(caps) = DATE_RE.captures(text) {
            record.date = normalize_date(&caps[1], &DATE_FORMATS);
        }
        if let Some(caps) = POSTAL_RE.captures(text) {
            record.postal_code = caps[1].to_string();
        }
        if let Some(caps) = SIGNATORY_RE.captures(text) {
            record.signatory = caps[1].trim().to_string();
        }
        if let Some(caps) = TOTAL_RE.captures(text) {
            record.total = parse_amount(&caps[1]);
        }
        if let Some(caps) = REF_RE.captures(text) {
            record.reference_number = caps[1].to_string();
        }

        record
    }
}
