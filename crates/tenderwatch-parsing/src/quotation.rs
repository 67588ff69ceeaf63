//! Field extraction for quotation documents.
//!
//! Quotations carry an all-caps vendor block with a company suffix, a
//! long-form date, a tabular line-item section, and a "TOTAL AMT" row.

use once_cell::sync::Lazy;
use regex::Regex;

use tenderwatch_core::{DOC_TYPE_QUOTATION, DocumentRecord, LineItem};

use crate::{DocumentParser, normalize_date, parse_amount};

/// All-caps company name ending in the Singapore private-limited suffix.
static VENDOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?P<vendor>[A-Z][A-Z\s&]+PTE LTD)").unwrap());

/// Labeled addressee line ("To:", "Client:", "Attn:").
static CLIENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\s*(?:to|client|attn)\s*:\s*(.+)$").unwrap());

/// Long-form date, e.g. "15 March 2024".
static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,2} [A-Za-z]+ 20\d{2})").unwrap());

static POSTAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Singapore (\d{6})").unwrap());

static SIGNATORY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Name:\s*([^\n]+)").unwrap());

static TOTAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)TOTAL\s*AMT?:\s*\$?([0-9,]+\.\d{2})").unwrap());

static REF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:ref|quote|quotation)\s*(?:no\.?|number|#)?\s*:\s*([A-Z0-9-]+)").unwrap()
});

/// One tabular line item: qty, name, qty again, "nos", unit rate, line
/// total. Lines that do not match the full pattern are dropped.
static ITEM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+)[\s\t]+([A-Za-z '()]+)[\s\t]+(\d+)[\s\t]+nos[\s\t]+\$?([\d.,]+)[\s\t]+\$?([\d.,]+)")
        .unwrap()
});

pub struct QuotationParser;

impl DocumentParser for QuotationParser {
    fn document_type(&self) -> &'static str {
        DOC_TYPE_QUOTATION
    }

    fn parse(&self, text: &str) -> DocumentRecord {
        let mut record = DocumentRecord::empty(DOC_TYPE_QUOTATION);

        if let Some(caps) = VENDOR_RE.captures(text) {
            record.vendor = caps["vendor"].trim().to_string();
        }
        if let Some(caps) = CLIENT_RE.captures(text) {
            record.client = caps[1].trim().to_string();
        }
        if let Some(caps) = DATE_RE.captures(text) {
            record.date = normalize_date(&caps[1], &["%d %B %Y", "%d %b %Y"]);
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

        for caps in ITEM_RE.captures_iter(text) {
            record.items.push(LineItem {
                name: caps[2].trim().to_string(),
                qty: caps[1].parse().unwrap_or(0),
                rate: parse_amount(&caps[4]),
                total: parse_amount(&caps[5]),
            });
        }

        record
    }
}
