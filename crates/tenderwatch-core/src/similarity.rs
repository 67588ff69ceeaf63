//! Pairwise similarity metrics between a new document and a stored one.
//!
//! Every function here is total: any input pair produces a defined
//! value, missing data degrades to "no similarity" (or "unboundedly
//! distant" for dates) rather than an error. The [`RiskEngine`]
//! (crate::scoring) turns these raw metrics into weighted flags.

use chrono::NaiveDate;

use crate::LineItem;

/// Case-insensitive sequence similarity over full raw text, in [0, 1].
///
/// Uses the normalized Indel ratio, which counts the insertions and
/// deletions needed to turn one character sequence into the other.
pub fn text_similarity(text_a: &str, text_b: &str) -> f64 {
    let a = text_a.to_lowercase();
    let b = text_b.to_lowercase();
    rapidfuzz::fuzz::ratio(a.chars(), b.chars())
}

/// Character-sequence similarity between two postal codes, in [0, 1].
///
/// Computed on the raw postal strings; full street addresses are not
/// available at parse time, so this deliberately understates its name.
pub fn postal_similarity(code_a: &str, code_b: &str) -> f64 {
    rapidfuzz::fuzz::ratio(code_a.chars(), code_b.chars())
}

/// Jaccard index over the sets of (lower-cased item name, quantity)
/// pairs.
///
/// Both sets empty yields 1.0 (identically itemless); exactly one
/// empty yields 0.0. Symmetric in its arguments.
pub fn items_similarity(items_a: &[LineItem], items_b: &[LineItem]) -> f64 {
    if items_a.is_empty() && items_b.is_empty() {
        return 1.0;
    }
    if items_a.is_empty() || items_b.is_empty() {
        return 0.0;
    }

    let set_a: std::collections::HashSet<(String, i64)> = items_a
        .iter()
        .map(|item| (item.name.to_lowercase(), item.qty))
        .collect();
    let set_b: std::collections::HashSet<(String, i64)> = items_b
        .iter()
        .map(|item| (item.name.to_lowercase(), item.qty))
        .collect();

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    intersection as f64 / union as f64
}

/// Relative difference between two document totals, in [0, 1].
///
/// Both zero yields 0.0; exactly one zero yields 1.0 (a priced
/// document against an unpriced one is maximally divergent).
pub fn price_difference(total_a: f64, total_b: f64) -> f64 {
    if total_a == 0.0 && total_b == 0.0 {
        return 0.0;
    }
    if total_a == 0.0 || total_b == 0.0 {
        return 1.0;
    }
    (total_a - total_b).abs() / total_a.max(total_b)
}

/// Absolute day gap between two canonical `YYYY-MM-DD` dates.
///
/// Returns `None` when either date is missing or unparsable, which the
/// caller must treat as unboundedly distant (the proximity signal never
/// fires).
pub fn date_difference(date_a: Option<&str>, date_b: Option<&str>) -> Option<i64> {
    let a = NaiveDate::parse_from_str(date_a?, "%Y-%m-%d").ok()?;
    let b = NaiveDate::parse_from_str(date_b?, "%Y-%m-%d").ok()?;
    Some((a - b).num_days().abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, qty: i64) -> LineItem {
        LineItem {
            name: name.to_string(),
            qty,
            rate: 0.0,
            total: 0.0,
        }
    }

    #[test]
    fn text_similarity_identical_is_one() {
        let text = "QUOTATION\nACME STEEL PTE LTD\nTOTAL AMT: $10,000.00";
        assert_eq!(text_similarity(text, text), 1.0);
    }

    #[test]
    fn text_similarity_case_insensitive() {
        assert_eq!(text_similarity("Steel Beam", "STEEL BEAM"), 1.0);
    }

    #[test]
    fn text_similarity_disjoint_is_low() {
        assert!(text_similarity("aaaa", "zzzz") < 0.1);
    }

    #[test]
    fn items_similarity_is_symmetric() {
        let a = vec![item("Steel Beam", 5), item("Rebar", 20)];
        let b = vec![item("steel beam", 5), item("Cement Bag", 10)];
        assert_eq!(items_similarity(&a, &b), items_similarity(&b, &a));
    }

    #[test]
    fn items_similarity_identical_sets() {
        let a = vec![item("Steel Beam", 5)];
        let b = vec![item("STEEL BEAM", 5)];
        assert_eq!(items_similarity(&a, &b), 1.0);
    }

    #[test]
    fn items_similarity_quantity_distinguishes() {
        let a = vec![item("Steel Beam", 5)];
        let b = vec![item("Steel Beam", 6)];
        assert_eq!(items_similarity(&a, &b), 0.0);
    }

    #[test]
    fn items_similarity_partial_overlap() {
        let a = vec![item("Steel Beam", 5), item("Rebar", 20)];
        let b = vec![item("Steel Beam", 5), item("Cement Bag", 10)];
        // 1 shared pair out of 3 distinct pairs
        assert!((items_similarity(&a, &b) - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn items_similarity_both_empty_is_one() {
        assert_eq!(items_similarity(&[], &[]), 1.0);
    }

    #[test]
    fn items_similarity_one_empty_is_zero() {
        let a = vec![item("Steel Beam", 5)];
        assert_eq!(items_similarity(&a, &[]), 0.0);
        assert_eq!(items_similarity(&[], &a), 0.0);
    }

    #[test]
    fn price_difference_equal_nonzero_is_zero() {
        assert_eq!(price_difference(10_500.0, 10_500.0), 0.0);
    }

    #[test]
    fn price_difference_both_zero_is_zero() {
        assert_eq!(price_difference(0.0, 0.0), 0.0);
    }

    #[test]
    fn price_difference_one_zero_is_one() {
        assert_eq!(price_difference(0.0, 425.5), 1.0);
        assert_eq!(price_difference(425.5, 0.0), 1.0);
    }

    #[test]
    fn price_difference_relative_to_larger_total() {
        // |10000 - 10500| / 10500 ~= 4.76%
        let diff = price_difference(10_000.0, 10_500.0);
        assert!((diff - 500.0 / 10_500.0).abs() < 1e-9);
    }

    #[test]
    fn date_difference_day_gap() {
        assert_eq!(
            date_difference(Some("2024-03-15"), Some("2024-03-12")),
            Some(3)
        );
        assert_eq!(
            date_difference(Some("2024-03-12"), Some("2024-03-15")),
            Some(3)
        );
    }

    #[test]
    fn date_difference_missing_is_none() {
        assert_eq!(date_difference(None, Some("2024-03-12")), None);
        assert_eq!(date_difference(Some("2024-03-12"), None), None);
    }

    #[test]
    fn date_difference_unparsable_is_none() {
        assert_eq!(
            date_difference(Some("12/March/2024"), Some("2024-03-12")),
            None
        );
    }
}
