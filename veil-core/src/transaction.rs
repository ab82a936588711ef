//! Transaction types produced by extraction

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::category::{Category, Locale};

/// One transaction recovered from a statement chunk. Carries no identity;
/// storage assigns that.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionCandidate {
    /// Transaction date; the year is inferred when the statement omits it
    pub date: NaiveDate,
    /// Merchant name or line description
    pub description: String,
    /// Positive = expense, negative = refund
    pub amount: Decimal,
    pub category: Category,
    /// Last four digits of the card, when the statement shows them
    pub card_last_four: Option<String>,
}

/// A candidate stamped with where it came from, in the shape handed to
/// persistence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRecord {
    /// Originating document, e.g. the statement filename
    pub source: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    /// Localized category label
    pub category: String,
    pub card_last_four: Option<String>,
}

impl TransactionCandidate {
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        amount: Decimal,
        category: Category,
    ) -> Self {
        Self {
            date,
            description: description.into(),
            amount,
            category,
            card_last_four: None,
        }
    }

    pub fn with_card(mut self, last_four: impl Into<String>) -> Self {
        self.card_last_four = Some(last_four.into());
        self
    }

    /// Returns true for spend (positive amount)
    pub fn is_expense(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Returns true for refunds and credits (negative amount)
    pub fn is_refund(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    pub fn into_record(self, source: impl Into<String>, locale: Locale) -> TransactionRecord {
        TransactionRecord {
            source: source.into(),
            date: self.date,
            description: self.description,
            amount: self.amount,
            category: self.category.label(locale).to_string(),
            card_last_four: self.card_last_four,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TransactionCandidate {
        TransactionCandidate::new(
            NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            "UBER TRIP",
            Decimal::new(2550, 2),
            Category::Transportation,
        )
    }

    #[test]
    fn test_sign_convention() {
        let spend = sample();
        assert!(spend.is_expense());
        assert!(!spend.is_refund());

        let mut refund = sample();
        refund.amount = Decimal::new(-999, 2);
        assert!(refund.is_refund());
        assert!(!refund.is_expense());
    }

    #[test]
    fn test_into_record_stamps_source_and_label() {
        let rec = sample().with_card("8888").into_record("statement_jan.pdf", Locale::Zh);
        assert_eq!(rec.source, "statement_jan.pdf");
        assert_eq!(rec.category, "交通");
        assert_eq!(rec.card_last_four.as_deref(), Some("8888"));
        assert_eq!(rec.amount, Decimal::new(2550, 2));
    }

    #[test]
    fn test_candidate_serializes_iso_date() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["date"], "2025-10-01");
        assert_eq!(json["category"], "transportation");
    }
}
