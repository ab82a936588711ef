//! The redaction rule table.
//!
//! Stages run in the order of [`RedactionStage::ORDER`]. The national ID,
//! card and phone detectors all match digit runs of overlapping lengths,
//! so the order decides which placeholder a number receives. Changing it
//! changes outputs for existing documents.

use crate::types::PiiClass;

/// One named pass of the redactor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RedactionStage {
    Email,
    NationalId,
    PaymentCard,
    MobilePhone,
    GenericPhone,
    LabeledName,
}

impl RedactionStage {
    pub const ORDER: [RedactionStage; 6] = [
        RedactionStage::Email,
        RedactionStage::NationalId,
        RedactionStage::PaymentCard,
        RedactionStage::MobilePhone,
        RedactionStage::GenericPhone,
        RedactionStage::LabeledName,
    ];

    pub fn class(&self) -> PiiClass {
        match self {
            RedactionStage::Email => PiiClass::Email,
            RedactionStage::NationalId => PiiClass::IdCard,
            RedactionStage::PaymentCard => PiiClass::CreditCard,
            RedactionStage::MobilePhone | RedactionStage::GenericPhone => PiiClass::Phone,
            RedactionStage::LabeledName => PiiClass::Name,
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            RedactionStage::Email => "[EMAIL_REDACTED]",
            RedactionStage::NationalId => "[ID_REDACTED]",
            RedactionStage::PaymentCard => "[CC_REDACTED]",
            RedactionStage::MobilePhone | RedactionStage::GenericPhone => "[PHONE_REDACTED]",
            RedactionStage::LabeledName => "[NAME_REDACTED]",
        }
    }

    pub(crate) fn ordinal(&self) -> usize {
        Self::ORDER
            .iter()
            .position(|s| s == self)
            .unwrap_or(Self::ORDER.len())
    }
}

/// A detection pattern bound to a stage.
///
/// `LabeledName` patterns must expose two capture groups: the label
/// (kept) and the name (replaced).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactionRule {
    pub stage: RedactionStage,
    pub pattern: String,
}

impl RedactionRule {
    pub fn new(stage: RedactionStage, pattern: impl Into<String>) -> Self {
        Self {
            stage,
            pattern: pattern.into(),
        }
    }
}

// Digit and address detectors use ASCII word boundaries: ideographs are
// word characters under Unicode `\b`, which would hide a number printed
// straight after a Chinese label (`卡号6222...`).
const EMAIL: &str = r"(?-u:\b)[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}(?-u:\b)";

// 17 digits plus a final digit or checksum letter.
const NATIONAL_ID: &str = r"(?-u:\b)\d{17}[\dXx](?-u:\b)";

const PAYMENT_CARD: &str = r"(?-u:\b)(?:\d[ -]*?){13,16}(?-u:\b)";

// Mainland mobile: 1[3-9] then nine digits, optionally grouped.
const MOBILE_PHONE: &str = r"(?-u:\b)1[3-9](?:[- ]?\d){9}(?-u:\b)";

// Bounded on both sides so a longer digit run is never split into a
// phone number and a leftover tail.
const GENERIC_PHONE: &str =
    r"(?:\+\d{1,3}[-.]?\(?|\(?(?-u:\b))\d{3}\)?[-.\s]?\d{3,4}[-.\s]?\d{4}(?-u:\b)";

const LABELED_NAME_ZH: &str =
    r"((?:姓名|户名|客户|持卡人|用户|业主|Name|Customer)[:：]?[ \t]*)([\x{4e00}-\x{9fa5}]{2,4})";

const LABELED_NAME_LATIN: &str = r"(\b(?i:account holder|card ?holder|holder|customer|name)[:：]?[ \t]+)([A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+){1,2})(?-u:\b)";

/// The built-in rule table, in stage order.
pub fn default_rules() -> Vec<RedactionRule> {
    vec![
        RedactionRule::new(RedactionStage::Email, EMAIL),
        RedactionRule::new(RedactionStage::NationalId, NATIONAL_ID),
        RedactionRule::new(RedactionStage::PaymentCard, PAYMENT_CARD),
        RedactionRule::new(RedactionStage::MobilePhone, MOBILE_PHONE),
        RedactionRule::new(RedactionStage::GenericPhone, GENERIC_PHONE),
        RedactionRule::new(RedactionStage::LabeledName, LABELED_NAME_ZH),
        RedactionRule::new(RedactionStage::LabeledName, LABELED_NAME_LATIN),
    ]
}
