use std::fmt;

/// Class of personal data a redaction stage detects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PiiClass {
    Email,
    Phone,
    IdCard,
    CreditCard,
    Name,
}

impl PiiClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            PiiClass::Email => "email",
            PiiClass::Phone => "phone",
            PiiClass::IdCard => "id_card",
            PiiClass::CreditCard => "credit_card",
            PiiClass::Name => "name",
        }
    }
}

impl fmt::Display for PiiClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit entry for one substitution.
///
/// Not `Serialize`, and `Debug` omits the original span: the audit trail
/// stays in memory with the caller.
#[derive(Clone, PartialEq, Eq)]
pub struct RedactionEvent {
    pub class: PiiClass,
    pub original: String,
}

impl fmt::Debug for RedactionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedactionEvent")
            .field("class", &self.class)
            .field("original_len", &self.original.chars().count())
            .finish()
    }
}

/// A line-bounded slice of a statement, sized for one model request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Position in the source document; diagnostics only
    pub index: usize,
    pub content: String,
}
