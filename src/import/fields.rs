/// The transaction fields that can be read from an imported file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransactionField {
    Date,
    Amount,
    Payee,
    Category,
    Description,
}

impl TransactionField {
    /// Match a CSV header or JSON key against the names banks commonly use.
    ///
    /// Matching ignores case and surrounding whitespace.
    pub(crate) fn from_header(header: &str) -> Option<Self> {
        match header.trim().to_lowercase().as_str() {
            "date" | "transaction date" | "posted date" | "posting date" => Some(Self::Date),
            "amount" | "value" | "transaction amount" => Some(Self::Amount),
            "payee" | "merchant" | "vendor" | "name" => Some(Self::Payee),
            "category" | "type" => Some(Self::Category),
            "description" | "memo" | "notes" | "details" => Some(Self::Description),
            _ => None,
        }
    }
}
