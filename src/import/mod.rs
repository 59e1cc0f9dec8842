//! Turns uploaded CSV and JSON files into normalized candidate transactions.
//!
//! Parsing produces loosely typed records whose values are matched to
//! transaction fields by their header or key. Normalization then validates the
//! amount and fills in defaults so that every field of an
//! [ImportedTransaction] is set. Nothing here touches the database, the batch
//! is stored through [crate::TransactionStore::import] once the user confirms it.

mod csv;
mod fields;
mod format;
mod json;
mod normalize;
mod preview_endpoint;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::Error;

use self::{csv::parse_csv, json::parse_json};

pub(crate) use self::normalize::{DEFAULT_CATEGORY, DEFAULT_DESCRIPTION, DEFAULT_PAYEE};

pub use format::ImportFormat;
pub use preview_endpoint::{ImportPreview, import_preview_endpoint};

/// How many transactions are shown to the user before they confirm an import.
pub const PREVIEW_LENGTH: usize = 3;

/// A transaction read from an imported file that has not been stored yet.
///
/// Every field is populated after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedTransaction {
    /// When the transaction happened, the time of import if the file had no usable date.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// The amount of money spent (negative) or earned (positive).
    pub amount: f64,
    /// Who was paid, or who paid.
    #[serde(default = "default_payee")]
    pub payee: String,
    /// The spending or income category.
    #[serde(default = "default_category")]
    pub category: String,
    /// A text description of the transaction.
    #[serde(default = "default_description")]
    pub description: String,
    /// Always false for imported transactions.
    #[serde(default)]
    pub is_reconciled: bool,
}

fn default_payee() -> String {
    DEFAULT_PAYEE.to_owned()
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_owned()
}

fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_owned()
}

/// The normalized transactions read from one file.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportBatch {
    /// The format the file was read as.
    pub format: ImportFormat,
    /// Every transaction in the file, in file order.
    pub transactions: Vec<ImportedTransaction>,
}

impl ImportBatch {
    /// The first [PREVIEW_LENGTH] transactions, or fewer if the batch is smaller.
    pub fn preview(&self) -> &[ImportedTransaction] {
        &self.transactions[..self.transactions.len().min(PREVIEW_LENGTH)]
    }
}

/// Parse and normalize the contents of an uploaded file.
///
/// The format is chosen from the extension of `file_name` before `content` is
/// looked at. `now` is used for transactions without a usable date.
///
/// # Errors
/// This function will return a:
/// - [Error::UnsupportedFormat] if the file is not a `.csv` or `.json` file,
/// - [Error::InvalidFormat] if the file cannot be parsed,
/// - [Error::NoRecordsFound] if the file has no transactions,
/// - or [Error::MissingAmount] or [Error::InvalidAmount] if a record does not have a usable amount.
///
/// No transactions are returned if any record fails.
pub fn ingest(file_name: &str, content: &str, now: OffsetDateTime) -> Result<ImportBatch, Error> {
    let format = ImportFormat::from_file_name(file_name)?;

    let records = match format {
        ImportFormat::Csv => parse_csv(content)?,
        ImportFormat::Json => parse_json(content)?,
    };

    let transactions = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| record.normalize(index + 1, now))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        "Read {} transactions from {format} file \"{file_name}\"",
        transactions.len()
    );

    Ok(ImportBatch {
        format,
        transactions,
    })
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::Error;

    use super::{ImportFormat, ImportedTransaction, PREVIEW_LENGTH, ingest};

    #[test]
    fn empty_json_array_has_no_records() {
        let now = datetime!(2025-06-01 0:00 UTC);

        assert_eq!(ingest("export.json", "[]", now), Err(Error::NoRecordsFound));
    }

    #[test]
    fn normalizes_minimal_csv() {
        let now = datetime!(2025-06-01 0:00 UTC);

        let batch = ingest(
            "statement.csv",
            "Date,Amount,Payee\n2025-01-01,-10.50,Coffee Shop",
            now,
        )
        .unwrap();

        assert_eq!(batch.format, ImportFormat::Csv);
        assert_eq!(
            batch.transactions,
            vec![ImportedTransaction {
                date: datetime!(2025-01-01 0:00 UTC),
                amount: -10.50,
                payee: "Coffee Shop".to_owned(),
                category: "Uncategorized".to_owned(),
                description: "Imported transaction".to_owned(),
                is_reconciled: false,
            }]
        );
    }

    #[test]
    fn reads_dates_without_leading_zeros() {
        let now = datetime!(2025-06-01 0:00 UTC);

        let batch = ingest("statement.csv", "Date,Amount\n1/5/2025,-3\n2025-2-7,4", now).unwrap();

        assert_eq!(batch.transactions[0].date, datetime!(2025-01-05 0:00 UTC));
        assert_eq!(batch.transactions[1].date, datetime!(2025-02-07 0:00 UTC));
    }

    #[test]
    fn unsupported_extension_fails_before_parsing() {
        let now = datetime!(2025-06-01 0:00 UTC);

        assert_eq!(
            ingest("statement.pdf", "not even close to a CSV file", now),
            Err(Error::UnsupportedFormat("statement.pdf".to_owned()))
        );
    }

    #[test]
    fn json_output_has_one_transaction_per_element() {
        let now = datetime!(2025-06-01 0:00 UTC);
        let text = r#"[
            {"date": "2025-02-01", "amount": 12},
            {"amount": "-3.5", "payee": "Bakery", "isReconciled": true},
            {"value": 7, "memo": "Refund", "type": "Shopping"},
            {"amount": 0, "description": "   "}
        ]"#;

        let batch = ingest("export.JSON", text, now).unwrap();

        assert_eq!(batch.transactions.len(), 4);
        for transaction in &batch.transactions {
            assert!(!transaction.payee.is_empty());
            assert!(!transaction.category.is_empty());
            assert!(!transaction.description.is_empty());
            assert!(!transaction.is_reconciled);
        }
        assert_eq!(batch.transactions[0].date, datetime!(2025-02-01 0:00 UTC));
        assert_eq!(batch.transactions[1].date, now);
        assert_eq!(batch.transactions[2].category, "Shopping");
        assert_eq!(batch.transactions[3].description, "Imported transaction");
    }

    #[test]
    fn csv_output_has_one_transaction_per_non_blank_line() {
        let now = datetime!(2025-06-01 0:00 UTC);
        let text = "Amount\n1\n\n2\n3\n\n";

        let batch = ingest("statement.csv", text, now).unwrap();

        assert_eq!(batch.transactions.len(), 3);
    }

    #[test]
    fn a_bad_amount_fails_the_whole_file() {
        let now = datetime!(2025-06-01 0:00 UTC);

        assert_eq!(
            ingest("statement.csv", "Amount,Payee\n1,A\nNaN,B\n3,C", now),
            Err(Error::InvalidAmount(2, "NaN".to_owned()))
        );
        assert_eq!(
            ingest("export.json", r#"[{"amount": 1}, {"payee": "B"}]"#, now),
            Err(Error::MissingAmount(2))
        );
    }

    #[test]
    fn preview_is_bounded() {
        let now = datetime!(2025-06-01 0:00 UTC);
        let text = "Amount\n1\n2\n3\n4\n5";

        let batch = ingest("statement.csv", text, now).unwrap();
        let preview = batch.preview();

        assert_eq!(preview.len(), PREVIEW_LENGTH);
        assert_eq!(preview, &batch.transactions[..PREVIEW_LENGTH]);

        let small = ingest("statement.csv", "Amount\n1", now).unwrap();
        assert_eq!(small.preview().len(), 1);
    }

    #[test]
    fn imported_transaction_body_fills_defaults() {
        let transaction: ImportedTransaction =
            serde_json::from_str(r#"{"date": "2025-01-01T00:00:00Z", "amount": -1.0}"#).unwrap();

        assert_eq!(transaction.payee, "Unknown");
        assert_eq!(transaction.category, "Uncategorized");
        assert_eq!(transaction.description, "Imported transaction");
    }
}
