//! Reads candidate transactions from a JSON array.

use serde_json::Value;

use crate::Error;

use super::{fields::TransactionField, normalize::RawRecord};

/// The text form of a JSON value, `None` for null, arrays and objects.
fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(boolean) => Some(boolean.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn read_record(element: &Value) -> RawRecord {
    let mut record = RawRecord::default();

    if let Value::Object(object) = element {
        for (key, value) in object {
            let Some(field) = TransactionField::from_header(key) else {
                continue;
            };

            if let Some(text) = value_as_text(value) {
                record.set(field, &text);
            }
        }
    }

    record
}

/// Parse `text` as a JSON array of transaction-like objects.
///
/// Keys are matched with the same names as CSV headers. Unknown keys are
/// ignored and elements that are not objects produce empty records.
///
/// # Errors
/// Returns [Error::InvalidFormat] if `text` is not valid JSON or is not an
/// array, or [Error::NoRecordsFound] if the array is empty.
pub(crate) fn parse_json(text: &str) -> Result<Vec<RawRecord>, Error> {
    let document: Value =
        serde_json::from_str(text).map_err(|error| Error::InvalidFormat(error.to_string()))?;

    let Value::Array(elements) = document else {
        return Err(Error::InvalidFormat(
            "must contain an array of transactions".to_owned(),
        ));
    };

    if elements.is_empty() {
        return Err(Error::NoRecordsFound);
    }

    Ok(elements.iter().map(read_record).collect())
}
