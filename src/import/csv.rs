//! Reads candidate transactions from CSV text with a header row.

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::Error;

use super::{fields::TransactionField, normalize::RawRecord};

/// Map each header cell to the field it holds.
///
/// Unrecognised headers map to `None`, as do repeats of a field that an
/// earlier column already holds.
fn map_headers(headers: &StringRecord) -> Vec<Option<TransactionField>> {
    let mut seen = Vec::new();

    headers
        .iter()
        .map(|header| {
            let field = TransactionField::from_header(header)?;

            if seen.contains(&field) {
                tracing::debug!("Ignoring duplicate column \"{header}\" for {field:?}");
                None
            } else {
                seen.push(field);
                Some(field)
            }
        })
        .collect()
}

/// Parse the rows of `text` into raw records.
///
/// Blank lines are skipped. Rows may be shorter than the header, the missing
/// cells count as absent.
///
/// # Errors
/// Returns [Error::InvalidFormat] if the CSV is malformed or
/// [Error::NoRecordsFound] if there are no data rows.
pub(crate) fn parse_csv(text: &str) -> Result<Vec<RawRecord>, Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let columns = map_headers(
        reader
            .headers()
            .map_err(|error| Error::InvalidFormat(error.to_string()))?,
    );

    let mut records = Vec::new();

    for row in reader.records() {
        let row = row.map_err(|error| Error::InvalidFormat(error.to_string()))?;

        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let mut record = RawRecord::default();

        for (field, cell) in columns.iter().zip(row.iter()) {
            if let Some(field) = field {
                record.set(*field, cell);
            }
        }

        records.push(record);
    }

    if records.is_empty() {
        return Err(Error::NoRecordsFound);
    }

    Ok(records)
}
