//! Exports filtered transactions as downloadable CSV or JSON files.

use std::{fmt, str::FromStr};

use axum::{
    extract::{Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use time::{
    OffsetDateTime,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};

use crate::{
    Error, endpoints,
    filter::{TransactionFilter, TransactionFilterQuery},
    transaction::{Transaction, TransactionState, TransactionStore},
};

const FILE_DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year][month][day]");

const CSV_HEADER: [&str; 9] = [
    "id",
    "account_id",
    "account_name",
    "date",
    "amount",
    "payee",
    "category",
    "description",
    "is_reconciled",
];

/// The file formats transactions can be exported as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Comma separated values with a header row.
    #[default]
    Csv,
    /// A pretty printed JSON array.
    Json,
}

impl ExportFormat {
    /// The file extension for the format, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(Error::UnsupportedFormat(text.to_owned())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Build the URL for downloading the transactions that match `filter`.
///
/// `base` is the scheme and host of the server, e.g. "http://localhost:3000".
/// Every filter key is included in the query string, unset criteria have an
/// empty value.
///
/// # Errors
/// Returns [Error::InvalidFilter] if a filter date cannot be written, or
/// [Error::ExportError] if the query string cannot be encoded.
pub fn export_url(
    base: &str,
    format: ExportFormat,
    filter: &TransactionFilter,
) -> Result<String, Error> {
    let mut pairs = vec![("format", format.to_string())];
    pairs.extend(filter.to_query_pairs()?);

    let query = serde_urlencoded::to_string(&pairs)
        .map_err(|error| Error::ExportError(error.to_string()))?;

    Ok(format!(
        "{}{}?{query}",
        base.trim_end_matches('/'),
        endpoints::EXPORT_TRANSACTIONS
    ))
}

/// The export options in the query string, the filter is read separately.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportQuery {
    /// `csv` or `json`, defaults to `csv`.
    #[serde(default)]
    pub format: Option<String>,
}

/// Write `transactions` as CSV, one row per transaction after the header row.
///
/// Dates are written in RFC 3339 format so the file can be imported again.
fn write_csv(transactions: &[Transaction]) -> Result<String, Error> {
    let to_export_error = |error: csv::Error| Error::ExportError(error.to_string());
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(CSV_HEADER).map_err(to_export_error)?;

    for transaction in transactions {
        let date = transaction
            .date
            .format(&Rfc3339)
            .map_err(|error| Error::ExportError(error.to_string()))?;

        writer
            .write_record([
                transaction.id.to_string(),
                transaction.account_id.to_string(),
                transaction.account_name.clone().unwrap_or_default(),
                date,
                transaction.amount.to_string(),
                transaction.payee.clone(),
                transaction.category.clone(),
                transaction.description.clone(),
                transaction.is_reconciled.to_string(),
            ])
            .map_err(to_export_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| Error::ExportError(error.to_string()))?;

    String::from_utf8(bytes).map_err(|error| Error::ExportError(error.to_string()))
}

fn write_json(transactions: &[Transaction]) -> Result<String, Error> {
    serde_json::to_string_pretty(transactions)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))
}

/// A route handler that responds with the filtered transactions as a file download.
///
/// The file is named after today's date, e.g. `transactions_20250115.csv`.
pub async fn export_transactions_endpoint<T>(
    State(state): State<TransactionState<T>>,
    Query(export_query): Query<ExportQuery>,
    Query(filter_query): Query<TransactionFilterQuery>,
) -> Result<Response, Error>
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    let format = match export_query.format.as_deref().map(str::trim) {
        None | Some("") => ExportFormat::default(),
        Some(text) => text.parse()?,
    };
    let filter = TransactionFilter::try_from(filter_query)?;

    let transactions = filter.apply(&state.transaction_store.list()?);

    let body = match format {
        ExportFormat::Csv => write_csv(&transactions)?,
        ExportFormat::Json => write_json(&transactions)?,
    };

    let today = OffsetDateTime::now_utc()
        .format(FILE_DATE_FORMAT)
        .map_err(|error| Error::ExportError(error.to_string()))?;
    let file_name = format!("transactions_{today}.{}", format.extension());

    tracing::info!(
        "Exporting {} transactions as {file_name}",
        transactions.len()
    );

    Ok((
        [
            (CONTENT_TYPE, format.content_type().to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename={file_name}"),
            ),
        ],
        body,
    )
        .into_response())
}
