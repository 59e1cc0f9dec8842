use axum::{
    Json,
    extract::{Multipart, multipart::Field},
};
use serde::Serialize;
use time::OffsetDateTime;

use crate::Error;

use super::{ImportFormat, ImportedTransaction, ingest};

/// The response to a file upload, shown to the user before they confirm the import.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportPreview {
    /// The name of the uploaded file.
    pub file_name: String,
    /// The format the file was read as.
    pub format: ImportFormat,
    /// The number of transactions in the file.
    pub total: usize,
    /// The first few transactions.
    pub preview: Vec<ImportedTransaction>,
    /// Every transaction in the file, sent back when the user confirms the import.
    pub transactions: Vec<ImportedTransaction>,
}

/// Route handler that reads an uploaded CSV or JSON file and responds with the
/// normalized transactions.
///
/// Only the first field with a file name is read. Nothing is stored.
pub async fn import_preview_endpoint(
    mut multipart: Multipart,
) -> Result<Json<ImportPreview>, Error> {
    while let Some(field) = multipart.next_field().await.map_err(|error| {
        tracing::error!("Could not read multipart form: {error}");
        Error::ReadFailure(error.body_text())
    })? {
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            tracing::debug!("Skipping multipart field {:?} without a file name", field.name());
            continue;
        };

        // Check the extension before reading the body.
        ImportFormat::from_file_name(&file_name)?;
        let content = read_field(field).await?;
        tracing::debug!("Received file '{}' that is {} bytes", file_name, content.len());

        let batch = ingest(&file_name, &content, OffsetDateTime::now_utc())?;

        return Ok(Json(ImportPreview {
            file_name,
            format: batch.format,
            total: batch.transactions.len(),
            preview: batch.preview().to_vec(),
            transactions: batch.transactions,
        }));
    }

    Err(Error::ReadFailure(
        "the request did not contain a file".to_owned(),
    ))
}

async fn read_field(field: Field<'_>) -> Result<String, Error> {
    let bytes = field.bytes().await.map_err(|error| {
        tracing::error!("Could not read data from multipart form field: {error}");
        Error::ReadFailure(error.body_text())
    })?;

    String::from_utf8(bytes.to_vec()).map_err(|error| {
        tracing::error!("Uploaded file is not valid UTF-8: {error}");
        Error::ReadFailure("the file is not a UTF-8 text file".to_owned())
    })
}
