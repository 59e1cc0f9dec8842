use std::{fmt, path::Path};

use serde::Serialize;

use crate::Error;

/// The kinds of file that can be imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportFormat {
    /// Comma separated values with a header row.
    Csv,
    /// A JSON array of transaction objects.
    Json,
}

impl ImportFormat {
    /// Pick the format from the extension of `file_name`, ignoring case.
    ///
    /// # Errors
    /// Returns [Error::UnsupportedFormat] if the extension is missing or is not
    /// `csv` or `json`.
    pub fn from_file_name(file_name: &str) -> Result<Self, Error> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|extension| extension.to_str())
            .map(|extension| extension.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            _ => Err(Error::UnsupportedFormat(file_name.to_owned())),
        }
    }
}

impl fmt::Display for ImportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportFormat::Csv => write!(f, "CSV"),
            ImportFormat::Json => write!(f, "JSON"),
        }
    }
}
