//! Turns loosely typed records into [ImportedTransaction]s.

use time::{
    Date, OffsetDateTime, PrimitiveDateTime,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};

use crate::Error;

use super::{ImportedTransaction, fields::TransactionField};

pub(crate) const DEFAULT_PAYEE: &str = "Unknown";
pub(crate) const DEFAULT_CATEGORY: &str = "Uncategorized";
pub(crate) const DEFAULT_DESCRIPTION: &str = "Imported transaction";

const DATE_TIME_FORMATS: [&[BorrowedFormatItem]; 4] = [
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
];

// Bank exports often drop the leading zero, e.g. `1/5/2025`.
const DATE_FORMATS: [&[BorrowedFormatItem]; 6] = [
    format_description!("[year]-[month]-[day]"),
    format_description!("[year]/[month]/[day]"),
    format_description!("[month]/[day]/[year]"),
    format_description!("[year]-[month padding:none]-[day padding:none]"),
    format_description!("[year]/[month padding:none]/[day padding:none]"),
    format_description!("[month padding:none]/[day padding:none]/[year]"),
];

/// The text values read for one record before any defaults are applied.
///
/// Blank values are never stored, so `None` means the value was absent or blank.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct RawRecord {
    pub date: Option<String>,
    pub amount: Option<String>,
    pub payee: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

impl RawRecord {
    /// Set `field` to `value` unless it already has a value or `value` is blank.
    pub(crate) fn set(&mut self, field: TransactionField, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }

        let slot = match field {
            TransactionField::Date => &mut self.date,
            TransactionField::Amount => &mut self.amount,
            TransactionField::Payee => &mut self.payee,
            TransactionField::Category => &mut self.category,
            TransactionField::Description => &mut self.description,
        };

        if slot.is_none() {
            *slot = Some(value.to_owned());
        }
    }

    /// Validate the amount and fill in defaults for everything else.
    ///
    /// `record_number` counts from one and is only used in error messages.
    ///
    /// # Errors
    /// Returns [Error::MissingAmount] if there is no amount, or
    /// [Error::InvalidAmount] if the amount is not a finite number.
    pub(crate) fn normalize(
        self,
        record_number: usize,
        now: OffsetDateTime,
    ) -> Result<ImportedTransaction, Error> {
        let amount_text = self.amount.ok_or(Error::MissingAmount(record_number))?;
        let amount = parse_amount(&amount_text)
            .ok_or_else(|| Error::InvalidAmount(record_number, amount_text.clone()))?;

        let date = match self.date {
            Some(text) => parse_date(&text).unwrap_or_else(|| {
                tracing::warn!(
                    "Could not parse the date \"{text}\" in record {record_number}, using the current time instead."
                );
                now
            }),
            None => now,
        };

        Ok(ImportedTransaction {
            date,
            amount,
            payee: self.payee.unwrap_or_else(|| DEFAULT_PAYEE.to_owned()),
            category: self.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_owned()),
            description: self
                .description
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_owned()),
            is_reconciled: false,
        })
    }
}

fn parse_amount(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
}

/// Parse a date or date-time, values without an offset are taken to be UTC.
pub(crate) fn parse_date(text: &str) -> Option<OffsetDateTime> {
    let text = text.trim();

    if let Ok(date_time) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(date_time.to_offset(time::UtcOffset::UTC));
    }

    if let Some(date_time) = DATE_TIME_FORMATS
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(text, format).ok())
    {
        return Some(date_time.assume_utc());
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| Date::parse(text, format).ok())
        .map(|date| date.midnight().assume_utc())
}
