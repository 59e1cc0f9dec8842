//! Filters transaction lists by account, category, date, amount, reconciliation and free text.

use std::str::FromStr;

use serde::Deserialize;
use time::{
    Date, OffsetDateTime, UtcOffset,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};

use crate::{Error, database_id::AccountId, transaction::Transaction};

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// The criteria a transaction must meet to be kept by [TransactionFilter::apply].
///
/// Every criterion is optional and unset criteria match every transaction.
/// Set criteria are combined with a logical AND. Date and amount bounds are
/// inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Only keep transactions in this account.
    pub account_id: Option<AccountId>,
    /// Only keep transactions with exactly this category.
    pub category: Option<String>,
    /// Only keep transactions on or after this instant.
    pub start_date: Option<OffsetDateTime>,
    /// Only keep transactions on or before this instant.
    pub end_date: Option<OffsetDateTime>,
    /// Only keep transactions with an amount of at least this much.
    pub min_amount: Option<f64>,
    /// Only keep transactions with an amount of at most this much.
    pub max_amount: Option<f64>,
    /// Only keep transactions with this reconciliation state.
    pub is_reconciled: Option<bool>,
    /// Only keep transactions whose payee, description or category contains
    /// this text, ignoring case.
    pub search: Option<String>,
}

impl TransactionFilter {
    /// Whether `transaction` meets every set criterion.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.search
            .as_ref()
            .is_none_or(|search| matches_search(transaction, search))
            && self
                .account_id
                .is_none_or(|account_id| transaction.account_id == account_id)
            && self
                .category
                .as_ref()
                .is_none_or(|category| &transaction.category == category)
            && self.start_date.is_none_or(|start| transaction.date >= start)
            && self.end_date.is_none_or(|end| transaction.date <= end)
            && self.min_amount.is_none_or(|min| transaction.amount >= min)
            && self.max_amount.is_none_or(|max| transaction.amount <= max)
            && self
                .is_reconciled
                .is_none_or(|is_reconciled| transaction.is_reconciled == is_reconciled)
    }

    /// The transactions that meet every set criterion, in their original order.
    pub fn apply(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        transactions
            .iter()
            .filter(|transaction| self.matches(transaction))
            .cloned()
            .collect()
    }

    /// The filter as query string pairs, with an empty value for unset criteria.
    ///
    /// Dates are written in RFC 3339 format so they parse back to the same instant.
    ///
    /// # Errors
    /// Returns [Error::InvalidFilter] if a date cannot be written as RFC 3339.
    pub fn to_query_pairs(&self) -> Result<Vec<(&'static str, String)>, Error> {
        fn text<T: ToString>(value: Option<T>) -> String {
            value.map(|value| value.to_string()).unwrap_or_default()
        }

        let format_date = |date: Option<OffsetDateTime>| -> Result<String, Error> {
            date.map(|date| {
                date.to_offset(UtcOffset::UTC)
                    .format(&Rfc3339)
                    .map_err(|error| Error::InvalidFilter(error.to_string()))
            })
            .transpose()
            .map(Option::unwrap_or_default)
        };

        Ok(vec![
            ("account_id", text(self.account_id)),
            ("category", text(self.category.as_deref())),
            ("start_date", format_date(self.start_date)?),
            ("end_date", format_date(self.end_date)?),
            ("min_amount", text(self.min_amount)),
            ("max_amount", text(self.max_amount)),
            ("is_reconciled", text(self.is_reconciled)),
            ("search", text(self.search.as_deref())),
        ])
    }
}

/// Whether the payee, description or category of `transaction` contains
/// `term`, ignoring case. A blank term matches everything.
pub(crate) fn matches_search(transaction: &Transaction, term: &str) -> bool {
    let term = term.trim().to_lowercase();

    term.is_empty()
        || [
            &transaction.payee,
            &transaction.description,
            &transaction.category,
        ]
        .iter()
        .any(|text| text.to_lowercase().contains(&term))
}

/// The filter as it arrives in a query string.
///
/// Every value is optional text and an empty value means the criterion is unset.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransactionFilterQuery {
    /// See [TransactionFilter::account_id].
    #[serde(default)]
    pub account_id: Option<String>,
    /// See [TransactionFilter::category].
    #[serde(default)]
    pub category: Option<String>,
    /// An RFC 3339 date-time, or a `YYYY-MM-DD` date for the start of that day in UTC.
    #[serde(default)]
    pub start_date: Option<String>,
    /// An RFC 3339 date-time, or a `YYYY-MM-DD` date for the end of that day in UTC.
    #[serde(default)]
    pub end_date: Option<String>,
    /// See [TransactionFilter::min_amount].
    #[serde(default)]
    pub min_amount: Option<String>,
    /// See [TransactionFilter::max_amount].
    #[serde(default)]
    pub max_amount: Option<String>,
    /// `true` or `false`.
    #[serde(default)]
    pub is_reconciled: Option<String>,
    /// See [TransactionFilter::search].
    #[serde(default)]
    pub search: Option<String>,
}

/// Which end of a day a bare date stands for.
#[derive(Debug, Clone, Copy)]
enum DayBound {
    Start,
    End,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_number<T: FromStr>(name: &str, value: Option<String>) -> Result<Option<T>, Error> {
    non_empty(value)
        .map(|value| {
            value
                .parse()
                .map_err(|_| Error::InvalidFilter(format!("{name} \"{value}\" is not a number")))
        })
        .transpose()
}

fn parse_bound(
    name: &str,
    value: Option<String>,
    bound: DayBound,
) -> Result<Option<OffsetDateTime>, Error> {
    let Some(value) = non_empty(value) else {
        return Ok(None);
    };

    if let Ok(date_time) = OffsetDateTime::parse(&value, &Rfc3339) {
        return Ok(Some(date_time));
    }

    let date = Date::parse(&value, DATE_FORMAT).map_err(|_| {
        Error::InvalidFilter(format!(
            "{name} \"{value}\" is not a date in the format YYYY-MM-DD"
        ))
    })?;

    let date_time = match bound {
        DayBound::Start => date.midnight(),
        DayBound::End => date
            .with_hms_nano(23, 59, 59, 999_999_999)
            .map_err(|error| Error::InvalidFilter(error.to_string()))?,
    };

    Ok(Some(date_time.assume_utc()))
}

fn parse_bool(name: &str, value: Option<String>) -> Result<Option<bool>, Error> {
    non_empty(value)
        .map(|value| match value.to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(Error::InvalidFilter(format!(
                "{name} \"{value}\" must be true or false"
            ))),
        })
        .transpose()
}

impl TryFrom<TransactionFilterQuery> for TransactionFilter {
    type Error = Error;

    fn try_from(query: TransactionFilterQuery) -> Result<Self, Self::Error> {
        let min_amount: Option<f64> = parse_number("min_amount", query.min_amount)?;
        let max_amount: Option<f64> = parse_number("max_amount", query.max_amount)?;

        if min_amount.is_some_and(f64::is_nan) || max_amount.is_some_and(f64::is_nan) {
            return Err(Error::InvalidFilter("amounts cannot be NaN".to_owned()));
        }

        Ok(Self {
            account_id: parse_number("account_id", query.account_id)?,
            category: non_empty(query.category),
            start_date: parse_bound("start_date", query.start_date, DayBound::Start)?,
            end_date: parse_bound("end_date", query.end_date, DayBound::End)?,
            min_amount,
            max_amount,
            is_reconciled: parse_bool("is_reconciled", query.is_reconciled)?,
            search: non_empty(query.search),
        })
    }
}

#[cfg(test)]
mod filter_tests {
    use time::{OffsetDateTime, macros::datetime};

    use crate::transaction::Transaction;

    use super::TransactionFilter;

    fn transaction(id: i64, account_id: i64, amount: f64, date: OffsetDateTime) -> Transaction {
        Transaction::build(account_id, amount, date)
            .payee("Countdown")
            .category("Groceries")
            .description("Weekly shop")
            .finalise(id, None, date)
    }

    fn sample() -> Vec<Transaction> {
        vec![
            transaction(1, 1, -5.0, datetime!(2025-01-01 0:00 UTC)),
            transaction(2, 1, 0.0, datetime!(2025-01-02 12:00 UTC)),
            transaction(3, 2, 5.0, datetime!(2025-01-02 23:59:59 UTC)),
            transaction(4, 2, 12.5, datetime!(2025-01-03 0:00 UTC)),
        ]
    }

    fn ids(transactions: &[Transaction]) -> Vec<i64> {
        transactions.iter().map(|transaction| transaction.id).collect()
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let transactions = sample();

        assert_eq!(TransactionFilter::default().apply(&transactions), transactions);
    }

    #[test]
    fn min_amount_is_inclusive() {
        let transactions: Vec<Transaction> = [-5.0, 0.0, 5.0]
            .into_iter()
            .enumerate()
            .map(|(i, amount)| transaction(i as i64, 1, amount, datetime!(2025-01-01 0:00 UTC)))
            .collect();
        let filter = TransactionFilter {
            min_amount: Some(0.0),
            ..Default::default()
        };

        let amounts: Vec<f64> = filter
            .apply(&transactions)
            .into_iter()
            .map(|transaction| transaction.amount)
            .collect();

        assert_eq!(amounts, vec![0.0, 5.0]);
    }

    #[test]
    fn equal_amount_bounds_keep_exact_matches() {
        let filter = TransactionFilter {
            min_amount: Some(5.0),
            max_amount: Some(5.0),
            ..Default::default()
        };

        assert_eq!(ids(&filter.apply(&sample())), vec![3]);
    }

    #[test]
    fn equal_day_bounds_keep_that_day() {
        let filter = TransactionFilter {
            start_date: Some(datetime!(2025-01-02 0:00 UTC)),
            end_date: Some(datetime!(2025-01-02 23:59:59.999999999 UTC)),
            ..Default::default()
        };

        assert_eq!(ids(&filter.apply(&sample())), vec![2, 3]);
    }

    #[test]
    fn criteria_are_combined() {
        let filter = TransactionFilter {
            account_id: Some(2),
            min_amount: Some(10.0),
            category: Some("Groceries".to_owned()),
            is_reconciled: Some(false),
            ..Default::default()
        };

        assert_eq!(ids(&filter.apply(&sample())), vec![4]);
    }

    #[test]
    fn category_match_is_exact() {
        let filter = TransactionFilter {
            category: Some("groceries".to_owned()),
            ..Default::default()
        };

        assert!(filter.apply(&sample()).is_empty());
    }

    #[test]
    fn search_ignores_case() {
        let mut transactions = sample();
        transactions[1].payee = "Coffee Shop".to_owned();
        transactions[2].description = "Morning COFFEE".to_owned();
        let filter = TransactionFilter {
            search: Some("coffee".to_owned()),
            ..Default::default()
        };

        assert_eq!(ids(&filter.apply(&transactions)), vec![2, 3]);
    }

    #[test]
    fn filtering_twice_changes_nothing() {
        let filter = TransactionFilter {
            account_id: Some(1),
            max_amount: Some(0.0),
            ..Default::default()
        };

        let once = filter.apply(&sample());
        let twice = filter.apply(&once);

        assert_eq!(once, twice);
        assert_eq!(ids(&once), vec![1, 2]);
    }

    #[test]
    fn keeps_input_order() {
        let mut transactions = sample();
        transactions.reverse();
        let filter = TransactionFilter {
            min_amount: Some(0.0),
            ..Default::default()
        };

        assert_eq!(ids(&filter.apply(&transactions)), vec![4, 3, 2]);
    }
}
