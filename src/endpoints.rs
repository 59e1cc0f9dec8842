//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/accounts/{account_id}', use [format_endpoint].

/// The route to list and create accounts.
pub const ACCOUNTS_API: &str = "/api/accounts";
/// The route to access a single account.
pub const ACCOUNT: &str = "/api/accounts/{account_id}";
/// The route for the sum of all account balances.
pub const TOTAL_BALANCE: &str = "/api/accounts/stats/total-balance";
/// The route for the net worth, assets minus liabilities.
pub const NET_WORTH: &str = "/api/accounts/stats/net-worth";
/// The route to list and create transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to list the transactions of a single account.
pub const ACCOUNT_TRANSACTIONS: &str = "/api/transactions/account/{account_id}";
/// The route listing the categories used by transactions.
pub const TRANSACTION_CATEGORIES: &str = "/api/transactions/categories";
/// The route to store a batch of normalized transactions for an account.
pub const IMPORT_TRANSACTIONS: &str = "/api/transactions/import";
/// The route to search transactions by free text.
pub const SEARCH_TRANSACTIONS: &str = "/api/transactions/search";
/// The route to upload a CSV or JSON file and get back the normalized transactions.
pub const IMPORT_PREVIEW: &str = "/api/import/preview";
/// The route to download transactions as a CSV or JSON file.
pub const EXPORT_TRANSACTIONS: &str = "/api/export/transactions";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/accounts/{account_id}', '{account_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
