//! Application router configuration.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::{
    AppState, Error,
    account::{
        create_account_endpoint, delete_account_endpoint, get_account_endpoint,
        get_net_worth_endpoint, get_total_balance_endpoint, list_accounts_endpoint,
        update_account_endpoint,
    },
    endpoints,
    export::export_transactions_endpoint,
    import::import_preview_endpoint,
    transaction::{
        TransactionStore, create_transaction_endpoint, delete_transaction_endpoint,
        edit_transaction_endpoint, get_categories_endpoint, get_transaction_endpoint,
        import_transactions_endpoint, list_account_transactions_endpoint,
        list_transactions_endpoint, search_transactions_endpoint,
    },
};

/// The largest request body accepted, in bytes.
pub(crate) const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Return a router with all the app's routes.
pub fn build_router<T>(state: AppState<T>) -> Router
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    Router::new()
        .route(
            endpoints::ACCOUNTS_API,
            get(list_accounts_endpoint).post(create_account_endpoint),
        )
        .route(
            endpoints::ACCOUNT,
            get(get_account_endpoint)
                .put(update_account_endpoint)
                .delete(delete_account_endpoint),
        )
        .route(endpoints::TOTAL_BALANCE, get(get_total_balance_endpoint))
        .route(endpoints::NET_WORTH, get(get_net_worth_endpoint))
        .route(
            endpoints::TRANSACTIONS_API,
            get(list_transactions_endpoint::<T>).post(create_transaction_endpoint::<T>),
        )
        .route(
            endpoints::ACCOUNT_TRANSACTIONS,
            get(list_account_transactions_endpoint::<T>),
        )
        .route(
            endpoints::TRANSACTION_CATEGORIES,
            get(get_categories_endpoint::<T>),
        )
        .route(
            endpoints::IMPORT_TRANSACTIONS,
            post(import_transactions_endpoint::<T>),
        )
        .route(
            endpoints::SEARCH_TRANSACTIONS,
            post(search_transactions_endpoint::<T>),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint::<T>)
                .put(edit_transaction_endpoint::<T>)
                .delete(delete_transaction_endpoint::<T>),
        )
        .route(endpoints::IMPORT_PREVIEW, post(import_preview_endpoint))
        .route(
            endpoints::EXPORT_TRANSACTIONS,
            get(export_transactions_endpoint::<T>),
        )
        .fallback(get_404_not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(state)
}

async fn get_404_not_found() -> Error {
    Error::NotFound
}

#[cfg(test)]
mod sqlite_api_tests {
    use std::sync::{Arc, Mutex};

    use axum::http::StatusCode;
    use axum_test::{
        TestServer,
        multipart::{MultipartForm, Part},
    };
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{
        AccountId, AppState, SQLiteTransactionStore, Transaction,
        endpoints::{self, format_endpoint},
    };

    use super::build_router;

    fn get_test_server() -> TestServer {
        let connection = Arc::new(Mutex::new(
            Connection::open_in_memory().expect("Could not open database in memory."),
        ));
        let state = AppState::new(connection.clone(), SQLiteTransactionStore::new(connection))
            .expect("Could not create app state.");

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    async fn create_test_account(server: &TestServer) -> AccountId {
        let response = server
            .post(endpoints::ACCOUNTS_API)
            .json(&json!({
                "name": "Everyday",
                "type": "checking",
                "institution": "ACME Bank"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let account: Value = response.json();
        assert_eq!(account["currency"], "USD");
        assert_eq!(account["balance"], 0.0);

        account["id"]
            .as_i64()
            .expect("account ID should be an integer")
    }

    async fn get_balance(server: &TestServer, account_id: AccountId) -> f64 {
        let account: Value = server
            .get(&format_endpoint(endpoints::ACCOUNT, account_id))
            .await
            .json();

        account["balance"]
            .as_f64()
            .expect("balance should be a number")
    }

    #[tokio::test]
    async fn upload_preview_then_import() {
        let server = get_test_server();
        let account_id = create_test_account(&server).await;
        let csv = "Date,Amount,Payee,Category\n\
            2025-01-01,-10.50,Coffee Shop,Dining\n\
            2025-01-02,2500,Employer,Income\n\
            2025-01-03,-80,Power Co,Utilities\n\
            2025-01-04,-45.5,Countdown,Groceries\n";
        let form =
            MultipartForm::new().add_part("file", Part::text(csv).file_name("statement.csv"));

        let response = server.post(endpoints::IMPORT_PREVIEW).multipart(form).await;

        response.assert_status_ok();
        let preview: Value = response.json();
        assert_eq!(preview["format"], "csv");
        assert_eq!(preview["total"], 4);
        assert_eq!(preview["preview"].as_array().map(Vec::len), Some(3));

        let response = server
            .post(endpoints::IMPORT_TRANSACTIONS)
            .json(&json!({
                "account_id": account_id,
                "transactions": preview["transactions"],
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let stored: Vec<Transaction> = response.json();
        assert_eq!(stored.len(), 4);
        assert_eq!(stored[0].account_name.as_deref(), Some("Everyday"));
        assert_eq!(get_balance(&server, account_id).await, 2364.0);
    }

    #[tokio::test]
    async fn unsupported_upload_is_rejected() {
        let server = get_test_server();
        let form = MultipartForm::new()
            .add_part("file", Part::text("%PDF-1.7").file_name("statement.pdf"));

        let response = server.post(endpoints::IMPORT_PREVIEW).multipart(form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "unsupported_format");
    }

    #[tokio::test]
    async fn upload_without_file_is_read_failure() {
        let server = get_test_server();
        let form = MultipartForm::new().add_text("account_id", "1");

        let response = server.post(endpoints::IMPORT_PREVIEW).multipart(form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "read_failure");
    }

    #[tokio::test]
    async fn update_account_and_totals() {
        let server = get_test_server();
        let checking = create_test_account(&server).await;
        let card = create_test_account(&server).await;
        server
            .post(endpoints::IMPORT_TRANSACTIONS)
            .json(&json!({
                "account_id": checking,
                "transactions": [{"date": "2025-01-01T00:00:00Z", "amount": 1000.0}],
            }))
            .await
            .assert_status(StatusCode::CREATED);
        server
            .post(endpoints::IMPORT_TRANSACTIONS)
            .json(&json!({
                "account_id": card,
                "transactions": [{"date": "2025-01-02T00:00:00Z", "amount": -250.0}],
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .put(&format_endpoint(endpoints::ACCOUNT, card))
            .json(&json!({"name": "Rewards Card", "type": "credit"}))
            .await;
        response.assert_status_ok();
        let account: Value = response.json();
        assert_eq!(account["name"], "Rewards Card");
        assert_eq!(account["type"], "credit");
        assert_eq!(account["balance"], -250.0);

        let total: f64 = server.get(endpoints::TOTAL_BALANCE).await.json();
        let net_worth: f64 = server.get(endpoints::NET_WORTH).await.json();
        assert_eq!(total, 750.0);
        assert_eq!(net_worth, 750.0);

        let transactions: Vec<Transaction> = server
            .get(&format_endpoint(endpoints::ACCOUNT_TRANSACTIONS, card))
            .await
            .json();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].account_name.as_deref(), Some("Rewards Card"));
    }

    #[tokio::test]
    async fn update_missing_account_is_not_found() {
        let server = get_test_server();

        let response = server
            .put(&format_endpoint(endpoints::ACCOUNT, 42))
            .json(&json!({"name": "Ghost"}))
            .await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn empty_upload_is_a_warning() {
        let server = get_test_server();
        let form = MultipartForm::new().add_part("file", Part::text("[]").file_name("export.json"));

        let response = server.post(endpoints::IMPORT_PREVIEW).multipart(form).await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["error"], "no_records_found");
    }

    #[tokio::test]
    async fn import_into_missing_account_fails() {
        let server = get_test_server();

        let response = server
            .post(endpoints::IMPORT_TRANSACTIONS)
            .json(&json!({
                "account_id": 99,
                "transactions": [{"date": "2025-01-01T00:00:00Z", "amount": -1.0}],
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "invalid_account");
    }

    #[tokio::test]
    async fn transaction_crud() {
        let server = get_test_server();
        let account_id = create_test_account(&server).await;

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .json(&json!({
                "account_id": account_id,
                "date": "2025-04-15T00:00:00Z",
                "amount": -45.67,
                "payee": "Grocery Store",
                "category": "Groceries",
                "description": null
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let created: Transaction = response.json();
        assert_eq!(created.description, "Imported transaction");
        let path = format_endpoint(endpoints::TRANSACTION, created.id);

        let response = server
            .put(&path)
            .json(&json!({"amount": -50.0, "is_reconciled": true}))
            .await;
        response.assert_status_ok();
        let updated: Transaction = response.json();
        assert_eq!(updated.amount, -50.0);
        assert!(updated.is_reconciled);
        assert_eq!(updated.payee, "Grocery Store");
        assert_eq!(get_balance(&server, account_id).await, -50.0);

        server.delete(&path).await.assert_status(StatusCode::NO_CONTENT);
        server.get(&path).await.assert_status_not_found();
        server.delete(&path).await.assert_status_not_found();
        assert_eq!(get_balance(&server, account_id).await, 0.0);
    }

    #[tokio::test]
    async fn deleting_account_removes_its_transactions() {
        let server = get_test_server();
        let account_id = create_test_account(&server).await;
        server
            .post(endpoints::TRANSACTIONS_API)
            .json(&json!({
                "account_id": account_id,
                "date": "2025-04-15T00:00:00Z",
                "amount": -1.0,
                "payee": "Bakery",
                "category": "Food"
            }))
            .await
            .assert_status(StatusCode::CREATED);

        server
            .delete(&format_endpoint(endpoints::ACCOUNT, account_id))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let transactions: Vec<Transaction> = server.get(endpoints::TRANSACTIONS_API).await.json();
        assert!(transactions.is_empty());
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() {
        let server = get_test_server();

        let response = server.get("/api/budgets").await;

        response.assert_status_not_found();
        let body: Value = response.json();
        assert_eq!(body["error"], "not_found");
    }
}
