use std::error::Error;
use std::path::Path;
use std::process::exit;
use std::sync::{Arc, Mutex};

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime, Time};

use wealthtrackr::{
    NewAccount, SQLiteTransactionStore, Transaction, TransactionStore, create_account,
    initialize_db,
};

/// A utility for creating a test database for the REST API server of WealthTrackr.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test accounts...");

    let checking = create_account(
        NewAccount::new("Everyday Checking", "checking", "ACME Bank"),
        &conn,
    )?;
    let savings = create_account(
        NewAccount::new("Rainy Day Savings", "savings", "ACME Bank"),
        &conn,
    )?;
    let credit_card = create_account(
        NewAccount::new("Rewards Card", "credit", "Big Card Co"),
        &conn,
    )?;

    println!("Creating test transactions...");

    let today = OffsetDateTime::now_utc().replace_time(Time::MIDNIGHT);
    let days_ago = |days: i64| today - Duration::days(days);

    let store = SQLiteTransactionStore::new(Arc::new(Mutex::new(conn)));
    let transactions = store.import(vec![
        Transaction::build(checking.id, 3200.0, days_ago(28))
            .payee("Employer")
            .category("Income")
            .description("Salary")
            .is_reconciled(true),
        Transaction::build(checking.id, -1450.0, days_ago(27))
            .payee("Landlord")
            .category("Rent")
            .description("Monthly rent")
            .is_reconciled(true),
        Transaction::build(checking.id, -86.42, days_ago(20))
            .payee("Power Co")
            .category("Utilities")
            .description("Electricity bill"),
        Transaction::build(checking.id, -500.0, days_ago(14))
            .payee("Rainy Day Savings")
            .category("Transfers")
            .description("Savings transfer"),
        Transaction::build(savings.id, 500.0, days_ago(14))
            .payee("Everyday Checking")
            .category("Transfers")
            .description("Savings transfer"),
        Transaction::build(savings.id, 2.31, days_ago(1))
            .payee("ACME Bank")
            .category("Interest")
            .description("Monthly interest"),
        Transaction::build(credit_card.id, -54.9, days_ago(6))
            .payee("Countdown")
            .category("Groceries")
            .description("Weekly shop"),
        Transaction::build(credit_card.id, -12.5, days_ago(3))
            .payee("Coffee Shop")
            .category("Dining")
            .description("Flat white and a muffin"),
        Transaction::build(credit_card.id, -65.0, days_ago(2))
            .payee("Gas Station")
            .category("Transport")
            .description("Fuel"),
    ])?;

    println!("Created {} transactions.", transactions.len());
    println!("Success!");

    Ok(())
}
