use std::{
    error::Error,
    path::Path,
    sync::{Arc, Mutex},
};

use clap::Parser;
use rusqlite::Connection;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

use wealthtrackr::{
    AccountId, ImportedTransaction, SQLiteTransactionStore, TransactionBuilder, TransactionStore,
    get_account, ingest, initialize_db,
};

/// Import transactions from a CSV or JSON file into a WealthTrackr database.
///
/// Without `--commit` the file is only checked and a preview is printed.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The account to store the transactions in.
    #[arg(long)]
    account_id: AccountId,

    /// The `.csv` or `.json` file to import.
    #[arg(long, short)]
    file: String,

    /// Store the transactions instead of only previewing them.
    #[arg(long)]
    commit: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let path = Path::new(&args.file);
    let file_name = path
        .file_name()
        .and_then(|file_name| file_name.to_str())
        .ok_or_else(|| format!("{path:?} is not a file name"))?;

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|error| wealthtrackr::Error::ReadFailure(error.to_string()))?;
    let batch = ingest(file_name, &content, OffsetDateTime::now_utc())?;

    println!(
        "Read {} transactions from {} file {file_name}",
        batch.transactions.len(),
        batch.format
    );
    for transaction in batch.preview() {
        print_transaction(transaction);
    }
    if batch.transactions.len() > batch.preview().len() {
        println!(
            "...and {} more",
            batch.transactions.len() - batch.preview().len()
        );
    }

    if !args.commit {
        println!("Nothing was stored, run again with --commit to import these transactions.");
        return Ok(());
    }

    let conn = Connection::open(&args.db_path)?;
    initialize_db(&conn)?;
    let account = get_account(args.account_id, &conn)?;

    let store = SQLiteTransactionStore::new(Arc::new(Mutex::new(conn)));
    let builders = batch
        .transactions
        .into_iter()
        .map(|imported| TransactionBuilder::from_imported(account.id, imported))
        .collect();
    let stored = store.import(builders)?;

    println!(
        "Stored {} transactions in account \"{}\"",
        stored.len(),
        account.name
    );

    Ok(())
}

fn print_transaction(transaction: &ImportedTransaction) {
    println!(
        "  {}  {:>10.2}  {} ({}): {}",
        transaction.date.date(),
        transaction.amount,
        transaction.payee,
        transaction.category,
        transaction.description
    );
}
