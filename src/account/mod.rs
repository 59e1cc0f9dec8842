//! Accounts hold transactions and keep a balance derived from them.

mod core;
mod endpoints;

pub use core::{
    Account, AccountUpdate, NewAccount, create_account, create_account_table, get_account,
    get_net_worth, get_total_balance, list_accounts, refresh_account_balance, update_account,
};
pub use endpoints::{
    create_account_endpoint, delete_account_endpoint, get_account_endpoint,
    get_net_worth_endpoint, get_total_balance_endpoint, list_accounts_endpoint,
    update_account_endpoint,
};
