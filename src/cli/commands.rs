pub(crate) use clap::Parser;
use clap::Subcommand;
use std::path::PathBuf;

use bank_account::{AccountId, TransactionType};

#[derive(Parser, Debug)]
#[command(
    name = "bank-account",
    author,
    version,
    about = "Bank accounts with transaction fees and a daily debit limit",
    long_about = None,
    after_help = "OUTPUT:\n    Balances and history are printed to stdout in CSV format.\n    Use RUST_LOG to control log verbosity, e.g.\n\n    RUST_LOG=debug bank-account history 1 > history.csv"
)]
pub struct Args {
    /// Path to the SQLite database file
    #[arg(long, value_name = "PATH", env = "BANK_ACCOUNT_DB", default_value = "bank.db")]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open a new, empty account
    Create {
        id: AccountId,
        /// PLN, USD or EUR
        currency: String,
    },
    /// Credit or debit an account (debits are charged a 0.5% fee)
    Pay {
        account: AccountId,
        #[arg(value_parser = parse_transaction_type)]
        kind: TransactionType,
        /// Decimal amount with at most two fractional digits, e.g. 100.25
        amount: String,
        currency: String,
    },
    /// Print the current balance
    Balance { account: AccountId },
    /// Print the payment history
    History { account: AccountId },
    /// Apply payments from a CSV file
    Import {
        #[arg(
            value_name = "FILE",
            help = "Input CSV file with columns: type, account, amount, currency, timestamp"
        )]
        input_file: PathBuf,
    },
}

fn parse_transaction_type(input: &str) -> Result<TransactionType, String> {
    input.parse()
}
