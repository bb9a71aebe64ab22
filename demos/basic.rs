//! Basic example of using the `Bank` over an in-memory store.
//!
//! Run with: `cargo run --example basic`

use bank_account::{Bank, InMemoryAccountStore, TransactionType};
use std::io::Cursor;

fn main() {
    // Initialize logger (optional, but shows what's happening)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut bank = Bank::new(InMemoryAccountStore::new());
    bank.create_account(1, "PLN").expect("Failed to create account");

    // Sample payments as CSV; the debit of 100.00 is charged 100.50
    let payments = r"type,account,amount,currency,timestamp
credit,1,200.00,PLN,2024-01-01 09:00:00
debit,1,100.00,PLN,2024-01-01 10:00:00
debit,1,10.00,PLN,2024-01-01 11:00:00
debit,1,10.00,PLN,2024-01-01 12:00:00
debit,1,10.00,PLN,2024-01-01 13:00:00
";

    bank.process_payments(Cursor::new(payments))
        .expect("Failed to process payments");

    bank.submit_payment(1, TransactionType::Credit, "25.25", "pln")
        .expect("Failed to credit account");

    let balance = bank.balance(1).expect("Failed to read balance");
    println!("\n=== Balance ===\n{}", balance.amount());

    println!("\n=== History ===");
    bank.export_history(1, std::io::stdout())
        .expect("Failed to export history");
}
