//! A single bank account aggregate: credits, fee-charging debits with a daily cap,
//! a balance derived from payment history, and durable storage.

pub mod engine;
pub mod store;

pub use engine::{
    AccountError, AccountId, Balance, Bank, BankAccount, Currency, Error, HistoryEntry, Money,
    Payment, PaymentRecord, TransactionType,
};
pub use store::{AccountStore, InMemoryAccountStore, SqliteAccountStore, StoreError};
