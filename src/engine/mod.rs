//! Bank account engine module.
//!
//! This module contains the core account logic including:
//! - `Bank` - The caller-facing façade over an `AccountStore`
//! - `BankAccount` - The account aggregate enforcing fee, funds and daily-limit rules
//! - `Money`, `Currency`, `Payment` - Immutable value types
//! - `Error` types - Validation, business-rule and storage errors

mod account;
mod bank;
mod currency;
mod error;
mod money;
mod payment;
mod transaction;

pub use account::{AccountId, BankAccount, MAX_DAILY_DEBITS, TRANSACTION_FEE_RATE};
pub use bank::{Balance, Bank, HistoryEntry};
pub use currency::Currency;
pub use error::{AccountError, Error};
pub use money::Money;
pub use payment::Payment;
pub use transaction::{PaymentRecord, TransactionType, TIMESTAMP_FORMAT};
