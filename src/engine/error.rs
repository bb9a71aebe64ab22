use chrono::NaiveDate;

use crate::engine::account::AccountId;
use crate::engine::currency::Currency;
use crate::engine::transaction::{PaymentRecord, TransactionType};
use crate::store::StoreError;

/// Top-level error type for the bank engine.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Account error: {0}")]
    Account(#[from] AccountError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Invalid payment record: {record} ({reason})")]
    InvalidRecord {
        record: PaymentRecord,
        reason: AccountError,
    },
}

/// Validation and business-rule failures raised by the account aggregate and its value types.
/// A failed operation never leaves a partial mutation behind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountError {
    #[error("Unsupported currency code: {code}")]
    InvalidCurrency { code: String },

    #[error("Invalid money amount format: {input}")]
    InvalidAmountFormat { input: String },

    #[error("Invalid timestamp: {input}")]
    InvalidTimestamp { input: String },

    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: Currency, got: Currency },

    #[error("Payment type must be {expected} for {expected} operation, got {got}")]
    InvalidOperation {
        expected: TransactionType,
        got: TransactionType,
    },

    #[error("Insufficient funds on account {account}: balance {balance}, required {required} including fee")]
    InsufficientFunds {
        account: AccountId,
        balance: String,
        required: String,
    },

    #[error("Exceeded max {limit} debit transactions per day on account {account} ({date})")]
    DailyDebitLimitExceeded {
        account: AccountId,
        date: NaiveDate,
        limit: usize,
    },

    #[error("Amount overflow")]
    AmountOverflow,
}
