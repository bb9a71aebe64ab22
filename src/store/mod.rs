//! Durable storage for bank accounts.
//!
//! Stores rehydrate and persist whole accounts. `save` replaces the full payment
//! set of an account in one atomic step; there is no concurrency check between a
//! `load` and the following `save`, so concurrent writers to the same account are
//! last-writer-wins.

mod memory;
mod sqlite;

pub use memory::InMemoryAccountStore;
pub use sqlite::SqliteAccountStore;

use crate::engine::{AccountId, BankAccount};

/// Errors raised by an [`AccountStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("BankAccount with id {0} not found")]
    NotFound(AccountId),

    #[error("BankAccount with id {0} already exists")]
    AccountExists(AccountId),

    #[error("Storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Corrupted record for account {account}: {reason}")]
    Corrupted { account: AccountId, reason: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Storage(Box::new(err))
    }
}

impl StoreError {
    pub(crate) fn corrupted(account: AccountId, reason: impl ToString) -> Self {
        StoreError::Corrupted {
            account,
            reason: reason.to_string(),
        }
    }
}

/// Persistence collaborator for [`BankAccount`].
pub trait AccountStore {
    /// Rebuild an account from its stored history, replaying payments in ascending
    /// timestamp order without charging fees or re-checking the daily limit.
    fn load(&self, id: AccountId) -> Result<BankAccount, StoreError>;

    /// Upsert the account and replace its whole payment set atomically.
    fn save(&mut self, account: &BankAccount) -> Result<(), StoreError>;

    /// Whether an account with this id has been saved
    fn exists(&self, id: AccountId) -> Result<bool, StoreError>;
}
