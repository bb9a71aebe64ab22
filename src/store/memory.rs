use std::collections::BTreeMap;

use super::{AccountStore, StoreError};
use crate::engine::{AccountId, BankAccount, Currency, Payment};

/// Stored form of an account: its currency and the recorded payments.
#[derive(Debug, Clone)]
struct StoredAccount {
    currency: Currency,
    payments: Vec<Payment>,
}

/// An [`AccountStore`] kept in process memory.
///
/// Follows the same contract as the SQLite store: accounts are copied in on `save`
/// and rebuilt through [`BankAccount::restore`] on `load`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountStore {
    accounts: BTreeMap<AccountId, StoredAccount>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl AccountStore for InMemoryAccountStore {
    fn load(&self, id: AccountId) -> Result<BankAccount, StoreError> {
        let stored = self.accounts.get(&id).ok_or(StoreError::NotFound(id))?;

        let mut payments = stored.payments.clone();
        // Stable: payments sharing a timestamp keep their recorded order
        payments.sort_by_key(Payment::timestamp);

        BankAccount::restore(id, stored.currency, payments)
            .map_err(|e| StoreError::corrupted(id, e))
    }

    fn save(&mut self, account: &BankAccount) -> Result<(), StoreError> {
        log::debug!(
            "[store] saving account {} with {} payments",
            account.id(),
            account.payments().len()
        );
        self.accounts.insert(
            account.id(),
            StoredAccount {
                currency: account.currency(),
                payments: account.payments().to_vec(),
            },
        );
        Ok(())
    }

    fn exists(&self, id: AccountId) -> Result<bool, StoreError> {
        Ok(self.accounts.contains_key(&id))
    }
}
