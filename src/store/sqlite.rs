use std::path::Path;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use super::{AccountStore, StoreError};
use crate::engine::{AccountId, BankAccount, Currency, Money, Payment, TransactionType};

/// An [`AccountStore`] backed by SQLite.
///
/// Payments are stored with their minor-unit amount, currency code, type and full
/// precision timestamp. A `position` column keeps the recorded order for payments
/// sharing a timestamp.
#[derive(Debug)]
pub struct SqliteAccountStore {
    conn: Connection,
}

impl SqliteAccountStore {
    /// Open (or create) a database file and make sure the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        // Enable WAL mode for crash recovery
        conn.pragma_update(None, "journal_mode", "WAL")?;
        log::debug!("[store] opened {}", path.as_ref().display());
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        setup_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn setup_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS bank_accounts (
            id INTEGER PRIMARY KEY,
            currency TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS payments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            account_id INTEGER NOT NULL REFERENCES bank_accounts(id),
            position INTEGER NOT NULL,
            amount_minor INTEGER NOT NULL,
            currency TEXT NOT NULL,
            type TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_payments_account
            ON payments(account_id, created_at, position);",
    )?;
    Ok(())
}

/// A payment row as read back from the `payments` table.
struct PaymentRow {
    amount_minor: i64,
    currency: String,
    tx_type: String,
    created_at: NaiveDateTime,
}

impl PaymentRow {
    fn into_payment(self, account: AccountId) -> Result<Payment, StoreError> {
        let currency =
            Currency::new(&self.currency).map_err(|e| StoreError::corrupted(account, e))?;
        let kind = self
            .tx_type
            .parse::<TransactionType>()
            .map_err(|e| StoreError::corrupted(account, e))?;
        Ok(Payment::at(
            Money::from_minor_units(self.amount_minor, currency),
            kind,
            self.created_at,
        ))
    }
}

impl AccountStore for SqliteAccountStore {
    fn load(&self, id: AccountId) -> Result<BankAccount, StoreError> {
        let code: String = self
            .conn
            .query_row(
                "SELECT currency FROM bank_accounts WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(StoreError::NotFound(id))?;
        let currency = Currency::new(&code).map_err(|e| StoreError::corrupted(id, e))?;

        let mut stmt = self.conn.prepare(
            "SELECT amount_minor, currency, type, created_at
             FROM payments
             WHERE account_id = ?1
             ORDER BY created_at ASC, position ASC",
        )?;
        let rows = stmt
            .query_map(params![id], |row| {
                Ok(PaymentRow {
                    amount_minor: row.get(0)?,
                    currency: row.get(1)?,
                    tx_type: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let payments = rows
            .into_iter()
            .map(|row| row.into_payment(id))
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!("[store] loaded account {} with {} payments", id, payments.len());
        BankAccount::restore(id, currency, payments).map_err(|e| StoreError::corrupted(id, e))
    }

    fn save(&mut self, account: &BankAccount) -> Result<(), StoreError> {
        let id = account.id();
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO bank_accounts (id, currency) VALUES (?1, ?2)
             ON CONFLICT(id) DO NOTHING",
            params![id, account.currency().code()],
        )?;

        // Full replace: no change tracking, every save rewrites the payment set
        tx.execute("DELETE FROM payments WHERE account_id = ?1", params![id])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO payments (account_id, position, amount_minor, currency, type, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (position, payment) in (0_i64..).zip(account.payments()) {
                let amount = payment.amount();
                insert.execute(params![
                    id,
                    position,
                    amount.minor_units(),
                    amount.currency().code(),
                    payment.kind().as_str(),
                    payment.timestamp(),
                ])?;
            }
        }

        tx.commit()?;
        log::debug!(
            "[store] saved account {} with {} payments",
            id,
            account.payments().len()
        );
        Ok(())
    }

    fn exists(&self, id: AccountId) -> Result<bool, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM bank_accounts WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
