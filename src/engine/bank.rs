use std::io::{Read, Write};

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

use super::account::{AccountId, BankAccount};
use super::currency::Currency;
use super::error::Error;
use super::money::Money;
use super::payment::Payment;
use super::transaction::{PaymentRecord, TransactionType, TIMESTAMP_FORMAT};
use crate::store::{AccountStore, StoreError};

/// Serialize Money as its amount with exactly 2 decimal places
fn serialize_amount_2dp<S: Serializer>(value: &Money, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.amount_string())
}

fn serialize_timestamp<S: Serializer>(
    value: &NaiveDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.format(TIMESTAMP_FORMAT).to_string())
}

/// Current balance of an account, as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Balance {
    account_id: AccountId,
    currency: Currency,
    #[serde(rename = "balance", serialize_with = "serialize_amount_2dp")]
    amount: Money,
}

impl Balance {
    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn amount(&self) -> Money {
        self.amount
    }
}

/// One row of an account's payment history, as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    #[serde(rename = "type")]
    kind: TransactionType,
    #[serde(serialize_with = "serialize_amount_2dp")]
    amount: Money,
    currency: Currency,
    #[serde(rename = "date", serialize_with = "serialize_timestamp")]
    timestamp: NaiveDateTime,
}

impl HistoryEntry {
    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

impl From<&Payment> for HistoryEntry {
    fn from(payment: &Payment) -> Self {
        Self {
            kind: payment.kind(),
            amount: payment.amount(),
            currency: payment.amount().currency(),
            timestamp: payment.timestamp(),
        }
    }
}

/// Caller-facing operations over an [`AccountStore`].
///
/// Every mutating operation loads the account, applies one command and saves the
/// account back before returning.
#[derive(Debug, Default)]
pub struct Bank<S> {
    store: S,
}

impl<S: AccountStore> Bank<S> {
    pub fn new(store: S) -> Self {
        log::trace!("Bank initialized");
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Open a new, empty account. Fails if the id is already taken.
    pub fn create_account(
        &mut self,
        id: AccountId,
        currency_code: &str,
    ) -> Result<BankAccount, Error> {
        let currency = Currency::new(currency_code)?;
        if self.store.exists(id)? {
            return Err(StoreError::AccountExists(id).into());
        }

        let account = BankAccount::new(id, currency);
        self.store.save(&account)?;

        log::info!("Created account {id} in {currency}");
        Ok(account)
    }

    /// Apply a payment given as a decimal amount, stamped with the current time.
    /// Returns the payment as recorded (fee-inclusive for debits).
    pub fn submit_payment(
        &mut self,
        account_id: AccountId,
        kind: TransactionType,
        amount: &str,
        currency_code: &str,
    ) -> Result<Payment, Error> {
        let mut account = self.store.load(account_id)?;
        let currency = Currency::new(currency_code)?;
        let money = Money::from_decimal_str(amount, currency)?;

        self.apply(&mut account, Payment::new(money, kind))
    }

    /// Apply an already-built payment, e.g. one carrying an explicit timestamp.
    pub fn submit(&mut self, account_id: AccountId, payment: Payment) -> Result<Payment, Error> {
        let mut account = self.store.load(account_id)?;
        self.apply(&mut account, payment)
    }

    pub fn balance(&self, account_id: AccountId) -> Result<Balance, Error> {
        let account = self.store.load(account_id)?;
        Ok(Balance {
            account_id,
            currency: account.currency(),
            amount: account.balance()?,
        })
    }

    pub fn history(&self, account_id: AccountId) -> Result<Vec<HistoryEntry>, Error> {
        let account = self.store.load(account_id)?;
        Ok(account.payments().iter().map(HistoryEntry::from).collect())
    }

    /// Batch API: apply payments from a CSV source with columns
    /// `type, account, amount, currency[, timestamp]`.
    ///
    /// Malformed rows abort the batch. Rows rejected by business rules or addressed to
    /// unknown accounts are logged and skipped.
    /// Note that the CSV reader is buffered automatically, so you should not wrap rdr in a buffered reader like `io::BufReader`.
    pub fn process_payments<R: Read>(&mut self, reader: R) -> Result<(), Error> {
        log::info!("Starting payment processing");

        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut processed = 0u64;
        let mut skipped = 0u64;

        for result in csv_reader.deserialize() {
            // Step 1: Parse CSV row into a raw PaymentRecord
            let record: PaymentRecord = result?;
            let row_num = processed + skipped + 1;
            log::trace!("[row {row_num}] Parsing: {record}");

            // Step 2: Validate into a Payment
            let payment = match Payment::try_from(&record) {
                Ok(payment) => payment,
                Err(reason) => return Err(Error::InvalidRecord { record, reason }),
            };

            // Step 3: Apply it
            match self.submit(record.account, payment) {
                Ok(_) => processed += 1,
                Err(e @ (Error::Account(_) | Error::Store(StoreError::NotFound(_)))) => {
                    log::warn!("[row {row_num}] - Skipped: {e}");
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        log::info!("Processing complete: {processed} processed, {skipped} skipped");
        Ok(())
    }

    /// Write an account's history as CSV to any sink (Stdout, File, `TcpStream`, etc.)
    pub fn export_history<W: Write>(&self, account_id: AccountId, writer: W) -> Result<(), Error> {
        let history = self.history(account_id)?;
        log::info!("Exporting {} payments of account {account_id}", history.len());

        let mut csv_writer = csv::Writer::from_writer(writer);
        for entry in &history {
            csv_writer.serialize(entry)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    fn apply(&mut self, account: &mut BankAccount, payment: Payment) -> Result<Payment, Error> {
        log::trace!(
            "[{}] account={} amount={}",
            payment.kind(),
            account.id(),
            payment.amount()
        );
        let recorded = match payment.kind() {
            TransactionType::Credit => {
                account.credit(payment.clone())?;
                payment
            }
            TransactionType::Debit => account.debit(payment)?,
        };
        self.store.save(account)?;
        Ok(recorded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::error::AccountError;
    use crate::store::InMemoryAccountStore;
    use chrono::NaiveDate;
    use std::io::Cursor;

    fn bank_with_account(id: AccountId, currency: &str) -> Bank<InMemoryAccountStore> {
        let mut bank = Bank::new(InMemoryAccountStore::new());
        bank.create_account(id, currency).unwrap();
        bank
    }

    #[test]
    fn test_create_account_starts_at_zero() {
        let bank = bank_with_account(1, "pln");
        let balance = bank.balance(1).unwrap();
        assert_eq!(balance.account_id(), 1);
        assert_eq!(balance.currency(), Currency::Pln);
        assert_eq!(balance.amount().amount_string(), "0.00");
    }

    #[test]
    fn test_create_account_twice_fails() {
        let mut bank = bank_with_account(1, "PLN");
        bank.submit_payment(1, TransactionType::Credit, "10", "PLN")
            .unwrap();

        let err = bank.create_account(1, "PLN").unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::AccountExists(1))));
        // Existing history survives
        assert_eq!(bank.history(1).unwrap().len(), 1);
    }

    #[test]
    fn test_create_account_rejects_unknown_currency() {
        let mut bank = Bank::new(InMemoryAccountStore::new());
        let err = bank.create_account(1, "GBP").unwrap_err();
        assert!(matches!(
            err,
            Error::Account(AccountError::InvalidCurrency { .. })
        ));
        assert!(bank.store().is_empty());
    }

    #[test]
    fn test_submit_payment_routes_by_type() {
        let mut bank = bank_with_account(1, "PLN");
        bank.submit_payment(1, TransactionType::Credit, "200", "PLN")
            .unwrap();
        let recorded = bank
            .submit_payment(1, TransactionType::Debit, "100", "pln")
            .unwrap();

        assert_eq!(recorded.amount().amount_string(), "100.50");
        assert_eq!(bank.balance(1).unwrap().amount().amount_string(), "99.50");
    }

    #[test]
    fn test_into_store_hands_back_persisted_accounts() {
        let mut bank = bank_with_account(4, "EUR");
        bank.submit_payment(4, TransactionType::Credit, "12.34", "EUR")
            .unwrap();

        let store = bank.into_store();
        let account = store.load(4).unwrap();
        assert_eq!(account.payments().len(), 1);
        assert_eq!(
            account.balance().unwrap(),
            Money::from_minor_units(1234, Currency::Eur)
        );
    }

    #[test]
    fn test_submit_payment_to_unknown_account() {
        let mut bank = Bank::new(InMemoryAccountStore::new());
        let err = bank
            .submit_payment(3, TransactionType::Credit, "1", "PLN")
            .unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::NotFound(3))));
    }

    #[test]
    fn test_failed_payment_is_not_persisted() {
        let mut bank = bank_with_account(1, "EUR");
        let err = bank
            .submit_payment(1, TransactionType::Debit, "1", "EUR")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Account(AccountError::InsufficientFunds { .. })
        ));
        assert!(bank.history(1).unwrap().is_empty());
    }

    #[test]
    fn test_history_reports_fee_inclusive_debits() {
        let mut bank = bank_with_account(1, "USD");
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let credit_at = day.and_hms_opt(9, 0, 0).unwrap();
        let debit_at = day.and_hms_opt(10, 0, 0).unwrap();
        bank.submit(
            1,
            Payment::at(
                Money::from_minor_units(5000, Currency::Usd),
                TransactionType::Credit,
                credit_at,
            ),
        )
        .unwrap();
        bank.submit(
            1,
            Payment::at(
                Money::from_minor_units(1000, Currency::Usd),
                TransactionType::Debit,
                debit_at,
            ),
        )
        .unwrap();

        let history = bank.history(1).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].kind(), TransactionType::Credit);
        assert_eq!(history[0].amount().amount_string(), "50.00");
        assert_eq!(history[1].kind(), TransactionType::Debit);
        assert_eq!(history[1].amount().amount_string(), "10.05");
        assert_eq!(history[1].currency(), Currency::Usd);
        assert_eq!(history[1].timestamp(), debit_at);
    }

    #[test]
    fn test_export_history_as_csv() {
        let mut bank = bank_with_account(1, "PLN");
        bank.submit(
            1,
            Payment::at(
                Money::from_minor_units(12345, Currency::Pln),
                TransactionType::Credit,
                NaiveDate::from_ymd_opt(2024, 1, 2)
                    .unwrap()
                    .and_hms_opt(3, 4, 5)
                    .unwrap(),
            ),
        )
        .unwrap();

        let mut output = Vec::new();
        bank.export_history(1, &mut output).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "type,amount,currency,date\ncredit,123.45,PLN,2024-01-02 03:04:05\n"
        );
    }

    #[test]
    fn test_process_payments_skips_business_rule_failures() {
        let mut bank = bank_with_account(1, "PLN");
        let input = "type,account,amount,currency,timestamp
credit,1,100.00,PLN,2024-01-01 08:00:00
debit,1,100.00,PLN,2024-01-01 09:00:00
debit,2,1.00,PLN,2024-01-01 09:00:00
debit,1,50.00,USD,2024-01-01 10:00:00
debit,1,50.00,PLN,2024-01-01 11:00:00";

        bank.process_payments(Cursor::new(input)).unwrap();

        let history = bank.history(1).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(bank.balance(1).unwrap().amount().amount_string(), "49.75");
    }

    #[test]
    fn test_process_payments_aborts_on_malformed_row() {
        let mut bank = bank_with_account(1, "PLN");
        let input = "type,account,amount,currency
credit,1,1.234,PLN";

        let err = bank.process_payments(Cursor::new(input)).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidRecord {
                reason: AccountError::InvalidAmountFormat { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_process_payments_rejects_unknown_type() {
        let mut bank = bank_with_account(1, "PLN");
        let input = "type,account,amount,currency
refund,1,1.00,PLN";

        assert!(matches!(
            bank.process_payments(Cursor::new(input)),
            Err(Error::Csv(_))
        ));
    }
}
