use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::currency::Currency;
use super::error::AccountError;
use super::money::Money;
use super::payment::Payment;
use super::transaction::TransactionType;

pub type AccountId = i64;

/// Maximum number of debits an account may record per calendar day
pub const MAX_DAILY_DEBITS: usize = 3;

/// Transaction fee charged on every debit: 0.5%
pub const TRANSACTION_FEE_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 3);

/// A bank account: a fixed currency and the ordered history of payments applied to it.
///
/// The balance is never stored. It is folded from the payment history on every read,
/// so it cannot drift from what the history implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankAccount {
    id: AccountId,
    currency: Currency,
    payments: Vec<Payment>,
}

impl BankAccount {
    /// Create an empty account
    pub fn new(id: AccountId, currency: Currency) -> Self {
        Self {
            id,
            currency,
            payments: Vec::new(),
        }
    }

    /// Rebuild an account from already-recorded history.
    ///
    /// Payments are appended as they are: debits are taken to be fee-inclusive and the
    /// daily debit limit is not re-evaluated. Only the currency invariant is checked.
    pub fn restore<I>(id: AccountId, currency: Currency, payments: I) -> Result<Self, AccountError>
    where
        I: IntoIterator<Item = Payment>,
    {
        let mut account = Self::new(id, currency);
        for payment in payments {
            account.assert_same_currency(&payment)?;
            account.payments.push(payment);
        }
        log::trace!(
            "[restore] account={} replayed {} payments",
            id,
            account.payments.len()
        );
        Ok(account)
    }

    /// Returns the account ID
    pub fn id(&self) -> AccountId {
        self.id
    }

    /// Returns the account currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Recorded payments in the order they were applied
    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    /// Record an incoming payment. No fee and no limit apply.
    pub fn credit(&mut self, payment: Payment) -> Result<(), AccountError> {
        Self::assert_kind(&payment, TransactionType::Credit)?;
        self.assert_same_currency(&payment)?;

        log::trace!("[credit] account={} amount={}", self.id, payment.amount());
        self.payments.push(payment);
        Ok(())
    }

    /// Charge an outgoing payment plus the transaction fee.
    ///
    /// Checks run in this order and the first failure is returned: payment type,
    /// currency, sufficient funds for the fee-inclusive amount, daily debit limit.
    /// On success the recorded payment carries the fee-inclusive amount and the
    /// original timestamp, and a copy of it is returned.
    pub fn debit(&mut self, payment: Payment) -> Result<Payment, AccountError> {
        Self::assert_kind(&payment, TransactionType::Debit)?;
        self.assert_same_currency(&payment)?;

        let charged = payment
            .amount()
            .multiply(Decimal::ONE + TRANSACTION_FEE_RATE)?;

        let balance = self.balance()?;
        if !balance.greater_or_equal(&charged)? {
            return Err(AccountError::InsufficientFunds {
                account: self.id,
                balance: balance.amount_string(),
                required: charged.amount_string(),
            });
        }

        let date = payment.date();
        if self.debits_on(date) >= MAX_DAILY_DEBITS {
            return Err(AccountError::DailyDebitLimitExceeded {
                account: self.id,
                date,
                limit: MAX_DAILY_DEBITS,
            });
        }

        let new_balance = balance.subtract(&charged)?;
        let recorded = Payment::at(charged, TransactionType::Debit, payment.timestamp());
        self.payments.push(recorded.clone());

        log::trace!(
            "[debit] account={} requested={} charged={} -> new_balance={}",
            self.id,
            payment.amount(),
            charged,
            new_balance
        );
        Ok(recorded)
    }

    /// Credits minus fee-inclusive debits, folded over the full history.
    pub fn balance(&self) -> Result<Money, AccountError> {
        self.payments
            .iter()
            .try_fold(Money::zero(self.currency), |balance, payment| {
                match payment.kind() {
                    TransactionType::Credit => balance.add(&payment.amount()),
                    TransactionType::Debit => balance.subtract(&payment.amount()),
                }
            })
    }

    fn debits_on(&self, date: NaiveDate) -> usize {
        self.payments
            .iter()
            .filter(|p| p.kind() == TransactionType::Debit && p.date() == date)
            .count()
    }

    fn assert_kind(payment: &Payment, expected: TransactionType) -> Result<(), AccountError> {
        if payment.kind() == expected {
            Ok(())
        } else {
            Err(AccountError::InvalidOperation {
                expected,
                got: payment.kind(),
            })
        }
    }

    fn assert_same_currency(&self, payment: &Payment) -> Result<(), AccountError> {
        let got = payment.amount().currency();
        if got == self.currency {
            Ok(())
        } else {
            Err(AccountError::CurrencyMismatch {
                expected: self.currency,
                got,
            })
        }
    }
}
