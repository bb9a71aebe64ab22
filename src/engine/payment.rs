use chrono::{Local, NaiveDate, NaiveDateTime};

use super::money::Money;
use super::transaction::TransactionType;

/// An immutable movement of money on an account.
///
/// Recorded debits are fee-inclusive: the amount is what was actually charged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    amount: Money,
    kind: TransactionType,
    timestamp: NaiveDateTime,
}

impl Payment {
    /// Create a payment stamped with the current local wall-clock time.
    pub fn new(amount: Money, kind: TransactionType) -> Self {
        Self::at(amount, kind, Local::now().naive_local())
    }

    /// Create a payment with an explicit timestamp, e.g. when replaying from storage.
    pub fn at(amount: Money, kind: TransactionType, timestamp: NaiveDateTime) -> Self {
        Self {
            amount,
            kind,
            timestamp,
        }
    }

    pub fn credit(amount: Money) -> Self {
        Self::new(amount, TransactionType::Credit)
    }

    pub fn debit(amount: Money) -> Self {
        Self::new(amount, TransactionType::Debit)
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// The calendar day this payment counts against for the daily debit limit
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::currency::Currency;

    #[test]
    fn test_payment_properties() {
        let money = Money::from_minor_units(10000, Currency::Pln);
        let before = Local::now().naive_local();
        let payment = Payment::credit(money);
        let after = Local::now().naive_local();

        assert_eq!(payment.amount(), money);
        assert_eq!(payment.kind(), TransactionType::Credit);
        assert!(payment.timestamp() >= before && payment.timestamp() <= after);
    }

    #[test]
    fn test_explicit_timestamp_is_kept() {
        let timestamp = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        let payment = Payment::at(
            Money::from_minor_units(1, Currency::Eur),
            TransactionType::Debit,
            timestamp,
        );

        assert_eq!(payment.timestamp(), timestamp);
        assert_eq!(payment.date(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(payment.kind(), TransactionType::Debit);
    }
}
