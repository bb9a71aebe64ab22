use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::account::AccountId;
use super::currency::Currency;
use super::error::AccountError;
use super::money::Money;
use super::payment::Payment;

/// Timestamp layout used for CSV input/output.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Credit,
    Debit,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Credit => "credit",
            TransactionType::Debit => "debit",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "credit" => Ok(TransactionType::Credit),
            "debit" => Ok(TransactionType::Debit),
            _ => Err(format!("Unknown transaction type: {s}")),
        }
    }
}

/// Raw payment record as parsed from CSV input.
/// This is the unvalidated form that needs conversion to a [`Payment`].
#[derive(Debug, Deserialize, Clone)]
pub struct PaymentRecord {
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub account: AccountId,
    /// Decimal amount in major units, at most two fractional digits
    pub amount: String,
    pub currency: String,
    /// `YYYY-MM-DD HH:MM:SS`; the payment is stamped with the current time when absent
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl fmt::Display for PaymentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (account: {}, amount: {} {}",
            self.tx_type, self.account, self.amount, self.currency
        )?;
        if let Some(timestamp) = &self.timestamp {
            write!(f, ", at: {timestamp}")?;
        }
        f.write_str(")")
    }
}

impl TryFrom<&PaymentRecord> for Payment {
    type Error = AccountError;

    fn try_from(record: &PaymentRecord) -> Result<Self, Self::Error> {
        let currency = Currency::new(&record.currency)?;
        let amount = Money::from_decimal_str(&record.amount, currency)?;
        match record.timestamp.as_deref().map(str::trim) {
            None | Some("") => Ok(Payment::new(amount, record.tx_type)),
            Some(raw) => {
                let timestamp = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map_err(
                    |_| AccountError::InvalidTimestamp {
                        input: raw.to_string(),
                    },
                )?;
                Ok(Payment::at(amount, record.tx_type, timestamp))
            }
        }
    }
}
