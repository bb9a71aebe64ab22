use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use super::currency::Currency;
use super::error::AccountError;

/// Number of minor units (cents, grosze) in one major unit for every supported currency.
const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// Number of fractional digits a decimal amount may carry.
const MAX_FRACTION_DIGITS: usize = 2;

/// A monetary amount held as an integer count of minor units, tied to a currency.
///
/// Values are immutable: every arithmetic operation returns a new `Money`.
/// Operations combining two amounts fail with [`AccountError::CurrencyMismatch`]
/// when the currencies differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Money {
    minor_units: i64,
    currency: Currency,
}

impl Money {
    /// Create from minor units directly, no rounding involved.
    pub const fn from_minor_units(minor_units: i64, currency: Currency) -> Self {
        Self {
            minor_units,
            currency,
        }
    }

    pub const fn zero(currency: Currency) -> Self {
        Self::from_minor_units(0, currency)
    }

    /// Parse a plain decimal amount such as `"100"` or `"100.25"`.
    ///
    /// Only unsigned digits with at most two fractional digits are accepted; anything
    /// else (signs, exponents, whitespace, three or more decimals) is rejected with
    /// [`AccountError::InvalidAmountFormat`].
    pub fn from_decimal_str(input: &str, currency: Currency) -> Result<Self, AccountError> {
        let invalid = || AccountError::InvalidAmountFormat {
            input: input.to_string(),
        };

        if !is_plain_decimal(input) {
            return Err(invalid());
        }
        let amount = input.parse::<Decimal>().map_err(|_| invalid())?;
        Self::from_decimal(amount, currency)
    }

    /// Convert a decimal amount in major units, rounding to the nearest minor unit
    /// (half away from zero).
    pub fn from_decimal(amount: Decimal, currency: Currency) -> Result<Self, AccountError> {
        let scaled = amount
            .checked_mul(Decimal::from(MINOR_UNITS_PER_MAJOR))
            .ok_or(AccountError::AmountOverflow)?;
        Ok(Self::from_minor_units(round_to_minor(scaled)?, currency))
    }

    /// Returns the amount in minor units
    pub fn minor_units(&self) -> i64 {
        self.minor_units
    }

    /// Returns the currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.minor_units == 0
    }

    pub fn add(&self, other: &Money) -> Result<Money, AccountError> {
        self.assert_same_currency(other)?;
        let minor_units = self
            .minor_units
            .checked_add(other.minor_units)
            .ok_or(AccountError::AmountOverflow)?;
        Ok(Self::from_minor_units(minor_units, self.currency))
    }

    pub fn subtract(&self, other: &Money) -> Result<Money, AccountError> {
        self.assert_same_currency(other)?;
        let minor_units = self
            .minor_units
            .checked_sub(other.minor_units)
            .ok_or(AccountError::AmountOverflow)?;
        Ok(Self::from_minor_units(minor_units, self.currency))
    }

    /// Scale by a dimensionless factor (e.g. `1.005` for a 0.5% fee), rounding the
    /// result to the nearest minor unit, half away from zero.
    pub fn multiply(&self, factor: Decimal) -> Result<Money, AccountError> {
        let scaled = Decimal::from(self.minor_units)
            .checked_mul(factor)
            .ok_or(AccountError::AmountOverflow)?;
        Ok(Self::from_minor_units(round_to_minor(scaled)?, self.currency))
    }

    pub fn greater_or_equal(&self, other: &Money) -> Result<bool, AccountError> {
        self.assert_same_currency(other)?;
        Ok(self.minor_units >= other.minor_units)
    }

    /// The amount in major units with exactly two fractional digits, e.g. `-0.50`.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.minor_units, 2)
    }

    /// The amount formatted for display, e.g. `"100.50"`.
    pub fn amount_string(&self) -> String {
        format!("{:.2}", self.to_decimal())
    }

    fn assert_same_currency(&self, other: &Money) -> Result<(), AccountError> {
        if self.currency == other.currency {
            Ok(())
        } else {
            Err(AccountError::CurrencyMismatch {
                expected: self.currency,
                got: other.currency,
            })
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.currency, self.amount_string())
    }
}

fn round_to_minor(value: Decimal) -> Result<i64, AccountError> {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(AccountError::AmountOverflow)
}

/// Matches `digits[.digits{1,2}]`.
fn is_plain_decimal(input: &str) -> bool {
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    match input.split_once('.') {
        Some((whole, fraction)) => {
            all_digits(whole) && all_digits(fraction) && fraction.len() <= MAX_FRACTION_DIGITS
        }
        None => all_digits(input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const PLN: Currency = Currency::Pln;

    fn pln(minor_units: i64) -> Money {
        Money::from_minor_units(minor_units, PLN)
    }

    #[test]
    fn test_from_decimal_str_converts_to_minor_units() {
        assert_eq!(Money::from_decimal_str("100", PLN).unwrap(), pln(10000));
        assert_eq!(Money::from_decimal_str("100.5", PLN).unwrap(), pln(10050));
        assert_eq!(Money::from_decimal_str("25.25", PLN).unwrap(), pln(2525));
        assert_eq!(Money::from_decimal_str("0.01", PLN).unwrap(), pln(1));
    }

    #[test]
    fn test_from_decimal_str_rejects_bad_formats() {
        for input in ["", "abc", "1.234", "-5", "+5", "1.", ".5", "1e3", " 1", "1,50", "1.2.3"] {
            let err = Money::from_decimal_str(input, PLN).unwrap_err();
            assert_eq!(
                err,
                AccountError::InvalidAmountFormat {
                    input: input.to_string()
                },
                "input {input:?}"
            );
        }
    }

    #[test]
    fn test_from_decimal_rounds_half_away_from_zero() {
        assert_eq!(Money::from_decimal(dec!(100.50), PLN).unwrap(), pln(10050));
        assert_eq!(Money::from_decimal(dec!(0.005), PLN).unwrap(), pln(1));
        assert_eq!(Money::from_decimal(dec!(0.004), PLN).unwrap(), pln(0));
        assert_eq!(Money::from_decimal(dec!(-0.005), PLN).unwrap(), pln(-1));
    }

    #[test]
    fn test_add_zero_and_subtract_self() {
        let m = pln(12345);
        let zero = Money::zero(PLN);
        assert_eq!(m.add(&zero).unwrap(), m);
        assert_eq!(m.subtract(&m).unwrap(), zero);
        assert!(m.subtract(&m).unwrap().is_zero());
    }

    #[test]
    fn test_add_and_subtract() {
        let a = Money::from_decimal_str("50", PLN).unwrap();
        let b = Money::from_decimal_str("25.25", PLN).unwrap();
        assert_eq!(a.add(&b).unwrap().to_string(), "PLN 75.25");
        assert_eq!(a.subtract(&b).unwrap().to_string(), "PLN 24.75");
        assert_eq!(b.subtract(&a).unwrap().to_string(), "PLN -24.75");
    }

    #[test]
    fn test_multiply_applies_fee_and_rounds_down() {
        // 10050 * 1.005 = 10100.25
        let m = Money::from_decimal_str("100.50", PLN).unwrap();
        assert_eq!(m.multiply(dec!(1.005)).unwrap(), pln(10100));
    }

    #[test]
    fn test_multiply_rounds_up() {
        // 110 * 1.005 = 110.55
        assert_eq!(pln(110).multiply(dec!(1.005)).unwrap(), pln(111));
        // 100 * 1.005 = 100.5, a midpoint
        assert_eq!(pln(100).multiply(dec!(1.005)).unwrap(), pln(101));
        assert_eq!(pln(-100).multiply(dec!(1.005)).unwrap(), pln(-101));
    }

    #[test]
    fn test_multiply_exact() {
        let m = Money::from_decimal_str("100", PLN).unwrap();
        assert_eq!(m.multiply(dec!(1.005)).unwrap().to_string(), "PLN 100.50");
    }

    #[test]
    fn test_currency_mismatch() {
        let usd = Money::from_minor_units(100, Currency::Usd);
        let expected = AccountError::CurrencyMismatch {
            expected: PLN,
            got: Currency::Usd,
        };
        assert_eq!(pln(100).add(&usd).unwrap_err(), expected);
        assert_eq!(pln(100).subtract(&usd).unwrap_err(), expected);
        assert_eq!(pln(100).greater_or_equal(&usd).unwrap_err(), expected);
    }

    #[test]
    fn test_greater_or_equal() {
        assert!(pln(100).greater_or_equal(&pln(100)).unwrap());
        assert!(pln(101).greater_or_equal(&pln(100)).unwrap());
        assert!(!pln(99).greater_or_equal(&pln(100)).unwrap());
    }

    #[test]
    fn test_equality_includes_currency() {
        assert_eq!(pln(100), pln(100));
        assert_ne!(pln(100), Money::from_minor_units(100, Currency::Eur));
    }

    #[test]
    fn test_overflow_is_reported() {
        let max = pln(i64::MAX);
        assert_eq!(max.add(&pln(1)).unwrap_err(), AccountError::AmountOverflow);
        assert_eq!(
            max.multiply(dec!(2)).unwrap_err(),
            AccountError::AmountOverflow
        );
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(pln(0).to_string(), "PLN 0.00");
        assert_eq!(pln(5).amount_string(), "0.05");
        assert_eq!(pln(-50).amount_string(), "-0.50");
        assert_eq!(pln(10000).to_decimal(), dec!(100.00));
    }
}
