use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::error::AccountError;

/// Currencies an account may hold, by ISO 4217 code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Polish Zloty
    Pln,
    /// US Dollar
    Usd,
    /// Euro
    Eur,
}

impl Currency {
    pub const ALLOWED: [Currency; 3] = [Currency::Pln, Currency::Usd, Currency::Eur];

    /// Parse a currency code. The input is uppercased before lookup, so `"pln"` is accepted.
    pub fn new(code: &str) -> Result<Self, AccountError> {
        let normalized = code.to_uppercase();
        Self::ALLOWED
            .into_iter()
            .find(|currency| currency.code() == normalized)
            .ok_or(AccountError::InvalidCurrency { code: normalized })
    }

    /// Returns the uppercase ISO 4217 code
    pub fn code(self) -> &'static str {
        match self {
            Currency::Pln => "PLN",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_codes_are_accepted_in_any_case() {
        for (input, expected) in [
            ("PLN", Currency::Pln),
            ("pln", Currency::Pln),
            ("Usd", Currency::Usd),
            ("eUr", Currency::Eur),
        ] {
            let currency = Currency::new(input).unwrap();
            assert_eq!(currency, expected);
            assert_eq!(currency.code(), input.to_uppercase());
        }
    }

    #[test]
    fn test_unknown_code_is_rejected() {
        let err = Currency::new("abc").unwrap_err();
        assert_eq!(
            err,
            AccountError::InvalidCurrency {
                code: "ABC".to_string()
            }
        );
    }

    #[test]
    fn test_empty_code_is_rejected() {
        assert!(Currency::new("").is_err());
    }

    #[test]
    fn test_display_and_from_str() {
        assert_eq!(Currency::Eur.to_string(), "EUR");
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::Usd);
    }

    #[test]
    fn test_equality_by_code() {
        assert_eq!(Currency::new("pln").unwrap(), Currency::new("PLN").unwrap());
        assert_ne!(Currency::Pln, Currency::Usd);
    }
}
