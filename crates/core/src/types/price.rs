//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (pesos, dollars).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A price in Chilean pesos, the catalog's currency.
    #[must_use]
    pub const fn clp(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::CLP)
    }
}

/// Formats with the currency's grouping rules, e.g. `$1.299.990` for CLP
/// and `$1,299.99` for USD.
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.currency_code;
        let decimals = code.minor_units();
        let rounded = self.amount.round_dp(decimals);
        let digits = format!("{:.prec$}", rounded.abs(), prec = decimals as usize);
        let (integer, fraction) = match digits.split_once('.') {
            Some((integer, fraction)) => (integer, Some(fraction)),
            None => (digits.as_str(), None),
        };

        if rounded.is_sign_negative() && !rounded.is_zero() {
            f.write_str("-")?;
        }
        f.write_str(code.symbol())?;
        f.write_str(&group_thousands(integer, code.group_separator()))?;
        if let Some(fraction) = fraction {
            write!(f, "{}{fraction}", code.decimal_separator())?;
        }
        Ok(())
    }
}

fn group_thousands(integer: &str, separator: char) -> String {
    let len = integer.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(c);
    }
    grouped
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    CLP,
    USD,
    EUR,
}

impl CurrencyCode {
    /// Display symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::CLP | Self::USD => "$",
            Self::EUR => "€",
        }
    }

    /// Number of decimal places shown.
    #[must_use]
    pub const fn minor_units(self) -> u32 {
        match self {
            Self::CLP => 0,
            Self::USD | Self::EUR => 2,
        }
    }

    const fn group_separator(self) -> char {
        match self {
            Self::CLP | Self::EUR => '.',
            Self::USD => ',',
        }
    }

    const fn decimal_separator(self) -> char {
        match self {
            Self::CLP | Self::EUR => ',',
            Self::USD => '.',
        }
    }
}
