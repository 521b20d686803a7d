//! Chilean RUT (Rol Único Tributario).

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Rut`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RutError {
    /// Nothing left after removing separators.
    #[error("rut cannot be empty")]
    Empty,
    /// The body is not made of digits or has an unsupported length.
    #[error("rut body must be 1 to {max} digits")]
    InvalidBody {
        /// Maximum number of body digits.
        max: usize,
    },
    /// The check digit is not `0-9` or `K`.
    #[error("rut check digit must be 0-9 or K")]
    InvalidCheckDigit,
    /// The check digit does not match the body.
    #[error("rut check digit does not match (expected {expected})")]
    Mismatch {
        /// The check digit the body produces.
        expected: char,
    },
}

/// A RUT whose modulo-11 check digit has been verified.
///
/// Accepts the usual spellings (`12.345.678-5`, `12345678-5`, `123456785`,
/// lowercase `k`) and normalises to `12345678-5`.
///
/// ```
/// use tienda_core::Rut;
///
/// let rut = Rut::parse("12.345.678-5").unwrap();
/// assert_eq!(rut.to_string(), "12345678-5");
/// assert!(Rut::parse("12.345.678-9").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rut {
    body: u32,
    check_digit: char,
}

impl Rut {
    /// Maximum number of digits in the body.
    pub const MAX_BODY_DIGITS: usize = 9;

    /// Parse and verify a RUT.
    ///
    /// # Errors
    ///
    /// Returns a [`RutError`] if the input is malformed or the check digit
    /// is wrong.
    pub fn parse(s: &str) -> Result<Self, RutError> {
        let cleaned: String = s
            .chars()
            .filter(|c| !matches!(c, '.' | '-') && !c.is_whitespace())
            .collect();

        let mut chars = cleaned.chars();
        let check_digit = chars
            .next_back()
            .ok_or(RutError::Empty)?
            .to_ascii_uppercase();
        let body = chars.as_str();

        if !(check_digit.is_ascii_digit() || check_digit == 'K') {
            return Err(RutError::InvalidCheckDigit);
        }
        if body.is_empty()
            || body.len() > Self::MAX_BODY_DIGITS
            || !body.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(RutError::InvalidBody {
                max: Self::MAX_BODY_DIGITS,
            });
        }

        let body: u32 = body.parse().map_err(|_| RutError::InvalidBody {
            max: Self::MAX_BODY_DIGITS,
        })?;
        let expected = check_digit_for(body);
        if expected != check_digit {
            return Err(RutError::Mismatch { expected });
        }

        Ok(Self { body, check_digit })
    }

    /// The numeric body.
    #[must_use]
    pub const fn body(&self) -> u32 {
        self.body
    }

    /// The verified check digit (`0-9` or `K`).
    #[must_use]
    pub const fn check_digit(&self) -> char {
        self.check_digit
    }
}

/// Modulo-11 check digit with the 2..=7 weight cycle.
fn check_digit_for(mut body: u32) -> char {
    let mut sum = 0;
    let mut weight = 2;
    while body > 0 {
        sum += (body % 10) * weight;
        body /= 10;
        weight = if weight == 7 { 2 } else { weight + 1 };
    }
    match 11 - (sum % 11) {
        11 => '0',
        10 => 'K',
        d => char::from_digit(d, 10).unwrap_or('0'),
    }
}

impl fmt::Display for Rut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.body, self.check_digit)
    }
}

impl std::str::FromStr for Rut {
    type Err = RutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Rut {
    type Error = RutError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Rut> for String {
    fn from(rut: Rut) -> Self {
        rut.to_string()
    }
}
