use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::iter::Sum;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Please enter the amount to 2 decimal places")]
    InvalidAmount,
}

/// An amount of money in pence, the unit the case-management API works in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pence(pub i64);

impl Pence {
    /// Parses a pounds amount typed into a form, e.g. `"41.00"`.
    ///
    /// The amount must be a whole number of pounds followed by exactly two
    /// decimal places.
    pub fn parse_pounds(input: &str) -> Result<Self, MoneyError> {
        let (pounds, pennies) = input.trim().split_once('.').ok_or(MoneyError::InvalidAmount)?;

        let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(pounds) || pennies.len() != 2 || !all_digits(pennies) {
            return Err(MoneyError::InvalidAmount);
        }

        let pounds: i64 = pounds.parse().map_err(|_| MoneyError::InvalidAmount)?;
        let pennies: i64 = pennies.parse().map_err(|_| MoneyError::InvalidAmount)?;

        pounds
            .checked_mul(100)
            .and_then(|pence| pence.checked_add(pennies))
            .map(Pence)
            .ok_or(MoneyError::InvalidAmount)
    }
}

impl Display for Pence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Sum for Pence {
    fn sum<I: Iterator<Item = Pence>>(iter: I) -> Self {
        Pence(iter.map(|p| p.0).sum())
    }
}

impl<'a> Sum<&'a Pence> for Pence {
    fn sum<I: Iterator<Item = &'a Pence>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
