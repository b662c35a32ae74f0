//! Fail-soft monetary amounts.
//!
//! Purchase values arrive as JSON numbers, numeric strings, strings with a
//! currency suffix (`"1200 MAD"`), or garbage. Parsing never fails: anything
//! that does not yield a finite, non-negative number counts as zero.
//!
//! Totals are summed in minor units (hundredths) so the result does not
//! depend on the order of the inputs.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Leading decimal number, accepting a comma as decimal separator.
static LEADING_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:[.,]\d*)?|[.,]\d+)(?:[eE][+-]?\d+)?")
        .expect("amount regex must compile")
});

/// A raw monetary amount as supplied by the upstream API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    /// Numeric value of the amount; zero when it cannot be parsed.
    pub fn value(&self) -> f64 {
        let parsed = match self {
            Self::Number(n) => Some(*n),
            Self::Text(text) => parse_leading_number(text),
        };

        match parsed {
            Some(n) if n.is_finite() && n >= 0.0 => n,
            _ => {
                log::debug!("ignoring unusable amount {self:?}");
                0.0
            }
        }
    }

    /// Value in hundredths of a currency unit, rounded to the nearest one.
    /// Saturates at `u64::MAX`.
    pub fn minor_units(&self) -> u64 {
        // Float-to-int `as` saturates
        (self.value() * 100.0).round() as u64
    }
}

impl From<f64> for Amount {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Amount {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Parse the leading number of a string, `parseFloat`-style.
fn parse_leading_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let matched = LEADING_NUMBER_RE.find(trimmed)?.as_str();
    matched.replace(',', ".").parse().ok()
}

/// Minor units of an optional amount, zero when absent.
pub fn amount_minor_units(amount: Option<&Amount>) -> u64 {
    amount.map(Amount::minor_units).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_pass_through() {
        assert_eq!(Amount::Number(1250.5).value(), 1250.5);
        assert_eq!(Amount::Number(0.0).value(), 0.0);
    }

    #[test]
    fn numeric_strings_parse() {
        assert_eq!(Amount::from("300").value(), 300.0);
        assert_eq!(Amount::from("  42.75 ").value(), 42.75);
        assert_eq!(Amount::from("19,90").value(), 19.9);
    }

    #[test]
    fn currency_suffix_is_ignored() {
        assert_eq!(Amount::from("1200 MAD").value(), 1200.0);
        assert_eq!(Amount::from("99.5€").value(), 99.5);
    }

    #[test]
    fn garbage_is_zero() {
        assert_eq!(Amount::from("N/A").value(), 0.0);
        assert_eq!(Amount::from("").value(), 0.0);
        assert_eq!(Amount::from("-").value(), 0.0);
    }

    #[test]
    fn negative_and_non_finite_are_zero() {
        assert_eq!(Amount::Number(-10.0).value(), 0.0);
        assert_eq!(Amount::Number(f64::NAN).value(), 0.0);
        assert_eq!(Amount::Number(f64::INFINITY).value(), 0.0);
        assert_eq!(Amount::from("-5").value(), 0.0);
    }

    #[test]
    fn absent_is_zero() {
        assert_eq!(amount_minor_units(None), 0);
        assert_eq!(amount_minor_units(Some(&Amount::Number(7.0))), 700);
    }

    #[test]
    fn minor_units_round_to_cents() {
        assert_eq!(Amount::Number(0.1).minor_units(), 10);
        assert_eq!(Amount::from("19,90").minor_units(), 1990);
        assert_eq!(Amount::from("1200.5 MAD").minor_units(), 120050);
        assert_eq!(Amount::Number(1e30).minor_units(), u64::MAX);
        assert_eq!(Amount::from("abc").minor_units(), 0);
    }

    #[test]
    fn deserializes_numbers_and_strings() {
        let n: Amount = serde_json::from_str("12.5").unwrap();
        assert_eq!(n, Amount::Number(12.5));
        let s: Amount = serde_json::from_str("\"12,5\"").unwrap();
        assert_eq!(s.value(), 12.5);
    }
}
