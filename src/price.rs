//! Free-form price text parsing.
//!
//! Retailer pages render prices every way imaginable: "1.234,56 EUR",
//! "$1,234.56", "1 234.56". This module finds the first plausible price in a
//! string and returns it as an exact decimal, so VAT arithmetic downstream
//! never rounds through binary floats.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

/// Optional sign, 1-3 leading digits, any number of grouping separator +
/// three digit blocks, optional decimal separator + digits. The grouping
/// separator (group 2) may be a dot, a comma, or a whitespace run; the
/// decimal separator (group 3) only a dot or comma.
static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([-+]?\d{1,3}(?:([.,]|\s+)\d{3})*)([.,]\d+)?").unwrap()
});

/// Parse the first price found in `text` into an exact decimal.
///
/// When a thousands-grouping separator was matched, every occurrence of it is
/// stripped from the integer part; it cannot be the decimal point. A decimal
/// comma is normalized to a dot. Returns `None` when no price-shaped
/// substring exists.
pub fn parse(text: &str) -> Option<Decimal> {
    let caps = PRICE_RE.captures(text)?;

    let int_part = caps.get(1)?.as_str();
    let grouped = caps.get(2).is_some();
    let mut number: String = if grouped {
        int_part
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '-' || *c == '+')
            .collect()
    } else {
        int_part.to_string()
    };

    if let Some(dec) = caps.get(3) {
        number.push('.');
        number.push_str(&dec.as_str()[1..]);
    }

    Decimal::from_str(&number).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn plain_decimal_point() {
        assert_eq!(parse("1.23"), Some(dec("1.23")));
    }

    #[test]
    fn decimal_comma() {
        assert_eq!(parse("1,23"), Some(dec("1.23")));
    }

    #[test]
    fn whitespace_grouping() {
        assert_eq!(parse("1 234.56"), Some(dec("1234.56")));
    }

    #[test]
    fn comma_grouping_dot_decimal() {
        assert_eq!(parse("1,234.56"), Some(dec("1234.56")));
    }

    #[test]
    fn dot_grouping_dot_decimal() {
        assert_eq!(parse("1.234.56"), Some(dec("1234.56")));
    }

    #[test]
    fn dot_grouping_comma_decimal_multiple_groups() {
        assert_eq!(parse("1.234.567,89"), Some(dec("1234567.89")));
    }

    #[test]
    fn surrounding_text() {
        assert_eq!(parse("Price: 1.23 EUR"), Some(dec("1.23")));
    }

    #[test]
    fn negative_price() {
        assert_eq!(parse("-1.234,56"), Some(dec("-1234.56")));
    }

    #[test]
    fn integer_only() {
        assert_eq!(parse("999 in stock"), Some(dec("999")));
    }

    #[test]
    fn no_price_in_text() {
        assert_eq!(parse("not a float"), None);
    }

    #[test]
    fn empty_text() {
        assert_eq!(parse(""), None);
    }
}
