//! Extraction of prices from sales log lines.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::numeric::CurrencyAmount;

/// First numeral on a line: optional sign, then `digits`, `digits.digits`
/// or `.digits`.
static NUMERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-+]?(?:\d*\.\d+|\d+)").expect("numeral pattern is valid"));

/// A sales log line did not contain a usable price.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PriceParseError {
    /// No numeral appears anywhere on the line.
    NoNumeral(String),
    /// A numeral was found but does not fit in a currency amount.
    InvalidNumeral(String),
    /// The price is above [`CurrencyAmount::max_price`].
    AboveLimit(String),
}

impl Display for PriceParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&match self {
            PriceParseError::NoNumeral(line) => format!("No price found in line '{}'", line),
            PriceParseError::InvalidNumeral(numeral) => {
                format!("Price '{}' is not a valid amount", numeral)
            }
            PriceParseError::AboveLimit(numeral) => format!(
                "Price '{}' is above the {}$ limit",
                numeral,
                CurrencyAmount::max_price()
            ),
        })
    }
}

/// Returns the first numeral found in `text`.
///
/// Only the first match counts, so a label containing digits (`7up`) will
/// shadow the price that follows it.
///
/// # Errors
///
/// [`PriceParseError::NoNumeral`] if the line holds no numeral at all, and
/// [`PriceParseError::AboveLimit`] for prices no sale may carry. Callers
/// summing a log should skip such lines rather than abort.
pub fn parse_first_price(text: &str) -> Result<CurrencyAmount, PriceParseError> {
    let numeral = NUMERAL
        .find(text)
        .ok_or_else(|| PriceParseError::NoNumeral(text.trim_end().to_string()))?
        .as_str();

    let price = CurrencyAmount::from_str(numeral)
        .map_err(|_| PriceParseError::InvalidNumeral(numeral.to_string()))?;
    if price > CurrencyAmount::max_price() {
        return Err(PriceParseError::AboveLimit(numeral.to_string()));
    }
    Ok(price)
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use crate::numeric::CurrencyAmount;
    use crate::price::{parse_first_price, PriceParseError};

    fn amount(value: &str) -> CurrencyAmount {
        CurrencyAmount::from_str(value).unwrap()
    }

    #[test]
    fn test_parse_log_lines() {
        assert_eq!(
            Ok(amount("1.58")),
            parse_first_price("Addition: milk. Price: 1.58$")
        );
        assert_eq!(
            Ok(amount("4.0")),
            parse_first_price("Beverage: tea. Price: 4.0$\n")
        );
        assert_eq!(Ok(amount("3")), parse_first_price("Beverage: soda. Price: 3$"));
    }

    #[test]
    fn test_numeral_forms() {
        assert_eq!(Ok(amount("0.5")), parse_first_price("Price: .5$"));
        assert_eq!(Ok(amount("-2.25")), parse_first_price("Price: -2.25$"));
        assert_eq!(Ok(amount("2.25")), parse_first_price("Price: +2.25$"));
        assert_eq!(Ok(amount("12")), parse_first_price("12. and more"));
    }

    #[test]
    fn test_first_numeral_wins() {
        assert_eq!(
            Ok(amount("7")),
            parse_first_price("Beverage: 7up. Price: 2.0$")
        );
    }

    #[test]
    fn test_parse_fail() {
        assert_eq!(
            Err(PriceParseError::NoNumeral(
                "Beverage: tea. Price: free$".to_string()
            )),
            parse_first_price("Beverage: tea. Price: free$\n")
        );
        assert!(matches!(
            parse_first_price(""),
            Err(PriceParseError::NoNumeral(_))
        ));
        assert!(matches!(
            parse_first_price("Price: 999999999999999999999999999999999$"),
            Err(PriceParseError::InvalidNumeral(_))
        ));
    }

    #[test]
    fn test_price_above_limit() {
        assert_eq!(
            Ok(amount("1000000")),
            parse_first_price("Beverage: tea. Price: 1000000.0$")
        );
        assert_eq!(
            Err(PriceParseError::AboveLimit(
                "79228162514264337593543950335.0".to_string()
            )),
            parse_first_price("Beverage: tea. Price: 79228162514264337593543950335.0$")
        );
    }
}
