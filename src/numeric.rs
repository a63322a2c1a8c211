use std::fmt::{Display, Formatter};
use std::ops::Add;
use std::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};

/// Number of fractional digits kept for stored and reported amounts.
pub const CENT_DIGITS: u32 = 2;

/// Highest price, in whole dollars, a single beverage or addition may have.
pub const MAX_PRICE_DOLLARS: i64 = 1_000_000;

/// Digits kept when an amount arrives as a binary float, enough to absorb
/// representation error without losing any cents.
const FLOAT_DIGITS: u32 = 8;

/// An error occurred when performing arithmetic operations on
/// currency amounts.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum CurrencyError {
    /// The result of the calculation would overflow/underflow.
    OutOfBounds,
}

impl Display for CurrencyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CurrencyError::OutOfBounds => "Out of bounds",
        })
    }
}

/// Error occurring when parsing a string to a currency amount.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CurrencyAmountParseError {
    /// The specified string is not a valid currency amount.
    InvalidNumericValue,
}

impl Display for CurrencyAmountParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CurrencyAmountParseError::InvalidNumericValue => "Invalid numeric value",
        })
    }
}

/// An amount of money, represented as a decimal number.
///
/// Amounts print like the price a customer sees: at least one fractional
/// digit (`4.0`, `5.5`, `16.47`). Serialized as a number so JSON exports
/// keep numeric types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CurrencyAmount {
    value: Decimal,
}

impl CurrencyAmount {
    /// Constant value of `0.0`.
    pub const ZERO: Self = Self {
        value: Decimal::ZERO,
    };

    /// Returns true if this value is less than zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.value.lt(&Decimal::ZERO)
    }

    /// Highest accepted price for one item, see [`MAX_PRICE_DOLLARS`].
    #[must_use]
    pub fn max_price() -> Self {
        Self {
            value: Decimal::new(MAX_PRICE_DOLLARS, 0),
        }
    }

    /// True for prices from zero up to [`Self::max_price`]. Anything larger
    /// could not be summed and stored without losing the amount.
    #[must_use]
    pub fn is_valid_price(&self) -> bool {
        !self.is_negative() && *self <= Self::max_price()
    }

    /// Rounds to whole cents, halves going to the even neighbour.
    #[must_use]
    pub fn round_cents(self) -> Self {
        Self {
            value: self.value.round_dp(CENT_DIGITS),
        }
    }

    /// Converts a float (as stored by SQLite or read from JSON) into an
    /// amount. Returns `None` for NaN and infinities.
    #[must_use]
    pub fn from_f64(value: f64) -> Option<Self> {
        Decimal::from_f64(value).map(|value| Self {
            value: value.round_dp(FLOAT_DIGITS).normalize(),
        })
    }

    /// The nearest float to this amount.
    #[must_use]
    pub fn to_f64(&self) -> Option<f64> {
        self.value.to_f64()
    }

    /// Adds up all amounts, failing on overflow.
    pub fn checked_sum(
        amounts: impl IntoIterator<Item = CurrencyAmount>,
    ) -> Result<Self, CurrencyError> {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, |total, amount| total + amount)
    }
}

impl Add for CurrencyAmount {
    type Output = Result<Self, CurrencyError>;

    fn add(self, rhs: Self) -> Self::Output {
        Ok(Self {
            value: self
                .value
                .checked_add(rhs.value)
                .ok_or(CurrencyError::OutOfBounds)?,
        })
    }
}

impl FromStr for CurrencyAmount {
    type Err = CurrencyAmountParseError;

    fn from_str(value: &str) -> Result<Self, CurrencyAmountParseError> {
        Ok(Self {
            value: Decimal::from_str(value.strip_prefix('+').unwrap_or(value))
                .map_err(|_| CurrencyAmountParseError::InvalidNumericValue)?,
        })
    }
}

impl Display for CurrencyAmount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let value = self.value.normalize();
        if value.scale() == 0 {
            write!(f, "{}.0", value)
        } else {
            write!(f, "{}", value)
        }
    }
}

impl Serialize for CurrencyAmount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let value = self
            .to_f64()
            .ok_or_else(|| <S::Error as ser::Error>::custom("amount out of float range"))?;
        serializer.serialize_f64(value)
    }
}

impl<'de> Deserialize<'de> for CurrencyAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Amount {
            Number(f64),
            Text(String),
        }

        match Amount::deserialize(deserializer)? {
            Amount::Number(value) => Self::from_f64(value)
                .ok_or_else(|| de::Error::custom(CurrencyAmountParseError::InvalidNumericValue)),
            Amount::Text(value) => Self::from_str(value.trim()).map_err(de::Error::custom),
        }
    }
}
