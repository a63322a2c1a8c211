use std::fmt::{Display, Formatter};

use crate::numeric::CurrencyAmount;
use crate::sales_log::{SaleEvent, SaleKind};

/// A sale as entered at the counter, before it is checked against what the
/// salesperson is allowed to sell.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaleRequest {
    /// Beverages the salesperson was started with.
    pub available_beverages: Vec<String>,
    /// Ingredients the salesperson was started with.
    pub available_ingredients: Vec<String>,
    /// Beverage sold, any case.
    pub beverage: String,
    /// Price of the beverage.
    pub beverage_price: CurrencyAmount,
    /// Ingredient added to the beverage and its price, if any.
    pub ingredient: Option<(String, CurrencyAmount)>,
}

/// Why a [`SaleRequest`] was refused.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SaleRequestError {
    /// Beverage not in the available list.
    UnknownBeverage(String),
    /// Ingredient not in the available list.
    UnknownIngredient(String),
    /// Price below zero.
    NegativePrice(CurrencyAmount),
    /// Price above [`CurrencyAmount::max_price`].
    PriceTooHigh(CurrencyAmount),
}

impl Display for SaleRequestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&match self {
            SaleRequestError::UnknownBeverage(label) => {
                format!("'{}' is not an available beverage", label)
            }
            SaleRequestError::UnknownIngredient(label) => {
                format!("'{}' is not an available ingredient", label)
            }
            SaleRequestError::NegativePrice(price) => {
                format!("Price {} is negative", price)
            }
            SaleRequestError::PriceTooHigh(price) => format!(
                "Price {} is above the {}$ limit",
                price,
                CurrencyAmount::max_price()
            ),
        })
    }
}

/// Case-insensitive membership test used for both beverages and ingredients.
pub fn is_available(label: &str, available: &[String]) -> bool {
    let label = label.to_lowercase();
    available.iter().any(|item| item.to_lowercase() == label)
}

fn check_price(price: CurrencyAmount) -> Result<(), SaleRequestError> {
    if price.is_negative() {
        Err(SaleRequestError::NegativePrice(price))
    } else if !price.is_valid_price() {
        Err(SaleRequestError::PriceTooHigh(price))
    } else {
        Ok(())
    }
}

impl SaleRequest {
    /// Checks the request and turns it into the events to log: the beverage,
    /// then the ingredient if one was chosen.
    ///
    /// # Errors
    ///
    /// Refuses labels missing from the available lists, and prices below
    /// zero or above [`CurrencyAmount::max_price`].
    pub fn into_events(self) -> Result<Vec<SaleEvent>, SaleRequestError> {
        if !is_available(&self.beverage, &self.available_beverages) {
            return Err(SaleRequestError::UnknownBeverage(self.beverage));
        }
        check_price(self.beverage_price)?;

        let mut events = vec![SaleEvent::new(
            SaleKind::Beverage,
            &self.beverage,
            self.beverage_price,
        )];

        if let Some((ingredient, price)) = self.ingredient {
            if !is_available(&ingredient, &self.available_ingredients) {
                return Err(SaleRequestError::UnknownIngredient(ingredient));
            }
            check_price(price)?;
            events.push(SaleEvent::new(SaleKind::Addition, &ingredient, price));
        }

        Ok(events)
    }
}
