use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Portion size of a dish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DishSize {
    Small,
    Medium,
    Large,
}

impl Display for DishSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DishSize::Small => "SMALL",
            DishSize::Medium => "MEDIUM",
            DishSize::Large => "LARGE",
        };
        f.write_str(label)
    }
}

/// A menu entry. Used as the key of an order's line items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dish {
    pub name: String,
    pub price: Decimal,
    pub size: DishSize,
}

impl Dish {
    pub fn new(name: impl Into<String>, price: Decimal, size: DishSize) -> Self {
        Self {
            name: name.into(),
            price,
            size,
        }
    }
}
