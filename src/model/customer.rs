use serde::{Deserialize, Serialize};

/// A customer placing orders.
///
/// Customers are immutable values shared by reference between orders; two customers
/// are the same customer when all their fields are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub address: String,
}

impl Customer {
    /// Creates a new Customer.
    ///
    /// # Arguments
    /// * `name` - Display name, also used as the persisted customer reference
    /// * `address` - Delivery address
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}
