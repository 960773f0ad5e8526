//! Pure data structures: the catalogue values ([`Customer`], [`Dish`]) and the [`Order`]
//! entity stored by the [`ResourceRegistry`](crate::framework::ResourceRegistry).

pub mod customer;
pub mod dish;
pub mod order;

pub use customer::*;
pub use dish::*;
pub use order::*;
