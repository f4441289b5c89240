pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod store;

pub use catalog::{Catalog, CatalogError};
pub use domain::order::{OrderId, OrderItem, OrderLine, OrderReceipt};
pub use domain::product::{sort_by_price, Product, ProductId, ProductKind, Quantity};
pub use domain::promotion::{Promotion, PromotionKind};
pub use errors::{ApplicationError, DomainError};
pub use store::{OrderPolicy, Store};
