use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::domain::promotion::Promotion;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProductKind {
    /// Finite stock that is decremented on every purchase.
    Stocked,
    /// No stock tracking, e.g. licenses or services.
    Unlimited,
    /// Finite stock with a ceiling on units per order.
    Capped { max_per_order: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quantity {
    Finite(u32),
    Unlimited,
}

impl Quantity {
    pub fn finite(self) -> Option<u32> {
        match self {
            Self::Finite(quantity) => Some(quantity),
            Self::Unlimited => None,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(quantity) => write!(f, "{quantity}"),
            Self::Unlimited => f.write_str("Unlimited"),
        }
    }
}

/// One inventory line of a store.
///
/// Identity is the [`ProductId`]. There is no `PartialEq`/`Ord`; order by
/// price with [`Product::cmp_by_price`].
#[derive(Clone, Debug)]
pub struct Product {
    id: ProductId,
    name: String,
    price: Decimal,
    quantity: u32,
    kind: ProductKind,
    promotion: Option<Arc<Promotion>>,
}

impl Product {
    pub fn stocked(
        name: impl Into<String>,
        price: Decimal,
        quantity: i64,
    ) -> Result<Self, DomainError> {
        Self::build(name.into(), price, validate_quantity(quantity)?, ProductKind::Stocked)
    }

    /// Always active; its quantity is the `Unlimited` sentinel.
    pub fn unlimited(name: impl Into<String>, price: Decimal) -> Result<Self, DomainError> {
        Self::build(name.into(), price, 0, ProductKind::Unlimited)
    }

    pub fn capped(
        name: impl Into<String>,
        price: Decimal,
        quantity: i64,
        max_per_order: u32,
    ) -> Result<Self, DomainError> {
        if max_per_order == 0 {
            return Err(DomainError::invalid("maximum per order must be greater than zero"));
        }
        Self::build(
            name.into(),
            price,
            validate_quantity(quantity)?,
            ProductKind::Capped { max_per_order },
        )
    }

    fn build(
        name: String,
        price: Decimal,
        quantity: u32,
        kind: ProductKind,
    ) -> Result<Self, DomainError> {
        validate_name(&name)?;
        validate_price(price)?;
        Ok(Self { id: ProductId::generate(), name, price, quantity, kind, promotion: None })
    }

    pub fn with_promotion(mut self, promotion: Arc<Promotion>) -> Self {
        self.promotion = Some(promotion);
        self
    }

    pub fn id(&self) -> &ProductId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), DomainError> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        Ok(())
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn set_price(&mut self, price: Decimal) -> Result<(), DomainError> {
        validate_price(price)?;
        self.price = price;
        Ok(())
    }

    pub fn kind(&self) -> ProductKind {
        self.kind
    }

    pub fn quantity(&self) -> Quantity {
        match self.kind {
            ProductKind::Unlimited => Quantity::Unlimited,
            ProductKind::Stocked | ProductKind::Capped { .. } => Quantity::Finite(self.quantity),
        }
    }

    /// Replaces the stock level. Unlimited products ignore the call.
    pub fn set_quantity(&mut self, quantity: i64) -> Result<(), DomainError> {
        if self.kind == ProductKind::Unlimited {
            warn!(
                event_name = "domain.product.quantity_ignored",
                product = %self.name,
                requested = quantity,
                "unlimited product does not track a quantity"
            );
            return Ok(());
        }

        self.quantity = validate_quantity(quantity)?;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        match self.kind {
            ProductKind::Unlimited => true,
            ProductKind::Stocked | ProductKind::Capped { .. } => self.quantity > 0,
        }
    }

    pub fn promotion(&self) -> Option<&Arc<Promotion>> {
        self.promotion.as_ref()
    }

    pub fn set_promotion(&mut self, promotion: Option<Arc<Promotion>>) {
        self.promotion = promotion;
    }

    /// What `quantity` units would cost right now, promotion included.
    pub fn cost_of(&self, quantity: u32) -> Result<Decimal, DomainError> {
        match &self.promotion {
            Some(promotion) => promotion.apply(self, quantity),
            None => self.list_total(quantity),
        }
    }

    /// `price * quantity` before any promotion.
    pub fn list_total(&self, quantity: u32) -> Result<Decimal, DomainError> {
        self.price
            .checked_mul(Decimal::from(quantity))
            .ok_or_else(|| DomainError::AmountOverflow { product: self.name.clone() })
    }

    /// Purchases `quantity` units and returns the amount charged.
    ///
    /// Limits and the charge are worked out before any stock is touched, so a
    /// failed purchase leaves the product unchanged.
    pub fn buy(&mut self, quantity: u32) -> Result<Decimal, DomainError> {
        match self.kind {
            ProductKind::Unlimited => {}
            ProductKind::Stocked => self.check_stock(quantity)?,
            ProductKind::Capped { max_per_order } => {
                if quantity > max_per_order {
                    return Err(DomainError::OrderLimitExceeded {
                        product: self.name.clone(),
                        requested: quantity,
                        maximum: max_per_order,
                    });
                }
                self.check_stock(quantity)?;
            }
        }

        let cost = self.cost_of(quantity)?;
        if self.kind != ProductKind::Unlimited {
            self.quantity -= quantity;
        }
        Ok(cost)
    }

    fn check_stock(&self, quantity: u32) -> Result<(), DomainError> {
        if quantity > self.quantity {
            return Err(DomainError::InsufficientStock {
                product: self.name.clone(),
                requested: quantity,
                available: self.quantity,
            });
        }
        Ok(())
    }

    pub fn cmp_by_price(&self, other: &Product) -> Ordering {
        self.price.cmp(&other.price)
    }
}

/// Stable sort, cheapest first. Equally priced products keep their order.
pub fn sort_by_price(products: &mut [Product]) {
    products.sort_by(Product::cmp_by_price);
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Price: ${}, ", self.name, self.price)?;
        match self.kind {
            ProductKind::Stocked => write!(f, "Quantity: {}", self.quantity)?,
            ProductKind::Unlimited => f.write_str("Quantity: Unlimited")?,
            ProductKind::Capped { max_per_order } => write!(
                f,
                "Quantity: {}, Limited to {max_per_order} per order!",
                self.quantity
            )?,
        }
        let promotion = self.promotion.as_deref().map(Promotion::name).unwrap_or("None");
        write!(f, ", Promotion: {promotion}")
    }
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::invalid("name cannot be empty"));
    }
    Ok(())
}

fn validate_price(price: Decimal) -> Result<(), DomainError> {
    if price < Decimal::ZERO {
        return Err(DomainError::invalid("price cannot be negative"));
    }
    Ok(())
}

fn validate_quantity(quantity: i64) -> Result<u32, DomainError> {
    if quantity < 0 {
        return Err(DomainError::invalid("quantity cannot be negative"));
    }
    u32::try_from(quantity).map_err(|_| {
        DomainError::invalid(format!("quantity `{quantity}` exceeds the supported maximum"))
    })
}
