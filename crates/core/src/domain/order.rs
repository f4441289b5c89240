use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::product::ProductId;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// One requested item of a shopping list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl OrderItem {
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self { product_id, quantity }
    }
}

impl From<(ProductId, u32)> for OrderItem {
    fn from((product_id, quantity): (ProductId, u32)) -> Self {
        Self::new(product_id, quantity)
    }
}

impl From<&(ProductId, u32)> for OrderItem {
    fn from((product_id, quantity): &(ProductId, u32)) -> Self {
        Self::new(product_id.clone(), *quantity)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    /// `price * quantity` before any promotion.
    pub list_total: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub promotion: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub id: OrderId,
    pub lines: Vec<OrderLine>,
    pub subtotal: Decimal,
    pub discount_total: Decimal,
    pub total: Decimal,
    pub placed_at: DateTime<Utc>,
}

impl OrderReceipt {
    pub fn from_lines(lines: Vec<OrderLine>) -> Result<Self, DomainError> {
        let subtotal = checked_sum(lines.iter().map(|line| line.list_total))?;
        let discount_total = checked_sum(lines.iter().map(|line| line.discount))?;
        let total = checked_sum(lines.iter().map(|line| line.total))?;

        Ok(Self {
            id: OrderId::generate(),
            lines,
            subtotal,
            discount_total,
            total,
            placed_at: Utc::now(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn checked_sum(mut amounts: impl Iterator<Item = Decimal>) -> Result<Decimal, DomainError> {
    amounts.try_fold(Decimal::ZERO, |sum, amount| {
        sum.checked_add(amount)
            .ok_or_else(|| DomainError::AmountOverflow { product: "order total".to_string() })
    })
}
