use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::product::Product;
use crate::errors::DomainError;

/// Discount strategy applied to a purchase at checkout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PromotionKind {
    /// Every second unit is sold at half price.
    SecondHalfPrice,
    /// Every third unit is free.
    ThirdOneFree,
    /// Flat percentage off every unit.
    PercentOff { percent: Decimal },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Promotion {
    name: String,
    kind: PromotionKind,
}

impl Promotion {
    pub fn new(name: impl Into<String>, kind: PromotionKind) -> Result<Self, DomainError> {
        let name = name.into();
        validate_name(&name)?;
        if let PromotionKind::PercentOff { percent } = &kind {
            validate_percent(*percent)?;
        }

        Ok(Self { name, kind })
    }

    pub fn second_half_price(name: impl Into<String>) -> Result<Self, DomainError> {
        Self::new(name, PromotionKind::SecondHalfPrice)
    }

    pub fn third_one_free(name: impl Into<String>) -> Result<Self, DomainError> {
        Self::new(name, PromotionKind::ThirdOneFree)
    }

    pub fn percent_off(name: impl Into<String>, percent: Decimal) -> Result<Self, DomainError> {
        Self::new(name, PromotionKind::PercentOff { percent })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &PromotionKind {
        &self.kind
    }

    /// Final price for `quantity` units of `product` with this promotion applied.
    ///
    /// Only the product's price is read. The quantity is expected to have been
    /// checked against stock already.
    pub fn apply(&self, product: &Product, quantity: u32) -> Result<Decimal, DomainError> {
        self.discounted_total(product.price(), quantity)
            .ok_or_else(|| DomainError::AmountOverflow { product: product.name().to_string() })
    }

    /// `None` when the amount does not fit in a `Decimal`.
    pub fn discounted_total(&self, price: Decimal, quantity: u32) -> Option<Decimal> {
        let units = Decimal::from(quantity);
        match &self.kind {
            PromotionKind::SecondHalfPrice => {
                let half = price.checked_div(Decimal::TWO)?;
                let discount = half.checked_mul(Decimal::from(quantity / 2))?;
                price.checked_mul(units)?.checked_sub(discount)
            }
            PromotionKind::ThirdOneFree => {
                let discount = price.checked_mul(Decimal::from(quantity / 3))?;
                price.checked_mul(units)?.checked_sub(discount)
            }
            PromotionKind::PercentOff { percent } => {
                let unit_discount = price.checked_mul(*percent / Decimal::ONE_HUNDRED)?;
                price.checked_sub(unit_discount)?.checked_mul(units)
            }
        }
    }
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::invalid("promotion name cannot be empty"));
    }
    Ok(())
}

fn validate_percent(percent: Decimal) -> Result<(), DomainError> {
    if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
        return Err(DomainError::invalid(format!(
            "percent `{percent}` is out of range 0..=100"
        )));
    }
    Ok(())
}
