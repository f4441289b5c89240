use std::str::FromStr;

use serde_json::json;
use storefront_core::config::LoadOptions;
use storefront_core::{ApplicationError, OrderItem};

use super::{load_store, CommandResult};

/// One `--item N:QTY` argument: a 1-based listing position and a quantity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderRequest {
    pub position: usize,
    pub quantity: u32,
}

impl FromStr for OrderRequest {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (position, quantity) = value
            .split_once(':')
            .ok_or_else(|| format!("expected `N:QTY`, got `{value}`"))?;

        let position = position
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|position| *position > 0)
            .ok_or_else(|| format!("product number must be a positive integer, got `{position}`"))?;
        let quantity = quantity
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("quantity must be a non-negative integer, got `{quantity}`"))?;

        Ok(Self { position, quantity })
    }
}

pub fn run(options: LoadOptions, requests: &[OrderRequest]) -> CommandResult {
    if requests.is_empty() {
        return CommandResult::failure(
            "order",
            "invalid_input",
            "at least one --item N:QTY is required",
            4,
        );
    }

    let mut context = match load_store(options) {
        Ok(context) => context,
        Err(error) => return CommandResult::from_error("order", &error),
    };

    let listing = context.store.all_products();
    let mut items = Vec::with_capacity(requests.len());
    for request in requests {
        let Some(product) = request.position.checked_sub(1).and_then(|index| listing.get(index))
        else {
            return CommandResult::failure(
                "order",
                "invalid_input",
                format!(
                    "no product at position {} ({} products listed)",
                    request.position,
                    listing.len()
                ),
                4,
            );
        };
        items.push(OrderItem::new(product.id().clone(), request.quantity));
    }

    match context.store.place_order(items) {
        Ok(receipt) => {
            let message = format!(
                "Order made! Total payment: {} {}",
                receipt.total, context.config.store.currency
            );
            CommandResult::success_with_data(
                "order",
                message,
                Some(json!({
                    "receipt": receipt,
                    "remaining_quantity": context.store.total_quantity(),
                })),
            )
        }
        Err(error) => CommandResult::from_error("order", &ApplicationError::from(error)),
    }
}
