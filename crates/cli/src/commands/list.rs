use serde_json::{json, Value};
use storefront_core::config::LoadOptions;
use storefront_core::{Product, Quantity};

use super::{load_store, CommandResult};

pub fn run(options: LoadOptions) -> CommandResult {
    let context = match load_store(options) {
        Ok(context) => context,
        Err(error) => return CommandResult::from_error("list", &error),
    };

    let products = context.store.all_products();
    let lines = products
        .iter()
        .enumerate()
        .map(|(index, product)| format!("{}. {product}", index + 1))
        .collect::<Vec<_>>();
    let entries =
        products.iter().enumerate().map(|(index, product)| entry(index + 1, product)).collect();

    let message = if lines.is_empty() {
        format!("{} has no products in stock", context.config.store.name)
    } else {
        lines.join("\n")
    };

    CommandResult::success_with_data("list", message, Some(Value::Array(entries)))
}

fn entry(position: usize, product: &Product) -> Value {
    let quantity = match product.quantity() {
        Quantity::Finite(units) => json!(units),
        Quantity::Unlimited => json!("unlimited"),
    };

    json!({
        "position": position,
        "id": product.id().to_string(),
        "name": product.name(),
        "price": product.price(),
        "quantity": quantity,
        "variant": product.kind(),
        "promotion": product.promotion().map(|promotion| promotion.name()),
    })
}
