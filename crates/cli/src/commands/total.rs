use serde_json::json;
use storefront_core::config::LoadOptions;

use super::{load_store, CommandResult};

pub fn run(options: LoadOptions) -> CommandResult {
    match load_store(options) {
        Ok(context) => {
            let total = context.store.total_quantity();
            CommandResult::success_with_data(
                "total",
                format!("Total of {total} items in store"),
                Some(json!({ "total_quantity": total })),
            )
        }
        Err(error) => CommandResult::from_error("total", &error),
    }
}
