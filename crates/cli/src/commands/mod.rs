pub mod config;
pub mod list;
pub mod order;
pub mod shop;
pub mod total;

use serde::Serialize;
use serde_json::Value;
use storefront_core::config::{AppConfig, LoadOptions};
use storefront_core::{ApplicationError, Catalog, Store};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with_data(command, message, None)
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        Self::failure(
            command,
            error.error_class(),
            format!("{}: {error}", error.user_message()),
            error.exit_code(),
        )
    }
}

/// Effective configuration plus the store built from its catalog.
pub struct StoreContext {
    pub config: AppConfig,
    pub store: Store,
}

pub fn load_store(options: LoadOptions) -> Result<StoreContext, ApplicationError> {
    let config = AppConfig::load(options)?;
    let catalog = Catalog::load_or_demo(config.catalog.path.as_deref())?;
    let store = catalog.into_store(config.store.order_policy);

    tracing::debug!(
        event_name = "cli.store.loaded",
        store = %config.store.name,
        products = store.len(),
        "store loaded"
    );

    Ok(StoreContext { config, store })
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
