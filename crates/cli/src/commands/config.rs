use std::env;
use std::fs;
use std::path::Path;

use storefront_core::config::{resolve_config_path, AppConfig, LoadOptions};
use storefront_core::ApplicationError;
use toml::Value;

use super::CommandResult;

pub fn run(options: LoadOptions) -> CommandResult {
    let config_file_path = resolve_config_path(options.config_path.as_deref());
    let catalog_overridden = options.overrides.catalog_path.is_some();

    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => return CommandResult::from_error("config", &ApplicationError::from(error)),
    };

    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines =
        vec!["effective config (source precedence: flag > env > file > default):".to_string()];

    lines.push(render_line(
        "store.name",
        &config.store.name,
        source("store.name", &["STOREFRONT_STORE_NAME"]),
    ));
    lines.push(render_line(
        "store.currency",
        &config.store.currency,
        source("store.currency", &["STOREFRONT_STORE_CURRENCY"]),
    ));
    lines.push(render_line(
        "store.order_policy",
        &format!("{:?}", config.store.order_policy),
        source("store.order_policy", &["STOREFRONT_ORDER_POLICY"]),
    ));

    let catalog_path = config
        .catalog
        .path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<built-in demo>".to_string());
    let catalog_source = if catalog_overridden {
        "flag (--catalog)".to_string()
    } else {
        source("catalog.path", &["STOREFRONT_CATALOG_PATH"])
    };
    lines.push(render_line("catalog.path", &catalog_path, catalog_source));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["STOREFRONT_LOGGING_LEVEL", "STOREFRONT_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["STOREFRONT_LOGGING_FORMAT", "STOREFRONT_LOG_FORMAT"]),
    ));

    CommandResult::success("config", lines.join("\n"))
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| {
        env::var(key).map(|value| !value.trim().is_empty()).unwrap_or(false)
    }) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
