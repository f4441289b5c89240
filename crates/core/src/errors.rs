use thiserror::Error;

use crate::{catalog::CatalogError, config::ConfigError};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("insufficient stock for `{product}`: requested {requested}, available {available}")]
    InsufficientStock { product: String, requested: u32, available: u32 },
    #[error(
        "order limit exceeded for `{product}`: requested {requested}, maximum {maximum} per order"
    )]
    OrderLimitExceeded { product: String, requested: u32, maximum: u32 },
    #[error("product not found: {0}")]
    NotFound(String),
    #[error("product already in store: {0}")]
    DuplicateProduct(String),
    #[error("amount for `{product}` exceeds the supported decimal range")]
    AmountOverflow { product: String },
}

impl DomainError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

impl ApplicationError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(DomainError::InvalidArgument(_)) => "invalid_argument",
            Self::Domain(DomainError::InsufficientStock { .. }) => "insufficient_stock",
            Self::Domain(DomainError::OrderLimitExceeded { .. }) => "order_limit_exceeded",
            Self::Domain(DomainError::NotFound(_)) => "not_found",
            Self::Domain(DomainError::DuplicateProduct(_)) => "duplicate_product",
            Self::Domain(DomainError::AmountOverflow { .. }) => "amount_overflow",
            Self::Catalog(_) => "catalog_load",
            Self::Configuration(_) => "config_validation",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::Catalog(_) => 3,
            Self::Domain(_) => 4,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Domain(DomainError::InsufficientStock { .. }) => {
                "Error while making order! Quantity larger than what exists."
            }
            Self::Domain(DomainError::OrderLimitExceeded { .. }) => {
                "Error while making order! The per-order limit for this product was exceeded."
            }
            Self::Domain(_) => "The request could not be processed. Check inputs and try again.",
            Self::Catalog(_) => "The product catalog could not be loaded.",
            Self::Configuration(_) => "The store configuration is invalid.",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::catalog::CatalogError;
    use crate::config::ConfigError;
    use crate::errors::{ApplicationError, DomainError};

    #[test]
    fn stock_errors_map_to_order_exit_code() {
        let error = ApplicationError::from(DomainError::InsufficientStock {
            product: "Widget".to_owned(),
            requested: 6,
            available: 5,
        });

        assert_eq!(error.error_class(), "insufficient_stock");
        assert_eq!(error.exit_code(), 4);
        assert_eq!(
            error.user_message(),
            "Error while making order! Quantity larger than what exists."
        );
    }

    #[test]
    fn config_error_maps_to_validation_class() {
        let error = ApplicationError::from(ConfigError::Validation("bad".to_owned()));

        assert_eq!(error.error_class(), "config_validation");
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn catalog_error_maps_to_catalog_class() {
        let error =
            ApplicationError::from(CatalogError::MissingFile(PathBuf::from("catalog.toml")));

        assert_eq!(error.error_class(), "catalog_load");
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn amount_overflow_is_an_order_failure() {
        let error =
            ApplicationError::from(DomainError::AmountOverflow { product: "Gold".to_owned() });

        assert_eq!(error.error_class(), "amount_overflow");
        assert_eq!(error.exit_code(), 4);
        assert_eq!(
            error.to_string(),
            "amount for `Gold` exceeds the supported decimal range"
        );
    }

    #[test]
    fn domain_error_messages_name_the_product() {
        let error = DomainError::OrderLimitExceeded {
            product: "Shipping".to_owned(),
            requested: 2,
            maximum: 1,
        };

        assert_eq!(
            error.to_string(),
            "order limit exceeded for `Shipping`: requested 2, maximum 1 per order"
        );
    }
}
