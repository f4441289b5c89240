//! Declarative product catalog.
//!
//! A catalog is a TOML document with `[[promotions]]` and `[[products]]`
//! tables. Products refer to promotions by id, and every product that
//! refers to the same id shares one [`Promotion`] instance.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::product::Product;
use crate::domain::promotion::{Promotion, PromotionKind};
use crate::errors::DomainError;
use crate::store::{OrderPolicy, Store};

const DEMO_CATALOG: &str = include_str!("../catalog/demo.toml");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read catalog file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse catalog file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("could not parse catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("catalog file was not found: `{0}`")]
    MissingFile(PathBuf),
    #[error("promotion id `{0}` is defined more than once")]
    DuplicatePromotion(String),
    #[error("product `{product}` refers to unknown promotion `{promotion}`")]
    UnknownPromotion { product: String, promotion: String },
    #[error("catalog entry `{entry}` is missing `{field}`")]
    MissingField { entry: String, field: &'static str },
    #[error("catalog entry `{entry}` is invalid: {source}")]
    Invalid { entry: String, source: DomainError },
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    promotions: HashMap<String, Arc<Promotion>>,
    products: Vec<Product>,
}

impl Catalog {
    /// The built-in inventory used when no catalog file is configured.
    pub fn demo() -> Result<Self, CatalogError> {
        Self::parse(DEMO_CATALOG)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            return Err(CatalogError::MissingFile(path.to_path_buf()));
        }

        let raw = fs::read_to_string(path)
            .map_err(|source| CatalogError::ReadFile { path: path.to_path_buf(), source })?;
        let file = toml::from_str::<CatalogFile>(&raw)
            .map_err(|source| CatalogError::ParseFile { path: path.to_path_buf(), source })?;

        debug!(event_name = "catalog.loaded", path = %path.display(), "catalog file parsed");
        Self::build(file)
    }

    /// Loads `path` when given, the demo catalog otherwise.
    pub fn load_or_demo(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(path) => Self::load(path),
            None => Self::demo(),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, CatalogError> {
        let file = toml::from_str::<CatalogFile>(raw)?;
        Self::build(file)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn promotion(&self, id: &str) -> Option<&Arc<Promotion>> {
        self.promotions.get(id)
    }

    pub fn into_store(self, policy: OrderPolicy) -> Store {
        Store::new(self.products).with_policy(policy)
    }

    fn build(file: CatalogFile) -> Result<Self, CatalogError> {
        let mut promotions = HashMap::with_capacity(file.promotions.len());
        for entry in file.promotions {
            if promotions.contains_key(&entry.id) {
                return Err(CatalogError::DuplicatePromotion(entry.id));
            }
            let promotion = build_promotion(&entry)?;
            promotions.insert(entry.id, Arc::new(promotion));
        }

        let products = file
            .products
            .into_iter()
            .map(|entry| build_product(entry, &promotions))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { promotions, products })
    }
}

fn build_promotion(entry: &PromotionEntry) -> Result<Promotion, CatalogError> {
    let kind = match entry.kind {
        PromotionKindEntry::SecondHalfPrice => PromotionKind::SecondHalfPrice,
        PromotionKindEntry::ThirdOneFree => PromotionKind::ThirdOneFree,
        PromotionKindEntry::PercentOff => {
            let percent = entry.percent.ok_or_else(|| CatalogError::MissingField {
                entry: entry.id.clone(),
                field: "percent",
            })?;
            PromotionKind::PercentOff { percent }
        }
    };

    Promotion::new(entry.name.clone(), kind)
        .map_err(|source| CatalogError::Invalid { entry: entry.id.clone(), source })
}

fn build_product(
    entry: ProductEntry,
    promotions: &HashMap<String, Arc<Promotion>>,
) -> Result<Product, CatalogError> {
    let missing = |field| CatalogError::MissingField { entry: entry.name.clone(), field };

    let product = match entry.kind {
        ProductKindEntry::Stocked => {
            let quantity = entry.quantity.ok_or_else(|| missing("quantity"))?;
            Product::stocked(entry.name.clone(), entry.price, quantity)
        }
        ProductKindEntry::Unlimited => {
            if entry.quantity.is_some() {
                warn!(
                    event_name = "catalog.quantity_ignored",
                    product = %entry.name,
                    "unlimited product does not track a quantity"
                );
            }
            Product::unlimited(entry.name.clone(), entry.price)
        }
        ProductKindEntry::Capped => {
            let quantity = entry.quantity.ok_or_else(|| missing("quantity"))?;
            let max_per_order = entry.max_per_order.ok_or_else(|| missing("max_per_order"))?;
            Product::capped(entry.name.clone(), entry.price, quantity, max_per_order)
        }
    }
    .map_err(|source| CatalogError::Invalid { entry: entry.name.clone(), source })?;

    match entry.promotion {
        Some(promotion_id) => {
            let promotion = promotions.get(&promotion_id).ok_or_else(|| {
                CatalogError::UnknownPromotion {
                    product: entry.name.clone(),
                    promotion: promotion_id.clone(),
                }
            })?;
            Ok(product.with_promotion(Arc::clone(promotion)))
        }
        None => Ok(product),
    }
}

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    promotions: Vec<PromotionEntry>,
    #[serde(default)]
    products: Vec<ProductEntry>,
}

#[derive(Debug, Deserialize)]
struct PromotionEntry {
    id: String,
    name: String,
    kind: PromotionKindEntry,
    percent: Option<Decimal>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum PromotionKindEntry {
    SecondHalfPrice,
    ThirdOneFree,
    PercentOff,
}

#[derive(Debug, Deserialize)]
struct ProductEntry {
    name: String,
    price: Decimal,
    #[serde(default)]
    kind: ProductKindEntry,
    quantity: Option<i64>,
    max_per_order: Option<u32>,
    promotion: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ProductKindEntry {
    #[default]
    Stocked,
    Unlimited,
    Capped,
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use crate::domain::product::{ProductKind, Quantity};
    use crate::errors::DomainError;
    use crate::store::OrderPolicy;

    use super::{Catalog, CatalogError};

    #[test]
    fn demo_catalog_matches_the_reference_inventory() {
        let catalog = Catalog::demo().expect("demo catalog should parse");

        let summary: Vec<String> =
            catalog.products().iter().map(|product| product.to_string()).collect();
        assert_eq!(
            summary,
            [
                "MacBook Air M2, Price: $1450, Quantity: 100, Promotion: Second Half price!",
                "Bose QuietComfort Earbuds, Price: $250, Quantity: 500, Promotion: Third One Free!",
                "Google Pixel 7, Price: $500, Quantity: 250, Promotion: None",
                "Windows License, Price: $125, Quantity: Unlimited, Promotion: 30% off!",
                "Shipping, Price: $10, Quantity: 250, Limited to 1 per order!, Promotion: None",
            ]
        );

        let store = catalog.into_store(OrderPolicy::AllOrNothing);
        assert_eq!(store.total_quantity(), 1100);
    }

    #[test]
    fn products_share_promotion_instances() {
        let catalog = Catalog::parse(
            r#"
[[promotions]]
id = "half"
name = "Half"
kind = "second_half_price"

[[products]]
name = "A"
price = 10
quantity = 1
promotion = "half"

[[products]]
name = "B"
price = "2.50"
quantity = 4
promotion = "half"
"#,
        )
        .expect("catalog should parse");

        let shared = catalog.promotion("half").expect("promotion is registered");
        assert_eq!(Arc::strong_count(shared), 3);
        assert_eq!(catalog.products()[1].price(), Decimal::new(250, 2));
    }

    #[test]
    fn capped_products_need_a_limit() {
        let error = Catalog::parse(
            r#"
[[products]]
name = "Shipping"
kind = "capped"
price = 10
quantity = 250
"#,
        )
        .expect_err("max_per_order is required");

        assert!(matches!(
            error,
            CatalogError::MissingField { ref entry, field: "max_per_order" } if entry == "Shipping"
        ));
    }

    #[test]
    fn unlimited_products_need_no_quantity() {
        let catalog = Catalog::parse(
            r#"
[[products]]
name = "Support"
kind = "unlimited"
price = 99
"#,
        )
        .expect("catalog should parse");

        let product = &catalog.products()[0];
        assert_eq!(product.kind(), ProductKind::Unlimited);
        assert_eq!(product.quantity(), Quantity::Unlimited);
    }

    #[test]
    fn unknown_promotion_is_rejected() {
        let error = Catalog::parse(
            r#"
[[products]]
name = "Widget"
price = 10
quantity = 1
promotion = "missing"
"#,
        )
        .expect_err("promotion must exist");

        assert!(matches!(error, CatalogError::UnknownPromotion { .. }));
    }

    #[test]
    fn duplicate_promotion_ids_are_rejected() {
        let error = Catalog::parse(
            r#"
[[promotions]]
id = "free"
name = "Third One Free!"
kind = "third_one_free"

[[promotions]]
id = "free"
name = "Also free"
kind = "third_one_free"
"#,
        )
        .expect_err("ids must be unique");

        assert!(matches!(error, CatalogError::DuplicatePromotion(ref id) if id == "free"));
    }

    #[test]
    fn domain_validation_errors_name_the_entry() {
        let error = Catalog::parse(
            r#"
[[products]]
name = "Broken"
price = -1
quantity = 1
"#,
        )
        .expect_err("negative price");

        match error {
            CatalogError::Invalid { entry, source } => {
                assert_eq!(entry, "Broken");
                assert_eq!(
                    source,
                    DomainError::InvalidArgument("price cannot be negative".to_owned())
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn percent_off_requires_percent() {
        let error = Catalog::parse(
            r#"
[[promotions]]
id = "sale"
name = "Sale"
kind = "percent_off"
"#,
        )
        .expect_err("percent is required");

        assert!(matches!(error, CatalogError::MissingField { field: "percent", .. }));
    }

    #[test]
    fn load_reads_catalog_from_disk() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("catalog.toml");
        fs::write(
            &path,
            r#"
[[products]]
name = "Widget"
price = 10
quantity = 5
"#,
        )
        .expect("write catalog");

        let catalog = Catalog::load_or_demo(Some(&path)).expect("catalog should load");
        assert_eq!(catalog.products().len(), 1);

        let missing = Catalog::load(&dir.path().join("nope.toml")).expect_err("missing file");
        assert!(matches!(missing, CatalogError::MissingFile(_)));
    }

    #[test]
    fn malformed_file_reports_its_path() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("catalog.toml");
        fs::write(&path, "[[products]\nname =").expect("write catalog");

        let error = Catalog::load(&path).expect_err("malformed toml");
        assert!(matches!(error, CatalogError::ParseFile { path: ref p, .. } if p == &path));
    }
}
