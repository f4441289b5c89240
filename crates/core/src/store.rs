use std::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::order::{OrderItem, OrderLine, OrderReceipt};
use crate::domain::product::{Product, ProductId};
use crate::errors::DomainError;

/// What happens to already-purchased lines when a later line fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderPolicy {
    /// Every line is checked against a scratch copy of the inventory and the
    /// store only changes if the whole order succeeds.
    #[default]
    AllOrNothing,
    /// Lines before the failing one stay applied and the error is returned.
    BestEffort,
}

/// In-memory inventory of products that resolves purchase orders.
#[derive(Clone, Debug, Default)]
pub struct Store {
    products: Vec<Product>,
    policy: OrderPolicy,
}

impl Store {
    /// Builds a store from `products`, keeping the first product seen for any id.
    pub fn new(products: Vec<Product>) -> Self {
        let mut store = Self::default();
        for product in products {
            if let Err(error) = store.add_product(product) {
                warn!(event_name = "domain.store.duplicate_skipped", %error, "skipping product");
            }
        }
        store
    }

    pub fn with_policy(mut self, policy: OrderPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> OrderPolicy {
        self.policy
    }

    pub fn add_product(&mut self, product: Product) -> Result<(), DomainError> {
        if self.position(product.id()).is_some() {
            return Err(DomainError::DuplicateProduct(product.id().to_string()));
        }
        self.products.push(product);
        Ok(())
    }

    pub fn remove_product(&mut self, product_id: &ProductId) -> Result<Product, DomainError> {
        let index = self
            .position(product_id)
            .ok_or_else(|| DomainError::NotFound(product_id.to_string()))?;
        Ok(self.products.remove(index))
    }

    /// Sum of all finite quantities. Unlimited products count as zero.
    pub fn total_quantity(&self) -> u64 {
        self.products.iter().filter_map(|product| product.quantity().finite()).map(u64::from).sum()
    }

    /// Active products in insertion order.
    pub fn all_products(&self) -> Vec<&Product> {
        self.products.iter().filter(|product| product.is_active()).collect()
    }

    /// Active products, cheapest first.
    pub fn sorted_by_price(&self) -> Vec<&Product> {
        let mut products = self.all_products();
        products.sort_by(|left, right| left.cmp_by_price(right));
        products
    }

    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.get(product_id).is_some_and(Product::is_active)
    }

    pub fn get(&self, product_id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.id() == product_id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Buys every listed item and returns the total charged.
    pub fn order<I, T>(&mut self, shopping_list: I) -> Result<Decimal, DomainError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OrderItem>,
    {
        self.place_order(shopping_list).map(|receipt| receipt.total)
    }

    /// Same as [`Store::order`] but returns the itemised receipt.
    ///
    /// Items whose product is not in the store are skipped. A product that is
    /// sold out by a line is removed before the next line is processed.
    pub fn place_order<I, T>(&mut self, shopping_list: I) -> Result<OrderReceipt, DomainError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OrderItem>,
    {
        let items: Vec<OrderItem> = shopping_list.into_iter().map(Into::into).collect();

        let receipt = match self.policy {
            OrderPolicy::AllOrNothing => {
                let mut scratch = self.products.clone();
                let receipt = OrderReceipt::from_lines(fulfil(&mut scratch, &items)?)?;
                self.products = scratch;
                receipt
            }
            OrderPolicy::BestEffort => {
                OrderReceipt::from_lines(fulfil(&mut self.products, &items)?)?
            }
        };

        info!(
            event_name = "domain.store.order_placed",
            order_id = %receipt.id.0,
            lines = receipt.lines.len(),
            total = %receipt.total,
            "order placed"
        );
        Ok(receipt)
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.products.iter().position(|product| product.id() == product_id)
    }
}

fn fulfil(
    products: &mut Vec<Product>,
    items: &[OrderItem],
) -> Result<Vec<OrderLine>, DomainError> {
    let mut lines = Vec::with_capacity(items.len());
    let mut subtotal = Decimal::ZERO;

    for item in items {
        let Some(index) = products.iter().position(|product| product.id() == &item.product_id)
        else {
            debug!(
                event_name = "domain.store.item_skipped",
                product_id = %item.product_id,
                "product is not in the store"
            );
            continue;
        };

        let product = &mut products[index];
        let list_total = product.list_total(item.quantity)?;
        subtotal = subtotal
            .checked_add(list_total)
            .ok_or_else(|| DomainError::AmountOverflow { product: product.name().to_string() })?;
        let total = product.buy(item.quantity)?;
        lines.push(OrderLine {
            product_id: item.product_id.clone(),
            product_name: product.name().to_string(),
            quantity: item.quantity,
            list_total,
            discount: list_total - total,
            total,
            promotion: product.promotion().map(|promotion| promotion.name().to_string()),
        });

        if !product.is_active() {
            let removed = products.remove(index);
            info!(
                event_name = "domain.store.product_sold_out",
                product = %removed.name(),
                "removing sold out product"
            );
        }
    }

    Ok(lines)
}

impl Add for Store {
    type Output = Store;

    /// Union of both inventories; the left store's policy is kept.
    fn add(mut self, other: Store) -> Store {
        for product in other.products {
            if self.position(product.id()).is_none() {
                self.products.push(product);
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use crate::domain::product::{Product, ProductId, Quantity};
    use crate::domain::promotion::Promotion;
    use crate::errors::DomainError;

    use super::{OrderPolicy, Store};

    fn widget(quantity: i64) -> Product {
        Product::stocked("Widget", Decimal::from(10), quantity).expect("valid widget")
    }

    fn demo_store() -> (Store, Vec<ProductId>) {
        let products = vec![
            Product::stocked("MacBook Air M2", Decimal::from(1450), 100).expect("valid"),
            Product::stocked("Bose QuietComfort Earbuds", Decimal::from(250), 500).expect("valid"),
            Product::unlimited("Windows License", Decimal::from(125)).expect("valid"),
            Product::capped("Shipping", Decimal::from(10), 250, 1).expect("valid"),
        ];
        let ids = products.iter().map(|product| product.id().clone()).collect();
        (Store::new(products), ids)
    }

    #[test]
    fn order_that_exhausts_stock_removes_product() {
        let product = widget(5);
        let id = product.id().clone();
        let mut store = Store::new(vec![product]);

        let total = store.order([(id.clone(), 5)]).expect("order should succeed");

        assert_eq!(total, Decimal::from(50));
        assert!(store.get(&id).is_none());
        assert!(store.all_products().is_empty());
        assert!(!store.contains(&id));
    }

    #[test]
    fn order_accepts_a_borrowed_shopping_list() {
        let (mut store, ids) = demo_store();
        let shopping_list = vec![(ids[1].clone(), 3), (ids[3].clone(), 1)];

        let total = store.order(&shopping_list).expect("order should succeed");

        assert_eq!(total, Decimal::from(760));
        assert_eq!(store.total_quantity(), 846);
    }

    #[test]
    fn total_quantity_counts_unlimited_as_zero() {
        let (store, _) = demo_store();
        assert_eq!(store.total_quantity(), 850);
    }

    #[test]
    fn read_operations_are_idempotent() {
        let (store, _) = demo_store();

        let first: Vec<String> = store.all_products().iter().map(|p| p.to_string()).collect();
        let second: Vec<String> = store.all_products().iter().map(|p| p.to_string()).collect();

        assert_eq!(first, second);
        assert_eq!(store.total_quantity(), store.total_quantity());
    }

    #[test]
    fn all_products_lists_only_active_in_insertion_order() {
        let empty = Product::stocked("Empty", Decimal::ONE, 0).expect("valid");
        let service = Product::unlimited("Service", Decimal::ONE).expect("valid");
        let store = Store::new(vec![widget(1), empty, service]);

        let names: Vec<&str> = store.all_products().iter().map(|p| p.name()).collect();

        assert_eq!(names, ["Widget", "Service"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn order_skips_products_outside_the_store() {
        let (mut store, ids) = demo_store();
        let stranger = widget(3);

        let total = store
            .order([(stranger.id().clone(), 2), (ids[1].clone(), 3)])
            .expect("order should succeed");

        assert_eq!(total, Decimal::from(750));
        assert_eq!(store.total_quantity(), 847);
    }

    #[test]
    fn order_applies_promotions_and_itemises_discounts() {
        let half = Arc::new(Promotion::second_half_price("Second Half price!").expect("ok"));
        let product = Product::stocked("MacBook Air M2", Decimal::from(10), 10)
            .expect("valid")
            .with_promotion(half);
        let id = product.id().clone();
        let mut store = Store::new(vec![product]);

        let receipt = store.place_order([(id, 4)]).expect("order should succeed");

        assert_eq!(receipt.lines.len(), 1);
        assert_eq!(receipt.subtotal, Decimal::from(40));
        assert_eq!(receipt.discount_total, Decimal::from(10));
        assert_eq!(receipt.total, Decimal::from(30));
        assert_eq!(receipt.lines[0].promotion.as_deref(), Some("Second Half price!"));
    }

    #[test]
    fn all_or_nothing_policy_rolls_back_on_failure() {
        let (mut store, ids) = demo_store();
        assert_eq!(store.policy(), OrderPolicy::AllOrNothing);

        let error = store
            .order([(ids[0].clone(), 2), (ids[3].clone(), 2)])
            .expect_err("shipping is capped at one per order");

        assert!(matches!(error, DomainError::OrderLimitExceeded { .. }));
        assert_eq!(store.get(&ids[0]).map(Product::quantity), Some(Quantity::Finite(100)));
        assert_eq!(store.total_quantity(), 850);
    }

    #[test]
    fn overflowing_order_is_rejected_without_changing_stock() {
        let gold = Product::stocked("Gold", Decimal::MAX, 10).expect("valid");
        let gold_id = gold.id().clone();
        let plain = widget(5);
        let plain_id = plain.id().clone();
        let mut store = Store::new(vec![plain, gold]);

        let error = store
            .order([(plain_id.clone(), 2), (gold_id.clone(), 2)])
            .expect_err("charge does not fit");

        assert_eq!(error, DomainError::AmountOverflow { product: "Gold".to_owned() });
        assert_eq!(store.get(&gold_id).map(Product::quantity), Some(Quantity::Finite(10)));
        assert_eq!(store.get(&plain_id).map(Product::quantity), Some(Quantity::Finite(5)));
    }

    #[test]
    fn order_subtotal_overflow_stops_before_the_offending_line() {
        let gold = Product::stocked("Gold", Decimal::MAX, 10).expect("valid");
        let gold_id = gold.id().clone();
        let mut store = Store::new(vec![gold]).with_policy(OrderPolicy::BestEffort);

        let error = store
            .order([(gold_id.clone(), 1), (gold_id.clone(), 1)])
            .expect_err("order subtotal does not fit");

        assert!(matches!(error, DomainError::AmountOverflow { .. }));
        assert_eq!(store.get(&gold_id).map(Product::quantity), Some(Quantity::Finite(9)));
    }

    #[test]
    fn best_effort_policy_keeps_lines_before_failure() {
        let (store, ids) = demo_store();
        let mut store = store.with_policy(OrderPolicy::BestEffort);

        let error = store
            .order([(ids[0].clone(), 2), (ids[1].clone(), 501)])
            .expect_err("not enough earbuds");

        assert!(matches!(
            error,
            DomainError::InsufficientStock { requested: 501, available: 500, .. }
        ));
        assert_eq!(store.get(&ids[0]).map(Product::quantity), Some(Quantity::Finite(98)));
        assert_eq!(store.get(&ids[1]).map(Product::quantity), Some(Quantity::Finite(500)));
    }

    #[test]
    fn sold_out_product_is_skipped_by_later_lines() {
        let product = widget(2);
        let id = product.id().clone();
        let mut store = Store::new(vec![product]);

        let total = store.order([(id.clone(), 2), (id, 1)]).expect("second line is skipped");

        assert_eq!(total, Decimal::from(20));
        assert!(store.is_empty());
    }

    #[test]
    fn unlimited_product_stays_after_large_order() {
        let (mut store, ids) = demo_store();

        let total = store.order([(ids[2].clone(), 1000)]).expect("no stock check");

        assert_eq!(total, Decimal::from(125_000));
        assert!(store.contains(&ids[2]));
    }

    #[test]
    fn add_and_remove_products() {
        let mut store = Store::default();
        let product = widget(1);
        let id = product.id().clone();

        store.add_product(product.clone()).expect("first add");
        let duplicate = store.add_product(product).expect_err("same id");
        assert_eq!(duplicate, DomainError::DuplicateProduct(id.to_string()));

        let removed = store.remove_product(&id).expect("present");
        assert_eq!(removed.name(), "Widget");

        let missing = store.remove_product(&id).expect_err("already removed");
        assert_eq!(missing, DomainError::NotFound(id.to_string()));
    }

    #[test]
    fn sorted_by_price_lists_cheapest_first() {
        let (store, _) = demo_store();

        let names: Vec<&str> = store.sorted_by_price().iter().map(|p| p.name()).collect();

        assert_eq!(
            names,
            ["Shipping", "Windows License", "Bose QuietComfort Earbuds", "MacBook Air M2"]
        );
    }

    #[test]
    fn adding_stores_unions_their_products() {
        let shared = widget(3);
        let service = Product::unlimited("Service", Decimal::ONE).expect("valid");
        let left = Store::new(vec![shared.clone(), service]);
        let right = Store::new(vec![shared, widget(4)]);

        let combined = left + right;

        assert_eq!(combined.len(), 3);
        assert_eq!(combined.total_quantity(), 7);
    }
}
