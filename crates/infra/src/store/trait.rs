use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use storefront_catalog::{Product, ProductId};
use storefront_orders::{NewOrder, PlacedOrder, PricedLine};
use storefront_parties::{CustomerId, ShipperId};

/// Store operation error for the read/check paths.
///
/// These are **infrastructure errors** (connectivity, pool exhaustion, row
/// decoding) as opposed to domain outcomes like a missing product, which the
/// operations report through their return types.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage failure: {0}")]
    Storage(String),
}

impl StoreError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

/// Order ledger commit error.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A conditional decrement matched no row: a concurrent purchase consumed
    /// the stock between validation and commit. The whole unit of work was
    /// rolled back. `available` is the stock observed inside the failing
    /// transaction.
    #[error("stock conflict on product {product_id}: requested {requested}, available {available}")]
    StockConflict {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// Underlying store failure; the unit of work was rolled back.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl LedgerError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

/// Read and decrement access to the product catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetch a product by id. `None` if absent.
    async fn get_product(&self, product_id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Atomically decrement stock by `amount` only if the result stays
    /// non-negative. Returns whether the decrement was applied (`false`
    /// covers both insufficient stock and a missing product).
    ///
    /// This is the single mutation path for `stock_quantity`; the store must
    /// evaluate the check and the write as one atomic step at the row level.
    async fn conditional_decrement_stock(
        &self,
        product_id: ProductId,
        amount: i64,
    ) -> Result<bool, StoreError>;
}

/// Existence checks against the customer/shipper directory.
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    async fn customer_exists(&self, customer_id: CustomerId) -> Result<bool, StoreError>;

    async fn shipper_exists(&self, shipper_id: ShipperId) -> Result<bool, StoreError>;
}

/// The append-only order ledger.
#[async_trait]
pub trait OrderLedger: Send + Sync {
    /// Persist the order, its lines and the stock decrements in one atomic
    /// unit of work.
    ///
    /// Implementations must:
    /// - apply one conditional decrement per product, in ascending product id
    ///   order across all callers (see [`decrement_plan`])
    /// - abort the whole unit of work with [`LedgerError::StockConflict`] if
    ///   any decrement matches no row
    /// - make no partial state observable on any failure
    async fn insert_order_with_lines(
        &self,
        order: NewOrder,
        lines: Vec<PricedLine>,
    ) -> Result<PlacedOrder, LedgerError>;
}

/// Collapse priced lines into the per-product decrement plan.
///
/// Quantities for repeated products are summed, and the plan is ordered by
/// ascending product id. All ledger implementations lock/decrement in this
/// order, so purchases touching overlapping product sets cannot deadlock
/// under a two-phase-locking storage engine.
pub fn decrement_plan(lines: &[PricedLine]) -> Vec<(ProductId, i64)> {
    let mut plan: BTreeMap<ProductId, i64> = BTreeMap::new();
    for line in lines {
        *plan.entry(line.product_id).or_insert(0) += line.quantity;
    }
    plan.into_iter().collect()
}

#[async_trait]
impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    async fn get_product(&self, product_id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).get_product(product_id).await
    }

    async fn conditional_decrement_stock(
        &self,
        product_id: ProductId,
        amount: i64,
    ) -> Result<bool, StoreError> {
        (**self).conditional_decrement_stock(product_id, amount).await
    }
}

#[async_trait]
impl<S> CustomerDirectory for Arc<S>
where
    S: CustomerDirectory + ?Sized,
{
    async fn customer_exists(&self, customer_id: CustomerId) -> Result<bool, StoreError> {
        (**self).customer_exists(customer_id).await
    }

    async fn shipper_exists(&self, shipper_id: ShipperId) -> Result<bool, StoreError> {
        (**self).shipper_exists(shipper_id).await
    }
}

#[async_trait]
impl<S> OrderLedger for Arc<S>
where
    S: OrderLedger + ?Sized,
{
    async fn insert_order_with_lines(
        &self,
        order: NewOrder,
        lines: Vec<PricedLine>,
    ) -> Result<PlacedOrder, LedgerError> {
        (**self).insert_order_with_lines(order, lines).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: i64, quantity: i64) -> PricedLine {
        PricedLine {
            product_id: ProductId::new(product_id),
            quantity,
            unit_price_at_purchase: 100,
        }
    }

    #[test]
    fn plan_is_sorted_by_product_id() {
        let plan = decrement_plan(&[line(9, 1), line(2, 4), line(5, 2)]);
        assert_eq!(
            plan,
            vec![
                (ProductId::new(2), 4),
                (ProductId::new(5), 2),
                (ProductId::new(9), 1),
            ]
        );
    }

    #[test]
    fn repeated_products_are_summed() {
        let plan = decrement_plan(&[line(3, 2), line(3, 5)]);
        assert_eq!(plan, vec![(ProductId::new(3), 7)]);
    }
}
