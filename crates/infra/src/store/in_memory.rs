use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use storefront_catalog::{Product, ProductId};
use storefront_orders::{
    NewOrder, Order, OrderLine, OrderLineId, OrderId, OrderStatus, PlacedOrder, PricedLine,
};
use storefront_parties::{Customer, CustomerId, Shipper, ShipperId};

use super::r#trait::{
    CatalogStore, CustomerDirectory, LedgerError, OrderLedger, StoreError, decrement_plan,
};

#[derive(Debug, Default)]
struct State {
    products: HashMap<ProductId, Product>,
    customers: HashMap<CustomerId, Customer>,
    shippers: HashMap<ShipperId, Shipper>,
    orders: Vec<PlacedOrder>,
    next_order_id: i64,
    next_line_id: i64,
}

/// In-memory store implementing all three placement seams.
///
/// Intended for tests/dev. The write-lock scope of [`RwLock`] is the unit of
/// work: a commit either finishes entirely under one guard or returns before
/// mutating anything, so no partial order is ever observable.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or replace a product (administrative path, not the decrement).
    pub fn insert_product(&self, product: Product) {
        let mut state = self.state.write().expect("lock poisoned");
        state.products.insert(product.id_typed(), product);
    }

    pub fn insert_customer(&self, customer: Customer) {
        let mut state = self.state.write().expect("lock poisoned");
        state.customers.insert(customer.id_typed(), customer);
    }

    pub fn insert_shipper(&self, shipper: Shipper) {
        let mut state = self.state.write().expect("lock poisoned");
        state.shippers.insert(shipper.id_typed(), shipper);
    }

    /// Snapshot of a product's current state.
    pub fn product(&self, product_id: ProductId) -> Option<Product> {
        let state = self.state.read().expect("lock poisoned");
        state.products.get(&product_id).cloned()
    }

    pub fn order_count(&self) -> usize {
        let state = self.state.read().expect("lock poisoned");
        state.orders.len()
    }

    pub(crate) fn fetch_order_sync(&self, order_id: OrderId) -> Option<PlacedOrder> {
        let state = self.state.read().expect("lock poisoned");
        state
            .orders
            .iter()
            .find(|placed| placed.order.id == order_id)
            .cloned()
    }

    pub(crate) fn fetch_orders_by_customer_sync(&self, customer_id: CustomerId) -> Vec<PlacedOrder> {
        let state = self.state.read().expect("lock poisoned");
        state
            .orders
            .iter()
            .filter(|placed| placed.order.customer_id == customer_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn get_product(&self, product_id: ProductId) -> Result<Option<Product>, StoreError> {
        let state = self
            .state
            .read()
            .map_err(|_| StoreError::storage("lock poisoned"))?;
        Ok(state.products.get(&product_id).cloned())
    }

    async fn conditional_decrement_stock(
        &self,
        product_id: ProductId,
        amount: i64,
    ) -> Result<bool, StoreError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| StoreError::storage("lock poisoned"))?;
        Ok(state
            .products
            .get_mut(&product_id)
            .is_some_and(|product| product.apply_decrement(amount)))
    }
}

#[async_trait]
impl CustomerDirectory for InMemoryStore {
    async fn customer_exists(&self, customer_id: CustomerId) -> Result<bool, StoreError> {
        let state = self
            .state
            .read()
            .map_err(|_| StoreError::storage("lock poisoned"))?;
        Ok(state.customers.contains_key(&customer_id))
    }

    async fn shipper_exists(&self, shipper_id: ShipperId) -> Result<bool, StoreError> {
        let state = self
            .state
            .read()
            .map_err(|_| StoreError::storage("lock poisoned"))?;
        Ok(state.shippers.contains_key(&shipper_id))
    }
}

#[async_trait]
impl OrderLedger for InMemoryStore {
    async fn insert_order_with_lines(
        &self,
        order: NewOrder,
        lines: Vec<PricedLine>,
    ) -> Result<PlacedOrder, LedgerError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| LedgerError::storage("lock poisoned"))?;

        // Verify every decrement before applying any. Both passes run under
        // the same write guard, so the check cannot go stale.
        let plan = decrement_plan(&lines);
        for (product_id, quantity) in &plan {
            let Some(product) = state.products.get(product_id) else {
                return Err(LedgerError::storage(format!(
                    "product {product_id} missing at commit"
                )));
            };
            if *quantity > product.stock_quantity() {
                return Err(LedgerError::StockConflict {
                    product_id: *product_id,
                    requested: *quantity,
                    available: product.stock_quantity(),
                });
            }
        }
        for (product_id, quantity) in &plan {
            if let Some(product) = state.products.get_mut(product_id) {
                let applied = product.apply_decrement(*quantity);
                debug_assert!(applied, "verified under the same write guard");
            }
        }

        state.next_order_id += 1;
        let order_id = OrderId::new(state.next_order_id);
        let header = Order {
            id: order_id,
            customer_id: order.customer_id,
            shipper_id: order.shipper_id,
            order_date: order.order_date,
            status: OrderStatus::Placed,
        };

        let mut committed = Vec::with_capacity(lines.len());
        for line in &lines {
            state.next_line_id += 1;
            committed.push(OrderLine {
                id: OrderLineId::new(state.next_line_id),
                order_id,
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price_at_purchase: line.unit_price_at_purchase,
            });
        }

        let placed = PlacedOrder {
            order: header,
            lines: committed,
        };
        state.orders.push(placed.clone());
        Ok(placed)
    }
}
