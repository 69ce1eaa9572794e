//! Thin order read seam: fetch by id and by customer.
//!
//! No invariant-preserving logic lives here — these are the lookup paths the
//! storefront uses to show order history. The analytical reporting queries
//! are owned by a separate service and are not part of this crate.

use async_trait::async_trait;
use sqlx::Row;

use storefront_orders::{Order, OrderId, OrderLine, OrderLineId, PlacedOrder};
use storefront_parties::{CustomerId, ShipperId};

use crate::store::postgres::status_from_str;
use crate::store::{InMemoryStore, PostgresStore, StoreError};

/// Read access to committed orders.
#[async_trait]
pub trait OrderReadModel: Send + Sync {
    /// Fetch one order with its lines. `None` if absent.
    async fn fetch_order(&self, order_id: OrderId) -> Result<Option<PlacedOrder>, StoreError>;

    /// All orders placed by one customer, oldest first.
    async fn fetch_orders_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<PlacedOrder>, StoreError>;
}

#[async_trait]
impl OrderReadModel for InMemoryStore {
    async fn fetch_order(&self, order_id: OrderId) -> Result<Option<PlacedOrder>, StoreError> {
        Ok(self.fetch_order_sync(order_id))
    }

    async fn fetch_orders_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<PlacedOrder>, StoreError> {
        Ok(self.fetch_orders_by_customer_sync(customer_id))
    }
}

async fn load_lines(pool: &sqlx::PgPool, order_id: OrderId) -> Result<Vec<OrderLine>, StoreError> {
    let rows = sqlx::query(
        r#"
        SELECT id, product_id, quantity, unit_price
        FROM order_lines
        WHERE order_id = $1
        ORDER BY id ASC
        "#,
    )
    .bind(order_id.get())
    .fetch_all(pool)
    .await
    .map_err(|e| StoreError::storage(format!("load order lines: {e}")))?;

    let mut lines = Vec::with_capacity(rows.len());
    for row in rows {
        let unit_price: i64 = row.get("unit_price");
        let unit_price = u64::try_from(unit_price).map_err(|_| {
            StoreError::storage(format!("order {order_id}: negative line unit_price"))
        })?;
        lines.push(OrderLine {
            id: OrderLineId::new(row.get::<i64, _>("id")),
            order_id,
            product_id: storefront_catalog::ProductId::new(row.get::<i64, _>("product_id")),
            quantity: row.get("quantity"),
            unit_price_at_purchase: unit_price,
        });
    }
    Ok(lines)
}

fn order_from_row(row: &sqlx::postgres::PgRow) -> Result<Order, StoreError> {
    let id: i64 = row.get("id");
    let status: String = row.get("status");
    Ok(Order {
        id: OrderId::new(id),
        customer_id: CustomerId::new(row.get::<i64, _>("customer_id")),
        shipper_id: row.get::<Option<i64>, _>("shipper_id").map(ShipperId::new),
        order_date: row.get("order_date"),
        status: status_from_str(id, &status)?,
    })
}

#[async_trait]
impl OrderReadModel for PostgresStore {
    async fn fetch_order(&self, order_id: OrderId) -> Result<Option<PlacedOrder>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, customer_id, shipper_id, order_date, status
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(order_id.get())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| StoreError::storage(format!("fetch order: {e}")))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let order = order_from_row(&row)?;
        let lines = load_lines(self.pool(), order.id).await?;
        Ok(Some(PlacedOrder { order, lines }))
    }

    async fn fetch_orders_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<PlacedOrder>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, customer_id, shipper_id, order_date, status
            FROM orders
            WHERE customer_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(customer_id.get())
        .fetch_all(self.pool())
        .await
        .map_err(|e| StoreError::storage(format!("fetch orders by customer: {e}")))?;

        let mut placed = Vec::with_capacity(rows.len());
        for row in &rows {
            let order = order_from_row(row)?;
            let lines = load_lines(self.pool(), order.id).await?;
            placed.push(PlacedOrder { order, lines });
        }
        Ok(placed)
    }
}
