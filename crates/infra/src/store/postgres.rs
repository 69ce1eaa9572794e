//! Postgres-backed store implementation.
//!
//! Implements all three placement seams on one connection pool. The oversell
//! guard lives in the SQL itself: stock is only ever reduced through
//!
//! ```sql
//! UPDATE products
//!    SET stock_quantity = stock_quantity - $2
//!  WHERE id = $1 AND stock_quantity >= $2
//! ```
//!
//! which the database evaluates atomically at the row level. A zero row count
//! means a concurrent purchase won the race; the surrounding transaction is
//! rolled back and nothing of the order remains.
//!
//! ## Expected schema
//!
//! ```sql
//! CREATE TABLE products (
//!     id             BIGSERIAL PRIMARY KEY,
//!     name           TEXT NOT NULL,
//!     unit_price     BIGINT NOT NULL CHECK (unit_price >= 0),
//!     stock_quantity BIGINT NOT NULL CHECK (stock_quantity >= 0)
//! );
//!
//! CREATE TABLE customers (
//!     id           BIGSERIAL PRIMARY KEY,
//!     name         TEXT NOT NULL,
//!     contact_name TEXT,
//!     country      TEXT
//! );
//!
//! CREATE TABLE shippers (
//!     id           BIGSERIAL PRIMARY KEY,
//!     name         TEXT NOT NULL,
//!     shipper_code TEXT
//! );
//!
//! CREATE TABLE orders (
//!     id          BIGSERIAL PRIMARY KEY,
//!     customer_id BIGINT NOT NULL REFERENCES customers (id),
//!     shipper_id  BIGINT REFERENCES shippers (id),
//!     order_date  TIMESTAMPTZ NOT NULL,
//!     status      TEXT NOT NULL DEFAULT 'placed'
//! );
//!
//! CREATE TABLE order_lines (
//!     id         BIGSERIAL PRIMARY KEY,
//!     order_id   BIGINT NOT NULL REFERENCES orders (id),
//!     product_id BIGINT NOT NULL REFERENCES products (id),
//!     quantity   BIGINT NOT NULL CHECK (quantity > 0),
//!     unit_price BIGINT NOT NULL
//! );
//! ```
//!
//! The conditional update does not rely on the `CHECK (stock_quantity >= 0)`
//! constraint; a check violation here is reported as a storage failure, not a
//! stock conflict.
//!
//! ## Thread safety
//!
//! `PostgresStore` is `Send + Sync` and can be shared across tasks. All
//! operations go through the SQLx connection pool.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::instrument;

use storefront_catalog::{Product, ProductId};
use storefront_orders::{
    NewOrder, Order, OrderId, OrderLine, OrderLineId, OrderStatus, PlacedOrder, PricedLine,
};
use storefront_parties::{CustomerId, ShipperId};

use super::r#trait::{
    CatalogStore, CustomerDirectory, LedgerError, OrderLedger, StoreError, decrement_plan,
};

/// Postgres-backed store for catalog, directory and ledger access.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Render a SQLx error for the `{operation}` that hit it.
///
/// All variants collapse into a storage-failure string: the caller only needs
/// to know the unit of work did not commit and a retry is safe. Stock
/// conflicts never travel this path — they are detected via row counts, not
/// errors.
fn describe_sqlx_error(operation: &str, e: sqlx::Error) -> String {
    match &e {
        sqlx::Error::Database(db) => {
            let code = db.code().map(|c| c.into_owned()).unwrap_or_default();
            format!("{operation}: database error (code {code}): {db}")
        }
        sqlx::Error::PoolClosed => format!("{operation}: connection pool closed"),
        sqlx::Error::RowNotFound => format!("{operation}: expected row missing"),
        _ => format!("{operation}: {e}"),
    }
}

fn map_store_error(operation: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| StoreError::storage(describe_sqlx_error(operation, e))
}

fn map_ledger_error(operation: &'static str) -> impl FnOnce(sqlx::Error) -> LedgerError {
    move |e| LedgerError::storage(describe_sqlx_error(operation, e))
}

pub(crate) fn product_from_row(row: &sqlx::postgres::PgRow) -> Result<Product, StoreError> {
    let id: i64 = row.get("id");
    let name: String = row.get("name");
    let unit_price: i64 = row.get("unit_price");
    let stock_quantity: i64 = row.get("stock_quantity");

    let unit_price = u64::try_from(unit_price)
        .map_err(|_| StoreError::storage(format!("product {id}: negative unit_price")))?;
    Product::new(ProductId::new(id), name, unit_price, stock_quantity)
        .map_err(|e| StoreError::storage(format!("product {id}: {e}")))
}

pub(crate) fn status_from_str(order_id: i64, status: &str) -> Result<OrderStatus, StoreError> {
    match status {
        "placed" => Ok(OrderStatus::Placed),
        other => Err(StoreError::storage(format!(
            "order {order_id}: unknown status '{other}'"
        ))),
    }
}

#[async_trait]
impl CatalogStore for PostgresStore {
    #[instrument(skip(self), fields(product_id = %product_id), err)]
    async fn get_product(&self, product_id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, unit_price, stock_quantity
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(product_id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(map_store_error("get_product"))?;

        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self), fields(product_id = %product_id, amount), err)]
    async fn conditional_decrement_stock(
        &self,
        product_id: ProductId,
        amount: i64,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity - $2
            WHERE id = $1 AND stock_quantity >= $2
            "#,
        )
        .bind(product_id.get())
        .bind(amount)
        .execute(&*self.pool)
        .await
        .map_err(map_store_error("conditional_decrement_stock"))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CustomerDirectory for PostgresStore {
    #[instrument(skip(self), fields(customer_id = %customer_id), err)]
    async fn customer_exists(&self, customer_id: CustomerId) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT 1 FROM customers WHERE id = $1")
            .bind(customer_id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(map_store_error("customer_exists"))?;
        Ok(row.is_some())
    }

    #[instrument(skip(self), fields(shipper_id = %shipper_id), err)]
    async fn shipper_exists(&self, shipper_id: ShipperId) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT 1 FROM shippers WHERE id = $1")
            .bind(shipper_id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(map_store_error("shipper_exists"))?;
        Ok(row.is_some())
    }
}

impl PostgresStore {
    /// Apply one conditional decrement inside `tx`, reporting the observed
    /// stock if the row count comes back zero.
    async fn decrement_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<(), LedgerError> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity - $2
            WHERE id = $1 AND stock_quantity >= $2
            "#,
        )
        .bind(product_id.get())
        .bind(quantity)
        .execute(&mut **tx)
        .await
        .map_err(map_ledger_error("decrement stock"))?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        // Re-read inside the failing transaction so the error carries the
        // last-known-available quantity.
        let available: Option<i64> =
            sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = $1")
                .bind(product_id.get())
                .fetch_optional(&mut **tx)
                .await
                .map_err(map_ledger_error("read stock after conflict"))?;

        match available {
            Some(available) => Err(LedgerError::StockConflict {
                product_id,
                requested: quantity,
                available,
            }),
            None => Err(LedgerError::storage(format!(
                "product {product_id} missing at commit"
            ))),
        }
    }
}

#[async_trait]
impl OrderLedger for PostgresStore {
    #[instrument(
        skip(self, order, lines),
        fields(customer_id = %order.customer_id, line_count = lines.len()),
        err
    )]
    async fn insert_order_with_lines(
        &self,
        order: NewOrder,
        lines: Vec<PricedLine>,
    ) -> Result<PlacedOrder, LedgerError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(map_ledger_error("begin transaction"))?;

        // Decrement in ascending product id order across all callers; a
        // transaction that fails here is dropped and rolls back.
        for (product_id, quantity) in decrement_plan(&lines) {
            Self::decrement_in_tx(&mut tx, product_id, quantity).await?;
        }

        let order_row = sqlx::query(
            r#"
            INSERT INTO orders (customer_id, shipper_id, order_date, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(order.customer_id.get())
        .bind(order.shipper_id.map(|s| s.get()))
        .bind(order.order_date)
        .bind(OrderStatus::Placed.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_ledger_error("insert order"))?;
        let order_id = OrderId::new(order_row.get::<i64, _>("id"));

        let mut committed = Vec::with_capacity(lines.len());
        for line in &lines {
            let line_row = sqlx::query(
                r#"
                INSERT INTO order_lines (order_id, product_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4)
                RETURNING id
                "#,
            )
            .bind(order_id.get())
            .bind(line.product_id.get())
            .bind(line.quantity)
            .bind(line.unit_price_at_purchase as i64)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_ledger_error("insert order line"))?;

            committed.push(OrderLine {
                id: OrderLineId::new(line_row.get::<i64, _>("id")),
                order_id,
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price_at_purchase: line.unit_price_at_purchase,
            });
        }

        tx.commit()
            .await
            .map_err(map_ledger_error("commit transaction"))?;

        Ok(PlacedOrder {
            order: Order {
                id: order_id,
                customer_id: order.customer_id,
                shipper_id: order.shipper_id,
                order_date: order.order_date,
                status: OrderStatus::Placed,
            },
            lines: committed,
        })
    }
}
