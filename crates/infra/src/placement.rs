//! Order placement orchestration.
//!
//! ## Placement flow
//!
//! ```text
//! PurchaseRequest
//!   ↓
//! 1. Shape validation (no IO; empty/zero-quantity requests stop here)
//!   ↓
//! 2. Existence checks (customer, optional shipper)
//!   ↓
//! 3. Fetch + price every line (live catalog price, availability pre-check)
//!   ↓
//! 4. Atomic commit via the ledger (insert order + lines, conditional
//!    stock decrements — all in one unit of work)
//! ```
//!
//! Steps 1–3 never mutate anything, so a failure on the last line of a
//! request leaves no trace of the earlier lines. Step 4 is all-or-nothing:
//! the ledger either commits the complete order or rolls back, and a stock
//! conflict detected there (a concurrent purchase winning the race between
//! step 3 and step 4) surfaces as the same `InsufficientStock` failure the
//! pre-check produces — callers cannot tell how late the race was lost, and
//! retrying simply re-validates current stock.
//!
//! The engine holds no state of its own and is safe to share across tasks;
//! every invocation is independent.

use tracing::{info, instrument};
use uuid::Uuid;

use storefront_orders::{NewOrder, PlaceOrderError, PlacedOrder, PricedLine, PurchaseRequest};

use crate::store::{CatalogStore, CustomerDirectory, LedgerError, OrderLedger, StoreError};

impl From<StoreError> for PlaceOrderError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Storage(msg) => Self::Persistence(msg),
        }
    }
}

impl From<LedgerError> for PlaceOrderError {
    fn from(value: LedgerError) -> Self {
        match value {
            LedgerError::StockConflict {
                product_id,
                requested,
                available,
            } => Self::InsufficientStock {
                product_id,
                requested,
                available,
            },
            LedgerError::Storage(msg) => Self::Persistence(msg),
        }
    }
}

/// Turns one purchase request into one committed order, or fails with no
/// observable effects.
///
/// Generic over the three store seams so tests and dev setups can run the
/// whole flow against [`crate::store::InMemoryStore`] while production wires
/// in [`crate::store::PostgresStore`] for all three.
#[derive(Debug, Clone)]
pub struct OrderPlacementEngine<C, D, L> {
    catalog: C,
    directory: D,
    ledger: L,
}

impl<C, D, L> OrderPlacementEngine<C, D, L>
where
    C: CatalogStore,
    D: CustomerDirectory,
    L: OrderLedger,
{
    pub fn new(catalog: C, directory: D, ledger: L) -> Self {
        Self {
            catalog,
            directory,
            ledger,
        }
    }

    /// Place an order for the given request.
    ///
    /// On success exactly one order, one line per requested line, and one
    /// stock decrement per product have been committed. On failure nothing
    /// has: every error is all-or-nothing.
    #[instrument(
        skip(self, request),
        fields(
            request_id = %Uuid::now_v7(),
            customer_id = %request.customer_id,
            line_count = request.lines.len(),
        ),
        err
    )]
    pub async fn place_order(
        &self,
        request: PurchaseRequest,
    ) -> Result<PlacedOrder, PlaceOrderError> {
        request.validate()?;

        if !self.directory.customer_exists(request.customer_id).await? {
            return Err(PlaceOrderError::CustomerNotFound(request.customer_id));
        }
        if let Some(shipper_id) = request.shipper_id {
            if !self.directory.shipper_exists(shipper_id).await? {
                return Err(PlaceOrderError::ShipperNotFound(shipper_id));
            }
        }

        // Validate and price all lines, in caller order, before any mutation.
        let mut priced = Vec::with_capacity(request.lines.len());
        for line in &request.lines {
            let product = self
                .catalog
                .get_product(line.product_id)
                .await?
                .ok_or(PlaceOrderError::ProductNotFound(line.product_id))?;
            priced.push(PricedLine::for_product(&product, line.quantity)?);
        }

        let order = NewOrder {
            customer_id: request.customer_id,
            shipper_id: request.shipper_id,
            order_date: chrono::Utc::now(),
        };
        let placed = self.ledger.insert_order_with_lines(order, priced).await?;

        info!(
            order_id = %placed.order.id,
            total_amount = placed.total_amount(),
            "order placed"
        );
        Ok(placed)
    }
}
