use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_catalog::{Product, ProductId};
use storefront_core::{Entity, id_newtype};
use storefront_parties::{CustomerId, ShipperId};

use crate::error::PlaceOrderError;

/// Order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(i64);

id_newtype!(OrderId, "OrderId");

/// Order line identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderLineId(i64);

id_newtype!(OrderLineId, "OrderLineId");

/// Order status. Placement knows a single state; a richer lifecycle
/// (fulfilled, cancelled, ...) would be layered on separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Placed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "placed",
        }
    }
}

/// A persisted order header. Immutable once placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub shipper_id: Option<ShipperId>,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A persisted order line.
///
/// `unit_price_at_purchase` is the catalog price captured when the order was
/// placed; later price changes never rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price_at_purchase: u64,
}

/// An order header ready for insertion (no id yet; the ledger assigns one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub shipper_id: Option<ShipperId>,
    pub order_date: DateTime<Utc>,
}

/// A validated, priced line awaiting the atomic commit.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: ProductId,
    pub quantity: i64,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price_at_purchase: u64,
}

impl PricedLine {
    /// Price one requested line against the product as currently fetched.
    ///
    /// Captures the live unit price and pre-checks availability. The check is
    /// advisory — the conditional decrement re-verifies at commit time.
    pub fn for_product(product: &Product, quantity: i64) -> Result<Self, PlaceOrderError> {
        if quantity <= 0 {
            return Err(PlaceOrderError::validation(format!(
                "quantity for product {} must be positive",
                product.id_typed()
            )));
        }
        if quantity > product.stock_quantity() {
            return Err(PlaceOrderError::insufficient_stock(
                product.id_typed(),
                quantity,
                product.stock_quantity(),
            ));
        }
        Ok(Self {
            product_id: product.id_typed(),
            quantity,
            unit_price_at_purchase: product.unit_price(),
        })
    }
}

/// The fully-committed result of a placement: the order header plus its lines
/// exactly as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

impl PlacedOrder {
    /// Order total in smallest currency unit.
    pub fn total_amount(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| line.unit_price_at_purchase * line.quantity as u64)
            .sum()
    }
}
