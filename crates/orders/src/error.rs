//! Failure taxonomy for order placement.
//!
//! Every variant is a complete, reportable outcome: the engine never
//! partially commits, so there is no locally-recovered case. The HTTP layer
//! maps these onto user-facing messages and status codes.

use thiserror::Error;

use storefront_catalog::ProductId;
use storefront_core::DomainError;
use storefront_parties::{CustomerId, ShipperId};

/// Why a purchase attempt failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlaceOrderError {
    /// Malformed request (empty line list, non-positive quantity). Rejected
    /// before any store round trip.
    #[error("invalid purchase request: {0}")]
    Validation(String),

    /// The referenced customer does not exist.
    #[error("customer {0} does not exist")]
    CustomerNotFound(CustomerId),

    /// The referenced shipper does not exist.
    #[error("shipper {0} does not exist")]
    ShipperNotFound(ShipperId),

    /// A referenced product does not exist.
    #[error("product {0} does not exist")]
    ProductNotFound(ProductId),

    /// Requested quantity exceeds available stock, detected either during
    /// validation or by the conditional decrement (concurrent purchase won
    /// the race). `available` is the last value observed for the product.
    #[error("product {product_id}: requested {requested}, only {available} left")]
    InsufficientStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// Underlying store failure. Nothing was committed; safe to retry.
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl PlaceOrderError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn insufficient_stock(product_id: ProductId, requested: i64, available: i64) -> Self {
        Self::InsufficientStock {
            product_id,
            requested,
            available,
        }
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Whether the caller may retry the identical request from scratch.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}

impl From<DomainError> for PlaceOrderError {
    fn from(value: DomainError) -> Self {
        Self::Validation(value.to_string())
    }
}
