//! Orders domain: purchase requests, placed orders and their failure modes.
//!
//! The types here are pure — pricing and validation against already-fetched
//! products, no IO. Orchestration and persistence live in `storefront-infra`.

pub mod error;
pub mod order;
pub mod request;

pub use error::PlaceOrderError;
pub use order::{NewOrder, Order, OrderId, OrderLine, OrderLineId, OrderStatus, PlacedOrder, PricedLine};
pub use request::{PurchaseRequest, RequestedLine};
