//! Store seams for the placement flow.
//!
//! Three collaborators, one per concern: the catalog (products and the
//! conditional stock decrement), the party directory (existence checks), and
//! the order ledger (the atomic unit of work). Both backends — in-memory and
//! Postgres — implement all three on a single type.

mod r#trait;

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use r#trait::{
    CatalogStore, CustomerDirectory, LedgerError, OrderLedger, StoreError, decrement_plan,
};
