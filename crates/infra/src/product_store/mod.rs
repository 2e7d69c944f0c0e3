//! Product and outbox storage boundary.
//!
//! The ports here only describe writes (as [`Operation`](crate::commit::Operation)s)
//! and read current state; the [`AtomicWriter`](crate::commit::AtomicWriter)
//! implemented by each backend is what persists them.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryCatalogStore;
pub use postgres::PostgresCatalogStore;
pub use r#trait::{
    EventSink, ProductFilter, ProductReadModel, ProductStore, SnapshotPage, StoreError,
};
