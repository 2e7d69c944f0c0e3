//! Infrastructure layer: storage backends, atomic commits, use cases, queries
//! and service wiring for the catalog.

pub mod commit;
pub mod config;
pub mod product_store;
pub mod queries;
pub mod services;
pub mod use_cases;

pub use commit::{AtomicWriter, CommitError, Operation, Plan};
pub use config::{CatalogConfig, ConfigError, DatabaseConfig, StorageBackend};
pub use services::CatalogServices;
pub use use_cases::{UseCaseContext, UseCaseError};
