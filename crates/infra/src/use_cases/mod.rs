//! Command use cases (application-level orchestration).
//!
//! Every command follows the same pipeline:
//!
//! ```text
//! Request
//!   ↓
//! 1. Load the product (or create it)
//!   ↓
//! 2. Call the domain method (pure, uses the clock's `now`)
//!   ↓
//! 3. Build one Plan: the dirty-field write, then one outbox insert per event
//!   ↓
//! 4. AtomicWriter::apply(plan)
//! ```
//!
//! A command that changes nothing builds an empty plan and touches no storage.
//! If any event fails to serialize the command fails before the plan is
//! applied, so an aggregate write is never committed without its events.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use catalog_core::{AggregateRoot, Clock, DomainError};
use catalog_events::{OutboxError, OutboxRecord};
use catalog_products::{Product, ProductEvent, ProductId};

use crate::commit::{AtomicWriter, CommitError, Operation, Plan};
use crate::product_store::{EventSink, ProductStore, StoreError};

pub mod activate_product;
pub mod apply_discount;
pub mod archive_product;
pub mod create_product;
pub mod deactivate_product;
pub mod remove_discount;
pub mod update_product;

pub use activate_product::{ActivateProductHandler, ActivateProductRequest, ActivateProductResponse};
pub use apply_discount::{ApplyDiscountHandler, ApplyDiscountRequest, ApplyDiscountResponse};
pub use archive_product::{ArchiveProductHandler, ArchiveProductRequest, ArchiveProductResponse};
pub use create_product::{CreateProductHandler, CreateProductRequest, CreateProductResponse};
pub use deactivate_product::{
    DeactivateProductHandler, DeactivateProductRequest, DeactivateProductResponse,
};
pub use remove_discount::{RemoveDiscountHandler, RemoveDiscountRequest, RemoveDiscountResponse};
pub use update_product::{UpdateProductHandler, UpdateProductRequest, UpdateProductResponse};

/// Error returned by use cases and queries.
///
/// Domain failures pass through untouched; infrastructure failures keep their
/// own type so the boundary can tell them apart.
#[derive(Debug, Error)]
pub enum UseCaseError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(StoreError),

    #[error(transparent)]
    Commit(#[from] CommitError),

    #[error(transparent)]
    Outbox(#[from] OutboxError),
}

impl From<StoreError> for UseCaseError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(_) => UseCaseError::Domain(DomainError::ProductNotFound),
            other => UseCaseError::Store(other),
        }
    }
}

impl UseCaseError {
    /// Stable, machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            UseCaseError::Domain(e) => e.code(),
            UseCaseError::Store(_) => "storage_error",
            UseCaseError::Commit(
                CommitError::DuplicateProduct(_)
                | CommitError::MissingProduct(_)
                | CommitError::DuplicateEvent(_),
            ) => "conflict",
            UseCaseError::Commit(_) => "commit_failed",
            UseCaseError::Outbox(_) => "event_serialization_failed",
        }
    }

    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            UseCaseError::Domain(e) => Some(e),
            _ => None,
        }
    }
}

/// Ports shared by every command handler.
#[derive(Clone)]
pub struct UseCaseContext {
    products: Arc<dyn ProductStore>,
    outbox: Arc<dyn EventSink>,
    writer: Arc<dyn AtomicWriter>,
    clock: Arc<dyn Clock>,
}

impl UseCaseContext {
    pub fn new(
        products: Arc<dyn ProductStore>,
        outbox: Arc<dyn EventSink>,
        writer: Arc<dyn AtomicWriter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            products,
            outbox,
            writer,
            clock,
        }
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) async fn load(&self, id: ProductId) -> Result<Product, UseCaseError> {
        Ok(self.products.load(id).await?)
    }

    pub(crate) fn insert_op(&self, product: &Product) -> Operation {
        self.products.build_insert(product)
    }

    /// Commit the product's dirty fields together with its pending events.
    pub(crate) async fn save(
        &self,
        product: &mut Product,
        now: DateTime<Utc>,
    ) -> Result<usize, UseCaseError> {
        let write = self.products.build_upsert(product);
        let events = product.take_events();
        self.commit(write, events, now).await
    }

    /// Build the plan and apply it. Returns the number of outbox records written.
    pub(crate) async fn commit(
        &self,
        write: Option<Operation>,
        events: Vec<ProductEvent>,
        now: DateTime<Utc>,
    ) -> Result<usize, UseCaseError> {
        let mut plan = Plan::new();
        plan.extend(write);
        for event in &events {
            let record = OutboxRecord::from_event(event, now)?;
            plan.push(self.outbox.build_insert(record));
        }

        if plan.is_empty() {
            debug!("nothing changed; skipping commit");
            return Ok(0);
        }

        self.writer.apply(plan).await?;
        Ok(events.len())
    }
}

impl core::fmt::Debug for UseCaseContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UseCaseContext").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_product_maps_to_domain_not_found() {
        let err = UseCaseError::from(StoreError::NotFound(ProductId::generate()));
        assert_eq!(err.domain(), Some(&DomainError::ProductNotFound));
        assert_eq!(err.code(), "product_not_found");
    }

    #[test]
    fn infrastructure_errors_keep_their_type() {
        let err = UseCaseError::from(StoreError::Decode("bad row".to_string()));
        assert!(matches!(err, UseCaseError::Store(_)));
        assert_eq!(err.code(), "storage_error");

        let err = UseCaseError::from(CommitError::DuplicateProduct(ProductId::generate()));
        assert_eq!(err.code(), "conflict");

        let err = UseCaseError::from(CommitError::Backend {
            operation: "apply",
            message: "connection reset".to_string(),
        });
        assert_eq!(err.code(), "commit_failed");
        assert!(err.domain().is_none());
    }

    #[test]
    fn domain_errors_pass_through() {
        let err = UseCaseError::from(DomainError::ProductNotActive);
        assert_eq!(err.code(), "product_not_active");
        assert_eq!(err.to_string(), "product is not active");
    }
}
