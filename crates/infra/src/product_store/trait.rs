use thiserror::Error;

use catalog_events::OutboxRecord;
use catalog_products::{Product, ProductId, ProductSnapshot, ProductStatus};

use crate::commit::Operation;

/// Read-side storage error.
///
/// These are **infrastructure errors** (missing rows, undecodable rows,
/// backend failures) as opposed to domain errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("product {0} not found")]
    NotFound(ProductId),

    #[error("failed to decode stored product: {0}")]
    Decode(String),

    #[error("storage error in {operation}: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },
}

/// Write-side access to products.
///
/// `load` reads current state; the `build_*` methods only describe writes.
/// Nothing is persisted until the resulting operations are applied by an
/// [`AtomicWriter`](crate::commit::AtomicWriter).
#[async_trait::async_trait]
pub trait ProductStore: Send + Sync {
    /// Load and reconstruct a product. `StoreError::NotFound` when absent.
    async fn load(&self, id: ProductId) -> Result<Product, StoreError>;

    /// Full-row insert for a newly created product.
    fn build_insert(&self, product: &Product) -> Operation {
        Operation::InsertProduct(product.snapshot())
    }

    /// Partial update covering the product's dirty fields, or `None` when
    /// nothing changed.
    fn build_upsert(&self, product: &Product) -> Option<Operation> {
        let changes = *product.changes();
        if changes.is_empty() {
            return None;
        }
        Some(Operation::UpdateProduct {
            snapshot: product.snapshot(),
            changes,
        })
    }
}

/// Write-side access to the outbox.
pub trait EventSink: Send + Sync {
    fn build_insert(&self, record: OutboxRecord) -> Operation {
        Operation::InsertOutbox(record)
    }
}

/// Filter + pagination for product listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category: Option<String>,
    /// `Inactive` also matches products that were never activated.
    pub status: Option<ProductStatus>,
    /// `0` means no limit.
    pub limit: usize,
    pub offset: usize,
}

impl ProductFilter {
    /// Persisted status strings accepted by the status filter, or `None`
    /// when any status matches.
    ///
    /// A never-activated product is stored as `Unset` but loads as
    /// `Inactive`, so it is listed under `Inactive` too.
    pub fn persisted_statuses(&self) -> Option<Vec<&'static str>> {
        self.status.map(|status| match status {
            ProductStatus::Active => vec![ProductStatus::Active.as_str()],
            ProductStatus::Inactive => vec![
                ProductStatus::Inactive.as_str(),
                ProductStatus::Unset.as_str(),
            ],
            ProductStatus::Unset => vec![ProductStatus::Unset.as_str()],
        })
    }

    pub fn matches(&self, snapshot: &ProductSnapshot) -> bool {
        if let Some(category) = &self.category {
            if &snapshot.category != category {
                return false;
            }
        }
        if let Some(accepted) = self.persisted_statuses() {
            if !accepted.contains(&snapshot.status.as_str()) {
                return false;
            }
        }
        true
    }
}

/// A page of stored products plus the total number matching the filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotPage {
    pub items: Vec<ProductSnapshot>,
    pub total: u64,
}

/// Read-side access used by queries. Bypasses the aggregate write path.
#[async_trait::async_trait]
pub trait ProductReadModel: Send + Sync {
    async fn get_product(&self, id: ProductId) -> Result<Option<ProductSnapshot>, StoreError>;

    /// Newest first (`created_at` descending).
    async fn list_products(&self, filter: &ProductFilter) -> Result<SnapshotPage, StoreError>;
}
