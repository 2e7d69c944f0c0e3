//! Commit plans and the atomic writer that applies them.
//!
//! A use case never writes directly. It describes its writes as an ordered
//! [`Plan`] of backend-neutral [`Operation`]s (one aggregate write plus one
//! outbox insert per event) and hands the plan to an [`AtomicWriter`], which
//! applies every operation or none of them.

use thiserror::Error;

use catalog_events::OutboxRecord;
use catalog_products::{ChangeTracker, ProductId, ProductSnapshot};

/// A single storage mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Insert a full product row. Fails if the id already exists.
    InsertProduct(ProductSnapshot),
    /// Overwrite the `changes` columns (plus `updated_at`) of an existing row.
    UpdateProduct {
        snapshot: ProductSnapshot,
        changes: ChangeTracker,
    },
    /// Append a pending outbox record.
    InsertOutbox(OutboxRecord),
}

impl Operation {
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::InsertProduct(_) => "insert_product",
            Operation::UpdateProduct { .. } => "update_product",
            Operation::InsertOutbox(_) => "insert_outbox",
        }
    }
}

/// Ordered list of operations to be applied as one unit.
///
/// Building a plan has no side effects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    operations: Vec<Operation>,
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn into_operations(self) -> Vec<Operation> {
        self.operations
    }
}

impl Extend<Operation> for Plan {
    fn extend<I: IntoIterator<Item = Operation>>(&mut self, iter: I) {
        self.operations.extend(iter);
    }
}

impl FromIterator<Operation> for Plan {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self {
            operations: iter.into_iter().collect(),
        }
    }
}

/// Failure applying a plan. Nothing from the plan is visible when this is returned.
#[derive(Debug, Error)]
pub enum CommitError {
    #[error("product {0} already exists")]
    DuplicateProduct(ProductId),

    #[error("product {0} does not exist")]
    MissingProduct(ProductId),

    #[error("outbox event {0} already recorded")]
    DuplicateEvent(uuid::Uuid),

    #[error("cannot encode {operation}: {message}")]
    Encode {
        operation: &'static str,
        message: String,
    },

    #[error("storage error in {operation}: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },
}

/// Applies a [`Plan`] all-or-nothing.
#[async_trait::async_trait]
pub trait AtomicWriter: Send + Sync {
    /// Apply every operation in order as one unit. An empty plan succeeds
    /// without touching storage.
    async fn apply(&self, plan: Plan) -> Result<(), CommitError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::Money;
    use catalog_products::{Field, Product};
    use chrono::{TimeZone, Utc};

    fn snapshot() -> ProductSnapshot {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Product::create(
            ProductId::generate(),
            "Mug",
            "Stoneware mug",
            "kitchen",
            Money::from_minor_units(1200),
            now,
        )
        .unwrap()
        .snapshot()
    }

    #[test]
    fn plan_preserves_order() {
        let s = snapshot();
        let mut plan = Plan::new();
        assert!(plan.is_empty());

        plan.push(Operation::InsertProduct(s.clone()));
        plan.extend([Operation::UpdateProduct {
            snapshot: s,
            changes: [Field::Name].into_iter().collect(),
        }]);

        assert_eq!(plan.len(), 2);
        let kinds: Vec<_> = plan.operations().iter().map(Operation::kind).collect();
        assert_eq!(kinds, vec!["insert_product", "update_product"]);
        assert_eq!(plan.into_operations().len(), 2);
    }
}
