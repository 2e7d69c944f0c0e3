use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use tracing::debug;
use uuid::Uuid;

use catalog_events::OutboxRecord;
use catalog_products::{ChangeTracker, Field, Product, ProductId, ProductSnapshot};

use super::r#trait::{
    EventSink, ProductFilter, ProductReadModel, ProductStore, SnapshotPage, StoreError,
};
use crate::commit::{AtomicWriter, CommitError, Operation, Plan};

#[derive(Debug, Default)]
struct State {
    products: HashMap<ProductId, ProductSnapshot>,
    outbox: Vec<OutboxRecord>,
}

/// In-memory catalog storage implementing every port.
///
/// Intended for tests/dev. A plan is validated in full under the write lock
/// before anything is applied, so readers never observe a partial plan.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    state: RwLock<State>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outbox records in insertion order.
    pub fn outbox(&self) -> Result<Vec<OutboxRecord>, StoreError> {
        Ok(self.read("outbox")?.outbox.clone())
    }

    pub fn product_count(&self) -> Result<usize, StoreError> {
        Ok(self.read("product_count")?.products.len())
    }

    fn read(
        &self,
        operation: &'static str,
    ) -> Result<std::sync::RwLockReadGuard<'_, State>, StoreError> {
        self.state.read().map_err(|_| StoreError::Backend {
            operation,
            message: "lock poisoned".to_string(),
        })
    }

    fn check(state: &State, plan: &Plan) -> Result<(), CommitError> {
        let mut inserted: HashSet<ProductId> = HashSet::new();
        let mut events: HashSet<Uuid> = HashSet::new();

        for op in plan.operations() {
            match op {
                Operation::InsertProduct(snapshot) => {
                    if state.products.contains_key(&snapshot.id) || !inserted.insert(snapshot.id) {
                        return Err(CommitError::DuplicateProduct(snapshot.id));
                    }
                }
                Operation::UpdateProduct { snapshot, .. } => {
                    if !state.products.contains_key(&snapshot.id) && !inserted.contains(&snapshot.id)
                    {
                        return Err(CommitError::MissingProduct(snapshot.id));
                    }
                }
                Operation::InsertOutbox(record) => {
                    let exists = state.outbox.iter().any(|r| r.event_id == record.event_id);
                    if exists || !events.insert(record.event_id) {
                        return Err(CommitError::DuplicateEvent(record.event_id));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Copy the dirty fields (and `updated_at`) of `source` onto `stored`.
fn merge_changes(stored: &mut ProductSnapshot, source: &ProductSnapshot, changes: &ChangeTracker) {
    for field in changes.iter() {
        match field {
            Field::Name => stored.name = source.name.clone(),
            Field::Description => stored.description = source.description.clone(),
            Field::Category => stored.category = source.category.clone(),
            Field::BasePrice => stored.base_price = source.base_price.clone(),
            Field::Discount => stored.discount = source.discount.clone(),
            Field::Status => stored.status = source.status,
            Field::ArchivedAt => stored.archived_at = source.archived_at,
        }
    }
    stored.updated_at = source.updated_at;
}

#[async_trait::async_trait]
impl AtomicWriter for InMemoryCatalogStore {
    async fn apply(&self, plan: Plan) -> Result<(), CommitError> {
        if plan.is_empty() {
            return Ok(());
        }

        let mut state = self.state.write().map_err(|_| CommitError::Backend {
            operation: "apply",
            message: "lock poisoned".to_string(),
        })?;

        Self::check(&state, &plan)?;

        let count = plan.len();
        for op in plan.into_operations() {
            match op {
                Operation::InsertProduct(snapshot) => {
                    state.products.insert(snapshot.id, snapshot);
                }
                Operation::UpdateProduct { snapshot, changes } => {
                    if let Some(stored) = state.products.get_mut(&snapshot.id) {
                        merge_changes(stored, &snapshot, &changes);
                    }
                }
                Operation::InsertOutbox(record) => state.outbox.push(record),
            }
        }

        debug!(operations = count, "applied plan");
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProductStore for InMemoryCatalogStore {
    async fn load(&self, id: ProductId) -> Result<Product, StoreError> {
        let state = self.read("load")?;
        let snapshot = state.products.get(&id).cloned().ok_or(StoreError::NotFound(id))?;
        Ok(Product::reconstruct(snapshot))
    }
}

impl EventSink for InMemoryCatalogStore {}

#[async_trait::async_trait]
impl ProductReadModel for InMemoryCatalogStore {
    async fn get_product(&self, id: ProductId) -> Result<Option<ProductSnapshot>, StoreError> {
        Ok(self.read("get_product")?.products.get(&id).cloned())
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<SnapshotPage, StoreError> {
        let state = self.read("list_products")?;

        let mut matching: Vec<&ProductSnapshot> =
            state.products.values().filter(|p| filter.matches(p)).collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let limit = if filter.limit == 0 { usize::MAX } else { filter.limit };
        let items = matching
            .into_iter()
            .skip(filter.offset)
            .take(limit)
            .cloned()
            .collect();

        Ok(SnapshotPage { items, total })
    }
}
