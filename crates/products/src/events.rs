//! Events raised by the `Product` aggregate.
//!
//! Each event is a typed struct; `ProductEvent` closes over them. The outbox
//! payload is the inner struct's JSON form (the enum serializes untagged), and
//! the event type name travels alongside it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::{AggregateId, Money};
use catalog_events::Event;

use crate::change_tracker::{ChangeTracker, Field};
use crate::product::ProductId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCreated {
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
    pub base_price: Money,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdated {
    pub product_id: ProductId,
    pub changed_fields: Vec<Field>,
    pub updated_at: DateTime<Utc>,
}

impl ProductUpdated {
    pub fn from_changes(
        product_id: ProductId,
        changes: &ChangeTracker,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            product_id,
            changed_fields: changes.iter().collect(),
            updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductActivated {
    pub product_id: ProductId,
    pub activated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDeactivated {
    pub product_id: ProductId,
    pub deactivated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductArchived {
    pub product_id: ProductId,
    pub archived_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountApplied {
    pub product_id: ProductId,
    pub discount_id: String,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountRemoved {
    pub product_id: ProductId,
    pub removed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ProductEvent {
    ProductCreated(ProductCreated),
    ProductUpdated(ProductUpdated),
    ProductActivated(ProductActivated),
    ProductDeactivated(ProductDeactivated),
    ProductArchived(ProductArchived),
    DiscountApplied(DiscountApplied),
    DiscountRemoved(DiscountRemoved),
}

impl ProductEvent {
    pub fn product_id(&self) -> ProductId {
        match self {
            ProductEvent::ProductCreated(e) => e.product_id,
            ProductEvent::ProductUpdated(e) => e.product_id,
            ProductEvent::ProductActivated(e) => e.product_id,
            ProductEvent::ProductDeactivated(e) => e.product_id,
            ProductEvent::ProductArchived(e) => e.product_id,
            ProductEvent::DiscountApplied(e) => e.product_id,
            ProductEvent::DiscountRemoved(e) => e.product_id,
        }
    }
}

impl Event for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::ProductCreated(_) => "product_created",
            ProductEvent::ProductUpdated(_) => "product_updated",
            ProductEvent::ProductActivated(_) => "product_activated",
            ProductEvent::ProductDeactivated(_) => "product_deactivated",
            ProductEvent::ProductArchived(_) => "product_archived",
            ProductEvent::DiscountApplied(_) => "discount_applied",
            ProductEvent::DiscountRemoved(_) => "discount_removed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProductEvent::ProductCreated(e) => e.created_at,
            ProductEvent::ProductUpdated(e) => e.updated_at,
            ProductEvent::ProductActivated(e) => e.activated_at,
            ProductEvent::ProductDeactivated(e) => e.deactivated_at,
            ProductEvent::ProductArchived(e) => e.archived_at,
            ProductEvent::DiscountApplied(e) => e.applied_at,
            ProductEvent::DiscountRemoved(e) => e.removed_at,
        }
    }

    fn aggregate_id(&self) -> AggregateId {
        self.product_id().into()
    }
}
