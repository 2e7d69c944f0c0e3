use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use catalog_core::{AggregateId, AggregateRoot, DomainError, DomainResult, Money};

use crate::change_tracker::{ChangeTracker, Field};
use crate::discount::Discount;
use crate::events::{
    DiscountApplied, DiscountRemoved, ProductActivated, ProductArchived, ProductCreated,
    ProductDeactivated, ProductEvent,
};

const MAX_NAME_LEN: usize = 255;
const MAX_DESCRIPTION_LEN: usize = 1000;
const MAX_CATEGORY_LEN: usize = 100;

/// Product identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub AggregateId);

impl ProductId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }

    /// Fresh time-ordered identifier.
    pub fn generate() -> Self {
        Self(AggregateId::new())
    }

    pub fn as_uuid(&self) -> Uuid {
        *self.0.as_uuid()
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ProductId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(AggregateId::from_str(s)?))
    }
}

impl From<Uuid> for ProductId {
    fn from(value: Uuid) -> Self {
        Self(AggregateId::from_uuid(value))
    }
}

impl From<ProductId> for AggregateId {
    fn from(value: ProductId) -> Self {
        value.0
    }
}

/// Product status lifecycle.
///
/// A freshly created product is `Unset` until its first activation.
/// Archival is tracked separately through `archived_at`.
///
/// `Unset` only survives in memory: `Product::reconstruct` loads it as
/// `Inactive`. Deactivating a fresh aggregate therefore records
/// `ProductDeactivated`, while the same call after a reload is a no-op.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Unset,
    Inactive,
    Active,
}

impl ProductStatus {
    /// Persisted form. `Unset` is stored as the empty string.
    pub fn as_str(self) -> &'static str {
        match self {
            ProductStatus::Unset => "",
            ProductStatus::Inactive => "inactive",
            ProductStatus::Active => "active",
        }
    }

    /// Read a persisted status. The empty string is `Unset`; anything else
    /// other than `"active"` is inactive.
    pub fn from_persisted(raw: &str) -> Self {
        match raw {
            "" => ProductStatus::Unset,
            "active" => ProductStatus::Active,
            _ => ProductStatus::Inactive,
        }
    }
}

impl core::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every persisted attribute of a product, as plain data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_price: Money,
    pub discount: Option<Discount>,
    pub status: ProductStatus,
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate root: Product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    name: String,
    description: String,
    category: String,
    base_price: Money,
    discount: Option<Discount>,
    status: ProductStatus,
    archived_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,

    changes: ChangeTracker,
    events: Vec<ProductEvent>,
}

impl Product {
    /// Create a new product and record `ProductCreated`.
    pub fn create(
        id: ProductId,
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        base_price: Money,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        let description = description.into();
        let category = category.into();

        validate_details(&name, &description, &category)?;
        if !base_price.is_positive() {
            return Err(DomainError::InvalidPrice);
        }

        let mut product = Self {
            id,
            name,
            description,
            category,
            base_price,
            discount: None,
            status: ProductStatus::Unset,
            archived_at: None,
            created_at: now,
            updated_at: now,
            changes: ChangeTracker::new(),
            events: Vec::new(),
        };

        product.events.push(ProductEvent::ProductCreated(ProductCreated {
            product_id: id,
            name: product.name.clone(),
            category: product.category.clone(),
            base_price: product.base_price.clone(),
            created_at: now,
        }));

        Ok(product)
    }

    /// Rebuild a product from persisted state, with no pending changes or events.
    pub fn reconstruct(snapshot: ProductSnapshot) -> Self {
        let status = match snapshot.status {
            ProductStatus::Active => ProductStatus::Active,
            ProductStatus::Inactive | ProductStatus::Unset => ProductStatus::Inactive,
        };

        Self {
            id: snapshot.id,
            name: snapshot.name,
            description: snapshot.description,
            category: snapshot.category,
            base_price: snapshot.base_price,
            discount: snapshot.discount,
            status,
            archived_at: snapshot.archived_at,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
            changes: ChangeTracker::new(),
            events: Vec::new(),
        }
    }

    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            base_price: self.base_price.clone(),
            discount: self.discount.clone(),
            status: self.status,
            archived_at: self.archived_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn base_price(&self) -> &Money {
        &self.base_price
    }

    pub fn discount(&self) -> Option<&Discount> {
        self.discount.as_ref()
    }

    pub fn status(&self) -> ProductStatus {
        self.status
    }

    pub fn archived_at(&self) -> Option<DateTime<Utc>> {
        self.archived_at
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Fields modified since creation or reconstruction.
    pub fn changes(&self) -> &ChangeTracker {
        &self.changes
    }

    pub fn has_active_discount_at(&self, at: DateTime<Utc>) -> bool {
        self.discount.as_ref().is_some_and(|d| d.is_valid_at(at))
    }

    /// Replace name, description and category. Only fields whose value
    /// actually differs are marked dirty. Records no event.
    pub fn update_details(
        &mut self,
        name: &str,
        description: &str,
        category: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.ensure_not_archived()?;
        validate_details(name, description, category)?;

        let mut changed = false;
        if self.name != name {
            self.name = name.to_string();
            self.changes.mark_dirty(Field::Name);
            changed = true;
        }
        if self.description != description {
            self.description = description.to_string();
            self.changes.mark_dirty(Field::Description);
            changed = true;
        }
        if self.category != category {
            self.category = category.to_string();
            self.changes.mark_dirty(Field::Category);
            changed = true;
        }
        if changed {
            self.updated_at = now;
        }
        Ok(())
    }

    /// Activate the product. Already active is a no-op.
    pub fn activate(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_not_archived()?;
        if self.status == ProductStatus::Active {
            return Ok(());
        }

        self.status = ProductStatus::Active;
        self.updated_at = now;
        self.changes.mark_dirty(Field::Status);
        self.events.push(ProductEvent::ProductActivated(ProductActivated {
            product_id: self.id,
            activated_at: now,
        }));
        Ok(())
    }

    /// Deactivate the product. Blocked while a discount is currently valid;
    /// already inactive is a no-op.
    pub fn deactivate(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_not_archived()?;
        if self.has_active_discount_at(now) {
            return Err(DomainError::ProductHasActiveDiscount);
        }
        if self.status == ProductStatus::Inactive {
            return Ok(());
        }

        self.status = ProductStatus::Inactive;
        self.updated_at = now;
        self.changes.mark_dirty(Field::Status);
        self.events.push(ProductEvent::ProductDeactivated(ProductDeactivated {
            product_id: self.id,
            deactivated_at: now,
        }));
        Ok(())
    }

    /// Archive the product. Terminal.
    pub fn archive(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_not_archived()?;

        self.archived_at = Some(now);
        self.updated_at = now;
        self.changes.mark_dirty(Field::ArchivedAt);
        self.events.push(ProductEvent::ProductArchived(ProductArchived {
            product_id: self.id,
            archived_at: now,
        }));
        Ok(())
    }

    /// Attach a discount, replacing any discount that is no longer valid.
    ///
    /// The discount must already be structurally valid
    /// ([`Discount::validate`]); this only enforces state rules.
    pub fn apply_discount(&mut self, discount: Discount, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_not_archived()?;
        if self.status != ProductStatus::Active {
            return Err(DomainError::ProductNotActive);
        }
        if !discount.is_valid_at(now) {
            return Err(DomainError::InvalidDiscountPeriod);
        }
        if self.has_active_discount_at(now) {
            return Err(DomainError::DiscountAlreadyActive);
        }

        let discount_id = discount.id().to_string();
        self.discount = Some(discount);
        self.updated_at = now;
        self.changes.mark_dirty(Field::Discount);
        self.events.push(ProductEvent::DiscountApplied(DiscountApplied {
            product_id: self.id,
            discount_id,
            applied_at: now,
        }));
        Ok(())
    }

    /// Detach the discount. Nothing attached is a no-op.
    pub fn remove_discount(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.discount.is_none() {
            return Ok(());
        }
        self.ensure_not_archived()?;

        self.discount = None;
        self.updated_at = now;
        self.changes.mark_dirty(Field::Discount);
        self.events.push(ProductEvent::DiscountRemoved(DiscountRemoved {
            product_id: self.id,
            removed_at: now,
        }));
        Ok(())
    }

    fn ensure_not_archived(&self) -> DomainResult<()> {
        if self.is_archived() {
            return Err(DomainError::ProductAlreadyArchived);
        }
        Ok(())
    }
}

impl AggregateRoot for Product {
    type Id = ProductId;
    type Event = ProductEvent;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn pending_events(&self) -> &[Self::Event] {
        &self.events
    }

    fn take_events(&mut self) -> Vec<Self::Event> {
        std::mem::take(&mut self.events)
    }
}

fn validate_details(name: &str, description: &str, category: &str) -> DomainResult<()> {
    if !is_valid_text(name, MAX_NAME_LEN) {
        return Err(DomainError::InvalidProductName);
    }
    if !is_valid_text(description, MAX_DESCRIPTION_LEN) {
        return Err(DomainError::InvalidProductDescription);
    }
    if !is_valid_text(category, MAX_CATEGORY_LEN) {
        return Err(DomainError::InvalidProductCategory);
    }
    Ok(())
}

fn is_valid_text(value: &str, max_chars: usize) -> bool {
    !value.trim().is_empty() && value.chars().count() <= max_chars
}
