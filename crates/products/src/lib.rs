//! Products domain module.
//!
//! This crate contains business rules for the catalog, implemented purely as
//! deterministic domain logic (no IO, no storage). Time always comes from the
//! caller.

pub mod change_tracker;
pub mod discount;
pub mod events;
pub mod pricing;
pub mod product;

pub use change_tracker::{ChangeTracker, Field};
pub use discount::Discount;
pub use events::{
    DiscountApplied, DiscountRemoved, ProductActivated, ProductArchived, ProductCreated,
    ProductDeactivated, ProductEvent, ProductUpdated,
};
pub use pricing::PricingCalculator;
pub use product::{Product, ProductId, ProductSnapshot, ProductStatus};
