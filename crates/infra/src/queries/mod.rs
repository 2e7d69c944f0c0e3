//! Read-side queries.
//!
//! Queries read stored snapshots directly through [`ProductReadModel`]
//! and never go through the commit path. Each snapshot is reconstructed into
//! a [`Product`] only to price it at the clock's current instant.
//!
//! [`ProductReadModel`]: crate::product_store::ProductReadModel

use chrono::{DateTime, Utc};
use serde::Serialize;

use catalog_core::Money;
use catalog_products::{PricingCalculator, Product, ProductId, ProductSnapshot, ProductStatus};

pub mod get_product;
pub mod list_products;

pub use get_product::{GetProductQuery, GetProductRequest};
pub use list_products::{ListProductsQuery, ListProductsRequest, ProductPage};

/// A stored product plus its effective price at query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductView {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_price: Money,
    pub effective_price: Money,
    pub discount_id: Option<String>,
    pub discount_amount: Option<Money>,
    pub discount_start_date: Option<DateTime<Utc>>,
    pub discount_end_date: Option<DateTime<Utc>>,
    pub status: ProductStatus,
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductView {
    pub(crate) fn price(
        snapshot: ProductSnapshot,
        calculator: &PricingCalculator,
        at: DateTime<Utc>,
    ) -> Self {
        let product = Product::reconstruct(snapshot);
        let effective_price = calculator.effective_price(&product, at);
        let discount = product.discount();

        Self {
            product_id: product.id_typed(),
            name: product.name().to_string(),
            description: product.description().to_string(),
            category: product.category().to_string(),
            base_price: product.base_price().clone(),
            effective_price,
            discount_id: discount.map(|d| d.id().to_string()),
            discount_amount: discount.map(|d| d.amount().clone()),
            discount_start_date: discount.map(|d| d.start_date()),
            discount_end_date: discount.map(|d| d.end_date()),
            status: product.status(),
            archived_at: product.archived_at(),
            created_at: product.created_at(),
            updated_at: product.updated_at(),
        }
    }
}
