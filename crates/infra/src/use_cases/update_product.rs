//! UpdateProduct - replaces any of name, description and category.
//!
//! Omitted fields keep their stored value. When at least one field actually
//! changes, a `ProductUpdated` event listing the changed fields is recorded
//! alongside the write.

use tracing::{info, instrument};

use catalog_core::AggregateRoot;
use catalog_products::{ProductEvent, ProductId, ProductUpdated};

use super::{UseCaseContext, UseCaseError};

#[derive(Debug, Clone)]
pub struct UpdateProductRequest {
    pub product_id: ProductId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateProductResponse {
    pub product_id: ProductId,
}

pub struct UpdateProductHandler {
    ctx: UseCaseContext,
}

impl UpdateProductHandler {
    pub fn new(ctx: UseCaseContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, request), fields(product_id = %request.product_id), err)]
    pub async fn execute(
        &self,
        request: UpdateProductRequest,
    ) -> Result<UpdateProductResponse, UseCaseError> {
        let product_id = request.product_id;
        let mut product = self.ctx.load(product_id).await?;
        let now = self.ctx.now();

        let name = request.name.unwrap_or_else(|| product.name().to_string());
        let description = request
            .description
            .unwrap_or_else(|| product.description().to_string());
        let category = request
            .category
            .unwrap_or_else(|| product.category().to_string());

        product.update_details(&name, &description, &category, now)?;

        let changes = *product.changes();
        let mut events = product.take_events();
        if !changes.is_empty() {
            events.push(ProductEvent::ProductUpdated(ProductUpdated::from_changes(
                product_id, &changes, now,
            )));
        }

        let write = self.ctx.products.build_upsert(&product);
        let recorded = self.ctx.commit(write, events, now).await?;

        info!(changed = changes.len(), events = recorded, "product updated");
        Ok(UpdateProductResponse { product_id })
    }
}
