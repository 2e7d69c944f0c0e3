//! DeactivateProduct - takes a product off sale.
//!
//! Refused while a discount is currently valid. Already inactive is a no-op.

use tracing::{info, instrument};

use catalog_products::ProductId;

use super::{UseCaseContext, UseCaseError};

#[derive(Debug, Clone)]
pub struct DeactivateProductRequest {
    pub product_id: ProductId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeactivateProductResponse {
    pub product_id: ProductId,
}

pub struct DeactivateProductHandler {
    ctx: UseCaseContext,
}

impl DeactivateProductHandler {
    pub fn new(ctx: UseCaseContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, request), fields(product_id = %request.product_id), err)]
    pub async fn execute(
        &self,
        request: DeactivateProductRequest,
    ) -> Result<DeactivateProductResponse, UseCaseError> {
        let product_id = request.product_id;
        let mut product = self.ctx.load(product_id).await?;
        let now = self.ctx.now();

        product.deactivate(now)?;

        let recorded = self.ctx.save(&mut product, now).await?;
        info!(events = recorded, "product deactivated");
        Ok(DeactivateProductResponse { product_id })
    }
}
