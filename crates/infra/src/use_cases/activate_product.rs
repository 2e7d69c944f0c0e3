//! ActivateProduct - makes a product sellable. Already active is a no-op.

use tracing::{info, instrument};

use catalog_products::ProductId;

use super::{UseCaseContext, UseCaseError};

#[derive(Debug, Clone)]
pub struct ActivateProductRequest {
    pub product_id: ProductId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateProductResponse {
    pub product_id: ProductId,
}

pub struct ActivateProductHandler {
    ctx: UseCaseContext,
}

impl ActivateProductHandler {
    pub fn new(ctx: UseCaseContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, request), fields(product_id = %request.product_id), err)]
    pub async fn execute(
        &self,
        request: ActivateProductRequest,
    ) -> Result<ActivateProductResponse, UseCaseError> {
        let product_id = request.product_id;
        let mut product = self.ctx.load(product_id).await?;
        let now = self.ctx.now();

        product.activate(now)?;

        let recorded = self.ctx.save(&mut product, now).await?;
        info!(events = recorded, "product activated");
        Ok(ActivateProductResponse { product_id })
    }
}
