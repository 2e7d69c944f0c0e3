//! ArchiveProduct - archives a product. Terminal.

use tracing::{info, instrument};

use catalog_products::ProductId;

use super::{UseCaseContext, UseCaseError};

#[derive(Debug, Clone)]
pub struct ArchiveProductRequest {
    pub product_id: ProductId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveProductResponse {
    pub product_id: ProductId,
}

pub struct ArchiveProductHandler {
    ctx: UseCaseContext,
}

impl ArchiveProductHandler {
    pub fn new(ctx: UseCaseContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, request), fields(product_id = %request.product_id), err)]
    pub async fn execute(
        &self,
        request: ArchiveProductRequest,
    ) -> Result<ArchiveProductResponse, UseCaseError> {
        let product_id = request.product_id;
        let mut product = self.ctx.load(product_id).await?;
        let now = self.ctx.now();

        product.archive(now)?;

        let recorded = self.ctx.save(&mut product, now).await?;
        info!(archived_at = %now, events = recorded, "product archived");
        Ok(ArchiveProductResponse { product_id })
    }
}
