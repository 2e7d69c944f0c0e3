//! RemoveDiscount - detaches the product's discount, if any.

use tracing::{info, instrument};

use catalog_products::ProductId;

use super::{UseCaseContext, UseCaseError};

#[derive(Debug, Clone)]
pub struct RemoveDiscountRequest {
    pub product_id: ProductId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveDiscountResponse {
    pub product_id: ProductId,
}

pub struct RemoveDiscountHandler {
    ctx: UseCaseContext,
}

impl RemoveDiscountHandler {
    pub fn new(ctx: UseCaseContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, request), fields(product_id = %request.product_id), err)]
    pub async fn execute(
        &self,
        request: RemoveDiscountRequest,
    ) -> Result<RemoveDiscountResponse, UseCaseError> {
        let product_id = request.product_id;
        let mut product = self.ctx.load(product_id).await?;
        let now = self.ctx.now();

        let discount_id = product.discount().map(|d| d.id().to_string());
        product.remove_discount(now)?;

        let recorded = self.ctx.save(&mut product, now).await?;
        info!(?discount_id, events = recorded, "discount removed");
        Ok(RemoveDiscountResponse { product_id })
    }
}
