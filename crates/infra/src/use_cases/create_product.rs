//! CreateProduct - registers a new, not yet active product.

use tracing::{info, instrument};

use catalog_core::{AggregateRoot, Money};
use catalog_products::{Product, ProductId};

use super::{UseCaseContext, UseCaseError};

#[derive(Debug, Clone)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_price: Money,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProductResponse {
    pub product_id: ProductId,
}

pub struct CreateProductHandler {
    ctx: UseCaseContext,
}

impl CreateProductHandler {
    pub fn new(ctx: UseCaseContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, request), fields(category = %request.category), err)]
    pub async fn execute(
        &self,
        request: CreateProductRequest,
    ) -> Result<CreateProductResponse, UseCaseError> {
        let now = self.ctx.now();
        let product_id = ProductId::generate();

        let mut product = Product::create(
            product_id,
            request.name,
            request.description,
            request.category,
            request.base_price,
            now,
        )?;

        let insert = self.ctx.insert_op(&product);
        let events = product.take_events();
        let recorded = self.ctx.commit(Some(insert), events, now).await?;

        info!(%product_id, events = recorded, "product created");
        Ok(CreateProductResponse { product_id })
    }
}
