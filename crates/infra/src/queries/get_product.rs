//! GetProduct - one product with its current effective price.

use std::sync::Arc;

use tracing::instrument;

use catalog_core::{Clock, DomainError};
use catalog_products::{PricingCalculator, ProductId};

use super::ProductView;
use crate::product_store::ProductReadModel;
use crate::use_cases::UseCaseError;

#[derive(Debug, Clone)]
pub struct GetProductRequest {
    pub product_id: ProductId,
}

pub struct GetProductQuery {
    read_model: Arc<dyn ProductReadModel>,
    calculator: PricingCalculator,
    clock: Arc<dyn Clock>,
}

impl GetProductQuery {
    pub fn new(
        read_model: Arc<dyn ProductReadModel>,
        calculator: PricingCalculator,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            read_model,
            calculator,
            clock,
        }
    }

    #[instrument(skip(self, request), fields(product_id = %request.product_id), err)]
    pub async fn execute(&self, request: GetProductRequest) -> Result<ProductView, UseCaseError> {
        let snapshot = self
            .read_model
            .get_product(request.product_id)
            .await?
            .ok_or(DomainError::ProductNotFound)?;

        Ok(ProductView::price(snapshot, &self.calculator, self.clock.now()))
    }
}
