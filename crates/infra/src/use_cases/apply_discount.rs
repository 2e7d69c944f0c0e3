//! ApplyDiscount - attaches a time-boxed percentage discount.
//!
//! The discount is checked structurally (id, amount in `[0, 1]`, start before
//! end) before the product is loaded; state rules are the aggregate's.

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use catalog_core::Money;
use catalog_products::{Discount, ProductId};

use super::{UseCaseContext, UseCaseError};

#[derive(Debug, Clone)]
pub struct ApplyDiscountRequest {
    pub product_id: ProductId,
    pub discount_id: String,
    /// Fraction of the base price taken off, e.g. `10/100`.
    pub amount: Money,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyDiscountResponse {
    pub product_id: ProductId,
}

pub struct ApplyDiscountHandler {
    ctx: UseCaseContext,
}

impl ApplyDiscountHandler {
    pub fn new(ctx: UseCaseContext) -> Self {
        Self { ctx }
    }

    #[instrument(
        skip(self, request),
        fields(product_id = %request.product_id, discount_id = %request.discount_id),
        err
    )]
    pub async fn execute(
        &self,
        request: ApplyDiscountRequest,
    ) -> Result<ApplyDiscountResponse, UseCaseError> {
        let discount = Discount::new(
            request.discount_id,
            request.amount,
            request.start_date,
            request.end_date,
        );
        discount.validate()?;

        let product_id = request.product_id;
        let mut product = self.ctx.load(product_id).await?;
        let now = self.ctx.now();

        product.apply_discount(discount, now)?;

        let recorded = self.ctx.save(&mut product, now).await?;
        info!(events = recorded, "discount applied");
        Ok(ApplyDiscountResponse { product_id })
    }
}
