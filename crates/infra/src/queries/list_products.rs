//! ListProducts - filtered, paginated listing, newest first.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument};

use catalog_core::Clock;
use catalog_products::{PricingCalculator, ProductStatus};

use super::ProductView;
use crate::product_store::{ProductFilter, ProductReadModel};
use crate::use_cases::UseCaseError;

#[derive(Debug, Clone, Default)]
pub struct ListProductsRequest {
    pub category: Option<String>,
    pub status: Option<ProductStatus>,
    /// `0` returns every match.
    pub limit: usize,
    pub offset: usize,
}

/// One page of products plus the number of matches across all pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductPage {
    pub products: Vec<ProductView>,
    pub total: u64,
}

pub struct ListProductsQuery {
    read_model: Arc<dyn ProductReadModel>,
    calculator: PricingCalculator,
    clock: Arc<dyn Clock>,
}

impl ListProductsQuery {
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

    #[instrument(skip(self), err)]
    pub async fn execute(&self, request: ListProductsRequest) -> Result<ProductPage, UseCaseError> {
        let filter = ProductFilter {
            category: request.category,
            status: request.status,
            limit: request.limit,
            offset: request.offset,
        };
        let page = self.read_model.list_products(&filter).await?;

        let now = self.clock.now();
        let products: Vec<ProductView> = page
            .items
            .into_iter()
            .map(|snapshot| ProductView::price(snapshot, &self.calculator, now))
            .collect();

        debug!(returned = products.len(), total = page.total, "listed products");
        Ok(ProductPage {
            products,
            total: page.total,
        })
    }
}
