//! Service wiring: one backend behind every port, one handler per operation.

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use catalog_core::Clock;
use catalog_products::PricingCalculator;

use crate::commit::AtomicWriter;
use crate::config::{CatalogConfig, StorageBackend};
use crate::product_store::{
    EventSink, InMemoryCatalogStore, PostgresCatalogStore, ProductReadModel, ProductStore,
};
use crate::queries::{GetProductQuery, ListProductsQuery};
use crate::use_cases::{
    ActivateProductHandler, ApplyDiscountHandler, ArchiveProductHandler, CreateProductHandler,
    DeactivateProductHandler, RemoveDiscountHandler, UpdateProductHandler, UseCaseContext,
};

pub struct CatalogServices {
    pub create_product: CreateProductHandler,
    pub update_product: UpdateProductHandler,
    pub activate_product: ActivateProductHandler,
    pub deactivate_product: DeactivateProductHandler,
    pub archive_product: ArchiveProductHandler,
    pub apply_discount: ApplyDiscountHandler,
    pub remove_discount: RemoveDiscountHandler,
    pub get_product: GetProductQuery,
    pub list_products: ListProductsQuery,
}

impl CatalogServices {
    /// Wire every handler against a single store implementing all ports.
    pub fn with_store<S>(store: Arc<S>, clock: Arc<dyn Clock>) -> Self
    where
        S: ProductStore + EventSink + AtomicWriter + ProductReadModel + 'static,
    {
        let ctx = UseCaseContext::new(store.clone(), store.clone(), store.clone(), clock.clone());
        let calculator = PricingCalculator::new();

        Self {
            create_product: CreateProductHandler::new(ctx.clone()),
            update_product: UpdateProductHandler::new(ctx.clone()),
            activate_product: ActivateProductHandler::new(ctx.clone()),
            deactivate_product: DeactivateProductHandler::new(ctx.clone()),
            archive_product: ArchiveProductHandler::new(ctx.clone()),
            apply_discount: ApplyDiscountHandler::new(ctx.clone()),
            remove_discount: RemoveDiscountHandler::new(ctx),
            get_product: GetProductQuery::new(store.clone(), calculator, clock.clone()),
            list_products: ListProductsQuery::new(store, calculator, clock),
        }
    }

    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self::with_store(Arc::new(InMemoryCatalogStore::new()), clock)
    }

    /// Build services for the configured backend. Postgres is connected and
    /// its tables created before returning.
    pub async fn connect(config: &CatalogConfig, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        match &config.storage {
            StorageBackend::InMemory => {
                info!("using in-memory catalog store");
                Ok(Self::in_memory(clock))
            }
            StorageBackend::Postgres(database) => {
                database.validate().context("invalid database configuration")?;

                let pool = PgPoolOptions::new()
                    .max_connections(database.max_connections)
                    .connect(&database.url)
                    .await
                    .context("failed to connect to Postgres")?;

                let store = PostgresCatalogStore::new(pool);
                store
                    .ensure_schema()
                    .await
                    .context("failed to create catalog tables")?;

                info!(
                    max_connections = database.max_connections,
                    "using Postgres catalog store"
                );
                Ok(Self::with_store(Arc::new(store), clock))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::SystemClock;

    #[tokio::test]
    async fn default_config_connects_in_memory() {
        let services = CatalogServices::connect(&CatalogConfig::default(), Arc::new(SystemClock))
            .await
            .unwrap();

        let page = services
            .list_products
            .execute(Default::default())
            .await
            .unwrap();
        assert_eq!(page.total, 0);
    }
}
