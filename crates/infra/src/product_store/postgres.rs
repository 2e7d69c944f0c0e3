//! Postgres-backed catalog storage.
//!
//! One transaction per plan: every operation in a [`Plan`] runs inside the
//! same transaction, and any failure drops the transaction (rolling it back)
//! before returning. Dropping the `apply` future before commit has the same
//! effect.
//!
//! ## Error Mapping
//!
//! | SQLx error | Postgres code | Result |
//! |------------|---------------|--------|
//! | Database (unique violation) on `products` | `23505` | `CommitError::DuplicateProduct` |
//! | Database (unique violation) on `outbox_events` | `23505` | `CommitError::DuplicateEvent` |
//! | `UPDATE` touching zero rows | N/A | `CommitError::MissingProduct` |
//! | Anything else | any | `CommitError::Backend` / `StoreError::Backend` |
//!
//! Money columns are stored as reduced `BIGINT` numerator/denominator pairs
//! so prices survive a round trip exactly.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Row, Transaction};
use tracing::{debug, instrument};
use uuid::Uuid;

use catalog_core::{AggregateId, Money};
use catalog_events::OutboxRecord;
use catalog_products::{
    ChangeTracker, Discount, Field, Product, ProductId, ProductSnapshot, ProductStatus,
};

use super::r#trait::{
    EventSink, ProductFilter, ProductReadModel, ProductStore, SnapshotPage, StoreError,
};
use crate::commit::{AtomicWriter, CommitError, Operation, Plan};

const PRODUCT_COLUMNS: &str = r#"
    product_id,
    name,
    description,
    category,
    base_price_numerator,
    base_price_denominator,
    discount_id,
    discount_amount_numerator,
    discount_amount_denominator,
    discount_start_date,
    discount_end_date,
    status,
    archived_at,
    created_at,
    updated_at
"#;

const CREATE_PRODUCTS: &str = r#"
    CREATE TABLE IF NOT EXISTS products (
        product_id                  UUID PRIMARY KEY,
        name                        TEXT NOT NULL,
        description                 TEXT NOT NULL,
        category                    TEXT NOT NULL,
        base_price_numerator        BIGINT NOT NULL,
        base_price_denominator      BIGINT NOT NULL CHECK (base_price_denominator > 0),
        discount_id                 TEXT NULL,
        discount_amount_numerator   BIGINT NULL,
        discount_amount_denominator BIGINT NULL,
        discount_start_date         TIMESTAMPTZ NULL,
        discount_end_date           TIMESTAMPTZ NULL,
        status                      TEXT NOT NULL DEFAULT '',
        archived_at                 TIMESTAMPTZ NULL,
        created_at                  TIMESTAMPTZ NOT NULL,
        updated_at                  TIMESTAMPTZ NOT NULL
    )
"#;

const CREATE_OUTBOX: &str = r#"
    CREATE TABLE IF NOT EXISTS outbox_events (
        event_id     UUID PRIMARY KEY,
        event_type   TEXT NOT NULL,
        aggregate_id UUID NOT NULL,
        payload      JSONB NOT NULL,
        status       TEXT NOT NULL,
        created_at   TIMESTAMPTZ NOT NULL,
        processed_at TIMESTAMPTZ NULL
    )
"#;

/// Postgres-backed implementation of every catalog port.
///
/// Uses the SQLx connection pool, so it is `Send + Sync` and cheap to clone.
#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: Arc<PgPool>,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the `products` and `outbox_events` tables if they are missing.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for (operation, ddl) in [
            ("create_products", CREATE_PRODUCTS),
            ("create_outbox_events", CREATE_OUTBOX),
        ] {
            sqlx::query(ddl)
                .execute(&*self.pool)
                .await
                .map_err(|e| store_error(operation, e))?;
        }
        Ok(())
    }

    async fn fetch_snapshot(&self, id: ProductId) -> Result<Option<ProductSnapshot>, StoreError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| store_error("fetch_product", e))?;

        match row {
            Some(row) => {
                let record = ProductRow::from_row(&row)
                    .map_err(|e| StoreError::Decode(format!("product row: {e}")))?;
                Ok(Some(record.decode()?))
            }
            None => Ok(None),
        }
    }
}

async fn insert_product(
    tx: &mut Transaction<'_, Postgres>,
    snapshot: &ProductSnapshot,
) -> Result<(), CommitError> {
    let row = ProductRow::encode(snapshot)?;
    let sql = format!(
        "INSERT INTO products ({PRODUCT_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)"
    );

    sqlx::query(&sql)
        .bind(row.product_id)
        .bind(&row.name)
        .bind(&row.description)
        .bind(&row.category)
        .bind(row.base_price_numerator)
        .bind(row.base_price_denominator)
        .bind(&row.discount_id)
        .bind(row.discount_amount_numerator)
        .bind(row.discount_amount_denominator)
        .bind(row.discount_start_date)
        .bind(row.discount_end_date)
        .bind(&row.status)
        .bind(row.archived_at)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CommitError::DuplicateProduct(snapshot.id)
            } else {
                commit_error("insert_product", e)
            }
        })?;
    Ok(())
}

/// `UPDATE` of the dirty columns plus `updated_at`.
async fn update_product(
    tx: &mut Transaction<'_, Postgres>,
    snapshot: &ProductSnapshot,
    changes: &ChangeTracker,
) -> Result<(), CommitError> {
    let row = ProductRow::encode(snapshot)?;
    let mut qb = update_statement(row, changes);

    let result = qb
        .build()
        .execute(&mut **tx)
        .await
        .map_err(|e| commit_error("update_product", e))?;

    if result.rows_affected() == 0 {
        return Err(CommitError::MissingProduct(snapshot.id));
    }
    Ok(())
}

/// Builds the `UPDATE` for the dirty columns of `row`, always touching
/// `updated_at`.
fn update_statement(row: ProductRow, changes: &ChangeTracker) -> QueryBuilder<'static, Postgres> {
    let mut qb: QueryBuilder<'static, Postgres> = QueryBuilder::new("UPDATE products SET ");
    let mut set = qb.separated(", ");
    for field in changes.iter() {
        match field {
            Field::Name => {
                set.push("name = ").push_bind_unseparated(row.name.clone());
            }
            Field::Description => {
                set.push("description = ")
                    .push_bind_unseparated(row.description.clone());
            }
            Field::Category => {
                set.push("category = ").push_bind_unseparated(row.category.clone());
            }
            Field::BasePrice => {
                set.push("base_price_numerator = ")
                    .push_bind_unseparated(row.base_price_numerator);
                set.push("base_price_denominator = ")
                    .push_bind_unseparated(row.base_price_denominator);
            }
            Field::Discount => {
                set.push("discount_id = ")
                    .push_bind_unseparated(row.discount_id.clone());
                set.push("discount_amount_numerator = ")
                    .push_bind_unseparated(row.discount_amount_numerator);
                set.push("discount_amount_denominator = ")
                    .push_bind_unseparated(row.discount_amount_denominator);
                set.push("discount_start_date = ")
                    .push_bind_unseparated(row.discount_start_date);
                set.push("discount_end_date = ")
                    .push_bind_unseparated(row.discount_end_date);
            }
            Field::Status => {
                set.push("status = ").push_bind_unseparated(row.status.clone());
            }
            Field::ArchivedAt => {
                set.push("archived_at = ").push_bind_unseparated(row.archived_at);
            }
        }
    }
    set.push("updated_at = ").push_bind_unseparated(row.updated_at);
    qb.push(" WHERE product_id = ").push_bind(row.product_id);
    qb
}

async fn insert_outbox(
    tx: &mut Transaction<'_, Postgres>,
    record: &OutboxRecord,
) -> Result<(), CommitError> {
    sqlx::query(
        r#"
        INSERT INTO outbox_events (
            event_id,
            event_type,
            aggregate_id,
            payload,
            status,
            created_at,
            processed_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(record.event_id)
    .bind(&record.event_type)
    .bind(*record.aggregate_id.as_uuid())
    .bind(&record.payload)
    .bind(record.status.as_str())
    .bind(record.created_at)
    .bind(record.processed_at)
    .execute(&mut **tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            CommitError::DuplicateEvent(record.event_id)
        } else {
            commit_error("insert_outbox", e)
        }
    })?;
    Ok(())
}

#[async_trait::async_trait]
impl AtomicWriter for PostgresCatalogStore {
    #[instrument(skip(self, plan), fields(operations = plan.len()), err)]
    async fn apply(&self, plan: Plan) -> Result<(), CommitError> {
        if plan.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| commit_error("begin_transaction", e))?;

        // An early return drops `tx`, which rolls it back.
        for op in plan.operations() {
            match op {
                Operation::InsertProduct(snapshot) => insert_product(&mut tx, snapshot).await?,
                Operation::UpdateProduct { snapshot, changes } => {
                    update_product(&mut tx, snapshot, changes).await?
                }
                Operation::InsertOutbox(record) => insert_outbox(&mut tx, record).await?,
            }
        }

        tx.commit()
            .await
            .map_err(|e| commit_error("commit_transaction", e))?;

        debug!("plan committed");
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProductStore for PostgresCatalogStore {
    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn load(&self, id: ProductId) -> Result<Product, StoreError> {
        let snapshot = self.fetch_snapshot(id).await?.ok_or(StoreError::NotFound(id))?;
        Ok(Product::reconstruct(snapshot))
    }
}

impl EventSink for PostgresCatalogStore {}

#[async_trait::async_trait]
impl ProductReadModel for PostgresCatalogStore {
    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn get_product(&self, id: ProductId) -> Result<Option<ProductSnapshot>, StoreError> {
        self.fetch_snapshot(id).await
    }

    #[instrument(skip(self), err)]
    async fn list_products(&self, filter: &ProductFilter) -> Result<SnapshotPage, StoreError> {
        let category: Option<&str> = filter.category.as_deref();
        let statuses: Option<Vec<String>> = filter
            .persisted_statuses()
            .map(|accepted| accepted.into_iter().map(str::to_string).collect());
        let (limit, offset) = page_bounds(filter);

        let count_row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total
            FROM products
            WHERE ($1::text IS NULL OR category = $1)
                AND ($2::text[] IS NULL OR status = ANY($2))
            "#,
        )
        .bind(category)
        .bind(&statuses)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| store_error("count_products", e))?;

        let total: i64 = count_row
            .try_get("total")
            .map_err(|e| StoreError::Decode(format!("failed to read count: {e}")))?;

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE ($1::text IS NULL OR category = $1) \
               AND ($2::text[] IS NULL OR status = ANY($2)) \
             ORDER BY created_at DESC, product_id DESC \
             LIMIT $3 OFFSET $4"
        );
        let rows = sqlx::query(&sql)
            .bind(category)
            .bind(&statuses)
            .bind(limit)
            .bind(offset)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| store_error("list_products", e))?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let record = ProductRow::from_row(&row)
                .map_err(|e| StoreError::Decode(format!("product row: {e}")))?;
            items.push(record.decode()?);
        }

        Ok(SnapshotPage {
            items,
            total: total.max(0) as u64,
        })
    }
}

/// `LIMIT`/`OFFSET` binds. A zero limit binds `NULL`, which is unbounded;
/// values past `i64::MAX` saturate instead of wrapping.
fn page_bounds(filter: &ProductFilter) -> (Option<i64>, i64) {
    let limit = (filter.limit > 0).then(|| i64::try_from(filter.limit).unwrap_or(i64::MAX));
    let offset = i64::try_from(filter.offset).unwrap_or(i64::MAX);
    (limit, offset)
}

/// Check if an error is a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}

fn describe(operation: &str, err: sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db_err) => {
            format!("database error in {operation}: {}", db_err.message())
        }
        sqlx::Error::PoolClosed => format!("connection pool closed in {operation}"),
        other => format!("sqlx error in {operation}: {other}"),
    }
}

fn commit_error(operation: &'static str, err: sqlx::Error) -> CommitError {
    CommitError::Backend {
        operation,
        message: describe(operation, err),
    }
}

fn store_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    StoreError::Backend {
        operation,
        message: describe(operation, err),
    }
}

// SQLx row type

#[derive(Debug, Clone)]
struct ProductRow {
    product_id: Uuid,
    name: String,
    description: String,
    category: String,
    base_price_numerator: i64,
    base_price_denominator: i64,
    discount_id: Option<String>,
    discount_amount_numerator: Option<i64>,
    discount_amount_denominator: Option<i64>,
    discount_start_date: Option<DateTime<Utc>>,
    discount_end_date: Option<DateTime<Utc>>,
    status: String,
    archived_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for ProductRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            product_id: row.try_get("product_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            category: row.try_get("category")?,
            base_price_numerator: row.try_get("base_price_numerator")?,
            base_price_denominator: row.try_get("base_price_denominator")?,
            discount_id: row.try_get("discount_id")?,
            discount_amount_numerator: row.try_get("discount_amount_numerator")?,
            discount_amount_denominator: row.try_get("discount_amount_denominator")?,
            discount_start_date: row.try_get("discount_start_date")?,
            discount_end_date: row.try_get("discount_end_date")?,
            status: row.try_get("status")?,
            archived_at: row.try_get("archived_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl ProductRow {
    fn encode(snapshot: &ProductSnapshot) -> Result<Self, CommitError> {
        let (base_price_numerator, base_price_denominator) =
            fraction_columns(&snapshot.base_price, "base_price")?;

        let (discount_amount_numerator, discount_amount_denominator) = match &snapshot.discount {
            Some(d) => {
                let (n, den) = fraction_columns(d.amount(), "discount_amount")?;
                (Some(n), Some(den))
            }
            None => (None, None),
        };

        Ok(Self {
            product_id: snapshot.id.as_uuid(),
            name: snapshot.name.clone(),
            description: snapshot.description.clone(),
            category: snapshot.category.clone(),
            base_price_numerator,
            base_price_denominator,
            discount_id: snapshot.discount.as_ref().map(|d| d.id().to_string()),
            discount_amount_numerator,
            discount_amount_denominator,
            discount_start_date: snapshot.discount.as_ref().map(Discount::start_date),
            discount_end_date: snapshot.discount.as_ref().map(Discount::end_date),
            status: snapshot.status.as_str().to_string(),
            archived_at: snapshot.archived_at,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
        })
    }

    fn decode(self) -> Result<ProductSnapshot, StoreError> {
        let base_price = Money::from_fraction(self.base_price_numerator, self.base_price_denominator)
            .map_err(|e| StoreError::Decode(format!("base_price of {}: {e}", self.product_id)))?;

        let discount = match (
            self.discount_id,
            self.discount_amount_numerator,
            self.discount_amount_denominator,
            self.discount_start_date,
            self.discount_end_date,
        ) {
            (Some(id), Some(n), Some(d), Some(start), Some(end)) => {
                let amount = Money::from_fraction(n, d).map_err(|e| {
                    StoreError::Decode(format!("discount_amount of {}: {e}", self.product_id))
                })?;
                Some(Discount::new(id, amount, start, end))
            }
            _ => None,
        };

        Ok(ProductSnapshot {
            id: ProductId::new(AggregateId::from_uuid(self.product_id)),
            name: self.name,
            description: self.description,
            category: self.category,
            base_price,
            discount,
            status: ProductStatus::from_persisted(&self.status),
            archived_at: self.archived_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn fraction_columns(value: &Money, column: &str) -> Result<(i64, i64), CommitError> {
    value.to_i64_fraction().ok_or_else(|| CommitError::Encode {
        operation: "encode_product",
        message: format!("{column} {value} does not fit in BIGINT columns"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn snapshot() -> ProductSnapshot {
        let now = Utc.with_ymd_and_hms(2024, 8, 1, 0, 0, 0).unwrap();
        let mut p = Product::create(
            ProductId::generate(),
            "Teapot",
            "Cast iron teapot",
            "kitchen",
            Money::from_fraction(4999, 100).unwrap(),
            now,
        )
        .unwrap();
        p.activate(now).unwrap();
        p.apply_discount(
            Discount::new(
                "autumn",
                Money::from_fraction(1, 3).unwrap(),
                now,
                now + Duration::days(7),
            ),
            now,
        )
        .unwrap();
        p.snapshot()
    }

    #[test]
    fn row_encoding_is_lossless() {
        let original = snapshot();
        let row = ProductRow::encode(&original).unwrap();

        assert_eq!(row.base_price_numerator, 4999);
        assert_eq!(row.base_price_denominator, 100);
        assert_eq!(row.discount_amount_numerator, Some(1));
        assert_eq!(row.discount_amount_denominator, Some(3));
        assert_eq!(row.status, "active");

        assert_eq!(row.decode().unwrap(), original);
    }

    #[test]
    fn zero_denominator_row_fails_to_decode() {
        let mut row = ProductRow::encode(&snapshot()).unwrap();
        row.base_price_denominator = 0;
        assert!(matches!(row.decode(), Err(StoreError::Decode(_))));
    }

    #[test]
    fn partial_discount_columns_read_as_no_discount() {
        let mut row = ProductRow::encode(&snapshot()).unwrap();
        row.discount_end_date = None;
        assert!(row.decode().unwrap().discount.is_none());
    }

    #[test]
    fn oversized_price_cannot_be_encoded() {
        let mut s = snapshot();
        let huge = Money::from_fraction(i64::MAX, 1).unwrap();
        s.base_price = huge.multiply(&huge);
        assert!(matches!(ProductRow::encode(&s), Err(CommitError::Encode { .. })));
    }

    fn update_sql(changes: &[Field]) -> String {
        let row = ProductRow::encode(&snapshot()).unwrap();
        let changes: ChangeTracker = changes.iter().copied().collect();
        update_statement(row, &changes).sql().to_string()
    }

    #[test]
    fn update_writes_only_dirty_columns() {
        assert_eq!(
            update_sql(&[Field::Name]),
            "UPDATE products SET name = $1, updated_at = $2 WHERE product_id = $3"
        );
        assert_eq!(
            update_sql(&[Field::Status, Field::BasePrice]),
            "UPDATE products SET base_price_numerator = $1, base_price_denominator = $2, \
             status = $3, updated_at = $4 WHERE product_id = $5"
        );
    }

    #[test]
    fn discount_update_writes_every_discount_column() {
        assert_eq!(
            update_sql(&[Field::Discount]),
            "UPDATE products SET discount_id = $1, discount_amount_numerator = $2, \
             discount_amount_denominator = $3, discount_start_date = $4, \
             discount_end_date = $5, updated_at = $6 WHERE product_id = $7"
        );
    }

    #[test]
    fn archive_update_touches_status_and_archived_at() {
        assert_eq!(
            update_sql(&[Field::Status, Field::ArchivedAt]),
            "UPDATE products SET status = $1, archived_at = $2, updated_at = $3 \
             WHERE product_id = $4"
        );
    }

    #[test]
    fn page_bounds_saturate_instead_of_wrapping() {
        let filter = ProductFilter {
            limit: usize::MAX,
            offset: usize::MAX,
            ..Default::default()
        };
        assert_eq!(page_bounds(&filter), (Some(i64::MAX), i64::MAX));

        let unbounded = ProductFilter {
            offset: 5,
            ..Default::default()
        };
        assert_eq!(page_bounds(&unbounded), (None, 5));
    }
}
